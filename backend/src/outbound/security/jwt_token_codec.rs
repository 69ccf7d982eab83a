//! HS256 JWT implementation of the token codec port.
//!
//! Claims carry the user id (`sub`), issue time (`iat`), and expiry (`exp`).
//! Expiry is validated with zero leeway so a token is rejected the moment its
//! window closes.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{TokenCodec, TokenError};
use crate::domain::{BearerToken, UserId};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: the user this token authenticates.
    sub: Uuid,
    /// Issued-at, seconds since the Unix epoch.
    iat: i64,
    /// Expiry, seconds since the Unix epoch.
    exp: i64,
}

/// JWT codec signing HS256 tokens with a shared secret.
#[derive(Clone)]
pub struct JwtTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtTokenCodec {
    /// Create a codec from the signing secret and token lifetime.
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(&self, user_id: &UserId) -> Result<BearerToken, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: *user_id.as_uuid(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(BearerToken::new)
            .map_err(|err| TokenError::codec(err.to_string()))
    }

    fn decode(&self, token: &str) -> Result<UserId, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        Ok(UserId::from_uuid(data.claims.sub))
    }
}
