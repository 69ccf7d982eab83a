//! Signing port for bearer tokens.

use thiserror::Error;

use crate::domain::{BearerToken, UserId};

/// Failures raised by [`TokenCodec`] implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token's validity window has passed.
    #[error("bearer token expired")]
    Expired,
    /// The token is malformed or its signature does not verify.
    #[error("bearer token invalid")]
    Invalid,
    /// The codec itself failed to sign or parse.
    #[error("token codec failure: {message}")]
    Codec {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl TokenError {
    /// Helper for codec-level failures.
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }
}

/// Signing and verification port for bearer tokens.
///
/// Tokens encode a user identity and a bounded validity window. The codec is
/// synchronous: signing never touches I/O.
pub trait TokenCodec: Send + Sync {
    /// Mint a signed token for the given user.
    fn issue(&self, user_id: &UserId) -> Result<BearerToken, TokenError>;

    /// Verify a token and extract the user identity it encodes.
    fn decode(&self, token: &str) -> Result<UserId, TokenError>;
}
