//! Driving port for the auth gateway use-cases.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! register, authenticate, and resolve callers without knowing the backing
//! infrastructure. This keeps HTTP handler tests deterministic because they
//! can substitute a test double instead of wiring persistence and signing.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, BearerToken, Credentials, Error, UserId};

/// Domain use-case port for authentication.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Register a new account and mint a bearer token for it.
    ///
    /// Fails with a conflict error when the username is already registered.
    async fn signup(&self, credentials: Credentials) -> Result<BearerToken, Error>;

    /// Authenticate existing credentials and mint a bearer token.
    ///
    /// Unknown usernames and wrong passwords yield the identical error value
    /// so the response does not reveal which part failed.
    async fn login(&self, credentials: Credentials) -> Result<BearerToken, Error>;

    /// Verify a bearer token and produce the caller capability.
    async fn resolve_caller(&self, token: &str) -> Result<AuthenticatedUser, Error>;
}

/// Token accepted by [`FixtureAuthGateway`].
pub const FIXTURE_TOKEN: &str = "fixture-bearer-token";
/// User identity carried by [`FIXTURE_TOKEN`].
pub const FIXTURE_USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

/// In-memory authenticator used by handler tests and no-database startup.
///
/// Any syntactically valid credentials sign up or log in successfully, and
/// [`FIXTURE_TOKEN`] resolves to the fixed fixture identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuthGateway;

impl FixtureAuthGateway {
    fn fixture_user_id() -> Result<UserId, Error> {
        UserId::new(FIXTURE_USER_ID)
            .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))
    }
}

#[async_trait]
impl AuthGateway for FixtureAuthGateway {
    async fn signup(&self, _credentials: Credentials) -> Result<BearerToken, Error> {
        Ok(BearerToken::new(FIXTURE_TOKEN))
    }

    async fn login(&self, _credentials: Credentials) -> Result<BearerToken, Error> {
        Ok(BearerToken::new(FIXTURE_TOKEN))
    }

    async fn resolve_caller(&self, token: &str) -> Result<AuthenticatedUser, Error> {
        if token == FIXTURE_TOKEN {
            Ok(AuthenticatedUser::new(Self::fixture_user_id()?))
        } else {
            Err(Error::unauthorized("invalid or expired bearer token"))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the fixture gateway contract.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_token_resolves_to_fixture_identity() {
        let gateway = FixtureAuthGateway;
        let caller = gateway
            .resolve_caller(FIXTURE_TOKEN)
            .await
            .expect("fixture token resolves");
        assert_eq!(caller.user_id().to_string(), FIXTURE_USER_ID);
    }

    #[rstest]
    #[case("")]
    #[case("some-other-token")]
    #[tokio::test]
    async fn other_tokens_are_rejected(#[case] token: &str) {
        let gateway = FixtureAuthGateway;
        let err = gateway
            .resolve_caller(token)
            .await
            .expect_err("non-fixture token rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
