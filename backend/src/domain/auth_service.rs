//! Auth gateway service: signup, login, and caller resolution.
//!
//! Login failure is deliberately uniform: an unknown username and a wrong
//! password both produce [`AuthService::invalid_credentials`], and the
//! unknown-username path still performs a hash so the two failures cost the
//! same amount of work.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    AuthGateway, PasswordHasher, TokenCodec, TokenError, UserPersistenceError, UserRepository,
};
use crate::domain::{AuthenticatedUser, BearerToken, Credentials, Error, User, UserId};

fn map_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("credential store unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("credential store error: {message}"))
        }
        UserPersistenceError::UsernameTaken => Error::conflict("username is already registered"),
    }
}

/// Auth gateway implementation over the credential store, a password hasher,
/// and a token codec.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenCodec>,
}

impl AuthService {
    /// Create a new service over the given ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// The single error value returned for every login failure.
    fn invalid_credentials() -> Error {
        Error::invalid_credentials("invalid credentials")
    }

    fn issue_token(&self, user_id: &UserId) -> Result<BearerToken, Error> {
        self.tokens
            .issue(user_id)
            .map_err(|err| Error::internal(format!("token signing failed: {err}")))
    }
}

#[async_trait]
impl AuthGateway for AuthService {
    async fn signup(&self, credentials: Credentials) -> Result<BearerToken, Error> {
        let password_hash = self.hasher.hash(credentials.password());
        let user = User::new(UserId::random(), credentials.username().clone(), password_hash);

        self.users.insert(&user).await.map_err(map_repository_error)?;

        info!(user_id = %user.id(), username = %user.username(), "account registered");
        self.issue_token(user.id())
    }

    async fn login(&self, credentials: Credentials) -> Result<BearerToken, Error> {
        let user = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(map_repository_error)?;

        match user {
            Some(user) => {
                if !self
                    .hasher
                    .verify(credentials.password(), user.password_hash())
                {
                    return Err(Self::invalid_credentials());
                }
                self.issue_token(user.id())
            }
            None => {
                // Hash anyway so unknown usernames cost as much as mismatches.
                let _ = self.hasher.hash(credentials.password());
                Err(Self::invalid_credentials())
            }
        }
    }

    async fn resolve_caller(&self, token: &str) -> Result<AuthenticatedUser, Error> {
        let user_id = self.tokens.decode(token).map_err(|err| match err {
            TokenError::Expired | TokenError::Invalid => {
                Error::unauthorized("invalid or expired bearer token")
            }
            TokenError::Codec { message } => {
                Error::internal(format!("token verification failed: {message}"))
            }
        })?;

        Ok(AuthenticatedUser::new(user_id))
    }
}

#[cfg(test)]
mod tests {
    //! Service behaviour over stubbed ports, covering the uniform login
    //! failure contract and conflict mapping.

    use std::sync::Mutex;

    use super::*;
    use crate::domain::ports::FIXTURE_TOKEN;
    use crate::domain::{ErrorCode, Password, PasswordHash, Username};
    use rstest::rstest;

    #[derive(Default)]
    struct StubUserRepository {
        stored: Mutex<Vec<User>>,
        fail_insert_with_conflict: bool,
    }

    impl StubUserRepository {
        fn with_user(user: User) -> Self {
            Self {
                stored: Mutex::new(vec![user]),
                fail_insert_with_conflict: false,
            }
        }

        fn conflicting() -> Self {
            Self {
                stored: Mutex::new(Vec::new()),
                fail_insert_with_conflict: true,
            }
        }
    }

    #[async_trait]
    impl UserRepository for StubUserRepository {
        async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
            if self.fail_insert_with_conflict {
                return Err(UserPersistenceError::UsernameTaken);
            }
            self.stored.lock().expect("stub lock").push(user.clone());
            Ok(())
        }

        async fn find_by_username(
            &self,
            username: &Username,
        ) -> Result<Option<User>, UserPersistenceError> {
            Ok(self
                .stored
                .lock()
                .expect("stub lock")
                .iter()
                .find(|user| user.username() == username)
                .cloned())
        }
    }

    /// Reversed-plaintext "hash": transparent enough to assert against.
    struct StubHasher;

    impl PasswordHasher for StubHasher {
        fn hash(&self, password: &Password) -> PasswordHash {
            PasswordHash::new(password.expose().chars().rev().collect::<String>())
        }

        fn verify(&self, password: &Password, stored: &PasswordHash) -> bool {
            self.hash(password) == *stored
        }
    }

    struct StubCodec;

    impl TokenCodec for StubCodec {
        fn issue(&self, _user_id: &UserId) -> Result<BearerToken, TokenError> {
            Ok(BearerToken::new(FIXTURE_TOKEN))
        }

        fn decode(&self, token: &str) -> Result<UserId, TokenError> {
            if token == FIXTURE_TOKEN {
                Ok(UserId::random())
            } else {
                Err(TokenError::Invalid)
            }
        }
    }

    fn service(users: StubUserRepository) -> AuthService {
        AuthService::new(Arc::new(users), Arc::new(StubHasher), Arc::new(StubCodec))
    }

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials::try_from_parts(username, password).expect("valid test credentials")
    }

    fn registered_user(username: &str, password: &str) -> User {
        let hash = StubHasher.hash(&Password::new(password).expect("valid password"));
        User::new(
            UserId::random(),
            Username::new(username).expect("valid username"),
            hash,
        )
    }

    #[rstest]
    #[tokio::test]
    async fn signup_stores_a_hash_and_returns_a_token() {
        let users = StubUserRepository::default();
        let service = service(users);

        let token = service
            .signup(credentials("ada", "correct horse"))
            .await
            .expect("signup succeeds");
        assert_eq!(token.as_str(), FIXTURE_TOKEN);
    }

    #[rstest]
    #[tokio::test]
    async fn signup_maps_username_conflicts() {
        let service = service(StubUserRepository::conflicting());

        let err = service
            .signup(credentials("ada", "correct horse"))
            .await
            .expect_err("duplicate username rejected");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn login_succeeds_with_matching_credentials() {
        let service = service(StubUserRepository::with_user(registered_user(
            "ada",
            "correct horse",
        )));

        let token = service
            .login(credentials("ada", "correct horse"))
            .await
            .expect("login succeeds");
        assert_eq!(token.as_str(), FIXTURE_TOKEN);
    }

    #[rstest]
    #[tokio::test]
    async fn wrong_password_and_unknown_username_fail_identically() {
        let service = service(StubUserRepository::with_user(registered_user(
            "ada",
            "correct horse",
        )));

        let wrong_password = service
            .login(credentials("ada", "incorrect horse"))
            .await
            .expect_err("wrong password rejected");
        let unknown_username = service
            .login(credentials("nobody", "correct horse"))
            .await
            .expect_err("unknown username rejected");

        assert_eq!(wrong_password, unknown_username);
        assert_eq!(wrong_password.code(), ErrorCode::InvalidCredentials);
    }

    #[rstest]
    #[tokio::test]
    async fn resolve_rejects_bad_tokens_as_unauthorised() {
        let service = service(StubUserRepository::default());

        let err = service
            .resolve_caller("garbage")
            .await
            .expect_err("bad token rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn resolve_accepts_a_valid_token() {
        let service = service(StubUserRepository::default());

        let caller = service
            .resolve_caller(FIXTURE_TOKEN)
            .await
            .expect("valid token resolves");
        let _ = caller.user_id();
    }
}
