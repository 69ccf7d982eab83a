//! Credential and identity primitives for the auth gateway.
//!
//! The key type here is [`AuthenticatedUser`]: a capability value that only
//! successful token resolution can produce. Owner-checked operations take it
//! as an input type, so no handler is reachable without a verified identity
//! and the caller never supplies its own identity in a request body.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{UserId, Username, UsernameValidationError};

/// Minimum allowed password length in bytes.
pub const PASSWORD_MIN: usize = 8;
/// Maximum allowed password length in bytes.
pub const PASSWORD_MAX: usize = 128;

/// Validation errors returned when constructing a [`Password`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordValidationError {
    /// Password is empty.
    #[error("password must not be empty")]
    Empty,
    /// Password is shorter than the allowed minimum.
    #[error("password must be at least {min} characters")]
    TooShort {
        /// Minimum accepted length.
        min: usize,
    },
    /// Password is longer than the allowed maximum.
    #[error("password must be at most {max} characters")]
    TooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

/// Validation errors returned by [`Credentials::try_from_parts`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// The username failed validation.
    #[error(transparent)]
    Username(#[from] UsernameValidationError),
    /// The password failed validation.
    #[error(transparent)]
    Password(#[from] PasswordValidationError),
}

/// Plaintext password held only for the duration of a request.
///
/// The buffer is zeroised on drop and the debug representation is redacted.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate and construct a [`Password`].
    pub fn new(password: impl Into<String>) -> Result<Self, PasswordValidationError> {
        let password = Zeroizing::new(password.into());
        if password.is_empty() {
            return Err(PasswordValidationError::Empty);
        }
        if password.len() < PASSWORD_MIN {
            return Err(PasswordValidationError::TooShort { min: PASSWORD_MIN });
        }
        if password.len() > PASSWORD_MAX {
            return Err(PasswordValidationError::TooLong { max: PASSWORD_MAX });
        }
        Ok(Self(password))
    }

    /// Borrow the plaintext for hashing or verification.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Validated username/password pair for signup and login.
#[derive(Debug, Clone)]
pub struct Credentials {
    username: Username,
    password: Password,
}

impl Credentials {
    /// Validate and construct [`Credentials`] from raw request fields.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Credentials;
    ///
    /// let creds = Credentials::try_from_parts("ada", "correct horse").expect("valid creds");
    /// assert_eq!(creds.username().as_ref(), "ada");
    /// ```
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            password: Password::new(password)?,
        })
    }

    /// Login name.
    #[must_use]
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Plaintext password.
    #[must_use]
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Signed, time-limited bearer token proving a caller identity.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap an encoded token produced by a token codec.
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Borrow the encoded token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Consume the wrapper, yielding the encoded token.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Verified caller identity.
///
/// Produced exclusively by the auth gateway's token resolution; there is no
/// public constructor. Handlers and services require it by value or reference
/// for every owner-checked operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: UserId,
}

impl AuthenticatedUser {
    /// Seal a resolved identity into a capability value.
    pub(crate) fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// The verified caller identity.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}
