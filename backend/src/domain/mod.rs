//! Domain primitives, aggregates, ports, and use-case services.
//!
//! Purpose: define strongly typed domain entities used by the API and
//! persistence layers. Keep types immutable and document invariants in each
//! type's Rustdoc. Nothing in this module knows about HTTP or SQL.

pub mod auth;
pub mod auth_service;
pub mod book;
pub mod catalogue_service;
pub mod error;
pub mod ports;
pub mod review;
pub mod review_service;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    AuthenticatedUser, BearerToken, Credentials, CredentialsValidationError, PASSWORD_MAX,
    PASSWORD_MIN, Password, PasswordValidationError,
};
pub use self::auth_service::AuthService;
pub use self::book::{
    AUTHOR_MAX, Book, BookDraft, BookId, BookValidationError, GENRE_MAX, SearchQuery, TITLE_MAX,
};
pub use self::catalogue_service::CatalogueService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::review::{
    COMMENT_MAX, RATING_MAX, RATING_MIN, Rating, Review, ReviewId, ReviewPatch, ReviewSubmission,
    ReviewValidationError,
};
pub use self::review_service::ReviewService;
pub use self::trace_id::TraceId;
pub use self::user::{
    PasswordHash, USERNAME_MAX, USERNAME_MIN, User, UserId, Username, UsernameValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
