//! Book aggregate for the public catalogue.
//!
//! Books are reference data: the review ledger points at them but never
//! mutates them, and the read path is unauthenticated.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Maximum allowed length for a book title.
pub const TITLE_MAX: usize = 256;
/// Maximum allowed length for an author name.
pub const AUTHOR_MAX: usize = 128;
/// Maximum allowed length for a genre label.
pub const GENRE_MAX: usize = 64;

/// Validation errors returned by [`Book::try_new`] and [`SearchQuery::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookValidationError {
    /// Title is empty after trimming whitespace.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Title exceeds the accepted length.
    #[error("title must be at most {max} characters")]
    TitleTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Author is empty after trimming whitespace.
    #[error("author must not be empty")]
    EmptyAuthor,
    /// Author exceeds the accepted length.
    #[error("author must be at most {max} characters")]
    AuthorTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Genre is empty after trimming whitespace.
    #[error("genre must not be empty")]
    EmptyGenre,
    /// Genre exceeds the accepted length.
    #[error("genre must be at most {max} characters")]
    GenreTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Search query is empty after trimming whitespace.
    #[error("search query must not be empty")]
    EmptyQuery,
}

/// Stable book identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    /// Construct a [`BookId`] from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`BookId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unvalidated book fields as supplied by a caller.
#[derive(Debug, Clone)]
pub struct BookDraft {
    /// Proposed title.
    pub title: String,
    /// Proposed author.
    pub author: String,
    /// Proposed genre label.
    pub genre: String,
}

/// Catalogue entry.
///
/// ## Invariants
/// - `title`, `author`, and `genre` are non-empty and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    genre: String,
    created_at: DateTime<Utc>,
}

fn validated_field(
    value: &str,
    max: usize,
    empty: BookValidationError,
    too_long: BookValidationError,
) -> Result<String, BookValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    if trimmed.chars().count() > max {
        return Err(too_long);
    }
    Ok(trimmed.to_owned())
}

impl Book {
    /// Fallible constructor enforcing the field invariants.
    ///
    /// Surrounding whitespace is trimmed from every field.
    pub fn try_new(
        id: BookId,
        title: impl AsRef<str>,
        author: impl AsRef<str>,
        genre: impl AsRef<str>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, BookValidationError> {
        let title = validated_field(
            title.as_ref(),
            TITLE_MAX,
            BookValidationError::EmptyTitle,
            BookValidationError::TitleTooLong { max: TITLE_MAX },
        )?;
        let author = validated_field(
            author.as_ref(),
            AUTHOR_MAX,
            BookValidationError::EmptyAuthor,
            BookValidationError::AuthorTooLong { max: AUTHOR_MAX },
        )?;
        let genre = validated_field(
            genre.as_ref(),
            GENRE_MAX,
            BookValidationError::EmptyGenre,
            BookValidationError::GenreTooLong { max: GENRE_MAX },
        )?;

        Ok(Self {
            id,
            title,
            author,
            genre,
            created_at,
        })
    }

    /// Stable book identifier.
    #[must_use]
    pub fn id(&self) -> &BookId {
        &self.id
    }

    /// Book title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Book author.
    #[must_use]
    pub fn author(&self) -> &str {
        self.author.as_str()
    }

    /// Genre label.
    #[must_use]
    pub fn genre(&self) -> &str {
        self.genre.as_str()
    }

    /// Catalogue entry creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Validated free-text catalogue search term.
///
/// Matching semantics live in the repository: a case-insensitive substring
/// match against title, author, or genre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Validate and construct a [`SearchQuery`].
    ///
    /// # Examples
    /// ```
    /// use backend::domain::SearchQuery;
    ///
    /// let query = SearchQuery::new("  tolkien ").expect("valid query");
    /// assert_eq!(query.as_str(), "tolkien");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, BookValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(BookValidationError::EmptyQuery);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the query text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
