//! Persistence port for the review ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{Review, ReviewId, ReviewPatch};

/// Persistence errors raised by [`ReviewRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewPersistenceError {
    /// Repository connection could not be established.
    #[error("review repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("review repository query failed: {message}")]
    Query {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// A review already exists for this `(user, book)` pair.
    ///
    /// Raised by the storage layer's unique constraint on insert, so
    /// concurrent duplicate submissions cannot race past it: exactly one
    /// insert wins and the loser observes this error.
    #[error("a review already exists for this user and book")]
    Duplicate,
    /// The referenced book does not exist.
    #[error("referenced book does not exist")]
    UnknownBook,
}

impl ReviewPersistenceError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Persistence port for ledger entries.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Persist a new review.
    ///
    /// Fails with [`ReviewPersistenceError::Duplicate`] when the `(user,
    /// book)` slot is already taken and with
    /// [`ReviewPersistenceError::UnknownBook`] when the book reference does
    /// not resolve.
    async fn insert(&self, review: &Review) -> Result<(), ReviewPersistenceError>;

    /// Fetch a review by identifier.
    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, ReviewPersistenceError>;

    /// Apply a patch to the stored review and return the updated entry.
    ///
    /// Returns `Ok(None)` when the review no longer exists. Callers must
    /// supply a non-empty patch.
    async fn update(
        &self,
        id: &ReviewId,
        patch: &ReviewPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Review>, ReviewPersistenceError>;

    /// Delete a review, reporting whether a row was removed.
    async fn delete(&self, id: &ReviewId) -> Result<bool, ReviewPersistenceError>;
}
