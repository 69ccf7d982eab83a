//! Persistence port for the book catalogue.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Book, BookId, SearchQuery};

/// Persistence errors raised by [`BookRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookPersistenceError {
    /// Repository connection could not be established.
    #[error("book repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("book repository query failed: {message}")]
    Query {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl BookPersistenceError {
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

/// Persistence port for catalogue entries.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Persist a new catalogue entry.
    async fn insert(&self, book: &Book) -> Result<(), BookPersistenceError>;

    /// List all catalogue entries in insertion order.
    async fn list(&self) -> Result<Vec<Book>, BookPersistenceError>;

    /// Fetch a catalogue entry by identifier.
    async fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, BookPersistenceError>;

    /// Case-insensitive substring search against title, author, and genre.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Book>, BookPersistenceError>;
}
