//! Catalogue services over the book repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::domain::ports::{
    BookPersistenceError, BookRepository, CatalogueCommand, CatalogueQuery,
};
use crate::domain::{AuthenticatedUser, Book, BookDraft, BookId, Error, SearchQuery};

fn map_repository_error(error: BookPersistenceError) -> Error {
    match error {
        BookPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("book catalogue unavailable: {message}"))
        }
        BookPersistenceError::Query { message } => {
            Error::internal(format!("book catalogue error: {message}"))
        }
    }
}

/// Catalogue service implementing the public read path and authenticated
/// creation.
#[derive(Clone)]
pub struct CatalogueService {
    books: Arc<dyn BookRepository>,
}

impl CatalogueService {
    /// Create a new service over the given repository.
    pub fn new(books: Arc<dyn BookRepository>) -> Self {
        Self { books }
    }
}

#[async_trait]
impl CatalogueQuery for CatalogueService {
    async fn list_books(&self) -> Result<Vec<Book>, Error> {
        self.books.list().await.map_err(map_repository_error)
    }

    async fn get_book(&self, id: &BookId) -> Result<Book, Error> {
        self.books
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("book {id} not found")))
    }

    async fn search_books(&self, query: &SearchQuery) -> Result<Vec<Book>, Error> {
        self.books.search(query).await.map_err(map_repository_error)
    }
}

#[async_trait]
impl CatalogueCommand for CatalogueService {
    async fn add_book(&self, caller: &AuthenticatedUser, draft: BookDraft) -> Result<Book, Error> {
        let book = Book::try_new(
            BookId::random(),
            draft.title,
            draft.author,
            draft.genre,
            Utc::now(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.books.insert(&book).await.map_err(map_repository_error)?;

        info!(book_id = %book.id(), user_id = %caller.user_id(), "book added to catalogue");
        Ok(book)
    }
}
