//! Driving ports for the book catalogue.
//!
//! The read path is split from the write path: listing, lookup, and search
//! are public, while adding a book requires an authenticated caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AuthenticatedUser, Book, BookDraft, BookId, Error, SearchQuery};

/// Domain use-case port for the public catalogue read path.
#[async_trait]
pub trait CatalogueQuery: Send + Sync {
    /// List every catalogue entry in insertion order.
    async fn list_books(&self) -> Result<Vec<Book>, Error>;

    /// Fetch a single catalogue entry.
    async fn get_book(&self, id: &BookId) -> Result<Book, Error>;

    /// Case-insensitive substring search across title, author, and genre.
    async fn search_books(&self, query: &SearchQuery) -> Result<Vec<Book>, Error>;
}

/// Domain use-case port for catalogue mutation.
#[async_trait]
pub trait CatalogueCommand: Send + Sync {
    /// Validate and persist a new catalogue entry on behalf of the caller.
    async fn add_book(&self, caller: &AuthenticatedUser, draft: BookDraft) -> Result<Book, Error>;
}

/// In-memory catalogue used by handler tests and no-database startup.
///
/// Serves a fixed two-entry catalogue; [`CatalogueCommand::add_book`] echoes
/// the validated entry without storing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogueQuery;

const FIXTURE_BOOKS: [(&str, &str, &str, &str); 2] = [
    (
        "11111111-1111-1111-1111-111111111111",
        "The Hobbit",
        "J. R. R. Tolkien",
        "Fantasy",
    ),
    (
        "22222222-2222-2222-2222-222222222222",
        "Dune",
        "Frank Herbert",
        "Science Fiction",
    ),
];

fn fixture_created_at() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

fn fixture_books() -> Result<Vec<Book>, Error> {
    FIXTURE_BOOKS
        .iter()
        .map(|(id, title, author, genre)| {
            let id = id
                .parse()
                .map_err(|err| Error::internal(format!("invalid fixture book id: {err}")))?;
            Book::try_new(
                BookId::from_uuid(id),
                *title,
                *author,
                *genre,
                fixture_created_at(),
            )
            .map_err(|err| Error::internal(format!("invalid fixture book: {err}")))
        })
        .collect()
}

fn matches(book: &Book, needle: &str) -> bool {
    [book.title(), book.author(), book.genre()]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

#[async_trait]
impl CatalogueQuery for FixtureCatalogueQuery {
    async fn list_books(&self) -> Result<Vec<Book>, Error> {
        fixture_books()
    }

    async fn get_book(&self, id: &BookId) -> Result<Book, Error> {
        fixture_books()?
            .into_iter()
            .find(|book| book.id() == id)
            .ok_or_else(|| Error::not_found(format!("book {id} not found")))
    }

    async fn search_books(&self, query: &SearchQuery) -> Result<Vec<Book>, Error> {
        let needle = query.as_str().to_lowercase();
        Ok(fixture_books()?
            .into_iter()
            .filter(|book| matches(book, &needle))
            .collect())
    }
}

#[async_trait]
impl CatalogueCommand for FixtureCatalogueQuery {
    async fn add_book(&self, _caller: &AuthenticatedUser, draft: BookDraft) -> Result<Book, Error> {
        Book::try_new(
            BookId::random(),
            draft.title,
            draft.author,
            draft.genre,
            Utc::now(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))
    }
}
