//! PostgreSQL-backed `BookRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{BookPersistenceError, BookRepository};
use crate::domain::{Book, BookId, SearchQuery};

use super::models::{BookRow, NewBookRow};
use super::pool::{DbPool, PoolError};
use super::schema::books;

/// Diesel-backed implementation of the `BookRepository` port.
#[derive(Clone)]
pub struct DieselBookRepository {
    pool: DbPool,
}

impl DieselBookRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BookPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            BookPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> BookPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            BookPersistenceError::connection("database connection error")
        }
        _ => BookPersistenceError::query("database error"),
    }
}

fn row_to_book(row: BookRow) -> Result<Book, BookPersistenceError> {
    Book::try_new(
        BookId::from_uuid(row.id),
        row.title,
        row.author,
        row.genre,
        row.created_at,
    )
    .map_err(|err| BookPersistenceError::query(format!("stored book fails validation: {err}")))
}

fn rows_to_books(rows: Vec<BookRow>) -> Result<Vec<Book>, BookPersistenceError> {
    rows.into_iter().map(row_to_book).collect()
}

/// Escape `LIKE` wildcards so user input only ever matches literally.
fn like_pattern(query: &SearchQuery) -> String {
    let escaped = query
        .as_str()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl BookRepository for DieselBookRepository {
    async fn insert(&self, book: &Book) -> Result<(), BookPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewBookRow {
            id: *book.id().as_uuid(),
            title: book.title(),
            author: book.author(),
            genre: book.genre(),
            created_at: book.created_at(),
        };

        diesel::insert_into(books::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<Book>, BookPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<BookRow> = books::table
            .order(books::created_at.asc())
            .select(BookRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_books(rows)
    }

    async fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, BookPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<BookRow> = books::table
            .find(id.as_uuid())
            .select(BookRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_book).transpose()
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Book>, BookPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let pattern = like_pattern(query);

        let rows: Vec<BookRow> = books::table
            .filter(
                books::title
                    .ilike(&pattern)
                    .or(books::author.ilike(&pattern))
                    .or(books::genre.ilike(&pattern)),
            )
            .order(books::created_at.asc())
            .select(BookRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_books(rows)
    }
}
