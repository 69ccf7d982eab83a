//! PostgreSQL-backed `ReviewRepository` implementation using Diesel ORM.
//!
//! The ledger's uniqueness invariant is enforced here by the database: the
//! unique index on `(user_id, book_id)` turns a duplicate insert into
//! [`ReviewPersistenceError::Duplicate`], and the foreign key on `book_id`
//! turns a dangling book reference into
//! [`ReviewPersistenceError::UnknownBook`]. There is no check-then-insert
//! window for concurrent submissions to race through.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{ReviewPersistenceError, ReviewRepository};
use crate::domain::{BookId, Rating, Review, ReviewId, ReviewPatch, UserId};

use super::models::{NewReviewRow, ReviewChangeset, ReviewRow};
use super::pool::{DbPool, PoolError};
use super::schema::reviews;

/// Diesel-backed implementation of the `ReviewRepository` port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReviewPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            ReviewPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> ReviewPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ReviewPersistenceError::Duplicate
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            // The user id comes from a verified token and accounts are never
            // deleted, so a foreign key failure can only be the book.
            if info
                .constraint_name()
                .is_none_or(|name| name.contains("book"))
            {
                ReviewPersistenceError::UnknownBook
            } else {
                ReviewPersistenceError::query("foreign key violation")
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            ReviewPersistenceError::connection("database connection error")
        }
        _ => ReviewPersistenceError::query("database error"),
    }
}

fn row_to_review(row: ReviewRow) -> Result<Review, ReviewPersistenceError> {
    let rating = Rating::try_new(row.rating).map_err(|err| {
        ReviewPersistenceError::query(format!("stored rating fails validation: {err}"))
    })?;
    Ok(Review::from_storage(
        ReviewId::from_uuid(row.id),
        UserId::from_uuid(row.user_id),
        BookId::from_uuid(row.book_id),
        rating,
        row.comment,
        row.created_at,
        row.updated_at,
    ))
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn insert(&self, review: &Review) -> Result<(), ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewReviewRow {
            id: *review.id().as_uuid(),
            user_id: *review.user_id().as_uuid(),
            book_id: *review.book_id().as_uuid(),
            rating: review.rating().value(),
            comment: review.comment(),
            created_at: review.created_at(),
            updated_at: review.updated_at(),
        };

        diesel::insert_into(reviews::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ReviewRow> = reviews::table
            .find(id.as_uuid())
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_review).transpose()
    }

    async fn update(
        &self,
        id: &ReviewId,
        patch: &ReviewPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Review>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = ReviewChangeset {
            rating: patch.rating.map(|rating| rating.value()),
            comment: patch.comment.as_deref(),
            updated_at,
        };

        let row: Option<ReviewRow> = diesel::update(reviews::table.find(id.as_uuid()))
            .set(&changeset)
            .returning(ReviewRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_review).transpose()
    }

    async fn delete(&self, id: &ReviewId) -> Result<bool, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::delete(reviews::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(affected > 0)
    }
}
