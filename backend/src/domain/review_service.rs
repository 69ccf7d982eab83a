//! Review ledger service: the ownership and uniqueness contract.
//!
//! Ownership is always re-verified here by comparing the stored `user_id`
//! against the caller capability; the caller never supplies its own identity
//! directly. Uniqueness is delegated to the persistence layer's constraint so
//! concurrent duplicate submissions cannot race past an existence check.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::domain::ports::{ReviewLedger, ReviewPersistenceError, ReviewRepository};
use crate::domain::{
    AuthenticatedUser, BookId, Error, Review, ReviewId, ReviewPatch, ReviewSubmission,
};

fn map_repository_error(error: ReviewPersistenceError) -> Error {
    match error {
        ReviewPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("review ledger unavailable: {message}"))
        }
        ReviewPersistenceError::Query { message } => {
            Error::internal(format!("review ledger error: {message}"))
        }
        ReviewPersistenceError::Duplicate => {
            Error::duplicate_review("a review for this book already exists")
        }
        ReviewPersistenceError::UnknownBook => Error::not_found("book not found"),
    }
}

/// Review ledger implementation over a review repository.
#[derive(Clone)]
pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
}

impl ReviewService {
    /// Create a new service over the given repository.
    pub fn new(reviews: Arc<dyn ReviewRepository>) -> Self {
        Self { reviews }
    }

    /// Fetch a review and verify the caller owns it.
    ///
    /// Absence and foreign ownership are reported distinctly: a missing
    /// review is `NotFound`, someone else's review is `Forbidden`.
    async fn owned_review(
        &self,
        caller: &AuthenticatedUser,
        review_id: &ReviewId,
    ) -> Result<Review, Error> {
        let review = self
            .reviews
            .find_by_id(review_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("review {review_id} not found")))?;

        if review.user_id() != caller.user_id() {
            return Err(Error::forbidden("review belongs to another user"));
        }

        Ok(review)
    }
}

#[async_trait]
impl ReviewLedger for ReviewService {
    async fn add_review(
        &self,
        caller: &AuthenticatedUser,
        book_id: BookId,
        submission: ReviewSubmission,
    ) -> Result<Review, Error> {
        let review = Review::new(
            ReviewId::random(),
            *caller.user_id(),
            book_id,
            submission,
            Utc::now(),
        );

        self.reviews
            .insert(&review)
            .await
            .map_err(map_repository_error)?;

        info!(
            review_id = %review.id(),
            user_id = %review.user_id(),
            book_id = %review.book_id(),
            "review recorded"
        );
        Ok(review)
    }

    async fn update_review(
        &self,
        caller: &AuthenticatedUser,
        review_id: ReviewId,
        patch: ReviewPatch,
    ) -> Result<Review, Error> {
        let current = self.owned_review(caller, &review_id).await?;

        if patch.is_empty() {
            // Nothing to change; echo the stored entry without a write.
            return Ok(current);
        }

        self.reviews
            .update(&review_id, &patch, Utc::now())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("review {review_id} not found")))
    }

    async fn delete_review(
        &self,
        caller: &AuthenticatedUser,
        review_id: ReviewId,
    ) -> Result<(), Error> {
        let review = self.owned_review(caller, &review_id).await?;

        let removed = self
            .reviews
            .delete(&review_id)
            .await
            .map_err(map_repository_error)?;
        if !removed {
            return Err(Error::not_found(format!("review {review_id} not found")));
        }

        info!(
            review_id = %review.id(),
            user_id = %review.user_id(),
            book_id = %review.book_id(),
            "review deleted"
        );
        Ok(())
    }
}
