//! Driving port for the review ledger use-cases.
//!
//! Every operation takes an [`AuthenticatedUser`] capability. Handlers cannot
//! reach the ledger without one, and the ledger re-verifies ownership against
//! the stored record on every mutation.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    AuthenticatedUser, BookId, Error, Review, ReviewId, ReviewPatch, ReviewSubmission,
};

/// Domain use-case port for the review ledger.
#[async_trait]
pub trait ReviewLedger: Send + Sync {
    /// Record the caller's review of a book.
    ///
    /// Fails with a duplicate-review error when the caller already holds a
    /// review for this book, and with not-found when the book reference does
    /// not resolve.
    async fn add_review(
        &self,
        caller: &AuthenticatedUser,
        book_id: BookId,
        submission: ReviewSubmission,
    ) -> Result<Review, Error>;

    /// Apply a patch to the caller's review.
    ///
    /// Fails with not-found when no such review exists and forbidden when the
    /// stored owner differs from the caller.
    async fn update_review(
        &self,
        caller: &AuthenticatedUser,
        review_id: ReviewId,
        patch: ReviewPatch,
    ) -> Result<Review, Error>;

    /// Permanently remove the caller's review, freeing the `(user, book)`
    /// slot.
    ///
    /// Same not-found/forbidden semantics as updating.
    async fn delete_review(
        &self,
        caller: &AuthenticatedUser,
        review_id: ReviewId,
    ) -> Result<(), Error>;
}

/// Stateless ledger used by handler tests and no-database startup.
///
/// Accepts every submission without recording it; updates and deletes report
/// not-found because nothing is ever stored.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReviewLedger;

#[async_trait]
impl ReviewLedger for FixtureReviewLedger {
    async fn add_review(
        &self,
        caller: &AuthenticatedUser,
        book_id: BookId,
        submission: ReviewSubmission,
    ) -> Result<Review, Error> {
        Ok(Review::new(
            ReviewId::random(),
            *caller.user_id(),
            book_id,
            submission,
            Utc::now(),
        ))
    }

    async fn update_review(
        &self,
        _caller: &AuthenticatedUser,
        review_id: ReviewId,
        _patch: ReviewPatch,
    ) -> Result<Review, Error> {
        Err(Error::not_found(format!("review {review_id} not found")))
    }

    async fn delete_review(
        &self,
        _caller: &AuthenticatedUser,
        review_id: ReviewId,
    ) -> Result<(), Error> {
        Err(Error::not_found(format!("review {review_id} not found")))
    }
}
