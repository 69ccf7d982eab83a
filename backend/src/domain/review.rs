//! Review aggregate: the one-review-per-user-per-book ledger entry.
//!
//! ## Invariants
//! - At most one review exists for a given `(user_id, book_id)` pair,
//!   enforced by the persistence layer's unique constraint.
//! - `user_id` and `book_id` are fixed at creation and never reassigned.
//! - Only `rating` and `comment` are mutable, via an explicit [`ReviewPatch`].

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{BookId, UserId};

/// Lowest accepted rating.
pub const RATING_MIN: i16 = 1;
/// Highest accepted rating.
pub const RATING_MAX: i16 = 5;
/// Maximum allowed length for a review comment.
pub const COMMENT_MAX: usize = 4000;

/// Validation errors returned by the review constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewValidationError {
    /// Rating falls outside the accepted range.
    #[error("rating must be between {min} and {max}")]
    RatingOutOfRange {
        /// Lowest accepted rating.
        min: i16,
        /// Highest accepted rating.
        max: i16,
    },
    /// Comment exceeds the accepted length.
    #[error("comment must be at most {max} characters")]
    CommentTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

/// Stable review identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ReviewId(Uuid);

impl ReviewId {
    /// Construct a [`ReviewId`] from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`ReviewId`].
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

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Star rating between [`RATING_MIN`] and [`RATING_MAX`] inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub struct Rating(i16);

impl Rating {
    /// Validate and construct a [`Rating`].
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Rating;
    ///
    /// assert!(Rating::try_new(5).is_ok());
    /// assert!(Rating::try_new(0).is_err());
    /// ```
    pub fn try_new(value: i16) -> Result<Self, ReviewValidationError> {
        if !(RATING_MIN..=RATING_MAX).contains(&value) {
            return Err(ReviewValidationError::RatingOutOfRange {
                min: RATING_MIN,
                max: RATING_MAX,
            });
        }
        Ok(Self(value))
    }

    /// Numeric rating value.
    #[must_use]
    pub fn value(&self) -> i16 {
        self.0
    }
}

fn validated_comment(comment: Option<String>) -> Result<Option<String>, ReviewValidationError> {
    match comment {
        Some(text) if text.chars().count() > COMMENT_MAX => {
            Err(ReviewValidationError::CommentTooLong { max: COMMENT_MAX })
        }
        other => Ok(other),
    }
}

/// Validated payload for creating a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSubmission {
    /// Star rating.
    pub rating: Rating,
    /// Optional free-text comment.
    pub comment: Option<String>,
}

impl ReviewSubmission {
    /// Validate raw submission fields.
    pub fn try_new(rating: i16, comment: Option<String>) -> Result<Self, ReviewValidationError> {
        Ok(Self {
            rating: Rating::try_new(rating)?,
            comment: validated_comment(comment)?,
        })
    }
}

/// Explicit patch naming only the mutable review fields.
///
/// A field left as `None` is untouched. The patch deliberately has no way to
/// address `user_id` or `book_id`; ownership and the book reference are
/// permanent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPatch {
    /// Replacement rating, when present.
    pub rating: Option<Rating>,
    /// Replacement comment, when present.
    pub comment: Option<String>,
}

impl ReviewPatch {
    /// Validate raw patch fields.
    pub fn try_new(
        rating: Option<i16>,
        comment: Option<String>,
    ) -> Result<Self, ReviewValidationError> {
        Ok(Self {
            rating: rating.map(Rating::try_new).transpose()?,
            comment: validated_comment(comment)?,
        })
    }

    /// Whether the patch names no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.comment.is_none()
    }
}

/// Ledger entry recording one user's review of one book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    id: ReviewId,
    user_id: UserId,
    book_id: BookId,
    rating: Rating,
    comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Review {
    /// Build a new [`Review`] from validated components.
    #[must_use]
    pub fn new(
        id: ReviewId,
        user_id: UserId,
        book_id: BookId,
        submission: ReviewSubmission,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            book_id,
            rating: submission.rating,
            comment: submission.comment,
            created_at,
            updated_at: created_at,
        }
    }

    /// Reassemble a [`Review`] from stored fields.
    ///
    /// Intended for persistence adapters reading rows back out of storage.
    #[must_use]
    pub fn from_storage(
        id: ReviewId,
        user_id: UserId,
        book_id: BookId,
        rating: Rating,
        comment: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            book_id,
            rating,
            comment,
            created_at,
            updated_at,
        }
    }

    /// Apply a patch, returning the updated review.
    ///
    /// Only `rating` and `comment` can change; identity and ownership fields
    /// carry over untouched.
    #[must_use]
    pub fn with_patch(mut self, patch: ReviewPatch, updated_at: DateTime<Utc>) -> Self {
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(comment) = patch.comment {
            self.comment = Some(comment);
        }
        self.updated_at = updated_at;
        self
    }

    /// Stable review identifier.
    #[must_use]
    pub fn id(&self) -> &ReviewId {
        &self.id
    }

    /// Owning user; fixed at creation.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Reviewed book; fixed at creation.
    #[must_use]
    pub fn book_id(&self) -> &BookId {
        &self.book_id
    }

    /// Star rating.
    #[must_use]
    pub fn rating(&self) -> Rating {
        self.rating
    }

    /// Optional free-text comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[case(-1)]
    fn out_of_range_ratings_are_rejected(#[case] value: i16) {
        let err = Rating::try_new(value).expect_err("out of range rejected");
        assert_eq!(
            err,
            ReviewValidationError::RatingOutOfRange {
                min: RATING_MIN,
                max: RATING_MAX,
            }
        );
    }

    #[rstest]
    fn overlong_comment_is_rejected() {
        let comment = "x".repeat(COMMENT_MAX + 1);
        let err = ReviewSubmission::try_new(4, Some(comment)).expect_err("overlong comment");
        assert_eq!(err, ReviewValidationError::CommentTooLong { max: COMMENT_MAX });
    }

    #[rstest]
    fn patch_leaves_identity_untouched() {
        let submission = ReviewSubmission::try_new(3, Some("decent".into())).expect("valid");
        let created_at = Utc::now();
        let review = Review::new(
            ReviewId::random(),
            UserId::random(),
            BookId::random(),
            submission,
            created_at,
        );
        let id = *review.id();
        let user_id = *review.user_id();
        let book_id = *review.book_id();

        let patch = ReviewPatch::try_new(Some(5), Some("superb".into())).expect("valid patch");
        let later = created_at + chrono::Duration::seconds(60);
        let updated = review.with_patch(patch, later);

        assert_eq!(updated.id(), &id);
        assert_eq!(updated.user_id(), &user_id);
        assert_eq!(updated.book_id(), &book_id);
        assert_eq!(updated.rating().value(), 5);
        assert_eq!(updated.comment(), Some("superb"));
        assert_eq!(updated.created_at(), created_at);
        assert_eq!(updated.updated_at(), later);
    }

    #[rstest]
    fn partial_patch_keeps_remaining_fields() {
        let submission = ReviewSubmission::try_new(2, Some("slow start".into())).expect("valid");
        let review = Review::new(
            ReviewId::random(),
            UserId::random(),
            BookId::random(),
            submission,
            Utc::now(),
        );

        let patch = ReviewPatch::try_new(Some(4), None).expect("valid patch");
        let updated = review.with_patch(patch, Utc::now());

        assert_eq!(updated.rating().value(), 4);
        assert_eq!(updated.comment(), Some("slow start"));
    }

    #[rstest]
    fn empty_patch_reports_itself() {
        let patch = ReviewPatch::try_new(None, None).expect("valid patch");
        assert!(patch.is_empty());
    }
}
