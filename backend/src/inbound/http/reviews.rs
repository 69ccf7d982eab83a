//! Review API handlers.
//!
//! ```text
//! POST   /api/{bookId}          (authenticated)
//! PUT    /api/reviews/{id}      (authenticated, owner only)
//! PATCH  /api/reviews/{id}      (authenticated, owner only)
//! DELETE /api/reviews/{id}      (authenticated, owner only)
//! ```
//!
//! The caller identity always comes from the bearer token via the
//! [`AuthenticatedUser`] extractor; request bodies cannot name a user.

use actix_web::{HttpResponse, delete, patch, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    AuthenticatedUser, BookId, Error, Review, ReviewId, ReviewPatch, ReviewSubmission,
    ReviewValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Ledger entry response payload.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    /// Stable review identifier.
    pub id: Uuid,
    /// Owning user; fixed at creation.
    pub user_id: Uuid,
    /// Reviewed book; fixed at creation.
    pub book_id: Uuid,
    /// Star rating.
    pub rating: i16,
    /// Optional free-text comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: *review.id().as_uuid(),
            user_id: *review.user_id().as_uuid(),
            book_id: *review.book_id().as_uuid(),
            rating: review.rating().value(),
            comment: review.comment().map(ToOwned::to_owned),
            created_at: review.created_at(),
            updated_at: review.updated_at(),
        }
    }
}

/// Request body for submitting a review.
///
/// Unknown fields are rejected so a request cannot smuggle in ownership or
/// identity fields.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReviewRequest {
    /// Star rating between 1 and 5.
    pub rating: i16,
    /// Optional free-text comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Request body for patching a review; only the mutable fields exist.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReviewPatchRequest {
    /// Replacement rating, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i16>,
    /// Replacement comment, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Acknowledgement body for deletions.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    /// Human-readable acknowledgement.
    pub message: String,
}

fn map_review_validation_error(err: ReviewValidationError) -> Error {
    let field = match err {
        ReviewValidationError::RatingOutOfRange { .. } => "rating",
        ReviewValidationError::CommentTooLong { .. } => "comment",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// Record the caller's review of a book.
#[utoipa::path(
    post,
    path = "/api/{bookId}",
    params(("bookId" = Uuid, Path, description = "Book identifier")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review recorded", body = ReviewResponse),
        (status = 400, description = "Invalid request or duplicate review", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Book not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "addReview",
    security(("BearerAuth" = []))
)]
#[post("/{book_id}")]
pub async fn add_review(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: web::Json<ReviewRequest>,
) -> ApiResult<HttpResponse> {
    let book_id = BookId::from_uuid(path.into_inner());
    let ReviewRequest { rating, comment } = payload.into_inner();
    let submission =
        ReviewSubmission::try_new(rating, comment).map_err(map_review_validation_error)?;

    let review = state.reviews.add_review(&caller, book_id, submission).await?;
    Ok(HttpResponse::Created().json(ReviewResponse::from(review)))
}

async fn apply_review_patch(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    review_id: Uuid,
    request: ReviewPatchRequest,
) -> ApiResult<web::Json<ReviewResponse>> {
    let patch = ReviewPatch::try_new(request.rating, request.comment)
        .map_err(map_review_validation_error)?;
    let review = state
        .reviews
        .update_review(&caller, ReviewId::from_uuid(review_id), patch)
        .await?;
    Ok(web::Json(ReviewResponse::from(review)))
}

/// Replace the mutable fields of the caller's review.
#[utoipa::path(
    put,
    path = "/api/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review identifier")),
    request_body = ReviewPatchRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Review belongs to another user", body = Error),
        (status = 404, description = "Review not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "replaceReview",
    security(("BearerAuth" = []))
)]
#[put("/reviews/{id}")]
pub async fn replace_review(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: web::Json<ReviewPatchRequest>,
) -> ApiResult<web::Json<ReviewResponse>> {
    apply_review_patch(state, caller, path.into_inner(), payload.into_inner()).await
}

/// Patch the mutable fields of the caller's review.
#[utoipa::path(
    patch,
    path = "/api/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review identifier")),
    request_body = ReviewPatchRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Review belongs to another user", body = Error),
        (status = 404, description = "Review not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "patchReview",
    security(("BearerAuth" = []))
)]
#[patch("/reviews/{id}")]
pub async fn patch_review(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: web::Json<ReviewPatchRequest>,
) -> ApiResult<web::Json<ReviewResponse>> {
    apply_review_patch(state, caller, path.into_inner(), payload.into_inner()).await
}

/// Permanently delete the caller's review, freeing the `(user, book)` slot.
#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review identifier")),
    responses(
        (status = 200, description = "Review deleted", body = MessageResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Review belongs to another user", body = Error),
        (status = 404, description = "Review not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "deleteReview",
    security(("BearerAuth" = []))
)]
#[delete("/reviews/{id}")]
pub async fn delete_review(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<MessageResponse>> {
    state
        .reviews
        .delete_review(&caller, ReviewId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(MessageResponse {
        message: "review deleted".into(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::{
        FIXTURE_TOKEN, FixtureAuthGateway, FixtureCatalogueQuery, FixtureReviewLedger,
        ReviewLedger,
    };
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::{App, test as actix_test, web};
    use async_trait::async_trait;
    use rstest::rstest;
    use serde_json::Value;

    /// Ledger double that reports every mutation as foreign-owned.
    #[derive(Debug, Default, Clone, Copy)]
    struct ForbiddenLedger;

    #[async_trait]
    impl ReviewLedger for ForbiddenLedger {
        async fn add_review(
            &self,
            _caller: &AuthenticatedUser,
            _book_id: BookId,
            _submission: ReviewSubmission,
        ) -> Result<Review, Error> {
            Err(Error::duplicate_review("a review for this book already exists"))
        }

        async fn update_review(
            &self,
            _caller: &AuthenticatedUser,
            _review_id: ReviewId,
            _patch: ReviewPatch,
        ) -> Result<Review, Error> {
            Err(Error::forbidden("review belongs to another user"))
        }

        async fn delete_review(
            &self,
            _caller: &AuthenticatedUser,
            _review_id: ReviewId,
        ) -> Result<(), Error> {
            Err(Error::forbidden("review belongs to another user"))
        }
    }

    fn app_with_ledger(
        ledger: Arc<dyn ReviewLedger>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let state = HttpState::new(
            Arc::new(FixtureAuthGateway),
            Arc::new(FixtureCatalogueQuery),
            Arc::new(FixtureCatalogueQuery),
            ledger,
        );
        App::new().app_data(web::Data::new(state)).service(
            web::scope("/api")
                .service(replace_review)
                .service(patch_review)
                .service(delete_review)
                .service(add_review),
        )
    }

    fn bearer() -> (actix_web::http::header::HeaderName, String) {
        (AUTHORIZATION, format!("Bearer {FIXTURE_TOKEN}"))
    }

    #[actix_web::test]
    async fn add_review_returns_created_with_caller_identity() {
        let app = actix_test::init_service(app_with_ledger(Arc::new(FixtureReviewLedger))).await;
        let req = actix_test::TestRequest::post()
            .uri("/api/11111111-1111-1111-1111-111111111111")
            .insert_header(bearer())
            .set_json(&ReviewRequest {
                rating: 5,
                comment: Some("superb".into()),
            })
            .to_request();

        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("rating").and_then(Value::as_i64), Some(5));
        assert_eq!(
            body.get("bookId").and_then(Value::as_str),
            Some("11111111-1111-1111-1111-111111111111")
        );
        assert!(body.get("userId").is_some());
    }

    #[actix_web::test]
    async fn add_review_without_token_is_unauthorised() {
        let app = actix_test::init_service(app_with_ledger(Arc::new(FixtureReviewLedger))).await;
        let req = actix_test::TestRequest::post()
            .uri("/api/11111111-1111-1111-1111-111111111111")
            .set_json(&ReviewRequest {
                rating: 5,
                comment: None,
            })
            .to_request();

        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[actix_web::test]
    async fn out_of_range_ratings_are_rejected(#[case] rating: i16) {
        let app = actix_test::init_service(app_with_ledger(Arc::new(FixtureReviewLedger))).await;
        let req = actix_test::TestRequest::post()
            .uri("/api/11111111-1111-1111-1111-111111111111")
            .insert_header(bearer())
            .set_json(&ReviewRequest {
                rating,
                comment: None,
            })
            .to_request();

        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        let details = body
            .get("details")
            .and_then(Value::as_object)
            .expect("details present");
        assert_eq!(details.get("field").and_then(Value::as_str), Some("rating"));
    }

    #[actix_web::test]
    async fn duplicate_review_maps_to_bad_request() {
        let app = actix_test::init_service(app_with_ledger(Arc::new(ForbiddenLedger))).await;
        let req = actix_test::TestRequest::post()
            .uri("/api/11111111-1111-1111-1111-111111111111")
            .insert_header(bearer())
            .set_json(&ReviewRequest {
                rating: 5,
                comment: None,
            })
            .to_request();

        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body.get("code").and_then(Value::as_str),
            Some("duplicate_review")
        );
    }

    #[rstest]
    #[case::put(actix_test::TestRequest::put())]
    #[case::patch(actix_test::TestRequest::patch())]
    #[actix_web::test]
    async fn foreign_updates_are_forbidden(#[case] request: actix_test::TestRequest) {
        let app = actix_test::init_service(app_with_ledger(Arc::new(ForbiddenLedger))).await;
        let req = request
            .uri("/api/reviews/33333333-3333-3333-3333-333333333333")
            .insert_header(bearer())
            .set_json(&ReviewPatchRequest {
                rating: Some(1),
                comment: None,
            })
            .to_request();

        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn deleting_a_missing_review_is_not_found() {
        let app = actix_test::init_service(app_with_ledger(Arc::new(FixtureReviewLedger))).await;
        let req = actix_test::TestRequest::delete()
            .uri("/api/reviews/33333333-3333-3333-3333-333333333333")
            .insert_header(bearer())
            .to_request();

        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn unknown_patch_fields_are_rejected() {
        let app = actix_test::init_service(app_with_ledger(Arc::new(FixtureReviewLedger))).await;
        let req = actix_test::TestRequest::put()
            .uri("/api/reviews/33333333-3333-3333-3333-333333333333")
            .insert_header(bearer())
            .set_json(serde_json::json!({ "rating": 4, "userId": "smuggled" }))
            .to_request();

        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
