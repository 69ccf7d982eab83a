//! Auth API handlers.
//!
//! ```text
//! POST /api/auth/signup {"username":"ada","password":"correct horse"}
//! POST /api/auth/login  {"username":"ada","password":"correct horse"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    BearerToken, Credentials, CredentialsValidationError, Error, PasswordValidationError,
    UsernameValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Request body for signup and login.
///
/// Example JSON: `{"username":"ada","password":"correct horse"}`
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    /// Login name.
    pub username: String,
    /// Plaintext password; only ever stored as a one-way hash.
    pub password: String,
}

impl TryFrom<CredentialsRequest> for Credentials {
    type Error = CredentialsValidationError;

    fn try_from(value: CredentialsRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Response body carrying a freshly minted bearer token.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// Signed, time-limited bearer token.
    pub token: String,
}

impl From<BearerToken> for TokenResponse {
    fn from(token: BearerToken) -> Self {
        Self {
            token: token.into_inner(),
        }
    }
}

fn map_credentials_validation_error(err: CredentialsValidationError) -> Error {
    let (field, code) = match &err {
        CredentialsValidationError::Username(cause) => (
            "username",
            match cause {
                UsernameValidationError::Empty => "empty_username",
                UsernameValidationError::TooShort { .. } => "username_too_short",
                UsernameValidationError::TooLong { .. } => "username_too_long",
                UsernameValidationError::InvalidCharacters => "username_invalid_characters",
            },
        ),
        CredentialsValidationError::Password(cause) => (
            "password",
            match cause {
                PasswordValidationError::Empty => "empty_password",
                PasswordValidationError::TooShort { .. } => "password_too_short",
                PasswordValidationError::TooLong { .. } => "password_too_long",
            },
        ),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

/// Register a new account and return its bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = Credentials::try_from(payload.into_inner())
        .map_err(map_credentials_validation_error)?;
    let token = state.auth.signup(credentials).await?;
    Ok(HttpResponse::Created().json(TokenResponse::from(token)))
}

/// Authenticate an account and return a fresh bearer token.
///
/// Unknown usernames and wrong passwords produce the identical response so
/// the endpoint does not reveal which part failed.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login success", body = TokenResponse),
        (status = 400, description = "Invalid request or credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = Credentials::try_from(payload.into_inner())
        .map_err(map_credentials_validation_error)?;
    let token = state.auth.login(credentials).await?;
    Ok(HttpResponse::Ok().json(TokenResponse::from(token)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::{
        FIXTURE_TOKEN, FixtureAuthGateway, FixtureCatalogueQuery, FixtureReviewLedger,
    };
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test, web};
    use rstest::rstest;
    use serde_json::Value;

    fn test_app() -> App<
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
            Arc::new(FixtureReviewLedger),
        );
        App::new().app_data(web::Data::new(state)).service(
            web::scope("/api/auth").service(signup).service(login),
        )
    }

    #[actix_web::test]
    async fn signup_returns_created_with_a_token() {
        let app = actix_test::init_service(test_app()).await;
        let req = actix_test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(&CredentialsRequest {
                username: "ada".into(),
                password: "correct horse".into(),
            })
            .to_request();

        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body.get("token").and_then(Value::as_str),
            Some(FIXTURE_TOKEN)
        );
    }

    #[actix_web::test]
    async fn login_returns_ok_with_a_token() {
        let app = actix_test::init_service(test_app()).await;
        let req = actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(&CredentialsRequest {
                username: "ada".into(),
                password: "correct horse".into(),
            })
            .to_request();

        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body.get("token").and_then(Value::as_str),
            Some(FIXTURE_TOKEN)
        );
    }

    #[rstest]
    #[case("   ", "correct horse", "username", "empty_username")]
    #[case("ab", "correct horse", "username", "username_too_short")]
    #[case("not valid", "correct horse", "username", "username_invalid_characters")]
    #[case("ada", "", "password", "empty_password")]
    #[case("ada", "short", "password", "password_too_short")]
    #[actix_web::test]
    async fn malformed_credentials_yield_field_scoped_details(
        #[case] username: &str,
        #[case] password: &str,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let app = actix_test::init_service(test_app()).await;
        let req = actix_test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(&CredentialsRequest {
                username: username.into(),
                password: password.into(),
            })
            .to_request();

        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body.get("code").and_then(Value::as_str),
            Some("invalid_request")
        );
        let details = body
            .get("details")
            .and_then(Value::as_object)
            .expect("details present");
        assert_eq!(details.get("field").and_then(Value::as_str), Some(field));
        assert_eq!(details.get("code").and_then(Value::as_str), Some(code));
    }
}
