//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] aggregate generating the OpenAPI specification for
//! the REST API: every HTTP endpoint from the inbound layer, the request and
//! response schemas, and the bearer token security scheme. The generated
//! document is exported via `cargo run --bin openapi-dump` for external
//! tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Bearer token issued by signup or login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Book catalogue backend API",
        description = "HTTP interface for browsing books and maintaining one review per user per book."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::auth::signup,
        crate::inbound::http::auth::login,
        crate::inbound::http::books::list_books,
        crate::inbound::http::books::search_books,
        crate::inbound::http::books::get_book,
        crate::inbound::http::books::add_book,
        crate::inbound::http::reviews::add_review,
        crate::inbound::http::reviews::replace_review,
        crate::inbound::http::reviews::patch_review,
        crate::inbound::http::reviews::delete_review,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::inbound::http::auth::CredentialsRequest,
        crate::inbound::http::auth::TokenResponse,
        crate::inbound::http::books::BookRequest,
        crate::inbound::http::books::BookResponse,
        crate::inbound::http::reviews::ReviewRequest,
        crate::inbound::http::reviews::ReviewPatchRequest,
        crate::inbound::http::reviews::ReviewResponse,
        crate::inbound::http::reviews::MessageResponse,
        crate::domain::Error,
        crate::domain::ErrorCode,
    )),
    tags(
        (name = "auth", description = "Signup, login, and bearer tokens"),
        (name = "books", description = "Public catalogue browsing and search"),
        (name = "reviews", description = "Owner-only review ledger operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
