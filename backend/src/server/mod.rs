//! Server construction and route wiring.

mod config;

pub use config::{AppSettings, ConfigError, ServerConfig};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::warn;

use backend::{Deadline, Trace};
use backend::domain::ports::{FixtureAuthGateway, FixtureCatalogueQuery, FixtureReviewLedger};
use backend::domain::{AuthService, CatalogueService, ReviewService};
use backend::inbound::http::auth::{login, signup};
use backend::inbound::http::books::{add_book, get_book, list_books, search_books};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::reviews::{add_review, delete_review, patch_review, replace_review};
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{
    DieselBookRepository, DieselReviewRepository, DieselUserRepository,
};
use backend::outbound::security::{JwtTokenCodec, ShaPasswordHasher};

/// Build the handler state from configuration.
///
/// With a database pool the real Diesel-backed services are wired; without
/// one the fixture ports serve canned data, which keeps the HTTP surface
/// drivable in environments with no PostgreSQL.
fn build_http_state(config: &ServerConfig) -> HttpState {
    match &config.db_pool {
        Some(pool) => {
            let users = Arc::new(DieselUserRepository::new(pool.clone()));
            let books = Arc::new(DieselBookRepository::new(pool.clone()));
            let reviews = Arc::new(DieselReviewRepository::new(pool.clone()));
            let codec = Arc::new(JwtTokenCodec::new(
                config.token_secret.as_bytes(),
                config.token_ttl,
            ));
            let catalogue = Arc::new(CatalogueService::new(books));

            HttpState::new(
                Arc::new(AuthService::new(users, Arc::new(ShaPasswordHasher), codec)),
                catalogue.clone(),
                catalogue,
                Arc::new(ReviewService::new(reviews)),
            )
        }
        None => {
            warn!("no database pool configured; serving fixture data");
            HttpState::new(
                Arc::new(FixtureAuthGateway),
                Arc::new(FixtureCatalogueQuery),
                Arc::new(FixtureCatalogueQuery),
                Arc::new(FixtureReviewLedger),
            )
        }
    }
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    request_timeout: std::time::Duration,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        request_timeout,
    } = deps;

    // Scope registration order matters: the bare `/api` scope hosts the
    // review routes, including `POST /api/{bookId}`, so the more specific
    // `/api/auth` and `/api/books` scopes must come first.
    let auth_scope = web::scope("/api/auth").service(signup).service(login);
    let books_scope = web::scope("/api/books")
        .service(list_books)
        .service(search_books)
        .service(add_book)
        .service(get_book);
    let reviews_scope = web::scope("/api")
        .service(replace_review)
        .service(patch_review)
        .service(delete_review)
        .service(add_review);

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Deadline::new(request_timeout))
        .wrap(Trace)
        .service(auth_scope)
        .service(books_scope)
        .service(reviews_scope)
        .service(ready)
        .service(live)
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&config));
    let request_timeout = config.request_timeout;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            request_timeout,
        })
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
