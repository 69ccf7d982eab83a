//! Catalogue API handlers.
//!
//! ```text
//! GET  /api/books
//! GET  /api/books/search?q=tolkien
//! GET  /api/books/{id}
//! POST /api/books          (authenticated)
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{AuthenticatedUser, Book, BookDraft, BookId, Error, SearchQuery};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Catalogue entry response payload.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    /// Stable book identifier.
    pub id: Uuid,
    /// Book title.
    pub title: String,
    /// Book author.
    pub author: String,
    /// Genre label.
    pub genre: String,
    /// Catalogue entry creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: *book.id().as_uuid(),
            title: book.title().to_owned(),
            author: book.author().to_owned(),
            genre: book.genre().to_owned(),
            created_at: book.created_at(),
        }
    }
}

fn to_responses(books: Vec<Book>) -> Vec<BookResponse> {
    books.into_iter().map(BookResponse::from).collect()
}

/// Request body for adding a catalogue entry.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    /// Book title.
    pub title: String,
    /// Book author.
    pub author: String,
    /// Genre label.
    pub genre: String,
}

/// Query string accepted by the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Free-text search term.
    #[serde(default)]
    pub q: String,
}

/// List the whole catalogue.
#[utoipa::path(
    get,
    path = "/api/books",
    responses(
        (status = 200, description = "Catalogue entries", body = [BookResponse]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["books"],
    operation_id = "listBooks",
    security([])
)]
#[get("")]
pub async fn list_books(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<BookResponse>>> {
    let books = state.catalogue.list_books().await?;
    Ok(web::Json(to_responses(books)))
}

/// Search the catalogue by title, author, or genre.
///
/// Matching is a case-insensitive substring check against all three fields.
#[utoipa::path(
    get,
    path = "/api/books/search",
    params(("q" = String, Query, description = "Free-text search term")),
    responses(
        (status = 200, description = "Matching catalogue entries", body = [BookResponse]),
        (status = 400, description = "Missing or blank query", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["books"],
    operation_id = "searchBooks",
    security([])
)]
#[get("/search")]
pub async fn search_books(
    state: web::Data<HttpState>,
    params: web::Query<SearchParams>,
) -> ApiResult<web::Json<Vec<BookResponse>>> {
    let query = SearchQuery::new(&params.q).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "q" }))
    })?;
    let books = state.catalogue.search_books(&query).await?;
    Ok(web::Json(to_responses(books)))
}

/// Fetch a single catalogue entry.
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = Uuid, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Catalogue entry", body = BookResponse),
        (status = 404, description = "Book not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["books"],
    operation_id = "getBook",
    security([])
)]
#[get("/{id}")]
pub async fn get_book(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<BookResponse>> {
    let id = BookId::from_uuid(path.into_inner());
    let book = state.catalogue.get_book(&id).await?;
    Ok(web::Json(BookResponse::from(book)))
}

/// Add a catalogue entry on behalf of the authenticated caller.
#[utoipa::path(
    post,
    path = "/api/books",
    request_body = BookRequest,
    responses(
        (status = 201, description = "Catalogue entry created", body = BookResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["books"],
    operation_id = "addBook",
    security(("BearerAuth" = []))
)]
#[post("")]
pub async fn add_book(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<BookRequest>,
) -> ApiResult<HttpResponse> {
    let BookRequest {
        title,
        author,
        genre,
    } = payload.into_inner();
    let book = state
        .catalogue_command
        .add_book(
            &caller,
            BookDraft {
                title,
                author,
                genre,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(BookResponse::from(book)))
}
