//! End-to-end API flow over in-memory repositories.
//!
//! These tests wire the real domain services, JWT codec, and password hasher
//! behind the HTTP handlers, swapping only the PostgreSQL repositories for
//! in-memory equivalents that enforce the same constraints (username
//! uniqueness, one review per user per book, book foreign key).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test as actix_test, web};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use backend::domain::ports::{
    BookPersistenceError, BookRepository, ReviewPersistenceError, ReviewRepository,
    UserPersistenceError, UserRepository,
};
use backend::domain::{
    AuthService, Book, BookId, CatalogueService, Review, ReviewId, ReviewPatch, ReviewService,
    SearchQuery, User, Username,
};
use backend::inbound::http::auth::{login, signup};
use backend::inbound::http::books::{add_book, get_book, list_books, search_books};
use backend::inbound::http::reviews::{add_review, delete_review, patch_review, replace_review};
use backend::inbound::http::state::HttpState;
use backend::outbound::security::{JwtTokenCodec, ShaPasswordHasher};

#[derive(Default)]
struct InMemoryUserRepository {
    rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut rows = self.rows.lock().expect("users lock");
        if rows.iter().any(|row| row.username() == user.username()) {
            return Err(UserPersistenceError::UsernameTaken);
        }
        rows.push(user.clone());
        Ok(())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("users lock")
            .iter()
            .find(|row| row.username() == username)
            .cloned())
    }
}

#[derive(Default)]
struct InMemoryBookRepository {
    rows: Mutex<Vec<Book>>,
}

impl InMemoryBookRepository {
    fn seeded(books: Vec<Book>) -> Self {
        Self {
            rows: Mutex::new(books),
        }
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn insert(&self, book: &Book) -> Result<(), BookPersistenceError> {
        self.rows.lock().expect("books lock").push(book.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Book>, BookPersistenceError> {
        Ok(self.rows.lock().expect("books lock").clone())
    }

    async fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, BookPersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("books lock")
            .iter()
            .find(|book| book.id() == id)
            .cloned())
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Book>, BookPersistenceError> {
        let needle = query.as_str().to_lowercase();
        Ok(self
            .rows
            .lock()
            .expect("books lock")
            .iter()
            .filter(|book| {
                [book.title(), book.author(), book.genre()]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }
}

/// Review store enforcing the same constraints as the database schema.
struct InMemoryReviewRepository {
    rows: Mutex<HashMap<ReviewId, Review>>,
    books: Arc<InMemoryBookRepository>,
}

impl InMemoryReviewRepository {
    fn new(books: Arc<InMemoryBookRepository>) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            books,
        }
    }
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn insert(&self, review: &Review) -> Result<(), ReviewPersistenceError> {
        let known_book = self
            .books
            .find_by_id(review.book_id())
            .await
            .map_err(|err| ReviewPersistenceError::query(err.to_string()))?
            .is_some();
        if !known_book {
            return Err(ReviewPersistenceError::UnknownBook);
        }

        let mut rows = self.rows.lock().expect("reviews lock");
        if rows
            .values()
            .any(|row| row.user_id() == review.user_id() && row.book_id() == review.book_id())
        {
            return Err(ReviewPersistenceError::Duplicate);
        }
        rows.insert(*review.id(), review.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, ReviewPersistenceError> {
        Ok(self.rows.lock().expect("reviews lock").get(id).cloned())
    }

    async fn update(
        &self,
        id: &ReviewId,
        patch: &ReviewPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Review>, ReviewPersistenceError> {
        let mut rows = self.rows.lock().expect("reviews lock");
        let Some(current) = rows.get(id).cloned() else {
            return Ok(None);
        };
        let updated = current.with_patch(patch.clone(), updated_at);
        rows.insert(*id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: &ReviewId) -> Result<bool, ReviewPersistenceError> {
        Ok(self.rows.lock().expect("reviews lock").remove(id).is_some())
    }
}

fn seeded_books() -> Vec<Book> {
    vec![
        Book::try_new(
            BookId::random(),
            "The Hobbit",
            "J. R. R. Tolkien",
            "Fantasy",
            Utc::now(),
        )
        .expect("valid book"),
        Book::try_new(
            BookId::random(),
            "Dune",
            "Frank Herbert",
            "Science Fiction",
            Utc::now(),
        )
        .expect("valid book"),
    ]
}

fn test_state(books: Vec<Book>) -> HttpState {
    let users = Arc::new(InMemoryUserRepository::default());
    let book_repo = Arc::new(InMemoryBookRepository::seeded(books));
    let reviews = Arc::new(InMemoryReviewRepository::new(book_repo.clone()));
    let codec = Arc::new(JwtTokenCodec::new(
        b"integration-test-secret",
        chrono::Duration::hours(24),
    ));
    let catalogue = Arc::new(CatalogueService::new(book_repo));

    HttpState::new(
        Arc::new(AuthService::new(users, Arc::new(ShaPasswordHasher), codec)),
        catalogue.clone(),
        catalogue,
        Arc::new(ReviewService::new(reviews)),
    )
}

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .service(web::scope("/api/auth").service(signup).service(login))
        .service(
            web::scope("/api/books")
                .service(list_books)
                .service(search_books)
                .service(add_book)
                .service(get_book),
        )
        .service(
            web::scope("/api")
                .service(replace_review)
                .service(patch_review)
                .service(delete_review)
                .service(add_review),
        )
}

async fn signup_for_token(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    username: &str,
    password: &str,
) -> String {
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({ "username": username, "password": password }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(res).await;
    body.get("token")
        .and_then(Value::as_str)
        .expect("token in signup response")
        .to_owned()
}

fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

#[actix_web::test]
async fn review_lifecycle_enforces_uniqueness_and_frees_the_slot() {
    let books = seeded_books();
    let hobbit = books.first().expect("seeded book").id().to_string();
    let app = actix_test::init_service(test_app(test_state(books))).await;

    let alice = signup_for_token(&app, "alice", "password-one").await;

    // First review is accepted.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/{hobbit}"))
            .insert_header(bearer(&alice))
            .set_json(json!({ "rating": 5, "comment": "superb" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = actix_test::read_body_json(res).await;
    let review_id = created
        .get("id")
        .and_then(Value::as_str)
        .expect("review id")
        .to_owned();

    // A second review for the same book is rejected with 400.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/{hobbit}"))
            .insert_header(bearer(&alice))
            .set_json(json!({ "rating": 4 }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("duplicate_review")
    );

    // Deleting frees the slot…
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/reviews/{review_id}"))
            .insert_header(bearer(&alice))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("review deleted")
    );

    // …so reviewing the same book again succeeds.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/{hobbit}"))
            .insert_header(bearer(&alice))
            .set_json(json!({ "rating": 4, "comment": "on reread" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn updates_preserve_identity_and_reject_foreign_callers() {
    let books = seeded_books();
    let hobbit = books.first().expect("seeded book").id().to_string();
    let app = actix_test::init_service(test_app(test_state(books))).await;

    let alice = signup_for_token(&app, "alice", "password-one").await;
    let bob = signup_for_token(&app, "bob", "password-two").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/{hobbit}"))
            .insert_header(bearer(&alice))
            .set_json(json!({ "rating": 2, "comment": "slow start" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = actix_test::read_body_json(res).await;
    let review_id = created
        .get("id")
        .and_then(Value::as_str)
        .expect("review id")
        .to_owned();

    // Bob can neither update nor delete Alice's review.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/reviews/{review_id}"))
            .insert_header(bearer(&bob))
            .set_json(json!({ "rating": 1 }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/reviews/{review_id}"))
            .insert_header(bearer(&bob))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Alice's patch updates the mutable fields and nothing else.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/reviews/{review_id}"))
            .insert_header(bearer(&alice))
            .set_json(json!({ "rating": 4, "comment": "grew on me" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = actix_test::read_body_json(res).await;
    assert_eq!(updated.get("id"), created.get("id"));
    assert_eq!(updated.get("userId"), created.get("userId"));
    assert_eq!(updated.get("bookId"), created.get("bookId"));
    assert_eq!(updated.get("rating").and_then(Value::as_i64), Some(4));
    assert_eq!(
        updated.get("comment").and_then(Value::as_str),
        Some("grew on me")
    );

    // Smuggling an ownership field into the patch is rejected outright.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/reviews/{review_id}"))
            .insert_header(bearer(&alice))
            .set_json(json!({ "rating": 5, "userId": "someone-else" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn login_failures_are_indistinguishable() {
    let app = actix_test::init_service(test_app(test_state(seeded_books()))).await;
    let _alice = signup_for_token(&app, "alice", "password-one").await;

    let wrong_password = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "username": "alice", "password": "password-wrong" }))
            .to_request(),
    )
    .await;
    assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
    let wrong_password: Value = actix_test::read_body_json(wrong_password).await;

    let unknown_username = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "username": "nobody", "password": "password-one" }))
            .to_request(),
    )
    .await;
    assert_eq!(unknown_username.status(), StatusCode::BAD_REQUEST);
    let unknown_username: Value = actix_test::read_body_json(unknown_username).await;

    assert_eq!(wrong_password, unknown_username);
}

#[actix_web::test]
async fn duplicate_usernames_conflict_at_signup() {
    let app = actix_test::init_service(test_app(test_state(seeded_books()))).await;
    let _first = signup_for_token(&app, "alice", "password-one").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({ "username": "alice", "password": "password-two" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn search_returns_only_matching_books() {
    let app = actix_test::init_service(test_app(test_state(seeded_books()))).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/books/search?q=tolkien")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    let hits = body.as_array().expect("array body");
    assert_eq!(hits.len(), 1);
    assert_eq!(
        hits.first().and_then(|hit| hit.get("title")).and_then(Value::as_str),
        Some("The Hobbit")
    );
}

#[actix_web::test]
async fn reviewing_an_unknown_book_is_not_found() {
    let app = actix_test::init_service(test_app(test_state(seeded_books()))).await;
    let alice = signup_for_token(&app, "alice", "password-one").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/99999999-9999-9999-9999-999999999999")
            .insert_header(bearer(&alice))
            .set_json(json!({ "rating": 3 }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn added_books_become_visible_to_the_catalogue() {
    let app = actix_test::init_service(test_app(test_state(seeded_books()))).await;
    let alice = signup_for_token(&app, "alice", "password-one").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/books")
            .insert_header(bearer(&alice))
            .set_json(json!({
                "title": "The Silmarillion",
                "author": "J. R. R. Tolkien",
                "genre": "Fantasy"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = actix_test::read_body_json(res).await;
    let id = created.get("id").and_then(Value::as_str).expect("book id");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/books/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = actix_test::read_body_json(res).await;
    assert_eq!(
        fetched.get("title").and_then(Value::as_str),
        Some("The Silmarillion")
    );
}
