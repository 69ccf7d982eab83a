//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation.
//!
//! The migrations also install the constraints the domain relies on: a unique
//! index on `users.username`, a unique index on `reviews (user_id, book_id)`,
//! and foreign keys from `reviews` to both `users` and `books`.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login name (max 32 characters).
        username -> Varchar,
        /// Salted one-way password digest.
        password_hash -> Text,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Public book catalogue.
    books (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Book title (max 256 characters).
        title -> Varchar,
        /// Book author (max 128 characters).
        author -> Varchar,
        /// Genre label (max 64 characters).
        genre -> Varchar,
        /// Record creation timestamp; doubles as the listing order.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Review ledger: at most one row per `(user_id, book_id)`.
    reviews (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user; never reassigned.
        user_id -> Uuid,
        /// Reviewed book; never reassigned.
        book_id -> Uuid,
        /// Star rating between 1 and 5.
        rating -> Int2,
        /// Optional free-text comment.
        comment -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(reviews -> users (user_id));
diesel::joinable!(reviews -> books (book_id));

diesel::allow_tables_to_appear_in_same_query!(users, books, reviews);
