//! Access to the remote library REST backend

pub mod http;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{
        user::{RegisterUser, UpdateUserBody},
        Book, BorrowRequest, NewBook, ReportEntry, ReportPeriod, Transaction, TransactionAction,
        User,
    },
};

pub use http::HttpGateway;

/// Backend operations used by the portal pages.
///
/// `token` is the caller's bearer token, sent as `Authorization: Bearer <token>`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibraryGateway: Send + Sync {
    /// `POST /auth/login`, returns the issued token
    async fn login(&self, email: &str, password: &str) -> AppResult<String>;

    /// `POST /users/register`
    async fn register(&self, user: RegisterUser) -> AppResult<()>;

    /// `GET /users`
    async fn list_users(&self, token: &str) -> AppResult<Vec<User>>;

    /// `GET /users/:id`
    async fn get_user(&self, token: &str, id: i64) -> AppResult<User>;

    /// `PUT /users/:id`
    async fn update_user(&self, token: &str, id: i64, user: UpdateUserBody) -> AppResult<()>;

    /// `DELETE /users/:id`
    async fn delete_user(&self, token: &str, id: i64) -> AppResult<()>;

    /// `GET /books`; the catalog is public, so the token is optional
    async fn list_books(&self, token: Option<String>) -> AppResult<Vec<Book>>;

    /// `POST /books/add` (multipart)
    async fn add_book(&self, token: &str, book: NewBook) -> AppResult<()>;

    /// `DELETE /books/:id`
    async fn delete_book(&self, token: &str, id: i64) -> AppResult<()>;

    /// `POST /transactions/borrow`
    async fn borrow(&self, token: &str, request: BorrowRequest) -> AppResult<()>;

    /// `GET /transactions`, newest first
    async fn list_transactions(&self, token: &str) -> AppResult<Vec<Transaction>>;

    /// `GET /transactions/user/:id`
    async fn user_transactions(&self, token: &str, user_id: i64) -> AppResult<Vec<Transaction>>;

    /// `PATCH /transactions/{confirm|complete}/:id`
    async fn apply_action(&self, token: &str, id: i64, action: TransactionAction) -> AppResult<()>;

    /// `GET /transactions/report/{daily|monthly|yearly}`
    async fn report(&self, token: &str, period: ReportPeriod) -> AppResult<Vec<ReportEntry>>;
}
