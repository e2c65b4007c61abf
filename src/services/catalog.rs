//! Catalog browsing and book administration

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    gateway::LibraryGateway,
    models::{Book, BookCard, NewBook},
};

#[derive(Clone)]
pub struct CatalogService {
    gateway: Arc<dyn LibraryGateway>,
}

impl CatalogService {
    pub fn new(gateway: Arc<dyn LibraryGateway>) -> Self {
        Self { gateway }
    }

    /// All books as returned by the backend
    pub async fn books(&self, token: Option<&str>) -> AppResult<Vec<Book>> {
        self.gateway.list_books(token.map(str::to_string)).await
    }

    /// Member catalog, filtered on title or author
    pub async fn catalog(&self, token: &str, search: Option<&str>) -> AppResult<Vec<BookCard>> {
        let needle = search.unwrap_or_default();
        Ok(self
            .books(Some(token))
            .await?
            .into_iter()
            .filter(|b| b.matches_title_or_author(needle))
            .map(BookCard::from)
            .collect())
    }

    /// Public search page, filtered on title or category
    pub async fn public_search(&self, search: Option<&str>) -> AppResult<Vec<BookCard>> {
        let needle = search.unwrap_or_default();
        Ok(self
            .books(None)
            .await?
            .into_iter()
            .filter(|b| b.matches_title_or_category(needle))
            .map(BookCard::from)
            .collect())
    }

    /// Look up one book in a fresh listing
    pub async fn find(&self, token: &str, book_id: i64) -> AppResult<Book> {
        self.books(Some(token))
            .await?
            .into_iter()
            .find(|b| b.id == book_id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))
    }

    pub async fn add_book(&self, token: &str, book: NewBook) -> AppResult<()> {
        book.validate()?;
        tracing::info!("Adding book {:?}", book.title);
        self.gateway.add_book(token, book).await
    }

    pub async fn delete_book(&self, token: &str, id: i64) -> AppResult<()> {
        tracing::info!("Deleting book {}", id);
        self.gateway.delete_book(token, id).await
    }
}
