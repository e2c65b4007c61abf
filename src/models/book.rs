//! Book model and availability projection

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Display state of a book, derived from its availability code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Code 2
    Available,
    /// Code 1: a borrow request is waiting for an admin
    PendingConfirmation,
    /// Code 0
    Borrowed,
}

/// Display color attached to a status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Green,
    Yellow,
    Red,
    Gray,
}

impl Availability {
    /// Strict mapping of the backend code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Availability::Borrowed),
            1 => Some(Availability::PendingConfirmation),
            2 => Some(Availability::Available),
            _ => None,
        }
    }

    /// Total projection used by every page.
    ///
    /// Unknown codes project to `Borrowed`, so such a book is never offered for borrowing.
    pub fn project(code: i32) -> Self {
        Self::from_code(code).unwrap_or_else(|| {
            tracing::warn!("Unknown availability code {}, shown as borrowed", code);
            Availability::Borrowed
        })
    }

    pub fn code(self) -> i32 {
        match self {
            Availability::Borrowed => 0,
            Availability::PendingConfirmation => 1,
            Availability::Available => 2,
        }
    }

    pub fn color(self) -> StatusColor {
        match self {
            Availability::Available => StatusColor::Green,
            Availability::PendingConfirmation => StatusColor::Yellow,
            Availability::Borrowed => StatusColor::Red,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Availability::Available => "Available",
            Availability::PendingConfirmation => "Waiting for confirmation",
            Availability::Borrowed => "Borrowed",
        }
    }

    pub fn is_borrowable(self) -> bool {
        self == Availability::Available
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Book record as returned by `GET /books`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub isbn: Option<String>,
    pub available: i32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Book {
    pub fn availability(&self) -> Availability {
        Availability::project(self.available)
    }

    /// Catalog search: case-insensitive match on title or author
    pub fn matches_title_or_author(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty()
            || self.title.to_lowercase().contains(&needle)
            || self.author.to_lowercase().contains(&needle)
    }

    /// Public search: case-insensitive match on title or category
    pub fn matches_title_or_category(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty()
            || self.title.to_lowercase().contains(&needle)
            || self
                .category
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle))
    }
}

/// Book with its projected display state
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookCard {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub available: i32,
    pub status: Availability,
    pub status_label: String,
    pub status_color: StatusColor,
    /// Whether the "Borrow" action is offered
    pub can_borrow: bool,
}

impl From<Book> for BookCard {
    fn from(book: Book) -> Self {
        let status = book.availability();
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            image_url: book.image_url,
            category: book.category,
            available: book.available,
            status,
            status_label: status.label().to_string(),
            status_color: status.color(),
            can_borrow: status.is_borrowable(),
        }
    }
}

/// Book counts shown on the admin dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct BookCounts {
    pub total: usize,
    pub available: usize,
    pub unavailable: usize,
}

impl BookCounts {
    pub fn tally(books: &[Book]) -> Self {
        let total = books.len();
        let available = books
            .iter()
            .filter(|b| b.availability().is_borrowable())
            .count();
        Self {
            total,
            available,
            unavailable: total - available,
        }
    }
}

/// Add-book form, forwarded to `POST /books/add` as multipart
#[derive(Debug, Clone, Default, Validate)]
pub struct NewBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub isbn: Option<String>,
    pub image: Option<BookImage>,
}

/// Cover image uploaded with a new book
#[derive(Debug, Clone)]
pub struct BookImage {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}
