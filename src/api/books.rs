//! Catalog, borrowing and book administration pages

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::Multipart;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    models::{book::BookImage, BookCard, BookCounts, NewBook},
    services::{guard::LOGIN_PATH, loans::BorrowOutcome},
    AppState,
};

use super::{page_error, AdminSession, Session, UserSession};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive search term
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CatalogPage {
    pub search: String,
    pub books: Vec<BookCard>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowForm {
    pub book_id: i64,
    /// Set once the member has confirmed the prompt
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Serialize, ToSchema)]
pub struct BorrowPage {
    /// Book awaiting confirmation, when the request has not been confirmed
    pub confirm: Option<BookCard>,
    pub message: Option<String>,
    pub books: Vec<BookCard>,
    /// Book list could not be reloaded after a successful request
    pub refetch_error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AdminBooksPage {
    pub counts: BookCounts,
    pub books: Vec<BookCard>,
    pub message: Option<String>,
}

/// Member catalog with availability
#[utoipa::path(
    get,
    path = "/peminjaman",
    tag = "books",
    params(SearchQuery),
    responses(
        (status = 200, description = "Catalog", body = CatalogPage),
        (status = 303, description = "Not logged in as a member")
    )
)]
pub async fn catalog(
    State(state): State<AppState>,
    UserSession(session): UserSession,
    Query(query): Query<SearchQuery>,
) -> Response {
    let search = query.search.unwrap_or_default();
    match state
        .services
        .catalog
        .catalog(&session.token, Some(&search))
        .await
    {
        Ok(books) => Json(CatalogPage { search, books }).into_response(),
        Err(e) => page_error(e, CatalogPage { search, books: Vec::new() }),
    }
}

/// Borrow a book; without `confirm` only the confirmation prompt is returned
#[utoipa::path(
    post,
    path = "/peminjaman/borrow",
    tag = "books",
    request_body = BorrowForm,
    responses(
        (status = 200, description = "Confirmation prompt", body = BorrowPage),
        (status = 201, description = "Borrow requested", body = BorrowPage),
        (status = 303, description = "No usable user id, redirected to login"),
        (status = 400, description = "Book is not available")
    )
)]
pub async fn borrow(
    State(state): State<AppState>,
    UserSession(verified): UserSession,
    session: Session,
    Json(form): Json<BorrowForm>,
) -> Response {
    let Some(user_id) = session.user_id() else {
        tracing::warn!("Borrow attempted without a stored user id");
        return Redirect::to(LOGIN_PATH).into_response();
    };

    match state
        .services
        .loans
        .borrow(&verified.token, user_id, form.book_id, form.confirm)
        .await
    {
        Ok(BorrowOutcome::ConfirmationRequired(book)) => Json(BorrowPage {
            message: Some(format!("Borrow \"{}\"?", book.title)),
            confirm: Some(book),
            books: Vec::new(),
            refetch_error: None,
        })
        .into_response(),
        Ok(BorrowOutcome::Requested {
            book,
            books,
            refetch_error,
        }) => (
            StatusCode::CREATED,
            Json(BorrowPage {
                confirm: None,
                message: Some(format!(
                    "\"{}\" borrowed; waiting for admin confirmation.",
                    book.title
                )),
                books,
                refetch_error,
            }),
        )
            .into_response(),
        Err(e) => page_error(
            e,
            BorrowPage {
                confirm: None,
                message: None,
                books: Vec::new(),
                refetch_error: None,
            },
        ),
    }
}

/// Public book search
#[utoipa::path(
    get,
    path = "/pencarianbuku",
    tag = "books",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching books", body = CatalogPage)
    )
)]
pub async fn public_search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Response {
    let search = query.search.unwrap_or_default();
    match state.services.catalog.public_search(Some(&search)).await {
        Ok(books) => Json(CatalogPage { search, books }).into_response(),
        Err(e) => page_error(e, CatalogPage { search, books: Vec::new() }),
    }
}

async fn admin_books_page(state: &AppState, token: &str, message: Option<String>) -> AppResult<AdminBooksPage> {
    let books = state.services.catalog.books(Some(token)).await?;
    Ok(AdminBooksPage {
        counts: BookCounts::tally(&books),
        books: books.into_iter().map(BookCard::from).collect(),
        message,
    })
}

fn empty_books_page() -> AdminBooksPage {
    AdminBooksPage {
        counts: BookCounts::default(),
        books: Vec::new(),
        message: None,
    }
}

#[utoipa::path(
    get,
    path = "/admin/books",
    tag = "admin",
    responses(
        (status = 200, description = "All books", body = AdminBooksPage)
    )
)]
pub async fn admin_books(State(state): State<AppState>, AdminSession(session): AdminSession) -> Response {
    match admin_books_page(&state, &session.token, None).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => page_error(e, empty_books_page()),
    }
}

/// Read the add-book multipart form (`title`, `author`, `isbn`, `image`)
async fn read_book_form(mut multipart: Multipart) -> AppResult<NewBook> {
    let mut book = NewBook::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or("cover").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !bytes.is_empty() {
                    book.image = Some(BookImage {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "title" | "author" | "isbn" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                match name.as_str() {
                    "title" => book.title = value.trim().to_string(),
                    "author" => book.author = value.trim().to_string(),
                    _ => book.isbn = Some(value).filter(|v| !v.trim().is_empty()),
                }
            }
            other => tracing::debug!("Ignoring unknown book form field {}", other),
        }
    }

    Ok(book)
}

/// Add a book (multipart form)
#[utoipa::path(
    post,
    path = "/admin/books",
    tag = "admin",
    responses(
        (status = 201, description = "Book added", body = AdminBooksPage),
        (status = 400, description = "Title or author missing")
    )
)]
pub async fn add_book(State(state): State<AppState>, AdminSession(session): AdminSession, multipart: Multipart) -> Response {
    let result: AppResult<AdminBooksPage> = async {
        let book = read_book_form(multipart).await?;
        let title = book.title.clone();
        state.services.catalog.add_book(&session.token, book).await?;
        admin_books_page(&state, &session.token, Some(format!("\"{}\" added", title))).await
    }
    .await;

    match result {
        Ok(page) => (StatusCode::CREATED, Json(page)).into_response(),
        Err(e) => page_error(e, empty_books_page()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/books/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = AdminBooksPage)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Path(id): Path<i64>,
) -> Response {
    let result: AppResult<AdminBooksPage> = async {
        state.services.catalog.delete_book(&session.token, id).await?;
        admin_books_page(&state, &session.token, Some("Book deleted".to_string())).await
    }
    .await;

    match result {
        Ok(page) => Json(page).into_response(),
        Err(e) => page_error(e, empty_books_page()),
    }
}
