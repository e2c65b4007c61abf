//! Borrow workflow and admin loan actions

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    gateway::LibraryGateway,
    models::{Book, BookCard, BorrowRequest, Transaction, TransactionAction},
};

use super::catalog::CatalogService;

/// Result of a borrow attempt
#[derive(Debug, Clone)]
pub enum BorrowOutcome {
    /// Intent not confirmed yet: show the confirmation prompt for this book
    ConfirmationRequired(BookCard),
    /// Request accepted; the book list was refetched afterwards.
    ///
    /// `refetch_error` is set when the request went through but the refetch did not.
    Requested {
        book: BookCard,
        books: Vec<BookCard>,
        refetch_error: Option<String>,
    },
}

/// State after an admin action, both lists refetched
#[derive(Debug, Clone)]
pub struct ActionResult {
    pub transaction_id: i64,
    pub action: TransactionAction,
    pub transactions: Vec<Transaction>,
    pub books: Vec<Book>,
    /// Set when the action was applied but the lists could not be reloaded
    pub refetch_error: Option<String>,
}

#[derive(Clone)]
pub struct LoansService {
    gateway: Arc<dyn LibraryGateway>,
    catalog: CatalogService,
}

impl LoansService {
    pub fn new(gateway: Arc<dyn LibraryGateway>, catalog: CatalogService) -> Self {
        Self { gateway, catalog }
    }

    /// Borrow `book_id` for `user_id`.
    ///
    /// Only books currently in the `Available` state are accepted. Nothing is sent to the
    /// backend until `confirmed` is set.
    pub async fn borrow(&self, token: &str, user_id: i64, book_id: i64, confirmed: bool) -> AppResult<BorrowOutcome> {
        let book = self.catalog.find(token, book_id).await?;
        let availability = book.availability();
        if !availability.is_borrowable() {
            return Err(AppError::BadRequest(format!(
                "\"{}\" cannot be borrowed right now ({})",
                book.title, availability
            )));
        }

        let card = BookCard::from(book);
        if !confirmed {
            return Ok(BorrowOutcome::ConfirmationRequired(card));
        }

        self.gateway
            .borrow(token, BorrowRequest { user_id, book_id })
            .await?;
        tracing::info!("User {} requested book {}", user_id, book_id);

        let (books, refetch_error) = match self.catalog.catalog(token, None).await {
            Ok(books) => (books, None),
            Err(e) => {
                tracing::warn!("Book list refetch after borrow failed: {}", e);
                (Vec::new(), Some(e.user_message()))
            }
        };
        Ok(BorrowOutcome::Requested {
            book: card,
            books,
            refetch_error,
        })
    }

    /// Every transaction, newest first
    pub async fn history(&self, token: &str) -> AppResult<Vec<Transaction>> {
        self.gateway.list_transactions(token).await
    }

    /// The member's own transactions
    pub async fn member_loans(&self, token: &str, user_id: i64) -> AppResult<Vec<Transaction>> {
        self.gateway.user_transactions(token, user_id).await
    }

    /// Confirm or complete a transaction, then refetch transactions and books.
    ///
    /// The current status is read first; an action the status does not allow is refused
    /// without contacting the backend.
    pub async fn apply_action(&self, token: &str, transaction_id: i64, action: TransactionAction) -> AppResult<ActionResult> {
        let current = self
            .history(token)
            .await?
            .into_iter()
            .find(|t| t.id == transaction_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Loan with id {} not found", transaction_id))
            })?;

        if current.status.apply(action).is_none() {
            return Err(AppError::BadRequest(format!(
                "Loan {} is {}; it cannot be {}",
                transaction_id,
                current.status.label().to_lowercase(),
                action.past_tense()
            )));
        }

        self.gateway.apply_action(token, transaction_id, action).await?;
        tracing::info!("Loan {} {}", transaction_id, action.past_tense());

        let refetched = tokio::try_join!(self.history(token), self.catalog.books(Some(token)));
        let (transactions, books, refetch_error) = match refetched {
            Ok((transactions, books)) => (transactions, books, None),
            Err(e) => {
                tracing::warn!("Refetch after loan {} failed: {}", transaction_id, e);
                (Vec::new(), Vec::new(), Some(e.user_message()))
            }
        };

        Ok(ActionResult {
            transaction_id,
            action,
            transactions,
            books,
            refetch_error,
        })
    }
}
