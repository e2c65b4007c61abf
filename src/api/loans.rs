//! Loan pages: proof of borrowing and admin loan history

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::{TransactionAction, TransactionRow},
    services::guard::LOGIN_PATH,
    AppState,
};

use super::{page_error, AdminSession, Session, UserSession};

#[derive(Serialize, ToSchema)]
pub struct LoansPage {
    pub transactions: Vec<TransactionRow>,
    pub message: Option<String>,
    /// Lists could not be reloaded after a successful action
    pub refetch_error: Option<String>,
}

impl LoansPage {
    fn empty() -> Self {
        Self {
            transactions: Vec::new(),
            message: None,
            refetch_error: None,
        }
    }
}

/// The member's own transactions
#[utoipa::path(
    get,
    path = "/bukti-peminjaman",
    tag = "loans",
    responses(
        (status = 200, description = "Member's transactions", body = LoansPage),
        (status = 303, description = "Not logged in as a member")
    )
)]
pub async fn proof_of_borrowing(
    State(state): State<AppState>,
    UserSession(verified): UserSession,
    session: Session,
) -> Response {
    let Some(user_id) = session.user_id().or(verified.user_id) else {
        return Redirect::to(LOGIN_PATH).into_response();
    };

    match state.services.loans.member_loans(&verified.token, user_id).await {
        Ok(transactions) => Json(LoansPage {
            transactions: transactions
                .iter()
                .map(|tx| TransactionRow::new(tx, false))
                .collect(),
            message: None,
            refetch_error: None,
        })
        .into_response(),
        Err(e) => page_error(e, LoansPage::empty()),
    }
}

/// Full loan history with the action allowed on each row
#[utoipa::path(
    get,
    path = "/admin/loans",
    tag = "admin",
    responses(
        (status = 200, description = "All transactions", body = LoansPage)
    )
)]
pub async fn history(State(state): State<AppState>, AdminSession(session): AdminSession) -> Response {
    match state.services.loans.history(&session.token).await {
        Ok(transactions) => Json(LoansPage {
            transactions: transactions
                .iter()
                .map(|tx| TransactionRow::new(tx, true))
                .collect(),
            message: None,
            refetch_error: None,
        })
        .into_response(),
        Err(e) => page_error(e, LoansPage::empty()),
    }
}

async fn apply(state: AppState, token: &str, id: i64, action: TransactionAction) -> Response {
    match state.services.loans.apply_action(token, id, action).await {
        Ok(result) => Json(LoansPage {
            transactions: result
                .transactions
                .iter()
                .map(|tx| TransactionRow::new(tx, true))
                .collect(),
            message: Some(action.success_message().to_string()),
            refetch_error: result.refetch_error,
        })
        .into_response(),
        Err(e) => page_error(e, LoansPage::empty()),
    }
}

/// Confirm a pending loan (pending → borrowed)
#[utoipa::path(
    post,
    path = "/admin/loans/{id}/confirm",
    tag = "admin",
    params(("id" = i64, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Loan confirmed", body = LoansPage),
        (status = 400, description = "Loan is not pending")
    )
)]
pub async fn confirm(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Path(id): Path<i64>,
) -> Response {
    apply(state, &session.token, id, TransactionAction::Confirm).await
}

/// Mark a borrowed book as returned (borrowed → returned)
#[utoipa::path(
    post,
    path = "/admin/loans/{id}/complete",
    tag = "admin",
    params(("id" = i64, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Loan completed", body = LoansPage),
        (status = 400, description = "Loan is not borrowed")
    )
)]
pub async fn complete(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Path(id): Path<i64>,
) -> Response {
    apply(state, &session.token, id, TransactionAction::Complete).await
}
