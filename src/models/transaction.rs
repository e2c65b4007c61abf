//! Loan transaction model and its forward-only status

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use super::book::StatusColor;

/// Loan status; only ever moves pending → borrowed → returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Borrowed,
    Returned,
}

/// Admin action on a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionAction {
    /// pending → borrowed
    Confirm,
    /// borrowed → returned
    Complete,
}

impl TransactionAction {
    /// Path segment of `PATCH /transactions/{action}/:id`
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionAction::Confirm => "confirm",
            TransactionAction::Complete => "complete",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            TransactionAction::Confirm => "confirmed",
            TransactionAction::Complete => "completed",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            TransactionAction::Confirm => "Loan confirmed",
            TransactionAction::Complete => "Loan completed",
        }
    }
}

impl std::fmt::Display for TransactionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TransactionStatus {
    /// The single action an admin may take from this status
    pub fn allowed_action(self) -> Option<TransactionAction> {
        match self {
            TransactionStatus::Pending => Some(TransactionAction::Confirm),
            TransactionStatus::Borrowed => Some(TransactionAction::Complete),
            TransactionStatus::Returned => None,
        }
    }

    /// Status reached by applying `action`, if the action is allowed
    pub fn apply(self, action: TransactionAction) -> Option<Self> {
        match (self, action) {
            (TransactionStatus::Pending, TransactionAction::Confirm) => {
                Some(TransactionStatus::Borrowed)
            }
            (TransactionStatus::Borrowed, TransactionAction::Complete) => {
                Some(TransactionStatus::Returned)
            }
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionStatus::Pending => "Waiting for confirmation",
            TransactionStatus::Borrowed => "Borrowed",
            TransactionStatus::Returned => "Returned",
        }
    }

    pub fn color(self) -> StatusColor {
        match self {
            TransactionStatus::Pending => StatusColor::Gray,
            TransactionStatus::Borrowed => StatusColor::Yellow,
            TransactionStatus::Returned => StatusColor::Green,
        }
    }
}

/// Member embedded in a transaction record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionUser {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub nama: Option<String>,
}

/// Book embedded in a transaction record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionBook {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Transaction as returned by `GET /transactions` (newest first)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub book_id: Option<i64>,
    #[serde(rename = "User", alias = "user", default)]
    pub user: Option<TransactionUser>,
    #[serde(rename = "Book", alias = "book", default)]
    pub book: Option<TransactionBook>,
    #[serde(default, deserialize_with = "deserialize_loose_datetime")]
    pub borrow_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_loose_datetime")]
    pub due_date: Option<DateTime<Utc>>,
    pub status: TransactionStatus,
}

const NOT_AVAILABLE: &str = "Not available";

impl Transaction {
    pub fn member_name(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|u| u.nama.as_deref())
            .unwrap_or(NOT_AVAILABLE)
    }

    pub fn book_title(&self) -> &str {
        self.book
            .as_ref()
            .and_then(|b| b.title.as_deref())
            .unwrap_or(NOT_AVAILABLE)
    }
}

/// Accepts RFC 3339 timestamps as well as bare `YYYY-MM-DD` dates.
fn deserialize_loose_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Some(dt.and_utc()))
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
}

/// One row of a loan table
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionRow {
    pub id: i64,
    pub member_name: String,
    pub book_title: String,
    /// `dd/mm/yyyy`
    pub borrow_date: Option<String>,
    pub due_date: Option<String>,
    pub status: TransactionStatus,
    pub status_label: String,
    pub status_color: StatusColor,
    /// Action offered on this row, admins only
    pub action: Option<TransactionAction>,
}

impl TransactionRow {
    pub fn new(tx: &Transaction, is_admin: bool) -> Self {
        Self {
            id: tx.id,
            member_name: tx.member_name().to_string(),
            book_title: tx.book_title().to_string(),
            borrow_date: tx.borrow_date.map(format_date),
            due_date: tx.due_date.map(format_date),
            status: tx.status,
            status_label: tx.status.label().to_string(),
            status_color: tx.status.color(),
            action: if is_admin { tx.status.allowed_action() } else { None },
        }
    }
}

pub fn format_date(dt: DateTime<Utc>) -> String {
    dt.format("%d/%m/%Y").to_string()
}

/// `POST /transactions/borrow` body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub user_id: i64,
    pub book_id: i64,
}
