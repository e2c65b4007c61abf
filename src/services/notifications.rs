//! New-transaction detection for the admin dashboard

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use utoipa::ToSchema;

use crate::{gateway::LibraryGateway, models::Transaction};

/// Transient banner announcing a transaction that appeared since the last poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NewTransaction {
    pub transaction_id: i64,
    pub member_name: String,
    pub book_title: String,
    pub message: String,
}

impl From<&Transaction> for NewTransaction {
    fn from(tx: &Transaction) -> Self {
        Self {
            transaction_id: tx.id,
            member_name: tx.member_name().to_string(),
            book_title: tx.book_title().to_string(),
            message: format!("New transaction from {}", tx.member_name()),
        }
    }
}

/// Compares the head of successive transaction listings.
///
/// Only the first element is tracked, so several transactions arriving between two polls
/// produce a single banner.
#[derive(Debug, Clone, Default)]
pub struct TransactionWatcher {
    head: Option<i64>,
}

impl TransactionWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watcher that already holds a listing whose first id was `head`
    pub fn seeded(head: Option<i64>) -> Self {
        Self { head }
    }

    pub fn head(&self) -> Option<i64> {
        self.head
    }

    /// Record `transactions` and return a banner when its head differs from the held one.
    /// Nothing is reported when either listing is empty.
    pub fn observe(&mut self, transactions: &[Transaction]) -> Option<NewTransaction> {
        let current = transactions.first();
        let banner = match (self.head, current) {
            (Some(previous), Some(tx)) if previous != tx.id => Some(NewTransaction::from(tx)),
            _ => None,
        };
        self.head = current.map(|tx| tx.id);
        banner
    }
}

/// Poll `GET /transactions` every `interval` on behalf of one connected admin.
///
/// The task ends once the receiving side is dropped. Failed polls are logged and skipped.
pub fn watch_transactions(
    gateway: Arc<dyn LibraryGateway>,
    token: String,
    interval: Duration,
) -> ReceiverStream<NewTransaction> {
    let (tx, rx) = mpsc::channel(8);

    tokio::spawn(async move {
        let mut watcher = TransactionWatcher::new();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if tx.is_closed() {
                break;
            }

            let transactions = match gateway.list_transactions(&token).await {
                Ok(transactions) => transactions,
                Err(e) => {
                    tracing::warn!("Transaction poll failed: {}", e);
                    continue;
                }
            };

            if let Some(banner) = watcher.observe(&transactions) {
                tracing::info!("New transaction {} detected", banner.transaction_id);
                if tx.send(banner).await.is_err() {
                    break;
                }
            }
        }

        tracing::debug!("Transaction watcher stopped");
    });

    ReceiverStream::new(rx)
}
