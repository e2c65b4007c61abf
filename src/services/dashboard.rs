//! Admin dashboard aggregation

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::PollingConfig,
    error::AppResult,
    gateway::LibraryGateway,
    models::{BookCounts, ReportEntry, ReportPeriod, ReportSeries, RoleCounts, TransactionRow},
};

use super::notifications::{NewTransaction, TransactionWatcher};

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct DashboardCounts {
    pub members: RoleCounts,
    pub books: BookCounts,
    pub transactions: usize,
}

/// Borrowing chart for one period
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PeriodReport {
    pub period: ReportPeriod,
    pub series: ReportSeries,
}

/// Admin dashboard view model.
///
/// Each backend fetch fails independently: a failed section stays at its default and adds a
/// message to `errors`, the rest of the dashboard still renders.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Dashboard {
    pub counts: DashboardCounts,
    pub recent_transactions: Vec<TransactionRow>,
    pub period: ReportPeriod,
    pub selected_report: ReportSeries,
    pub reports: Vec<PeriodReport>,
    /// Head of the current transaction listing, to send back as `last_seen`
    pub latest_transaction_id: Option<i64>,
    pub banner: Option<NewTransaction>,
    pub errors: Vec<String>,
}

#[derive(Clone)]
pub struct DashboardService {
    gateway: Arc<dyn LibraryGateway>,
    polling: PollingConfig,
}

impl DashboardService {
    pub fn new(gateway: Arc<dyn LibraryGateway>, polling: PollingConfig) -> Self {
        Self { gateway, polling }
    }

    pub fn polling(&self) -> &PollingConfig {
        &self.polling
    }

    pub async fn report(&self, token: &str, period: ReportPeriod) -> AppResult<Vec<ReportEntry>> {
        self.gateway.report(token, period).await
    }

    /// Build the dashboard. `last_seen` is the transaction head the browser last displayed.
    pub async fn load(&self, token: &str, period: ReportPeriod, last_seen: Option<i64>) -> Dashboard {
        let (users, books, transactions, daily, monthly, yearly) = tokio::join!(
            self.gateway.list_users(token),
            self.gateway.list_books(Some(token.to_string())),
            self.gateway.list_transactions(token),
            self.report(token, ReportPeriod::Daily),
            self.report(token, ReportPeriod::Monthly),
            self.report(token, ReportPeriod::Yearly),
        );

        let mut errors = Vec::new();
        let mut counts = DashboardCounts::default();

        match users {
            Ok(users) => counts.members = RoleCounts::tally(&users),
            Err(e) => {
                tracing::warn!("Dashboard: failed to load users: {}", e);
                errors.push(format!("Failed to load members: {}", e.user_message()));
            }
        }

        match books {
            Ok(books) => counts.books = BookCounts::tally(&books),
            Err(e) => {
                tracing::warn!("Dashboard: failed to load books: {}", e);
                errors.push(format!("Failed to load books: {}", e.user_message()));
            }
        }

        let mut recent_transactions = Vec::new();
        let mut latest_transaction_id = None;
        let mut banner = None;
        match transactions {
            Ok(transactions) => {
                counts.transactions = transactions.len();
                recent_transactions = transactions
                    .iter()
                    .take(self.polling.recent_limit)
                    .map(|tx| TransactionRow::new(tx, true))
                    .collect();
                let mut watcher = TransactionWatcher::seeded(last_seen);
                banner = watcher.observe(&transactions);
                latest_transaction_id = watcher.head();
            }
            Err(e) => {
                tracing::warn!("Dashboard: failed to load transactions: {}", e);
                errors.push(format!("Failed to load transactions: {}", e.user_message()));
            }
        }

        let mut reports = Vec::with_capacity(ReportPeriod::ALL.len());
        for (p, result) in ReportPeriod::ALL.into_iter().zip([daily, monthly, yearly]) {
            match result {
                Ok(entries) => reports.push(PeriodReport {
                    period: p,
                    series: ReportSeries::from(entries.as_slice()),
                }),
                Err(e) => {
                    tracing::warn!("Dashboard: failed to load {} report: {}", p, e);
                    errors.push(format!("Failed to load {} report: {}", p, e.user_message()));
                }
            }
        }

        let selected_report = reports
            .iter()
            .find(|r| r.period == period)
            .map(|r| r.series.clone())
            .unwrap_or_default();

        Dashboard {
            counts,
            recent_transactions,
            period,
            selected_report,
            reports,
            latest_transaction_id,
            banner,
            errors,
        }
    }
}
