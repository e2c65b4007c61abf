//! Borrowing report models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Aggregation period of `GET /transactions/report/{period}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    #[default]
    Daily,
    Monthly,
    Yearly,
}

impl ReportPeriod {
    pub const ALL: [ReportPeriod; 3] = [ReportPeriod::Daily, ReportPeriod::Monthly, ReportPeriod::Yearly];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportPeriod::Daily => "daily",
            ReportPeriod::Monthly => "monthly",
            ReportPeriod::Yearly => "yearly",
        }
    }

    /// Name of the label column in the backend rows
    fn label_key(self) -> &'static str {
        match self {
            ReportPeriod::Daily => "date",
            ReportPeriod::Monthly => "month",
            ReportPeriod::Yearly => "year",
        }
    }
}

impl std::fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One bar of a borrowing chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportEntry {
    pub label: String,
    pub borrow_count: u64,
}

/// Chart series for one period
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReportSeries {
    pub labels: Vec<String>,
    pub data: Vec<u64>,
}

impl From<&[ReportEntry]> for ReportSeries {
    fn from(entries: &[ReportEntry]) -> Self {
        Self {
            labels: entries.iter().map(|e| e.label.clone()).collect(),
            data: entries.iter().map(|e| e.borrow_count).collect(),
        }
    }
}

/// Normalize raw backend rows (`{date|month|year, borrow_count}`) for `period`.
///
/// Counts may arrive as numbers or numeric strings (SQL `COUNT` through some drivers).
/// Rows without a usable label are skipped.
pub fn normalize_rows(period: ReportPeriod, rows: &[Value]) -> Vec<ReportEntry> {
    rows.iter()
        .filter_map(|row| {
            let label = match row.get(period.label_key())? {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            let borrow_count = match row.get("borrow_count") {
                Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
                Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
                _ => 0,
            };
            Some(ReportEntry { label, borrow_count })
        })
        .collect()
}
