//! Data models for the Pustaka portal

pub mod book;
pub mod report;
pub mod session;
pub mod transaction;
pub mod user;

// Re-export commonly used types
pub use book::{Availability, Book, BookCard, BookCounts, NewBook, StatusColor};
pub use report::{ReportEntry, ReportPeriod, ReportSeries};
pub use session::{TokenClaims, Verification, VerifiedSession};
pub use transaction::{BorrowRequest, Transaction, TransactionAction, TransactionRow, TransactionStatus};
pub use user::{NewUser, Role, RoleCounts, UpdateUser, User};
