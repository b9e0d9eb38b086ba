use chrono::{DateTime, Utc};
use list_sync::{FilterSpec, ListResource};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Filter key for the transaction list.
pub const STATUS: &str = "status";

/// Lifecycle of a borrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Checking,
    Borrowed,
    Returned,
    #[serde(alias = "late")]
    Overdue,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 4] = [
        TransactionStatus::Checking,
        TransactionStatus::Borrowed,
        TransactionStatus::Returned,
        TransactionStatus::Overdue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Checking => "checking",
            TransactionStatus::Borrowed => "borrowed",
            TransactionStatus::Returned => "returned",
            TransactionStatus::Overdue => "overdue",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checking" => Ok(TransactionStatus::Checking),
            "borrowed" => Ok(TransactionStatus::Borrowed),
            "returned" => Ok(TransactionStatus::Returned),
            "overdue" | "late" => Ok(TransactionStatus::Overdue),
            other => Err(format!("unknown transaction status: {other}")),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowerSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowedBook {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowTransaction {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: BorrowerSummary,
    pub book: BorrowedBook,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub return_date: Option<DateTime<Utc>>,
    pub status: TransactionStatus,
}

impl BorrowTransaction {
    /// Past its due date and not yet returned.
    pub fn is_past_due(&self, now: DateTime<Utc>) -> bool {
        self.status != TransactionStatus::Returned && self.due_date < now
    }
}

impl ListResource for BorrowTransaction {
    const NAME: &'static str = "transactions";

    fn filters() -> &'static [FilterSpec] {
        const FILTERS: &[FilterSpec] = &[FilterSpec::one_of(
            STATUS,
            &["checking", "borrowed", "returned", "overdue"],
        )];
        FILTERS
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Body of `PUT /admin/borrow/{id}`.
///
/// `returnDate` is always sent: a timestamp when the book came back, `null`
/// to clear it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub status: TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
}

impl TransactionUpdate {
    /// A status change; `returned` stamps the return date with `now`.
    pub fn status(status: TransactionStatus, now: DateTime<Utc>) -> Self {
        Self {
            status,
            due_date: None,
            return_date: (status == TransactionStatus::Returned).then_some(now),
        }
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }
}
