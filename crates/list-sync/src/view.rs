//! # List View
//!
//! The list screen state machine and the pure table renderer.
//!
//! ```text
//! Idle(query) -> Fetching(query) -> Loaded(query, result)
//!                                 \-> Failed(query, error)
//! ```
//!
//! A URL change or an invalidation re-enters `Fetching`; the previous result
//! is kept alongside so the table does not blank while refetching.

use crate::error::QueryError;
use crate::params::ParamOp;
use crate::query::{ListQuery, ListResult, SortOrder, ORDER, PAGE, SORT};
use std::sync::Arc;

/// State of one list screen.
#[derive(Debug, Clone)]
pub enum ListState<T> {
    Idle(ListQuery),
    Fetching {
        query: ListQuery,
        previous: Option<Arc<ListResult<T>>>,
    },
    Loaded {
        query: ListQuery,
        result: Arc<ListResult<T>>,
    },
    Failed {
        query: ListQuery,
        error: QueryError,
    },
}

impl<T> ListState<T> {
    pub fn query(&self) -> &ListQuery {
        match self {
            ListState::Idle(query)
            | ListState::Fetching { query, .. }
            | ListState::Loaded { query, .. }
            | ListState::Failed { query, .. } => query,
        }
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self, ListState::Fetching { .. })
    }

    /// Loaded or failed.
    pub fn is_settled(&self) -> bool {
        matches!(self, ListState::Loaded { .. } | ListState::Failed { .. })
    }

    /// The result to display: the loaded one, or the previous one while refetching.
    pub fn result(&self) -> Option<&Arc<ListResult<T>>> {
        match self {
            ListState::Loaded { result, .. } => Some(result),
            ListState::Fetching { previous, .. } => previous.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&QueryError> {
        match self {
            ListState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn render(&self) -> TableView<'_, T> {
        let query = self.query();
        let (rows, total) = match self.result() {
            Some(result) => (result.data.as_slice(), result.total),
            None => (&[][..], 0),
        };
        render_table(rows, self.is_fetching(), query.page, total, query.limit)
    }
}

/// What a table shows for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView<'a, T> {
    pub rows: &'a [T],
    pub is_fetching: bool,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub page_count: u32,
    /// 1-based ordinal of the first row, 0 when empty.
    pub first_row: u64,
    pub last_row: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> TableView<'_, T> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Footer text in the usual "11 - 17 / 47" form.
    pub fn summary(&self) -> String {
        format!("{} - {} / {}", self.first_row, self.last_row, self.total)
    }
}

/// Pure mapping from one page of rows to a table view.
///
/// A page past the last one renders empty; it is never an error.
pub fn render_table<T>(
    rows: &[T],
    is_fetching: bool,
    page: u32,
    total: u64,
    limit: u32,
) -> TableView<'_, T> {
    let page = page.max(1);
    let limit = limit.max(1);
    let page_count = u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX);
    let first_row = if rows.is_empty() {
        0
    } else {
        u64::from(page - 1) * u64::from(limit) + 1
    };
    let last_row = if rows.is_empty() {
        0
    } else {
        first_row + rows.len() as u64 - 1
    };

    TableView {
        rows,
        is_fetching,
        page,
        limit,
        total,
        page_count,
        first_row,
        last_row,
        has_previous: page > 1,
        has_next: page < page_count,
    }
}

/// Events a table emits back toward the parameter store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    PageChange(u32),
    SortChange { column: String, direction: SortOrder },
}

impl TableEvent {
    pub fn into_ops(self) -> Vec<ParamOp> {
        match self {
            TableEvent::PageChange(page) => vec![ParamOp::set(PAGE, page.max(1).to_string())],
            TableEvent::SortChange { column, direction } => vec![
                ParamOp::set(SORT, column),
                ParamOp::set(ORDER, direction.as_str()),
                ParamOp::remove(PAGE),
            ],
        }
    }
}
