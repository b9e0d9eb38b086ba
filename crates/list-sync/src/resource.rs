//! # List Resources
//!
//! A resource is a server-managed entity type with a paginated list
//! endpoint. Implementing [`ListResource`] is all a domain type needs to be
//! driven by a [`ListController`](crate::ListController).

use crate::query::{FilterSpec, ListDefaults};
use serde::de::DeserializeOwned;
use std::fmt::Debug;

/// A server-managed entity shown in a list screen.
///
/// # Example
///
/// ```rust
/// use list_sync::{FilterSpec, ListDefaults, ListResource, SortOrder};
/// use serde::Deserialize;
///
/// #[derive(Clone, Debug, Deserialize)]
/// struct Book {
///     #[serde(rename = "_id")]
///     id: String,
///     title: String,
/// }
///
/// impl ListResource for Book {
///     const NAME: &'static str = "books";
///
///     fn defaults() -> ListDefaults {
///         ListDefaults::default().sorted_by("createdAt", SortOrder::Desc)
///     }
///
///     fn filters() -> &'static [FilterSpec] {
///         const FILTERS: &[FilterSpec] = &[FilterSpec::repeatable("categories")];
///         FILTERS
///     }
///
///     fn id(&self) -> &str {
///         &self.id
///     }
/// }
/// ```
pub trait ListResource: DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Resource name used in cache keys and invalidation patterns.
    const NAME: &'static str;

    fn defaults() -> ListDefaults {
        ListDefaults::default()
    }

    /// Filter keys this resource accepts from the query string.
    fn filters() -> &'static [FilterSpec] {
        &[]
    }

    fn id(&self) -> &str;
}
