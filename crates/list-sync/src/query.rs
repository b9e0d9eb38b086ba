//! # List Queries
//!
//! [`ListQuery`] is the tuple of keyword, filters, sort and pagination that
//! identifies one view of a resource collection. It is never held as local
//! component state: it is decoded from the query string on every change and
//! encoded back into it by explicit setters.
//!
//! Decoding is the validation boundary. Each resource declares its filter keys
//! ([`FilterSpec`]) and defaults ([`ListDefaults`]); anything outside those
//! declarations falls back to the default instead of leaking through.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use url::form_urlencoded;

pub const KEYWORD: &str = "keyword";
pub const SORT: &str = "sort";
pub const ORDER: &str = "order";
pub const PAGE: &str = "page";
pub const LIMIT: &str = "limit";

const RESERVED: [&str; 5] = [KEYWORD, SORT, ORDER, PAGE, LIMIT];

/// Sort direction, encoded as `asc` / `desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded filter value.
///
/// Equality and hashing compare the value list only, so `One(x)` and
/// `Many([x])` name the same filter.
#[derive(Debug, Clone)]
pub enum FilterValue {
    One(String),
    Many(Vec<String>),
}

impl FilterValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            FilterValue::One(v) => vec![v.as_str()],
            FilterValue::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    pub fn first(&self) -> Option<&str> {
        match self {
            FilterValue::One(v) => Some(v.as_str()),
            FilterValue::Many(vs) => vs.first().map(String::as_str),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            FilterValue::One(v) => v.is_empty(),
            FilterValue::Many(vs) => vs.is_empty(),
        }
    }
}

impl PartialEq for FilterValue {
    fn eq(&self, other: &Self) -> bool {
        self.values() == other.values()
    }
}

impl Eq for FilterValue {}

impl Hash for FilterValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values().hash(state);
    }
}

/// Declares one resource-specific filter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub key: &'static str,
    /// Repeatable keys (`categories=a&categories=b`) decode to [`FilterValue::Many`].
    pub repeatable: bool,
    /// Closed set of accepted values; `None` accepts any non-empty value.
    pub allowed: Option<&'static [&'static str]>,
}

impl FilterSpec {
    pub const fn single(key: &'static str) -> Self {
        Self {
            key,
            repeatable: false,
            allowed: None,
        }
    }

    pub const fn repeatable(key: &'static str) -> Self {
        Self {
            key,
            repeatable: true,
            allowed: None,
        }
    }

    pub const fn one_of(key: &'static str, allowed: &'static [&'static str]) -> Self {
        Self {
            key,
            repeatable: false,
            allowed: Some(allowed),
        }
    }

    fn accepts(&self, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        match self.allowed {
            Some(allowed) => allowed.contains(&value),
            None => true,
        }
    }
}

/// Per-resource fallbacks for keys that are absent or invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListDefaults {
    pub sort: Option<&'static str>,
    pub order: SortOrder,
    pub limit: u32,
}

impl ListDefaults {
    pub const fn new(limit: u32) -> Self {
        Self {
            sort: None,
            order: SortOrder::Desc,
            limit,
        }
    }

    pub const fn sorted_by(mut self, sort: &'static str, order: SortOrder) -> Self {
        self.sort = Some(sort);
        self.order = order;
        self
    }

    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

impl Default for ListDefaults {
    fn default() -> Self {
        Self::new(10)
    }
}

/// One view of a resource collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListQuery {
    pub keyword: Option<String>,
    pub filters: BTreeMap<String, FilterValue>,
    pub sort: Option<String>,
    pub order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

impl ListQuery {
    /// The query a screen starts from when the URL carries nothing.
    pub fn new(defaults: &ListDefaults) -> Self {
        Self {
            keyword: None,
            filters: BTreeMap::new(),
            sort: defaults.sort.map(String::from),
            order: defaults.order,
            page: 1,
            limit: defaults.limit.max(1),
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        self.keyword = (!keyword.is_empty()).then_some(keyword);
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: FilterValue) -> Self {
        let key = key.into();
        if value.is_empty() {
            self.filters.remove(&key);
        } else {
            self.filters.insert(key, value);
        }
        self
    }

    pub fn with_sort(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(column.into());
        self.order = order;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn filter(&self, key: &str) -> Option<&FilterValue> {
        self.filters.get(key)
    }

    /// Whether every filter is declared in `specs` with accepted values, and
    /// single keys hold one value. Such a query survives an encode/decode
    /// round trip unchanged; anything else loses what `decode` rejects.
    pub fn conforms_to(&self, specs: &[FilterSpec]) -> bool {
        self.filters.iter().all(|(key, value)| {
            specs
                .iter()
                .find(|spec| spec.key == key.as_str() && !RESERVED.contains(&spec.key))
                .is_some_and(|spec| {
                    let values = value.values();
                    (spec.repeatable || values.len() == 1)
                        && values.iter().all(|v| spec.accepts(v))
                })
        })
    }

    /// Decodes a query from ordered key/value pairs.
    ///
    /// Never fails: every absent or invalid entry resolves to its default.
    pub fn decode(pairs: &[(String, String)], defaults: &ListDefaults, specs: &[FilterSpec]) -> Self {
        let mut query = Self::new(defaults);

        query.keyword = first_non_empty(pairs, KEYWORD).map(String::from);

        for spec in specs {
            if RESERVED.contains(&spec.key) {
                continue;
            }
            let mut valid: Vec<String> = values_of(pairs, spec.key)
                .filter(|v| spec.accepts(v))
                .map(String::from)
                .collect();
            if valid.is_empty() {
                continue;
            }
            let value = if spec.repeatable {
                FilterValue::Many(valid)
            } else {
                FilterValue::One(valid.swap_remove(0))
            };
            query.filters.insert(spec.key.to_string(), value);
        }

        if let Some(sort) = first_non_empty(pairs, SORT) {
            query.sort = Some(sort.to_string());
        }
        if let Some(order) = first_non_empty(pairs, ORDER).and_then(|v| v.parse().ok()) {
            query.order = order;
        }
        query.page = positive(first_non_empty(pairs, PAGE)).unwrap_or(1);
        query.limit = positive(first_non_empty(pairs, LIMIT)).unwrap_or(query.limit);

        query
    }

    /// Decodes a raw query string (a leading `?` is ignored).
    pub fn from_query_string(qs: &str, defaults: &ListDefaults, specs: &[FilterSpec]) -> Self {
        Self::decode(&parse_pairs(qs), defaults, specs)
    }

    /// Encodes into ordered pairs: keyword, filters, sort, order, page, limit.
    pub fn encode(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(keyword) = self.keyword.as_deref().filter(|k| !k.is_empty()) {
            pairs.push((KEYWORD.to_string(), keyword.to_string()));
        }
        for (key, value) in &self.filters {
            for v in value.values() {
                pairs.push((key.clone(), v.to_string()));
            }
        }
        if let Some(sort) = &self.sort {
            pairs.push((SORT.to_string(), sort.clone()));
        }
        pairs.push((ORDER.to_string(), self.order.to_string()));
        pairs.push((PAGE.to_string(), self.page.to_string()));
        pairs.push((LIMIT.to_string(), self.limit.to_string()));
        pairs
    }

    pub fn to_query_string(&self) -> String {
        format_pairs(&self.encode())
    }
}

/// One page of a resource collection as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
}

impl<T> ListResult<T> {
    pub fn empty(query: &ListQuery) -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            page: query.page,
            limit: query.limit,
        }
    }
}

fn first_page() -> u32 {
    1
}

/// Splits a query string into ordered, percent-decoded pairs.
pub fn parse_pairs(qs: &str) -> Vec<(String, String)> {
    let qs = qs.strip_prefix('?').unwrap_or(qs);
    form_urlencoded::parse(qs.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Joins ordered pairs into a percent-encoded query string.
pub fn format_pairs(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish()
}

fn values_of<'a>(pairs: &'a [(String, String)], key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    pairs
        .iter()
        .filter(move |(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn first_non_empty<'a>(pairs: &'a [(String, String)], key: &'a str) -> Option<&'a str> {
    values_of(pairs, key).find(|v| !v.is_empty())
}

fn positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|v| v.parse::<u32>().ok()).filter(|n| *n > 0)
}
