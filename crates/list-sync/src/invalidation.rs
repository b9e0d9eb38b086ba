//! # Invalidation
//!
//! Key patterns select cache entries to flag stale. An [`InvalidationMap`]
//! is the declarative table from a mutation kind to the patterns it
//! invalidates, so the whole contract can be read (and tested) in one place.

use crate::message::{CacheKey, KeyScope};
use std::collections::HashMap;
use std::hash::Hash;

/// Selects a set of cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPattern {
    /// Every list page of the resource.
    AllLists(String),
    /// The single-item entry for one id.
    Item { resource: String, id: String },
    /// Every single-item entry of the resource.
    AllItems(String),
    /// Lists and items alike.
    Resource(String),
}

impl KeyPattern {
    pub fn lists(resource: impl Into<String>) -> Self {
        KeyPattern::AllLists(resource.into())
    }

    pub fn item(resource: impl Into<String>, id: impl Into<String>) -> Self {
        KeyPattern::Item {
            resource: resource.into(),
            id: id.into(),
        }
    }

    pub fn resource(&self) -> &str {
        match self {
            KeyPattern::AllLists(r) | KeyPattern::AllItems(r) | KeyPattern::Resource(r) => r,
            KeyPattern::Item { resource, .. } => resource,
        }
    }

    pub fn matches(&self, key: &CacheKey) -> bool {
        if key.resource != self.resource() {
            return false;
        }
        match (self, &key.scope) {
            (KeyPattern::Resource(_), _) => true,
            (KeyPattern::AllLists(_), KeyScope::List(_)) => true,
            (KeyPattern::AllItems(_), KeyScope::Item(_)) => true,
            (KeyPattern::Item { id, .. }, KeyScope::Item(key_id)) => id == key_id,
            _ => false,
        }
    }
}

/// One entry in the right-hand side of an invalidation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Lists(&'static str),
    /// The item the mutation touched. Skipped when the mutation has no id.
    MutatedItem(&'static str),
    AllItems(&'static str),
}

/// Declarative map from mutation kind to the keys it makes stale.
#[derive(Debug, Clone)]
pub struct InvalidationMap<K> {
    rules: HashMap<K, Vec<Target>>,
}

impl<K: Eq + Hash> Default for InvalidationMap<K> {
    fn default() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> InvalidationMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, kind: K, targets: impl IntoIterator<Item = Target>) -> Self {
        self.rules.entry(kind).or_default().extend(targets);
        self
    }

    /// Patterns to invalidate after a successful mutation of `kind`.
    pub fn patterns_for(&self, kind: &K, id: Option<&str>) -> Vec<KeyPattern> {
        let Some(targets) = self.rules.get(kind) else {
            return Vec::new();
        };
        targets
            .iter()
            .filter_map(|target| match (*target, id) {
                (Target::Lists(r), _) => Some(KeyPattern::lists(r)),
                (Target::AllItems(r), _) => Some(KeyPattern::AllItems(r.to_string())),
                (Target::MutatedItem(r), Some(id)) => Some(KeyPattern::item(r, id)),
                (Target::MutatedItem(_), None) => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ListDefaults, ListQuery};

    fn list_key(resource: &str) -> CacheKey {
        CacheKey::list(resource, ListQuery::new(&ListDefaults::default()))
    }

    #[test]
    fn test_pattern_matching() {
        let lists = KeyPattern::lists("books");
        assert!(lists.matches(&list_key("books")));
        assert!(!lists.matches(&CacheKey::item("books", "1")));
        assert!(!lists.matches(&list_key("users")));

        let item = KeyPattern::item("books", "1");
        assert!(item.matches(&CacheKey::item("books", "1")));
        assert!(!item.matches(&CacheKey::item("books", "2")));
        assert!(!item.matches(&list_key("books")));

        let all = KeyPattern::Resource("books".into());
        assert!(all.matches(&list_key("books")));
        assert!(all.matches(&CacheKey::item("books", "9")));
    }

    #[derive(Debug, PartialEq, Eq, Hash)]
    enum Kind {
        Create,
        Delete,
    }

    #[test]
    fn test_map_expands_rules() {
        let map = InvalidationMap::new()
            .rule(Kind::Create, [Target::Lists("books")])
            .rule(
                Kind::Delete,
                [Target::Lists("books"), Target::MutatedItem("books")],
            );

        assert_eq!(
            map.patterns_for(&Kind::Delete, Some("7")),
            vec![KeyPattern::lists("books"), KeyPattern::item("books", "7")]
        );
        assert_eq!(
            map.patterns_for(&Kind::Delete, None),
            vec![KeyPattern::lists("books")]
        );
        assert_eq!(
            map.patterns_for(&Kind::Create, Some("7")),
            vec![KeyPattern::lists("books")]
        );
    }
}
