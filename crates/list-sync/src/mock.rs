//! # Mock Fetcher & Testing Guide
//!
//! [`MockFetcher`] implements [`Fetcher`] entirely in memory. Tests queue
//! per-key responses with a fluent builder, then assert how many network
//! calls the cache actually made.
//!
//! ## When to use the mock vs a real transport
//!
//! | Feature | MockFetcher | Real transport |
//! |---------|-------------|----------------|
//! | **Speed** | Instant (in-memory) | Network bound |
//! | **Determinism** | Scripted order, paused clock friendly | Subject to the server |
//! | **Call counting** | Built in | Requires a mock server |
//! | **Error injection** | `return_err` | Hard |
//! | **Race scripting** | `hold` + [`Gate::release`] | Not possible |
//!
//! ## Example
//!
//! ```rust
//! use list_sync::mock::MockFetcher;
//! use list_sync::{CacheKey, ListDefaults, ListQuery, QueryCache};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let key = CacheKey::list("books", ListQuery::new(&ListDefaults::default()));
//!     let mock = MockFetcher::new();
//!     mock.expect(key.clone()).return_ok(json!({ "data": [], "total": 0 }));
//!
//!     let (cache, client) = QueryCache::new(mock.clone(), 8, Duration::from_secs(5));
//!     tokio::spawn(cache.run());
//!
//!     let (a, b) = tokio::join!(client.fetch(key.clone()), client.fetch(key.clone()));
//!     assert_eq!(a.unwrap(), b.unwrap());
//!     assert_eq!(mock.calls(&key), 1);
//!     mock.verify();
//! }
//! ```

use crate::error::QueryError;
use crate::fetcher::Fetcher;
use crate::message::CacheKey;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

struct Expectation {
    response: Result<Value, QueryError>,
    delay: Option<Duration>,
    gate: Option<Arc<Notify>>,
}

#[derive(Default)]
struct State {
    expectations: HashMap<CacheKey, VecDeque<Expectation>>,
    calls: HashMap<CacheKey, usize>,
    unexpected: Vec<CacheKey>,
}

/// A scripted in-memory fetcher.
///
/// Cloning shares the script and the call log, so a test keeps one clone for
/// assertions and hands the other to the cache.
#[derive(Clone, Default)]
pub struct MockFetcher {
    state: Arc<Mutex<State>>,
    called: Arc<Notify>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for the next fetch of `key`.
    pub fn expect(&self, key: CacheKey) -> ExpectationBuilder {
        ExpectationBuilder {
            key,
            delay: None,
            gate: None,
            state: self.state.clone(),
        }
    }

    /// Number of fetches issued for `key` so far.
    pub fn calls(&self, key: &CacheKey) -> usize {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.get(key).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.values().sum()
    }

    /// Resolves once `key` has been fetched at least `count` times.
    pub async fn wait_for_calls(&self, key: &CacheKey, count: usize) {
        loop {
            let notified = self.called.notified();
            if self.calls(key) >= count {
                return;
            }
            notified.await;
        }
    }

    /// Panics if a queued response was never consumed or an unscripted key was fetched.
    pub fn verify(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !state.unexpected.is_empty() {
            panic!("Unexpected fetches: {:?}", state.unexpected);
        }
        let remaining: usize = state.expectations.values().map(VecDeque::len).sum();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, key: &CacheKey) -> Result<Value, QueryError> {
        let expectation = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            *state.calls.entry(key.clone()).or_default() += 1;
            let next = state
                .expectations
                .get_mut(key)
                .and_then(VecDeque::pop_front);
            if next.is_none() {
                state.unexpected.push(key.clone());
            }
            next
        };
        self.called.notify_waiters();

        let Some(expectation) = expectation else {
            return Err(QueryError::Network(format!("unexpected fetch: {key}")));
        };
        if let Some(gate) = expectation.gate {
            gate.notified().await;
        }
        if let Some(delay) = expectation.delay {
            tokio::time::sleep(delay).await;
        }
        expectation.response
    }
}

/// Builder for one queued response.
pub struct ExpectationBuilder {
    key: CacheKey,
    delay: Option<Duration>,
    gate: Option<Arc<Notify>>,
    state: Arc<Mutex<State>>,
}

impl ExpectationBuilder {
    /// Sleeps for `delay` before answering.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Holds the answer until the returned [`Gate`] is released.
    pub fn hold(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: Value) -> Gate {
        self.push(Ok(value))
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: QueryError) -> Gate {
        self.push(Err(error))
    }

    fn push(self, response: Result<Value, QueryError>) -> Gate {
        let gate = Gate {
            notify: self.gate.clone(),
        };
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .expectations
            .entry(self.key)
            .or_default()
            .push_back(Expectation {
                response,
                delay: self.delay,
                gate: self.gate,
            });
        gate
    }
}

/// Releases a held response.
pub struct Gate {
    notify: Option<Arc<Notify>>,
}

impl Gate {
    pub fn release(&self) {
        if let Some(notify) = &self.notify {
            notify.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ListDefaults, ListQuery};
    use serde_json::json;

    fn key() -> CacheKey {
        CacheKey::list("users", ListQuery::new(&ListDefaults::default()))
    }

    #[tokio::test]
    async fn test_mock_fetcher_with_expectations() {
        let mock = MockFetcher::new();
        mock.expect(key()).return_ok(json!({ "data": ["a"] }));
        mock.expect(key()).return_err(QueryError::Network("offline".into()));

        assert_eq!(mock.fetch(&key()).await.unwrap(), json!({ "data": ["a"] }));
        assert!(matches!(mock.fetch(&key()).await, Err(QueryError::Network(_))));
        assert_eq!(mock.calls(&key()), 2);
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected fetches")]
    async fn test_unscripted_fetch_fails_verification() {
        let mock = MockFetcher::new();
        let result = mock.fetch(&key()).await;
        assert!(result.is_err());
        mock.verify();
    }

    #[tokio::test]
    async fn test_held_response_waits_for_release() {
        let mock = MockFetcher::new();
        let gate = mock.expect(key()).hold().return_ok(json!(1));

        let fetcher = mock.clone();
        let task = tokio::spawn(async move { fetcher.fetch(&key()).await });
        mock.wait_for_calls(&key(), 1).await;
        assert!(!task.is_finished());

        gate.release();
        assert_eq!(task.await.unwrap().unwrap(), json!(1));
    }
}
