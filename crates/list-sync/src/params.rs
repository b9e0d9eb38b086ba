//! # URL Parameter Store
//!
//! The single source of truth for filter, sort and page state: the current
//! query string. Reads are synchronous snapshots published through a
//! `watch` channel; writes go through one owning [`ParamActor`] so two
//! concurrent setters can never interleave and a write to one key never
//! clobbers another.

use crate::error::QueryError;
use crate::query::{format_pairs, parse_pairs};
use std::fmt;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

/// Ordered snapshot of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    pub fn parse(qs: &str) -> Self {
        Self {
            pairs: parse_pairs(qs),
        }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn to_query_string(&self) -> String {
        format_pairs(&self.pairs)
    }

    fn apply(&mut self, op: ParamOp) {
        match op {
            ParamOp::Set { key, values } => self.set(&key, values),
            ParamOp::Remove(key) => self.pairs.retain(|(k, _)| *k != key),
            ParamOp::Replace(params) => *self = params,
        }
    }

    // Replaces every occurrence of `key`, keeping the position of the first one.
    fn set(&mut self, key: &str, values: Vec<String>) {
        let values: Vec<String> = values.into_iter().filter(|v| !v.is_empty()).collect();
        let position = self.pairs.iter().position(|(k, _)| k == key);
        self.pairs.retain(|(k, _)| k != key);
        let at = position.unwrap_or(self.pairs.len());
        for (offset, value) in values.into_iter().enumerate() {
            self.pairs.insert(at + offset, (key.to_string(), value));
        }
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

/// One write against the parameter store. A batch of ops is applied atomically.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamOp {
    /// Replace all values of `key`. An empty value list removes the key.
    Set { key: String, values: Vec<String> },
    Remove(String),
    /// Replace the whole query string (navigation).
    Replace(Params),
}

impl ParamOp {
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        ParamOp::Set {
            key: key.into(),
            values: vec![value.into()],
        }
    }

    pub fn set_all(key: impl Into<String>, values: Vec<String>) -> Self {
        ParamOp::Set {
            key: key.into(),
            values,
        }
    }

    pub fn remove(key: impl Into<String>) -> Self {
        ParamOp::Remove(key.into())
    }
}

#[derive(Debug)]
pub(crate) struct ParamRequest {
    ops: Vec<ParamOp>,
    respond_to: oneshot::Sender<Params>,
}

/// The owning side of the parameter store.
///
/// Processes write batches sequentially and publishes a new snapshot only
/// when the query string actually changed.
pub struct ParamActor {
    receiver: mpsc::Receiver<ParamRequest>,
    current: Params,
    publisher: watch::Sender<Params>,
}

impl ParamActor {
    pub fn new(initial: Params, buffer_size: usize) -> (Self, ParamStore) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (publisher, snapshot) = watch::channel(initial.clone());
        let actor = Self {
            receiver,
            current: initial,
            publisher,
        };
        (actor, ParamStore { sender, snapshot })
    }

    pub async fn run(mut self) {
        info!(query = %self.current, "Param store started");

        while let Some(ParamRequest { ops, respond_to }) = self.receiver.recv().await {
            let mut next = self.current.clone();
            for op in ops {
                next.apply(op);
            }
            if next != self.current {
                debug!(query = %next, "Params changed");
                self.current = next.clone();
                self.publisher.send_replace(next);
            }
            let _ = respond_to.send(self.current.clone());
        }

        info!(query = %self.current, "Param store shutdown");
    }
}

/// Cloneable handle to the parameter store.
#[derive(Clone)]
pub struct ParamStore {
    sender: mpsc::Sender<ParamRequest>,
    snapshot: watch::Receiver<Params>,
}

impl ParamStore {
    pub fn get(&self, key: &str) -> Option<String> {
        self.snapshot.borrow().get(key).map(String::from)
    }

    /// Value of `key`, or the caller's default when the key is absent.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_all(&self, key: &str) -> Vec<String> {
        self.snapshot
            .borrow()
            .get_all(key)
            .into_iter()
            .map(String::from)
            .collect()
    }

    pub fn snapshot(&self) -> Params {
        self.snapshot.borrow().clone()
    }

    pub fn query_string(&self) -> String {
        self.snapshot.borrow().to_query_string()
    }

    /// A receiver that wakes on the next change after this call.
    pub fn subscribe(&self) -> watch::Receiver<Params> {
        let mut receiver = self.snapshot.clone();
        receiver.borrow_and_update();
        receiver
    }

    /// Applies a batch of writes atomically and returns the resulting snapshot.
    pub async fn apply(&self, ops: Vec<ParamOp>) -> Result<Params, QueryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ParamRequest { ops, respond_to })
            .await
            .map_err(|_| QueryError::StoreClosed)?;
        response.await.map_err(|_| QueryError::StoreClosed)
    }

    pub async fn set(&self, key: &str, value: impl Into<String>) -> Result<Params, QueryError> {
        self.apply(vec![ParamOp::set(key, value)]).await
    }

    pub async fn set_all(&self, key: &str, values: Vec<String>) -> Result<Params, QueryError> {
        self.apply(vec![ParamOp::set_all(key, values)]).await
    }

    pub async fn remove(&self, key: &str) -> Result<Params, QueryError> {
        self.apply(vec![ParamOp::remove(key)]).await
    }

    /// Replaces the whole query string, as a browser navigation would.
    pub async fn navigate(&self, qs: &str) -> Result<Params, QueryError> {
        self.apply(vec![ParamOp::Replace(Params::parse(qs))]).await
    }
}
