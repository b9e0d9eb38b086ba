//! # Query Cache Actor
//!
//! The process-wide cache behind every list screen. It owns all entries and
//! all in-flight requests, and processes its mailbox sequentially, so the
//! staleness flags need no lock and an invalidation is always ordered
//! against the fetches around it.
//!
//! ## Flights
//!
//! A fetch for a key with no fresh entry starts a *flight*: a spawned task
//! that calls the [`Fetcher`] under the request timeout and posts the result
//! back into the mailbox as [`CacheRequest::Completed`]. Later fetches for the
//! same key join the flight as waiters instead of issuing a second request.
//!
//! An invalidation that matches a flight *supersedes* it: the flight is
//! detached from its key, so the next fetch starts a new one, and its result
//! is still delivered to the waiters that joined it but never stored as a
//! fresh entry.

use crate::client::QueryClient;
use crate::error::QueryError;
use crate::fetcher::Fetcher;
use crate::message::{CacheEvent, CacheKey, CacheRequest, CacheStatus, Response};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 64;

struct Entry {
    value: Arc<Value>,
    stale: bool,
}

struct Flight {
    key: CacheKey,
    waiters: Vec<Response<Arc<Value>>>,
    superseded: bool,
}

/// The query cache actor.
///
/// Create it with [`QueryCache::new`], spawn [`run`](QueryCache::run), and
/// share the returned [`QueryClient`] with every screen.
pub struct QueryCache<F: Fetcher> {
    receiver: mpsc::Receiver<CacheRequest>,
    // Weak so the mailbox closes once every client is gone.
    mailbox: mpsc::WeakSender<CacheRequest>,
    fetcher: Arc<F>,
    entries: HashMap<CacheKey, Entry>,
    flights: HashMap<u64, Flight>,
    current: HashMap<CacheKey, u64>,
    next_flight: u64,
    events: broadcast::Sender<CacheEvent>,
    timeout: Duration,
}

impl<F: Fetcher> QueryCache<F> {
    /// Creates the cache actor and its client.
    ///
    /// * `buffer_size` - mailbox capacity.
    /// * `timeout` - per-request limit; expiry surfaces as [`QueryError::Network`].
    pub fn new(fetcher: F, buffer_size: usize, timeout: Duration) -> (Self, QueryClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let actor = Self {
            receiver,
            mailbox: sender.downgrade(),
            fetcher: Arc::new(fetcher),
            entries: HashMap::new(),
            flights: HashMap::new(),
            current: HashMap::new(),
            next_flight: 1,
            events: events.clone(),
            timeout,
        };
        (actor, QueryClient::new(sender, events))
    }

    pub async fn run(mut self) {
        info!(timeout_ms = self.timeout.as_millis() as u64, "Query cache started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CacheRequest::Fetch { key, respond_to } => self.handle_fetch(key, respond_to),
                CacheRequest::Invalidate {
                    patterns,
                    respond_to,
                } => {
                    let mut stale = 0;
                    for (key, entry) in self.entries.iter_mut() {
                        if patterns.iter().any(|p| p.matches(key)) {
                            entry.stale = true;
                            stale += 1;
                        }
                    }
                    let mut superseded = 0;
                    for flight in self.flights.values_mut() {
                        if !flight.superseded && patterns.iter().any(|p| p.matches(&flight.key)) {
                            flight.superseded = true;
                            superseded += 1;
                        }
                    }
                    self.current
                        .retain(|key, _| !patterns.iter().any(|p| p.matches(key)));

                    let resources: BTreeSet<&str> = patterns.iter().map(|p| p.resource()).collect();
                    info!(?resources, stale, superseded, "Invalidated");
                    for resource in resources {
                        let _ = self.events.send(CacheEvent::Invalidated {
                            resource: resource.to_string(),
                        });
                    }
                    let _ = respond_to.send(stale);
                }
                CacheRequest::Status { key, respond_to } => {
                    let status = if self.current.contains_key(&key) {
                        CacheStatus::Fetching
                    } else {
                        match self.entries.get(&key) {
                            Some(entry) if entry.stale => CacheStatus::Stale,
                            Some(_) => CacheStatus::Fresh,
                            None => CacheStatus::Missing,
                        }
                    };
                    let _ = respond_to.send(status);
                }
                CacheRequest::Completed { flight, result } => self.handle_completed(flight, result),
            }
        }

        info!(entries = self.entries.len(), "Query cache shutdown");
    }

    fn handle_fetch(&mut self, key: CacheKey, respond_to: Response<Arc<Value>>) {
        if let Some(entry) = self.entries.get(&key).filter(|e| !e.stale) {
            debug!(%key, "Cache hit");
            let _ = respond_to.send(Ok(entry.value.clone()));
            return;
        }

        if let Some(flight) = self
            .current
            .get(&key)
            .and_then(|id| self.flights.get_mut(id))
        {
            debug!(%key, waiters = flight.waiters.len() + 1, "Joined in-flight request");
            flight.waiters.push(respond_to);
            return;
        }

        let Some(mailbox) = self.mailbox.upgrade() else {
            let _ = respond_to.send(Err(QueryError::CacheClosed));
            return;
        };

        let id = self.next_flight;
        self.next_flight += 1;
        debug!(%key, flight = id, "Fetching");

        let fetcher = self.fetcher.clone();
        let timeout = self.timeout;
        let task_key = key.clone();
        tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, fetcher.fetch(&task_key)).await {
                Ok(result) => result,
                Err(_) => Err(QueryError::Network(format!(
                    "request timed out after {} ms",
                    timeout.as_millis()
                ))),
            };
            let _ = mailbox
                .send(CacheRequest::Completed { flight: id, result })
                .await;
        });

        self.current.insert(key.clone(), id);
        self.flights.insert(
            id,
            Flight {
                key,
                waiters: vec![respond_to],
                superseded: false,
            },
        );
    }

    fn handle_completed(&mut self, id: u64, result: Result<Value, QueryError>) {
        let Some(flight) = self.flights.remove(&id) else {
            return;
        };
        if self.current.get(&flight.key) == Some(&id) {
            self.current.remove(&flight.key);
        }

        let result = result.map(Arc::new);
        match &result {
            Ok(value) if !flight.superseded => {
                debug!(key = %flight.key, waiters = flight.waiters.len(), "Stored");
                self.entries.insert(
                    flight.key.clone(),
                    Entry {
                        value: value.clone(),
                        stale: false,
                    },
                );
            }
            Ok(_) => debug!(key = %flight.key, "Superseded result not stored"),
            Err(e) => warn!(key = %flight.key, error = %e, "Fetch failed"),
        }

        for waiter in flight.waiters {
            let _ = waiter.send(result.clone());
        }
    }
}
