//! # Debounced Input
//!
//! Decouples fast keystroke input from parameter store writes. The raw value
//! is updated synchronously on every change; the committed value trails it
//! and only moves once input has been quiet for the full delay.

use std::future::Future;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

#[derive(Debug)]
enum Command {
    Input(String),
    Reset(String),
    Cancel,
}

/// An explicit debounce timer running on its own task.
///
/// Every [`on_change`](Debouncer::on_change) restarts the timer. When the
/// timer fires, the committed value becomes the latest raw value and the
/// commit callback runs with it. Dropping the debouncer aborts the task, so
/// a pending commit never fires after its owner is gone.
pub struct Debouncer {
    commands: mpsc::UnboundedSender<Command>,
    raw: watch::Sender<String>,
    committed: watch::Receiver<String>,
    task: JoinHandle<()>,
}

impl Debouncer {
    pub fn spawn<F, Fut>(initial: impl Into<String>, delay: Duration, mut on_commit: F) -> Self
    where
        F: FnMut(String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let initial = initial.into();
        let (commands, mut receiver) = mpsc::unbounded_channel();
        let (raw, _) = watch::channel(initial.clone());
        let (committed_tx, committed) = watch::channel(initial);

        let task = tokio::spawn(async move {
            let mut pending: Option<(String, Instant)> = None;
            loop {
                let deadline = pending.as_ref().map(|(_, at)| *at);
                tokio::select! {
                    command = receiver.recv() => match command {
                        Some(Command::Input(value)) => {
                            trace!(%value, "Debounce timer restarted");
                            pending = Some((value, Instant::now() + delay));
                        }
                        Some(Command::Reset(value)) => {
                            pending = None;
                            committed_tx.send_replace(value);
                        }
                        Some(Command::Cancel) => pending = None,
                        None => break,
                    },
                    _ = wait_for(deadline) => {
                        if let Some((value, _)) = pending.take() {
                            if *committed_tx.borrow() == value {
                                continue;
                            }
                            debug!(%value, "Debounced value committed");
                            committed_tx.send_replace(value.clone());
                            on_commit(value).await;
                        }
                    }
                }
            }
        });

        Self {
            commands,
            raw,
            committed,
            task,
        }
    }

    /// Records a keystroke: updates the raw value now, commits later.
    pub fn on_change(&self, value: impl Into<String>) {
        let value = value.into();
        self.raw.send_replace(value.clone());
        let _ = self.commands.send(Command::Input(value));
    }

    pub fn raw_value(&self) -> String {
        self.raw.borrow().clone()
    }

    pub fn committed_value(&self) -> String {
        self.committed.borrow().clone()
    }

    /// Sets both values without firing the callback, dropping any pending commit.
    ///
    /// Used when the committed value changes from outside (navigation).
    pub fn reset(&self, value: impl Into<String>) {
        let value = value.into();
        self.raw.send_replace(value.clone());
        let _ = self.commands.send(Command::Reset(value));
    }

    /// Drops the pending commit, if any.
    pub fn cancel(&self) {
        let _ = self.commands.send(Command::Cancel);
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
