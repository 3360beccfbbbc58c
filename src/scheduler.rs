//! Named periodic tasks with cancellation.
//!
//! Every live view registers one poller here instead of owning its own timer.
//! A poller fetches immediately, then once per period. It never overlaps
//! itself: the next tick is only awaited after the current fetch finished, and
//! ticks missed while a slow fetch was running are skipped.
//!
//! Each poller runs under a child of the scheduler's root token. Cancelling a
//! poller drops its in-flight fetch, and a result that raced the cancellation
//! is discarded rather than applied.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

struct PeriodicTask {
    period: Duration,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct Scheduler {
    root: CancellationToken,
    tasks: HashMap<&'static str, PeriodicTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_parent(&CancellationToken::new())
    }

    /// Scheduler whose tasks also stop when `parent` is cancelled.
    pub fn with_parent(parent: &CancellationToken) -> Self {
        Self {
            root: parent.child_token(),
            tasks: HashMap::new(),
        }
    }

    /// Register a poller. A running poller with the same name is cancelled first.
    ///
    /// `fetch` produces one result per tick; `apply` receives it unless the
    /// poller was cancelled in the meantime.
    pub fn spawn_poller<T, F, Fut, A>(
        &mut self,
        name: &'static str,
        period: Duration,
        mut fetch: F,
        mut apply: A,
    ) where
        T: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        A: FnMut(T) + Send + 'static,
    {
        if let Some(previous) = self.tasks.remove(name) {
            tracing::debug!(task = name, "replacing running poller");
            previous.token.cancel();
        }

        let token = self.root.child_token();
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let outcome = tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    outcome = fetch() => outcome,
                };
                if task_token.is_cancelled() {
                    break;
                }
                apply(outcome);
            }
            tracing::debug!(task = name, "poller stopped");
        });

        tracing::debug!(task = name, ?period, "poller started");
        self.tasks.insert(
            name,
            PeriodicTask {
                period,
                token,
                handle,
            },
        );
    }

    /// Cancel one poller. Returns `false` if no poller has that name.
    pub fn cancel(&mut self, name: &str) -> bool {
        match self.tasks.remove(name) {
            Some(task) => {
                task.token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.tasks
            .get(name)
            .map_or(false, |task| !task.token.is_cancelled() && !task.handle.is_finished())
    }

    pub fn period(&self, name: &str) -> Option<Duration> {
        self.tasks.get(name).map(|task| task.period)
    }

    pub fn task_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.tasks.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Token cancelled when the scheduler shuts down.
    pub fn token(&self) -> CancellationToken {
        self.root.clone()
    }

    /// Cancel every poller and wait for all of them to exit.
    pub async fn shutdown(mut self) {
        self.root.cancel();
        let (names, handles): (Vec<_>, Vec<_>) = self
            .tasks
            .drain()
            .map(|(name, task)| (name, task.handle))
            .unzip();
        for (name, joined) in names.into_iter().zip(join_all(handles).await) {
            if let Err(e) = joined {
                tracing::warn!(task = name, "poller ended abnormally: {e}");
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
