//! Reload watcher state machine.
//!
//! ```text
//! Initializing ──baseline fetched──► Watching ──id differs──► Reloaded
//!      │                               │  ▲
//!      └─ fetch failed: stays here     └──┘ id equal / poll failed
//! ```
//!
//! Ticks fire on a fixed wall-clock schedule, independent of whether earlier
//! polls have resolved. Under [`PollPolicy::Concurrent`] polls may overlap and
//! resolve out of order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{self, Instant};

use crate::fetcher::IdFetcher;
use crate::handle::WatchHandle;
use crate::reloader::Reloader;
use crate::session::SessionId;

/// Time between two polls of the identifier endpoint.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Lifecycle of a reload watcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatcherState {
    /// Waiting for the baseline identifier.
    Initializing,
    /// Baseline captured, polling.
    Watching,
    /// Identifier changed and the reload was triggered. Terminal.
    Reloaded,
}

/// What a tick does while an earlier poll is still in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PollPolicy {
    /// Always poll. Overlapping requests are allowed.
    #[default]
    Concurrent,
    /// Skip the tick until the outstanding poll resolves.
    Serialized,
}

/// Polls the session identifier and reloads on the first change.
pub struct ReloadWatcher<F, R> {
    fetcher: Arc<F>,
    reloader: Arc<R>,
    policy: PollPolicy,
}

impl<F: IdFetcher, R: Reloader> ReloadWatcher<F, R> {
    /// Create a watcher with the default [`PollPolicy::Concurrent`].
    #[must_use]
    pub fn new(fetcher: F, reloader: R) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            reloader: Arc::new(reloader),
            policy: PollPolicy::default(),
        }
    }

    /// Set the poll policy.
    #[must_use]
    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Spawn the watcher on the current tokio runtime.
    ///
    /// Returns immediately; the baseline fetch happens in the background.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(self) -> WatchHandle {
        let (state_tx, state_rx) = watch::channel(WatcherState::Initializing);
        let task = tokio::spawn(self.run(state_tx));
        WatchHandle::new(task, state_rx)
    }

    async fn run(self, state: watch::Sender<WatcherState>) {
        let baseline = match self.fetcher.fetch().await {
            Ok(id) => Arc::new(id),
            Err(err) => {
                tracing::debug!(error = %err, "Initial session id fetch failed, live reload inactive");
                return;
            }
        };
        tracing::info!(baseline = %baseline, "Captured baseline session id");

        let state = Arc::new(state);
        state.send_replace(WatcherState::Watching);

        let in_flight = Arc::new(AtomicBool::new(false));
        let mut polls = JoinSet::new();
        let mut ticker = time::interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
        let mut tick: u64 = 0;

        loop {
            ticker.tick().await;
            while polls.try_join_next().is_some() {}

            // Dropping `polls` on exit aborts anything still outstanding.
            if current(&state) == WatcherState::Reloaded {
                break;
            }

            tick += 1;
            let serialized = self.policy == PollPolicy::Serialized;
            if serialized && in_flight.swap(true, Ordering::AcqRel) {
                tracing::trace!(tick, "Previous poll still in flight, skipping tick");
                continue;
            }

            let poll = Poll {
                tick,
                fetcher: Arc::clone(&self.fetcher),
                reloader: Arc::clone(&self.reloader),
                baseline: Arc::clone(&baseline),
                state: Arc::clone(&state),
                in_flight: serialized.then(|| Arc::clone(&in_flight)),
            };
            polls.spawn(poll.run());
        }
    }
}

fn current(state: &watch::Sender<WatcherState>) -> WatcherState {
    *state.borrow()
}

/// One tick's fetch-and-compare.
struct Poll<F, R> {
    tick: u64,
    fetcher: Arc<F>,
    reloader: Arc<R>,
    baseline: Arc<SessionId>,
    state: Arc<watch::Sender<WatcherState>>,
    in_flight: Option<Arc<AtomicBool>>,
}

impl<F: IdFetcher, R: Reloader> Poll<F, R> {
    async fn run(self) {
        let result = self.fetcher.fetch().await;
        if let Some(in_flight) = &self.in_flight {
            in_flight.store(false, Ordering::Release);
        }

        let current = match result {
            Ok(id) => id,
            Err(err) => {
                tracing::debug!(tick = self.tick, error = %err, "Session id poll failed");
                return;
            }
        };

        if current == *self.baseline {
            tracing::trace!(tick = self.tick, "Session id unchanged");
            return;
        }

        // Only the first poll to observe a change wins the transition.
        let triggered = self.state.send_if_modified(|state| {
            if *state == WatcherState::Watching {
                *state = WatcherState::Reloaded;
                true
            } else {
                false
            }
        });

        if triggered {
            tracing::info!(
                tick = self.tick,
                baseline = %self.baseline,
                current = %current,
                "Session id changed, reloading"
            );
            self.reloader.reload();
        }
    }
}
