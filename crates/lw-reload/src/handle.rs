//! Handle to a running watcher.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::watcher::WatcherState;

/// Handle to a started [`ReloadWatcher`](crate::ReloadWatcher).
///
/// The watcher never stops itself: it polls until it reloads or until the
/// embedder calls [`stop`](Self::stop). Dropping the handle detaches the
/// watcher without stopping it.
#[derive(Debug)]
pub struct WatchHandle {
    task: JoinHandle<()>,
    state: watch::Receiver<WatcherState>,
}

impl WatchHandle {
    pub(crate) fn new(task: JoinHandle<()>, state: watch::Receiver<WatcherState>) -> Self {
        Self { task, state }
    }

    /// Current watcher state.
    #[must_use]
    pub fn state(&self) -> WatcherState {
        *self.state.borrow()
    }

    /// Subscribe to state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WatcherState> {
        self.state.clone()
    }

    /// Wait until the watcher has triggered its reload.
    ///
    /// Returns `false` if the watcher ended without reloading (the initial
    /// fetch failed, or it was stopped).
    pub async fn wait_for_reload(&mut self) -> bool {
        self.state
            .wait_for(|state| *state == WatcherState::Reloaded)
            .await
            .is_ok()
    }

    /// Whether the schedule has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop polling and abort in-flight polls.
    ///
    /// A reload already triggered is not undone.
    pub fn stop(&self) {
        self.task.abort();
    }

    /// Wait for the schedule to end and return the final state.
    pub async fn join(self) -> WatcherState {
        if let Err(err) = self.task.await
            && err.is_panic()
        {
            tracing::warn!(error = %err, "Reload watcher panicked");
        }
        *self.state.borrow()
    }
}
