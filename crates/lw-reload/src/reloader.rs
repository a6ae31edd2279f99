//! Reload primitive.

/// Reloads whatever is displaying the development server's output.
///
/// Invoked at most once per watcher. The return value is never observed; an
/// implementation that can fail should log and carry on.
///
/// `reload` is called synchronously from a poll task on a tokio worker. It
/// must not block: hand slow work (processes, I/O) to `tokio::spawn` or
/// `spawn_blocking` and return.
pub trait Reloader: Send + Sync + 'static {
    /// Reload the current document.
    fn reload(&self);
}

impl<F> Reloader for F
where
    F: Fn() + Send + Sync + 'static,
{
    fn reload(&self) {
        self();
    }
}
