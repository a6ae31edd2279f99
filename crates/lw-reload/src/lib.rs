//! Live reload watcher for the lw development server.
//!
//! Polls the development server's session identifier and triggers a full
//! reload the first time it differs from the identifier observed at startup.
//!
//! # Quick Start
//!
//! ```ignore
//! use lw_reload::{HttpIdFetcher, ReloadWatcher};
//!
//! #[tokio::main]
//! async fn main() {
//!     let fetcher = HttpIdFetcher::new("http://localhost:8080");
//!     let handle = ReloadWatcher::new(fetcher, || println!("reload")).start();
//!     handle.join().await;
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ReloadWatcher ──GET /id──► development server
//!      │                          │
//!      │◄──── session id ─────────┘
//!      │
//!      ├─► baseline (first successful fetch, never updated)
//!      │
//!      └─► every 500 ms: fetch, compare with baseline
//!                │
//!                └─► differs ──► Reloader::reload (exactly once)
//! ```

mod error;
mod fetcher;
mod handle;
mod reloader;
mod session;
mod watcher;

pub use error::NetworkError;
pub use fetcher::{HttpIdFetcher, ID_ENDPOINT, IdFetcher};
pub use handle::WatchHandle;
pub use reloader::Reloader;
pub use session::SessionId;
pub use watcher::{POLL_INTERVAL, PollPolicy, ReloadWatcher, WatcherState};
