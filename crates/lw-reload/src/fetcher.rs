//! Session identifier fetching.
//!
//! [`IdFetcher`] is the seam between the watcher and the network. The HTTP
//! implementation uses a sync ureq agent moved onto tokio's blocking pool, so
//! polling never stalls the runtime.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use ureq::Agent;

use crate::error::NetworkError;
use crate::session::SessionId;

/// Path of the identifier endpoint on the development server.
pub const ID_ENDPOINT: &str = "/id";

/// Source of the current session identifier.
pub trait IdFetcher: Send + Sync + 'static {
    /// Fetch the current session identifier.
    ///
    /// No retry is attempted; failures go straight to the caller.
    fn fetch(&self) -> impl Future<Output = Result<SessionId, NetworkError>> + Send;
}

impl<T: IdFetcher> IdFetcher for Arc<T> {
    fn fetch(&self) -> impl Future<Output = Result<SessionId, NetworkError>> + Send {
        (**self).fetch()
    }
}

/// Fetches the session identifier with `GET {origin}/id`.
///
/// The body is taken as raw bytes with no charset or length constraint.
/// The agent has no timeout: a request the server never answers simply never
/// resolves.
#[derive(Clone)]
pub struct HttpIdFetcher {
    agent: Agent,
    url: String,
}

impl HttpIdFetcher {
    /// Create a fetcher for the development server at `origin`
    /// (e.g. `http://localhost:8080`).
    #[must_use]
    pub fn new(origin: &str) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            url: format!("{}{ID_ENDPOINT}", origin.trim_end_matches('/')),
        }
    }

    /// Full identifier endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Debug for HttpIdFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpIdFetcher")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl IdFetcher for HttpIdFetcher {
    async fn fetch(&self) -> Result<SessionId, NetworkError> {
        let agent = self.agent.clone();
        let url = self.url.clone();

        tokio::task::spawn_blocking(move || fetch_blocking(&agent, &url))
            .await
            .map_err(|e| NetworkError::Interrupted(e.to_string()))?
    }
}

/// Issue the request and read the raw body, untouched and unbounded.
fn fetch_blocking(agent: &Agent, url: &str) -> Result<SessionId, NetworkError> {
    let mut response = agent.get(url).call().map_err(NetworkError::Request)?;

    let status = response.status();
    if !status.is_success() {
        return Err(NetworkError::Status {
            status: status.as_u16(),
        });
    }

    let body = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()
        .map_err(NetworkError::Body)?;

    Ok(SessionId::from(body))
}
