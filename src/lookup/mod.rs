pub mod session;

pub use session::{SearchSession, SearchState};

use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::github::Contributions;

/// Shown when the gateway fails without a readable error body.
pub const FETCH_FAILED: &str = "Failed to fetch data";

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to reach gateway: {0}")]
    Request(#[from] reqwest::Error),

    /// Error reported by the gateway itself
    #[error("{0}")]
    Gateway(String),

    #[error("Failed to parse gateway response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for a running gateway's `/api/github` endpoint.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GatewayClient {
    pub fn new(gateway_url: &str) -> Result<GatewayClient, LookupError> {
        let http = reqwest::Client::builder()
            .user_agent("contrib-tracker")
            .build()
            .map_err(LookupError::Client)?;
        Ok(GatewayClient {
            http,
            endpoint: format!("{}/api/github", gateway_url.trim_end_matches('/')),
        })
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, username: &str) -> Result<Contributions, LookupError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("username", username)])
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| FETCH_FAILED.to_string());
            warn!(%status, %message, "gateway returned an error");
            return Err(LookupError::Gateway(message));
        }

        let contributions: Contributions = serde_json::from_slice(&body)?;
        debug!(
            issues = contributions.issues.len(),
            prs = contributions.prs.len(),
            "received contributions"
        );
        Ok(contributions)
    }
}

/// Search for every username received, rendering each state change of the
/// newest search. Blank names are skipped. Searches run concurrently; an
/// older search finishing late is dropped instead of rendered.
///
/// Returns once the input is closed and every dispatched search has finished.
pub async fn run<F>(
    client: Arc<GatewayClient>,
    mut usernames: mpsc::Receiver<String>,
    mut render: F,
) -> SearchSession
where
    F: FnMut(&SearchState),
{
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let mut session = SearchSession::new();
    let mut input_open = true;
    let mut in_flight = 0usize;

    loop {
        tokio::select! {
            next = usernames.recv(), if input_open => match next {
                Some(raw) => {
                    let username = raw.trim();
                    if username.is_empty() {
                        continue;
                    }
                    let ticket = session.begin(username);
                    info!(username, seq = ticket.seq(), "dispatching search");
                    render(session.state());

                    in_flight += 1;
                    let client = Arc::clone(&client);
                    let done_tx = done_tx.clone();
                    tokio::spawn(async move {
                        let result = client.fetch(&ticket.username).await;
                        let _ = done_tx.send((ticket, result));
                    });
                }
                None => input_open = false,
            },
            Some((ticket, result)) = done_rx.recv(), if in_flight > 0 => {
                in_flight -= 1;
                let seq = ticket.seq();
                if session.resolve(ticket, result) {
                    render(session.state());
                } else {
                    warn!(seq, "discarding response from superseded search");
                }
            }
            else => break,
        }
    }

    session
}
