use serde::Serialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use warp::http::StatusCode;
use warp::reply::{self, Reply, Response};
use warp::{Filter, Rejection};

use crate::config::GitHubConfig;
use crate::github::{self, Contributions, SearchClient, SearchError};

/// Body of a rejection the gateway has no specific answer for.
pub const UNKNOWN_ERROR: &str = "An unknown error occurred";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Username is required")]
    MissingUsername,

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("Failed to start gateway: {0}")]
    Bind(#[from] warp::Error),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingUsername => StatusCode::BAD_REQUEST,
            GatewayError::Search(_) | GatewayError::Bind(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_response(self) -> Response {
        error_reply(self.status(), &self.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn error_reply(status: StatusCode, message: &str) -> Response {
    reply::with_status(reply::json(&ErrorBody { error: message }), status).into_response()
}

/// Query string of `GET /api/github`.
#[derive(Debug, Default)]
pub struct ContributionsQuery {
    pub username: Option<String>,
}

impl ContributionsQuery {
    /// Build from decoded query pairs. A repeated `username` keeps its first value.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> ContributionsQuery {
        let username = pairs
            .into_iter()
            .find(|(key, _)| key == "username")
            .map(|(_, value)| value);
        ContributionsQuery { username }
    }
}

/// `GET /api/github?username=<login>`, plus JSON bodies for rejections.
pub fn routes(
    client: Arc<SearchClient>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    warp::path!("api" / "github")
        .and(warp::get())
        .and(warp::query::<Vec<(String, String)>>().map(ContributionsQuery::from_pairs))
        .and(warp::any().map(move || Arc::clone(&client)))
        .then(contributions)
        .with(warp::trace::request())
        .recover(handle_rejection)
}

async fn contributions(query: ContributionsQuery, client: Arc<SearchClient>) -> Response {
    match find_contributions(query, &client).await {
        Ok(found) => reply::json(&found).into_response(),
        Err(err) => {
            warn!(error = %err, "contributions request failed");
            err.into_response()
        }
    }
}

/// Validate the query and fan out to GitHub. No upstream call is made
/// without a non-empty username.
#[instrument(skip(client))]
pub async fn find_contributions(
    query: ContributionsQuery,
    client: &SearchClient,
) -> Result<Contributions, GatewayError> {
    let username = query
        .username
        .filter(|u| !u.is_empty())
        .ok_or(GatewayError::MissingUsername)?;

    info!(%username, "searching contributions");
    Ok(github::fetch_contributions(client, &username).await?)
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
    } else {
        warn!(?err, "unhandled rejection");
        (StatusCode::INTERNAL_SERVER_ERROR, UNKNOWN_ERROR)
    };
    Ok(error_reply(status, message))
}

/// Run the gateway until Ctrl-C.
pub async fn serve(github: &GitHubConfig, bind: SocketAddr) -> Result<(), GatewayError> {
    let client = Arc::new(SearchClient::new(github)?);
    if !client.is_authenticated() {
        warn!("no GitHub token configured, upstream requests are unauthenticated");
    }

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("shutdown signal received"),
            Err(err) => {
                // Without a handler, keep serving rather than stopping at once.
                error!(error = %err, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        }
    };
    let (addr, server) =
        warp::serve(routes(client)).try_bind_with_graceful_shutdown(bind, shutdown)?;
    info!(%addr, "gateway listening");
    server.await;
    Ok(())
}
