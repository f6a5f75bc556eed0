pub mod types;

pub use types::{Contributions, Issue, ItemState, PullRequest};

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::GitHubConfig;
use types::{PullRequestItem, SearchResults};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("GitHub API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to fetch data from GitHub")]
    UpstreamStatus { issues: StatusCode, prs: StatusCode },

    #[error("Failed to parse GitHub response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Which half of a user's contributions a search covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Issue,
    PullRequest,
}

impl SearchKind {
    /// Value of the `type:` qualifier in a search query.
    pub fn qualifier(self) -> &'static str {
        match self {
            SearchKind::Issue => "issue",
            SearchKind::PullRequest => "pr",
        }
    }
}

/// Build the `q` parameter for a search. Sent form-encoded, so the space
/// goes over the wire as `+` (`author:octocat+type:issue`).
pub fn search_query(username: &str, kind: SearchKind) -> String {
    format!("author:{} type:{}", username, kind.qualifier())
}

/// Client for GitHub's issue search endpoint.
///
/// Cheap to share: the inner reqwest client pools connections.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    search_url: String,
    token: Option<String>,
}

impl SearchClient {
    pub fn new(config: &GitHubConfig) -> Result<SearchClient, SearchError> {
        let http = reqwest::Client::builder()
            .user_agent("contrib-tracker")
            .build()
            .map_err(SearchError::Client)?;

        Ok(SearchClient {
            http,
            search_url: format!("{}/search/issues", config.api_url()),
            token: config.token().map(str::to_string),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Issue one search request and return the raw response, whatever its status.
    #[instrument(skip(self))]
    pub async fn send(
        &self,
        username: &str,
        kind: SearchKind,
    ) -> Result<reqwest::Response, SearchError> {
        let mut request = self
            .http
            .get(&self.search_url)
            .query(&[("q", search_query(username, kind))])
            .header(ACCEPT, "application/vnd.github+json")
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        debug!(status = %response.status(), "upstream search responded");
        Ok(response)
    }
}

/// Fetch a user's authored issues and pull requests.
///
/// Both searches are sent concurrently and both must succeed; a non-success
/// status from either one fails the whole fetch with no partial result.
#[instrument(skip(client))]
pub async fn fetch_contributions(
    client: &SearchClient,
    username: &str,
) -> Result<Contributions, SearchError> {
    let (issues_response, prs_response) = tokio::try_join!(
        client.send(username, SearchKind::Issue),
        client.send(username, SearchKind::PullRequest),
    )?;

    let issues_status = issues_response.status();
    let prs_status = prs_response.status();
    if !issues_status.is_success() || !prs_status.is_success() {
        warn!(issues = %issues_status, prs = %prs_status, "upstream search failed");
        return Err(SearchError::UpstreamStatus {
            issues: issues_status,
            prs: prs_status,
        });
    }

    let (issues, pr_items) = tokio::try_join!(
        decode_items::<Issue>(issues_response),
        decode_items::<PullRequestItem>(prs_response),
    )?;
    let prs: Vec<PullRequest> = pr_items.into_iter().map(PullRequest::from).collect();

    debug!(issues = issues.len(), prs = prs.len(), "fetched contributions");
    Ok(Contributions { issues, prs })
}

async fn decode_items<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<Vec<T>, SearchError> {
    let body = response.bytes().await?;
    let results: SearchResults<T> = serde_json::from_slice(&body)?;
    Ok(results.into_items())
}
