use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state reported by GitHub for issues and pull requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    Open,
    Closed,
}

impl ItemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemState::Open => "open",
            ItemState::Closed => "closed",
        }
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An issue authored by the searched user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub title: String,
    pub state: ItemState,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    /// Set by GitHub once the issue is closed
    pub closed_at: Option<DateTime<Utc>>,
}

impl Issue {
    /// Issues display their raw state.
    pub fn status(&self) -> String {
        self.state.to_string()
    }
}

/// A pull request authored by the searched user.
///
/// Merging is not a third state: a merged PR is `closed` with `merged_at` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: u64,
    pub title: String,
    pub state: ItemState,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }

    /// "Merged" when a merge timestamp exists, otherwise the capitalized state.
    pub fn status(&self) -> String {
        if self.is_merged() {
            return "Merged".to_string();
        }
        capitalize(self.state.as_str())
    }
}

/// Combined gateway payload: `{ "issues": [...], "prs": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contributions {
    pub issues: Vec<Issue>,
    pub prs: Vec<PullRequest>,
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Body of `GET /search/issues`. A missing or null `items` reads as empty.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResults<T> {
    items: Option<Vec<T>>,
}

impl<T> SearchResults<T> {
    pub(crate) fn into_items(self) -> Vec<T> {
        self.items.unwrap_or_default()
    }
}

/// A PR as it appears in search results. The merge timestamp lives under
/// `pull_request` there; some payloads also carry it at the top level.
#[derive(Debug, Deserialize)]
pub(crate) struct PullRequestItem {
    id: u64,
    title: String,
    state: ItemState,
    html_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
    pull_request: Option<PullRequestRef>,
}

#[derive(Debug, Deserialize)]
struct PullRequestRef {
    merged_at: Option<DateTime<Utc>>,
}

impl From<PullRequestItem> for PullRequest {
    fn from(item: PullRequestItem) -> Self {
        let merged_at = item
            .merged_at
            .or_else(|| item.pull_request.and_then(|pr| pr.merged_at));
        PullRequest {
            id: item.id,
            title: item.title,
            state: item.state,
            html_url: item.html_url,
            created_at: item.created_at,
            updated_at: item.updated_at,
            merged_at,
        }
    }
}
