use crate::github::Contributions;

use super::LookupError;

/// Handle for one dispatched search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    pub username: String,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What the view currently shows.
#[derive(Debug, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Loading {
        username: String,
    },
    Loaded {
        username: String,
        contributions: Contributions,
    },
    Failed {
        username: String,
        message: String,
    },
}

/// Single "current search" slot.
///
/// Every search gets a ticket with a higher sequence number than the last;
/// only the newest ticket may write its outcome, so a slow earlier search
/// can never overwrite a later one.
#[derive(Debug, Default)]
pub struct SearchSession {
    latest: u64,
    state: SearchState,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a search, replacing whatever was shown before.
    pub fn begin(&mut self, username: &str) -> Ticket {
        self.latest += 1;
        self.state = SearchState::Loading {
            username: username.to_string(),
        };
        Ticket {
            seq: self.latest,
            username: username.to_string(),
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.seq == self.latest
    }

    /// Store a finished search. Returns false, leaving the state untouched,
    /// if a newer search has been started since.
    pub fn resolve(&mut self, ticket: Ticket, result: Result<Contributions, LookupError>) -> bool {
        if !self.is_current(&ticket) {
            return false;
        }
        let username = ticket.username;
        self.state = match result {
            Ok(contributions) => SearchState::Loaded {
                username,
                contributions,
            },
            Err(err) => SearchState::Failed {
                username,
                message: err.to_string(),
            },
        };
        true
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }
}
