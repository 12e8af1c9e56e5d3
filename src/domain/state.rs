use serde::{Deserialize, Serialize};
use std::fmt;

/// Refresh cycle state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPhase {
    /// Waiting for the next tick or an on-demand trigger
    Idle,
    /// Downloading source pages
    Fetching,
    /// Locating markup regions
    Parsing,
    /// Building the typed snapshot
    Normalizing,
    /// Swapping the snapshot into the cache
    Installing,
}

impl RefreshPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshPhase::Idle => "IDLE",
            RefreshPhase::Fetching => "FETCHING",
            RefreshPhase::Parsing => "PARSING",
            RefreshPhase::Normalizing => "NORMALIZING",
            RefreshPhase::Installing => "INSTALLING",
        }
    }

    /// Check if this phase can transition to another phase
    pub fn can_transition_to(&self, target: RefreshPhase) -> bool {
        use RefreshPhase::*;

        match (self, target) {
            (Idle, Fetching) => true,
            (Fetching, Parsing) => true,
            (Parsing, Normalizing) => true,
            (Normalizing, Installing) => true,
            (Installing, Idle) => true,

            // Any stage failure aborts the cycle
            (Fetching, Idle) | (Parsing, Idle) | (Normalizing, Idle) => true,

            _ => false,
        }
    }

    /// Is a cycle currently running?
    pub fn is_in_cycle(&self) -> bool {
        !matches!(self, RefreshPhase::Idle)
    }
}

impl fmt::Display for RefreshPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for RefreshPhase {
    fn default() -> Self {
        Self::Idle
    }
}
