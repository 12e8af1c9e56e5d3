use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{
    GameResult, RefreshPhase, StandingEntry, StatCategory, StatLeaderEntry,
    UpcomingGame,
};
use crate::services::StatsSnapshot;

// ============================================================================
// Data Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct StandingsResponse {
    pub standings: Vec<StandingEntry>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsResponse {
    pub results: Vec<GameResult>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingResponse {
    pub upcoming: Vec<UpcomingGame>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsLeadersResponse {
    pub stats_leaders: BTreeMap<StatCategory, Vec<StatLeaderEntry>>,
    pub last_updated: DateTime<Utc>,
}

/// Body of every non-2xx answer
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub last_updated: Option<DateTime<Utc>>,
}

// ============================================================================
// Refresh Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct RefreshQuery {
    /// `false` starts the cycle in the background and answers 202
    pub wait: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshAccepted {
    pub accepted: bool,
}

// ============================================================================
// System Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub phase: RefreshPhase,
    /// A cycle is running right now
    pub refreshing: bool,
    pub data_available: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub refresh_interval_secs: u64,
    pub uptime_seconds: i64,
    pub refresh: StatsSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}
