use chrono::{DateTime, Utc};

use crate::services::LeagueService;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// League data and refresh control
    pub league: LeagueService,

    /// Application start time
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(league: LeagueService) -> Self {
        Self {
            league,
            start_time: Utc::now(),
        }
    }

    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }
}
