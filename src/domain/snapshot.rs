use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::league::{GameResult, StandingEntry, StatCategory, StatLeaderEntry, UpcomingGame};

/// League content of one refresh cycle, comparable without the timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueData {
    pub standings: Vec<StandingEntry>,
    pub results: Vec<GameResult>,
    pub upcoming: Vec<UpcomingGame>,
    #[serde(rename = "stats_leaders")]
    pub stats: BTreeMap<StatCategory, Vec<StatLeaderEntry>>,
}

impl LeagueData {
    /// Every category present with an empty list
    pub fn empty() -> Self {
        Self {
            standings: Vec::new(),
            results: Vec::new(),
            upcoming: Vec::new(),
            stats: StatCategory::ALL
                .into_iter()
                .map(|c| (c, Vec::new()))
                .collect(),
        }
    }

    pub fn leaders(&self, category: StatCategory) -> &[StatLeaderEntry] {
        self.stats.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.standings.is_empty()
            && self.results.is_empty()
            && self.upcoming.is_empty()
            && self.stats.values().all(Vec::is_empty)
    }
}

impl Default for LeagueData {
    fn default() -> Self {
        Self::empty()
    }
}

/// Immutable result of one successful refresh cycle.
///
/// Shared as `Arc<Snapshot>`; a reader holding an older snapshot keeps it
/// alive after the cache has moved on.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    #[serde(flatten)]
    pub data: LeagueData,
    #[serde(rename = "last_updated")]
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(data: LeagueData, fetched_at: DateTime<Utc>) -> Self {
        Self { data, fetched_at }
    }

    /// Find a game by derived id, results first
    pub fn find_game(&self, game_id: &str) -> Option<GameRef<'_>> {
        let wanted = game_id.trim();
        let matches = |id: &Option<String>| {
            id.as_deref()
                .is_some_and(|id| id.eq_ignore_ascii_case(wanted))
        };

        if let Some(game) = self.data.results.iter().find(|g| matches(&g.game_id)) {
            return Some(GameRef::Result(game));
        }
        self.data
            .upcoming
            .iter()
            .find(|g| matches(&g.game_id))
            .map(GameRef::Upcoming)
    }

    pub fn row_counts(&self) -> RowCounts {
        RowCounts {
            standings: self.data.standings.len(),
            results: self.data.results.len(),
            upcoming: self.data.upcoming.len(),
            leaders: self.data.stats.values().map(Vec::len).sum(),
        }
    }
}

/// Borrowed view of a game found by id
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "game", rename_all = "lowercase")]
pub enum GameRef<'a> {
    Result(&'a GameResult),
    Upcoming(&'a UpcomingGame),
}

impl GameRef<'_> {
    pub fn to_record(&self) -> GameRecord {
        match self {
            GameRef::Result(g) => GameRecord::Result((*g).clone()),
            GameRef::Upcoming(g) => GameRecord::Upcoming((*g).clone()),
        }
    }
}

/// Owned counterpart of [`GameRef`], for callers that outlive the snapshot borrow
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "game", rename_all = "lowercase")]
pub enum GameRecord {
    Result(GameResult),
    Upcoming(UpcomingGame),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    pub standings: usize,
    pub results: usize,
    pub upcoming: usize,
    pub leaders: usize,
}
