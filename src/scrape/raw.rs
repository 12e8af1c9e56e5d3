use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::StatCategory;

/// Which source page a document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// League overview: standings, results, upcoming, stat leaders
    MainLeague,
    /// Fixture list: results and upcoming only
    Schedule,
}

impl PageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageKind::MainLeague => "main-league",
            PageKind::Schedule => "schedule",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" | "main-league" | "league" => Ok(PageKind::MainLeague),
            "schedule" => Ok(PageKind::Schedule),
            other => Err(format!("unknown page kind: {other}")),
        }
    }
}

/// Standings row exactly as found; numbers are still text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawStandingRow {
    pub rank: Option<String>,
    pub team: String,
    pub team_source_id: Option<String>,
    pub wins: String,
    pub losses: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawStandings {
    pub rows: Vec<RawStandingRow>,
    /// Rows came from a table in league order (not the text fallback)
    pub source_ordered: bool,
}

/// Result or fixture row. `score` is present only for played games.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawGameRow {
    pub date: String,
    pub home_team: String,
    pub home_source_id: Option<String>,
    pub away_team: String,
    pub away_source_id: Option<String>,
    pub score: Option<String>,
    pub round: Option<String>,
    pub time: Option<String>,
    pub venue: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawLeaderRow {
    pub player: String,
    pub team: Option<String>,
    pub value: String,
}

/// Everything the parser could locate on one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawSection {
    pub kind: PageKind,
    pub standings: RawStandings,
    pub results: Vec<RawGameRow>,
    pub upcoming: Vec<RawGameRow>,
    pub leaders: BTreeMap<StatCategory, Vec<RawLeaderRow>>,
}

impl RawSection {
    pub fn new(kind: PageKind) -> Self {
        Self {
            kind,
            standings: RawStandings::default(),
            results: Vec::new(),
            upcoming: Vec::new(),
            leaders: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.standings.rows.is_empty()
            && self.results.is_empty()
            && self.upcoming.is_empty()
            && self.leaders.values().all(Vec::is_empty)
    }
}
