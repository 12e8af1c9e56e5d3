use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Venue shown when the source does not name one
pub const UNKNOWN_VENUE: &str = "Unknown";
/// Tip-off time shown when the source does not give one
pub const TBD_TIME: &str = "TBD";
/// Date shown for a fixture the source has not dated yet
pub const TBD_DATE: &str = "TBD";
/// Team shown for a stat leader whose club the source omits
pub const UNKNOWN_TEAM: &str = "Unknown";

/// One row of the league table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingEntry {
    pub rank: u32,
    pub team: String,
    pub wins: u32,
    pub losses: u32,
}

/// A completed game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub date: String,
    pub home_team: String,
    pub home_score: u32,
    pub away_team: String,
    pub away_score: u32,
    pub game_id: Option<String>,
    pub box_score_url: Option<String>,
}

/// A scheduled game without a score yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingGame {
    pub date: String,
    pub home_team: String,
    pub away_team: String,
    pub round: Option<String>,
    pub time: String,
    pub venue: String,
    /// Used for lookups only; not part of the upcoming list contract
    #[serde(skip)]
    pub game_id: Option<String>,
}

/// Per-game stat leader categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatCategory {
    Ppg,
    Rpg,
    Apg,
    Spg,
    Bpg,
}

impl StatCategory {
    pub const ALL: [StatCategory; 5] = [
        StatCategory::Ppg,
        StatCategory::Rpg,
        StatCategory::Apg,
        StatCategory::Spg,
        StatCategory::Bpg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatCategory::Ppg => "ppg",
            StatCategory::Rpg => "rpg",
            StatCategory::Apg => "apg",
            StatCategory::Spg => "spg",
            StatCategory::Bpg => "bpg",
        }
    }

    /// Labels the source uses to head a leader block, most specific first
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            StatCategory::Ppg => &["PPG", "Points"],
            StatCategory::Rpg => &["RPG", "Rebounds"],
            StatCategory::Apg => &["APG", "Assists"],
            StatCategory::Spg => &["SPG", "Steals"],
            StatCategory::Bpg => &["BPG", "Blocks"],
        }
    }
}

impl fmt::Display for StatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StatCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        StatCategory::ALL
            .into_iter()
            .find(|c| {
                c.as_str().eq_ignore_ascii_case(s)
                    || c.labels().iter().any(|l| l.eq_ignore_ascii_case(s))
            })
            .ok_or_else(|| format!("unknown stat category: {s}"))
    }
}

/// One player in a leader list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatLeaderEntry {
    /// Implied by the map key in the JSON contract
    #[serde(skip)]
    pub category: StatCategory,
    pub player: String,
    pub team: String,
    pub value: f64,
}
