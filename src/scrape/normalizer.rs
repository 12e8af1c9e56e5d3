//! Raw sections to a typed [`Snapshot`].
//!
//! Rows with unusable numbers are dropped and counted, never guessed.
//! Normalizing the same sections twice yields equal [`LeagueData`].

use chrono::Utc;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use super::raw::{RawGameRow, RawLeaderRow, RawSection, RawStandingRow};
use super::text::{date_token, normalize_ws, parse_count, parse_score, team_key};
use crate::config::{AppConfig, LimitsConfig, DEFAULT_BASE_URL, DEFAULT_BOX_SCORE_TEMPLATE};
use crate::domain::{
    GameResult, LeagueData, Snapshot, StandingEntry, StatCategory, StatLeaderEntry, UpcomingGame,
    TBD_DATE, TBD_TIME, UNKNOWN_TEAM, UNKNOWN_VENUE,
};
use crate::error::NormalizeError;

/// Output limits and id/URL derivation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub limits: LimitsConfig,
    pub base_url: String,
    pub box_score_template: String,
}

impl NormalizeOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            limits: config.limits,
            base_url: config.source.base_url.clone(),
            box_score_template: config.source.box_score_url_template.clone(),
        }
    }

    /// Box-score link for a derived game id
    pub fn box_score_url(&self, game_id: &str) -> String {
        self.box_score_template
            .replace("{base_url}", self.base_url.trim_end_matches('/'))
            .replace("{game_id}", game_id)
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            limits: LimitsConfig::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            box_score_template: DEFAULT_BOX_SCORE_TEMPLATE.to_string(),
        }
    }
}

/// Rows dropped while normalizing, per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub standings_skipped: usize,
    pub results_skipped: usize,
    pub upcoming_skipped: usize,
    pub leaders_skipped: usize,
    /// Repeated games/teams/players, not counted as skipped
    pub duplicates: usize,
}

impl NormalizeReport {
    pub fn skipped_rows(&self) -> usize {
        self.standings_skipped + self.results_skipped + self.upcoming_skipped + self.leaders_skipped
    }
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub snapshot: Snapshot,
    pub report: NormalizeReport,
}

/// Identity of a game across pages
type GameKey = (String, String, String);

fn game_key(date: &str, home: &str, away: &str) -> GameKey {
    let date = date_token(date).unwrap_or_else(|| team_key(date));
    (date, team_key(home), team_key(away))
}

/// Seasons run from autumn into spring; dates before this `MMDD` belong to
/// the spring half.
const SEASON_TURN: &str = "0701";

/// Chronological position of a short date within the season, `None` when
/// the date cannot be read (`TBD`, empty).
fn season_position(date: &str) -> Option<(bool, String)> {
    let token = date_token(date)?;
    Some((token.as_str() < SEASON_TURN, token))
}

/// `{MMDD}_{home}_{away}`; needs a parseable date and both source ids.
pub fn derive_game_id(
    date: &str,
    home_source_id: Option<&str>,
    away_source_id: Option<&str>,
) -> Option<String> {
    let token = date_token(date)?;
    let home = home_source_id.map(str::trim).filter(|s| !s.is_empty())?;
    let away = away_source_id.map(str::trim).filter(|s| !s.is_empty())?;
    Some(format!(
        "{token}_{}_{}",
        home.to_ascii_lowercase(),
        away.to_ascii_lowercase()
    ))
}

/// Combine the raw sections of one cycle into a snapshot.
///
/// Sections are taken in order (league page before schedule page), so on
/// duplicates the earlier page wins.
pub fn normalize(
    sections: &[RawSection],
    options: &NormalizeOptions,
) -> Result<Normalized, NormalizeError> {
    let mut report = NormalizeReport::default();

    let standings = normalize_standings(sections, options.limits.standings, &mut report);
    let (results, played) = normalize_results(sections, options, &mut report);
    let upcoming = normalize_upcoming(sections, &played, options.limits.upcoming, &mut report);
    let stats = normalize_leaders(sections, options.limits.leaders, &mut report);

    let data = LeagueData {
        standings,
        results,
        upcoming,
        stats,
    };
    if data.is_empty() {
        return Err(NormalizeError::NoUsableRows {
            skipped: report.skipped_rows(),
        });
    }
    if report.skipped_rows() > 0 {
        debug!(?report, "rows skipped during normalization");
    }

    Ok(Normalized {
        snapshot: Snapshot::new(data, Utc::now()),
        report,
    })
}

struct TypedStanding {
    rank: Option<u32>,
    team: String,
    wins: u32,
    losses: u32,
}

fn type_standing(row: &RawStandingRow) -> Option<TypedStanding> {
    let team = normalize_ws(&row.team);
    if team.is_empty() {
        return None;
    }
    Some(TypedStanding {
        // A rank we cannot read only costs the explicit ordering
        rank: row
            .rank
            .as_deref()
            .and_then(parse_count)
            .filter(|r| *r > 0),
        team,
        wins: parse_count(&row.wins)?,
        losses: parse_count(&row.losses)?,
    })
}

fn normalize_standings(
    sections: &[RawSection],
    limit: usize,
    report: &mut NormalizeReport,
) -> Vec<StandingEntry> {
    let with_rows: Vec<&RawSection> = sections
        .iter()
        .filter(|s| !s.standings.rows.is_empty())
        .collect();
    let source_ordered = with_rows.iter().all(|s| s.standings.source_ordered);

    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for raw in with_rows.iter().flat_map(|s| &s.standings.rows) {
        let Some(row) = type_standing(raw) else {
            debug!(team = %raw.team, wins = %raw.wins, losses = %raw.losses, "skipping standings row");
            report.standings_skipped += 1;
            continue;
        };
        if !seen.insert(team_key(&row.team)) {
            report.duplicates += 1;
            continue;
        }
        rows.push(row);
    }

    let explicit: Option<Vec<u32>> = rows.iter().map(|r| r.rank).collect();
    let ranks_usable = explicit.as_ref().is_some_and(|ranks| {
        let unique: HashSet<_> = ranks.iter().collect();
        unique.len() == ranks.len()
    });

    let mut entries: Vec<StandingEntry> = if ranks_usable {
        let mut entries: Vec<StandingEntry> = rows
            .into_iter()
            .filter_map(|r| {
                Some(StandingEntry {
                    rank: r.rank?,
                    team: r.team,
                    wins: r.wins,
                    losses: r.losses,
                })
            })
            .collect();
        entries.sort_by_key(|e| e.rank);
        entries
    } else {
        if !source_ordered {
            rows.sort_by(|a, b| {
                b.wins
                    .cmp(&a.wins)
                    .then(a.losses.cmp(&b.losses))
                    .then_with(|| a.team.cmp(&b.team))
            });
        }
        rows.into_iter()
            .zip(1u32..)
            .map(|(r, rank)| StandingEntry {
                rank,
                team: r.team,
                wins: r.wins,
                losses: r.losses,
            })
            .collect()
    };
    entries.truncate(limit);
    entries
}

/// Teams and date shared by results and fixtures
struct Matchup {
    date: String,
    home_team: String,
    away_team: String,
    game_id: Option<String>,
}

fn matchup(row: &RawGameRow) -> Option<Matchup> {
    let home_team = normalize_ws(&row.home_team);
    let away_team = normalize_ws(&row.away_team);
    if home_team.is_empty() || away_team.is_empty() {
        return None;
    }
    let date = normalize_ws(&row.date);
    let game_id = derive_game_id(
        &date,
        row.home_source_id.as_deref(),
        row.away_source_id.as_deref(),
    );
    Some(Matchup {
        date,
        home_team,
        away_team,
        game_id,
    })
}

/// Results in source order, plus the keys of every played game
fn normalize_results(
    sections: &[RawSection],
    options: &NormalizeOptions,
    report: &mut NormalizeReport,
) -> (Vec<GameResult>, HashSet<GameKey>) {
    let mut played = HashSet::new();
    let mut results = Vec::new();

    for raw in sections.iter().flat_map(|s| &s.results) {
        let typed = matchup(raw)
            .filter(|m| !m.date.is_empty())
            .zip(raw.score.as_deref().and_then(parse_score));
        let Some((game, (home_score, away_score))) = typed else {
            debug!(date = %raw.date, score = ?raw.score, "skipping result row");
            report.results_skipped += 1;
            continue;
        };
        if !played.insert(game_key(&game.date, &game.home_team, &game.away_team)) {
            report.duplicates += 1;
            continue;
        }
        let box_score_url = game.game_id.as_deref().map(|id| options.box_score_url(id));
        results.push(GameResult {
            date: game.date,
            home_team: game.home_team,
            home_score,
            away_team: game.away_team,
            away_score,
            game_id: game.game_id,
            box_score_url,
        });
    }

    // Most recent first, undated last; stable, so page order breaks ties
    results.sort_by_key(|g| {
        let position = season_position(&g.date);
        (position.is_none(), Reverse(position))
    });
    results.truncate(options.limits.results);
    (results, played)
}

fn normalize_upcoming(
    sections: &[RawSection],
    played: &HashSet<GameKey>,
    limit: usize,
    report: &mut NormalizeReport,
) -> Vec<UpcomingGame> {
    let mut seen = HashSet::new();
    let mut upcoming = Vec::new();

    for raw in sections.iter().flat_map(|s| &s.upcoming) {
        let Some(game) = matchup(raw) else {
            debug!(home = %raw.home_team, away = %raw.away_team, "skipping upcoming row");
            report.upcoming_skipped += 1;
            continue;
        };
        let date = if game.date.is_empty() {
            TBD_DATE.to_string()
        } else {
            game.date
        };
        let key = game_key(&date, &game.home_team, &game.away_team);
        if played.contains(&key) || !seen.insert(key) {
            report.duplicates += 1;
            continue;
        }
        let clean = |v: &Option<String>| {
            v.as_deref()
                .map(normalize_ws)
                .filter(|s| !s.is_empty())
        };
        upcoming.push(UpcomingGame {
            date,
            home_team: game.home_team,
            away_team: game.away_team,
            round: clean(&raw.round),
            time: clean(&raw.time).unwrap_or_else(|| TBD_TIME.to_string()),
            venue: clean(&raw.venue).unwrap_or_else(|| UNKNOWN_VENUE.to_string()),
            game_id: game.game_id,
        });
    }

    // Soonest first, undated last
    upcoming.sort_by_key(|g| {
        let position = season_position(&g.date);
        (position.is_none(), position)
    });
    upcoming.truncate(limit);
    upcoming
}

fn type_leader(category: StatCategory, row: &RawLeaderRow) -> Option<StatLeaderEntry> {
    let player = normalize_ws(&row.player);
    let value: f64 = row.value.trim().parse().ok()?;
    if player.is_empty() || !value.is_finite() || value < 0.0 {
        return None;
    }
    let team = row
        .team
        .as_deref()
        .map(normalize_ws)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_TEAM.to_string());
    Some(StatLeaderEntry {
        category,
        player,
        team,
        value,
    })
}

fn normalize_leaders(
    sections: &[RawSection],
    limit: usize,
    report: &mut NormalizeReport,
) -> BTreeMap<StatCategory, Vec<StatLeaderEntry>> {
    StatCategory::ALL
        .into_iter()
        .map(|category| {
            let mut seen = HashSet::new();
            let mut entries = Vec::new();
            let raw_rows = sections
                .iter()
                .filter_map(|s| s.leaders.get(&category))
                .flatten();
            for raw in raw_rows {
                let Some(entry) = type_leader(category, raw) else {
                    debug!(%category, player = %raw.player, value = %raw.value, "skipping leader row");
                    report.leaders_skipped += 1;
                    continue;
                };
                if !seen.insert(team_key(&entry.player)) {
                    report.duplicates += 1;
                    continue;
                }
                entries.push(entry);
            }
            // Stable: equal values keep source order
            entries.sort_by(|a, b| b.value.total_cmp(&a.value));
            entries.truncate(limit);
            (category, entries)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::raw::{PageKind, RawStandings};

    fn standing(rank: Option<&str>, team: &str, wins: &str, losses: &str) -> RawStandingRow {
        RawStandingRow {
            rank: rank.map(str::to_string),
            team: team.to_string(),
            team_source_id: None,
            wins: wins.to_string(),
            losses: losses.to_string(),
        }
    }

    fn result(date: &str, home: (&str, &str), score: &str, away: (&str, &str)) -> RawGameRow {
        RawGameRow {
            date: date.to_string(),
            home_team: home.0.to_string(),
            home_source_id: Some(home.1.to_string()),
            away_team: away.0.to_string(),
            away_source_id: Some(away.1.to_string()),
            score: Some(score.to_string()),
            ..Default::default()
        }
    }

    fn fixture(date: &str, home: &str, away: &str) -> RawGameRow {
        RawGameRow {
            date: date.to_string(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            ..Default::default()
        }
    }

    fn leader(player: &str, team: Option<&str>, value: &str) -> RawLeaderRow {
        RawLeaderRow {
            player: player.to_string(),
            team: team.map(str::to_string),
            value: value.to_string(),
        }
    }

    fn main_section() -> RawSection {
        let mut section = RawSection::new(PageKind::MainLeague);
        section.standings = RawStandings {
            rows: vec![
                standing(Some("1"), "Al Riyadi", "8", "0"),
                standing(Some("2"), "Beirut  Club", "7", "1"),
                standing(Some("3"), "Sagesse", "x", "2"),
            ],
            source_ordered: true,
        };
        section.results = vec![
            result("Feb.9", ("Beirut Club", "2628"), "88-80", ("Homentmen", "2682")),
            result("Feb 9", ("beirut club", "2628"), "88-80", ("HOMENTMEN", "2682")),
            result("Feb.8", ("Sagesse", "2602"), "70-7a", ("Dynamo", "2603")),
        ];
        section.upcoming = vec![
            fixture("Feb.9", "Beirut Club", "Homentmen"),
            fixture("Feb.16", "Al Riyadi", "Sagesse"),
        ];
        section.leaders.insert(
            StatCategory::Ppg,
            vec![
                leader("Amir Saoud", Some("Beirut Club"), "21.0"),
                leader("Wael Arakji", Some("Al Riyadi"), "24.6"),
                leader("Ali Haidar", None, "21.0"),
                leader("Broken Row", None, "n/a"),
            ],
        );
        section
    }

    #[test]
    fn test_duplicate_results_collapse_to_one() {
        let out = normalize(&[main_section()], &NormalizeOptions::default()).unwrap();
        let results = &out.snapshot.data.results;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].date, "Feb.9");
        assert_eq!(results[0].home_team, "Beirut Club");
        assert_eq!(results[0].game_id.as_deref(), Some("0209_2628_2682"));
        assert_eq!(
            results[0].box_score_url.as_deref(),
            Some("https://www.asia-basket.com/boxscore/0209_2628_2682")
        );
        assert_eq!(out.report.results_skipped, 1);
    }

    #[test]
    fn test_played_games_leave_upcoming() {
        let out = normalize(&[main_section()], &NormalizeOptions::default()).unwrap();
        let upcoming = &out.snapshot.data.upcoming;
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].home_team, "Al Riyadi");
        assert_eq!(upcoming[0].time, TBD_TIME);
        assert_eq!(upcoming[0].venue, UNKNOWN_VENUE);
        assert_eq!(upcoming[0].game_id, None);
    }

    #[test]
    fn test_standings_skip_bad_numbers_and_keep_ranks() {
        let out = normalize(&[main_section()], &NormalizeOptions::default()).unwrap();
        let standings = &out.snapshot.data.standings;
        assert_eq!(standings.len(), 2);
        assert_eq!(standings[1].team, "Beirut Club");
        assert_eq!(standings[1].rank, 2);
        assert_eq!(out.report.standings_skipped, 1);
    }

    #[test]
    fn test_standings_without_ranks_sort_by_record() {
        let mut section = RawSection::new(PageKind::MainLeague);
        section.standings = RawStandings {
            rows: vec![
                standing(None, "Sagesse", "5", "3"),
                standing(None, "Champville", "6", "2"),
                standing(None, "Antranik", "5", "3"),
                standing(None, "champville", "1", "7"),
            ],
            source_ordered: false,
        };
        let out = normalize(&[section], &NormalizeOptions::default()).unwrap();
        let order: Vec<(u32, &str)> = out
            .snapshot
            .data
            .standings
            .iter()
            .map(|e| (e.rank, e.team.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![(1, "Champville"), (2, "Antranik"), (3, "Sagesse")]
        );
        assert_eq!(out.report.duplicates, 1);
    }

    #[test]
    fn test_duplicate_explicit_ranks_fall_back_to_source_order() {
        let mut section = RawSection::new(PageKind::MainLeague);
        section.standings = RawStandings {
            rows: vec![
                standing(Some("1"), "Sagesse", "5", "3"),
                standing(Some("1"), "Champville", "6", "2"),
            ],
            source_ordered: true,
        };
        let out = normalize(&[section], &NormalizeOptions::default()).unwrap();
        let standings = &out.snapshot.data.standings;
        assert_eq!(standings[0].team, "Sagesse");
        assert_eq!(standings[0].rank, 1);
        assert_eq!(standings[1].rank, 2);
    }

    #[test]
    fn test_leaders_sorted_stable_and_missing_categories_empty() {
        let out = normalize(&[main_section()], &NormalizeOptions::default()).unwrap();
        let ppg = out.snapshot.data.leaders(StatCategory::Ppg);
        let players: Vec<&str> = ppg.iter().map(|e| e.player.as_str()).collect();
        assert_eq!(players, vec!["Wael Arakji", "Amir Saoud", "Ali Haidar"]);
        assert_eq!(ppg[2].team, UNKNOWN_TEAM);
        assert_eq!(out.report.leaders_skipped, 1);

        assert_eq!(out.snapshot.data.stats.len(), 5);
        assert!(out.snapshot.data.leaders(StatCategory::Bpg).is_empty());
    }

    #[test]
    fn test_limits_apply() {
        let options = NormalizeOptions {
            limits: LimitsConfig {
                standings: 1,
                results: 20,
                upcoming: 5,
                leaders: 2,
            },
            ..NormalizeOptions::default()
        };
        let out = normalize(&[main_section()], &options).unwrap();
        assert_eq!(out.snapshot.data.standings.len(), 1);
        assert_eq!(out.snapshot.data.leaders(StatCategory::Ppg).len(), 2);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let sections = [main_section()];
        let options = NormalizeOptions::default();
        let first = normalize(&sections, &options).unwrap();
        let second = normalize(&sections, &options).unwrap();
        assert_eq!(first.snapshot.data, second.snapshot.data);
        assert_eq!(first.report, second.report);
    }

    #[test]
    fn test_nothing_usable_is_an_error() {
        let mut section = RawSection::new(PageKind::Schedule);
        section.results = vec![result("Feb.9", ("A", "1"), "??", ("B", "2"))];
        let err = normalize(&[section], &NormalizeOptions::default()).unwrap_err();
        assert!(matches!(err, NormalizeError::NoUsableRows { skipped: 1 }));
    }

    fn schedule_section() -> RawSection {
        let mut section = RawSection::new(PageKind::Schedule);
        section.results = vec![
            result("Feb.16", ("Sagesse", "2602"), "77-70", ("Dynamo", "2603")),
            result("Nov.3", ("Champville", "2604"), "65-60", ("Antranik", "2605")),
        ];
        section.upcoming = vec![
            fixture("", "Homentmen", "Dynamo"),
            fixture("Feb.12", "Antranik", "Sagesse"),
            fixture("Mar.1", "Champville", "Al Riyadi"),
        ];
        section
    }

    #[test]
    fn test_results_most_recent_first_across_pages() {
        let mut main = main_section();
        main.results
            .push(result("Feb.8", ("Al Riyadi", "2601"), "90-71", ("Champville", "2604")));
        let out = normalize(&[main, schedule_section()], &NormalizeOptions::default()).unwrap();
        let dates: Vec<&str> = out
            .snapshot
            .data
            .results
            .iter()
            .map(|g| g.date.as_str())
            .collect();
        assert_eq!(dates, vec!["Feb.16", "Feb.9", "Feb.8", "Nov.3"]);

        let options = NormalizeOptions {
            limits: LimitsConfig {
                results: 1,
                ..LimitsConfig::default()
            },
            ..NormalizeOptions::default()
        };
        let out = normalize(&[main_section(), schedule_section()], &options).unwrap();
        assert_eq!(out.snapshot.data.results[0].date, "Feb.16");
    }

    #[test]
    fn test_upcoming_soonest_first_and_undated_last() {
        let out = normalize(
            &[main_section(), schedule_section()],
            &NormalizeOptions::default(),
        )
        .unwrap();
        let dates: Vec<&str> = out
            .snapshot
            .data
            .upcoming
            .iter()
            .map(|g| g.date.as_str())
            .collect();
        assert_eq!(dates, vec!["Feb.12", "Feb.16", "Mar.1", TBD_DATE]);

        let options = NormalizeOptions {
            limits: LimitsConfig {
                upcoming: 1,
                ..LimitsConfig::default()
            },
            ..NormalizeOptions::default()
        };
        let out = normalize(&[main_section(), schedule_section()], &options).unwrap();
        assert_eq!(out.snapshot.data.upcoming[0].home_team, "Antranik");
    }

    #[test]
    fn test_game_id_derivation() {
        assert_eq!(
            derive_game_id("Feb.9", Some("2628"), Some("AB12")).as_deref(),
            Some("0209_2628_ab12")
        );
        assert_eq!(derive_game_id("Feb.9", Some("2628"), None), None);
        assert_eq!(derive_game_id("TBD", Some("1"), Some("2")), None);

        let options = NormalizeOptions {
            base_url: "https://stats.example/".to_string(),
            box_score_template: "{base_url}/game.aspx?id={game_id}".to_string(),
            ..NormalizeOptions::default()
        };
        assert_eq!(
            options.box_score_url("0209_1_2"),
            "https://stats.example/game.aspx?id=0209_1_2"
        );
    }
}
