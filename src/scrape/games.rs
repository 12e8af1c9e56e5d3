//! Result and fixture rows.
//!
//! Both share the `date | home | score | away` shape; a row is a result when
//! its third cell carries a finished score and a fixture when no cell does.

use scraper::ElementRef;
use std::collections::HashSet;

use super::dom::{cells, class_or_id_contains, first_link, links, own_rows, text_of, Link, Selectors};
use super::raw::RawGameRow;
use super::text::{
    find_time, looks_like_date, looks_like_score, looks_like_time, parse_score, round_label,
    source_id_from_href, strip_time,
};

const VENUE_MARKERS: [&str; 4] = ["venue", "arena", "place", "hall"];

/// A table introduced by a "Next Round" / "Upcoming" style label
#[derive(Debug, Clone)]
pub(crate) struct UpcomingRegion<'a> {
    pub table: ElementRef<'a>,
    pub label: String,
}

pub(crate) fn scan_results(tables: &[ElementRef<'_>], sel: &Selectors) -> Vec<RawGameRow> {
    tables
        .iter()
        .flat_map(|table| own_rows(*table, sel))
        .filter_map(|tr| result_row(tr, sel))
        .collect()
}

fn result_row(tr: ElementRef<'_>, sel: &Selectors) -> Option<RawGameRow> {
    let tds = cells(tr);
    if tds.len() < 4 {
        return None;
    }
    let date = text_of(tds[0]);
    if !looks_like_date(&date) {
        return None;
    }
    // The score is usually a link to the box score
    let score = first_link(tds[2], sel)
        .map(|l| l.text)
        .unwrap_or_else(|| text_of(tds[2]));
    if !looks_like_score(&score) {
        return None;
    }

    let (home_team, home_source_id) = team_in_cell(tds[1], sel)?;
    let (away_team, away_source_id) = team_in_cell(tds[3], sel)?;

    Some(RawGameRow {
        date,
        home_team,
        home_source_id,
        away_team,
        away_source_id,
        score: Some(score),
        ..Default::default()
    })
}

fn team_in_cell(td: ElementRef<'_>, sel: &Selectors) -> Option<(String, Option<String>)> {
    if let Some(link) = team_link(td, sel) {
        let id = link.href.as_deref().and_then(source_id_from_href);
        return Some((link.text, id));
    }
    let text = text_of(td);
    text.chars()
        .any(char::is_alphabetic)
        .then_some((text, None))
}

fn team_link(td: ElementRef<'_>, sel: &Selectors) -> Option<Link> {
    links(td, sel)
        .into_iter()
        .find(|l| !l.is_player() && l.text.chars().any(char::is_alphabetic))
}

/// Fixture rows from labelled regions first, then dated rows anywhere.
pub(crate) fn scan_upcoming(
    tables: &[ElementRef<'_>],
    regions: &[UpcomingRegion<'_>],
    sel: &Selectors,
) -> Vec<RawGameRow> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for region in regions {
        if !seen.insert(region.table.id()) {
            continue;
        }
        rows.extend(
            own_rows(region.table, sel)
                .into_iter()
                .filter_map(|tr| upcoming_row(tr, Some(&region.label), sel)),
        );
    }

    for table in tables {
        if !seen.insert(table.id()) {
            continue;
        }
        rows.extend(
            own_rows(*table, sel)
                .into_iter()
                .filter_map(|tr| upcoming_row(tr, None, sel)),
        );
    }
    rows
}

/// `label` is set when the row sits in a labelled region; outside one the
/// first cell must read as a date.
fn upcoming_row(tr: ElementRef<'_>, label: Option<&str>, sel: &Selectors) -> Option<RawGameRow> {
    let tds = cells(tr);
    if tds.len() < 3 {
        return None;
    }
    let texts: Vec<String> = tds.iter().map(|td| text_of(*td)).collect();
    if label.is_none() && !looks_like_date(&texts[0]) {
        return None;
    }
    // Played already
    if texts
        .iter()
        .any(|t| looks_like_score(t) && parse_score(t).is_some())
    {
        return None;
    }

    let mut teams = tds
        .iter()
        .enumerate()
        .filter_map(|(idx, td)| team_link(*td, sel).map(|link| (idx, link)));
    let (home_idx, home) = teams.next()?;
    let (away_idx, away) = teams.next()?;

    let date = if home_idx > 0 {
        strip_time(&texts[0])
    } else {
        String::new()
    };

    let time = texts
        .iter()
        .find(|t| looks_like_time(t))
        .cloned()
        .or_else(|| find_time(&texts[0]));

    let venue = tds
        .iter()
        .position(|td| VENUE_MARKERS.iter().any(|m| class_or_id_contains(*td, m)))
        .map(|idx| texts[idx].clone())
        .filter(|t| !t.is_empty())
        .or_else(|| {
            texts
                .iter()
                .skip(away_idx + 1)
                .find(|t| is_venue_text(t))
                .cloned()
        });

    let round = texts
        .iter()
        .find_map(|t| round_label(t))
        .or_else(|| label.and_then(round_label));

    Some(RawGameRow {
        date,
        home_team: home.text,
        home_source_id: home.href.as_deref().and_then(source_id_from_href),
        away_team: away.text,
        away_source_id: away.href.as_deref().and_then(source_id_from_href),
        score: None,
        round,
        time,
        venue,
    })
}

fn is_venue_text(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
        && !looks_like_time(text)
        && !looks_like_date(text)
        && round_label(text).is_none()
        && !looks_like_score(text)
}
