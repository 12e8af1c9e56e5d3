//! Stat leader blocks (`PPG`, `RPG`, ...).
//!
//! Each block is headed by an element whose own text names the category;
//! the block itself is the closest ancestor that holds player links and no
//! other category heading.

use scraper::ElementRef;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use super::dom::{links, own_text, text_of, Link, Selectors};
use super::raw::RawLeaderRow;
use super::text::{last_number, strip_numbers, team_key};
use crate::domain::StatCategory;

const MAX_HEADING_LEN: usize = 40;
const MAX_CONTAINER_DEPTH: usize = 6;
const ROW_ELEMENTS: [&str; 4] = ["tr", "li", "div", "p"];
const SKIPPED_ELEMENTS: [&str; 5] = ["a", "script", "style", "title", "option"];

pub(crate) fn scan(
    root: ElementRef<'_>,
    sel: &Selectors,
) -> BTreeMap<StatCategory, Vec<RawLeaderRow>> {
    StatCategory::ALL
        .into_iter()
        .map(|category| (category, scan_category(root, category, sel)))
        .collect()
}

fn scan_category(
    root: ElementRef<'_>,
    category: StatCategory,
    sel: &Selectors,
) -> Vec<RawLeaderRow> {
    // Abbreviation headings first; long labels ("Points") also appear in
    // unrelated table headers
    for label in category.labels() {
        let headings = root
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| is_heading(*el, label));
        for heading in headings {
            let Some(container) = container_of(heading, category, sel) else {
                continue;
            };
            let rows = leader_rows(container, sel);
            if !rows.is_empty() {
                return rows;
            }
        }
    }
    debug!(category = %category, "no stat leader block found");
    Vec::new()
}

fn is_heading(el: ElementRef<'_>, label: &str) -> bool {
    if SKIPPED_ELEMENTS.contains(&el.value().name()) {
        return false;
    }
    let own = own_text(el);
    !own.is_empty()
        && own.len() <= MAX_HEADING_LEN
        && own
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word.eq_ignore_ascii_case(label))
}

fn heads_other_category(el: ElementRef<'_>, category: StatCategory) -> bool {
    StatCategory::ALL
        .into_iter()
        .filter(|other| *other != category)
        .any(|other| is_heading(el, other.labels()[0]))
}

fn container_of<'a>(
    heading: ElementRef<'a>,
    category: StatCategory,
    sel: &Selectors,
) -> Option<ElementRef<'a>> {
    std::iter::once(heading)
        .chain(heading.ancestors().filter_map(ElementRef::wrap))
        .take(MAX_CONTAINER_DEPTH + 1)
        .take_while(|el| !matches!(el.value().name(), "body" | "html"))
        .take_while(|el| {
            !el.descendants()
                .filter_map(ElementRef::wrap)
                .any(|d| heads_other_category(d, category))
        })
        .find(|el| links(*el, sel).iter().any(Link::is_player))
}

fn leader_rows(container: ElementRef<'_>, sel: &Selectors) -> Vec<RawLeaderRow> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for anchor in container.select(&sel.a) {
        let link = Link::from_element(anchor);
        if !link.is_player() || link.text.is_empty() {
            continue;
        }
        if !seen.insert(team_key(&link.text)) {
            continue;
        }

        let row = row_of(anchor, container);
        let Some(value) = last_number(&text_of(row)) else {
            debug!(player = %link.text, "leader row without a value");
            continue;
        };
        let team = team_of(row, &link.text, sel);
        rows.push(RawLeaderRow {
            player: link.text,
            team,
            value,
        });
    }
    rows
}

/// Closest row-like ancestor of a player link, never leaving the block.
fn row_of<'a>(anchor: ElementRef<'a>, container: ElementRef<'a>) -> ElementRef<'a> {
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take_while(|el| el.id() != container.id())
        .find(|el| ROW_ELEMENTS.contains(&el.value().name()))
        .unwrap_or(container)
}

fn team_of(row: ElementRef<'_>, player: &str, sel: &Selectors) -> Option<String> {
    let linked = links(row, sel)
        .into_iter()
        .find(|l| !l.is_player() && l.text.chars().any(char::is_alphabetic))
        .map(|l| l.text);
    if linked.is_some() {
        return linked;
    }

    row.text()
        .map(strip_numbers)
        .find(|t| {
            t.chars().next().is_some_and(char::is_uppercase)
                && !t.eq_ignore_ascii_case(player)
                && !player.contains(t.as_str())
        })
}
