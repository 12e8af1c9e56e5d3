//! Page parser: raw HTML in, [`RawSection`] out.
//!
//! The source markup is not under our control, so regions are located by
//! landmarks (label text, table classes, row shapes) rather than fixed
//! paths. A region that cannot be found is left empty.

use regex::Regex;
use scraper::{ElementRef, Html, Node};
use std::sync::LazyLock;
use tracing::debug;

use super::dom::{is_leaf_table, is_non_content, leaf_tables, nearest_ancestor, Selectors};
use super::games::{self, UpcomingRegion};
use super::leaders;
use super::raw::{PageKind, RawSection};
use super::standings;
use super::text::normalize_ws;
use crate::error::ParseError;

static STANDINGS_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bstandings?\b").expect("standings label"));

static UPCOMING_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bnext\s*round\b|\bupcoming\b|\bnext\s+games?\b|\bschedule\b")
        .expect("upcoming label")
});

/// Labels longer than this are prose, not section headings
const MAX_LABEL_LEN: usize = 60;
/// Link and menu text names other pages, not a section on this one
const LINK_CONTEXT: [&str; 3] = ["a", "option", "select"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelKind {
    Standings,
    Upcoming,
}

#[derive(Debug)]
struct Label<'a> {
    kind: LabelKind,
    text: String,
    /// Leaf table the label sits in (caption or header row)
    enclosing: Option<ElementRef<'a>>,
    /// First leaf table after the label in document order
    following: Option<ElementRef<'a>>,
}

impl<'a> Label<'a> {
    fn tables(&self) -> impl Iterator<Item = ElementRef<'a>> {
        self.enclosing.into_iter().chain(self.following)
    }
}

/// Section labels and the tables near them, in document order
struct Landmarks<'a> {
    labels: Vec<Label<'a>>,
}

impl<'a> Landmarks<'a> {
    fn collect(doc: &'a Html, sel: &Selectors) -> Self {
        let mut labels: Vec<Label<'a>> = Vec::new();
        let mut pending: Vec<usize> = Vec::new();

        for node in doc.root_element().descendants() {
            match node.value() {
                Node::Element(el) if el.name() == "table" => {
                    let Some(table) = ElementRef::wrap(node) else {
                        continue;
                    };
                    if !is_leaf_table(table, sel) {
                        continue;
                    }
                    for idx in pending.drain(..) {
                        if labels[idx].enclosing.map(|t| t.id()) != Some(table.id()) {
                            labels[idx].following = Some(table);
                        }
                    }
                }
                Node::Text(text) => {
                    let Some(parent) = node.parent().and_then(ElementRef::wrap) else {
                        continue;
                    };
                    if is_non_content(parent)
                        || LINK_CONTEXT.contains(&parent.value().name())
                        || nearest_ancestor(parent, &LINK_CONTEXT).is_some()
                    {
                        continue;
                    }
                    let text = normalize_ws(text);
                    if text.is_empty() || text.len() > MAX_LABEL_LEN {
                        continue;
                    }
                    let kind = if STANDINGS_LABEL.is_match(&text) {
                        LabelKind::Standings
                    } else if UPCOMING_LABEL.is_match(&text) {
                        LabelKind::Upcoming
                    } else {
                        continue;
                    };
                    let enclosing = std::iter::once(parent)
                        .chain(parent.ancestors().filter_map(ElementRef::wrap))
                        .find(|el| el.value().name() == "table")
                        .filter(|t| is_leaf_table(*t, sel));
                    pending.push(labels.len());
                    labels.push(Label {
                        kind,
                        text,
                        enclosing,
                        following: None,
                    });
                }
                _ => {}
            }
        }

        Self { labels }
    }

    fn of_kind(&self, kind: LabelKind) -> impl Iterator<Item = &Label<'a>> {
        self.labels.iter().filter(move |l| l.kind == kind)
    }

    fn standings_tables(&self) -> Vec<ElementRef<'a>> {
        self.of_kind(LabelKind::Standings)
            .flat_map(Label::tables)
            .collect()
    }

    fn upcoming_regions(&self) -> Vec<UpcomingRegion<'a>> {
        self.of_kind(LabelKind::Upcoming)
            .flat_map(|label| {
                label.tables().map(|table| UpcomingRegion {
                    table,
                    label: label.text.clone(),
                })
            })
            .collect()
    }
}

/// Extract every recognizable region from one page.
///
/// Schedule pages only carry results and fixtures. Fails when the input is
/// blank or when no region at all could be located.
pub fn parse(html: &str, kind: PageKind) -> Result<RawSection, ParseError> {
    if html.trim().is_empty() {
        return Err(ParseError::EmptyDocument);
    }

    let doc = Html::parse_document(html);
    let sel = Selectors::new()?;
    let landmarks = Landmarks::collect(&doc, &sel);
    let tables = leaf_tables(&doc, &sel);

    let mut section = RawSection::new(kind);
    if kind == PageKind::MainLeague {
        section.standings = standings::scan(&doc, &sel, &landmarks.standings_tables());
        section.leaders = leaders::scan(doc.root_element(), &sel);
    }
    section.results = games::scan_results(&tables, &sel);
    section.upcoming = games::scan_upcoming(&tables, &landmarks.upcoming_regions(), &sel);

    if section.is_empty() {
        return Err(ParseError::NoRecognizedRegions {
            page: kind.as_str(),
        });
    }

    debug!(
        page = %kind,
        standings = section.standings.rows.len(),
        results = section.results.len(),
        upcoming = section.upcoming.len(),
        leaders = section.leaders.values().map(Vec::len).sum::<usize>(),
        "parsed page"
    );
    Ok(section)
}
