//! League table scanner.
//!
//! Candidate tables are tried in order of confidence: tables marked as
//! standings by class/id, the table around or after a "Standings" label,
//! then any table whose rows read like `rank | team | W-L`. When no table
//! qualifies the page text is scanned for `1 Al Riyadi 8-0` lines.

use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;
use tracing::debug;

use super::dom::{
    cells, class_or_id_contains, content_text, header_names, leaf_tables, links, own_rows,
    text_of, Selectors,
};
use super::raw::{RawStandingRow, RawStandings};
use super::text::{looks_like_date, normalize_ws, parse_count, source_id_from_href, split_record};

static TEXT_ROW_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s+([A-Za-z][A-Za-z .'&-]*?)\s+(\d+)-(\d+)").expect("standings text pattern")
});

/// Column positions named by the header row
#[derive(Debug, Default, Clone, Copy)]
struct RecordColumns {
    wins: Option<usize>,
    losses: Option<usize>,
}

impl RecordColumns {
    fn from_headers(headers: &[String]) -> Self {
        let find = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));
        Self {
            wins: find(&["w", "won", "wins"]),
            losses: find(&["l", "lost", "losses"]),
        }
    }
}

pub(crate) fn scan(
    doc: &Html,
    sel: &Selectors,
    labelled: &[ElementRef<'_>],
) -> RawStandings {
    let tables = leaf_tables(doc, sel);

    let marked = tables
        .iter()
        .copied()
        .filter(|t| class_or_id_contains(*t, "standing"));
    for table in marked.chain(labelled.iter().copied()) {
        let rows = rows_of(table, sel);
        if !rows.is_empty() {
            return RawStandings {
                rows,
                source_ordered: true,
            };
        }
    }

    // A lone matching row is too weak a signal without a label
    for table in &tables {
        let rows = rows_of(*table, sel);
        if rows.len() >= 2 {
            debug!("standings located by row shape");
            return RawStandings {
                rows,
                source_ordered: true,
            };
        }
    }

    let rows = scan_text(doc);
    if !rows.is_empty() {
        debug!("standings recovered from page text ({} rows)", rows.len());
    }
    RawStandings {
        rows,
        source_ordered: false,
    }
}

fn rows_of(table: ElementRef<'_>, sel: &Selectors) -> Vec<RawStandingRow> {
    let columns = RecordColumns::from_headers(&header_names(table, sel));
    own_rows(table, sel)
        .into_iter()
        .filter_map(|tr| standing_row(tr, columns, sel))
        .collect()
}

fn standing_row(
    tr: ElementRef<'_>,
    columns: RecordColumns,
    sel: &Selectors,
) -> Option<RawStandingRow> {
    let tds = cells(tr);
    if tds.len() < 2 {
        return None;
    }
    let texts: Vec<String> = tds.iter().map(|td| text_of(*td)).collect();
    // Result rows also carry `80-74` cells; they start with a date
    if looks_like_date(&texts[0]) {
        return None;
    }

    let (team_idx, team, team_source_id) = team_cell(&tds, &texts, sel)?;

    let rank = if team_idx > 0 && parse_count(&texts[0]).is_some() {
        Some(texts[0].trim_end_matches('.').trim().to_string())
    } else {
        None
    };

    let (wins, losses) = texts
        .iter()
        .skip(team_idx + 1)
        .rev()
        .find_map(|t| split_record(t))
        .or_else(|| {
            let w = texts.get(columns.wins?)?;
            let l = texts.get(columns.losses?)?;
            Some((w.clone(), l.clone()))
        })?;

    Some(RawStandingRow {
        rank,
        team,
        team_source_id,
        wins,
        losses,
    })
}

/// Team cell: the first cell holding a named link, else the second cell.
fn team_cell(
    tds: &[ElementRef<'_>],
    texts: &[String],
    sel: &Selectors,
) -> Option<(usize, String, Option<String>)> {
    for (idx, td) in tds.iter().enumerate() {
        let link = links(*td, sel)
            .into_iter()
            .find(|l| l.text.chars().any(char::is_alphabetic));
        if let Some(link) = link {
            let id = link.href.as_deref().and_then(source_id_from_href);
            return Some((idx, link.text, id));
        }
    }

    let name = texts.get(1)?;
    if name.chars().any(char::is_alphabetic) && split_record(name).is_none() {
        Some((1, name.clone(), None))
    } else {
        None
    }
}

fn scan_text(doc: &Html) -> Vec<RawStandingRow> {
    let text = content_text(doc.root_element());
    text.lines()
        .filter_map(|line| {
            let caps = TEXT_ROW_PATTERN.captures(line)?;
            let team = normalize_ws(&caps[2]);
            if team.is_empty() {
                return None;
            }
            Some(RawStandingRow {
                rank: Some(caps[1].to_string()),
                team,
                team_source_id: None,
                wins: caps[3].to_string(),
                losses: caps[4].to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_doc(html: &str) -> RawStandings {
        let doc = Html::parse_document(html);
        let sel = Selectors::new().unwrap();
        scan(&doc, &sel, &[])
    }

    #[test]
    fn test_marked_table_with_record_column() {
        let standings = scan_doc(
            r#"<table class="standingsTable">
                 <tr><th>#</th><th>Team</th><th>W-L</th></tr>
                 <tr><td>1.</td><td><a href="/team/Lebanon/Al-Riyadi/2601">Al Riyadi</a></td><td>8-0</td></tr>
                 <tr><td>2.</td><td><a href="/team/Lebanon/Sagesse/2602">Sagesse</a></td><td>6-2</td></tr>
               </table>"#,
        );
        assert!(standings.source_ordered);
        assert_eq!(standings.rows.len(), 2);
        let first = &standings.rows[0];
        assert_eq!(first.rank.as_deref(), Some("1"));
        assert_eq!(first.team, "Al Riyadi");
        assert_eq!(first.team_source_id.as_deref(), Some("2601"));
        assert_eq!((first.wins.as_str(), first.losses.as_str()), ("8", "0"));
    }

    #[test]
    fn test_separate_win_loss_columns_from_headers() {
        let standings = scan_doc(
            r#"<table id="standings">
                 <tr><th>Team</th><th>W</th><th>L</th></tr>
                 <tr><td><a href="/team/1">Champville</a></td><td>5</td><td>3</td></tr>
               </table>"#,
        );
        assert_eq!(standings.rows.len(), 1);
        assert_eq!(standings.rows[0].rank, None);
        assert_eq!(standings.rows[0].wins, "5");
        assert_eq!(standings.rows[0].losses, "3");
    }

    #[test]
    fn test_result_rows_are_not_standings() {
        let standings = scan_doc(
            r#"<table>
                 <tr><td>Feb.9</td><td><a href="/team/1">Beirut Club</a></td><td>80-74</td><td><a href="/team/2">Homenetmen</a></td></tr>
                 <tr><td>Feb.8</td><td><a href="/team/3">Sagesse</a></td><td>70-71</td><td><a href="/team/4">Dynamo</a></td></tr>
               </table>"#,
        );
        assert!(standings.rows.is_empty());
    }

    #[test]
    fn test_text_fallback() {
        let standings = scan_doc("<p>Standings\n1 Al Riyadi 8-0\n2 Beirut Club 7-1\n</p>");
        assert!(!standings.source_ordered);
        assert_eq!(standings.rows.len(), 2);
        assert_eq!(standings.rows[1].team, "Beirut Club");
        assert_eq!(standings.rows[1].rank.as_deref(), Some("2"));
    }

    #[test]
    fn test_text_fallback_ignores_inline_scripts() {
        let standings = scan_doc(
            "<html><head><script>\nvar rows = 1;\n3 Foo 2-3\n</script></head>\
             <body><p>Standings\n1 Al Riyadi 8-0\n</p>\
             <script>\n4 Bar 5-6\n</script></body></html>",
        );
        let teams: Vec<&str> = standings.rows.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(teams, vec!["Al Riyadi"]);
    }
}
