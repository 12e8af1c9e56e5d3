//! Small structural helpers over `scraper` element trees.
//!
//! The source wraps its content in nested layout tables, so every helper
//! that walks rows or cells stays inside the nearest table/row it was given.

use scraper::{ElementRef, Html, Selector};

use super::text::normalize_ws;
use crate::error::ParseError;

pub(crate) fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css.to_string()))
}

/// Selectors used by every region scanner, built once per parse
pub(crate) struct Selectors {
    pub table: Selector,
    pub tr: Selector,
    pub a: Selector,
}

impl Selectors {
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            table: selector("table")?,
            tr: selector("tr")?,
            a: selector("a")?,
        })
    }
}

/// Visible text of an element, whitespace-normalized.
pub(crate) fn text_of(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<Vec<_>>().join(" "))
}

/// Text of the element's direct text children only.
pub(crate) fn own_text(el: ElementRef<'_>) -> String {
    let parts: Vec<&str> = el
        .children()
        .filter_map(|child| child.value().as_text().map(|t| &**t))
        .collect();
    normalize_ws(&parts.join(" "))
}

pub(crate) fn nearest_ancestor<'a>(el: ElementRef<'a>, names: &[&str]) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| names.contains(&a.value().name()))
}

/// Elements whose text never belongs to the rendered page
pub(crate) const NON_CONTENT_ELEMENTS: [&str; 5] = ["head", "title", "script", "style", "noscript"];

pub(crate) fn is_non_content(el: ElementRef<'_>) -> bool {
    NON_CONTENT_ELEMENTS.contains(&el.value().name())
        || nearest_ancestor(el, &NON_CONTENT_ELEMENTS).is_some()
}

/// Raw text of the rendered page under `root`, line breaks kept.
pub(crate) fn content_text(root: ElementRef<'_>) -> String {
    root.descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let parent = node.parent().and_then(ElementRef::wrap)?;
            (!is_non_content(parent)).then_some(&**text)
        })
        .collect()
}

/// A table with no tables inside it. Layout tables wrap whole page columns
/// and are never scanned for rows.
pub(crate) fn is_leaf_table(table: ElementRef<'_>, sel: &Selectors) -> bool {
    table.select(&sel.table).all(|t| t.id() == table.id())
}

/// Leaf tables of a document, in document order.
pub(crate) fn leaf_tables<'a>(doc: &'a Html, sel: &Selectors) -> Vec<ElementRef<'a>> {
    doc.select(&sel.table)
        .filter(|t| is_leaf_table(*t, sel))
        .collect()
}

/// Rows that belong to this table, not to tables nested in its cells.
pub(crate) fn own_rows<'a>(table: ElementRef<'a>, sel: &Selectors) -> Vec<ElementRef<'a>> {
    table
        .select(&sel.tr)
        .filter(|tr| nearest_ancestor(*tr, &["table"]).map(|t| t.id()) == Some(table.id()))
        .collect()
}

fn child_cells<'a>(tr: ElementRef<'a>, name: &str) -> Vec<ElementRef<'a>> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter(|c| c.value().name() == name)
        .collect()
}

/// `<td>` cells of a row.
pub(crate) fn cells(tr: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    child_cells(tr, "td")
}

/// Lower-cased `<th>` labels of the first header row, if any.
pub(crate) fn header_names(table: ElementRef<'_>, sel: &Selectors) -> Vec<String> {
    own_rows(table, sel)
        .into_iter()
        .map(|tr| child_cells(tr, "th"))
        .find(|ths| !ths.is_empty())
        .map(|ths| ths.into_iter().map(|th| text_of(th).to_lowercase()).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Link {
    pub text: String,
    pub href: Option<String>,
}

impl Link {
    pub fn from_element(a: ElementRef<'_>) -> Self {
        Self {
            text: text_of(a),
            href: a.value().attr("href").map(str::to_string),
        }
    }

    pub fn href_contains(&self, needle: &str) -> bool {
        self.href
            .as_deref()
            .is_some_and(|h| h.to_ascii_lowercase().contains(needle))
    }

    pub fn is_player(&self) -> bool {
        self.href_contains("player")
    }
}

/// Non-empty links under an element, in document order.
pub(crate) fn links(el: ElementRef<'_>, sel: &Selectors) -> Vec<Link> {
    el.select(&sel.a)
        .map(Link::from_element)
        .filter(|l| !l.text.is_empty())
        .collect()
}

pub(crate) fn first_link(el: ElementRef<'_>, sel: &Selectors) -> Option<Link> {
    links(el, sel).into_iter().next()
}

/// Case-insensitive match against the class list and id.
pub(crate) fn class_or_id_contains(el: ElementRef<'_>, needle: &str) -> bool {
    let value = el.value();
    value
        .classes()
        .any(|c| c.to_ascii_lowercase().contains(needle))
        || value
            .id()
            .is_some_and(|id| id.to_ascii_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_rows_skip_nested_tables() {
        let doc = Html::parse_document(
            r#"<table id="outer"><tr><td>
                 <table id="inner"><tr><td>a</td></tr><tr><td>b</td></tr></table>
               </td></tr></table>"#,
        );
        let sel = Selectors::new().unwrap();
        let outer = doc
            .select(&sel.table)
            .find(|t| t.value().id() == Some("outer"))
            .unwrap();
        let inner = doc
            .select(&sel.table)
            .find(|t| t.value().id() == Some("inner"))
            .unwrap();
        assert_eq!(own_rows(outer, &sel).len(), 1);
        assert_eq!(own_rows(inner, &sel).len(), 2);
        assert!(!is_leaf_table(outer, &sel));
        let leaves = leaf_tables(&doc, &sel);
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].value().id(), Some("inner"));
    }

    #[test]
    fn test_text_helpers() {
        let doc = Html::parse_fragment(r#"<div class="LeadersBox">PPG <b>Leaders</b><br>top</div>"#);
        let div = doc.select(&selector("div").unwrap()).next().unwrap();
        assert_eq!(text_of(div), "PPG Leaders top");
        assert_eq!(own_text(div), "PPG top");
        assert!(class_or_id_contains(div, "leaders"));
    }

    #[test]
    fn test_content_text_skips_scripts_and_styles() {
        let doc = Html::parse_document(
            "<html><head><title>LBL</title><style>.x{}</style></head>\
             <body><p>1 Al Riyadi 8-0</p><script>var t = '2 Foo 2-3';</script></body></html>",
        );
        let text = content_text(doc.root_element());
        assert!(text.contains("1 Al Riyadi 8-0"));
        assert!(!text.contains("Foo"));
        assert!(!text.contains("LBL"));
    }
}
