//! Token helpers shared by the parser and the normalizer.
//!
//! Everything here works on already-extracted text (or link targets), never
//! on markup, so the rules stay testable without HTML fixtures.

use regex::Regex;
use std::sync::LazyLock;

static SCORE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[?\s*(\d{1,3})\s*[-–:]\s*(\d{1,3})\s*\]?$").expect("score pattern")
});

static RECORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3})\s*-\s*(\d{1,3})$").expect("record pattern"));

static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}[:.]\d{2}(?:\s*[ap]m)?)\b").expect("time pattern")
});

static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("number pattern"));

static ROUND_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bround\s*(\d{1,2})\b").expect("round pattern"));

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Collapse whitespace runs (including NBSP) to one space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// Key used to compare team names across pages.
pub fn team_key(name: &str) -> String {
    normalize_ws(name).to_lowercase()
}

/// `MMDD` token for short source dates such as `Feb.9`, `Feb 09`, `9 Feb`.
pub fn date_token(date: &str) -> Option<String> {
    let clean = normalize_ws(&date.replace(['.', ',', '/'], " "));
    let parts: Vec<&str> = clean.split(' ').filter(|p| !p.is_empty()).collect();

    let (month_part, day_part) = match parts.as_slice() {
        [m, d, ..] if month_number(m).is_some() => (*m, *d),
        [d, m, ..] if month_number(m).is_some() => (*m, *d),
        // `Feb9` with no separator
        [single, ..] => {
            let split = single.find(|c: char| c.is_ascii_digit())?;
            (&single[..split], &single[split..])
        }
        [] => return None,
    };

    let month = month_number(month_part)?;
    let digits: String = day_part.chars().take_while(char::is_ascii_digit).collect();
    let day: u32 = digits.parse().ok()?;
    if !(1..=31).contains(&day) {
        return None;
    }
    Some(format!("{month:02}{day:02}"))
}

fn month_number(s: &str) -> Option<u32> {
    if s.len() < 3 || !s.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let prefix = s[..3].to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|idx| idx as u32 + 1)
}

pub fn looks_like_date(s: &str) -> bool {
    date_token(s).is_some()
}

/// Source identifier embedded in a link target.
///
/// Recognizes `?id=2628`-style query values and trailing numeric path
/// segments (`/team/Lebanon/Beirut-Club/2628`, `.../Beirut-Club-2628.aspx`).
pub fn source_id_from_href(href: &str) -> Option<String> {
    let base = url::Url::parse("https://source.invalid/").ok()?;
    let parsed = base.join(href.trim()).ok()?;

    for (key, value) in parsed.query_pairs() {
        let key = key.to_ascii_lowercase();
        if matches!(key.as_str(), "id" | "i" | "teamid" | "team" | "tid" | "clubid")
            && !value.is_empty()
            && value.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Some(value.to_ascii_lowercase());
        }
    }

    let last = parsed
        .path_segments()?
        .filter(|seg| !seg.is_empty())
        .last()?
        .to_string();
    let stem = last.split('.').next().unwrap_or(&last);
    let tail: String = stem
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if tail.is_empty() {
        None
    } else {
        Some(tail)
    }
}

/// Does the cell text look like a finished score (`80-74`, `[80-74]`)?
pub fn looks_like_score(s: &str) -> bool {
    let s = s.trim();
    s.contains(|c: char| c.is_ascii_digit()) && s.contains(['-', '–', ':']) && !looks_like_time(s)
}

pub fn parse_score(s: &str) -> Option<(u32, u32)> {
    let caps = SCORE_PATTERN.captures(s.trim())?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// `W-L` record cell.
pub fn split_record(s: &str) -> Option<(String, String)> {
    let caps = RECORD_PATTERN.captures(s.trim())?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

pub fn looks_like_time(s: &str) -> bool {
    let s = s.trim();
    TIME_PATTERN
        .find(s)
        .is_some_and(|m| m.start() == 0 && m.end() == s.len())
}

pub fn find_time(s: &str) -> Option<String> {
    TIME_PATTERN.captures(s).map(|c| normalize_ws(&c[1]))
}

/// Text with any tip-off time removed (`Feb.9 20:30` -> `Feb.9`).
pub fn strip_time(s: &str) -> String {
    normalize_ws(&TIME_PATTERN.replace_all(s, " "))
}

/// `Round N` label found anywhere in the text.
pub fn round_label(s: &str) -> Option<String> {
    let caps = ROUND_PATTERN.captures(s)?;
    let number: u32 = caps[1].parse().ok()?;
    Some(format!("Round {number}"))
}

/// Text with numbers and surrounding punctuation removed.
pub fn strip_numbers(s: &str) -> String {
    let without = NUMBER_PATTERN.replace_all(s, " ");
    normalize_ws(&without)
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}

/// Last decimal number in a text run (stat value columns sit last).
pub fn last_number(s: &str) -> Option<String> {
    NUMBER_PATTERN.find_iter(s).last().map(|m| m.as_str().to_string())
}

/// Integer token with an optional trailing `.` (`"3."` rank cells).
pub fn parse_count(s: &str) -> Option<u32> {
    s.trim().trim_end_matches('.').trim().parse().ok()
}
