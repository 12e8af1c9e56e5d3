use std::fs;
use std::path::{Path, PathBuf};

/// Only the fetcher adapter talks HTTP to the source site.
const ALLOWED_REQWEST_USERS: &[&str] = &["src/adapters/http_fetcher.rs", "src/error.rs"];

/// Markup handling stays inside the scrape pipeline.
const ALLOWED_SCRAPER_PREFIX: &str = "src/scrape/";

fn collect_rust_files(root: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rust_files(&path, out);
            continue;
        }
        if path.extension().and_then(|s| s.to_str()) == Some("rs") {
            out.push(path);
        }
    }
}

fn source_files() -> Vec<(String, String)> {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut files = Vec::new();
    collect_rust_files(&repo_root.join("src"), &mut files);
    files
        .into_iter()
        .map(|file| {
            let rel = file
                .strip_prefix(repo_root)
                .unwrap_or(&file)
                .to_string_lossy()
                .replace('\\', "/");
            let content = fs::read_to_string(&file).unwrap_or_default();
            (rel, content)
        })
        .collect()
}

fn offenders(uses: impl Fn(&str) -> bool, allowed: impl Fn(&str) -> bool) -> Vec<String> {
    let mut offenders = Vec::new();
    for (rel, content) in source_files() {
        if allowed(&rel) {
            continue;
        }
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with("//") {
                continue;
            }
            if uses(trimmed) {
                offenders.push(format!("{}:{}", rel, idx + 1));
            }
        }
    }
    offenders
}

#[test]
fn http_client_is_limited_to_the_fetcher() {
    let offenders = offenders(
        |line| line.contains("reqwest::"),
        |rel| ALLOWED_REQWEST_USERS.contains(&rel),
    );
    assert!(
        offenders.is_empty(),
        "reqwest used outside the fetcher adapter: {}",
        offenders.join(", ")
    );
}

#[test]
fn html_parsing_is_limited_to_the_scrape_pipeline() {
    let offenders = offenders(
        |line| line.contains("scraper::"),
        |rel| rel.starts_with(ALLOWED_SCRAPER_PREFIX),
    );
    assert!(
        offenders.is_empty(),
        "scraper used outside src/scrape: {}",
        offenders.join(", ")
    );
}
