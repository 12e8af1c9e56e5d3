use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapters::HttpFetcher;
use crate::config::AppConfig;
use crate::error::{LblError, Result};
use crate::scrape::{parse, PageKind};
use crate::services::LeagueService;

#[derive(Parser)]
#[command(name = "lbl_live")]
#[command(version)]
#[command(about = "Lebanese Basketball League live data scraper and JSON API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory (default.toml, then {LBL_ENV}.toml)
    #[arg(short, long, default_value = "config", env = "LBL_CONFIG_DIR")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the refresh scheduler and the HTTP API (default)
    Serve {
        /// Override server.port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one refresh cycle and print the snapshot as JSON
    Scrape {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Parse a saved HTML page and print what was found
    Parse {
        /// HTML file
        file: PathBuf,
        /// Page kind: main or schedule
        #[arg(short, long, default_value = "main")]
        kind: PageKind,
    },
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// One cycle against the live source; the snapshot JSON is returned.
pub async fn scrape_once(config: &AppConfig, pretty: bool) -> Result<String> {
    let fetcher = HttpFetcher::from_config(&config.source)?;
    let league = LeagueService::from_config(config, Arc::new(fetcher));
    league.refresh_now().await?;
    let snapshot = league
        .get_snapshot()
        .map_err(|e| LblError::Internal(e.to_string()))?;
    to_json(snapshot.as_ref(), pretty)
}

/// Raw regions found in a saved page, as pretty JSON.
pub fn parse_file(path: &Path, kind: PageKind) -> Result<String> {
    let html = std::fs::read_to_string(path)?;
    let section = parse(&html, kind)?;
    to_json(&section, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["lbl_live", "--config", "/etc/lbl", "serve", "--port", "8080"])
            .unwrap();
        assert_eq!(cli.config, "/etc/lbl");
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(8080) })));

        let cli = Cli::try_parse_from(["lbl_live", "parse", "page.html", "--kind", "schedule"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Parse { kind: PageKind::Schedule, .. })
        ));

        assert!(Cli::try_parse_from(["lbl_live", "parse", "page.html", "--kind", "box"]).is_err());
    }

    #[test]
    fn test_parse_file_reports_missing_file() {
        let err = parse_file(Path::new("/nonexistent/lbl/page.html"), PageKind::MainLeague)
            .unwrap_err();
        assert!(matches!(err, LblError::Io(_)));
    }
}
