use clap::Parser;
use lbl_live::adapters::{start_api_server, HttpFetcher};
use lbl_live::cli::{self, Cli, Commands};
use lbl_live::config::AppConfig;
use lbl_live::coordination::GracefulShutdown;
use lbl_live::error::{LblError, Result};
use lbl_live::services::LeagueService;
use std::sync::Arc;
use tracing::{error, info, warn};

mod main_runtime;

use main_runtime::{init_logging, init_logging_simple};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Parse { file, kind }) => {
            init_logging_simple();
            println!("{}", cli::parse_file(file, *kind)?);
        }
        Some(Commands::Scrape { pretty }) => {
            init_logging_simple();
            let config = load_config(&cli.config)?;
            println!("{}", cli::scrape_once(&config, *pretty).await?);
        }
        Some(Commands::Serve { port }) => {
            let mut config = load_config(&cli.config)?;
            if let Some(port) = port {
                config.server.port = *port;
            }
            run_server(config).await?;
        }
        None => {
            let config = load_config(&cli.config)?;
            run_server(config).await?;
        }
    }

    Ok(())
}

fn load_config(dir: &str) -> Result<AppConfig> {
    let config = AppConfig::load_from(dir)?;
    config.validate().map_err(LblError::InvalidConfig)?;
    Ok(config)
}

async fn run_server(config: AppConfig) -> Result<()> {
    init_logging(&config.logging);
    info!(
        league_url = %config.source.league_url(),
        schedule_url = ?config.source.schedule_url(),
        interval_secs = config.refresh.interval_secs,
        "starting LBL live data service"
    );

    let fetcher = HttpFetcher::from_config(&config.source)?;
    let league = LeagueService::from_config(&config, Arc::new(fetcher));

    let shutdown = GracefulShutdown::new();
    shutdown.listen_for_signals();

    let scheduler = league.scheduler().spawn(shutdown.subscribe());
    let server = start_api_server(league.clone(), &config.server, shutdown.subscribe()).await;

    if !shutdown.is_requested() {
        warn!("API server stopped without a shutdown request");
    }
    shutdown.trigger();
    if let Err(e) = scheduler.await {
        error!("refresh scheduler task failed: {}", e);
    }
    info!("{}", league.scheduler().stats().summary().await);

    server
}
