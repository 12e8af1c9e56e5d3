pub mod adapters;
pub mod api;
pub mod cli;
pub mod config;
pub mod coordination;
pub mod domain;
pub mod error;
pub mod scrape;
pub mod services;

pub use config::AppConfig;
pub use coordination::GracefulShutdown;
pub use error::{LblError, Result};
pub use services::{LeagueService, RefreshScheduler};
