pub mod cache;
pub mod league;
pub mod metrics;
pub mod refresh;

pub use cache::DataCache;
pub use league::LeagueService;
pub use metrics::{FailureRecord, RefreshStats, StatsSnapshot};
pub use refresh::{CycleReport, PageSource, RefreshScheduler, RefreshSettings, TriggerOutcome};
