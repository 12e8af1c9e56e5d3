use std::sync::Arc;

use super::cache::DataCache;
use super::metrics::{RefreshStats, StatsSnapshot};
use super::refresh::{CycleReport, RefreshScheduler, RefreshSettings, TriggerOutcome};
use crate::adapters::PageFetcher;
use crate::config::AppConfig;
use crate::domain::{GameRecord, RefreshPhase, Snapshot};
use crate::error::{GameLookupError, NotYetAvailable, RefreshError};

/// In-process boundary used by the HTTP layer and the CLI.
///
/// Reads go straight to the cache and never wait on a refresh.
#[derive(Clone)]
pub struct LeagueService {
    cache: Arc<DataCache>,
    scheduler: RefreshScheduler,
}

impl LeagueService {
    pub fn new(cache: Arc<DataCache>, scheduler: RefreshScheduler) -> Self {
        Self { cache, scheduler }
    }

    /// Wire an empty cache, fresh stats and a scheduler around `fetcher`.
    pub fn from_config(config: &AppConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        let cache = Arc::new(DataCache::new());
        let scheduler = RefreshScheduler::new(
            fetcher,
            Arc::clone(&cache),
            Arc::new(RefreshStats::new()),
            RefreshSettings::from_config(config),
        );
        Self::new(cache, scheduler)
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    pub fn get_snapshot(&self) -> Result<Arc<Snapshot>, NotYetAvailable> {
        self.cache.read()
    }

    /// Start a background cycle unless one is running.
    pub fn trigger_refresh(&self) -> TriggerOutcome {
        self.scheduler.trigger_refresh()
    }

    /// Run a cycle and wait for its outcome.
    pub async fn refresh_now(&self) -> Result<CycleReport, RefreshError> {
        self.scheduler.run_cycle().await
    }

    /// Look a game up by derived id in the current snapshot, results first.
    pub fn get_game_by_id(&self, game_id: &str) -> Result<GameRecord, GameLookupError> {
        let snapshot = self.cache.read()?;
        snapshot
            .find_game(game_id)
            .map(|game| game.to_record())
            .ok_or_else(|| GameLookupError::NotFound(game_id.to_string()))
    }

    pub fn phase(&self) -> RefreshPhase {
        self.scheduler.phase()
    }

    pub async fn stats(&self) -> StatsSnapshot {
        self.scheduler.stats().snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http_fetcher::MockPageFetcher;
    use crate::domain::{GameResult, LeagueData};
    use chrono::Utc;

    fn service_with(snapshot: Option<Snapshot>) -> LeagueService {
        let service = LeagueService::from_config(
            &AppConfig::default(),
            Arc::new(MockPageFetcher::new()),
        );
        if let Some(snapshot) = snapshot {
            service.cache.replace(snapshot);
        }
        service
    }

    fn with_result(game_id: &str) -> Snapshot {
        let mut data = LeagueData::empty();
        data.results.push(GameResult {
            date: "Feb.9".into(),
            home_team: "Beirut Club".into(),
            home_score: 88,
            away_team: "Homentmen".into(),
            away_score: 80,
            game_id: Some(game_id.into()),
            box_score_url: None,
        });
        Snapshot::new(data, Utc::now())
    }

    #[test]
    fn test_lookup_before_first_refresh() {
        let service = service_with(None);
        assert!(service.get_snapshot().is_err());
        assert_eq!(
            service.get_game_by_id("0209_2628_2682"),
            Err(GameLookupError::NotYetAvailable(NotYetAvailable))
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_reports_missing_ids() {
        let service = service_with(Some(with_result("0209_ab12_2682")));
        assert!(matches!(
            service.get_game_by_id("0209_AB12_2682"),
            Ok(GameRecord::Result(_))
        ));
        assert_eq!(
            service.get_game_by_id("0101_1_2"),
            Err(GameLookupError::NotFound("0101_1_2".to_string()))
        );
    }
}
