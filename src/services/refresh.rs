use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::cache::DataCache;
use super::metrics::RefreshStats;
use crate::adapters::PageFetcher;
use crate::config::AppConfig;
use crate::domain::{RefreshPhase, RowCounts};
use crate::error::RefreshError;
use crate::scrape::{normalize, parse, NormalizeOptions, NormalizeReport, PageKind};

/// One page fetched per cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSource {
    pub url: String,
    pub kind: PageKind,
}

impl PageSource {
    pub fn new(url: impl Into<String>, kind: PageKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }

    /// League page first, then the schedule page when configured
    pub fn from_config(config: &AppConfig) -> Vec<Self> {
        let mut pages = vec![Self::new(config.source.league_url(), PageKind::MainLeague)];
        if let Some(url) = config.source.schedule_url() {
            pages.push(Self::new(url, PageKind::Schedule));
        }
        pages
    }
}

/// Scheduler settings, independent of where they were loaded from
#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub pages: Vec<PageSource>,
    pub timeout: Duration,
    pub interval: Duration,
    pub normalize: NormalizeOptions,
}

impl RefreshSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            pages: PageSource::from_config(config),
            timeout: config.source.timeout(),
            interval: config.refresh.interval(),
            normalize: NormalizeOptions::from_config(config),
        }
    }
}

/// Outcome of a successful cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub fetched_at: DateTime<Utc>,
    pub pages: usize,
    pub rows: RowCounts,
    pub normalize: NormalizeReport,
    pub elapsed_ms: u64,
}

/// Answer to an on-demand refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerOutcome {
    /// A cycle was started in the background
    Accepted,
    /// Another cycle is still running; nothing was started
    RefreshInProgress,
}

struct Inner {
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<DataCache>,
    stats: Arc<RefreshStats>,
    settings: RefreshSettings,
    /// Held for the whole of a cycle
    cycle_lock: Arc<Mutex<()>>,
    phase: watch::Sender<RefreshPhase>,
}

/// Runs fetch → parse → normalize → install, on a timer and on demand.
///
/// At most one cycle runs at a time. An on-demand trigger that arrives while
/// a cycle is running is rejected; a timer tick that collides is skipped.
/// Only a fully successful cycle touches the cache.
#[derive(Clone)]
pub struct RefreshScheduler {
    inner: Arc<Inner>,
}

impl RefreshScheduler {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        cache: Arc<DataCache>,
        stats: Arc<RefreshStats>,
        settings: RefreshSettings,
    ) -> Self {
        let (phase, _) = watch::channel(RefreshPhase::Idle);
        Self {
            inner: Arc::new(Inner {
                fetcher,
                cache,
                stats,
                settings,
                cycle_lock: Arc::new(Mutex::new(())),
                phase,
            }),
        }
    }

    pub fn phase(&self) -> RefreshPhase {
        *self.inner.phase.borrow()
    }

    pub fn stats(&self) -> &Arc<RefreshStats> {
        &self.inner.stats
    }

    pub fn settings(&self) -> &RefreshSettings {
        &self.inner.settings
    }

    fn try_begin(&self) -> Option<OwnedMutexGuard<()>> {
        Arc::clone(&self.inner.cycle_lock).try_lock_owned().ok()
    }

    /// Run one cycle now and wait for it.
    ///
    /// The cycle runs on its own task, so a caller that stops waiting (a
    /// client hanging up on `POST /api/refresh`) does not cut it short.
    pub async fn run_cycle(&self) -> Result<CycleReport, RefreshError> {
        let Some(guard) = self.try_begin() else {
            self.inner.stats.record_rejected();
            return Err(RefreshError::RefreshInProgress);
        };
        let this = self.clone();
        tokio::spawn(async move { this.execute(guard).await })
            .await
            .unwrap_or_else(|e| Err(RefreshError::Aborted(e.to_string())))
    }

    /// Start a cycle in the background unless one is already running.
    pub fn trigger_refresh(&self) -> TriggerOutcome {
        let Some(guard) = self.try_begin() else {
            self.inner.stats.record_rejected();
            debug!("refresh trigger rejected, cycle in progress");
            return TriggerOutcome::RefreshInProgress;
        };
        let this = self.clone();
        tokio::spawn(async move {
            // Outcome is logged and recorded by execute
            let _ = this.execute(guard).await;
        });
        TriggerOutcome::Accepted
    }

    /// Timer loop: first cycle immediately, then every interval, until
    /// `shutdown` turns true.
    pub fn spawn(&self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let period = this.inner.settings.interval;
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = period.as_secs(), "refresh scheduler started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match this.try_begin() {
                            Some(guard) => {
                                let _ = this.execute(guard).await;
                            }
                            None => debug!("skipping scheduled refresh, cycle in progress"),
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("refresh scheduler stopped");
        })
    }

    fn set_phase(&self, next: RefreshPhase) {
        let previous = self.inner.phase.send_replace(next);
        if !previous.can_transition_to(next) {
            warn!("unexpected refresh phase change {} -> {}", previous, next);
        }
    }

    async fn execute(&self, guard: OwnedMutexGuard<()>) -> Result<CycleReport, RefreshError> {
        let started = Instant::now();
        let result = self.cycle(started).await;
        self.set_phase(RefreshPhase::Idle);

        match &result {
            Ok(report) => {
                info!(
                    standings = report.rows.standings,
                    results = report.rows.results,
                    upcoming = report.rows.upcoming,
                    leaders = report.rows.leaders,
                    skipped = report.normalize.skipped_rows(),
                    elapsed_ms = report.elapsed_ms,
                    "refresh cycle complete"
                );
                self.inner
                    .stats
                    .record_success(report.normalize.skipped_rows(), report.fetched_at)
                    .await;
            }
            Err(e) => {
                warn!(stage = e.stage(), "refresh cycle failed: {}", e);
                self.inner.stats.record_failure(e).await;
            }
        }

        drop(guard);
        result
    }

    async fn cycle(&self, started: Instant) -> Result<CycleReport, RefreshError> {
        let settings = &self.inner.settings;

        self.set_phase(RefreshPhase::Fetching);
        let fetches = settings
            .pages
            .iter()
            .map(|page| self.inner.fetcher.fetch(&page.url, settings.timeout));
        let bodies = join_all(fetches)
            .await
            .into_iter()
            .collect::<Result<Vec<String>, _>>()?;

        self.set_phase(RefreshPhase::Parsing);
        let sections = settings
            .pages
            .iter()
            .zip(&bodies)
            .map(|(page, body)| parse(body, page.kind))
            .collect::<Result<Vec<_>, _>>()?;

        self.set_phase(RefreshPhase::Normalizing);
        let normalized = normalize(&sections, &settings.normalize)?;

        self.set_phase(RefreshPhase::Installing);
        let rows = normalized.snapshot.row_counts();
        let fetched_at = normalized.snapshot.fetched_at;
        self.inner.cache.replace(normalized.snapshot);

        Ok(CycleReport {
            fetched_at,
            pages: bodies.len(),
            rows,
            normalize: normalized.report,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }
}
