use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::domain::Snapshot;
use crate::error::NotYetAvailable;

/// Latest complete snapshot, shared by the refresh task and API readers.
///
/// The lock is only ever held to clone or swap an `Arc`, so readers never
/// wait on refresh work. A reader that keeps an old `Arc` keeps that
/// snapshot alive after a replace.
#[derive(Debug, Default)]
pub struct DataCache {
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot, or `NotYetAvailable` before the first successful refresh.
    pub fn read(&self) -> Result<Arc<Snapshot>, NotYetAvailable> {
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.clone().ok_or(NotYetAvailable)
    }

    /// Install a new snapshot, returning the one it replaced.
    pub fn replace(&self, snapshot: Snapshot) -> Option<Arc<Snapshot>> {
        let next = Arc::new(snapshot);
        let fetched_at = next.fetched_at;
        let previous = {
            let mut guard = self
                .current
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.replace(next)
        };
        debug!(%fetched_at, replaced = previous.is_some(), "snapshot installed");
        previous
    }

    pub fn is_populated(&self) -> bool {
        self.read().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LeagueData, StandingEntry};
    use chrono::{Duration, Utc};

    fn snapshot(team: &str) -> Snapshot {
        let mut data = LeagueData::empty();
        data.standings.push(StandingEntry {
            rank: 1,
            team: team.to_string(),
            wins: 8,
            losses: 0,
        });
        Snapshot::new(data, Utc::now())
    }

    #[test]
    fn test_empty_cache_is_not_available() {
        let cache = DataCache::new();
        assert_eq!(cache.read().unwrap_err(), NotYetAvailable);
        assert!(!cache.is_populated());
    }

    #[test]
    fn test_replace_then_read() {
        let cache = DataCache::new();
        let snap = snapshot("Al Riyadi");
        let expected = snap.data.clone();
        assert!(cache.replace(snap).is_none());
        assert_eq!(cache.read().unwrap().data, expected);
    }

    #[test]
    fn test_old_snapshot_survives_replace() {
        let cache = DataCache::new();
        cache.replace(snapshot("Al Riyadi"));
        let held = cache.read().unwrap();

        let mut newer = snapshot("Sagesse");
        newer.fetched_at = held.fetched_at + Duration::seconds(300);
        let previous = cache.replace(newer).unwrap();

        assert!(Arc::ptr_eq(&held, &previous));
        assert_eq!(held.data.standings[0].team, "Al Riyadi");
        assert_eq!(cache.read().unwrap().data.standings[0].team, "Sagesse");
    }

    #[test]
    fn test_concurrent_readers_see_whole_snapshots() {
        let cache = Arc::new(DataCache::new());
        cache.replace(snapshot("Team 0"));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let snap = cache.read().unwrap();
                        assert_eq!(snap.data.standings.len(), 1);
                        assert!(snap.data.standings[0].team.starts_with("Team "));
                    }
                })
            })
            .collect();

        for i in 1..200 {
            cache.replace(snapshot(&format!("Team {i}")));
        }
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(cache.read().unwrap().data.standings[0].team, "Team 199");
    }
}
