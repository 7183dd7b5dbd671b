use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;

use crate::model::{ArchivedTournament, MatchRecord};

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Where archived tournaments come from. Production uses the file store;
/// tests inject canned corpora.
pub trait CorpusSource: Send + Sync {
    fn load_tournaments(&self) -> Result<Vec<ArchivedTournament>>;
}

/// Clock seam so cache expiry is testable without sleeping.
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

struct Snapshot {
    loaded_at: u64,
    matches: Arc<Vec<MatchRecord>>,
}

/// Single global corpus snapshot with bounded staleness. The slot mutex
/// both prevents torn reads and serializes racing reloaders, so
/// concurrent callers either share the snapshot or wait on one reload.
pub struct CorpusCache {
    source: Box<dyn CorpusSource>,
    clock: Box<dyn Clock>,
    ttl_secs: u64,
    slot: Mutex<Option<Snapshot>>,
}

impl CorpusCache {
    pub fn new(
        source: impl CorpusSource + 'static,
        clock: impl Clock + 'static,
        ttl_secs: u64,
    ) -> Self {
        Self {
            source: Box::new(source),
            clock: Box::new(clock),
            ttl_secs,
            slot: Mutex::new(None),
        }
    }

    pub fn with_defaults(source: impl CorpusSource + 'static) -> Self {
        Self::new(source, SystemClock, DEFAULT_CACHE_TTL_SECS)
    }

    /// Cached snapshot, reloaded in full once the TTL lapses. Reload is a
    /// pure function of the stored data, so a redundant reload under
    /// concurrency is wasteful but never wrong.
    pub fn load_cached(&self) -> Result<Arc<Vec<MatchRecord>>> {
        let now = self.clock.now_secs();
        let mut slot = self.slot.lock().expect("corpus cache lock poisoned");
        if let Some(snapshot) = slot.as_ref()
            && now.saturating_sub(snapshot.loaded_at) < self.ttl_secs
        {
            return Ok(Arc::clone(&snapshot.matches));
        }
        let matches = Arc::new(self.load_direct()?);
        *slot = Some(Snapshot {
            loaded_at: now,
            matches: Arc::clone(&matches),
        });
        Ok(matches)
    }

    /// Uncached load, identical results to `load_cached` for the same
    /// underlying data.
    pub fn load_direct(&self) -> Result<Vec<MatchRecord>> {
        let tournaments = self.source.load_tournaments()?;
        Ok(flatten_tournaments(tournaments))
    }

    /// Drop the snapshot; the next load goes back to the source.
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().expect("corpus cache lock poisoned");
        *slot = None;
    }
}

/// Flatten tournament files into one match list, annotating each match
/// with the tournament's resolved year and, when the record carries none
/// already, a reference to its tournament.
pub fn flatten_tournaments(tournaments: Vec<ArchivedTournament>) -> Vec<MatchRecord> {
    let mut matches = Vec::new();
    for tournament in tournaments {
        let year = tournament.resolved_year();
        let reference = tournament.tournament_ref();
        for mut record in tournament.matches {
            record.year = Some(year);
            if record.tournament.is_none() {
                record.tournament = Some(reference.clone());
            }
            matches.push(record);
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    use super::*;
    use crate::model::TournamentRef;

    struct CannedSource {
        tournaments: Vec<ArchivedTournament>,
        calls: Arc<AtomicUsize>,
    }

    impl CorpusSource for CannedSource {
        fn load_tournaments(&self) -> Result<Vec<ArchivedTournament>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.tournaments.clone())
        }
    }

    #[derive(Clone)]
    struct ManualClock(Arc<AtomicU64>);

    impl Clock for ManualClock {
        fn now_secs(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn tournament(name: &str, year: i32, matches: Vec<MatchRecord>) -> ArchivedTournament {
        ArchivedTournament {
            id: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            year,
            date_start: Some("01/06/2024".to_string()),
            date_end: None,
            matches,
            archived_at: "2024-06-10T00:00:00Z".to_string(),
        }
    }

    fn simple_match() -> MatchRecord {
        MatchRecord {
            team1: vec!["Agustin Tapia".to_string()],
            team2: vec!["Alejandro Galan".to_string()],
            score: vec!["6-4".to_string(), "6-3".to_string()],
            ..MatchRecord::default()
        }
    }

    fn cache_with(
        tournaments: Vec<ArchivedTournament>,
        ttl: u64,
    ) -> (CorpusCache, Arc<AtomicUsize>, Arc<AtomicU64>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let ticks = Arc::new(AtomicU64::new(1_000));
        let cache = CorpusCache::new(
            CannedSource {
                tournaments,
                calls: Arc::clone(&calls),
            },
            ManualClock(Arc::clone(&ticks)),
            ttl,
        );
        (cache, calls, ticks)
    }

    #[test]
    fn flatten_annotates_year_and_tournament() {
        let matches = flatten_tournaments(vec![tournament(
            "Madrid Major 2023",
            2024,
            vec![simple_match()],
        )]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].year, Some(2023));
        assert_eq!(
            matches[0].tournament.as_ref().map(|t| t.name.as_str()),
            Some("Madrid Major 2023")
        );
    }

    #[test]
    fn flatten_keeps_existing_tournament_ref() {
        let mut m = simple_match();
        m.tournament = Some(TournamentRef {
            name: "Original".to_string(),
            date_start: None,
            date_end: None,
        });
        let matches = flatten_tournaments(vec![tournament("Renamed", 2024, vec![m])]);
        assert_eq!(
            matches[0].tournament.as_ref().map(|t| t.name.as_str()),
            Some("Original")
        );
    }

    #[test]
    fn cached_loads_share_one_reload_within_ttl() {
        let (cache, calls, _ticks) =
            cache_with(vec![tournament("Madrid Major", 2024, vec![simple_match()])], 300);
        let first = cache.load_cached().unwrap();
        let second = cache.load_cached().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn expiry_triggers_full_reload() {
        let (cache, calls, ticks) =
            cache_with(vec![tournament("Madrid Major", 2024, vec![simple_match()])], 300);
        cache.load_cached().unwrap();
        ticks.fetch_add(301, Ordering::SeqCst);
        cache.load_cached().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn invalidate_forces_reload() {
        let (cache, calls, _ticks) =
            cache_with(vec![tournament("Madrid Major", 2024, vec![simple_match()])], 300);
        cache.load_cached().unwrap();
        cache.invalidate();
        cache.load_cached().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn direct_and_cached_agree() {
        let (cache, _calls, _ticks) = cache_with(
            vec![
                tournament("Madrid Major", 2024, vec![simple_match()]),
                tournament("Paris Major 2023", 2024, vec![simple_match()]),
            ],
            300,
        );
        let direct = cache.load_direct().unwrap();
        let cached = cache.load_cached().unwrap();
        assert_eq!(direct, *cached);
        assert_eq!(direct.len(), 2);
        assert_eq!(direct[1].year, Some(2023));
    }
}
