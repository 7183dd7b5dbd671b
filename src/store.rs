use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::archive::CorpusSource;
use crate::config;
use crate::model::{embedded_year, ArchivedTournament};

/// One JSON file per archived tournament under a single directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(config::archive_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Atomic write: tmp file in the same directory, then rename over.
    pub fn save_tournament(&self, tournament: &ArchivedTournament) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create archive dir {}", self.dir.display()))?;
        let path = self.path_for(&tournament.id);
        let tmp = path.with_extension("json.tmp");
        let json =
            serde_json::to_string_pretty(tournament).context("serialize tournament archive")?;
        fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("swap {}", path.display()))?;
        Ok(path)
    }

    /// Archive files in stable name order. A missing directory is an
    /// empty archive, not an error.
    pub fn list_archives(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("list archive dir {}", self.dir.display()));
            }
        };
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect();
        paths.sort();
        Ok(paths)
    }

    pub fn load_tournament(path: &Path) -> Result<ArchivedTournament> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
    }

    /// Every loadable archive; corrupt files are logged and skipped so
    /// one bad file never poisons the corpus.
    pub fn load_all(&self) -> Result<Vec<ArchivedTournament>> {
        let paths = self.list_archives()?;
        let mut loaded: Vec<(PathBuf, ArchivedTournament)> = paths
            .par_iter()
            .filter_map(|path| match Self::load_tournament(path) {
                Ok(tournament) => Some((path.clone(), tournament)),
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "skipping unreadable archive");
                    None
                }
            })
            .collect();
        loaded.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(loaded.into_iter().map(|(_, t)| t).collect())
    }
}

impl CorpusSource for FileStore {
    fn load_tournaments(&self) -> Result<Vec<ArchivedTournament>> {
        self.load_all()
    }
}

/// Slug id for a tournament archive: "name-year" unless the name already
/// embeds the year.
pub fn archive_id(name: &str, year: i32) -> String {
    if embedded_year(name).is_some() {
        slug(name)
    } else {
        slug(&format!("{name}-{year}"))
    }
}

fn slug(text: &str) -> String {
    let folded = crate::identity::normalize_name(text);
    let mut out = String::with_capacity(folded.len());
    let mut last_dash = true;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::model::MatchRecord;

    fn temp_store() -> (FileStore, PathBuf) {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!(
            "padel-store-test-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        fs::create_dir_all(&dir).unwrap();
        (FileStore::new(&dir), dir)
    }

    fn sample_tournament(id: &str, name: &str) -> ArchivedTournament {
        ArchivedTournament {
            id: id.to_string(),
            name: name.to_string(),
            year: 2024,
            date_start: Some("01/06/2024".to_string()),
            date_end: None,
            matches: vec![MatchRecord {
                team1: vec!["A. Tapia".to_string()],
                team2: vec!["A. Galan".to_string()],
                score: vec!["6-4".to_string(), "6-3".to_string()],
                ..MatchRecord::default()
            }],
            archived_at: "2024-06-10T12:00:00Z".to_string(),
        }
    }

    #[test]
    fn slug_ids() {
        assert_eq!(archive_id("Qatar Major", 2024), "qatar-major-2024");
        assert_eq!(archive_id("Paris Major 2023", 2024), "paris-major-2023");
        assert_eq!(archive_id("  Málaga   P1 ", 2025), "malaga-p1-2025");
    }

    #[test]
    fn save_and_load_round_trip() {
        let (store, dir) = temp_store();
        let tournament = sample_tournament("qatar-major-2024", "Qatar Major");
        let path = store.save_tournament(&tournament).unwrap();
        assert!(path.ends_with("qatar-major-2024.json"));
        let loaded = FileStore::load_tournament(&path).unwrap();
        assert_eq!(loaded, tournament);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn corrupt_file_skipped_others_load() {
        let (store, dir) = temp_store();
        store
            .save_tournament(&sample_tournament("good-one", "Good One"))
            .unwrap();
        fs::write(dir.join("broken.json"), "{not json").unwrap();
        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "good-one");
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_dir_is_empty_archive() {
        let store = FileStore::new("/nonexistent/padel-archive-dir");
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn listing_is_sorted_and_json_only() {
        let (store, dir) = temp_store();
        store
            .save_tournament(&sample_tournament("b-event", "B Event"))
            .unwrap();
        store
            .save_tournament(&sample_tournament("a-event", "A Event"))
            .unwrap();
        fs::write(dir.join("notes.txt"), "ignore me").unwrap();
        let paths = store.list_archives().unwrap();
        let names: Vec<_> = paths
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["a-event.json", "b-event.json"]);
        fs::remove_dir_all(dir).unwrap();
    }
}
