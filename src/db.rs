use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};

use crate::config;
use crate::model::ArchivedTournament;
use crate::score::{match_winner, Side};

/// Read-model mirror of the JSON archive. Aggregators never read from
/// it; it exists for ad-hoc SQL over the corpus.
#[derive(Debug, Clone)]
pub struct MirrorSummary {
    pub db_path: Option<PathBuf>,
    pub tournaments: usize,
    pub matches: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MirroredMatch {
    pub tournament_id: String,
    pub seq: i64,
    pub display: String,
    pub round: Option<String>,
    pub score: String,
    pub winner: Option<String>,
    pub year: Option<i64>,
}

pub fn default_db_path() -> Option<PathBuf> {
    let archive = config::archive_dir().ok()?;
    archive.parent().map(|dir| dir.join("padel_mirror.sqlite"))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS tournaments (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            year INTEGER NOT NULL,
            date_start TEXT NULL,
            date_end TEXT NULL,
            archived_at TEXT NOT NULL,
            mirrored_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS matches (
            tournament_id TEXT NOT NULL,
            seq INTEGER NOT NULL,
            display TEXT NOT NULL,
            category TEXT NULL,
            round TEXT NULL,
            court TEXT NULL,
            team1 TEXT NOT NULL,
            team2 TEXT NOT NULL,
            score TEXT NOT NULL,
            status TEXT NULL,
            winner TEXT NULL,
            year INTEGER NULL,
            match_time TEXT NULL,
            PRIMARY KEY (tournament_id, seq)
        );
        CREATE INDEX IF NOT EXISTS idx_matches_year ON matches(year);
        CREATE INDEX IF NOT EXISTS idx_matches_round ON matches(round);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Replace-style upsert of every archived tournament and its flattened
/// matches. Re-running over the same archive is idempotent.
pub fn mirror_archive(
    conn: &mut Connection,
    tournaments: &[ArchivedTournament],
) -> Result<MirrorSummary> {
    let mirrored_at = Utc::now().to_rfc3339();
    let mut matches_written = 0usize;

    let tx = conn.transaction().context("begin mirror transaction")?;
    for tournament in tournaments {
        tx.execute(
            "INSERT INTO tournaments(id, name, year, date_start, date_end, archived_at, mirrored_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 year = excluded.year,
                 date_start = excluded.date_start,
                 date_end = excluded.date_end,
                 archived_at = excluded.archived_at,
                 mirrored_at = excluded.mirrored_at",
            params![
                tournament.id,
                tournament.name,
                i64::from(tournament.year),
                tournament.date_start,
                tournament.date_end,
                tournament.archived_at,
                mirrored_at,
            ],
        )
        .context("upsert tournament row")?;

        tx.execute(
            "DELETE FROM matches WHERE tournament_id = ?1",
            params![tournament.id],
        )
        .context("clear mirrored matches")?;

        let resolved_year = tournament.resolved_year();
        for (seq, m) in tournament.matches.iter().enumerate() {
            let winner = match match_winner(&m.score) {
                Some(Side::Team1) => Some("team1"),
                Some(Side::Team2) => Some("team2"),
                None => None,
            };
            tx.execute(
                "INSERT INTO matches(tournament_id, seq, display, category, round, court,
                                     team1, team2, score, status, winner, year, match_time)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    tournament.id,
                    seq as i64,
                    m.display,
                    m.category,
                    m.round,
                    m.court,
                    serde_json::to_string(&m.team1).unwrap_or_else(|_| "[]".to_string()),
                    serde_json::to_string(&m.team2).unwrap_or_else(|_| "[]".to_string()),
                    m.score.join(" "),
                    m.status,
                    winner,
                    i64::from(m.year.unwrap_or(resolved_year)),
                    m.time,
                ],
            )
            .context("insert mirrored match")?;
            matches_written += 1;
        }
    }
    tx.commit().context("commit mirror transaction")?;

    Ok(MirrorSummary {
        db_path: conn.path().map(PathBuf::from),
        tournaments: tournaments.len(),
        matches: matches_written,
    })
}

pub fn load_match_count(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))
        .context("count mirrored matches")
}

pub fn load_matches(conn: &Connection, tournament_id: &str) -> Result<Vec<MirroredMatch>> {
    let mut stmt = conn
        .prepare(
            "SELECT tournament_id, seq, display, round, score, winner, year
             FROM matches WHERE tournament_id = ?1 ORDER BY seq",
        )
        .context("prepare mirror query")?;
    let rows = stmt
        .query_map(params![tournament_id], |row| {
            Ok(MirroredMatch {
                tournament_id: row.get(0)?,
                seq: row.get(1)?,
                display: row.get(2)?,
                round: row.get(3)?,
                score: row.get(4)?,
                winner: row.get(5)?,
                year: row.get(6)?,
            })
        })
        .context("query mirrored matches")?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("read mirrored match row")?);
    }
    Ok(out)
}
