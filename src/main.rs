use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};

use padel_scores::config;
use padel_scores::fetch;
use padel_scores::grouper::{self, GroupOptions};
use padel_scores::model::{ArchivedTournament, MatchRecord, TournamentRef};
use padel_scores::sample;
use padel_scores::store::{self, FileStore};
use padel_scores::widget;

fn main() -> Result<()> {
    config::load_dotenv();
    tracing_subscriber::fmt::init();

    let html = load_board_html()?;
    let rows = widget::extract_rows(&html);

    let tournament_name = parse_value_arg("--tournament");
    let opts = GroupOptions {
        location: parse_value_arg("--location").or_else(config::location),
        timezone: parse_value_arg("--timezone").or_else(config::default_timezone),
        tournament: tournament_name.clone().map(|name| TournamentRef {
            name,
            date_start: Some(Utc::now().format("%d/%m/%Y").to_string()),
            date_end: None,
        }),
    };
    let records = grouper::group_rows(&rows, &opts);

    print_board(&records);

    if has_flag("--archive") {
        let name = tournament_name.context("--archive requires --tournament <name>")?;
        let (path, total) = archive_board(&name, &records)?;
        println!();
        println!("Archived {total} matches to {}", path.display());
    }

    Ok(())
}

fn load_board_html() -> Result<String> {
    if let Some(path) = parse_value_arg("--file") {
        return fs::read_to_string(&path)
            .with_context(|| format!("failed reading board file {path}"));
    }
    if has_flag("--demo") || config::demo_mode() {
        return Ok(sample::sample_board_html().to_string());
    }
    fetch::fetch_scoreboard()
}

fn print_board(records: &[MatchRecord]) {
    if records.is_empty() {
        println!("No matches on the board");
        return;
    }

    for record in records {
        println!("[{}]", context_line(record));
        println!("  {}", record.display);
        let mut line = record.score.join(" ");
        if let Some(status) = &record.status {
            if !line.is_empty() {
                line.push_str("  ");
            }
            line.push_str(status);
        }
        if !line.is_empty() {
            println!("  {line}");
        }
        if let Some(next) = record.next_match.as_deref() {
            println!("  next: {}", next.display);
        }
        println!();
    }

    let live = records.iter().filter(|m| m.is_live()).count();
    let finished = records.iter().filter(|m| m.is_finished()).count();
    println!(
        "{} matches on the board ({live} live, {finished} finished)",
        records.len()
    );
}

fn context_line(m: &MatchRecord) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(category) = &m.category {
        parts.push(category.clone());
    }
    if let Some(round) = &m.round {
        parts.push(round.clone());
    }
    if let Some(court) = &m.court {
        parts.push(court.clone());
    }
    if let Some(time) = &m.time {
        let mut stamp = time.clone();
        if let Some(tz) = &m.timezone {
            stamp.push(' ');
            stamp.push_str(tz);
        }
        if m.time_estimated {
            stamp.push_str(" (est)");
        }
        parts.push(stamp);
    }
    if parts.is_empty() {
        "Match".to_string()
    } else {
        parts.join(" - ")
    }
}

/// Upsert the current board into the tournament's archive file. Matches
/// already archived (same display and round) are replaced so scores and
/// statuses track the live board; everything else accrues.
fn archive_board(name: &str, records: &[MatchRecord]) -> Result<(PathBuf, usize)> {
    let year = Utc::now().year();
    let id = store::archive_id(name, year);
    let file_store = FileStore::from_env()?;

    let existing = file_store.path_for(&id);
    let mut tournament = if existing.exists() {
        FileStore::load_tournament(&existing)?
    } else {
        ArchivedTournament {
            id,
            name: name.to_string(),
            year,
            date_start: Some(Utc::now().format("%d/%m/%Y").to_string()),
            date_end: None,
            matches: Vec::new(),
            archived_at: String::new(),
        }
    };

    for record in records {
        // Board-only linkage; a stored record should not embed its successor.
        let mut record = record.clone();
        record.next_match = None;
        let slot = tournament
            .matches
            .iter_mut()
            .find(|m| m.display == record.display && m.round == record.round);
        match slot {
            Some(slot) => *slot = record,
            None => tournament.matches.push(record),
        }
    }
    tournament.archived_at = Utc::now().to_rfc3339();

    let path = file_store.save_tournament(&tournament)?;
    Ok((path, tournament.matches.len()))
}

fn parse_value_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == name)
}
