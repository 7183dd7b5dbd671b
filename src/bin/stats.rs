use std::path::PathBuf;

use anyhow::{Context, Result};

use padel_scores::archive::{CorpusCache, SystemClock};
use padel_scores::config;
use padel_scores::export;
use padel_scores::player_stats::{self, MatchOutcome};
use padel_scores::store::FileStore;

fn main() -> Result<()> {
    config::load_dotenv();
    tracing_subscriber::fmt::init();

    let player = parse_value_arg("--player")
        .context("usage: stats --player <name> [--year <year>] [--xlsx <path>]")?;
    let year = parse_value_arg("--year").and_then(|raw| raw.parse::<i32>().ok());

    let cache = CorpusCache::new(FileStore::from_env()?, SystemClock, config::cache_ttl_secs());
    let corpus = cache.load_direct()?;
    let stats = player_stats::compute_stats(&corpus, &player, year);

    println!("Player: {}", stats.player);
    if let Some(year) = year {
        println!("Year: {year}");
    }
    println!(
        "Matches: {} (W {} / L {})",
        stats.total_matches, stats.wins, stats.losses
    );
    println!("Win rate: {:.1}%", stats.win_rate);
    println!(
        "Titles: {} (finals reached {})",
        stats.titles, stats.finals_reached
    );
    println!(
        "Streak: current {} / best {}",
        stats.current_streak, stats.longest_streak
    );

    if !stats.partners.is_empty() {
        println!();
        println!("Partners:");
        for partner in &stats.partners {
            println!("  {}: {}", partner.partner, partner.matches);
        }
    }

    println!();
    println!("Rounds:");
    for tally in &stats.rounds {
        println!("  {}: {} played, {} won", tally.round, tally.played, tally.won);
    }

    if !stats.recent.is_empty() {
        println!();
        println!("Recent:");
        for entry in &stats.recent {
            let mark = match entry.outcome {
                MatchOutcome::Win => "W",
                MatchOutcome::Loss => "L",
                MatchOutcome::Unknown => "?",
            };
            let mut line = format!("  [{mark}]");
            if let Some(tournament) = &entry.tournament {
                line.push(' ');
                line.push_str(tournament);
            }
            if let Some(round) = &entry.round {
                line.push(' ');
                line.push_str(round);
            }
            line.push_str(" vs ");
            line.push_str(&entry.opponents.join(" / "));
            if !entry.score.is_empty() {
                line.push_str(": ");
                line.push_str(&entry.score.join(" "));
            }
            println!("{line}");
        }
    }

    if let Some(path) = parse_value_arg("--xlsx") {
        let path = PathBuf::from(path);
        let summary = export::export_player_stats(&path, &stats)?;
        println!();
        println!("Exported {} rows to {}", summary.rows, path.display());
    }

    Ok(())
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
