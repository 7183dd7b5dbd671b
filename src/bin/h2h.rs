use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use padel_scores::archive::{CorpusCache, SystemClock};
use padel_scores::config;
use padel_scores::export;
use padel_scores::h2h::{self, TeamSplit};
use padel_scores::score::Side;
use padel_scores::store::FileStore;

fn main() -> Result<()> {
    config::load_dotenv();
    tracing_subscriber::fmt::init();

    let team1 = parse_names_arg("--team1")
        .context("usage: h2h --team1 <names> --team2 <names> [--year <year>] [--xlsx <path>]")?;
    let team2 = parse_names_arg("--team2").context("missing --team2 <comma separated names>")?;
    if team1.is_empty() || team2.is_empty() {
        return Err(anyhow!("both --team1 and --team2 need at least one name"));
    }
    let year = parse_value_arg("--year").and_then(|raw| raw.parse::<i32>().ok());

    let cache = CorpusCache::new(FileStore::from_env()?, SystemClock, config::cache_ttl_secs());
    let corpus = cache.load_direct()?;

    let report = h2h::compute_h2h(&corpus, &team1, &team2, year);
    let common = h2h::common_opponents(&corpus, &team1, &team2);

    let label1 = team1.join(" / ");
    let label2 = team2.join(" / ");

    println!("{label1}  vs  {label2}");
    if let Some(year) = year {
        println!("Year: {year}");
    }
    println!(
        "Meetings: {} ({} - {})",
        report.total_matches, report.team1_wins, report.team2_wins
    );
    println!(
        "First set won: {}   converted: {}",
        fmt_split(report.first_set.won_first),
        fmt_split(report.first_set.converted)
    );
    println!(
        "Three-set matches: {} (wins {})",
        report.three_set.total,
        fmt_split(report.three_set.wins)
    );
    println!(
        "Tiebreak sets: {} (won {})",
        report.tiebreaks.total,
        fmt_split(report.tiebreaks.wins)
    );
    println!(
        "Big matches: {} (wins {})",
        report.big_matches.total,
        fmt_split(report.big_matches.wins)
    );
    println!("Games won: {}", fmt_split(report.games));
    println!(
        "Averages: {:.2} sets, {:.2} games per match",
        report.avg_sets_per_match, report.avg_games_per_match
    );

    if !report.rounds.is_empty() {
        println!();
        println!("By round:");
        for line in &report.rounds {
            println!(
                "  {}: {} ({})",
                line.round,
                line.total,
                fmt_split(line.wins)
            );
        }
    }

    if !report.matches.is_empty() {
        println!();
        println!("Meetings:");
        for meeting in &report.matches {
            let winner = match meeting.winner {
                Some(Side::Team1) => label1.as_str(),
                Some(Side::Team2) => label2.as_str(),
                None => "-",
            };
            let mut line = String::from("  ");
            if let Some(tournament) = &meeting.tournament {
                line.push_str(tournament);
            } else {
                line.push('?');
            }
            if let Some(year) = meeting.year {
                line.push_str(&format!(" ({year})"));
            }
            if let Some(round) = &meeting.round {
                line.push(' ');
                line.push_str(round);
            }
            if !meeting.score.is_empty() {
                line.push_str(": ");
                line.push_str(&meeting.score.join(" "));
            }
            line.push_str(&format!("  -> {winner}"));
            println!("{line}");
        }
    }

    if !common.is_empty() {
        println!();
        println!("Common opponents:");
        for entry in &common {
            println!(
                "  {} ({} meetings): {} {}-{}, {} {}-{}",
                entry.opponent.join(" / "),
                entry.meetings,
                label1,
                entry.team1.wins,
                entry.team1.losses,
                label2,
                entry.team2.wins,
                entry.team2.losses
            );
        }
    }

    if let Some(path) = parse_value_arg("--xlsx") {
        let path = PathBuf::from(path);
        let summary = export::export_h2h(&path, &report, &common)?;
        println!();
        println!("Exported {} rows to {}", summary.rows, path.display());
    }

    Ok(())
}

fn fmt_split(split: TeamSplit) -> String {
    format!("{} - {}", split.team1, split.team2)
}

/// Comma/semicolon separated name list; spaces stay inside names.
fn parse_names_arg(name: &str) -> Option<Vec<String>> {
    let raw = parse_value_arg(name)?;
    let names = raw
        .split([',', ';'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    Some(names)
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
