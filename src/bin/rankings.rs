use std::fs;

use anyhow::{Context, Result};

use padel_scores::config;
use padel_scores::fetch;
use padel_scores::rankings;

fn main() -> Result<()> {
    config::load_dotenv();
    tracing_subscriber::fmt::init();

    let html = match parse_value_arg("--file") {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("failed reading ranking file {path}"))?,
        None => fetch::fetch_ranking_page()?,
    };

    let limit = parse_value_arg("--limit")
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(20)
        .max(1);

    let entries = rankings::parse_ranking_html(&html);
    if entries.is_empty() {
        println!("No ranking entries parsed");
        return Ok(());
    }

    for entry in entries.iter().take(limit) {
        let mut line = format!("{:>4}  {}", entry.position, entry.player);
        if let Some(country) = &entry.country {
            line.push_str(&format!("  ({country})"));
        }
        if let Some(points) = entry.points {
            line.push_str(&format!("  {points} pts"));
        }
        println!("{line}");
    }
    println!();
    println!("{} entries", entries.len());

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
