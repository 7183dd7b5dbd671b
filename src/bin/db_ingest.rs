use std::path::PathBuf;

use anyhow::{Context, Result};

use padel_scores::config;
use padel_scores::db;
use padel_scores::store::FileStore;

fn main() -> Result<()> {
    config::load_dotenv();
    tracing_subscriber::fmt::init();

    let db_path = parse_db_path_arg()
        .or_else(db::default_db_path)
        .context("unable to resolve sqlite path; pass --db <path>")?;

    let file_store = FileStore::from_env()?;
    let tournaments = file_store.load_all()?;

    let mut conn = db::open_db(&db_path)?;
    let summary = db::mirror_archive(&mut conn, &tournaments)?;

    println!("Archive mirror complete");
    println!("DB: {}", db_path.display());
    println!("Tournaments: {}", summary.tournaments);
    println!("Matches: {}", summary.matches);

    Ok(())
}

fn parse_db_path_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--db" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
