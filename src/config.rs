use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};

const DATA_DIR: &str = "padel_scores";

pub const DEFAULT_WIDGET_URL: &str = "https://live.premierpadel.com/widget/scoreboard";
pub const DEFAULT_RANKING_URL: &str = "https://www.padelfip.com/ranking-male/";

/// `.env.local` wins over `.env`; missing files are fine.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn widget_url() -> String {
    env_string("PADEL_WIDGET_URL").unwrap_or_else(|| DEFAULT_WIDGET_URL.to_string())
}

pub fn ranking_url() -> String {
    env_string("PADEL_RANKING_URL").unwrap_or_else(|| DEFAULT_RANKING_URL.to_string())
}

/// Corpus cache staleness bound, clamped to something sane.
pub fn cache_ttl_secs() -> u64 {
    env::var("PADEL_CACHE_TTL_SECS")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(300)
        .clamp(5, 3600)
}

pub fn http_timeout() -> Duration {
    let secs = env::var("PADEL_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(10)
        .clamp(1, 120);
    Duration::from_secs(secs)
}

pub fn location() -> Option<String> {
    env_string("PADEL_LOCATION")
}

/// `PADEL_DEMO=1` switches the board binary to the canned sample feed.
pub fn demo_mode() -> bool {
    matches!(
        env_string("PADEL_DEMO").as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

pub fn default_timezone() -> Option<String> {
    env_string("PADEL_TIMEZONE")
}

/// Archive directory: explicit override, else XDG data home, else
/// ~/.local/share.
pub fn archive_dir() -> Result<PathBuf> {
    if let Some(dir) = env_string("PADEL_ARCHIVE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(base) = env::var("XDG_DATA_HOME")
        && !base.trim().is_empty()
    {
        return Ok(PathBuf::from(base).join(DATA_DIR).join("archive"));
    }
    let home = env::var("HOME").map_err(|_| anyhow!("HOME not set; set PADEL_ARCHIVE_DIR"))?;
    if home.trim().is_empty() {
        return Err(anyhow!("HOME empty; set PADEL_ARCHIVE_DIR"));
    }
    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join(DATA_DIR)
        .join("archive"))
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
