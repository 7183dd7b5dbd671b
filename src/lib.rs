//! Live padel scoreboard ingestion and match statistics.
//!
//! Scrapes the Premier Padel scoreboard widget into canonical match
//! records, archives finished tournaments as JSON, and aggregates the
//! archive into player and head-to-head statistics.

pub mod archive;
pub mod config;
pub mod db;
pub mod export;
pub mod fetch;
pub mod grouper;
pub mod h2h;
pub mod identity;
pub mod model;
pub mod player_stats;
pub mod rankings;
pub mod sample;
pub mod score;
pub mod store;
pub mod widget;
