use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

use crate::config;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(config::http_timeout())
            .build()
            .context("failed to build http client")
    })
}

/// Raw scoreboard widget markup from the configured URL.
pub fn fetch_scoreboard() -> Result<String> {
    fetch_text(&config::widget_url())
}

pub fn fetch_ranking_page() -> Result<String> {
    fetch_text(&config::ranking_url())
}

fn fetch_text(url: &str) -> Result<String> {
    let client = http_client()?;
    let resp = client
        .get(url)
        .header(USER_AGENT, "Mozilla/5.0")
        .send()
        .with_context(|| format!("request {url}"))?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {}: {}", status, body));
    }
    Ok(body)
}
