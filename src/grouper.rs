use std::collections::HashMap;

use crate::model::{MatchRecord, TournamentRef};
use crate::score::{canonical_token, normalize_set};
use crate::widget::WidgetRow;

/// Minutes added to a court's last known start when a "followed by"
/// header carries no time of its own.
const FOLLOW_ON_GAP_MIN: u16 = 90;

/// Ordered: quarter/semi forms must win over the bare "final" keyword.
const ROUND_KEYWORDS: &[(&str, &str)] = &[
    ("quarter final", "Quarter Final"),
    ("quarterfinal", "Quarter Final"),
    ("semi final", "Semi Final"),
    ("semifinal", "Semi Final"),
    ("round of 16", "Round of 16"),
    ("round of 32", "Round of 32"),
    ("final", "Final"),
    ("qualif", "Qualifying"),
];

const STATUS_MARKERS: &[&str] = &[
    "finished",
    "live",
    "in progress",
    "not started",
    "walkover",
    "retired",
    "w.o",
    "suspended",
    "postponed",
    "cancelled",
    "upcoming",
    "to follow",
];

/// Board-level defaults applied to every emitted record.
#[derive(Debug, Clone, Default)]
pub struct GroupOptions {
    pub location: Option<String>,
    pub timezone: Option<String>,
    pub tournament: Option<TournamentRef>,
}

/// Header state threaded through the fold over the row sequence.
#[derive(Debug, Clone, Default)]
struct HeaderContext {
    category: Option<String>,
    round: Option<String>,
    court: Option<String>,
    time: Option<String>,
    time_estimated: bool,
    timezone: Option<String>,
    auto_court: u32,
    last_court_times: HashMap<String, u16>,
}

impl HeaderContext {
    fn apply(&mut self, text: &str) {
        let folded = fold(text);

        // "women" contains "men"; check it first.
        if folded.contains("women") {
            self.category = Some("Women".to_string());
        } else if folded.contains("men") {
            self.category = Some("Men".to_string());
        }

        for (keyword, label) in ROUND_KEYWORDS {
            if folded.contains(keyword) {
                self.round = Some(label.to_string());
                break;
            }
        }

        if let Some(court) = parse_court(&folded) {
            self.court = Some(court);
        } else if folded.contains("starting at") {
            self.auto_court += 1;
            self.court = Some(format!("Court {}", self.auto_court));
        }

        if let Some((minutes, tz)) = parse_time(text) {
            self.time = Some(format_minutes(minutes));
            self.time_estimated = false;
            if tz.is_some() {
                self.timezone = tz;
            }
            if let Some(court) = &self.court {
                self.last_court_times.insert(court.clone(), minutes);
            }
        } else if folded.contains("followed by") {
            let estimate = self
                .court
                .as_ref()
                .and_then(|court| self.last_court_times.get(court).copied())
                .map(|last| (last + FOLLOW_ON_GAP_MIN) % (24 * 60));
            match estimate {
                Some(minutes) => {
                    self.time = Some(format_minutes(minutes));
                    self.time_estimated = true;
                    if let Some(court) = &self.court {
                        self.last_court_times.insert(court.clone(), minutes);
                    }
                }
                None => {
                    // No base time to chain from on this court.
                    self.time = None;
                    self.time_estimated = false;
                }
            }
        }
    }
}

/// Fold the ordered row sequence into canonical match records.
///
/// Player rows buffer in pairs; the row after a complete pair is consumed
/// as the match summary only when it reads as a status banner. A stray
/// non-header, non-player row under a partial buffer discards the buffer:
/// ambiguous halves of a match are dropped, never guessed at.
pub fn group_rows(rows: &[WidgetRow], opts: &GroupOptions) -> Vec<MatchRecord> {
    let mut records: Vec<MatchRecord> = Vec::new();
    let mut ctx = HeaderContext::default();
    let mut buffer: Vec<&WidgetRow> = Vec::new();

    for row in rows {
        if buffer.len() == 2 {
            let is_summary = !row.header && !row.is_player_row() && is_status_text(&row.text);
            let status = is_summary.then(|| row.text.clone());
            if let Some(record) = assemble(&buffer, &ctx, opts, status) {
                records.push(record);
            }
            buffer.clear();
            if is_summary {
                continue;
            }
        }

        if row.header {
            ctx.apply(&row.text);
        } else if row.is_player_row() {
            buffer.push(row);
        } else if buffer.len() < 2 {
            if !buffer.is_empty() {
                tracing::debug!(text = %row.text, "dropping partial match buffer");
            }
            buffer.clear();
        }
    }
    if buffer.len() == 2
        && let Some(record) = assemble(&buffer, &ctx, opts, None)
    {
        records.push(record);
    }

    link_next_matches(&mut records);
    records
}

fn assemble(
    buffer: &[&WidgetRow],
    ctx: &HeaderContext,
    opts: &GroupOptions,
    status: Option<String>,
) -> Option<MatchRecord> {
    let (team1, team1_seed) = split_roster(&buffer[0].players);
    let (team2, team2_seed) = split_roster(&buffer[1].players);
    if team1.is_empty() || team2.is_empty() {
        return None;
    }

    let mut score = Vec::new();
    for (cell1, cell2) in buffer[0].scores.iter().zip(buffer[1].scores.iter()) {
        let (raw1, raw2) = (cell1.trim(), cell2.trim());
        if raw1.is_empty() && raw2.is_empty() {
            continue;
        }
        let pair = format!("{raw1}-{raw2}");
        match normalize_set(&pair) {
            Some(set) => score.push(canonical_token(&set)),
            None => tracing::debug!(%pair, "dropping unparseable set pair"),
        }
    }

    Some(MatchRecord {
        display: format!("{} vs {}", team1.join(" / "), team2.join(" / ")),
        time: ctx.time.clone(),
        time_estimated: ctx.time_estimated,
        timezone: ctx.timezone.clone().or_else(|| opts.timezone.clone()),
        category: ctx.category.clone(),
        round: ctx.round.clone(),
        location: opts.location.clone(),
        court: ctx.court.clone(),
        team1,
        team2,
        team1_flags: buffer[0].flags.clone(),
        team2_flags: buffer[1].flags.clone(),
        score,
        status,
        team1_seed,
        team2_seed,
        tournament: opts.tournament.clone(),
        year: None,
        next_match: None,
    })
}

/// Trailing "(N)" markers come off the names and into the team seed.
fn split_roster(players: &[String]) -> (Vec<String>, Option<u32>) {
    let mut names = Vec::with_capacity(players.len());
    let mut seed = None;
    for raw in players {
        let (name, player_seed) = strip_seed(raw);
        if !name.is_empty() {
            names.push(name);
        }
        if seed.is_none() {
            seed = player_seed;
        }
    }
    (names, seed)
}

fn strip_seed(raw: &str) -> (String, Option<u32>) {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_suffix(')')
        && let Some((name, digits)) = rest.rsplit_once('(')
        && !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
    {
        return (name.trim_end().to_string(), digits.parse().ok());
    }
    (trimmed.to_string(), None)
}

fn is_status_text(text: &str) -> bool {
    let folded = fold(text);
    if folded.is_empty() {
        return false;
    }
    STATUS_MARKERS.iter().any(|marker| folded.contains(marker))
}

/// Live records point at whatever comes next on their court.
fn link_next_matches(records: &mut [MatchRecord]) {
    let unlinked = records.to_vec();
    for idx in 0..records.len() {
        if !records[idx].is_live() {
            continue;
        }
        let Some(court) = records[idx].court.clone() else {
            continue;
        };
        let next = unlinked
            .iter()
            .skip(idx + 1)
            .find(|record| record.court.as_deref() == Some(court.as_str()));
        if let Some(next) = next {
            records[idx].next_match = Some(Box::new(next.clone()));
        }
    }
}

/// Lowercased, hyphens opened to spaces, whitespace squashed.
fn fold(text: &str) -> String {
    text.to_lowercase()
        .replace(['-', '–'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_court(folded: &str) -> Option<String> {
    if folded.contains("grand stand") {
        return Some("Grand Stand".to_string());
    }
    if folded.contains("center court") || folded.contains("centre court") {
        return Some("Center Court".to_string());
    }
    if folded.contains("pista central") {
        return Some("Pista Central".to_string());
    }
    let tokens: Vec<&str> = folded.split(' ').collect();
    for (idx, token) in tokens.iter().enumerate() {
        let label = match *token {
            "court" => "Court",
            "pista" => "Pista",
            _ => continue,
        };
        if let Some(number) = tokens.get(idx + 1)
            && !number.is_empty()
            && number.chars().all(|c| c.is_ascii_digit())
        {
            return Some(format!("{label} {number}"));
        }
    }
    None
}

/// First HH:MM token in the raw (case-preserved) text, with an adjacent
/// all-caps 2-5 letter token taken as the timezone.
fn parse_time(text: &str) -> Option<(u16, Option<String>)> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    for (idx, token) in tokens.iter().enumerate() {
        let cleaned = token.trim_matches(|c: char| !c.is_ascii_digit() && c != ':');
        let Some((hours, minutes)) = cleaned.split_once(':') else {
            continue;
        };
        if hours.is_empty()
            || hours.len() > 2
            || minutes.len() != 2
            || !hours.chars().all(|c| c.is_ascii_digit())
            || !minutes.chars().all(|c| c.is_ascii_digit())
        {
            continue;
        }
        let (Ok(h), Ok(m)) = (hours.parse::<u16>(), minutes.parse::<u16>()) else {
            continue;
        };
        if h >= 24 || m >= 60 {
            continue;
        }
        let tz = tokens.get(idx + 1).and_then(|t| parse_timezone(t));
        return Some((h * 60 + m, tz));
    }
    None
}

fn parse_timezone(token: &str) -> Option<String> {
    let cleaned = token.trim_matches(|c: char| !c.is_ascii_alphabetic());
    if (2..=5).contains(&cleaned.len()) && cleaned.chars().all(|c| c.is_ascii_uppercase()) {
        Some(cleaned.to_string())
    } else {
        None
    }
}

fn format_minutes(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
