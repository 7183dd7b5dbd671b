use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%d.%m.%Y"];

/// Tournament reference carried by every archived match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TournamentRef {
    pub name: String,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
}

/// One canonical match as emitted by the row grouper and stored in archive
/// files. Every field defaults so partially-populated archives still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchRecord {
    pub display: String,
    pub time: Option<String>,
    pub time_estimated: bool,
    pub timezone: Option<String>,
    pub category: Option<String>,
    pub round: Option<String>,
    pub location: Option<String>,
    pub court: Option<String>,
    pub team1: Vec<String>,
    pub team2: Vec<String>,
    pub team1_flags: Vec<String>,
    pub team2_flags: Vec<String>,
    pub score: Vec<String>,
    pub status: Option<String>,
    pub team1_seed: Option<u32>,
    pub team2_seed: Option<u32>,
    pub tournament: Option<TournamentRef>,
    /// Resolved-year annotation applied when the corpus is loaded.
    pub year: Option<i32>,
    /// Next match scheduled on the same court, linked for live records.
    pub next_match: Option<Box<MatchRecord>>,
}

impl MatchRecord {
    /// Both rosters present; anything less is an assembly failure.
    pub fn is_parsable(&self) -> bool {
        !self.team1.is_empty() && !self.team2.is_empty()
    }

    pub fn is_live(&self) -> bool {
        let Some(status) = self.status.as_deref() else {
            return false;
        };
        let status = status.to_lowercase();
        status.contains("live") || status.contains("in progress")
    }

    pub fn is_finished(&self) -> bool {
        let Some(status) = self.status.as_deref() else {
            return false;
        };
        let status = status.to_lowercase();
        ["finished", "walkover", "retired", "w.o."]
            .iter()
            .any(|marker| status.contains(marker))
    }

    pub fn tournament_name(&self) -> Option<&str> {
        self.tournament.as_ref().map(|t| t.name.as_str())
    }

    /// Chronological ordering key: tournament start date when one parses
    /// (day-first form tried before the alternatives), else January 1 of
    /// the resolved year. Records with neither keep their archive order.
    pub fn sort_date(&self) -> Option<NaiveDate> {
        if let Some(raw) = self
            .tournament
            .as_ref()
            .and_then(|t| t.date_start.as_deref())
            && let Some(date) = parse_flexible_date(raw)
        {
            return Some(date);
        }
        self.year.and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
    }
}

/// Day-first DD/MM/YYYY first, then the fallback shapes seen in archives.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// One serialized archive file: a tournament plus every match recorded for
/// it. `matches` may be empty for seed-only records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedTournament {
    pub id: String,
    pub name: String,
    pub year: i32,
    #[serde(default)]
    pub date_start: Option<String>,
    #[serde(default)]
    pub date_end: Option<String>,
    #[serde(default)]
    pub matches: Vec<MatchRecord>,
    pub archived_at: String,
}

impl ArchivedTournament {
    /// A 4-digit year embedded in the display name overrides the stored
    /// year field. Archives renamed after the fact rely on this precedence.
    pub fn resolved_year(&self) -> i32 {
        embedded_year(&self.name).unwrap_or(self.year)
    }

    pub fn tournament_ref(&self) -> TournamentRef {
        TournamentRef {
            name: self.name.clone(),
            date_start: self.date_start.clone(),
            date_end: self.date_end.clone(),
        }
    }
}

/// First plausible 4-digit run in `name`, bounded by non-digits.
pub fn embedded_year(name: &str) -> Option<i32> {
    let bytes = name.as_bytes();
    let mut idx = 0usize;
    while idx < bytes.len() {
        if !bytes[idx].is_ascii_digit() {
            idx += 1;
            continue;
        }
        let start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx - start == 4
            && let Ok(year) = name[start..idx].parse::<i32>()
            && (1900..=2099).contains(&year)
        {
            return Some(year);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_year_bounds() {
        assert_eq!(embedded_year("Madrid Major 2024"), Some(2024));
        assert_eq!(embedded_year("Qatar 2023 Major"), Some(2023));
        assert_eq!(embedded_year("Match 12345"), None);
        assert_eq!(embedded_year("Round 16"), None);
        assert_eq!(embedded_year("No digits"), None);
    }

    #[test]
    fn resolved_year_prefers_name() {
        let t = ArchivedTournament {
            id: "x".to_string(),
            name: "Paris Major 2023".to_string(),
            year: 2024,
            date_start: None,
            date_end: None,
            matches: Vec::new(),
            archived_at: "2024-01-01T00:00:00Z".to_string(),
        };
        assert_eq!(t.resolved_year(), 2023);
    }

    #[test]
    fn sort_date_prefers_day_first_start_date() {
        let mut m = MatchRecord {
            year: Some(2024),
            tournament: Some(TournamentRef {
                name: "Qatar Major".to_string(),
                date_start: Some("03/02/2024".to_string()),
                date_end: None,
            }),
            ..MatchRecord::default()
        };
        assert_eq!(m.sort_date(), NaiveDate::from_ymd_opt(2024, 2, 3));
        m.tournament = None;
        assert_eq!(m.sort_date(), NaiveDate::from_ymd_opt(2024, 1, 1));
        m.year = None;
        assert_eq!(m.sort_date(), None);
    }

    #[test]
    fn flexible_date_fallbacks() {
        assert_eq!(
            parse_flexible_date("2024-02-03"),
            NaiveDate::from_ymd_opt(2024, 2, 3)
        );
        assert_eq!(
            parse_flexible_date("03-02-2024"),
            NaiveDate::from_ymd_opt(2024, 2, 3)
        );
        assert_eq!(
            parse_flexible_date("03.02.2024"),
            NaiveDate::from_ymd_opt(2024, 2, 3)
        );
        assert_eq!(parse_flexible_date("sometime"), None);
    }

    #[test]
    fn status_heuristics() {
        let mut m = MatchRecord::default();
        assert!(!m.is_live());
        m.status = Some("LIVE - 2nd set".to_string());
        assert!(m.is_live());
        m.status = Some("Finished".to_string());
        assert!(!m.is_live());
        assert!(m.is_finished());
    }
}
