use std::collections::HashMap;

use crate::identity::{names_match, roster_contains};
use crate::model::MatchRecord;
use crate::score::{match_winner, Side};

/// Fixed display order for the round-performance breakdown.
pub const ROUND_BUCKETS: &[&str] = &[
    "Final",
    "Semi Final",
    "Quarter Final",
    "Round of 16",
    "Round of 32",
    "Early Rounds",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Win,
    Loss,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerCount {
    pub partner: String,
    pub matches: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTally {
    pub round: String,
    pub played: u32,
    pub won: u32,
}

/// One line of the recent-form view, most recent first.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentMatch {
    pub tournament: Option<String>,
    pub year: Option<i32>,
    pub round: Option<String>,
    pub opponents: Vec<String>,
    pub score: Vec<String>,
    pub outcome: MatchOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub player: String,
    pub total_matches: u32,
    pub wins: u32,
    pub losses: u32,
    /// Percent, wins over all selected matches (unresolved ones included).
    pub win_rate: f64,
    pub titles: u32,
    pub finals_reached: u32,
    pub longest_streak: u32,
    pub current_streak: u32,
    pub partners: Vec<PartnerCount>,
    pub rounds: Vec<RoundTally>,
    pub recent: Vec<RecentMatch>,
}

/// Collapse a raw round label into the 6-bucket taxonomy. Semi and
/// quarter forms are checked before the bare "final" keyword so
/// "Quarterfinals" never lands in the Final bucket.
pub fn round_bucket(round: &str) -> &'static str {
    let folded = round.to_lowercase();
    if folded.contains("semi") {
        "Semi Final"
    } else if folded.contains("quarter") {
        "Quarter Final"
    } else if folded.contains("final") {
        "Final"
    } else if folded.contains("16") {
        "Round of 16"
    } else if folded.contains("32") {
        "Round of 32"
    } else {
        "Early Rounds"
    }
}

/// Career statistics for one player over a corpus snapshot.
pub fn compute_stats(corpus: &[MatchRecord], player: &str, year_filter: Option<i32>) -> PlayerStats {
    let mut selected: Vec<&MatchRecord> = corpus
        .iter()
        .filter(|m| {
            if let Some(year) = year_filter
                && m.year != Some(year)
            {
                return false;
            }
            roster_contains(&m.team1, player) || roster_contains(&m.team2, player)
        })
        .collect();
    selected.sort_by_key(|m| m.sort_date());

    let mut stats = PlayerStats {
        player: player.to_string(),
        total_matches: selected.len() as u32,
        wins: 0,
        losses: 0,
        win_rate: 0.0,
        titles: 0,
        finals_reached: 0,
        longest_streak: 0,
        current_streak: 0,
        partners: Vec::new(),
        rounds: Vec::new(),
        recent: Vec::new(),
    };

    let mut partner_counts: HashMap<String, u32> = HashMap::new();
    let mut round_tallies: HashMap<&'static str, (u32, u32)> = HashMap::new();
    let mut streak = 0u32;

    for m in &selected {
        let side = if roster_contains(&m.team1, player) {
            Side::Team1
        } else {
            Side::Team2
        };
        let (own, other) = match side {
            Side::Team1 => (&m.team1, &m.team2),
            Side::Team2 => (&m.team2, &m.team1),
        };

        let outcome = match match_winner(&m.score) {
            Some(winner) if winner == side => MatchOutcome::Win,
            Some(_) => MatchOutcome::Loss,
            None => MatchOutcome::Unknown,
        };
        match outcome {
            MatchOutcome::Win => {
                stats.wins += 1;
                streak += 1;
                stats.longest_streak = stats.longest_streak.max(streak);
            }
            MatchOutcome::Loss => {
                stats.losses += 1;
                streak = 0;
            }
            MatchOutcome::Unknown => {}
        }

        for partner in own.iter().filter(|name| !names_match(name, player)) {
            *partner_counts.entry(partner.clone()).or_insert(0) += 1;
        }

        if let Some(round) = m.round.as_deref() {
            let bucket = round_bucket(round);
            let tally = round_tallies.entry(bucket).or_insert((0, 0));
            tally.0 += 1;
            if outcome == MatchOutcome::Win {
                tally.1 += 1;
            }
            if bucket == "Final" {
                match outcome {
                    MatchOutcome::Win => {
                        stats.titles += 1;
                        stats.finals_reached += 1;
                    }
                    MatchOutcome::Loss => stats.finals_reached += 1,
                    MatchOutcome::Unknown => {}
                }
            }
        }

        stats.recent.push(RecentMatch {
            tournament: m.tournament_name().map(|s| s.to_string()),
            year: m.year,
            round: m.round.clone(),
            opponents: other.clone(),
            score: m.score.clone(),
            outcome,
        });
    }

    stats.current_streak = streak;
    if stats.total_matches > 0 {
        stats.win_rate = f64::from(stats.wins) / f64::from(stats.total_matches) * 100.0;
    }

    let keep = stats.recent.len().saturating_sub(5);
    stats.recent.drain(..keep);
    stats.recent.reverse();

    stats.partners = partner_counts.into_iter().map(|(partner, matches)| PartnerCount { partner, matches }).collect();
    stats
        .partners
        .sort_by(|a, b| b.matches.cmp(&a.matches).then_with(|| a.partner.cmp(&b.partner)));

    stats.rounds = ROUND_BUCKETS
        .iter()
        .map(|bucket| {
            let (played, won) = round_tallies.get(bucket).copied().unwrap_or((0, 0));
            RoundTally {
                round: bucket.to_string(),
                played,
                won,
            }
        })
        .collect();

    stats
}
