use std::collections::HashMap;

use crate::identity::roster_matches;
use crate::model::MatchRecord;
use crate::score::{parsed_sets, Side, SetScore};

/// Per-queried-team counter pair. `team1`/`team2` refer to the QUERY
/// teams throughout this module, not to a record's physical sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TeamSplit {
    pub team1: u32,
    pub team2: u32,
}

impl TeamSplit {
    fn bump(&mut self, side: Side) {
        match side {
            Side::Team1 => self.team1 += 1,
            Side::Team2 => self.team2 += 1,
        }
    }

    fn add(&mut self, side: Side, amount: u32) {
        match side {
            Side::Team1 => self.team1 += amount,
            Side::Team2 => self.team2 += amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubTotal {
    pub total: u32,
    pub wins: TeamSplit,
}

/// Set-one conversion: who took the opener, and who turned that into the
/// match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FirstSetSplit {
    pub won_first: TeamSplit,
    pub converted: TeamSplit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSplit {
    pub round: String,
    pub total: u32,
    pub wins: TeamSplit,
}

/// One qualifying meeting, chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingSummary {
    pub tournament: Option<String>,
    pub year: Option<i32>,
    pub round: Option<String>,
    pub score: Vec<String>,
    pub winner: Option<Side>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct H2hReport {
    pub team1: Vec<String>,
    pub team2: Vec<String>,
    pub total_matches: u32,
    pub team1_wins: u32,
    pub team2_wins: u32,
    pub first_set: FirstSetSplit,
    pub three_set: SubTotal,
    pub tiebreaks: SubTotal,
    pub big_matches: SubTotal,
    pub rounds: Vec<RoundSplit>,
    pub games: TeamSplit,
    pub avg_sets_per_match: f64,
    pub avg_games_per_match: f64,
    pub matches: Vec<MeetingSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WinLoss {
    pub wins: u32,
    pub losses: u32,
}

/// One opponent roster both queried teams have faced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonOpponentStats {
    pub opponent: Vec<String>,
    pub meetings: u32,
    pub team1: WinLoss,
    pub team2: WinLoss,
}

/// Rivalry statistics between two queried teams over a corpus snapshot.
///
/// All per-team counters are symmetric: swapping the queried teams swaps
/// every split without changing any total.
pub fn compute_h2h(
    corpus: &[MatchRecord],
    team1_names: &[String],
    team2_names: &[String],
    year_filter: Option<i32>,
) -> H2hReport {
    let mut qualifying: Vec<(&MatchRecord, bool)> = corpus
        .iter()
        .filter(|m| {
            if let Some(year) = year_filter
                && m.year != Some(year)
            {
                return false;
            }
            true
        })
        .filter_map(|m| orientation(m, team1_names, team2_names).map(|flip| (m, flip)))
        .collect();
    qualifying.sort_by_key(|(m, _)| m.sort_date());

    let mut report = H2hReport {
        team1: team1_names.to_vec(),
        team2: team2_names.to_vec(),
        total_matches: qualifying.len() as u32,
        ..H2hReport::default()
    };

    let mut total_sets = 0u32;
    let mut total_games = 0u32;

    for (m, flipped) in &qualifying {
        let sets: Vec<SetScore> = parsed_sets(&m.score)
            .into_iter()
            .map(|set| orient_set(set, *flipped))
            .collect();
        let winner = winner_of(&sets);

        total_sets += sets.len() as u32;
        total_games += sets.iter().map(|s| s.team1 + s.team2).sum::<u32>();

        report.matches.push(MeetingSummary {
            tournament: m.tournament_name().map(|s| s.to_string()),
            year: m.year,
            round: m.round.clone(),
            score: m.score.clone(),
            winner,
        });

        let Some(winner) = winner else {
            continue;
        };
        match winner {
            Side::Team1 => report.team1_wins += 1,
            Side::Team2 => report.team2_wins += 1,
        }

        if let Some(opener) = sets.first().and_then(|set| set.winner()) {
            report.first_set.won_first.bump(opener);
            if opener == winner {
                report.first_set.converted.bump(opener);
            }
        }

        let resolved: Vec<&SetScore> = sets.iter().filter(|s| s.winner().is_some()).collect();
        if resolved.len() == 3 {
            report.three_set.total += 1;
            report.three_set.wins.bump(winner);
        }
        for set in &resolved {
            if set.is_tiebreak() {
                report.tiebreaks.total += 1;
                if let Some(side) = set.winner() {
                    report.tiebreaks.wins.bump(side);
                }
            }
            report.games.add(Side::Team1, set.team1);
            report.games.add(Side::Team2, set.team2);
        }

        if let Some(round) = m.round.as_deref() {
            let label = round_label(round);
            let line = match report.rounds.iter_mut().find(|r| r.round == label) {
                Some(line) => line,
                None => {
                    report.rounds.push(RoundSplit {
                        round: label,
                        total: 0,
                        wins: TeamSplit::default(),
                    });
                    report.rounds.last_mut().expect("just pushed")
                }
            };
            line.total += 1;
            line.wins.bump(winner);
        }

        if is_big_match(m) {
            report.big_matches.total += 1;
            report.big_matches.wins.bump(winner);
        }
    }

    if report.total_matches > 0 {
        let n = f64::from(report.total_matches);
        report.avg_sets_per_match = f64::from(total_sets) / n;
        report.avg_games_per_match = f64::from(total_games) / n;
    }
    report
}

/// How the queried teams map onto the record's physical sides: `false`
/// for team1-as-match.team1, `true` for the swapped arrangement. Both
/// arrangements holding at once resolves to the unswapped one, which
/// keeps the swap-the-query symmetry intact even then.
fn orientation(m: &MatchRecord, team1_names: &[String], team2_names: &[String]) -> Option<bool> {
    if roster_matches(team1_names, &m.team1) && roster_matches(team2_names, &m.team2) {
        return Some(false);
    }
    if roster_matches(team1_names, &m.team2) && roster_matches(team2_names, &m.team1) {
        return Some(true);
    }
    None
}

fn orient_set(set: SetScore, flipped: bool) -> SetScore {
    if flipped {
        SetScore {
            team1: set.team2,
            team2: set.team1,
            marked_tiebreak: set.marked_tiebreak,
        }
    } else {
        set
    }
}

fn winner_of(sets: &[SetScore]) -> Option<Side> {
    let mut team1 = 0u32;
    let mut team2 = 0u32;
    for set in sets {
        match set.winner() {
            Some(Side::Team1) => team1 += 1,
            Some(Side::Team2) => team2 += 1,
            None => {}
        }
    }
    if team1 > team2 {
        Some(Side::Team1)
    } else if team2 > team1 {
        Some(Side::Team2)
    } else {
        None
    }
}

/// Three-tier round labels; anything outside the final stages stays
/// verbatim.
fn round_label(round: &str) -> String {
    let folded = round.to_lowercase();
    if folded.contains("semi") {
        "Semi Final".to_string()
    } else if folded.contains("quarter") {
        "Quarter Final".to_string()
    } else if folded.contains("final") {
        "Final".to_string()
    } else {
        round.trim().to_string()
    }
}

fn is_big_match(m: &MatchRecord) -> bool {
    let Some(name) = m.tournament_name() else {
        return false;
    };
    let folded = name.to_lowercase();
    folded.contains("major") || folded.contains("p1")
}

/// Opponents each queried team has faced, keyed by the exact roster
/// strings rather than fuzzy identity. Fuzzy keying would silently
/// change which opponents count as common, so the two strategies stay
/// separate on purpose.
pub fn common_opponents(
    corpus: &[MatchRecord],
    team1_names: &[String],
    team2_names: &[String],
) -> Vec<CommonOpponentStats> {
    let team1_book = opponent_book(corpus, team1_names);
    let team2_book = opponent_book(corpus, team2_names);

    let mut shared: Vec<CommonOpponentStats> = team1_book
        .into_iter()
        .filter_map(|(key, entry1)| {
            let entry2 = team2_book.get(&key)?;
            Some(CommonOpponentStats {
                opponent: entry1.roster,
                meetings: entry1.meetings + entry2.meetings,
                team1: entry1.record,
                team2: entry2.record,
            })
        })
        .collect();
    shared.sort_by(|a, b| {
        b.meetings
            .cmp(&a.meetings)
            .then_with(|| a.opponent.cmp(&b.opponent))
    });
    shared
}

struct OpponentEntry {
    roster: Vec<String>,
    meetings: u32,
    record: WinLoss,
}

fn opponent_book(corpus: &[MatchRecord], team: &[String]) -> HashMap<String, OpponentEntry> {
    let mut book: HashMap<String, OpponentEntry> = HashMap::new();
    if team.is_empty() {
        return book;
    }
    for m in corpus {
        let (opponent, own_side) = if roster_matches(team, &m.team1) {
            (&m.team2, Side::Team1)
        } else if roster_matches(team, &m.team2) {
            (&m.team1, Side::Team2)
        } else {
            continue;
        };
        if opponent.is_empty() {
            continue;
        }
        let key = roster_key(opponent);
        let entry = book.entry(key).or_insert_with(|| OpponentEntry {
            roster: opponent.clone(),
            meetings: 0,
            record: WinLoss::default(),
        });
        entry.meetings += 1;
        match crate::score::match_winner(&m.score) {
            Some(side) if side == own_side => entry.record.wins += 1,
            Some(_) => entry.record.losses += 1,
            None => {}
        }
    }
    book
}

/// Exact, order-independent serialization of an opponent roster.
fn roster_key(roster: &[String]) -> String {
    let mut names: Vec<String> = roster.iter().map(|n| n.trim().to_string()).collect();
    names.sort();
    names.join("|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TournamentRef;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn meeting(
        team1: &[&str],
        team2: &[&str],
        score: &[&str],
        tournament: &str,
        start: &str,
        year: i32,
        round: Option<&str>,
    ) -> MatchRecord {
        MatchRecord {
            team1: names(team1),
            team2: names(team2),
            score: score.iter().map(|s| s.to_string()).collect(),
            round: round.map(|s| s.to_string()),
            year: Some(year),
            tournament: Some(TournamentRef {
                name: tournament.to_string(),
                date_start: Some(start.to_string()),
                date_end: None,
            }),
            ..MatchRecord::default()
        }
    }

    fn rivalry_corpus() -> Vec<MatchRecord> {
        vec![
            meeting(
                &["Agustin Tapia"],
                &["Alejandro Galan"],
                &["6-4", "6-3"],
                "Qatar Major 2024",
                "01/02/2024",
                2024,
                Some("Semifinals"),
            ),
            // Stored with the rosters swapped; orientation must flip it back.
            meeting(
                &["Alejandro Galan"],
                &["Agustin Tapia"],
                &["6-4", "6-3"],
                "Madrid P1",
                "01/03/2024",
                2024,
                Some("Final"),
            ),
            meeting(
                &["Agustin Tapia"],
                &["Alejandro Galan"],
                &["7-6", "4-6", "6-3"],
                "Paris Major",
                "01/04/2024",
                2024,
                Some("Round of 16"),
            ),
        ]
    }

    #[test]
    fn rivalry_totals_match_expected() {
        let report = compute_h2h(
            &rivalry_corpus(),
            &names(&["Agustin Tapia"]),
            &names(&["Alejandro Galan"]),
            None,
        );
        assert_eq!(report.total_matches, 3);
        assert_eq!(report.team1_wins, 2);
        assert_eq!(report.team2_wins, 1);
        assert_eq!(report.three_set.total, 1);
        assert_eq!(report.three_set.wins, TeamSplit { team1: 1, team2: 0 });
        assert_eq!(report.tiebreaks.total, 1);
        assert_eq!(report.tiebreaks.wins, TeamSplit { team1: 1, team2: 0 });
    }

    #[test]
    fn swapped_storage_still_attributes_correctly() {
        let report = compute_h2h(
            &rivalry_corpus(),
            &names(&["Agustin Tapia"]),
            &names(&["Alejandro Galan"]),
            None,
        );
        // Middle meeting is a Galan win recorded with Galan as team1.
        assert_eq!(report.matches[1].winner, Some(Side::Team2));
        assert_eq!(report.matches[1].round.as_deref(), Some("Final"));
    }

    #[test]
    fn first_set_conversion() {
        let report = compute_h2h(
            &rivalry_corpus(),
            &names(&["Agustin Tapia"]),
            &names(&["Alejandro Galan"]),
            None,
        );
        // Tapia took the opener in matches 1 and 3 and won both; Galan
        // took it in the swapped match and converted.
        assert_eq!(report.first_set.won_first, TeamSplit { team1: 2, team2: 1 });
        assert_eq!(report.first_set.converted, TeamSplit { team1: 2, team2: 1 });
    }

    #[test]
    fn games_rounds_and_big_matches() {
        let report = compute_h2h(
            &rivalry_corpus(),
            &names(&["Agustin Tapia"]),
            &names(&["Alejandro Galan"]),
            None,
        );
        // 12+7+17 for Tapia, 7+12+15 for Galan, over resolved sets.
        assert_eq!(report.games, TeamSplit { team1: 36, team2: 34 });
        assert_eq!(report.big_matches.total, 3);
        assert_eq!(report.big_matches.wins, TeamSplit { team1: 2, team2: 1 });
        let rounds: Vec<(&str, u32)> = report
            .rounds
            .iter()
            .map(|r| (r.round.as_str(), r.total))
            .collect();
        assert_eq!(
            rounds,
            vec![("Semi Final", 1), ("Final", 1), ("Round of 16", 1)]
        );
        assert!((report.avg_sets_per_match - 7.0 / 3.0).abs() < 1e-9);
        assert!((report.avg_games_per_match - 70.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn symmetry_under_query_swap() {
        let mut corpus = rivalry_corpus();
        // An unresolved meeting stays in totals but out of the splits.
        corpus.push(meeting(
            &["Agustin Tapia"],
            &["Alejandro Galan"],
            &[],
            "Milano P1",
            "01/05/2024",
            2024,
            None,
        ));
        let tapia = names(&["Agustin Tapia"]);
        let galan = names(&["Alejandro Galan"]);
        let ab = compute_h2h(&corpus, &tapia, &galan, None);
        let ba = compute_h2h(&corpus, &galan, &tapia, None);

        assert_eq!(ab.total_matches, ba.total_matches);
        assert_eq!(ab.team1_wins, ba.team2_wins);
        assert_eq!(ab.team2_wins, ba.team1_wins);
        assert_eq!(ab.first_set.won_first.team1, ba.first_set.won_first.team2);
        assert_eq!(ab.first_set.converted.team1, ba.first_set.converted.team2);
        assert_eq!(ab.three_set.wins.team1, ba.three_set.wins.team2);
        assert_eq!(ab.tiebreaks.wins.team1, ba.tiebreaks.wins.team2);
        assert_eq!(ab.big_matches.wins.team1, ba.big_matches.wins.team2);
        assert_eq!(ab.games.team1, ba.games.team2);
        assert_eq!(ab.avg_sets_per_match, ba.avg_sets_per_match);
        assert_eq!(ab.avg_games_per_match, ba.avg_games_per_match);
        for (line_ab, line_ba) in ab.rounds.iter().zip(ba.rounds.iter()) {
            assert_eq!(line_ab.round, line_ba.round);
            assert_eq!(line_ab.total, line_ba.total);
            assert_eq!(line_ab.wins.team1, line_ba.wins.team2);
        }
    }

    #[test]
    fn year_filter_limits_meetings() {
        let mut corpus = rivalry_corpus();
        corpus.push(meeting(
            &["Agustin Tapia"],
            &["Alejandro Galan"],
            &["6-0", "6-0"],
            "Qatar Major 2023",
            "01/02/2023",
            2023,
            None,
        ));
        let report = compute_h2h(
            &corpus,
            &names(&["Agustin Tapia"]),
            &names(&["Alejandro Galan"]),
            Some(2023),
        );
        assert_eq!(report.total_matches, 1);
        assert_eq!(report.team1_wins, 1);
    }

    #[test]
    fn doubles_queries_match_fuzzily() {
        let corpus = vec![meeting(
            &["A. Tapia", "A. Coello"],
            &["A. Galan", "F. Chingotto"],
            &["6-4", "6-3"],
            "Qatar Major",
            "01/02/2024",
            2024,
            None,
        )];
        let report = compute_h2h(
            &corpus,
            &names(&["Agustin Tapia", "Arturo Coello"]),
            &names(&["Alejandro Galan", "Federico Chingotto"]),
            None,
        );
        assert_eq!(report.total_matches, 1);
        assert_eq!(report.team1_wins, 1);
    }

    #[test]
    fn empty_query_yields_empty_report() {
        let report = compute_h2h(&rivalry_corpus(), &[], &names(&["Alejandro Galan"]), None);
        assert_eq!(report.total_matches, 0);
        assert!(report.matches.is_empty());
    }

    #[test]
    fn common_opponents_intersects_exact_rosters() {
        let tapia = &["A. Tapia", "A. Coello"];
        let galan = &["A. Galan", "F. Chingotto"];
        let shared = &["F. Stupaczuk", "M. Di Nenno"];
        let corpus = vec![
            meeting(tapia, shared, &["6-4", "6-3"], "Qatar Major", "01/02/2024", 2024, None),
            meeting(shared, tapia, &["6-2", "6-2"], "Madrid P1", "01/03/2024", 2024, None),
            meeting(galan, shared, &["4-6", "6-3", "6-4"], "Paris Major", "01/04/2024", 2024, None),
            // Only Tapia's side has faced this roster.
            meeting(tapia, &["J. Lebron", "P. Navarro"], &["6-1", "6-1"], "Rome P1", "01/05/2024", 2024, None),
        ];
        let stats = common_opponents(
            &corpus,
            &names(tapia),
            &names(galan),
        );
        assert_eq!(stats.len(), 1);
        let line = &stats[0];
        assert_eq!(line.opponent, names(shared));
        assert_eq!(line.meetings, 3);
        assert_eq!(line.team1, WinLoss { wins: 1, losses: 1 });
        assert_eq!(line.team2, WinLoss { wins: 1, losses: 0 });
    }

    #[test]
    fn common_opponents_key_is_order_independent() {
        let corpus = vec![
            meeting(
                &["A. Tapia"],
                &["F. Stupaczuk", "M. Di Nenno"],
                &["6-4", "6-3"],
                "Qatar Major",
                "01/02/2024",
                2024,
                None,
            ),
            meeting(
                &["A. Galan"],
                &["M. Di Nenno", "F. Stupaczuk"],
                &["6-4", "6-3"],
                "Paris Major",
                "01/03/2024",
                2024,
                None,
            ),
        ];
        let stats = common_opponents(&corpus, &names(&["A. Tapia"]), &names(&["A. Galan"]));
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].meetings, 2);
    }
}
