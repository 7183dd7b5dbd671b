use chrono::Utc;
use rand::Rng;

use crate::model::{ArchivedTournament, MatchRecord};
use crate::store;

const SAMPLE_YEAR: i32 = 2024;

const MENS_POOL: &[(&str, &str)] = &[
    ("A. Tapia", "A. Coello"),
    ("A. Galan", "F. Chingotto"),
    ("J. Lebron", "P. Navarro"),
    ("F. Stupaczuk", "M. Di Nenno"),
    ("M. Yanguas", "J. Garrido"),
    ("F. Navarro", "J. Tello"),
    ("L. Capra", "T. Augsburger"),
    ("J. Ruiz", "E. Alonso"),
];

const WOMENS_POOL: &[(&str, &str)] = &[
    ("G. Triay", "C. Fernandez"),
    ("A. Sanchez", "P. Josemaria"),
    ("B. Gonzalez", "D. Brea"),
    ("M. Ortega", "B. Caldera"),
    ("T. Icardo", "C. Jensen"),
    ("L. Sainz", "P. Riera"),
    ("V. Iglesias", "J. Castello"),
    ("M. Las Heras", "A. Goenaga"),
];

const STOPS: &[(&str, &str)] = &[
    ("Riyadh P1", "20/02"),
    ("Qatar Major", "28/02"),
    ("Acapulco P1", "18/03"),
];

const COURTS: &[&str] = &["Center Court", "Court 1", "Court 2", "Court 3"];

/// Canned scoreboard markup for `--demo` runs and offline smoke tests.
/// Mirrors the live widget closely enough to exercise every row kind:
/// board and context headings, doubles rows with flags and seeds, marked
/// tiebreak cells, a live match, follow-on scheduling and entity noise.
pub fn sample_board_html() -> &'static str {
    r#"<table class="scoreboard">
<tr class="head"><td colspan="6">PREMIER PADEL - QATAR MAJOR</td></tr>
<tr class="head"><td colspan="6">Men - Semi Final - Center Court - 10:00 AST</td></tr>
<tr>
  <td class="player"><img src="/flags/ar.png"> A. Tapia</td>
  <td class="player"><img src="/flags/es.png"> A. Coello (1)</td>
  <td class="set">7(7)</td><td class="set">6</td>
</tr>
<tr>
  <td class="player"><img src="/flags/ar.png"> F. Stupaczuk</td>
  <td class="player"><img src="/flags/ar.png"> M. Di Nenno (3)</td>
  <td class="set">6(5)</td><td class="set">3</td>
</tr>
<tr><td class="status" colspan="6">Finished</td></tr>
<tr class="head"><td colspan="6">Followed by</td></tr>
<tr>
  <td class="player"><img src="/flags/es.png"> A. Gal&aacute;n</td>
  <td class="player"><img src="/flags/ar.png"> F. Chingotto (2)</td>
  <td class="set"></td><td class="set"></td>
</tr>
<tr>
  <td class="player"><img src="/flags/es.png"> J. Lebr&oacute;n</td>
  <td class="player"><img src="/flags/es.png"> P. Navarro</td>
  <td class="set"></td><td class="set"></td>
</tr>
<tr><td class="status" colspan="6">Not started</td></tr>
<tr class="head"><td colspan="6">Women - Semi Final - Starting at 12:30 AST</td></tr>
<tr>
  <td class="player"><img src="/flags/es.png"> G. Triay</td>
  <td class="player"><img src="/flags/es.png"> C. Fern&aacute;ndez</td>
  <td class="set">6</td><td class="set">5</td>
</tr>
<tr>
  <td class="player"><img src="/flags/es.png"> A. S&aacute;nchez</td>
  <td class="player"><img src="/flags/es.png"> P. Josemar&iacute;a</td>
  <td class="set">4</td><td class="set">5</td>
</tr>
<tr><td class="status" colspan="6">LIVE - 2nd Set</td></tr>
<tr class="head"><td colspan="6">Followed by</td></tr>
<tr>
  <td class="player"><img src="/flags/ar.png"> D. Brea</td>
  <td class="player"><img src="/flags/es.png"> B. Gonz&aacute;lez</td>
  <td class="set"></td><td class="set"></td>
</tr>
<tr>
  <td class="player"><img src="/flags/es.png"> M. Ortega</td>
  <td class="player"><img src="/flags/es.png"> V. Virseda</td>
  <td class="set"></td><td class="set"></td>
</tr>
<tr><td class="status" colspan="6">Not started</td></tr>
</table>"#
}

/// Synthesize a small archive: one knockout bracket per category for each
/// tour stop, with randomized but legal scorelines.
pub fn sample_corpus(rng: &mut impl Rng) -> Vec<ArchivedTournament> {
    STOPS
        .iter()
        .map(|(name, start)| {
            let mut matches = bracket(rng, MENS_POOL, "Men");
            matches.extend(bracket(rng, WOMENS_POOL, "Women"));
            ArchivedTournament {
                id: store::archive_id(name, SAMPLE_YEAR),
                name: (*name).to_string(),
                year: SAMPLE_YEAR,
                date_start: Some(format!("{start}/{SAMPLE_YEAR}")),
                date_end: None,
                matches,
                archived_at: Utc::now().to_rfc3339(),
            }
        })
        .collect()
}

fn bracket(rng: &mut impl Rng, pool: &[(&str, &str)], category: &str) -> Vec<MatchRecord> {
    let mut alive: Vec<usize> = (0..pool.len()).collect();
    let mut matches = Vec::new();
    for round in ["Quarter Final", "Semi Final", "Final"] {
        let mut winners = Vec::new();
        for (slot, pair) in alive.chunks(2).enumerate() {
            let &[a, b] = pair else {
                continue;
            };
            let first_wins = rng.gen_bool(0.5);
            matches.push(played_match(rng, pool, a, b, first_wins, round, category, slot));
            winners.push(if first_wins { a } else { b });
        }
        alive = winners;
    }
    matches
}

#[allow(clippy::too_many_arguments)]
fn played_match(
    rng: &mut impl Rng,
    pool: &[(&str, &str)],
    a: usize,
    b: usize,
    first_wins: bool,
    round: &str,
    category: &str,
    slot: usize,
) -> MatchRecord {
    let team1 = vec![pool[a].0.to_string(), pool[a].1.to_string()];
    let team2 = vec![pool[b].0.to_string(), pool[b].1.to_string()];
    MatchRecord {
        display: format!("{} vs {}", team1.join(" / "), team2.join(" / ")),
        time: Some(format!("{:02}:00", 10 + slot as u16)),
        category: Some(category.to_string()),
        round: Some(round.to_string()),
        court: Some(COURTS[slot % COURTS.len()].to_string()),
        team1,
        team2,
        score: random_score(rng, first_wins),
        status: Some("Finished".to_string()),
        ..MatchRecord::default()
    }
}

fn random_score(rng: &mut impl Rng, team1_wins: bool) -> Vec<String> {
    if rng.gen_bool(0.3) {
        vec![
            random_set(rng, team1_wins),
            random_set(rng, !team1_wins),
            random_set(rng, team1_wins),
        ]
    } else {
        vec![random_set(rng, team1_wins), random_set(rng, team1_wins)]
    }
}

fn random_set(rng: &mut impl Rng, team1_takes: bool) -> String {
    let (winner, loser, tiebreak) = if rng.gen_bool(0.2) {
        (7u32, 6u32, rng.gen_bool(0.7))
    } else if rng.gen_bool(0.15) {
        (7, 5, false)
    } else {
        (6, rng.gen_range(0..5), false)
    };
    let token = if team1_takes {
        format!("{winner}-{loser}")
    } else {
        format!("{loser}-{winner}")
    };
    if tiebreak {
        format!("{token}(tb)")
    } else {
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouper::{group_rows, GroupOptions};
    use crate::score::match_winner;
    use crate::widget::extract_rows;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn demo_board_groups_into_four_matches() {
        let rows = extract_rows(sample_board_html());
        let records = group_rows(&rows, &GroupOptions::default());
        assert_eq!(records.len(), 4);

        let first = &records[0];
        assert_eq!(first.category.as_deref(), Some("Men"));
        assert_eq!(first.round.as_deref(), Some("Semi Final"));
        assert_eq!(first.court.as_deref(), Some("Center Court"));
        assert_eq!(first.score, vec!["7-6(tb)", "6-3"]);
        assert!(first.is_finished());

        // Follow-on estimate chains off the 10:00 start.
        assert_eq!(records[1].time.as_deref(), Some("11:30"));
        assert!(records[1].time_estimated);

        let live = &records[2];
        assert!(live.is_live());
        assert_eq!(live.court.as_deref(), Some("Court 1"));
        let next = live.next_match.as_deref().unwrap();
        assert_eq!(next.court.as_deref(), Some("Court 1"));
    }

    #[test]
    fn corpus_brackets_are_complete_and_resolved() {
        let mut rng = StdRng::seed_from_u64(7);
        let corpus = sample_corpus(&mut rng);
        assert_eq!(corpus.len(), STOPS.len());
        for tournament in &corpus {
            assert_eq!(tournament.matches.len(), 14);
            let finals = tournament
                .matches
                .iter()
                .filter(|m| m.round.as_deref() == Some("Final"))
                .count();
            assert_eq!(finals, 2);
            for m in &tournament.matches {
                assert!(m.is_parsable());
                assert!(match_winner(&m.score).is_some());
            }
        }
    }
}
