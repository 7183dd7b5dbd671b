use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::h2h::{CommonOpponentStats, H2hReport};
use crate::player_stats::{MatchOutcome, PlayerStats};
use crate::score::Side;

pub struct ExportSummary {
    pub sheets: usize,
    pub rows: usize,
}

pub fn export_player_stats(path: &Path, stats: &PlayerStats) -> Result<ExportSummary> {
    let overview_rows = vec![
        vec!["Field".to_string(), "Value".to_string()],
        kv("Player", &stats.player),
        kv("Matches", &stats.total_matches.to_string()),
        kv("Wins", &stats.wins.to_string()),
        kv("Losses", &stats.losses.to_string()),
        kv("Win Rate", &format!("{:.1}%", stats.win_rate)),
        kv("Titles", &stats.titles.to_string()),
        kv("Finals Reached", &stats.finals_reached.to_string()),
        kv("Longest Win Streak", &stats.longest_streak.to_string()),
        kv("Current Win Streak", &stats.current_streak.to_string()),
    ];

    let mut partner_rows = vec![vec!["Partner".to_string(), "Matches Together".to_string()]];
    for partner in &stats.partners {
        partner_rows.push(vec![partner.partner.clone(), partner.matches.to_string()]);
    }

    let mut round_rows = vec![vec![
        "Round".to_string(),
        "Played".to_string(),
        "Won".to_string(),
    ]];
    for tally in &stats.rounds {
        round_rows.push(vec![
            tally.round.clone(),
            tally.played.to_string(),
            tally.won.to_string(),
        ]);
    }

    let mut recent_rows = vec![vec![
        "Tournament".to_string(),
        "Year".to_string(),
        "Round".to_string(),
        "Opponents".to_string(),
        "Score".to_string(),
        "Result".to_string(),
    ]];
    for entry in &stats.recent {
        recent_rows.push(vec![
            entry.tournament.clone().unwrap_or_default(),
            opt_to_string(entry.year),
            entry.round.clone().unwrap_or_default(),
            entry.opponents.join(" / "),
            entry.score.join(" "),
            outcome_label(entry.outcome).to_string(),
        ]);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Overview")?;
        write_rows(sheet, &overview_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Partners")?;
        write_rows(sheet, &partner_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Rounds")?;
        write_rows(sheet, &round_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("RecentMatches")?;
        write_rows(sheet, &recent_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportSummary {
        sheets: 4,
        rows: overview_rows.len() + partner_rows.len() + round_rows.len() + recent_rows.len() - 4,
    })
}

pub fn export_h2h(
    path: &Path,
    report: &H2hReport,
    common: &[CommonOpponentStats],
) -> Result<ExportSummary> {
    let team1_label = report.team1.join(" / ");
    let team2_label = report.team2.join(" / ");

    let overview_rows = vec![
        vec!["Field".to_string(), "Value".to_string()],
        kv("Team 1", &team1_label),
        kv("Team 2", &team2_label),
        kv("Matches", &report.total_matches.to_string()),
        kv("Team 1 Wins", &report.team1_wins.to_string()),
        kv("Team 2 Wins", &report.team2_wins.to_string()),
        kv(
            "First Sets Won",
            &split(report.first_set.won_first.team1, report.first_set.won_first.team2),
        ),
        kv(
            "First Set Conversions",
            &split(report.first_set.converted.team1, report.first_set.converted.team2),
        ),
        kv("Three-Set Matches", &report.three_set.total.to_string()),
        kv(
            "Three-Set Wins",
            &split(report.three_set.wins.team1, report.three_set.wins.team2),
        ),
        kv("Tiebreak Sets", &report.tiebreaks.total.to_string()),
        kv(
            "Tiebreak Sets Won",
            &split(report.tiebreaks.wins.team1, report.tiebreaks.wins.team2),
        ),
        kv("Big Matches", &report.big_matches.total.to_string()),
        kv(
            "Big Match Wins",
            &split(report.big_matches.wins.team1, report.big_matches.wins.team2),
        ),
        kv("Games Won", &split(report.games.team1, report.games.team2)),
        kv("Avg Sets / Match", &format!("{:.2}", report.avg_sets_per_match)),
        kv("Avg Games / Match", &format!("{:.2}", report.avg_games_per_match)),
    ];

    let mut round_rows = vec![vec![
        "Round".to_string(),
        "Matches".to_string(),
        "Team 1 Wins".to_string(),
        "Team 2 Wins".to_string(),
    ]];
    for line in &report.rounds {
        round_rows.push(vec![
            line.round.clone(),
            line.total.to_string(),
            line.wins.team1.to_string(),
            line.wins.team2.to_string(),
        ]);
    }

    let mut meeting_rows = vec![vec![
        "Tournament".to_string(),
        "Year".to_string(),
        "Round".to_string(),
        "Score".to_string(),
        "Winner".to_string(),
    ]];
    for meeting in &report.matches {
        let winner = match meeting.winner {
            Some(Side::Team1) => team1_label.clone(),
            Some(Side::Team2) => team2_label.clone(),
            None => String::new(),
        };
        meeting_rows.push(vec![
            meeting.tournament.clone().unwrap_or_default(),
            opt_to_string(meeting.year),
            meeting.round.clone().unwrap_or_default(),
            meeting.score.join(" "),
            winner,
        ]);
    }

    let mut common_rows = vec![vec![
        "Opponent".to_string(),
        "Meetings".to_string(),
        "Team 1 W-L".to_string(),
        "Team 2 W-L".to_string(),
    ]];
    for line in common {
        common_rows.push(vec![
            line.opponent.join(" / "),
            line.meetings.to_string(),
            split(line.team1.wins, line.team1.losses),
            split(line.team2.wins, line.team2.losses),
        ]);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Overview")?;
        write_rows(sheet, &overview_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Rounds")?;
        write_rows(sheet, &round_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Meetings")?;
        write_rows(sheet, &meeting_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("CommonOpponents")?;
        write_rows(sheet, &common_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportSummary {
        sheets: 4,
        rows: overview_rows.len() + round_rows.len() + meeting_rows.len() + common_rows.len() - 4,
    })
}

fn kv(field: &str, value: &str) -> Vec<String> {
    vec![field.to_string(), value.to_string()]
}

fn split(left: u32, right: u32) -> String {
    format!("{left}-{right}")
}

fn outcome_label(outcome: MatchOutcome) -> &'static str {
    match outcome {
        MatchOutcome::Win => "W",
        MatchOutcome::Loss => "L",
        MatchOutcome::Unknown => "?",
    }
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player_stats::compute_stats;

    #[test]
    fn player_stats_workbook_written() {
        let dir = std::env::temp_dir().join(format!("padel_export_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("stats.xlsx");

        let stats = compute_stats(&[], "Nobody", None);
        let summary = export_player_stats(&path, &stats).unwrap();
        assert_eq!(summary.sheets, 4);
        assert!(path.exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn h2h_workbook_written() {
        let dir = std::env::temp_dir().join(format!("padel_export_h2h_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("h2h.xlsx");

        let report = H2hReport {
            team1: vec!["A. Tapia".to_string()],
            team2: vec!["A. Galan".to_string()],
            ..H2hReport::default()
        };
        let summary = export_h2h(&path, &report, &[]).unwrap();
        assert_eq!(summary.sheets, 4);
        assert!(path.exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
