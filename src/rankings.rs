use crate::widget::{clean_text, inner, next_tag_block_ci};

/// One row of the tour ranking table. Plain presentation data; nothing
/// analytical hangs off it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingEntry {
    pub position: u32,
    pub player: String,
    pub country: Option<String>,
    pub points: Option<u32>,
}

/// Scan the ranking-page table. Rows that do not open with a numeric
/// position (headers, ads, broken markup) are skipped.
pub fn parse_ranking_html(html: &str) -> Vec<RankingEntry> {
    let mut entries = Vec::new();
    let mut pos = 0usize;
    while let Some((tr_start, tr_end)) = next_tag_block_ci(html, "<tr", "</tr>", pos) {
        let block = &html[tr_start..tr_end];
        pos = tr_end;

        let mut cells = Vec::new();
        let mut td_pos = 0usize;
        while let Some((td_start, td_end)) = next_tag_block_ci(block, "<td", "</td>", td_pos) {
            cells.push(clean_text(inner(&block[td_start..td_end])));
            td_pos = td_end;
        }
        if cells.len() < 2 {
            continue;
        }
        let Some(position) = parse_position(&cells[0]) else {
            continue;
        };
        let player = cells[1].clone();
        if player.is_empty() {
            continue;
        }

        let mut country = None;
        let mut points = None;
        for cell in &cells[2..] {
            if points.is_none()
                && let Some(parsed) = parse_points(cell)
            {
                points = Some(parsed);
                continue;
            }
            if country.is_none() && !cell.is_empty() && cell.chars().any(|c| c.is_alphabetic()) {
                country = Some(cell.clone());
            }
        }

        entries.push(RankingEntry {
            position,
            player,
            country,
            points,
        });
    }
    entries
}

fn parse_position(cell: &str) -> Option<u32> {
    let digits: String = cell.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() || cell.chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    digits.parse().ok()
}

/// Points columns carry thousand separators ("12,345").
fn parse_points(cell: &str) -> Option<u32> {
    let cleaned: String = cell.chars().filter(|c| !matches!(c, ',' | '.')).collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}
