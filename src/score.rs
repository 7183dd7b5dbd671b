/// Set-score tokens as scraped: "6-4", "7-6(5)", or glued forms like
/// "76-64" where the widget ran the tiebreak points into the game count.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Team1,
    Team2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetScore {
    pub team1: u32,
    pub team2: u32,
    /// Explicit "(n)" tiebreak marker was present on the token.
    pub marked_tiebreak: bool,
}

impl SetScore {
    pub fn winner(&self) -> Option<Side> {
        if self.team1 > self.team2 {
            Some(Side::Team1)
        } else if self.team2 > self.team1 {
            Some(Side::Team2)
        } else {
            None
        }
    }

    /// A tiebreak is a set that resolved to 7-6 games, regardless of
    /// whether the token carried a textual marker.
    pub fn is_tiebreak(&self) -> bool {
        (self.team1 == 7 && self.team2 == 6) || (self.team1 == 6 && self.team2 == 7)
    }
}

/// Padel games per set never exceed 7. A larger field means the widget
/// glued tiebreak points onto the game count, so only the leading digit
/// is the game figure: "76" is a 7 with 6 tiebreak points.
fn unglue_games(raw: &str) -> Option<u32> {
    let digits = raw.trim();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: u32 = digits.parse().ok()?;
    if value > 7 {
        digits[..1].parse().ok()
    } else {
        Some(value)
    }
}

/// Parse one set token. Parenthesized segments ("(tb)" markers or raw
/// tiebreak points, on either field) are stripped without inspecting their
/// content. Malformed tokens yield None and are skipped by callers rather
/// than poisoning the whole match.
pub fn normalize_set(token: &str) -> Option<SetScore> {
    let mut body = String::with_capacity(token.len());
    let mut depth = 0usize;
    let mut marked_tiebreak = false;
    for c in token.chars() {
        match c {
            '(' => {
                depth += 1;
                marked_tiebreak = true;
            }
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => body.push(c),
            _ => {}
        }
    }
    let (left, right) = body.trim().split_once('-')?;
    let team1 = unglue_games(left)?;
    let team2 = unglue_games(right)?;
    Some(SetScore {
        team1,
        team2,
        marked_tiebreak,
    })
}

/// Canonical textual form for archived score lists.
pub fn canonical_token(set: &SetScore) -> String {
    if set.marked_tiebreak {
        format!("{}-{}(tb)", set.team1, set.team2)
    } else {
        format!("{}-{}", set.team1, set.team2)
    }
}

/// Every parseable set in scrape order.
pub fn parsed_sets(tokens: &[String]) -> Vec<SetScore> {
    tokens.iter().filter_map(|t| normalize_set(t)).collect()
}

/// Sets won per side across all parseable tokens.
pub fn set_wins(tokens: &[String]) -> (u32, u32) {
    let mut team1 = 0u32;
    let mut team2 = 0u32;
    for set in parsed_sets(tokens) {
        match set.winner() {
            Some(Side::Team1) => team1 += 1,
            Some(Side::Team2) => team2 += 1,
            None => {}
        }
    }
    (team1, team2)
}

/// Side with strictly more sets won, None when level or nothing parsed.
pub fn match_winner(tokens: &[String]) -> Option<Side> {
    let (team1, team2) = set_wins(tokens);
    if team1 > team2 {
        Some(Side::Team1)
    } else if team2 > team1 {
        Some(Side::Team2)
    } else {
        None
    }
}
