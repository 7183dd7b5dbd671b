/// Player-name comparison tolerant of scoreboard abbreviations.
///
/// Feed rows abbreviate first names ("A. Tapia"), archives carry full names
/// ("Agustin Tapia"), and either side may carry Latin accents. Comparison
/// folds accents, lowercases, then accepts substring containment or an
/// initial-style token walk in either direction.

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' | 'ø' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ý' | 'ÿ' => 'y',
        'ñ' => 'n',
        'ç' => 'c',
        'š' => 's',
        'ž' => 'z',
        _ => c,
    }
}

/// Lowercased, accent-folded copy of `name` with periods opened into
/// spaces so "A.Tapia" and "A. Tapia" tokenize identically.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .flat_map(|c| c.to_lowercase())
        .map(fold_char)
        .map(|c| if c == '.' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Initial-style walk: every token of `short` must consume a token of
/// `full`, in order. Single-letter tokens match by prefix, longer tokens
/// must match exactly.
fn tokens_subsume(short: &str, full: &str) -> bool {
    let short_tokens: Vec<&str> = short.split(' ').filter(|t| !t.is_empty()).collect();
    let full_tokens: Vec<&str> = full.split(' ').filter(|t| !t.is_empty()).collect();
    if short_tokens.is_empty() || full_tokens.is_empty() {
        return false;
    }
    let mut cursor = 0usize;
    for token in &short_tokens {
        let mut consumed = false;
        while cursor < full_tokens.len() {
            let candidate = full_tokens[cursor];
            cursor += 1;
            let hit = if token.chars().count() == 1 {
                candidate.starts_with(*token)
            } else {
                candidate == *token
            };
            if hit {
                consumed = true;
                break;
            }
        }
        if !consumed {
            return false;
        }
    }
    true
}

/// True when the two names plausibly refer to the same player.
pub fn names_match(a: &str, b: &str) -> bool {
    let na = normalize_name(a);
    let nb = normalize_name(b);
    if na.is_empty() || nb.is_empty() {
        return false;
    }
    if na == nb || na.contains(&nb) || nb.contains(&na) {
        return true;
    }
    tokens_subsume(&na, &nb) || tokens_subsume(&nb, &na)
}

/// True when any name on `roster` matches `player`.
pub fn roster_contains(roster: &[String], player: &str) -> bool {
    roster.iter().any(|name| names_match(name, player))
}

/// True when every queried player matches a distinct member of `roster`.
/// An empty query never qualifies, so blanket filters cannot match
/// every team on the board.
pub fn roster_matches(query: &[String], roster: &[String]) -> bool {
    if query.is_empty() {
        return false;
    }
    let mut taken = vec![false; roster.len()];
    for wanted in query {
        let mut found = false;
        for (idx, name) in roster.iter().enumerate() {
            if !taken[idx] && names_match(wanted, name) {
                taken[idx] = true;
                found = true;
                break;
            }
        }
        if !found {
            return false;
        }
    }
    true
}
