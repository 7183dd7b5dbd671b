/// Scoreboard widget markup to ordered row abstraction.
///
/// The widget renders one `<tr>` per display row: heading rows carry a
/// "heading" class on the row or its first cell, team rows carry
/// `class="player"` cells (one per player, flag `<img>` nested) plus
/// `class="set"` cells, and everything else (status banners mostly) is
/// plain text. No HTML crate; the markup is scanned directly because the
/// widget emits it unclosed and unquoted often enough that a strict
/// parser gives up.

/// One abstracted display row, the seam consumed by the row grouper.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WidgetRow {
    pub header: bool,
    pub text: String,
    pub players: Vec<String>,
    pub flags: Vec<String>,
    pub scores: Vec<String>,
}

impl WidgetRow {
    pub fn is_player_row(&self) -> bool {
        !self.players.is_empty()
    }
}

/// Every `<tr>` block of the widget markup, in document order.
pub fn extract_rows(html: &str) -> Vec<WidgetRow> {
    let mut rows = Vec::new();
    let mut pos = 0usize;
    while let Some((tr_start, tr_end)) = next_tag_block_ci(html, "<tr", "</tr>", pos) {
        let block = &html[tr_start..tr_end];
        pos = tr_end;
        rows.push(parse_row(block));
    }
    rows
}

fn parse_row(tr_block: &str) -> WidgetRow {
    let mut row = WidgetRow {
        header: class_contains(opener(tr_block), "head"),
        ..WidgetRow::default()
    };

    let mut texts: Vec<String> = Vec::new();
    let mut td_pos = 0usize;
    let mut first_cell = true;
    while let Some((td_start, td_end)) = next_tag_block_ci(tr_block, "<td", "</td>", td_pos) {
        let td_block = &tr_block[td_start..td_end];
        td_pos = td_end;
        let td_opener = opener(td_block);
        let text = clean_text(inner(td_block));

        if first_cell && class_contains(td_opener, "head") {
            row.header = true;
        }
        first_cell = false;

        if class_contains(td_opener, "player") {
            if let Some(src) = img_src(td_block) {
                row.flags.push(src);
            }
            if !text.is_empty() {
                row.players.push(text.clone());
            }
        } else if class_contains(td_opener, "set") {
            row.scores.push(text.clone());
        }
        if !text.is_empty() {
            texts.push(text);
        }
    }
    row.text = texts.join(" ");
    row
}

/// Find the span of `open…close` starting at or after `from`,
/// case-insensitively. Returns the block including both tags; an
/// unclosed block runs to the end of the document.
pub(crate) fn next_tag_block_ci(
    doc: &str,
    open: &str,
    close: &str,
    from: usize,
) -> Option<(usize, usize)> {
    let lower = doc.to_ascii_lowercase();
    let start = lower[from..].find(open)? + from;
    let end = match lower[start..].find(close) {
        Some(rel) => start + rel + close.len(),
        None => doc.len(),
    };
    Some((start, end))
}

/// The opening tag of a block, up to and including its `>`.
fn opener(block: &str) -> &str {
    match block.find('>') {
        Some(idx) => &block[..=idx],
        None => block,
    }
}

/// Block content after the opening tag, before the closing tag.
pub(crate) fn inner(block: &str) -> &str {
    let body = match block.find('>') {
        Some(idx) => &block[idx + 1..],
        None => return "",
    };
    match body.rfind("</") {
        Some(idx) => &body[..idx],
        None => body,
    }
}

/// Class attribute check tolerant of quote style and multi-class lists.
fn class_contains(tag_opener: &str, needle: &str) -> bool {
    let lower = tag_opener.to_ascii_lowercase();
    let Some(idx) = lower.find("class=") else {
        return false;
    };
    let value = &lower[idx + "class=".len()..];
    let value = match value.as_bytes().first() {
        Some(b'"') => value[1..].split('"').next().unwrap_or(""),
        Some(b'\'') => value[1..].split('\'').next().unwrap_or(""),
        _ => value.split(|c: char| c.is_ascii_whitespace() || c == '>').next().unwrap_or(""),
    };
    value.contains(needle)
}

/// First `<img src=…>` reference inside a block.
fn img_src(block: &str) -> Option<String> {
    let lower = block.to_ascii_lowercase();
    let img_at = lower.find("<img")?;
    let tag_end = lower[img_at..].find('>').map(|i| img_at + i).unwrap_or(block.len());
    let tag = &block[img_at..tag_end];
    let src_at = tag.to_ascii_lowercase().find("src=")?;
    let value = &tag[src_at + "src=".len()..];
    let src = match value.as_bytes().first() {
        Some(b'"') => value[1..].split('"').next().unwrap_or(""),
        Some(b'\'') => value[1..].split('\'').next().unwrap_or(""),
        _ => value.split(|c: char| c.is_ascii_whitespace()).next().unwrap_or(""),
    };
    if src.is_empty() {
        None
    } else {
        Some(src.to_string())
    }
}

/// Tags out, entities decoded, whitespace squashed.
pub(crate) fn clean_text(fragment: &str) -> String {
    let stripped = strip_tags(fragment);
    let decoded = decode_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_tags(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for c in fragment.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        if semi > 10 {
            // Not an entity, just a stray ampersand.
            out.push('&');
            rest = &rest[amp + 1..];
            continue;
        }
        let name = &tail[1..semi];
        match decode_entity(name) {
            Some(c) => out.push(c),
            None => out.push_str(&tail[..=semi]),
        }
        rest = &rest[amp + semi + 1..];
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        return u32::from_str_radix(num, 16).ok().and_then(char::from_u32);
    }
    if let Some(num) = name.strip_prefix('#') {
        return num.parse::<u32>().ok().and_then(char::from_u32);
    }
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '-',
        "mdash" => '-',
        "aacute" => 'á',
        "agrave" => 'à',
        "eacute" => 'é',
        "egrave" => 'è',
        "iacute" => 'í',
        "oacute" => 'ó',
        "uacute" => 'ú',
        "uuml" => 'ü',
        "ouml" => 'ö',
        "ntilde" => 'ñ',
        "ccedil" => 'ç',
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_row_detected_on_tr_or_first_td() {
        let rows = extract_rows(
            r#"<tr class="headRow"><td colspan="4">MEN - SEMI FINAL</td></tr>
               <tr><td class="heading">Grand Stand - Starting at 10:00 CET</td></tr>"#,
        );
        assert_eq!(rows.len(), 2);
        assert!(rows[0].header);
        assert_eq!(rows[0].text, "MEN - SEMI FINAL");
        assert!(rows[1].header);
    }

    #[test]
    fn player_row_collects_names_flags_and_sets() {
        let rows = extract_rows(
            r#"<tr>
                 <td class="player"><img src="/flags/ar.png"> A. Tapia</td>
                 <td class="player"><img src='/flags/es.png'> A. Coello (1)</td>
                 <td class="set">6</td><td class="set">7(7)</td>
               </tr>"#,
        );
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert!(!row.header);
        assert_eq!(row.players, vec!["A. Tapia", "A. Coello (1)"]);
        assert_eq!(row.flags, vec!["/flags/ar.png", "/flags/es.png"]);
        assert_eq!(row.scores, vec!["6", "7(7)"]);
    }

    #[test]
    fn entities_and_nested_tags_cleaned() {
        let rows = extract_rows(
            r#"<tr><td class="player"><b>A. Gal&aacute;n</b> &nbsp;</td><td class="set">6</td></tr>"#,
        );
        assert_eq!(rows[0].players, vec!["A. Galán"]);
    }

    #[test]
    fn status_row_is_plain_text() {
        let rows = extract_rows(r#"<tr><td class="status" colspan="4">LIVE - 2nd Set</td></tr>"#);
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].header);
        assert!(rows[0].players.is_empty());
        assert_eq!(rows[0].text, "LIVE - 2nd Set");
    }

    #[test]
    fn empty_set_cells_kept_in_order() {
        let rows = extract_rows(
            r#"<tr><td class="player">J. Lebron</td><td class="set"></td><td class="set"></td></tr>"#,
        );
        assert_eq!(rows[0].scores, vec!["", ""]);
    }

    #[test]
    fn unclosed_row_runs_to_end() {
        let rows = extract_rows(r#"<tr><td class="player">A. Tapia</td>"#);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].players, vec!["A. Tapia"]);
    }
}
