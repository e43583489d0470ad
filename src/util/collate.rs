use std::cmp::Ordering;

/// Fold common foreign letters into the nearest Norwegian slot, so they
/// collate and bucket with it rather than forming their own group.
fn fold(c: char) -> char {
    match c {
        'ä' => 'æ',
        'ö' => 'ø',
        'à' | 'á' | 'â' => 'a',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ü' | 'ù' | 'ú' => 'u',
        other => other,
    }
}

/// Rank of a single character for collation. Letters sort after everything
/// else so that digit-prefixed titles ("1942") lead the list, and the
/// Norwegian letters take their dictionary positions after z.
fn char_rank(c: char) -> (u8, u32) {
    match fold(c) {
        l @ 'a'..='z' => (1, l as u32 - 'a' as u32),
        'æ' => (1, 26),
        'ø' => (1, 27),
        'å' => (1, 28),
        other => (0, other as u32),
    }
}

/// Compare two strings with Norwegian dictionary order: case-insensitive,
/// æ ø å after z, non-letters before letters. Ties fall back to a plain
/// byte comparison so the order is total.
pub fn compare(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().flat_map(char::to_lowercase);
    let mut bi = b.chars().flat_map(char::to_lowercase);
    loop {
        match (ai.next(), bi.next()) {
            (Some(ca), Some(cb)) => {
                let ord = char_rank(ca).cmp(&char_rank(cb));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
        }
    }
}

/// The alphabetic bucket for a title: its first non-blank character,
/// folded and uppercased if it is a collation letter, otherwise "#". The
/// fold keeps a title that collates into a Norwegian letter's slot in
/// that letter's bucket instead of a one-off group of its own. Used by
/// the grouping projector.
pub fn alpha_bucket(title: &str) -> String {
    let first = title.trim().chars().next();
    match first.map(|c| fold(c.to_lowercase().next().unwrap_or(c))) {
        Some(c) if char_rank(c).0 == 1 => c.to_uppercase().collect(),
        _ => "#".to_string(),
    }
}
