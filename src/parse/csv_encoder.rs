/// Encode a header and rows as CSV text, lines joined by `\n` with no
/// trailing newline.
pub fn encode_csv(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    out.push_str(
        &header
            .iter()
            .map(|h| encode_cell(h))
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in rows {
        out.push('\n');
        out.push_str(
            &row.iter()
                .map(|c| encode_cell(c))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    out
}

/// Quote a cell iff it contains a comma, double-quote, or newline,
/// doubling any inner quotes. Everything else is written raw.
pub fn encode_cell(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
