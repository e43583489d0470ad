/// Decode CSV text into rows of raw string cells.
///
/// A character scanner, not a split-on-comma: a single `inQuotes` state
/// decides whether delimiters are structural. Inside quotes, commas and
/// newlines are copied literally and a doubled quote decodes to one
/// literal quote. `\r` outside quotes is dropped, so CRLF input parses
/// the same as LF. The final cell and row are flushed even when the input
/// has no trailing newline.
pub fn decode_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    // Escaped quote
                    cell.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                cell.push(ch);
            }
            continue;
        }

        match ch {
            '"' => in_quotes = true,
            ',' => {
                row.push(std::mem::take(&mut cell));
            }
            '\n' => {
                row.push(std::mem::take(&mut cell));
                rows.push(std::mem::take(&mut row));
            }
            '\r' => {}
            _ => cell.push(ch),
        }
    }

    row.push(cell);
    rows.push(row);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_decode_simple_rows() {
        let rows = decode_csv("a,b,c\n1,2,3\n");
        assert_eq!(rows[0], row(&["a", "b", "c"]));
        assert_eq!(rows[1], row(&["1", "2", "3"]));
    }

    #[test]
    fn test_decode_no_trailing_newline() {
        let rows = decode_csv("a,b\n1,2");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], row(&["1", "2"]));
    }

    #[test]
    fn test_decode_quoted_comma() {
        let rows = decode_csv("title,notes\n\"Mario Bros., The\",fine\n");
        assert_eq!(rows[1][0], "Mario Bros., The");
        assert_eq!(rows[1][1], "fine");
    }

    #[test]
    fn test_decode_quoted_newline() {
        let rows = decode_csv("notes\n\"line one\nline two\"\n");
        assert_eq!(rows[1][0], "line one\nline two");
    }

    #[test]
    fn test_decode_doubled_quote() {
        let rows = decode_csv("notes\n\"He said \"\"hi\"\"\"\n");
        assert_eq!(rows[1][0], "He said \"hi\"");
    }

    #[test]
    fn test_decode_crlf_dropped() {
        let rows = decode_csv("a,b\r\n1,2\r\n");
        assert_eq!(rows[0], row(&["a", "b"]));
        assert_eq!(rows[1], row(&["1", "2"]));
    }

    #[test]
    fn test_decode_cr_inside_quotes_preserved() {
        // Only a bare CR outside quotes is dropped
        let rows = decode_csv("\"a\rb\"\n");
        assert_eq!(rows[0][0], "a\rb");
    }

    #[test]
    fn test_decode_empty_cells() {
        let rows = decode_csv("a,,c\n,,\n");
        assert_eq!(rows[0], row(&["a", "", "c"]));
        assert_eq!(rows[1], row(&["", "", ""]));
    }

    #[test]
    fn test_decode_empty_input_is_one_empty_row() {
        // Matches the flush-at-end rule: one row with one empty cell
        let rows = decode_csv("");
        assert_eq!(rows, vec![row(&[""])]);
    }

    #[test]
    fn test_decode_quote_mid_cell() {
        // A quote after unquoted content enters quoted mode mid-cell
        let rows = decode_csv("ab\"c,d\"e\n");
        assert_eq!(rows[0], row(&["abc,de"]));
    }
}
