//! Permissive CSV parsing for spreadsheet export feeds
//!
//! Spreadsheet CSV exports are messy: stray blank lines, unquoted cells with
//! surrounding whitespace, quoted cells containing commas. This parser scans
//! each line with a single quoted/unquoted mode toggle and always returns
//! best-effort rows.
//!
//! Known limitation: a `"` character only toggles quote mode. A doubled
//! quote (`""`) intended as one literal quote is not treated as an escape
//! pair; both characters toggle the mode and neither is emitted.

/// Parse raw CSV text into trimmed string cells.
///
/// Rows whose every cell is empty after trimming are dropped. Malformed
/// quoting never produces an error; an unterminated quote simply runs to the
/// end of the line.
pub fn parse_csv(raw: &str) -> Vec<Vec<String>> {
    raw.lines()
        .map(parse_line)
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect()
}

fn parse_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                cells.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_field_keeps_comma() {
        let rows = parse_csv("\"Smith, John\",555");
        assert_eq!(rows, vec![vec!["Smith, John".to_string(), "555".to_string()]]);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let rows = parse_csv("  a , b ,c  ");
        assert_eq!(rows, vec![vec!["a".to_string(), "b".to_string(), "c".to_string()]]);
    }

    #[test]
    fn test_blank_lines_are_dropped() {
        let rows = parse_csv("a,b\n\n   \n, ,\nc,d");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["a", "b"]);
        assert_eq!(rows[1], vec!["c", "d"]);
    }

    #[test]
    fn test_unterminated_quote_runs_to_line_end() {
        let rows = parse_csv("\"open,still open");
        assert_eq!(rows, vec![vec!["open,still open".to_string()]]);
    }

    #[test]
    fn test_doubled_quote_is_not_an_escape_pair() {
        // Both quotes toggle the mode; neither survives into the cell.
        // RFC 4180 would yield `a"b` here.
        let rows = parse_csv("\"a\"\"b\",x");
        assert_eq!(rows, vec![vec!["ab".to_string(), "x".to_string()]]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let rows = parse_csv("a,b\r\nc,d\r\n");
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_empty_input_yields_no_rows() {
        assert!(parse_csv("").is_empty());
    }
}
