#![forbid(unsafe_code)]

//! Delimited-table parser for translation data files.
//!
//! The wire format is cell-oriented, not line-oriented: the input is split
//! into cells at every delimiter (skipping delimiters inside a double-quoted
//! pair), and a cell that *starts* with a newline sequence opens a new row.
//! This only works when every row ends with a trailing delimiter before its
//! line break, which is exactly how the data files are authored:
//!
//! ```text
//! "flag","value",
//! "$HELLO","Hello",
//! ```
//!
//! # Invariants
//!
//! 1. A delimiter inside one double-quote pair never splits a cell.
//! 2. Cells shorter than 2 characters (before and after newline stripping)
//!    are dropped. This is what discards the empty cell a trailing
//!    delimiter produces before each line break, and it is load-bearing:
//!    changing it changes which rows exist.
//! 3. The first assembled row is the header; everything after is data.
//!
//! Known edge case, kept for format compatibility: in unquoted (TSV) mode a
//! legitimate single-character cell is indistinguishable from the trailing
//! junk above and is dropped with it. Quoted cells are immune (`"A"` is
//! three characters on the wire).

use crate::error::{GlossaError, Result};

/// A parsed table: one header row of field names plus the data grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub fields: Vec<String>,
    pub grid: Vec<Vec<String>>,
}

impl Table {
    /// Parse comma-style delimited text with double-quoted cells.
    ///
    /// Fails only when a quoted cell is never closed; empty input yields an
    /// empty table.
    pub fn parse_csv(raw: &str, delimiter: char) -> Result<Self> {
        if raw.is_empty() {
            return Ok(Self::default());
        }
        let cells = split_outside_quotes(raw, delimiter)?;
        Ok(assemble(cells.into_iter(), true))
    }

    /// Parse tab-delimited text. No quoting, so this cannot fail.
    #[must_use]
    pub fn parse_tsv(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::default();
        }
        assemble(raw.split('\t'), false)
    }

    /// Serialize back to the wire format: every row (header included) is
    /// emitted with a trailing delimiter and `\n`, and each cell is wrapped
    /// in double quotes when `quoted`.
    #[must_use]
    pub fn to_delimited(&self, delimiter: char, quoted: bool) -> String {
        let mut out = String::new();
        for row in std::iter::once(&self.fields).chain(self.grid.iter()) {
            for cell in row {
                if quoted {
                    out.push('"');
                    out.push_str(cell);
                    out.push('"');
                } else {
                    out.push_str(cell);
                }
                out.push(delimiter);
            }
            out.push('\n');
        }
        out
    }
}

/// Split on `delimiter`, treating a delimiter between one opening and one
/// closing double quote as cell content.
fn split_outside_quotes(input: &str, delimiter: char) -> Result<Vec<&str>> {
    let mut cells = Vec::new();
    let mut start = 0usize;
    let mut in_quotes = false;
    for (i, ch) in input.char_indices() {
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch == delimiter && !in_quotes {
            cells.push(&input[start..i]);
            start = i + ch.len_utf8();
        }
    }
    if in_quotes {
        return Err(GlossaError::UnterminatedQuote);
    }
    cells.push(&input[start..]);
    Ok(cells)
}

/// Row-assembly pass shared by both formats.
fn assemble<'a>(cells: impl Iterator<Item = &'a str>, quoted: bool) -> Table {
    let mut fields: Vec<String> = Vec::new();
    let mut grid: Vec<Vec<String>> = Vec::new();
    let mut row_cells: Option<Vec<String>> = None;
    let mut row = 0usize;

    for cell in cells {
        if char_count(cell) < 2 {
            continue;
        }

        let mut newline = false;
        let rest = if let Some(stripped) =
            cell.strip_prefix("\n\r").or_else(|| cell.strip_prefix("\r\n"))
        {
            newline = true;
            stripped
        } else if let Some(stripped) =
            cell.strip_prefix('\n').or_else(|| cell.strip_prefix('\r'))
        {
            newline = true;
            stripped
        } else {
            cell
        };

        // Second length check: a row boundary whose cell shrank below two
        // characters is dropped along with the boundary itself.
        if char_count(rest) < 2 {
            continue;
        }

        if newline {
            if let Some(done) = row_cells.take() {
                grid.push(done);
            }
            row_cells = Some(Vec::new());
            row += 1;
        }

        let value = if quoted {
            strip_outer_pair(rest)
        } else {
            rest.to_string()
        };

        if row == 0 {
            fields.push(value);
        } else if let Some(current) = row_cells.as_mut() {
            current.push(value);
        }
    }

    if let Some(done) = row_cells.take() {
        grid.push(done);
    }

    Table { fields, grid }
}

fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Remove the first and last character. The wire format guarantees these
/// are the wrapping quotes for any retained quoted cell.
fn strip_outer_pair(s: &str) -> String {
    let mut chars = s.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

#[cfg(test)]
mod tests {
    use super::Table;
    use crate::error::GlossaError;

    #[test]
    fn parses_header_and_rows() {
        let raw = "\"flag\",\"value\",\n\"$HELLO\",\"Hello\",\n\"$BYE\",\"Goodbye\",\n";
        let table = Table::parse_csv(raw, ',').unwrap();
        assert_eq!(table.fields, vec!["flag", "value"]);
        assert_eq!(
            table.grid,
            vec![vec!["$HELLO", "Hello"], vec!["$BYE", "Goodbye"]]
        );
    }

    #[test]
    fn delimiter_inside_quotes_is_content() {
        let raw = "\"flag\",\"value\",\n\"$LIST\",\"one, two, three\",\n";
        let table = Table::parse_csv(raw, ',').unwrap();
        assert_eq!(table.grid[0][1], "one, two, three");
    }

    #[test]
    fn line_break_inside_quotes_is_content() {
        let raw = "\"flag\",\"value\",\n\"$POEM\",\"roses\nviolets\",\n";
        let table = Table::parse_csv(raw, ',').unwrap();
        assert_eq!(table.grid.len(), 1);
        assert_eq!(table.grid[0][1], "roses\nviolets");
    }

    #[test]
    fn custom_delimiter() {
        let raw = "\"flag\";\"value\";\n\"$A\";\"alpha\";\n";
        let table = Table::parse_csv(raw, ';').unwrap();
        assert_eq!(table.grid, vec![vec!["$A", "alpha"]]);
    }

    #[test]
    fn tsv_variant_has_no_quote_stripping() {
        let raw = "flag\tvalue\t\n$HELLO\tHello\t\n$BYE\tGoodbye\t\n";
        let table = Table::parse_tsv(raw);
        assert_eq!(table.fields, vec!["flag", "value"]);
        assert_eq!(
            table.grid,
            vec![vec!["$HELLO", "Hello"], vec!["$BYE", "Goodbye"]]
        );
    }

    #[test]
    fn crlf_row_breaks() {
        let raw = "flag\tvalue\t\r\n$HI\tHi\t\r\n";
        let table = Table::parse_tsv(raw);
        assert_eq!(table.grid, vec![vec!["$HI", "Hi"]]);
    }

    #[test]
    fn short_unquoted_cells_are_dropped() {
        // "X" is below the retention threshold, and its cell carried the row
        // break: the boundary vanishes with it and "kept" lands on the
        // previous row.
        let raw = "flag\tvalue\t\n$REAL\tfirst\t\nX\tkept\t\n";
        let table = Table::parse_tsv(raw);
        assert_eq!(table.grid, vec![vec!["$REAL", "first", "kept"]]);
    }

    #[test]
    fn short_quoted_cells_survive() {
        let raw = "\"flag\",\"value\",\n\"A\",\"Hello\",\n";
        let table = Table::parse_csv(raw, ',').unwrap();
        assert_eq!(table.grid, vec![vec!["A", "Hello"]]);
    }

    #[test]
    fn empty_input_is_an_empty_table() {
        let table = Table::parse_csv("", ',').unwrap();
        assert!(table.fields.is_empty());
        assert!(table.grid.is_empty());
        let table = Table::parse_tsv("");
        assert!(table.fields.is_empty());
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let raw = "\"flag\",\"value\",\n\"$A\",\"broken,\n";
        assert!(matches!(
            Table::parse_csv(raw, ','),
            Err(GlossaError::UnterminatedQuote)
        ));
    }

    #[test]
    fn quoted_round_trip() {
        let table = Table {
            fields: vec!["flag".into(), "value".into(), "comment".into()],
            grid: vec![
                vec!["$A".into(), "with, comma".into(), "note".into()],
                vec!["$B".into(), "plain".into(), String::new()],
            ],
        };
        let wire = table.to_delimited(',', true);
        assert_eq!(Table::parse_csv(&wire, ',').unwrap(), table);
    }

    #[test]
    fn tsv_round_trip() {
        let table = Table {
            fields: vec!["flag".into(), "value".into()],
            grid: vec![vec!["$GREET".into(), "Hello there".into()]],
        };
        let wire = table.to_delimited('\t', false);
        assert_eq!(Table::parse_tsv(&wire), table);
    }
}
