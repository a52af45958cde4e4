//! Output formatting utilities for CLI commands
//!
//! Tables go to stdout through comfy-table; `--json` output is pretty-printed
//! serde_json.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use serde::Serialize;

/// Print a table with headers and rows
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    println!("{}", build_table(headers, rows));
}

fn build_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);

    for row in rows {
        table.add_row(row);
    }
    table
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Two-column key/value listing, e.g. for `whoami` and `config`.
pub fn print_fields(fields: &[(&str, String)]) {
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in fields {
        println!("{:width$}  {}", format!("{}:", key), value, width = width + 1);
    }
}

/// Shorten multi-line text for a table cell.
pub fn first_line(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > max {
        let cut: String = line.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_contains_cells() {
        let rendered = build_table(
            &["ID", "NAME"],
            vec![vec!["cs-1".to_string(), "Add schema".to_string()]],
        )
        .to_string();
        assert!(rendered.contains("cs-1"));
        assert!(rendered.contains("Add schema"));
        assert!(rendered.contains("NAME"));
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("abc\ndef", 10), "abc");
        assert_eq!(first_line("abcdefghijkl", 5), "abcd…");
        assert_eq!(first_line("", 5), "");
    }
}
