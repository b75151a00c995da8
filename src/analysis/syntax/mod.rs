//! Syntax error analyzers
//!
//! Four catalogs, tried in this order by the registry: indentation errors,
//! parser messages, `def` statements and generic statements. Whole-source
//! scanners come last.

pub mod def_statement;
pub mod indentation;
pub mod message;
pub mod scanner;
pub mod statement;

use super::registry::Registry;
use super::{AnalyzerResult, CauseEntry};
use crate::locale::Translator;
use crate::tr;

pub fn register(registry: &mut Registry) {
    indentation::register(registry);
    message::register(registry);
    def_statement::register(registry);
    statement::register(registry);
    scanner::register(registry);
}

pub(crate) fn cause(text: String) -> AnalyzerResult {
    Ok(Some(CauseEntry::new(text)))
}

pub(crate) fn cause_with_hint(text: String, hint: String) -> AnalyzerResult {
    Ok(Some(CauseEntry::with_hint(text, hint)))
}

pub(crate) fn more_errors(t: &Translator) -> String {
    format!(
        "\n{}",
        tr!(t, "However, making such a change would still not correct\nall the syntax errors in the code you wrote.\n")
    )
}

/// Source line `lineno` with a marker under column `col`, as appended to
/// bracket diagnostics.
pub(crate) fn marked_line(lines: &[String], lineno: usize, col: usize, marker: char) -> String {
    let line = lineno
        .checked_sub(1)
        .and_then(|i| lines.get(i))
        .map(String::as_str)
        .unwrap_or("\n");
    let mut text = format!("\n    {}: {}", lineno, line);
    if !text.ends_with('\n') {
        text.push('\n');
    }
    let shift = lineno.to_string().len() + col + 6;
    text.push_str(&" ".repeat(shift));
    text.push(marker);
    text.push('\n');
    text
}

/// Two markers: one under an opening bracket, one under the closing bracket
/// that fails to match it.
pub(crate) fn marked_pair(lines: &[String], open: (usize, usize), close: (usize, usize)) -> String {
    let (open_row, open_col) = open;
    let (close_row, close_col) = close;
    if open_row != close_row {
        let mut text = marked_line(lines, open_row, open_col, '^');
        text.push_str(marked_line(lines, close_row, close_col, '^').trim_start_matches('\n'));
        return text;
    }
    let mut text = marked_line(lines, open_row, open_col, '^');
    text.pop();
    text.push_str(&" ".repeat(close_col.saturating_sub(open_col + 1)));
    text.push_str("^\n");
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(source: &str) -> Vec<String> {
        source.split_inclusive('\n').map(str::to_string).collect()
    }

    #[test]
    fn test_marked_line() {
        let text = marked_line(&lines("a = [1, 2\n"), 1, 4, '^');
        assert_eq!(text, format!("\n    1: a = [1, 2\n{}^\n", " ".repeat(11)));
    }

    #[test]
    fn test_marked_pair_same_line() {
        let text = marked_pair(&lines("a = (1, 2]\n"), (1, 4), (1, 9));
        let marks = text.lines().last().unwrap();
        assert_eq!(marks.find('^'), Some(11));
        assert_eq!(marks.rfind('^'), Some(16));
    }

    #[test]
    fn test_marked_pair_two_lines() {
        let text = marked_pair(&lines("a = (1,\n 2]\n"), (1, 4), (2, 2));
        assert!(text.contains("    1: a = (1,\n"));
        assert!(text.contains("    2:  2]\n"));
    }
}
