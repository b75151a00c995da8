//! Source text access and excerpt formatting

pub mod cache;

pub use cache::{CacheEntry, CacheStats, SourceCache};

/// Numbers `lines` (the first one being `first_lineno`), marks `linenumber`
/// with an arrow and returns the excerpt with the marked line's text.
///
/// `offset` is a 1-based column shown with a caret under the marked line;
/// `text_range` is a 0-based `(begin, end)` column range underlined with
/// carets instead. Lines after the marked one stop at the first blank line.
pub fn highlight_source(
    linenumber: usize,
    first_lineno: usize,
    lines: &[String],
    offset: Option<usize>,
    text_range: Option<(usize, usize)>,
) -> (String, String) {
    let last_lineno = first_lineno + lines.len().saturating_sub(1);
    let nb_digits = last_lineno.max(linenumber).to_string().len();

    let offset_mark = offset.map(|offset| format!("{}^", " ".repeat(8 + nb_digits + offset)));
    let range_mark = text_range.map(|(begin, end)| {
        format!(
            "{}{}",
            " ".repeat(8 + nb_digits + begin + 1),
            "^".repeat(end.saturating_sub(begin))
        )
    });

    let mut new_lines = Vec::with_capacity(lines.len() + 1);
    let mut problem_line = String::new();
    let mut marked = false;
    for (i, line) in (first_lineno..).zip(lines) {
        if i == linenumber {
            problem_line = line.clone();
            new_lines.push(format!("    -->{:>width$}: {}", i, line.trim_end(), width = nb_digits));
            if let Some(mark) = offset_mark.as_ref().or(range_mark.as_ref()) {
                new_lines.push(mark.clone());
            }
            marked = true;
        } else {
            if marked && line.trim().is_empty() {
                break;
            }
            new_lines.push(format!("       {:>width$}: {}", i, line.trim_end(), width = nb_digits));
        }
    }
    (new_lines.join("\n"), problem_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_caret_alignment() {
        let lines = owned(&["if True\n"]);
        let (excerpt, bad) = highlight_source(1, 1, &lines, Some(8), None);
        assert_eq!(bad, "if True\n");
        let rows: Vec<&str> = excerpt.lines().collect();
        assert_eq!(rows[0], "    -->1: if True");
        // The caret sits under the column after "True".
        let caret = rows[1].find('^').unwrap();
        assert_eq!(caret, "    -->1: ".len() + 7);
    }

    #[test]
    fn test_gutter_width_follows_largest_number() {
        let lines = owned(&["a\n", "b\n", "c\n"]);
        let (excerpt, _) = highlight_source(9, 8, &lines, None, None);
        assert_eq!(excerpt, "        8: a\n    --> 9: b\n       10: c");
    }

    #[test]
    fn test_text_range_mark() {
        let lines = owned(&["x = a.b\n"]);
        let (excerpt, _) = highlight_source(1, 1, &lines, None, Some((4, 7)));
        assert_eq!(excerpt.lines().nth(1).unwrap(), "              ^^^");
    }

    #[test]
    fn test_stops_at_blank_line_after_mark() {
        let lines = owned(&["a\n", "\n", "b\n"]);
        let (excerpt, _) = highlight_source(1, 1, &lines, None, None);
        assert_eq!(excerpt, "    -->1: a");
    }
}
