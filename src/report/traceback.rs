//! Python-style tracebacks rebuilt from the snapshot frames.

use crate::analysis::registry::raised_line;
use crate::locale::Translator;
use crate::snapshot::ExceptionSnapshot;
use crate::source::SourceCache;
use crate::tr;

pub const TRACEBACK_HEADER: &str = "Traceback (most recent call last):";

/// The three traceback sections of an explanation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tracebacks {
    /// Frames as Python would print them, with sources from the cache
    pub simulated: String,
    /// `simulated`, cut down when it has many lines
    pub shortened: String,
    /// Traceback text given by Python, or `simulated` when there is none
    pub original: String,
}

fn suppressed(t: &Translator) -> String {
    format!("\n       ... {} ...\n", tr!(t, "More lines not shown."))
}

/// Keeps the first `head` and last `tail` lines of `lines` with a marker in
/// between, once there are more than `limit` of them.
pub fn shorten(lines: &[String], head: usize, tail: usize, limit: usize, t: &Translator) -> Vec<String> {
    if lines.len() <= limit {
        return lines.to_vec();
    }
    let mut result = lines[..head].to_vec();
    result.push(suppressed(t));
    result.extend_from_slice(&lines[lines.len() - tail..]);
    result
}

/// `  File "...", line N, in f` and source line for each frame, the parser
/// position for syntax errors, then `message_line`.
pub fn frame_lines(snapshot: &ExceptionSnapshot, cache: &SourceCache, message_line: &str) -> Vec<String> {
    let mut result = Vec::with_capacity(2 * snapshot.frames.len() + 4);
    for frame in &snapshot.frames {
        result.push(format!("  File \"{}\", line {}, in {}", frame.filename, frame.lineno, frame.function));
        let line = raised_line(frame, cache);
        if !line.is_empty() {
            result.push(format!("    {}", line));
        }
    }

    if let Some(details) = snapshot.syntax.as_ref().filter(|_| snapshot.is_syntax_error()) {
        let filename = details.filename.as_deref().unwrap_or("<unknown>");
        let lineno = details.lineno.unwrap_or(0);
        result.push(format!("  File \"{}\", line {}", filename, lineno));

        let text = details.text.clone().or_else(|| {
            lineno
                .checked_sub(1)
                .and_then(|index| cache.get_lines(filename).get(index).cloned())
        });
        if let Some(text) = text {
            let text = text.trim_end();
            let stripped = text.trim_start();
            if !stripped.is_empty() {
                result.push(format!("    {}", stripped));
                if let Some(offset) = details.offset {
                    let indent = text.chars().count() - stripped.chars().count();
                    let offset = offset.saturating_sub(indent);
                    result.push(format!("{}^", " ".repeat(3 + offset)));
                }
            }
        }
    }

    result.push(message_line.trim().to_string());
    result
}

/// Builds the simulated, shortened and original tracebacks.
pub fn build(snapshot: &ExceptionSnapshot, cache: &SourceCache, t: &Translator, message_line: &str) -> Tracebacks {
    let mut tb = frame_lines(snapshot, cache, message_line);
    let mut shortened_tb = shorten(&tb, 2, 7, 10, t);

    let python_tb: Vec<String> = snapshot
        .traceback
        .as_deref()
        .map(|text| text.lines().map(|line| line.trim_end().to_string()).collect())
        .unwrap_or_default();

    let has_header = match python_tb.first() {
        Some(first) => first.starts_with(TRACEBACK_HEADER),
        None => !snapshot.frames.is_empty(),
    };
    if has_header {
        tb.insert(0, TRACEBACK_HEADER.to_string());
        shortened_tb.insert(0, TRACEBACK_HEADER.to_string());
    }

    // Deep recursion repeats the same frames; Python's own text already
    // condenses them.
    if python_tb.last().is_some_and(|last| last.contains("RecursionError")) {
        tb = shorten(&python_tb, 4, 5, 12, t);
    }

    let simulated = tb.join("\n") + "\n";
    let original = if python_tb.is_empty() { simulated.clone() } else { python_tb.join("\n") + "\n" };
    Tracebacks { simulated, shortened: shortened_tb.join("\n") + "\n", original }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Frame, SyntaxDetails};

    #[test]
    fn test_runtime_traceback() {
        let cache = SourceCache::new();
        cache.add("<tb>", "def f():\n    return 1 / 0\n\nf()\n");
        let snapshot = ExceptionSnapshot::new("ZeroDivisionError", "division by zero")
            .with_frame(Frame::new("<tb>", 4))
            .with_frame(Frame::new("<tb>", 2).in_function("f"));
        let tracebacks = build(&snapshot, &cache, &Translator::english(), "ZeroDivisionError: division by zero\n");
        assert_eq!(
            tracebacks.simulated,
            "Traceback (most recent call last):\n  File \"<tb>\", line 4, in <module>\n    f()\n  File \"<tb>\", line 2, in f\n    return 1 / 0\nZeroDivisionError: division by zero\n"
        );
        assert_eq!(tracebacks.shortened, tracebacks.simulated);
        assert_eq!(tracebacks.original, tracebacks.simulated);
    }

    #[test]
    fn test_syntax_caret() {
        let cache = SourceCache::new();
        let snapshot = ExceptionSnapshot::new("SyntaxError", "invalid syntax")
            .with_syntax(SyntaxDetails::new("<syn>", 1, 8).with_text("    if x = 1:\n"));
        let lines = frame_lines(&snapshot, &cache, "SyntaxError: invalid syntax\n");
        assert_eq!(lines[0], "  File \"<syn>\", line 1");
        assert_eq!(lines[1], "    if x = 1:");
        assert_eq!(lines[2], "       ^");
        assert_eq!(lines[3], "SyntaxError: invalid syntax");
    }

    #[test]
    fn test_long_traceback_is_shortened() {
        let cache = SourceCache::new();
        let mut snapshot = ExceptionSnapshot::new("ValueError", "deep");
        for lineno in 1..=12 {
            snapshot = snapshot.with_frame(Frame::new("<gone>", lineno));
        }
        let tracebacks = build(&snapshot, &cache, &Translator::english(), "ValueError: deep");
        let shortened: Vec<&str> = tracebacks.shortened.lines().collect();
        assert_eq!(shortened[0], TRACEBACK_HEADER);
        assert_eq!(shortened[1], "  File \"<gone>\", line 1, in <module>");
        assert!(tracebacks.shortened.contains("       ... More lines not shown. ..."));
        assert!(tracebacks.shortened.ends_with("  File \"<gone>\", line 12, in <module>\nValueError: deep\n"));
        assert!(tracebacks.simulated.lines().count() > tracebacks.shortened.lines().count());
    }

    #[test]
    fn test_python_traceback_kept() {
        let cache = SourceCache::new();
        let mut snapshot = ExceptionSnapshot::new("KeyError", "'a'");
        snapshot.traceback = Some("Traceback (most recent call last):\n  File \"x.py\", line 1, in <module>\nKeyError: 'a'\n".into());
        let tracebacks = build(&snapshot, &cache, &Translator::english(), "KeyError: 'a'");
        assert!(tracebacks.original.contains("x.py"));
        assert!(tracebacks.simulated.starts_with(TRACEBACK_HEADER));
    }
}
