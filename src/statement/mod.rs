//! Statement reconstruction
//!
//! A syntax error comes with a line number and an offset. Most analyses need
//! more than the line: the smallest run of lines that holds the reported
//! position and has balanced brackets. [`Statement`] finds that run, the
//! token Python complained about and its neighbours, and records bracket
//! imbalances met along the way.

pub mod brackets;
pub mod fixers;

pub use brackets::{closing_for, count_char, matching_brackets, name_bracket, no_unclosed_brackets};
pub use fixers::{check_statement, modify_token, replace_token, replace_two_tokens};

use crate::snapshot::SyntaxDetails;
use crate::source::SourceCache;
use crate::tokens::{ends_with_continuation, tokenize, untokenize, Token};
use tracing::{debug, instrument};

/// Keywords that cannot appear inside brackets. Flagged while a bracket is
/// open, they almost always mean the bracket was never closed.
const SHOULD_BEGIN_STATEMENT: &[&str] = &[
    "async", "await", "class", "def", "return", "elif", "import", "try", "except", "finally",
    "with", "while", "yield",
];

/// Rows of context kept before the statement in [`Statement::format_statement`].
const CONTEXT_ROWS: usize = 5;

/// Same token at the same place, as opposed to equal text.
pub(crate) fn same_token(a: &Token, b: &Token) -> bool {
    a.start == b.start && a.end == b.end && a.kind == b.kind && a.text == b.text
}

/// Everything known about the statement in which a syntax error was found.
#[derive(Debug, Clone)]
pub struct Statement {
    pub filename: String,
    pub linenumber: Option<usize>,
    pub message: String,
    /// 1-based column reported by the parser
    pub offset: Option<usize>,
    pub end_offset: Option<usize>,
    pub end_linenumber: Option<usize>,
    /// Tokens covered by a reported range wider than one character
    pub highlighted_tokens: Option<Vec<Token>>,

    pub bad_line: String,
    /// Rebuilt text of the statement
    pub statement: String,
    pub source_lines: Vec<String>,

    pub bad_token: Token,
    pub bad_token_index: usize,
    pub prev_token: Token,
    pub next_token: Token,
    pub first_token: Token,
    pub last_token: Token,

    /// Error raised inside an f-string
    pub fstring_error: bool,

    /// Statements of the file up to and including this one
    pub all_statements: Vec<Vec<Token>>,
    /// All tokens of the statement, spacing and comments included
    pub statement_tokens: Vec<Token>,
    /// Meaningful tokens only
    pub tokens: Vec<Token>,
    pub nb_tokens: usize,

    /// Brackets still open anywhere in the statement
    pub statement_brackets: Vec<String>,
    /// Brackets open at the position of the bad token
    pub begin_brackets: Vec<Token>,
    /// Closing bracket that matches nothing
    pub end_bracket: Option<Token>,
}

/// Scan state while walking the file's tokens.
#[derive(Default)]
struct Scan {
    bad_token: Option<Token>,
    prev_token: Option<Token>,
}

impl Statement {
    /// Locates the statement described by `details` in `source_lines`.
    #[instrument(skip_all, fields(line = ?details.lineno, offset = ?details.offset))]
    pub fn new(details: &SyntaxDetails, message: &str, bad_line: &str, source_lines: Vec<String>) -> Self {
        let filename = details.filename.clone().unwrap_or_default();
        let fstring_error = filename == "<fstring>" || message.contains("f-string");
        let highlighted_tokens = match (details.offset, details.end_offset) {
            (Some(offset), Some(end)) if end as i64 - offset as i64 != 1 => Some(Vec::new()),
            _ => None,
        };

        let mut statement = Self {
            filename,
            linenumber: details.lineno,
            message: message.to_string(),
            offset: details.offset,
            end_offset: details.end_offset,
            end_linenumber: details.end_lineno,
            highlighted_tokens,
            bad_line: bad_line.to_string(),
            statement: bad_line.to_string(),
            source_lines,
            bad_token: Token::meaningless(),
            bad_token_index: 0,
            prev_token: Token::meaningless(),
            next_token: Token::meaningless(),
            first_token: Token::meaningless(),
            last_token: Token::meaningless(),
            fstring_error,
            all_statements: Vec::new(),
            statement_tokens: Vec::new(),
            tokens: Vec::new(),
            nb_tokens: 0,
            statement_brackets: Vec::new(),
            begin_brackets: Vec::new(),
            end_bracket: None,
        };
        statement.get_token_info();
        statement
    }

    /// Like [`new`](Self::new), reading the source from `cache`.
    pub fn from_cache(details: &SyntaxDetails, message: &str, bad_line: &str, cache: &SourceCache) -> Self {
        let lines = details
            .filename
            .as_deref()
            .map(|filename| cache.get_source_lines(filename))
            .unwrap_or_default();
        Self::new(details, message, bad_line, lines)
    }

    /// See [`locate_statement`].
    pub fn locate(source_lines: &[String], linenumber: Option<usize>, offset: Option<usize>) -> Self {
        locate_statement(source_lines, linenumber, offset)
    }

    /// No bracket left open or closed without a match.
    pub fn is_complete(&self) -> bool {
        self.statement_brackets.is_empty() && self.end_bracket.is_none()
    }

    pub fn single_line(&self) -> bool {
        self.nb_tokens > 0 && self.first_token.start_row() == self.last_token.end_row() && self.is_complete()
    }

    /// True when `token` is the bad token itself, not merely equal text.
    pub fn is_bad_token(&self, token: &Token) -> bool {
        same_token(token, &self.bad_token)
    }

    fn get_token_info(&mut self) {
        let Some(linenumber) = self.linenumber else {
            debug!("no line number; statement left empty");
            return;
        };
        let (source_tokens, linenumber) = self.get_source_tokens(linenumber);
        self.linenumber = Some(linenumber);

        let scan = self.obtain_statement(&source_tokens, linenumber);
        self.tokens = self.remove_meaningless_tokens(scan.bad_token.as_ref());
        if self.tokens.is_empty() {
            if self.all_statements.len() > 1 {
                self.statement_tokens = self.all_statements[self.all_statements.len() - 2].clone();
                self.tokens = self.remove_meaningless_tokens(scan.bad_token.as_ref());
            } else {
                self.tokens = tokenize("Internal_error").into_iter().take(1).collect();
            }
        }
        self.statement = untokenize(&self.statement_tokens);
        self.assign_individual_token_values(scan);
    }

    fn get_source_tokens(&mut self, linenumber: usize) -> (Vec<Token>, usize) {
        let mut linenumber = linenumber;
        let mut source = String::new();
        if self.message.contains("f-string: invalid syntax") {
            source = self.bad_line.clone();
            linenumber = 1;
        }
        if source.trim().is_empty() {
            source = self.source_lines.concat();
            if source.trim().is_empty() {
                source = if self.bad_line.is_empty() { "\n".to_string() } else { self.bad_line.clone() };
            }
        }
        if self.source_lines.is_empty() || (linenumber == 1 && source == self.bad_line) {
            self.source_lines = source.split_inclusive('\n').map(str::to_string).collect();
        }
        (tokenize(&source), linenumber)
    }

    fn is_highlighting(&self) -> bool {
        self.highlighted_tokens.as_ref().is_some_and(|h| !h.is_empty())
    }

    /// Walks the file's tokens, collecting the statement that holds the
    /// reported position and every statement before it.
    fn obtain_statement(&mut self, source_tokens: &[Token], linenumber: usize) -> Scan {
        let mut scan = Scan::default();
        let mut previous_row: Option<usize> = None;
        let mut previous_token: Option<&Token> = None;
        let mut continuation_line = false;

        for token in source_tokens {
            let new_row = previous_row.map_or(true, |row| token.start_row() > row);
            if new_row {
                if let Some(prev) = previous_token {
                    continuation_line = ends_with_continuation(&prev.line);
                }
            }
            if token.start_row() > linenumber && !continuation_line && self.statement_brackets.is_empty() {
                break;
            }

            // A new row with every bracket closed starts a new statement,
            // unless the previous row ended with a backslash.
            if new_row {
                if token.start_row() <= linenumber && self.statement_brackets.is_empty() && !continuation_line {
                    if !self.statement_tokens.is_empty() {
                        self.all_statements.push(std::mem::take(&mut self.statement_tokens));
                    }
                    self.begin_brackets.clear();
                }
                previous_row = Some(token.start_row());
            }

            self.statement_tokens.push(token.clone());
            let meaningful = !token.text.trim().is_empty();

            if self.is_highlighting() {
                let in_range = match (self.offset, self.end_offset) {
                    (Some(offset), Some(end)) => {
                        (offset < token.end_col() && token.end_col() < end) || end == 0
                    }
                    _ => false,
                };
                if token.start_row() == linenumber && in_range && meaningful {
                    if let Some(highlighted) = self.highlighted_tokens.as_mut() {
                        highlighted.push(token.clone());
                    }
                }
            } else if scan.bad_token.is_none()
                && meaningful
                && token.start_row() == linenumber
                && self
                    .offset
                    .is_some_and(|offset| token.start_col() <= offset && offset <= token.end_col())
            {
                if token.is_comment() {
                    scan.bad_token = scan.prev_token.take();
                } else {
                    scan.bad_token = Some(token.clone());
                }
                if let (Some(highlighted), Some(bad)) = (self.highlighted_tokens.as_mut(), scan.bad_token.as_ref()) {
                    highlighted.push(bad.clone());
                }
            } else if scan.bad_token.is_none() && meaningful && !token.is_comment() {
                scan.prev_token = Some(token.clone());
            }

            previous_token = Some(token);

            let begins_statement = scan
                .bad_token
                .as_ref()
                .is_some_and(|bad| SHOULD_BEGIN_STATEMENT.contains(&bad.text.as_str()));
            if begins_statement && !self.statement_brackets.is_empty() {
                break;
            }

            if token.is_opening_bracket() {
                self.statement_brackets.push(token.text.clone());
                let before_bad = match scan.bad_token.as_ref() {
                    None => true,
                    Some(bad) => same_token(bad, token),
                };
                if before_bad {
                    self.begin_brackets.push(token.clone());
                }
            } else if token.is_closing_bracket() {
                self.end_bracket = Some(token.clone());
                let Some(open_bracket) = self.statement_brackets.pop() else {
                    break;
                };
                if !matching_brackets(&open_bracket, &token.text) {
                    self.statement_brackets.push(open_bracket);
                    break;
                }
                if scan.bad_token.is_none() {
                    self.begin_brackets.pop();
                }
                self.end_bracket = None;
            }
        }

        if !self.statement_tokens.is_empty() {
            if !untokenize(&self.statement_tokens).trim().is_empty() {
                self.all_statements.push(self.statement_tokens.clone());
            } else if let Some(last) = self.all_statements.last() {
                self.statement_tokens = last.clone();
            }
        }
        scan
    }

    /// Drops blank and comment tokens, noting where the bad token lands.
    fn remove_meaningless_tokens(&mut self, bad_token: Option<&Token>) -> Vec<Token> {
        let mut tokens = Vec::with_capacity(self.statement_tokens.len());
        for tok in &self.statement_tokens {
            if tok.text.trim().is_empty() || tok.is_comment() {
                continue;
            }
            if bad_token.is_some_and(|bad| same_token(bad, tok)) {
                self.bad_token_index = tokens.len();
            }
            tokens.push(tok.clone());
        }
        tokens
    }

    fn assign_individual_token_values(&mut self, scan: Scan) {
        self.nb_tokens = self.tokens.len();
        let (Some(first), Some(last)) = (self.tokens.first(), self.tokens.last()) else {
            return;
        };
        self.first_token = first.clone();
        self.last_token = last.clone();

        let mut prev_token = scan.prev_token;
        match scan.bad_token {
            Some(bad) => self.bad_token = bad,
            None => {
                self.bad_token = self.last_token.clone();
                self.bad_token_index = self.nb_tokens - 1;
                prev_token = None;
            }
        }

        self.prev_token = if self.bad_token_index == 0 {
            Token::meaningless()
        } else {
            prev_token.unwrap_or_else(|| self.tokens[self.bad_token_index - 1].clone())
        };

        self.next_token = if same_token(&self.last_token, &self.bad_token) {
            Token::meaningless()
        } else {
            self.tokens
                .get(self.bad_token_index + 1)
                .cloned()
                .unwrap_or_else(Token::meaningless)
        };
    }

    /// Numbered excerpt of the statement and up to a few statements before
    /// it, with the reported line marked by an arrow and a caret.
    pub fn format_statement(&self) -> String {
        let (Some(linenumber), Some(last_meaningful)) = (self.linenumber, self.tokens.last()) else {
            return String::new();
        };
        if self.statement_tokens.is_empty() {
            return String::new();
        }
        let last = last_meaningful.end_row();

        let own = [self.statement_tokens.clone()];
        let statements: &[Vec<Token>] = if self.all_statements.is_empty() { &own } else { &self.all_statements };
        let index = statements
            .iter()
            .position(|stmt| stmt.last().map_or(false, |tok| last.saturating_sub(tok.end_row()) < CONTEXT_ROWS))
            .unwrap_or(statements.len() - 1);
        let keep = &statements[index..];
        let Some(start) = keep.first().and_then(|stmt| stmt.first()).map(Token::start_row) else {
            return String::new();
        };

        let tokens: Vec<Token> = keep.iter().flatten().cloned().collect();
        let partial_source = untokenize(&tokens);
        let lines: Vec<&str> = partial_source.split('\n').collect();
        let nb_digits = (start + lines.len()).to_string().len();
        let offset_mark = self.offset.map(|offset| format!("{}^", " ".repeat(8 + nb_digits + offset)));

        let mut new_lines = Vec::new();
        let mut marked = false;
        for (i, line) in (start..).zip(lines) {
            if i == linenumber {
                new_lines.push(format!("    -->{:>width$}: {}", i, line.trim_end(), width = nb_digits));
                if let Some(mark) = &offset_mark {
                    new_lines.push(mark.clone());
                }
                marked = true;
            } else if marked {
                if line.trim().is_empty() {
                    break;
                }
                new_lines.push(format!("       {:>width$}: {}", i, line.trim_end(), width = nb_digits));
            } else if i > linenumber + CONTEXT_ROWS {
                break;
            } else {
                new_lines.push(format!("       {:>width$}: {}", i, line.trim_end(), width = nb_digits));
            }
        }
        new_lines.join("\n")
    }
}

/// Statement around `linenumber`/`offset` (1-based) in `source_lines`, as
/// reported for a bare "invalid syntax" error. A missing line number gives a
/// statement without tokens.
pub fn locate_statement(source_lines: &[String], linenumber: Option<usize>, offset: Option<usize>) -> Statement {
    let bad_line = linenumber
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| source_lines.get(i))
        .cloned()
        .unwrap_or_default();
    let details = SyntaxDetails {
        filename: Some("<string>".to_string()),
        lineno: linenumber,
        offset,
        ..SyntaxDetails::default()
    };
    Statement::new(&details, "invalid syntax", &bad_line, source_lines.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(source: &str) -> Vec<String> {
        source.split_inclusive('\n').map(str::to_string).collect()
    }

    #[test]
    fn test_single_line_statement() {
        let source = lines("a = 1\nif x = 2:\n    pass\n");
        let stmt = locate_statement(&source, Some(2), Some(6));
        assert_eq!(stmt.bad_token, "=");
        assert_eq!(stmt.prev_token, "x");
        assert_eq!(stmt.next_token, "2");
        assert_eq!(stmt.first_token, "if");
        assert_eq!(stmt.last_token, ":");
        assert_eq!(stmt.nb_tokens, 5);
        assert!(stmt.single_line());
        assert_eq!(stmt.statement, "if x = 2:\n");
        assert_eq!(stmt.all_statements.len(), 2);
    }

    #[test]
    fn test_unclosed_bracket() {
        let source = lines("a = [1, 2, 3\n");
        let stmt = locate_statement(&source, Some(1), Some(5));
        assert_eq!(stmt.bad_token, "[");
        assert_eq!(stmt.begin_brackets.len(), 1);
        assert_eq!(stmt.begin_brackets[0].start, (1, 4));
        assert_eq!(stmt.statement_brackets, vec!["["]);
        assert!(!stmt.is_complete());
    }

    #[test]
    fn test_closed_brackets_before_bad_token_are_dropped() {
        let source = lines("x = f(1) + [2 3]\n");
        let stmt = locate_statement(&source, Some(1), Some(15));
        assert_eq!(stmt.bad_token, "3");
        let open: Vec<&str> = stmt.begin_brackets.iter().map(|t| t.as_str()).collect();
        assert_eq!(open, vec!["["]);
        assert!(stmt.is_complete());
    }

    #[test]
    fn test_multiline_statement() {
        let source = lines("x = 1\nresult = f(1,\n    2 3)\ny = 2\n");
        let stmt = locate_statement(&source, Some(3), Some(7));
        assert_eq!(stmt.bad_token, "3");
        assert_eq!(stmt.prev_token, "2");
        assert_eq!(stmt.first_token, "result");
        assert_eq!(stmt.statement, "result = f(1,\n    2 3)\n");
        assert!(!stmt.single_line());
    }

    #[test]
    fn test_backslash_continuation_joins_rows() {
        for eol in ["\n", "\r\n"] {
            let source = lines(&format!("y = 0{eol}x = 1 + \\{eol}    2 3{eol}"));
            let stmt = locate_statement(&source, Some(3), Some(7));
            assert_eq!(stmt.bad_token, "3", "eol: {:?}", eol);
            assert_eq!(stmt.prev_token, "2");
            assert_eq!(stmt.first_token, "x");
            assert_eq!(stmt.statement, format!("x = 1 + \\{eol}    2 3{eol}"));
            assert_eq!(stmt.all_statements.len(), 2);
        }
    }

    #[test]
    fn test_unmatched_closing_bracket() {
        let source = lines("a = (1, 2]\n");
        let stmt = locate_statement(&source, Some(1), Some(10));
        assert_eq!(stmt.end_bracket.as_ref().map(|t| t.as_str()), Some("]"));
        assert_eq!(stmt.statement_brackets, vec!["("]);
    }

    #[test]
    fn test_keyword_stops_unclosed_statement() {
        let source = lines("a = (1,\ndef f():\n    pass\n");
        let stmt = locate_statement(&source, Some(2), Some(1));
        assert_eq!(stmt.bad_token, "def");
        assert_eq!(stmt.statement_brackets, vec!["("]);
    }

    #[test]
    fn test_bad_token_defaults_to_last() {
        let source = lines("while True\n");
        let stmt = locate_statement(&source, Some(1), None);
        assert_eq!(stmt.bad_token, "True");
        assert_eq!(stmt.bad_token_index, 1);
        assert_eq!(stmt.prev_token, "while");
        assert_eq!(stmt.next_token.text, " ");
    }

    #[test]
    fn test_missing_line_number() {
        let stmt = locate_statement(&lines("x = 1\n"), None, None);
        assert!(stmt.tokens.is_empty());
        assert_eq!(stmt.format_statement(), "");
    }

    #[test]
    fn test_format_statement() {
        let source = lines("a = 1\nb = 2\nif b = 2:\n    pass\n");
        let stmt = locate_statement(&source, Some(3), Some(6));
        let formatted = stmt.format_statement();
        let rows: Vec<&str> = formatted.lines().collect();
        assert_eq!(rows[0], "       1: a = 1");
        assert_eq!(rows[2], "    -->3: if b = 2:");
        assert_eq!(rows[3].find('^'), Some(8 + 1 + 6));
    }

    #[test]
    fn test_fstring_error_uses_bad_line() {
        let details = SyntaxDetails::new("<fstring>", 1, 3);
        let stmt = Statement::new(&details, "f-string: invalid syntax", "(x y)\n", Vec::new());
        assert!(stmt.fstring_error);
        assert_eq!(stmt.first_token, "(");
        assert_eq!(stmt.source_lines, vec!["(x y)\n"]);
    }

    #[test]
    fn test_highlighted_range() {
        let details = SyntaxDetails::new("<string>", 1, 5).with_end(1, 10);
        let source = lines("x = 12 ab\n");
        let stmt = Statement::new(&details, "invalid syntax", "x = 12 ab\n", source);
        let highlighted = stmt.highlighted_tokens.as_ref().unwrap();
        let texts: Vec<&str> = highlighted.iter().map(|t| t.as_str()).collect();
        assert_eq!(texts, vec!["12", "ab"]);
        assert_eq!(stmt.bad_token, "12");
    }
}
