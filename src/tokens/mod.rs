//! Token model
//!
//! Tokens carry exact spans and the physical line they come from, so a token
//! sequence can always be turned back into the text it was cut from.

mod lexer;
pub mod utils;

pub use lexer::tokenize;
pub use utils::{
    find_token_by_position, get_lines, get_significant_tokens, is_assignment, is_bitwise,
    is_comparison, is_math_op, is_operator, remove_meaningless_tokens, strip_comment,
};

use std::fmt;

/// Python reserved words.
pub const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// True when `line` ends with a backslash continuation, LF or CRLF.
pub fn ends_with_continuation(line: &str) -> bool {
    line.ends_with("\\\n") || line.ends_with("\\\r\n")
}

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// `str.isidentifier()` for the characters Python accepts in names.
pub fn is_identifier_text(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Name,
    Op,
    String,
    Number,
    Comment,
    Newline,
    Nl,
    Indent,
    Dedent,
    EndMarker,
    ErrorToken,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Name => "NAME",
            Self::Op => "OP",
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::Comment => "COMMENT",
            Self::Newline => "NEWLINE",
            Self::Nl => "NL",
            Self::Indent => "INDENT",
            Self::Dedent => "DEDENT",
            Self::EndMarker => "ENDMARKER",
            Self::ErrorToken => "ERRORTOKEN",
        };
        f.write_str(name)
    }
}

/// A lexical token. Rows are 1-based, columns count characters from 0.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: (usize, usize),
    pub end: (usize, usize),
    /// Physical line(s) spanned by the token
    pub line: String,
    /// Lines right before this token's row that hold only a backslash
    /// continuation, verbatim
    pub skipped_lines: String,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        start: (usize, usize),
        end: (usize, usize),
        line: impl Into<String>,
    ) -> Self {
        Self { kind, text: text.into(), start, end, line: line.into(), skipped_lines: String::new() }
    }

    /// Placeholder used where a neighbouring token does not exist. Its text
    /// is blank, so it never compares equal to a real token.
    pub fn meaningless() -> Self {
        Self::new(TokenKind::EndMarker, " ", (0, 0), (0, 0), "")
    }

    /// Copy of this token with different text; spans are kept.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self { text: text.into(), ..self.clone() }
    }

    pub fn start_row(&self) -> usize {
        self.start.0
    }

    pub fn start_col(&self) -> usize {
        self.start.1
    }

    pub fn end_row(&self) -> usize {
        self.end.0
    }

    pub fn end_col(&self) -> usize {
        self.end.1
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_comment(&self) -> bool {
        self.kind == TokenKind::Comment
    }

    pub fn is_name(&self) -> bool {
        self.kind == TokenKind::Name
    }

    /// A valid name that is not a keyword.
    pub fn is_identifier(&self) -> bool {
        is_identifier_text(&self.text) && !self.is_keyword()
    }

    pub fn is_keyword(&self) -> bool {
        is_keyword(&self.text)
    }

    pub fn is_number(&self) -> bool {
        self.kind == TokenKind::Number
    }

    pub fn is_string(&self) -> bool {
        self.kind == TokenKind::String
    }

    pub fn is_operator(&self) -> bool {
        self.kind == TokenKind::Op
    }

    pub fn is_error(&self) -> bool {
        self.kind == TokenKind::ErrorToken
    }

    pub fn is_complex(&self) -> bool {
        self.is_number() && (self.text.ends_with('j') || self.text.ends_with('J'))
    }

    pub fn is_float(&self) -> bool {
        if !self.is_number() || self.is_complex() {
            return false;
        }
        let lower = self.text.to_ascii_lowercase();
        if lower.starts_with("0x") || lower.starts_with("0o") || lower.starts_with("0b") {
            return false;
        }
        lower.contains('.') || lower.contains('e')
    }

    pub fn is_integer(&self) -> bool {
        self.is_number() && !self.is_float() && !self.is_complex()
    }

    /// Indentation changes, line ends and the end marker.
    pub fn is_space(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Indent
                | TokenKind::Dedent
                | TokenKind::Newline
                | TokenKind::Nl
                | TokenKind::EndMarker
        )
    }

    pub fn is_bracket(&self) -> bool {
        self.is_opening_bracket() || self.is_closing_bracket()
    }

    pub fn is_opening_bracket(&self) -> bool {
        matches!(self.text.as_str(), "(" | "[" | "{")
    }

    pub fn is_closing_bracket(&self) -> bool {
        matches!(self.text.as_str(), ")" | "]" | "}")
    }

    /// True when the token text is non-blank and one of `items`.
    pub fn is_in(&self, items: &[&str]) -> bool {
        !self.text.trim().is_empty() && items.contains(&self.text.as_str())
    }

    pub fn is_not_in(&self, items: &[&str]) -> bool {
        self.text.is_empty() || !items.contains(&self.text.as_str())
    }

    /// No gap between the end of `self` and the start of `other`.
    pub fn immediately_before(&self, other: &Token) -> bool {
        self.end == other.start
    }

    pub fn immediately_after(&self, other: &Token) -> bool {
        other.immediately_before(self)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl PartialEq<str> for Token {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Characters `from..to` of `line`, counted in chars.
pub(crate) fn char_slice(line: &str, from: usize, to: usize) -> &str {
    if from >= to {
        return "";
    }
    let mut indices = line.char_indices().map(|(i, _)| i).chain(std::iter::once(line.len()));
    let start = indices.nth(from).unwrap_or(line.len());
    let end = if to > from {
        indices.nth(to - from - 1).unwrap_or(line.len())
    } else {
        start
    };
    &line[start..end]
}

/// Rebuilds source text from tokens, restoring the spacing recorded in each
/// token's line and any backslash continuation between rows.
pub fn untokenize(tokens: &[Token]) -> String {
    let mut words = String::new();
    let mut previous_line = "";
    let mut last_row = 0usize;
    let mut last_column = 0usize;
    let mut last_significant = None;

    for token in tokens {
        if token.start_row() > last_row && last_significant != Some(TokenKind::Comment) {
            let tail = previous_line.split_inclusive('\n').last().unwrap_or("");
            if ends_with_continuation(tail) || tail.ends_with("\\\r") {
                let from = tail.chars().count().min(last_column);
                words.push_str(char_slice(tail, from, usize::MAX));
            }
        }
        if !token.skipped_lines.is_empty() {
            // A leading token only carries them when they open the source.
            // An end marker with text sits one row past its blanks.
            let skipped = token.skipped_lines.split_inclusive('\n').count();
            let own_row = usize::from(token.kind == TokenKind::EndMarker && !token.text.is_empty());
            if last_row > 0 || token.start_row() == skipped + own_row + 1 {
                words.push_str(&token.skipped_lines);
            }
        }

        if token.start_row() > last_row {
            last_column = 0;
        }
        if token.start_col() > last_column {
            words.push_str(char_slice(&token.line, last_column, token.start_col()));
        }
        words.push_str(&token.text);

        previous_line = &token.line;
        last_row = token.end_row();
        last_column = token.end_col();
        if !token.is_space() {
            last_significant = Some(token.kind);
        }
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert!(is_keyword("lambda"));
        assert!(!is_keyword("print"));
        assert!(is_identifier_text("_x1"));
        assert!(is_identifier_text("été"));
        assert!(!is_identifier_text("1x"));
    }

    #[test]
    fn test_predicates() {
        let tokens = tokenize("x = [1.5, 2j, 'a'] # c\n");
        let texts: Vec<&str> = tokens.iter().map(|t| t.as_str()).collect();
        assert_eq!(&texts[..4], &["x", "=", "[", "1.5"]);
        assert!(tokens[0].is_identifier());
        assert!(tokens[2].is_opening_bracket());
        assert!(tokens[3].is_float());
        assert!(tokens[5].is_complex());
        assert!(tokens[7].is_string());
        assert!(tokens[8].is_closing_bracket());
        assert!(tokens[9].is_comment());
        assert!(tokens[10].is_space());
    }

    #[test]
    fn test_adjacency() {
        let tokens = tokenize("f(x) + y");
        assert!(tokens[0].immediately_before(&tokens[1]));
        assert!(tokens[1].immediately_after(&tokens[0]));
        assert!(!tokens[3].immediately_before(&tokens[4]));
    }

    #[test]
    fn test_token_compares_with_str() {
        let tokens = tokenize("pass");
        assert_eq!(tokens[0], "pass");
        assert!(tokens[0].is_keyword());
        assert!(!tokens[0].is_identifier());
    }

    #[test]
    fn test_char_slice_multibyte() {
        assert_eq!(char_slice("été x", 1, 3), "té");
        assert_eq!(char_slice("abc", 1, usize::MAX), "bc");
        assert_eq!(char_slice("abc", 2, 2), "");
    }

    #[test]
    fn test_untokenize_continuation() {
        let source = "x = 1 + \\\n    2\n";
        assert_eq!(untokenize(&tokenize(source)), source);
    }

    #[test]
    fn test_untokenize_keeps_continuation_only_rows() {
        for source in [
            "x = 1 + \\\n\\\n    2\n",
            "a\n\\\na",
            "\\\nx = 1\n",
            "\\\n   ",
            "a = (1,\n  \\\r\n 2)\r\n",
            "if a:\n\tb = \\\n \t\\\n\t3\n",
        ] {
            assert_eq!(untokenize(&tokenize(source)), source, "source: {:?}", source);
        }
    }

    #[test]
    fn test_skipped_lines_stay_with_their_statement() {
        let tokens = tokenize("a = 1\n\\\nb = 2\n");
        let b = tokens.iter().position(|t| t.text == "b").unwrap();
        assert_eq!(tokens[b].skipped_lines, "\\\n");
        assert_eq!(untokenize(&tokens[b..]), "b = 2\n");
        assert!(ends_with_continuation("x \\\r\n"));
        assert!(!ends_with_continuation("x \\ \n"));
    }
}
