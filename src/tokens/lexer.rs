//! Line-oriented Python tokenizer.
//!
//! Produces the same token stream as CPython's pure-Python `tokenize`
//! module (NL/NEWLINE distinction, COMMENT tokens, ERRORTOKEN for stray
//! characters), which the statement reconstructor depends on.

use super::{Token, TokenKind};
use crate::pattern::Pattern;
use once_cell::sync::Lazy;
use tracing::{debug, error, instrument, trace};

const TAB_SIZE: usize = 8;
const STRING_PREFIX: &str = r"(?:[rR][bBfF]?|[bBfF][rR]?|[uU])?";
const NUMBER: &str = r"(?:[0-9](?:_?[0-9])*[jJ]|(?:(?:[0-9](?:_?[0-9])*\.(?:[0-9](?:_?[0-9])*)?|\.[0-9](?:_?[0-9])*)(?:[eE][-+]?[0-9](?:_?[0-9])*)?|[0-9](?:_?[0-9])*[eE][-+]?[0-9](?:_?[0-9])*)[jJ]|(?:[0-9](?:_?[0-9])*\.(?:[0-9](?:_?[0-9])*)?|\.[0-9](?:_?[0-9])*)(?:[eE][-+]?[0-9](?:_?[0-9])*)?|[0-9](?:_?[0-9])*[eE][-+]?[0-9](?:_?[0-9])*|0[xX](?:_?[0-9a-fA-F])+|0[bB](?:_?[01])+|0[oO](?:_?[0-7])+|(?:0(?:_?0)*|[1-9](?:_?[0-9])*))";
const OPERATOR: &str = r"(?:\*\*=|>>=|<<=|//=|\.\.\.|!=|%=|&=|\*\*|\*=|\+=|-=|->|//|/=|:=|<<|<=|==|>=|>>|@=|\^=|\|=|[%&()*+,\-./:;<=>@\[\]^{|}~])";

static PSEUDO_TOKEN: Lazy<Pattern> = Lazy::new(|| {
    let pattern = format!(
        concat!(
            r"\A[ \f\t]*(",
            r#"\\\r?\n|\z|#[^\r\n]*|{p}'''|{p}""""#,
            r"|{number}",
            r"|\r?\n|{op}",
            r#"|{p}'[^\n'\\]*(?:\\.[^\n'\\]*)*(?:'|\\\r?\n)"#,
            r#"|{p}"[^\n"\\]*(?:\\.[^\n"\\]*)*(?:"|\\\r?\n)"#,
            r"|\w+)"
        ),
        p = STRING_PREFIX,
        number = NUMBER,
        op = OPERATOR,
    );
    Pattern::new(&pattern)
});

static END_SINGLE: Lazy<Pattern> = Lazy::new(|| Pattern::new(r"\A[^'\\]*(?:\\.[^'\\]*)*'"));
static END_DOUBLE: Lazy<Pattern> = Lazy::new(|| Pattern::new(r#"\A[^"\\]*(?:\\.[^"\\]*)*""#));

/// Finds the end of a triple-quoted string body starting at `text`.
///
/// The regex crate has no lookahead, so the body is scanned by hand.
fn find_triple_end(text: &str, quote: char) -> Option<usize> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut i = 0;
    while i < chars.len() {
        let (_, c) = chars[i];
        if c == '\\' {
            if i + 1 < chars.len() && chars[i + 1].1 != '\n' {
                i += 2;
                continue;
            }
            i += 1;
            continue;
        }
        if c == quote
            && i + 2 < chars.len()
            && chars[i + 1].1 == quote
            && chars[i + 2].1 == quote
        {
            let (idx, _) = chars[i + 2];
            return Some(idx + quote.len_utf8());
        }
        i += 1;
    }
    None
}

fn match_string_end(rest: &str, quote: &str) -> Option<usize> {
    match quote {
        "'''" => find_triple_end(rest, '\''),
        "\"\"\"" => find_triple_end(rest, '"'),
        "\"" => END_DOUBLE.find_end(rest),
        _ => END_SINGLE.find_end(rest),
    }
}

/// Column in characters of byte offset `pos` within `line`.
fn col(line: &str, pos: usize) -> usize {
    if line.is_ascii() {
        pos
    } else {
        line[..pos].chars().count()
    }
}

fn quote_of(token: &str) -> &str {
    let body = token.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    if body.starts_with("'''") {
        "'''"
    } else if body.starts_with("\"\"\"") {
        "\"\"\""
    } else if body.starts_with('"') {
        "\""
    } else {
        "'"
    }
}

struct PendingString {
    text: String,
    start: (usize, usize),
    lines: String,
    quote: String,
    needs_continuation: bool,
}

/// Tokenizes Python source. Never fails: when the source cannot be
/// tokenized to the end, the tokens found so far are returned.
#[instrument(skip(source), fields(source_len = source.len()))]
pub fn tokenize(source: &str) -> Vec<Token> {
    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    let mut tokens = scan_lines(&lines);
    attach_skipped_lines(&mut tokens, &lines);
    tokens
}

/// Rows that produce no token (a lone backslash continuation) are kept on
/// the next token so `untokenize` can restore them.
fn attach_skipped_lines(tokens: &mut [Token], lines: &[&str]) {
    let mut covered = 0usize;
    for token in tokens.iter_mut() {
        let row = token.start_row();
        if row > covered + 1 {
            let from = covered.min(lines.len());
            let mut to = (row - 1).min(lines.len());
            // An end marker with text already holds the blanks of the last row.
            if token.kind == TokenKind::EndMarker && !token.text.is_empty() {
                to = to.min(row - 2).max(from);
            }
            token.skipped_lines = lines[from..to].concat();
        }
        covered = covered.max(token.end_row());
    }
}

fn scan_lines(lines: &[&str]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut indents: Vec<usize> = vec![0];
    let mut paren_level = 0usize;
    let mut continued = false;
    let mut pending: Option<PendingString> = None;
    let mut lnum = 0usize;
    let mut trailing_blank: Option<&str> = None;
    let Some(pseudo) = PSEUDO_TOKEN.regex() else {
        error!("tokenizer pattern failed to compile");
        return tokens;
    };

    'lines: for line in lines.iter().copied() {
        lnum += 1;
        let mut pos = 0usize;
        let max = line.len();

        if let Some(mut string) = pending.take() {
            match match_string_end(line, &string.quote) {
                Some(end) => {
                    pos = end;
                    string.text.push_str(&line[..end]);
                    string.lines.push_str(line);
                    tokens.push(Token::new(
                        TokenKind::String,
                        string.text,
                        string.start,
                        (lnum, col(line, end)),
                        string.lines,
                    ));
                }
                None if string.needs_continuation
                    && !line.ends_with("\\\n")
                    && !line.ends_with("\\\r\n") =>
                {
                    string.text.push_str(line);
                    tokens.push(Token::new(
                        TokenKind::ErrorToken,
                        string.text,
                        string.start,
                        (lnum, col(line, max)),
                        string.lines,
                    ));
                    continue;
                }
                None => {
                    string.text.push_str(line);
                    string.lines.push_str(line);
                    pending = Some(string);
                    continue;
                }
            }
        } else if paren_level == 0 && !continued {
            let mut column = 0usize;
            for c in line.chars() {
                match c {
                    ' ' => column += 1,
                    '\t' => column = (column / TAB_SIZE + 1) * TAB_SIZE,
                    '\x0c' => column = 0,
                    _ => break,
                }
                pos += 1;
            }
            if pos == max {
                trailing_blank = Some(line);
                break;
            }

            let first = line[pos..].chars().next().unwrap_or('\n');
            if first == '#' || first == '\r' || first == '\n' {
                if first == '#' {
                    let comment = line[pos..].trim_end_matches(['\r', '\n']);
                    let end = pos + comment.len();
                    tokens.push(Token::new(
                        TokenKind::Comment,
                        comment,
                        (lnum, col(line, pos)),
                        (lnum, col(line, end)),
                        line,
                    ));
                    pos = end;
                }
                tokens.push(Token::new(
                    TokenKind::Nl,
                    &line[pos..],
                    (lnum, col(line, pos)),
                    (lnum, col(line, max)),
                    line,
                ));
                continue;
            }

            let indent = indents.last().copied().unwrap_or(0);
            if column > indent {
                indents.push(column);
                tokens.push(Token::new(
                    TokenKind::Indent,
                    &line[..pos],
                    (lnum, 0),
                    (lnum, col(line, pos)),
                    line,
                ));
            }
            while column < indents.last().copied().unwrap_or(0) {
                if !indents.contains(&column) {
                    // Dedent to a level never seen: keep the rest of the line
                    // as one token so the offending text stays visible.
                    debug!(lnum, "unindent does not match any outer level");
                    tokens.push(Token::new(
                        TokenKind::Name,
                        line[pos..].trim(),
                        (lnum, col(line, pos)),
                        (lnum, col(line, max)),
                        line,
                    ));
                    return tokens;
                }
                indents.pop();
                let at = (lnum, col(line, pos));
                tokens.push(Token::new(TokenKind::Dedent, "", at, at, line));
            }
        } else {
            continued = false;
        }

        while pos < max {
            let Some(caps) = pseudo.captures(&line[pos..]) else {
                let c = line[pos..].chars().next().map(char::len_utf8).unwrap_or(1);
                tokens.push(Token::new(
                    TokenKind::ErrorToken,
                    &line[pos..pos + c],
                    (lnum, col(line, pos)),
                    (lnum, col(line, pos + c)),
                    line,
                ));
                pos += c;
                continue;
            };
            let Some(group) = caps.get(1) else { break };
            let start = pos + group.start();
            let end = pos + group.end();
            pos = end;
            if start == end {
                continue;
            }
            let token = &line[start..end];
            let initial = token.chars().next().unwrap_or(' ');
            let spos = (lnum, col(line, start));
            let epos = (lnum, col(line, end));

            if initial.is_ascii_digit()
                || (initial == '.' && token != "." && token != "...")
            {
                tokens.push(Token::new(TokenKind::Number, token, spos, epos, line));
            } else if initial == '\r' || initial == '\n' {
                let kind = if paren_level > 0 { TokenKind::Nl } else { TokenKind::Newline };
                tokens.push(Token::new(kind, token, spos, epos, line));
            } else if initial == '#' {
                tokens.push(Token::new(TokenKind::Comment, token, spos, epos, line));
            } else if token.ends_with("'''") || token.ends_with("\"\"\"") {
                let quote = quote_of(token);
                match match_string_end(&line[pos..], quote) {
                    Some(len) => {
                        pos += len;
                        tokens.push(Token::new(
                            TokenKind::String,
                            &line[start..pos],
                            spos,
                            (lnum, col(line, pos)),
                            line,
                        ));
                    }
                    None => {
                        pending = Some(PendingString {
                            text: line[start..].to_string(),
                            start: spos,
                            lines: line.to_string(),
                            quote: quote.to_string(),
                            needs_continuation: false,
                        });
                        continue 'lines;
                    }
                }
            } else if token.ends_with('\'')
                || token.ends_with('"')
                || (token.ends_with('\n') && is_string_start(token))
            {
                if token.ends_with('\n') {
                    pending = Some(PendingString {
                        text: line[start..].to_string(),
                        start: spos,
                        lines: line.to_string(),
                        quote: quote_of(token).to_string(),
                        needs_continuation: true,
                    });
                    continue 'lines;
                }
                tokens.push(Token::new(TokenKind::String, token, spos, epos, line));
            } else if super::is_identifier_text(&initial.to_string()) {
                tokens.push(Token::new(TokenKind::Name, token, spos, epos, line));
            } else if initial == '\\' {
                continued = true;
            } else {
                match initial {
                    '(' | '[' | '{' => paren_level += 1,
                    ')' | ']' | '}' => paren_level = paren_level.saturating_sub(1),
                    _ => {}
                }
                tokens.push(Token::new(TokenKind::Op, token, spos, epos, line));
            }
        }
    }

    if let Some(string) = pending {
        trace!(start = ?string.start, "EOF in multi-line string");
        return tokens;
    }
    if trailing_blank.is_none() && (paren_level > 0 || continued) {
        trace!("EOF in multi-line statement");
        return tokens;
    }

    let last_line = lines.last().copied().unwrap_or("");
    let last_row = if trailing_blank.is_some() { lnum.saturating_sub(1) } else { lnum };
    let ends_statement = tokens
        .last()
        .map(|t: &Token| !matches!(t.kind, TokenKind::Newline | TokenKind::Nl))
        .unwrap_or(false);
    if trailing_blank.is_none()
        && !last_line.is_empty()
        && !last_line.ends_with('\n')
        && !last_line.ends_with('\r')
        && ends_statement
    {
        let width = col(last_line, last_line.len());
        tokens.push(Token::new(
            TokenKind::Newline,
            "",
            (last_row, width),
            (last_row, width + 1),
            "",
        ));
    }

    let end_row = last_row + 1;
    for _ in 1..indents.len() {
        tokens.push(Token::new(TokenKind::Dedent, "", (end_row, 0), (end_row, 0), ""));
    }
    match trailing_blank {
        // A last line made only of blanks is carried by the end marker.
        Some(blank) => {
            let width = col(blank, blank.len());
            tokens.push(Token::new(
                TokenKind::EndMarker,
                "",
                (end_row, width),
                (end_row, width),
                blank,
            ));
        }
        // Blanks after the last token of an unterminated line.
        None => {
            let covering = tokens
                .iter()
                .rev()
                .find(|t| t.end_row() == last_row && !t.text.is_empty())
                .map(|t| t.end_col());
            let rest = super::char_slice(last_line, covering.unwrap_or(0), usize::MAX);
            let text = if !last_line.ends_with('\n') && rest.trim().is_empty() { rest } else { "" };
            tokens.push(Token::new(TokenKind::EndMarker, text, (end_row, 0), (end_row, 0), ""));
        }
    }
    tokens
}

fn is_string_start(token: &str) -> bool {
    let body = token.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    body.starts_with('\'') || body.starts_with('"')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::untokenize;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_statement() {
        let tokens = tokenize("a = 1\n");
        assert_eq!(
            kinds("a = 1\n"),
            vec![
                TokenKind::Name,
                TokenKind::Op,
                TokenKind::Number,
                TokenKind::Newline,
                TokenKind::EndMarker
            ]
        );
        assert_eq!(tokens[2].start, (1, 4));
        assert_eq!(tokens[2].end, (1, 5));
    }

    #[test]
    fn test_indent_and_dedent() {
        let source = "if x:\n    y = 1\nz = 2\n";
        let tokens = tokenize(source);
        let indent = tokens.iter().find(|t| t.kind == TokenKind::Indent).unwrap();
        assert_eq!(indent.text, "    ");
        assert_eq!(indent.start, (2, 0));
        let dedent = tokens.iter().find(|t| t.kind == TokenKind::Dedent).unwrap();
        assert_eq!(dedent.start, (3, 0));
        assert_eq!(untokenize(&tokens), source);
    }

    #[test]
    fn test_nl_inside_brackets() {
        let tokens = tokenize("a = [1,\n     2]\n");
        let nl = tokens.iter().find(|t| t.kind == TokenKind::Nl).unwrap();
        assert_eq!(nl.start, (1, 7));
    }

    #[test]
    fn test_comment_line() {
        let tokens = tokenize("# hello\nx\n");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].text, "# hello");
        assert_eq!(tokens[1].kind, TokenKind::Nl);
    }

    #[test]
    fn test_triple_quoted_string() {
        let source = "s = '''one\ntwo'''\nt = 1\n";
        let tokens = tokenize(source);
        let string = tokens.iter().find(|t| t.is_string()).unwrap();
        assert_eq!(string.text, "'''one\ntwo'''");
        assert_eq!(string.start, (1, 4));
        assert_eq!(string.end, (2, 6));
        assert_eq!(untokenize(&tokens), source);
    }

    #[test]
    fn test_prefixed_strings() {
        let tokens = tokenize("x = f'{a}' + rb\"b\"\n");
        let strings: Vec<&str> = tokens.iter().filter(|t| t.is_string()).map(|t| t.as_str()).collect();
        assert_eq!(strings, vec!["f'{a}'", "rb\"b\""]);
    }

    #[test]
    fn test_unterminated_quote_is_error_token() {
        let tokens = tokenize("x = 'abc\n");
        assert!(tokens.iter().any(|t| t.is_error() && t.text == "'"));
        assert!(tokens.iter().any(|t| t.text == "abc"));
    }

    #[test]
    fn test_unclosed_bracket_returns_partial_tokens() {
        let tokens = tokenize("a = [1, 2, 3");
        let texts: Vec<&str> = tokens.iter().map(|t| t.as_str()).collect();
        assert_eq!(texts, vec!["a", "=", "[", "1", ",", "2", ",", "3"]);
    }

    #[test]
    fn test_octal_like_number_splits() {
        let tokens = tokenize("x = 0777\n");
        assert_eq!(tokens[2].text, "0");
        assert_eq!(tokens[3].text, "777");
    }

    #[test]
    fn test_missing_final_newline() {
        let tokens = tokenize("x = 1");
        let newline = tokens.iter().find(|t| t.kind == TokenKind::Newline).unwrap();
        assert_eq!(newline.text, "");
        assert_eq!(newline.start, (1, 5));
        assert_eq!(untokenize(&tokens), "x = 1");
    }

    #[test]
    fn test_trailing_blank_line_round_trip() {
        for source in ["x = 1\n   ", "x = 1   ", "\t", "if a:\n    b\n  \t", "a\n\\\n   ", "x = 1 + \\\n  "] {
            assert_eq!(untokenize(&tokenize(source)), source, "source: {:?}", source);
        }
    }

    #[test]
    fn test_bad_dedent_stops() {
        let tokens = tokenize("if x:\n    a\n  b\n");
        let last = tokens.last().unwrap();
        assert_eq!(last.text, "b");
        assert_eq!(last.start, (3, 2));
    }

    #[test]
    fn test_unicode_columns() {
        let tokens = tokenize("é = 'ü' + x\n");
        let x = tokens.iter().find(|t| t.text == "x").unwrap();
        assert_eq!(x.start, (1, 10));
    }

    #[test]
    fn test_stray_characters() {
        let tokens = tokenize("a = b $ c\n");
        assert!(tokens.iter().any(|t| t.is_error() && t.text == "$"));
        assert!(tokens.iter().any(|t| t.text == "c"));
    }
}
