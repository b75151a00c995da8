//! Whole-source scans for bracket problems
//!
//! Both scans walk every token of the file up to the reported position.
//! They are coarser than the statement analyzers and only run once those
//! have all declined.

use super::{cause, marked_line, marked_pair};
use crate::analysis::registry::Registry;
use crate::analysis::{AnalyzerResult, SyntaxContext};
use crate::locale::Translator;
use crate::statement::{matching_brackets, name_bracket, no_unclosed_brackets};
use crate::tokens::{tokenize, Token};
use crate::tr;
use smallvec::SmallVec;

type BracketStack<'a> = SmallVec<[&'a Token; 8]>;

pub fn register(registry: &mut Registry) {
    registry
        .add_scanner("mismatched_brackets", scan_mismatched_brackets)
        .add_scanner("missing_bracket", scan_missing_bracket);
}

fn scan_mismatched_brackets(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let statement = ctx.statement;
    let (Some(line), Some(offset)) = (statement.linenumber, statement.offset) else {
        return Ok(None);
    };
    Ok(look_for_mismatched_brackets(ctx.t, &statement.source_lines, line, offset).map(crate::analysis::CauseEntry::new))
}

fn scan_missing_bracket(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let statement = ctx.statement;
    let (Some(line), Some(offset)) = (statement.linenumber, statement.offset) else {
        return Ok(None);
    };
    match look_for_missing_bracket(ctx.t, &statement.source_lines, line, offset) {
        Some(text) => cause(text),
        None => Ok(None),
    }
}

/// A closing bracket, before (`max_line`, `offset`), that matches nothing or
/// the wrong opening bracket.
pub fn look_for_mismatched_brackets(t: &Translator, lines: &[String], max_line: usize, offset: usize) -> Option<String> {
    let tokens = tokenize(&lines.concat());
    let mut brackets = BracketStack::new();
    for token in &tokens {
        if (token.start_row() == max_line && token.start_col() > offset) || token.start_row() > max_line {
            return None;
        }
        if token.is_opening_bracket() {
            brackets.push(token);
        } else if token.is_closing_bracket() {
            let Some(open) = brackets.pop() else {
                let mut text = tr!(
                    t,
                    "The closing {bracket} on line {linenumber} does not match anything.\n",
                    bracket = name_bracket(t, token.as_str()),
                    linenumber = token.start_row()
                );
                text.push_str(&marked_line(lines, token.start_row(), token.start_col(), '^'));
                return Some(text);
            };
            if !matching_brackets(open.as_str(), token.as_str()) {
                let mut text = tr!(
                    t,
                    "The closing {bracket} on line {close_lineno} does not match the opening {open_bracket} on line {open_lineno}.\n",
                    bracket = name_bracket(t, token.as_str()),
                    close_lineno = token.start_row(),
                    open_bracket = name_bracket(t, open.as_str()),
                    open_lineno = open.start_row()
                );
                text.push_str(&marked_pair(lines, open.start, token.start));
                return Some(text);
            }
        }
    }
    None
}

/// An opening bracket still open at (`max_line`, `offset`). Also catches
/// `=` used instead of `:` inside a dict literal.
pub fn look_for_missing_bracket(t: &Translator, lines: &[String], max_line: usize, offset: usize) -> Option<String> {
    let tokens = tokenize(&lines.concat());
    let mut brackets = BracketStack::new();
    let mut previous: Option<&Token> = None;
    let mut will_be_previous: Option<&Token> = None;

    for token in &tokens {
        if will_be_previous.is_some() {
            previous = will_be_previous;
        }
        if token.text.is_empty() {
            continue;
        }
        will_be_previous = Some(token);

        if (token.start_row() == max_line && token.start_col() >= offset) || token.start_row() > max_line {
            let after_equal = previous.is_some_and(|prev| *prev == "=") || *token == "=";
            if after_equal && brackets.last().is_some_and(|open| **open == "{") {
                return Some(tr!(
                    t,
                    "It is possible that you used an equal sign `=` instead of a colon `:`\nto assign values to keys in a dict\nbefore or at the position indicated by --> and ^.\n"
                ));
            }
            break;
        }

        if token.is_opening_bracket() {
            brackets.push(token);
        } else if token.is_closing_bracket() {
            let open = brackets.pop()?;
            if !matching_brackets(open.as_str(), token.as_str()) {
                return None;
            }
        }
    }

    let bracket = brackets.pop()?;
    let mut text = tr!(
        t,
        "The opening {bracket} on line {linenumber} is not closed.\n",
        bracket = name_bracket(t, bracket.as_str()),
        linenumber = bracket.start_row()
    );
    text.push_str(&marked_line(lines, bracket.start_row(), bracket.start_col(), '|'));

    let before_is_item = previous.is_some_and(|prev| prev.is_number() || prev.is_identifier() || prev.is_string());
    if no_unclosed_brackets(&tokens) && before_is_item {
        text.push_str(&match bracket.as_str() {
            "(" => tr!(t, "It is also possible that you forgot a comma between items in a tuple, \nor between function arguments, \nbefore the position indicated by --> and ^.\n"),
            "[" => tr!(t, "It is also possible that you forgot a comma between items in a list\nbefore the position indicated by --> and ^.\n"),
            _ => tr!(t, "It is also possible that you forgot a comma between items in a set or dict\nbefore the position indicated by --> and ^.\n"),
        });
    }
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(source: &str) -> Vec<String> {
        source.split_inclusive('\n').map(str::to_string).collect()
    }

    #[test]
    fn test_mismatched() {
        let t = Translator::english();
        let text = look_for_mismatched_brackets(&t, &lines("a = (1, 2]\n"), 1, 10).unwrap();
        assert!(text.starts_with(
            "The closing square bracket `]` on line 1 does not match the opening parenthesis `(` on line 1.\n"
        ));
    }

    #[test]
    fn test_unmatched_closing() {
        let t = Translator::english();
        let text = look_for_mismatched_brackets(&t, &lines("a = 1)\n"), 1, 6).unwrap();
        assert!(text.starts_with("The closing parenthesis `)` on line 1 does not match anything.\n"));
    }

    #[test]
    fn test_missing_bracket() {
        let t = Translator::english();
        let text = look_for_missing_bracket(&t, &lines("a = [1, 2, 3\nb = 4\n"), 2, 1).unwrap();
        assert!(text.starts_with("The opening square bracket `[` on line 1 is not closed.\n"));
        assert!(text.contains("    1: a = [1, 2, 3\n"));
    }

    #[test]
    fn test_equal_in_dict() {
        let t = Translator::english();
        let text = look_for_missing_bracket(&t, &lines("ages = {'Alice' = 22}\n"), 1, 17).unwrap();
        assert!(text.contains("equal sign `=` instead of a colon `:`"));
    }

    #[test]
    fn test_balanced_source() {
        let t = Translator::english();
        assert!(look_for_missing_bracket(&t, &lines("a = [1]\nb = 2 3\n"), 2, 7).is_none());
        assert!(look_for_mismatched_brackets(&t, &lines("a = [1]\n"), 1, 7).is_none());
    }
}
