//! Candidate fixes
//!
//! Analyzers only offer a suggestion after rebuilding the statement with the
//! change applied and confirming that the result parses.

use super::same_token;
use crate::parser::is_valid_module;
use crate::tokens::{strip_comment, untokenize, Token};
use tracing::trace;

/// Statement text with `original` replaced by `replacement`, trimmed.
pub fn replace_token(tokens: &[Token], original: &Token, replacement: &str) -> String {
    modify_source(tokens, original, replacement, "", "")
}

/// Statement text with `prepend`/`append` added around `original`.
pub fn modify_token(tokens: &[Token], original: &Token, prepend: &str, append: &str) -> String {
    modify_source(tokens, original, &original.text, prepend, append)
}

fn modify_source(tokens: &[Token], original: &Token, replace: &str, prepend: &str, append: &str) -> String {
    // A blank token stands for a missing neighbour; nothing sensible to edit.
    if tokens.is_empty() || original.text.trim().is_empty() {
        return "?".to_string();
    }
    let new_tokens: Vec<Token> = tokens
        .iter()
        .map(|tok| {
            if same_token(tok, original) {
                tok.with_text(format!("{}{}{}", prepend, replace, append))
            } else {
                tok.clone()
            }
        })
        .collect();
    untokenize(&new_tokens).trim().to_string()
}

/// Replaces two tokens at once.
pub fn replace_two_tokens(
    tokens: &[Token],
    first: &Token,
    first_text: &str,
    second: &Token,
    second_text: &str,
) -> String {
    let new_tokens: Vec<Token> = tokens
        .iter()
        .map(|tok| {
            if same_token(tok, first) {
                tok.with_text(first_text)
            } else if same_token(tok, second) {
                tok.with_text(second_text)
            } else {
                tok.clone()
            }
        })
        .collect();
    untokenize(&new_tokens).trim().to_string()
}

const IF_BLOCK: &str = "\nif True:\n    pass\n";
const DEF_BLOCK: &str = "\ndef test():\n    ";
const TRY_BLOCK: &str = "\ntry:\n    pass\n";

/// Whether a single statement would parse, once wrapped in whatever
/// enclosing block it needs (`elif` needs an `if`, `return` a function...).
pub fn check_statement(statement: &str) -> bool {
    if statement.is_empty() {
        return false;
    }
    let mut statement = strip_comment(statement).trim_end().to_string();
    if statement.ends_with(':') {
        statement.push_str(" pass");
    }

    let wrapped = if statement.starts_with("elif") || statement.starts_with("else") {
        format!("{}{}\n", IF_BLOCK, statement)
    } else if statement.starts_with("return") || statement.starts_with("yield") {
        format!("{}{}\n", DEF_BLOCK, statement)
    } else if statement.starts_with("except") || statement.starts_with("finally") {
        format!("{}{}\n", TRY_BLOCK, statement)
    } else {
        statement
    };
    let valid = is_valid_module(&wrapped);
    trace!(statement = %wrapped, valid, "candidate checked");
    valid
}
