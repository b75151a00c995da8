use super::{tokenize, untokenize, Token};

const ASSIGNMENT_OPS: &[&str] = &[
    "=", "+=", "-=", "*=", "@=", "/=", "//=", "%=", "**=", ">>=", "<<=", "&=", "^=", "|=", ":=",
];
const BITWISE_OPS: &[&str] = &["^", "&", "|", "<<", ">>", "~"];
const COMPARISON_OPS: &[&str] = &["<", ">", "<=", ">=", "==", "!="];
const MATH_OPS: &[&str] = &["+", "-", "*", "**", "@", "/", "//", "%"];

/// Assignment or augmented assignment.
pub fn is_assignment(op: &str) -> bool {
    ASSIGNMENT_OPS.contains(&op)
}

pub fn is_bitwise(op: &str) -> bool {
    BITWISE_OPS.contains(&op)
}

pub fn is_comparison(op: &str) -> bool {
    COMPARISON_OPS.contains(&op)
}

/// Operators usable as binary operators in arithmetic.
pub fn is_math_op(op: &str) -> bool {
    MATH_OPS.contains(&op)
}

/// Anything that is, or could be part of, an assignment, arithmetic,
/// bitwise or comparison operator.
pub fn is_operator(op: &str) -> bool {
    is_assignment(op) || is_bitwise(op) || is_comparison(op) || is_math_op(op) || op == "!" || op == ":"
}

/// Token covering (row, column), with its index.
pub fn find_token_by_position(tokens: &[Token], row: usize, column: usize) -> Option<(usize, &Token)> {
    tokens.iter().enumerate().find(|(_, tok)| {
        tok.start_row() <= row
            && row <= tok.end_row()
            && tok.start_col() <= column
            && column < tok.end_col()
    })
}

/// Drops comments and tokens whose text is blank.
pub fn remove_meaningless_tokens(tokens: &[Token]) -> Vec<Token> {
    tokens
        .iter()
        .filter(|tok| !tok.text.trim().is_empty() && !tok.is_comment())
        .cloned()
        .collect()
}

pub fn get_significant_tokens(source: &str) -> Vec<Token> {
    remove_meaningless_tokens(&tokenize(source))
}

/// Tokens grouped by the row on which they start.
pub fn get_lines(source: &str) -> Vec<Vec<Token>> {
    let mut lines: Vec<Vec<Token>> = Vec::new();
    let mut current_row = None;
    for token in tokenize(source) {
        if current_row != Some(token.start_row()) {
            current_row = Some(token.start_row());
            lines.push(Vec::new());
        }
        if let Some(line) = lines.last_mut() {
            line.push(token);
        }
    }
    lines
}

pub fn strip_comment(line: &str) -> String {
    let tokens: Vec<Token> = tokenize(line).into_iter().filter(|t| !t.is_comment()).collect();
    untokenize(&tokens)
}

/// Index of the first occurrence of `sub`'s significant tokens, as a
/// contiguous run, inside `main`'s.
pub fn find_substring_index(main: &str, sub: &str) -> Option<usize> {
    let main_tokens: Vec<String> = get_significant_tokens(main).into_iter().map(|t| t.text).collect();
    let sub_tokens: Vec<String> = get_significant_tokens(sub).into_iter().map(|t| t.text).collect();
    if sub_tokens.is_empty() {
        return None;
    }
    main_tokens
        .windows(sub_tokens.len())
        .position(|window| window == sub_tokens.as_slice())
}
