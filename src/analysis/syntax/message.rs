//! Analyzers keyed on the parser message
//!
//! These run whenever Python says something more specific than
//! "invalid syntax". Several newer messages carry the same information as a
//! statement-level diagnosis; those delegate to the statement catalog.

use super::scanner::{look_for_mismatched_brackets, look_for_missing_bracket};
use super::{cause, cause_with_hint, statement};
use crate::analysis::registry::Registry;
use crate::analysis::{AnalyzerResult, SyntaxContext};
use crate::errors::ExplainError;
use crate::locale::Translator;
use crate::parser::parse_expression;
use crate::pattern::Pattern;
use crate::statement::name_bracket;
use crate::tokens::{get_significant_tokens, is_identifier_text};
use crate::tr;
use once_cell::sync::Lazy;
use rustpython_parser::ast::{Constant, Expr, UnaryOp};

/// Quotation marks that look like `'` or `"` but are not.
pub const BAD_QUOTATION_MARKS: &[&str] = &[
    "«", "»", "‹", "›", "„", "“", "‟", "”", "’", "❝", "❞", "❮", "❯", "⹂", "〝", "〞", "＂", "‚", "‘",
    "‛", "❛", "❜", "❟",
];

const ASSIGN_TO_KEYWORD: &[&str] = &[
    "can't assign to keyword",
    "assignment to keyword",
    "cannot assign to keyword",
    "cannot assign to None",
    "cannot assign to True",
    "cannot assign to False",
    "cannot assign to __debug__",
    "can't assign to Ellipsis",
    "cannot assign to Ellipsis",
    "cannot assign to ellipsis",
    "cannot use named assignment with True",
    "cannot use named assignment with False",
    "cannot use named assignment with None",
    "cannot use named assignment with Ellipsis",
    "cannot use assignment expressions with True",
    "cannot use assignment expressions with False",
    "cannot use assignment expressions with None",
    "cannot use assignment expressions with Ellipsis",
];

static MISMATCHED_WITH_LINE: Lazy<Pattern> = Lazy::new(|| {
    Pattern::new(r"closing parenthesis '(.)' does not match opening parenthesis '(.)' on line (\d+)")
});
static MISMATCHED: Lazy<Pattern> = Lazy::new(|| {
    Pattern::new(r"closing parenthesis '(.)' does not match opening parenthesis '(.)'")
});
static NEVER_CLOSED: Lazy<Pattern> = Lazy::new(|| Pattern::new(r"^'(.)' was never closed$"));

pub fn register(registry: &mut Registry) {
    registry
        .add_message("assign_to_keyword", assign_to_keyword)
        .add_message("assign_to_conditional_expression", assign_to_conditional_expression)
        .add_message("assign_to_function_call", assign_to_function_call)
        .add_message("assign_to_generator_expression", assign_to_generator_expression)
        .add_message("assign_to_f_expression", assign_to_f_expression)
        .add_message("assign_to_literal", assign_to_literal)
        .add_message("assign_to_operator", assign_to_operator)
        .add_message("both_nonlocal_and_global", both_nonlocal_and_global)
        .add_message("break_outside_loop", break_outside_loop)
        .add_message("continue_outside_loop", continue_outside_loop)
        .add_message("delete_function_call", delete_function_call)
        .add_message("duplicate_argument_in_function_definition", duplicate_argument)
        .add_message("eol_while_scanning_string_literal", eol_while_scanning_string_literal)
        .add_message("expression_cannot_contain_assignment", expression_cannot_contain_assignment)
        .add_message("generator_expression_must_be_parenthesized", generator_expression_must_be_parenthesized)
        .add_message("keyword_argument_repeated", keyword_argument_repeated)
        .add_message("keyword_cannot_be_expression", keyword_cannot_be_expression)
        .add_message("invalid_character_in_identifier", invalid_character_in_identifier)
        .add_message("mismatched_parenthesis", mismatched_parenthesis)
        .add_message("unterminated_f_string", unterminated_f_string)
        .add_message("name_is_parameter_and_global", name_is_parameter_and_global)
        .add_message("name_assigned_to_prior_global", name_assigned_to_prior_global)
        .add_message("name_used_prior_global", name_used_prior_global)
        .add_message("name_assigned_to_prior_nonlocal", name_assigned_to_prior_nonlocal)
        .add_message("name_is_parameter_and_nonlocal", name_is_parameter_and_nonlocal)
        .add_message("name_used_prior_nonlocal", name_used_prior_nonlocal)
        .add_message("nonlocal_at_module_level", nonlocal_at_module_level)
        .add_message("no_binding_for_nonlocal", no_binding_for_nonlocal)
        .add_message("unexpected_character_after_continuation", unexpected_character_after_continuation)
        .add_message("unexpected_eof_while_parsing", unexpected_eof_while_parsing)
        .add_message("unmatched_parenthesis", unmatched_parenthesis)
        .add_message("positional_argument_follows_keyword_arg", positional_argument_follows_keyword_arg)
        .add_message("non_default_arg_follows_default_arg", non_default_arg_follows_default_arg)
        .add_message("python2_print", python2_print)
        .add_message("bracket_never_closed", bracket_never_closed)
        .add_message("expected_colon", expected_colon)
        .add_message("perhaps_forgot_comma", perhaps_forgot_comma)
        .add_message("invalid_decimal_literal", invalid_decimal_literal);
}

/// Physical line where the error was reported, right-trimmed.
fn offending_line(ctx: &SyntaxContext<'_>) -> String {
    let statement = ctx.statement;
    statement
        .linenumber
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| statement.source_lines.get(i))
        .unwrap_or(&statement.bad_line)
        .trim_end()
        .to_string()
}

/// Message without the "here. Maybe you meant ..." tail newer versions add.
fn base_message(message: &str) -> &str {
    message.split(" here.").next().unwrap_or(message)
}

/// Text between the first pair of single quotes.
fn quoted_name(message: &str) -> Option<&str> {
    message.split('\'').nth(1)
}

fn assign_to_keyword(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let message = base_message(ctx.message);
    if !ASSIGN_TO_KEYWORD.contains(&message) {
        return Ok(None);
    }

    let word = if message.to_lowercase().contains("ellipsis") {
        "Ellipsis (...)".to_string()
    } else {
        get_significant_tokens(&offending_line(ctx))
            .into_iter()
            .find(|tok| tok.is_keyword() || *tok == "__debug__")
            .map(|tok| tok.text)
            .ok_or_else(|| ExplainError::analyzer("assign_to_keyword", "no keyword on the offending line"))?
    };

    let hint = tr!(t, "You cannot assign a value to `{keyword}`.", keyword = word);
    let text = if ["None", "True", "False", "__debug__", "Ellipsis (...)"].contains(&word.as_str()) {
        tr!(t, "`{keyword}` is a constant in Python; you cannot assign it a value.\n\n", keyword = word)
    } else {
        tr!(
            t,
            "You were trying to assign a value to the Python keyword `{keyword}`.\nThis is not allowed.\n\n",
            keyword = word
        )
    };
    cause_with_hint(text, hint)
}

fn assign_to_conditional_expression(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let message = base_message(ctx.message);
    if message != "can't assign to conditional expression" && message != "cannot assign to conditional expression" {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "On the left-hand side of an equal sign, you have a\nconditional expression instead of the name of a variable.\nA conditional expression has the following form:\n\n    variable = object if condition else other_object"
    ))
}

fn assign_to_function_call(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let message = base_message(ctx.message);
    if message != "can't assign to function call" && message != "cannot assign to function call" {
        return Ok(None);
    }
    let line = offending_line(ctx);
    if line.matches('=').count() > 1 {
        let fn_call = tr!(t, "my_function(...)");
        let value = tr!(t, "some value");
        return cause(tr!(
            t,
            "You wrote an expression like\n\n    {fn_call} = {value}\n\nwhere `{fn_call}`, on the left-hand side of the equal sign, is\na function call and not the name of a variable.\n",
            fn_call = fn_call,
            value = value
        ));
    }
    let mut parts = line.splitn(2, '=');
    let fn_call = parts.next().unwrap_or_default().trim();
    let value = parts.next().unwrap_or_default().trim();
    cause(tr!(
        t,
        "You wrote the expression\n\n    {fn_call} = {value}\n\nwhere `{fn_call}`, on the left-hand side of the equal sign, either is\nor includes a function call and is not simply the name of a variable.\n",
        fn_call = fn_call,
        value = value
    ))
}

fn assign_to_generator_expression(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let message = base_message(ctx.message);
    if message != "can't assign to generator expression" && message != "cannot assign to generator expression" {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "On the left-hand side of an equal sign, you have a\ngenerator expression instead of the name of a variable.\n"
    ))
}

fn assign_to_f_expression(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if base_message(ctx.message) != "cannot assign to f-string expression" {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "You wrote an expression that has an f-string\non the left-hand side of the equal sign.\nAn f-string should only appear on the right-hand side of the equal sign.\n"
    ))
}

/// "of type `int`" and the like, for literals that parse.
fn what_kind_of_literal(t: &Translator, literal: &str) -> Option<String> {
    let expr = parse_expression(literal.trim()).ok()?;
    literal_kind(t, &expr)
}

fn literal_kind(t: &Translator, expr: &Expr) -> Option<String> {
    let text = match expr {
        Expr::Constant(constant) => match &constant.value {
            Constant::Int(_) | Constant::Bool(_) => tr!(t, "of type `int`"),
            Constant::Str(_) => tr!(t, "of type `str`"),
            Constant::Float(_) => tr!(t, "of type `float`"),
            Constant::Complex { .. } => tr!(t, "of type `complex`"),
            Constant::Tuple(_) => tr!(t, "of type `tuple`"),
            _ => return None,
        },
        Expr::UnaryOp(unary) if matches!(unary.op, UnaryOp::USub | UnaryOp::UAdd) => {
            return literal_kind(t, &unary.operand)
        }
        Expr::Dict(_) => tr!(t, "of type `dict`"),
        Expr::Tuple(_) => tr!(t, "of type `tuple`"),
        Expr::List(_) => tr!(t, "of type `list`"),
        Expr::Set(_) => tr!(t, "of type `set`"),
        _ => return None,
    };
    Some(text)
}

fn assign_to_literal(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let message = base_message(ctx.message);
    if !matches!(
        message,
        "can't assign to literal" | "cannot assign to literal" | "cannot assign to set display" | "cannot assign to dict display" | "cannot assign to dict literal" | "cannot assign to set literal"
    ) {
        return Ok(None);
    }

    let line = offending_line(ctx);
    let parts: Vec<&str> = line.split('=').collect();
    let (literal, name) = if parts.len() == 2 {
        (Some(parts[0].trim().to_string()), parts[1].trim().to_string())
    } else {
        (None, tr!(t, "variable_name"))
    };

    let suggest = match &literal {
        Some(literal) if is_identifier_text(&name) => {
            tr!(t, " Perhaps you meant to write:\n\n    {name} = {literal}\n\n", name = name, literal = literal)
        }
        _ => "\n".to_string(),
    };

    let of_type = if message.contains("set") {
        what_kind_of_literal(t, "{1}")
    } else if message.contains("dict") {
        what_kind_of_literal(t, "{1:2}")
    } else {
        literal.as_deref().and_then(|literal| what_kind_of_literal(t, literal))
    }
    .unwrap_or_default();
    let literal = literal.unwrap_or_else(|| "...".to_string());

    let mut text = tr!(
        t,
        "You wrote an expression like\n\n    {literal} = {name}\nwhere `{literal}`, on the left-hand side of the equal sign,\nis or includes an actual object {of_type}\nand is not simply the name of a variable.",
        literal = literal,
        name = name,
        of_type = of_type
    );
    text.push_str(&suggest);
    cause(text)
}

fn assign_to_operator(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let message = base_message(ctx.message);
    if message != "can't assign to operator" && message != "cannot assign to operator" && message != "cannot assign to expression" {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "You wrote an expression that includes some mathematical operations\non the left-hand side of the equal sign which should be\nonly used to assign a value to a variable."
    ))
}

fn both_nonlocal_and_global(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("is nonlocal and global") {
        return Ok(None);
    }
    let name = quoted_name(ctx.message).unwrap_or_default();
    cause(tr!(
        ctx.t,
        "You declared `{name}` as being both a global and nonlocal variable.\nA variable can be global, or nonlocal, but not both at the same time.\n",
        name = name
    ))
}

fn break_outside_loop(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("'break' outside loop") {
        return Ok(None);
    }
    cause(tr!(ctx.t, "The Python keyword `break` can only be used inside a for loop or inside a while loop.\n"))
}

fn continue_outside_loop(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("'continue' not properly in loop") {
        return Ok(None);
    }
    cause(tr!(ctx.t, "The Python keyword `continue` can only be used inside a for loop or inside a while loop.\n"))
}

fn delete_function_call(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let message = base_message(ctx.message);
    if message != "can't delete function call" && message != "cannot delete function call" {
        return Ok(None);
    }
    let mut line = offending_line(ctx).trim().to_string();
    let tokens = get_significant_tokens(&line);
    let is_simple_call = tokens.len() >= 4
        && tokens[0] == "del"
        && tokens[1].is_name()
        && tokens[2] == "("
        && tokens.last().is_some_and(|tok| *tok == ")");
    let correct = if is_simple_call {
        format!("del {}", tokens[1])
    } else {
        line = "del function()".to_string();
        "del function".to_string()
    };
    cause(tr!(
        ctx.t,
        "You attempted to delete a function call\n\n    {line}\ninstead of deleting the function's name\n\n    {correct}\n",
        line = line,
        correct = correct
    ))
}

fn duplicate_argument(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !(ctx.message.contains("duplicate argument") && ctx.message.contains("function definition")) {
        return Ok(None);
    }
    let name = quoted_name(ctx.message).unwrap_or_default();
    cause(tr!(
        ctx.t,
        "You have defined a function repeating the keyword argument\n\n    {name}\ntwice; each keyword argument should appear only once in a function definition.\n",
        name = name
    ))
}

fn eol_while_scanning_string_literal(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !(ctx.message.contains("EOL while scanning string literal") || ctx.message.starts_with("unterminated string literal")) {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "You starting writing a string with a single or double quote\nbut never ended the string with another quote on that line.\n"
    ))
}

fn expression_cannot_contain_assignment(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("expression cannot contain assignment, perhaps you meant") {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "One of the following two possibilities could be the cause:\n1. You meant to do a comparison with == and wrote = instead.\n2. You called a function with a named argument:\n\n       a_function(invalid=something)\n\nwhere `invalid` is not a valid variable name in Python\neither because it starts with a number, or is a string,\nor contains a period, etc.\n\n"
    ))
}

fn generator_expression_must_be_parenthesized(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("Generator expression must be parenthesized") {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "You are using a generator expression, something of the form\n    `x for x in thing`\nYou must add parentheses enclosing that expression.\n"
    ))
}

fn keyword_argument_repeated(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("keyword argument repeated") {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "You have called a function repeating the same keyword argument.\nEach keyword argument should appear only once in a function call.\n"
    ))
}

fn keyword_cannot_be_expression(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("keyword can't be an expression") {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "You likely called a function with a named argument:\n\n   `a_function(invalid=something)`\n\nwhere `invalid` is not a valid variable name in Python\neither because it starts with a number, or is a string,\nor contains a period, etc.\n\n"
    ))
}

fn invalid_character_in_identifier(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    if !ctx.message.contains("invalid character") {
        return Ok(None);
    }
    let quote_hint = || tr!(t, "Did you mean to use a normal quote character, `'` or `\"`?");

    if let Some(bad_character) = quoted_name(ctx.message) {
        let result = tr!(
            t,
            "Python indicates that you used the unicode character `{bad_character}`\nwhich is not allowed.\n",
            bad_character = bad_character
        );
        if !BAD_QUOTATION_MARKS.contains(&bad_character) {
            return cause(result);
        }
        let mut text = tr!(t, "Did you use copy-paste?\n");
        text.push_str(&result);
        text.push_str(&tr!(
            t,
            "I suspect that you used a fancy unicode quotation mark\ninstead of a normal single or double quote for a string.\n"
        ));
        return cause_with_hint(text, quote_hint());
    }

    let line = offending_line(ctx);
    if BAD_QUOTATION_MARKS.iter().any(|quote| line.contains(quote)) {
        return cause_with_hint(
            tr!(
                t,
                "Python indicates that you used some unicode characters not allowed\nas part of a variable name; this includes many emojis.\nHowever, I suspect that you used a fancy unicode quotation mark\ninstead of a normal single or double quote for a string.\nThis can happen if you copy-pasted code.\n\n"
            ),
            quote_hint(),
        );
    }
    cause(tr!(
        t,
        "You likely used some unicode character that is not allowed\nas part of a variable name in Python.\nThis includes many emojis.\n\n"
    ))
}

fn mismatched_parenthesis(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let (closing, opening, lineno) = if let Some(caps) = MISMATCHED_WITH_LINE.captures(ctx.message) {
        (caps[1].to_string(), caps[2].to_string(), Some(caps[3].to_string()))
    } else if let Some(caps) = MISMATCHED.captures(ctx.message) {
        (caps[1].to_string(), caps[2].to_string(), None)
    } else {
        return Ok(None);
    };

    let mut response = match lineno {
        Some(lineno) => tr!(
            t,
            "Python tells us that the closing `{closing}` on the last line shown\ndoes not match the opening `{opening}` on line {lineno}.\n\n",
            closing = closing,
            opening = opening,
            lineno = lineno
        ),
        None => tr!(
            t,
            "Python tells us that the closing `{closing}` on the last line shown\ndoes not match the opening `{opening}`.\n\n",
            closing = closing,
            opening = opening
        ),
    };

    let statement = ctx.statement;
    if let (Some(line), Some(offset)) = (statement.linenumber, statement.offset) {
        if let Some(more) = look_for_mismatched_brackets(t, &statement.source_lines, line, offset) {
            response.push_str(&tr!(t, "I will attempt to be give a bit more information.\n\n"));
            response.push_str(&more);
        }
    }
    cause(response)
}

fn unterminated_f_string(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("f-string: unterminated string") {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "Inside an f-string, which is a string prefixed by the letter f, \nyou have another string, which starts with either a\nsingle quote (') or double quote (\"), without a matching closing one.\n"
    ))
}

fn name_is_parameter_and_global(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("is parameter and global") {
        return Ok(None);
    }
    let name = quoted_name(ctx.message).unwrap_or_default();
    let line = offending_line(ctx);
    let newline = if line.contains(name) && line.contains("global") {
        line.trim().to_string()
    } else {
        format!("global {}", name)
    };
    cause(tr!(
        ctx.t,
        "You are including the statement\n\n    `{newline}`\n\nindicating that `{name}` is a variable defined outside a function.\nYou are also using the same `{name}` as an argument for that\nfunction, thus indicating that it should be variable known only\ninside that function, which is the contrary of what `global` implied.\n",
        newline = newline,
        name = name
    ))
}

fn name_assigned_to_prior_global(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("is assigned to before global declaration") {
        return Ok(None);
    }
    let name = quoted_name(ctx.message).unwrap_or_default();
    cause(tr!(
        ctx.t,
        "You assigned a value to the variable `{name}`\nbefore declaring it as a global variable.\n",
        name = name
    ))
}

fn name_used_prior_global(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("is used prior to global declaration") {
        return Ok(None);
    }
    let name = quoted_name(ctx.message).unwrap_or_default();
    cause(tr!(ctx.t, "You used the variable `{name}`\nbefore declaring it as a global variable.\n", name = name))
}

fn name_assigned_to_prior_nonlocal(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("is assigned to before nonlocal declaration") {
        return Ok(None);
    }
    let name = quoted_name(ctx.message).unwrap_or_default();
    cause_with_hint(
        tr!(
            ctx.t,
            "You assigned a value to the variable `{name}`\nbefore declaring it as a nonlocal variable.\n",
            name = name
        ),
        tr!(ctx.t, "Did you forget to add `nonlocal`?"),
    )
}

fn name_is_parameter_and_nonlocal(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("is parameter and nonlocal") {
        return Ok(None);
    }
    let name = quoted_name(ctx.message).unwrap_or_default();
    cause(tr!(
        ctx.t,
        "You used `{name}` as a parameter for a function\nbefore declaring it also as a nonlocal variable:\n`{name}` cannot be both at the same time.\n",
        name = name
    ))
}

fn name_used_prior_nonlocal(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("is used prior to nonlocal declaration") {
        return Ok(None);
    }
    let name = quoted_name(ctx.message).unwrap_or_default();
    cause_with_hint(
        tr!(ctx.t, "You used the variable `{name}`\nbefore declaring it as a nonlocal variable.\n", name = name),
        tr!(ctx.t, "Did you forget to write `nonlocal` first?"),
    )
}

fn nonlocal_at_module_level(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("nonlocal declaration not allowed at module level") {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "You used the nonlocal keyword at a module level.\nThe nonlocal keyword refers to a variable inside a function\ngiven a value outside that function."
    ))
}

fn no_binding_for_nonlocal(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("no binding for nonlocal") {
        return Ok(None);
    }
    let name = quoted_name(ctx.message).unwrap_or_default();
    cause(tr!(
        ctx.t,
        "You declared the variable `{name}` as being a\nnonlocal variable but it cannot be found.\n",
        name = name
    ))
}

fn unexpected_character_after_continuation(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("unexpected character after line continuation character") {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "You are using the continuation character `\\` outside of a string,\nand it is followed by some other character(s).\nI am guessing that you forgot to enclose some content in a string.\n\n"
    ))
}

fn unexpected_eof_while_parsing(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    if !ctx.message.contains("unexpected EOF while parsing") {
        return Ok(None);
    }
    let mut response = tr!(t, "Python tells us that it reached the end of the file\nand expected more content.\n\n");
    let statement = ctx.statement;
    if let Some(line) = statement.linenumber {
        let offset = statement.offset.unwrap_or_default();
        if let Some(more) = look_for_missing_bracket(t, &statement.source_lines, line, offset) {
            response.push_str(&tr!(t, "I will attempt to be give a bit more information.\n\n"));
            response.push_str(&more);
        }
    }
    cause(response)
}

fn unmatched_parenthesis(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let bracket = match ctx.message {
        "unmatched ')'" => ")",
        "unmatched ']'" => "]",
        "unmatched '}'" => "}",
        _ => return Ok(None),
    };
    cause(tr!(
        ctx.t,
        "The closing {bracket} on line {linenumber} does not match anything.\n",
        bracket = name_bracket(ctx.t, bracket),
        linenumber = ctx.statement.linenumber.unwrap_or_default()
    ))
}

fn positional_argument_follows_keyword_arg(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("positional argument follows keyword argument") {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "In Python, you can call functions with only positional arguments\n\n    test(1, 2, 3)\n\nor only keyword arguments\n\n    test(a=1, b=2, c=3)\n\nor a combination of the two\n\n    test(1, 2, c=3)\n\nbut with the keyword arguments appearing after all the positional ones.\nAccording to Python, you used positional arguments after keyword ones.\n"
    ))
}

fn non_default_arg_follows_default_arg(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !(ctx.message.contains("non-default argument follows default argument")
        || ctx.message.contains("parameter without a default follows parameter with a default"))
    {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "In Python, you can define functions with only positional arguments\n\n    def test(a, b, c): ...\n\nor only keyword arguments\n\n    def test(a=1, b=2, c=3): ...\n\nor a combination of the two\n\n    def test(a, b, c=3): ...\n\nbut with the keyword arguments appearing after all the positional ones.\nAccording to Python, you used positional arguments after keyword ones.\n"
    ))
}

fn python2_print(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(rest) = ctx.message.strip_prefix("Missing parentheses in call to 'print'. Did you mean print(") else {
        return Ok(None);
    };
    let arguments = rest.strip_suffix(")?").unwrap_or(rest);
    cause(tr!(
        ctx.t,
        "Perhaps you need to type\n\n     print({message})\n\nIn older version of Python, `print` was a keyword.\nNow, `print` is a function; you need to use parentheses to call it.\n",
        message = arguments
    ))
}

fn bracket_never_closed(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !NEVER_CLOSED.is_match(ctx.message) {
        return Ok(None);
    }
    statement::unclosed_bracket(ctx)
}

fn expected_colon(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if ctx.message != "expected ':'" {
        return Ok(None);
    }
    statement::missing_colon(ctx)
}

fn perhaps_forgot_comma(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if ctx.message != "invalid syntax. Perhaps you forgot a comma?" {
        return Ok(None);
    }
    statement::missing_comma_or_operator(ctx)
}

fn invalid_decimal_literal(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if ctx.message != "invalid decimal literal" {
        return Ok(None);
    }
    statement::invalid_name(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Registry;
    use crate::snapshot::SyntaxDetails;
    use crate::statement::Statement;

    fn explain(message: &str, source: &str, line: usize, offset: usize) -> (Option<&'static str>, String, Option<String>) {
        let t = Translator::english();
        let lines: Vec<String> = source.split_inclusive('\n').map(str::to_string).collect();
        let details = SyntaxDetails::new("<string>", line, offset);
        let statement = Statement::new(&details, message, &lines[line - 1], lines.clone());
        let ctx = SyntaxContext { statement: &statement, message, type_name: "SyntaxError", t: &t };
        let diagnosis = Registry::builtin().diagnose_syntax(&ctx);
        (diagnosis.analyzer, diagnosis.entry.cause, diagnosis.entry.suggest)
    }

    #[test]
    fn test_assign_to_keyword() {
        let (name, text, hint) = explain("cannot assign to True", "True = 1\n", 1, 1);
        assert_eq!(name, Some("assign_to_keyword"));
        assert_eq!(text, "`True` is a constant in Python; you cannot assign it a value.\n\n");
        assert_eq!(hint.as_deref(), Some("You cannot assign a value to `True`."));
    }

    #[test]
    fn test_assign_to_literal() {
        let (name, text, _) = explain("cannot assign to literal", "1 = x\n", 1, 1);
        assert_eq!(name, Some("assign_to_literal"));
        assert!(text.contains("    1 = x\n"));
        assert!(text.contains("actual object of type `int`"));
        assert!(text.contains("Perhaps you meant to write:\n\n    x = 1\n"));
    }

    #[test]
    fn test_assign_to_literal_newer_message() {
        let message = "cannot assign to literal here. Maybe you meant '==' instead of '='?";
        let (name, _, _) = explain(message, "1 = x\n", 1, 1);
        assert_eq!(name, Some("assign_to_literal"));
    }

    #[test]
    fn test_break_outside_loop() {
        let (_, text, _) = explain("'break' outside loop", "break\n", 1, 1);
        assert!(text.starts_with("The Python keyword `break` can only be used"));
    }

    #[test]
    fn test_nonlocal_names() {
        let (_, text, hint) = explain("name 'q' is used prior to nonlocal declaration", "nonlocal q\n", 1, 1);
        assert!(text.contains("You used the variable `q`"));
        assert_eq!(hint.as_deref(), Some("Did you forget to write `nonlocal` first?"));
    }

    #[test]
    fn test_fancy_quote() {
        let (_, text, hint) = explain("invalid character '«' (U+00AB)", "a = «hello»\n", 1, 5);
        assert!(text.starts_with("Did you use copy-paste?\n"));
        assert!(hint.unwrap().contains("normal quote"));
    }

    #[test]
    fn test_other_invalid_character() {
        let (_, text, hint) = explain("invalid character '€' (U+20AC)", "a = 3€\n", 1, 6);
        assert!(text.contains("the unicode character `€`"));
        assert!(hint.is_none());
    }

    #[test]
    fn test_mismatched_parenthesis() {
        let message = "closing parenthesis ']' does not match opening parenthesis '(' on line 1";
        let (_, text, _) = explain(message, "a = (1, 2]\n", 1, 10);
        assert!(text.starts_with("Python tells us that the closing `]` on the last line shown\ndoes not match the opening `(` on line 1.\n"));
        assert!(text.contains("I will attempt to be give a bit more information."));
    }

    #[test]
    fn test_unmatched() {
        let (_, text, _) = explain("unmatched ')'", "a = 1)\n", 1, 6);
        assert_eq!(text, "The closing parenthesis `)` on line 1 does not match anything.\n");
    }

    #[test]
    fn test_generator_expression() {
        let (_, text, _) = explain("Generator expression must be parenthesized", "f(x for x in y, 1)\n", 1, 3);
        assert!(text.starts_with("You are using a generator expression"));
    }

    #[test]
    fn test_python2_print() {
        let message = "Missing parentheses in call to 'print'. Did you mean print(\"hello\")?";
        let (_, text, _) = explain(message, "print \"hello\"\n", 1, 1);
        assert!(text.contains("     print(\"hello\")\n"));
    }

    #[test]
    fn test_delete_function_call() {
        let (_, text, _) = explain("cannot delete function call", "del f(a)\n", 1, 5);
        assert!(text.contains("    del f(a)\n"));
        assert!(text.contains("    del f\n"));
    }

    #[test]
    fn test_unknown_message_gets_notice() {
        let (_, text, _) = explain("something Python never said", "x = = 1\n", 1, 5);
        assert!(text.starts_with("Python gave us the following informative message"));
    }
}
