//! Syntax errors in a `def` statement.
//!
//! A valid definition has at least five tokens: `def name ( ) :`. The
//! analyzers below rely on this to tell the cases apart. `async def` is
//! analyzed as if the `async` were not there.

use super::{cause, cause_with_hint};
use crate::analysis::registry::Registry;
use crate::analysis::{AnalyzerResult, SyntaxContext};
use crate::locale::Translator;
use crate::statement::{check_statement, modify_token, replace_token, replace_two_tokens, same_token, Statement};
use crate::tokens::{is_operator, Token};
use crate::tr;
use std::borrow::Cow;

pub fn register(registry: &mut Registry) {
    registry
        .add_def_statement("def_begin_code_block", def_begin_code_block)
        .add_def_statement("def_missing_parens", missing_parens)
        .add_def_statement("def_missing_parens_2", missing_parens_2)
        .add_def_statement("def_missing_colon", missing_colon)
        .add_def_statement("def_not_enough_tokens", not_enough_tokens)
        .add_def_statement("keyword_as_function_name", keyword_as_function_name)
        .add_def_statement("other_invalid_function_names", other_invalid_function_names)
        .add_def_statement("function_definition_missing_name", function_definition_missing_name)
        .add_def_statement("keyword_not_allowed_as_function_argument", keyword_not_allowed_as_function_argument)
        .add_def_statement("dotted_name_not_allowed", dotted_name_not_allowed)
        .add_def_statement("positional_arguments_in_def", positional_arguments_in_def)
        .add_def_statement("keyword_arguments_in_def", keyword_arguments_in_def)
        .add_def_statement("number_as_argument", number_as_argument)
        .add_def_statement("string_as_argument", string_as_argument)
        .add_def_statement("tuple_as_argument", tuple_as_argument)
        .add_def_statement("list_as_argument", list_as_argument)
        .add_def_statement("dict_or_set_as_argument", dict_or_set_as_argument)
        .add_def_statement("operator_as_argument", operator_as_argument)
        .add_def_statement("arg_after_kwarg", arg_after_kwarg);
}

fn def_correct_syntax(t: &Translator) -> String {
    let mut text = tr!(t, "The correct syntax is:\n\n    def name ( ... ):");
    text.push('\n');
    text
}

/// The statement as the analyzers want to see it: `async def` folded into
/// `def`. `None` for statements these analyzers should leave alone, such as
/// `def = 3`.
fn def_view(statement: &Statement) -> Option<Cow<'_, Statement>> {
    let second = statement.tokens.get(1)?;
    if *second == "=" || *second == ":=" {
        return None;
    }
    if statement.first_token != "async" {
        return Some(Cow::Borrowed(statement));
    }
    if *second != "def" || statement.bad_token_index < 2 {
        return None;
    }
    Some(Cow::Owned(remove_async(statement)))
}

fn remove_async(statement: &Statement) -> Statement {
    let async_token = statement.tokens[0].clone();
    let def_token = statement.tokens[1].clone();
    let mut folded = statement.clone();

    folded.tokens.remove(1);
    folded.tokens[0] = async_token.with_text("def");
    folded.first_token = folded.tokens[0].clone();
    folded.statement_tokens = statement
        .statement_tokens
        .iter()
        .map(|tok| {
            if same_token(tok, &async_token) {
                tok.with_text("def")
            } else if same_token(tok, &def_token) {
                tok.with_text("")
            } else {
                tok.clone()
            }
        })
        .collect();
    folded.bad_token_index -= 1;
    folded.nb_tokens -= 1;
    folded.prev_token = folded.tokens[folded.bad_token_index - 1].clone();
    folded.next_token = folded.tokens.get(folded.bad_token_index + 1).cloned().unwrap_or_else(Token::meaningless);
    folded
}

fn parens_hint(t: &Translator, new_statement: &str) -> AnalyzerResult {
    cause_with_hint(
        tr!(
            t,
            "Perhaps you forgot to include parentheses.\nYou might have meant to write\n\n    {line}\n",
            line = new_statement
        ),
        tr!(t, "Did you forget parentheses?\n"),
    )
}

fn def_begin_code_block(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    let t = ctx.t;
    if s.nb_tokens > 2 || s.bad_token != ":" {
        return Ok(None);
    }
    let mut text = if s.first_token.start_col() == 0 {
        tr!(t, "You tried to define a function and did not use the correct syntax.\n")
    } else {
        tr!(t, "You tried to define a function or method and did not use the correct syntax.\n")
    };
    text.push_str(&def_correct_syntax(t));
    cause(text)
}

fn missing_parens(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    let third_is_bad = s.tokens.get(2).is_some_and(|tok| *tok == s.bad_token);
    if s.bad_token != ":" && s.nb_tokens >= 3 && !third_is_bad {
        return Ok(None);
    }
    let new_statement = modify_token(&s.statement_tokens, &s.bad_token, "()", "");
    if check_statement(&new_statement) {
        return parens_hint(ctx.t, &new_statement);
    }
    Ok(None)
}

fn missing_parens_2(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    if s.bad_token_index != 2 && s.last_token != ":" {
        return Ok(None);
    }
    let new_statement = replace_two_tokens(
        &s.statement_tokens,
        &s.bad_token,
        &format!("({}", s.bad_token),
        &s.last_token,
        "):",
    );
    if check_statement(&new_statement) {
        return parens_hint(ctx.t, &new_statement);
    }
    Ok(None)
}

fn missing_colon(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    let t = ctx.t;
    if s.last_token == ":" || s.bad_token != s.last_token || !s.statement_brackets.is_empty() {
        return Ok(None);
    }
    let mut text = tr!(t, "A function definition statement must end with a colon.\n");

    if check_statement(&replace_token(&s.statement_tokens, &s.bad_token, ":")) {
        text.push_str(&tr!(t, "You wrote `{bad}` instead of a colon.\n", bad = s.bad_token));
        return cause_with_hint(text, tr!(t, "Did you forget to write a colon?\n"));
    }

    if check_statement(&replace_token(&s.statement_tokens, &s.bad_token, "")) {
        text.push_str(&tr!(t, "A block of code must come after the colon.\n"));
        text.push_str(&tr!(t, "If you remove `{bad}`, this will fix the problem.\n", bad = s.bad_token));
        return cause_with_hint(text, tr!(t, "Did you write something by mistake after the colon?\n"));
    }

    if check_statement(&modify_token(&s.statement_tokens, &s.bad_token, "", ":")) {
        return cause_with_hint(text, tr!(t, "Did you forget to write a colon?\n"));
    }
    Ok(None)
}

fn not_enough_tokens(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    let t = ctx.t;
    if s.nb_tokens >= 5 {
        return Ok(None);
    }
    let mut text = tr!(t, "You did not write a valid function definition.\n");
    if s.bad_token == "(" && s.bad_token_index == 1 {
        let new_statement = replace_token(&s.tokens, &s.bad_token, "name");
        if check_statement(&new_statement) {
            let hint = tr!(t, "You forgot to name your function.\n");
            return cause_with_hint(format!("{}{}", hint, def_correct_syntax(t)), hint);
        }
    }
    text.push_str(&def_correct_syntax(t));
    cause(text)
}

fn keyword_as_function_name(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    let t = ctx.t;
    if !(s.bad_token.is_keyword() && same_token(&s.prev_token, &s.first_token)) {
        return Ok(None);
    }
    let mut text = tr!(t, "You tried to use the Python keyword `{kwd}` as a function name.\n", kwd = s.bad_token);
    if !check_statement(&replace_token(&s.statement_tokens, &s.bad_token, "name")) {
        text.push('\n');
        text.push_str(&tr!(t, "There are more syntax errors later in your code.\n"));
    }
    cause_with_hint(text, tr!(t, "You cannot use a Python keyword as a function name.\n"))
}

fn other_invalid_function_names(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    let t = ctx.t;
    if s.bad_token.is_identifier() || !same_token(&s.prev_token, &s.first_token) {
        return Ok(None);
    }
    if !check_statement(&replace_token(&s.statement_tokens, &s.bad_token, "name")) {
        return Ok(None);
    }
    let mut text = tr!(
        t,
        "The name of a function must be a valid Python identifier,\nthat is a name that begins with a letter or an underscore character, `_`,\nand which contains only letters, digits or the underscore character.\n"
    );
    let hint = if s.bad_token.is_string() {
        text.push_str(&tr!(t, "You attempted to use a string as a function name.\n"));
        text.clone()
    } else {
        tr!(t, "You wrote an invalid function name.\n")
    };
    cause_with_hint(text, hint)
}

fn function_definition_missing_name(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    let t = ctx.t;
    if !(s.first_token == "def" && s.bad_token == "(" && same_token(&s.prev_token, &s.first_token)) {
        return Ok(None);
    }
    let mut text = tr!(t, "You forgot to name your function.\n");
    if !check_statement(&replace_token(&s.tokens, &s.bad_token, "name (")) {
        text.push_str(&tr!(t, "However, there are some other syntax errors in your code.\n"));
    }
    text.push_str(&def_correct_syntax(t));
    cause(text)
}

fn keyword_not_allowed_as_function_argument(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    if !(s.bad_token.is_keyword() && !s.begin_brackets.is_empty()) {
        return Ok(None);
    }
    if !check_statement(&replace_token(&s.statement_tokens, &s.bad_token, "name")) {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "I am guessing that you tried to use the Python keyword\n`{kwd}` as an argument in the definition of a function\nwhere an identifier (variable name) was expected.\n",
        kwd = s.bad_token
    ))
}

fn dotted_name_not_allowed(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    if s.bad_token != "." {
        return Ok(None);
    }
    let text = if s.bad_token_index > 3 {
        tr!(ctx.t, "You cannot use dotted names as function arguments.\n")
    } else {
        tr!(ctx.t, "You cannot use dots in function names.\n")
    };
    cause_with_hint(text.clone(), text)
}

fn positional_arguments_in_def(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    let t = ctx.t;
    if !(s.bad_token == "/" && s.prev_token.is_in(&["(", ","])) {
        return Ok(None);
    }
    let meaning = tr!(t, "`/` indicates that the previous arguments in a function definition\nare positional arguments.\n");

    let mut prev_tok: Option<&Token> = None;
    for tok in &s.tokens[..s.bad_token_index] {
        if *tok == "=" || *tok == "**" {
            let text = meaning + &tr!(t, "You have some keyword arguments that appear before\nthe symbol `/`.\n");
            return cause_with_hint(text, tr!(t, "Keyword arguments must appear after the `/` symbol.\n"));
        }
        if prev_tok.is_some_and(|prev| *prev == "*") {
            if *tok == "," {
                let text = meaning
                    + &tr!(
                        t,
                        "However, `*` indicates that the arguments\nthat follow must be keyword arguments.\nWhen they are used together, `/` must appear before `*`.\n"
                    );
                return cause_with_hint(text, tr!(t, "`*` must appear after `/` in a function definition.\n"));
            }
            let hint = tr!(t, "`*{name}` must appear after `/` in a function definition.\n", name = tok);
            return cause_with_hint(meaning + &hint, hint);
        } else if *tok == "/" && prev_tok.is_some_and(|prev| *prev == ",") {
            let text = tr!(t, "You can only use `/` once in a function definition.\n");
            return cause_with_hint(text.clone(), text);
        }
        prev_tok = Some(tok);
    }
    Ok(None)
}

fn keyword_arguments_in_def(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    let t = ctx.t;
    if !(s.bad_token == "*" && s.prev_token == ",") {
        return Ok(None);
    }
    for tok in &s.tokens[..s.bad_token_index] {
        if *tok == "*" {
            let text = tr!(t, "You can only use `*` once in a function definition.\n");
            return cause_with_hint(text.clone(), text);
        }
        if *tok == "**" || *tok == "=" {
            let text = if s.next_token.is_identifier() {
                tr!(t, "`*{name}` must appear before any keyword argument.\n", name = s.next_token)
            } else {
                tr!(t, "Keyword arguments must appear after the `*` operator.\n")
            };
            return cause_with_hint(text.clone(), text);
        }
    }
    Ok(None)
}

fn after_open_or_comma(s: &Statement) -> bool {
    s.prev_token.is_in(&["(", ","])
}

fn number_as_argument(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    if !(s.bad_token.is_number() && after_open_or_comma(&s)) {
        return Ok(None);
    }
    cause_with_hint(
        tr!(
            ctx.t,
            "You used a number as an argument when defining a function.\nYou can only use identifiers (variable names) as function arguments.\n"
        ),
        tr!(ctx.t, "You cannot use numbers as function arguments.\n"),
    )
}

fn string_as_argument(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    if !(s.bad_token.is_string() && after_open_or_comma(&s)) {
        return Ok(None);
    }
    cause_with_hint(
        tr!(
            ctx.t,
            "You used a string as an argument when defining a function.\nYou can only use identifiers (variable names) as function arguments.\n"
        ),
        tr!(ctx.t, "You cannot use strings as function arguments.\n"),
    )
}

fn tuple_as_argument(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    if !(s.bad_token == "(" && after_open_or_comma(&s)) {
        return Ok(None);
    }
    let hint = tr!(ctx.t, "You cannot have explicit tuples as function arguments.\n");
    let text = hint.clone()
        + &tr!(
            ctx.t,
            "You can only use identifiers (variable names) as function arguments.\nAssign any tuple to a parameter and unpack it\nwithin the body of the function.\n"
        );
    cause_with_hint(text, hint)
}

fn list_as_argument(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    if !(s.bad_token == "[" && after_open_or_comma(&s)) {
        return Ok(None);
    }
    let hint = tr!(ctx.t, "You cannot have explicit lists as function arguments.\n");
    let text = hint.clone() + &tr!(ctx.t, "You can only use identifiers (variable names) as function arguments.\n");
    cause_with_hint(text, hint)
}

fn dict_or_set_as_argument(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    if !(s.bad_token == "{" && after_open_or_comma(&s)) {
        return Ok(None);
    }
    let hint = tr!(ctx.t, "You cannot have any explicit dict or set as function arguments.\n");
    let text = hint.clone() + &tr!(ctx.t, "You can only use identifiers (variable names) as function arguments.\n");
    cause_with_hint(text, hint)
}

fn operator_as_argument(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    let t = ctx.t;
    if !is_operator(s.bad_token.as_str()) || s.prev_token == "def" {
        return Ok(None);
    }
    let hint = if after_open_or_comma(&s) {
        tr!(t, "You cannot have operators as function arguments.\n")
    } else {
        let new_statement = replace_token(&s.statement_tokens, &s.bad_token, ",");
        if check_statement(&new_statement) {
            return cause_with_hint(
                tr!(
                    t,
                    "I suspect you made a typo and wrote `{op}` instead of a comma.\nThe following statement contains no syntax error:\n\n    {new_statement}",
                    op = s.bad_token,
                    new_statement = new_statement
                ),
                tr!(t, "Did you mean to write a comma?\n"),
            );
        }
        tr!(t, "You cannot use operators with function arguments.\n")
    };
    let text = hint.clone() + &tr!(t, "You can only use identifiers (variable names) as function arguments.\n");
    cause_with_hint(text, hint)
}

fn arg_after_kwarg(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let Some(s) = def_view(ctx.statement) else { return Ok(None) };
    let t = ctx.t;
    if !(s.bad_token.is_identifier() && s.prev_token == "," && s.next_token == ",") {
        return Ok(None);
    }
    if s.tokens[..s.bad_token_index].iter().any(|tok| *tok == "**" || *tok == "=") {
        let hint = tr!(t, "Positional arguments must come before keyword arguments.\n");
        let text = hint.clone()
            + &tr!(
                t,
                "`{arg}` is a positional argument that appears after one or more\nkeyword arguments in your function definition.\n",
                arg = s.bad_token
            );
        return cause_with_hint(text, hint);
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::locate_statement;

    fn diagnose(source: &str, offset: usize) -> (Option<&'static str>, String, Option<String>) {
        let t = Translator::english();
        let lines: Vec<String> = source.split_inclusive('\n').map(str::to_string).collect();
        let statement = locate_statement(&lines, Some(1), Some(offset));
        let ctx = SyntaxContext { statement: &statement, message: "invalid syntax", type_name: "SyntaxError", t: &t };
        let mut registry = Registry::empty();
        register(&mut registry);
        let diagnosis = registry.diagnose_syntax(&ctx);
        (diagnosis.analyzer, diagnosis.entry.cause, diagnosis.entry.suggest)
    }

    #[test]
    fn test_missing_parens() {
        let (name, text, hint) = diagnose("def test:\n    pass\n", 9);
        assert_eq!(name, Some("def_missing_parens"));
        assert!(text.contains("    def test():"));
        assert_eq!(hint.as_deref(), Some("Did you forget parentheses?\n"));
    }

    #[test]
    fn test_missing_colon() {
        let (name, _, hint) = diagnose("def test()\n", 10);
        assert_eq!(name, Some("def_missing_colon"));
        assert_eq!(hint.as_deref(), Some("Did you forget to write a colon?\n"));
    }

    #[test]
    fn test_keyword_as_name() {
        let (name, text, _) = diagnose("def pass():\n    pass\n", 5);
        assert_eq!(name, Some("keyword_as_function_name"));
        assert!(text.starts_with("You tried to use the Python keyword `pass` as a function name.\n"));
    }

    #[test]
    fn test_missing_name() {
        let (_, text, _) = diagnose("def (a, b):\n    pass\n", 5);
        assert!(text.contains("You forgot to name your function.\n"));
        assert!(text.ends_with("    def name ( ... ):\n"));
    }

    #[test]
    fn test_number_as_argument() {
        let (name, _, hint) = diagnose("def f(1, x):\n    pass\n", 7);
        assert_eq!(name, Some("number_as_argument"));
        assert_eq!(hint.as_deref(), Some("You cannot use numbers as function arguments.\n"));
    }

    #[test]
    fn test_async_is_folded() {
        let (name, text, _) = diagnose("async def test:\n    pass\n", 15);
        assert_eq!(name, Some("def_missing_parens"));
        assert!(text.contains("test():"));
    }

    #[test]
    fn test_dotted_argument() {
        let (name, text, _) = diagnose("def f(a.b):\n    pass\n", 8);
        assert_eq!(name, Some("dotted_name_not_allowed"));
        assert_eq!(text, "You cannot use dotted names as function arguments.\n");
    }
}
