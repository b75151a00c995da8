//! Analyzers for a statement flagged with "invalid syntax"
//!
//! Order matters: earlier analyzers look for narrow, unambiguous patterns
//! and later ones for broader guesses. `unclosed_bracket` must stay last.

use super::{cause, cause_with_hint, marked_line, marked_pair, more_errors};
use crate::analysis::registry::Registry;
use crate::analysis::similar::{get_similar_words, list_to_string};
use crate::analysis::{AnalyzerResult, SyntaxContext};
use crate::locale::Translator;
use crate::statement::{check_statement, modify_token, name_bracket, replace_token, replace_two_tokens, same_token, Statement};
use crate::tokens::{is_operator, tokenize, Token, KEYWORDS};
use crate::tr;

pub fn register(registry: &mut Registry) {
    registry
        .add_statement("mismatched_brackets", mismatched_brackets)
        .add_statement("copy_pasted_code", copy_pasted_code)
        .add_statement("detect_backquote", detect_backquote)
        .add_statement("wrong_code_block", wrong_code_block)
        .add_statement("keyword_as_attribute", keyword_as_attribute)
        .add_statement("confused_elif", confused_elif)
        .add_statement("import_from", import_from)
        .add_statement("misplaced_quote", misplaced_quote)
        .add_statement("inverted_operators", inverted_operators)
        .add_statement("consecutive_operators", consecutive_operators)
        .add_statement("walrus_instead_of_equal", walrus_instead_of_equal)
        .add_statement("assign_instead_of_equal", assign_instead_of_equal)
        .add_statement("print_as_statement", print_as_statement)
        .add_statement("calling_python_or_pip", calling_python_or_pip)
        .add_statement("dot_followed_by_bracket", dot_followed_by_bracket)
        .add_statement("raise_single_exception", raise_single_exception)
        .add_statement("invalid_double_star_operator", invalid_double_star_operator)
        .add_statement("missing_colon", missing_colon)
        .add_statement("semi_colon_instead_of_comma", semi_colon_instead_of_comma)
        .add_statement("invalid_hexadecimal", invalid_hexadecimal)
        .add_statement("invalid_octal", invalid_octal)
        .add_statement("invalid_name", invalid_name)
        .add_statement("general_fstring_problem", general_fstring_problem)
        .add_statement("assign_to_a_keyword", assign_to_a_keyword)
        .add_statement("lambda_with_paren", lambda_with_paren)
        .add_statement("wrong_type_declaration", wrong_type_declaration)
        .add_statement("missing_comma_before_string_in_dict", missing_comma_before_string_in_dict)
        .add_statement("missing_in_with_for", missing_in_with_for)
        .add_statement("missing_parens_for_range", missing_parens_for_range)
        .add_statement("comprehension_condition_or_tuple", comprehension_condition_or_tuple)
        .add_statement("parens_around_exceptions", parens_around_exceptions)
        .add_statement("current_is_misspelled_python_keyword", current_is_misspelled_python_keyword)
        .add_statement("previous_is_misspelled_python_keyword", previous_is_misspelled_python_keyword)
        .add_statement("space_in_variable_name", space_in_variable_name)
        .add_statement("impossible_binary_fstring", impossible_binary_fstring)
        .add_statement("missing_comma_or_operator", missing_comma_or_operator)
        .add_statement("equal_instead_of_colon_in_dict", equal_instead_of_colon_in_dict)
        .add_statement("and_instead_of_comma", and_instead_of_comma)
        .add_statement("from_import_as", from_import_as)
        .add_statement("duplicate_token", duplicate_token)
        .add_statement("extra_token", extra_token)
        .add_statement("unclosed_bracket", unclosed_bracket);
}

/// Newer parsers report a range; the token after the reported start is then
/// the one that matters.
fn highlighting(s: &Statement) -> bool {
    s.highlighted_tokens.as_ref().is_some_and(|h| !h.is_empty())
}

/// (bad token, token before it), shifted by one when a range is reported.
fn bad_and_previous(s: &Statement) -> (&Token, &Token) {
    if highlighting(s) {
        (&s.next_token, &s.bad_token)
    } else {
        (&s.bad_token, &s.prev_token)
    }
}

fn mismatched_brackets(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    let Some(end_bracket) = s.end_bracket.as_ref() else {
        return Ok(None);
    };
    if s.bad_token != s.last_token {
        return Ok(None);
    }

    if s.statement_brackets.is_empty() {
        let mut text = tr!(
            t,
            "The closing {bracket} on line {linenumber} does not match anything.\n",
            bracket = name_bracket(t, end_bracket.as_str()),
            linenumber = end_bracket.start_row()
        );
        text.push_str(&marked_line(&s.source_lines, end_bracket.start_row(), end_bracket.start_col(), '^'));
        return cause(text);
    }

    let Some(open_bracket) = s.begin_brackets.last() else {
        return Ok(None);
    };
    let mut text = tr!(
        t,
        "The closing {bracket} on line {close_lineno} does not match the opening {open_bracket} on line {open_lineno}.\n",
        bracket = name_bracket(t, end_bracket.as_str()),
        close_lineno = end_bracket.start_row(),
        open_bracket = name_bracket(t, open_bracket.as_str()),
        open_lineno = open_bracket.start_row()
    );
    text.push_str(&marked_pair(&s.source_lines, open_bracket.start, end_bracket.start));
    cause(text)
}

fn copy_pasted_code(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    let first = &s.first_token;
    let hint = || tr!(t, "Did you use copy-paste?\n");

    if *first == ">>" && same_token(first, &s.bad_token) && s.next_token == ">" {
        return cause_with_hint(
            tr!(
                t,
                "It looks like you copy-pasted code from an interactive interpreter.\nThe Python prompt, `>>>`, should not be included in your code.\n"
            ),
            hint(),
        );
    }
    if *first == "..." {
        let is_ellipsis = if s.highlighted_tokens.is_some() { &s.bad_token } else { &s.prev_token };
        if same_token(is_ellipsis, first) {
            return cause_with_hint(
                tr!(
                    t,
                    "It looks like you copy-pasted code from an interactive interpreter.\nThe Python prompt, `...`, should not be included in your code.\n"
                ),
                hint(),
            );
        }
    }
    Ok(None)
}

fn detect_backquote(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if ctx.statement.bad_token != "`" {
        return Ok(None);
    }
    cause_with_hint(
        tr!(
            ctx.t,
            "You are using the backquote character.\nEither you meant to write a single quote, ', or copied Python 2 code;\nin this latter case, use the function `repr(x)`."
        ),
        tr!(ctx.t, "You should not use the backquote character.\n"),
    )
}

fn wrong_code_block(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    if !(s.bad_token == ":" && s.nb_tokens == 2 && s.prev_token.is_in(&["if", "for", "while", "class"])) {
        return Ok(None);
    }
    let (text, hint) = match s.prev_token.as_str() {
        "if" => (
            tr!(t, "An `if` statement requires a condition:\n\n    if condition:\n        ...\n\n"),
            tr!(t, "You forgot to add a condition.\n"),
        ),
        "while" => (
            tr!(t, "A `while` loop requires a condition:\n\n    while condition:\n        ...\n\n"),
            tr!(t, "You forgot to add a condition.\n"),
        ),
        "for" => (
            tr!(t, "A `for` loop is an iteration over a sequence:\n\n    for element in sequence:\n        ...\n\n"),
            tr!(t, "A `for` loop requires at least 3 more terms.\n"),
        ),
        _ => (
            tr!(t, "A `class` statement requires a name:\n\n    class SomeName:\n        ...\n\n"),
            tr!(t, "A class needs a name.\n"),
        ),
    };
    cause_with_hint(text, hint)
}

fn keyword_as_attribute(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    if s.prev_token != "." || !s.bad_token.is_keyword() {
        return Ok(None);
    }
    cause_with_hint(
        tr!(ctx.t, "You cannot use the Python keyword `{word}` as an attribute.\n\n", word = s.bad_token),
        tr!(ctx.t, "`{word}` cannot be used as an attribute.\n", word = s.bad_token),
    )
}

fn confused_elif(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let name = if s.bad_token == "elseif" || s.prev_token == "elseif" {
        "elseif"
    } else if s.bad_token == "if" && s.prev_token == "else" {
        "else if"
    } else {
        return Ok(None);
    };
    cause_with_hint(
        tr!(ctx.t, "You likely meant to use Python's `elif` keyword\nbut wrote `{name}` instead.\n\n", name = name),
        tr!(ctx.t, "Perhaps you meant to write `elif`.\n"),
    )
}

fn import_from(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    if s.bad_token != "from" || s.tokens.first().map_or(true, |tok| *tok != "import") {
        return Ok(None);
    }
    let function = &s.prev_token;
    let module = &s.next_token;
    cause_with_hint(
        tr!(
            ctx.t,
            "You wrote something like\n\n    import {function} from {module}\ninstead of\n\n    from {module} import {function}\n\n\n",
            module = module,
            function = function
        ),
        tr!(ctx.t, "Did you mean `from {module} import {function}`?\n", module = module, function = function),
    )
}

fn misplaced_quote(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    if !s.prev_token.is_string() || !s.bad_token.is_identifier() {
        return Ok(None);
    }
    cause_with_hint(
        tr!(
            ctx.t,
            "There appears to be a Python identifier (variable name)\nimmediately following a string.\nI suspect that you were trying to use a quote inside a string\nthat was enclosed in quotes of the same kind.\n"
        ),
        tr!(ctx.t, "Perhaps you misplaced a quote.\n"),
    )
}

fn inverted_operators(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    let (prev, bad, next) = (&s.prev_token, &s.bad_token, &s.next_token);
    if !is_operator(bad.as_str()) {
        return Ok(None);
    }

    let (first, second) = if is_operator(prev.as_str())
        && is_operator(&format!("{}{}", bad, prev))
        && prev.immediately_before(bad)
    {
        (prev, bad)
    } else if is_operator(next.as_str()) && is_operator(&format!("{}{}", next, bad)) && bad.immediately_before(next) {
        (bad, next)
    } else {
        return Ok(None);
    };

    let correct = format!("{}{}", second, first);
    let wrong = format!("{}{}", first, second);
    let hint = tr!(t, "Did you write operators in an incorrect order?\n");
    let mut text = tr!(
        t,
        "It looks like you wrote two operators (`{first}` and `{second}`)\nin the wrong order: `{wrong}` instead of `{correct}`.\n",
        first = first,
        second = second,
        correct = correct,
        wrong = wrong
    );
    let new_statement = replace_two_tokens(&s.statement_tokens, first, &correct, second, "");
    if !check_statement(&new_statement) {
        text.push_str(&more_errors(t));
    }
    cause_with_hint(text, hint)
}

fn consecutive_operators(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    let (prev, bad) = (&s.prev_token, &s.bad_token);
    if !(is_operator(bad.as_str()) && is_operator(prev.as_str())) {
        return Ok(None);
    }

    if *bad == "=" && *prev == "==" {
        return cause_with_hint(
            tr!(
                t,
                "You wrote three equal signs in a row which is allowed in some\nprogramming languages, but not in Python. To check if two objects\nare equal, use two equal signs, `==`; to see if two names represent\nthe exact same object, use the operator `is`.\n"
            ),
            tr!(t, "Did you mean to use `is` instead of `===`?\n"),
        );
    }

    let mut text = if bad == prev {
        tr!(
            t,
            "You cannot have write the same operator, `{op}`, twice in a row.\nPerhaps you wrote one of them by mistake\nor forgot to write something between them.\n",
            op = prev
        )
    } else {
        tr!(
            t,
            "You cannot have these two operators, `{first}` and `{second}`,\nfollowing each other. Perhaps you wrote one of them by mistake\nor forgot to write something between them.\n",
            first = prev,
            second = bad
        )
    };
    let joined = format!("{}{}", prev, bad);
    if is_operator(&joined) {
        text.push_str(&tr!(
            t,
            "Or perhaps you included a space by mistake between the two operators\nand meant to write `{oper}` as a single operator.\n",
            oper = joined
        ));
    }
    cause(text)
}

fn walrus_instead_of_equal(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let walrus = if s.bad_token == ":=" {
        Some(&s.bad_token)
    } else {
        let end = (s.bad_token_index + 1).min(s.tokens.len());
        s.tokens[..end].iter().find(|tok| **tok == ":=")
    };
    let Some(walrus) = walrus else {
        return Ok(None);
    };
    if !check_statement(&replace_token(&s.statement_tokens, walrus, "=")) {
        return Ok(None);
    }
    cause_with_hint(
        tr!(
            ctx.t,
            "You use the augmented assignment operator `:=` where\nthe normal assignment operator `=` was required.\n"
        ),
        tr!(ctx.t, "Did you mean to use `=`?\n"),
    )
}

fn assign_instead_of_equal(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    let (bad_token, _) = bad_and_previous(s);
    if *bad_token != "=" || !s.first_token.is_in(&["if", "elif", "while"]) {
        return Ok(None);
    }

    let additional = if check_statement(&replace_token(&s.statement_tokens, bad_token, "==")) {
        String::new()
    } else {
        more_errors(t)
    };

    if !check_statement(&replace_token(&s.statement_tokens, bad_token, ":=")) {
        return cause_with_hint(
            tr!(t, "You likely used an assignment operator `=` instead of an equality operator `==`.\n") + &additional,
            tr!(t, "Perhaps you needed `==` instead of `=`.\n"),
        );
    }
    cause_with_hint(
        tr!(
            t,
            "You used an assignment operator `=`; perhaps you meant to use \nan equality operator, `==`, or the walrus operator `:=`.\n"
        ) + &additional,
        tr!(t, "Perhaps you needed `==` or `:=` instead of `=`.\n"),
    )
}

fn print_as_statement(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    let newer = s.bad_token == "print" && same_token(&s.bad_token, &s.first_token) && s.highlighted_tokens.is_some();
    let older = s.prev_token == "print" && same_token(&s.prev_token, &s.first_token) && s.bad_token != "(";
    if !(newer || older) {
        return Ok(None);
    }

    let bad_line = &s.bad_line;
    let new_line = if bad_line.matches('(').count() == bad_line.matches(')').count() {
        let mut arguments = bad_line.replacen("print", "", 1).trim().to_string();
        if arguments.chars().count() > 30 {
            let parts: Vec<&str> = arguments.split(' ').collect();
            arguments = format!("{} ... {}", parts[0], parts[parts.len() - 1]);
        }
        format!("print({})", arguments)
    } else {
        "print(...)".to_string()
    };
    cause_with_hint(
        tr!(
            t,
            "In older version of Python, `print` was a keyword.\nNow, `print` is a function; you need to use parentheses to call it.\n"
        ),
        tr!(t, "Did you mean `{new_line}`?\n", new_line = new_line),
    )
}

fn calling_python_or_pip(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    if !s.first_token.is_in(&["pip", "python", "python3"]) {
        return Ok(None);
    }
    let Some(second) = s.tokens.get(1) else {
        return Ok(None);
    };
    if is_operator(second.as_str()) && *second != "-" {
        return Ok(None);
    }

    if s.tokens.iter().any(|tok| *tok == "pip") {
        return cause_with_hint(
            tr!(
                t,
                "It looks as if you are attempting to use pip to install a module.\n`pip` is a command that needs to run in a terminal,\nnot from a Python interpreter.\n"
            ),
            tr!(t, "Pip cannot be used in a Python interpreter.\n"),
        );
    }
    cause(tr!(
        t,
        "I am guessing that you are attempting to use Python to run a program.\nYou must do so from a terminal and not from a Python interpreter.\n"
    ))
}

fn dot_followed_by_bracket(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    if !(s.bad_token.is_bracket() && s.prev_token == ".") {
        return Ok(None);
    }
    let mut text = tr!(t, "You cannot have a dot `.` followed by `{bracket}`.\n", bracket = s.bad_token);
    if check_statement(&replace_token(&s.statement_tokens, &s.prev_token, ",")) {
        text.push_str(&tr!(t, "Perhaps you need to replace the dot by a comma.\n"));
    }
    cause(text)
}

fn raise_single_exception(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    if s.first_token != "raise" || s.bad_token != "," || !s.prev_token.is_identifier() {
        return Ok(None);
    }
    cause(tr!(ctx.t, "It looks like you are trying to raise an exception using Python 2 syntax.\n"))
}

fn invalid_double_star_operator(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if ctx.statement.bad_token != "**" {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "The double star operator `**` is likely interpreted to mean that\ndict unpacking is to be used which is not allowed or does not make sense here.\n"
    ))
}

pub(crate) fn missing_colon(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    if s.last_token == ":" || s.bad_token != s.last_token {
        return Ok(None);
    }
    let name = &s.first_token;
    let block_keywords = ["async", "class", "def", "if", "elif", "else", "for", "while", "try", "except", "finally", "with"];
    if !name.is_in(&block_keywords) {
        return Ok(None);
    }
    if !check_statement(&modify_token(&s.statement_tokens, &s.bad_token, "", ":")) {
        return Ok(None);
    }

    let hint = tr!(t, "Did you forget a colon `:`?\n");
    if name.is_in(&["for", "while"]) {
        return cause_with_hint(
            tr!(t, "You wrote a `{for_while}` loop but\nforgot to add a colon `:` at the end\n\n", for_while = name),
            hint,
        );
    }
    cause_with_hint(
        tr!(t, "You wrote a statement beginning with\n`{name}` but forgot to add a colon `:` at the end.\n\n", name = name),
        hint,
    )
}

fn semi_colon_instead_of_comma(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    if s.bad_token != ";" {
        return Ok(None);
    }
    if check_statement(&replace_token(&s.statement_tokens, &s.bad_token, ",")) {
        return cause_with_hint(
            tr!(t, "You wrote a semi-colon, `;`, where a comma was expected.\n"),
            tr!(t, "Did you mean to write a comma?\n"),
        );
    }

    let mut new_statement = if s.last_token == ";" {
        replace_token(&s.statement_tokens, &s.last_token, "")
    } else {
        s.statement.clone()
    };
    loop {
        let tokens = tokenize(&new_statement);
        let Some(semi_colon) = tokens.iter().find(|tok| **tok == ";") else {
            break;
        };
        new_statement = replace_token(&tokens, semi_colon, ",");
    }
    if check_statement(&new_statement) {
        return cause_with_hint(
            tr!(t, "You wrote semi-colons, `;`, where commas were expected.\n"),
            tr!(t, "Did you mean to write commas?\n"),
        );
    }
    Ok(None)
}

fn first_char(token: &Token) -> String {
    token.text.chars().next().map(String::from).unwrap_or_default()
}

fn invalid_hexadecimal(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let (wrong, prev) = bad_and_previous(s);
    if !(prev.immediately_before(wrong) && prev.text.to_lowercase().starts_with("0x")) {
        return Ok(None);
    }
    cause_with_hint(
        tr!(
            ctx.t,
            "It looks like you used an invalid character (`{character}`) in an hexadecimal number.\n\nHexadecimal numbers are base 16 integers that use the symbols `0` to `9`\nto represent values 0 to 9, and the letters `a` to `f` (or `A` to `F`)\nto represent values 10 to 15.\nIn Python, hexadecimal numbers start with either `0x` or `0X`,\nfollowed by the characters used to represent the value of that integer.\n",
            character = first_char(wrong)
        ),
        tr!(ctx.t, "Did you made a mistake in writing an hexadecimal integer?\n"),
    )
}

fn invalid_octal(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let (prev, wrong) = (&s.prev_token, &s.bad_token);
    if !(prev.immediately_before(wrong) && prev.text.to_lowercase().starts_with("0o")) {
        return Ok(None);
    }
    cause_with_hint(
        tr!(
            ctx.t,
            "It looks like you used an invalid character (`{character}`) in an octal number.\n\nOctal numbers are base 8 integers that only use the symbols `0` to `7`\nto represent values.\nIn Python, hexadecimal numbers start with either `0o` or `0O`,\n(the digit zero followed by the letter `o`)\nfollowed by the characters used to represent the value of that integer.\n",
            character = first_char(wrong)
        ),
        tr!(ctx.t, "Did you made a mistake in writing an octal integer?\n"),
    )
}

pub(crate) fn invalid_name(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    let (mut first, mut second) = (s.prev_token.clone(), s.bad_token.clone());
    if let Some(highlighted) = s.highlighted_tokens.as_ref().filter(|h| h.len() > 1) {
        first = highlighted[0].clone();
        second = highlighted[1].clone();
    }
    if !(first.is_number() && second.is_name() && first.end == second.start) {
        return Ok(None);
    }

    let mut text = tr!(t, "Valid names cannot begin with a number.\n");
    if same_token(&first, &s.first_token) && s.tokens.iter().any(|tok| *tok == "=") {
        return cause_with_hint(text.clone(), text);
    }

    if second == "i" && !first.is_complex() {
        let hint = tr!(t, "Did you mean `{number}j`?\n", number = first);
        text.push_str(&tr!(
            t,
            "Perhaps you thought that `i` could be used to represent\nthe square root of `-1`. In Python, the symbol used for this is `j`\nand the complex part is written as `some_number` immediately\nfollowed by `j`, with no spaces in between.\nPerhaps you meant to write `{number}j`.\n",
            number = first
        ));
        return cause_with_hint(text, hint);
    }

    let note = if first.is_complex() {
        let note = tr!(
            t,
            "[Note: `{first} * {second}` would also be valid\nsince `{first}` is a complex number.]\n",
            first = first,
            second = second
        );
        let mut digits = first.text.clone();
        let unit = digits.pop().map(String::from).unwrap_or_default();
        second = second.with_text(format!("{}{}", unit, second.text));
        first = first.with_text(digits);
        note
    } else {
        String::new()
    };

    let hint = tr!(
        t,
        "Perhaps you forgot a multiplication operator, `{first} * {second}`.\n",
        first = first,
        second = second
    );
    text.push_str(&hint);
    text.push('\n');
    text.push_str(&note);
    cause_with_hint(text, hint)
}

fn general_fstring_problem(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if !ctx.statement.fstring_error {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "The content of your f-string is invalid. Please consult the documentation:\nhttps://docs.python.org/3/reference/lexical_analysis.html#f-strings\n"
    ))
}

fn assign_to_a_keyword(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    let keyword = if s.bad_token == "=" && s.prev_token.is_keyword() {
        &s.prev_token
    } else if s.bad_token.is_keyword() && s.next_token == "=" {
        &s.bad_token
    } else {
        return Ok(None);
    };
    cause_with_hint(
        tr!(
            t,
            "You were trying to assign a value to the Python keyword `{keyword}`.\nThis is not allowed.\n\n",
            keyword = keyword
        ),
        tr!(t, "Python keywords cannot be used as identifiers (variable names).\n"),
    )
}

fn lambda_with_paren(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    if s.bad_token != "(" {
        return Ok(None);
    }
    if s.prev_token == "lambda" {
        return cause(tr!(
            t,
            "`lambda` does not allow parentheses around its arguments.\nThis was allowed in Python 2 but it not allowed in Python 3.\n"
        ));
    }

    for tok in s.tokens.get(..s.bad_token_index).unwrap_or_default().iter().rev() {
        if *tok == "lambda" {
            return cause(tr!(
                t,
                "You cannot have explicit tuples as arguments.\nAssign any tuple to a parameter and unpack it\nwithin the body of the function.\n"
            ));
        }
        if !(tok.is_identifier() || *tok == ",") {
            return Ok(None);
        }
    }
    Ok(None)
}

fn wrong_type_declaration(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    let (bad_token, prev_token) = bad_and_previous(s);
    if !bad_token.is_identifier() {
        return Ok(None);
    }
    if !prev_token.is_in(&["int", "float", "double", "var", "let", "str", "string", "complex"]) {
        return Ok(None);
    }

    let additional = if check_statement(&replace_token(&s.statement_tokens, prev_token, "")) {
        tr!(t, "If you remove `{type_decl}`, you will have a valid Python statement.\n", type_decl = prev_token)
    } else {
        tr!(
            t,
            "However, even if you remove `{type_decl}`, there would still be some\nsome syntax errors.\n",
            type_decl = prev_token
        )
    };
    let text = tr!(
        t,
        "It looks like you were trying to declare that `{var}` was\na variable using the word `{type_decl}`.\n",
        var = bad_token,
        type_decl = prev_token
    ) + &additional;
    cause_with_hint(text, tr!(t, "You do not need to declare variables in Python.\n"))
}

fn missing_comma_before_string_in_dict(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    let in_dict = s.begin_brackets.last().is_some_and(|bra| *bra == "{");
    let before_is_string = s
        .bad_token_index
        .checked_sub(1)
        .and_then(|i| s.tokens.get(i))
        .is_some_and(Token::is_string);
    if !(in_dict && s.bad_token == ":" && s.prev_token.is_string() && before_is_string) {
        return Ok(None);
    }
    if !check_statement(&modify_token(&s.statement_tokens, &s.prev_token, ",", "")) {
        return Ok(None);
    }

    let mut text = tr!(t, "I am guessing that you forgot a comma between two strings\nwhen defining a dict.\n\n");
    let marked = modify_token(&s.statement_tokens, &s.prev_token, " «,» ", "");
    text.push_str(&format!("```\n{}\n```", marked));
    cause_with_hint(text, tr!(t, "Did you forget a comma?\n"))
}

fn missing_in_with_for(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let (mut index, mut bad_token) = (s.bad_token_index, &s.bad_token);
    if highlighting(s) {
        index += 1;
        bad_token = &s.next_token;
    }
    let end = index.min(s.tokens.len());
    let nb_for = s.tokens[..end].iter().filter(|tok| **tok == "for").count();
    let nb_in = s.tokens[..end].iter().filter(|tok| **tok == "in").count();
    if nb_for == 0 || nb_in >= nb_for {
        return Ok(None);
    }

    let new_statement = replace_token(&s.statement_tokens, bad_token, &format!("in {}", bad_token));
    if !check_statement(&new_statement) {
        return Ok(None);
    }
    cause_with_hint(
        tr!(
            ctx.t,
            "It looks as though you forgot to use the keyword `in`\nas part of a `for` statement. Perhaps you meant:\n\n    {new_statement}\n\n",
            new_statement = new_statement
        ),
        tr!(ctx.t, "Did you forget to write `in`?\n"),
    )
}

fn missing_parens_for_range(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    if s.prev_token != "range" || s.last_token != ":" {
        return Ok(None);
    }
    let new_statement = replace_two_tokens(
        &s.tokens,
        &s.prev_token,
        &format!("{}(", s.prev_token),
        &s.last_token,
        &format!("){}", s.last_token),
    );
    if !check_statement(&new_statement) {
        return Ok(None);
    }
    cause_with_hint(
        tr!(
            ctx.t,
            "It looks as though you forgot to use to use parenthesis with `range`.\nPerhaps you meant:\n\n    {new_statement}\n\n",
            new_statement = new_statement
        ),
        tr!(ctx.t, "Did you forget to write parenthesis?\n"),
    )
}

fn comprehension_condition_or_tuple(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    if s.begin_brackets.is_empty() {
        return Ok(None);
    }
    let before = &s.tokens[..s.bad_token_index.min(s.tokens.len())];
    let cause_condition = || {
        tr!(
            t,
            "I am guessing that you were writing a comprehension or a generator expression\nand use the wrong order for a condition.\nThe correct order depends if there is an `else` clause or not.\nFor example, the correct order for a list comprehensions with\ncondition can be either\n\n    [f(x) if condition else other for x in sequence]  # 'if' before 'for'\n\nor, if there is no `else`\n\n    [f(x) for x in sequence if condition]  # 'if' after 'for'\n\n"
        )
    };

    if s.bad_token == "else" {
        if before.iter().any(|tok| *tok == "for") {
            return cause(cause_condition());
        }
        return Ok(None);
    }
    if s.bad_token != "for" {
        return Ok(None);
    }
    if before.iter().any(|tok| *tok == "if") {
        return cause(cause_condition());
    }

    let mut found_bracket = false;
    for tok in before {
        if tok.is_opening_bracket() {
            found_bracket = true;
        }
        if *tok == "," && found_bracket {
            return cause_with_hint(
                tr!(
                    t,
                    "I am guessing that you were writing a comprehension or a generator expression\nand forgot to include parentheses around tuples.\nAs an example, instead of writing\n\n    [i, i**2 for i in range(10)]\n\nyou would need to write\n\n    [(i, i**2) for i in range(10)]\n\n"
                ),
                tr!(t, "Did you forget parentheses?\n"),
            );
        }
    }
    Ok(None)
}

fn parens_around_exceptions(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    if s.bad_token != "," || s.first_token != "except" {
        return Ok(None);
    }
    let between = s.tokens.get(1..s.bad_token_index).unwrap_or_default();
    if !between.iter().all(|tok| tok.is_identifier() || *tok == ",") {
        return Ok(None);
    }
    cause_with_hint(
        tr!(
            ctx.t,
            "I am guessing that you wanted to use an `except` statement\nwith multiple exception types. If that is the case, you must\nsurround them with parentheses.\n"
        ),
        tr!(ctx.t, "Did you forget parentheses?\n"),
    )
}

/// Keywords close to `wrong` that turn the statement into valid code, with
/// the corrected statement.
fn perhaps_misspelled_keyword(tokens: &[Token], wrong: &Token) -> Vec<(String, String)> {
    let keywords: Vec<&str> = KEYWORDS.iter().copied().filter(|kw| *kw != wrong.as_str()).collect();
    get_similar_words(wrong.as_str(), &keywords)
        .into_iter()
        .filter_map(|word| {
            let new_statement = replace_token(tokens, wrong, &word);
            check_statement(&new_statement).then_some((word, new_statement))
        })
        .collect()
}

fn misspelled_python_keyword(t: &Translator, tokens: &[Token], bad_token: &Token) -> AnalyzerResult {
    let Some((word, line)) = perhaps_misspelled_keyword(tokens, bad_token).into_iter().next() else {
        return Ok(None);
    };
    cause_with_hint(
        tr!(
            t,
            "Perhaps you meant to write `{keyword}` and made a typo.\nThe correct line might be `{line}`\n",
            keyword = word,
            line = line
        ),
        tr!(t, "Did you mean `{line}`?\n", line = line),
    )
}

fn current_is_misspelled_python_keyword(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    if !s.bad_token.is_name() {
        return Ok(None);
    }
    misspelled_python_keyword(ctx.t, &s.tokens, &s.bad_token)
}

fn previous_is_misspelled_python_keyword(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    if !s.prev_token.is_name() {
        return Ok(None);
    }
    misspelled_python_keyword(ctx.t, &s.tokens, &s.prev_token)
}

fn space_in_variable_name(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    let (bad_token, prev_token) = bad_and_previous(s);
    if !(bad_token.is_identifier() && prev_token.is_identifier() && same_token(prev_token, &s.first_token)) {
        return Ok(None);
    }

    let mut first_tokens: Vec<&str> = Vec::new();
    for tok in &s.tokens {
        if *tok == "=" {
            return cause_with_hint(
                tr!(t, "You cannot have spaces in identifiers (variable names).\n"),
                tr!(t, "Did you mean `{name}`?\n", name = first_tokens.join("_")),
            );
        }
        if !tok.is_identifier() {
            return Ok(None);
        }
        first_tokens.push(tok.as_str());
    }
    Ok(None)
}

fn impossible_binary_fstring(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    if !(s.bad_token.is_string() && s.prev_token.is_in(&["bf", "fb"]) && s.prev_token.immediately_before(&s.bad_token)) {
        return Ok(None);
    }
    cause_with_hint(
        tr!(ctx.t, "I am guessing that you wanted a binary f-string;\nthis is not allowed.\n"),
        tr!(ctx.t, "`bf` is an illegal string prefix.\n"),
    )
}

/// Operators whose insertion after `tok` gives valid code, with the result.
fn add_comma_or_operator(tokens: &[Token], tok: &Token, comma_first: bool) -> Vec<(String, String)> {
    let operators: [&str; 5] = if comma_first {
        [",", " +", " -", " *", " in "]
    } else {
        [" +", " -", " *", ",", " in "]
    };
    let mut results = Vec::new();
    for operator in operators {
        if operator == " in " && !results.is_empty() {
            break;
        }
        let new_statement = modify_token(tokens, tok, "", operator);
        if check_statement(&new_statement) {
            results.push((operator.trim().to_string(), new_statement));
        }
    }
    results
}

fn comma_first_cause(t: &Translator, bracket: &str) -> String {
    match bracket {
        "(" => tr!(t, "It is possible that you forgot a comma between items in a tuple, \nor between function arguments, \nbefore the position indicated by ^.\n"),
        "[" => tr!(t, "It is possible that you forgot a comma between items in a list\nbefore the position indicated by ^.\n"),
        _ => tr!(t, "It is possible that you forgot a comma between items in a set or dict\nbefore the position indicated by ^.\n"),
    }
}

fn is_item(token: &Token) -> bool {
    token.is_identifier() || token.is_number() || token.is_string()
}

pub(crate) fn missing_comma_or_operator(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    let (bad_token, prev_token) = bad_and_previous(s);
    if !is_item(bad_token) && !is_item(prev_token) {
        return Ok(None);
    }

    let possible_cause = tr!(
        t,
        "Python indicates that the error is caused by `{second}` written immediately after `{first}`.\n",
        first = prev_token,
        second = bad_token
    );
    let (comma_first, comma_cause) = match s.begin_brackets.last() {
        Some(bracket) => (true, comma_first_cause(t, bracket.as_str())),
        None => (false, String::new()),
    };

    let results = add_comma_or_operator(&s.statement_tokens, prev_token, comma_first);
    if results.is_empty() {
        return Ok(None);
    }

    if results.len() == 1 || s.first_token.is_in(&["def", "async", "class"]) {
        let (operator, line) = &results[0];
        let line = line.split(' ').filter(|part| !part.is_empty()).collect::<Vec<_>>().join(" ");
        if operator.contains(',') {
            let text = possible_cause
                + &comma_cause
                + &tr!(t, "Perhaps you meant\n\n    {line}\n", line = line);
            return cause_with_hint(text, tr!(t, "Did you forget a comma?\n"));
        }
        return cause_with_hint(possible_cause, tr!(t, "Did you mean `{line}`?\n", line = line));
    }

    let mut operators: Vec<&str> = results.iter().map(|(op, _)| op.as_str()).collect();
    let operators = if comma_first {
        operators.remove(0);
        list_to_string(&operators, ", ")
    } else {
        list_to_string(&operators, "; ")
    };
    let mut text = possible_cause
        + &comma_cause
        + &tr!(
            t,
            "Perhaps you meant to insert an operator like `{operators}`\nbetween `{first}` and `{second}`.\nThe following lines of code would not cause any `SyntaxError`:\n\n",
            first = prev_token,
            second = bad_token,
            operators = operators
        );
    for (_, line) in &results {
        text.push_str(&format!("    {}\n", line));
    }
    text.push_str(&tr!(
        t,
        "Note: these are just some of the possible choices and that\nsome of them might raise other types of exceptions.\n"
    ));
    cause_with_hint(
        text,
        tr!(t, "Did you forget something between `{first}` and `{second}`?\n", first = prev_token, second = bad_token),
    )
}

fn equal_instead_of_colon_in_dict(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    if !(s.bad_token == "=" && s.begin_brackets.last().is_some_and(|bra| *bra == "{")) {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "It is possible that you used an equal sign `=` instead of a colon `:`\nto assign values to keys in a dict\nbefore or at the position indicated by ^.\n"
    ))
}

fn and_instead_of_comma(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    if s.bad_token != "and" {
        return Ok(None);
    }
    let with_comma = replace_token(&s.statement_tokens, &s.bad_token, ",");
    let new_statement = if check_statement(&with_comma) {
        with_comma
    } else {
        let without = replace_token(&s.statement_tokens, &s.bad_token, "");
        if !check_statement(&without) {
            return Ok(None);
        }
        without
    };
    cause(tr!(
        ctx.t,
        "The Python keyword `and` can only be used for boolean expressions.\nPerhaps you meant to write\n\n`{new_statement}`\n",
        new_statement = new_statement
    ))
}

fn from_import_as(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let third_is_import = s.tokens.get(2).is_some_and(|tok| *tok == "import");
    if !(s.bad_token == "as" && s.first_token == "from" && third_is_import) {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "I am guessing that you are trying to import at least one object\nfrom module `{module}` and rename it using the Python keyword `as`;\nthis keyword can only be used to rename one object at a time\nusing a well defined syntax.\nI suggest that you split up any such import statement with each object\nrenamed on a separate line as follows:\n\n    from {module} import object_1 as name_1\n    from {module} import object_2 as name_2  # if needed\n",
        module = s.tokens[1]
    ))
}

fn duplicate_token(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    if s.bad_token != s.prev_token {
        return Ok(None);
    }
    let bad_token = format!("`{}`", s.bad_token);
    let mut text = tr!(
        t,
        "I am guessing that you wrote {bad_token} twice in a row by mistake.\nIf that is the case, you need to remove the second one.\n",
        bad_token = bad_token
    );
    if !check_statement(&replace_token(&s.statement_tokens, &s.bad_token, "")) {
        text.push_str(&more_errors(t));
    }
    cause_with_hint(text, tr!(t, "Did you write {bad_token} twice by mistake?\n", bad_token = bad_token))
}

fn extra_token(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    let new_statement = replace_token(&s.statement_tokens, &s.bad_token, "");
    if !check_statement(&new_statement) {
        return Ok(None);
    }
    let bad_token = format!("`{}`", s.bad_token);
    cause_with_hint(
        tr!(
            t,
            "I am guessing that you wrote {bad_token} by mistake.\nRemoving it and writing `{line}` seems to fix the error.\n",
            bad_token = bad_token,
            line = new_statement
        ),
        tr!(t, "Did you write {bad_token} by mistake?\n", bad_token = bad_token),
    )
}

pub(crate) fn unclosed_bracket(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let s = ctx.statement;
    let t = ctx.t;
    let Some(bracket) = s.begin_brackets.first() else {
        return Ok(None);
    };
    let mut text = tr!(
        t,
        "The opening {bracket} on line {linenumber} is not closed.\n",
        bracket = name_bracket(t, bracket.as_str()),
        linenumber = bracket.start_row()
    );
    text.push_str(&marked_line(&s.source_lines, bracket.start_row(), bracket.start_col(), '^'));
    if s.statement_brackets.is_empty() {
        text.push_str(&tr!(t, "If this is incorrect, please report this case.\n"));
    }
    cause(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::locate_statement;

    fn diagnose(source: &str, line: usize, offset: usize) -> (Option<&'static str>, String, Option<String>) {
        let t = Translator::english();
        let lines: Vec<String> = source.split_inclusive('\n').map(str::to_string).collect();
        let statement = locate_statement(&lines, Some(line), Some(offset));
        let ctx = SyntaxContext { statement: &statement, message: "invalid syntax", type_name: "SyntaxError", t: &t };
        let diagnosis = Registry::builtin().diagnose_syntax(&ctx);
        (diagnosis.analyzer, diagnosis.entry.cause, diagnosis.entry.suggest)
    }

    #[test]
    fn test_assign_instead_of_equal() {
        let (name, text, hint) = diagnose("if x = 1:\n    pass\n", 1, 5);
        assert_eq!(name, Some("assign_instead_of_equal"));
        assert!(text.starts_with("I make an effort below to guess"));
        assert!(text.contains("the walrus operator `:=`"));
        assert_eq!(hint.as_deref(), Some("Perhaps you needed `==` or `:=` instead of `=`.\n"));
    }

    #[test]
    fn test_missing_colon() {
        let (name, text, hint) = diagnose("while True\n    pass\n", 1, 10);
        assert_eq!(name, Some("missing_colon"));
        assert!(text.contains("You wrote a `while` loop but\nforgot to add a colon `:` at the end\n"));
        assert_eq!(hint.as_deref(), Some("Did you forget a colon `:`?\n"));
    }

    #[test]
    fn test_confused_elif() {
        let (name, _, hint) = diagnose("if x:\n    pass\nelse if y:\n    pass\n", 3, 6);
        assert_eq!(name, Some("confused_elif"));
        assert_eq!(hint.as_deref(), Some("Perhaps you meant to write `elif`.\n"));
    }

    #[test]
    fn test_import_from() {
        let (name, _, hint) = diagnose("import sin from math\n", 1, 11);
        assert_eq!(name, Some("import_from"));
        assert_eq!(hint.as_deref(), Some("Did you mean `from math import sin`?\n"));
    }

    #[test]
    fn test_triple_equal() {
        let (name, _, hint) = diagnose("a === b\n", 1, 5);
        assert_eq!(name, Some("consecutive_operators"));
        assert_eq!(hint.as_deref(), Some("Did you mean to use `is` instead of `===`?\n"));
    }

    #[test]
    fn test_misspelled_keyword() {
        let (name, _, hint) = diagnose("for i in range(3):\n    pass\nwhle True:\n    pass\n", 3, 5);
        assert_eq!(name, Some("current_is_misspelled_python_keyword"));
        assert_eq!(hint.as_deref(), Some("Did you mean `while True:`?\n"));
    }

    #[test]
    fn test_complex_unit() {
        let (name, _, hint) = diagnose("a = 3i\n", 1, 6);
        assert_eq!(name, Some("invalid_name"));
        assert_eq!(hint.as_deref(), Some("Did you mean `3j`?\n"));
    }

    #[test]
    fn test_missing_comma_in_list() {
        let (name, text, hint) = diagnose("a = [1, 2 3]\n", 1, 10);
        assert_eq!(name, Some("missing_comma_or_operator"));
        assert!(text.contains("forgot a comma between items in a list"));
        assert!(hint.is_some());
    }

    #[test]
    fn test_equal_in_dict() {
        let (name, text, _) = diagnose("ages = {'Alice' = 22}\n", 1, 16);
        assert_eq!(name, Some("equal_instead_of_colon_in_dict"));
        assert!(text.contains("you used an equal sign `=` instead of a colon `:`"));
    }

    #[test]
    fn test_unclosed_bracket_is_last() {
        let (name, text, _) = diagnose("a = [1, 2, 3\n", 1, 11);
        assert_eq!(name, Some("unclosed_bracket"));
        assert!(text.contains("The opening square bracket `[` on line 1 is not closed.\n"));
        let marker = text.lines().last().unwrap();
        assert_eq!(marker.find('^'), Some(11));
    }

    #[test]
    fn test_mismatched_brackets() {
        let (name, text, _) = diagnose("a = (1, 2]\n", 1, 10);
        assert_eq!(name, Some("mismatched_brackets"));
        assert!(text.starts_with("I make an effort below"));
        assert!(text.contains("The closing square bracket `]` on line 1 does not match the opening parenthesis `(` on line 1.\n"));
    }

    #[test]
    fn test_print_statement() {
        let (name, _, hint) = diagnose("print 'hello'\n", 1, 7);
        assert_eq!(name, Some("print_as_statement"));
        assert_eq!(hint.as_deref(), Some("Did you mean `print('hello')`?\n"));
    }

    #[test]
    fn test_copy_pasted_prompt() {
        let (name, _, hint) = diagnose(">>> x = 1\n", 1, 1);
        assert_eq!(name, Some("copy_pasted_code"));
        assert_eq!(hint.as_deref(), Some("Did you use copy-paste?\n"));
    }
}
