//! `ValueError`

use super::is_raise_statement;
use crate::analysis::eval::eval_expr;
use crate::analysis::registry::Registry;
use crate::analysis::syntax::{cause, cause_with_hint};
use crate::analysis::variables::{convert_type, get_all_objects};
use crate::analysis::{AnalyzerResult, RuntimeContext};
use crate::locale::Translator;
use crate::pattern::Pattern;
use crate::snapshot::Value;
use crate::tokens::get_significant_tokens;
use crate::tr;
use once_cell::sync::Lazy;

static NOT_ENOUGH_VALUES: Lazy<Pattern> = Lazy::new(|| {
    Pattern::new(r"not enough values to unpack \(expected (?:at least )?(\d+), got (\d+)\)")
});
static TOO_MANY_VALUES: Lazy<Pattern> =
    Lazy::new(|| Pattern::new(r"too many values to unpack \(expected (\d+)"));
static INVALID_LITERAL: Lazy<Pattern> =
    Lazy::new(|| Pattern::new(r"invalid literal for int\(\) with base (\d+): '(.*)'"));

const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn register(registry: &mut Registry) {
    registry
        .add_runtime("ValueError", "not_enough_values_to_unpack", not_enough_values_to_unpack)
        .add_runtime("ValueError", "too_many_values_to_unpack", too_many_values_to_unpack)
        .add_runtime("ValueError", "invalid_literal_for_int", invalid_literal_for_int)
        .add_runtime("ValueError", "date_month_out_of_range", date_month_out_of_range)
        .add_runtime("ValueError", "unrecognized_message", unrecognized_message);
}

fn unpacking(t: &Translator) -> String {
    tr!(t, "Unpacking is a convenient way to assign a name,\nto each item of an iterable.\n")
}

/// Right-hand side of a single assignment, evaluated, when it is one of
/// the builtin iterables.
fn assigned_iterable(ctx: &RuntimeContext<'_>) -> Option<(Value, &'static str)> {
    let (_, rhs) = ctx.bad_line.split_once('=')?;
    if rhs.contains('=') {
        return None;
    }
    let value = eval_expr(rhs, ctx.frame)?;
    let kind = match value {
        Value::Dict { .. } => "dict",
        Value::List { .. } => "list",
        Value::Set { .. } => "set",
        Value::Str { .. } => "str",
        Value::Tuple { .. } => "tuple",
        _ => return None,
    };
    Some((value, kind))
}

fn not_enough_values_to_unpack(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let Some(caps) = NOT_ENOUGH_VALUES.captures(ctx.message) else {
        return Ok(None);
    };
    let (nb_names, length) = (&caps[1], &caps[2]);
    let detail = match assigned_iterable(ctx) {
        Some((_, kind)) => tr!(
            t,
            "In this instance, there are more names ({nb_names})\nthan the length of the iterable, {iter_type} of length {length}.\n",
            nb_names = nb_names,
            iter_type = convert_type(t, kind),
            length = length
        ),
        None => tr!(
            t,
            "In this instance, there are more names ({nb_names})\nthan {length}, the length of the iterable.\n",
            nb_names = nb_names,
            length = length
        ),
    };
    cause(unpacking(t) + &detail)
}

fn too_many_values_to_unpack(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let Some(caps) = TOO_MANY_VALUES.captures(ctx.message) else {
        return Ok(None);
    };
    let nb_names = &caps[1];
    let sized = assigned_iterable(ctx).and_then(|(value, kind)| Some((value.len()?, kind)));
    let detail = match sized {
        Some((length, kind)) => tr!(
            t,
            "In this instance, there are fewer names ({nb_names})\nthan the length of the iterable, {iter_type} of length {length}.\n",
            nb_names = nb_names,
            iter_type = convert_type(t, kind),
            length = length
        ),
        None => tr!(
            t,
            "In this instance, there are fewer names ({nb_names})\nthan the length of the iterable.\n",
            nb_names = nb_names
        ),
    };
    cause(unpacking(t) + &detail)
}

fn invalid_literal_for_int(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let Some(caps) = INVALID_LITERAL.captures(ctx.message) else {
        return Ok(None);
    };
    let Ok(base) = caps[1].parse::<usize>() else {
        return Ok(None);
    };
    let value = &caps[2];
    if value.is_empty() {
        return cause(tr!(
            t,
            "`int()` expects an argument that looks like a number in base `{base}`\nbut you gave it an empty string.\n",
            base = base
        ));
    }

    let begin = tr!(
        t,
        "`{value}` is an invalid argument for `int()` in base `{base}`.\n",
        value = Value::str(value).repr(),
        base = base
    );
    if value.trim().parse::<f64>().is_ok() {
        return cause_with_hint(
            begin
                + &tr!(
                    t,
                    "The string `'{value}'` needs to be first converted using `float()`\nbefore the result can be converted into an integer using `int()`.\n",
                    value = value
                ),
            tr!(t, "You need to convert `'{value}'` to a float first.\n", value = value),
        );
    }

    let max_digit = |base: usize| char::from(DIGITS[base - 1]);
    let detail = match base {
        0 => tr!(
            t,
            "When base `0` is specified, `int()` expects the string argument to\nrepresent an integer literal.\n"
        ),
        2..=10 => tr!(
            t,
            "In base `{base}`, `int()` is most often use to convert a string\ncontaining the digits `0` to `{max_n}` into an integer.\n",
            base = base,
            max_n = max_digit(base)
        ),
        11 => tr!(
            t,
            "In base `11`, `int()` is most often use to convert a string\ncontaining the digits `0` to `9` and the letter `'a'` into an integer.\n"
        ),
        12..=36 => tr!(
            t,
            "In base `{base}`, `int()` is most often use to convert a string\ncontaining the digits `0` to `9` and the letters\nfrom `'a'` to `'{max_n}'` into an integer.\n",
            base = base,
            max_n = max_digit(base)
        ),
        _ => return Ok(None),
    };
    cause(begin + &detail)
}

fn date_month_out_of_range(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    if ctx.message != "month must be in 1..12" {
        return Ok(None);
    }
    cause_with_hint(
        tr!(
            ctx.t,
            "I am guessing that you specify an invalid value for a month\nin a `date` object. Valid values are integers, from 1 to 12.\n"
        ),
        tr!(ctx.t, "Did you specify an invalid month?\n"),
    )
}

/// Unknown message: point at the function that raised, with its docstring.
fn unrecognized_message(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let (name, function) = if is_raise_statement(ctx.bad_line) {
        let name = ctx.frame.function.clone();
        match ctx.frame.globals.get(&name) {
            Some(function) => (name, function.clone()),
            None => return Ok(None),
        }
    } else {
        let Some(found) = get_all_objects(ctx.bad_line, ctx.frame).into_iter().find(|found| found.value.is_callable())
        else {
            return Ok(None);
        };
        let tokens = get_significant_tokens(ctx.bad_line);
        if tokens.first().map_or(true, |first| *first != found.name.as_str()) {
            return Ok(None);
        }
        (found.name, found.value)
    };

    let mut text = tr!(
        t,
        "I do not recognize this error message.\nI am guessing that the problem is with the function `{name}`.\n",
        name = name
    );
    match &function {
        Value::Function { doc: Some(doc), .. } => {
            text.push_str(&tr!(t, "Its docstring is:\n\n`'''{docstring}'''`\n", docstring = doc));
        }
        _ => text.push_str(&tr!(t, "I have no more information.\n")),
    }
    cause(text)
}

#[cfg(test)]
mod tests {
    use super::super::testing::explain;
    use crate::snapshot::{Frame, Value};

    #[test]
    fn test_not_enough_values() {
        let message = "not enough values to unpack (expected 3, got 2)";
        let (name, text, _) = explain("ValueError", message, "a, b, c = [1, 2]", Frame::new("", 1));
        assert_eq!(name, Some("not_enough_values_to_unpack"));
        assert!(text.ends_with("there are more names (3)\nthan the length of the iterable, a `list` of length 2.\n"));
    }

    #[test]
    fn test_too_many_values_from_variable() {
        let frame = Frame::new("", 1).with_global("word", Value::str("abc"));
        let message = "too many values to unpack (expected 2)";
        let (_, text, _) = explain("ValueError", message, "a, b = word", frame);
        assert!(text.ends_with("there are fewer names (2)\nthan the length of the iterable, a string (`str`) of length 3.\n"));
    }

    #[test]
    fn test_unpacking_in_for_loop() {
        let message = "too many values to unpack (expected 2)";
        let (_, text, _) = explain("ValueError", message, "for a, b in pairs:", Frame::new("", 1));
        assert!(text.ends_with("there are fewer names (2)\nthan the length of the iterable.\n"));
    }

    #[test]
    fn test_int_of_float_string() {
        let message = "invalid literal for int() with base 10: '3.5'";
        let (_, text, hint) = explain("ValueError", message, "int('3.5')", Frame::new("", 1));
        assert!(text.starts_with("`'3.5'` is an invalid argument for `int()` in base `10`.\n"));
        assert_eq!(hint.as_deref(), Some("You need to convert `'3.5'` to a float first.\n"));
    }

    #[test]
    fn test_int_digits_for_base() {
        let message = "invalid literal for int() with base 2: '123'";
        let (_, text, _) = explain("ValueError", message, "int('123', 2)", Frame::new("", 1));
        assert!(text.contains("containing the digits `0` to `1` into an integer.\n"));

        let message = "invalid literal for int() with base 16: 'xyz'";
        let (_, text, _) = explain("ValueError", message, "int('xyz', 16)", Frame::new("", 1));
        assert!(text.contains("In base `16`"));
        assert!(text.contains("from `'a'` to `'f'` into an integer.\n"));
    }

    #[test]
    fn test_month_out_of_range() {
        let (_, _, hint) = explain("ValueError", "month must be in 1..12", "date(2020, 13, 1)", Frame::new("", 1));
        assert_eq!(hint.as_deref(), Some("Did you specify an invalid month?\n"));
    }

    #[test]
    fn test_unrecognized_message_shows_docstring() {
        let function = Value::Function {
            name: "check".to_string(),
            builtin: false,
            doc: Some("Only positive values.".to_string()),
        };
        let frame = Frame::new("", 1).with_global("check", function);
        let (name, text, _) = explain("ValueError", "bad value", "check(-1)", frame);
        assert_eq!(name, Some("unrecognized_message"));
        assert!(text.contains("the problem is with the function `check`.\n"));
        assert!(text.ends_with("`'''Only positive values.'''`\n"));
    }
}
