//! `ZeroDivisionError`

use crate::analysis::registry::Registry;
use crate::analysis::syntax::cause;
use crate::analysis::{AnalyzerResult, RuntimeContext};
use crate::locale::Translator;
use crate::tr;

pub fn register(registry: &mut Registry) {
    registry
        .add_runtime("ZeroDivisionError", "division_by_zero", division_by_zero)
        .add_runtime("ZeroDivisionError", "integer_or_modulo", integer_or_modulo)
        .add_runtime("ZeroDivisionError", "zero_negative_power", zero_negative_power)
        .add_runtime("ZeroDivisionError", "float_modulo", float_modulo)
        .add_runtime("ZeroDivisionError", "float_divmod", float_divmod);
}

/// Shorter wording when the divisor is a literal zero.
fn expression_is_zero(t: &Translator, expression: &str, modulo: bool) -> Option<String> {
    if expression.trim().parse::<i64>() != Ok(0) {
        return None;
    }
    Some(if modulo {
        tr!(t, "Using the modulo operator, you are dividing by zero.\n")
    } else {
        tr!(t, "You are dividing by zero.\n")
    })
}

fn dividing_by(t: &Translator, expression: &str) -> String {
    expression_is_zero(t, expression, false).unwrap_or_else(|| {
        tr!(
            t,
            "You are dividing by the following term\n\n    {expression}\n\nwhich is equal to zero.\n",
            expression = expression.trim()
        )
    })
}

fn modulo_by(t: &Translator, expression: &str) -> String {
    expression_is_zero(t, expression, true).unwrap_or_else(|| {
        tr!(
            t,
            "Using the modulo operator, you are dividing by the following term\n\n    {expression}\n\nwhich is equal to zero.\n",
            expression = expression.trim()
        )
    })
}

fn includes_division(t: &Translator, expression: &str) -> String {
    tr!(
        t,
        "The following mathematical expression includes a division by zero:\n\n    {expression}\n",
        expression = expression
    )
}

/// Text after the only occurrence of `operator`, if it occurs once.
fn after_single<'a>(line: &'a str, operator: &str) -> Option<&'a str> {
    if line.matches(operator).count() != 1 {
        return None;
    }
    line.split_once(operator).map(|(_, rest)| rest)
}

fn division_by_zero(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    if !matches!(ctx.message, "division by zero" | "float division by zero" | "complex division by zero") {
        return Ok(None);
    }
    let text = match after_single(ctx.bad_line, "/") {
        Some(divisor) => dividing_by(ctx.t, divisor),
        None => includes_division(ctx.t, ctx.bad_line),
    };
    cause(text)
}

fn integer_or_modulo(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    if !matches!(
        ctx.message,
        "integer division or modulo by zero" | "integer modulo by zero" | "float floor division by zero"
    ) {
        return Ok(None);
    }
    let line = ctx.bad_line;
    let nb_div = line.matches("//").count();
    let nb_mod = line.matches('%').count();
    let nb_divmod = line.matches("divmod").count();

    let text = match (nb_div, nb_mod, nb_divmod) {
        (1, 0, 0) => after_single(line, "//").map_or_else(|| includes_division(t, line), |d| dividing_by(t, d)),
        (0, 1, 0) => after_single(line, "%").map_or_else(|| includes_division(t, line), |d| modulo_by(t, d)),
        (0, 0, n) if n > 0 => tr!(t, "The second argument of the `divmod()` function is zero.\n"),
        _ => includes_division(t, line),
    };
    cause(text)
}

fn zero_negative_power(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    if !matches!(ctx.message, "0.0 cannot be raised to a negative power" | "zero to a negative power") {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "You are attempting to raise the number 0 to a negative power\nwhich is equivalent to dividing by zero.\n"
    ))
}

fn float_modulo(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    if !matches!(ctx.message, "float modulo" | "float modulo by zero") {
        return Ok(None);
    }
    let text = match after_single(ctx.bad_line, "%") {
        Some(divisor) => modulo_by(t, divisor),
        None => tr!(
            t,
            "The following mathematical expression includes a division by zero\ndone using the modulo operator:\n\n    {expression}\n",
            expression = ctx.bad_line
        ),
    };
    cause(text)
}

fn float_divmod(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    if ctx.message != "float divmod()" {
        return Ok(None);
    }
    cause(tr!(ctx.t, "The second argument to the `divmod()` function is equal to zero.\n"))
}
