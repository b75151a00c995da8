//! `TypeError`

use crate::analysis::registry::Registry;
use crate::analysis::syntax::{cause, cause_with_hint};
use crate::analysis::variables::{convert_type, get_all_objects};
use crate::analysis::{AnalyzerResult, RuntimeContext};
use crate::locale::Translator;
use crate::pattern::Pattern;
use crate::tokens::get_significant_tokens;
use crate::tr;
use once_cell::sync::Lazy;

static CAN_ONLY_CONCATENATE: Lazy<Pattern> = Lazy::new(|| {
    Pattern::new(r#"can only concatenate (\w+) \(not ['"](\w+)['"]\) to (\w+)"#)
});
static MUST_BE_STR: Lazy<Pattern> = Lazy::new(|| Pattern::new(r"must be str, not (\w+)"));
static UNSUPPORTED_OPERAND: Lazy<Pattern> = Lazy::new(|| {
    Pattern::new(r#"unsupported operand type\(s\) for (.+): ['"](\w+)['"] and ['"](\w+)['"]"#)
});
static ORDER_COMPARISON: Lazy<Pattern> = Lazy::new(|| {
    Pattern::new(r#"['"](.+)['"] not supported between instances of ['"](\w+)['"] and ['"](\w+)['"]"#)
});
static BAD_UNARY_OPERAND: Lazy<Pattern> =
    Lazy::new(|| Pattern::new(r#"bad operand type for unary (.+): ['"](\w+)['"]"#));
static ITEM_ASSIGNMENT: Lazy<Pattern> =
    Lazy::new(|| Pattern::new(r#"['"](\w+)['"] object does not support item assignment"#));
static POSITIONAL_COUNT: Lazy<Pattern> =
    Lazy::new(|| Pattern::new(r"(.*) takes (\d+) positional arguments? but (\d+) "));
static MISSING_POSITIONAL: Lazy<Pattern> =
    Lazy::new(|| Pattern::new(r"(.*) missing (\d+) required positional argument"));
static NOT_CALLABLE: Lazy<Pattern> = Lazy::new(|| Pattern::new(r"'(.*)' object is not callable"));

pub fn register(registry: &mut Registry) {
    registry
        .add_runtime("TypeError", "can_only_concatenate", can_only_concatenate)
        .add_runtime("TypeError", "must_be_str", must_be_str)
        .add_runtime("TypeError", "unsupported_operand", unsupported_operand)
        .add_runtime("TypeError", "order_comparison", order_comparison)
        .add_runtime("TypeError", "bad_operand_unary", bad_operand_unary)
        .add_runtime("TypeError", "item_assignment", item_assignment)
        .add_runtime("TypeError", "exception_derived_from_base_exception", exception_derived_from_base_exception)
        .add_runtime("TypeError", "incorrect_nb_positional_arguments", incorrect_nb_positional_arguments)
        .add_runtime("TypeError", "missing_positional_arguments", missing_positional_arguments)
        .add_runtime("TypeError", "not_callable", not_callable)
        .add_runtime("TypeError", "cannot_multiply_by_str", cannot_multiply_by_str);
}

/// Hint for a string on the offending line that holds a number, such as
/// the result of `input()` used in arithmetic.
fn numeric_string_hint(ctx: &RuntimeContext<'_>) -> Option<String> {
    get_all_objects(ctx.bad_line, ctx.frame).into_iter().find_map(|found| {
        let text = found.value.as_str()?.trim();
        let kind = if text.parse::<i64>().is_ok() {
            "int"
        } else if text.parse::<f64>().is_ok() {
            "float"
        } else {
            return None;
        };
        Some(tr!(
            ctx.t,
            "Did you forget to convert the string `{name}` into {kind}?\n",
            name = found.name,
            kind = convert_type(ctx.t, kind)
        ))
    })
}

/// `cause`, followed by the conversion hint when one applies.
fn with_conversion_hint(ctx: &RuntimeContext<'_>, text: String) -> AnalyzerResult {
    match numeric_string_hint(ctx) {
        Some(hint) => cause_with_hint(text + &hint, hint),
        None => cause(text),
    }
}

fn two_types(t: &Translator, template: &str, first: &str, second: &str) -> String {
    t.format(template, &[("first", &convert_type(t, first)), ("second", &convert_type(t, second))])
}

fn can_only_concatenate(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let Some(caps) = CAN_ONLY_CONCATENATE.captures(ctx.message) else {
        return Ok(None);
    };
    let text = two_types(
        ctx.t,
        "You tried to concatenate (add) two different types of objects:\n{first} and {second}\n",
        &caps[1],
        &caps[2],
    );
    with_conversion_hint(ctx, text)
}

fn must_be_str(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let Some(caps) = MUST_BE_STR.captures(ctx.message) else {
        return Ok(None);
    };
    let text = two_types(
        ctx.t,
        "You tried to concatenate (add) two different types of objects:\n{first} and {second}\n",
        "str",
        &caps[1],
    );
    with_conversion_hint(ctx, text)
}

fn unsupported_operand(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let Some(caps) = UNSUPPORTED_OPERAND.captures(ctx.message) else {
        return Ok(None);
    };
    let operator = &caps[1];
    let first = convert_type(t, &caps[2]);
    let second = convert_type(t, &caps[3]);
    let args: [(&str, &dyn std::fmt::Display); 3] =
        [("operator", &operator), ("first", &first), ("second", &second)];

    let template = match operator {
        "+" | "+=" => "You tried to add two incompatible types of objects:\n{first} and {second}\n",
        "-" | "-=" => "You tried to subtract two incompatible types of objects:\n{first} and {second}\n",
        "*" | "*=" => "You tried to multiply two incompatible types of objects:\n{first} and {second}\n",
        "/" | "//" | "/=" | "//=" => {
            "You tried to divide two incompatible types of objects:\n{first} and {second}\n"
        }
        "&" | "|" | "^" | "&=" | "|=" | "^=" => {
            "You tried to perform the bitwise operation {operator}\non two incompatible types of objects:\n{first} and {second}\n"
        }
        ">>" | "<<" | ">>=" | "<<=" => {
            "You tried to perform the bit shifting operation {operator}\non two incompatible types of objects:\n{first} and {second}\n"
        }
        "** or pow()" | "**=" => {
            "You tried to exponentiate (raise to a power)\nusing two incompatible types of objects:\n{first} and {second}\n"
        }
        "@" | "@=" => {
            "You tried to use the operator {operator}\nusing two incompatible types of objects:\n{first} and {second}.\nThis operator is normally used only\nfor multiplication of matrices.\n"
        }
        _ => return Ok(None),
    };
    let text = t.format(template, &args);
    if matches!(operator, "+" | "+=" | "-" | "-=" | "*" | "*=" | "/" | "//" | "/=" | "//=") {
        with_conversion_hint(ctx, text)
    } else {
        cause(text)
    }
}

fn order_comparison(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let Some(caps) = ORDER_COMPARISON.captures(ctx.message) else {
        return Ok(None);
    };
    let text = tr!(
        t,
        "You tried to do an order comparison ({operator})\nbetween two incompatible types of objects:\n{first} and {second}\n",
        operator = &caps[1],
        first = convert_type(t, &caps[2]),
        second = convert_type(t, &caps[3])
    );
    with_conversion_hint(ctx, text)
}

fn bad_operand_unary(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let Some(caps) = BAD_UNARY_OPERAND.captures(ctx.message) else {
        return Ok(None);
    };
    cause(tr!(
        t,
        "You tried to use the unary operator '{operator}'\nwith the following type of object: {obj}.\nThis operation is not defined for this type of object.\n",
        operator = &caps[1],
        obj = convert_type(t, &caps[2])
    ))
}

fn item_assignment(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let Some(caps) = ITEM_ASSIGNMENT.captures(ctx.message) else {
        return Ok(None);
    };
    cause(tr!(
        t,
        "In Python, some objects are known as immutable:\nonce defined, their value cannot be changed.\nYou tried change part of such an immutable object: {obj},\nmost likely by using an indexing operation.\n",
        obj = convert_type(t, &caps[1])
    ))
}

fn exception_derived_from_base_exception(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("exceptions must derive from BaseException") {
        return Ok(None);
    }
    cause(tr!(ctx.t, "In Python 3, exceptions must be derived from BaseException.\n"))
}

fn incorrect_nb_positional_arguments(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let Some(caps) = POSITIONAL_COUNT.captures(ctx.message) else {
        return Ok(None);
    };
    let fn_name = caps[1].strip_suffix("()").unwrap_or(&caps[1]);
    let required: usize = caps[2].parse().unwrap_or(0);
    let given: usize = caps[3].parse().unwrap_or(0);

    // One extra argument on a method call: `self` was left out of the
    // definition.
    let missing_self = given == required + 1
        && (fn_name.contains('.') || {
            let tokens = get_significant_tokens(ctx.bad_line);
            tokens.windows(2).any(|pair| pair[0] == "." && pair[1] == fn_name)
        });

    let mut text = tr!(
        t,
        "You apparently have called the function `{fn_name}` with\n{nb_given} positional argument(s) while it requires {nb_required}\nsuch positional argument(s).\n",
        fn_name = fn_name,
        nb_given = given,
        nb_required = required
    );
    if !missing_self {
        return cause(text);
    }
    let hint = tr!(t, "Perhaps you forgot `self` when defining `{fn_name}`.\n", fn_name = fn_name);
    text.push_str(&hint);
    cause_with_hint(text, hint)
}

fn missing_positional_arguments(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let Some(caps) = MISSING_POSITIONAL.captures(ctx.message) else {
        return Ok(None);
    };
    cause(tr!(
        ctx.t,
        "You apparently have called the function '{fn_name}' with\nfewer positional arguments than it requires ({nb_required} missing).\n",
        fn_name = &caps[1],
        nb_required = &caps[2]
    ))
}

fn not_callable(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let Some(caps) = NOT_CALLABLE.captures(ctx.message) else {
        return Ok(None);
    };
    let obj = &caps[1];
    let hint = if obj == "tuple" {
        tr!(t, "Perhaps you had a missing comma between two tuples.\n")
    } else {
        tr!(t, "Perhaps you had a missing comma before the tuple.\n")
    };
    let text = tr!(
        t,
        "I suspect that you had an object of this type, {obj},\nfollowed by what looked like a tuple, '(...)',\nwhich Python took as an indication of a function call.\n",
        obj = convert_type(t, obj)
    ) + &hint;
    cause_with_hint(text, hint)
}

fn cannot_multiply_by_str(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    if !ctx.message.contains("can't multiply sequence by non-int of type 'str'") {
        return Ok(None);
    }
    let text = tr!(ctx.t, "Perhaps you forgot to convert a string into an integer using `int()`.\n");
    match numeric_string_hint(ctx) {
        Some(hint) => cause_with_hint(text, hint),
        None => cause(text),
    }
}
