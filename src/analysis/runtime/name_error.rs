//! `NameError`

use super::backticked;
use crate::analysis::registry::Registry;
use crate::analysis::stdlib::MODULE_NAMES;
use crate::analysis::syntax::{cause, cause_with_hint};
use crate::analysis::variables::{get_similar_names, name_has_type_hint, simplify_name, SimilarNames};
use crate::analysis::{AnalyzerResult, RuntimeContext};
use crate::locale::Translator;
use crate::pattern::Pattern;
use crate::snapshot::Frame;
use crate::tokens::get_significant_tokens;
use crate::tr;
use once_cell::sync::Lazy;

static NOT_DEFINED: Lazy<Pattern> = Lazy::new(|| Pattern::new(r"name '(.*)' is not defined"));
static FREE_VARIABLE: Lazy<Pattern> = Lazy::new(|| {
    Pattern::new(r"(?:free variable '(.*)' referenced before assignment in enclosing scope|cannot access free variable '(.*)' where it is not associated with a value in enclosing scope)")
});

pub fn register(registry: &mut Registry) {
    registry
        .add_runtime("NameError", "free_variable_referenced", free_variable_referenced)
        .add_runtime("NameError", "name_not_defined", name_not_defined);
}

/// Name reported as unknown by a `NameError` message.
pub fn unknown_name(message: &str) -> Option<&str> {
    NOT_DEFINED.captures(message).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

fn free_variable_referenced(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let Some(caps) = FREE_VARIABLE.captures(ctx.message) else {
        return Ok(None);
    };
    let Some(name) = caps.get(1).or_else(|| caps.get(2)) else {
        return Ok(None);
    };
    cause(tr!(
        ctx.t,
        "In your program, `{var_name}` is an unknown name\nthat exists in an enclosing scope,\nbut has not yet been assigned a value.\n",
        var_name = name.as_str()
    ))
}

fn name_not_defined(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let Some(name) = unknown_name(ctx.message) else {
        return Ok(None);
    };
    let mut text = tr!(t, "In your program, no object with the name `{var_name}` exists.\n", var_name = name);

    if let Some(found) = stdlib_module(t, name, ctx.bad_line) {
        return found;
    }

    let called = ctx.bad_line.replace(['(', ')'], "");
    if called.trim() == name {
        match name {
            "python" | "python3" => {
                let text = tr!(t, "You are already using Python!");
                return cause_with_hint(text.clone(), text);
            }
            "pip" => {
                return cause_with_hint(
                    tr!(
                        t,
                        "It looks as if you are attempting to use pip to install a module.\n`pip` is a command that needs to run in a terminal,\nnot from a Python interpreter.\n"
                    ),
                    tr!(t, "Pip cannot be used in a Python interpreter.\n"),
                );
            }
            _ => {}
        }
    }

    if name == "i" || name == "j" {
        text.push_str(&tr!(
            t,
            "However, sometimes `{name}` is intended to represent\nthe square root of `-1` which is written as `1j` in Python.\n",
            name = name
        ));
        return cause_with_hint(text, tr!(t, "Did you mean `1j`?\n"));
    }

    let frame = ctx.frame;
    let type_hint = name_has_type_hint(t, name, frame);
    let similar = get_similar_names(name, frame);
    let mut hint = match (&similar.best, &type_hint) {
        (Some(best), _) => Some(tr!(t, "Did you mean `{name}`?\n", name = best)),
        (None, Some(_)) => Some(tr!(t, "Did you use a colon instead of an equal sign?\n")),
        (None, None) => None,
    };

    let mut additional = type_hint.unwrap_or_default();
    additional.push_str(&format_similar_names(t, name, &similar));
    additional.push_str(&missing_self(t, name, frame, ctx.bad_line, &mut hint));
    if additional.is_empty() {
        additional = tr!(t, "I have no additional information for you.\n");
    }
    text.push_str(&additional);

    match hint {
        Some(hint) => cause_with_hint(text, hint),
        None => cause(text),
    }
}

/// `math.pi` used without `import math`. Written `name.attribute` on the
/// line, except for `Turtle` which is usually called directly.
fn stdlib_module(t: &Translator, name: &str, bad_line: &str) -> Option<AnalyzerResult> {
    if name != "Turtle" {
        let tokens = get_significant_tokens(bad_line);
        let followed_by_dot = tokens.windows(2).any(|pair| pair[0] == name && pair[1] == ".");
        if !followed_by_dot {
            return None;
        }
    }

    let lowercase = name.to_lowercase();
    if !MODULE_NAMES.contains(&name) && !MODULE_NAMES.contains(&lowercase.as_str()) {
        return None;
    }
    let mut text = tr!(
        t,
        "The name `{name}` is not defined in your program.\nPerhaps you forgot to import `{lowercase}` which is found\nin Python's standard library.\n",
        name = name,
        lowercase = lowercase
    );
    if name != lowercase {
        text.push_str(&tr!(
            t,
            "Note that the name of the module is `{lowercase}` and not `{name}`.\n",
            lowercase = lowercase,
            name = name
        ));
    }
    Some(cause_with_hint(text, tr!(t, "Did you forget to import `{name}`?\n", name = lowercase)))
}

pub(crate) fn format_similar_names(t: &Translator, name: &str, similar: &SimilarNames) -> String {
    match similar.count() {
        0 => String::new(),
        1 => {
            if let Some(local) = similar.locals.first() {
                tr!(t, "The similar name `{name}` was found in the local scope.\n", name = local)
            } else if let Some(global) = similar.globals.first() {
                tr!(t, "The similar name `{name}` was found in the global scope.\n", name = global)
            } else {
                let builtin = similar.builtins.first().map(String::as_str).unwrap_or_default();
                tr!(t, "The Python builtin `{name}` has a similar name.\n", name = builtin)
            }
        }
        _ => {
            let mut message =
                tr!(t, "Instead of writing `{name}`, perhaps you meant one of the following:\n", name = name);
            for (names, prefix) in [
                (&similar.locals, tr!(t, "*   Local scope: ")),
                (&similar.globals, tr!(t, "*   Global scope: ")),
                (&similar.builtins, tr!(t, "*   Python builtins: ")),
            ] {
                if !names.is_empty() {
                    message.push_str(&prefix);
                    message.push_str(&backticked(names));
                    message.push('\n');
                }
            }
            message
        }
    }
}

/// `name` used bare on the line while an object in scope has an attribute
/// of that name: `self.` was probably forgotten.
fn missing_self(t: &Translator, name: &str, frame: &Frame, bad_line: &str, hint: &mut Option<String>) -> String {
    let tokens = get_significant_tokens(bad_line);
    let Some(first) = tokens.first() else {
        return String::new();
    };
    let mut prev = first;
    let mut bare = false;
    for token in &tokens {
        if *token == name && *prev != "." {
            bare = true;
            break;
        }
        prev = token;
    }
    if !bare {
        return String::new();
    }

    for (scope, bindings) in [(tr!(t, "local"), &frame.locals), (tr!(t, "global"), &frame.globals)] {
        for (_, obj) in bindings.iter() {
            if !obj.has_attribute(name) {
                continue;
            }
            let suggest = tr!(t, "Did you forget to add `self`?");
            *hint = Some(match hint.take() {
                Some(existing) => format!("{} {}", existing, suggest),
                None => suggest,
            });
            return tr!(
                t,
                "The {scope} object `{obj}` has an attribute named `{unknown_name}`.\nPerhaps you should have written `self.{unknown_name}` instead of `{unknown_name}`.\n",
                scope = scope,
                obj = simplify_name(&obj.repr()),
                unknown_name = name
            );
        }
    }
    String::new()
}
