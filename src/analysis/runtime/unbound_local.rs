//! `UnboundLocalError`

use super::backticked;
use crate::analysis::registry::Registry;
use crate::analysis::syntax::cause_with_hint;
use crate::analysis::variables::{get_definition_scope, get_similar_names};
use crate::analysis::{AnalyzerResult, RuntimeContext};
use crate::pattern::Pattern;
use crate::tr;
use once_cell::sync::Lazy;

static REFERENCED_BEFORE_ASSIGNMENT: Lazy<Pattern> = Lazy::new(|| {
    Pattern::new(r"(?:local variable '(.*)' referenced before assignment|cannot access local variable '(.*)' where it is not associated with a value)")
});

pub fn register(registry: &mut Registry) {
    registry.add_runtime("UnboundLocalError", "local_variable_referenced", local_variable_referenced);
}

fn local_variable_referenced(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let Some(caps) = REFERENCED_BEFORE_ASSIGNMENT.captures(ctx.message) else {
        return Ok(None);
    };
    let Some(name) = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()) else {
        return Ok(None);
    };
    let frame = ctx.frame;
    let scopes = get_definition_scope(name, frame);

    if scopes.is_empty() {
        // Only names that could appear on the left of `+=` and friends.
        let similar = get_similar_names(name, frame);
        let candidates: Vec<&String> = similar
            .locals
            .iter()
            .filter(|local| frame.lookup(local).is_some_and(|obj| obj.has_attribute("__add__")))
            .collect();
        let Some(first) = candidates.first() else {
            return Ok(None);
        };
        let text = if similar.locals.len() == 1 {
            tr!(t, "The similar name `{name}` was found in the local scope. ", name = similar.locals[0]) + "\n"
        } else {
            tr!(t, "Instead of writing `{name}`, perhaps you meant one of the following:\n", name = name)
                + &tr!(t, "*   Local scope: ")
                + &backticked(&similar.locals)
                + "\n"
        };
        return cause_with_hint(text, tr!(t, "Did you mean `{name}`?\n", name = first));
    }

    let global = scopes.contains(&"global");
    let nonlocal = scopes.contains(&"nonlocal");
    if global && nonlocal {
        return cause_with_hint(
            tr!(
                t,
                "The name `{var_name}` exists in both the global and nonlocal scope.\nThis can be rather confusing and is not recommended.\nDepending on which variable you wanted to refer to, you needed to add either\n\n    global {var_name}\n\nor\n\n    nonlocal {var_name}\n\nas the first line inside your function.\n",
                var_name = name
            ),
            tr!(t, "Did you forget to add either `global {var_name}` or \n`nonlocal {var_name}`?\n", var_name = name),
        );
    }

    let scope = if global {
        "global"
    } else if nonlocal {
        "nonlocal"
    } else {
        return Ok(None);
    };
    cause_with_hint(
        tr!(
            t,
            "The name `{var_name}` exists in the {scope} scope.\nPerhaps the statement\n\n    {scope} {var_name}\n\nshould have been included as the first line inside your function.\n",
            var_name = name,
            scope = scope
        ),
        tr!(t, "Did you forget to add `{scope} {var_name}`?\n", var_name = name, scope = scope),
    )
}
