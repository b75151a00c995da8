//! `ModuleNotFoundError`

use crate::analysis::registry::Registry;
use crate::analysis::similar::{get_similar_words, list_to_string};
use crate::analysis::stdlib::MODULE_NAMES;
use crate::analysis::syntax::{cause, cause_with_hint};
use crate::analysis::{AnalyzerResult, RuntimeContext};
use crate::locale::Translator;
use crate::pattern::Pattern;
use crate::tr;
use once_cell::sync::Lazy;

static NOT_A_PACKAGE: Lazy<Pattern> =
    Lazy::new(|| Pattern::new(r"No module named '(.*)'; '(.*)' is not a package"));
static NO_MODULE: Lazy<Pattern> = Lazy::new(|| Pattern::new(r"No module named '(.*)'$"));

pub fn register(registry: &mut Registry) {
    registry
        .add_runtime("ModuleNotFoundError", "is_not_a_package", is_not_a_package)
        .add_runtime("ModuleNotFoundError", "no_module_named", no_module_named);
}

/// `import os.pathh` or `import math.pi`: the part after the dot is not a
/// submodule.
fn is_not_a_package(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let Some(caps) = NOT_A_PACKAGE.captures(ctx.message) else {
        return Ok(None);
    };
    let name = &caps[2];
    let rest = caps[1].replacen(&format!("{}.", name), "", 1);

    let Some(module) = ctx.snapshot.modules.get(name) else {
        return cause(tr!(
            t,
            "No additional information available since `{name}` cannot be imported.\n",
            name = name
        ));
    };
    let attributes = module.attributes();
    if attributes.iter().any(|attr| *attr == rest) {
        return cause_with_hint(
            tr!(t, "`{rest}` is not a separate module but an object that is part of `{name}`.\n", rest = rest, name = name),
            tr!(t, "Did you mean `from {name} import {rest}`?\n", name = name, rest = rest),
        );
    }

    let similar = get_similar_words(&rest, &attributes);
    if similar.is_empty() {
        return cause(tr!(t, "`{rest}` cannot be imported from `{name}`.\n", rest = rest, name = name));
    }

    let submodule = similar
        .iter()
        .find(|attr| ctx.snapshot.modules.contains_key(&format!("{}.{}", name, attr)));
    let (mut text, hint) = match submodule {
        Some(attr) => (
            tr!(
                t,
                "Perhaps you meant `import {name}.{attr}`.\n`{attr}` is a name similar to `{rest}` and is a module that\ncan be imported from `{name}`.\n",
                name = name,
                attr = attr,
                rest = rest
            ),
            tr!(t, "Did you mean `import {name}.{attr}`?\n", name = name, attr = attr),
        ),
        None => {
            let attr = &similar[0];
            (
                tr!(
                    t,
                    "Perhaps you meant `from {name} import {attr}`.\n`{attr}` is a name similar to `{rest}` and is an object that\ncan be imported from `{name}`.\n",
                    name = name,
                    attr = attr,
                    rest = rest
                ),
                tr!(t, "Did you mean `from {name} import {attr}`?\n", name = name, attr = attr),
            )
        }
    };
    if similar.len() > 1 {
        text.push_str(&tr!(
            t,
            "Other objects with similar names that are part of\n `{name}` include `{others}`.\n",
            name = name,
            others = list_to_string(&similar[1..], ", ")
        ));
    }
    cause_with_hint(text, hint)
}

fn curses_not_found(t: &Translator) -> AnalyzerResult {
    let hint = if cfg!(windows) {
        tr!(t, "The curses module is rarely installed with Python on Windows.\n")
    } else {
        tr!(t, "The curses module is often not installed with Python.\n")
    };
    cause_with_hint(tr!(t, "You have tried to import the curses module.\n") + &hint, hint)
}

fn no_module_named(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let Some(caps) = NO_MODULE.captures(ctx.message) else {
        return Ok(None);
    };
    let name = &caps[1];
    if name == "_curses" {
        return curses_not_found(t);
    }

    let mut text =
        tr!(t, "No module named `{name}` can be imported.\nPerhaps you need to install it.\n", name = name);
    let similar = get_similar_words(name, MODULE_NAMES);
    let Some(first) = similar.first() else {
        return cause(text);
    };
    if similar.len() > 1 {
        text.push_str(&tr!(
            t,
            "The following existing modules have names that are similar \nto the module you tried to import: `{names}`\n",
            names = similar.join(", ")
        ));
    } else {
        text.push_str(&tr!(t, "`{name}` is an existing module that has a similar name.\n", name = first));
    }
    cause_with_hint(text, tr!(t, "Did you mean `{name}`?\n", name = first))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{explain, raised_on};
    use crate::analysis::registry::Registry;
    use crate::locale::Translator;
    use crate::snapshot::{Frame, Value};

    #[test]
    fn test_similar_stdlib_module() {
        let (name, text, hint) =
            explain("ModuleNotFoundError", "No module named 'tkinkter'", "import tkinkter", Frame::new("", 1));
        assert_eq!(name, Some("no_module_named"));
        assert!(text.starts_with("No module named `tkinkter` can be imported.\nPerhaps you need to install it.\n"));
        assert!(text.ends_with("`tkinter` is an existing module that has a similar name.\n"));
        assert_eq!(hint.as_deref(), Some("Did you mean `tkinter`?\n"));
    }

    #[test]
    fn test_unknown_module() {
        let (_, text, hint) =
            explain("ModuleNotFoundError", "No module named 'qwertyuiop'", "import qwertyuiop", Frame::new("", 1));
        assert_eq!(text, "No module named `qwertyuiop` can be imported.\nPerhaps you need to install it.\n");
        assert!(hint.is_none());
    }

    #[test]
    fn test_object_is_not_a_module() {
        let message = "No module named 'math.pi'; 'math' is not a package";
        let (snapshot, cache) = raised_on("ModuleNotFoundError", message, "import math.pi", Frame::new("", 1));
        let snapshot = snapshot.with_module("math", Value::module("math", &["pi", "tau"]));
        let diagnosis = Registry::builtin().diagnose_with(&snapshot, &Translator::english(), &cache);
        assert_eq!(diagnosis.analyzer, Some("is_not_a_package"));
        assert_eq!(diagnosis.entry.suggest.as_deref(), Some("Did you mean `from math import pi`?\n"));
    }

    #[test]
    fn test_similar_submodule() {
        let message = "No module named 'os.pathh'; 'os' is not a package";
        let (snapshot, cache) = raised_on("ModuleNotFoundError", message, "import os.pathh", Frame::new("", 1));
        let snapshot = snapshot
            .with_module("os", Value::module("os", &["path", "sep"]))
            .with_module("os.path", Value::module("posixpath", &["join"]));
        let diagnosis = Registry::builtin().diagnose_with(&snapshot, &Translator::english(), &cache);
        assert_eq!(diagnosis.entry.suggest.as_deref(), Some("Did you mean `import os.path`?\n"));
    }

    #[test]
    fn test_curses() {
        let (_, text, _) = explain("ModuleNotFoundError", "No module named '_curses'", "import curses", Frame::new("", 1));
        assert!(text.starts_with("You have tried to import the curses module.\n"));
    }
}
