//! `ImportError`

use crate::analysis::registry::{raised_line, Registry};
use crate::analysis::similar::{get_similar_words, list_to_string};
use crate::analysis::syntax::{cause, cause_with_hint};
use crate::analysis::{AnalyzerResult, RuntimeContext};
use crate::locale::please_report;
use crate::pattern::Pattern;
use crate::tr;
use once_cell::sync::Lazy;
use tracing::debug;

static PARTIALLY_INITIALIZED: Lazy<Pattern> = Lazy::new(|| {
    Pattern::new(r"cannot import name '(.*)' from partially initialized module '(.*)'")
});
static NAME_FROM: Lazy<Pattern> = Lazy::new(|| Pattern::new(r"cannot import name '(.*)' from '(.*)'"));
static NAME_ONLY: Lazy<Pattern> = Lazy::new(|| Pattern::new(r"cannot import name '(.*)'"));
static FROM_IMPORT: Lazy<Pattern> = Lazy::new(|| Pattern::new(r"^from (.*) import"));
static PLAIN_IMPORT: Lazy<Pattern> = Lazy::new(|| Pattern::new(r"^import (.*)"));

pub fn register(registry: &mut Registry) {
    registry
        .add_runtime("ImportError", "partially_initialized_module", partially_initialized_module)
        .add_runtime("ImportError", "cannot_import_name_from", cannot_import_name_from)
        .add_runtime("ImportError", "cannot_import_name", cannot_import_name);
}

fn partially_initialized_module(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let Some(caps) = PARTIALLY_INITIALIZED.captures(ctx.message) else {
        return Ok(None);
    };
    // Python names the circular import itself in this message.
    let add_circular_hint = !ctx.message.contains("circular import");
    explain_missing_name(ctx, &caps[1], &caps[2], add_circular_hint)
}

fn cannot_import_name_from(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let Some(caps) = NAME_FROM.captures(ctx.message) else {
        return Ok(None);
    };
    explain_missing_name(ctx, &caps[1], &caps[2], true)
}

/// Older message that does not name the module; it is read from the line.
fn cannot_import_name(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let Some(caps) = NAME_ONLY.captures(ctx.message) else {
        return Ok(None);
    };
    let name = &caps[1];
    match FROM_IMPORT.captures(ctx.bad_line) {
        Some(line) => explain_missing_name(ctx, name, &line[1], true),
        None => {
            debug!(line = ctx.bad_line, "import statement not recognized");
            cause(tr!(t, "The object that could not be imported is `{name}`.\n", name = name) + &please_report(t))
        }
    }
}

/// `(file, module)` for every import statement found on the lines of the
/// traceback, outermost first.
fn modules_imported(ctx: &RuntimeContext<'_>) -> Vec<(String, String)> {
    let mut imported = Vec::new();
    for frame in &ctx.snapshot.frames {
        let line = raised_line(frame, ctx.cache);
        if let Some(caps) = FROM_IMPORT.captures(&line) {
            imported.push((frame.filename.clone(), caps[1].trim().to_string()));
        } else if let Some(caps) = PLAIN_IMPORT.captures(&line) {
            for module in caps[1].split(',') {
                imported.push((frame.filename.clone(), module.replace('(', "").trim().to_string()));
            }
        }
    }
    imported
}

fn find_circular_import(ctx: &RuntimeContext<'_>, imported: &[(String, String)]) -> Option<String> {
    let ((last_file, last_module), earlier) = imported.split_last()?;
    let (file, _) = earlier.iter().find(|(_, module)| module == last_module)?;
    Some(tr!(
        ctx.t,
        "The problem was likely caused by what is known as a 'circular import'.\nFirst, Python imported and started executing the code in file\n   '{file}'.\nwhich imports module `{last_module}`.\nDuring this process, the code in another file,\n   '{last_file}'\nwas executed. However in this last file, an attempt was made\nto import the original module `{last_module}`\na second time, before Python had completed the first import.\n",
        file = file,
        last_module = last_module,
        last_file = last_file
    ))
}

fn explain_missing_name(ctx: &RuntimeContext<'_>, name: &str, module: &str, add_circular_hint: bool) -> AnalyzerResult {
    let t = ctx.t;
    let mut text = tr!(
        t,
        "The object that could not be imported is `{name}`.\nThe module or package where it was \nexpected to be found is `{module}`.\n",
        name = name,
        module = module
    );

    if let Some(circular) = find_circular_import(ctx, &modules_imported(ctx)) {
        text.push('\n');
        text.push_str(&circular);
        return if add_circular_hint {
            cause_with_hint(text, tr!(t, "You have a circular import.\n"))
        } else {
            cause(text)
        };
    }
    if !add_circular_hint {
        text.push('\n');
        text.push_str(&tr!(
            t,
            "Python indicated that you have a circular import.\nThis can occur if executing the code in module 'A'\nresults in executing the code in module 'B' where\nan attempt to import a name from module 'A' is made\nbefore the execution of the code in module 'A' had been completed.\n"
        ));
        return cause(text);
    }

    let Some(imported) = ctx.snapshot.modules.get(module) else {
        text.push('\n');
        text.push_str(&tr!(
            t,
            "Inconsistent state: `'{module}'` was apparently not imported.\nAs a result, no further analysis can be done.\n",
            module = module
        ));
        return cause(text);
    };

    let similar = get_similar_words(name, &imported.attributes());
    match similar.as_slice() {
        [] => cause(text),
        [correct] => cause_with_hint(
            tr!(
                t,
                "Perhaps you meant to import `{correct}` (from `{module}`) instead of `{typo}`\n",
                correct = correct,
                module = module,
                typo = name
            ),
            tr!(t, "Did you mean `{name}`?\n", name = correct),
        ),
        several => {
            let candidates = list_to_string(several, ", ");
            cause_with_hint(
                tr!(
                    t,
                    "Instead of trying to import `{typo}` from `{module}`, \nperhaps you meant to import one of \nthe following names which are found in module `{module}`:\n`{candidates}`\n",
                    typo = name,
                    module = module,
                    candidates = candidates
                ),
                tr!(t, "Did you mean one of the following: `{names}`?\n", names = candidates),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::raised_on;
    use crate::analysis::registry::Registry;
    use crate::locale::Translator;
    use crate::snapshot::{ExceptionSnapshot, Frame, Value};
    use crate::source::SourceCache;

    #[test]
    fn test_typo_in_imported_name() {
        let message = "cannot import name 'sqrto' from 'math' (unknown location)";
        let (snapshot, cache) = raised_on("ImportError", message, "from math import sqrto", Frame::new("", 1));
        let snapshot = snapshot.with_module("math", Value::module("math", &["pi", "sqrt", "sin"]));
        let diagnosis = Registry::builtin().diagnose_with(&snapshot, &Translator::english(), &cache);
        assert_eq!(diagnosis.analyzer, Some("cannot_import_name_from"));
        assert_eq!(
            diagnosis.entry.cause,
            "Perhaps you meant to import `sqrt` (from `math`) instead of `sqrto`\n"
        );
        assert_eq!(diagnosis.entry.suggest.as_deref(), Some("Did you mean `sqrt`?\n"));
    }

    #[test]
    fn test_module_not_in_snapshot() {
        let message = "cannot import name 'x' from 'mystery' (unknown location)";
        let (snapshot, cache) = raised_on("ImportError", message, "from mystery import x", Frame::new("", 1));
        let diagnosis = Registry::builtin().diagnose_with(&snapshot, &Translator::english(), &cache);
        assert!(diagnosis.entry.cause.contains("Inconsistent state: `'mystery'` was apparently not imported."));
    }

    #[test]
    fn test_older_message_reads_module_from_line() {
        let (snapshot, cache) =
            raised_on("ImportError", "cannot import name 'pii'", "from math import pii", Frame::new("", 1));
        let snapshot = snapshot.with_module("math", Value::module("math", &["pi", "e"]));
        let diagnosis = Registry::builtin().diagnose_with(&snapshot, &Translator::english(), &cache);
        assert_eq!(diagnosis.analyzer, Some("cannot_import_name"));
        assert_eq!(diagnosis.entry.suggest.as_deref(), Some("Did you mean `pi`?\n"));
    }

    #[test]
    fn test_circular_import() {
        let cache = SourceCache::new();
        cache.add("main.py", "import my_turtle1\n");
        cache.add("my_turtle1.py", "from my_turtle2 import t\n");
        cache.add("my_turtle2.py", "from my_turtle1 import a\n");
        let message = "cannot import name 'a' from partially initialized module 'my_turtle1' (most likely due to a circular import) (my_turtle1.py)";
        let snapshot = ExceptionSnapshot::new("ImportError", message)
            .with_frame(Frame::new("main.py", 1))
            .with_frame(Frame::new("my_turtle1.py", 1))
            .with_frame(Frame::new("my_turtle2.py", 1));
        let diagnosis = Registry::builtin().diagnose_with(&snapshot, &Translator::english(), &cache);
        assert_eq!(diagnosis.analyzer, Some("partially_initialized_module"));
        assert!(diagnosis.entry.cause.contains("'circular import'"));
        assert!(diagnosis.entry.cause.contains("   'main.py'.\nwhich imports module `my_turtle1`."));
        assert!(diagnosis.entry.suggest.is_none());
    }
}
