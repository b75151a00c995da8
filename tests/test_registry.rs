use pyexplain::analysis::{diagnose, AnalyzerResult, CauseEntry, Registry, RuntimeContext, SyntaxContext};
use pyexplain::{ExceptionSnapshot, ExplainError, Frame, SourceCache, SyntaxDetails, Translator, Value};
use std::sync::Arc;
use std::thread;

fn panicking(_: &RuntimeContext<'_>) -> AnalyzerResult {
    panic!("analyzer bug")
}

fn failing(_: &RuntimeContext<'_>) -> AnalyzerResult {
    Err(ExplainError::analyzer("failing", "broken on purpose"))
}

fn first(_: &RuntimeContext<'_>) -> AnalyzerResult {
    Ok(Some(CauseEntry::with_hint("first cause\n", "first hint\n")))
}

fn second(_: &RuntimeContext<'_>) -> AnalyzerResult {
    Ok(Some(CauseEntry::new("second cause\n")))
}

fn message_echo(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if ctx.message != "custom parser message" {
        return Ok(None);
    }
    Ok(Some(CauseEntry::new(format!("statement starts with `{}`\n", ctx.statement.first_token))))
}

#[test]
fn test_panicking_analyzer_is_skipped() {
    let mut registry = Registry::empty();
    registry
        .add_runtime("RuntimeError", "panicking", panicking)
        .add_runtime("RuntimeError", "failing", failing)
        .add_runtime("RuntimeError", "first", first);
    let snapshot = ExceptionSnapshot::new("RuntimeError", "boom");
    let diagnosis = registry.diagnose_with(&snapshot, &Translator::english(), &SourceCache::new());

    assert_eq!(diagnosis.analyzer, Some("first"));
    assert_eq!(diagnosis.entry.suggest.as_deref(), Some("first hint\n"));
}

#[test]
fn test_first_match_wins() {
    let mut registry = Registry::empty();
    registry.add_runtime("RuntimeError", "first", first).add_runtime("RuntimeError", "second", second);
    assert_eq!(registry.runtime_count("RuntimeError"), 2);

    let snapshot = ExceptionSnapshot::new("RuntimeError", "boom");
    let diagnosis = registry.diagnose_with(&snapshot, &Translator::english(), &SourceCache::new());
    assert_eq!(diagnosis.entry, CauseEntry::with_hint("first cause\n", "first hint\n"));
}

#[test]
fn test_own_type_before_base_class() {
    let mut registry = Registry::empty();
    registry.add_runtime("LookupError", "first", first).add_runtime("KeyError", "second", second);
    let snapshot = ExceptionSnapshot::new("KeyError", "'a'").with_bases(&["LookupError"]);
    let diagnosis = registry.diagnose_with(&snapshot, &Translator::english(), &SourceCache::new());
    assert_eq!(diagnosis.analyzer, Some("second"));
}

#[test]
fn test_custom_syntax_analyzer() {
    let mut registry = Registry::empty();
    registry.add_message("message_echo", message_echo);

    let cache = SourceCache::new();
    cache.add("<custom>", "while x y:\n    pass\n");
    let snapshot = ExceptionSnapshot::new("SyntaxError", "custom parser message (<custom>, line 1)")
        .with_syntax(SyntaxDetails::new("<custom>", 1, 9).with_text("while x y:\n"));
    let diagnosis = registry.diagnose_with(&snapshot, &Translator::english(), &cache);

    assert_eq!(diagnosis.analyzer, Some("message_echo"));
    assert_eq!(diagnosis.entry.cause, "statement starts with `while`\n");
}

#[test]
fn test_builtin_diagnosis_is_deterministic() {
    let cache = Arc::new(SourceCache::new());
    cache.add("<det>", "items = [1, 2]\nitems[5]\n");
    let snapshot = Arc::new(
        ExceptionSnapshot::new("IndexError", "list index out of range").with_frame(
            Frame::new("<det>", 2).with_global("items", Value::list(vec![Value::int(1), Value::int(2)])),
        ),
    );
    let expected = diagnose(&snapshot, &Translator::english(), &cache);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let snapshot = Arc::clone(&snapshot);
            thread::spawn(move || diagnose(&snapshot, &Translator::english(), &cache))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
    assert!(!expected.is_fallback());
}

#[test]
fn test_unknown_type_falls_back() {
    let diagnosis = diagnose(&ExceptionSnapshot::new("Oops", "no"), &Translator::english(), &SourceCache::new());
    assert!(diagnosis.is_fallback());
    assert!(diagnosis.entry.cause.starts_with("No information is known about this exception.\n"));
}
