//! Analyzer registry
//!
//! Analyzers are plain functions kept in ordered lists. The first one that
//! returns an entry wins. Lists are filled once by the registration
//! functions of [`syntax`](super::syntax) and [`runtime`](super::runtime)
//! and never change afterwards.
//!
//! An analyzer that returns `Err` or panics is logged and skipped; the
//! chain carries on with the next one.

use super::{runtime, syntax, AnalyzerResult, CauseEntry, RuntimeContext, SyntaxContext};
use crate::locale::{no_information, Translator};
use crate::pattern::Pattern;
use crate::snapshot::{ExceptionSnapshot, Frame};
use crate::source::SourceCache;
use crate::statement::Statement;
use crate::tr;
use once_cell::sync::Lazy;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, instrument, warn};

pub type SyntaxAnalyzer = fn(&SyntaxContext<'_>) -> AnalyzerResult;
pub type RuntimeAnalyzer = fn(&RuntimeContext<'_>) -> AnalyzerResult;

static BUILTIN: Lazy<Registry> = Lazy::new(Registry::with_defaults);

static LOCATION_SUFFIX: Lazy<Pattern> =
    Lazy::new(|| Pattern::new(r"^(?s)(.*) \([^()]*, line \d+\)$"));

/// Entry chosen for an exception, with the analyzer that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    /// `None` when every analyzer declined and the fallback was used
    pub analyzer: Option<&'static str>,
    pub entry: CauseEntry,
}

impl Diagnosis {
    fn fallback(entry: CauseEntry) -> Self {
        Self { analyzer: None, entry }
    }

    pub fn is_fallback(&self) -> bool {
        self.analyzer.is_none()
    }
}

#[derive(Default)]
pub struct Registry {
    indentation: Vec<(&'static str, SyntaxAnalyzer)>,
    message: Vec<(&'static str, SyntaxAnalyzer)>,
    def_statement: Vec<(&'static str, SyntaxAnalyzer)>,
    statement: Vec<(&'static str, SyntaxAnalyzer)>,
    scanners: Vec<(&'static str, SyntaxAnalyzer)>,
    /// (exception type, analyzer name, analyzer)
    runtime: Vec<(&'static str, &'static str, RuntimeAnalyzer)>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        syntax::register(&mut registry);
        runtime::register(&mut registry);
        debug!(
            syntax = registry.syntax_len(),
            runtime = registry.runtime.len(),
            "analyzer registry built"
        );
        registry
    }

    /// Shared registry holding every built-in analyzer.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    pub fn add_indentation(&mut self, name: &'static str, analyzer: SyntaxAnalyzer) -> &mut Self {
        self.indentation.push((name, analyzer));
        self
    }

    pub fn add_message(&mut self, name: &'static str, analyzer: SyntaxAnalyzer) -> &mut Self {
        self.message.push((name, analyzer));
        self
    }

    pub fn add_def_statement(&mut self, name: &'static str, analyzer: SyntaxAnalyzer) -> &mut Self {
        self.def_statement.push((name, analyzer));
        self
    }

    pub fn add_statement(&mut self, name: &'static str, analyzer: SyntaxAnalyzer) -> &mut Self {
        self.statement.push((name, analyzer));
        self
    }

    pub fn add_scanner(&mut self, name: &'static str, analyzer: SyntaxAnalyzer) -> &mut Self {
        self.scanners.push((name, analyzer));
        self
    }

    pub fn add_runtime(&mut self, type_name: &'static str, name: &'static str, analyzer: RuntimeAnalyzer) -> &mut Self {
        self.runtime.push((type_name, name, analyzer));
        self
    }

    fn syntax_len(&self) -> usize {
        self.indentation.len() + self.message.len() + self.def_statement.len() + self.statement.len() + self.scanners.len()
    }

    /// Number of runtime analyzers registered for `type_name`.
    pub fn runtime_count(&self, type_name: &str) -> usize {
        self.runtime.iter().filter(|(ty, _, _)| *ty == type_name).count()
    }

    /// Cause of a syntax error located by `ctx.statement`.
    #[instrument(skip_all, fields(message = ctx.message))]
    pub fn diagnose_syntax(&self, ctx: &SyntaxContext<'_>) -> Diagnosis {
        let t = ctx.t;
        if matches!(ctx.type_name, "IndentationError" | "TabError") {
            return first_match(&self.indentation, ctx)
                .unwrap_or_else(|| Diagnosis::fallback(CauseEntry::new(no_information(t))));
        }

        let mut notice = String::new();
        if ctx.message != "invalid syntax" {
            if let Some(found) = first_match(&self.message, ctx) {
                return found;
            }
            notice = tr!(
                t,
                "Python gave us the following informative message\nabout the possible cause of the error:\n\n    {message}\n\nHowever, I do not recognize this information and I have\nto guess what caused the problem, but I might be wrong.\n\n",
                message = ctx.message
            );
        }

        let first = &ctx.statement.first_token;
        let is_def = *first == "def"
            || (*first == "async" && ctx.statement.tokens.get(1).is_some_and(|tok| *tok == "def"));
        if is_def {
            if let Some(found) = first_match(&self.def_statement, ctx) {
                return with_notice(notice, found);
            }
        }

        if let Some(found) = first_match(&self.statement, ctx) {
            if notice.is_empty() {
                notice = tr!(t, "I make an effort below to guess what caused the problem\nbut I might guess incorrectly.\n\n");
            }
            return with_notice(notice, found);
        }

        if let Some(found) = first_match(&self.scanners, ctx) {
            return with_notice(notice, found);
        }

        let mut cause = notice;
        cause.push_str(&tr!(
            t,
            "Currently, I cannot guess the likely cause of this error.\nTry to examine closely the line indicated as well as the line\nimmediately above to see if you can identify some misspelled\nword, or missing symbols, like (, ), [, ], :, etc.\n\nUnless your code uses type annotations, which are beyond our scope,\nif you think that this is something which should be improved,\nplease report this case.\n"
        ));
        Diagnosis::fallback(CauseEntry::new(cause))
    }

    /// Cause of a runtime error. Analyzers registered for the exception type
    /// run first, then those of its base classes, nearest first.
    #[instrument(skip_all, fields(type_name = ctx.snapshot.type_name.as_str()))]
    pub fn diagnose_runtime(&self, ctx: &RuntimeContext<'_>) -> Diagnosis {
        let snapshot = ctx.snapshot;
        let lineage = std::iter::once(snapshot.type_name.as_str()).chain(snapshot.bases.iter().map(String::as_str));
        for type_name in lineage {
            for &(_, name, analyzer) in self.runtime.iter().filter(|(ty, _, _)| *ty == type_name) {
                debug!(analyzer = name, "trying runtime analyzer");
                if let Some(entry) = run_guarded(name, analyzer, ctx) {
                    return Diagnosis { analyzer: Some(name), entry };
                }
            }
        }
        Diagnosis::fallback(CauseEntry::new(no_information(ctx.t)))
    }
}

fn with_notice(notice: String, mut found: Diagnosis) -> Diagnosis {
    if !notice.is_empty() {
        found.entry.cause = format!("{}{}", notice, found.entry.cause);
    }
    found
}

fn first_match(analyzers: &[(&'static str, SyntaxAnalyzer)], ctx: &SyntaxContext<'_>) -> Option<Diagnosis> {
    analyzers.iter().find_map(|&(name, analyzer)| {
        debug!(analyzer = name, "trying syntax analyzer");
        run_guarded(name, analyzer, ctx).map(|entry| Diagnosis { analyzer: Some(name), entry })
    })
}

/// Runs one analyzer, turning errors and panics into "no match".
fn run_guarded<C, F>(name: &'static str, analyzer: F, ctx: &C) -> Option<CauseEntry>
where
    F: Fn(&C) -> AnalyzerResult,
{
    match panic::catch_unwind(AssertUnwindSafe(|| analyzer(ctx))) {
        Ok(Ok(entry)) => entry,
        Ok(Err(err)) => {
            warn!(analyzer = name, %err, "analyzer failed");
            None
        }
        Err(payload) => {
            warn!(analyzer = name, panic = panic_message(payload.as_ref()), "analyzer panicked");
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text
    } else {
        "unknown panic"
    }
}

/// Parser message of a syntax error, without the `(file, line N)` suffix
/// that `str()` appends.
pub fn syntax_message(message: &str) -> &str {
    LOCATION_SUFFIX
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map_or(message, |m| m.as_str())
}

/// Diagnoses `snapshot` with the built-in registry.
#[instrument(skip_all, fields(type_name = snapshot.type_name.as_str()))]
pub fn diagnose(snapshot: &ExceptionSnapshot, t: &Translator, cache: &SourceCache) -> Diagnosis {
    Registry::builtin().diagnose_with(snapshot, t, cache)
}

impl Registry {
    /// Locates the offending code of `snapshot` and runs the matching chain.
    pub fn diagnose_with(&self, snapshot: &ExceptionSnapshot, t: &Translator, cache: &SourceCache) -> Diagnosis {
        if snapshot.is_syntax_error() {
            let details = snapshot.syntax.clone().unwrap_or_default();
            let message = syntax_message(&snapshot.message);
            let bad_line = details.text.clone().unwrap_or_default();
            let statement = Statement::from_cache(&details, message, &bad_line, cache);
            let ctx = SyntaxContext { statement: &statement, message, type_name: &snapshot.type_name, t };
            return self.diagnose_syntax(&ctx);
        }

        let empty = Frame::default();
        let frame = snapshot.raised_frame().unwrap_or(&empty);
        let bad_line = raised_line(frame, cache);
        let ctx = RuntimeContext { snapshot, frame, bad_line: &bad_line, message: &snapshot.message, t, cache };
        self.diagnose_runtime(&ctx)
    }
}

/// Stripped source line where `frame` stopped, empty when unavailable.
pub fn raised_line(frame: &Frame, cache: &SourceCache) -> String {
    frame
        .lineno
        .checked_sub(1)
        .and_then(|index| cache.get_lines(&frame.filename).get(index).cloned())
        .map(|line| line.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExplainError;
    use crate::snapshot::SyntaxDetails;

    fn failing(_: &RuntimeContext<'_>) -> AnalyzerResult {
        Err(ExplainError::analyzer("failing", "broken on purpose"))
    }

    fn panicking(_: &RuntimeContext<'_>) -> AnalyzerResult {
        panic!("analyzer bug")
    }

    fn declining(_: &RuntimeContext<'_>) -> AnalyzerResult {
        Ok(None)
    }

    fn answering(_: &RuntimeContext<'_>) -> AnalyzerResult {
        Ok(Some(CauseEntry::new("found it\n")))
    }

    fn never(_: &RuntimeContext<'_>) -> AnalyzerResult {
        Ok(Some(CauseEntry::new("should not be reached\n")))
    }

    #[test]
    fn test_faults_are_skipped() {
        let mut registry = Registry::empty();
        registry
            .add_runtime("ValueError", "failing", failing)
            .add_runtime("ValueError", "panicking", panicking)
            .add_runtime("ValueError", "declining", declining)
            .add_runtime("ValueError", "answering", answering)
            .add_runtime("ValueError", "never", never);
        let snapshot = ExceptionSnapshot::new("ValueError", "bad value");
        let diagnosis = registry.diagnose_with(&snapshot, &Translator::english(), &SourceCache::new());
        assert_eq!(diagnosis.analyzer, Some("answering"));
        assert_eq!(diagnosis.entry.cause, "found it\n");
    }

    #[test]
    fn test_base_class_analyzers() {
        let mut registry = Registry::empty();
        registry.add_runtime("KeyError", "answering", answering);
        let snapshot = ExceptionSnapshot::new("MyKeyError", "x").with_bases(&["KeyError", "LookupError"]);
        let diagnosis = registry.diagnose_with(&snapshot, &Translator::english(), &SourceCache::new());
        assert_eq!(diagnosis.analyzer, Some("answering"));
    }

    #[test]
    fn test_fallback() {
        let registry = Registry::empty();
        let snapshot = ExceptionSnapshot::new("ValueError", "bad value");
        let diagnosis = registry.diagnose_with(&snapshot, &Translator::english(), &SourceCache::new());
        assert!(diagnosis.is_fallback());
        assert!(diagnosis.entry.cause.contains("Please report"));
    }

    #[test]
    fn test_syntax_fallback() {
        let cache = SourceCache::new();
        cache.add("<fallback>", "x = = 1\n");
        let snapshot = ExceptionSnapshot::new("SyntaxError", "invalid syntax (<fallback>, line 1)")
            .with_syntax(SyntaxDetails::new("<fallback>", 1, 5).with_text("x = = 1\n"));
        let diagnosis = Registry::empty().diagnose_with(&snapshot, &Translator::english(), &cache);
        assert!(diagnosis.is_fallback());
        assert!(diagnosis.entry.cause.starts_with("Currently, I cannot guess"));
    }

    #[test]
    fn test_syntax_message() {
        assert_eq!(syntax_message("invalid syntax (<string>, line 3)"), "invalid syntax");
        assert_eq!(syntax_message("invalid syntax"), "invalid syntax");
        assert_eq!(syntax_message("unmatched ')'"), "unmatched ')'");
    }
}
