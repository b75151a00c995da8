//! Cause analysis
//!
//! Everything that turns an exception into a likely cause: the analyzer
//! registry, the syntax and runtime analyzer catalogs, generic descriptions
//! of exception types and the helpers they share (similar names, safe
//! evaluation, variable dumps).

pub mod eval;
pub mod generic;
pub mod registry;
pub mod runtime;
pub mod similar;
pub mod stdlib;
pub mod syntax;
pub mod variables;

pub use registry::{diagnose, Diagnosis, Registry, RuntimeAnalyzer, SyntaxAnalyzer};

use crate::errors::Result;
use crate::locale::Translator;
use crate::snapshot::{ExceptionSnapshot, Frame};
use crate::source::SourceCache;
use crate::statement::Statement;
use serde::Serialize;

/// What an analyzer concluded: the likely cause and, sometimes, a one-line
/// hint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CauseEntry {
    pub cause: String,
    pub suggest: Option<String>,
}

impl CauseEntry {
    pub fn new(cause: impl Into<String>) -> Self {
        Self { cause: cause.into(), suggest: None }
    }

    pub fn with_hint(cause: impl Into<String>, hint: impl Into<String>) -> Self {
        Self { cause: cause.into(), suggest: Some(hint.into()) }
    }
}

/// `Ok(None)` means the analyzer does not recognize the problem.
pub type AnalyzerResult = Result<Option<CauseEntry>>;

/// Input of a syntax analyzer.
pub struct SyntaxContext<'a> {
    pub statement: &'a Statement,
    /// Parser message without the trailing `(file, line N)`
    pub message: &'a str,
    /// `SyntaxError`, `IndentationError` or `TabError`
    pub type_name: &'a str,
    pub t: &'a Translator,
}

/// Input of a runtime analyzer.
pub struct RuntimeContext<'a> {
    pub snapshot: &'a ExceptionSnapshot,
    /// Frame where the exception was raised; empty when none was captured
    pub frame: &'a Frame,
    /// Stripped source line of that frame
    pub bad_line: &'a str,
    pub message: &'a str,
    pub t: &'a Translator,
    pub cache: &'a SourceCache,
}

impl RuntimeContext<'_> {
    /// First argument of the exception, as passed to its constructor.
    pub fn first_arg(&self) -> Option<&crate::snapshot::Value> {
        self.snapshot.args.first()
    }
}
