//! Builds the [`ExplanationMap`] of one exception.
//!
//! Work happens in stages: tracebacks and location first, then the generic
//! description and the likely cause. A panic while locating the exception
//! leaves only a short internal-error notice; a panic in a later stage is
//! logged and the sections gathered so far are kept.

use super::traceback;
use super::{ExplanationMap, Section};
use crate::analysis::generic::generic_explanation;
use crate::analysis::registry::{raised_line, syntax_message, Diagnosis, Registry};
use crate::analysis::variables::{get_var_info, MAX_LENGTH};
use crate::analysis::{RuntimeContext, SyntaxContext};
use crate::errors::{ExplainError, Result};
use crate::locale::{internal_error, Translator};
use crate::snapshot::{ExceptionSnapshot, Frame};
use crate::source::SourceCache;
use crate::statement::Statement;
use crate::tr;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, instrument};

/// Outcome of an explanation request.
#[derive(Debug, Clone, PartialEq)]
pub enum Handled {
    Explained(ExplanationMap),
    /// `SystemExit` and `KeyboardInterrupt` are handed back untouched.
    Propagate(ExceptionSnapshot),
}

impl Handled {
    pub fn map(&self) -> Option<&ExplanationMap> {
        match self {
            Handled::Explained(map) => Some(map),
            Handled::Propagate(_) => None,
        }
    }
}

/// Files whose content cannot be shown.
fn is_unavailable(filename: &str) -> bool {
    matches!(filename, "<unknown>" | "<string>")
}

fn cannot_analyze_stdin(t: &Translator) -> String {
    tr!(
        t,
        "Unfortunately, no additional information is available:\nthe content of file '<stdin>' is not accessible.\nAre you using a regular Python console instead of a pyexplain console?\n"
    )
}

fn improperly_formed(t: &Translator) -> String {
    tr!(
        t,
        "Warning: improperly formed exception.\nI suspect that a custom exception has been raised\nwith a non-string value used as a message.\nThis can occur if a `__repr__` or a `__str__` method\nraises an exception or does not return a string.\n"
    )
}

/// `NameError: name 'a' is not defined`, as on the last line of a
/// traceback.
pub fn message_line(snapshot: &ExceptionSnapshot) -> String {
    let message = if snapshot.is_syntax_error() {
        syntax_message(&snapshot.message)
    } else {
        snapshot.message.as_str()
    };
    if message.is_empty() {
        format!("{}\n", snapshot.type_name)
    } else {
        format!("{}: {}\n", snapshot.type_name, message)
    }
}

/// Runs one stage, turning a panic into an error.
fn stage(name: &'static str, f: impl FnOnce()) -> Result<()> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        ExplainError::Internal(format!("{} stage: {}", name, reason))
    })
}

pub struct Assembler<'a> {
    registry: &'a Registry,
    cache: &'a SourceCache,
    t: &'a Translator,
    max_length: usize,
}

impl<'a> Assembler<'a> {
    pub fn new(t: &'a Translator, cache: &'a SourceCache) -> Self {
        Self { registry: Registry::builtin(), cache, t, max_length: MAX_LENGTH }
    }

    pub fn with_registry(mut self, registry: &'a Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Longest repr shown in variable dumps.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    #[instrument(skip_all, fields(type_name = snapshot.type_name.as_str(), lang = self.t.lang()))]
    pub fn explain(&self, snapshot: &ExceptionSnapshot) -> Handled {
        self.assemble(snapshot, |snapshot| self.syntax_statement(snapshot))
    }

    /// `explain`, with the statement of a syntax error built by
    /// `build_statement` inside the guarded locate stage.
    fn assemble(
        &self,
        snapshot: &ExceptionSnapshot,
        build_statement: impl FnOnce(&ExceptionSnapshot) -> Statement,
    ) -> Handled {
        if snapshot.is_control_flow() {
            debug!("control flow exception, not explained");
            return Handled::Propagate(snapshot.clone());
        }

        let t = self.t;
        let message = message_line(snapshot);
        let mut map = ExplanationMap::new();
        map.insert(Section::Header, tr!(t, "Python exception:"));
        map.insert(Section::Message, message.clone());

        let mut statement = None;
        let located = stage("locate", || {
            statement = snapshot.is_syntax_error().then(|| build_statement(snapshot));
            let tracebacks = traceback::build(snapshot, self.cache, t, &message);
            map.insert(Section::SimulatedPythonTraceback, tracebacks.simulated);
            map.insert(Section::ShortenedTraceback, tracebacks.shortened);
            map.insert(Section::OriginalPythonTraceback, tracebacks.original);
            match &statement {
                Some(statement) => self.locate_parsing_error(snapshot, statement, &mut map),
                None => self.locate_runtime(snapshot, &mut map),
            }
        });
        if let Err(err) = located {
            error!(%err, "cannot locate exception");
            let mut minimal = ExplanationMap::new();
            minimal.insert(Section::Header, tr!(t, "Python exception:"));
            minimal.insert(Section::Message, message);
            minimal.insert(Section::Cause, internal_error(t, &err));
            return Handled::Explained(minimal);
        }

        if let Err(err) = stage("generic", || map.insert(Section::Generic, generic_explanation(t, snapshot))) {
            error!(%err, "cannot describe exception type");
        }
        if let Err(err) = stage("cause", || self.assign_cause(snapshot, statement.as_ref(), &mut map)) {
            error!(%err, "cannot determine cause");
            map.insert(Section::Cause, internal_error(t, &err));
        }
        Handled::Explained(map)
    }

    fn syntax_statement(&self, snapshot: &ExceptionSnapshot) -> Statement {
        let details = snapshot.syntax.clone().unwrap_or_default();
        let bad_line = details.text.clone().unwrap_or_default();
        Statement::from_cache(&details, syntax_message(&snapshot.message), &bad_line, self.cache)
    }

    /// Numbered excerpt around `lineno` and the text of that line.
    fn partial_source(&self, filename: &str, lineno: usize) -> (String, String) {
        let (mut source, line) = self.cache.get_formatted_excerpt(filename, lineno, None);
        if source.is_empty() {
            source = if filename == "<stdin>" {
                String::new()
            } else {
                tr!(self.t, "Problem: source of `{filename}` is not available\n", filename = filename)
            };
        }
        if !source.is_empty() && !source.ends_with('\n') {
            source.push('\n');
        }
        (source, line)
    }

    fn locate_runtime(&self, snapshot: &ExceptionSnapshot, map: &mut ExplanationMap) {
        let Some(raised) = snapshot.raised_frame() else {
            debug!("no frame to locate");
            return;
        };
        self.locate_exception_raised(raised, map);
        if let Some(first) = snapshot.frames.first().filter(|_| snapshot.frames.len() > 1) {
            if first.filename != raised.filename || first.lineno != raised.lineno {
                self.locate_last_call(first, map);
            }
        }
    }

    fn locate_exception_raised(&self, frame: &Frame, map: &mut ExplanationMap) {
        let t = self.t;
        map.insert(
            Section::ExceptionRaisedHeader,
            tr!(
                t,
                "Exception raised on line {linenumber} of file '{filename}'.\n",
                linenumber = frame.lineno,
                filename = frame.filename
            ),
        );
        if is_unavailable(&frame.filename) {
            map.insert(
                Section::ExceptionRaisedSource,
                tr!(
                    t,
                    "{filename} is not a regular Python file whose contents can be analyzed.\n",
                    filename = frame.filename
                ),
            );
            return;
        }
        let (source, line) = self.partial_source(&frame.filename, frame.lineno);
        map.insert(Section::ExceptionRaisedSource, source);
        map.insert(Section::ExceptionRaisedVariables, get_var_info(&line, frame, self.max_length));
    }

    fn locate_last_call(&self, frame: &Frame, map: &mut ExplanationMap) {
        map.insert(
            Section::LastCallHeader,
            tr!(
                self.t,
                "Execution stopped on line {linenumber} of file '{filename}'.\n",
                linenumber = frame.lineno,
                filename = frame.filename
            ),
        );
        let (source, line) = self.partial_source(&frame.filename, frame.lineno);
        map.insert(Section::LastCallSource, source);
        map.insert(Section::LastCallVariables, get_var_info(&line, frame, self.max_length));
    }

    fn locate_parsing_error(&self, snapshot: &ExceptionSnapshot, statement: &Statement, map: &mut ExplanationMap) {
        let t = self.t;
        let details = snapshot.syntax.clone().unwrap_or_default();
        let filename = details.filename.unwrap_or_default();
        if is_unavailable(&filename) {
            map.insert(
                Section::ParsingError,
                tr!(
                    t,
                    "`{filename}` is not a regular Python file whose contents\ncan be analyzed.\n",
                    filename = filename
                ),
            );
            return;
        }

        let mut partial_source = statement.format_statement();
        if partial_source.is_empty() {
            if let Some(lineno) = details.lineno {
                partial_source = self.cache.get_formatted_excerpt(&filename, lineno, details.offset).0;
            }
        }

        let text = if partial_source.contains("-->") {
            tr!(
                t,
                "Python could not understand the code in the file\n'{filename}'\nbeyond the location indicated by ^.\n",
                filename = filename
            )
        } else if snapshot.message.contains("unexpected EOF while parsing") {
            tr!(
                t,
                "Python could not understand the code the file\n'{filename}'.\nIt reached the end of the file and expected more content.\n",
                filename = filename
            )
        } else if !filename.is_empty() {
            tr!(
                t,
                "Python could not understand the code in the file\n'{filename}'\nfor an unspecified reason.\n",
                filename = filename
            )
        } else {
            String::new()
        };
        map.insert(Section::ParsingError, text);
        map.insert(Section::ParsingErrorSource, format!("{}\n", partial_source));
    }

    fn origin_filename<'s>(&self, snapshot: &'s ExceptionSnapshot) -> &'s str {
        if snapshot.is_syntax_error() {
            snapshot.syntax.as_ref().and_then(|d| d.filename.as_deref()).unwrap_or("<unknown>")
        } else {
            snapshot.raised_frame().map_or("", |frame| frame.filename.as_str())
        }
    }

    fn assign_cause(&self, snapshot: &ExceptionSnapshot, statement: Option<&Statement>, map: &mut ExplanationMap) {
        let t = self.t;
        let filename = self.origin_filename(snapshot);
        if is_unavailable(filename) {
            return;
        }
        if snapshot.str_failed() {
            map.insert(Section::Cause, improperly_formed(t));
            return;
        }
        if filename == "<stdin>" {
            map.insert(Section::Cause, cannot_analyze_stdin(t));
            return;
        }

        let (diagnosis, header) = match statement {
            Some(statement) => {
                let message = syntax_message(&snapshot.message);
                let ctx = SyntaxContext { statement, message, type_name: &snapshot.type_name, t };
                let header = if matches!(snapshot.type_name.as_str(), "IndentationError" | "TabError") {
                    tr!(t, "Probable cause:")
                } else if message == "invalid syntax" {
                    tr!(t, "Python's error message (invalid syntax) cannot be used to identify the problem:")
                } else {
                    tr!(t, "Likely cause based on the information given by Python:")
                };
                (self.registry.diagnose_syntax(&ctx), header)
            }
            None => {
                let empty = Frame::default();
                let frame = snapshot.raised_frame().unwrap_or(&empty);
                let bad_line = raised_line(frame, self.cache);
                let ctx = RuntimeContext {
                    snapshot,
                    frame,
                    bad_line: &bad_line,
                    message: &snapshot.message,
                    t,
                    cache: self.cache,
                };
                (self.registry.diagnose_runtime(&ctx), tr!(t, "Likely cause based on the information given by Python:"))
            }
        };

        let Diagnosis { analyzer, entry } = diagnosis;
        debug!(analyzer = analyzer.unwrap_or("fallback"), "cause assigned");
        if analyzer.is_some() {
            map.insert(Section::CauseHeader, header);
        }
        map.insert(Section::Cause, entry.cause);
        if let Some(hint) = entry.suggest {
            map.insert(Section::Suggest, hint);
        }
    }
}

/// Explains `snapshot` with the built-in registry and the shared source
/// cache.
pub fn explain(snapshot: &ExceptionSnapshot, t: &Translator) -> Handled {
    Assembler::new(t, SourceCache::global()).explain(snapshot)
}
