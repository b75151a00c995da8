//! Friendly explanations of Python exceptions
//!
//! An embedder captures an exception as an [`ExceptionSnapshot`] (type,
//! message, frames with their variables, syntax error details) and asks a
//! [`Session`] to explain it. The explanation is a map of named sections
//! (message, likely cause, hint, where it happened) rendered by a formatter
//! at the verbosity the user picked.

pub mod analysis;
pub mod errors;
pub mod infrastructure;
pub mod locale;
pub mod parser;
pub(crate) mod pattern;
pub mod report;
pub mod session;
pub mod snapshot;
pub mod source;
pub mod statement;
pub mod tokens;

pub use analysis::{CauseEntry, Diagnosis, Registry};
pub use errors::{ExplainError, Result};
pub use infrastructure::{Config, LogConfig};
pub use locale::Translator;
pub use report::{explain, Assembler, ExplanationMap, Handled, Section};
pub use session::{Include, Output, Session};
pub use snapshot::{ExceptionSnapshot, Frame, SyntaxDetails, Value};
pub use source::SourceCache;
pub use statement::Statement;
pub use tokens::{tokenize, untokenize, Token};
