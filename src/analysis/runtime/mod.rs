//! Runtime analyzers
//!
//! One submodule per exception type. Each registers, in order, one analyzer
//! per message shape it knows; an analyzer whose pattern does not match
//! returns `Ok(None)` and the next one is tried.

pub mod attribute_error;
pub mod import_error;
pub mod index_error;
pub mod key_error;
pub mod module_not_found;
pub mod name_error;
pub mod os_error;
pub mod type_error;
pub mod unbound_local;
pub mod value_error;
pub mod zero_division;

use super::registry::{raised_line, Registry};
use super::RuntimeContext;
use crate::snapshot::Frame;

pub fn register(registry: &mut Registry) {
    name_error::register(registry);
    unbound_local::register(registry);
    type_error::register(registry);
    index_error::register(registry);
    key_error::register(registry);
    import_error::register(registry);
    module_not_found::register(registry);
    attribute_error::register(registry);
    value_error::register(registry);
    zero_division::register(registry);
    os_error::register(registry);
}

/// Caller of the frame that raised, with its stripped source line.
///
/// Exceptions raised explicitly inside library code (`raise KeyError(...)`)
/// are better explained from the line that called into that code.
pub(crate) fn calling_site<'a>(ctx: &RuntimeContext<'a>) -> Option<(&'a Frame, String)> {
    let frames = &ctx.snapshot.frames;
    let caller = frames.len().checked_sub(2).and_then(|i| frames.get(i))?;
    Some((caller, raised_line(caller, ctx.cache)))
}

/// `a`, `b` → "`a`, `b`"
pub(crate) fn backticked<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| format!("`{}`", n.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn is_raise_statement(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("raise ") || line.starts_with("raise\t")
}
