//! Process-wide handler for uncaught exceptions.
//!
//! Embedders report uncaught exceptions through [`report_uncaught`]. The slot
//! starts with whatever handler the embedder set (or none); [`install`]
//! replaces it with a session and [`uninstall`] puts the previous one back.

use super::Session;
use crate::report::Handled;
use crate::snapshot::ExceptionSnapshot;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

pub type Handler = Arc<dyn Fn(&ExceptionSnapshot) -> Handled + Send + Sync>;

#[derive(Default)]
struct Slot {
    current: Option<Handler>,
    /// Handler replaced by `install`, present while installed
    previous: Option<Option<Handler>>,
}

static SLOT: Lazy<Mutex<Slot>> = Lazy::new(|| Mutex::new(Slot::default()));

/// Replaces the current handler without affecting `install`/`uninstall`
/// bookkeeping; returns the handler it replaced.
pub fn set_handler(handler: Option<Handler>) -> Option<Handler> {
    std::mem::replace(&mut SLOT.lock().current, handler)
}

/// Handler currently in the slot.
pub fn current_handler() -> Option<Handler> {
    SLOT.lock().current.clone()
}

/// Routes uncaught exceptions to `session`. Installing again while
/// installed only swaps the session.
pub fn install(session: Arc<Session>) {
    let handler: Handler = Arc::new(move |snapshot: &ExceptionSnapshot| session.explain(snapshot));
    let mut slot = SLOT.lock();
    let replaced = std::mem::replace(&mut slot.current, Some(handler));
    if slot.previous.is_none() {
        slot.previous = Some(replaced);
        debug!("exception handler installed");
    }
}

/// Restores the handler that was in place before [`install`]. Does nothing
/// when not installed.
pub fn uninstall() {
    let mut slot = SLOT.lock();
    if let Some(previous) = slot.previous.take() {
        slot.current = previous;
        debug!("exception handler uninstalled");
    }
}

pub fn installed() -> bool {
    SLOT.lock().previous.is_some()
}

/// Hands `snapshot` to the current handler. Without a handler the exception
/// propagates.
pub fn report_uncaught(snapshot: &ExceptionSnapshot) -> Handled {
    let handler = current_handler();
    match handler {
        Some(handler) => handler(snapshot),
        None => Handled::Propagate(snapshot.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Include, Output};

    // The slot is process-wide; keep every scenario in one test.
    #[test]
    fn test_install_cycle() {
        let prior: Handler = Arc::new(|snapshot: &ExceptionSnapshot| Handled::Propagate(snapshot.clone()));
        set_handler(Some(Arc::clone(&prior)));

        let session = Arc::new(Session::new());
        session.set_output(Output::Capture);
        session.set_include(Include::Message);
        install(Arc::clone(&session));
        install(Arc::clone(&session));
        assert!(installed());

        let snapshot = ExceptionSnapshot::new("ValueError", "bad value");
        assert!(matches!(report_uncaught(&snapshot), Handled::Explained(_)));
        assert!(session.get_captured(true).contains("ValueError: bad value"));

        let exit = ExceptionSnapshot::new("SystemExit", "0");
        assert_eq!(report_uncaught(&exit), Handled::Propagate(exit.clone()));

        uninstall();
        uninstall();
        assert!(!installed());
        let restored = current_handler().unwrap();
        assert!(Arc::ptr_eq(&restored, &prior));

        set_handler(None);
        assert_eq!(report_uncaught(&snapshot), Handled::Propagate(snapshot.clone()));
    }
}
