//! `OSError` and the subclasses worth a specific explanation.

use crate::analysis::registry::Registry;
use crate::analysis::syntax::cause;
use crate::analysis::{AnalyzerResult, RuntimeContext};
use crate::locale::Translator;
use crate::tr;

pub fn register(registry: &mut Registry) {
    registry
        .add_runtime("FileNotFoundError", "file_not_found", file_not_found)
        .add_runtime("ConnectionError", "connection_error", connection_error)
        .add_runtime("OSError", "socket_error", socket_error);
}

/// `[Errno 2] No such file or directory: 'data.txt'`
fn file_not_found(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let Some(filename) = ctx.message.split('\'').nth(1) else {
        return Ok(None);
    };
    cause(tr!(
        ctx.t,
        "In your program, the name of the\nfile that cannot be found is `{filename}`.\n",
        filename = filename
    ))
}

fn cannot_connect(t: &Translator) -> AnalyzerResult {
    cause(tr!(
        t,
        "I suspect that you are trying to connect to a server and\nthat a connection cannot be made.\n\nIf that is the case, check for typos in the URL\nand check your internet connectivity.\n"
    ))
}

fn connection_error(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    cannot_connect(ctx.t)
}

/// `socket.error` is an alias of `OSError`; only blame the network when the
/// program uses sockets.
fn socket_error(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    if !ctx.snapshot.modules.contains_key("socket") {
        return Ok(None);
    }
    cannot_connect(ctx.t)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{explain, raised_on};
    use crate::analysis::registry::Registry;
    use crate::locale::Translator;
    use crate::snapshot::{Frame, Value};

    #[test]
    fn test_file_not_found() {
        let message = "[Errno 2] No such file or directory: 'data.txt'";
        let (name, text, _) = explain("FileNotFoundError", message, "open('data.txt')", Frame::new("", 1));
        assert_eq!(name, Some("file_not_found"));
        assert_eq!(text, "In your program, the name of the\nfile that cannot be found is `data.txt`.\n");
    }

    #[test]
    fn test_connection_subclass_uses_base() {
        let (snapshot, cache) =
            raised_on("ConnectionRefusedError", "[Errno 111] Connection refused", "s.connect(addr)", Frame::new("", 1));
        let snapshot = snapshot.with_bases(&["ConnectionError", "OSError", "Exception", "BaseException"]);
        let diagnosis = Registry::builtin().diagnose_with(&snapshot, &Translator::english(), &cache);
        assert_eq!(diagnosis.analyzer, Some("connection_error"));
        assert!(diagnosis.entry.cause.starts_with("I suspect that you are trying to connect to a server"));
    }

    #[test]
    fn test_os_error_without_socket() {
        let (name, _, _) = explain("OSError", "[Errno 22] Invalid argument", "f()", Frame::new("", 1));
        assert_eq!(name, None);

        let (snapshot, cache) = raised_on("OSError", "[Errno 101] Network is unreachable", "f()", Frame::new("", 1));
        let snapshot = snapshot.with_module("socket", Value::module("socket", &["socket"]));
        let diagnosis = Registry::builtin().diagnose_with(&snapshot, &Translator::english(), &cache);
        assert_eq!(diagnosis.analyzer, Some("socket_error"));
    }
}
