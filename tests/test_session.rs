use pyexplain::session::{self, Json};
use pyexplain::{
    Config, ExceptionSnapshot, Frame, Handled, Include, Output, Section, Session, SourceCache, Value,
};
use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn zero_division_session() -> (Session, ExceptionSnapshot) {
    let cache = Arc::new(SourceCache::new());
    cache.add("<calc>", "def ratio(a, b):\n    return a / b\n\nratio(1, 0)\n");
    let snapshot = ExceptionSnapshot::new("ZeroDivisionError", "division by zero")
        .with_frame(Frame::new("<calc>", 4))
        .with_frame(
            Frame::new("<calc>", 2)
                .in_function("ratio")
                .with_local("a", Value::int(1))
                .with_local("b", Value::int(0)),
        );
    let session = Session::new().with_cache(cache);
    session.set_output(Output::Capture);
    (session, snapshot)
}

#[test]
fn test_levels_select_sections() {
    let (session, snapshot) = zero_division_session();

    session.set_include(Include::from_level(0).unwrap());
    let message = session.render(&snapshot).unwrap();
    assert_eq!(message.trim(), "ZeroDivisionError: division by zero");

    session.set_include(Include::Explain);
    let explained = session.render(&snapshot).unwrap();
    assert!(explained.contains("A `ZeroDivisionError` occurs"));
    assert!(explained.contains("Exception raised on line 2 of file '<calc>'."));
    assert!(explained.contains("b: 0"));
    assert!(!explained.contains("Python exception:"));

    session.set_include(Include::PythonTb);
    let traceback = session.render(&snapshot).unwrap();
    assert!(traceback.contains("Traceback (most recent call last):"));
    assert!(traceback.contains("  File \"<calc>\", line 4, in <module>"));
    assert!(!traceback.contains("A `ZeroDivisionError` occurs"));
}

#[test]
fn test_explanation_is_reused() {
    let (session, snapshot) = zero_division_session();
    for include in [Include::Why, Include::Where, Include::Hint, Include::Explain] {
        session.set_include(include);
        session.explain(&snapshot);
    }
    let stats = session.stats();
    assert_eq!(stats.computed, 1);
    assert_eq!(stats.reused, 3);

    let other = ExceptionSnapshot::new("ValueError", "bad").with_frame(Frame::new("<calc>", 4));
    session.explain(&other);
    assert_eq!(session.stats().computed, 2);
}

#[test]
fn test_show_again_uses_current_settings() {
    let (session, snapshot) = zero_division_session();
    session.set_include(Include::Message);
    session.explain(&snapshot);
    session.get_captured(true);

    session.set_include(Include::Why);
    session.show_again();
    assert!(session.get_captured(true).contains("You are dividing by the following term"));
}

#[test]
fn test_json_formatter_and_writer() {
    let (session, snapshot) = zero_division_session();
    let buffer = SharedBuffer::default();
    session.set_output(Output::Writer(Box::new(buffer.clone())));
    session.set_formatter(Arc::new(Json));
    session.set_include(Include::More);
    session.explain(&snapshot);

    let value: serde_json::Value = serde_json::from_str(&buffer.text()).unwrap();
    assert_eq!(value[Section::ExceptionRaisedVariables.name()], "    a: 1\n    b: 0\n");
    assert!(value.get(Section::Generic.name()).is_none());
    assert!(value[Section::Cause.name()].as_str().unwrap().contains("which is equal to zero"));
}

#[test]
fn test_french_session() {
    let (session, snapshot) = zero_division_session();
    session.set_lang("fr").unwrap();
    session.set_include(Include::Where);
    let text = session.render(&snapshot).unwrap();
    assert!(text.contains("Exception levée à la ligne 2 du fichier '<calc>'."));
}

#[test]
fn test_from_config() {
    let config = Config::parse("[session]\ninclude = \"message\"\nformatter = \"json\"\n").unwrap();
    let session = Session::from_config(&config).unwrap();
    assert_eq!(session.include(), Include::Message);

    let config = Config::parse("[session]\nlang = \"xx\"\n").unwrap();
    assert!(Session::from_config(&config).is_err());
}

#[test]
fn test_install_hook() {
    let (session, snapshot) = zero_division_session();
    session.set_include(Include::Message);
    let session = Arc::new(session);

    assert!(matches!(session::report_uncaught(&snapshot), Handled::Propagate(_)));
    session::install(Arc::clone(&session));
    assert!(matches!(session::report_uncaught(&snapshot), Handled::Explained(_)));
    assert!(session.get_captured(true).contains("ZeroDivisionError: division by zero"));

    session::uninstall();
    assert!(!session::installed());
    assert!(matches!(session::report_uncaught(&snapshot), Handled::Propagate(_)));
}
