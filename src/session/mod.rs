//! Explanation sessions
//!
//! A [`Session`] holds the user's choices (verbosity, formatter, language,
//! output) and the last explanation. Asking for the same exception again,
//! at another verbosity for instance, reuses the stored explanation unless
//! the language changed in between.

pub mod formatter;
pub mod hook;
pub mod profile;

pub use formatter::{Formatter, Json, Repl};
pub use hook::{install, installed, report_uncaught, set_handler, uninstall, Handler};
pub use profile::Include;

use crate::analysis::registry::Registry;
use crate::analysis::variables::MAX_LENGTH;
use crate::errors::{ExplainError, Result};
use crate::infrastructure::config::Config;
use crate::locale::{internal_error, Translator};
use crate::report::{Assembler, ExplanationMap, Handled, Section};
use crate::snapshot::ExceptionSnapshot;
use crate::source::SourceCache;
use crate::tr;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Where rendered explanations go.
pub enum Output {
    Stderr,
    Stdout,
    /// Kept in memory; see [`Session::get_captured`]
    Capture,
    Writer(Box<dyn Write + Send>),
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Output::Stderr => f.write_str("Stderr"),
            Output::Stdout => f.write_str("Stdout"),
            Output::Capture => f.write_str("Capture"),
            Output::Writer(_) => f.write_str("Writer"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Explanations assembled from scratch
    pub computed: usize,
    /// Explanations served from the stored one
    pub reused: usize,
}

struct Saved {
    snapshot: ExceptionSnapshot,
    lang: String,
    map: ExplanationMap,
}

struct State {
    include: Include,
    formatter: Arc<dyn Formatter>,
    translator: Translator,
    output: Output,
    captured: String,
    saved: Option<Saved>,
    stats: SessionStats,
}

pub struct Session {
    state: Mutex<State>,
    /// Held while an explanation is being produced
    busy: Mutex<()>,
    cache: Option<Arc<SourceCache>>,
    registry: Option<Arc<Registry>>,
    max_length: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                include: Include::default(),
                formatter: Arc::new(Repl),
                translator: Translator::english(),
                output: Output::Stderr,
                captured: String::new(),
                saved: None,
                stats: SessionStats::default(),
            }),
            busy: Mutex::new(()),
            cache: None,
            registry: None,
            max_length: MAX_LENGTH,
        }
    }

    /// Session set up from the `[session]`, `[source]` and `[variables]`
    /// tables of `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let session = Self::new()
            .with_cache(Arc::new(SourceCache::new().with_context(config.source.context)))
            .with_max_length(config.variables.max_length);
        session.set_lang(&config.session.lang)?;
        session.set_include(config.session.include);
        session.set_formatter_name(&config.session.formatter)?;
        Ok(session)
    }

    /// Uses `cache` instead of the process-wide source cache.
    pub fn with_cache(mut self, cache: Arc<SourceCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn cache(&self) -> &SourceCache {
        self.cache.as_deref().unwrap_or_else(|| SourceCache::global())
    }

    pub fn set_include(&self, include: Include) {
        self.state.lock().include = include;
    }

    pub fn include(&self) -> Include {
        self.state.lock().include
    }

    pub fn set_formatter(&self, formatter: Arc<dyn Formatter>) {
        self.state.lock().formatter = formatter;
    }

    pub fn set_formatter_name(&self, name: &str) -> Result<()> {
        let formatter = formatter::by_name(name)
            .ok_or_else(|| ExplainError::Internal(format!("unknown formatter `{}`", name)))?;
        self.set_formatter(formatter);
        Ok(())
    }

    pub fn set_lang(&self, lang: &str) -> Result<()> {
        let translator = Translator::for_lang(lang)?;
        self.set_translator(translator);
        Ok(())
    }

    /// Uses `translator`, which may carry a custom catalog.
    pub fn set_translator(&self, translator: Translator) {
        debug!(lang = translator.lang(), "language set");
        self.state.lock().translator = translator;
    }

    pub fn lang(&self) -> String {
        self.state.lock().translator.lang().to_string()
    }

    pub fn set_output(&self, output: Output) {
        self.state.lock().output = output;
    }

    /// Text written while the output was [`Output::Capture`].
    pub fn get_captured(&self, flush: bool) -> String {
        let mut state = self.state.lock();
        if flush {
            std::mem::take(&mut state.captured)
        } else {
            state.captured.clone()
        }
    }

    pub fn stats(&self) -> SessionStats {
        self.state.lock().stats
    }

    /// Explanation map of `snapshot`, reusing the stored one when possible.
    #[instrument(skip_all, fields(type_name = snapshot.type_name.as_str()))]
    pub fn explanation(&self, snapshot: &ExceptionSnapshot) -> Handled {
        let Some(_busy) = self.busy.try_lock() else {
            warn!("explanation requested while another one is in progress");
            let t = self.state.lock().translator.clone();
            let mut map = ExplanationMap::new();
            map.insert(Section::Header, tr!(t, "Python exception:"));
            map.insert(Section::Message, crate::report::assembler::message_line(snapshot));
            map.insert(Section::Cause, internal_error(&t, &ExplainError::Reentrant));
            return Handled::Explained(map);
        };

        let translator = {
            let mut state = self.state.lock();
            let lang = state.translator.lang().to_string();
            if let Some(saved) = state.saved.as_ref().filter(|s| s.snapshot == *snapshot && s.lang == lang) {
                let map = saved.map.clone();
                state.stats.reused += 1;
                debug!("reusing stored explanation");
                return Handled::Explained(map);
            }
            state.translator.clone()
        };

        let mut assembler = Assembler::new(&translator, self.cache()).with_max_length(self.max_length);
        if let Some(registry) = &self.registry {
            assembler = assembler.with_registry(registry);
        }
        let handled = assembler.explain(snapshot);

        if let Handled::Explained(map) = &handled {
            let mut state = self.state.lock();
            state.stats.computed += 1;
            state.saved = Some(Saved {
                snapshot: snapshot.clone(),
                lang: translator.lang().to_string(),
                map: map.clone(),
            });
        }
        handled
    }

    /// Rendered explanation of `snapshot`; `None` for exceptions that must
    /// propagate.
    pub fn render(&self, snapshot: &ExceptionSnapshot) -> Option<String> {
        match self.explanation(snapshot) {
            Handled::Explained(map) => Some(self.render_map(&map)),
            Handled::Propagate(_) => None,
        }
    }

    fn render_map(&self, map: &ExplanationMap) -> String {
        let (formatter, include, t) = {
            let state = self.state.lock();
            (Arc::clone(&state.formatter), state.include, state.translator.clone())
        };
        let text = formatter.render(map, &include);
        if !text.is_empty() {
            return text;
        }
        match include {
            Include::Hint if map.contains(Section::Cause) => tr!(t, "I have no suggestion to offer; try `why`."),
            Include::Hint | Include::Why => tr!(t, "I have no suggestion to offer."),
            _ => String::new(),
        }
    }

    /// Explains `snapshot` and writes the result to the session output.
    pub fn explain(&self, snapshot: &ExceptionSnapshot) -> Handled {
        let handled = self.explanation(snapshot);
        if let Handled::Explained(map) = &handled {
            let text = self.render_map(map);
            self.write(&text);
        }
        handled
    }

    /// Writes the stored explanation again, with the current verbosity and
    /// language.
    pub fn show_again(&self) {
        let snapshot = self.state.lock().saved.as_ref().map(|saved| saved.snapshot.clone());
        match snapshot {
            Some(snapshot) => {
                self.explain(&snapshot);
            }
            None => {
                let t = self.state.lock().translator.clone();
                self.write(&tr!(t, "Nothing to show: no exception recorded.\n"));
            }
        }
    }

    fn write(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        let mut text = text.to_string();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let result = match &mut state.output {
            Output::Stderr => std::io::stderr().lock().write_all(text.as_bytes()),
            Output::Stdout => std::io::stdout().lock().write_all(text.as_bytes()),
            Output::Capture => {
                state.captured.push_str(&text);
                Ok(())
            }
            Output::Writer(writer) => writer.write_all(text.as_bytes()).and_then(|_| writer.flush()),
        };
        if let Err(err) = result {
            warn!(%err, "cannot write explanation");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Frame;

    fn session_with(source: &str) -> Session {
        let cache = Arc::new(SourceCache::new());
        cache.add("<session>", source);
        let session = Session::new().with_cache(cache);
        session.set_output(Output::Capture);
        session
    }

    fn name_error() -> ExceptionSnapshot {
        ExceptionSnapshot::new("NameError", "name 'foo' is not defined")
            .with_frame(Frame::new("<session>", 2).with_global("foo2", crate::snapshot::Value::int(1)))
    }

    #[test]
    fn test_explain_writes_output() {
        let session = session_with("foo2 = 1\nprint(foo)\n");
        session.set_include(Include::Hint);
        session.explain(&name_error());
        let text = session.get_captured(true);
        assert!(text.contains("Did you mean `foo2`?"));
        assert!(session.get_captured(true).is_empty());
    }

    #[test]
    fn test_reuse_until_language_changes() {
        let session = session_with("foo2 = 1\nprint(foo)\n");
        session.set_include(Include::Why);
        session.explain(&name_error());
        session.set_include(Include::Where);
        session.explain(&name_error());
        assert_eq!(session.stats(), SessionStats { computed: 1, reused: 1 });

        session.set_lang("fr").unwrap();
        session.explain(&name_error());
        assert_eq!(session.stats().computed, 2);
    }

    #[test]
    fn test_control_flow_not_written() {
        let session = session_with("raise SystemExit\n");
        let handled = session.explain(&ExceptionSnapshot::new("SystemExit", ""));
        assert!(matches!(handled, Handled::Propagate(_)));
        assert!(session.get_captured(true).is_empty());
    }

    #[test]
    fn test_no_suggestion() {
        let session = session_with("x = 1\n");
        session.set_include(Include::Hint);
        let snapshot = ExceptionSnapshot::new("RuntimeError", "odd").with_frame(Frame::new("<session>", 1));
        assert_eq!(session.render(&snapshot).as_deref(), Some("I have no suggestion to offer; try `why`."));
    }

    #[test]
    fn test_show_again_without_exception() {
        let session = session_with("");
        session.show_again();
        assert_eq!(session.get_captured(false), "Nothing to show: no exception recorded.\n");
    }

    #[test]
    fn test_unknown_settings() {
        let session = Session::new();
        assert!(session.set_lang("xx").is_err());
        assert!(session.set_formatter_name("rich").is_err());
        assert_eq!(session.lang(), "en");
    }
}
