//! Rendering an explanation map as text.

use super::profile::Include;
use crate::report::{ExplanationMap, Section};
use std::sync::Arc;

pub trait Formatter: Send + Sync {
    /// Text for the sections of `map` selected by `include`; empty when
    /// none of them is present.
    fn render(&self, map: &ExplanationMap, include: &Include) -> String;

    fn name(&self) -> &'static str;
}

/// Plain text for a terminal, indented like a Python traceback.
#[derive(Debug, Default, Clone, Copy)]
pub struct Repl;

fn repl_indentation(section: Section) -> &'static str {
    match section {
        Section::Header
        | Section::OriginalPythonTraceback
        | Section::SimulatedPythonTraceback
        | Section::ShortenedTraceback
        | Section::ParsingErrorSource
        | Section::LastCallSource
        | Section::ExceptionRaisedSource => "",
        Section::Suggest | Section::LastCallVariables | Section::ExceptionRaisedVariables => "        ",
        Section::Message
        | Section::Generic
        | Section::ParsingError
        | Section::CauseHeader
        | Section::Cause
        | Section::LastCallHeader
        | Section::ExceptionRaisedHeader => "    ",
    }
}

impl Formatter for Repl {
    fn render(&self, map: &ExplanationMap, include: &Include) -> String {
        let mut result = vec![String::new()];
        for section in include.sections() {
            let Some(text) = map.get(section) else { continue };
            let indentation = repl_indentation(section);
            result.extend(text.split('\n').map(|line| format!("{}{}", indentation, line)));
        }
        if result.len() == 1 {
            return String::new();
        }
        result.join("\n")
    }

    fn name(&self) -> &'static str {
        "repl"
    }
}

/// The selected sections as a JSON object keyed by section name.
#[derive(Debug, Default, Clone, Copy)]
pub struct Json;

impl Formatter for Json {
    fn render(&self, map: &ExplanationMap, include: &Include) -> String {
        let mut selected = ExplanationMap::new();
        for section in include.sections() {
            if let Some(text) = map.get(section) {
                selected.insert(section, text);
            }
        }
        if selected.is_empty() {
            return String::new();
        }
        serde_json::to_string_pretty(&selected).unwrap_or_else(|err| {
            tracing::error!(%err, "cannot serialize explanation");
            String::new()
        })
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

/// Built-in formatter called `name`.
pub fn by_name(name: &str) -> Option<Arc<dyn Formatter>> {
    match name {
        "repl" => Some(Arc::new(Repl)),
        "json" => Some(Arc::new(Json)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExplanationMap {
        let mut map = ExplanationMap::new();
        map.insert(Section::Header, "Python exception:");
        map.insert(Section::Message, "NameError: name 'a' is not defined\n");
        map.insert(Section::Cause, "The name `a` is unknown.\n");
        map.insert(Section::Suggest, "Did you mean `b`?\n");
        map
    }

    #[test]
    fn test_repl_indentation() {
        let text = Repl.render(&sample(), &Include::Why);
        assert_eq!(text, "\n    The name `a` is unknown.\n    ");
        let text = Repl.render(&sample(), &Include::Hint);
        assert_eq!(text, "\n        Did you mean `b`?\n        ");
    }

    #[test]
    fn test_nothing_selected() {
        assert_eq!(Repl.render(&sample(), &Include::Where), "");
        assert_eq!(Json.render(&sample(), &Include::Where), "");
    }

    #[test]
    fn test_json() {
        let text = Json.render(&sample(), &Include::What);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["message"], "NameError: name 'a' is not defined\n");
        assert!(value.get("cause").is_none());
    }

    #[test]
    fn test_by_name() {
        assert_eq!(by_name("json").map(|f| f.name()), Some("json"));
        assert!(by_name("rich").is_none());
    }
}
