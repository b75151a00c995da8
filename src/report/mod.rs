//! Explanation assembly
//!
//! [`Assembler`] turns an exception snapshot into an [`ExplanationMap`]:
//! an ordered set of named sections (message, tracebacks, generic
//! description, likely cause, location excerpts). Formatters pick the
//! sections they show from that map.

pub mod assembler;
pub mod traceback;

pub use assembler::{explain, Assembler, Handled};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Name of one piece of an explanation. Variants are declared in display
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Header,
    Message,
    OriginalPythonTraceback,
    SimulatedPythonTraceback,
    ShortenedTraceback,
    Suggest,
    Generic,
    ParsingError,
    ParsingErrorSource,
    CauseHeader,
    Cause,
    LastCallHeader,
    LastCallSource,
    LastCallVariables,
    ExceptionRaisedHeader,
    ExceptionRaisedSource,
    ExceptionRaisedVariables,
}

impl Section {
    pub const ALL: [Section; 17] = [
        Section::Header,
        Section::Message,
        Section::OriginalPythonTraceback,
        Section::SimulatedPythonTraceback,
        Section::ShortenedTraceback,
        Section::Suggest,
        Section::Generic,
        Section::ParsingError,
        Section::ParsingErrorSource,
        Section::CauseHeader,
        Section::Cause,
        Section::LastCallHeader,
        Section::LastCallSource,
        Section::LastCallVariables,
        Section::ExceptionRaisedHeader,
        Section::ExceptionRaisedSource,
        Section::ExceptionRaisedVariables,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Section::Header => "header",
            Section::Message => "message",
            Section::OriginalPythonTraceback => "original_python_traceback",
            Section::SimulatedPythonTraceback => "simulated_python_traceback",
            Section::ShortenedTraceback => "shortened_traceback",
            Section::Suggest => "suggest",
            Section::Generic => "generic",
            Section::ParsingError => "parsing_error",
            Section::ParsingErrorSource => "parsing_error_source",
            Section::CauseHeader => "cause_header",
            Section::Cause => "cause",
            Section::LastCallHeader => "last_call_header",
            Section::LastCallSource => "last_call_source",
            Section::LastCallVariables => "last_call_variables",
            Section::ExceptionRaisedHeader => "exception_raised_header",
            Section::ExceptionRaisedSource => "exception_raised_source",
            Section::ExceptionRaisedVariables => "exception_raised_variables",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.name() == s)
            .ok_or_else(|| format!("unknown section `{}`", s))
    }
}

/// Ordered section → text map. Sections are never empty: inserting blank
/// text removes the section instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExplanationMap {
    sections: BTreeMap<Section, String>,
}

impl ExplanationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, section: Section, text: impl Into<String>) {
        let text = text.into();
        if text.trim().is_empty() {
            self.sections.remove(&section);
        } else {
            self.sections.insert(section, text);
        }
    }

    pub fn get(&self, section: Section) -> Option<&str> {
        self.sections.get(&section).map(String::as_str)
    }

    pub fn contains(&self, section: Section) -> bool {
        self.sections.contains_key(&section)
    }

    pub fn remove(&mut self, section: Section) -> Option<String> {
        self.sections.remove(&section)
    }

    /// Sections in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Section, &str)> {
        self.sections.iter().map(|(section, text)| (*section, text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_sections_are_dropped() {
        let mut map = ExplanationMap::new();
        map.insert(Section::Cause, "because\n");
        map.insert(Section::Suggest, "  \n");
        assert!(map.contains(Section::Cause));
        assert!(!map.contains(Section::Suggest));

        map.insert(Section::Cause, "");
        assert!(map.is_empty());
    }

    #[test]
    fn test_display_order() {
        let mut map = ExplanationMap::new();
        map.insert(Section::Cause, "c");
        map.insert(Section::Header, "h");
        map.insert(Section::Generic, "g");
        let order: Vec<Section> = map.iter().map(|(section, _)| section).collect();
        assert_eq!(order, vec![Section::Header, Section::Generic, Section::Cause]);
    }

    #[test]
    fn test_names() {
        for section in Section::ALL {
            assert_eq!(section.name().parse::<Section>(), Ok(section));
        }
        assert!("footer".parse::<Section>().is_err());
    }

    #[test]
    fn test_json_keys() {
        let mut map = ExplanationMap::new();
        map.insert(Section::ExceptionRaisedHeader, "here\n");
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"exception_raised_header":"here\n"}"#);
        let back: ExplanationMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
