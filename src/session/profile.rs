//! Verbosity profiles: which sections of an explanation are shown.

use crate::report::Section;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const WHERE: &[Section] = &[
    Section::ParsingError,
    Section::ParsingErrorSource,
    Section::LastCallHeader,
    Section::LastCallSource,
    Section::LastCallVariables,
    Section::ExceptionRaisedHeader,
    Section::ExceptionRaisedSource,
    Section::ExceptionRaisedVariables,
];

/// Named selection of sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Include {
    /// Last line of the traceback only
    Message,
    Hint,
    Generic,
    /// Message and generic description
    What,
    /// Likely cause
    Why,
    /// Location of the error with source excerpts and variables
    Where,
    /// Shortened traceback and hint
    FriendlyTb,
    PythonTb,
    DebugTb,
    /// Cause, header and location
    More,
    /// Everything except the full tracebacks
    #[default]
    Explain,
    /// `Explain` without the shortened traceback
    NoTb,
}

impl Include {
    pub const ALL: [Include; 12] = [
        Include::Message,
        Include::Hint,
        Include::Generic,
        Include::What,
        Include::Why,
        Include::Where,
        Include::FriendlyTb,
        Include::PythonTb,
        Include::DebugTb,
        Include::More,
        Include::Explain,
        Include::NoTb,
    ];

    /// Numbered verbosity, from terse (0) to the raw Python traceback (5).
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Include::Message),
            1 => Some(Include::Explain),
            2 => Some(Include::More),
            3 => Some(Include::FriendlyTb),
            4 => Some(Include::PythonTb),
            5 => Some(Include::DebugTb),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Include::Message => "message",
            Include::Hint => "hint",
            Include::Generic => "generic",
            Include::What => "what",
            Include::Why => "why",
            Include::Where => "where",
            Include::FriendlyTb => "friendly_tb",
            Include::PythonTb => "python_tb",
            Include::DebugTb => "debug_tb",
            Include::More => "more",
            Include::Explain => "explain",
            Include::NoTb => "no_tb",
        }
    }

    pub fn includes(self, section: Section) -> bool {
        match self {
            Include::Message => section == Section::Message,
            Include::Hint => section == Section::Suggest,
            Include::Generic => section == Section::Generic,
            Include::What => matches!(section, Section::Message | Section::Generic),
            Include::Why => section == Section::Cause,
            Include::Where => WHERE.contains(&section),
            Include::FriendlyTb => matches!(section, Section::ShortenedTraceback | Section::Suggest),
            Include::PythonTb => section == Section::SimulatedPythonTraceback,
            Include::DebugTb => section == Section::OriginalPythonTraceback,
            Include::More => section == Section::CauseHeader || Include::Why.includes(section) || Include::Where.includes(section),
            Include::Explain => {
                Include::FriendlyTb.includes(section) || Include::Generic.includes(section) || Include::More.includes(section)
            }
            Include::NoTb => section != Section::ShortenedTraceback && Include::Explain.includes(section),
        }
    }

    /// Selected sections in display order.
    pub fn sections(self) -> Vec<Section> {
        Section::ALL.into_iter().filter(|section| self.includes(*section)).collect()
    }
}

impl fmt::Display for Include {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Include {
    type Err = String;

    /// A name such as `why`, or a level from 0 to 5.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(level) = s.parse::<u8>() {
            return Include::from_level(level).ok_or_else(|| format!("{} is not a valid level (0 to 5)", level));
        }
        Include::ALL
            .into_iter()
            .find(|include| include.name() == s)
            .ok_or_else(|| format!("{} is not a valid value", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("why".parse::<Include>(), Ok(Include::Why));
        assert_eq!("0".parse::<Include>(), Ok(Include::Message));
        assert_eq!("5".parse::<Include>(), Ok(Include::DebugTb));
        assert!("6".parse::<Include>().is_err());
        assert!("everything".parse::<Include>().is_err());
        for include in Include::ALL {
            assert_eq!(include.name().parse::<Include>(), Ok(include));
        }
    }

    #[test]
    fn test_explain_sections() {
        let sections = Include::Explain.sections();
        assert_eq!(sections[0], Section::ShortenedTraceback);
        assert!(sections.contains(&Section::Suggest));
        assert!(sections.contains(&Section::CauseHeader));
        assert!(sections.contains(&Section::ExceptionRaisedVariables));
        assert!(!sections.contains(&Section::Header));
        assert!(!sections.contains(&Section::SimulatedPythonTraceback));
    }

    #[test]
    fn test_no_tb_drops_traceback_only() {
        let no_tb = Include::NoTb.sections();
        assert!(!no_tb.contains(&Section::ShortenedTraceback));
        assert_eq!(no_tb.len() + 1, Include::Explain.sections().len());
    }

    #[test]
    fn test_why_is_cause_only() {
        assert_eq!(Include::Why.sections(), vec![Section::Cause]);
        assert_eq!(Include::What.sections(), vec![Section::Message, Section::Generic]);
    }
}
