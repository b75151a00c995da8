//! Regular expressions compiled on first use.

use regex::{Captures, Regex};
use tracing::error;

/// A compiled regular expression. A pattern that fails to compile is logged
/// once and then matches nothing.
#[derive(Debug)]
pub struct Pattern(Option<Regex>);

impl Pattern {
    pub fn new(pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(regex) => Self(Some(regex)),
            Err(err) => {
                error!(%err, "pattern failed to compile");
                Self(None)
            }
        }
    }

    pub fn regex(&self) -> Option<&Regex> {
        self.0.as_ref()
    }

    pub fn captures<'h>(&self, haystack: &'h str) -> Option<Captures<'h>> {
        self.0.as_ref()?.captures(haystack)
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.0.as_ref().is_some_and(|regex| regex.is_match(haystack))
    }

    /// End of the leftmost match.
    pub fn find_end(&self, haystack: &str) -> Option<usize> {
        self.0.as_ref()?.find(haystack).map(|m| m.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_pattern() {
        let pattern = Pattern::new(r"name '(.*)' is not defined");
        let caps = pattern.captures("name 'foo' is not defined").unwrap();
        assert_eq!(&caps[1], "foo");
        assert!(pattern.is_match("NameError: name 'x' is not defined"));
        assert_eq!(Pattern::new("b+").find_end("abbc"), Some(3));
    }

    #[test]
    fn test_invalid_pattern_matches_nothing() {
        let pattern = Pattern::new(r"(unclosed");
        assert!(pattern.regex().is_none());
        assert!(pattern.captures("(unclosed").is_none());
        assert!(!pattern.is_match("(unclosed"));
        assert_eq!(pattern.find_end("(unclosed"), None);
    }
}
