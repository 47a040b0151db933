//! Whole-string regex matching.
//!
//! Filter, selection and version patterns must match the entire input, not a
//! substring, so every pattern is compiled inside an anchored non-capturing
//! group. Capture group numbering of the user pattern is unchanged.

use regex::Regex;

use crate::error::{Error, Result};

/// A compiled pattern that only matches complete strings.
#[derive(Debug, Clone)]
pub struct FullMatch {
    source: String,
    regex: Regex,
}

impl FullMatch {
    /// Compile `pattern` with implicit `^` and `$` anchors.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|e| Error::invalid_regex(pattern, e))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as configured, without anchors.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }

    /// First capture group of a whole-string match.
    ///
    /// Returns `None` when the input does not match completely, when the
    /// pattern has no capture group, or when group 1 did not participate.
    pub fn first_group<'h>(&self, haystack: &'h str) -> Option<&'h str> {
        if self.regex.captures_len() < 2 {
            return None;
        }
        self.regex
            .captures(haystack)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_match_requires_whole_string() {
        let pattern = FullMatch::new("app-\\d+").unwrap();
        assert!(pattern.is_match("app-12"));
        assert!(!pattern.is_match("my-app-12"));
        assert!(!pattern.is_match("app-12.jar"));
    }

    #[test]
    fn test_alternation_is_anchored_as_a_whole() {
        let pattern = FullMatch::new("a|b").unwrap();
        assert!(pattern.is_match("a"));
        assert!(!pattern.is_match("ab"));
    }

    #[test]
    fn test_first_group() {
        let pattern = FullMatch::new(r"libs/app-(\d+\.\d+\.\d+)\.jar").unwrap();
        assert_eq!(pattern.first_group("libs/app-1.2.3.jar"), Some("1.2.3"));
        assert_eq!(pattern.first_group("libs/app-1.2.3"), None);
    }

    #[test]
    fn test_first_group_without_capture() {
        let pattern = FullMatch::new(r"libs/.*\.jar").unwrap();
        assert_eq!(pattern.first_group("libs/app.jar"), None);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = FullMatch::new("app-(").unwrap_err();
        assert!(matches!(err, Error::InvalidRegex { .. }));
    }
}
