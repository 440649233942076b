//! Course-code scanning.
//!
//! A token is one of:
//! - 1-6 letters, 1-3 digits, optionally `-` and 1-5 letters (`M208`, `MST125`, `TM470-X`)
//! - one letter and exactly two digits, with the same optional suffix
//! - the literal `QD`, in any case
//!
//! Matches are leftmost-first and non-overlapping. The scanner is a cursor:
//! each step searches from the end of the previous match, so a consumer that
//! stops early never pays for the rest of the text.

use once_cell::sync::Lazy;
use regex::Regex;

/// The token pattern as a single alternation.
pub const CODE_PATTERN: &str =
    r"[a-zA-Z]{1,6}[0-9]{1,3}(?:-[a-zA-Z]{1,5})?|[a-zA-Z][0-9]{2}(?:-[a-zA-Z]{1,5})?|[qQ][dD]";

static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(CODE_PATTERN).expect("code pattern is a valid regex"));

/// A single match: the literal substring and its byte offset in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeMatch<'t> {
    pub text: &'t str,
    pub start: usize,
}

impl<'t> CodeMatch<'t> {
    /// Byte offset just past the match.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    /// The canonical (uppercase) form used for catalog lookups.
    pub fn canonical(&self) -> String {
        self.text.to_ascii_uppercase()
    }
}

/// Start a fresh scan over `text`.
///
/// Scanning the same text twice yields the same sequence.
pub fn scan(text: &str) -> Scan<'_> {
    Scan { text, cursor: 0 }
}

/// Lazy, finite sequence of [`CodeMatch`]es in occurrence order.
#[derive(Debug, Clone)]
pub struct Scan<'t> {
    text: &'t str,
    cursor: usize,
}

impl<'t> Scan<'t> {
    /// The text being scanned.
    pub fn text(&self) -> &'t str {
        self.text
    }
}

impl<'t> Iterator for Scan<'t> {
    type Item = CodeMatch<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor > self.text.len() {
            return None;
        }
        match CODE_RE.find_at(self.text, self.cursor) {
            Some(m) => {
                // Every alternative consumes at least two characters.
                self.cursor = m.end();
                Some(CodeMatch {
                    text: m.as_str(),
                    start: m.start(),
                })
            }
            None => {
                self.cursor = self.text.len() + 1;
                None
            }
        }
    }
}

impl std::iter::FusedIterator for Scan<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn texts(input: &str) -> Vec<&str> {
        scan(input).map(|m| m.text).collect()
    }

    #[test]
    fn test_module_codes() {
        assert_eq!(texts("M208"), vec!["M208"]);
        assert_eq!(texts("m208 mst125"), vec!["m208", "mst125"]);
        assert_eq!(texts("T313 & T329 & M999"), vec!["T313", "T329", "M999"]);
    }

    #[test]
    fn test_suffix_and_qualifications() {
        assert_eq!(texts("TM470-X and B39-AB"), vec!["TM470-X", "B39-AB"]);
        assert_eq!(texts("doing the qd now, QD or Qd"), vec!["qd", "QD", "Qd"]);
    }

    #[test]
    fn test_offsets_follow_occurrence_order() {
        let matches: Vec<_> = scan("see M208, then MU123").collect();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].start, 4);
        assert_eq!(matches[0].end(), 8);
        assert_eq!(matches[1].start, 15);
        assert_eq!(matches[1].canonical(), "MU123");
    }

    #[test]
    fn test_non_overlapping_resume_after_match() {
        // Greedy digits stop at three; the fourth digit cannot start a new token.
        assert_eq!(texts("M2089"), vec!["M208"]);
        // Too many letters: the token begins where six or fewer remain.
        assert_eq!(texts("abcdefgh123"), vec!["cdefgh123"]);
        assert_eq!(texts("M208M208"), vec!["M208", "M208"]);
    }

    #[test]
    fn test_no_matches() {
        assert!(texts("").is_empty());
        assert!(texts("hello there, nothing to see").is_empty());
        assert!(texts("1234 - !!").is_empty());
    }

    #[test]
    fn test_scan_is_fused() {
        let mut s = scan("M208");
        assert!(s.next().is_some());
        assert!(s.next().is_none());
        assert!(s.next().is_none());
    }

    #[test]
    fn test_early_exit_leaves_rest_unscanned() {
        let mut s = scan("A111 B222 C333");
        assert_eq!(s.next().map(|m| m.text), Some("A111"));
        // A fresh scan starts from the beginning again.
        assert_eq!(scan(s.text()).count(), 3);
    }

    proptest! {
        #[test]
        fn test_scan_is_restartable(text in "[ -~]{0,80}") {
            let first: Vec<_> = scan(&text).collect();
            let second: Vec<_> = scan(&text).collect();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn test_matches_are_ordered_and_disjoint(text in "[a-zA-Z0-9 \\-]{0,80}") {
            let matches: Vec<_> = scan(&text).collect();
            for pair in matches.windows(2) {
                prop_assert!(pair[0].end() <= pair[1].start);
            }
            for m in &matches {
                prop_assert_eq!(&text[m.start..m.end()], m.text);
            }
        }
    }
}
