//! Free-text search

use center_core::{CancelToken, PopulateStats, PopulationFilter, Result, Sink};
use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;

use crate::provider::LocalProvider;

/// Matches any one separator, so "gnome music" finds "gnome-music" and
/// "gnome_music" alike.
const SEPARATOR_CLASS: &str = "[-_ ]";

/// Turns a user query into a case-insensitive search pattern
///
/// Runs of spaces, hyphens and underscores outside bracket expressions are
/// replaced by a separator class. Returns `None` for a blank query or a
/// pattern that does not compile.
pub fn search_pattern(term: &str) -> Option<Regex> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }

    let mut normalized = String::with_capacity(term.len() + 8);
    let mut in_class = false;
    let mut escaped = false;
    let mut last_was_separator = false;

    for c in term.chars() {
        if escaped {
            normalized.push(c);
            escaped = false;
            last_was_separator = false;
            continue;
        }
        match c {
            '\\' => {
                normalized.push(c);
                escaped = true;
            }
            '[' if !in_class => {
                normalized.push(c);
                in_class = true;
            }
            ']' if in_class => {
                normalized.push(c);
                in_class = false;
            }
            ' ' | '-' | '_' if !in_class => {
                if !last_was_separator {
                    normalized.push_str(SEPARATOR_CLASS);
                }
                last_was_separator = true;
                continue;
            }
            _ => normalized.push(c),
        }
        last_was_separator = false;
    }

    match RegexBuilder::new(&normalized).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("Invalid search pattern {:?}: {}", term, e);
            None
        }
    }
}

impl LocalProvider {
    /// Searches both databases and emits the union in name order
    ///
    /// An invalid pattern yields no results rather than an error.
    pub(crate) fn populate_search(
        &self,
        sink: &mut dyn Sink,
        term: &str,
        cancel: &CancelToken,
    ) -> Result<PopulateStats> {
        let Some(pattern) = search_pattern(term) else {
            return Ok(PopulateStats::default());
        };

        let mut results: BTreeSet<String> = self.db.search_available(&pattern)?.into_iter().collect();
        if cancel.is_cancelled() {
            return Ok(PopulateStats { cancelled: true, ..Default::default() });
        }
        results.extend(self.db.search_installed(&pattern)?);

        log::debug!("Search {:?} matched {} packages", term, results.len());
        Ok(self.emit_all(
            sink,
            results.iter().map(String::as_str),
            PopulationFilter::Search,
            cancel,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaces_match_any_separator() {
        let re = search_pattern("gnome music").unwrap();
        assert!(re.is_match("gnome-music"));
        assert!(re.is_match("gnome_music"));
        assert!(re.is_match("gnome music"));
        assert!(!re.is_match("gnomemusic"));
    }

    #[test]
    fn test_hyphen_matches_underscore() {
        let re = search_pattern("python-gobject").unwrap();
        assert!(re.is_match("python_gobject"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(search_pattern("FIREFOX").unwrap().is_match("firefox"));
    }

    #[test]
    fn test_bracket_expression_left_alone() {
        let re = search_pattern("lib[a-z]+2").unwrap();
        assert!(re.is_match("libxml2"));
    }

    #[test]
    fn test_invalid_or_blank_pattern() {
        assert!(search_pattern("FIREFOX????(").is_none());
        assert!(search_pattern("   ").is_none());
    }
}
