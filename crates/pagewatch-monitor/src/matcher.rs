//! Keyword match evaluation.
//!
//! Each keyword is matched literally and case-insensitively; regex
//! metacharacters in keywords carry no special meaning. Occurrences are
//! counted without overlap and summed across keywords.

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;

use regex::{Regex, RegexBuilder};
use tracing::warn;

use pagewatch_config::MonitorConfig;

/// Outcome of evaluating one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Sum of per-keyword counts.
    pub total_occurrences: usize,
    /// `total_occurrences >= min_count`.
    pub triggered: bool,
    /// Count for each keyword, in configured order.
    pub per_keyword: Vec<(String, usize)>,
}

/// Compiled keyword set with a threshold.
#[derive(Debug, Clone)]
pub struct MatchEvaluator {
    patterns: Vec<(String, Regex)>,
    min_count: usize,
}

impl MatchEvaluator {
    /// Compile `keywords`. Blank keywords are dropped and a `min_count` of
    /// zero is treated as one.
    pub fn new<S: AsRef<str>>(keywords: &[S], min_count: usize) -> Self {
        let patterns = keywords
            .iter()
            .map(AsRef::as_ref)
            .filter(|k| !k.trim().is_empty())
            .filter_map(|k| match literal_pattern(k) {
                Ok(re) => Some((k.to_string(), re)),
                Err(e) => {
                    warn!("Skipping keyword {:?}: {}", k, e);
                    None
                }
            })
            .collect();

        Self {
            patterns,
            min_count: min_count.max(1),
        }
    }

    /// Evaluator for the keywords and threshold in `config`.
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.active_keywords().as_slice(), config.effective_min_count())
    }

    /// Whether there is nothing to match.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn min_count(&self) -> usize {
        self.min_count
    }

    /// Count keyword occurrences in `text`.
    pub fn evaluate(&self, text: &str) -> MatchResult {
        let per_keyword: Vec<(String, usize)> = self
            .patterns
            .iter()
            .map(|(keyword, re)| (keyword.clone(), re.find_iter(text).count()))
            .collect();

        let total_occurrences = per_keyword.iter().map(|(_, n)| n).sum();
        let triggered = !self.patterns.is_empty() && total_occurrences >= self.min_count;

        MatchResult {
            total_occurrences,
            triggered,
            per_keyword,
        }
    }
}

/// One-shot evaluation of `text` against `keywords`.
pub fn evaluate<S: AsRef<str>>(text: &str, keywords: &[S], min_count: usize) -> MatchResult {
    MatchEvaluator::new(keywords, min_count).evaluate(text)
}

fn literal_pattern(keyword: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&regex::escape(keyword))
        .case_insensitive(true)
        .build()
}
