//! Keyword extraction for a trigger span.
//!
//! Patterns are compiled once per [`TriggerConfig`]; the trigger and its
//! location rule are fixed for the lifetime of a [`KeywordMatcher`].

use regex_lite::Regex;
use serde::Serialize;

use crate::config::ConfigError;
use crate::config::TriggerConfig;
use crate::config::TriggerLocation;
use crate::interval::TriggerInterval;

/// How far past a span's cached end the matcher looks when re-deriving it.
/// Autocorrect can rewrite a word into a longer one in a single edit.
pub const MAX_EXPECTED_AUTOCORRECT_DIFFERENCE: usize = 10;

const KEYWORD_CLASS: &str = "[a-z0-9_-]";

/// The keyword reported for the active span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordMatch {
    /// Trigger character plus the matched keyword characters.
    pub keyword: String,
    /// Every tracked interval at the time of the match.
    pub intervals: Vec<TriggerInterval>,
    pub active_index: usize,
}

impl KeywordMatch {
    /// The keyword without its leading trigger, suitable as a search query.
    pub fn query(&self) -> &str {
        let mut chars = self.keyword.chars();
        chars.next();
        chars.as_str()
    }
}

#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    trigger: char,
    trigger_location: TriggerLocation,
    /// Trigger followed by at least `trigger_delay` keyword characters.
    keyword: Regex,
    /// Trigger followed by any run of keyword characters.
    span: Regex,
}

impl KeywordMatcher {
    pub fn new(config: &TriggerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let trigger = regex_lite::escape(&config.trigger.to_string());
        let keyword = Regex::new(&format!(
            "(?i)^{trigger}{KEYWORD_CLASS}{{{},}}",
            config.trigger_delay
        ))?;
        let span = Regex::new(&format!("(?i)^{trigger}{KEYWORD_CLASS}*"))?;
        Ok(Self {
            trigger: config.trigger,
            trigger_location: config.trigger_location,
            keyword,
            span,
        })
    }

    pub fn trigger(&self) -> char {
        self.trigger
    }

    /// Whether a trigger at `position` satisfies the configured location rule.
    pub fn at_word_boundary(&self, text: &[char], position: usize) -> bool {
        match self.trigger_location {
            TriggerLocation::Anywhere => true,
            TriggerLocation::NewWordOnly => position
                .checked_sub(1)
                .and_then(|previous| text.get(previous))
                .is_none_or(|ch| ch.is_whitespace()),
        }
    }

    /// Re-anchors the end of `interval` against the live text.
    ///
    /// Looks up to [`MAX_EXPECTED_AUTOCORRECT_DIFFERENCE`] characters past the
    /// cached end. Returns `None` when the trigger is no longer at `start`, in
    /// which case the caller keeps the interval as it is.
    pub fn rederive_end(&self, text: &[char], interval: TriggerInterval) -> Option<usize> {
        let window_end = text
            .len()
            .min(interval.end + 1 + MAX_EXPECTED_AUTOCORRECT_DIFFERENCE);
        let window: String = text.get(interval.start..window_end)?.iter().collect();
        let found = self.span.find(&window)?;
        let matched = found.as_str().chars().count();
        Some(interval.start + matched - 1)
    }

    /// Extracts the keyword that starts at `interval.start`.
    ///
    /// The search runs to the first whitespace at or after the cached end, so
    /// a lagging end still yields the whole keyword. Returns `None` when the
    /// text no longer supports a keyword there, including one that is shorter
    /// than the configured delay.
    pub fn extract(&self, text: &[char], interval: TriggerInterval) -> Option<String> {
        if !self.at_word_boundary(text, interval.start) {
            return None;
        }
        let window_end = interval.end + distance_to_next_whitespace(text, interval.end);
        let window_end = window_end.max(interval.start + 1).min(text.len());
        let window: String = text.get(interval.start..window_end)?.iter().collect();
        self.keyword
            .find(&window)
            .map(|found| found.as_str().to_string())
    }
}

/// Characters from `position` up to the next whitespace (or the end of text).
fn distance_to_next_whitespace(text: &[char], position: usize) -> usize {
    let rest = text.get(position..).unwrap_or_default();
    rest.iter()
        .position(|ch| ch.is_whitespace())
        .unwrap_or(rest.len())
}
