use serde::Serialize;

use crate::keyword::KeywordMatch;

/// Caret or selection reported by the host, in character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// The caret offset when nothing is selected.
    pub fn collapsed(&self) -> Option<usize> {
        self.is_collapsed().then_some(self.start)
    }

    /// Orders the bounds and pulls them inside `[0, len]`.
    pub fn clamped(&self, len: usize) -> Self {
        let start = self.start.min(self.end).min(len);
        let end = self.start.max(self.end).min(len);
        Self { start, end }
    }
}

/// Signals the tracker hands back to the widget after each host event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackerEvent {
    /// The active keyword changed to a match that satisfies the delay.
    KeywordMatched(KeywordMatch),
    SuggestionsOpened,
    SuggestionsClosed,
    /// Tracking went back to idle.
    TriggerSpanEnded,
}
