use mentions_tracker::KeywordMatch;
use mentions_tracker::TriggerInterval;
use serde::Serialize;

/// Callbacks the embedding application receives from the widget.
///
/// Only [`MentionsHandler::on_keyword`] is required; a host that renders its
/// own suggestions list usually cares about nothing else.
pub trait MentionsHandler {
    /// The buffer changed, either by the user or by a keyword deletion.
    fn on_change_text(&mut self, _text: &str) {}

    /// A new keyword for the active span; fetch suggestions for it.
    fn on_keyword(&mut self, keyword: &KeywordMatch);

    fn on_open_suggestions_panel(&mut self) {}

    fn on_close_suggestions_panel(&mut self) {}

    /// The caret left the active span or the span was deleted.
    fn on_trigger_span_ended(&mut self) {}
}

impl<H: MentionsHandler + ?Sized> MentionsHandler for &mut H {
    fn on_change_text(&mut self, text: &str) {
        (**self).on_change_text(text);
    }

    fn on_keyword(&mut self, keyword: &KeywordMatch) {
        (**self).on_keyword(keyword);
    }

    fn on_open_suggestions_panel(&mut self) {
        (**self).on_open_suggestions_panel();
    }

    fn on_close_suggestions_panel(&mut self) {
        (**self).on_close_suggestions_panel();
    }

    fn on_trigger_span_ended(&mut self) {
        (**self).on_trigger_span_ended();
    }
}

/// One callback as seen by a [`RecordingHandler`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "callback", rename_all = "snake_case")]
pub enum HostCallback {
    ChangeText {
        text: String,
    },
    Keyword {
        keyword: String,
        active_index: usize,
        intervals: Vec<TriggerInterval>,
    },
    OpenSuggestionsPanel,
    CloseSuggestionsPanel,
    TriggerSpanEnded,
}

/// Handler that keeps every callback in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingHandler {
    pub callbacks: Vec<HostCallback>,
}

impl RecordingHandler {
    pub fn take(&mut self) -> Vec<HostCallback> {
        std::mem::take(&mut self.callbacks)
    }

    /// Keywords reported so far, oldest first.
    pub fn keywords(&self) -> Vec<&str> {
        self.callbacks
            .iter()
            .filter_map(|callback| match callback {
                HostCallback::Keyword { keyword, .. } => Some(keyword.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl MentionsHandler for RecordingHandler {
    fn on_change_text(&mut self, text: &str) {
        self.callbacks.push(HostCallback::ChangeText {
            text: text.to_string(),
        });
    }

    fn on_keyword(&mut self, keyword: &KeywordMatch) {
        self.callbacks.push(HostCallback::Keyword {
            keyword: keyword.keyword.clone(),
            active_index: keyword.active_index,
            intervals: keyword.intervals.clone(),
        });
    }

    fn on_open_suggestions_panel(&mut self) {
        self.callbacks.push(HostCallback::OpenSuggestionsPanel);
    }

    fn on_close_suggestions_panel(&mut self) {
        self.callbacks.push(HostCallback::CloseSuggestionsPanel);
    }

    fn on_trigger_span_ended(&mut self) {
        self.callbacks.push(HostCallback::TriggerSpanEnded);
    }
}
