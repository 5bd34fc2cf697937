//! The mentions text input: owns the buffer and the caret, forwards host
//! events to the tracker and turns tracker events into handler callbacks.
//!
//! Keyword deletion is a two-step edit. The selection event that detects it
//! only schedules it; the host calls [`MentionsTextInput::settle`] once the
//! keystroke has been committed, which is when the buffer is rewritten.

use mentions_tracker::ConfigError;
use mentions_tracker::MentionTracker;
use mentions_tracker::Selection;
use mentions_tracker::TrackerEvent;
use tracing::debug;
use tracing::trace;

use crate::config::MentionsConfig;
use crate::handler::MentionsHandler;

/// Visibility and target height of the suggestions list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SuggestionsPanel {
    open: bool,
    height: f32,
}

impl SuggestionsPanel {
    pub fn is_open(self) -> bool {
        self.open
    }

    /// Height the panel should animate to; zero while closed.
    pub fn height(self) -> f32 {
        self.height
    }

    fn open(&mut self, height: f32) {
        self.open = true;
        self.height = height;
    }

    fn close(&mut self) {
        self.open = false;
        self.height = 0.0;
    }
}

pub struct MentionsTextInput<H> {
    config: MentionsConfig,
    tracker: MentionTracker,
    handler: H,
    text: String,
    selection: Selection,
    input_height: f32,
    panel: SuggestionsPanel,
}

impl<H: MentionsHandler> MentionsTextInput<H> {
    pub fn new(config: MentionsConfig, handler: H) -> Result<Self, ConfigError> {
        let tracker = MentionTracker::new(config.trigger.clone())?;
        Ok(Self {
            input_height: config.text_input_min_height,
            config,
            tracker,
            handler,
            text: String::new(),
            selection: Selection::default(),
            panel: SuggestionsPanel::default(),
        })
    }

    pub fn config(&self) -> &MentionsConfig {
        &self.config
    }

    pub fn tracker(&self) -> &MentionTracker {
        &self.tracker
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn input_height(&self) -> f32 {
        self.input_height
    }

    pub fn suggestions_panel(&self) -> SuggestionsPanel {
        self.panel
    }

    /// A keyword deletion is waiting for [`Self::settle`].
    pub fn needs_settle(&self) -> bool {
        self.tracker.has_pending_edit()
    }

    /// Host text-change event.
    pub fn change_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.tracker.on_text_changed(&self.text);
        self.handler.on_change_text(&self.text);
    }

    /// Host selection-change event.
    pub fn change_selection(&mut self, selection: Selection) {
        let len = self.text.chars().count();
        self.selection = selection.clamped(len);
        let events = self.tracker.on_selection_changed(&self.text, selection);
        self.dispatch(events);
    }

    /// Runs a scheduled keyword deletion. Returns whether the buffer changed.
    pub fn settle(&mut self) -> bool {
        let Some(edit) = self.tracker.run_pending_edit(&self.text) else {
            return false;
        };
        debug!(text = %edit.text, caret = edit.caret, "applied keyword deletion");
        self.change_text(edit.text);
        self.selection = Selection::caret(edit.caret);
        self.dispatch(edit.events);
        self.change_selection(self.selection);
        true
    }

    /// New value pushed by the host. Spans from the old value are forgotten
    /// and the height drops to the minimum until the host measures again.
    pub fn set_value(&mut self, value: Option<&str>) {
        self.reset();
        if let Some(value) = value.filter(|value| !value.is_empty()) {
            self.change_text(value);
            self.change_selection(Selection::caret(value.chars().count()));
        }
    }

    /// Host measured the rendered text; grows or shrinks the input.
    pub fn content_size_changed(&mut self, content_height: f32) {
        let clamped = content_height
            .min(self.config.text_input_max_height)
            .max(self.config.text_input_min_height);
        trace!(content_height, clamped, "input height");
        self.input_height = clamped;
    }

    /// Ends the active span, e.g. after the host inserted a picked suggestion.
    pub fn stop_tracking(&mut self) {
        let events = self.tracker.stop_tracking();
        self.dispatch(events);
    }

    /// Types `typed` one character at a time at the caret, replacing any
    /// selected range with the first character.
    pub fn type_text(&mut self, typed: &str) {
        for ch in typed.chars() {
            let Selection { start, end } = self.selection;
            let mut buf = [0; 4];
            let text = splice(&self.text, start, end, ch.encode_utf8(&mut buf));
            self.change_text(text);
            self.change_selection(Selection::caret(start + 1));
        }
    }

    /// Inserts `pasted` at the caret as a single edit.
    pub fn paste(&mut self, pasted: &str) {
        let Selection { start, end } = self.selection;
        let text = splice(&self.text, start, end, pasted);
        self.change_text(text);
        self.change_selection(Selection::caret(start + pasted.chars().count()));
    }

    /// Deletes the selected range, or the character before the caret.
    pub fn backspace(&mut self) {
        let Selection { start, end } = self.selection;
        let (start, end) = if start == end {
            match start.checked_sub(1) {
                Some(before) => (before, start),
                None => return,
            }
        } else {
            (start, end)
        };
        let text = splice(&self.text, start, end, "");
        self.change_text(text);
        self.change_selection(Selection::caret(start));
    }

    /// Moves the caret without editing.
    pub fn click(&mut self, offset: usize) {
        self.change_selection(Selection::caret(offset));
    }

    pub fn select(&mut self, start: usize, end: usize) {
        self.change_selection(Selection::new(start, end));
    }

    fn reset(&mut self) {
        debug!("resetting mentions input");
        let was_open = self.panel.is_open();
        self.text.clear();
        self.selection = Selection::default();
        self.input_height = self.config.text_input_min_height;
        self.tracker.reset();
        self.panel.close();
        if was_open {
            self.handler.on_close_suggestions_panel();
        }
    }

    fn dispatch(&mut self, events: Vec<TrackerEvent>) {
        for event in events {
            trace!(?event, "tracker event");
            match event {
                TrackerEvent::KeywordMatched(found) => self.handler.on_keyword(&found),
                TrackerEvent::SuggestionsOpened => {
                    self.panel.open(self.config.suggestions_panel_height);
                    self.handler.on_open_suggestions_panel();
                }
                TrackerEvent::SuggestionsClosed => {
                    self.panel.close();
                    self.handler.on_close_suggestions_panel();
                }
                TrackerEvent::TriggerSpanEnded => self.handler.on_trigger_span_ended(),
            }
        }
    }
}

/// Replaces the characters in `[start, end)` with `replacement`.
fn splice(text: &str, start: usize, end: usize, replacement: &str) -> String {
    let start = byte_offset(text, start);
    let end = byte_offset(text, end);
    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..start]);
    out.push_str(replacement);
    out.push_str(&text[end..]);
    out
}

fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(index, _)| index)
}
