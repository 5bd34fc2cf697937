//! The tracking state machine.
//!
//! [`MentionTracker`] is fed the two host events, "text changed" and
//! "selection changed", strictly in the order the user produced them. Each
//! text change is reconciled into the interval store on the next selection
//! event, after which the caret decides whether a span starts, continues or
//! ends, and the keyword of the active span is reported.
//!
//! # Call pattern
//!
//! - Call [`MentionTracker::on_text_changed`] whenever the host reports new text.
//! - Call [`MentionTracker::on_selection_changed`] with the same text whenever
//!   the host reports the caret; apply the returned [`TrackerEvent`]s.
//! - When [`MentionTracker::has_pending_edit`] is true, call
//!   [`MentionTracker::run_pending_edit`] once the host has finished committing
//!   the current keystroke and write the returned text back into the buffer.
//!
//! The tracker never writes the text buffer itself; the pending edit is the
//! only text it ever asks the host to change.

use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::config::BackspaceDeletion;
use crate::config::ConfigError;
use crate::config::TriggerConfig;
use crate::event::Selection;
use crate::event::TrackerEvent;
use crate::interval::IntervalStore;
use crate::interval::Lookup;
use crate::interval::TriggerInterval;
use crate::keyword::KeywordMatch;
use crate::keyword::KeywordMatcher;
use crate::reconcile::EditDelta;
use crate::reconcile::PendingDeletion;
use crate::reconcile::ReconcileOutcome;
use crate::reconcile::reconcile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingPhase {
    #[default]
    Idle,
    Tracking {
        active: usize,
    },
}

impl TrackingPhase {
    pub fn active(self) -> Option<usize> {
        match self {
            TrackingPhase::Idle => None,
            TrackingPhase::Tracking { active } => Some(active),
        }
    }
}

/// Per-widget bookkeeping carried between host events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingState {
    pub phase: TrackingPhase,
    /// Text length (in characters) at the last selection event.
    pub last_text_len: usize,
    pub text_changed_since_selection: bool,
    /// Armed by a caret move to the end of a span; the next deletion inside a
    /// span body removes the whole keyword.
    pub delete_keyword_on_backspace: bool,
}

/// Text the host must write back after a deferred keyword deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub text: String,
    /// Caret offset to restore after the replacement.
    pub caret: usize,
    pub events: Vec<TrackerEvent>,
}

#[derive(Debug, Clone)]
pub struct MentionTracker {
    config: TriggerConfig,
    matcher: KeywordMatcher,
    store: IntervalStore,
    state: TrackingState,
    pending: Option<PendingDeletion>,
    suggestions_open: bool,
    last_keyword: Option<(usize, String)>,
}

impl MentionTracker {
    pub fn new(config: TriggerConfig) -> Result<Self, ConfigError> {
        let matcher = KeywordMatcher::new(&config)?;
        Ok(Self {
            config,
            matcher,
            store: IntervalStore::new(),
            state: TrackingState::default(),
            pending: None,
            suggestions_open: false,
            last_keyword: None,
        })
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    pub fn intervals(&self) -> &[TriggerInterval] {
        self.store.as_slice()
    }

    pub fn state(&self) -> &TrackingState {
        &self.state
    }

    pub fn active_index(&self) -> Option<usize> {
        self.state.phase.active()
    }

    pub fn active_interval(&self) -> Option<TriggerInterval> {
        self.active_index().and_then(|index| self.store.get(index))
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state.phase, TrackingPhase::Tracking { .. })
    }

    pub fn suggestions_open(&self) -> bool {
        self.suggestions_open
    }

    pub fn has_pending_edit(&self) -> bool {
        self.pending.is_some()
    }

    /// Host reported new text.
    ///
    /// A keyword deletion still waiting for [`Self::run_pending_edit`] was
    /// computed against the previous text and is dropped.
    pub fn on_text_changed(&mut self, _text: &str) {
        self.state.text_changed_since_selection = true;
        if let Some(pending) = self.pending.take() {
            debug!(?pending, "text edited before the keyword deletion ran; dropped");
        }
    }

    /// Host reported the caret or a selection for `text`.
    pub fn on_selection_changed(
        &mut self,
        text: &str,
        selection: Selection,
    ) -> Vec<TrackerEvent> {
        let chars: Vec<char> = text.chars().collect();
        let clamped = selection.clamped(chars.len());
        if clamped != selection {
            warn!(
                ?selection,
                len = chars.len(),
                "selection outside the text; clamped"
            );
        }

        let mut events = Vec::new();
        let text_changed = self.state.text_changed_since_selection;
        match clamped.collapsed() {
            Some(caret) if text_changed => {
                self.handle_typing(&chars, caret.checked_sub(1), &mut events);
            }
            Some(caret) => self.handle_click(&chars, caret.checked_sub(1), &mut events),
            None if text_changed => {
                let caret = clamped.end.checked_sub(1);
                let outcome = self.reconcile_edit(&chars, caret, &mut events);
                self.state.delete_keyword_on_backspace = false;
                if outcome.ends_tracking() {
                    self.stop(&mut events);
                }
            }
            None => {}
        }

        self.state.text_changed_since_selection = false;
        self.state.last_text_len = chars.len();
        events
    }

    /// Phase two of a keyword deletion: splices the keyword out of `text`.
    ///
    /// Returns `None` when nothing is pending or when `text` is no longer the
    /// text the deletion was scheduled against.
    pub fn run_pending_edit(&mut self, text: &str) -> Option<PendingEdit> {
        let PendingDeletion {
            interval,
            mode,
            text_len,
        } = self.pending.take()?;
        let chars: Vec<char> = text.chars().collect();
        if chars.len() != text_len
            || interval.end >= chars.len()
            || chars[interval.start] != self.matcher.trigger()
        {
            warn!(?interval, "text changed before the keyword deletion ran; dropped");
            return None;
        }

        let cut_start = match mode {
            BackspaceDeletion::WholeMention => interval.start,
            BackspaceDeletion::KeepTrigger => interval.start + 1,
        };
        let before = &chars[..cut_start];
        let after = &chars[interval.end + 1..];
        let pad = mode == BackspaceDeletion::WholeMention
            && after.first().is_some_and(|ch| !ch.is_whitespace())
            && before.last().is_some_and(|ch| !ch.is_whitespace());

        let mut replaced: Vec<char> = before.to_vec();
        if pad {
            replaced.push(' ');
        }
        replaced.extend_from_slice(after);

        // Run the splice through the reconciler so any span touching the cut
        // is clipped or dropped like for a user deletion.
        let mut events = Vec::new();
        let cut = interval.end + 1 - cut_start;
        let active_index = self.active_index();
        let mut outcome = reconcile(
            &mut self.store,
            &chars,
            EditDelta {
                caret: cut_start.checked_sub(1),
                delta: -(cut as isize),
            },
            active_index,
            None,
        );
        if pad {
            let active_removed = outcome.active_removed;
            outcome = reconcile(
                &mut self.store,
                &replaced,
                EditDelta {
                    caret: Some(cut_start),
                    delta: 1,
                },
                outcome.active,
                None,
            );
            outcome.active_removed |= active_removed;
        }
        match outcome.active {
            Some(active) => self.state.phase = TrackingPhase::Tracking { active },
            None if outcome.active_removed => self.stop(&mut events),
            None => {}
        }
        self.state.last_text_len = replaced.len();
        self.state.delete_keyword_on_backspace = false;
        debug!(?interval, ?mode, cut, pad, "deleted keyword");
        if self.ensure_consistent(&mut events) && mode == BackspaceDeletion::KeepTrigger {
            self.start_tracking(interval.start);
            self.identify_keyword(&replaced, &mut events);
        }
        Some(PendingEdit {
            text: replaced.into_iter().collect(),
            caret: cut_start + usize::from(pad),
            events,
        })
    }

    /// Ends the current span, e.g. once the host inserted a picked suggestion.
    pub fn stop_tracking(&mut self) -> Vec<TrackerEvent> {
        let mut events = Vec::new();
        self.stop(&mut events);
        events
    }

    /// Forgets every span, as when the host clears the text box.
    pub fn reset(&mut self) {
        self.store.clear();
        self.state = TrackingState::default();
        self.pending = None;
        self.suggestions_open = false;
        self.last_keyword = None;
    }

    fn handle_typing(
        &mut self,
        text: &[char],
        position: Option<usize>,
        events: &mut Vec<TrackerEvent>,
    ) {
        let outcome = self.reconcile_edit(text, position, events);
        self.state.delete_keyword_on_backspace = false;
        let last_char = position.and_then(|position| text.get(position).copied());

        if outcome.ends_tracking() {
            self.stop(events);
        } else if let Some(position) = position
            && !self.is_tracking()
            && last_char == Some(self.matcher.trigger())
            && self.matcher.at_word_boundary(text, position)
        {
            self.start_tracking(position);
        } else if outcome.active_split {
            self.stop(events);
        } else if self.is_tracking()
            && (last_char.is_none_or(char::is_whitespace) || text.is_empty())
        {
            self.stop(events);
        } else if let TrackingPhase::Tracking { active } = self.state.phase
            && let Some(interval) = self.store.get(active)
            && let Some(end) = self.matcher.rederive_end(text, interval)
        {
            self.store.set_end(active, end);
        }

        self.identify_keyword(text, events);
    }

    fn handle_click(
        &mut self,
        text: &[char],
        position: Option<usize>,
        events: &mut Vec<TrackerEvent>,
    ) {
        if self.store.is_empty() {
            return;
        }
        let Some(position) = position else {
            self.state.delete_keyword_on_backspace = false;
            self.stop(events);
            return;
        };

        let lookup = self.store.locate(position);
        self.arm_backspace(text, position, lookup);
        match lookup.containing() {
            Some(index) => {
                self.state.phase = TrackingPhase::Tracking { active: index };
                debug!(index, position, "caret moved into a span");
            }
            None => self.stop(events),
        }
        self.identify_keyword(text, events);
    }

    /// Decides whether the next backspace removes a whole keyword.
    fn arm_backspace(&mut self, text: &[char], position: usize, lookup: Lookup) {
        let at_text_end = position + 1 == text.len();
        let at_span_end = lookup
            .index()
            .and_then(|index| self.store.get(index))
            .is_some_and(|interval| interval.end == position);
        let followed_by_space = text
            .get(position + 1)
            .is_some_and(|ch| ch.is_whitespace());

        self.state.delete_keyword_on_backspace = (!self.is_tracking() && at_text_end)
            || (at_span_end && (at_text_end || followed_by_space));
    }

    fn reconcile_edit(
        &mut self,
        text: &[char],
        position: Option<usize>,
        events: &mut Vec<TrackerEvent>,
    ) -> ReconcileOutcome {
        let delta = text.len() as isize - self.state.last_text_len as isize;
        let keyword_deletion = (self.state.delete_keyword_on_backspace && self.pending.is_none())
            .then_some(self.config.backspace_deletion);
        let active = self.active_index();
        let outcome = reconcile(
            &mut self.store,
            text,
            EditDelta {
                caret: position,
                delta,
            },
            active,
            keyword_deletion,
        );

        if let Some(pending) = outcome.pending_deletion {
            debug!(?pending, "scheduled keyword deletion");
            self.pending = Some(pending);
        }
        if let Some(active) = outcome.active {
            self.state.phase = TrackingPhase::Tracking { active };
        }

        if !self.ensure_consistent(events) {
            return ReconcileOutcome::default();
        }
        outcome
    }

    /// Fails closed when the store lost its ordering: every span is dropped.
    fn ensure_consistent(&mut self, events: &mut Vec<TrackerEvent>) -> bool {
        let Err(err) = self.store.validate() else {
            return true;
        };
        error!("interval store inconsistent after edit, dropping all spans: {err}");
        self.store.clear();
        self.pending = None;
        self.stop(events);
        false
    }

    fn start_tracking(&mut self, position: usize) {
        let index = self.store.insert(position);
        self.state.phase = TrackingPhase::Tracking { active: index };
        debug!(index, position, "trigger tracking started");
    }

    fn stop(&mut self, events: &mut Vec<TrackerEvent>) {
        self.close_suggestions(events);
        self.last_keyword = None;
        if self.is_tracking() {
            self.state.phase = TrackingPhase::Idle;
            events.push(TrackerEvent::TriggerSpanEnded);
            debug!("trigger tracking stopped");
        }
    }

    fn identify_keyword(&mut self, text: &[char], events: &mut Vec<TrackerEvent>) {
        let TrackingPhase::Tracking { active } = self.state.phase else {
            return;
        };
        let keyword = self
            .store
            .get(active)
            .and_then(|interval| self.matcher.extract(text, interval));
        let Some(keyword) = keyword else {
            self.last_keyword = None;
            self.close_suggestions(events);
            return;
        };

        let changed = self
            .last_keyword
            .as_ref()
            .is_none_or(|(index, last)| *index != active || *last != keyword);
        if changed {
            self.last_keyword = Some((active, keyword.clone()));
            events.push(TrackerEvent::KeywordMatched(KeywordMatch {
                keyword,
                intervals: self.store.as_slice().to_vec(),
                active_index: active,
            }));
        }
        if !self.suggestions_open {
            self.suggestions_open = true;
            events.push(TrackerEvent::SuggestionsOpened);
        }
    }

    fn close_suggestions(&mut self, events: &mut Vec<TrackerEvent>) {
        if self.suggestions_open {
            self.suggestions_open = false;
            events.push(TrackerEvent::SuggestionsClosed);
        }
    }

    #[cfg(test)]
    fn store_mut(&mut self) -> &mut IntervalStore {
        &mut self.store
    }
}
