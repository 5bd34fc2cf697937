//! Keeps interval offsets in step with the live text after an edit.
//!
//! The host only reports "the text changed length by `delta` and the caret
//! ended up after `caret`", so the edited run is inferred: an insertion is the
//! `delta` characters ending at the caret character, a deletion is the
//! `-delta` characters (old offsets) right after it.

use serde::Serialize;
use tracing::trace;

use crate::config::BackspaceDeletion;
use crate::interval::IntervalStore;
use crate::interval::TriggerInterval;

/// A length change observed between two selection events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditDelta {
    /// Offset of the character just before the caret; `None` when the caret
    /// sits at the start of the text.
    pub caret: Option<usize>,
    /// New text length minus old text length.
    pub delta: isize,
}

/// Keyword removal decided while reconciling and applied once the host has
/// committed the keystroke that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingDeletion {
    /// The span in current-text offsets, already dropped from the store.
    pub interval: TriggerInterval,
    pub mode: BackspaceDeletion,
    /// Length of the text `interval` refers to. Any other length means the
    /// text moved on and the deletion no longer applies.
    pub text_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileOutcome {
    /// Index of the active interval after the edit, if it survived.
    pub active: Option<usize>,
    /// The active interval lost its trigger character.
    pub active_removed: bool,
    /// Whitespace landed inside the active interval and cut it short.
    pub active_split: bool,
    pub pending_deletion: Option<PendingDeletion>,
}

impl ReconcileOutcome {
    fn unchanged(active: Option<usize>) -> Self {
        Self {
            active,
            ..Self::default()
        }
    }

    /// Any condition that ends the current span.
    pub fn ends_tracking(&self) -> bool {
        self.active_removed || self.pending_deletion.is_some()
    }

    fn removed(&mut self, index: usize) {
        match self.active {
            Some(active) if active == index => {
                self.active = None;
                self.active_removed = true;
            }
            Some(active) if active > index => self.active = Some(active - 1),
            _ => {}
        }
    }
}

/// Applies `edit` to `store`.
///
/// `keyword_deletion` is set when the previous caret move armed backspace to
/// remove a whole keyword; a deletion inside an interval body then schedules
/// a [`PendingDeletion`] instead of a one-character shrink.
pub fn reconcile(
    store: &mut IntervalStore,
    text: &[char],
    edit: EditDelta,
    active: Option<usize>,
    keyword_deletion: Option<BackspaceDeletion>,
) -> ReconcileOutcome {
    if store.is_empty() || edit.delta == 0 {
        return ReconcileOutcome::unchanged(active);
    }
    if edit.delta > 0 {
        grow(store, text, edit, active)
    } else {
        shrink(store, text.len(), edit, active, keyword_deletion)
    }
}

fn grow(
    store: &mut IntervalStore,
    text: &[char],
    edit: EditDelta,
    active: Option<usize>,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::unchanged(active);
    let inserted = edit.delta.unsigned_abs();
    // With the caret at the very start the text was replaced or prepended.
    let insert_at = edit
        .caret
        .map_or(0, |caret| (caret + 1).saturating_sub(inserted));

    let Some(first) = store.locate(insert_at).index() else {
        return outcome;
    };
    if store.is_after_last_at(insert_at, first) {
        return outcome;
    }

    // Only an insertion strictly inside a body grows that interval.
    let grown = insert_at
        .checked_sub(1)
        .is_some_and(|previous| {
            store.contains_position(previous, first) && store.contains_position(insert_at, first)
        })
        .then_some(first);
    for index in first..store.len() {
        let Some(interval) = store.get_mut(index) else {
            break;
        };
        if grown == Some(index) {
            interval.end += inserted;
        } else {
            interval.start += inserted;
            interval.end += inserted;
        }
    }
    trace!(insert_at, inserted, first, ?grown, "shifted intervals right");

    if let Some(index) = grown {
        let split_at = text
            .get(insert_at..insert_at + inserted)
            .and_then(|run| run.iter().position(|ch| ch.is_whitespace()))
            .map(|offset| insert_at + offset);
        if let Some(split_at) = split_at {
            store.set_end(index, split_at - 1);
            trace!(index, split_at, "interval split by whitespace");
            if active == Some(index) {
                outcome.active_split = true;
            }
        }
    }
    outcome
}

fn shrink(
    store: &mut IntervalStore,
    text_len: usize,
    edit: EditDelta,
    active: Option<usize>,
    keyword_deletion: Option<BackspaceDeletion>,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::unchanged(active);
    let removed = edit.delta.unsigned_abs();
    let delete_start = edit.caret.map_or(0, |caret| caret + 1);
    let delete_end = delete_start + removed - 1;

    let Some(first) = store.locate(delete_start).index() else {
        return outcome;
    };
    if store.is_after_last_at(delete_start, first) {
        return outcome;
    }

    let mut body_hit = None;
    let mut index = first;
    while let Some(interval) = store.get(index) {
        if store.is_before_first_at(delete_end, index) {
            if let Some(entry) = store.get_mut(index) {
                entry.start -= removed;
                entry.end -= removed;
            }
        } else if interval.start < delete_start && store.contains_position(delete_start, index) {
            if let Some(entry) = store.get_mut(index) {
                let overlap = interval.end.min(delete_end) + 1 - delete_start;
                entry.end = (interval.end - overlap).max(interval.start);
            }
            body_hit = Some(index);
        } else {
            store.remove(index);
            outcome.removed(index);
            trace!(index, "trigger character deleted");
            continue;
        }
        index += 1;
    }
    trace!(delete_start, removed, first, ?body_hit, "shifted intervals left");

    if let (Some(mode), Some(index)) = (keyword_deletion, body_hit)
        && let Some(interval) = store.get(index)
        && (mode == BackspaceDeletion::WholeMention || interval.start < interval.end)
    {
        store.remove(index);
        outcome.removed(index);
        outcome.pending_deletion = Some(PendingDeletion {
            interval,
            mode,
            text_len,
        });
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn store(spans: &[(usize, usize)]) -> IntervalStore {
        IntervalStore::from_intervals(
            spans
                .iter()
                .map(|&(start, end)| TriggerInterval::new(start, end))
                .collect(),
        )
    }

    fn spans(store: &IntervalStore) -> Vec<(usize, usize)> {
        store.iter().map(|i| (i.start, i.end)).collect()
    }

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn zero_delta_is_a_no_op() {
        let mut store = store(&[(2, 4), (8, 9)]);
        let before = store.clone();
        let outcome = reconcile(
            &mut store,
            &chars("ab@cd xx@y"),
            EditDelta {
                caret: Some(3),
                delta: 0,
            },
            Some(0),
            Some(BackspaceDeletion::WholeMention),
        );
        assert_eq!(store, before);
        assert_eq!(outcome, ReconcileOutcome::unchanged(Some(0)));
    }

    #[test]
    fn insertion_before_intervals_shifts_them() {
        // "a @bob @al" -> "ab @bob @al"
        let mut store = store(&[(2, 5), (7, 9)]);
        reconcile(
            &mut store,
            &chars("ab @bob @al"),
            EditDelta {
                caret: Some(1),
                delta: 1,
            },
            None,
            None,
        );
        assert_eq!(spans(&store), vec![(3, 6), (8, 10)]);
    }

    #[test]
    fn insertion_with_caret_at_start_shifts_every_interval() {
        // "@bob " -> "xx @bob " reported with the caret back at 0
        let mut store = store(&[(0, 3)]);
        reconcile(
            &mut store,
            &chars("xx @bob "),
            EditDelta {
                caret: None,
                delta: 3,
            },
            None,
            None,
        );
        assert_eq!(spans(&store), vec![(3, 6)]);
    }

    #[test]
    fn insertion_at_trigger_shifts_the_interval() {
        // "@bob" -> "x@bob"
        let mut store = store(&[(0, 3)]);
        reconcile(
            &mut store,
            &chars("x@bob"),
            EditDelta {
                caret: Some(0),
                delta: 1,
            },
            Some(0),
            None,
        );
        assert_eq!(spans(&store), vec![(1, 4)]);
    }

    #[test]
    fn insertion_inside_body_grows_the_interval() {
        // "@bb @al" -> "@bob @al"
        let mut store = store(&[(0, 2), (4, 6)]);
        let outcome = reconcile(
            &mut store,
            &chars("@bob @al"),
            EditDelta {
                caret: Some(2),
                delta: 1,
            },
            Some(0),
            None,
        );
        assert_eq!(spans(&store), vec![(0, 3), (5, 7)]);
        assert!(!outcome.active_split);
    }

    #[test]
    fn typing_after_the_end_leaves_the_interval_alone() {
        let mut store = store(&[(6, 8)]);
        reconcile(
            &mut store,
            &chars("Hello @bob"),
            EditDelta {
                caret: Some(9),
                delta: 1,
            },
            Some(0),
            None,
        );
        assert_eq!(spans(&store), vec![(6, 8)]);
    }

    #[test]
    fn pasted_run_before_trigger_shifts_instead_of_growing() {
        // "a @bob" -> "a xyz@bob"
        let mut store = store(&[(2, 5)]);
        reconcile(
            &mut store,
            &chars("a xyz@bob"),
            EditDelta {
                caret: Some(4),
                delta: 3,
            },
            None,
            None,
        );
        assert_eq!(spans(&store), vec![(5, 8)]);
    }

    #[test]
    fn whitespace_inside_active_body_splits_it() {
        // "@bob" -> "@bo b"
        let mut store = store(&[(0, 3)]);
        let outcome = reconcile(
            &mut store,
            &chars("@bo b"),
            EditDelta {
                caret: Some(3),
                delta: 1,
            },
            Some(0),
            None,
        );
        assert_eq!(spans(&store), vec![(0, 2)]);
        assert!(outcome.active_split);
    }

    #[test]
    fn deleting_the_trigger_removes_the_interval() {
        // "hi @bob" -> "hi bob"
        let mut store = store(&[(3, 6)]);
        let outcome = reconcile(
            &mut store,
            &chars("hi bob"),
            EditDelta {
                caret: Some(2),
                delta: -1,
            },
            Some(0),
            None,
        );
        assert!(store.is_empty());
        assert!(outcome.active_removed);
        assert_eq!(outcome.active, None);
    }

    #[test]
    fn deleting_first_character_with_caret_at_start() {
        // "@a @b" -> "a @b"
        let mut store = store(&[(0, 1), (3, 4)]);
        let outcome = reconcile(
            &mut store,
            &chars("a @b"),
            EditDelta {
                caret: None,
                delta: -1,
            },
            Some(1),
            None,
        );
        assert_eq!(spans(&store), vec![(2, 3)]);
        assert_eq!(outcome.active, Some(0));
        assert!(!outcome.active_removed);
    }

    #[test]
    fn deletion_inside_body_shrinks_and_shifts_followers() {
        // "@bob @al" -> "@bb @al"
        let mut store = store(&[(0, 3), (5, 7)]);
        reconcile(
            &mut store,
            &chars("@bb @al"),
            EditDelta {
                caret: Some(1),
                delta: -1,
            },
            Some(0),
            None,
        );
        assert_eq!(spans(&store), vec![(0, 2), (4, 6)]);
    }

    #[test]
    fn armed_backspace_schedules_keyword_deletion() {
        // "Hi @bo" -> "Hi @b"
        let mut store = store(&[(3, 5)]);
        let outcome = reconcile(
            &mut store,
            &chars("Hi @b"),
            EditDelta {
                caret: Some(4),
                delta: -1,
            },
            Some(0),
            Some(BackspaceDeletion::WholeMention),
        );
        assert!(store.is_empty());
        assert_eq!(
            outcome.pending_deletion,
            Some(PendingDeletion {
                interval: TriggerInterval::new(3, 4),
                mode: BackspaceDeletion::WholeMention,
                text_len: 5,
            })
        );
        assert!(outcome.ends_tracking());
    }

    #[test]
    fn keep_trigger_skips_deletion_when_only_trigger_remains() {
        // "@b" -> "@"
        let mut store = store(&[(0, 1)]);
        let outcome = reconcile(
            &mut store,
            &chars("@"),
            EditDelta {
                caret: Some(0),
                delta: -1,
            },
            Some(0),
            Some(BackspaceDeletion::KeepTrigger),
        );
        assert_eq!(spans(&store), vec![(0, 0)]);
        assert_eq!(outcome.pending_deletion, None);
    }

    /// Mirrors the text with `#` for tracked characters and checks that random
    /// edits never break ordering.
    #[test]
    fn random_edits_keep_the_store_ordered() {
        let mut rng = StdRng::seed_from_u64(0x7265_636f);
        for _ in 0..300 {
            let mut text: Vec<char> = "ab @cd ef @gh ij @kl".chars().collect();
            let mut store = store(&[(3, 5), (10, 12), (17, 19)]);
            for _ in 0..40 {
                if text.is_empty() || rng.random_bool(0.5) {
                    let at = rng.random_range(0..=text.len());
                    let run = rng.random_range(1..4);
                    for offset in 0..run {
                        let ch = if rng.random_bool(0.3) { ' ' } else { 'x' };
                        text.insert(at + offset, ch);
                    }
                    reconcile(
                        &mut store,
                        &text,
                        EditDelta {
                            caret: Some(at + run - 1),
                            delta: run as isize,
                        },
                        None,
                        None,
                    );
                } else {
                    let at = rng.random_range(0..text.len());
                    let run = rng.random_range(1..=(text.len() - at).min(3));
                    text.drain(at..at + run);
                    reconcile(
                        &mut store,
                        &text,
                        EditDelta {
                            caret: at.checked_sub(1),
                            delta: -(run as isize),
                        },
                        None,
                        None,
                    );
                }
                assert_eq!(store.validate(), Ok(()), "{:?}", store.as_slice());
                assert!(store.iter().all(|interval| interval.end < text.len()));
            }
        }
    }
}
