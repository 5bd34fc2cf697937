//! Ordered storage of trigger spans and the binary-search lookups over it.
//!
//! Offsets are zero-based character offsets into the live text and both ends
//! of an interval are inclusive. The store never looks at the text itself; the
//! reconciler and the keyword matcher keep the offsets honest.

use serde::Serialize;
use thiserror::Error;

/// One trigger span: the trigger character at `start` through the last
/// character currently considered part of its keyword at `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TriggerInterval {
    pub start: usize,
    pub end: usize,
}

impl TriggerInterval {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "interval start {start} is past its end {end}");
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Interval covering only the trigger character.
    pub fn unit(position: usize) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    pub fn contains(&self, position: usize) -> bool {
        (self.start..=self.end).contains(&position)
    }
}

/// Result of [`IntervalStore::locate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The store holds no intervals.
    Empty,
    /// The interval at this index contains the position.
    Contains(usize),
    /// No interval contains the position; this is the first interval that
    /// starts after it.
    Before(usize),
    /// Every interval ends before the position; this is the last index.
    AfterLast(usize),
}

impl Lookup {
    /// The interval the position belongs to, or would belong to if it does not
    /// already. `None` only for an empty store.
    pub fn index(self) -> Option<usize> {
        match self {
            Lookup::Empty => None,
            Lookup::Contains(index) | Lookup::Before(index) | Lookup::AfterLast(index) => {
                Some(index)
            }
        }
    }

    pub fn containing(self) -> Option<usize> {
        match self {
            Lookup::Contains(index) => Some(index),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("interval {index} has start {start} past its end {end}")]
    Inverted {
        index: usize,
        start: usize,
        end: usize,
    },
    #[error("interval {index} ends at {end}, past the start {next_start} of the interval after it")]
    Overlap {
        index: usize,
        end: usize,
        next_start: usize,
    },
}

/// Strictly increasing, non-overlapping list of [`TriggerInterval`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalStore {
    intervals: Vec<TriggerInterval>,
}

impl IntervalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<TriggerInterval> {
        self.intervals.get(index).copied()
    }

    pub fn as_slice(&self) -> &[TriggerInterval] {
        &self.intervals
    }

    pub fn iter(&self) -> impl Iterator<Item = &TriggerInterval> {
        self.intervals.iter()
    }

    pub fn clear(&mut self) {
        self.intervals.clear();
    }

    /// Iterative binary search for `position`.
    ///
    /// Returns the interval containing `position` when there is one. Otherwise
    /// the nearest interval at or after it is reported as [`Lookup::Before`],
    /// and a position past every interval yields [`Lookup::AfterLast`].
    pub fn locate(&self, position: usize) -> Lookup {
        let Some(last) = self.intervals.len().checked_sub(1) else {
            return Lookup::Empty;
        };

        let mut low = 0usize;
        let mut high = self.intervals.len();
        let mut nearest_after: Option<usize> = None;
        while low < high {
            let middle = low + (high - low) / 2;
            let interval = self.intervals[middle];
            if interval.contains(position) {
                return Lookup::Contains(middle);
            }
            if interval.end < position {
                low = middle + 1;
            } else {
                nearest_after = Some(middle);
                high = middle;
            }
        }

        match nearest_after {
            Some(index) => Lookup::Before(index),
            None => Lookup::AfterLast(last),
        }
    }

    pub fn contains_position(&self, position: usize, index: usize) -> bool {
        self.intervals
            .get(index)
            .is_some_and(|interval| interval.contains(position))
    }

    /// True when `position` lies before the interval at `index`.
    pub fn is_before_first_at(&self, position: usize, index: usize) -> bool {
        self.intervals
            .get(index)
            .is_none_or(|interval| position < interval.start)
    }

    /// True when `index` is the last interval and `position` lies past its end.
    pub fn is_after_last_at(&self, position: usize, index: usize) -> bool {
        match self.intervals.get(index) {
            Some(interval) => index + 1 == self.intervals.len() && interval.end < position,
            None => true,
        }
    }

    /// Opens a unit interval at `position`, reusing the interval that already
    /// contains it. Returns the index of the interval now covering `position`.
    pub fn insert(&mut self, position: usize) -> usize {
        match self.locate(position) {
            Lookup::Contains(index) => index,
            Lookup::Before(index) => {
                self.intervals.insert(index, TriggerInterval::unit(position));
                index
            }
            Lookup::Empty | Lookup::AfterLast(_) => {
                self.intervals.push(TriggerInterval::unit(position));
                self.intervals.len() - 1
            }
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<TriggerInterval> {
        (index < self.intervals.len()).then(|| self.intervals.remove(index))
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut TriggerInterval> {
        self.intervals.get_mut(index)
    }

    /// Moves the end of the interval at `index`, never past its start and never
    /// into the interval that follows it.
    pub fn set_end(&mut self, index: usize, end: usize) {
        let limit = self
            .intervals
            .get(index + 1)
            .map(|next| next.start.saturating_sub(1));
        if let Some(interval) = self.intervals.get_mut(index) {
            let end = limit.map_or(end, |limit| end.min(limit));
            interval.end = end.max(interval.start);
        }
    }

    /// Checks the ordering invariant binary search depends on.
    pub fn validate(&self) -> Result<(), StoreError> {
        for (index, interval) in self.intervals.iter().enumerate() {
            if interval.start > interval.end {
                return Err(StoreError::Inverted {
                    index,
                    start: interval.start,
                    end: interval.end,
                });
            }
            if let Some(next) = self.intervals.get(index + 1)
                && interval.end >= next.start
            {
                return Err(StoreError::Overlap {
                    index,
                    end: interval.end,
                    next_start: next.start,
                });
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn from_intervals(intervals: Vec<TriggerInterval>) -> Self {
        Self { intervals }
    }
}
