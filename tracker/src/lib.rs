//! Tracks mention spans (a trigger character such as `@` plus the keyword
//! typed after it) inside a text buffer that the user edits freely.
//!
//! The pieces, leaves first:
//!
//! - [`IntervalStore`]: ordered, non-overlapping spans with binary-search lookup.
//! - [`reconcile`]: shifts, grows, splits and removes spans after a length change.
//! - [`KeywordMatcher`]: re-derives span ends and extracts the active keyword.
//! - [`MentionTracker`]: the state machine driven by host text and selection events.

mod config;
mod event;
mod interval;
mod keyword;
mod reconcile;
mod tracker;

pub use config::BackspaceDeletion;
pub use config::ConfigError;
pub use config::MAX_TRIGGER_DELAY;
pub use config::TriggerConfig;
pub use config::TriggerLocation;
pub use config::is_keyword_char;
pub use event::Selection;
pub use event::TrackerEvent;
pub use interval::IntervalStore;
pub use interval::Lookup;
pub use interval::StoreError;
pub use interval::TriggerInterval;
pub use keyword::KeywordMatch;
pub use keyword::KeywordMatcher;
pub use keyword::MAX_EXPECTED_AUTOCORRECT_DIFFERENCE;
pub use reconcile::EditDelta;
pub use reconcile::PendingDeletion;
pub use reconcile::ReconcileOutcome;
pub use reconcile::reconcile;
pub use tracker::MentionTracker;
pub use tracker::PendingEdit;
pub use tracker::TrackingPhase;
pub use tracker::TrackingState;
