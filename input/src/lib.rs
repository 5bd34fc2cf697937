//! Headless mentions text input built on `mentions-tracker`.
//!
//! [`MentionsTextInput`] owns the text buffer, caret, input height and
//! suggestions panel state, and reports everything the embedding UI needs
//! through a [`MentionsHandler`].

mod config;
mod handler;
mod widget;

pub use config::ConfigLoadError;
pub use config::DEFAULT_SUGGESTIONS_PANEL_HEIGHT;
pub use config::DEFAULT_TEXT_INPUT_MAX_HEIGHT;
pub use config::DEFAULT_TEXT_INPUT_MIN_HEIGHT;
pub use config::MentionsConfig;
pub use config::MentionsConfigToml;
pub use config::load_config;
pub use handler::HostCallback;
pub use handler::MentionsHandler;
pub use handler::RecordingHandler;
pub use widget::MentionsTextInput;
pub use widget::SuggestionsPanel;

pub use mentions_tracker::KeywordMatch;
pub use mentions_tracker::Selection;
