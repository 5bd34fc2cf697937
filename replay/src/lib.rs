//! Scripted replay of host events through [`mentions_input::MentionsTextInput`].

pub mod replay;
pub mod replay_command;
pub mod script;

pub use replay::CallbackRecord;
pub use replay::FinalState;
pub use replay::ReplayOptions;
pub use replay::ReplayOutput;
pub use replay::replay;
pub use replay_command::ReplayCommand;
pub use script::ScriptError;
pub use script::ScriptLine;
pub use script::ScriptStep;
pub use script::parse_script;
