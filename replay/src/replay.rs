use mentions_input::HostCallback;
use mentions_input::MentionsConfig;
use mentions_input::MentionsTextInput;
use mentions_input::RecordingHandler;
use mentions_input::Selection;
use mentions_tracker::ConfigError;
use mentions_tracker::TriggerInterval;
use serde::Serialize;
use tracing::debug;

use crate::script::ScriptLine;
use crate::script::ScriptStep;

/// A host callback and the script line that caused it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallbackRecord {
    pub line: usize,
    #[serde(flatten)]
    pub callback: HostCallback,
}

/// Widget state after the last step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalState {
    pub text: String,
    pub selection: Selection,
    pub intervals: Vec<TriggerInterval>,
    pub active_index: Option<usize>,
    pub tracking: bool,
    pub suggestions_open: bool,
    pub input_height: f32,
    pub pending_settle: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayOutput {
    pub callbacks: Vec<CallbackRecord>,
    pub final_state: FinalState,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayOptions {
    /// Run any scheduled keyword deletion right after each step, the way a
    /// host's next tick would.
    pub auto_settle: bool,
}

pub fn replay(
    config: MentionsConfig,
    script: &[ScriptLine],
    options: ReplayOptions,
) -> Result<ReplayOutput, ConfigError> {
    let mut input = MentionsTextInput::new(config, RecordingHandler::default())?;
    let mut callbacks = Vec::new();

    for ScriptLine { line, step } in script {
        debug!(line, ?step, "replaying step");
        apply(&mut input, step);
        if options.auto_settle {
            input.settle();
        }
        callbacks.extend(
            input
                .handler_mut()
                .take()
                .into_iter()
                .map(|callback| CallbackRecord {
                    line: *line,
                    callback,
                }),
        );
    }

    let tracker = input.tracker();
    let final_state = FinalState {
        text: input.text().to_string(),
        selection: input.selection(),
        intervals: tracker.intervals().to_vec(),
        active_index: tracker.active_index(),
        tracking: tracker.is_tracking(),
        suggestions_open: input.suggestions_panel().is_open(),
        input_height: input.input_height(),
        pending_settle: input.needs_settle(),
    };
    Ok(ReplayOutput {
        callbacks,
        final_state,
    })
}

fn apply(input: &mut MentionsTextInput<RecordingHandler>, step: &ScriptStep) {
    match step {
        ScriptStep::ChangeText { text } => input.change_text(text.as_str()),
        ScriptStep::Select { start, end } => {
            input.change_selection(Selection::new(*start, end.unwrap_or(*start)));
        }
        ScriptStep::Type { text } => input.type_text(text),
        ScriptStep::Paste { text } => input.paste(text),
        ScriptStep::Backspace => input.backspace(),
        ScriptStep::Click { offset } => input.click(*offset),
        ScriptStep::Settle => {
            input.settle();
        }
        ScriptStep::StopTracking => input.stop_tracking(),
        ScriptStep::SetValue { value } => input.set_value(value.as_deref()),
        ScriptStep::ContentSize { height } => input.content_size_changed(*height),
    }
}
