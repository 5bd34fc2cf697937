//! Replay scripts: one JSON object per line, each naming a host action.
//!
//! Blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! {"type": "type", "text": "Hi @bo"}
//! {"type": "click", "offset": 6}
//! {"type": "backspace"}
//! {"type": "settle"}
//! ```

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ScriptStep {
    /// Replace the whole buffer, as a host `onChangeText` would.
    ChangeText { text: String },
    /// Report a caret (`end` omitted) or a selection.
    Select {
        start: usize,
        #[serde(default)]
        end: Option<usize>,
    },
    /// Type characters one keystroke at a time.
    Type { text: String },
    Paste { text: String },
    Backspace,
    Click { offset: usize },
    Settle,
    StopTracking,
    SetValue {
        #[serde(default)]
        value: Option<String>,
    },
    ContentSize { height: f32 },
}

/// A step plus the script line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub step: ScriptStep,
}

#[derive(Debug, Error)]
#[error("line {line}: {source}")]
pub struct ScriptError {
    pub line: usize,
    #[source]
    pub source: serde_json::Error,
}

pub fn parse_script(contents: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    contents
        .lines()
        .enumerate()
        .map(|(index, raw)| (index + 1, raw.trim()))
        .filter(|(_, raw)| !raw.is_empty() && !raw.starts_with('#'))
        .map(|(line, raw)| {
            serde_json::from_str(raw)
                .map(|step| ScriptLine { line, step })
                .map_err(|source| ScriptError { line, source })
        })
        .collect()
}
