use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Longest `trigger_delay` accepted; keeps the compiled matcher small.
pub const MAX_TRIGGER_DELAY: usize = 64;

/// Where a trigger character may open a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerLocation {
    /// Only at the start of the text or right after whitespace.
    NewWordOnly,
    #[default]
    Anywhere,
}

/// What a backspace removes once it has been armed to delete a whole mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackspaceDeletion {
    /// Remove the trigger character along with its keyword.
    #[default]
    WholeMention,
    /// Remove the keyword but keep the trigger and resume tracking on it.
    KeepTrigger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    pub trigger: char,
    pub trigger_location: TriggerLocation,
    /// Minimum number of keyword characters after the trigger before a
    /// keyword is reported.
    pub trigger_delay: usize,
    pub backspace_deletion: BackspaceDeletion,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            trigger: '@',
            trigger_location: TriggerLocation::default(),
            trigger_delay: 1,
            backspace_deletion: BackspaceDeletion::default(),
        }
    }
}

impl TriggerConfig {
    pub fn with_trigger(trigger: char) -> Self {
        Self {
            trigger,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trigger.is_whitespace() {
            return Err(ConfigError::WhitespaceTrigger);
        }
        if is_keyword_char(self.trigger) {
            return Err(ConfigError::KeywordCharacterTrigger(self.trigger));
        }
        if self.trigger_delay > MAX_TRIGGER_DELAY {
            return Err(ConfigError::DelayTooLarge {
                delay: self.trigger_delay,
                max: MAX_TRIGGER_DELAY,
            });
        }
        Ok(())
    }
}

/// Characters that may follow a trigger inside a keyword.
pub fn is_keyword_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-')
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("trigger must not be a whitespace character")]
    WhitespaceTrigger,
    #[error("trigger `{0}` would be read as part of its own keyword")]
    KeywordCharacterTrigger(char),
    #[error("trigger_delay {delay} exceeds the maximum of {max}")]
    DelayTooLarge { delay: usize, max: usize },
    #[error("failed to compile keyword matcher: {0}")]
    Pattern(#[from] regex_lite::Error),
}
