//! Hook type definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HookError;

/// The fixed lifecycle points at which the engine can be invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HookType {
    /// Fired before a configuration file is written.
    PreConfigModification,
    /// Fired when the user submits a prompt.
    UserPromptSubmit,
    /// Fired after a tool invocation finishes.
    PostToolUse,
    /// Fired before the active project changes.
    PreProjectSwitch,
    /// Fired after the active project changed.
    PostProjectSwitch,
}

impl HookType {
    /// Every hook type, in declaration order.
    pub const ALL: [HookType; 5] = [
        Self::PreConfigModification,
        Self::UserPromptSubmit,
        Self::PostToolUse,
        Self::PreProjectSwitch,
        Self::PostProjectSwitch,
    ];

    /// Returns the canonical name of this hook type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreConfigModification => "PRE_CONFIG_MODIFICATION",
            Self::UserPromptSubmit => "USER_PROMPT_SUBMIT",
            Self::PostToolUse => "POST_TOOL_USE",
            Self::PreProjectSwitch => "PRE_PROJECT_SWITCH",
            Self::PostProjectSwitch => "POST_PROJECT_SWITCH",
        }
    }
}

impl fmt::Display for HookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookType {
    type Err = HookError;

    /// Accepts `USER_PROMPT_SUBMIT`, `UserPromptSubmit` and
    /// `user-prompt-submit` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Self::ALL
            .into_iter()
            .find(|hook| hook.as_str().replace('_', "").to_ascii_lowercase() == normalized)
            .ok_or_else(|| HookError::Configuration(format!("Unknown hook type '{s}'")))
    }
}
