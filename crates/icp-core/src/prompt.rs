//! Interactive prompts and notices.
//!
//! The controller asks the user to confirm through [`UserPrompt`]; renderers
//! decide how to show the dialog. Auto-decision timeouts are applied by the
//! caller, not by implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A one-way message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    EndInterview,
    Inactivity,
    Presence,
}

/// A yes/no question for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmPrompt {
    pub kind: PromptKind,
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

const RESUME_HINT: &str = "If paused, you can resume later from History \u{2192} Resume Session.";

impl ConfirmPrompt {
    pub fn end_interview() -> Self {
        Self {
            kind: PromptKind::EndInterview,
            title: "End Interview?".to_string(),
            message: "Are you sure you want to end the current session?".to_string(),
            confirm_label: "Yes, end it!".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }

    pub fn inactivity() -> Self {
        Self {
            kind: PromptKind::Inactivity,
            title: "Are you still there?".to_string(),
            message: format!(
                "No activity detected. Continue the interview? {}",
                RESUME_HINT
            ),
            confirm_label: "Yes, continue".to_string(),
            cancel_label: "Pause".to_string(),
        }
    }

    pub fn presence() -> Self {
        Self {
            kind: PromptKind::Presence,
            title: "We can\u{2019}t detect you".to_string(),
            message: format!(
                "Please look towards the camera. Continue the interview? {}",
                RESUME_HINT
            ),
            confirm_label: "Yes, continue".to_string(),
            cancel_label: "Pause".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptAnswer {
    Confirmed,
    Declined,
}

/// The user-facing dialog surface.
#[async_trait]
pub trait UserPrompt: Send + Sync {
    /// Asks a yes/no question. Dismissing the dialog counts as `Declined`.
    async fn confirm(&self, prompt: &ConfirmPrompt) -> PromptAnswer;

    /// Shows a message that needs no answer.
    fn notify(&self, notice: &Notice);
}
