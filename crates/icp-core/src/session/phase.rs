//! Session lifecycle phases.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Why a session was ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The user pressed "end interview" and confirmed.
    #[strum(to_string = "User terminated")]
    UserRequested,
    /// The interview time budget ran out.
    #[strum(to_string = "Time limit reached")]
    TimeLimit,
    /// Too many answers were classified as gibberish.
    #[strum(to_string = "Repeated invalid responses")]
    InvalidAnswers,
    /// The backend closed the session after the final question.
    #[strum(to_string = "Completed")]
    Completed,
}

impl EndReason {
    /// Only explicit user requests need an interactive confirmation.
    pub fn requires_confirmation(self) -> bool {
        matches!(self, EndReason::UserRequested)
    }
}

/// Why a live session was paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    #[strum(to_string = "Paused due to inactivity")]
    Inactivity,
    #[strum(to_string = "Paused: face not detected")]
    PresenceLost,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum EndKind {
    /// The backend finished the interview (or the user confirmed ending it).
    Normal,
    /// The client terminated the session on its own.
    Forced(EndReason),
}

impl EndKind {
    pub fn for_reason(reason: EndReason) -> Self {
        match reason {
            EndReason::Completed | EndReason::UserRequested => EndKind::Normal,
            other => EndKind::Forced(other),
        }
    }
}

/// The controller's state machine.
///
/// `Idle → Starting → Active ⇄ Paused → Ended`. Only `Active` and `Paused`
/// carry a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", content = "detail", rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    Starting,
    Active,
    Paused(PauseReason),
    Ended(EndKind),
}

impl SessionPhase {
    pub fn is_active(self) -> bool {
        matches!(self, SessionPhase::Active)
    }

    /// Phases in which a session id is held.
    pub fn holds_session(self) -> bool {
        matches!(self, SessionPhase::Active | SessionPhase::Paused(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_kind_for_reason() {
        assert_eq!(EndKind::for_reason(EndReason::Completed), EndKind::Normal);
        assert_eq!(
            EndKind::for_reason(EndReason::TimeLimit),
            EndKind::Forced(EndReason::TimeLimit)
        );
    }

    #[test]
    fn test_only_user_requests_need_confirmation() {
        assert!(EndReason::UserRequested.requires_confirmation());
        assert!(!EndReason::TimeLimit.requires_confirmation());
        assert!(!EndReason::InvalidAnswers.requires_confirmation());
    }

    #[test]
    fn test_holds_session() {
        assert!(SessionPhase::Active.holds_session());
        assert!(SessionPhase::Paused(PauseReason::Inactivity).holds_session());
        assert!(!SessionPhase::Ended(EndKind::Normal).holds_session());
        assert!(!SessionPhase::Starting.holds_session());
    }
}
