use serde::Serialize;

use super::backend::AttemptQuota;
use super::model::Turn;
use super::phase::SessionPhase;
use crate::prompt::Notice;

/// Notifications published by the session controller.
///
/// Renderers subscribe to these instead of polling the controller.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerEvent {
    PhaseChanged { phase: SessionPhase },
    TurnAppended { turn: Turn },
    /// The last user turn was rolled back after a failed reply call.
    TurnRetracted,
    /// The transcript was replaced wholesale (resume).
    TranscriptReplaced { turns: Vec<Turn> },
    DraftChanged { draft: String },
    Notice { notice: Notice },
    Speaking { speaking: bool },
    Recording { recording: bool },
    Presence { face_detected: bool },
    InterviewClock { remaining_secs: u64 },
    AuthClock { remaining_secs: u64 },
    QuotaChanged { quota: AttemptQuota },
    Finished {
        readiness_score: Option<u8>,
        feedback: String,
    },
}
