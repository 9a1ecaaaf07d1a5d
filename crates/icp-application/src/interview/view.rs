use serde::Serialize;

use icp_core::session::{AttemptQuota, Difficulty, EndKind, SessionPhase, Turn};
use icp_core::state::{ClientState, VoiceGender};

/// Device and output preferences, mirrored from the persisted client state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub camera_enabled: bool,
    pub mic_enabled: bool,
    pub speaker_enabled: bool,
    pub voice_gender: VoiceGender,
    pub camera_device_id: Option<String>,
    pub mic_device_id: Option<String>,
}

impl Preferences {
    pub fn from_state(state: &ClientState) -> Self {
        Self {
            camera_enabled: state.camera_enabled,
            mic_enabled: state.mic_enabled,
            speaker_enabled: state.speaker_enabled,
            voice_gender: state.voice_gender,
            camera_device_id: state.camera_device_id.clone(),
            mic_device_id: state.mic_device_id.clone(),
        }
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self::from_state(&ClientState::default())
    }
}

/// What is left of a session after it ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub end_kind: EndKind,
    pub readiness_score: Option<u8>,
    pub feedback: String,
    pub transcript: Vec<Turn>,
}

/// Read-only snapshot of the controller for renderers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewView {
    pub phase: SessionPhase,
    pub session_id: Option<String>,
    pub asked_count: u32,
    pub questions_limit: u32,
    pub difficulty: Option<Difficulty>,
    pub transcript: Vec<Turn>,
    pub draft: String,
    pub remaining_secs: Option<u64>,
    pub invalid_attempts: u32,
    pub invalid_threshold: u32,
    pub quota: AttemptQuota,
    pub recording: bool,
    pub speaking: bool,
    pub face_detected: bool,
    pub preferences: Preferences,
    pub result: Option<SessionResult>,
    pub signed_in: bool,
    pub user_name: Option<String>,
}

impl InterviewView {
    /// Progress label such as "Question 3 of 10".
    pub fn progress_label(&self) -> Option<String> {
        self.session_id.as_ref()?;
        Some(format!(
            "Question {} of {}",
            self.asked_count.min(self.questions_limit.max(1)),
            self.questions_limit
        ))
    }
}
