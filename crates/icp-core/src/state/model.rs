//! Client state domain models.
//!
//! Contains the record that persists across restarts of the client.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which interviewer voice the user prefers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum VoiceGender {
    #[default]
    Female,
    Male,
}

impl VoiceGender {
    /// Pitch used when no stored voice could be resolved.
    pub fn fallback_pitch(self) -> f32 {
        match self {
            VoiceGender::Male => 0.8,
            VoiceGender::Female => 1.2,
        }
    }
}

/// Resume analysis produced by the dashboard flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeProfile {
    pub job_title: Option<String>,
    /// Raw JSON of the analysis, forwarded to the backend as-is.
    pub resume_feedback: Option<String>,
}

/// Client state that persists across restarts.
///
/// # File Location
///
/// - macOS: `~/Library/Application Support/interview-coach-prep/client_state.toml`
/// - Linux: `~/.config/interview-coach-prep/client_state.toml`
/// - Windows: `%APPDATA%\interview-coach-prep\client_state.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientState {
    pub token: Option<String>,

    /// Id of the session that was live when the client last stopped.
    pub session_id: Option<String>,
    pub remaining_time_secs: Option<u64>,
    pub invalid_attempts: u32,

    pub camera_device_id: Option<String>,
    pub mic_device_id: Option<String>,
    pub female_voice_id: Option<String>,
    pub male_voice_id: Option<String>,

    pub speaker_enabled: bool,
    pub mic_enabled: bool,
    pub camera_enabled: bool,
    pub voice_gender: VoiceGender,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_profile: Option<ResumeProfile>,
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            token: None,
            session_id: None,
            remaining_time_secs: None,
            invalid_attempts: 0,
            camera_device_id: None,
            mic_device_id: None,
            female_voice_id: None,
            male_voice_id: None,
            speaker_enabled: true,
            mic_enabled: true,
            camera_enabled: true,
            voice_gender: VoiceGender::default(),
            resume_profile: None,
        }
    }
}

impl ClientState {
    /// Forgets the live session. Preferences and the token survive.
    pub fn clear_session(&mut self) {
        self.session_id = None;
        self.remaining_time_secs = None;
        self.invalid_attempts = 0;
    }

    pub fn voice_id(&self, gender: VoiceGender) -> Option<&str> {
        match gender {
            VoiceGender::Female => self.female_voice_id.as_deref(),
            VoiceGender::Male => self.male_voice_id.as_deref(),
        }
    }

    pub fn set_voice_id(&mut self, gender: VoiceGender, voice_id: Option<String>) {
        match gender {
            VoiceGender::Female => self.female_voice_id = voice_id,
            VoiceGender::Male => self.male_voice_id = voice_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_outputs() {
        let state = ClientState::default();
        assert!(state.speaker_enabled);
        assert!(state.mic_enabled);
        assert!(state.camera_enabled);
        assert_eq!(state.voice_gender, VoiceGender::Female);
    }

    #[test]
    fn test_clear_session_keeps_preferences() {
        let mut state = ClientState {
            token: Some("t".into()),
            session_id: Some("s1".into()),
            remaining_time_secs: Some(300),
            invalid_attempts: 2,
            camera_device_id: Some("cam".into()),
            ..Default::default()
        };
        state.clear_session();

        assert_eq!(state.session_id, None);
        assert_eq!(state.remaining_time_secs, None);
        assert_eq!(state.invalid_attempts, 0);
        assert_eq!(state.token.as_deref(), Some("t"));
        assert_eq!(state.camera_device_id.as_deref(), Some("cam"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let state: ClientState = toml::from_str("sessionId = \"abc\"\n").unwrap();
        assert_eq!(state.session_id.as_deref(), Some("abc"));
        assert!(state.speaker_enabled);
    }

    #[test]
    fn test_voice_id_by_gender() {
        let mut state = ClientState::default();
        state.set_voice_id(VoiceGender::Male, Some("david".into()));
        assert_eq!(state.voice_id(VoiceGender::Male), Some("david"));
        assert_eq!(state.voice_id(VoiceGender::Female), None);
    }

    #[test]
    fn test_fallback_pitch() {
        assert_eq!(VoiceGender::Male.fallback_pitch(), 0.8);
        assert_eq!(VoiceGender::Female.fallback_pitch(), 1.2);
    }
}
