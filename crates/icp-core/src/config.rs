//! Client settings.
//!
//! Every tunable the session runner uses lives here so that the controller,
//! the timers and the CLI agree on one set of values.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://interview-coach-prep.onrender.com";

/// Runtime settings, loaded from `settings.toml` with defaults for every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the backend (no trailing slash).
    pub api_base_url: String,
    /// Per-request timeout for backend calls.
    pub request_timeout_secs: u64,
    /// Number of questions requested when the user does not choose.
    pub default_questions: u32,
    /// Time budget granted per question.
    pub seconds_per_question: u64,
    /// Idle time before the "still there?" prompt.
    pub inactivity_timeout_secs: u64,
    /// Auto-decision timeout of presence and inactivity prompts.
    pub confirm_timeout_secs: u64,
    /// Face detection polling interval.
    pub presence_poll_millis: u64,
    /// Continuous absence that triggers a presence confirmation.
    pub absence_escalation_secs: u64,
    /// Consecutive invalid answers that force the session to end.
    pub invalid_threshold: u32,
    /// Recognition and synthesis language.
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
            default_questions: 10,
            seconds_per_question: 120,
            inactivity_timeout_secs: 4 * 60,
            confirm_timeout_secs: 10,
            presence_poll_millis: 1000,
            absence_escalation_secs: 15,
            invalid_threshold: 3,
            language: "en-US".to_string(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    pub fn presence_poll_interval(&self) -> Duration {
        Duration::from_millis(self.presence_poll_millis.max(1))
    }

    pub fn absence_escalation(&self) -> Duration {
        Duration::from_secs(self.absence_escalation_secs)
    }

    /// Time budget for a fresh session of `questions_limit` questions.
    pub fn interview_budget_secs(&self, questions_limit: u32) -> u64 {
        u64::from(questions_limit) * self.seconds_per_question
    }

    /// Language prefix used for voice fallback ("en" for "en-US").
    pub fn language_prefix(&self) -> &str {
        self.language
            .split(['-', '_'])
            .next()
            .unwrap_or(&self.language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.invalid_threshold, 3);
        assert_eq!(settings.interview_budget_secs(10), 1200);
        assert_eq!(settings.language_prefix(), "en");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str("seconds_per_question = 60").unwrap();
        assert_eq!(settings.seconds_per_question, 60);
        assert_eq!(settings.inactivity_timeout_secs, 240);
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
    }
}
