//! Wire shapes of the interview endpoints.
//!
//! Every response is deserialized into one of these lenient structs and then
//! converted into the domain types of `icp_core::session`. Nothing past this
//! module sees raw JSON.

use icp_core::error::{IcpError, Result};
use icp_core::session::{
    AttemptQuota, Difficulty, RemoteSession, ReplyOutcome, Role, StartedSession, Turn,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(crate) struct LimitsResponse {
    remaining: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    AttemptQuota::default().limit
}

impl From<LimitsResponse> for AttemptQuota {
    fn from(r: LimitsResponse) -> Self {
        AttemptQuota {
            remaining: r.remaining,
            limit: r.limit,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StartResponse {
    session_id: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    asked_count: Option<u32>,
    #[serde(default)]
    questions_limit: Option<u32>,
}

impl TryFrom<StartResponse> for StartedSession {
    type Error = IcpError;

    fn try_from(r: StartResponse) -> Result<Self> {
        if r.session_id.trim().is_empty() {
            return Err(IcpError::backend(200, "start response has an empty session_id"));
        }
        Ok(StartedSession {
            session_id: r.session_id,
            message: r.message,
            asked_count: r.asked_count,
            questions_limit: r.questions_limit,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReplyResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    ended: bool,
    #[serde(default)]
    asked_count: Option<u32>,
    #[serde(default)]
    readiness_score: Option<Value>,
}

impl From<ReplyResponse> for ReplyOutcome {
    fn from(r: ReplyResponse) -> Self {
        if r.ended {
            ReplyOutcome::Ended {
                message: r.message,
                asked_count: r.asked_count,
                readiness_score: r.readiness_score.as_ref().and_then(score_from_value),
            }
        } else {
            ReplyOutcome::Continue {
                message: r.message,
                asked_count: r.asked_count,
            }
        }
    }
}

/// Accepts `82`, `82.0` or `"82"`; anything outside 0..=100 is dropped.
fn score_from_value(value: &Value) -> Option<u8> {
    let score = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (0.0..=100.0).contains(&score).then(|| score.round() as u8)
}

#[derive(Debug, Deserialize)]
pub(crate) struct EndResponse {
    #[serde(default)]
    message: Option<String>,
}

impl EndResponse {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message.filter(|m| !m.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptEntry {
    #[serde(default)]
    role: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionResponse {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    questions_limit: Option<u32>,
    #[serde(default)]
    asked_count: Option<u32>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    transcript: Vec<TranscriptEntry>,
    #[serde(default)]
    ended_at: Option<Value>,
}

impl SessionResponse {
    /// `requested_id` fills in a missing `session_id`; `default_limit` a
    /// missing `questions_limit`.
    pub(crate) fn into_remote(self, requested_id: &str, default_limit: u32) -> RemoteSession {
        let ended_at = match self.ended_at {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        };
        RemoteSession {
            session_id: self
                .session_id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| requested_id.to_string()),
            questions_limit: self.questions_limit.unwrap_or(default_limit),
            asked_count: self.asked_count.unwrap_or(0),
            difficulty: self.difficulty.and_then(|d| d.parse::<Difficulty>().ok()),
            transcript: self
                .transcript
                .into_iter()
                .map(|t| Turn {
                    role: Role::from_backend(&t.role),
                    text: t.text,
                })
                .collect(),
            ended_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    detail: Value,
}

/// Extracts the `detail` of an error body, or returns the raw text.
pub(crate) fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: Value::String(s),
        }) => s,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) if body.trim().is_empty() => "no details".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
