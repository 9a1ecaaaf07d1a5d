//! Backend interface consumed by the session controller.
//!
//! Defines the request/response types of the interview endpoints as explicit
//! domain types. Implementations parse wire payloads into these at the
//! boundary so the controller never inspects raw JSON.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::model::{Difficulty, Turn};
use crate::error::Result;

/// Daily interview attempts, as issued by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptQuota {
    pub remaining: u32,
    pub limit: u32,
}

impl Default for AttemptQuota {
    /// Nothing may start until the server has confirmed the quota.
    fn default() -> Self {
        Self {
            remaining: 0,
            limit: 3,
        }
    }
}

impl AttemptQuota {
    pub fn has_remaining(&self) -> bool {
        self.remaining > 0
    }

    /// Optimistic local decrement after a session completes or is aborted.
    pub fn consume(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

/// Body of the start-session call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    pub difficulty: Difficulty,
    pub questions_limit: u32,
    pub job_title: Option<String>,
    /// Raw JSON of the resume analysis, forwarded untouched.
    pub resume_feedback: Option<String>,
}

/// A freshly created session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedSession {
    pub session_id: String,
    pub message: String,
    pub asked_count: Option<u32>,
    /// The server clamps the requested limit; this is the value it kept.
    pub questions_limit: Option<u32>,
}

/// Result of sending an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The interviewer asked another question.
    Continue {
        message: String,
        asked_count: Option<u32>,
    },
    /// The interviewer closed the session.
    Ended {
        message: String,
        asked_count: Option<u32>,
        /// Structured score, when the server provides one.
        readiness_score: Option<u8>,
    },
}

impl ReplyOutcome {
    pub fn message(&self) -> &str {
        match self {
            ReplyOutcome::Continue { message, .. } | ReplyOutcome::Ended { message, .. } => message,
        }
    }

    pub fn asked_count(&self) -> Option<u32> {
        match self {
            ReplyOutcome::Continue { asked_count, .. }
            | ReplyOutcome::Ended { asked_count, .. } => *asked_count,
        }
    }

    pub fn is_ended(&self) -> bool {
        matches!(self, ReplyOutcome::Ended { .. })
    }
}

/// A session as stored by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSession {
    pub session_id: String,
    pub questions_limit: u32,
    pub asked_count: u32,
    pub difficulty: Option<Difficulty>,
    pub transcript: Vec<Turn>,
    /// Server-formatted end timestamp; presence marks the session terminal.
    pub ended_at: Option<String>,
}

impl RemoteSession {
    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }
}

/// Supplies the bearer token for authenticated calls.
pub trait TokenSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// The remote interview service.
///
/// Implementations map HTTP 401 to [`IcpError::Unauthorized`](crate::IcpError::Unauthorized)
/// and 429 to [`IcpError::RateLimited`](crate::IcpError::RateLimited) so the
/// controller can react without knowing the transport.
#[async_trait]
pub trait InterviewBackend: Send + Sync {
    /// Fetches the remaining daily attempts.
    async fn attempt_limits(&self) -> Result<AttemptQuota>;

    /// Creates a session and returns the opening question.
    async fn start_session(&self, request: &StartRequest) -> Result<StartedSession>;

    /// Sends the candidate's answer.
    async fn reply(&self, session_id: &str, user_text: &str) -> Result<ReplyOutcome>;

    /// Closes the session early. Returns the server's closing message, if any.
    async fn end_session(&self, session_id: &str) -> Result<Option<String>>;

    /// Loads a session for resumption.
    async fn fetch_session(&self, session_id: &str) -> Result<RemoteSession>;
}
