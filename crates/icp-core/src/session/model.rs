//! Interview session domain model.
//!
//! The backend is authoritative for sessions; this is the client's cached copy
//! that the controller mutates while a session is live.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Who said a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The AI interviewer.
    Ai,
    /// The candidate.
    User,
}

impl Role {
    /// Maps backend role names onto the two-party transcript.
    ///
    /// The backend stores `assistant` for the interviewer; everything else is
    /// treated as the candidate.
    pub fn from_backend(role: &str) -> Self {
        if role.eq_ignore_ascii_case("assistant") || role.eq_ignore_ascii_case("ai") {
            Role::Ai
        } else {
            Role::User
        }
    }
}

/// A single transcript line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }
}

/// Interview difficulty, fixed at session start.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

/// The client's copy of a live interview session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSession {
    /// Server-issued identifier.
    pub session_id: String,
    /// Number of questions posed so far, as reported by the server.
    pub asked_count: u32,
    /// Ceiling on asked questions, fixed at start.
    pub questions_limit: u32,
    pub difficulty: Difficulty,
    /// Append-only while live; rebuilt from the server on resume.
    pub transcript: Vec<Turn>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Present only after a normal end with a parseable score.
    pub readiness_score: Option<u8>,
}

impl InterviewSession {
    /// Creates a session from the server's start response.
    pub fn started(
        session_id: impl Into<String>,
        difficulty: Difficulty,
        questions_limit: u32,
        asked_count: u32,
        opening_question: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            asked_count: asked_count.max(1),
            questions_limit,
            difficulty,
            transcript: vec![Turn::ai(opening_question)],
            ended_at: None,
            readiness_score: None,
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.transcript.push(turn);
    }

    /// Removes the last turn if it is the candidate's, returning its text.
    ///
    /// Used to roll back an optimistic append when the reply call fails.
    pub fn pop_user_turn(&mut self) -> Option<String> {
        match self.transcript.last() {
            Some(turn) if turn.role == Role::User => self.transcript.pop().map(|t| t.text),
            _ => None,
        }
    }

    /// Takes the server's asked count without ever moving backwards.
    pub fn record_asked_count(&mut self, server_count: u32) {
        if server_count > self.asked_count {
            self.asked_count = server_count;
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    pub fn last_ai_turn(&self) -> Option<&Turn> {
        self.transcript.iter().rev().find(|t| t.role == Role::Ai)
    }
}
