//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: the cached session (`InterviewSession`, `Turn`, `Role`, `Difficulty`)
//! - `phase`: controller phases and end/pause reasons
//! - `backend`: the backend trait and its request/response types
//! - `score`: readiness score extraction
//! - `event`: controller notifications

mod backend;
mod event;
mod model;
mod phase;
mod score;

pub use backend::{
    AttemptQuota, InterviewBackend, RemoteSession, ReplyOutcome, StartRequest, StartedSession,
    TokenSource,
};
pub use event::ControllerEvent;
pub use model::{Difficulty, InterviewSession, Role, Turn};
pub use phase::{EndKind, EndReason, PauseReason, SessionPhase};
pub use score::{ReadinessSummary, extract_readiness};
