//! Persisted client state.

mod model;
mod repository;

pub use model::{ClientState, ResumeProfile, VoiceGender};
pub use repository::{ClientStateRepository, StateUpdate};
