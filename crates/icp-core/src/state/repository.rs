//! Client state repository trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::state::model::{ClientState, VoiceGender};

/// A modification applied to the stored state under the repository's lock.
pub type StateUpdate = Box<dyn FnOnce(&mut ClientState) + Send>;

/// Repository for the persisted client state.
///
/// `update` must be atomic: the read, the modification and the write happen
/// under one lock, and writes reach storage in lock order. Every helper is a
/// single `update`, so concurrent writers never lose each other's changes.
#[async_trait]
pub trait ClientStateRepository: Send + Sync {
    /// Replaces the stored state wholesale.
    async fn save_state(&self, state: ClientState) -> Result<()>;

    async fn get_state(&self) -> Result<ClientState>;

    /// Applies `apply` to the stored state and returns the new state.
    async fn update(&self, apply: StateUpdate) -> Result<ClientState>;

    async fn get_token(&self) -> Option<String> {
        self.get_state().await.ok().and_then(|s| s.token)
    }

    async fn set_token(&self, token: String) -> Result<()> {
        self.update(Box::new(move |state: &mut ClientState| {
            state.token = Some(token);
        }))
        .await
        .map(|_| ())
    }

    async fn get_session_id(&self) -> Option<String> {
        self.get_state().await.ok().and_then(|s| s.session_id)
    }

    async fn set_session_id(&self, session_id: String) -> Result<()> {
        self.update(Box::new(move |state: &mut ClientState| {
            state.session_id = Some(session_id);
        }))
        .await
        .map(|_| ())
    }

    async fn set_remaining_time(&self, secs: u64) -> Result<()> {
        self.update(Box::new(move |state: &mut ClientState| {
            state.remaining_time_secs = Some(secs);
        }))
        .await
        .map(|_| ())
    }

    async fn set_invalid_attempts(&self, attempts: u32) -> Result<()> {
        self.update(Box::new(move |state: &mut ClientState| {
            state.invalid_attempts = attempts;
        }))
        .await
        .map(|_| ())
    }

    /// Clears session id, remaining time and the invalid-answer counter.
    async fn clear_session(&self) -> Result<()> {
        self.update(Box::new(ClientState::clear_session))
            .await
            .map(|_| ())
    }

    /// Wipes everything, including the token and preferences.
    async fn clear_all(&self) -> Result<()> {
        self.save_state(ClientState::default()).await
    }

    async fn set_voice_id(&self, gender: VoiceGender, voice_id: String) -> Result<()> {
        self.update(Box::new(move |state: &mut ClientState| {
            state.set_voice_id(gender, Some(voice_id));
        }))
        .await
        .map(|_| ())
    }
}
