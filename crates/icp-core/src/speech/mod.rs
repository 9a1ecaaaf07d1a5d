//! Speech input and output.
//!
//! Recognition and synthesis engines are host capabilities. This module
//! defines their traits plus the engine-independent logic: draft
//! accumulation, recognizer restarts and voice selection.

mod capture;
mod voice;

pub use capture::{CaptureAction, RecognitionEvent, Segment, SpeechCapture, append_final_segments};
pub use voice::{Utterance, Voice, VoiceChoice, find_by_id, select_preferred_voice};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::presence::MediaDevice;

/// Continuous speech-to-text with interim results.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn microphones(&self) -> Result<Vec<MediaDevice>>;

    /// Starts recognition. Events are delivered on `sink` until `stop` or
    /// an `End` event.
    fn start(
        &self,
        device_id: Option<&str>,
        language: &str,
        sink: mpsc::UnboundedSender<RecognitionEvent>,
    ) -> Result<()>;

    fn stop(&self);
}

/// Text-to-speech output.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn voices(&self) -> Vec<Voice>;

    /// Speaks one utterance. `on_end` runs when playback finishes or is
    /// cancelled.
    fn speak(&self, utterance: Utterance, on_end: Box<dyn FnOnce() + Send>);

    fn cancel(&self);
}
