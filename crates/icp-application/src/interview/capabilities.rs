use std::sync::Arc;

use icp_core::capability::Capability;
use icp_core::presence::{FaceDetector, VideoSource};
use icp_core::speech::{SpeechRecognizer, SpeechSynthesizer};

/// Host-provided device capabilities, resolved once at startup.
#[derive(Clone)]
pub struct Capabilities {
    pub video: Capability<Arc<dyn VideoSource>>,
    pub face_detector: Capability<Arc<dyn FaceDetector>>,
    pub recognizer: Capability<Arc<dyn SpeechRecognizer>>,
    pub synthesizer: Capability<Arc<dyn SpeechSynthesizer>>,
}

impl Capabilities {
    /// No devices at all, e.g. a terminal front end.
    pub fn none() -> Self {
        Self {
            video: Capability::unavailable("no camera backend"),
            face_detector: Capability::unavailable("no face detector"),
            recognizer: Capability::unavailable("no speech recognizer"),
            synthesizer: Capability::unavailable("no speech synthesizer"),
        }
    }

    pub fn with_video(mut self, source: Arc<dyn VideoSource>) -> Self {
        self.video = Capability::Available(source);
        self
    }

    pub fn with_face_detector(mut self, detector: Arc<dyn FaceDetector>) -> Self {
        self.face_detector = Capability::Available(detector);
        self
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        self.recognizer = Capability::Available(recognizer);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Capability::Available(synthesizer);
        self
    }

    /// Presence monitoring needs both a camera and a detector.
    pub(crate) fn presence(&self) -> Option<(Arc<dyn VideoSource>, Arc<dyn FaceDetector>)> {
        Some((self.video.get()?.clone(), self.face_detector.get()?.clone()))
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("video", &self.video)
            .field("face_detector", &self.face_detector)
            .field("recognizer", &self.recognizer)
            .field("synthesizer", &self.synthesizer)
            .finish()
    }
}
