use serde::{Deserialize, Serialize};

/// One recognized segment, interim or final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub is_final: bool,
}

impl Segment {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// Events emitted by a running recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognitionEvent {
    Result { segments: Vec<Segment> },
    Error(String),
    /// The engine stopped on its own (silence, network hiccup).
    End,
}

/// What the owner of the recognizer should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureAction {
    Nothing,
    /// Final text was appended to the draft; counts as interaction.
    DraftUpdated,
    /// Start the recognizer again.
    Restart,
    /// Capture stopped because of an engine error.
    Failed(String),
}

/// Continuous capture state: keeps the recognizer running while recording.
#[derive(Debug, Clone, Default)]
pub struct SpeechCapture {
    recording: bool,
}

impl SpeechCapture {
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
    }

    pub fn handle(&mut self, event: RecognitionEvent, draft: &mut String) -> CaptureAction {
        match event {
            RecognitionEvent::Result { segments } => {
                if append_final_segments(draft, &segments) {
                    CaptureAction::DraftUpdated
                } else {
                    CaptureAction::Nothing
                }
            }
            RecognitionEvent::Error(message) => {
                self.recording = false;
                CaptureAction::Failed(message)
            }
            RecognitionEvent::End if self.recording => CaptureAction::Restart,
            RecognitionEvent::End => CaptureAction::Nothing,
        }
    }
}

/// Joins the final segments and appends them to `draft`, space-separated.
/// Returns whether anything was appended.
pub fn append_final_segments(draft: &mut String, segments: &[Segment]) -> bool {
    let text: String = segments
        .iter()
        .filter(|s| s.is_final)
        .map(|s| s.text.as_str())
        .collect();
    if text.is_empty() {
        return false;
    }
    if !draft.is_empty() {
        draft.push(' ');
    }
    draft.push_str(&text);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_only_final_segments() {
        let mut draft = String::from("I have");
        let changed = append_final_segments(
            &mut draft,
            &[
                Segment::final_text("five years"),
                Segment::interim("of exp"),
            ],
        );
        assert!(changed);
        assert_eq!(draft, "I have five years");
    }

    #[test]
    fn test_interim_only_is_ignored() {
        let mut draft = String::new();
        assert!(!append_final_segments(&mut draft, &[Segment::interim("hel")]));
        assert!(draft.is_empty());
    }

    #[test]
    fn test_end_restarts_only_while_recording() {
        let mut capture = SpeechCapture::default();
        let mut draft = String::new();
        assert_eq!(capture.handle(RecognitionEvent::End, &mut draft), CaptureAction::Nothing);

        capture.set_recording(true);
        assert_eq!(capture.handle(RecognitionEvent::End, &mut draft), CaptureAction::Restart);
    }

    #[test]
    fn test_error_stops_recording() {
        let mut capture = SpeechCapture::default();
        capture.set_recording(true);
        let mut draft = String::new();
        let action = capture.handle(RecognitionEvent::Error("no-speech".into()), &mut draft);
        assert_eq!(action, CaptureAction::Failed("no-speech".into()));
        assert!(!capture.is_recording());
    }
}
