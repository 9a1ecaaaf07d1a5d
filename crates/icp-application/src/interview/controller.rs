//! The interview session controller.
//!
//! `InterviewController` owns the live session and is its only writer. State
//! lives behind a single `tokio::sync::Mutex` that is never held across a
//! backend call or a user prompt. Every session run carries an epoch and a
//! cancellation token; pausing or ending bumps the epoch, so tick handlers
//! spawned for an older run see the mismatch and stop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, broadcast, mpsc};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use icp_core::config::Settings;
use icp_core::error::{Guidance, IcpError, Result};
use icp_core::presence::{
    FaceDetector, PresenceSignal, PresenceTracker, VideoStream, acquire_camera,
    microphone_candidates,
};
use icp_core::prompt::{ConfirmPrompt, Notice, PromptAnswer, PromptKind, UserPrompt};
use icp_core::session::{
    AttemptQuota, ControllerEvent, Difficulty, EndKind, EndReason, InterviewBackend,
    InterviewSession, PauseReason, ReadinessSummary, ReplyOutcome, SessionPhase, StartRequest,
    Turn, extract_readiness,
};
use icp_core::speech::{
    CaptureAction, RecognitionEvent, SpeechCapture, SpeechRecognizer, Utterance, Voice,
    VoiceChoice,
};
use icp_core::state::{ClientState, ClientStateRepository, ResumeProfile, VoiceGender};
use icp_core::timer::{CountdownTick, InactivityWatchdog, InterviewCountdown};
use icp_core::validator::{InvalidAnswerGuard, is_invalid};

use super::capabilities::Capabilities;
use super::view::{InterviewView, Preferences, SessionResult};
use crate::auth_state::{AuthEvent, AuthStateService};

const DASHBOARD_REDIRECT: &str = "/dashboard";

const INVALID_REPROMPT: &str = "I didn\u{2019}t quite catch that. Please answer in clear words. \
     Try responding to the previous question in your own words.";
const INVALID_END_TURN: &str =
    "Session ended due to repeated invalid responses. Readiness Score: N/A.";
const INVALID_END_FEEDBACK: &str = "We received multiple responses that looked like random \
     characters or non-words. The session is now closed. Readiness Score is N/A.";
const END_DEFAULT_FEEDBACK: &str = "Session ended.";
const END_FAILED_FEEDBACK: &str = "Session ended early. No score generated.";
const PAUSE_HINT: &str =
    "Your interview has been paused. You can resume later from History \u{2192} Resume Session.";

const TICK: Duration = Duration::from_secs(1);

/// Result of [`InterviewController::submit_answer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The interviewer asked the next question.
    Continued,
    /// The answer looked like gibberish and was not sent.
    Rejected { attempts: u32, threshold: u32 },
    /// The interviewer closed the session.
    Finished(ReadinessSummary),
    /// Too many invalid answers; the session was terminated.
    ForcedEnd,
}

/// Result of [`InterviewController::end_interview`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndOutcome {
    /// The user declined the confirmation.
    Cancelled,
    Ended(ReadinessSummary),
}

/// Timers of one Active stretch.
struct SessionRun {
    cancel: CancellationToken,
    countdown: InterviewCountdown,
    watchdog: InactivityWatchdog,
}

struct Inner {
    phase: SessionPhase,
    session: Option<InterviewSession>,
    draft: String,
    quota: AttemptQuota,
    guard: InvalidAnswerGuard,

    starting: bool,
    submitting: bool,
    ending: bool,
    /// A confirmation prompt (inactivity or presence) is on screen.
    confirm_open: bool,

    epoch: u64,
    run: Option<SessionRun>,

    camera: Option<Arc<dyn VideoStream>>,
    camera_generation: u64,
    camera_cancel: Option<CancellationToken>,
    presence: PresenceTracker,

    capture: SpeechCapture,
    capture_cancel: Option<CancellationToken>,

    prefs: Preferences,
    voices: Vec<Voice>,
    voice_choice: VoiceChoice,

    auth_cancel: Option<CancellationToken>,
    listening: bool,
    result: Option<SessionResult>,
}

impl Inner {
    fn new(settings: &Settings) -> Self {
        Self {
            phase: SessionPhase::Idle,
            session: None,
            draft: String::new(),
            quota: AttemptQuota::default(),
            guard: InvalidAnswerGuard::new(settings.invalid_threshold),
            starting: false,
            submitting: false,
            ending: false,
            confirm_open: false,
            epoch: 0,
            run: None,
            camera: None,
            camera_generation: 0,
            camera_cancel: None,
            presence: PresenceTracker::new(settings.absence_escalation()),
            capture: SpeechCapture::default(),
            capture_cancel: None,
            prefs: Preferences::default(),
            voices: Vec::new(),
            voice_choice: VoiceChoice::default(),
            auth_cancel: None,
            listening: false,
            result: None,
        }
    }

    fn session_id(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.session_id.clone())
    }

    fn touch(&mut self) {
        if let Some(run) = self.run.as_mut() {
            run.watchdog.touch(Instant::now());
        }
    }
}

pub struct InterviewController {
    settings: Settings,
    backend: Arc<dyn InterviewBackend>,
    state_repo: Arc<dyn ClientStateRepository>,
    auth: Arc<AuthStateService>,
    prompt: Arc<dyn UserPrompt>,
    capabilities: Capabilities,
    inner: Mutex<Inner>,
    events: broadcast::Sender<ControllerEvent>,
    // Written from synthesizer callbacks, which cannot take the async lock.
    speaking: Arc<AtomicBool>,
    speech_generation: Arc<AtomicU64>,
    weak_self: Weak<InterviewController>,
}

impl InterviewController {
    pub fn new(
        settings: Settings,
        backend: Arc<dyn InterviewBackend>,
        state_repo: Arc<dyn ClientStateRepository>,
        auth: Arc<AuthStateService>,
        prompt: Arc<dyn UserPrompt>,
        capabilities: Capabilities,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new_cyclic(|weak_self| Self {
            inner: Mutex::new(Inner::new(&settings)),
            settings,
            backend,
            state_repo,
            auth,
            prompt,
            capabilities,
            events,
            speaking: Arc::new(AtomicBool::new(false)),
            speech_generation: Arc::new(AtomicU64::new(0)),
            weak_self: weak_self.clone(),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn phase(&self) -> SessionPhase {
        self.inner.lock().await.phase
    }

    pub async fn quota(&self) -> AttemptQuota {
        self.inner.lock().await.quota
    }

    pub async fn result(&self) -> Option<SessionResult> {
        self.inner.lock().await.result.clone()
    }

    pub async fn snapshot(&self) -> InterviewView {
        let inner = self.inner.lock().await;
        let session = inner.session.as_ref();
        InterviewView {
            phase: inner.phase,
            session_id: inner.session_id(),
            asked_count: session.map_or(0, |s| s.asked_count),
            questions_limit: session.map_or(0, |s| s.questions_limit),
            difficulty: session.map(|s| s.difficulty),
            transcript: session.map(|s| s.transcript.clone()).unwrap_or_default(),
            draft: inner.draft.clone(),
            remaining_secs: inner.run.as_ref().map(|r| r.countdown.remaining()),
            invalid_attempts: inner.guard.attempts(),
            invalid_threshold: inner.guard.threshold(),
            quota: inner.quota,
            recording: inner.capture.is_recording(),
            speaking: self.speaking.load(Ordering::SeqCst),
            face_detected: inner.presence.face_detected(),
            preferences: inner.prefs.clone(),
            result: inner.result.clone(),
            signed_in: self.auth.is_authenticated(),
            user_name: self.auth.claims().and_then(|c| c.name),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Loads persisted preferences and auth, fetches the quota and restores
    /// an interrupted session.
    pub async fn init(&self) -> Result<()> {
        let claims = self.auth.init().await?;
        let state = self.state_repo.get_state().await?;
        {
            let mut inner = self.inner.lock().await;
            inner.prefs = Preferences::from_state(&state);
            inner.guard =
                InvalidAnswerGuard::with_attempts(self.settings.invalid_threshold, state.invalid_attempts);
        }
        self.resolve_voices(&state).await;

        if claims.is_some() {
            if let Err(e) = self.refresh_quota().await {
                tracing::warn!("[Interview] Could not fetch attempt quota: {}", e);
            }
            self.start_auth_clock().await;
        }

        let listen = {
            let mut inner = self.inner.lock().await;
            !std::mem::replace(&mut inner.listening, true)
        };
        if listen {
            self.spawn_auth_listener();
        }

        self.restore_if_any().await?;
        Ok(())
    }

    pub async fn refresh_quota(&self) -> Result<AttemptQuota> {
        match self.backend.attempt_limits().await {
            Ok(quota) => {
                self.inner.lock().await.quota = quota;
                self.emit(ControllerEvent::QuotaChanged { quota });
                Ok(quota)
            }
            Err(e) => {
                self.handle_remote_error(&e).await;
                Err(e)
            }
        }
    }

    /// Starts a new interview.
    ///
    /// Precondition failures come back as [`IcpError::Guidance`] without a
    /// backend call. `job_context` overrides the persisted resume profile.
    pub async fn start(
        &self,
        difficulty: Difficulty,
        questions_limit: u32,
        job_context: Option<ResumeProfile>,
    ) -> Result<()> {
        if !self.auth.is_authenticated() {
            return Err(Guidance::SignIn.into());
        }
        let profile = match job_context {
            Some(profile) => Some(profile),
            None => self.state_repo.get_state().await?.resume_profile,
        };
        let has_profile =
            profile.is_some() || self.auth.claims().is_some_and(|c| c.has_analyzed);

        {
            let mut inner = self.inner.lock().await;
            if inner.starting {
                return Err(IcpError::Busy("start"));
            }
            if inner.phase.holds_session() {
                return Err(IcpError::invalid_state("an interview is already in progress"));
            }
            if !inner.quota.has_remaining() {
                return Err(Guidance::QuotaExhausted.into());
            }
            if !has_profile {
                return Err(Guidance::UploadResume {
                    redirect: DASHBOARD_REDIRECT.to_string(),
                }
                .into());
            }
            inner.starting = true;
            inner.result = None;
            self.set_phase(&mut inner, SessionPhase::Starting);
        }

        let questions_limit = questions_limit.max(1);
        let profile = profile.unwrap_or_default();
        let request = StartRequest {
            difficulty,
            questions_limit,
            job_title: profile.job_title,
            resume_feedback: profile.resume_feedback,
        };
        tracing::info!(
            "[Interview] Starting {} interview ({} questions)",
            difficulty,
            questions_limit
        );
        let started = self.backend.start_session(&request).await;

        let mut inner = self.inner.lock().await;
        inner.starting = false;
        let started = match started {
            Ok(started) => started,
            Err(e) => {
                if inner.phase == SessionPhase::Starting {
                    self.set_phase(&mut inner, SessionPhase::Idle);
                }
                drop(inner);
                tracing::warn!("[Interview] Failed to start session: {}", e);
                if !e.is_unauthorized() {
                    self.notify(Notice::error("Error", "Failed to start interview session."));
                }
                self.handle_remote_error(&e).await;
                return Err(e);
            }
        };
        if inner.phase != SessionPhase::Starting {
            return Err(IcpError::invalid_state("start was interrupted"));
        }

        let limit = started.questions_limit.unwrap_or(questions_limit);
        let session = InterviewSession::started(
            started.session_id.clone(),
            difficulty,
            limit,
            started.asked_count.unwrap_or(1),
            started.message.clone(),
        );
        let remaining = self.settings.interview_budget_secs(limit);
        inner.guard.reset();
        inner.draft.clear();
        self.activate(&mut inner, session, remaining);
        self.speak(&inner, &started.message);
        drop(inner);

        let session_id = started.session_id;
        self.update_state(move |state| {
            state.session_id = Some(session_id);
            state.remaining_time_secs = Some(remaining);
            state.invalid_attempts = 0;
        })
        .await;
        self.acquire_camera().await;
        Ok(())
    }

    /// Submits whatever is in the draft buffer.
    pub async fn submit_draft(&self) -> Result<SubmitOutcome> {
        let draft = self.inner.lock().await.draft.clone();
        self.submit_answer(&draft).await
    }

    /// Sends an answer, or rejects it locally when it looks like gibberish.
    pub async fn submit_answer(&self, text: &str) -> Result<SubmitOutcome> {
        let answer = text.trim().to_string();

        let (session_id, had_strikes) = {
            let mut inner = self.inner.lock().await;
            if !inner.phase.is_active() {
                return Err(IcpError::invalid_state("no active interview"));
            }
            if inner.submitting || inner.ending {
                return Err(IcpError::Busy("submit"));
            }
            if answer.is_empty() {
                return Err(Guidance::EmptyAnswer.into());
            }
            self.stop_capture(&mut inner);
            inner.touch();
            inner.draft.clear();
            self.emit(ControllerEvent::DraftChanged {
                draft: String::new(),
            });
            self.push_turn(&mut inner, Turn::user(answer.clone()));

            if is_invalid(&answer) {
                let attempts = inner.guard.increment();
                let threshold = inner.guard.threshold();
                tracing::info!("[Interview] Invalid answer {}/{}", attempts, threshold);
                if inner.guard.is_exhausted() {
                    drop(inner);
                    self.force_end_invalid().await;
                    return Ok(SubmitOutcome::ForcedEnd);
                }
                self.push_turn(&mut inner, Turn::ai(INVALID_REPROMPT));
                self.speak(&inner, INVALID_REPROMPT);
                drop(inner);
                if let Err(e) = self.state_repo.set_invalid_attempts(attempts).await {
                    tracing::warn!("[Interview] Failed to persist invalid attempts: {}", e);
                }
                return Ok(SubmitOutcome::Rejected {
                    attempts,
                    threshold,
                });
            }

            // A valid answer clears the strikes whether or not the send succeeds.
            let had_strikes = inner.guard.attempts() > 0;
            inner.guard.reset();
            inner.submitting = true;
            (inner.session_id(), had_strikes)
        };
        let Some(session_id) = session_id else {
            return Err(IcpError::internal("active phase without a session"));
        };
        if had_strikes {
            if let Err(e) = self.state_repo.set_invalid_attempts(0).await {
                tracing::warn!("[Interview] Failed to persist invalid attempts: {}", e);
            }
        }

        let outcome = self.backend.reply(&session_id, &answer).await;

        let mut inner = self.inner.lock().await;
        inner.submitting = false;
        if inner.session_id().as_deref() != Some(session_id.as_str()) {
            return Err(IcpError::invalid_state(
                "the interview ended while waiting for a reply",
            ));
        }

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                if let Some(session) = inner.session.as_mut() {
                    if session.pop_user_turn().is_some() {
                        self.emit(ControllerEvent::TurnRetracted);
                    }
                }
                inner.draft = answer;
                self.emit(ControllerEvent::DraftChanged {
                    draft: inner.draft.clone(),
                });
                drop(inner);
                tracing::warn!("[Interview] Reply failed: {}", e);
                if !e.is_unauthorized() {
                    self.notify(Notice::error("Error", "Failed to send answer. Please try again."));
                }
                self.handle_remote_error(&e).await;
                return Err(e);
            }
        };

        if let (Some(session), Some(count)) = (inner.session.as_mut(), outcome.asked_count()) {
            session.record_asked_count(count);
        }

        match outcome {
            ReplyOutcome::Continue { message, .. } => {
                self.push_turn(&mut inner, Turn::ai(message.clone()));
                self.speak(&inner, &message);
                Ok(SubmitOutcome::Continued)
            }
            ReplyOutcome::Ended {
                message,
                readiness_score,
                ..
            } => {
                let mut summary = extract_readiness(&message);
                if readiness_score.is_some() {
                    summary.score = readiness_score;
                }
                // Keep a concurrent timer expiry from ending the session twice.
                inner.ending = true;
                self.stop_session_run(&mut inner);
                self.push_turn(&mut inner, Turn::ai(message));
                self.speak(&inner, &summary.feedback);
                drop(inner);

                tracing::info!(
                    "[Interview] Interview completed, readiness score {:?}",
                    summary.score
                );
                self.finish(EndKind::Normal, &summary).await;
                Ok(SubmitOutcome::Finished(summary))
            }
        }
    }

    /// Ends the session early.
    ///
    /// User requests are confirmed first; a declined confirmation changes
    /// nothing. The end call is best effort and cleanup always happens.
    pub async fn end_interview(&self, reason: EndReason) -> Result<EndOutcome> {
        {
            let inner = self.inner.lock().await;
            if !inner.phase.holds_session() {
                return Err(IcpError::invalid_state("no interview in progress"));
            }
            if inner.ending {
                return Err(IcpError::Busy("end"));
            }
        }

        if reason.requires_confirmation()
            && self.prompt.confirm(&ConfirmPrompt::end_interview()).await == PromptAnswer::Declined
        {
            tracing::debug!("[Interview] End request declined");
            return Ok(EndOutcome::Cancelled);
        }

        let session_id = {
            let mut inner = self.inner.lock().await;
            if !inner.phase.holds_session() {
                return Err(IcpError::invalid_state("no interview in progress"));
            }
            if inner.ending {
                return Err(IcpError::Busy("end"));
            }
            inner.ending = true;
            self.stop_session_run(&mut inner);
            inner.session_id()
        };

        tracing::info!("[Interview] Ending interview: {}", reason);
        let mut unauthorized = false;
        let feedback = match session_id {
            Some(id) => match self.backend.end_session(&id).await {
                Ok(Some(message)) => message,
                Ok(None) => END_DEFAULT_FEEDBACK.to_string(),
                Err(e) => {
                    tracing::warn!("[Interview] End call failed: {}", e);
                    unauthorized = e.is_unauthorized();
                    END_FAILED_FEEDBACK.to_string()
                }
            },
            None => END_FAILED_FEEDBACK.to_string(),
        };

        let summary = ReadinessSummary {
            score: None,
            feedback,
        };
        {
            let mut inner = self.inner.lock().await;
            self.push_turn(&mut inner, Turn::ai(summary.feedback.clone()));
            self.speak(&inner, &summary.feedback);
        }
        self.finish(EndKind::for_reason(reason), &summary).await;

        if unauthorized {
            self.force_logout().await;
        }
        Ok(EndOutcome::Ended(summary))
    }

    /// Suspends the session without telling the backend.
    ///
    /// Timers stop and the camera is released; the session id stays
    /// persisted so the interview can be resumed later.
    pub async fn pause(&self, reason: PauseReason) -> Result<()> {
        let remaining = {
            let mut inner = self.inner.lock().await;
            if !inner.phase.is_active() {
                return Err(IcpError::invalid_state("only an active interview can be paused"));
            }
            let remaining = self.stop_session_run(&mut inner);
            self.release_camera(&mut inner);
            self.stop_capture(&mut inner);
            self.cancel_speech();
            self.set_phase(&mut inner, SessionPhase::Paused(reason));
            remaining
        };
        tracing::info!("[Interview] {}", reason);

        if let Some(secs) = remaining {
            self.persist_remaining(secs).await;
        }
        let title = match reason {
            PauseReason::Inactivity => "Paused Due to Inactivity",
            PauseReason::PresenceLost => "Paused: Face Not Detected",
        };
        self.notify(Notice::warning(title, PAUSE_HINT));
        Ok(())
    }

    /// Re-attaches to a session left behind by an earlier run.
    ///
    /// Returns `Ok(true)` when a session is live again. Sessions the server
    /// reports as ended, and sessions that cannot be fetched, are forgotten
    /// locally.
    pub async fn restore_if_any(&self) -> Result<bool> {
        let state = self.state_repo.get_state().await?;
        let Some(session_id) = state.session_id.clone() else {
            return Ok(false);
        };
        if !self.auth.is_authenticated() {
            return Ok(false);
        }
        {
            let inner = self.inner.lock().await;
            if inner.starting || inner.phase.is_active() {
                return Err(IcpError::Busy("restore"));
            }
        }

        let remote = match self.backend.fetch_session(&session_id).await {
            Ok(remote) if remote.is_ended() => {
                tracing::info!("[Interview] Cached session {} already ended", session_id);
                self.discard_cached_session().await;
                return Ok(false);
            }
            Ok(remote) => remote,
            Err(e) => {
                tracing::warn!("[Interview] Could not restore session {}: {}", session_id, e);
                self.discard_cached_session().await;
                self.handle_remote_error(&e).await;
                return Ok(false);
            }
        };

        // A spent budget stays spent: zero expires on the first tick.
        let remaining = state
            .remaining_time_secs
            .unwrap_or_else(|| self.settings.interview_budget_secs(remote.questions_limit));

        let mut inner = self.inner.lock().await;
        if inner.starting || inner.phase.is_active() {
            return Err(IcpError::Busy("restore"));
        }
        let difficulty = remote
            .difficulty
            .or(inner.session.as_ref().map(|s| s.difficulty))
            .unwrap_or_default();
        let session = InterviewSession {
            session_id: remote.session_id,
            asked_count: remote.asked_count,
            questions_limit: remote.questions_limit,
            difficulty,
            transcript: remote.transcript,
            ended_at: None,
            readiness_score: None,
        };
        tracing::info!(
            "[Interview] Restored session {} ({}/{} asked, {}s left)",
            session.session_id,
            session.asked_count,
            session.questions_limit,
            remaining
        );
        inner.guard =
            InvalidAnswerGuard::with_attempts(self.settings.invalid_threshold, state.invalid_attempts);
        inner.result = None;
        inner.ending = false;
        self.activate(&mut inner, session, remaining);
        drop(inner);

        self.persist_remaining(remaining).await;
        self.acquire_camera().await;
        Ok(true)
    }

    /// Continues a paused session.
    pub async fn resume(&self) -> Result<bool> {
        if !matches!(self.phase().await, SessionPhase::Paused(_)) {
            return Err(IcpError::invalid_state("no paused interview"));
        }
        let resumed = self.restore_if_any().await?;
        if resumed {
            self.notify(Notice::info("Interview Resumed", "Welcome back."));
        }
        Ok(resumed)
    }

    /// Signs out: local teardown without a backend call, then wipes the
    /// persisted state.
    pub async fn logout(&self) -> Result<()> {
        self.reset_local().await;
        self.auth.clear_token().await
    }

    // ========================================================================
    // User input and preferences
    // ========================================================================

    pub async fn set_draft(&self, text: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.draft = text.into();
        inner.touch();
        self.emit(ControllerEvent::DraftChanged {
            draft: inner.draft.clone(),
        });
    }

    /// A click or keypress; resets the inactivity window.
    pub async fn note_interaction(&self) {
        self.inner.lock().await.touch();
    }

    /// Starts or stops speech capture. Returns whether capture is now on.
    pub async fn toggle_mic(&self) -> Result<bool> {
        let Some(recognizer) = self.capabilities.recognizer.get().cloned() else {
            let reason = self
                .capabilities
                .recognizer
                .reason()
                .unwrap_or("unavailable")
                .to_string();
            self.notify(Notice::warning(
                "Speech Recognition Unavailable",
                "Your device does not support speech input. Please type your answer.",
            ));
            return Err(IcpError::device(reason));
        };

        let persisted = {
            let mut inner = self.inner.lock().await;
            inner.touch();
            if inner.capture.is_recording() {
                self.stop_capture(&mut inner);
                return Ok(false);
            }
            if !inner.phase.is_active() {
                return Err(IcpError::invalid_state("no active interview"));
            }
            if !inner.prefs.mic_enabled {
                return Err(IcpError::device("microphone is disabled"));
            }
            inner.prefs.mic_device_id.clone()
        };

        let devices = match recognizer.microphones().await {
            Ok(devices) => devices,
            Err(e) => {
                tracing::warn!("[Speech] Could not enumerate microphones: {}", e);
                Vec::new()
            }
        };
        let device_id = microphone_candidates(&devices, persisted.as_deref())
            .first()
            .map(|d| d.id.clone());

        let (sink, events) = mpsc::unbounded_channel();
        if let Err(e) = recognizer.start(device_id.as_deref(), &self.settings.language, sink.clone()) {
            tracing::warn!("[Speech] Recognizer failed to start: {}", e);
            self.notify(Notice::error(
                "Speech Recognition Error",
                "Could not start the microphone.",
            ));
            return Err(e);
        }

        {
            let mut inner = self.inner.lock().await;
            if !inner.phase.is_active() {
                recognizer.stop();
                return Err(IcpError::invalid_state("no active interview"));
            }
            if let Some(old) = inner.capture_cancel.take() {
                old.cancel();
            }
            let cancel = CancellationToken::new();
            inner.capture.set_recording(true);
            inner.capture_cancel = Some(cancel.clone());
            inner.prefs.mic_device_id = device_id.clone();
            self.emit(ControllerEvent::Recording { recording: true });
            spawn_capture_pump(
                self.weak_self.clone(),
                recognizer,
                CapturePump {
                    events,
                    sink,
                    device_id: device_id.clone(),
                    language: self.settings.language.clone(),
                },
                cancel,
            );
        }

        if device_id.is_some() && device_id != persisted {
            self.update_state(move |state| state.mic_device_id = device_id)
                .await;
        }
        Ok(true)
    }

    pub async fn set_camera_enabled(&self, enabled: bool) {
        let acquire = {
            let mut inner = self.inner.lock().await;
            inner.prefs.camera_enabled = enabled;
            if !enabled {
                self.release_camera(&mut inner);
            }
            enabled && inner.phase.is_active()
        };
        self.update_state(move |state| state.camera_enabled = enabled)
            .await;
        if acquire {
            self.acquire_camera().await;
        }
    }

    pub async fn set_speaker_enabled(&self, enabled: bool) {
        self.inner.lock().await.prefs.speaker_enabled = enabled;
        if !enabled {
            self.cancel_speech();
        }
        self.update_state(move |state| state.speaker_enabled = enabled)
            .await;
    }

    pub async fn set_mic_enabled(&self, enabled: bool) {
        {
            let mut inner = self.inner.lock().await;
            inner.prefs.mic_enabled = enabled;
            if !enabled {
                self.stop_capture(&mut inner);
            }
        }
        self.update_state(move |state| state.mic_enabled = enabled)
            .await;
    }

    pub async fn set_voice_gender(&self, gender: VoiceGender) {
        self.inner.lock().await.prefs.voice_gender = gender;
        self.update_state(move |state| state.voice_gender = gender)
            .await;
    }

    /// Switches the camera. An open stream on another device is reopened.
    pub async fn select_camera(&self, device_id: impl Into<String>) {
        let device_id = device_id.into();
        let reopen = {
            let mut inner = self.inner.lock().await;
            inner.prefs.camera_device_id = Some(device_id.clone());
            let switching = inner
                .camera
                .as_ref()
                .is_some_and(|stream| stream.device_id() != device_id);
            if switching {
                self.release_camera(&mut inner);
            }
            switching
        };
        self.update_state(move |state| state.camera_device_id = Some(device_id))
            .await;
        if reopen {
            self.acquire_camera().await;
        }
    }

    /// Switches the microphone. A running capture restarts on the new device.
    pub async fn select_microphone(&self, device_id: impl Into<String>) -> Result<()> {
        let device_id = device_id.into();
        let restart = {
            let mut inner = self.inner.lock().await;
            inner.prefs.mic_device_id = Some(device_id.clone());
            let recording = inner.capture.is_recording();
            if recording {
                self.stop_capture(&mut inner);
            }
            recording
        };
        self.update_state(move |state| state.mic_device_id = Some(device_id))
            .await;
        if restart {
            self.toggle_mic().await?;
        }
        Ok(())
    }

    // ========================================================================
    // Internals: session transitions
    // ========================================================================

    /// Installs `session` as the live session and starts its timers.
    fn activate(&self, inner: &mut Inner, session: InterviewSession, remaining: u64) {
        self.stop_session_run(inner);
        let epoch = inner.epoch;
        let cancel = CancellationToken::new();
        inner.run = Some(SessionRun {
            cancel: cancel.clone(),
            countdown: InterviewCountdown::new(remaining),
            watchdog: InactivityWatchdog::new(
                Duration::from_secs(self.settings.inactivity_timeout_secs),
                Instant::now(),
            ),
        });
        inner.confirm_open = false;
        inner.presence.reset();
        self.emit(ControllerEvent::TranscriptReplaced {
            turns: session.transcript.clone(),
        });
        inner.session = Some(session);
        self.set_phase(inner, SessionPhase::Active);
        self.emit(ControllerEvent::InterviewClock {
            remaining_secs: remaining,
        });
        spawn_session_ticker(self.weak_self.clone(), epoch, cancel);
    }

    /// Stops the timers of the current run. Returns the seconds left.
    fn stop_session_run(&self, inner: &mut Inner) -> Option<u64> {
        inner.epoch += 1;
        let run = inner.run.take()?;
        run.cancel.cancel();
        Some(run.countdown.remaining())
    }

    /// Terminal cleanup shared by every end path.
    async fn finish(&self, kind: EndKind, summary: &ReadinessSummary) {
        {
            let mut inner = self.inner.lock().await;
            self.stop_session_run(&mut inner);
            self.release_camera(&mut inner);
            self.stop_capture(&mut inner);
            inner.ending = false;
            inner.submitting = false;
            inner.confirm_open = false;
            inner.quota.consume();
            inner.guard.reset();
            inner.draft.clear();

            let transcript = inner
                .session
                .take()
                .map(|mut session| {
                    session.ended_at = Some(Utc::now());
                    session.readiness_score = summary.score;
                    session.transcript
                })
                .unwrap_or_default();
            inner.result = Some(SessionResult {
                end_kind: kind,
                readiness_score: summary.score,
                feedback: summary.feedback.clone(),
                transcript,
            });
            self.set_phase(&mut inner, SessionPhase::Ended(kind));
            self.emit(ControllerEvent::QuotaChanged { quota: inner.quota });
            self.emit(ControllerEvent::Finished {
                readiness_score: summary.score,
                feedback: summary.feedback.clone(),
            });
        }

        if let Err(e) = self.state_repo.clear_session().await {
            tracing::warn!("[Interview] Failed to clear cached session: {}", e);
        }
    }

    async fn force_end_invalid(&self) {
        let session_id = {
            let mut inner = self.inner.lock().await;
            inner.ending = true;
            self.stop_session_run(&mut inner);
            self.push_turn(&mut inner, Turn::ai(INVALID_END_TURN));
            self.speak(&inner, INVALID_END_TURN);
            inner.session_id()
        };
        tracing::info!("[Interview] Ending session after repeated invalid responses");

        if let Some(id) = session_id {
            if let Err(e) = self.backend.end_session(&id).await {
                tracing::warn!("[Interview] End call failed: {}", e);
            }
        }

        let summary = ReadinessSummary {
            score: None,
            feedback: INVALID_END_FEEDBACK.to_string(),
        };
        self.finish(EndKind::Forced(EndReason::InvalidAnswers), &summary)
            .await;
        self.notify(Notice::warning("Session Ended", INVALID_END_FEEDBACK));
    }

    /// Forgets a cached session that cannot be continued.
    async fn discard_cached_session(&self) {
        {
            let mut inner = self.inner.lock().await;
            self.stop_session_run(&mut inner);
            self.release_camera(&mut inner);
            self.stop_capture(&mut inner);
            inner.session = None;
            if inner.phase.holds_session() {
                self.set_phase(&mut inner, SessionPhase::Idle);
            }
        }
        if let Err(e) = self.state_repo.clear_session().await {
            tracing::warn!("[Interview] Failed to clear cached session: {}", e);
        }
    }

    /// Drops everything held in memory. Nothing is sent to the backend.
    async fn reset_local(&self) {
        let mut inner = self.inner.lock().await;
        self.stop_session_run(&mut inner);
        self.release_camera(&mut inner);
        self.stop_capture(&mut inner);
        self.cancel_speech();
        if let Some(cancel) = inner.auth_cancel.take() {
            cancel.cancel();
        }
        inner.session = None;
        inner.draft.clear();
        inner.starting = false;
        inner.submitting = false;
        inner.ending = false;
        inner.confirm_open = false;
        inner.result = None;
        inner.quota = AttemptQuota::default();
        inner.guard.reset();
        self.set_phase(&mut inner, SessionPhase::Idle);
        tracing::debug!("[Interview] Local state reset");
    }

    async fn handle_remote_error(&self, error: &IcpError) {
        if error.is_unauthorized() {
            self.force_logout().await;
        }
    }

    async fn force_logout(&self) {
        tracing::info!("[Interview] Token rejected, signing out");
        self.notify(Notice::warning(
            "Session Expired",
            "Please sign in again to continue.",
        ));
        if let Err(e) = self.logout().await {
            tracing::warn!("[Interview] Logout failed: {}", e);
        }
    }

    // ========================================================================
    // Internals: timers and prompts
    // ========================================================================

    /// Handles one interview-clock tick. Returns false when the ticker
    /// should stop.
    async fn on_session_tick(&self, epoch: u64) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch || !inner.phase.is_active() {
            return false;
        }
        let confirm_open = inner.confirm_open;
        let Some(run) = inner.run.as_mut() else {
            return false;
        };
        let tick = run.countdown.tick();
        let idle = !confirm_open && run.watchdog.check(Instant::now());

        match tick {
            Some(CountdownTick::Running(secs)) => {
                self.emit(ControllerEvent::InterviewClock {
                    remaining_secs: secs,
                });
                if idle {
                    inner.confirm_open = true;
                    tracing::info!("[Interview] No activity, asking whether the user is still there");
                    self.spawn_confirmation(epoch, PromptKind::Inactivity);
                }
                drop(inner);
                self.persist_remaining(secs).await;
                true
            }
            Some(CountdownTick::Expired) => {
                run.cancel.cancel();
                self.emit(ControllerEvent::InterviewClock { remaining_secs: 0 });
                drop(inner);
                tracing::info!("[Interview] Time limit reached");
                self.persist_remaining(0).await;
                if let Err(e) = self.end_interview(EndReason::TimeLimit).await {
                    tracing::warn!("[Interview] Could not end timed-out interview: {}", e);
                }
                false
            }
            None => false,
        }
    }

    fn spawn_confirmation(&self, epoch: u64, kind: PromptKind) {
        let controller = self.weak_self.clone();
        tokio::spawn(async move {
            if let Some(controller) = controller.upgrade() {
                controller.run_confirmation(epoch, kind).await;
            }
        });
    }

    /// Asks the still-there question. No answer within the confirm timeout
    /// counts as a decline.
    async fn run_confirmation(&self, epoch: u64, kind: PromptKind) {
        let (prompt, reason) = match kind {
            PromptKind::Inactivity => (ConfirmPrompt::inactivity(), PauseReason::Inactivity),
            PromptKind::Presence => (ConfirmPrompt::presence(), PauseReason::PresenceLost),
            PromptKind::EndInterview => return,
        };

        let answer = match tokio::time::timeout(
            self.settings.confirm_timeout(),
            self.prompt.confirm(&prompt),
        )
        .await
        {
            Ok(answer) => answer,
            Err(_) => {
                tracing::info!("[Interview] Confirmation timed out");
                PromptAnswer::Declined
            }
        };

        let mut inner = self.inner.lock().await;
        inner.confirm_open = false;
        if inner.epoch != epoch || !inner.phase.is_active() {
            tracing::debug!("[Interview] Ignoring stale {:?} confirmation", kind);
            return;
        }
        match answer {
            PromptAnswer::Confirmed => {
                if let Some(run) = inner.run.as_mut() {
                    run.watchdog.resolve(Instant::now());
                }
            }
            PromptAnswer::Declined => {
                drop(inner);
                if let Err(e) = self.pause(reason).await {
                    tracing::warn!("[Interview] Could not pause: {}", e);
                }
            }
        }
    }

    async fn start_auth_clock(&self) {
        let Some(remaining) = self.auth.remaining_secs() else {
            return;
        };
        let cancel = CancellationToken::new();
        if let Some(old) = self.inner.lock().await.auth_cancel.replace(cancel.clone()) {
            old.cancel();
        }
        tracing::debug!("[Auth] Token expires in {}s", remaining);
        spawn_auth_clock(self.weak_self.clone(), remaining, cancel);
    }

    fn spawn_auth_listener(&self) {
        let mut events = self.auth.subscribe();
        let controller = self.weak_self.clone();
        tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                match event {
                    AuthEvent::SignedOut => controller.reset_local().await,
                    AuthEvent::SignedIn { .. } => {
                        controller.start_auth_clock().await;
                        if let Err(e) = controller.refresh_quota().await {
                            tracing::warn!("[Interview] Could not fetch attempt quota: {}", e);
                        }
                    }
                }
            }
        });
    }

    // ========================================================================
    // Internals: camera and presence
    // ========================================================================

    async fn acquire_camera(&self) {
        let Some((source, detector)) = self.capabilities.presence() else {
            tracing::debug!("[Presence] Camera capability unavailable");
            return;
        };
        let persisted = {
            let inner = self.inner.lock().await;
            if !inner.prefs.camera_enabled || inner.camera.is_some() || !inner.phase.is_active() {
                return;
            }
            inner.prefs.camera_device_id.clone()
        };

        let stream: Arc<dyn VideoStream> =
            match acquire_camera(source.as_ref(), persisted.as_deref()).await {
                Ok(stream) => Arc::from(stream),
                Err(e) => {
                    tracing::warn!("[Presence] {}", e);
                    self.inner.lock().await.prefs.camera_enabled = false;
                    self.notify(Notice::warning(
                        "Camera Unavailable",
                        "No camera could be opened. Presence checks are off for this session.",
                    ));
                    return;
                }
            };
        let device_id = stream.device_id().to_string();

        {
            let mut inner = self.inner.lock().await;
            if !inner.phase.is_active() || inner.camera.is_some() {
                stream.stop();
                return;
            }
            inner.camera_generation += 1;
            let cancel = CancellationToken::new();
            inner.camera = Some(stream.clone());
            inner.camera_cancel = Some(cancel.clone());
            inner.presence.reset();
            inner.prefs.camera_device_id = Some(device_id.clone());
            spawn_presence_loop(
                self.weak_self.clone(),
                inner.camera_generation,
                stream,
                detector,
                self.settings.presence_poll_interval(),
                cancel,
            );
        }

        if persisted.as_deref() != Some(device_id.as_str()) {
            self.update_state(move |state| state.camera_device_id = Some(device_id))
                .await;
        }
    }

    fn release_camera(&self, inner: &mut Inner) {
        if let Some(cancel) = inner.camera_cancel.take() {
            cancel.cancel();
        }
        inner.camera_generation += 1;
        if let Some(stream) = inner.camera.take() {
            stream.stop();
            tracing::debug!("[Presence] Released camera {}", stream.device_id());
        }
        if inner.presence.face_detected() {
            self.emit(ControllerEvent::Presence {
                face_detected: false,
            });
        }
        inner.presence.reset();
    }

    /// Feeds one detector result. Returns false when the loop should stop.
    async fn on_presence_sample(&self, generation: u64, face: bool) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.camera_generation != generation {
            return false;
        }
        let was_detected = inner.presence.face_detected();
        let active = inner.phase.is_active();
        let signal = inner.presence.observe(face, Instant::now(), active);
        if was_detected != face {
            self.emit(ControllerEvent::Presence {
                face_detected: face,
            });
        }
        if signal == PresenceSignal::ConfirmationNeeded && active && !inner.confirm_open {
            inner.confirm_open = true;
            tracing::info!("[Presence] Face missing, asking the user to confirm");
            self.spawn_confirmation(inner.epoch, PromptKind::Presence);
        }
        true
    }

    // ========================================================================
    // Internals: speech
    // ========================================================================

    async fn resolve_voices(&self, state: &ClientState) {
        let Some(synthesizer) = self.capabilities.synthesizer.get() else {
            return;
        };
        let voices = synthesizer.voices().await;
        let choice = VoiceChoice::resolve(
            &voices,
            state.female_voice_id.as_deref(),
            state.male_voice_id.as_deref(),
            self.settings.language_prefix(),
        );
        tracing::debug!(
            "[Speech] {} voices, female={:?} male={:?}",
            voices.len(),
            choice.female,
            choice.male
        );

        for gender in [VoiceGender::Female, VoiceGender::Male] {
            let Some(id) = choice.get(gender) else {
                continue;
            };
            if state.voice_id(gender) != Some(id) {
                if let Err(e) = self.state_repo.set_voice_id(gender, id.to_string()).await {
                    tracing::warn!("[Speech] Failed to persist voice choice: {}", e);
                }
            }
        }

        let mut inner = self.inner.lock().await;
        inner.voices = voices;
        inner.voice_choice = choice;
    }

    /// Speaks `text`, cutting off whatever is playing.
    fn speak(&self, inner: &Inner, text: &str) {
        if !inner.prefs.speaker_enabled {
            return;
        }
        let Some(synthesizer) = self.capabilities.synthesizer.get() else {
            return;
        };
        synthesizer.cancel();

        let gender = inner.prefs.voice_gender;
        let utterance = Utterance::build(
            text,
            &self.settings.language,
            &inner.voices,
            gender,
            inner.voice_choice.get(gender),
        );

        let generation = self.speech_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.speaking.store(true, Ordering::SeqCst);
        self.emit(ControllerEvent::Speaking { speaking: true });

        let speaking = self.speaking.clone();
        let current = self.speech_generation.clone();
        let events = self.events.clone();
        synthesizer.speak(
            utterance,
            Box::new(move || {
                // A newer utterance owns the flag.
                if current.load(Ordering::SeqCst) == generation {
                    speaking.store(false, Ordering::SeqCst);
                    let _ = events.send(ControllerEvent::Speaking { speaking: false });
                }
            }),
        );
    }

    fn cancel_speech(&self) {
        if let Some(synthesizer) = self.capabilities.synthesizer.get() {
            self.speech_generation.fetch_add(1, Ordering::SeqCst);
            synthesizer.cancel();
            if self.speaking.swap(false, Ordering::SeqCst) {
                self.emit(ControllerEvent::Speaking { speaking: false });
            }
        }
    }

    fn stop_capture(&self, inner: &mut Inner) {
        if let Some(cancel) = inner.capture_cancel.take() {
            cancel.cancel();
        }
        if inner.capture.is_recording() {
            inner.capture.set_recording(false);
            if let Some(recognizer) = self.capabilities.recognizer.get() {
                recognizer.stop();
            }
            self.emit(ControllerEvent::Recording { recording: false });
        }
    }

    async fn on_recognition_event(&self, event: RecognitionEvent) -> CaptureAction {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        let action = inner.capture.handle(event, &mut inner.draft);
        match &action {
            CaptureAction::DraftUpdated => {
                inner.touch();
                self.emit(ControllerEvent::DraftChanged {
                    draft: inner.draft.clone(),
                });
            }
            CaptureAction::Failed(_) => {
                inner.capture_cancel = None;
                self.emit(ControllerEvent::Recording { recording: false });
            }
            CaptureAction::Restart | CaptureAction::Nothing => {}
        }
        action
    }

    async fn capture_failed(&self, message: &str) {
        tracing::warn!("[Speech] Capture stopped: {}", message);
        let engine_stopped = {
            let mut inner = self.inner.lock().await;
            let recording = inner.capture.is_recording();
            self.stop_capture(&mut inner);
            recording
        };
        // An error event clears the recording flag before we get here, which
        // leaves `stop_capture` with nothing to stop.
        if !engine_stopped {
            if let Some(recognizer) = self.capabilities.recognizer.get() {
                recognizer.stop();
            }
        }
        self.notify(Notice::error(
            "Speech Recognition Error",
            format!("Microphone capture stopped: {}", message),
        ));
    }

    // ========================================================================
    // Internals: helpers
    // ========================================================================

    fn emit(&self, event: ControllerEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn notify(&self, notice: Notice) {
        self.prompt.notify(&notice);
        self.emit(ControllerEvent::Notice { notice });
    }

    fn set_phase(&self, inner: &mut Inner, phase: SessionPhase) {
        if inner.phase != phase {
            tracing::debug!("[Interview] {:?} -> {:?}", inner.phase, phase);
            inner.phase = phase;
            self.emit(ControllerEvent::PhaseChanged { phase });
        }
    }

    fn push_turn(&self, inner: &mut Inner, turn: Turn) {
        if let Some(session) = inner.session.as_mut() {
            session.push(turn.clone());
            self.emit(ControllerEvent::TurnAppended { turn });
        }
    }

    /// Stores the countdown for the cached session. Nothing is written once
    /// the session has been cleared, so a late tick cannot bring it back.
    async fn persist_remaining(&self, secs: u64) {
        let result = self
            .state_repo
            .update(Box::new(move |state: &mut ClientState| {
                if state.session_id.is_some() {
                    state.remaining_time_secs = Some(secs);
                }
            }))
            .await;
        if let Err(e) = result {
            tracing::warn!("[Interview] Failed to persist remaining time: {}", e);
        }
    }

    /// Atomic update of the client state. Storage failures are logged.
    async fn update_state<F>(&self, apply: F)
    where
        F: FnOnce(&mut ClientState) + Send + 'static,
    {
        if let Err(e) = self.state_repo.update(Box::new(apply)).await {
            tracing::warn!("[Interview] Failed to persist client state: {}", e);
        }
    }
}

// ============================================================================
// Background tasks
//
// Spawned from plain functions so the task futures do not depend on the
// futures of the controller methods that start them.
// ============================================================================

fn delayed_interval(period: Duration) -> tokio::time::Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

fn spawn_session_ticker(
    controller: Weak<InterviewController>,
    epoch: u64,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        let mut ticker = delayed_interval(TICK);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let Some(controller) = controller.upgrade() else {
                break;
            };
            if !controller.on_session_tick(epoch).await {
                break;
            }
        }
        tracing::debug!("[Interview] Session ticker {} stopped", epoch);
    });
}

fn spawn_auth_clock(controller: Weak<InterviewController>, remaining: u64, cancel: CancellationToken) {
    tokio::spawn(async move {
        let mut countdown = InterviewCountdown::new(remaining);
        let mut ticker = delayed_interval(TICK);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let Some(controller) = controller.upgrade() else {
                break;
            };
            match countdown.tick() {
                Some(CountdownTick::Running(secs)) => {
                    controller.emit(ControllerEvent::AuthClock {
                        remaining_secs: secs,
                    });
                }
                Some(CountdownTick::Expired) => {
                    controller.emit(ControllerEvent::AuthClock { remaining_secs: 0 });
                    tracing::info!("[Auth] Token expired");
                    controller.notify(Notice::warning(
                        "Session Expired",
                        "Your sign-in has expired. Please sign in again.",
                    ));
                    if let Err(e) = controller.logout().await {
                        tracing::warn!("[Auth] Logout failed: {}", e);
                    }
                    break;
                }
                None => break,
            }
        }
    });
}

fn spawn_presence_loop(
    controller: Weak<InterviewController>,
    generation: u64,
    stream: Arc<dyn VideoStream>,
    detector: Arc<dyn FaceDetector>,
    period: Duration,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        let mut ticker = delayed_interval(period);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let face = match detector.detect_face(stream.as_ref()).await {
                Ok(face) => face,
                Err(e) => {
                    tracing::debug!("[Presence] Detection failed: {}", e);
                    continue;
                }
            };
            let Some(controller) = controller.upgrade() else {
                break;
            };
            if !controller.on_presence_sample(generation, face).await {
                break;
            }
        }
    });
}

struct CapturePump {
    events: mpsc::UnboundedReceiver<RecognitionEvent>,
    sink: mpsc::UnboundedSender<RecognitionEvent>,
    device_id: Option<String>,
    language: String,
}

fn spawn_capture_pump(
    controller: Weak<InterviewController>,
    recognizer: Arc<dyn SpeechRecognizer>,
    mut pump: CapturePump,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                event = pump.events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };
            let Some(controller) = controller.upgrade() else {
                break;
            };
            match controller.on_recognition_event(event).await {
                CaptureAction::Restart => {
                    tracing::debug!("[Speech] Recognizer ended, restarting");
                    if let Err(e) = recognizer.start(
                        pump.device_id.as_deref(),
                        &pump.language,
                        pump.sink.clone(),
                    ) {
                        controller.capture_failed(&e.to_string()).await;
                        break;
                    }
                }
                CaptureAction::Failed(message) => {
                    controller.capture_failed(&message).await;
                    break;
                }
                CaptureAction::DraftUpdated | CaptureAction::Nothing => {}
            }
        }
    });
}
