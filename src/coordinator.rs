//! Voice interaction coordinator — arbitrates speech capture and playback.
//!
//! The coordinator owns a three-state machine and enforces mutual exclusion
//! between the microphone and the speaker:
//!
//! ```text
//!            start_listening          speak
//!   Idle ───────────────────▶ Listening        Idle ──────▶ Speaking
//!    ▲                           │                ▲             │
//!    └───────────────────────────┘                └─────────────┘
//!      transcript / error / stop                 end / error / stop
//! ```
//!
//! Transition rules:
//! - `start_listening` while **Speaking** cancels the playback first —
//!   speech yields to the microphone, never the reverse.
//! - `speak` while **Listening** is rejected outright; the capture is
//!   unaffected.
//! - `start_listening` while **Listening** is a toggle-stop: it behaves as
//!   `stop_listening` instead of opening a second capture.
//!
//! At most one capture *or* playback session exists at any instant, and
//! every accepted request eventually returns the mode to `Idle`. Failures
//! are routine: they resolve to the immediate caller and leave the
//! coordinator usable. No retries happen at this layer; a caller that wants
//! a listening deadline runs its own timer and calls `stop_listening`.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::CoordinatorConfig;
use crate::error::{RecognitionError, SynthesisError};
use crate::ports::{
    RecognitionEvent, RecognitionPort, SessionId, SpeakParams, SynthesisEvent, SynthesisPort,
    VoiceInteraction,
};
use crate::text_utils;
use crate::voices::VoiceCatalog;

// ── Mode ───────────────────────────────────────────────────────────

/// The coordinator's current exclusive activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Neither port is active.
    Idle,

    /// A capture session is in flight (microphone open).
    Listening,

    /// A playback session is in flight (speaker active).
    Speaking,
}

// ── Events emitted by the coordinator ──────────────────────────────

/// Events emitted to the UI / application layer.
#[derive(Debug, Clone)]
pub enum CoordinatorEvent {
    /// Mode changed.
    StateChanged(Mode),

    /// A capture session produced a transcript.
    Transcript { text: String },

    /// Playback audio started.
    SpeakingStarted,

    /// Playback finished, was stopped, or was preempted.
    SpeakingFinished,

    /// A session resolved with an error (non-fatal).
    Error(String),
}

// ── Internal state ─────────────────────────────────────────────────

/// The one in-flight request. A single slot makes "at most one of capture
/// or playback" structural — the mode says which kind it is.
struct ActiveRequest {
    id: SessionId,
    cancel: CancellationToken,
    started: Instant,
}

struct CoordinatorState {
    mode: Mode,
    active: Option<ActiveRequest>,
    /// Capture language; read at `begin()` time, so changes only affect
    /// the next session.
    language: String,
}

// ── Coordinator ────────────────────────────────────────────────────

/// Arbitrates between speech capture and playback over the two host ports.
///
/// All methods take `&self`; the mode and session slot live behind one std
/// mutex that is never held across an await. Construct one instance per
/// session/UI context and pass it around explicitly — there is no global.
pub struct VoiceCoordinator {
    recognition: Arc<dyn RecognitionPort>,
    synthesis: Arc<dyn SynthesisPort>,
    state: Mutex<CoordinatorState>,
    config: CoordinatorConfig,
    event_tx: mpsc::UnboundedSender<CoordinatorEvent>,
}

impl VoiceCoordinator {
    /// Create a new coordinator over the given ports.
    ///
    /// Returns the coordinator and a receiver for [`CoordinatorEvent`]s.
    #[must_use]
    pub fn new(
        recognition: Arc<dyn RecognitionPort>,
        synthesis: Arc<dyn SynthesisPort>,
        config: CoordinatorConfig,
    ) -> (Self, mpsc::UnboundedReceiver<CoordinatorEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let state = CoordinatorState {
            mode: Mode::Idle,
            active: None,
            language: config.language.clone(),
        };

        let coordinator = Self {
            recognition,
            synthesis,
            state: Mutex::new(state),
            config,
            event_tx,
        };

        (coordinator, event_rx)
    }

    /// The coordinator's current mode.
    #[must_use]
    pub fn current_mode(&self) -> Mode {
        self.lock_state().mode
    }

    /// Whether speech capture is available on this host.
    ///
    /// Callers check this proactively to disable the mic affordance instead
    /// of triggering `Unsupported` on every attempt.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.recognition.is_available()
    }

    /// The capture language for the next `start_listening` call.
    #[must_use]
    pub fn language(&self) -> String {
        self.lock_state().language.clone()
    }

    /// Set the capture language. Takes effect on the next capture session;
    /// an in-flight one is unaffected.
    pub fn set_language(&self, tag: &str) {
        let mut state = self.lock_state();
        if state.language != tag {
            tracing::debug!(old = %state.language, new = %tag, "Capture language changed");
            state.language = tag.to_string();
        }
    }

    /// The playback parameters [`Self::speak`] uses.
    #[must_use]
    pub fn default_params(&self) -> SpeakParams {
        self.config.speak.clone()
    }

    /// Snapshot of the voices currently available for synthesis.
    #[must_use]
    pub fn voices(&self) -> VoiceCatalog {
        self.synthesis.voices()
    }

    // ── Listening ──────────────────────────────────────────────────

    /// Capture one utterance and return its transcript.
    ///
    /// Suspends until the host resolves the session with a transcript, an
    /// error, or a cancellation. Calling this while already listening is a
    /// toggle-stop: the in-flight capture is cancelled (its caller observes
    /// [`RecognitionError::Cancelled`]) and this call resolves the same way
    /// without opening a second capture. Calling it while speaking cancels
    /// the playback first.
    pub async fn start_listening(&self) -> Result<String, RecognitionError> {
        let (mut session, cancel) = {
            let mut state = self.lock_state();

            if state.mode == Mode::Listening {
                // Toggle-stop: a double-tap on the mic control stops the
                // capture rather than stacking a second one.
                tracing::debug!("start_listening while listening — toggle-stop");
                self.cancel_capture(&mut state);
                self.transition(&mut state, Mode::Idle);
                return Err(RecognitionError::Cancelled);
            }

            // Availability is checked before any playback is sacrificed.
            if !self.recognition.is_available() {
                return Err(RecognitionError::Unsupported);
            }

            if state.mode == Mode::Speaking {
                // Speech yields to the microphone.
                self.cancel_playback(&mut state);
                self.emit(CoordinatorEvent::SpeakingFinished);
            }

            let session = match self.recognition.begin(&state.language) {
                Ok(session) => session,
                Err(e) => {
                    self.transition(&mut state, Mode::Idle);
                    return Err(e);
                }
            };

            tracing::info!(id = session.id.0, language = %state.language, "Capture session started");

            let cancel = CancellationToken::new();
            state.active = Some(ActiveRequest {
                id: session.id,
                cancel: cancel.clone(),
                started: Instant::now(),
            });
            self.transition(&mut state, Mode::Listening);

            (session, cancel)
        };

        // Suspend until the first terminal event or cancellation — whichever
        // fires first wins, later events for this session go nowhere.
        let outcome = tokio::select! {
            () = cancel.cancelled() => Err(RecognitionError::Cancelled),
            event = session.events.recv() => match event {
                Some(RecognitionEvent::Transcript(text)) => Ok(text),
                Some(RecognitionEvent::Error(e)) => Err(e),
                // End (or a dropped sender) with no prior transcript means
                // the host heard nothing.
                Some(RecognitionEvent::End) | None => Err(RecognitionError::NoSpeechDetected),
            },
        };

        self.finish_capture(session.id, outcome)
    }

    /// Cancel the in-flight capture, if any. Idempotent — a no-op when not
    /// listening.
    pub fn stop_listening(&self) {
        let mut state = self.lock_state();
        if state.mode == Mode::Listening {
            tracing::debug!("Stop listening requested");
            self.cancel_capture(&mut state);
            self.transition(&mut state, Mode::Idle);
        }
    }

    // ── Speaking ───────────────────────────────────────────────────

    /// Speak `text` aloud with the configured default playback parameters.
    pub async fn speak(&self, text: &str) -> Result<(), SynthesisError> {
        self.speak_with(text, self.config.speak.clone()).await
    }

    /// Speak `text` aloud with explicit playback parameters.
    ///
    /// Empty or whitespace-only text resolves immediately with no
    /// transition. While listening the call is rejected with
    /// [`SynthesisError::Busy`] and the capture is unaffected. While
    /// speaking, the in-flight playback is cancelled and replaced (its
    /// caller observes [`SynthesisError::Cancelled`]); the mode never
    /// passes through `Idle` in between.
    pub async fn speak_with(&self, text: &str, params: SpeakParams) -> Result<(), SynthesisError> {
        if text.trim().is_empty() {
            return Ok(());
        }

        if !self.synthesis.is_available() {
            return Err(SynthesisError::Unsupported);
        }

        let prepared = text_utils::prepare_for_speech(text, &self.config.pronunciation);
        let mut params = params.clamped();
        if params.voice.is_none() {
            if let Some(ref hint) = self.config.preferred_voice {
                params.voice = self
                    .synthesis
                    .voices()
                    .select(Some(hint), params.language.as_deref())
                    .map(|v| v.name.clone());
            }
        }

        let (mut session, cancel) = {
            let mut state = self.lock_state();

            match state.mode {
                // Recognition is never preempted by playback.
                Mode::Listening => return Err(SynthesisError::Busy),
                // Replace the current utterance without dropping to Idle.
                Mode::Speaking => {
                    self.cancel_playback(&mut state);
                    self.emit(CoordinatorEvent::SpeakingFinished);
                }
                Mode::Idle => {}
            }

            let session = match self.synthesis.begin(&prepared, &params) {
                Ok(session) => session,
                Err(e) => {
                    self.transition(&mut state, Mode::Idle);
                    return Err(e);
                }
            };

            tracing::info!(id = session.id.0, chars = prepared.len(), "Playback session started");

            let cancel = CancellationToken::new();
            state.active = Some(ActiveRequest {
                id: session.id,
                cancel: cancel.clone(),
                started: Instant::now(),
            });
            self.transition(&mut state, Mode::Speaking);

            (session, cancel)
        };

        let outcome = loop {
            tokio::select! {
                () = cancel.cancelled() => break Err(SynthesisError::Cancelled),
                event = session.events.recv() => match event {
                    Some(SynthesisEvent::Started) => {
                        // Only a still-current session may announce itself.
                        if self.is_current(session.id) {
                            self.emit(CoordinatorEvent::SpeakingStarted);
                        }
                    }
                    Some(SynthesisEvent::Ended) => break Ok(()),
                    Some(SynthesisEvent::Error(e)) => break Err(e),
                    None => {
                        break Err(SynthesisError::PlaybackFailed(
                            "synthesis event stream closed".to_string(),
                        ));
                    }
                },
            }
        };

        self.finish_playback(session.id, outcome)
    }

    /// Cancel the in-flight playback, if any. Idempotent — a no-op when not
    /// speaking.
    pub fn stop_speaking(&self) {
        let mut state = self.lock_state();
        if state.mode == Mode::Speaking {
            tracing::debug!("Stop speaking requested");
            self.cancel_playback(&mut state);
            self.transition(&mut state, Mode::Idle);
            drop(state);
            self.emit(CoordinatorEvent::SpeakingFinished);
        }
    }

    // ── Internal helpers ───────────────────────────────────────────

    /// Resolve a finished capture session.
    ///
    /// If the stored request no longer matches `id`, the session was
    /// cancelled or superseded while its result was in flight — the caller
    /// observes `Cancelled` and no state or event is touched.
    fn finish_capture(
        &self,
        id: SessionId,
        outcome: Result<String, RecognitionError>,
    ) -> Result<String, RecognitionError> {
        let mut state = self.lock_state();
        // Session ids are only unique per port, so the mode check is what
        // keeps a stale capture id from matching a live playback session.
        if state.mode != Mode::Listening {
            tracing::debug!(id = id.0, "Capture resolved after cancel — discarding");
            return Err(RecognitionError::Cancelled);
        }
        let Some(request) = state.active.take_if(|r| r.id == id) else {
            tracing::debug!(id = id.0, "Capture resolved after cancel — discarding");
            return Err(RecognitionError::Cancelled);
        };

        tracing::debug!(
            id = id.0,
            elapsed_ms = request.started.elapsed().as_millis(),
            ok = outcome.is_ok(),
            "Capture session resolved"
        );
        self.transition(&mut state, Mode::Idle);
        drop(state);

        match &outcome {
            Ok(text) => self.emit(CoordinatorEvent::Transcript { text: text.clone() }),
            Err(e) => self.emit(CoordinatorEvent::Error(e.to_string())),
        }
        outcome
    }

    /// Resolve a finished playback session (same stale-id rule as
    /// [`Self::finish_capture`]).
    fn finish_playback(
        &self,
        id: SessionId,
        outcome: Result<(), SynthesisError>,
    ) -> Result<(), SynthesisError> {
        let mut state = self.lock_state();
        if state.mode != Mode::Speaking {
            tracing::debug!(id = id.0, "Playback resolved after cancel — discarding");
            return Err(SynthesisError::Cancelled);
        }
        let Some(request) = state.active.take_if(|r| r.id == id) else {
            tracing::debug!(id = id.0, "Playback resolved after cancel — discarding");
            return Err(SynthesisError::Cancelled);
        };

        tracing::debug!(
            id = id.0,
            elapsed_ms = request.started.elapsed().as_millis(),
            ok = outcome.is_ok(),
            "Playback session resolved"
        );
        self.transition(&mut state, Mode::Idle);
        drop(state);

        if let Err(e) = &outcome {
            self.emit(CoordinatorEvent::Error(e.to_string()));
        }
        self.emit(CoordinatorEvent::SpeakingFinished);
        outcome
    }

    /// Cancel the stored capture request: tell the port, wake the waiter.
    /// Caller decides the resulting mode.
    fn cancel_capture(&self, state: &mut CoordinatorState) {
        if let Some(request) = state.active.take() {
            self.recognition.cancel(request.id);
            request.cancel.cancel();
        }
    }

    /// Cancel the stored playback request: tell the port, wake the waiter.
    /// Caller decides the resulting mode (replacement keeps `Speaking`).
    fn cancel_playback(&self, state: &mut CoordinatorState) {
        if let Some(request) = state.active.take() {
            self.synthesis.cancel(request.id);
            request.cancel.cancel();
        }
    }

    /// Whether `id` is still the stored in-flight playback session.
    fn is_current(&self, id: SessionId) -> bool {
        let state = self.lock_state();
        state.mode == Mode::Speaking && state.active.as_ref().is_some_and(|r| r.id == id)
    }

    /// Transition to a new mode and emit a state-change event.
    fn transition(&self, state: &mut CoordinatorState, new_mode: Mode) {
        if state.mode != new_mode {
            tracing::debug!(old = ?state.mode, new = ?new_mode, "Mode transition");
            state.mode = new_mode;
            self.emit(CoordinatorEvent::StateChanged(new_mode));
        }
    }

    /// Emit a coordinator event (best-effort — if the receiver is dropped,
    /// we log and move on).
    fn emit(&self, event: CoordinatorEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::warn!("Coordinator event receiver dropped");
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, CoordinatorState> {
        // The lock is only ever held for short sync sections; a poisoned
        // lock means a panic mid-transition and there is no recovery.
        self.state.lock().unwrap()
    }
}

impl Drop for VoiceCoordinator {
    fn drop(&mut self) {
        self.stop_listening();
        self.stop_speaking();
    }
}

// ── VoiceInteraction implementation ────────────────────────────────

#[async_trait::async_trait]
impl VoiceInteraction for VoiceCoordinator {
    async fn start_listening(&self) -> Result<String, RecognitionError> {
        Self::start_listening(self).await
    }

    fn stop_listening(&self) {
        Self::stop_listening(self);
    }

    async fn speak(&self, text: &str) -> Result<(), SynthesisError> {
        Self::speak(self, text).await
    }

    async fn speak_with(&self, text: &str, params: SpeakParams) -> Result<(), SynthesisError> {
        Self::speak_with(self, text, params).await
    }

    fn stop_speaking(&self) {
        Self::stop_speaking(self);
    }

    fn set_language(&self, tag: &str) {
        Self::set_language(self, tag);
    }

    fn is_supported(&self) -> bool {
        Self::is_supported(self)
    }

    fn current_mode(&self) -> Mode {
        Self::current_mode(self)
    }
}
