//! Capability traits over the host platform's speech facilities.
//!
//! [`RecognitionPort`] and [`SynthesisPort`] abstract over "capture one
//! utterance" and "play one utterance": `begin()` hands back a session whose
//! events arrive asynchronously on a channel. The [`VoiceCoordinator`](crate::coordinator::VoiceCoordinator)
//! operates on trait objects so host bindings can be swapped without
//! touching the coordination logic, and tests can drive the state machine
//! with canned events.
//!
//! Availability is a runtime capability check, not a compile-time guarantee:
//! a port that reports `is_available() == false` fails `begin()`
//! synchronously.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::coordinator::Mode;
use crate::error::{RecognitionError, SynthesisError};
use crate::voices::VoiceCatalog;

// ── Session handles ────────────────────────────────────────────────

/// Opaque token identifying one in-flight capture or playback attempt.
///
/// Allocated by the port on `begin()`; the coordinator compares it against
/// its stored id to discard events that arrive after a cancel or after a
/// newer session already started. Ids must not repeat within a port, but
/// the two ports may hand out overlapping values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

/// One in-flight capture attempt: its id plus the event stream the host
/// delivers results on.
pub struct RecognitionSession {
    pub id: SessionId,
    pub events: mpsc::UnboundedReceiver<RecognitionEvent>,
}

/// One in-flight playback attempt.
pub struct SynthesisSession {
    pub id: SessionId,
    pub events: mpsc::UnboundedReceiver<SynthesisEvent>,
}

// ── Port events ────────────────────────────────────────────────────

/// Events the host recogniser fires for a capture session.
///
/// The host is expected to deliver exactly one terminal event, but the
/// coordinator does not rely on that — the first one wins and the rest are
/// discarded. `End` without a prior transcript means no speech was heard.
#[derive(Debug, Clone)]
pub enum RecognitionEvent {
    Transcript(String),
    Error(RecognitionError),
    End,
}

/// Events the host synthesiser fires for a playback session.
#[derive(Debug, Clone)]
pub enum SynthesisEvent {
    /// Audio started coming out of the speaker.
    Started,
    /// Playback drained naturally.
    Ended,
    Error(SynthesisError),
}

// ── Playback parameters ────────────────────────────────────────────

/// Voice parameters for one playback request.
///
/// Out-of-range numeric values are clamped, never rejected — see
/// [`Self::clamped`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakParams {
    /// Speaking rate multiplier (0.5–2.0).
    pub rate: f32,

    /// Pitch multiplier (0.5–2.0).
    pub pitch: f32,

    /// Output volume (0.0–1.0).
    pub volume: f32,

    /// Voice name, resolved against the catalog when absent.
    pub voice: Option<String>,

    /// Language tag for the utterance (host default when absent).
    pub language: Option<String>,
}

impl Default for SpeakParams {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            voice: None,
            language: None,
        }
    }
}

impl SpeakParams {
    /// Return a copy with every numeric field forced into its valid range.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            rate: self.rate.clamp(0.5, 2.0),
            pitch: self.pitch.clamp(0.5, 2.0),
            volume: self.volume.clamp(0.0, 1.0),
            voice: self.voice.clone(),
            language: self.language.clone(),
        }
    }
}

// ── Recognition port ───────────────────────────────────────────────

/// Host capability: start capturing audio and return one transcript or fail.
pub trait RecognitionPort: Send + Sync {
    /// Whether the host exposes a capture capability. Pure query.
    fn is_available(&self) -> bool;

    /// Start one capture session constrained to `language`.
    ///
    /// Fails synchronously when the capability is absent. Once begun, the
    /// host eventually fires a terminal [`RecognitionEvent`] on the session.
    fn begin(&self, language: &str) -> Result<RecognitionSession, RecognitionError>;

    /// Request early termination of a session.
    ///
    /// The host may still fire a final event racing with the cancellation;
    /// the coordinator discards it.
    fn cancel(&self, id: SessionId);
}

// ── Synthesis port ─────────────────────────────────────────────────

/// Host capability: speak one utterance aloud, cancellable.
pub trait SynthesisPort: Send + Sync {
    /// Whether the host exposes a synthesis capability. Pure query.
    fn is_available(&self) -> bool;

    /// Current snapshot of available voices — possibly empty right after
    /// startup, refreshed by querying again.
    fn voices(&self) -> VoiceCatalog;

    /// Start playback of `text` with the given (already clamped) parameters.
    fn begin(&self, text: &str, params: &SpeakParams)
    -> Result<SynthesisSession, SynthesisError>;

    /// Stop playback immediately. No further events fire for the session
    /// once the cancellation is acknowledged.
    fn cancel(&self, id: SessionId);
}

// ── Caller-facing surface ──────────────────────────────────────────

/// The voice interaction surface the chat orchestrator calls.
///
/// Implemented by [`VoiceCoordinator`](crate::coordinator::VoiceCoordinator);
/// callers hold `Arc<dyn VoiceInteraction>` so orchestration code never
/// depends on the concrete coordinator.
#[async_trait]
pub trait VoiceInteraction: Send + Sync {
    /// Capture one utterance in the configured language and return its
    /// transcript. Suspends until the host resolves the session.
    async fn start_listening(&self) -> Result<String, RecognitionError>;

    /// Cancel the in-flight capture, if any. Idempotent.
    fn stop_listening(&self);

    /// Speak `text` aloud with the implementer's default playback
    /// parameters. Empty or whitespace-only text is an immediate no-op.
    /// Rejected with [`SynthesisError::Busy`] while listening.
    async fn speak(&self, text: &str) -> Result<(), SynthesisError>;

    /// Speak `text` aloud with explicit playback parameters. Same
    /// resolution rules as [`Self::speak`].
    async fn speak_with(&self, text: &str, params: SpeakParams) -> Result<(), SynthesisError>;

    /// Cancel the in-flight playback, if any. Idempotent.
    fn stop_speaking(&self);

    /// Set the capture language for subsequent `start_listening` calls.
    /// An in-flight capture is unaffected.
    fn set_language(&self, tag: &str);

    /// Whether speech capture is available on this host.
    fn is_supported(&self) -> bool;

    /// The coordinator's current exclusive activity.
    fn current_mode(&self) -> Mode;
}
