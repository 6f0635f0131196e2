//! Voice interaction coordinator.
//!
//! `voxloop` arbitrates between speech capture (recognition) and speech
//! playback (synthesis) on top of two host-platform capability traits. It
//! owns a three-state machine (`Idle` / `Listening` / `Speaking`), enforces
//! mutual exclusion between the microphone and the speaker, and exposes a
//! single async API to the chat layer:
//!
//! - [`VoiceCoordinator::start_listening`] suspends until one utterance is
//!   transcribed (or fails), cancelling any in-flight playback first.
//! - [`VoiceCoordinator::speak`] plays one utterance, rejected while a
//!   capture is in flight — recognition is never preempted by playback.
//! - `stop_listening` / `stop_speaking` cancel idempotently.
//!
//! The host's recognition and synthesis engines are out of scope: they are
//! consumed through [`RecognitionPort`] and [`SynthesisPort`], which tests
//! drive with canned events.

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod ports;
pub mod text_utils;
pub mod voices;

// Re-export key types for convenience
pub use config::{CoordinatorConfig, PronunciationRule};
pub use coordinator::{CoordinatorEvent, Mode, VoiceCoordinator};
pub use error::{RecognitionError, SynthesisError};
pub use ports::{
    RecognitionEvent, RecognitionPort, RecognitionSession, SessionId, SpeakParams, SynthesisEvent,
    SynthesisPort, SynthesisSession, VoiceInteraction,
};
pub use voices::{VoiceCatalog, VoiceInfo};
