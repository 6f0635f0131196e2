//! Voice coordinator error types.
//!
//! Every variant carries a short, human-readable message via its `Display`
//! impl — that is the static error-to-message table shown to users. Errors
//! are routine conditions (a declined microphone prompt is not exceptional):
//! they are reported to the immediate caller and never crash the coordinator.

use thiserror::Error;

/// Errors surfaced by speech capture (recognition).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecognitionError {
    /// The capture session ended without hearing any speech.
    #[error("No speech was detected")]
    NoSpeechDetected,

    /// No usable microphone on this device.
    #[error("No microphone is available")]
    MicrophoneUnavailable,

    /// The user (or platform policy) denied microphone access.
    #[error("Microphone permission was denied")]
    PermissionDenied,

    /// The host recogniser lost its network connection.
    #[error("Network error during speech recognition")]
    NetworkFailure,

    /// The capture was cancelled before it produced a transcript.
    #[error("Speech capture was cancelled")]
    Cancelled,

    /// The host platform exposes no recognition capability at all.
    #[error("Speech recognition is not supported on this device")]
    Unsupported,

    /// Anything the host reported that has no mapping of its own.
    #[error("Speech recognition failed")]
    Unknown,
}

impl RecognitionError {
    /// Map a host platform error code onto the taxonomy.
    ///
    /// The codes are the ones the host recogniser emits on its error
    /// callback. An unrecognised code (including an unsupported language
    /// tag) maps to [`Self::Unknown`] — it is never rejected locally.
    #[must_use]
    pub fn from_platform_code(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeechDetected,
            "audio-capture" => Self::MicrophoneUnavailable,
            "not-allowed" | "service-not-allowed" => Self::PermissionDenied,
            "network" => Self::NetworkFailure,
            "aborted" => Self::Cancelled,
            other => {
                tracing::debug!(code = other, "Unmapped recognition error code");
                Self::Unknown
            }
        }
    }
}

/// Errors surfaced by speech playback (synthesis).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    /// The host synthesiser failed mid-utterance.
    #[error("Speech playback failed: {0}")]
    PlaybackFailed(String),

    /// Playback was cancelled or preempted before it finished.
    #[error("Speech playback was cancelled")]
    Cancelled,

    /// The host platform exposes no synthesis capability at all.
    #[error("Speech playback is not supported on this device")]
    Unsupported,

    /// A capture session is in flight — recognition is never preempted
    /// by playback.
    #[error("Cannot speak while listening")]
    Busy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_codes_map_onto_taxonomy() {
        assert_eq!(
            RecognitionError::from_platform_code("no-speech"),
            RecognitionError::NoSpeechDetected
        );
        assert_eq!(
            RecognitionError::from_platform_code("audio-capture"),
            RecognitionError::MicrophoneUnavailable
        );
        assert_eq!(
            RecognitionError::from_platform_code("not-allowed"),
            RecognitionError::PermissionDenied
        );
        assert_eq!(
            RecognitionError::from_platform_code("service-not-allowed"),
            RecognitionError::PermissionDenied
        );
        assert_eq!(
            RecognitionError::from_platform_code("network"),
            RecognitionError::NetworkFailure
        );
        assert_eq!(
            RecognitionError::from_platform_code("aborted"),
            RecognitionError::Cancelled
        );
    }

    #[test]
    fn unknown_codes_fall_through() {
        assert_eq!(
            RecognitionError::from_platform_code("language-not-supported"),
            RecognitionError::Unknown
        );
        assert_eq!(
            RecognitionError::from_platform_code(""),
            RecognitionError::Unknown
        );
    }

    #[test]
    fn messages_are_short_and_stable() {
        assert_eq!(
            RecognitionError::PermissionDenied.to_string(),
            "Microphone permission was denied"
        );
        assert_eq!(
            SynthesisError::Busy.to_string(),
            "Cannot speak while listening"
        );
    }
}
