//! Coordinator configuration.
//!
//! Everything product-specific lives here as data: the default capture
//! language, default playback parameters, the preferred-voice hint, and the
//! pronunciation substitution table. None of it is part of the state
//! machine contract.

use serde::{Deserialize, Serialize};

use crate::ports::SpeakParams;

/// One pronunciation substitution applied to text before synthesis.
///
/// Substitutions fix words the synthesiser mangles (typically product
/// names), e.g. `written: "VoxLoop"` → `spoken: "vox loop"`. They are
/// applied in table order, deterministically, and only to the copy of the
/// text handed to the synthesis port — never to the original message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PronunciationRule {
    /// The literal text as it appears in messages.
    pub written: String,

    /// The replacement handed to the synthesiser.
    pub spoken: String,
}

/// Configuration for a [`VoiceCoordinator`](crate::coordinator::VoiceCoordinator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// IETF language tag for the next capture session (e.g. `"en-US"`).
    ///
    /// Whether a tag is actually supported is the host platform's call;
    /// an unsupported tag surfaces as a recognition error, not a local
    /// validation failure.
    pub language: String,

    /// Default playback parameters used when the caller supplies none.
    pub speak: SpeakParams,

    /// Optional voice-name fragment resolved against the catalog when a
    /// speak request names no voice.
    pub preferred_voice: Option<String>,

    /// Pronunciation substitution table (see [`PronunciationRule`]).
    pub pronunciation: Vec<PronunciationRule>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            speak: SpeakParams::default(),
            preferred_voice: None,
            pronunciation: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_language_is_en_us() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.language, "en-US");
        assert!(config.preferred_voice.is_none());
        assert!(config.pronunciation.is_empty());
    }

    #[test]
    fn default_speak_params_are_neutral() {
        let config = CoordinatorConfig::default();
        #[allow(clippy::float_cmp)]
        {
            assert_eq!(config.speak.rate, 1.0);
            assert_eq!(config.speak.pitch, 1.0);
            assert_eq!(config.speak.volume, 1.0);
        }
        assert!(config.speak.voice.is_none());
    }
}
