//! Synthesis voice catalog and selection policy.
//!
//! The catalog is a snapshot of whatever voices the host platform reports.
//! It may legitimately be empty right after startup (some hosts load voices
//! asynchronously) — callers must tolerate that and re-query later.

use serde::{Deserialize, Serialize};

/// One synthesis voice as reported by the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceInfo {
    /// Host-assigned voice name (doubles as its identifier).
    pub name: String,

    /// IETF language tag the voice speaks (e.g. `"en-US"`).
    pub language: String,
}

/// Snapshot of the voices currently available for synthesis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoiceCatalog {
    pub voices: Vec<VoiceInfo>,
}

impl VoiceCatalog {
    #[must_use]
    pub fn new(voices: Vec<VoiceInfo>) -> Self {
        Self { voices }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.voices.len()
    }

    /// Pick the best-matching voice for a name hint and/or language tag.
    ///
    /// Preference order:
    /// 1. exact name match,
    /// 2. case-insensitive substring match on the name,
    /// 3. language match on the primary subtag (`"en-US"` matches `"en-GB"`),
    /// 4. none.
    ///
    /// The hint matching is deliberately loose — voice names differ between
    /// hosts, so product configuration carries a fragment like `"samantha"`
    /// rather than a full identifier.
    #[must_use]
    pub fn select(&self, name_hint: Option<&str>, language: Option<&str>) -> Option<&VoiceInfo> {
        if let Some(hint) = name_hint {
            if let Some(voice) = self.voices.iter().find(|v| v.name == hint) {
                return Some(voice);
            }
            let hint_lower = hint.to_lowercase();
            if let Some(voice) = self
                .voices
                .iter()
                .find(|v| v.name.to_lowercase().contains(&hint_lower))
            {
                return Some(voice);
            }
        }

        if let Some(tag) = language {
            if let Some(voice) = self.voices.iter().find(|v| v.language == tag) {
                return Some(voice);
            }
            let primary = primary_subtag(tag);
            return self
                .voices
                .iter()
                .find(|v| primary_subtag(&v.language) == primary);
        }

        None
    }
}

/// The primary language subtag, lowercased (`"en-US"` → `"en"`).
fn primary_subtag(tag: &str) -> String {
    tag.split(['-', '_'])
        .next()
        .unwrap_or(tag)
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> VoiceCatalog {
        VoiceCatalog::new(vec![
            VoiceInfo {
                name: "Samantha".to_string(),
                language: "en-US".to_string(),
            },
            VoiceInfo {
                name: "Daniel (United Kingdom)".to_string(),
                language: "en-GB".to_string(),
            },
            VoiceInfo {
                name: "Amélie".to_string(),
                language: "fr-CA".to_string(),
            },
        ])
    }

    #[test]
    fn empty_catalog_selects_nothing() {
        let catalog = VoiceCatalog::default();
        assert!(catalog.is_empty());
        assert!(catalog.select(Some("samantha"), Some("en-US")).is_none());
    }

    #[test]
    fn exact_name_wins() {
        let c = catalog();
        assert_eq!(c.select(Some("Samantha"), None).unwrap().name, "Samantha");
    }

    #[test]
    fn name_substring_is_case_insensitive() {
        let c = catalog();
        assert_eq!(
            c.select(Some("daniel"), None).unwrap().language,
            "en-GB"
        );
    }

    #[test]
    fn language_fallback_matches_exact_then_primary_subtag() {
        let c = catalog();
        assert_eq!(c.select(None, Some("en-GB")).unwrap().language, "en-GB");
        // No fr-FR voice, but the primary subtag matches fr-CA.
        assert_eq!(c.select(None, Some("fr-FR")).unwrap().language, "fr-CA");
    }

    #[test]
    fn unmatched_hint_falls_back_to_language() {
        let c = catalog();
        assert_eq!(
            c.select(Some("zarvox"), Some("en-US")).unwrap().name,
            "Samantha"
        );
    }

    #[test]
    fn no_criteria_selects_nothing() {
        assert!(catalog().select(None, None).is_none());
    }
}
