//! Text preparation for synthesis.
//!
//! The synthesiser receives a prepared copy of the message text: trimmed,
//! whitespace-collapsed, with the configured pronunciation substitutions
//! applied. The message shown in the UI is never mutated.

use crate::config::PronunciationRule;

/// Prepare text for the synthesis port.
///
/// Deterministic: the same text and rule table always produce the same
/// output. Rules are applied in table order as plain literal replacements.
#[must_use]
pub fn prepare_for_speech(text: &str, rules: &[PronunciationRule]) -> String {
    let collapsed = collapse_whitespace(text.trim());
    apply_pronunciations(&collapsed, rules)
}

/// Apply the pronunciation substitution table in order.
#[must_use]
pub fn apply_pronunciations(text: &str, rules: &[PronunciationRule]) -> String {
    let mut result = text.to_string();
    for rule in rules {
        if rule.written.is_empty() {
            continue;
        }
        result = result.replace(&rule.written, &rule.spoken);
    }
    result
}

/// Collapse runs of whitespace (including newlines) into single spaces.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last_was_space = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                result.push(' ');
            }
            last_was_space = true;
        } else {
            result.push(ch);
            last_was_space = false;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(written: &str, spoken: &str) -> PronunciationRule {
        PronunciationRule {
            written: written.to_string(),
            spoken: spoken.to_string(),
        }
    }

    #[test]
    fn collapse_handles_newlines_and_runs() {
        assert_eq!(collapse_whitespace("a  b\n\nc\td"), "a b c d");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn substitutions_apply_in_table_order() {
        let rules = vec![rule("VoxLoop", "vox loop"), rule("API", "A P I")];
        assert_eq!(
            apply_pronunciations("the VoxLoop API", &rules),
            "the vox loop A P I"
        );
    }

    #[test]
    fn substitution_replaces_every_occurrence() {
        let rules = vec![rule("SQL", "sequel")];
        assert_eq!(
            apply_pronunciations("SQL is SQL", &rules),
            "sequel is sequel"
        );
    }

    #[test]
    fn empty_written_form_is_skipped() {
        let rules = vec![rule("", "nothing")];
        assert_eq!(apply_pronunciations("unchanged", &rules), "unchanged");
    }

    #[test]
    fn prepare_is_deterministic() {
        let rules = vec![rule("VoxLoop", "vox loop")];
        let a = prepare_for_speech("  Hello   VoxLoop\nworld  ", &rules);
        let b = prepare_for_speech("  Hello   VoxLoop\nworld  ", &rules);
        assert_eq!(a, "Hello vox loop world");
        assert_eq!(a, b);
    }

    #[test]
    fn original_text_is_untouched() {
        let rules = vec![rule("abc", "xyz")];
        let original = String::from("abc");
        let prepared = prepare_for_speech(&original, &rules);
        assert_eq!(prepared, "xyz");
        assert_eq!(original, "abc");
    }
}
