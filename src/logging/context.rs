// src/logging/context.rs
//! Numeric context extraction from free text
//!
//! Heuristic: for each field the labels are tried in order, only the first
//! occurrence of a label is looked at, and the label must be followed by
//! optional `' ' ':' '=' '\t'` and then digits. Misses are expected on
//! ambiguous text.

use serde::Serialize;

const ENTRY_LABELS: &[&str] = &["entryorguid", "entry", "Entry"];
const MAP_LABELS: &[&str] = &["map", "Map"];
const SPELL_LABELS: &[&str] = &["spell", "Spell"];
const GUID_LABELS: &[&str] = &["GUID"];
const INSTANCE_LABELS: &[&str] = &["instance", "Instance"];

/// Fields extracted from one message; absent fields are omitted from output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spell: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<u64>,
}

impl LogContext {
    pub fn extract(text: &str) -> Self {
        Self {
            entry: first_number(text, ENTRY_LABELS),
            map: first_number(text, MAP_LABELS),
            spell: first_number(text, SPELL_LABELS),
            guid: first_number(text, GUID_LABELS),
            instance: first_number(text, INSTANCE_LABELS),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
            && self.map.is_none()
            && self.spell.is_none()
            && self.guid.is_none()
            && self.instance.is_none()
    }
}

fn first_number(text: &str, labels: &[&str]) -> Option<u64> {
    labels.iter().find_map(|label| number_after(text, label))
}

fn number_after(text: &str, label: &str) -> Option<u64> {
    let start = text.find(label)? + label.len();
    let rest = text[start..].trim_start_matches([' ', ':', '=', '\t']);
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();

    if digits == 0 {
        return None;
    }

    rest[..digits].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creature_template_message() {
        let ctx = LogContext::extract("Loading creature_template entry 1234 failed");
        assert_eq!(ctx.entry, Some(1234));
        assert_eq!(ctx.map, None);
        assert_eq!(ctx.spell, None);
        assert_eq!(ctx.guid, None);
        assert_eq!(serde_json::to_string(&ctx).unwrap(), r#"{"entry":1234}"#);
    }

    #[test]
    fn test_separators() {
        assert_eq!(LogContext::extract("Map: 36").map, Some(36));
        assert_eq!(LogContext::extract("spell=133").spell, Some(133));
        assert_eq!(LogContext::extract("GUID\t42").guid, Some(42));
        assert_eq!(LogContext::extract("Entry :=  7").entry, Some(7));
    }

    #[test]
    fn test_label_priority() {
        let ctx = LogContext::extract("SmartAI: entryorguid 55 has invalid entry 66");
        assert_eq!(ctx.entry, Some(55));

        let ctx = LogContext::extract("Creature Entry 9 spawned, entry lookup failed");
        assert_eq!(ctx.entry, Some(9));
    }

    #[test]
    fn test_first_occurrence_only() {
        // "map" first appears in "mapping" with no number after it
        let ctx = LogContext::extract("mapping done for map 5");
        assert_eq!(ctx.map, None);
    }

    #[test]
    fn test_multiple_fields() {
        let ctx = LogContext::extract("Spell 133 cast by GUID 77 on Map 0 instance 3");
        assert_eq!(ctx.spell, Some(133));
        assert_eq!(ctx.guid, Some(77));
        assert_eq!(ctx.map, Some(0));
        assert_eq!(ctx.instance, Some(3));
        assert_eq!(
            serde_json::to_string(&ctx).unwrap(),
            r#"{"map":0,"spell":133,"guid":77,"instance":3}"#
        );
    }

    #[test]
    fn test_nothing_found() {
        let ctx = LogContext::extract("World initialized in 3 seconds");
        assert!(ctx.is_empty());
        assert_eq!(serde_json::to_string(&ctx).unwrap(), "{}");
    }

    #[test]
    fn test_overflowing_digits_skipped() {
        let ctx = LogContext::extract("entry 99999999999999999999999 Entry 4");
        assert_eq!(ctx.entry, Some(4));
    }
}
