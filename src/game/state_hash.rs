//! Deterministic state hashing
//!
//! Hashes the serialized state with wall-clock metadata stripped, so two
//! replays of the same seed and decisions hash equal even though their
//! actions were stamped at different times.

use crate::game::ExtendedGameState;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Fields that carry no gameplay meaning
const EXCLUDED_FIELDS: &[&str] = &["timestamp", "saved_at"];

pub fn compute_state_hash(state: &ExtendedGameState) -> u64 {
    let json_value = match serde_json::to_value(state) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Warning: Failed to serialize game state for hashing: {e}");
            return 0;
        }
    };

    let canonical = match serde_json::to_string(&strip_metadata(json_value)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Warning: Failed to canonicalize cleaned state: {e}");
            return 0;
        }
    };

    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    hasher.finish()
}

fn strip_metadata(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .filter(|(k, _)| !EXCLUDED_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k, strip_metadata(v)))
                .collect(),
        ),
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(strip_metadata).collect())
        }
        other => other,
    }
}

/// First 8 hex digits, for display
pub fn format_hash(hash: u64) -> String {
    format!("{:08x}", (hash >> 32) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_metadata() {
        let json = serde_json::json!({
            "turn_number": 5,
            "action_log": [
                {"player": "player", "timestamp": "2026-01-01T00:00:00Z", "action": {"type": "pass_turn"}}
            ],
        });

        assert_eq!(
            strip_metadata(json),
            serde_json::json!({
                "turn_number": 5,
                "action_log": [{"player": "player", "action": {"type": "pass_turn"}}],
            })
        );
    }

    #[test]
    fn test_format_hash() {
        assert_eq!(format_hash(0xdeadbeef_00000000), "deadbeef");
    }
}
