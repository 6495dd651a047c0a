use crate::model::FILE_KEY;
use anyhow::{Context, Result};
use serde_json::{Map, Value as JsonValue};

pub fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<JsonValue>(text).is_ok()
}

pub fn parse_input(text: &str) -> Result<JsonValue> {
    serde_json::from_str(text).with_context(|| "parsing JSON input")
}

/// Spread `parsed` into a fresh object and attach the encoded file under `file_b64`.
///
/// Objects contribute their keys, arrays their indices and strings one key per
/// character; other scalars contribute nothing. The file key is written last,
/// so it replaces any `file_b64` the user typed.
pub fn build_payload(parsed: &JsonValue, encoded: &str) -> JsonValue {
    let mut out = Map::new();
    match parsed {
        JsonValue::Object(m) => {
            for (k, v) in m {
                out.insert(k.clone(), v.clone());
            }
        }
        JsonValue::Array(arr) => {
            for (i, v) in arr.iter().enumerate() {
                out.insert(i.to_string(), v.clone());
            }
        }
        JsonValue::String(s) => {
            for (i, c) in s.chars().enumerate() {
                out.insert(i.to_string(), JsonValue::String(c.to_string()));
            }
        }
        _ => {}
    }
    let file = if encoded.is_empty() {
        JsonValue::Null
    } else {
        JsonValue::String(encoded.to_string())
    };
    out.insert(FILE_KEY.to_string(), file);
    JsonValue::Object(out)
}
