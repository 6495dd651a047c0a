use crate::model::{ResponseField, SelectedFields};
use serde_json::Value as JsonValue;

pub const LINE_SEPARATOR: &str = " | ";
pub const VALUE_SEPARATOR: &str = ", ";

// Strings are shown bare, null as nothing, everything else as its JSON text.
fn display_value(v: &JsonValue) -> String {
    match v {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Values of `field` in the response; absent or non-array fields read as empty.
pub fn field_values(resp: &JsonValue, field: ResponseField) -> Vec<String> {
    resp.get(field.key())
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().map(display_value).collect())
        .unwrap_or_default()
}

pub fn render_line(resp: &JsonValue, field: ResponseField) -> String {
    format!(
        "{}: {}",
        field.label(),
        field_values(resp, field).join(VALUE_SEPARATOR)
    )
}

/// Summary of the selected fields in fixed order, or `None` when there is
/// nothing to show.
pub fn render_summary(resp: Option<&JsonValue>, selected: &SelectedFields) -> Option<String> {
    let resp = resp?;
    if selected.is_empty() {
        return None;
    }
    let lines: Vec<String> = ResponseField::ALL
        .into_iter()
        .filter(|f| selected.contains(f))
        .map(|f| render_line(resp, f))
        .collect();
    Some(lines.join(LINE_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> JsonValue {
        json!({
            "alphabets": ["A", "C"],
            "numbers": ["1"],
            "highest_lowercase_alphabet": ["z"]
        })
    }

    #[test]
    fn renders_selected_fields_in_fixed_order() {
        let mut sel = SelectedFields::new();
        sel.insert(ResponseField::Numbers);
        sel.insert(ResponseField::Alphabets);
        assert_eq!(
            render_summary(Some(&sample()), &sel).as_deref(),
            Some("Alphabets: A, C | Numbers: 1")
        );
    }

    #[test]
    fn renders_all_three_fields() {
        let sel: SelectedFields = ResponseField::ALL.into_iter().collect();
        assert_eq!(
            render_summary(Some(&sample()), &sel).as_deref(),
            Some("Alphabets: A, C | Numbers: 1 | Highest lowercase alphabet: z")
        );
    }

    #[test]
    fn nothing_without_response_or_selection() {
        let sel: SelectedFields = ResponseField::ALL.into_iter().collect();
        assert!(render_summary(None, &sel).is_none());
        assert!(render_summary(Some(&sample()), &SelectedFields::new()).is_none());
    }

    #[test]
    fn missing_or_malformed_fields_degrade_to_empty() {
        let resp = json!({"alphabets": "AC", "numbers": [1, 2.5, null, true]});
        let sel: SelectedFields = ResponseField::ALL.into_iter().collect();
        assert_eq!(
            render_summary(Some(&resp), &sel).as_deref(),
            Some("Alphabets:  | Numbers: 1, 2.5, , true | Highest lowercase alphabet: ")
        );
        assert!(field_values(&json!(null), ResponseField::Numbers).is_empty());
    }
}
