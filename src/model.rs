use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

pub const DEFAULT_BASE_URL: &str = "https://backend-jqtb.onrender.com";
/// Key under which the encoded attachment travels in the submission payload.
pub const FILE_KEY: &str = "file_b64";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_placeholder")]
    pub json_placeholder: String,
    // Defaults to <tmp>/bfhl-tui.log when unset
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            title: default_title(),
            json_placeholder: default_placeholder(),
            log_file: None,
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_title() -> String {
    "Dynamic Frontend & Smart API for JSON and File Handling".to_string()
}

fn default_placeholder() -> String {
    r#"{"data": ["A", "C", "z"]}"#.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

pub(crate) fn validate_app_config(cfg: &AppConfig) -> Result<(), String> {
    let url = cfg.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(format!(
            "base_url must start with http:// or https://, got '{}'",
            cfg.base_url
        ));
    }
    if cfg.log_level.parse::<tracing::Level>().is_err() {
        return Err(format!("unknown log_level: '{}'", cfg.log_level));
    }
    Ok(())
}

/// Response fields the user can pick for display, in their fixed display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResponseField {
    Alphabets,
    Numbers,
    HighestLowercaseAlphabet,
}

impl ResponseField {
    pub const ALL: [ResponseField; 3] = [
        ResponseField::Alphabets,
        ResponseField::Numbers,
        ResponseField::HighestLowercaseAlphabet,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ResponseField::Alphabets => "Alphabets",
            ResponseField::Numbers => "Numbers",
            ResponseField::HighestLowercaseAlphabet => "Highest lowercase alphabet",
        }
    }

    /// Key of the field inside the submit response object.
    pub fn key(self) -> &'static str {
        match self {
            ResponseField::Alphabets => "alphabets",
            ResponseField::Numbers => "numbers",
            ResponseField::HighestLowercaseAlphabet => "highest_lowercase_alphabet",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let l = label.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.label().eq_ignore_ascii_case(l))
    }
}

pub type SelectedFields = BTreeSet<ResponseField>;

/// Parse a comma-separated list of labels; unknown labels are skipped.
pub fn parse_selection(list: &str) -> SelectedFields {
    list.split(',')
        .filter_map(ResponseField::from_label)
        .collect()
}

/// Everything the submission form holds for one session.
#[derive(Debug, Default)]
pub struct SubmissionForm {
    pub raw_input: String,
    // Selected attachment as typed by the user (path or data URI)
    pub file: Option<String>,
    pub file_b64: String,
    // Sequence number of the most recent encode request
    pub file_seq: u64,
    pub encoding: bool,
    pub api_response: Option<JsonValue>,
    pub selected: SelectedFields,
    pub error: Option<String>,
    pub operation_code: Option<String>,
    pub submits_in_flight: usize,
    pub fetches_in_flight: usize,
}

impl SubmissionForm {
    pub fn has_response(&self) -> bool {
        self.api_response.is_some()
    }

    /// The GET button is offered only once a response exists and something is selected.
    pub fn can_fetch_code(&self) -> bool {
        self.has_response() && !self.selected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert!(validate_app_config(&cfg).is_ok());
    }

    #[test]
    fn validate_rejects_non_http_base_url() {
        let cfg = AppConfig {
            base_url: "ftp://example.com".into(),
            ..Default::default()
        };
        let err = validate_app_config(&cfg).unwrap_err();
        assert!(err.contains("base_url"));
    }

    #[test]
    fn validate_rejects_unknown_log_level() {
        let cfg = AppConfig {
            log_level: "loud".into(),
            ..Default::default()
        };
        let err = validate_app_config(&cfg).unwrap_err();
        assert!(err.contains("log_level"));
    }

    #[test]
    fn yaml_config_fills_missing_keys_with_defaults() {
        let cfg: AppConfig = serde_yaml::from_str("base_url: http://localhost:3000\n").unwrap();
        assert_eq!(cfg.base_url, "http://localhost:3000");
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.json_placeholder.contains("\"data\""));
    }

    #[test]
    fn parse_selection_ignores_unknown_and_keeps_fixed_order() {
        let sel = parse_selection("Numbers, bogus ,alphabets");
        let v: Vec<_> = sel.into_iter().collect();
        assert_eq!(v, vec![ResponseField::Alphabets, ResponseField::Numbers]);
    }

    #[test]
    fn fetch_code_requires_response_and_selection() {
        let mut form = SubmissionForm::default();
        assert!(!form.can_fetch_code());
        form.api_response = Some(serde_json::json!({}));
        assert!(!form.can_fetch_code());
        form.selected.insert(ResponseField::Numbers);
        assert!(form.can_fetch_code());
    }
}
