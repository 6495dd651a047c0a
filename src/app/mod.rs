use crate::model::{ResponseField, SelectedFields};
use crate::services::payload::{build_payload, is_valid_json, parse_input};
use crate::ui::{AppState, ToastLevel};
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

pub const MSG_INVALID_JSON: &str = "Invalid JSON format";
pub const MSG_SUBMIT_FAILED: &str = "Error calling the API";
pub const MSG_FETCH_FAILED: &str = "Error fetching the operation code";

pub enum AppMsg {
    EditJson(String),
    SelectFile(String),
    FileEncoded {
        seq: u64,
        outcome: Result<String, String>,
    },
    Submit,
    Submitted {
        outcome: Result<JsonValue, String>,
    },
    ToggleOption(ResponseField),
    SetSelection(SelectedFields),
    FetchCode,
    FetchedCode {
        outcome: Result<Option<String>, String>,
    },
}

#[derive(Debug)]
pub enum Effect {
    EncodeFile {
        seq: u64,
        source: String,
    },
    SubmitPayload {
        payload: JsonValue,
    },
    FetchOperationCode,
    ShowToast {
        text: String,
        level: ToastLevel,
        seconds: u64,
    },
}

fn refresh_status(state: &mut AppState) {
    let form = &state.form;
    state.status_text = if form.submits_in_flight > 0 {
        Some("Submitting...".into())
    } else if form.fetches_in_flight > 0 {
        Some("Fetching operation code...".into())
    } else if form.encoding {
        Some("Encoding file...".into())
    } else {
        None
    };
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    use AppMsg::*;
    let mut effects: Vec<Effect> = Vec::new();
    match msg {
        EditJson(text) => {
            state.form.raw_input = text;
            state.form.error = None;
        }
        SelectFile(input) => {
            let input = input.trim().to_string();
            state.form.file_seq += 1;
            let seq = state.form.file_seq;
            if input.is_empty() {
                // Clearing the selection also invalidates any read still in flight
                state.form.file = None;
                state.form.file_b64.clear();
                state.form.encoding = false;
                state.dbg("file: selection cleared");
                debug!(seq, "file selection cleared");
            } else {
                state.form.file = Some(input.clone());
                state.form.encoding = true;
                state.dbg(format!("file: encode #{seq} {input}"));
                debug!(seq, source = %input, "file selected");
                effects.push(Effect::EncodeFile { seq, source: input });
            }
            refresh_status(state);
        }
        FileEncoded { seq, outcome } => {
            if seq != state.form.file_seq {
                state.dbg(format!(
                    "file: discard stale encode #{seq} (latest #{})",
                    state.form.file_seq
                ));
                debug!(seq, latest = state.form.file_seq, "stale encode discarded");
                return effects;
            }
            state.form.encoding = false;
            match outcome {
                Ok(text) => {
                    state.dbg(format!("file: encoded #{seq} ({} chars)", text.len()));
                    info!(seq, chars = text.len(), "file encoded");
                    state.form.file_b64 = text;
                }
                Err(e) => {
                    // Previous encoding stays in place; read failures are not user-facing
                    state.dbg(format!("file: encode #{seq} failed: {e}"));
                    warn!(seq, "file encode failed: {e}");
                }
            }
            refresh_status(state);
        }
        Submit => {
            if !is_valid_json(&state.form.raw_input) {
                state.form.error = Some(MSG_INVALID_JSON.into());
                state.dbg("submit: invalid JSON");
                debug!("submit rejected: invalid JSON");
                return effects;
            }
            let parsed = match parse_input(&state.form.raw_input) {
                Ok(v) => v,
                Err(e) => {
                    state.form.error = Some(MSG_INVALID_JSON.into());
                    warn!("submit rejected: {e:#}");
                    return effects;
                }
            };
            let payload = build_payload(&parsed, &state.form.file_b64);
            state.form.error = None;
            state.form.submits_in_flight += 1;
            state.dbg(format!(
                "submit: {} keys, file {}",
                payload.as_object().map(|m| m.len()).unwrap_or(0),
                if state.form.file_b64.is_empty() {
                    "none".to_string()
                } else {
                    format!("{} chars", state.form.file_b64.len())
                }
            ));
            refresh_status(state);
            effects.push(Effect::SubmitPayload { payload });
        }
        Submitted { outcome } => {
            state.form.submits_in_flight = state.form.submits_in_flight.saturating_sub(1);
            match outcome {
                Ok(v) => {
                    state.dbg("submit: response stored");
                    state.form.api_response = Some(v);
                    effects.push(Effect::ShowToast {
                        text: "Response received".into(),
                        level: ToastLevel::Success,
                        seconds: 3,
                    });
                }
                Err(e) => {
                    // Last good response stays displayed
                    state.dbg(format!("submit: failed: {e}"));
                    state.form.error = Some(MSG_SUBMIT_FAILED.into());
                }
            }
            refresh_status(state);
        }
        ToggleOption(field) => {
            if !state.form.selected.remove(&field) {
                state.form.selected.insert(field);
            }
            debug!(field = field.label(), "selection toggled");
        }
        SetSelection(sel) => {
            state.form.selected = sel;
        }
        FetchCode => {
            if !state.form.can_fetch_code() {
                state.dbg("fetch: ignored, nothing selected");
                return effects;
            }
            // The error slot is only overwritten by the fetch outcome
            state.form.fetches_in_flight += 1;
            state.dbg("fetch: operation code");
            refresh_status(state);
            effects.push(Effect::FetchOperationCode);
        }
        FetchedCode { outcome } => {
            state.form.fetches_in_flight = state.form.fetches_in_flight.saturating_sub(1);
            match outcome {
                Ok(code) => {
                    state.dbg(format!("fetch: operation code {code:?}"));
                    info!(code = ?code, "operation code fetched");
                    state.form.operation_code = code;
                }
                Err(e) => {
                    state.dbg(format!("fetch: failed: {e}"));
                    state.form.error = Some(MSG_FETCH_FAILED.into());
                }
            }
            refresh_status(state);
        }
    }
    effects
}
