use crate::ui::{LoadKind, LoadMsg, LoadOutcome};
use anyhow::{Context, Result};
use serde_json::Value as JsonValue;
use std::sync::mpsc::Sender;
use std::thread;
use tracing::{debug, info, warn};

pub const ENDPOINT_PATH: &str = "/bfhl";

/// Blocking client for the single `/bfhl` endpoint.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, ENDPOINT_PATH)
    }

    /// POST the payload; any transport failure, non-2xx status or non-JSON body is an error.
    pub fn submit(&self, payload: &JsonValue) -> Result<JsonValue> {
        let url = self.endpoint();
        debug!(%url, "submitting payload");
        let resp = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .with_context(|| format!("POST {url}"))?
            .error_for_status()
            .with_context(|| format!("POST {url} returned an error status"))?;
        let v: JsonValue = resp.json().context("parsing submit response JSON")?;
        info!(%url, "submit succeeded");
        Ok(v)
    }

    pub fn fetch_operation_code(&self) -> Result<Option<String>> {
        let url = self.endpoint();
        debug!(%url, "fetching operation code");
        let resp = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url} returned an error status"))?;
        let v: JsonValue = resp.json().context("parsing operation code response JSON")?;
        Ok(operation_code_of(&v))
    }
}

/// Display form of `operation_code`. Falsy codes (missing, null, `false`,
/// zero and the empty string) yield `None` and are not shown.
pub fn operation_code_of(v: &JsonValue) -> Option<String> {
    match v.get("operation_code")? {
        JsonValue::Null | JsonValue::Bool(false) => None,
        JsonValue::Number(n) if n.as_f64() == Some(0.0) => None,
        JsonValue::String(s) if s.is_empty() => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub fn spawn_submit(client: ApiClient, payload: JsonValue, tx: Sender<LoadMsg>) {
    thread::spawn(move || {
        let outcome = client
            .submit(&payload)
            .map(LoadOutcome::Response)
            .map_err(|e| {
                warn!("submit failed: {e:#}");
                format!("{e:#}")
            });
        let _ = tx.send(LoadMsg {
            kind: LoadKind::Submit,
            outcome,
        });
    });
}

pub fn spawn_fetch_code(client: ApiClient, tx: Sender<LoadMsg>) {
    thread::spawn(move || {
        let outcome = client
            .fetch_operation_code()
            .map(LoadOutcome::OperationCode)
            .map_err(|e| {
                warn!("operation code fetch failed: {e:#}");
                format!("{e:#}")
            });
        let _ = tx.send(LoadMsg {
            kind: LoadKind::FetchCode,
            outcome,
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    // Serve exactly one canned HTTP response and hand back the raw request text.
    fn one_shot_server(status: &str, body: &str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(head_end) = find_head_end(&buf) {
                    let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
                    let len = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= head_end + 4 + len {
                        break;
                    }
                }
            }
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&buf).to_string()
        });
        (format!("http://{addr}"), handle)
    }

    fn find_head_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    #[test]
    fn endpoint_joins_base_and_path() {
        let c = ApiClient::new("https://example.com/ ").unwrap();
        assert_eq!(c.endpoint(), "https://example.com/bfhl");
    }

    #[test]
    fn submit_posts_json_and_returns_body() {
        let (base, handle) = one_shot_server("200 OK", r#"{"alphabets":["A"],"numbers":[]}"#);
        let c = ApiClient::new(&base).unwrap();
        let v = c.submit(&json!({"data": ["A"], "file_b64": null})).unwrap();
        assert_eq!(v["alphabets"], json!(["A"]));
        let req = handle.join().unwrap();
        assert!(req.starts_with("POST /bfhl"));
        assert!(req.to_lowercase().contains("content-type: application/json"));
        assert!(req.contains(r#""file_b64":null"#));
    }

    #[test]
    fn submit_treats_error_status_as_failure() {
        let (base, handle) = one_shot_server("500 Internal Server Error", r#"{"is_success":false}"#);
        let c = ApiClient::new(&base).unwrap();
        assert!(c.submit(&json!({})).is_err());
        let _ = handle.join();
    }

    #[test]
    fn fetch_code_issues_get_and_extracts_value() {
        let (base, handle) = one_shot_server("200 OK", r#"{"operation_code":1}"#);
        let c = ApiClient::new(&base).unwrap();
        assert_eq!(c.fetch_operation_code().unwrap().as_deref(), Some("1"));
        let req = handle.join().unwrap();
        assert!(req.starts_with("GET /bfhl"));
    }

    #[test]
    fn operation_code_display_rules() {
        assert_eq!(operation_code_of(&json!({"operation_code": "X1"})).as_deref(), Some("X1"));
        assert_eq!(operation_code_of(&json!({"operation_code": 7})).as_deref(), Some("7"));
        assert_eq!(operation_code_of(&json!({"operation_code": ""})), None);
        assert_eq!(operation_code_of(&json!({"operation_code": null})), None);
        assert_eq!(operation_code_of(&json!({})), None);
        assert_eq!(operation_code_of(&json!({"operation_code": 0})), None);
        assert_eq!(operation_code_of(&json!({"operation_code": false})), None);
        assert_eq!(operation_code_of(&json!({"operation_code": true})).as_deref(), Some("true"));
    }
}
