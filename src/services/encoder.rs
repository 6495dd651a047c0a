use crate::ui::{LoadKind, LoadMsg, LoadOutcome};
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use std::path::Path;
use std::sync::mpsc::Sender;
use std::thread;

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "svg", "ico", "tif", "tiff", "avif",
];

pub fn encode_bytes(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Drop a leading `data:<mime>;base64,` scheme, leaving only the payload.
pub fn strip_data_uri_prefix(text: &str) -> &str {
    if !text.starts_with("data:") {
        return text;
    }
    match text.find(',') {
        Some(idx) => &text[idx + 1..],
        None => text,
    }
}

pub fn encode_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {path:?}"))?;
    Ok(encode_bytes(&bytes))
}

/// Encode whatever the user put in the file field: a pasted data URI or a path.
pub fn encode_source(source: &str) -> Result<String> {
    let source = source.trim();
    if source.starts_with("data:") {
        let payload = strip_data_uri_prefix(source);
        general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| anyhow!("data URI payload is not base64: {e}"))?;
        return Ok(payload.to_string());
    }
    encode_file(Path::new(source))
}

/// Mirrors an `image/*` picker filter; advisory only, never enforced.
pub fn is_image_path(source: &str) -> bool {
    if let Some(rest) = source.trim().strip_prefix("data:") {
        return rest.starts_with("image/");
    }
    Path::new(source.trim())
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn spawn_encode_file(source: String, seq: u64, tx: Sender<LoadMsg>) {
    thread::spawn(move || {
        let outcome = encode_source(&source)
            .map(LoadOutcome::Encoded)
            .map_err(|e| format!("{e:#}"));
        let _ = tx.send(LoadMsg {
            kind: LoadKind::FileEncode { seq },
            outcome,
        });
    });
}
