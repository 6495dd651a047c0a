use crate::model::AppConfig;
use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;

pub fn log_path(cfg: &AppConfig) -> PathBuf {
    cfg.log_file
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("bfhl-tui.log"))
}

pub fn log_level(cfg: &AppConfig) -> Level {
    cfg.log_level.parse::<Level>().unwrap_or(Level::INFO)
}

/// Install the global subscriber. The terminal belongs to the UI, so events go to a file.
pub fn init(cfg: &AppConfig) -> Result<PathBuf> {
    let path = log_path(cfg);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {path:?}"))?;
    let builder = tracing_subscriber::fmt()
        .with_max_level(log_level(cfg))
        .with_ansi(false)
        .with_writer(Mutex::new(file));
    let installed = if cfg.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("installing tracing subscriber: {e}"))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_defaults_to_temp_dir() {
        let cfg = AppConfig::default();
        assert_eq!(log_path(&cfg), std::env::temp_dir().join("bfhl-tui.log"));
        let cfg = AppConfig {
            log_file: Some("/var/tmp/x.log".into()),
            ..Default::default()
        };
        assert_eq!(log_path(&cfg), PathBuf::from("/var/tmp/x.log"));
    }

    #[test]
    fn log_level_falls_back_to_info() {
        let mut cfg = AppConfig::default();
        cfg.log_level = "debug".into();
        assert_eq!(log_level(&cfg), Level::DEBUG);
        cfg.log_level = "nonsense".into();
        assert_eq!(log_level(&cfg), Level::INFO);
    }
}
