use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use command_core::CommandSettings;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "viewer.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub log_filter: String,
    pub zoom_window_margin: f64,
    pub pointer_buffer: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "info".into(),
            zoom_window_margin: command_core::builtins::DEFAULT_ZOOM_WINDOW_MARGIN,
            pointer_buffer: 1024,
        }
    }
}

impl Settings {
    pub fn command_settings(&self) -> CommandSettings {
        CommandSettings {
            zoom_window_margin: self.zoom_window_margin,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    log_filter: Option<String>,
    zoom_window_margin: Option<f64>,
    pointer_buffer: Option<usize>,
}

/// Defaults, then the config file, then the environment. An explicit `path`
/// must exist; the default `viewer.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if required => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    if let Some(v) = file_cfg.zoom_window_margin {
        set_margin(settings, v);
    }
    if let Some(v) = file_cfg.pointer_buffer {
        set_pointer_buffer(settings, v);
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("VIEWER_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    if let Some(v) = lookup("APP__ZOOM_WINDOW_MARGIN") {
        if let Ok(parsed) = v.parse::<f64>() {
            set_margin(settings, parsed);
        }
    }

    if let Some(v) = lookup("APP__POINTER_BUFFER") {
        if let Ok(parsed) = v.parse::<usize>() {
            set_pointer_buffer(settings, parsed);
        }
    }
}

fn set_margin(settings: &mut Settings, margin: f64) {
    if margin.is_finite() && margin > 0.0 {
        settings.zoom_window_margin = margin;
    } else {
        warn!(margin, "ignoring zoom window margin; must be finite and positive");
    }
}

fn set_pointer_buffer(settings: &mut Settings, capacity: usize) {
    if capacity > 0 {
        settings.pointer_buffer = capacity;
    } else {
        warn!("ignoring pointer buffer of 0");
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
