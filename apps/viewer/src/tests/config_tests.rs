use std::{collections::HashMap, io::Write};

use super::*;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn defaults_match_builtin_command_settings() {
    let settings = Settings::default();
    assert_eq!(settings.log_filter, "info");
    assert_eq!(settings.pointer_buffer, 1024);
    assert_eq!(settings.command_settings(), CommandSettings::default());
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        "log_filter = \"debug\"\nzoom_window_margin = 1.25\npointer_buffer = 16\n",
    )
    .expect("valid toml");

    assert_eq!(settings.log_filter, "debug");
    assert_eq!(settings.zoom_window_margin, 1.25);
    assert_eq!(settings.pointer_buffer, 16);
}

#[test]
fn invalid_values_keep_previous_setting() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "zoom_window_margin = -2.0\npointer_buffer = 0\n")
        .expect("valid toml");
    apply_env(
        &mut settings,
        env(&[("APP__ZOOM_WINDOW_MARGIN", "wide"), ("APP__POINTER_BUFFER", "0")]),
    );

    assert_eq!(settings, Settings::default());
}

#[test]
fn environment_wins_over_file() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "zoom_window_margin = 1.5\n").expect("valid toml");
    apply_env(
        &mut settings,
        env(&[
            ("VIEWER_LOG", "warn"),
            ("APP__LOG_FILTER", "command_core=debug"),
            ("APP__ZOOM_WINDOW_MARGIN", "2"),
            ("APP__POINTER_BUFFER", "8"),
        ]),
    );

    assert_eq!(settings.log_filter, "command_core=debug");
    assert_eq!(settings.zoom_window_margin, 2.0);
    assert_eq!(settings.pointer_buffer, 8);
}

#[test]
fn malformed_file_is_an_error() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "zoom_window_margin = \"wide\"").is_err());
}

#[test]
fn explicit_config_path_is_loaded_and_must_exist() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "pointer_buffer = 32").expect("write");

    let settings = load_settings(Some(file.path())).expect("load");
    assert_eq!(settings.pointer_buffer, 32);

    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("missing.toml");
    assert!(load_settings(Some(&missing)).is_err());
}
