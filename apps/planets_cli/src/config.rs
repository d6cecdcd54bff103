use std::{
    collections::HashMap,
    fs,
    path::Path,
};

use anyhow::Context;
use client_core::DEFAULT_API_BASE_URL;

const DEFAULT_CONFIG_FILE: &str = "planets.toml";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

/// Settings plus a problem with the implicit config file that did not stop loading.
///
/// The warning is handed back instead of logged because tracing is configured
/// from these very settings.
#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub warning: Option<anyhow::Error>,
}

/// Defaults, then the config file, then environment overrides.
///
/// An explicit `config_path` must exist and parse; the implicit
/// `planets.toml` in the working directory is optional, and a malformed one
/// is reported through [`LoadedSettings::warning`].
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<LoadedSettings> {
    load_settings_with(config_path, Path::new(DEFAULT_CONFIG_FILE), |key| {
        std::env::var(key).ok()
    })
}

fn load_settings_with(
    config_path: Option<&Path>,
    implicit_path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<LoadedSettings> {
    let mut settings = Settings::default();
    let mut warning = None;

    match config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            apply_file(&mut settings, &raw)
                .with_context(|| format!("invalid config file {}", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(implicit_path) {
                if let Err(err) = apply_file(&mut settings, &raw) {
                    settings = Settings::default();
                    warning = Some(err.context(format!(
                        "ignoring invalid config file {}",
                        implicit_path.display()
                    )));
                }
            }
        }
    }

    apply_env(&mut settings, lookup);
    Ok(LoadedSettings { settings, warning })
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, String>>(raw)?;
    if let Some(v) = file_cfg.get("api_base_url") {
        settings.api_base_url = normalize_api_base_url(v);
    }
    if let Some(v) = file_cfg.get("log_filter") {
        settings.log_filter = v.clone();
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("PLANETS_API_URL") {
        settings.api_base_url = normalize_api_base_url(&v);
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = normalize_api_base_url(&v);
    }
    if let Some(v) = lookup("APP__LOG_FILTER") {
        if !v.trim().is_empty() {
            settings.log_filter = v;
        }
    }
}

pub fn normalize_api_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Settings::default().api_base_url;
    }
    trimmed.to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
