use std::{fs, io, path::Path};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

pub const SETTINGS_FILE: &str = "todo-tools.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_filter: String,
    pub output: OutputFormat,
    /// Start from the sample tasks instead of an empty session.
    pub seed: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "info".into(),
            output: OutputFormat::Text,
            seed: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    log_filter: Option<String>,
    output: Option<String>,
    seed: Option<bool>,
}

/// Defaults, then `todo-tools.toml` in the working directory, then the
/// environment.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, env)?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    if let Some(v) = file_cfg.output {
        settings.output = parse_output(&v)?;
    }
    if let Some(v) = file_cfg.seed {
        settings.seed = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(v) = env("TODO_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    if let Some(v) = env("APP__OUTPUT") {
        settings.output = parse_output(&v).context("invalid APP__OUTPUT")?;
    }

    if let Some(v) = env("APP__SEED") {
        settings.seed = parse_flag(&v).with_context(|| format!("invalid APP__SEED '{v}'"))?;
    }

    Ok(())
}

fn parse_output(raw: &str) -> Result<OutputFormat> {
    OutputFormat::from_str(raw.trim(), true).map_err(|err| anyhow::anyhow!(err))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
