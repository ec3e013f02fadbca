use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use serde::Deserialize;
use storage::DEFAULT_STORAGE_KEY;

pub const SETTINGS_FILE: &str = "registry.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub storage_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            storage_key: DEFAULT_STORAGE_KEY.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    data_dir: Option<PathBuf>,
    storage_key: Option<String>,
}

/// Defaults, then `registry.toml` in the working directory, then the
/// environment.
pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

pub fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(file_cfg) = read_file_settings(file)? {
        if let Some(v) = file_cfg.data_dir {
            settings.data_dir = v;
        }
        if let Some(v) = file_cfg.storage_key {
            settings.storage_key = v;
        }
    }

    if let Some(v) = env("REGISTRY_DATA_DIR") {
        settings.data_dir = v.into();
    }
    if let Some(v) = env("APP__DATA_DIR") {
        settings.data_dir = v.into();
    }

    if let Some(v) = env("REGISTRY_STORAGE_KEY") {
        settings.storage_key = v;
    }
    if let Some(v) = env("APP__STORAGE_KEY") {
        settings.storage_key = v;
    }

    settings.storage_key = settings.storage_key.trim().to_string();
    if settings.storage_key.is_empty() {
        bail!("storage key must not be empty");
    }

    Ok(settings)
}

fn read_file_settings(file: &Path) -> anyhow::Result<Option<FileSettings>> {
    let raw = match fs::read_to_string(file) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", file.display()))
        }
    };

    let parsed: FileSettings = toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", file.display()))?;
    Ok(Some(parsed))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
