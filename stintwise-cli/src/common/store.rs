use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use stintwise_engine::{SettingsStore, StrategySettings};
use thiserror::Error;

/// Errors raised while reading or writing a settings file.
#[derive(Debug, Error)]
pub enum SettingsFileError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("settings file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings kept as a JSON object keyed by slot name.
///
/// A missing file reads as an empty store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, StrategySettings>, SettingsFileError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(self.io_error(source)),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| SettingsFileError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(
        &self,
        slots: &BTreeMap<String, StrategySettings>,
    ) -> Result<(), SettingsFileError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let payload = serde_json::to_string_pretty(slots).map_err(|source| {
            SettingsFileError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, payload).map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: io::Error) -> SettingsFileError {
        SettingsFileError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SettingsStore for JsonFileStore {
    type Error = SettingsFileError;

    fn save_settings(&self, key: &str, settings: &StrategySettings) -> Result<(), Self::Error> {
        let mut slots = self.read_all()?;
        slots.insert(key.to_string(), settings.clone());
        self.write_all(&slots)?;
        log::debug!("saved settings slot {key} to {}", self.path.display());
        Ok(())
    }

    fn load_settings(&self, key: &str) -> Result<Option<StrategySettings>, Self::Error> {
        Ok(self.read_all()?.remove(key))
    }

    fn delete_settings(&self, key: &str) -> Result<(), Self::Error> {
        let mut slots = self.read_all()?;
        if slots.remove(key).is_some() {
            self.write_all(&slots)?;
        }
        Ok(())
    }
}
