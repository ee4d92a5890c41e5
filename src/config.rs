use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::model::{Difficulty, Settings, DEFAULT_AMOUNT};
use crate::provider::opentdb::DEFAULT_BASE_URL;

/// User preferences remembered between runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub amount: u32,
    pub api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            category: None,
            difficulty: None,
            amount: DEFAULT_AMOUNT,
            api_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    pub fn settings(&self) -> Settings {
        Settings::new(self.category.clone(), self.difficulty, self.amount)
    }

    /// Remember the settings of the session that was just started
    pub fn remember(&mut self, settings: &Settings) {
        self.category = settings.category.clone();
        self.difficulty = settings.difficulty;
        self.amount = settings.amount;
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("kwiz_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "ignoring unreadable config")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn remembered_settings_survive_reload() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let mut cfg = Config::default();
        cfg.remember(&Settings::from_form("21", "hard", "15"));
        store.save(&cfg).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.category.as_deref(), Some("21"));
        assert_eq!(loaded.difficulty, Some(Difficulty::Hard));
        assert_eq!(loaded.settings().amount, 15);
    }

    #[test]
    fn missing_or_corrupt_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"amount": 20}"#).unwrap();
        let loaded = FileConfigStore::with_path(&path).load();
        assert_eq!(loaded.amount, 20);
        assert_eq!(loaded.api_url, DEFAULT_BASE_URL);
    }
}
