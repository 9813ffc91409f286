use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, SiftError};

pub const DATA_DIR: &str = "data_dir";
pub const USER_NAME: &str = "user_name";
pub const GROUP_NAME: &str = "group_name";
/// JSON array of explicitly added category labels.
pub const CATEGORIES: &str = "categories";
pub const SORT_COLUMN: &str = "sort_column";
pub const SORT_DESCENDING: &str = "sort_descending";

/// String key/value persistence handed to the parts of the app that need
/// profile data or cached labels.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default = "default_sort_column")]
    pub sort_column: String,
    #[serde(default = "default_sort_descending")]
    pub sort_descending: bool,
}

fn default_sort_column() -> String {
    "transaction_date".to_string()
}

fn default_sort_descending() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            user_name: String::new(),
            group_name: String::new(),
            categories: Vec::new(),
            sort_column: default_sort_column(),
            sort_descending: default_sort_descending(),
        }
    }
}

/// In-memory view; nothing is written to disk.
impl SettingsStore for Settings {
    fn get(&self, key: &str) -> Option<String> {
        match key {
            DATA_DIR => Some(self.data_dir.clone()),
            USER_NAME => Some(self.user_name.clone()),
            GROUP_NAME => Some(self.group_name.clone()),
            CATEGORIES => serde_json::to_string(&self.categories).ok(),
            SORT_COLUMN => Some(self.sort_column.clone()),
            SORT_DESCENDING => Some(self.sort_descending.to_string()),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            DATA_DIR => self.data_dir = value.to_string(),
            USER_NAME => self.user_name = value.to_string(),
            GROUP_NAME => self.group_name = value.to_string(),
            CATEGORIES => {
                self.categories = serde_json::from_str(value)
                    .map_err(|e| SiftError::Settings(format!("{key}: {e}")))?
            }
            SORT_COLUMN => self.sort_column = value.to_string(),
            SORT_DESCENDING => {
                self.sort_descending = value
                    .parse()
                    .map_err(|_| SiftError::Settings(format!("{key}: expected true or false")))?
            }
            _ => return Err(SiftError::Settings(format!("unknown setting: {key}"))),
        }
        Ok(())
    }
}

impl Settings {
    /// Group label to show: the explicit one, else derived from the name.
    pub fn group_label(&self) -> String {
        if !self.group_name.is_empty() {
            self.group_name.clone()
        } else if !self.user_name.is_empty() {
            format!("{}'s Family Expenses", self.user_name)
        } else {
            String::new()
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("sift")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("sift")
}

/// Settings backed by a JSON file; every `set` is written through.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    settings: Settings,
}

impl FileSettings {
    pub fn load() -> Self {
        Self::load_from(settings_path())
    }

    pub fn load_from(path: PathBuf) -> Self {
        let settings = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
                Settings::default()
            }),
            Err(_) => Settings::default(),
        };
        Self { path, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.settings)
            .map_err(|e| SiftError::Settings(e.to_string()))?;
        std::fs::write(&self.path, format!("{json}\n"))?;
        Ok(())
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.settings.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.settings.set(key, value)?;
        self.save()
    }
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
