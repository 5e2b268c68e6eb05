//! TOML-based user preferences.
//!
//! Stored at `<data dir>/config.toml`. Unknown keys are ignored on load and
//! missing keys fall back to their defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::data_dir;
use super::tracker_db::DEFAULT_DB_FILE;
use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file name, relative to the data directory unless absolute.
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// List every template on the day view, ignoring weekday rules.
    #[serde(default)]
    pub show_all: bool,
    /// Sort unfinished occurrences ahead of finished ones.
    #[serde(default = "default_true")]
    pub incomplete_first: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Target count for templates created without one.
    #[serde(default = "default_count")]
    pub count: u32,
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

fn default_database_file() -> String {
    DEFAULT_DB_FILE.to_string()
}
fn default_true() -> bool {
    true
}
fn default_count() -> u32 {
    1
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_file: default_database_file(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_all: false,
            incomplete_first: true,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
        }
    }
}

fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    if key.is_empty() {
        return None;
    }
    key.split('.').try_fold(root, |node, part| node.get(part))
}

/// Replace the leaf at `key`, coercing `raw` to the type already stored there.
fn assign(root: &mut Value, key: &str, raw: &str) -> Result<(), ConfigError> {
    let unknown = || ConfigError::UnknownKey(key.to_string());
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let (parent, leaf) = match key.rsplit_once('.') {
        Some((parent, leaf)) => (Some(parent), leaf),
        None => (None, key),
    };
    if leaf.is_empty() {
        return Err(unknown());
    }
    let mut node = root;
    if let Some(parent) = parent {
        for part in parent.split('.') {
            node = node.get_mut(part).ok_or_else(unknown)?;
        }
    }
    let slot = node
        .as_object_mut()
        .and_then(|obj| obj.get_mut(leaf))
        .ok_or_else(unknown)?;

    *slot = match &*slot {
        Value::Bool(_) => Value::Bool(
            raw.parse::<bool>()
                .map_err(|_| invalid(format!("expected true or false, got '{raw}'")))?,
        ),
        Value::Number(_) => Value::Number(
            raw.parse::<u64>()
                .map_err(|_| invalid(format!("expected a whole number, got '{raw}'")))?
                .into(),
        ),
        Value::Object(_) => return Err(invalid("cannot assign a whole section".to_string())),
        _ => Value::String(raw.to_string()),
    };
    Ok(())
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults on first use.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default file cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, creating it with defaults when absent.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(path)?;
            return Ok(cfg);
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.defaults.count == 0 {
            return Err(ConfigError::InvalidValue {
                key: "defaults.count".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.storage.database_file.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "storage.database_file".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Resolve the database file against `dir`.
    pub fn database_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.storage.database_file)
    }

    /// Get a value as a string by dot-separated key, e.g. `display.show_all`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match lookup(&json, key)? {
            Value::String(s) => Some(s.clone()),
            Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Every leaf key with its current value, in section order.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Ok(Value::Object(sections)) = serde_json::to_value(self) {
            for (section, fields) in sections {
                if let Value::Object(fields) = fields {
                    for (name, value) in fields {
                        let value = match value {
                            Value::String(s) => s,
                            other => other.to_string(),
                        };
                        out.push((format!("{section}.{name}"), value));
                    }
                }
            }
        }
        out
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// # Errors
    /// Returns an error for unknown keys, values of the wrong type, or values
    /// that break a constraint such as `defaults.count >= 1`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        assign(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.storage.database_file, "routina.db");
        assert!(!cfg.display.show_all);
        assert!(cfg.display.incomplete_first);
        assert_eq!(cfg.defaults.count, 1);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str("[display]\nshow_all = true\n").unwrap();
        assert!(cfg.display.show_all);
        assert!(cfg.display.incomplete_first);
        assert_eq!(cfg.defaults.count, 1);
    }

    #[test]
    fn get_supports_dot_paths() {
        let cfg = Config::default();
        assert_eq!(cfg.get("display.show_all").as_deref(), Some("false"));
        assert_eq!(cfg.get("defaults.count").as_deref(), Some("1"));
        assert_eq!(cfg.get("storage.database_file").as_deref(), Some("routina.db"));
        assert!(cfg.get("display").is_none());
        assert!(cfg.get("display.missing").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_coerces_to_existing_type() {
        let mut cfg = Config::default();
        cfg.set("display.show_all", "true").unwrap();
        cfg.set("defaults.count", "3").unwrap();
        cfg.set("storage.database_file", "other.db").unwrap();
        assert!(cfg.display.show_all);
        assert_eq!(cfg.defaults.count, 3);
        assert_eq!(cfg.storage.database_file, "other.db");
    }

    #[test]
    fn set_rejects_bad_input() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("display.nope", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("display.show_all", "yes"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("defaults.count", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("display", "x"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg.defaults.count, 1);
    }

    #[test]
    fn entries_lists_every_leaf() {
        let keys: Vec<_> = Config::default().entries().into_iter().map(|(k, _)| k).collect();
        assert!(keys.contains(&"display.show_all".to_string()));
        assert!(keys.contains(&"defaults.count".to_string()));
        assert!(keys.contains(&"storage.database_file".to_string()));
    }

    #[test]
    fn load_from_creates_then_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.defaults.count, 1);

        let mut cfg = cfg;
        cfg.set("defaults.count", "4").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().defaults.count, 4);
    }

    #[test]
    fn load_from_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[defaults]\ncount = 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
        std::fs::write(&path, "not toml [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
