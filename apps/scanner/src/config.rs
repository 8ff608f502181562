//! # Scanner Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     STOCKSCAN_DB_PATH=/data/stock.db                                    │
//! │     STOCKSCAN_LOOKUP_URL=https://.../{sku}                              │
//! │     STOCKSCAN_INITIAL_MODE=output                                       │
//! │                                                                         │
//! │  2. TOML Config File ($STOCKSCAN_CONFIG or the platform path)           │
//! │     ~/.config/stockscan/scanner.toml (Linux)                            │
//! │     ~/Library/Application Support/com.stockscan.scanner/scanner.toml    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/var/lib/stockscan/stockscan.db"
//!
//! [scanner]
//! initial_mode = "input"
//! show_limit = 5
//! history_capacity = 100
//!
//! [lookup]
//! url_template = "https://products.example.com/api/v1/{sku}.json"
//! timeout_secs = 10
//!
//! [mappings.modes]
//! "MODE-IN" = "input"
//! "MODE-OUT" = "output"
//!
//! [mappings.commands]
//! "CMD-UNDO" = "back"
//!
//! [mappings.configs]
//! "SHOW-20" = { show_limit = 20 }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use stockscan_core::validation::validate_limit;
use stockscan_core::{
    ConfigAction, Mappings, ModeKind, ValidationError, DEFAULT_HISTORY_CAPACITY,
    DEFAULT_SHOW_LIMIT,
};
use stockscan_enrich::LookupConfig;

use crate::error::{AppError, AppResult};

/// Upper bound for `show_limit` (also for `{ show_limit = N }` tokens).
pub const MAX_SHOW_LIMIT: u32 = 500;

const DB_FILE_NAME: &str = "stockscan.db";
const CONFIG_FILE_NAME: &str = "scanner.toml";

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerSettings {
    /// Mode active at startup.
    #[serde(default)]
    pub initial_mode: ModeKind,

    /// Ledger rows printed by `show`.
    #[serde(default = "default_show_limit")]
    pub show_limit: u32,

    /// Undo depth.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

fn default_show_limit() -> u32 {
    DEFAULT_SHOW_LIMIT
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

impl Default for ScannerSettings {
    fn default() -> Self {
        ScannerSettings {
            initial_mode: ModeKind::default(),
            show_limit: default_show_limit(),
            history_capacity: default_history_capacity(),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

/// Complete scanner configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub scanner: ScannerSettings,

    #[serde(default)]
    pub lookup: LookupConfig,

    #[serde(default)]
    pub mappings: Mappings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else `$STOCKSCAN_CONFIG`, else the
    ///    platform config directory). A missing file is not an error.
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let path = config_path
            .or_else(|| std::env::var_os("STOCKSCAN_CONFIG").map(PathBuf::from))
            .or_else(Self::default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load scanner config, using defaults");
            Self::default()
        })
    }

    /// Parses one TOML file without applying overrides.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        info!(?path, "Loading scanner config");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Rejects settings the scanner cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        validate_limit("show_limit", self.scanner.show_limit, MAX_SHOW_LIMIT)?;

        if self.scanner.history_capacity == 0 {
            return Err(ValidationError::OutOfRange {
                field: "history_capacity".to_string(),
                min: 1,
                max: i64::MAX,
            }
            .into());
        }

        if self.mappings.tokens().any(|token| token.trim().is_empty()) {
            return Err(ValidationError::Required {
                field: "mapping token".to_string(),
            }
            .into());
        }

        for action in self.mappings.configs.values() {
            if let ConfigAction::ShowLimit(limit) = action {
                validate_limit("show_limit", *limit, MAX_SHOW_LIMIT)?;
            }
        }

        self.lookup
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// Applies `STOCKSCAN_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key/value source.
    pub fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = var("STOCKSCAN_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(url) = var("STOCKSCAN_LOOKUP_URL") {
            debug!(url = %url, "Overriding lookup URL from environment");
            self.lookup.url_template = Some(url).filter(|u| !u.trim().is_empty());
        }

        if let Some(mode) = var("STOCKSCAN_INITIAL_MODE") {
            match mode.parse() {
                Ok(kind) => self.scanner.initial_mode = kind,
                Err(e) => warn!(mode = %mode, error = %e, "Ignoring unknown initial mode"),
            }
        }
    }

    /// Resolved database file, creating the data directory when the
    /// platform default is used.
    pub fn database_path(&self) -> AppResult<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let dirs = Self::project_dirs()
            .ok_or_else(|| AppError::Config("could not determine data directory".into()))?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Ok(data_dir.join(DB_FILE_NAME))
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "stockscan", "scanner")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use stockscan_core::Command;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.scanner.initial_mode, ModeKind::Input);
        assert_eq!(config.scanner.show_limit, 5);
        assert_eq!(config.scanner.history_capacity, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [database]
            path = "/tmp/scans.db"

            [scanner]
            initial_mode = "output"
            show_limit = 10

            [mappings.commands]
            "CMD-UNDO" = "back"
            "#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();

        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/scans.db")));
        assert_eq!(config.scanner.initial_mode, ModeKind::Output);
        assert_eq!(config.scanner.show_limit, 10);
        assert_eq!(config.scanner.history_capacity, 100);
        assert_eq!(config.mappings.commands.len(), 1);
        assert_eq!(config.mappings.commands["CMD-UNDO"], Command::Back);
        // untouched sections keep the stock token set
        assert_eq!(config.mappings.modes.len(), 5);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.scanner, ScannerSettings::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scanner\nshow_limit = ").unwrap();

        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.scanner.show_limit = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.scanner.history_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.mappings.commands.insert(" ".to_string(), Command::Show);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config
            .mappings
            .configs
            .insert("SHOW-0".to_string(), ConfigAction::ShowLimit(0));
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.lookup.url_template = Some("https://example.com/none".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("STOCKSCAN_DB_PATH", "/data/x.db"),
            ("STOCKSCAN_LOOKUP_URL", "https://example.com/{sku}"),
            ("STOCKSCAN_INITIAL_MODE", "set"),
        ]);

        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_path().unwrap(), PathBuf::from("/data/x.db"));
        assert_eq!(
            config.lookup.url_template.as_deref(),
            Some("https://example.com/{sku}")
        );
        assert_eq!(config.scanner.initial_mode, ModeKind::Set);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_initial_mode_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| (key == "STOCKSCAN_INITIAL_MODE").then(|| "sell".into()));
        assert_eq!(config.scanner.initial_mode, ModeKind::Input);
    }
}
