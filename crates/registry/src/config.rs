//! Configuration for the serving agent
//!
//! Every option is listed here explicitly. Values are layered with a fixed
//! precedence: explicit overrides, then `INFERD_*` environment variables,
//! then the TOML config file, then built-in defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "INFERD_CONFIG";
pub const TEMP_DIR_ENV: &str = "INFERD_TEMP_DIR";
pub const DEBUG_ENV: &str = "INFERD_DEBUG";
pub const VERBOSE_ENV: &str = "INFERD_VERBOSE";
pub const LOG_LEVEL_ENV: &str = "INFERD_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "INFERD_LOG_FORMAT";
/// Platform path list (`:` separated on unix) of manifest files or directories.
pub const MANIFEST_PATH_ENV: &str = "INFERD_MANIFEST_PATH";

const DEFAULT_APP_NAME: &str = "inferd";
const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("IO error reading config file {path}: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("Configuration parsing error: {message}")]
    ParseError { message: String },
}

/// Top-level agent configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub app: AppConfig,
    pub logging: LoggingConfig,
    pub manifests: ManifestConfig,
}

/// Application identity and scratch space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name, used for env files and the default temp directory
    pub name: String,
    /// Root for per-framework and per-model work directories
    pub temp_dir: Option<PathBuf>,
    pub debug: bool,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_APP_NAME.to_string(),
            temp_dir: None,
            debug: false,
            verbose: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(ConfigError::InvalidValue {
                key: "logging.format".to_string(),
                reason: format!("unknown log format '{}'", other),
            }),
        }
    }
}

/// Where manifests are loaded from at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Manifest files or directories of manifest files
    pub paths: Vec<PathBuf>,
}

/// Values supplied explicitly, e.g. from command-line flags. They win over
/// every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub temp_dir: Option<PathBuf>,
    pub debug: Option<bool>,
    pub verbose: Option<bool>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    /// Replaces the configured manifest paths when non-empty
    pub manifest_paths: Vec<PathBuf>,
}

impl AgentConfig {
    /// Load with the full precedence chain.
    ///
    /// The config file is `file` if given, else `$INFERD_CONFIG`, else
    /// `~/.inferd.toml` when it exists.
    pub fn load(file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        load_env_files(DEFAULT_APP_NAME);

        let file = file
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(default_config_file);

        let mut config = match file {
            Some(path) => Self::from_file(expand_home(&path))?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file; missing sections take defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }

    /// Defaults overlaid with environment variables only.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Overlay `INFERD_*` environment variables.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(temp_dir) = env::var(TEMP_DIR_ENV) {
            self.app.temp_dir = Some(PathBuf::from(temp_dir));
        }
        if let Ok(debug) = env::var(DEBUG_ENV) {
            self.app.debug = parse_bool(DEBUG_ENV, &debug)?;
        }
        if let Ok(verbose) = env::var(VERBOSE_ENV) {
            self.app.verbose = parse_bool(VERBOSE_ENV, &verbose)?;
        }
        if let Ok(level) = env::var(LOG_LEVEL_ENV) {
            self.logging.level = level.trim().to_ascii_lowercase();
        }
        if let Ok(format) = env::var(LOG_FORMAT_ENV) {
            self.logging.format = format.parse()?;
        }
        if let Some(paths) = env::var_os(MANIFEST_PATH_ENV) {
            self.manifests.paths = env::split_paths(&paths)
                .filter(|path| !path.as_os_str().is_empty())
                .collect();
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(temp_dir) = &overrides.temp_dir {
            self.app.temp_dir = Some(temp_dir.clone());
        }
        if let Some(debug) = overrides.debug {
            self.app.debug = debug;
        }
        if let Some(verbose) = overrides.verbose {
            self.app.verbose = verbose;
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.to_ascii_lowercase();
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
        if !overrides.manifest_paths.is_empty() {
            self.manifests.paths = overrides.manifest_paths.clone();
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "app.name".to_string(),
                reason: "Application name cannot be empty".to_string(),
            });
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                reason: format!("Must be one of: {}", VALID_LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Root directory for work directories: the configured `temp_dir` with
    /// `~` expanded, or `<system temp>/<app name>`.
    pub fn resolved_temp_dir(&self) -> PathBuf {
        match &self.app.temp_dir {
            Some(dir) => expand_home(dir),
            None => env::temp_dir().join(&self.app.name),
        }
    }

    /// Manifest paths with `~` expanded.
    pub fn manifest_paths(&self) -> Vec<PathBuf> {
        self.manifests.paths.iter().map(|p| expand_home(p)).collect()
    }
}

/// Read `~/.<app>.env` and `./.env` into the process environment. Variables
/// that are already set keep their values.
pub fn load_env_files(app_name: &str) {
    let mut candidates = Vec::new();
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(format!(".{}.env", app_name)));
    }
    candidates.push(PathBuf::from(".env"));

    for path in candidates.into_iter().filter(|p| p.is_file()) {
        match dotenvy::from_path(&path) {
            Ok(()) => tracing::debug!(env_file = %path.display(), "loaded environment file"),
            Err(e) => tracing::warn!(env_file = %path.display(), error = %e, "failed to load environment file"),
        }
    }
}

fn default_config_file() -> Option<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(format!(".{}.toml", DEFAULT_APP_NAME)))
        .filter(|path| path.is_file())
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("'{}' is not a boolean", value),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn clear_env() {
        for key in [
            CONFIG_ENV,
            TEMP_DIR_ENV,
            DEBUG_ENV,
            VERBOSE_ENV,
            LOG_LEVEL_ENV,
            LOG_FORMAT_ENV,
            MANIFEST_PATH_ENV,
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.app.name, "inferd");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.manifests.paths.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AgentConfig::default();
        config.logging.level = "loud".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "logging.level"
        ));
    }

    #[test]
    fn test_partial_file_takes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inferd.toml");
        fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

        let config = AgentConfig::from_file(&path).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.app.name, "inferd");
    }

    #[test]
    fn test_bad_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inferd.toml");
        fs::write(&path, "[logging\n").unwrap();
        assert!(matches!(
            AgentConfig::from_file(&path),
            Err(ConfigError::ParseError { .. })
        ));
        assert!(matches!(
            AgentConfig::from_file(dir.path().join("missing.toml")),
            Err(ConfigError::IoError { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_precedence() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inferd.toml");
        fs::write(
            &path,
            "[app]\ntemp_dir = \"/from/file\"\ndebug = true\n[logging]\nlevel = \"warn\"\nformat = \"compact\"\n",
        )
        .unwrap();

        env::set_var(LOG_LEVEL_ENV, "debug");
        env::set_var(TEMP_DIR_ENV, "/from/env");

        let overrides = ConfigOverrides {
            temp_dir: Some(PathBuf::from("/from/flag")),
            ..Default::default()
        };
        let config = AgentConfig::load(Some(&path), &overrides).unwrap();

        // flag > env > file > default
        assert_eq!(config.app.temp_dir, Some(PathBuf::from("/from/flag")));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.app.debug);
        assert!(!config.app.verbose);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_values() {
        clear_env();
        env::set_var(VERBOSE_ENV, "yes");
        env::set_var(LOG_FORMAT_ENV, "JSON");
        let joined = env::join_paths(["/a", "/b"]).unwrap();
        env::set_var(MANIFEST_PATH_ENV, &joined);

        let config = AgentConfig::from_env().unwrap();
        assert!(config.app.verbose);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(
            config.manifests.paths,
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );

        env::set_var(DEBUG_ENV, "sometimes");
        assert!(AgentConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    fn test_resolved_temp_dir() {
        let mut config = AgentConfig::default();
        assert_eq!(config.resolved_temp_dir(), env::temp_dir().join("inferd"));

        config.app.temp_dir = Some(PathBuf::from("/srv/inferd"));
        assert_eq!(config.resolved_temp_dir(), PathBuf::from("/srv/inferd"));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Path::new("/abs")), PathBuf::from("/abs"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/models")), home.join("models"));
        }
    }
}
