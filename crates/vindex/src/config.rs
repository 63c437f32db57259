//! Configuration handling for vindex.
//!
//! Settings are read from `config.toml` in the XDG config directory. Every
//! field has a default, so a missing file or a partial file is fine.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use vindex_core::{CreateIndexOptions, Distance, Error, SearchOptions};
use vindex_store::RedisIndexOptions;

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "VINDEX_CONFIG_DIR";

/// Environment variable overriding `redis.url`.
pub const REDIS_URL_ENV: &str = "VINDEX_REDIS_URL";

const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Redis connection configuration
    #[serde(default)]
    pub redis: RedisConfig,

    /// Index configuration
    #[serde(default)]
    pub index: IndexConfig,

    /// Search configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Redis-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Connection URL
    #[serde(default = "default_url")]
    pub url: String,

    /// RediSearch index name
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Prefix prepended to record ids to form hash keys
    #[serde(default)]
    pub key_prefix: String,

    /// Per-command timeout (ms)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_index_name() -> String {
    "vindex".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            index_name: default_index_name(),
            key_prefix: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Index-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Vector width
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Distance metric
    #[serde(default)]
    pub distance: Distance,

    /// Create the index on first use when absent
    #[serde(default = "default_create")]
    pub create: bool,
}

fn default_dimension() -> usize {
    384
}

fn default_create() -> bool {
    true
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            distance: Distance::default(),
            create: default_create(),
        }
    }
}

/// Search-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Default result count
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Return the `content` metadata key
    #[serde(default)]
    pub include_content: bool,

    /// Return stored vectors
    #[serde(default)]
    pub include_values: bool,
}

fn default_top_k() -> usize {
    vindex_core::DEFAULT_TOP_K
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            include_content: false,
            include_values: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load from the default path, applying environment overrides.
    pub fn load() -> Result<Self, Error> {
        Self::load_from(None)
    }

    /// Load from `path`, or the default path when `None`.
    ///
    /// A missing file at the default path yields the defaults; an explicit
    /// path must exist.
    pub fn load_from(path: Option<PathBuf>) -> Result<Self, Error> {
        let config = match path {
            Some(path) => Self::read(&path)?,
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::read(&path)?,
                _ => Self::default(),
            },
        };

        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    fn read(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse TOML text.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let config: Self =
            toml::from_str(text).map_err(|e| Error::Config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides looked up by environment variable name.
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(REDIS_URL_ENV).filter(|url| !url.is_empty()) {
            self.redis.url = url;
        }
        self
    }

    fn validate(&self) -> Result<(), Error> {
        self.create_options().validate()?;
        if self.search.top_k == 0 {
            return Err(Error::Config("search.top_k must be positive".to_string()));
        }
        if self.redis.index_name.is_empty() {
            return Err(Error::Config("redis.index_name must not be empty".to_string()));
        }
        Ok(())
    }

    /// Path of the config file in the config directory.
    pub fn config_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Index creation settings.
    pub fn create_options(&self) -> CreateIndexOptions {
        CreateIndexOptions::new(self.index.dimension, self.index.distance)
    }

    /// Backend options derived from the config.
    pub fn index_options(&self) -> RedisIndexOptions {
        RedisIndexOptions {
            include_content: self.search.include_content,
            include_values: self.search.include_values,
            key_prefix: self.redis.key_prefix.clone(),
            create_index: self.index.create.then(|| self.create_options()),
        }
    }

    /// Search options with the configured `top_k`, or `top_k` if given.
    pub fn search_options(&self, top_k: Option<usize>) -> SearchOptions {
        SearchOptions::new(top_k.unwrap_or(self.search.top_k))
    }

    /// Per-command timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.redis.timeout_ms)
    }

    /// Commented sample configuration file.
    pub fn sample_toml() -> &'static str {
        SAMPLE_TOML
    }
}

const SAMPLE_TOML: &str = r#"# vindex configuration

[redis]
# Connection URL (overridden by VINDEX_REDIS_URL)
url = "redis://127.0.0.1:6379/"
# RediSearch index name
index_name = "vindex"
# Prefix prepended to record ids to form hash keys
key_prefix = ""
# Per-command timeout in milliseconds
timeout_ms = 10000

[index]
# Vector width
dimension = 384
# cosine, euclidean or dot
distance = "cosine"
# Create the index on first use when absent
create = true

[search]
top_k = 4
include_content = false
include_values = false

[logging]
level = "info"
"#;

/// Get the XDG config directory for vindex.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }

    ProjectDirs::from("", "", "vindex").map(|dirs| dirs.config_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.redis.url, "redis://127.0.0.1:6379/");
        assert_eq!(config.redis.index_name, "vindex");
        assert_eq!(config.index.dimension, 384);
        assert_eq!(config.index.distance, Distance::Cosine);
        assert!(config.index.create);
        assert_eq!(config.search.top_k, 4);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_sample_matches_defaults() {
        let parsed = Config::parse(Config::sample_toml()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::parse("[index]\ndimension = 3\ndistance = \"dot\"\n").unwrap();

        assert_eq!(config.index.dimension, 3);
        assert_eq!(config.index.distance, Distance::Dot);
        assert_eq!(config.redis, RedisConfig::default());
        assert_eq!(config.search, SearchConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.redis.key_prefix = "doc:".to_string();
        config.index.distance = Distance::Euclidean;
        config.search.include_content = true;

        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            Config::parse("[index]\ndimension = 0\n"),
            Err(Error::Index(_))
        ));
        assert!(matches!(
            Config::parse("[search]\ntop_k = 0\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::parse("[index]\ndistance = \"manhattan\"\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_env_override() {
        let config = Config::default().with_env_overrides(|key| {
            (key == REDIS_URL_ENV).then(|| "redis://cache:6380/".to_string())
        });
        assert_eq!(config.redis.url, "redis://cache:6380/");

        let config = Config::default().with_env_overrides(|_| Some(String::new()));
        assert_eq!(config.redis.url, default_url());
    }

    #[test]
    fn test_index_options() {
        let mut config = Config::default();
        config.redis.key_prefix = "doc:".to_string();

        let options = config.index_options();
        assert_eq!(options.key_prefix, "doc:");
        assert_eq!(
            options.create_index,
            Some(CreateIndexOptions::new(384, Distance::Cosine))
        );

        config.index.create = false;
        assert_eq!(config.index_options().create_index, None);
    }

    #[test]
    fn test_search_options() {
        let config = Config::default();
        assert_eq!(config.search_options(None).top_k, 4);
        assert_eq!(config.search_options(Some(9)).top_k, 9);
    }
}
