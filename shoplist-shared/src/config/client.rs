use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, io, path::PathBuf};
use strum::{Display, EnumString};
use thiserror::Error;
use url::Url;

const ENV_API_URL: &str = "SHOPLIST_API_URL";
const ENV_LOG_LEVEL: &str = "SHOPLIST_LOG_LEVEL";
const ENV_STORAGE_DIR: &str = "SHOPLIST_STORAGE_DIR";
const ENV_REQUEST_TIMEOUT: &str = "SHOPLIST_REQUEST_TIMEOUT";

const DEFAULT_API_URL: &str = "http://localhost:8000/api/";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Errors raised while resolving the client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yml::Error),
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported configuration format `{0}`. Use 'yaml' or 'json'.")]
    UnsupportedFormat(String),
    #[error("Invalid {var} value: {message}")]
    InvalidEnv { var: &'static str, message: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// On-disk formats accepted for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ConfigFormat {
    #[strum(to_string = "yaml", serialize = "yml")]
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Conventional file name for a generated configuration in this format.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Yaml => "shoplist.yaml",
            Self::Json => "shoplist.json",
        }
    }
}

/// Configuration for the ShopList client library and CLI.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Root of the REST API; every endpoint path is joined onto it.
    pub api_base_url: Url,

    /// Logging level used when `RUST_LOG` is not set.
    pub log_level: String,

    /// Directory holding the durable client storage. Defaults to the
    /// platform configuration directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ClientConfig {
    /// Generates a default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            api_base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            storage_dir: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Loads the configuration from a file, environment variables, or defaults.
    ///
    /// Precedence, lowest first: defaults, the file, `SHOPLIST_*` environment
    /// variables (only for values the file left at their default), then
    /// `api_url_override`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, if an
    /// environment variable holds an invalid value, or if the resolved
    /// configuration fails validation.
    pub fn load_config(
        config_path: Option<PathBuf>,
        api_url_override: Option<Url>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::with_defaults();
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => defaults.clone(),
        };

        if config.api_base_url == defaults.api_base_url {
            if let Ok(value) = env::var(ENV_API_URL) {
                config.api_base_url =
                    Url::parse(&value).map_err(|err| ConfigError::InvalidEnv {
                        var: ENV_API_URL,
                        message: err.to_string(),
                    })?;
            }
        }
        if config.log_level == defaults.log_level {
            if let Ok(value) = env::var(ENV_LOG_LEVEL) {
                config.log_level = value;
            }
        }
        if config.storage_dir.is_none() {
            if let Ok(value) = env::var(ENV_STORAGE_DIR) {
                config.storage_dir = Some(PathBuf::from(value));
            }
        }
        if config.request_timeout_secs == defaults.request_timeout_secs {
            if let Ok(value) = env::var(ENV_REQUEST_TIMEOUT) {
                config.request_timeout_secs =
                    value.parse().map_err(|_| ConfigError::InvalidEnv {
                        var: ENV_REQUEST_TIMEOUT,
                        message: "must be a whole number of seconds".to_string(),
                    })?;
            }
        }

        if let Some(url) = api_url_override {
            config.api_base_url = url;
        }

        config.api_base_url = with_trailing_slash(config.api_base_url);
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: PathBuf) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let format: ConfigFormat = extension
            .parse()
            .map_err(|_| ConfigError::UnsupportedFormat(extension.clone()))?;
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse(&content, format)
    }

    /// Parse configuration text in the given format.
    ///
    /// # Errors
    /// Returns the deserializer's error for malformed input.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        Ok(match format {
            ConfigFormat::Yaml => serde_yml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        })
    }

    /// Serialize the configuration for writing to disk.
    ///
    /// # Errors
    /// Returns the serializer's error.
    pub fn render(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        Ok(match format {
            ConfigFormat::Yaml => serde_yml::to_string(self)?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
        })
    }

    /// Check values that deserialization alone cannot rule out.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request timeout must be greater than 0".to_string(),
            ));
        }
        if !matches!(self.api_base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "API URL must use http or https, got `{}`",
                self.api_base_url.scheme()
            )));
        }
        let level = self.log_level.trim();
        if !LOG_LEVELS.iter().any(|known| known.eq_ignore_ascii_case(level)) {
            return Err(ConfigError::Invalid(format!(
                "log level must be one of {}, got `{level}`",
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    /// Directory for the durable client storage file.
    #[must_use]
    pub fn resolved_storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(|| {
            BaseDirs::new().map_or_else(
                || PathBuf::from("./.shoplist"),
                |dirs| dirs.config_dir().join("shoplist"),
            )
        })
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
