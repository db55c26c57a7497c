//! Configuration handling for the application.
//!
//! Everything is read from environment variables once at startup with
//! development defaults, mirroring how the rest of the crate treats
//! configuration as immutable data. A missing synthesis credential is not an
//! error here: it only disables the synthesis stage, and the pipeline is the
//! one that warns about it.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use url::Url;

/// Environment variable names. Public so tests can refer to them.
pub const ENV_SOURCE_URL: &str = "SOURCE_URL";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

/// Default values used when environment variables are absent.
const DEFAULT_SOURCE_URL: &str = "https://www.drudgereport.com/";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    source_url: Url,
    openai_api_key: Option<String>,
    openai_model: String,
    openai_base_url: String,
}

impl Config {
    /// Create a new config explicitly. Used by tests and by callers that
    /// already hold a parsed source URL.
    pub fn new(
        source_url: Url,
        openai_api_key: Option<String>,
        openai_model: impl Into<String>,
        openai_base_url: impl Into<String>,
    ) -> Self {
        Self {
            source_url,
            openai_api_key,
            openai_model: openai_model.into(),
            openai_base_url: openai_base_url.into(),
        }
    }

    /// Load from environment variables, falling back to defaults.
    ///
    /// The only validation that can fail is parsing the source URL; an
    /// aggregator page we cannot even address is not worth starting for.
    pub fn from_env() -> Result<Self, ConfigError> {
        let source_url =
            env::var(ENV_SOURCE_URL).unwrap_or_else(|_| DEFAULT_SOURCE_URL.to_string());
        let source_url = Url::parse(&source_url).map_err(|e| ConfigError::InvalidValue {
            field: ENV_SOURCE_URL,
            reason: e.to_string(),
        })?;
        let openai_api_key = env::var(ENV_OPENAI_API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty());
        let openai_model =
            env::var(ENV_OPENAI_MODEL).unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string());
        let openai_base_url =
            env::var(ENV_OPENAI_BASE_URL).unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string());
        Ok(Self {
            source_url,
            openai_api_key,
            openai_model,
            openai_base_url,
        })
    }

    /// The aggregator page the run starts from.
    pub fn source_url(&self) -> &Url {
        &self.source_url
    }
    /// Credential for the generative text service; `None` disables synthesis.
    pub fn openai_api_key(&self) -> Option<&str> {
        self.openai_api_key.as_deref()
    }
    /// Chat model used for story synthesis.
    pub fn openai_model(&self) -> &str {
        &self.openai_model
    }
    /// API base, overridable so tests can point at a mock server.
    pub fn openai_base_url(&self) -> &str {
        &self.openai_base_url
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
