//! Configuration management.
//!
//! Configuration is read from an optional TOML file, then `BLOGPORT__*`
//! environment variables, then the CMS credential variables
//! `CONTENTFUL_SPACE_ID` and `CONTENTFUL_MANAGEMENT_TOKEN`. Later sources win.

use std::{fmt, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Environment variable holding the CMS space identifier.
pub const SPACE_ID_ENV: &str = "CONTENTFUL_SPACE_ID";

/// Environment variable holding the CMS management token.
pub const MANAGEMENT_TOKEN_ENV: &str = "CONTENTFUL_MANAGEMENT_TOKEN";

/// Prefix for generic overrides, e.g. `BLOGPORT__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "BLOGPORT";

/// Upper bound the management API accepts for a single listing page.
pub const MAX_LISTING_LIMIT: usize = 1000;

/// Main configuration structure for Blogport.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// CMS connection settings.
    #[serde(default)]
    pub cms: CmsConfig,

    /// Import pipeline settings.
    #[serde(default)]
    pub import: ImportConfig,

    /// HTTP service settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// CMS management API settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct CmsConfig {
    /// Space identifier. Required for import and export.
    #[serde(default)]
    pub space_id: Option<String>,

    /// Management (write) token. Required for import and export.
    #[serde(default)]
    pub management_token: Option<String>,

    /// Base URL of the management API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Environment inside the space.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Locale used for every localized field.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Content type id of blog posts.
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

/// Import pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// How many existing entries to fetch for the duplicate check.
    #[serde(default = "default_existing_limit")]
    pub existing_limit: usize,

    /// Asset processing wait settings.
    #[serde(default)]
    pub processing: ProcessingConfig,
}

/// How long to wait for the CMS to process an uploaded asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Pause between creating an asset and requesting processing.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// First interval between status polls; doubles after each poll.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Ceiling for the poll interval.
    #[serde(default = "default_max_poll_interval_ms")]
    pub max_poll_interval_ms: u64,

    /// Give up polling after this long and publish anyway.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// HTTP service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_api_url() -> String {
    "https://api.contentful.com".to_string()
}

fn default_environment() -> String {
    "master".to_string()
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_content_type() -> String {
    "title".to_string()
}

fn default_existing_limit() -> usize {
    MAX_LISTING_LIMIT
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_max_poll_interval_ms() -> u64 {
    2000
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            space_id: None,
            management_token: None,
            api_url: default_api_url(),
            environment: default_environment(),
            locale: default_locale(),
            content_type: default_content_type(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            existing_limit: default_existing_limit(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_interval_ms: default_max_poll_interval_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl fmt::Debug for CmsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CmsConfig")
            .field("space_id", &self.space_id)
            .field(
                "management_token",
                &self.management_token.as_ref().map(|_| "<redacted>"),
            )
            .field("api_url", &self.api_url)
            .field("environment", &self.environment)
            .field("locale", &self.locale)
            .field("content_type", &self.content_type)
            .finish()
    }
}

impl CmsConfig {
    /// Names of the credential variables that are unset or blank.
    #[must_use]
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(self.space_id.as_deref()) {
            missing.push(SPACE_ID_ENV);
        }
        if is_blank(self.management_token.as_deref()) {
            missing.push(MANAGEMENT_TOKEN_ENV);
        }
        missing
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

impl ProcessingConfig {
    /// Pause before requesting processing.
    #[must_use]
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// First poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Poll interval ceiling.
    #[must_use]
    pub fn max_poll_interval(&self) -> Duration {
        Duration::from_millis(self.max_poll_interval_ms)
    }

    /// Overall polling budget.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|source| CoreError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an optional file layered with the process
    /// environment.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        Self::load_layered(path, None)
    }

    /// Layered load with an explicit environment map instead of the process
    /// environment when `env` is `Some`.
    pub fn load_layered(path: Option<&Path>, env: Option<config::Map<String, String>>) -> Result<Self> {
        let lookup = |key: &str| -> Option<String> {
            let value = match &env {
                Some(map) => map.get(key).cloned(),
                None => std::env::var(key).ok(),
            };
            value.filter(|v| !v.trim().is_empty())
        };
        let space_id = lookup(SPACE_ID_ENV);
        let management_token = lookup(MANAGEMENT_TOKEN_ENV);

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("cms.space_id", space_id)?
            .set_override_option("cms.management_token", management_token)?
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let cms = &self.cms;
        for (name, value) in [
            ("cms.api_url", &cms.api_url),
            ("cms.environment", &cms.environment),
            ("cms.locale", &cms.locale),
            ("cms.content_type", &cms.content_type),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::config(format!("{name} cannot be empty")));
            }
        }

        if !(1..=MAX_LISTING_LIMIT).contains(&self.import.existing_limit) {
            return Err(CoreError::config(format!(
                "import.existing_limit must be between 1 and {MAX_LISTING_LIMIT}"
            )));
        }

        let processing = &self.import.processing;
        if processing.poll_interval_ms == 0 {
            return Err(CoreError::config(
                "import.processing.poll_interval_ms must be positive",
            ));
        }
        if processing.max_poll_interval_ms < processing.poll_interval_ms {
            return Err(CoreError::config(
                "import.processing.max_poll_interval_ms cannot be below poll_interval_ms",
            ));
        }

        if cms.api_url.ends_with('/') {
            tracing::warn!("cms.api_url should not have a trailing slash");
        }

        Ok(())
    }
}
