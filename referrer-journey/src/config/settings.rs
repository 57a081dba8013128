//! Deployment settings for the entry point transport.
//!
//! These are owned by whoever deploys the integration, not by merchants.
//! They control the HTTP client and map environment names to partner base URLs.
//!
//! # Examples
//!
//! ```toml
//! [http]
//! timeout_secs = 10
//! connect_timeout_secs = 5
//!
//! [environments]
//! staging = "https://stage.mention-me.com"
//! ```

use std::{collections::BTreeMap, path::Path, time::Duration};

use serde::Deserialize;
use url::{Host, Url};

use crate::error::{JourneyError, Result};

/// Base URL of the production partner service.
pub const PRODUCTION_BASE_URL: &str = "https://mention-me.com";

/// Base URL of the demo partner service.
pub const DEMO_BASE_URL: &str = "https://demo.mention-me.com";

/// Root settings document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JourneySettings {
    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Environment name to base URL overrides and additions.
    ///
    /// Merged over the built-in `production` and `demo` entries.
    #[serde(default)]
    pub environments: BTreeMap<String, String>,
}

impl JourneySettings {
    /// Parses and validates settings from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::SettingsError`] if parsing or validation fails.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let settings: Self = toml::from_str(toml_str)
            .map_err(|e| JourneyError::SettingsError(format!("invalid TOML settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or its contents are invalid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| JourneyError::SettingsError(format!("cannot read settings file: {e}")))?;
        Self::from_toml(&content)
    }

    /// Validates HTTP bounds and every configured base URL.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::SettingsError`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.http.validate()?;
        for (name, base_url) in &self.environments {
            validate_base_url(name, base_url)?;
        }
        Ok(())
    }

    /// Resolves an environment name to its partner base URL.
    ///
    /// Lookup is case-insensitive. Configured entries win over built-ins.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::UnknownEnvironment`] for unmapped names and
    /// [`JourneyError::SettingsError`] if the mapped URL is unusable.
    pub fn base_url(&self, environment: &str) -> Result<Url> {
        let wanted = environment.to_lowercase();
        let configured = self
            .environments
            .iter()
            .find(|(name, _)| name.to_lowercase() == wanted)
            .map(|(_, url)| url.as_str());

        let raw = match (configured, wanted.as_str()) {
            (Some(url), _) => url,
            (None, "production") => PRODUCTION_BASE_URL,
            (None, "demo") => DEMO_BASE_URL,
            (None, _) => return Err(JourneyError::UnknownEnvironment(environment.to_owned())),
        };

        validate_base_url(environment, raw)
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Maximum idle connections per host.
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: default_pool_max_idle(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl HttpConfig {
    /// Validates configuration values are within acceptable bounds.
    ///
    /// # Errors
    ///
    /// Returns error if timeout values are outside valid ranges:
    /// - `timeout_secs`: must be 1-60 seconds
    /// - `connect_timeout_secs`: must be 1-30 seconds
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 || self.timeout_secs > 60 {
            return Err(JourneyError::SettingsError(
                "timeout_secs must be between 1 and 60".to_owned(),
            ));
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 30 {
            return Err(JourneyError::SettingsError(
                "connect_timeout_secs must be between 1 and 30".to_owned(),
            ));
        }
        Ok(())
    }

    /// Returns timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns connect timeout as Duration.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_pool_max_idle() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_connect_timeout_secs() -> u64 {
    5
}

/// Parses a base URL and rejects anything that is not a public HTTPS origin.
///
/// The entry point path is absolute, so a base URL may not carry a path,
/// query or fragment of its own.
fn validate_base_url(name: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| {
        JourneyError::SettingsError(format!("invalid base URL for environment '{name}': {e}"))
    })?;

    if url.scheme() != "https" {
        return Err(JourneyError::SettingsError(format!(
            "base URL for environment '{name}' must use HTTPS, got: {}",
            url.scheme()
        )));
    }

    if let Some(host) = url.host()
        && is_local(&host)
    {
        return Err(JourneyError::SettingsError(format!(
            "base URL for environment '{name}' must not be localhost or loopback: {host}"
        )));
    }

    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(JourneyError::SettingsError(format!(
            "base URL for environment '{name}' must be an origin without path, query or fragment: {url}"
        )));
    }

    Ok(url)
}

fn is_local(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => domain.eq_ignore_ascii_case("localhost"),
        Host::Ipv4(ip) => ip.is_loopback() || ip.is_unspecified(),
        Host::Ipv6(ip) => {
            ip.is_loopback()
                || ip.is_unspecified()
                || ip.to_ipv4_mapped().is_some_and(|v4| v4.is_loopback() || v4.is_unspecified())
        }
    }
}
