//! Merchant configuration and its validation.
//!
//! Merchants pick a Mention Me environment and enter their partner code in the
//! app settings. Both values arrive here untrusted: they may be missing, blank
//! or of the wrong type, and nothing touches the network until both are usable.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{JourneyError, Result};

/// Merchant-supplied Mention Me settings.
///
/// Values are kept exactly as supplied. A setting of the wrong type (a number,
/// a boolean, a table) is treated as absent.
///
/// # Examples
///
/// ```
/// use referrer_journey::config::{ConfigValidation, MerchantConfig};
///
/// let config = MerchantConfig::from_json(r#"{"partnerCode": "mm-1234", "environment": 7}"#).unwrap();
/// assert_eq!(config.environment, None);
/// assert_eq!(config.validate(), ConfigValidation::InvalidEnvironment);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantConfig {
    /// Mention Me partner code.
    #[serde(default, deserialize_with = "string_or_absent")]
    pub partner_code: Option<String>,

    /// Mention Me environment name (e.g. `production`, `demo`).
    #[serde(default, deserialize_with = "string_or_absent")]
    pub environment: Option<String>,
}

/// Outcome of [`MerchantConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigValidation {
    /// Both settings are usable.
    Valid,
    /// Environment is absent or blank.
    InvalidEnvironment,
    /// Partner code is absent or blank.
    InvalidPartnerCode,
}

impl ConfigValidation {
    /// Returns true if the configuration may be used for network activity.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Configuration that passed validation.
///
/// Holds trimmed values. The only way to obtain one is
/// [`MerchantConfig::validated`], so any function taking a `&ValidatedConfig`
/// can rely on both fields being non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedConfig {
    partner_code: String,
    environment: String,
}

impl ValidatedConfig {
    /// Returns the trimmed partner code.
    #[must_use]
    pub fn partner_code(&self) -> &str {
        &self.partner_code
    }

    /// Returns the trimmed environment name.
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }
}

impl MerchantConfig {
    /// Creates a configuration from raw setting values.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn new(partner_code: impl Into<String>, environment: impl Into<String>) -> Self {
        Self { partner_code: Some(partner_code.into()), environment: Some(environment.into()) }
    }

    /// Parses app settings JSON.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::SettingsError`] if the document is not a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| JourneyError::SettingsError(format!("invalid app settings: {e}")))
    }

    /// Checks that both settings are present and non-blank.
    ///
    /// The environment is checked first, so a configuration missing both
    /// reports [`ConfigValidation::InvalidEnvironment`].
    #[must_use]
    pub fn validate(&self) -> ConfigValidation {
        validate_fields(self.environment.as_deref(), self.partner_code.as_deref())
    }

    /// Validates and returns the trimmed configuration.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::InvalidEnvironment`] or
    /// [`JourneyError::InvalidPartnerCode`] naming the first unusable field.
    pub fn validated(&self) -> Result<ValidatedConfig> {
        let environment =
            non_blank(self.environment.as_deref()).ok_or(JourneyError::InvalidEnvironment)?;
        let partner_code =
            non_blank(self.partner_code.as_deref()).ok_or(JourneyError::InvalidPartnerCode)?;
        Ok(ValidatedConfig {
            partner_code: partner_code.to_owned(),
            environment: environment.to_owned(),
        })
    }
}

/// Validates raw setting values without building a [`MerchantConfig`].
pub(crate) fn validate_fields(
    environment: Option<&str>,
    partner_code: Option<&str>,
) -> ConfigValidation {
    if non_blank(environment).is_none() {
        return ConfigValidation::InvalidEnvironment;
    }
    if non_blank(partner_code).is_none() {
        return ConfigValidation::InvalidPartnerCode;
    }
    ConfigValidation::Valid
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn string_or_absent<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}
