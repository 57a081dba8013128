//! Error types for referrer journey resolution.
//!
//! All errors implement the standard [`std::error::Error`] trait via [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Configuration Errors** ([`JourneyError::InvalidEnvironment`],
//!   [`JourneyError::InvalidPartnerCode`], [`JourneyError::UnknownEnvironment`],
//!   [`JourneyError::SettingsError`]): merchant or deployment settings are unusable
//! - **Fetch Errors** ([`JourneyError::HttpError`], [`JourneyError::PartnerError`],
//!   [`JourneyError::MalformedResponse`], [`JourneyError::TransportError`]): the
//!   partner service could not produce an entry point
//!
//! An empty result ("no referral offer for this customer") is not an error. The
//! fetch layer reports it as `Ok(None)`.
//!
//! # Examples
//!
//! ```
//! use referrer_journey::error::{JourneyError, Result};
//!
//! fn require_https(url: &str) -> Result<&str> {
//!     if !url.starts_with("https://") {
//!         return Err(JourneyError::TransportError("URL must use HTTPS".to_owned()));
//!     }
//!     Ok(url)
//! }
//!
//! assert!(require_https("http://mention-me.com").is_err());
//! ```

use thiserror::Error;

/// Result type alias for journey operations.
pub type Result<T> = std::result::Result<T, JourneyError>;

/// Errors that can occur while resolving a referrer journey.
///
/// The `Display` output of every variant is diagnosable by a merchant and is
/// what ends up in [`JourneyState::Error`](crate::journey::JourneyState::Error).
///
/// # Error Recovery
///
/// None of these errors are retried automatically. Configuration errors are
/// surfaced as a banner in editor context and suppressed for shoppers. Fetch
/// errors are reported once to the telemetry sink and suppressed.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum JourneyError {
    /// The merchant has not selected a Mention Me environment.
    ///
    /// # Recovery
    ///
    /// Choose an environment in the Mention Me app settings.
    #[error("Invalid Mention Me environment set")]
    InvalidEnvironment,

    /// The merchant has not entered a Mention Me partner code.
    ///
    /// # Recovery
    ///
    /// Enter the partner code in the Mention Me app settings.
    #[error("Invalid Mention Me partner code set")]
    InvalidPartnerCode,

    /// The configured environment has no known base URL.
    ///
    /// # Recovery
    ///
    /// Add the environment to the `[environments]` table of the journey settings
    /// or pick one of the built-in environments (`production`, `demo`).
    #[error("Unknown Mention Me environment: {0}")]
    UnknownEnvironment(String),

    /// Deployment settings could not be read or failed validation.
    #[error("Invalid journey settings: {0}")]
    SettingsError(String),

    /// HTTP request to the partner service failed.
    ///
    /// Wraps [`reqwest::Error`]: timeouts, refused connections, DNS and TLS
    /// failures all end up here.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The partner service answered with a non-success status.
    #[error("Invalid partner response: {0}")]
    PartnerError(String),

    /// The partner payload could not be decoded into an entry point.
    #[error("Malformed entry point payload: {0}")]
    MalformedResponse(String),

    /// The request was rejected before it left the process.
    ///
    /// Raised for non-HTTPS or loopback endpoints.
    #[error("Transport error: {0}")]
    TransportError(String),
}

impl JourneyError {
    /// Returns true for errors caused by merchant or deployment configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use referrer_journey::error::JourneyError;
    ///
    /// assert!(JourneyError::InvalidPartnerCode.is_configuration());
    /// assert!(!JourneyError::PartnerError("status 500".into()).is_configuration());
    /// ```
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidEnvironment
                | Self::InvalidPartnerCode
                | Self::UnknownEnvironment(_)
                | Self::SettingsError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = JourneyError::PartnerError("partner returned status 503".into());
        assert_eq!(error.to_string(), "Invalid partner response: partner returned status 503");
    }

    #[test]
    fn test_configuration_errors_name_their_field() {
        assert!(JourneyError::InvalidEnvironment.to_string().contains("environment"));
        assert!(JourneyError::InvalidPartnerCode.to_string().contains("partner code"));
    }

    #[test]
    fn test_unknown_environment_error() {
        let error = JourneyError::UnknownEnvironment("staging".to_owned());
        assert_eq!(error.to_string(), "Unknown Mention Me environment: staging");
        assert!(error.is_configuration());
    }

    #[test]
    fn test_fetch_errors_are_not_configuration() {
        assert!(!JourneyError::MalformedResponse("eof".into()).is_configuration());
        assert!(!JourneyError::TransportError("loopback".into()).is_configuration());
    }
}
