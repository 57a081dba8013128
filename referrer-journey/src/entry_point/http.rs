//! HTTP entry point fetcher.
//!
//! Talks to the Mention Me entry point API with reqwest. Timeouts are enforced
//! here, by the client, and surface as [`JourneyError::HttpError`].

use std::collections::BTreeMap;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::instrument;
use url::Url;

use crate::{
    config::{JourneySettings, ValidatedConfig},
    context::{ContextKey, ExtensionSurface},
    entry_point::{EntryPointFetcher, EntryPointResponse},
    error::{JourneyError, Result},
};

/// Absolute path of the referrer entry point endpoint on the environment origin.
pub const ENTRY_POINT_PATH: &str = "/api/entry-point/v2/referrer";

/// Request body sent to the partner service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryPointRequest<'a> {
    partner_code: &'a str,
    environment: &'a str,
    situation: ExtensionSurface,
    #[serde(flatten)]
    context: BTreeMap<&'static str, &'a str>,
}

impl<'a> EntryPointRequest<'a> {
    fn new(config: &'a ValidatedConfig, key: &'a ContextKey, surface: ExtensionSurface) -> Self {
        Self {
            partner_code: config.partner_code(),
            environment: config.environment(),
            situation: surface,
            context: key.query_pairs().into_iter().collect(),
        }
    }
}

/// Fetches entry points over HTTPS.
///
/// # Examples
///
/// ```
/// use referrer_journey::{config::JourneySettings, entry_point::HttpEntryPointFetcher};
///
/// let settings = JourneySettings::from_toml("[http]\ntimeout_secs = 10").unwrap();
/// let fetcher = HttpEntryPointFetcher::with_settings(settings).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HttpEntryPointFetcher {
    client: Client,
    settings: JourneySettings,
}

impl HttpEntryPointFetcher {
    /// Creates a fetcher with default settings.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_settings(JourneySettings::default())
    }

    /// Creates a fetcher from deployment settings.
    ///
    /// # Errors
    ///
    /// Returns error if the settings fail validation or the HTTP client cannot be built.
    pub fn with_settings(settings: JourneySettings) -> Result<Self> {
        settings.validate()?;

        let client = Client::builder()
            .pool_max_idle_per_host(settings.http.pool_max_idle_per_host)
            .timeout(settings.http.timeout())
            .connect_timeout(settings.http.connect_timeout())
            .build()
            .map_err(JourneyError::HttpError)?;

        Ok(Self { client, settings })
    }

    /// Resolves the entry point URL for an environment.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::UnknownEnvironment`] if the environment has no base URL.
    pub fn endpoint(&self, environment: &str) -> Result<Url> {
        let base = self.settings.base_url(environment)?;
        base.join(ENTRY_POINT_PATH)
            .map_err(|e| JourneyError::SettingsError(format!("invalid entry point URL: {e}")))
    }

    #[instrument(
        skip(self, config, key, surface),
        fields(
            environment = config.environment(),
            fingerprint = %key.fingerprint(),
            surface = %surface
        )
    )]
    async fn request(
        &self,
        config: &ValidatedConfig,
        key: &ContextKey,
        surface: ExtensionSurface,
    ) -> Result<Option<EntryPointResponse>> {
        let url = self.endpoint(config.environment())?;
        let body = EntryPointRequest::new(config, key, surface);

        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(JourneyError::HttpError)?;

        let outcome = parse_entry_point(status, &bytes);
        match &outcome {
            Ok(Some(_)) => tracing::debug!(%status, "entry point received"),
            Ok(None) => tracing::debug!(%status, "no referrer journey for this context"),
            Err(e) => tracing::debug!(%status, error = %e, "entry point request failed"),
        }
        outcome
    }
}

impl EntryPointFetcher for HttpEntryPointFetcher {
    async fn fetch<'a>(
        &'a self,
        config: &'a ValidatedConfig,
        key: &'a ContextKey,
        surface: ExtensionSurface,
    ) -> Result<Option<EntryPointResponse>> {
        self.request(config, key, surface).await
    }
}

/// Normalizes a partner answer.
///
/// `204`, an empty body and a JSON `null` all mean "no journey".
fn parse_entry_point(status: StatusCode, body: &[u8]) -> Result<Option<EntryPointResponse>> {
    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    if !status.is_success() {
        return Err(JourneyError::PartnerError(format!(
            "partner returned status {}",
            status.as_u16()
        )));
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice::<Option<EntryPointResponse>>(body)
        .map_err(|e| JourneyError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::MerchantConfig, context::LocaleContext};

    const PAYLOAD: &str = r#"{
        "headline": "Give £10, get £10",
        "description": "Share with friends",
        "url": "https://mention-me.com/r/abc",
        "defaultCallToAction": "Refer now",
        "privacyNotice": "Mention Me processes your data",
        "privacyNoticeUrl": "https://mention-me.com/privacy",
        "privacyNoticeLinkText": "Your rights"
    }"#;

    fn locale() -> LocaleContext {
        LocaleContext {
            shop_domain: "example.myshopify.com".to_owned(),
            extension_surface: ExtensionSurface::ThankYou,
            extension_language: "en".to_owned(),
            language: "en-GB".to_owned(),
            country: None,
            currency: "GBP".to_owned(),
            market_id: None,
            market_handle: Some("uk".to_owned()),
        }
    }

    #[test]
    fn test_parse_populated_payload() {
        let parsed = parse_entry_point(StatusCode::OK, PAYLOAD.as_bytes()).unwrap().unwrap();
        assert_eq!(parsed.headline, "Give £10, get £10");
        assert_eq!(parsed.privacy_notice_link_text.as_deref(), Some("Your rights"));
    }

    #[test]
    fn test_parse_no_journey() {
        assert!(parse_entry_point(StatusCode::NO_CONTENT, b"").unwrap().is_none());
        assert!(parse_entry_point(StatusCode::OK, b"null").unwrap().is_none());
        assert!(parse_entry_point(StatusCode::OK, b"  \n").unwrap().is_none());
    }

    #[test]
    fn test_parse_error_status() {
        let result = parse_entry_point(StatusCode::INTERNAL_SERVER_ERROR, b"oops");
        assert!(
            matches!(result, Err(JourneyError::PartnerError(msg)) if msg == "partner returned status 500")
        );

        let result = parse_entry_point(StatusCode::NOT_FOUND, b"");
        assert!(matches!(result, Err(JourneyError::PartnerError(_))));
    }

    #[test]
    fn test_parse_malformed_payload() {
        let result = parse_entry_point(StatusCode::OK, br#"{"headline": 12}"#);
        assert!(matches!(result, Err(JourneyError::MalformedResponse(_))));

        let result = parse_entry_point(StatusCode::OK, b"<html>");
        assert!(matches!(result, Err(JourneyError::MalformedResponse(_))));
    }

    #[test]
    fn test_request_body_carries_context() {
        let config = MerchantConfig::new("mm-partner", "demo").validated().unwrap();
        let key = locale().key();
        let body = EntryPointRequest::new(&config, &key, ExtensionSurface::OrderStatus);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["partnerCode"], "mm-partner");
        assert_eq!(json["environment"], "demo");
        assert_eq!(json["situation"], "order-status");
        assert_eq!(json["extension"], "thank-you");
        assert_eq!(json["shopDomain"], "example.myshopify.com");
        assert_eq!(json["marketHandle"], "uk");
        assert!(json.get("country").is_none());
        assert!(json.get("marketId").is_none());
    }

    #[test]
    fn test_endpoint_resolution() {
        let fetcher = HttpEntryPointFetcher::new().unwrap();
        assert_eq!(
            fetcher.endpoint("production").unwrap().as_str(),
            "https://mention-me.com/api/entry-point/v2/referrer"
        );
        assert!(matches!(fetcher.endpoint("nope"), Err(JourneyError::UnknownEnvironment(_))));
    }

    #[test]
    fn test_endpoint_on_configured_origin() {
        let settings =
            JourneySettings::from_toml("[environments]\nstaging = \"https://stage.mention-me.com\"").unwrap();
        let fetcher = HttpEntryPointFetcher::with_settings(settings).unwrap();
        assert_eq!(
            fetcher.endpoint("staging").unwrap().as_str(),
            "https://stage.mention-me.com/api/entry-point/v2/referrer"
        );
    }

    #[test]
    fn test_with_settings_rejects_invalid_settings() {
        let mut settings = JourneySettings::default();
        settings.http.timeout_secs = 0;
        assert!(matches!(
            HttpEntryPointFetcher::with_settings(settings),
            Err(JourneyError::SettingsError(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_unknown_environment_fails_before_network() {
        let fetcher = HttpEntryPointFetcher::new().unwrap();
        let config = MerchantConfig::new("mm-partner", "moon").validated().unwrap();

        let result = fetcher.fetch(&config, &locale().key(), ExtensionSurface::ThankYou).await;
        assert!(matches!(result, Err(JourneyError::UnknownEnvironment(name)) if name == "moon"));
    }
}
