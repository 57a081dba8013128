//! Referrer entry point payload and the fetcher abstraction.
//!
//! The partner service answers an entry point request with either a populated
//! [`EntryPointResponse`] or an explicit "no journey for this visitor". Both are
//! successful outcomes; [`EntryPointFetcher`] reports them as `Ok(Some(..))` and
//! `Ok(None)` respectively.
//!
//! # Examples
//!
//! ```rust,no_run
//! use referrer_journey::{
//!     config::MerchantConfig,
//!     context::{ExtensionSurface, LocaleContext},
//!     entry_point::{EntryPointFetcher, HttpEntryPointFetcher},
//! };
//!
//! # async fn example() -> referrer_journey::error::Result<()> {
//! let fetcher = HttpEntryPointFetcher::new()?;
//! let config = MerchantConfig::new("mm-partner", "demo").validated()?;
//! let locale = LocaleContext {
//!     shop_domain: "example.myshopify.com".into(),
//!     extension_surface: ExtensionSurface::ThankYou,
//!     extension_language: "en".into(),
//!     language: "en".into(),
//!     country: Some("GB".into()),
//!     currency: "GBP".into(),
//!     market_id: None,
//!     market_handle: None,
//! };
//!
//! match fetcher.fetch(&config, &locale.key(), ExtensionSurface::ThankYou).await? {
//!     Some(entry_point) => println!("{}", entry_point.headline),
//!     None => println!("no referral offer"),
//! }
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::{future::Future, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    config::ValidatedConfig,
    context::{ContextKey, ExtensionSurface},
    error::Result,
};

pub mod http;

pub use http::HttpEntryPointFetcher;

/// Link text used when the partner does not supply one.
pub const DEFAULT_PRIVACY_NOTICE_LINK_TEXT: &str = "More info and your privacy rights";

/// Referral offer returned by the partner service.
///
/// The fetch layer treats the payload as opaque beyond decoding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPointResponse {
    /// Offer headline.
    pub headline: String,
    /// Offer body text.
    pub description: String,
    /// Optional hero image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Destination of the call to action.
    pub url: String,
    /// Call to action label.
    pub default_call_to_action: String,
    /// Privacy notice shown in the "managed by" popover.
    pub privacy_notice: String,
    /// Link to the full privacy notice.
    pub privacy_notice_url: String,
    /// Label for the privacy notice link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_notice_link_text: Option<String>,
}

impl EntryPointResponse {
    /// Returns the privacy link label, falling back to
    /// [`DEFAULT_PRIVACY_NOTICE_LINK_TEXT`] when absent or blank.
    #[must_use]
    pub fn privacy_notice_link_text_or_default(&self) -> &str {
        self.privacy_notice_link_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(DEFAULT_PRIVACY_NOTICE_LINK_TEXT)
    }
}

/// Fetches referrer entry points from the partner service.
///
/// Implementations perform exactly one request per call and never retry.
/// De-duplication of calls is the caller's job
/// ([`ReferrerJourney`](crate::journey::ReferrerJourney) does it per mount).
///
/// # Outcomes
///
/// | Partner answer                 | Result              |
/// |--------------------------------|---------------------|
/// | populated payload              | `Ok(Some(payload))` |
/// | explicit "no journey"          | `Ok(None)`          |
/// | transport failure or timeout   | `Err(..)`           |
/// | non-success status             | `Err(..)`           |
/// | payload that cannot be decoded | `Err(..)`           |
pub trait EntryPointFetcher: Send + Sync {
    /// Requests the entry point for a validated configuration and context key.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the partner answer is unusable.
    fn fetch<'a>(
        &'a self,
        config: &'a ValidatedConfig,
        key: &'a ContextKey,
        surface: ExtensionSurface,
    ) -> impl Future<Output = Result<Option<EntryPointResponse>>> + Send + 'a;
}

impl<T: EntryPointFetcher> EntryPointFetcher for Arc<T> {
    fn fetch<'a>(
        &'a self,
        config: &'a ValidatedConfig,
        key: &'a ContextKey,
        surface: ExtensionSurface,
    ) -> impl Future<Output = Result<Option<EntryPointResponse>>> + Send + 'a {
        (**self).fetch(config, key, surface)
    }
}
