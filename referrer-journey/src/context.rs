//! Request context and its canonical key.
//!
//! A [`LocaleContext`] is rebuilt by the host on every render. The
//! [`ContextKey`] derived from it decides whether a fetch already made for the
//! current mount can be reused: field-equal contexts produce equal keys, and an
//! absent value never equals an empty one.

use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Checkout location the extension renders on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtensionSurface {
    /// Thank-you page shown right after purchase.
    ThankYou,
    /// Order status page reachable later from the confirmation email.
    OrderStatus,
}

impl ExtensionSurface {
    /// Returns the wire name of the surface.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ThankYou => "thank-you",
            Self::OrderStatus => "order-status",
        }
    }
}

impl fmt::Display for ExtensionSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shop, locale and market values for one render.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocaleContext {
    /// The shop's `myshopify.com` domain.
    pub shop_domain: String,
    /// Surface the request is made for.
    pub extension_surface: ExtensionSurface,
    /// ISO code of the language the extension is rendered in.
    pub extension_language: String,
    /// ISO code of the buyer's display language.
    pub language: String,
    /// ISO country code, if the buyer's country is known.
    pub country: Option<String>,
    /// ISO currency code.
    pub currency: String,
    /// Market id, if the shop uses markets.
    pub market_id: Option<String>,
    /// Market handle, if the shop uses markets.
    pub market_handle: Option<String>,
}

impl LocaleContext {
    /// Builds the canonical key for this context.
    #[must_use]
    pub fn key(&self) -> ContextKey {
        ContextKey::from(self)
    }
}

/// Canonical composite key derived from a [`LocaleContext`].
///
/// Doubles as the parameter set sent to the partner service.
///
/// # Examples
///
/// ```
/// use referrer_journey::context::{ExtensionSurface, LocaleContext};
///
/// let locale = LocaleContext {
///     shop_domain: "example.myshopify.com".into(),
///     extension_surface: ExtensionSurface::ThankYou,
///     extension_language: "en".into(),
///     language: "en-GB".into(),
///     country: Some("GB".into()),
///     currency: "GBP".into(),
///     market_id: None,
///     market_handle: None,
/// };
///
/// let key = locale.key();
/// assert_eq!(key, locale.clone().key());
/// assert_eq!(
///     key.canonical(),
///     "country=GB&currency=GBP&extension=thank-you&extensionLanguage=en&language=en-GB&shopDomain=example.myshopify.com"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextKey {
    shop_domain: String,
    extension: ExtensionSurface,
    extension_language: String,
    language: String,
    country: Option<String>,
    currency: String,
    market_id: Option<String>,
    market_handle: Option<String>,
}

impl From<&LocaleContext> for ContextKey {
    fn from(locale: &LocaleContext) -> Self {
        Self {
            shop_domain: locale.shop_domain.clone(),
            extension: locale.extension_surface,
            extension_language: locale.extension_language.clone(),
            language: locale.language.clone(),
            country: locale.country.clone(),
            currency: locale.currency.clone(),
            market_id: locale.market_id.clone(),
            market_handle: locale.market_handle.clone(),
        }
    }
}

impl ContextKey {
    /// Returns the present parameters, sorted by name.
    ///
    /// Absent optional values are omitted; empty strings are kept.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        // Keep in name order.
        [
            optional("country", &self.country),
            Some(("currency", self.currency.as_str())),
            Some(("extension", self.extension.as_str())),
            Some(("extensionLanguage", self.extension_language.as_str())),
            Some(("language", self.language.as_str())),
            optional("marketHandle", &self.market_handle),
            optional("marketId", &self.market_id),
            Some(("shopDomain", self.shop_domain.as_str())),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Returns the canonical form-encoded representation of the key.
    #[must_use]
    pub fn canonical(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }

    /// Returns a short, stable fingerprint of the key.
    ///
    /// Base64url (unpadded) SHA-256 of [`canonical`](Self::canonical).
    #[must_use]
    pub fn fingerprint(&self) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(self.canonical().as_bytes()))
    }

    /// Returns the shop domain the key was built for.
    #[must_use]
    pub fn shop_domain(&self) -> &str {
        &self.shop_domain
    }

    /// Returns the surface the key was built for.
    #[must_use]
    pub const fn extension(&self) -> ExtensionSurface {
        self.extension
    }
}

fn optional<'a>(name: &'static str, value: &'a Option<String>) -> Option<(&'static str, &'a str)> {
    value.as_deref().map(|v| (name, v))
}
