//! Values read from the host checkout runtime.
//!
//! The host owns the subscriptions behind these values; this crate only reads
//! the current snapshot of them once per render.

use serde::Deserialize;

use crate::context::{ExtensionSurface, LocaleContext};

/// Localization market the buyer is shopping in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Market {
    /// Market id.
    pub id: String,
    /// Market handle.
    pub handle: String,
}

/// Inbound host context for one render.
///
/// # Examples
///
/// ```
/// use referrer_journey::{context::ExtensionSurface, host::HostContext};
///
/// let host = HostContext::new("example.myshopify.com", ExtensionSurface::ThankYou, "en", "GBP")
///     .with_purchasing_company("gid://shopify/Company/7");
///
/// assert!(host.is_b2b_purchase());
/// assert_eq!(host.locale_context().currency, "GBP");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostContext {
    /// The shop's `myshopify.com` domain.
    pub shop_domain: String,
    /// Surface being rendered.
    pub extension_surface: ExtensionSurface,
    /// ISO code of the extension's language.
    pub extension_language: String,
    /// ISO code of the buyer's display language.
    pub language: String,
    /// Buyer's localization country.
    #[serde(default)]
    pub country: Option<String>,
    /// Presentment currency.
    pub currency: String,
    /// Buyer's localization market.
    #[serde(default)]
    pub market: Option<Market>,
    /// Purchasing company id; present only for B2B purchases.
    #[serde(default)]
    pub purchasing_company: Option<String>,
    /// True when rendered in the checkout editor or a preview.
    #[serde(default)]
    pub editor: bool,
    /// Order being confirmed.
    #[serde(default)]
    pub order_id: Option<String>,
}

impl HostContext {
    /// Creates a context with the required values; the display language
    /// defaults to the extension language.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn new(
        shop_domain: impl Into<String>,
        extension_surface: ExtensionSurface,
        language: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        let language = language.into();
        Self {
            shop_domain: shop_domain.into(),
            extension_surface,
            extension_language: language.clone(),
            language,
            country: None,
            currency: currency.into(),
            market: None,
            purchasing_company: None,
            editor: false,
            order_id: None,
        }
    }

    /// Sets the buyer's display language.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the localization country.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Sets the localization market.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_market(mut self, id: impl Into<String>, handle: impl Into<String>) -> Self {
        self.market = Some(Market { id: id.into(), handle: handle.into() });
        self
    }

    /// Marks the purchase as made on behalf of a company.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_purchasing_company(mut self, company_id: impl Into<String>) -> Self {
        self.purchasing_company = Some(company_id.into());
        self
    }

    /// Marks the render as happening in the editor.
    #[must_use]
    pub fn in_editor(mut self) -> Self {
        self.editor = true;
        self
    }

    /// Sets the order id.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    /// Returns true for B2B purchases, where referral programs do not apply.
    #[must_use]
    pub const fn is_b2b_purchase(&self) -> bool {
        self.purchasing_company.is_some()
    }

    /// Returns true in authoring/preview context.
    #[must_use]
    pub const fn is_editor(&self) -> bool {
        self.editor
    }

    /// Builds the locale context used to key the entry point request.
    #[must_use]
    pub fn locale_context(&self) -> LocaleContext {
        LocaleContext {
            shop_domain: self.shop_domain.clone(),
            extension_surface: self.extension_surface,
            extension_language: self.extension_language.clone(),
            language: self.language.clone(),
            country: self.country.clone(),
            currency: self.currency.clone(),
            market_id: self.market.as_ref().map(|m| m.id.clone()),
            market_handle: self.market.as_ref().map(|m| m.handle.clone()),
        }
    }
}
