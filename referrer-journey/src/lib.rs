//! Referrer Journey: Mention Me referral offers for post-purchase checkout surfaces
//!
//! A Rust library that decides whether, and with what content, a Mention Me
//! referral offer is shown on a shop's order confirmation ("thank you") and
//! order status pages.
//!
//! # What is Referrer Journey?
//!
//! After a purchase the shop may invite the buyer to refer friends. The offer
//! comes from the Mention Me partner service and depends on the merchant's
//! settings and the buyer's locale. This library provides:
//!
//! - **Configuration Validation**: Missing or blank settings never reach the network
//! - **Context Keys**: Canonical, order-independent identity of a request
//! - **One Fetch per Key**: A mount never issues two requests for the same inputs
//! - **Race Safety**: Results for superseded inputs or unmounted journeys are dropped
//! - **Pure Rendering**: One function maps state and host flags to what is shown
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Host checkout  │  settings, locale, editor flag, B2B flag
//! └────────┬────────┘
//!          │ evaluate() on every render
//!          │
//! ┌────────▼────────────────────────────────────────┐
//! │             ReferrerJourney (this crate)        │
//! │  ┌──────────────┐      ┌──────────────────┐     │
//! │  │ Config +     │──────│  JourneyState    │     │
//! │  │ ContextKey   │      │  (watch channel) │     │
//! │  └──────────────┘      └────────┬─────────┘     │
//! │                                 │ snapshot      │
//! │                        ┌────────▼─────────┐     │
//! │                        │  render::decide  │     │
//! │                        └──────────────────┘     │
//! └────────┬────────────────────────────────────────┘
//!          │ HTTPS POST /api/entry-point/v2/referrer
//!          │
//! ┌────────▼────────┐
//! │  Mention Me     │  production or demo environment
//! └─────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use referrer_journey::{
//!     HttpEntryPointFetcher, MerchantConfig, ReferrerJourney, RenderDecision,
//!     context::ExtensionSurface, host::HostContext,
//! };
//!
//! # async fn example() -> referrer_journey::Result<()> {
//! let journey = ReferrerJourney::new(HttpEntryPointFetcher::new()?);
//!
//! let host = HostContext::new("example.myshopify.com", ExtensionSurface::ThankYou, "en", "GBP")
//!     .with_country("GB");
//! let settings = MerchantConfig::from_json(r#"{"partnerCode": "mm-1234", "environment": "demo"}"#)?;
//!
//! journey.evaluate_host(settings, &host, ExtensionSurface::ThankYou);
//! assert_eq!(journey.render(&host), RenderDecision::Skeleton);
//!
//! journey.subscribe().wait_for(|snapshot| !snapshot.loading).await;
//!
//! match journey.render(&host) {
//!     RenderDecision::Populated(offer) => println!("{}: {}", offer.headline, offer.url),
//!     RenderDecision::DiagnosticBanner(text) => println!("editor warning: {text}"),
//!     RenderDecision::Skeleton | RenderDecision::Suppressed => {}
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`config`]: Merchant settings validation and HTTP/environment settings
//! - [`context`]: Locale context and the canonical request key
//! - [`entry_point`]: Entry point payload, fetcher trait and HTTP fetcher
//! - [`journey`]: Per-mount state container with subscriptions
//! - [`render`]: Pure render gate
//! - [`host`]: Values read from the host checkout runtime
//! - [`telemetry`]: Error events and reporters
//! - [`error`]: Error types
//!
//! # Security Considerations
//!
//! - **HTTPS only**: Environment base URLs must use HTTPS and may not be loopback
//! - **No shopper-facing errors**: Banners are only produced in editor context
//! - **No B2B offers**: Purchases made for a company never show the journey
//!
//! # Error Handling
//!
//! Fallible operations return [`Result<T, JourneyError>`](error::Result). Inside
//! a journey, errors become [`JourneyState::Error`] and are reported once:
//!
//! ```rust
//! use referrer_journey::{JourneyError, MerchantConfig};
//!
//! match MerchantConfig::new("", "production").validated() {
//!     Ok(config) => println!("partner {}", config.partner_code()),
//!     Err(JourneyError::InvalidPartnerCode) => {
//!         // Ask the merchant to set the partner code
//!     }
//!     Err(e) => eprintln!("Other error: {e}"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest"
)]

pub mod config;
pub mod context;
pub mod entry_point;
pub mod error;
pub mod host;
pub mod journey;
pub mod render;
pub mod telemetry;

pub use config::{ConfigValidation, MerchantConfig};
pub use entry_point::{EntryPointFetcher, EntryPointResponse, HttpEntryPointFetcher};
pub use error::{JourneyError, Result};
pub use journey::{JourneySnapshot, JourneyState, ReferrerJourney};
pub use render::RenderDecision;
