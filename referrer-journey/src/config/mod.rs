//! Configuration layer.
//!
//! - [`merchant`]: the merchant's app settings and the validator gating all
//!   network activity
//! - [`settings`]: deployment settings for the HTTP transport

pub mod merchant;
pub mod settings;

pub use merchant::{ConfigValidation, MerchantConfig, ValidatedConfig};
pub use settings::{HttpConfig, JourneySettings};
