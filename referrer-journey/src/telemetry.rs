//! Error reporting for failed journeys.
//!
//! Every transition into a fetch-failure state produces one [`ErrorEvent`].
//! Where it goes is up to the host: [`TracingReporter`] writes it to `tracing`
//! under the `referrer_journey::telemetry` target so it can be routed to an
//! error tracker by the subscriber.

use std::{fmt, time::SystemTime};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::ExtensionSurface;

/// Component tag attached to events raised by the journey state machine.
pub const JOURNEY_COMPONENT: &str = "ReferrerJourney";

/// Structured error event.
///
/// # Examples
///
/// ```
/// use referrer_journey::{
///     context::ExtensionSurface,
///     telemetry::{ErrorEvent, ErrorReporter, TracingReporter},
/// };
///
/// let event = ErrorEvent::new("ReferrerJourney", "HTTP request failed: timed out")
///     .with_shop_domain("example.myshopify.com")
///     .with_surface(ExtensionSurface::ThankYou);
///
/// TracingReporter.report(&event);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    /// Unique id of this event.
    pub event_id: Uuid,
    /// When the event was raised.
    pub timestamp: SystemTime,
    /// Component that raised the event.
    pub component: String,
    /// Human-readable failure reason.
    pub reason: String,
    /// Shop the failure happened on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_domain: Option<String>,
    /// Surface the failure happened on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface: Option<ExtensionSurface>,
    /// Mention Me environment in use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Order being confirmed, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

impl ErrorEvent {
    /// Creates an event for a component and reason.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn new(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: SystemTime::now(),
            component: component.into(),
            reason: reason.into(),
            shop_domain: None,
            surface: None,
            environment: None,
            order_id: None,
        }
    }

    /// Adds the shop domain.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_shop_domain(mut self, shop_domain: impl Into<String>) -> Self {
        self.shop_domain = Some(shop_domain.into());
        self
    }

    /// Adds the surface.
    #[must_use]
    pub fn with_surface(mut self, surface: ExtensionSurface) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Adds the environment.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Adds the order id.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }
}

/// Sink for [`ErrorEvent`]s.
///
/// Called once per failure transition, never from a render path.
pub trait ErrorReporter: Send + Sync + fmt::Debug {
    /// Records an event.
    fn report(&self, event: &ErrorEvent);
}

/// Reporter writing events to `tracing` at `ERROR` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, event: &ErrorEvent) {
        tracing::error!(
            target: "referrer_journey::telemetry",
            event_id = %event.event_id,
            component = %event.component,
            reason = %event.reason,
            shop_domain = event.shop_domain.as_deref(),
            surface = event.surface.map(ExtensionSurface::as_str),
            environment = event.environment.as_deref(),
            order_id = event.order_id.as_deref(),
            "referrer journey failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let event = ErrorEvent::new(JOURNEY_COMPONENT, "boom")
            .with_shop_domain("example.myshopify.com")
            .with_surface(ExtensionSurface::OrderStatus)
            .with_environment("demo")
            .with_order_id("gid://shopify/OrderIdentity/1");

        assert_eq!(event.component, "ReferrerJourney");
        assert_eq!(event.reason, "boom");
        assert_eq!(event.surface, Some(ExtensionSurface::OrderStatus));
        assert_eq!(event.order_id.as_deref(), Some("gid://shopify/OrderIdentity/1"));
    }

    #[test]
    fn test_event_ids_are_unique() {
        let first = ErrorEvent::new(JOURNEY_COMPONENT, "boom");
        let second = ErrorEvent::new(JOURNEY_COMPONENT, "boom");
        assert_ne!(first.event_id, second.event_id);
    }

    #[test]
    fn test_event_serialization_skips_absent_tags() {
        let event = ErrorEvent::new(JOURNEY_COMPONENT, "boom").with_surface(ExtensionSurface::ThankYou);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["surface"], "thank-you");
        assert!(json.get("shop_domain").is_none());
        assert!(json.get("order_id").is_none());
    }

    #[test]
    fn test_tracing_reporter_does_not_panic_without_subscriber() {
        TracingReporter.report(&ErrorEvent::new(JOURNEY_COMPONENT, "boom"));
    }
}
