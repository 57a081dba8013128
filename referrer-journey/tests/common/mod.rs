//! Shared fixtures for journey integration tests.

#![allow(dead_code, reason = "not every test binary uses every fixture")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use referrer_journey::{
    EntryPointFetcher, EntryPointResponse, JourneyError, MerchantConfig,
    config::ValidatedConfig,
    context::{ContextKey, ExtensionSurface},
    host::HostContext,
    telemetry::{ErrorEvent, ErrorReporter},
};
use tokio::sync::oneshot;

pub type FetchResult = referrer_journey::Result<Option<EntryPointResponse>>;

/// Answer the fetcher gives for one context key.
pub enum Script {
    /// Resolve immediately.
    Ready(FetchResult),
    /// Resolve when the test sends on the paired channel.
    Deferred(oneshot::Receiver<FetchResult>),
}

/// Fetcher answering from per-key scripts and recording every call.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<String>>,
}

impl std::fmt::Debug for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Self::Deferred(_) => f.write_str("Deferred"),
        }
    }
}

impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn ready(&self, host: &HostContext, result: FetchResult) {
        self.scripts.lock().unwrap().insert(fingerprint(host), Script::Ready(result));
    }

    pub fn deferred(&self, host: &HostContext) -> oneshot::Sender<FetchResult> {
        let (tx, rx) = oneshot::channel();
        self.scripts.lock().unwrap().insert(fingerprint(host), Script::Deferred(rx));
        tx
    }

    /// Fingerprints of every fetch made, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl EntryPointFetcher for ScriptedFetcher {
    async fn fetch<'a>(
        &'a self,
        _config: &'a ValidatedConfig,
        key: &'a ContextKey,
        _surface: ExtensionSurface,
    ) -> FetchResult {
        let fingerprint = key.fingerprint();
        self.calls.lock().unwrap().push(fingerprint.clone());
        let script = self.scripts.lock().unwrap().remove(&fingerprint);

        match script {
            Some(Script::Ready(result)) => result,
            Some(Script::Deferred(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(JourneyError::TransportError("script dropped".into()))),
            None => Ok(None),
        }
    }
}

/// Reporter keeping every event.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ErrorEvent>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<ErrorEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, event: &ErrorEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn fingerprint(host: &HostContext) -> String {
    host.locale_context().key().fingerprint()
}

pub fn host(currency: &str) -> HostContext {
    HostContext::new("example.myshopify.com", ExtensionSurface::ThankYou, "en", currency)
        .with_country("GB")
        .with_order_id("gid://shopify/OrderIdentity/1001")
}

pub fn config() -> MerchantConfig {
    MerchantConfig::new("mm-partner", "production")
}

pub fn entry_point(headline: &str) -> EntryPointResponse {
    EntryPointResponse {
        headline: headline.to_owned(),
        description: "Share with friends and you both get a reward".to_owned(),
        image_url: Some("https://cdn.mention-me.com/offer.png".to_owned()),
        url: "https://mention-me.com/r/abc".to_owned(),
        default_call_to_action: "Refer now".to_owned(),
        privacy_notice: "Mention Me processes your data".to_owned(),
        privacy_notice_url: "https://mention-me.com/privacy".to_owned(),
        privacy_notice_link_text: None,
    }
}
