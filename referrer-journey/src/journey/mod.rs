//! Referrer journey state container.
//!
//! A [`ReferrerJourney`] is the single owner of one mount's [`JourneyState`].
//! Hosts feed it inputs with [`ReferrerJourney::evaluate`] on every render and
//! read the result through [`ReferrerJourney::snapshot`] or a
//! [`JourneySubscription`].
//!
//! # State Transitions
//!
//! ```text
//! Uninitialized ──[invalid config]──────────────> Error(reason)
//!       │
//!       └──[valid config]──> Loading ──[Ok(r)]──> Success(r)
//!                               │
//!                               └────[Err(e)]───> Error(e)
//!
//! any state ──[inputs changed]──> Loading | Error   (never Uninitialized)
//! ```
//!
//! Each change of inputs starts a new generation. A fetch that resolves for a
//! retired generation, or after the journey was unmounted, is discarded.
//!
//! # Examples
//!
//! ```rust,no_run
//! use referrer_journey::{
//!     config::MerchantConfig,
//!     context::ExtensionSurface,
//!     entry_point::HttpEntryPointFetcher,
//!     host::HostContext,
//!     journey::ReferrerJourney,
//!     render::RenderDecision,
//! };
//!
//! # async fn example() -> referrer_journey::error::Result<()> {
//! let journey = ReferrerJourney::new(HttpEntryPointFetcher::new()?);
//! let host = HostContext::new("example.myshopify.com", ExtensionSurface::ThankYou, "en", "GBP");
//! let config = MerchantConfig::new("mm-partner", "production");
//!
//! journey.evaluate_host(config, &host, ExtensionSurface::ThankYou);
//!
//! let mut subscription = journey.subscribe();
//! subscription.wait_for(|snapshot| !snapshot.loading).await;
//!
//! if let RenderDecision::Populated(entry_point) = journey.render(&host) {
//!     println!("{}", entry_point.headline);
//! }
//! # Ok(())
//! # }
//! ```

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde::Serialize;
use tokio::{runtime::Handle, sync::watch, task::JoinHandle};
use tracing::instrument;

use crate::{
    config::{ConfigValidation, MerchantConfig, ValidatedConfig, merchant::validate_fields},
    context::{ContextKey, ExtensionSurface, LocaleContext},
    entry_point::{EntryPointFetcher, EntryPointResponse},
    error::{JourneyError, Result},
    host::HostContext,
    render::{self, RenderDecision},
    telemetry::{ErrorEvent, ErrorReporter, JOURNEY_COMPONENT, TracingReporter},
};

/// Lifecycle of one journey.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum JourneyState {
    /// Created but not evaluated yet.
    #[default]
    Uninitialized,
    /// Entry point request in flight.
    Loading,
    /// Request finished; `None` means the customer has no active journey.
    Success(Option<EntryPointResponse>),
    /// Configuration was invalid or the request failed.
    Error(String),
}

impl JourneyState {
    /// Returns true for `Success` and `Error`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Error(_))
    }
}

/// Read-only view of a journey, as handed to consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneySnapshot {
    /// Partner code exactly as configured.
    pub partner_code: Option<String>,
    /// Environment exactly as configured.
    pub environment: Option<String>,
    /// True only while the entry point request is in flight.
    pub loading: bool,
    /// Failure reason, set only in the error state.
    pub error_state: Option<String>,
    /// Entry point, set only on success with an active journey.
    pub referrer_entry_point_response: Option<EntryPointResponse>,
}

impl JourneySnapshot {
    fn from_parts(config: &MerchantConfig, state: &JourneyState) -> Self {
        let (loading, error_state, referrer_entry_point_response) = match state {
            JourneyState::Uninitialized => (false, None, None),
            JourneyState::Loading => (true, None, None),
            JourneyState::Success(response) => (false, None, response.clone()),
            JourneyState::Error(reason) => (false, Some(reason.clone()), None),
        };

        Self {
            partner_code: config.partner_code.clone(),
            environment: config.environment.clone(),
            loading,
            error_state,
            referrer_entry_point_response,
        }
    }

    /// Validates the configuration the snapshot was taken with.
    #[must_use]
    pub fn config_validation(&self) -> ConfigValidation {
        validate_fields(self.environment.as_deref(), self.partner_code.as_deref())
    }
}

/// Inputs that identify one entry point request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Request {
    config: MerchantConfig,
    key: ContextKey,
    surface: ExtensionSurface,
}

#[derive(Debug)]
struct Inner {
    state: JourneyState,
    config: MerchantConfig,
    current: Option<Request>,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
    mounted: bool,
    order_id: Option<String>,
    reported: HashSet<(Request, String)>,
}

#[derive(Debug)]
struct Shared {
    inner: Mutex<Inner>,
    snapshots: watch::Sender<JourneySnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, inner: &mut Inner, state: JourneyState) {
        tracing::trace!(from = ?inner.state, to = ?state, "journey transition");
        inner.state = state;
        self.snapshots.send_replace(JourneySnapshot::from_parts(&inner.config, &inner.state));
    }

    /// Applies a fetch outcome if its generation is still current.
    fn settle(
        &self,
        generation: u64,
        config: &ValidatedConfig,
        request: &Request,
        outcome: Result<Option<EntryPointResponse>>,
        reporter: &dyn ErrorReporter,
    ) {
        let event = {
            let mut inner = self.lock();

            if !inner.mounted {
                tracing::debug!(generation, "discarding entry point resolved after unmount");
                return;
            }
            if inner.generation != generation {
                tracing::debug!(
                    generation,
                    current = inner.generation,
                    "discarding entry point for superseded inputs"
                );
                return;
            }

            inner.in_flight = None;
            match outcome {
                Ok(response) => {
                    self.transition(&mut inner, JourneyState::Success(response));
                    None
                }
                Err(error) => {
                    let reason = error.to_string();
                    let first = inner.reported.insert((request.clone(), reason.clone()));
                    let order_id = inner.order_id.clone();
                    self.transition(&mut inner, JourneyState::Error(reason.clone()));

                    first.then(|| {
                        let event = ErrorEvent::new(JOURNEY_COMPONENT, reason)
                            .with_shop_domain(request.key.shop_domain())
                            .with_surface(request.surface)
                            .with_environment(config.environment());
                        match order_id {
                            Some(order_id) => event.with_order_id(order_id),
                            None => event,
                        }
                    })
                }
            }
        };

        if let Some(event) = event {
            reporter.report(&event);
        }
    }
}

/// State container for one mount of the referrer journey.
///
/// Dropping the journey unmounts it: in-flight work is aborted and any late
/// resolution is ignored.
#[derive(Debug)]
pub struct ReferrerJourney<F> {
    fetcher: Arc<F>,
    reporter: Arc<dyn ErrorReporter>,
    shared: Arc<Shared>,
}

impl<F: EntryPointFetcher + 'static> ReferrerJourney<F> {
    /// Creates an uninitialized journey reporting failures to `tracing`.
    #[must_use]
    pub fn new(fetcher: F) -> Self {
        Self::with_reporter(fetcher, Arc::new(TracingReporter))
    }

    /// Creates an uninitialized journey with a custom error reporter.
    #[must_use]
    pub fn with_reporter(fetcher: F, reporter: Arc<dyn ErrorReporter>) -> Self {
        let inner = Inner {
            state: JourneyState::Uninitialized,
            config: MerchantConfig::default(),
            current: None,
            generation: 0,
            in_flight: None,
            mounted: true,
            order_id: None,
            reported: HashSet::new(),
        };
        let (snapshots, _) = watch::channel(JourneySnapshot::default());

        Self {
            fetcher: Arc::new(fetcher),
            reporter,
            shared: Arc::new(Shared { inner: Mutex::new(inner), snapshots }),
        }
    }

    /// Feeds the current render's inputs into the state machine.
    ///
    /// Returns `true` if the inputs differed from the previous evaluation and
    /// a transition happened, `false` if they were equal and nothing was done.
    ///
    /// A valid configuration moves the journey to `Loading` and spawns the
    /// fetch on the current tokio runtime. Without a runtime the journey moves
    /// to `Error` instead.
    #[instrument(
        skip(self, config, locale, surface),
        fields(shop_domain = %locale.shop_domain, surface = %surface)
    )]
    pub fn evaluate(
        &self,
        config: MerchantConfig,
        locale: &LocaleContext,
        surface: ExtensionSurface,
    ) -> bool {
        let request = Request { config, key: locale.key(), surface };

        let mut inner = self.shared.lock();
        if inner.current.as_ref() == Some(&request) {
            return false;
        }

        if let Some(stale) = inner.in_flight.take() {
            tracing::debug!(generation = inner.generation, "superseding in-flight entry point request");
            stale.abort();
        }

        inner.generation += 1;
        let generation = inner.generation;
        inner.config = request.config.clone();
        inner.current = Some(request.clone());

        match request.config.validated() {
            Err(error) => {
                tracing::warn!(
                    component = "Extension",
                    partner_code = ?request.config.partner_code,
                    environment = ?request.config.environment,
                    "{error}"
                );
                self.shared.transition(&mut inner, JourneyState::Error(error.to_string()));
            }
            Ok(validated) => match Handle::try_current() {
                Err(e) => {
                    let error = JourneyError::TransportError(format!("no tokio runtime: {e}"));
                    tracing::warn!(generation, "{error}");
                    self.shared.transition(&mut inner, JourneyState::Error(error.to_string()));
                }
                Ok(runtime) => {
                    self.shared.transition(&mut inner, JourneyState::Loading);
                    let handle = runtime.spawn(resolve(
                        Arc::clone(&self.shared),
                        Arc::clone(&self.fetcher),
                        Arc::clone(&self.reporter),
                        generation,
                        validated,
                        request,
                    ));
                    inner.in_flight = Some(handle);
                }
            },
        }

        true
    }

    /// Evaluates inputs read from the host, recording the order id for telemetry.
    pub fn evaluate_host(
        &self,
        config: MerchantConfig,
        host: &HostContext,
        surface: ExtensionSurface,
    ) -> bool {
        self.shared.lock().order_id.clone_from(&host.order_id);
        self.evaluate(config, &host.locale_context(), surface)
    }
}

impl<F> ReferrerJourney<F> {
    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> JourneySnapshot {
        self.shared.snapshots.borrow().clone()
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> JourneyState {
        self.shared.lock().state.clone()
    }

    /// Subscribes to snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> JourneySubscription {
        JourneySubscription { receiver: self.shared.snapshots.subscribe() }
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.snapshots.receiver_count()
    }

    /// Decides what to render for the current snapshot.
    #[must_use]
    pub fn render(&self, host: &HostContext) -> RenderDecision {
        render::decide(&self.snapshot(), host.is_editor(), host.is_b2b_purchase())
    }

    /// Tears the journey down.
    pub fn unmount(self) {
        drop(self);
    }
}

impl<F> Drop for ReferrerJourney<F> {
    fn drop(&mut self) {
        let mut inner = self.shared.lock();
        inner.mounted = false;
        if let Some(handle) = inner.in_flight.take() {
            handle.abort();
        }
    }
}

async fn resolve<F: EntryPointFetcher>(
    shared: Arc<Shared>,
    fetcher: Arc<F>,
    reporter: Arc<dyn ErrorReporter>,
    generation: u64,
    config: ValidatedConfig,
    request: Request,
) {
    let outcome = fetcher.fetch(&config, &request.key, request.surface).await;
    shared.settle(generation, &config, &request, outcome, reporter.as_ref());
}

/// Subscription to a journey's snapshots.
///
/// Dropping it, or calling [`unsubscribe`](Self::unsubscribe), ends the subscription.
#[derive(Debug)]
pub struct JourneySubscription {
    receiver: watch::Receiver<JourneySnapshot>,
}

impl JourneySubscription {
    /// Returns the latest snapshot without marking it seen.
    #[must_use]
    pub fn current(&self) -> JourneySnapshot {
        self.receiver.borrow().clone()
    }

    /// Waits for the next snapshot.
    ///
    /// Returns `None` once the journey is gone.
    pub async fn changed(&mut self) -> Option<JourneySnapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Waits until a snapshot satisfies `predicate`, checking the current one first.
    ///
    /// Returns `None` if the journey goes away first.
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&JourneySnapshot) -> bool,
    ) -> Option<JourneySnapshot> {
        self.receiver
            .wait_for(predicate)
            .await
            .ok()
            .map(|snapshot| JourneySnapshot::clone(&snapshot))
    }

    /// Ends the subscription.
    pub fn unsubscribe(self) {
        drop(self);
    }
}
