//! Single-flight recipe request coordinator.
//!
//! [`RecipeGenerator`] owns the observable state for one request/response
//! cycle against the recipe service. Each [`generate`](RecipeGenerator::generate)
//! call takes a ticket from a monotonic counter; when it completes, its result
//! is applied only if no newer call has started since. `loading` is cleared on
//! every exit path, including when the future is dropped mid-flight.

use super::notifier::{Notifier, TracingNotifier};
use super::transport::RecipeApi;
use crate::types::{CookingRequest, CookingResponse, Recipe, ValidationError};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Error code the service uses when it found nothing edible in the photo.
pub const NO_INGREDIENTS_CODE: &str = "NO_INGREDIENTS";

/// Replaces the service message for [`NO_INGREDIENTS_CODE`].
pub const NO_INGREDIENTS_MESSAGE: &str =
    "Could not recognize any ingredients in the photo. Try a photo taken in a brighter place.";

pub const INPUT_ERROR_PREFIX: &str = "input error: ";

pub const SERVICE_ERROR_NOTICE: &str = "An error occurred";
pub const CONNECTION_ERROR_NOTICE: &str = "Connection error";
pub const CACHED_NOTICE: &str = "Served from cache";

/// State exposed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorState {
    pub recipes: Vec<Recipe>,
    pub loading: bool,
    pub error: Option<String>,
    /// Meaningful only after a successful response.
    pub cached: bool,
}

/// Display message for a failed response.
///
/// `NO_INGREDIENTS` wins over everything; otherwise validation messages are
/// joined; otherwise the service's own message is used.
pub fn failure_message(
    code: Option<&str>,
    errors: Option<&[ValidationError]>,
    message: &str,
) -> String {
    if code == Some(NO_INGREDIENTS_CODE) {
        return NO_INGREDIENTS_MESSAGE.to_string();
    }
    match errors {
        Some(errors) if !errors.is_empty() => {
            let joined: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
            format!("{INPUT_ERROR_PREFIX}{}", joined.join(", "))
        }
        _ => message.to_string(),
    }
}

pub struct RecipeGenerator<A, N = TracingNotifier> {
    api: A,
    notifier: N,
    state: watch::Sender<GeneratorState>,
    latest: AtomicU64,
}

impl<A: RecipeApi> RecipeGenerator<A> {
    pub fn new(api: A) -> Self {
        Self::with_notifier(api, TracingNotifier)
    }
}

impl<A: RecipeApi, N: Notifier> RecipeGenerator<A, N> {
    pub fn with_notifier(api: A, notifier: N) -> Self {
        let (state, _) = watch::channel(GeneratorState::default());
        Self {
            api,
            notifier,
            state,
            latest: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> GeneratorState {
        self.state.borrow().clone()
    }

    /// Receiver that wakes on every state change.
    pub fn subscribe(&self) -> watch::Receiver<GeneratorState> {
        self.state.subscribe()
    }

    pub fn recipes(&self) -> Vec<Recipe> {
        self.state.borrow().recipes.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn cached(&self) -> bool {
        self.state.borrow().cached
    }

    /// Clear `error`, leaving recipes and the cached flag alone.
    pub fn reset_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    /// Submit `request` and fold the outcome into the state.
    ///
    /// Returns the decoded response, or `None` when the transport failed.
    /// Service-side failures are returned as `Some(CookingResponse::Failure)`.
    pub async fn generate(&self, request: &CookingRequest) -> Option<CookingResponse> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        let _guard = LoadingGuard {
            state: &self.state,
            latest: &self.latest,
            ticket,
        };
        debug!(ticket, "submitting cooking request");

        match self.api.cook(request).await {
            Ok(response) => {
                match &response {
                    CookingResponse::Success {
                        recipes, cached, ..
                    } => {
                        let applied = self.apply(ticket, |s| {
                            s.recipes = recipes.clone();
                            s.cached = *cached;
                        });
                        if applied && *cached {
                            self.notifier.notify_info(CACHED_NOTICE);
                        }
                    }
                    CookingResponse::Failure {
                        message,
                        code,
                        errors,
                        ..
                    } => {
                        let text = failure_message(code.as_deref(), errors.as_deref(), message);
                        if self.apply(ticket, |s| s.error = Some(text)) {
                            self.notifier.notify_error(SERVICE_ERROR_NOTICE);
                        }
                    }
                }
                Some(response)
            }
            Err(e) => {
                let text = e.user_message();
                if self.apply(ticket, |s| s.error = Some(text)) {
                    self.notifier.notify_error(CONNECTION_ERROR_NOTICE);
                }
                None
            }
        }
    }

    /// Apply `update` and clear `loading` if `ticket` is still the latest call.
    fn apply(&self, ticket: u64, update: impl FnOnce(&mut GeneratorState)) -> bool {
        let applied = self.state.send_if_modified(|s| {
            if self.latest.load(Ordering::SeqCst) != ticket {
                return false;
            }
            update(s);
            s.loading = false;
            true
        });
        if !applied {
            warn!(ticket, "discarding result of superseded request");
        }
        applied
    }
}

/// Clears `loading` when the owning call ends, unless a newer call owns it.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<GeneratorState>,
    latest: &'a AtomicU64,
    ticket: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|s| {
            self.latest.load(Ordering::SeqCst) == self.ticket && std::mem::take(&mut s.loading)
        });
    }
}
