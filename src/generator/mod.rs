//! Recipe request coordination.
//!
//! - [`transport`]: the [`RecipeApi`] seam and its `reqwest` implementation
//! - [`notifier`]: injected notice sink (no process-wide toast singleton)
//! - [`coordinator`]: [`RecipeGenerator`], the observable single-flight state

pub mod coordinator;
pub mod notifier;
pub mod transport;

pub use coordinator::{
    GeneratorState, NO_INGREDIENTS_CODE, NO_INGREDIENTS_MESSAGE, RecipeGenerator, failure_message,
};
pub use notifier::{Notice, Notifier, RecordingNotifier, TracingNotifier};
pub use transport::{HttpRecipeApi, NETWORK_FAILURE_MESSAGE, NetworkError, RecipeApi};
