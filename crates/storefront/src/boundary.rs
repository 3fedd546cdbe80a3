//! Fault boundary for views.
//!
//! A view that panics must not take the whole storefront down. Views run on
//! their own task through [`run_guarded`]; a panic is reported and replaced
//! with a [`RecoveryScreen`]. No state is recovered.

use std::any::Any;
use std::future::Future;

/// What the customer can do from the recovery screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    Reload,
    GoHome,
}

impl RecoveryAction {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Reload => "Reload page",
            Self::GoHome => "Go to homepage",
        }
    }
}

/// Replacement content for a view that crashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryScreen {
    pub title: String,
    pub message: String,
    pub actions: Vec<RecoveryAction>,
    /// Sentry event for support requests.
    pub event_id: Option<String>,
}

impl Default for RecoveryScreen {
    fn default() -> Self {
        Self {
            title: "Something went wrong".to_string(),
            message: "We're sorry, an unexpected error occurred. Please reload the page or \
                      return to the homepage."
                .to_string(),
            actions: vec![RecoveryAction::Reload, RecoveryAction::GoHome],
            event_id: None,
        }
    }
}

/// Run `view` on its own task; a panic becomes a [`RecoveryScreen`].
///
/// # Errors
///
/// Returns the recovery screen if the view panicked or was cancelled.
pub async fn run_guarded<F, T>(view: F) -> Result<T, RecoveryScreen>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(view).await {
        Ok(value) => Ok(value),
        Err(e) => {
            let reason = if e.is_panic() {
                panic_message(e.into_panic())
            } else {
                "view task was cancelled".to_string()
            };

            let event_id = sentry::capture_message(
                &format!("View crashed: {reason}"),
                sentry::Level::Error,
            );
            tracing::error!(
                reason = %reason,
                sentry_event_id = %event_id,
                "View crashed, showing recovery screen"
            );

            Err(RecoveryScreen {
                event_id: Some(event_id.to_string()),
                ..RecoveryScreen::default()
            })
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
