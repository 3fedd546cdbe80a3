//! Unified error handling with Sentry integration.
//!
//! Module errors roll up into [`StorefrontError`]. UI code shows
//! [`StorefrontError::user_message`] and calls [`StorefrontError::report`],
//! which sends faults (not customer mistakes) to Sentry.

use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::content::ContentError;
use crate::identity::IdentityError;
use crate::payment::PaymentError;
use crate::store::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Content store operation failed.
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// Sign-in or account operation failed.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Payment gateway operation failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Checkout did not reach the payment widget.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Local persistence failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorefrontError {
    /// Whether this is a fault worth tracking, as opposed to something the
    /// customer can fix.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        match self {
            Self::Config(_)
            | Self::Payment(_)
            | Self::Storage(_)
            | Self::Internal(_) => true,
            Self::Content(e) => !matches!(e, ContentError::NotFound(_)),
            Self::Identity(e) => e.is_fault(),
            Self::Checkout(e) => matches!(
                e,
                CheckoutError::OrderNotCreated(_)
                    | CheckoutError::Payment(_)
                    | CheckoutError::Amount(_)
            ),
            Self::NotFound(_) => false,
        }
    }

    /// Capture to Sentry and log, if reportable. Returns the Sentry event id.
    pub fn report(&self) -> Option<sentry::types::Uuid> {
        if !self.is_reportable() {
            return None;
        }

        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Storefront error"
        );
        Some(event_id)
    }

    /// Text safe to show the customer; never exposes internal details.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Content(ContentError::NotFound(_)) | Self::NotFound(_) => {
                "We couldn't find what you were looking for.".to_string()
            }
            Self::Content(ContentError::RateLimited(_)) => {
                "We're getting a lot of requests. Please try again in a moment.".to_string()
            }
            Self::Content(_) => {
                "Our store is temporarily unavailable. Please try again.".to_string()
            }
            Self::Identity(e) => e.user_message().to_string(),
            Self::Payment(_) => "Payment service error. Please try again.".to_string(),
            Self::Checkout(e) => e.notice().message,
            Self::Storage(_) => "We couldn't save your changes on this device.".to_string(),
            Self::Config(_) | Self::Internal(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for customer actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("checkout", "Order created", Some(&[("order_id", "ORD-1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
