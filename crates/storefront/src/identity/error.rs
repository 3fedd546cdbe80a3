//! Identity error types and the provider error-code table.

use ambre_core::EmailError;
use thiserror::Error;

/// Error codes reported by the identity provider.
///
/// The browser SDK reports `auth/kebab-case` codes and the REST API reports
/// `SCREAMING_CASE` messages; both map onto the same variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    InvalidEmail,
    UserNotFound,
    WrongPassword,
    InvalidCredential,
    EmailAlreadyInUse,
    WeakPassword,
    UserDisabled,
    TooManyRequests,
    NetworkRequestFailed,
    PopupClosedByUser,
    PopupBlocked,
    CancelledPopupRequest,
    RequiresRecentLogin,
    /// Anything not in the table, kept verbatim for logs.
    Other(String),
}

impl AuthErrorCode {
    /// Map a provider code onto the table.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        // REST messages may carry detail after the code: "WEAK_PASSWORD : ...".
        let code = code.split(" : ").next().unwrap_or_default().trim();
        let kebab = code.strip_prefix("auth/").unwrap_or(code);

        match kebab {
            "invalid-email" | "INVALID_EMAIL" => Self::InvalidEmail,
            "user-not-found" | "EMAIL_NOT_FOUND" => Self::UserNotFound,
            "wrong-password" | "INVALID_PASSWORD" => Self::WrongPassword,
            "invalid-credential" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_IDP_RESPONSE" => {
                Self::InvalidCredential
            }
            "email-already-in-use" | "EMAIL_EXISTS" => Self::EmailAlreadyInUse,
            "weak-password" | "WEAK_PASSWORD" => Self::WeakPassword,
            "user-disabled" | "USER_DISABLED" => Self::UserDisabled,
            "too-many-requests" | "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyRequests,
            "network-request-failed" => Self::NetworkRequestFailed,
            "popup-closed-by-user" => Self::PopupClosedByUser,
            "popup-blocked" => Self::PopupBlocked,
            "cancelled-popup-request" => Self::CancelledPopupRequest,
            "requires-recent-login" | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" | "TOKEN_EXPIRED" => {
                Self::RequiresRecentLogin
            }
            _ => Self::Other(code.to_owned()),
        }
    }

    /// Customer-facing message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::UserNotFound => "No account found with this email.",
            Self::WrongPassword => "Incorrect password. Please try again.",
            Self::InvalidCredential => "Invalid email or password.",
            Self::EmailAlreadyInUse => "An account with this email already exists.",
            Self::WeakPassword => "Password should be at least 6 characters.",
            Self::UserDisabled => "This account has been disabled.",
            Self::TooManyRequests => "Too many attempts. Please try again later.",
            Self::NetworkRequestFailed => "Network error. Please check your connection.",
            Self::PopupClosedByUser => "Sign-in popup was closed before completing.",
            Self::PopupBlocked => "Sign-in popup was blocked by the browser.",
            Self::CancelledPopupRequest => "Sign-in was cancelled.",
            Self::RequiresRecentLogin => "Please sign in again to continue.",
            Self::Other(_) => "Something went wrong. Please try again.",
        }
    }
}

impl std::fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Other(code) => write!(f, "unmapped auth error {code}"),
            known => f.write_str(known.message()),
        }
    }
}

/// Errors that can occur during sign-in, sign-up and account recovery.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider rejected the request.
    #[error("authentication failed: {0}")]
    Auth(AuthErrorCode),

    /// Invalid email format, caught before any request.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl IdentityError {
    /// Build from a provider error code.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        Self::Auth(AuthErrorCode::from_code(code))
    }

    /// The table entry this error falls under.
    #[must_use]
    pub fn code(&self) -> AuthErrorCode {
        match self {
            Self::Auth(code) => code.clone(),
            Self::InvalidEmail(_) => AuthErrorCode::InvalidEmail,
            Self::Http(_) => AuthErrorCode::NetworkRequestFailed,
            Self::Parse(e) => AuthErrorCode::Other(e.to_string()),
        }
    }

    /// Customer-facing message; never exposes internal details.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        self.code().message()
    }

    /// Whether this is a provider or transport fault rather than a customer
    /// mistake.
    #[must_use]
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Auth(AuthErrorCode::Other(_)))
    }
}
