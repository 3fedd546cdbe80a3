//! Customer identity: sign-in, sign-up, password reset and the session
//! listener.
//!
//! [`IdentityProvider`] is the seam over the hosted identity service;
//! [`IdentityClient`] implements it over REST. [`AuthFlow`] drives the
//! sign-in screens: it keeps the store's user flag in sync and sends the
//! customer back to where a [`LoginRedirect`] was raised (checkout, usually).

mod client;
mod error;

use std::future::Future;

use ambre_core::{Email, UserId};
use tokio::sync::watch;
use tracing::{info, instrument};

use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::store::ClientStore;

pub use client::IdentityClient;
pub use error::{AuthErrorCode, IdentityError};

/// Where customers land after signing in when nothing else was pending.
pub const DEFAULT_CONTINUE_TO: &str = "/account";

/// Path of the checkout page.
pub const CHECKOUT_PATH: &str = "/checkout";

/// Minimum password length accepted by the identity service.
const MIN_PASSWORD_LENGTH: usize = 6;

/// How a customer authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Password,
    OAuth(OAuthProvider),
}

/// Federated sign-in providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    /// Provider id as the identity service names it.
    #[must_use]
    pub const fn provider_id(self) -> &'static str {
        match self {
            Self::Google => "google.com",
        }
    }
}

/// A signed-in customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: Email,
    pub display_name: Option<String>,
    pub method: AuthMethod,
}

impl Identity {
    /// Name to greet the customer with: display name, else the email's
    /// local part.
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.email.local_part())
    }

    #[cfg(test)]
    #[allow(clippy::unwrap_used)]
    pub(crate) fn test_user() -> Self {
        Self {
            user_id: UserId::new("user-test"),
            email: Email::parse("meera@example.in").unwrap(),
            display_name: Some("Meera".to_string()),
            method: AuthMethod::Password,
        }
    }
}

/// A page to return to once the customer has signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub return_to: String,
}

impl LoginRedirect {
    #[must_use]
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            return_to: path.into(),
        }
    }

    /// Resume checkout after sign-in.
    #[must_use]
    pub fn checkout() -> Self {
        Self::to(CHECKOUT_PATH)
    }
}

/// Operations of the hosted identity service.
pub trait IdentityProvider: Send + Sync {
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, IdentityError>> + Send;

    /// Create an account, optionally with a display name.
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> impl Future<Output = Result<Identity, IdentityError>> + Send;

    /// Exchange a federated provider's id token for a session.
    fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        id_token: &str,
    ) -> impl Future<Output = Result<Identity, IdentityError>> + Send;

    fn send_password_reset(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send;

    fn sign_out(&self);

    /// The session listener: the current identity, updated on every sign-in
    /// and sign-out.
    fn session(&self) -> watch::Receiver<Option<Identity>>;
}

/// Copy the listener's current identity into the store.
pub fn sync_session(store: &mut ClientStore, session: &watch::Receiver<Option<Identity>>) {
    let current = session.borrow().clone();
    store.set_user(current);
}

/// Result of a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub identity: Identity,
    /// Path to navigate to next.
    pub continue_to: String,
}

/// Sign-in screens' state: the provider and any pending redirect.
pub struct AuthFlow<P> {
    provider: P,
    redirect: Option<LoginRedirect>,
}

impl<P: IdentityProvider> AuthFlow<P> {
    #[must_use]
    pub const fn new(provider: P) -> Self {
        Self {
            provider,
            redirect: None,
        }
    }

    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Remember where to go after the next successful sign-in.
    pub fn require_login(&mut self, redirect: LoginRedirect) {
        self.redirect = Some(redirect);
    }

    #[must_use]
    pub const fn pending_redirect(&self) -> Option<&LoginRedirect> {
        self.redirect.as_ref()
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the provider's error; the pending redirect is kept for a retry.
    #[instrument(skip(self, store, password))]
    pub async fn sign_in(
        &mut self,
        store: &mut ClientStore,
        email: &str,
        password: &str,
    ) -> Result<SignedIn, IdentityError> {
        let identity = self.provider.sign_in_with_password(email, password).await?;
        Ok(self.complete(store, identity))
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Auth(WeakPassword)` for passwords shorter than
    /// six characters without contacting the provider, or the provider's
    /// error.
    #[instrument(skip(self, store, password))]
    pub async fn sign_up(
        &mut self,
        store: &mut ClientStore,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SignedIn, IdentityError> {
        Email::parse(email)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(IdentityError::Auth(AuthErrorCode::WeakPassword));
        }

        let identity = self.provider.sign_up(email, password, display_name).await?;
        Ok(self.complete(store, identity))
    }

    /// Sign in with a federated provider's id token.
    ///
    /// # Errors
    ///
    /// Returns the provider's error.
    #[instrument(skip(self, store, id_token))]
    pub async fn sign_in_with_oauth(
        &mut self,
        store: &mut ClientStore,
        provider: OAuthProvider,
        id_token: &str,
    ) -> Result<SignedIn, IdentityError> {
        let identity = self.provider.sign_in_with_oauth(provider, id_token).await?;
        Ok(self.complete(store, identity))
    }

    /// Ask the provider to email a password reset link.
    ///
    /// # Errors
    ///
    /// Returns the provider's error.
    pub async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError> {
        Email::parse(email)?;
        self.provider.send_password_reset(email).await
    }

    pub fn sign_out(&mut self, store: &mut ClientStore) {
        self.provider.sign_out();
        self.redirect = None;
        store.set_user(None);
        clear_sentry_user();
        add_breadcrumb("auth", "Signed out", None);
    }

    fn complete(&mut self, store: &mut ClientStore, identity: Identity) -> SignedIn {
        store.set_user(Some(identity.clone()));
        set_sentry_user(&identity.user_id, Some(identity.email.as_str()));
        add_breadcrumb("auth", "Signed in", None);

        let continue_to = self
            .redirect
            .take()
            .map_or_else(|| DEFAULT_CONTINUE_TO.to_owned(), |r| r.return_to);
        info!(user_id = %identity.user_id, continue_to = %continue_to, "Customer signed in");

        SignedIn {
            identity,
            continue_to,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Provider that accepts one fixed password.
    struct FixedProvider {
        sender: watch::Sender<Option<Identity>>,
        calls: Mutex<u32>,
    }

    impl FixedProvider {
        fn new() -> Self {
            Self {
                sender: watch::channel(None).0,
                calls: Mutex::new(0),
            }
        }

        fn check(&self, password: &str) -> Result<Identity, IdentityError> {
            *self.calls.lock().unwrap() += 1;
            if password != "open-sesame" {
                return Err(IdentityError::from_code("INVALID_LOGIN_CREDENTIALS"));
            }
            let identity = Identity::test_user();
            self.sender.send_replace(Some(identity.clone()));
            Ok(identity)
        }
    }

    impl IdentityProvider for FixedProvider {
        async fn sign_in_with_password(
            &self,
            _email: &str,
            password: &str,
        ) -> Result<Identity, IdentityError> {
            self.check(password)
        }

        async fn sign_up(
            &self,
            _email: &str,
            password: &str,
            _display_name: Option<&str>,
        ) -> Result<Identity, IdentityError> {
            self.check(password)
        }

        async fn sign_in_with_oauth(
            &self,
            _provider: OAuthProvider,
            _id_token: &str,
        ) -> Result<Identity, IdentityError> {
            self.check("open-sesame")
        }

        async fn send_password_reset(&self, _email: &str) -> Result<(), IdentityError> {
            Ok(())
        }

        fn sign_out(&self) {
            self.sender.send_replace(None);
        }

        fn session(&self) -> watch::Receiver<Option<Identity>> {
            self.sender.subscribe()
        }
    }

    #[tokio::test]
    async fn test_default_continue_to_account() {
        let mut flow = AuthFlow::new(FixedProvider::new());
        let mut store = ClientStore::in_memory();

        let signed_in = flow
            .sign_in(&mut store, "meera@example.in", "open-sesame")
            .await
            .unwrap();
        assert_eq!(signed_in.continue_to, DEFAULT_CONTINUE_TO);
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_redirect_survives_failed_attempt() {
        let mut flow = AuthFlow::new(FixedProvider::new());
        let mut store = ClientStore::in_memory();
        flow.require_login(LoginRedirect::checkout());

        let err = flow
            .sign_in(&mut store, "meera@example.in", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.code(), AuthErrorCode::InvalidCredential);
        assert!(!store.is_authenticated());
        assert_eq!(flow.pending_redirect(), Some(&LoginRedirect::checkout()));

        let signed_in = flow
            .sign_in_with_oauth(&mut store, OAuthProvider::Google, "id-token")
            .await
            .unwrap();
        assert_eq!(signed_in.continue_to, CHECKOUT_PATH);
        assert!(flow.pending_redirect().is_none());
    }

    #[tokio::test]
    async fn test_weak_password_rejected_locally() {
        let mut flow = AuthFlow::new(FixedProvider::new());
        let mut store = ClientStore::in_memory();

        let err = flow
            .sign_up(&mut store, "meera@example.in", "12345", None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), AuthErrorCode::WeakPassword);

        let err = flow
            .sign_up(&mut store, "not-an-email", "long-enough", None)
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::InvalidEmail(_)));
        assert_eq!(*flow.provider().calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_session_listener_and_sign_out() {
        let mut flow = AuthFlow::new(FixedProvider::new());
        let session = flow.provider().session();
        let mut store = ClientStore::in_memory();

        flow.sign_in(&mut store, "meera@example.in", "open-sesame")
            .await
            .unwrap();
        let mut mirror = ClientStore::in_memory();
        sync_session(&mut mirror, &session);
        assert_eq!(mirror.user(), Some(&Identity::test_user()));

        flow.sign_out(&mut store);
        sync_session(&mut mirror, &session);
        assert!(!store.is_authenticated());
        assert!(!mirror.is_authenticated());
    }

    #[test]
    fn test_greeting_name() {
        let mut identity = Identity::test_user();
        assert_eq!(identity.greeting_name(), "Meera");
        identity.display_name = Some("  ".to_string());
        assert_eq!(identity.greeting_name(), "meera");
    }
}
