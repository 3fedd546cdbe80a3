//! REST client for the hosted identity service.

use std::sync::Arc;

use ambre_core::{Email, UserId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, instrument};

use super::{AuthMethod, Identity, IdentityError, IdentityProvider, OAuthProvider};
use crate::config::IdentityConfig;

/// Redirect URI sent with federated sign-in; the service requires one even
/// when the id token was obtained elsewhere.
const IDP_REQUEST_URI: &str = "http://localhost";

/// Account payload returned by every sign-in endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

/// Client for the identity service's account endpoints.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    session: watch::Sender<Option<Identity>>,
}

impl IdentityClient {
    /// Create a new identity client with an empty session.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            inner: Arc::new(IdentityClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.trim_end_matches('/').to_owned(),
                api_key: config.api_key.clone(),
                session: watch::channel(None).0,
            }),
        }
    }

    /// Call `accounts:{action}` and decode the response.
    async fn call<T: DeserializeOwned>(
        &self,
        action: &str,
        body: &impl Serialize,
    ) -> Result<T, IdentityError> {
        let url = format!("{}/accounts:{action}", self.inner.base_url);
        let response = self
            .inner
            .client
            .post(url)
            .query(&[("key", &self.inner.api_key)])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // The service reports failures as {"error": {"message": "CODE"}}.
            let code = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| format!("HTTP_{}", status.as_u16()));
            debug!(status = %status, code = %code, "Identity service rejected request");
            return Err(IdentityError::from_code(&code));
        }

        Ok(serde_json::from_str(&text)?)
    }

    fn establish(&self, account: AccountResponse, method: AuthMethod) -> Result<Identity, IdentityError> {
        let identity = Identity {
            user_id: UserId::new(account.local_id),
            email: Email::parse(&account.email)?,
            display_name: account.display_name.filter(|name| !name.is_empty()),
            method,
        };
        self.inner.session.send_replace(Some(identity.clone()));
        Ok(identity)
    }
}

impl IdentityProvider for IdentityClient {
    #[instrument(skip(self, password))]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, IdentityError> {
        let account: AccountResponse = self
            .call(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        self.establish(account, AuthMethod::Password)
    }

    #[instrument(skip(self, password))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Identity, IdentityError> {
        let mut account: AccountResponse = self
            .call(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        if let Some(name) = display_name.map(str::trim).filter(|name| !name.is_empty()) {
            let _: serde_json::Value = self
                .call(
                    "update",
                    &json!({
                        "idToken": account.id_token,
                        "displayName": name,
                        "returnSecureToken": false,
                    }),
                )
                .await?;
            account.display_name = Some(name.to_owned());
        }

        self.establish(account, AuthMethod::Password)
    }

    #[instrument(skip(self, id_token))]
    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        id_token: &str,
    ) -> Result<Identity, IdentityError> {
        let account: AccountResponse = self
            .call(
                "signInWithIdp",
                &json!({
                    "postBody": format!("id_token={id_token}&providerId={}", provider.provider_id()),
                    "requestUri": IDP_REQUEST_URI,
                    "returnIdpCredential": true,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        self.establish(account, AuthMethod::OAuth(provider))
    }

    #[instrument(skip(self))]
    async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError> {
        let _: serde_json::Value = self
            .call(
                "sendOobCode",
                &json!({ "requestType": "PASSWORD_RESET", "email": email }),
            )
            .await?;
        Ok(())
    }

    fn sign_out(&self) {
        self.inner.session.send_replace(None);
    }

    fn session(&self) -> watch::Receiver<Option<Identity>> {
        self.inner.session.subscribe()
    }
}
