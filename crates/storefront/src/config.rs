//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CONTENT_PROJECT_ID` - Content store project id
//! - `IDENTITY_API_KEY` - Identity provider web API key
//! - `PAYMENT_KEY_ID` - Payment gateway key id (production only)
//! - `PAYMENT_KEY_SECRET` - Payment gateway key secret (production only)
//!
//! ## Optional
//! - `AMBRE_ENV` - `production` or `development` (default: development)
//! - `CONTENT_DATASET` - Dataset name (default: production)
//! - `CONTENT_API_VERSION` - Query API version (default: 2024-01-01)
//! - `CONTENT_API_HOST` - Query API host (default: api.sanity.io)
//! - `CONTENT_TOKEN` - Write token for order documents
//! - `IDENTITY_BASE_URL` - Identity REST endpoint
//! - `PAYMENT_BASE_URL` - Payment gateway REST endpoint
//! - `PAYMENT_THEME_COLOR` - Checkout widget accent colour (default: #C9A96E)
//! - `MOCK_PAYMENT_DELAY_MS` - Simulated payment delay outside production (default: 1500)
//! - `STORAGE_DIR` - Directory for the persisted cart/wishlist (default: .ambre)
//! - `PENDING_ORDER_TTL_MINUTES` - Age after which pending orders are swept (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.0)

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Deployment environment.
///
/// Anything other than `Production` uses the mock payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" | "test" | "staging" => Ok(Self::Development),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Content store configuration
    pub content: ContentConfig,
    /// Identity provider configuration
    pub identity: IdentityConfig,
    /// Payment gateway configuration
    pub payment: PaymentConfig,
    /// Directory holding the persisted client store
    pub storage_dir: PathBuf,
    /// Age after which a still-pending order is marked failed
    pub pending_order_ttl: Duration,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Content store (headless CMS) configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ContentConfig {
    /// Project id
    pub project_id: String,
    /// Dataset name
    pub dataset: String,
    /// Query API version (date string)
    pub api_version: String,
    /// API host, without scheme (e.g. api.sanity.io)
    pub api_host: String,
    /// Token with write access to order documents
    pub token: Option<SecretString>,
}

impl std::fmt::Debug for ContentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentConfig")
            .field("project_id", &self.project_id)
            .field("dataset", &self.dataset)
            .field("api_version", &self.api_version)
            .field("api_host", &self.api_host)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ContentConfig {
    /// Base URL of the versioned query/mutation API.
    #[must_use]
    pub fn api_base(&self) -> String {
        let host = &self.api_host;
        let scheme = if host.starts_with("http://") || host.starts_with("https://") {
            ""
        } else {
            "https://"
        };
        format!("{scheme}{host}/v{}", self.api_version)
    }
}

/// Identity provider configuration.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Public web API key (identifies the project, not a secret)
    pub api_key: String,
    /// REST endpoint, e.g. <https://identitytoolkit.googleapis.com/v1>
    pub base_url: String,
}

/// Payment gateway configuration.
///
/// Implements `Debug` manually to redact the key secret.
#[derive(Clone)]
pub struct PaymentConfig {
    /// Gateway key id (public, passed to the checkout widget)
    pub key_id: Option<String>,
    /// Gateway key secret (server-side only)
    pub key_secret: Option<SecretString>,
    /// Gateway REST endpoint
    pub base_url: String,
    /// Widget accent colour
    pub theme_color: String,
    /// Delay before the mock gateway reports success
    pub mock_delay: Duration,
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &self.key_secret.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("theme_color", &self.theme_color)
            .field("mock_delay", &self.mock_delay)
            .finish()
    }
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    /// DSN; tracking is disabled when absent
    pub dsn: Option<String>,
    /// Environment tag
    pub environment: Option<String>,
    /// Error event sample rate
    pub sample_rate: f32,
    /// Performance trace sample rate
    pub traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_source(&Env(|key: &str| std::env::var(key).ok()))
    }

    /// Load configuration from an arbitrary key/value source.
    fn from_source<F>(env: &Env<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = env.parse_or("AMBRE_ENV", Environment::Development)?;
        let content = ContentConfig::from_source(env)?;
        let identity = IdentityConfig {
            api_key: env.required("IDENTITY_API_KEY")?,
            base_url: env.url_or(
                "IDENTITY_BASE_URL",
                "https://identitytoolkit.googleapis.com/v1",
            )?,
        };
        let payment = PaymentConfig::from_source(env, environment)?;
        let storage_dir = PathBuf::from(env.or_default("STORAGE_DIR", ".ambre"));
        let pending_order_ttl =
            Duration::from_secs(env.parse_or::<u64>("PENDING_ORDER_TTL_MINUTES", 30)? * 60);
        let sentry = SentryConfig {
            dsn: env.optional("SENTRY_DSN"),
            environment: env.optional("SENTRY_ENVIRONMENT"),
            sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", 1.0)?,
            traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        };

        Ok(Self {
            environment,
            content,
            identity,
            payment,
            storage_dir,
            pending_order_ttl,
            sentry,
        })
    }

    /// Development configuration with placeholder ids.
    #[cfg(test)]
    #[allow(clippy::unwrap_used)]
    pub(crate) fn for_tests() -> Self {
        Self::from_source(&Env(|key: &str| match key {
            "CONTENT_PROJECT_ID" => Some("test-project".to_string()),
            "IDENTITY_API_KEY" => Some("test-key".to_string()),
            _ => None,
        }))
        .unwrap()
    }
}

impl ContentConfig {
    fn from_source<F>(env: &Env<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            project_id: env.required("CONTENT_PROJECT_ID")?,
            dataset: env.or_default("CONTENT_DATASET", "production"),
            api_version: env.or_default("CONTENT_API_VERSION", "2024-01-01"),
            api_host: env.or_default("CONTENT_API_HOST", "api.sanity.io"),
            token: env
                .optional("CONTENT_TOKEN")
                .map(|token| validated_secret(&token, "CONTENT_TOKEN"))
                .transpose()?,
        })
    }
}

impl PaymentConfig {
    fn from_source<F>(env: &Env<F>, environment: Environment) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Live keys are only mandatory where the hosted gateway is used.
        let (key_id, key_secret) = if environment.is_production() {
            let key_id = env.required("PAYMENT_KEY_ID")?;
            let secret = env.required("PAYMENT_KEY_SECRET")?;
            (
                Some(key_id),
                Some(validated_secret(&secret, "PAYMENT_KEY_SECRET")?),
            )
        } else {
            (
                env.optional("PAYMENT_KEY_ID"),
                env.optional("PAYMENT_KEY_SECRET").map(SecretString::from),
            )
        };

        Ok(Self {
            key_id,
            key_secret,
            base_url: env.url_or("PAYMENT_BASE_URL", "https://api.razorpay.com")?,
            theme_color: env.or_default("PAYMENT_THEME_COLOR", "#C9A96E"),
            mock_delay: Duration::from_millis(env.parse_or("MOCK_PAYMENT_DELAY_MS", 1500)?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Key/value lookup used while loading configuration.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable; empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get an absolute http(s) URL, without a trailing slash.
    fn url_or(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        let raw = self.or_default(key, default);
        let invalid = |reason: String| ConfigError::InvalidEnvVar(key.to_string(), reason);

        let parsed = url::Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme: {}", parsed.scheme())));
        }
        Ok(parsed.as_str().trim_end_matches('/').to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Validate a secret value and wrap it.
fn validated_secret(value: &str, key: &str) -> Result<SecretString, ConfigError> {
    validate_secret_strength(value, key)?;
    Ok(SecretString::from(value.to_string()))
}
