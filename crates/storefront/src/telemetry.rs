//! Logging and error tracking setup.

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::StorefrontConfig;

/// Used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "ambre_storefront=info,ambre_core=info";

/// Initialize Sentry and the tracing subscriber.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes pending events. Returns `None` when no DSN is configured.
/// Production logs are JSON, everything else human-readable.
#[must_use]
pub fn init(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    // Sentry goes first so the tracing layer has a client to report to.
    let guard = init_sentry(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let fmt_layer = if config.environment.is_production() {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    // A subscriber may already be installed (tests, embedding apps).
    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .try_init()
        .is_ok();

    if guard.is_some() {
        tracing::info!(subscriber_installed = installed, "Sentry initialized");
    }
    guard
}

fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry.dsn.as_ref()?;

    Some(sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry
                .environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry.sample_rate,
            traces_sample_rate: config.sentry.traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    )))
}

/// Warnings and errors become Sentry events; info and debug become
/// breadcrumbs on the next event.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}
