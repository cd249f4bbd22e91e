//! Structured logging setup.
//!
//! Honours `RUST_LOG`; without it the crate logs at `info`. Secrets never
//! reach a log line: credential-bearing types print `**redacted**` in their
//! `Debug` output.

use crate::{OrchestratorError, Result};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Default filter directive when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "acm_orchestrator=info";

/// Installs a global `fmt` subscriber.
///
/// # Errors
///
/// Returns [`OrchestratorError::Configuration`] for an unparseable filter,
/// or [`OrchestratorError::Other`] if a global subscriber is already set.
pub fn try_init() -> Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    install(build_filter(directives.as_deref())?)
}

/// Installs a global `fmt` subscriber, ignoring a second call.
///
/// An unparseable `RUST_LOG` falls back to [`DEFAULT_DIRECTIVE`] and is
/// reported as a warning once logging is up.
pub fn init() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (filter, rejected) = filter_or_default(directives.as_deref());

    // An already-installed subscriber is fine; it still receives the warning.
    let _ = install(filter);

    if let Some(err) = rejected {
        warn!(error = %err, fallback = DEFAULT_DIRECTIVE, "ignoring RUST_LOG");
    }
}

fn install(filter: EnvFilter) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| OrchestratorError::Other(anyhow::anyhow!("failed to install subscriber: {}", e)))
}

fn build_filter(directives: Option<&str>) -> Result<EnvFilter> {
    match directives.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| OrchestratorError::Configuration(format!("invalid RUST_LOG: {}", e))),
        None => Ok(EnvFilter::new(DEFAULT_DIRECTIVE)),
    }
}

fn filter_or_default(directives: Option<&str>) -> (EnvFilter, Option<OrchestratorError>) {
    match build_filter(directives) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new(DEFAULT_DIRECTIVE), Some(err)),
    }
}
