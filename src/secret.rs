//! Secret resolution for credential fields that may hold a reference
//! (e.g. a vault pointer) instead of a literal value.

use crate::{OrchestratorError, Result};
use async_trait::async_trait;
use tracing::{debug, trace};

/// Resolves an opaque secret reference to its literal value.
///
/// Implementations typically delegate to a privileged-access or vault
/// service. Errors are reported without echoing the resolved value.
#[async_trait]
pub trait SecretResolver: Send + Sync {
    /// Resolves `reference` to the secret it names.
    async fn resolve(&self, reference: &str) -> Result<String>;
}

/// Resolves `env:NAME` references from the process environment.
///
/// Values without the `env:` prefix are returned unchanged.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretResolver;

#[async_trait]
impl SecretResolver for EnvSecretResolver {
    async fn resolve(&self, reference: &str) -> Result<String> {
        match reference.strip_prefix("env:") {
            Some(name) => std::env::var(name).map_err(|_| {
                OrchestratorError::Authentication(format!(
                    "environment variable {} is not set",
                    name
                ))
            }),
            None => Ok(reference.to_string()),
        }
    }
}

/// Resolves a credential field, passing it through when no resolver is
/// configured. `field_name` is used for diagnostics only.
pub async fn resolve_field(
    resolver: Option<&dyn SecretResolver>,
    value: &str,
    field_name: &str,
) -> Result<String> {
    match resolver {
        Some(resolver) => {
            debug!(field = field_name, "resolving secret-eligible field");
            resolver.resolve(value).await.map_err(|e| match e {
                OrchestratorError::Authentication(_) | OrchestratorError::Configuration(_) => e,
                other => OrchestratorError::Authentication(format!(
                    "failed to resolve {}: {}",
                    field_name, other
                )),
            })
        }
        None => {
            trace!(
                field = field_name,
                "no secret resolver configured, using field value as literal"
            );
            Ok(value.to_string())
        }
    }
}
