//! Credential resolution: turns an [`AuthConfig`] into one temporary
//! credential set, or `None` for ambient SDK discovery.

use crate::config::{AuthConfig, OAuthSettings, RoleTarget, SESSION_NAME};
use crate::credential::CloudCredential;
use crate::oauth::{require_https, TokenExchange, TokenRequest};
use crate::secret::{resolve_field, SecretResolver};
use crate::sts::{session_duration, RoleAssumer};
use crate::{OrchestratorError, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace};

/// Resolves store authentication configuration into cloud credentials.
///
/// Holds no state between calls: every job resolves fresh credentials.
///
/// # Example
///
/// ```no_run
/// # #[cfg(feature = "mock")]
/// # async fn example() -> acm_orchestrator::Result<()> {
/// use acm_orchestrator::backends::mock::{MockRoleAssumer, MockTokenExchange};
/// use acm_orchestrator::{AuthConfig, CredentialResolver};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let resolver = CredentialResolver::new(
///     Arc::new(MockRoleAssumer::new()),
///     Arc::new(MockTokenExchange::new()),
///     Duration::from_secs(30),
/// );
///
/// // Default mode defers to the SDK's own credential chain.
/// assert!(resolver.resolve(&AuthConfig::Default).await?.is_none());
/// # Ok(())
/// # }
/// ```
pub struct CredentialResolver {
    role_assumer: Arc<dyn RoleAssumer>,
    token_exchange: Arc<dyn TokenExchange>,
    secret_resolver: Option<Arc<dyn SecretResolver>>,
    timeout: Duration,
}

impl CredentialResolver {
    /// Creates a resolver. `timeout` bounds each network call.
    pub fn new(
        role_assumer: Arc<dyn RoleAssumer>,
        token_exchange: Arc<dyn TokenExchange>,
        timeout: Duration,
    ) -> Self {
        Self {
            role_assumer,
            token_exchange,
            secret_resolver: None,
            timeout,
        }
    }

    /// Routes credential fields through `resolver` before use.
    pub fn with_secret_resolver(mut self, resolver: Arc<dyn SecretResolver>) -> Self {
        self.secret_resolver = Some(resolver);
        self
    }

    /// Resolves `config` into credentials.
    ///
    /// Returns `Ok(None)` for [`AuthConfig::Default`] without any network
    /// call.
    ///
    /// # Errors
    ///
    /// - [`OrchestratorError::Configuration`]: missing field, non-`https`
    ///   token endpoint, or token lifetime outside the session range
    /// - [`OrchestratorError::Authentication`]: secret resolution, token
    ///   exchange or role assumption failed or timed out
    pub async fn resolve(&self, config: &AuthConfig) -> Result<Option<CloudCredential>> {
        config.validate()?;

        let result = match config {
            AuthConfig::Default => {
                info!("using default AWS SDK credential resolution");
                return Ok(None);
            }
            AuthConfig::StaticKey {
                access_key_ref,
                secret_ref,
                role,
            } => {
                info!("using IAM user authentication to assume a role");
                self.resolve_static(access_key_ref, secret_ref, role).await
            }
            AuthConfig::FederatedOAuth(settings) => {
                info!("using OAuth web-identity federation to assume a role");
                self.resolve_federated(settings).await
            }
        };

        match result {
            Ok(credential) => {
                debug!(
                    access_key_id = %credential.access_key_id,
                    expiration = ?credential.expiration,
                    "resolved temporary credentials"
                );
                Ok(Some(credential))
            }
            Err(e) => {
                error!(mode = %config.mode(), error = %e, "credential resolution failed");
                Err(e)
            }
        }
    }

    async fn resolve_static(
        &self,
        access_key_ref: &str,
        secret_ref: &str,
        role: &RoleTarget,
    ) -> Result<CloudCredential> {
        let access_key = self.field(access_key_ref, "ServerUsername (IAM access key)").await?;
        let secret_key = self.field(secret_ref, "ServerPassword (IAM access secret)").await?;

        let role_arn = role.role_arn();
        debug!(role_arn = %role_arn, session_name = SESSION_NAME, "prepared AssumeRole request");

        trace!("submitting AssumeRole request");
        let credential = self
            .bounded(
                "AssumeRole",
                self.role_assumer.assume_role_with_static_credentials(
                    &access_key,
                    &secret_key,
                    &role_arn,
                    SESSION_NAME,
                ),
            )
            .await?;

        ensure_complete(credential)
    }

    async fn resolve_federated(&self, settings: &OAuthSettings) -> Result<CloudCredential> {
        require_https(&settings.oauth_url)?;

        let client_id = self.field(&settings.client_id_ref, "ServerUsername (OAuth client id)").await?;
        let client_secret = self
            .field(&settings.client_secret_ref, "ServerPassword (OAuth client secret)")
            .await?;

        let request = TokenRequest::new(
            &settings.oauth_url,
            client_id,
            client_secret,
            settings.grant_type.clone(),
            settings.scope.clone(),
        )?;

        trace!("requesting token from OAuth provider");
        let token = self
            .bounded("token exchange", self.token_exchange.exchange(&request))
            .await?;
        trace!(token = ?token, "received OAuth token");

        let duration = session_duration(token.expires_in)?;
        let role_arn = settings.role.role_arn();
        debug!(
            role_arn = %role_arn,
            session_name = SESSION_NAME,
            duration_seconds = ?duration,
            web_identity_token = crate::config::REDACTED,
            "prepared AssumeRoleWithWebIdentity request"
        );

        let credential = self
            .bounded(
                "AssumeRoleWithWebIdentity",
                self.role_assumer.assume_role_with_web_identity(
                    &token.access_token,
                    &role_arn,
                    SESSION_NAME,
                    duration,
                ),
            )
            .await?;

        ensure_complete(credential)
    }

    async fn field(&self, value: &str, field_name: &str) -> Result<String> {
        let resolved = self
            .bounded(
                "secret resolution",
                resolve_field(self.secret_resolver.as_deref(), value, field_name),
            )
            .await?;

        if resolved.is_empty() {
            return Err(OrchestratorError::Configuration(format!(
                "{} resolved to an empty value",
                field_name
            )));
        }
        Ok(resolved)
    }

    async fn bounded<T>(&self, what: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(OrchestratorError::Authentication(format!(
                "{} did not complete within {:?}",
                what, self.timeout
            ))),
        }
    }
}

fn ensure_complete(credential: CloudCredential) -> Result<CloudCredential> {
    if !credential.is_complete() {
        return Err(OrchestratorError::Authentication(
            "role assumption returned incomplete credentials".to_string(),
        ));
    }
    Ok(credential)
}
