//! Role-assumption boundary.
//!
//! The two call shapes mirror STS: `AssumeRole` signed with long-lived
//! access keys, and `AssumeRoleWithWebIdentity` using a federated bearer
//! token. The SDK implementation lives in
//! [`backends::aws`](crate::backends) behind the `aws` feature.

use crate::credential::CloudCredential;
use crate::{OrchestratorError, Result};
use async_trait::async_trait;

/// Shortest session STS will issue, in seconds.
pub const MIN_SESSION_DURATION: u64 = 900;

/// Longest session STS will issue, in seconds.
pub const MAX_SESSION_DURATION: u64 = 43_200;

/// Exchanges a calling identity for role-scoped temporary credentials.
#[async_trait]
pub trait RoleAssumer: Send + Sync {
    /// Assumes `role_arn` using an IAM user's access key and secret.
    ///
    /// No duration is requested; the provider default applies.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Authentication`] if the provider rejects
    /// the call (bad keys, trust-policy mismatch, ...).
    async fn assume_role_with_static_credentials(
        &self,
        access_key: &str,
        secret_key: &str,
        role_arn: &str,
        session_name: &str,
    ) -> Result<CloudCredential>;

    /// Assumes `role_arn` using a federated bearer token as the identity
    /// assertion.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Authentication`] if the provider rejects
    /// the token or the role's trust policy does not admit it.
    async fn assume_role_with_web_identity(
        &self,
        web_identity_token: &str,
        role_arn: &str,
        session_name: &str,
        duration_seconds: Option<i32>,
    ) -> Result<CloudCredential>;
}

/// Converts a token lifetime into an STS session duration.
///
/// A lifetime of 0 means the identity provider did not report one, so no
/// explicit duration is requested.
///
/// # Errors
///
/// Returns [`OrchestratorError::Configuration`] when the lifetime is outside
/// `900..=43200` seconds.
///
/// ```
/// use acm_orchestrator::sts::session_duration;
///
/// assert_eq!(session_duration(0).unwrap(), None);
/// assert_eq!(session_duration(3600).unwrap(), Some(3600));
/// assert!(session_duration(300).is_err());
/// ```
pub fn session_duration(lifetime: u64) -> Result<Option<i32>> {
    if lifetime == 0 {
        return Ok(None);
    }

    if !(MIN_SESSION_DURATION..=MAX_SESSION_DURATION).contains(&lifetime) {
        return Err(OrchestratorError::Configuration(format!(
            "token lifetime of {}s is outside the accepted session duration range {}..={}s",
            lifetime, MIN_SESSION_DURATION, MAX_SESSION_DURATION
        )));
    }

    i32::try_from(lifetime)
        .map(Some)
        .map_err(|_| OrchestratorError::Configuration(format!("invalid session duration: {}", lifetime)))
}
