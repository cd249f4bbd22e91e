//! STS role assumption through the AWS SDK.

use crate::credential::CloudCredential;
use crate::sts::RoleAssumer;
use crate::{OrchestratorConfig, OrchestratorError, Result};
use async_trait::async_trait;
use aws_config::ConfigLoader;
use aws_sdk_sts::error::DisplayErrorContext;
use aws_sdk_sts::Client;
use tracing::debug;

/// Calls STS `AssumeRole` / `AssumeRoleWithWebIdentity`.
///
/// A fresh client is built per call so the calling identity (static keys,
/// or none at all for web identity) never leaks between jobs.
#[derive(Debug, Clone)]
pub struct StsRoleAssumer {
    region: String,
    endpoint: Option<String>,
}

impl StsRoleAssumer {
    /// Creates an assumer for the configured STS region and endpoint.
    pub fn new(config: &OrchestratorConfig) -> Self {
        Self {
            region: config.sts_region.clone(),
            endpoint: config.endpoint.clone(),
        }
    }

    async fn client(&self, config_loader: ConfigLoader) -> Client {
        let mut config_loader = config_loader.region(aws_config::Region::new(self.region.clone()));

        if let Some(ref endpoint) = self.endpoint {
            config_loader = config_loader.endpoint_url(endpoint);
        }

        Client::new(&config_loader.load().await)
    }
}

fn to_cloud_credential(credentials: Option<&aws_sdk_sts::types::Credentials>) -> Result<CloudCredential> {
    let credentials = credentials.ok_or_else(|| {
        OrchestratorError::Authentication("STS response contained no credentials".to_string())
    })?;

    let expiration = credentials.expiration();
    Ok(CloudCredential::new(
        credentials.access_key_id(),
        credentials.secret_access_key(),
        credentials.session_token(),
        chrono::DateTime::from_timestamp(expiration.secs(), expiration.subsec_nanos()),
    ))
}

#[async_trait]
impl RoleAssumer for StsRoleAssumer {
    async fn assume_role_with_static_credentials(
        &self,
        access_key: &str,
        secret_key: &str,
        role_arn: &str,
        session_name: &str,
    ) -> Result<CloudCredential> {
        let caller = aws_sdk_sts::config::Credentials::new(
            access_key,
            secret_key,
            None,
            None,
            "static-access-key",
        );
        let client = self
            .client(aws_config::defaults(aws_config::BehaviorVersion::latest()).credentials_provider(caller))
            .await;

        debug!(role_arn, session_name, "calling AssumeRole");
        let response = client
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .send()
            .await
            .map_err(|e| {
                OrchestratorError::Authentication(format!(
                    "AssumeRole for {} failed: {}",
                    role_arn,
                    DisplayErrorContext(&e)
                ))
            })?;

        to_cloud_credential(response.credentials())
    }

    async fn assume_role_with_web_identity(
        &self,
        web_identity_token: &str,
        role_arn: &str,
        session_name: &str,
        duration_seconds: Option<i32>,
    ) -> Result<CloudCredential> {
        // The call is authenticated by the token itself
        let client = self
            .client(aws_config::defaults(aws_config::BehaviorVersion::latest()).no_credentials())
            .await;

        debug!(role_arn, session_name, ?duration_seconds, "calling AssumeRoleWithWebIdentity");
        let response = client
            .assume_role_with_web_identity()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .web_identity_token(web_identity_token)
            .set_duration_seconds(duration_seconds)
            .send()
            .await
            .map_err(|e| {
                OrchestratorError::Authentication(format!(
                    "AssumeRoleWithWebIdentity for {} failed: {}",
                    role_arn,
                    DisplayErrorContext(&e)
                ))
            })?;

        to_cloud_credential(response.credentials())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assumer_from_config() {
        let config = OrchestratorConfig::new()
            .with_sts_region("eu-west-1")
            .with_endpoint("http://localhost:4566");
        let assumer = StsRoleAssumer::new(&config);

        assert_eq!(assumer.region, "eu-west-1");
        assert_eq!(assumer.endpoint.as_deref(), Some("http://localhost:4566"));
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let err = to_cloud_credential(None).unwrap_err();
        assert!(matches!(err, OrchestratorError::Authentication(_)));
    }
}
