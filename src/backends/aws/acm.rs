//! AWS Certificate Manager store implementation.

use crate::credential::CloudCredential;
use crate::store::{
    CertificateKind, CertificatePage, CertificateStore, CertificateSummary, ImportRequest,
    StoreConnector, Tag, CERTIFICATE_STATUSES, KEY_TYPES, PAGE_SIZE,
};
use crate::{OrchestratorConfig, OrchestratorError, Result};
use async_trait::async_trait;
use aws_sdk_acm::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_acm::primitives::Blob;
use aws_sdk_acm::types::{CertificateStatus, CertificateType, Filters, KeyAlgorithm};
use aws_sdk_acm::Client;
use std::time::SystemTime;
use tracing::debug;

/// Opens ACM clients per region.
#[derive(Debug, Clone, Default)]
pub struct AcmConnector {
    endpoint: Option<String>,
}

impl AcmConnector {
    /// Creates a connector for the public AWS endpoints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a connector honouring the configured endpoint override.
    pub fn from_config(config: &OrchestratorConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
        }
    }

    /// Points clients at a custom endpoint (LocalStack testing).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

#[async_trait]
impl StoreConnector for AcmConnector {
    async fn connect(
        &self,
        region: &str,
        credential: Option<&CloudCredential>,
    ) -> Result<Box<dyn CertificateStore>> {
        let mut config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()));

        if let Some(credential) = credential {
            config_loader = config_loader.credentials_provider(aws_sdk_acm::config::Credentials::new(
                credential.access_key_id.clone(),
                credential.secret_access_key.clone(),
                Some(credential.session_token.clone()),
                credential.expiration.map(SystemTime::from),
                "assumed-role",
            ));
        }

        // Use custom endpoint if provided (for LocalStack testing)
        if let Some(ref endpoint) = self.endpoint {
            config_loader = config_loader.endpoint_url(endpoint);
        }

        let config = config_loader.load().await;
        debug!(region, explicit_credentials = credential.is_some(), "created ACM client");

        Ok(Box::new(AcmStore {
            client: Client::new(&config),
            region: region.to_string(),
        }))
    }
}

/// ACM client bound to one region.
pub struct AcmStore {
    client: Client,
    region: String,
}

fn sdk_error<E, R>(operation: &str, arn: Option<&str>, err: SdkError<E, R>) -> OrchestratorError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match (err.code(), arn) {
        (Some("ResourceNotFoundException"), Some(arn)) => OrchestratorError::NotFound(arn.to_string()),
        _ => OrchestratorError::Store(format!("{} failed: {}", operation, DisplayErrorContext(&err))),
    }
}

#[async_trait]
impl CertificateStore for AcmStore {
    fn region(&self) -> &str {
        &self.region
    }

    async fn list_certificates(&self, next_token: Option<&str>) -> Result<CertificatePage> {
        let includes = Filters::builder()
            .set_key_types(Some(KEY_TYPES.iter().map(|k| KeyAlgorithm::from(*k)).collect()))
            .build();

        let response = self
            .client
            .list_certificates()
            .includes(includes)
            .set_certificate_statuses(Some(
                CERTIFICATE_STATUSES
                    .iter()
                    .map(|s| CertificateStatus::from(*s))
                    .collect(),
            ))
            .max_items(PAGE_SIZE)
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| sdk_error("ListCertificates", None, e))?;

        let summaries = response
            .certificate_summary_list()
            .iter()
            .filter_map(|summary| {
                summary.certificate_arn().map(|arn| CertificateSummary {
                    arn: arn.to_string(),
                    domain_name: summary.domain_name().map(str::to_string),
                })
            })
            .collect();

        Ok(CertificatePage {
            summaries,
            next_token: response.next_token().map(str::to_string),
        })
    }

    async fn get_certificate(&self, arn: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get_certificate()
            .certificate_arn(arn)
            .send()
            .await
            .map_err(|e| sdk_error("GetCertificate", Some(arn), e))?;

        Ok(response.certificate().map(str::to_string))
    }

    async fn list_tags(&self, arn: &str) -> Result<Vec<Tag>> {
        let response = self
            .client
            .list_tags_for_certificate()
            .certificate_arn(arn)
            .send()
            .await
            .map_err(|e| sdk_error("ListTagsForCertificate", Some(arn), e))?;

        Ok(response
            .tags()
            .iter()
            .map(|t| Tag::new(t.key(), t.value().unwrap_or_default()))
            .collect())
    }

    async fn describe_certificate(&self, arn: &str) -> Result<CertificateKind> {
        let response = self
            .client
            .describe_certificate()
            .certificate_arn(arn)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeCertificate", Some(arn), e))?;

        let kind = response
            .certificate()
            .and_then(|detail| detail.r#type())
            .ok_or_else(|| OrchestratorError::Store(format!("{} has no certificate type", arn)))?;

        Ok(match kind {
            CertificateType::Imported => CertificateKind::Imported,
            CertificateType::AmazonIssued => CertificateKind::AmazonIssued,
            CertificateType::Private => CertificateKind::Private,
            other => CertificateKind::Other(other.as_str().to_string()),
        })
    }

    async fn import_certificate(&self, request: ImportRequest) -> Result<String> {
        let tags = if request.tags.is_empty() {
            None
        } else {
            let tags = request
                .tags
                .iter()
                .map(|t| {
                    aws_sdk_acm::types::Tag::builder()
                        .key(&t.key)
                        .value(&t.value)
                        .build()
                        .map_err(|e| OrchestratorError::Configuration(format!("invalid tag {}: {}", t.key, e)))
                })
                .collect::<Result<Vec<_>>>()?;
            Some(tags)
        };

        let operation = if request.certificate_arn.is_some() {
            "ImportCertificate (re-import)"
        } else {
            "ImportCertificate"
        };

        let response = self
            .client
            .import_certificate()
            .certificate(Blob::new(request.certificate_pem.into_bytes()))
            .private_key(Blob::new(request.private_key_pem.into_bytes()))
            .set_certificate_chain(request.chain_pem.map(|c| Blob::new(c.into_bytes())))
            .set_certificate_arn(request.certificate_arn.clone())
            .set_tags(tags)
            .send()
            .await
            .map_err(|e| sdk_error(operation, request.certificate_arn.as_deref(), e))?;

        response
            .certificate_arn()
            .map(str::to_string)
            .ok_or_else(|| OrchestratorError::Store("ImportCertificate returned no ARN".to_string()))
    }

    async fn delete_certificate(&self, arn: &str) -> Result<()> {
        self.client
            .delete_certificate()
            .certificate_arn(arn)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteCertificate", Some(arn), e))?;

        Ok(())
    }
}
