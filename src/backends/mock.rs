//! Mock backends for testing.
//!
//! Complete in-memory implementations of [`StoreConnector`], [`RoleAssumer`]
//! and [`TokenExchange`] with failure injection, for testing code that uses
//! the orchestrator without a cloud account.

use crate::credential::{CloudCredential, FederatedToken};
use crate::oauth::{TokenExchange, TokenRequest};
use crate::store::{
    CertificateKind, CertificatePage, CertificateStore, CertificateSummary, ImportRequest,
    StoreConnector, Tag,
};
use crate::sts::RoleAssumer;
use crate::{OrchestratorError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Account id used for generated ARNs.
pub const MOCK_ACCOUNT_ID: &str = "123456789012";

/// A certificate held by the mock store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCertificate {
    /// Certificate body as PEM; `None` simulates a pending certificate
    pub pem: Option<String>,
    /// Tags in insertion order
    pub tags: Vec<Tag>,
    /// How the certificate was created
    pub kind: CertificateKind,
    /// Private key supplied at import
    pub private_key_pem: Option<String>,
    /// Chain supplied at import
    pub chain_pem: Option<String>,
}

impl MockCertificate {
    /// A user-imported certificate with the given PEM body.
    pub fn imported(pem: impl Into<String>) -> Self {
        Self {
            pem: Some(pem.into()),
            tags: Vec::new(),
            kind: CertificateKind::Imported,
            private_key_pem: None,
            chain_pem: None,
        }
    }

    /// A certificate without a body.
    pub fn pending() -> Self {
        Self {
            pem: None,
            tags: Vec::new(),
            kind: CertificateKind::AmazonIssued,
            private_key_pem: None,
            chain_pem: None,
        }
    }

    /// Adds a tag.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(key, value));
        self
    }

    /// Sets how the certificate was created.
    pub fn with_kind(mut self, kind: CertificateKind) -> Self {
        self.kind = kind;
        self
    }
}

type RegionCertificates = BTreeMap<String, MockCertificate>;

/// A connection recorded by [`MockConnector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockConnection {
    /// Region connected to
    pub region: String,
    /// Access key id used, `None` for ambient credentials
    pub access_key_id: Option<String>,
}

/// In-memory certificate stores, one per region.
///
/// Certificates are listed in ARN order, [`page_size`](Self::page_size) per
/// page.
///
/// # Example
///
/// ```
/// use acm_orchestrator::backends::mock::{MockCertificate, MockConnector};
/// use acm_orchestrator::store::StoreConnector;
///
/// #[tokio::main]
/// async fn main() -> acm_orchestrator::Result<()> {
///     let mut connector = MockConnector::new();
///     connector
///         .put_certificate("us-east-1", "arn:aws:acm:us-east-1:123456789012:certificate/a", MockCertificate::imported("MIIB"))
///         .await;
///
///     // Simulate a region whose credentials are rejected
///     connector.fail_connect("eu-west-1", "access denied");
///
///     let store = connector.connect("us-east-1", None).await?;
///     assert_eq!(store.list_certificates(None).await?.summaries.len(), 1);
///     assert!(connector.connect("eu-west-1", None).await.is_err());
///     Ok(())
/// }
/// ```
pub struct MockConnector {
    regions: Arc<RwLock<HashMap<String, Arc<RwLock<RegionCertificates>>>>>,
    connections: Arc<RwLock<Vec<MockConnection>>>,

    /// Summaries returned per listing page
    pub page_size: usize,
    /// Regions whose `connect()` fails, with the error message
    pub connect_errors: HashMap<String, String>,
    /// Regions whose `list_certificates()` fails, with the error message
    pub list_errors: HashMap<String, String>,
    /// ARNs whose `get_certificate()` fails
    pub get_errors: HashSet<String>,
    /// Error message returned from `import_certificate()`
    pub import_error: Option<String>,
    /// Error message returned from `delete_certificate()`
    pub delete_error: Option<String>,
}

impl MockConnector {
    /// Creates a connector with no regions.
    pub fn new() -> Self {
        Self {
            regions: Arc::new(RwLock::new(HashMap::new())),
            connections: Arc::new(RwLock::new(Vec::new())),
            page_size: 100,
            connect_errors: HashMap::new(),
            list_errors: HashMap::new(),
            get_errors: HashSet::new(),
            import_error: None,
            delete_error: None,
        }
    }

    /// Makes `connect()` fail for `region`.
    pub fn fail_connect(&mut self, region: impl Into<String>, message: impl Into<String>) {
        self.connect_errors.insert(region.into(), message.into());
    }

    /// Makes `list_certificates()` fail for `region`.
    pub fn fail_list(&mut self, region: impl Into<String>, message: impl Into<String>) {
        self.list_errors.insert(region.into(), message.into());
    }

    /// Makes `get_certificate()` fail for `arn`.
    pub fn fail_get(&mut self, arn: impl Into<String>) {
        self.get_errors.insert(arn.into());
    }

    /// Pre-populates a region with a certificate.
    pub async fn put_certificate(
        &self,
        region: &str,
        arn: impl Into<String>,
        certificate: MockCertificate,
    ) {
        let region = self.region(region).await;
        region.write().await.insert(arn.into(), certificate);
    }

    /// Returns a certificate held in `region`.
    pub async fn certificate(&self, region: &str, arn: &str) -> Option<MockCertificate> {
        let regions = self.regions.read().await;
        match regions.get(region) {
            Some(certs) => certs.read().await.get(arn).cloned(),
            None => None,
        }
    }

    /// Returns the ARNs held in `region`, in listing order.
    pub async fn arns(&self, region: &str) -> Vec<String> {
        let regions = self.regions.read().await;
        match regions.get(region) {
            Some(certs) => certs.read().await.keys().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Returns every connection made so far.
    pub async fn connections(&self) -> Vec<MockConnection> {
        self.connections.read().await.clone()
    }

    async fn region(&self, region: &str) -> Arc<RwLock<RegionCertificates>> {
        let mut regions = self.regions.write().await;
        regions
            .entry(region.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(BTreeMap::new())))
            .clone()
    }
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreConnector for MockConnector {
    async fn connect(
        &self,
        region: &str,
        credential: Option<&CloudCredential>,
    ) -> Result<Box<dyn CertificateStore>> {
        self.connections.write().await.push(MockConnection {
            region: region.to_string(),
            access_key_id: credential.map(|c| c.access_key_id.clone()),
        });

        if let Some(message) = self.connect_errors.get(region) {
            return Err(OrchestratorError::Authentication(message.clone()));
        }

        Ok(Box::new(MockStore {
            region: region.to_string(),
            certificates: self.region(region).await,
            page_size: self.page_size.max(1),
            list_error: self.list_errors.get(region).cloned(),
            get_errors: self.get_errors.clone(),
            import_error: self.import_error.clone(),
            delete_error: self.delete_error.clone(),
        }))
    }
}

/// One region of a [`MockConnector`].
pub struct MockStore {
    region: String,
    certificates: Arc<RwLock<RegionCertificates>>,
    page_size: usize,
    list_error: Option<String>,
    get_errors: HashSet<String>,
    import_error: Option<String>,
    delete_error: Option<String>,
}

#[async_trait]
impl CertificateStore for MockStore {
    fn region(&self) -> &str {
        &self.region
    }

    async fn list_certificates(&self, next_token: Option<&str>) -> Result<CertificatePage> {
        if let Some(ref message) = self.list_error {
            return Err(OrchestratorError::Store(message.clone()));
        }

        let offset = match next_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| OrchestratorError::Store(format!("invalid next token: {}", token)))?,
            None => 0,
        };

        let certificates = self.certificates.read().await;
        let summaries: Vec<CertificateSummary> = certificates
            .keys()
            .skip(offset)
            .take(self.page_size)
            .map(|arn| CertificateSummary {
                arn: arn.clone(),
                domain_name: None,
            })
            .collect();

        let consumed = offset + summaries.len();
        let next_token = (consumed < certificates.len()).then(|| consumed.to_string());

        Ok(CertificatePage {
            summaries,
            next_token,
        })
    }

    async fn get_certificate(&self, arn: &str) -> Result<Option<String>> {
        if self.get_errors.contains(arn) {
            return Err(OrchestratorError::Store(format!("GetCertificate throttled for {}", arn)));
        }

        let certificates = self.certificates.read().await;
        certificates
            .get(arn)
            .map(|c| c.pem.clone())
            .ok_or_else(|| OrchestratorError::NotFound(arn.to_string()))
    }

    async fn list_tags(&self, arn: &str) -> Result<Vec<Tag>> {
        let certificates = self.certificates.read().await;
        certificates
            .get(arn)
            .map(|c| c.tags.clone())
            .ok_or_else(|| OrchestratorError::NotFound(arn.to_string()))
    }

    async fn describe_certificate(&self, arn: &str) -> Result<CertificateKind> {
        let certificates = self.certificates.read().await;
        certificates
            .get(arn)
            .map(|c| c.kind.clone())
            .ok_or_else(|| OrchestratorError::NotFound(arn.to_string()))
    }

    async fn import_certificate(&self, request: ImportRequest) -> Result<String> {
        if let Some(ref message) = self.import_error {
            return Err(OrchestratorError::Store(message.clone()));
        }

        let mut certificates = self.certificates.write().await;

        let arn = match request.certificate_arn {
            Some(arn) => {
                let existing = certificates
                    .get(&arn)
                    .ok_or_else(|| OrchestratorError::NotFound(arn.clone()))?;
                if !request.tags.is_empty() {
                    return Err(OrchestratorError::Store(
                        "tags cannot be specified when re-importing a certificate".to_string(),
                    ));
                }
                let tags = existing.tags.clone();
                certificates.insert(
                    arn.clone(),
                    MockCertificate {
                        pem: Some(request.certificate_pem),
                        tags,
                        kind: CertificateKind::Imported,
                        private_key_pem: Some(request.private_key_pem),
                        chain_pem: request.chain_pem,
                    },
                );
                arn
            }
            None => {
                let arn = format!(
                    "arn:aws:acm:{}:{}:certificate/{}",
                    self.region,
                    MOCK_ACCOUNT_ID,
                    uuid::Uuid::new_v4()
                );
                certificates.insert(
                    arn.clone(),
                    MockCertificate {
                        pem: Some(request.certificate_pem),
                        tags: request.tags,
                        kind: CertificateKind::Imported,
                        private_key_pem: Some(request.private_key_pem),
                        chain_pem: request.chain_pem,
                    },
                );
                arn
            }
        };

        Ok(arn)
    }

    async fn delete_certificate(&self, arn: &str) -> Result<()> {
        if let Some(ref message) = self.delete_error {
            return Err(OrchestratorError::Store(message.clone()));
        }

        let mut certificates = self.certificates.write().await;
        certificates
            .remove(arn)
            .map(|_| ())
            .ok_or_else(|| OrchestratorError::NotFound(arn.to_string()))
    }
}

/// A role-assumption call recorded by [`MockRoleAssumer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssumeRoleCall {
    /// `AssumeRole` with static keys
    Static {
        access_key: String,
        secret_key: String,
        role_arn: String,
        session_name: String,
    },
    /// `AssumeRoleWithWebIdentity`
    WebIdentity {
        web_identity_token: String,
        role_arn: String,
        session_name: String,
        duration_seconds: Option<i32>,
    },
}

/// Records role-assumption calls and returns a fixed credential.
pub struct MockRoleAssumer {
    calls: Arc<RwLock<Vec<AssumeRoleCall>>>,

    /// Credential returned on success
    pub credential: CloudCredential,
    /// Error message returned from every call
    pub reject_with: Option<String>,
    /// Delay before answering
    pub delay: Option<Duration>,
}

impl MockRoleAssumer {
    /// Creates an assumer that always succeeds.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            credential: CloudCredential::new(
                "ASIAMOCKACCESSKEY",
                "mock-secret-access-key",
                "mock-session-token",
                Some(Utc::now() + chrono::Duration::hours(1)),
            ),
            reject_with: None,
            delay: None,
        }
    }

    /// Returns the credential issued on success.
    pub fn issued_credential(&self) -> CloudCredential {
        self.credential.clone()
    }

    /// Returns every call made so far.
    pub async fn calls(&self) -> Vec<AssumeRoleCall> {
        self.calls.read().await.clone()
    }

    async fn answer(&self, call: AssumeRoleCall) -> Result<CloudCredential> {
        self.calls.write().await.push(call);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.reject_with {
            Some(ref message) => Err(OrchestratorError::Authentication(message.clone())),
            None => Ok(self.credential.clone()),
        }
    }
}

impl Default for MockRoleAssumer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoleAssumer for MockRoleAssumer {
    async fn assume_role_with_static_credentials(
        &self,
        access_key: &str,
        secret_key: &str,
        role_arn: &str,
        session_name: &str,
    ) -> Result<CloudCredential> {
        self.answer(AssumeRoleCall::Static {
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
            role_arn: role_arn.to_string(),
            session_name: session_name.to_string(),
        })
        .await
    }

    async fn assume_role_with_web_identity(
        &self,
        web_identity_token: &str,
        role_arn: &str,
        session_name: &str,
        duration_seconds: Option<i32>,
    ) -> Result<CloudCredential> {
        self.answer(AssumeRoleCall::WebIdentity {
            web_identity_token: web_identity_token.to_string(),
            role_arn: role_arn.to_string(),
            session_name: session_name.to_string(),
            duration_seconds,
        })
        .await
    }
}

/// Token endpoint stand-in that counts exchanges.
pub struct MockTokenExchange {
    calls: AtomicUsize,
    last_endpoint: RwLock<Option<String>>,
    response: std::result::Result<FederatedToken, String>,
}

impl MockTokenExchange {
    /// Issues a one-hour bearer token.
    pub fn new() -> Self {
        Self::with_token(FederatedToken {
            access_token: "mock-bearer-token".to_string(),
            expires_in: 3600,
            token_type: Some("Bearer".to_string()),
            scope: None,
        })
    }

    /// Issues `token` on every exchange.
    pub fn with_token(token: FederatedToken) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last_endpoint: RwLock::new(None),
            response: Ok(token),
        }
    }

    /// Fails every exchange with an authentication error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last_endpoint: RwLock::new(None),
            response: Err(message.into()),
        }
    }

    /// Number of exchanges attempted.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Endpoint of the most recent exchange.
    pub async fn last_endpoint(&self) -> Option<String> {
        self.last_endpoint.read().await.clone()
    }
}

impl Default for MockTokenExchange {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenExchange for MockTokenExchange {
    async fn exchange(&self, request: &TokenRequest) -> Result<FederatedToken> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_endpoint.write().await = Some(request.endpoint().to_string());

        self.response
            .clone()
            .map_err(OrchestratorError::Authentication)
    }
}
