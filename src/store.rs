//! Certificate store trait definitions.
//!
//! [`StoreConnector`] opens a regional [`CertificateStore`] using either
//! resolved temporary credentials or ambient SDK discovery. Implementations:
//!
//! - **SDK-based**: AWS Certificate Manager (`aws` feature)
//! - **Testing**: in-memory mock with failure injection (`mock` feature)

use crate::credential::CloudCredential;
use crate::config::REDACTED;
use crate::{OrchestratorError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key algorithms requested when listing certificates.
pub const KEY_TYPES: [&str; 6] = [
    "RSA_1024",
    "RSA_2048",
    "RSA_4096",
    "EC_prime256v1",
    "EC_secp384r1",
    "EC_secp521r1",
];

/// Certificate statuses requested when listing certificates.
pub const CERTIFICATE_STATUSES: [&str; 4] = ["ISSUED", "INACTIVE", "EXPIRED", "REVOKED"];

/// Maximum summaries requested per listing page.
pub const PAGE_SIZE: i32 = 100;

/// One entry of a certificate listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSummary {
    /// Certificate ARN
    pub arn: String,
    /// Primary domain name, if reported
    pub domain_name: Option<String>,
}

/// One page of a certificate listing.
#[derive(Debug, Clone, Default)]
pub struct CertificatePage {
    /// Summaries on this page
    pub summaries: Vec<CertificateSummary>,
    /// Continuation token; `None` on the last page
    pub next_token: Option<String>,
}

/// How a certificate came to be in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateKind {
    /// Imported by a user (replaceable)
    Imported,
    /// Issued by the provider
    AmazonIssued,
    /// Issued by a private CA
    Private,
    /// Anything the provider adds later
    Other(String),
}

impl fmt::Display for CertificateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Imported => write!(f, "IMPORTED"),
            Self::AmazonIssued => write!(f, "AMAZON_ISSUED"),
            Self::Private => write!(f, "PRIVATE"),
            Self::Other(kind) => write!(f, "{}", kind),
        }
    }
}

/// A certificate tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag key
    pub key: String,
    /// Tag value (may be empty)
    pub value: String,
}

impl Tag {
    /// Creates a tag.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Renders tags as `k1=v1,k2=v2`, in store order.
///
/// ```
/// use acm_orchestrator::store::{format_tags, Tag};
///
/// let tags = vec![Tag::new("env", "prod"), Tag::new("team", "pki")];
/// assert_eq!(format_tags(&tags), "env=prod,team=pki");
/// ```
pub fn format_tags(tags: &[Tag]) -> String {
    tags.iter()
        .map(|t| format!("{}={}", t.key, t.value))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses `k1=v1,k2=v2` into tags. Blank input yields no tags.
///
/// # Errors
///
/// Returns [`OrchestratorError::Configuration`] for an entry that is not a
/// `key=value` pair or has an empty key.
pub fn parse_tags(text: &str) -> Result<Vec<Tag>> {
    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (key, value) = entry.split_once('=').ok_or_else(|| {
                OrchestratorError::Configuration(format!(
                    "tag '{}' is not in key=value form",
                    entry
                ))
            })?;

            let key = key.trim();
            if key.is_empty() {
                return Err(OrchestratorError::Configuration(format!(
                    "tag '{}' has an empty key",
                    entry
                )));
            }

            Ok(Tag::new(key, value.trim()))
        })
        .collect()
}

/// A certificate import or re-import.
#[derive(Clone)]
pub struct ImportRequest {
    /// Leaf certificate PEM
    pub certificate_pem: String,
    /// Private key PEM
    pub private_key_pem: String,
    /// Chain PEM (issuers, concatenated)
    pub chain_pem: Option<String>,
    /// ARN to replace; `None` imports a new certificate
    pub certificate_arn: Option<String>,
    /// Tags; only sent for new imports
    pub tags: Vec<Tag>,
}

impl fmt::Debug for ImportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportRequest")
            .field("certificate_pem", &format_args!("{} bytes", self.certificate_pem.len()))
            .field("private_key_pem", &REDACTED)
            .field("chain_pem", &self.chain_pem.as_ref().map(|c| c.len()))
            .field("certificate_arn", &self.certificate_arn)
            .field("tags", &self.tags)
            .finish()
    }
}

/// A regional certificate store.
///
/// All implementations must be `Send + Sync` so regions can be processed
/// concurrently.
#[async_trait]
pub trait CertificateStore: Send + Sync {
    // ========================================================================
    // Metadata
    // ========================================================================

    /// Region this store is bound to.
    fn region(&self) -> &str;

    // ========================================================================
    // Reads
    // ========================================================================

    /// Lists one page of certificates, filtered to [`KEY_TYPES`] and
    /// [`CERTIFICATE_STATUSES`], at most [`PAGE_SIZE`] per page.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Store`] if the listing call fails,
    /// including when the credentials are rejected.
    async fn list_certificates(&self, next_token: Option<&str>) -> Result<CertificatePage>;

    /// Fetches a certificate body as PEM.
    ///
    /// Returns `Ok(None)` when the store has the certificate but no body
    /// (e.g. pending validation).
    ///
    /// # Errors
    ///
    /// - [`OrchestratorError::NotFound`]: no such certificate
    /// - [`OrchestratorError::Store`]: the call failed
    async fn get_certificate(&self, arn: &str) -> Result<Option<String>>;

    /// Lists a certificate's tags in store order.
    async fn list_tags(&self, arn: &str) -> Result<Vec<Tag>>;

    /// Reports how a certificate was created.
    async fn describe_certificate(&self, arn: &str) -> Result<CertificateKind>;

    // ========================================================================
    // Writes
    // ========================================================================

    /// Imports a certificate, or re-imports over `request.certificate_arn`.
    /// Returns the certificate ARN.
    async fn import_certificate(&self, request: ImportRequest) -> Result<String>;

    /// Deletes a certificate.
    async fn delete_certificate(&self, arn: &str) -> Result<()>;
}

/// Opens regional certificate stores.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Opens the store for `region`.
    ///
    /// `credential` of `None` means ambient SDK credential discovery.
    async fn connect(
        &self,
        region: &str,
        credential: Option<&CloudCredential>,
    ) -> Result<Box<dyn CertificateStore>>;
}
