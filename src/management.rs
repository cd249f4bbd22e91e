//! Certificate add and remove.

use crate::credential::CloudCredential;
use crate::pem::ensure_pem;
use crate::store::{CertificateKind, ImportRequest, StoreConnector, Tag};
use crate::validation::{region_from_arn, validate_region, MIN_ARN_LENGTH};
use crate::{OrchestratorError, Result};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Certificate and key material for an import.
#[derive(Clone)]
pub struct ImportMaterial {
    /// Leaf certificate, as PEM or a bare base64 body
    pub certificate: String,
    /// Private key PEM
    pub private_key_pem: String,
    /// Issuer certificates, leaf-most first
    pub chain: Vec<String>,
}

impl ImportMaterial {
    /// Creates material without a chain.
    pub fn new(certificate: impl Into<String>, private_key_pem: impl Into<String>) -> Self {
        Self {
            certificate: certificate.into(),
            private_key_pem: private_key_pem.into(),
            chain: Vec::new(),
        }
    }

    /// Appends an issuer certificate.
    pub fn with_chain_certificate(mut self, certificate: impl Into<String>) -> Self {
        self.chain.push(certificate.into());
        self
    }

    fn chain_pem(&self) -> Result<Option<String>> {
        if self.chain.is_empty() {
            return Ok(None);
        }
        let chain = self
            .chain
            .iter()
            .map(|c| ensure_pem(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(chain.join("\n")))
    }
}

impl fmt::Debug for ImportMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportMaterial")
            .field("certificate", &format_args!("{} bytes", self.certificate.len()))
            .field("private_key_pem", &crate::config::REDACTED)
            .field("chain", &self.chain.len())
            .finish()
    }
}

/// A certificate add (new import or replacement).
#[derive(Debug, Clone)]
pub struct AddCertificate {
    /// Target region
    pub region: String,
    /// ARN of an existing imported certificate to replace
    pub alias: Option<String>,
    /// Tags for a new import; not applied on replacement
    pub tags: Vec<Tag>,
    /// Certificate and key
    pub material: ImportMaterial,
}

/// Applies management operations to regional stores.
pub struct StoreMutator {
    connector: Arc<dyn StoreConnector>,
}

impl StoreMutator {
    /// Creates a mutator over `connector`.
    pub fn new(connector: Arc<dyn StoreConnector>) -> Self {
        Self { connector }
    }

    /// Imports a certificate, replacing `add.alias` when given. Returns the
    /// certificate ARN.
    ///
    /// # Errors
    ///
    /// - [`OrchestratorError::Configuration`]: invalid region, alias that is
    ///   not an ARN in that region, or missing private key
    /// - [`OrchestratorError::NotSupported`]: the alias names a certificate
    ///   that was not user-imported
    /// - [`OrchestratorError::RegionOperation`]: the store call failed
    pub async fn add(&self, add: &AddCertificate, credential: Option<&CloudCredential>) -> Result<String> {
        let region = add.region.trim();
        validate_region(region)?;

        if add.material.private_key_pem.trim().is_empty() {
            return Err(OrchestratorError::Configuration(
                "certificate must include a private key".to_string(),
            ));
        }

        let replace_arn = match add.alias.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            None => None,
            Some(alias) if alias.len() < MIN_ARN_LENGTH => {
                return Err(OrchestratorError::Configuration(format!(
                    "alias '{}' is not a certificate ARN",
                    alias
                )))
            }
            Some(alias) => {
                let alias_region = region_from_arn(alias)?;
                if alias_region != region {
                    return Err(OrchestratorError::Configuration(format!(
                        "alias {} is in {}, not {}",
                        alias, alias_region, region
                    )));
                }
                Some(alias.to_string())
            }
        };

        let certificate_pem = ensure_pem(&add.material.certificate)?;
        let chain_pem = add.material.chain_pem()?;

        let store = self
            .connector
            .connect(region, credential)
            .await
            .map_err(|e| OrchestratorError::region_op(region, "connect", e))?;

        if let Some(ref arn) = replace_arn {
            let kind = store
                .describe_certificate(arn)
                .await
                .map_err(|e| OrchestratorError::region_op(region, "describe", e))?;

            if kind != CertificateKind::Imported {
                return Err(OrchestratorError::NotSupported(format!(
                    "{} has type {}; only imported certificates can be replaced",
                    arn, kind
                )));
            }

            if !add.tags.is_empty() {
                info!(alias = %arn, "tags are only applied to new imports, ignoring them");
            }
        }

        let tags = if replace_arn.is_none() {
            add.tags.clone()
        } else {
            Vec::new()
        };

        let request = ImportRequest {
            certificate_pem,
            private_key_pem: add.material.private_key_pem.clone(),
            chain_pem,
            certificate_arn: replace_arn,
            tags,
        };
        debug!(request = ?request, "importing certificate");

        let arn = store
            .import_certificate(request)
            .await
            .map_err(|e| OrchestratorError::region_op(region, "import", e))?;

        info!(alias = %arn, region, "certificate imported");
        Ok(arn)
    }

    /// Deletes the certificate `arn` from the region encoded in the ARN.
    ///
    /// # Errors
    ///
    /// - [`OrchestratorError::Configuration`]: `arn` is not a regional ARN
    /// - [`OrchestratorError::RegionOperation`]: the store call failed
    pub async fn remove(&self, arn: &str, credential: Option<&CloudCredential>) -> Result<()> {
        let arn = arn.trim();
        let region = region_from_arn(arn)?;

        let store = self
            .connector
            .connect(region, credential)
            .await
            .map_err(|e| OrchestratorError::region_op(region, "connect", e))?;

        store
            .delete_certificate(arn)
            .await
            .map_err(|e| OrchestratorError::region_op(region, "delete", e))?;

        info!(alias = arn, region, "certificate removed");
        Ok(())
    }
}
