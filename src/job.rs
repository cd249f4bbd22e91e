//! Job entry points: inventory and management runs.
//!
//! Every run resolves fresh credentials, does its work, and always reports
//! a [`JobResult`]. Configuration and authentication problems fail the job;
//! problems confined to one region or one certificate only downgrade it to
//! a warning.

use crate::config::{parse_regions, AuthConfig, JobCredentials, OrchestratorConfig, StoreProperties};
use crate::credential::CloudCredential;
use crate::inventory::InventoryCollector;
use crate::management::{AddCertificate, ImportMaterial, StoreMutator};
use crate::oauth::TokenExchange;
use crate::record::{InventoryRecord, REGION_FIELD, TAGS_FIELD};
use crate::resolver::CredentialResolver;
use crate::secret::SecretResolver;
use crate::store::{parse_tags, StoreConnector};
use crate::sts::RoleAssumer;
use crate::sweep::{RegionSweeper, RegionTarget};
use crate::{OrchestratorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Outcome category of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Everything succeeded
    Success,
    /// Partial success; details in the message
    Warning,
    /// Nothing useful was done
    Failure,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::Warning => write!(f, "Warning"),
            Self::Failure => write!(f, "Failure"),
        }
    }
}

/// Result reported back to the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    /// Outcome
    pub status: JobStatus,
    /// Host-assigned job history id
    pub job_history_id: i64,
    /// Failure or warning details; empty on success
    pub message: String,
}

impl JobResult {
    /// A successful result.
    pub fn success(job_history_id: i64) -> Self {
        Self {
            status: JobStatus::Success,
            job_history_id,
            message: String::new(),
        }
    }

    /// A partially successful result.
    pub fn warning(job_history_id: i64, message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Warning,
            job_history_id,
            message: message.into(),
        }
    }

    /// A failed result.
    pub fn failure(job_history_id: i64, message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failure,
            job_history_id,
            message: message.into(),
        }
    }
}

/// Certificate store definition carried on every job.
#[derive(Debug, Clone, Default)]
pub struct StoreDetails {
    /// Legacy account slot: account id or role ARN
    pub client_machine: String,
    /// Comma-separated region list
    pub store_path: String,
    /// Store custom fields as JSON
    pub properties: String,
}

impl StoreDetails {
    fn auth_config(&self, credentials: &JobCredentials) -> Result<AuthConfig> {
        let properties = StoreProperties::from_json(&self.properties)?;
        AuthConfig::from_store(&properties, &self.client_machine, credentials)
    }
}

/// An inventory job.
#[derive(Debug, Clone)]
pub struct InventoryJob {
    /// Host-assigned job history id
    pub job_history_id: i64,
    /// Store definition
    pub store: StoreDetails,
    /// Server username/password slots
    pub credentials: JobCredentials,
}

/// Management operation requested by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagementOperation {
    /// Import or replace a certificate
    Add,
    /// Delete a certificate
    Remove,
    /// Anything else
    Unsupported(String),
}

impl ManagementOperation {
    /// Parses the host's operation name (case-insensitive).
    pub fn parse(operation: &str) -> Self {
        match operation.trim().to_ascii_lowercase().as_str() {
            "add" => Self::Add,
            "remove" => Self::Remove,
            _ => Self::Unsupported(operation.to_string()),
        }
    }
}

/// A management job.
#[derive(Debug, Clone)]
pub struct ManagementJob {
    /// Host-assigned job history id
    pub job_history_id: i64,
    /// Requested operation
    pub operation: ManagementOperation,
    /// Store definition
    pub store: StoreDetails,
    /// Server username/password slots
    pub credentials: JobCredentials,
    /// Certificate alias (ARN); required for remove, selects replace for add
    pub alias: Option<String>,
    /// Certificate to import; required for add
    pub material: Option<ImportMaterial>,
    /// Per-job entry parameters (`AWS Region`, `ACM Tags`)
    pub properties: HashMap<String, serde_json::Value>,
}

/// Receives inventory results.
///
/// Returns `false` when the host rejects the submission.
pub trait InventorySink: Send {
    /// Submits the full record set for the store.
    fn submit(&mut self, records: Vec<InventoryRecord>) -> bool;
}

impl<F> InventorySink for F
where
    F: FnMut(Vec<InventoryRecord>) -> bool + Send,
{
    fn submit(&mut self, records: Vec<InventoryRecord>) -> bool {
        self(records)
    }
}

enum ManagementPlan {
    Add(AddCertificate),
    Remove(String),
}

/// Runs inventory and management jobs against certificate stores.
///
/// # Example
///
/// ```no_run
/// # #[cfg(feature = "mock")]
/// # async fn example() {
/// use acm_orchestrator::backends::mock::{MockConnector, MockRoleAssumer, MockTokenExchange};
/// use acm_orchestrator::job::{InventoryJob, StoreDetails};
/// use acm_orchestrator::{InventoryRecord, Orchestrator, OrchestratorConfig};
/// use std::sync::Arc;
///
/// let orchestrator = Orchestrator::new(
///     OrchestratorConfig::new(),
///     Arc::new(MockConnector::new()),
///     Arc::new(MockRoleAssumer::new()),
///     Arc::new(MockTokenExchange::new()),
/// );
///
/// let job = InventoryJob {
///     job_history_id: 1,
///     store: StoreDetails {
///         store_path: "us-east-1,eu-west-1".to_string(),
///         ..Default::default()
///     },
///     credentials: Default::default(),
/// };
///
/// let mut submitted = Vec::new();
/// let result = orchestrator
///     .run_inventory(&job, &mut |records: Vec<InventoryRecord>| {
///         submitted = records;
///         true
///     })
///     .await;
/// println!("{}: {}", result.status, result.message);
/// # }
/// ```
pub struct Orchestrator {
    resolver: CredentialResolver,
    connector: Arc<dyn StoreConnector>,
    sweeper: RegionSweeper,
}

impl Orchestrator {
    /// Creates an orchestrator from its collaborators.
    pub fn new(
        config: OrchestratorConfig,
        connector: Arc<dyn StoreConnector>,
        role_assumer: Arc<dyn RoleAssumer>,
        token_exchange: Arc<dyn TokenExchange>,
    ) -> Self {
        Self {
            resolver: CredentialResolver::new(role_assumer, token_exchange, config.timeout),
            connector,
            sweeper: RegionSweeper::new(config.concurrency),
        }
    }

    /// Creates an orchestrator backed by ACM, STS and an HTTP token client.
    #[cfg(feature = "aws")]
    pub fn aws(config: OrchestratorConfig) -> Result<Self> {
        use crate::backends::aws::{AcmConnector, StsRoleAssumer};
        use crate::oauth::OAuthClient;

        let token_exchange = OAuthClient::new(config.timeout)?;
        Ok(Self::new(
            config.clone(),
            Arc::new(AcmConnector::from_config(&config)),
            Arc::new(StsRoleAssumer::new(&config)),
            Arc::new(token_exchange),
        ))
    }

    /// Routes credential fields through `resolver` (e.g. a vault lookup).
    pub fn with_secret_resolver(mut self, resolver: Arc<dyn SecretResolver>) -> Self {
        self.resolver = self.resolver.with_secret_resolver(resolver);
        self
    }

    /// Inventories every region in the store path and submits the merged
    /// records to `sink`.
    pub async fn run_inventory(&self, job: &InventoryJob, sink: &mut dyn InventorySink) -> JobResult {
        let span = info_span!(
            "inventory",
            run_id = %Uuid::new_v4(),
            job_history_id = job.job_history_id
        );

        async {
            info!(store_path = %job.store.store_path, "starting inventory");

            let (auth, regions) = match job
                .store
                .auth_config(&job.credentials)
                .and_then(|auth| Ok((auth, parse_regions(&job.store.store_path)?)))
            {
                Ok(parsed) => parsed,
                Err(e) => return fail(job.job_history_id, "Inventory", e),
            };

            let credential = match self.resolver.resolve(&auth).await {
                Ok(credential) => credential,
                Err(e) => return fail(job.job_history_id, "Inventory", e),
            };

            let targets: Vec<RegionTarget> = regions.into_iter().map(RegionTarget::new).collect();
            self.sweep_inventory(job.job_history_id, credential.as_ref(), &targets, sink)
                .await
        }
        .instrument(span)
        .await
    }

    /// Inventories explicit region targets with already-resolved
    /// credentials. Targets may carry their own credential.
    pub async fn sweep_inventory(
        &self,
        job_history_id: i64,
        credential: Option<&CloudCredential>,
        targets: &[RegionTarget],
        sink: &mut dyn InventorySink,
    ) -> JobResult {
        let collector = InventoryCollector::new(self.connector.clone());
        let report = self.sweeper.sweep(credential, targets, &collector).await;

        let record_count = report.records.len();
        let status = report.status();
        let summary = report.summary();

        if !sink.submit(report.records) {
            warn!(records = record_count, "host rejected the inventory submission");
            let message = if summary.is_empty() {
                "inventory submission was rejected by the host".to_string()
            } else {
                format!("{}. Inventory submission was rejected by the host", summary)
            };
            return JobResult::warning(job_history_id, message);
        }

        info!(records = record_count, %status, "inventory complete");
        match status {
            JobStatus::Success => JobResult::success(job_history_id),
            _ => JobResult::warning(job_history_id, summary),
        }
    }

    /// Runs an add or remove.
    pub async fn run_management(&self, job: &ManagementJob) -> JobResult {
        let span = info_span!(
            "management",
            run_id = %Uuid::new_v4(),
            job_history_id = job.job_history_id,
            operation = ?job.operation
        );

        async {
            let context = match job.operation {
                ManagementOperation::Add => "Management/Add",
                ManagementOperation::Remove => "Management/Remove",
                ManagementOperation::Unsupported(ref operation) => {
                    error!(operation = %operation, "unsupported management operation");
                    return JobResult::failure(job.job_history_id, "Invalid Management Operation");
                }
            };

            let (auth, plan) = match job
                .store
                .auth_config(&job.credentials)
                .and_then(|auth| Ok((auth, plan_management(job)?)))
            {
                Ok(parsed) => parsed,
                Err(e) => return fail(job.job_history_id, context, e),
            };

            let credential = match self.resolver.resolve(&auth).await {
                Ok(credential) => credential,
                Err(e) => return fail(job.job_history_id, context, e),
            };

            let mutator = StoreMutator::new(self.connector.clone());
            let outcome = match plan {
                ManagementPlan::Add(ref add) => mutator.add(add, credential.as_ref()).await.map(|_| ()),
                ManagementPlan::Remove(ref arn) => mutator.remove(arn, credential.as_ref()).await,
            };

            match outcome {
                Ok(()) => JobResult::success(job.job_history_id),
                Err(e) => fail(job.job_history_id, context, e),
            }
        }
        .instrument(span)
        .await
    }
}

fn plan_management(job: &ManagementJob) -> Result<ManagementPlan> {
    let alias = job
        .alias
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());

    match job.operation {
        ManagementOperation::Add => {
            let material = job.material.clone().ok_or_else(|| {
                OrchestratorError::Configuration("add requires a certificate with a private key".to_string())
            })?;
            let region = property(&job.properties, REGION_FIELD)?.ok_or_else(|| {
                OrchestratorError::Configuration(format!("'{}' is required for add", REGION_FIELD))
            })?;
            let tags = match property(&job.properties, TAGS_FIELD)? {
                Some(text) => parse_tags(&text)?,
                None => Vec::new(),
            };

            Ok(ManagementPlan::Add(AddCertificate {
                region,
                alias: alias.map(str::to_string),
                tags,
                material,
            }))
        }
        ManagementOperation::Remove => alias
            .map(|a| ManagementPlan::Remove(a.to_string()))
            .ok_or_else(|| OrchestratorError::Configuration("remove requires a certificate alias".to_string())),
        ManagementOperation::Unsupported(ref operation) => Err(OrchestratorError::NotSupported(format!(
            "management operation {}",
            operation
        ))),
    }
}

fn property(properties: &HashMap<String, serde_json::Value>, name: &str) -> Result<Option<String>> {
    match properties.get(name) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(other) => Err(OrchestratorError::Configuration(format!(
            "'{}' must be a string, got {}",
            name, other
        ))),
    }
}

fn fail(job_history_id: i64, context: &str, e: OrchestratorError) -> JobResult {
    error!(error = %e, "{} failed", context);
    JobResult::failure(job_history_id, format!("{}: {}", context, e))
}
