//! ACM Orchestrator - certificate inventory and management for AWS
//! Certificate Manager across regions.
//!
//! The orchestrator resolves per-store credentials (IAM user keys, OAuth
//! web-identity federation, or ambient SDK discovery), then inventories or
//! mutates certificates in every configured region. Failures are isolated:
//! one bad region or one unreadable certificate never sinks the whole job.
//!
//! # Features
//!
//! - **Three auth modes**: `static`, `federated` and `default`, selected
//!   explicitly per store
//! - **Async/Await**: Built on tokio for non-blocking I/O
//! - **Fault isolation**: per-region and per-record error scopes
//! - **Redaction**: secrets and bearer tokens never appear in logs
//! - **Feature Flags**: Optional AWS SDK compilation; in-memory mock by default
//!
//! # Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "aws")]
//! # async fn run() -> acm_orchestrator::Result<()> {
//! use acm_orchestrator::job::{InventoryJob, StoreDetails};
//! use acm_orchestrator::{InventoryRecord, JobCredentials, Orchestrator, OrchestratorConfig};
//!
//! acm_orchestrator::logging::init();
//! let orchestrator = Orchestrator::aws(OrchestratorConfig::from_env()?)?;
//!
//! let job = InventoryJob {
//!     job_history_id: 42,
//!     store: StoreDetails {
//!         client_machine: "123456789012".to_string(),
//!         store_path: "us-east-1,eu-west-1".to_string(),
//!         properties: r#"{"auth_mode":"static","role_name":"CertReader"}"#.to_string(),
//!     },
//!     credentials: JobCredentials::new("AKIA...", "secret"),
//! };
//!
//! let result = orchestrator
//!     .run_inventory(&job, &mut |records: Vec<InventoryRecord>| {
//!         println!("{} certificates", records.len());
//!         true
//!     })
//!     .await;
//! println!("{}", result.status);
//! # Ok(())
//! # }
//! ```
//!
//! # Feature Flags
//!
//! | Feature | Default | Provides |
//! |---------|---------|----------|
//! | `mock` | yes | In-memory store, role assumer and token endpoint |
//! | `aws` | no | ACM store and STS role assumer via the AWS SDK |
//! | `full` | no | Both |

pub mod backends;
pub mod config;
pub mod credential;
pub mod error;
pub mod inventory;
pub mod job;
pub mod logging;
pub mod management;
pub mod oauth;
pub mod pem;
pub mod record;
pub mod resolver;
pub mod secret;
pub mod store;
pub mod sts;
pub mod sweep;
pub mod validation;

pub use config::{AuthConfig, AuthMode, JobCredentials, OrchestratorConfig, RoleTarget};
pub use credential::{CloudCredential, FederatedToken};
pub use error::{OrchestratorError, Result};
pub use job::{JobResult, JobStatus, Orchestrator};
pub use oauth::OAuthClient;
pub use record::InventoryRecord;
pub use resolver::CredentialResolver;
pub use store::{CertificateStore, StoreConnector};
pub use sweep::{RegionSweeper, RegionTarget, SweepReport};
