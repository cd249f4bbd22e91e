//! AWS Certificate Manager and STS backends.
//!
//! These backends use the official AWS SDK.
//!
//! # Requirements
//!
//! For the `default` authentication mode, AWS credentials configured via:
//! - Environment variables (`AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`)
//! - Shared credentials file (`~/.aws/credentials`)
//! - IAM instance role (for EC2/ECS)
//!
//! The `static` and `federated` modes pass resolved temporary credentials
//! explicitly and never consult the ambient chain.
//!
//! # Example
//!
//! ```no_run
//! use acm_orchestrator::backends::aws::AcmConnector;
//! use acm_orchestrator::store::StoreConnector;
//!
//! #[tokio::main]
//! async fn main() -> acm_orchestrator::Result<()> {
//!     let connector = AcmConnector::new();
//!     let store = connector.connect("us-west-2", None).await?;
//!
//!     let page = store.list_certificates(None).await?;
//!     println!("{} certificates", page.summaries.len());
//!     Ok(())
//! }
//! ```

mod acm;
mod sts;

pub use acm::{AcmConnector, AcmStore};
pub use sts::StsRoleAssumer;
