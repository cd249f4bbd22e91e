//! Error types for orchestrator operations.

use thiserror::Error;

/// Result type alias using [`OrchestratorError`].
pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Errors that can occur while resolving credentials or touching a
/// certificate store.
///
/// Configuration and authentication errors are fatal to a job; region and
/// record errors are caught at their own scope and only downgrade the job
/// result. See [`OrchestratorError::is_fatal`].
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Store configuration is missing a field, ambiguous, or insecure.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Token exchange, secret resolution, or role assumption failed.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// A single region's store operation failed.
    #[error("region {region}: {operation}: {source}")]
    RegionOperation {
        /// Region identifier (e.g. `us-east-1`)
        region: String,
        /// Operation name (connect, list, import, delete, ...)
        operation: String,
        /// Underlying error
        #[source]
        source: Box<OrchestratorError>,
    },

    /// A single certificate could not be turned into an inventory record.
    #[error("record {alias}: {source}")]
    RecordBuild {
        /// Certificate alias (ARN)
        alias: String,
        /// Underlying error
        #[source]
        source: Box<OrchestratorError>,
    },

    /// The certificate store rejected or failed a call.
    #[error("store error: {0}")]
    Store(String),

    /// Certificate was not found in the store.
    #[error("certificate not found: {0}")]
    NotFound(String),

    /// Operation is not allowed for this certificate or store.
    #[error("operation not supported: {0}")]
    NotSupported(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error (catch-all).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OrchestratorError {
    /// Wraps an error with the region and operation that produced it.
    ///
    /// # Example
    ///
    /// ```
    /// use acm_orchestrator::OrchestratorError;
    ///
    /// let err = OrchestratorError::Store("throttled".to_string());
    /// let wrapped = OrchestratorError::region_op("eu-west-1", "list", err);
    ///
    /// assert_eq!(
    ///     wrapped.to_string(),
    ///     "region eu-west-1: list: store error: throttled"
    /// );
    /// ```
    pub fn region_op(
        region: impl Into<String>,
        operation: impl Into<String>,
        err: OrchestratorError,
    ) -> Self {
        Self::RegionOperation {
            region: region.into(),
            operation: operation.into(),
            source: Box::new(err),
        }
    }

    /// Wraps an error with the alias of the record that failed to build.
    pub fn record(alias: impl Into<String>, err: OrchestratorError) -> Self {
        Self::RecordBuild {
            alias: alias.into(),
            source: Box::new(err),
        }
    }

    /// Returns true for errors that must abort the whole job.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Authentication(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err = OrchestratorError::Configuration("role_arn is required".to_string());
        assert_eq!(err.to_string(), "configuration error: role_arn is required");
    }

    #[test]
    fn test_region_operation_error() {
        let inner = OrchestratorError::Authentication("token expired".to_string());
        let err = OrchestratorError::region_op("ap-south-1", "connect", inner);

        let error_string = err.to_string();
        assert!(error_string.contains("ap-south-1"));
        assert!(error_string.contains("connect"));
        assert!(error_string.contains("token expired"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_fatality() {
        assert!(OrchestratorError::Configuration("x".into()).is_fatal());
        assert!(OrchestratorError::Authentication("x".into()).is_fatal());
        assert!(!OrchestratorError::Store("x".into()).is_fatal());

        let wrapped =
            OrchestratorError::region_op("us-east-1", "list", OrchestratorError::Authentication("x".into()));
        assert!(!wrapped.is_fatal());
    }
}
