//! Validation of AWS identifiers taken from store configuration.

use crate::{OrchestratorError, Result};

/// Maximum length of an IAM role name.
const MAX_ROLE_NAME_LENGTH: usize = 64;

/// Characters IAM accepts in a role name besides alphanumerics.
const ROLE_NAME_SYMBOLS: &str = "+=,.@_-";

/// Shortest alias accepted as a certificate ARN on import.
pub const MIN_ARN_LENGTH: usize = 20;

/// Validates a region identifier such as `us-east-1`.
///
/// # Example
///
/// ```
/// use acm_orchestrator::validation::validate_region;
///
/// assert!(validate_region("us-east-1").is_ok());
/// assert!(validate_region("ap-southeast-2").is_ok());
///
/// assert!(validate_region("").is_err());
/// assert!(validate_region("US East").is_err());
/// ```
pub fn validate_region(region: &str) -> Result<()> {
    if region.is_empty() {
        return Err(OrchestratorError::Configuration(
            "region cannot be empty".to_string(),
        ));
    }

    let valid = region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if !valid || region.starts_with('-') || region.ends_with('-') || !region.contains('-') {
        return Err(OrchestratorError::Configuration(format!(
            "invalid region identifier: {}",
            region
        )));
    }

    Ok(())
}

/// Validates a 12-digit AWS account id.
pub fn validate_account_id(account_id: &str) -> Result<()> {
    if account_id.len() != 12 || !account_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(OrchestratorError::Configuration(format!(
            "account id must be 12 digits: {}",
            account_id
        )));
    }
    Ok(())
}

/// Validates an IAM role name.
pub fn validate_role_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(OrchestratorError::Configuration(
            "role name cannot be empty".to_string(),
        ));
    }

    if name.len() > MAX_ROLE_NAME_LENGTH {
        return Err(OrchestratorError::Configuration(format!(
            "role name exceeds maximum length of {} characters",
            MAX_ROLE_NAME_LENGTH
        )));
    }

    if name
        .chars()
        .any(|c| !c.is_ascii_alphanumeric() && !ROLE_NAME_SYMBOLS.contains(c))
    {
        return Err(OrchestratorError::Configuration(format!(
            "role name contains invalid characters (allowed symbols: {})",
            ROLE_NAME_SYMBOLS
        )));
    }

    Ok(())
}

/// Validates a role ARN (`arn:<partition>:iam::<account>:role/<name>`).
pub fn validate_role_arn(arn: &str) -> Result<()> {
    let parts: Vec<&str> = arn.splitn(6, ':').collect();
    if parts.len() != 6 || parts[0] != "arn" || parts[2] != "iam" {
        return Err(OrchestratorError::Configuration(format!(
            "not an IAM role ARN: {}",
            arn
        )));
    }

    if !parts[5].starts_with("role/") || parts[5].len() <= "role/".len() {
        return Err(OrchestratorError::Configuration(format!(
            "ARN does not name a role: {}",
            arn
        )));
    }

    Ok(())
}

/// Extracts the region segment from a certificate ARN.
///
/// `arn:aws:acm:us-west-2:123456789012:certificate/abc` yields `us-west-2`.
///
/// # Errors
///
/// Returns [`OrchestratorError::Configuration`] if the alias is not an ARN
/// or its region segment is not a valid region.
pub fn region_from_arn(arn: &str) -> Result<&str> {
    let mut parts = arn.split(':');
    if parts.next() != Some("arn") {
        return Err(OrchestratorError::Configuration(format!(
            "alias is not an ARN: {}",
            arn
        )));
    }

    let region = parts.nth(2).ok_or_else(|| {
        OrchestratorError::Configuration(format!("ARN has no region segment: {}", arn))
    })?;
    validate_region(region)?;
    Ok(region)
}
