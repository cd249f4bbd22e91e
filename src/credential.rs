//! Credential values produced during resolution.

use crate::config::REDACTED;
use chrono::{DateTime, Utc};
use std::fmt;

/// Temporary, role-scoped cloud credentials.
///
/// Created once per job invocation and dropped when the job completes.
/// Never cached or persisted. `Debug` output hides the secret and session
/// token.
#[derive(Clone, PartialEq, Eq)]
pub struct CloudCredential {
    /// Access key id
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Session token issued with the assumed role
    pub session_token: String,
    /// When the credentials stop working
    pub expiration: Option<DateTime<Utc>>,
}

impl CloudCredential {
    /// Creates a credential set.
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: impl Into<String>,
        expiration: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: session_token.into(),
            expiration,
        }
    }

    /// Returns true once the expiry has passed.
    pub fn is_expired(&self) -> bool {
        self.expiration.is_some_and(|exp| Utc::now() >= exp)
    }

    /// Returns true when every field needed to sign requests is present.
    pub fn is_complete(&self) -> bool {
        !self.access_key_id.is_empty()
            && !self.secret_access_key.is_empty()
            && !self.session_token.is_empty()
    }
}

impl fmt::Debug for CloudCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudCredential")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &REDACTED)
            .field("session_token", &REDACTED)
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Bearer token issued by the external identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct FederatedToken {
    /// Bearer token used as the web-identity assertion
    pub access_token: String,
    /// Lifetime in seconds; 0 when the provider did not say
    pub expires_in: u64,
    /// Token type (usually `Bearer`)
    pub token_type: Option<String>,
    /// Granted scope
    pub scope: Option<String>,
}

impl fmt::Debug for FederatedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FederatedToken")
            .field("access_token", &REDACTED)
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .finish()
    }
}
