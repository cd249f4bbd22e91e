//! Configuration types: orchestrator settings, store custom fields, and the
//! per-store authentication configuration derived from them.

use crate::oauth::require_https;
use crate::validation::{validate_account_id, validate_region, validate_role_arn, validate_role_name};
use crate::{OrchestratorError, Result};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Role session name used for every role assumption.
pub const SESSION_NAME: &str = "OrchestratorSession";

/// Placeholder printed in place of secrets.
pub const REDACTED: &str = "**redacted**";

/// Authentication strategy for a certificate store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMode {
    /// IAM user access key and secret, used to assume a role
    StaticKey,
    /// OAuth2 client-credentials token exchanged via web-identity federation
    FederatedOAuth,
    /// Ambient SDK credential discovery, no role assumption
    Default,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaticKey => write!(f, "static"),
            Self::FederatedOAuth => write!(f, "federated"),
            Self::Default => write!(f, "default"),
        }
    }
}

impl FromStr for AuthMode {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(Self::StaticKey),
            "federated" => Ok(Self::FederatedOAuth),
            "default" => Ok(Self::Default),
            other => Err(OrchestratorError::Configuration(format!(
                "unknown auth_mode '{}' (expected static, federated or default)",
                other
            ))),
        }
    }
}

/// The IAM role to assume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleTarget {
    /// Full role ARN
    Arn(String),
    /// Account id and role name, rendered as `arn:aws:iam::{account}:role/{name}`
    AccountRole {
        /// 12-digit account id
        account_id: String,
        /// Role name
        role_name: String,
    },
}

impl RoleTarget {
    /// Creates a target from a full role ARN.
    pub fn arn(arn: impl Into<String>) -> Result<Self> {
        let arn = arn.into();
        validate_role_arn(&arn)?;
        Ok(Self::Arn(arn))
    }

    /// Creates a target from an account id and role name.
    pub fn account_role(account_id: impl Into<String>, role_name: impl Into<String>) -> Result<Self> {
        let account_id = account_id.into();
        let role_name = role_name.into();
        validate_account_id(&account_id)?;
        validate_role_name(&role_name)?;
        Ok(Self::AccountRole {
            account_id,
            role_name,
        })
    }

    /// Returns the role ARN.
    pub fn role_arn(&self) -> String {
        match self {
            Self::Arn(arn) => arn.clone(),
            Self::AccountRole {
                account_id,
                role_name,
            } => format!("arn:aws:iam::{}:role/{}", account_id, role_name),
        }
    }
}

/// Parameters of the OAuth2 client-credentials exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthSettings {
    /// Token endpoint (must be `https`)
    pub oauth_url: String,
    /// `grant_type` form parameter
    pub grant_type: String,
    /// `scope` form parameter
    pub scope: String,
    /// Client id, possibly a secret reference
    pub client_id_ref: String,
    /// Client secret, possibly a secret reference
    pub client_secret_ref: String,
    /// Role to assume with the issued token
    pub role: RoleTarget,
}

impl fmt::Debug for OAuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthSettings")
            .field("oauth_url", &self.oauth_url)
            .field("grant_type", &self.grant_type)
            .field("scope", &self.scope)
            .field("client_id_ref", &self.client_id_ref)
            .field("client_secret_ref", &REDACTED)
            .field("role", &self.role)
            .finish()
    }
}

/// Authentication configuration for one certificate store.
///
/// Exactly one mode is active. `Default` carries no role-assumption
/// parameters, so the resolver has nothing to assume.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthConfig {
    /// Assume `role` using an IAM user's access key and secret.
    StaticKey {
        /// Access key id, possibly a secret reference
        access_key_ref: String,
        /// Secret access key, possibly a secret reference
        secret_ref: String,
        /// Role to assume
        role: RoleTarget,
    },
    /// Exchange client credentials for a token, then assume a role with it.
    FederatedOAuth(OAuthSettings),
    /// Defer to ambient SDK credential discovery.
    Default,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaticKey {
                access_key_ref,
                role,
                ..
            } => f
                .debug_struct("StaticKey")
                .field("access_key_ref", access_key_ref)
                .field("secret_ref", &REDACTED)
                .field("role", role)
                .finish(),
            Self::FederatedOAuth(settings) => f.debug_tuple("FederatedOAuth").field(settings).finish(),
            Self::Default => write!(f, "Default"),
        }
    }
}

impl AuthConfig {
    /// Returns the selected mode.
    pub fn mode(&self) -> AuthMode {
        match self {
            Self::StaticKey { .. } => AuthMode::StaticKey,
            Self::FederatedOAuth(_) => AuthMode::FederatedOAuth,
            Self::Default => AuthMode::Default,
        }
    }

    /// Returns the role to assume, if the mode assumes one.
    pub fn role(&self) -> Option<&RoleTarget> {
        match self {
            Self::StaticKey { role, .. } => Some(role),
            Self::FederatedOAuth(settings) => Some(&settings.role),
            Self::Default => None,
        }
    }

    /// Checks that every field the mode needs is present and safe.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Configuration`] for a missing field or a
    /// token endpoint whose scheme is not `https`.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::StaticKey {
                access_key_ref,
                secret_ref,
                ..
            } => {
                require("access key", access_key_ref)?;
                require("secret key", secret_ref)?;
            }
            Self::FederatedOAuth(settings) => {
                require("OAuth URL", &settings.oauth_url)?;
                require("OAuth grant type", &settings.grant_type)?;
                require("OAuth client id", &settings.client_id_ref)?;
                require("OAuth client secret", &settings.client_secret_ref)?;
                require_https(&settings.oauth_url)?;
            }
            Self::Default => {}
        }
        Ok(())
    }

    /// Builds the configuration from store custom fields and the job's
    /// credential slots.
    ///
    /// `client_machine` is the store's legacy account slot: a role ARN there
    /// is used directly, anything else is treated as the account id when the
    /// `account_id` custom field is absent.
    pub fn from_store(
        properties: &StoreProperties,
        client_machine: &str,
        credentials: &JobCredentials,
    ) -> Result<Self> {
        let mode = properties.auth_mode()?;

        let config = match mode {
            AuthMode::Default => Self::Default,
            AuthMode::StaticKey => Self::StaticKey {
                access_key_ref: first_present(&properties.access_key_ref, &credentials.server_username),
                secret_ref: first_present(&properties.secret_ref, &credentials.server_password),
                role: properties.role_target(
                    mode,
                    non_empty(&properties.iam_assume_role),
                    client_machine,
                )?,
            },
            AuthMode::FederatedOAuth => Self::FederatedOAuth(OAuthSettings {
                oauth_url: first_present(&properties.oauth_url, &None),
                grant_type: non_empty(&properties.grant_type)
                    .unwrap_or("client_credentials")
                    .to_string(),
                scope: first_present(&properties.scope, &None),
                client_id_ref: first_present(&properties.client_id_ref, &credentials.server_username),
                client_secret_ref: first_present(
                    &properties.client_secret_ref,
                    &credentials.server_password,
                ),
                role: properties.role_target(
                    mode,
                    non_empty(&properties.oauth_assume_role),
                    client_machine,
                )?,
            }),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Credential slots carried on a job (server username/password).
///
/// Depending on the mode these hold an access key and secret, or an OAuth
/// client id and secret.
#[derive(Clone, Default)]
pub struct JobCredentials {
    /// Access key id or OAuth client id
    pub server_username: Option<String>,
    /// Secret access key or OAuth client secret
    pub server_password: Option<String>,
}

impl JobCredentials {
    /// Creates credential slots from a username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            server_username: Some(username.into()),
            server_password: Some(password.into()),
        }
    }
}

impl fmt::Debug for JobCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobCredentials")
            .field("server_username", &self.server_username)
            .field("server_password", &self.server_password.as_ref().map(|_| REDACTED))
            .finish()
    }
}

/// Store custom fields as delivered by the host platform.
///
/// Both the `auth_mode` selector and the legacy `UseIAM` / `UseOAuth` flags
/// are understood. Flags may arrive as JSON booleans or as `"true"` /
/// `"false"` strings; missing flags are `false`.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreProperties {
    pub auth_mode: Option<String>,
    #[serde(rename = "UseIAM", deserialize_with = "deserialize_flag")]
    pub use_iam: bool,
    #[serde(rename = "UseOAuth", deserialize_with = "deserialize_flag")]
    pub use_oauth: bool,

    pub role_arn: Option<String>,
    pub account_id: Option<String>,
    pub role_name: Option<String>,
    #[serde(rename = "IAMAssumeRole")]
    pub iam_assume_role: Option<String>,
    #[serde(rename = "OAuthAssumeRole")]
    pub oauth_assume_role: Option<String>,

    pub access_key_ref: Option<String>,
    pub secret_ref: Option<String>,

    #[serde(rename = "OAuthUrl", alias = "oauth_url")]
    pub oauth_url: Option<String>,
    #[serde(rename = "OAuthGrantType", alias = "grant_type")]
    pub grant_type: Option<String>,
    #[serde(rename = "OAuthScope", alias = "scope")]
    pub scope: Option<String>,
    pub client_id_ref: Option<String>,
    pub client_secret_ref: Option<String>,
}

impl StoreProperties {
    /// Parses the store's custom-field JSON. An empty string yields defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(|e| {
            OrchestratorError::Configuration(format!("invalid store properties: {}", e))
        })
    }

    /// Selects the authentication mode from explicit flags.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Configuration`] if both legacy flags are
    /// set, or if `auth_mode` contradicts a legacy flag.
    pub fn auth_mode(&self) -> Result<AuthMode> {
        let legacy = match (self.use_iam, self.use_oauth) {
            (true, true) => {
                return Err(OrchestratorError::Configuration(
                    "both UseIAM and UseOAuth are set; select exactly one authentication mode"
                        .to_string(),
                ))
            }
            (true, false) => Some(AuthMode::StaticKey),
            (false, true) => Some(AuthMode::FederatedOAuth),
            (false, false) => None,
        };

        match (non_empty(&self.auth_mode), legacy) {
            (Some(explicit), legacy) => {
                let mode: AuthMode = explicit.parse()?;
                match legacy {
                    Some(flagged) if flagged != mode => Err(OrchestratorError::Configuration(format!(
                        "auth_mode '{}' contradicts legacy flag selecting '{}'",
                        mode, flagged
                    ))),
                    _ => Ok(mode),
                }
            }
            (None, Some(flagged)) => Ok(flagged),
            (None, None) => Ok(AuthMode::Default),
        }
    }

    fn role_target(
        &self,
        mode: AuthMode,
        legacy_role: Option<&str>,
        client_machine: &str,
    ) -> Result<RoleTarget> {
        if let Some(arn) = non_empty(&self.role_arn) {
            return RoleTarget::arn(arn);
        }

        let client_machine = client_machine.trim();
        if client_machine.starts_with("arn:") {
            return RoleTarget::arn(client_machine);
        }

        let role_name = non_empty(&self.role_name).or(legacy_role).ok_or_else(|| {
            OrchestratorError::Configuration(format!(
                "role_arn or role_name is required for {} authentication",
                mode
            ))
        })?;

        let account_id = non_empty(&self.account_id)
            .or((!client_machine.is_empty()).then_some(client_machine))
            .ok_or_else(|| {
                OrchestratorError::Configuration(format!(
                    "account_id is required for {} authentication when role_arn is absent",
                    mode
                ))
            })?;

        RoleTarget::account_role(account_id, role_name)
    }
}

/// Orchestrator-wide settings.
///
/// ```
/// use acm_orchestrator::OrchestratorConfig;
/// use std::time::Duration;
///
/// let config = OrchestratorConfig::new()
///     .with_timeout(Duration::from_secs(10))
///     .with_sts_region("eu-west-1")
///     .with_concurrency(4);
///
/// assert_eq!(config.concurrency, 4);
/// ```
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Upper bound for each token exchange and role assumption
    pub timeout: Duration,

    /// Region of the STS endpoint used for role assumption
    pub sts_region: String,

    /// Custom AWS endpoint URL (LocalStack testing)
    pub endpoint: Option<String>,

    /// Regions processed at once during a sweep (1 = sequential)
    pub concurrency: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            sts_region: "us-east-1".to_string(),
            endpoint: None,
            concurrency: 1,
        }
    }
}

impl OrchestratorConfig {
    /// Creates a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads settings from the environment, falling back to defaults.
    ///
    /// - `ACM_ORCHESTRATOR_TIMEOUT_SECS`
    /// - `ACM_ORCHESTRATOR_STS_REGION`
    /// - `ACM_ORCHESTRATOR_ENDPOINT`
    /// - `ACM_ORCHESTRATOR_CONCURRENCY`
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Configuration`] for a non-numeric value,
    /// a zero timeout, or an invalid STS region.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(secs) = var("ACM_ORCHESTRATOR_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                OrchestratorError::Configuration(format!(
                    "ACM_ORCHESTRATOR_TIMEOUT_SECS is not a number: {}",
                    secs
                ))
            })?;
            if secs == 0 {
                return Err(OrchestratorError::Configuration(
                    "ACM_ORCHESTRATOR_TIMEOUT_SECS must be at least 1".to_string(),
                ));
            }
            config = config.with_timeout(Duration::from_secs(secs));
        }

        if let Some(region) = var("ACM_ORCHESTRATOR_STS_REGION") {
            validate_region(&region)?;
            config = config.with_sts_region(region);
        }

        if let Some(endpoint) = var("ACM_ORCHESTRATOR_ENDPOINT") {
            config = config.with_endpoint(endpoint);
        }

        if let Some(n) = var("ACM_ORCHESTRATOR_CONCURRENCY") {
            let n: usize = n.trim().parse().map_err(|_| {
                OrchestratorError::Configuration(format!(
                    "ACM_ORCHESTRATOR_CONCURRENCY is not a number: {}",
                    n
                ))
            })?;
            config = config.with_concurrency(n);
        }

        Ok(config)
    }

    /// Sets the network timeout for credential resolution.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the STS region.
    pub fn with_sts_region(mut self, region: impl Into<String>) -> Self {
        self.sts_region = region.into();
        self
    }

    /// Points all AWS clients at a custom endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets sweep concurrency. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// Splits a comma-separated region list, trimming entries and skipping
/// empty ones. Order and duplicates are preserved.
pub fn parse_regions(csv: &str) -> Result<Vec<String>> {
    let regions: Vec<String> = csv
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();

    if regions.is_empty() {
        return Err(OrchestratorError::Configuration(
            "no regions configured in store path".to_string(),
        ));
    }

    for region in &regions {
        validate_region(region)?;
    }

    Ok(regions)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn first_present(primary: &Option<String>, fallback: &Option<String>) -> String {
    non_empty(primary)
        .or_else(|| non_empty(fallback))
        .unwrap_or_default()
        .to_string()
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OrchestratorError::Configuration(format!(
            "{} is required for the selected authentication mode",
            field
        )));
    }
    Ok(())
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Flag::Bool(b)) => Ok(b),
        Some(Flag::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!("invalid boolean flag: {}", other))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: serde_json::Value) -> StoreProperties {
        StoreProperties::from_json(&value.to_string()).unwrap()
    }

    #[test]
    fn test_auth_mode_parsing() {
        assert_eq!("static".parse::<AuthMode>().unwrap(), AuthMode::StaticKey);
        assert_eq!("Federated".parse::<AuthMode>().unwrap(), AuthMode::FederatedOAuth);
        assert_eq!(AuthMode::Default.to_string(), "default");
        assert!("okta".parse::<AuthMode>().is_err());
    }

    #[test]
    fn test_mode_selection_from_flags() {
        assert_eq!(props(json!({})).auth_mode().unwrap(), AuthMode::Default);
        assert_eq!(props(json!({"UseIAM": true})).auth_mode().unwrap(), AuthMode::StaticKey);
        assert_eq!(props(json!({"UseOAuth": "true"})).auth_mode().unwrap(), AuthMode::FederatedOAuth);
        assert_eq!(
            props(json!({"auth_mode": "federated", "UseOAuth": true})).auth_mode().unwrap(),
            AuthMode::FederatedOAuth
        );
    }

    #[test]
    fn test_ambiguous_flags_rejected() {
        let err = props(json!({"UseIAM": true, "UseOAuth": true})).auth_mode().unwrap_err();
        assert!(matches!(err, OrchestratorError::Configuration(_)));

        let err = props(json!({"auth_mode": "default", "UseIAM": "true"})).auth_mode().unwrap_err();
        assert!(err.to_string().contains("contradicts"));
    }

    #[test]
    fn test_fields_present_do_not_select_mode() {
        let p = props(json!({
            "OAuthUrl": "https://idp.example.com/oauth2/v1/token",
            "access_key_ref": "AK1",
        }));
        assert_eq!(p.auth_mode().unwrap(), AuthMode::Default);
    }

    #[test]
    fn test_static_from_store_uses_job_slots() {
        let p = props(json!({"auth_mode": "static", "role_arn": "arn:aws:iam::123456789012:role/X"}));
        let config = AuthConfig::from_store(&p, "", &JobCredentials::new("AK1", "SK1")).unwrap();

        match config {
            AuthConfig::StaticKey {
                access_key_ref,
                secret_ref,
                role,
            } => {
                assert_eq!(access_key_ref, "AK1");
                assert_eq!(secret_ref, "SK1");
                assert_eq!(role.role_arn(), "arn:aws:iam::123456789012:role/X");
            }
            other => panic!("unexpected config: {:?}", other),
        }
    }

    #[test]
    fn test_legacy_role_from_client_machine() {
        let p = props(json!({"UseIAM": true, "IAMAssumeRole": "CertReader"}));
        let config = AuthConfig::from_store(&p, "123456789012", &JobCredentials::new("AK", "SK")).unwrap();
        assert_eq!(
            config.role().unwrap().role_arn(),
            "arn:aws:iam::123456789012:role/CertReader"
        );

        let config = AuthConfig::from_store(
            &props(json!({"UseIAM": true})),
            "arn:aws:iam::123456789012:role/FromClientMachine",
            &JobCredentials::new("AK", "SK"),
        )
        .unwrap();
        assert_eq!(
            config.role().unwrap().role_arn(),
            "arn:aws:iam::123456789012:role/FromClientMachine"
        );
    }

    #[test]
    fn test_missing_role_is_configuration_error() {
        let p = props(json!({"auth_mode": "static"}));
        let err = AuthConfig::from_store(&p, "", &JobCredentials::new("AK", "SK")).unwrap_err();
        assert!(err.to_string().contains("role_arn or role_name"));
    }

    #[test]
    fn test_missing_secret_is_configuration_error() {
        let p = props(json!({"auth_mode": "static", "role_arn": "arn:aws:iam::123456789012:role/X"}));
        let err = AuthConfig::from_store(&p, "", &JobCredentials::default()).unwrap_err();
        assert!(matches!(err, OrchestratorError::Configuration(_)));
    }

    #[test]
    fn test_federated_requires_https() {
        let p = props(json!({
            "auth_mode": "federated",
            "OAuthUrl": "http://idp.example.com/token",
            "OAuthScope": "certs",
            "role_arn": "arn:aws:iam::123456789012:role/X",
        }));
        let err = AuthConfig::from_store(&p, "", &JobCredentials::new("id", "secret")).unwrap_err();
        assert!(err.to_string().contains("https"));
    }

    #[test]
    fn test_default_mode_has_no_role() {
        let config = AuthConfig::from_store(&StoreProperties::default(), "", &JobCredentials::default()).unwrap();
        assert_eq!(config.mode(), AuthMode::Default);
        assert!(config.role().is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let p = props(json!({"auth_mode": "static", "role_arn": "arn:aws:iam::123456789012:role/X"}));
        let config = AuthConfig::from_store(&p, "", &JobCredentials::new("AK1", "topsecret")).unwrap();

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("topsecret"));
        assert!(rendered.contains(REDACTED));

        let creds = format!("{:?}", JobCredentials::new("AK1", "topsecret"));
        assert!(!creds.contains("topsecret"));
    }

    #[test]
    fn test_parse_regions() {
        assert_eq!(
            parse_regions(" us-east-1, ,eu-west-1,us-east-1").unwrap(),
            vec!["us-east-1", "eu-west-1", "us-east-1"]
        );
        assert!(parse_regions(" , ").is_err());
        assert!(parse_regions("us-east-1,Mars").is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = OrchestratorConfig::new()
            .with_sts_region("eu-west-1")
            .with_endpoint("http://localhost:4566")
            .with_concurrency(0);

        assert_eq!(config.sts_region, "eu-west-1");
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:4566"));
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: std::collections::HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_from_vars() {
        let config = OrchestratorConfig::from_vars(vars(&[
            ("ACM_ORCHESTRATOR_TIMEOUT_SECS", " 12 "),
            ("ACM_ORCHESTRATOR_STS_REGION", "eu-west-1"),
            ("ACM_ORCHESTRATOR_CONCURRENCY", "0"),
        ]))
        .unwrap();

        assert_eq!(config.timeout, Duration::from_secs(12));
        assert_eq!(config.sts_region, "eu-west-1");
        assert_eq!(config.concurrency, 1);
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = OrchestratorConfig::from_vars(vars(&[("ACM_ORCHESTRATOR_TIMEOUT_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::Configuration(_)));

        assert!(OrchestratorConfig::from_vars(vars(&[("ACM_ORCHESTRATOR_TIMEOUT_SECS", "soon")])).is_err());
    }
}
