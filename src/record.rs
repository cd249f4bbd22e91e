//! Inventory record data structures.

use crate::pem::strip_anchors;
use crate::store::{format_tags, Tag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata key holding the certificate's region.
pub const REGION_FIELD: &str = "AWS Region";

/// Metadata key holding the certificate's tags as `k1=v1,k2=v2`.
pub const TAGS_FIELD: &str = "ACM Tags";

/// One certificate as reported to the host platform.
///
/// `alias` is the certificate ARN. `certificate` is the bare base64 body
/// with anchors stripped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryRecord {
    /// Certificate ARN
    pub alias: String,

    /// Base64 certificate body without PEM anchors
    pub certificate: String,

    /// Region the certificate was found in
    pub region: String,

    /// Per-record metadata ([`REGION_FIELD`], [`TAGS_FIELD`])
    pub metadata: BTreeMap<String, String>,

    /// Whether the store holds a private key for this certificate
    pub private_key_entry: bool,
}

impl InventoryRecord {
    /// Builds a record from a PEM body, its region and its tags.
    ///
    /// # Example
    ///
    /// ```
    /// use acm_orchestrator::record::{InventoryRecord, TAGS_FIELD};
    /// use acm_orchestrator::store::Tag;
    ///
    /// let record = InventoryRecord::new(
    ///     "arn:aws:acm:us-east-1:123456789012:certificate/abc",
    ///     "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n",
    ///     "us-east-1",
    ///     &[Tag::new("env", "prod")],
    /// );
    ///
    /// assert_eq!(record.certificate, "MIIB");
    /// assert_eq!(record.metadata[TAGS_FIELD], "env=prod");
    /// ```
    pub fn new(
        alias: impl Into<String>,
        pem: &str,
        region: impl Into<String>,
        tags: &[Tag],
    ) -> Self {
        let region = region.into();

        let mut metadata = BTreeMap::new();
        metadata.insert(REGION_FIELD.to_string(), region.clone());
        metadata.insert(TAGS_FIELD.to_string(), format_tags(tags));

        Self {
            alias: alias.into(),
            certificate: strip_anchors(pem),
            region,
            metadata,
            private_key_entry: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record() {
        let record = InventoryRecord::new(
            "arn:aws:acm:eu-west-1:123456789012:certificate/1",
            "-----BEGIN CERTIFICATE-----\r\nMIIB\r\n-----END CERTIFICATE-----\r\n",
            "eu-west-1",
            &[],
        );

        assert_eq!(record.certificate, "MIIB");
        assert_eq!(record.metadata.get(REGION_FIELD).map(String::as_str), Some("eu-west-1"));
        assert_eq!(record.metadata.get(TAGS_FIELD).map(String::as_str), Some(""));
        assert!(record.private_key_entry);
    }

    #[test]
    fn test_record_serialization() {
        let record = InventoryRecord::new("arn:1", "MIIB", "us-east-1", &[Tag::new("a", "b")]);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["alias"], "arn:1");
        assert_eq!(json["metadata"]["ACM Tags"], "a=b");

        let back: InventoryRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
