//! Per-region certificate inventory.

use crate::credential::CloudCredential;
use crate::record::InventoryRecord;
use crate::store::{CertificateStore, CertificateSummary, StoreConnector};
use crate::sweep::{RecordFailure, RegionOperation, RegionYield};
use crate::{OrchestratorError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Lists every certificate in a region and builds inventory records.
///
/// Pagination is drained before the region completes. A certificate that
/// cannot be read is skipped and reported; a listing failure fails the
/// region and discards its partial results.
pub struct InventoryCollector {
    connector: Arc<dyn StoreConnector>,
}

impl InventoryCollector {
    /// Creates a collector over `connector`.
    pub fn new(connector: Arc<dyn StoreConnector>) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl RegionOperation for InventoryCollector {
    async fn run(&self, region: &str, credential: Option<&CloudCredential>) -> Result<RegionYield> {
        let store = self
            .connector
            .connect(region, credential)
            .await
            .map_err(|e| OrchestratorError::region_op(region, "connect", e))?;

        let mut yielded = RegionYield::default();
        let mut next_token: Option<String> = None;
        let mut page = 0usize;

        loop {
            page += 1;
            let listing = store
                .list_certificates(next_token.as_deref())
                .await
                .map_err(|e| OrchestratorError::region_op(region, "list", e))?;
            debug!(page, certificates = listing.summaries.len(), "listed certificates");

            for summary in &listing.summaries {
                match build_record(store.as_ref(), summary).await {
                    Ok(record) => yielded.records.push(record),
                    Err(e) => {
                        warn!(alias = %summary.arn, error = %e, "skipping certificate");
                        yielded.record_failures.push(RecordFailure {
                            region: region.to_string(),
                            alias: summary.arn.clone(),
                            message: e.to_string(),
                        });
                    }
                }
            }

            match listing.next_token {
                Some(token) if next_token.as_deref() == Some(token.as_str()) => {
                    return Err(OrchestratorError::region_op(
                        region,
                        "list",
                        OrchestratorError::Store("pagination token did not advance".to_string()),
                    ));
                }
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Ok(yielded)
    }
}

async fn build_record(store: &dyn CertificateStore, summary: &CertificateSummary) -> Result<InventoryRecord> {
    let arn = summary.arn.as_str();
    trace!(alias = arn, "retrieving certificate");

    let pem = store
        .get_certificate(arn)
        .await
        .map_err(|e| OrchestratorError::record(arn, e))?
        .filter(|body| !body.trim().is_empty())
        .ok_or_else(|| {
            OrchestratorError::record(
                arn,
                OrchestratorError::Store("certificate has no body".to_string()),
            )
        })?;

    let tags = store
        .list_tags(arn)
        .await
        .map_err(|e| OrchestratorError::record(arn, e))?;

    Ok(InventoryRecord::new(arn, &pem, store.region(), &tags))
}
