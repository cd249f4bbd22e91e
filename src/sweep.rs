//! Multi-region fault-isolated execution.
//!
//! A [`RegionSweeper`] runs one [`RegionOperation`] per region and merges
//! the results. A failing region is recorded and skipped; it never stops
//! the remaining regions, and the merged record list keeps region input
//! order regardless of concurrency.

use crate::credential::CloudCredential;
use crate::job::JobStatus;
use crate::record::InventoryRecord;
use crate::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{info, info_span, warn, Instrument};

/// A region to process, optionally with its own credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTarget {
    /// Region identifier
    pub region: String,
    /// Credentials for this region; falls back to the sweep-wide credential
    pub credential: Option<CloudCredential>,
}

impl RegionTarget {
    /// Targets `region` with the sweep-wide credential.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            credential: None,
        }
    }

    /// Overrides the credential for this region.
    pub fn with_credential(mut self, credential: CloudCredential) -> Self {
        self.credential = Some(credential);
        self
    }
}

/// A record that could not be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// Region the record belongs to
    pub region: String,
    /// Certificate alias
    pub alias: String,
    /// Failure description
    pub message: String,
}

/// A region that failed as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionFailure {
    /// Region identifier
    pub region: String,
    /// Failure description
    pub message: String,
}

/// What one region produced.
#[derive(Debug, Clone, Default)]
pub struct RegionYield {
    /// Records built in this region
    pub records: Vec<InventoryRecord>,
    /// Records skipped in this region
    pub record_failures: Vec<RecordFailure>,
}

/// Work performed once per region.
#[async_trait]
pub trait RegionOperation: Send + Sync {
    /// Processes `region`.
    ///
    /// An `Err` marks the whole region as failed; per-record problems
    /// belong in [`RegionYield::record_failures`].
    async fn run(&self, region: &str, credential: Option<&CloudCredential>) -> Result<RegionYield>;
}

/// Merged outcome of a sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Records from every successful region, in region input order
    pub records: Vec<InventoryRecord>,
    /// Regions that failed
    pub region_failures: Vec<RegionFailure>,
    /// Records that were skipped
    pub record_failures: Vec<RecordFailure>,
    /// Regions attempted
    pub regions_attempted: usize,
}

impl SweepReport {
    /// `Warning` when any region or record failed, otherwise `Success`.
    ///
    /// A sweep never fails outright, even when every region did.
    pub fn status(&self) -> JobStatus {
        if self.region_failures.is_empty() && self.record_failures.is_empty() {
            JobStatus::Success
        } else {
            JobStatus::Warning
        }
    }

    /// Human-readable summary of what went wrong, empty on full success.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if !self.region_failures.is_empty() {
            let regions: Vec<String> = self
                .region_failures
                .iter()
                .map(|f| format!("{} ({})", f.region, f.message))
                .collect();
            parts.push(format!(
                "{} of {} regions failed: {}",
                self.region_failures.len(),
                self.regions_attempted,
                regions.join("; ")
            ));
        }

        if !self.record_failures.is_empty() {
            parts.push(format!(
                "{} certificates could not be read",
                self.record_failures.len()
            ));
        }

        parts.join(". ")
    }
}

/// Runs an operation across regions.
///
/// # Example
///
/// ```no_run
/// use acm_orchestrator::sweep::{RegionSweeper, RegionTarget};
/// # async fn example(op: &dyn acm_orchestrator::sweep::RegionOperation) {
/// let targets = vec![RegionTarget::new("us-east-1"), RegionTarget::new("eu-west-1")];
/// let report = RegionSweeper::new(2).sweep(None, &targets, op).await;
/// println!("{} records, status {:?}", report.records.len(), report.status());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RegionSweeper {
    concurrency: usize,
}

impl Default for RegionSweeper {
    fn default() -> Self {
        Self::sequential()
    }
}

impl RegionSweeper {
    /// Creates a sweeper running up to `concurrency` regions at once.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Creates a sweeper that processes one region at a time.
    pub fn sequential() -> Self {
        Self { concurrency: 1 }
    }

    /// Runs `operation` for every target.
    ///
    /// Each region uses its own credential if it has one, otherwise
    /// `credential`.
    pub async fn sweep(
        &self,
        credential: Option<&CloudCredential>,
        targets: &[RegionTarget],
        operation: &dyn RegionOperation,
    ) -> SweepReport {
        let outcomes: Vec<(&str, Result<RegionYield>)> = stream::iter(targets.iter().map(|target| {
            let region = target.region.as_str();
            let credential = target.credential.as_ref().or(credential);
            async move {
                let outcome = operation
                    .run(region, credential)
                    .instrument(info_span!("region", region))
                    .await;
                (region, outcome)
            }
        }))
        .buffered(self.concurrency)
        .collect()
        .await;

        let mut report = SweepReport {
            regions_attempted: targets.len(),
            ..SweepReport::default()
        };

        for (region, outcome) in outcomes {
            match outcome {
                Ok(yielded) => {
                    info!(
                        region,
                        records = yielded.records.len(),
                        skipped = yielded.record_failures.len(),
                        "region complete"
                    );
                    report.records.extend(yielded.records);
                    report.record_failures.extend(yielded.record_failures);
                }
                Err(e) => {
                    warn!(region, error = %e, "region failed, continuing with remaining regions");
                    report.region_failures.push(RegionFailure {
                        region: region.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        report
    }
}
