//! AWS Certificate Manager integration tests using LocalStack.
//!
//! These tests require LocalStack to be running on localhost:4566.
//!
//! Run with:
//!   docker run -d -p 4566:4566 localstack/localstack
//!   cargo test --test integration_aws --features aws -- --ignored
//!
//! Or run in CI where LocalStack is configured as a service.

#![cfg(feature = "aws")]

use acm_orchestrator::backends::aws::AcmConnector;
use acm_orchestrator::job::{InventoryJob, ManagementJob, ManagementOperation, StoreDetails};
use acm_orchestrator::management::ImportMaterial;
use acm_orchestrator::record::{REGION_FIELD, TAGS_FIELD};
use acm_orchestrator::store::{CertificateKind, StoreConnector};
use acm_orchestrator::{
    InventoryRecord, JobCredentials, JobStatus, Orchestrator, OrchestratorConfig, OrchestratorError,
};
use serde_json::json;
use std::collections::HashMap;

const CERTIFICATE: &str = include_str!("fixtures/orchestrator-test.crt");
const PRIVATE_KEY: &str = include_str!("fixtures/orchestrator-test.key");
const REGION: &str = "us-east-1";

fn endpoint() -> String {
    std::env::var("LOCALSTACK_ENDPOINT").unwrap_or_else(|_| "http://localhost:4566".to_string())
}

fn setup() -> Orchestrator {
    std::env::set_var("AWS_ACCESS_KEY_ID", "test");
    std::env::set_var("AWS_SECRET_ACCESS_KEY", "test");
    std::env::set_var("AWS_REGION", REGION);

    let config = OrchestratorConfig::new().with_endpoint(endpoint());
    Orchestrator::aws(config).expect("Failed to create orchestrator")
}

fn add_job(tags: &str) -> ManagementJob {
    ManagementJob {
        job_history_id: 1,
        operation: ManagementOperation::Add,
        store: StoreDetails {
            store_path: REGION.to_string(),
            ..Default::default()
        },
        credentials: JobCredentials::default(),
        alias: None,
        material: Some(ImportMaterial::new(CERTIFICATE, PRIVATE_KEY)),
        properties: HashMap::from([
            (REGION_FIELD.to_string(), json!(REGION)),
            (TAGS_FIELD.to_string(), json!(tags)),
        ]),
    }
}

async fn inventory(orchestrator: &Orchestrator, store_path: &str) -> (JobStatus, Vec<InventoryRecord>) {
    let job = InventoryJob {
        job_history_id: 2,
        store: StoreDetails {
            store_path: store_path.to_string(),
            ..Default::default()
        },
        credentials: JobCredentials::default(),
    };

    let mut submitted = Vec::new();
    let result = orchestrator
        .run_inventory(&job, &mut |records: Vec<InventoryRecord>| {
            submitted = records;
            true
        })
        .await;

    (result.status, submitted)
}

#[tokio::test]
#[ignore] // Run only when LocalStack is available
async fn test_acm_import_inventory_remove() {
    let orchestrator = setup();

    let result = orchestrator.run_management(&add_job("suite=integration")).await;
    assert_eq!(result.status, JobStatus::Success, "{}", result.message);

    let (status, records) = inventory(&orchestrator, REGION).await;
    assert_eq!(status, JobStatus::Success);

    let record = records
        .iter()
        .find(|r| r.metadata.get(TAGS_FIELD).map(String::as_str) == Some("suite=integration"))
        .expect("imported certificate missing from inventory");
    assert!(!record.certificate.contains("BEGIN CERTIFICATE"));
    assert_eq!(record.metadata[REGION_FIELD], REGION);

    let remove = ManagementJob {
        job_history_id: 3,
        operation: ManagementOperation::Remove,
        alias: Some(record.alias.clone()),
        material: None,
        properties: HashMap::new(),
        ..add_job("")
    };
    let result = orchestrator.run_management(&remove).await;
    assert_eq!(result.status, JobStatus::Success, "{}", result.message);
}

#[tokio::test]
#[ignore] // Run only when LocalStack is available
async fn test_acm_reimport_keeps_arn() {
    let orchestrator = setup();
    let connector = AcmConnector::new().with_endpoint(endpoint());
    let store = connector.connect(REGION, None).await.expect("Failed to connect");

    orchestrator.run_management(&add_job("suite=reimport")).await;
    let (_, records) = inventory(&orchestrator, REGION).await;
    let arn = records
        .iter()
        .find(|r| r.metadata[TAGS_FIELD] == "suite=reimport")
        .map(|r| r.alias.clone())
        .expect("imported certificate missing from inventory");

    assert_eq!(
        store.describe_certificate(&arn).await.expect("Failed to describe"),
        CertificateKind::Imported
    );

    let mut replace = add_job("");
    replace.alias = Some(arn.clone());
    let result = orchestrator.run_management(&replace).await;
    assert_eq!(result.status, JobStatus::Success, "{}", result.message);

    // Clean up
    store.delete_certificate(&arn).await.ok();
    let err = store.get_certificate(&arn).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::NotFound(_)));
}
