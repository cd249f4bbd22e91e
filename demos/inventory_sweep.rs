//! Multi-region inventory against the in-memory backends.
//!
//! One region rejects its credentials; the sweep still reports the others.
//!
//! Run with: RUST_LOG=acm_orchestrator=debug cargo run --example inventory_sweep

use acm_orchestrator::backends::mock::{
    MockCertificate, MockConnector, MockRoleAssumer, MockTokenExchange,
};
use acm_orchestrator::job::{InventoryJob, StoreDetails};
use acm_orchestrator::{InventoryRecord, JobCredentials, Orchestrator, OrchestratorConfig};
use std::sync::Arc;

const PEM: &str = "-----BEGIN CERTIFICATE-----\nMIIBkTCB+wIJAKHBfpEgcMFvMA0GCSqGSIb3DQEBCwUAMBQx\n-----END CERTIFICATE-----\n";

#[tokio::main]
async fn main() -> acm_orchestrator::Result<()> {
    acm_orchestrator::logging::try_init()?;

    let mut connector = MockConnector::new();
    connector.fail_connect("ap-south-1", "UnrecognizedClientException: The security token included in the request is invalid");

    for (region, count) in [("us-east-1", 3), ("eu-west-1", 2)] {
        for i in 0..count {
            connector
                .put_certificate(
                    region,
                    format!("arn:aws:acm:{}:123456789012:certificate/demo-{}", region, i),
                    MockCertificate::imported(PEM).with_tag("env", "demo"),
                )
                .await;
        }
    }

    let orchestrator = Orchestrator::new(
        OrchestratorConfig::from_env()?.with_concurrency(3),
        Arc::new(connector),
        Arc::new(MockRoleAssumer::new()),
        Arc::new(MockTokenExchange::new()),
    );

    let job = InventoryJob {
        job_history_id: 1,
        store: StoreDetails {
            client_machine: "123456789012".to_string(),
            store_path: "us-east-1, eu-west-1, ap-south-1".to_string(),
            properties: r#"{"auth_mode":"static","role_name":"CertReader"}"#.to_string(),
        },
        credentials: JobCredentials::new("AKIADEMO", "demo-secret"),
    };

    let result = orchestrator
        .run_inventory(&job, &mut |records: Vec<InventoryRecord>| {
            println!("Received {} certificates:", records.len());
            for record in &records {
                println!("  {} [{}]", record.alias, record.region);
            }
            true
        })
        .await;

    println!("\nStatus: {}", result.status);
    if !result.message.is_empty() {
        println!("Message: {}", result.message);
    }

    Ok(())
}
