//! Integration tests for running whole jobs in-process
//!
//! These tests wire everything from a configuration file, as the `export`
//! command does: the JSON fixture store, the artifact directory and the
//! token secret all come from TOML.

use chrono::{Duration, TimeZone, Utc};
use helpdesk_export::adapters::store::{create_stores, StoreSnapshot};
use helpdesk_export::config::{load_config, HelpdeskConfig};
use helpdesk_export::core::export::{BatchOrchestrator, ExportOutcome, JobRunner};
use helpdesk_export::domain::{JobFilters, JobType, Ticket, TicketId, TicketStatus};
use serde_json::json;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};
use tokio::sync::watch;

fn fixture(dir: &TempDir, tickets: u64) -> std::path::PathBuf {
    let base = Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap();
    let snapshot = StoreSnapshot {
        customers: Vec::new(),
        tickets: (1..=tickets)
            .map(|id| {
                Ticket::builder()
                    .id(TicketId::new(id).unwrap())
                    .title(format!("Refund request #{id}"))
                    .status(if id % 2 == 0 {
                        TicketStatus::Closed
                    } else {
                        TicketStatus::Open
                    })
                    .date_created(base + Duration::days(id as i64))
                    .build()
                    .unwrap()
            })
            .collect(),
    };
    let path = dir.path().join("helpdesk.json");
    std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();
    path
}

fn config(dir: &TempDir, fixture: &std::path::Path) -> HelpdeskConfig {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[export]
artifact_dir = "{}"
date_format = "%Y-%m-%d"

[store]
backend = "json"
json_path = "{}"

[security]
token_secret = "runner-test-secret-0123456789abcdef"

[logging]
local_enabled = false
"#,
        dir.path().join("exports").display(),
        fixture.display()
    )
    .unwrap();
    load_config(file.path()).unwrap()
}

#[tokio::test]
async fn test_runs_ticket_export_to_completion() {
    let dir = TempDir::new().unwrap();
    let fixture = fixture(&dir, 70);
    let config = config(&dir, &fixture);
    let orchestrator = BatchOrchestrator::from_config(&config, create_stores(&config).unwrap());
    let (_tx, rx) = watch::channel(false);

    let result = JobRunner::new(&orchestrator, rx)
        .run(JobType::TicketsExport, JobFilters::default(), None)
        .await
        .unwrap();

    assert_eq!(result.summary.outcome, ExportOutcome::Completed);
    assert_eq!(result.summary.steps, 3);
    assert_eq!(result.summary.rows, 70);
    assert_eq!(result.summary.percentage, 100);
    assert!(result.summary.is_successful());
    assert!(result.download.is_some());
}

#[tokio::test]
async fn test_filtered_export_counts_only_matches() {
    let dir = TempDir::new().unwrap();
    let fixture = fixture(&dir, 70);
    let config = config(&dir, &fixture);
    let orchestrator = BatchOrchestrator::from_config(&config, create_stores(&config).unwrap());
    let (_tx, rx) = watch::channel(false);

    let filters = JobFilters {
        status: Some(TicketStatus::Closed),
        ..JobFilters::default()
    };
    let result = JobRunner::new(&orchestrator, rx)
        .run(JobType::TicketsExport, filters, None)
        .await
        .unwrap();

    assert_eq!(result.summary.outcome, ExportOutcome::Completed);
    assert_eq!(result.summary.rows, 35);
    assert_eq!(result.summary.steps, 2);
}

#[tokio::test]
async fn test_no_customers_is_no_data() {
    let dir = TempDir::new().unwrap();
    let fixture = fixture(&dir, 5);
    let config = config(&dir, &fixture);
    let orchestrator = BatchOrchestrator::from_config(&config, create_stores(&config).unwrap());
    let (_tx, rx) = watch::channel(false);

    let result = JobRunner::new(&orchestrator, rx)
        .run(JobType::CustomersExport, JobFilters::default(), None)
        .await
        .unwrap();

    assert_eq!(result.summary.outcome, ExportOutcome::NoData);
    assert!(result.download.is_none());
}

#[tokio::test]
async fn test_shutdown_stops_before_first_step() {
    let dir = TempDir::new().unwrap();
    let fixture = fixture(&dir, 5);
    let config = config(&dir, &fixture);
    let orchestrator = BatchOrchestrator::from_config(&config, create_stores(&config).unwrap());
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let result = JobRunner::new(&orchestrator, rx)
        .run(JobType::TicketsExport, JobFilters::default(), None)
        .await
        .unwrap();

    assert_eq!(result.summary.outcome, ExportOutcome::Interrupted);
    assert!(!result.summary.is_successful());
}

#[tokio::test]
async fn test_settings_import_writes_sibling_file() {
    let dir = TempDir::new().unwrap();
    let fixture = fixture(&dir, 0);
    let config = config(&dir, &fixture);
    let orchestrator = BatchOrchestrator::from_config(&config, create_stores(&config).unwrap());
    let (_tx, rx) = watch::channel(false);

    let settings = json!({ "allow_guest_tickets": false, "tickets_per_page": 20 });
    let result = JobRunner::new(&orchestrator, rx)
        .run(JobType::SettingsImport, JobFilters::default(), Some(settings))
        .await
        .unwrap();
    assert_eq!(result.summary.outcome, ExportOutcome::Imported);

    let written = std::fs::read_to_string(dir.path().join("helpdesk.settings.json")).unwrap();
    let written: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(written["tickets_per_page"], 20);
    assert_eq!(written["allow_guest_tickets"], false);
}

#[tokio::test]
async fn test_settings_import_rejects_non_object() {
    let dir = TempDir::new().unwrap();
    let fixture = fixture(&dir, 0);
    let config = config(&dir, &fixture);
    let orchestrator = BatchOrchestrator::from_config(&config, create_stores(&config).unwrap());
    let (_tx, rx) = watch::channel(false);

    let result = JobRunner::new(&orchestrator, rx)
        .run(
            JobType::SettingsImport,
            JobFilters::default(),
            Some(json!(["not", "an", "object"])),
        )
        .await
        .unwrap();

    match result.summary.outcome {
        ExportOutcome::Failed(message) => assert!(message.contains("Invalid settings")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(!dir.path().join("helpdesk.settings.json").exists());
}
