//! Export command implementation
//!
//! This module implements the `export` command, which drives one batch job
//! step by step in-process and writes the finished artifact to disk.

use crate::adapters::store::create_stores;
use crate::config::load_config;
use crate::core::export::{BatchOrchestrator, ExportOutcome, JobRunner};
use crate::domain::{JobFilters, JobType, TicketStatus};
use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Job to run (customers-export, tickets-export or settings-import)
    #[arg(short, long)]
    pub job_type: JobType,

    /// Where to write the CSV; defaults to the artifact's own file name
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// First creation day to include (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last creation day to include (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Ticket status filter
    #[arg(long)]
    pub status: Option<TicketStatus>,

    /// Ticket category filter
    #[arg(long)]
    pub category: Option<String>,

    /// JSON settings document for settings-import
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,
}

impl ExportArgs {
    fn filters(&self) -> JobFilters {
        JobFilters {
            start: self.start,
            end: self.end,
            status: self.status,
            category: self.category.clone(),
        }
    }

    fn read_settings(&self) -> anyhow::Result<Option<serde_json::Value>> {
        let Some(path) = &self.settings else {
            return Ok(None);
        };
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let value = serde_json::from_str(&contents)
            .with_context(|| format!("Settings file {} is not valid JSON", path.display()))?;
        Ok(Some(value))
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(job_type = %self.job_type, "Starting export command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if self.job_type == JobType::SettingsImport && self.settings.is_none() {
            eprintln!("settings-import requires --settings <FILE>");
            return Ok(2);
        }
        let settings = self.read_settings()?;

        let stores = match create_stores(&config) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create record store");
                eprintln!("Failed to initialize record store: {e}");
                return Ok(4);
            }
        };

        let orchestrator = BatchOrchestrator::from_config(&config, stores);
        let runner = JobRunner::new(&orchestrator, shutdown_signal);

        println!("Running {}...", self.job_type);
        let result = runner.run(self.job_type, self.filters(), settings).await?;
        let summary = &result.summary;
        summary.log_summary();

        if let Some(download) = &result.download {
            let path = self
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&download.file_name));
            tokio::fs::write(&path, &download.content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} rows to {}", summary.rows, path.display());
        }

        println!();
        println!("Summary:");
        println!("  Job: {}", summary.job_type);
        println!("  Steps: {}", summary.steps);
        println!("  Rows: {}", summary.rows);
        println!("  Progress: {}%", summary.percentage);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();

        let exit_code = match &summary.outcome {
            ExportOutcome::Completed => {
                println!("Export completed successfully");
                0
            }
            ExportOutcome::Imported => {
                println!("Settings successfully imported.");
                0
            }
            ExportOutcome::NoData => {
                println!("No data found for export parameters");
                0
            }
            ExportOutcome::Failed(message) => {
                eprintln!("Export failed: {message}");
                1
            }
            ExportOutcome::Interrupted => {
                println!("Export interrupted; rerun the command to start over");
                130
            }
        };

        Ok(exit_code)
    }
}
