// helpdesk-export - Batch export and import for help-desk data
// Copyright (c) 2025 helpdesk-export Contributors
// Licensed under the MIT License

//! # helpdesk-export
//!
//! Client-driven batch jobs for a help-desk: CSV exports of customers and
//! tickets, and a one-step settings import.
//!
//! ## Overview
//!
//! A job is never held in memory between requests. The client asks for step
//! 1, receives `{step: 2, percentage}`, asks for step 2, and so on until the
//! service answers with a download link or an error. Each step:
//!
//! - **Fetches** one page of 30 records from the record store
//! - **Maps** each record to a row of display columns, with fallbacks for
//!   missing fields
//! - **Appends** the rows to the job's partial CSV artifact
//! - **Estimates** progress as `min(100, floor(30 * step / total * 100))`
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`server`] - HTTP endpoints for steps, tokens and downloads
//! - [`core`] - Batch step execution, orchestration, job state and import
//! - [`adapters`] - Record stores (PostgreSQL, JSON fixture, in-memory)
//! - [`security`] - Anti-forgery tokens and signed download handles
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use helpdesk_export::adapters::store::create_stores;
//! use helpdesk_export::config::load_config;
//! use helpdesk_export::core::export::{BatchOrchestrator, StepRequest, StepResponse};
//! use helpdesk_export::domain::JobType;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("helpdesk-export.toml")?;
//! let orchestrator = BatchOrchestrator::from_config(&config, create_stores(&config)?);
//!
//! let token = orchestrator.tokens().issue("batch-export")?;
//! let mut step = 1;
//! loop {
//!     match orchestrator
//!         .handle(StepRequest::new(JobType::TicketsExport, step, token.clone()))
//!         .await
//!     {
//!         StepResponse::Progress { step: next, percentage } => {
//!             println!("{percentage}%");
//!             step = next;
//!         }
//!         StepResponse::Done { url } => {
//!             println!("download from {url}");
//!             break;
//!         }
//!         other => {
//!             println!("{other:?}");
//!             break;
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Infrastructure failures use [`domain::HelpdeskError`]; failures of a
//! single step use [`domain::BatchError`] and reach the client as
//! `{"error": true, "message": ...}`.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod security;
pub mod server;
