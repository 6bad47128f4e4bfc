//! Batch orchestrator
//!
//! Handles one step request end to end: authorize, pick the job's executor,
//! run the step against the job's artifact and turn the outcome into a
//! [`StepResponse`]. Nothing is kept in memory between requests; a job is
//! identified by its type and the client's token, and its progress lives in
//! the artifact directory.

use crate::adapters::store::Stores;
use crate::config::HelpdeskConfig;
use crate::core::export::artifact::{ArtifactStatus, ArtifactStore, Download};
use crate::core::export::batch::{BatchStepExecutor, RowSink, NO_DATA_FOUND};
use crate::core::export::columns::{CustomerColumns, Row, TicketColumns};
use crate::core::export::source::{CustomerSource, TicketSource, PAGE_SIZE};
use crate::core::import::{SettingsImporter, SETTINGS_IMPORTED};
use crate::core::state::{JobEvent, JobState};
use crate::domain::{ArtifactKey, BatchError, BatchJob, HelpdeskError, JobFilters, JobType};
use crate::security::TokenAuthority;
use crate::{log_error_with_context, log_job_complete, log_step_start};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// One step request as sent by the client
#[derive(Debug, Clone, Deserialize)]
pub struct StepRequest {
    /// Step to run, starting at 1
    #[serde(deserialize_with = "deserialize_step")]
    pub step: u32,

    /// Job type slug
    pub job_type: String,

    /// Type-specific filters
    #[serde(default)]
    pub filters: JobFilters,

    /// Anti-forgery token for the job's action
    #[serde(default)]
    pub token: String,

    /// Settings document, for the settings import only
    #[serde(default)]
    pub settings: Option<Value>,
}

impl StepRequest {
    /// Creates a request with no filters or settings
    pub fn new(job_type: JobType, step: u32, token: impl Into<String>) -> Self {
        Self {
            step,
            job_type: job_type.as_str().to_string(),
            filters: JobFilters::default(),
            token: token.into(),
            settings: None,
        }
    }
}

/// Steps arrive as numbers or numeric strings depending on the client
fn deserialize_step<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StepValue {
        Number(u32),
        Text(String),
    }

    match StepValue::deserialize(deserializer)? {
        StepValue::Number(step) => Ok(step),
        StepValue::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid step '{text}'"))),
    }
}

/// Response to one step request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResponse {
    /// More steps remain; `step` is the next one to request
    Progress {
        /// Next step
        step: u32,
        /// Estimated completion
        percentage: u8,
    },
    /// The job failed or found no data
    Error {
        /// Human-readable reason
        message: String,
    },
    /// A void job completed
    Success {
        /// Human-readable result
        message: String,
    },
    /// The export is finalized and can be downloaded once from `url`
    Done {
        /// Download URL
        url: String,
    },
}

impl StepResponse {
    /// Error response with `message`
    pub fn error(message: impl Into<String>) -> Self {
        StepResponse::Error {
            message: message.into(),
        }
    }

    /// Whether this is an error response
    pub fn is_error(&self) -> bool {
        matches!(self, StepResponse::Error { .. })
    }
}

impl Serialize for StepResponse {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            StepResponse::Progress { step, percentage } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("step", step)?;
                map.serialize_entry("percentage", percentage)?;
                map.end()
            }
            StepResponse::Error { message } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("error", &true)?;
                map.serialize_entry("message", message)?;
                map.end()
            }
            StepResponse::Success { message } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("message", message)?;
                map.end()
            }
            StepResponse::Done { url } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("step", "done")?;
                map.serialize_entry("percentage", &100u8)?;
                map.serialize_entry("url", url)?;
                map.end()
            }
        }
    }
}

/// Appends step rows to a job's partial artifact
struct ArtifactSink<'a> {
    artifacts: &'a ArtifactStore,
    key: &'a ArtifactKey,
}

#[async_trait]
impl<'a> RowSink for ArtifactSink<'a> {
    async fn append(&mut self, rows: &[Row]) -> Result<(), BatchError> {
        self.artifacts.append(self.key, rows).await
    }
}

/// Runs batch job steps
pub struct BatchOrchestrator {
    stores: Stores,
    artifacts: ArtifactStore,
    tokens: TokenAuthority,
    date_format: String,
    public_url: String,
}

impl BatchOrchestrator {
    /// Creates an orchestrator from its collaborators
    pub fn new(
        stores: Stores,
        artifacts: ArtifactStore,
        tokens: TokenAuthority,
        date_format: impl Into<String>,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            stores,
            artifacts,
            tokens,
            date_format: date_format.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates an orchestrator from configuration and already-built stores
    pub fn from_config(config: &HelpdeskConfig, stores: Stores) -> Self {
        Self::new(
            stores,
            ArtifactStore::new(&config.export.artifact_dir),
            TokenAuthority::from_config(&config.security),
            config.export.date_format.clone(),
            config.server.public_url.clone(),
        )
    }

    /// Token issuer and verifier
    pub fn tokens(&self) -> &TokenAuthority {
        &self.tokens
    }

    /// Artifact storage
    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    /// Executor registered for an export job type
    ///
    /// # Errors
    ///
    /// Returns `UnknownJobType` for job types that have no record source,
    /// such as the settings import.
    pub fn executor_for(&self, job_type: JobType) -> Result<BatchStepExecutor, BatchError> {
        let records = self.stores.records.clone();
        match job_type {
            JobType::CustomersExport => Ok(BatchStepExecutor::new(
                Arc::new(CustomerSource::new(records)),
                Arc::new(CustomerColumns::new(self.date_format.clone())),
            )),
            JobType::TicketsExport => Ok(BatchStepExecutor::new(
                Arc::new(TicketSource::new(records)),
                Arc::new(TicketColumns::new(self.date_format.clone())),
            )),
            JobType::SettingsImport => Err(BatchError::UnknownJobType(format!(
                "{job_type} has no export executor"
            ))),
        }
    }

    /// Public URL for a download handle
    pub fn download_url(&self, handle: &str) -> String {
        format!("{}/batch/download/{}", self.public_url, handle)
    }

    /// Handle one step request
    ///
    /// Never fails: every error is turned into an error response.
    pub async fn handle(&self, request: StepRequest) -> StepResponse {
        match self.run(&request).await {
            Ok(response) => response,
            Err(err) => {
                if err == BatchError::AuthorizationFailed {
                    tracing::warn!(
                        job_type = %request.job_type,
                        step = request.step,
                        "Step request rejected: authorization failed"
                    );
                } else {
                    let context = format!("{} step {}", request.job_type, request.step);
                    log_error_with_context!(err, context.as_str());
                }
                StepResponse::error(err.to_string())
            }
        }
    }

    async fn run(&self, request: &StepRequest) -> Result<StepResponse, BatchError> {
        let job_type: JobType = request.job_type.parse()?;
        self.tokens.verify(job_type.action(), &request.token)?;

        request.filters.validate_for(job_type)?;
        let job = BatchJob::new(job_type, request.step, request.filters.clone())?;

        log_step_start!(job_type, job.step);

        if job_type.is_void() {
            return self.run_import(&job, request.settings.as_ref()).await;
        }

        let key = ArtifactStore::key_for(job_type, &request.token);
        self.run_export(job, &key).await
    }

    async fn run_import(
        &self,
        job: &BatchJob,
        settings: Option<&Value>,
    ) -> Result<StepResponse, BatchError> {
        if !job.is_first_step() {
            return Err(BatchError::InvalidStep(format!(
                "{} runs in a single step",
                job.job_type
            )));
        }

        let importer = SettingsImporter::new(self.stores.settings.clone());
        importer.import(settings).await?;

        Ok(StepResponse::Success {
            message: SETTINGS_IMPORTED.to_string(),
        })
    }

    async fn run_export(
        &self,
        mut job: BatchJob,
        key: &ArtifactKey,
    ) -> Result<StepResponse, BatchError> {
        let executor = self.executor_for(job.job_type)?;
        let state = JobState::resume(job.step);

        match self.artifacts.status(job.job_type, key).await {
            ArtifactStatus::Finalized => {
                return Err(BatchError::JobClosed("export already finished".to_string()))
            }
            ArtifactStatus::Failed(reason) if !job.is_first_step() => {
                return Err(BatchError::JobClosed(format!("export failed: {reason}")))
            }
            ArtifactStatus::Missing if !job.is_first_step() => {
                return Err(BatchError::JobNotStarted)
            }
            _ => {}
        }

        job.is_writable = self.artifacts.is_writable().await;
        let state = state.on(JobEvent::Accepted)?;

        let outcome = async {
            if job.is_first_step() && job.is_writable {
                self.artifacts.begin(key, executor.columns()).await?;
            }
            let mut sink = ArtifactSink {
                artifacts: &self.artifacts,
                key,
            };
            executor.process_step(&mut job, &mut sink).await
        }
        .await;

        let result = match outcome {
            Ok(result) => result,
            Err(err) => {
                state.on(JobEvent::Fatal)?;
                if let Err(mark_err) = self.artifacts.mark_failed(key, &err.to_string()).await {
                    tracing::warn!(key = %key, error = %mark_err, "Could not record job failure");
                }
                return Err(err);
            }
        };

        if job.is_empty {
            state.on(JobEvent::NoData)?;
            self.artifacts.discard(key).await;
            tracing::info!(job_type = %job.job_type, "No records matched export parameters");
            let message = job
                .message
                .take()
                .unwrap_or_else(|| NO_DATA_FOUND.to_string());
            return Ok(StepResponse::error(message));
        }

        if !job.done {
            state.on(JobEvent::MoreRemaining)?;
            return Ok(StepResponse::Progress {
                step: job.step + 1,
                percentage: result.percentage,
            });
        }

        let state = state.on(JobEvent::Exhausted)?;
        self.artifacts.finalize(job.job_type, key).await?;
        let handle = self.tokens.download_handle(key)?;
        state.on(JobEvent::Finalized)?;

        let written = PAGE_SIZE * u64::from(job.step - 1) + result.rows.len() as u64;
        log_job_complete!(job.job_type, job.step, written);

        Ok(StepResponse::Done {
            url: self.download_url(&handle),
        })
    }

    /// Redeem a download handle
    ///
    /// The artifact is removed once read, so each handle works at most once.
    /// Returns `Ok(None)` when the handle is valid but the artifact is gone.
    ///
    /// # Errors
    ///
    /// Returns `AuthorizationFailed` for an invalid or expired handle and an
    /// I/O error if the artifact cannot be read.
    pub async fn take_download(&self, handle: &str) -> Result<Option<Download>, HelpdeskError> {
        let key = self.tokens.verify_download(handle)?;
        let download = self.artifacts.take(&key).await?;
        if download.is_some() {
            tracing::info!(key = %key, "Artifact downloaded");
        }
        Ok(download)
    }
}
