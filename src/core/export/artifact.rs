//! Export artifact storage
//!
//! Each export job owns up to three files in the artifact directory, all
//! named from its [`ArtifactKey`]:
//!
//! - `<key>.csv.partial` while steps are still appending rows
//! - `<job_type>-<key>.csv` once the job has been finalized
//! - `<key>.failed` after a fatal step error
//!
//! The key is derived from the job type and the client's token, so the same
//! token always addresses the same files and nothing has to be stored to
//! resume a job on the next request.

use crate::core::export::columns::{ColumnSpec, Row};
use crate::domain::{ArtifactKey, BatchError, JobType};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Where a job's artifact currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStatus {
    /// Nothing has been written for this key
    Missing,
    /// Partial artifact exists and accepts rows
    Open,
    /// The job failed; the reason is recorded in the marker
    Failed(String),
    /// The final artifact exists
    Finalized,
}

/// A finalized artifact taken out of the store for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// File name offered to the client
    pub file_name: String,
    /// CSV content
    pub content: Vec<u8>,
}

/// Directory-backed artifact store
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

fn not_writable(path: &Path, err: impl std::fmt::Display) -> BatchError {
    BatchError::DestinationNotWritable(format!("{}: {}", path.display(), err))
}

/// Encode CSV records into a buffer
fn encode<I, R>(records: I, path: &Path) -> Result<Vec<u8>, BatchError>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for record in records {
        writer
            .write_record(record)
            .map_err(|e| not_writable(path, e))?;
    }
    writer.into_inner().map_err(|e| not_writable(path, e))
}

async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

impl ArtifactStore {
    /// Creates a store rooted at `dir`; the directory is created lazily
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Key for a job: first 32 hex chars of `sha256("<job_type>|<token>")`
    pub fn key_for(job_type: JobType, token: &str) -> ArtifactKey {
        let mut hasher = Sha256::new();
        hasher.update(job_type.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(token.as_bytes());
        ArtifactKey::from_digest(&hasher.finalize())
    }

    fn partial_path(&self, key: &ArtifactKey) -> PathBuf {
        self.dir.join(format!("{key}.csv.partial"))
    }

    fn failed_path(&self, key: &ArtifactKey) -> PathBuf {
        self.dir.join(format!("{key}.failed"))
    }

    fn final_name(job_type: JobType, key: &ArtifactKey) -> String {
        format!("{}-{}.csv", job_type.as_str(), key)
    }

    fn final_path(&self, job_type: JobType, key: &ArtifactKey) -> PathBuf {
        self.dir.join(Self::final_name(job_type, key))
    }

    /// Whether artifacts can be written to the directory
    ///
    /// Creates the directory if needed and probes it with a throwaway file.
    pub async fn is_writable(&self) -> bool {
        if fs::create_dir_all(&self.dir).await.is_err() {
            return false;
        }
        let probe = self.dir.join(".write-probe");
        let writable = fs::File::create(&probe).await.is_ok();
        let _ = fs::remove_file(&probe).await;
        writable
    }

    /// Current status of a job's artifact
    pub async fn status(&self, job_type: JobType, key: &ArtifactKey) -> ArtifactStatus {
        if let Ok(reason) = fs::read_to_string(self.failed_path(key)).await {
            return ArtifactStatus::Failed(reason);
        }
        if exists(&self.final_path(job_type, key)).await {
            return ArtifactStatus::Finalized;
        }
        if exists(&self.partial_path(key)).await {
            return ArtifactStatus::Open;
        }
        ArtifactStatus::Missing
    }

    /// Start (or restart) a job: truncate the partial artifact and write the header
    ///
    /// Any failure marker left by an earlier attempt with the same key is cleared.
    ///
    /// # Errors
    ///
    /// Returns `DestinationNotWritable` if the file cannot be created.
    pub async fn begin(&self, key: &ArtifactKey, columns: &ColumnSpec) -> Result<(), BatchError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| not_writable(&self.dir, e))?;

        let failed = self.failed_path(key);
        match fs::remove_file(&failed).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(not_writable(&failed, e)),
        }

        let path = self.partial_path(key);
        let header = encode([columns.labels()], &path)?;
        fs::write(&path, header)
            .await
            .map_err(|e| not_writable(&path, e))?;

        tracing::debug!(key = %key, path = %path.display(), "Partial artifact created");
        Ok(())
    }

    /// Append rows to an open partial artifact
    ///
    /// # Errors
    ///
    /// Returns `JobNotStarted` if no partial artifact exists, or
    /// `DestinationNotWritable` if the rows cannot be written.
    pub async fn append(&self, key: &ArtifactKey, rows: &[Row]) -> Result<(), BatchError> {
        let path = self.partial_path(key);
        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => BatchError::JobNotStarted,
                _ => not_writable(&path, e),
            })?;

        let bytes = encode(rows.iter().map(|row| row.values()), &path)?;
        file.write_all(&bytes)
            .await
            .map_err(|e| not_writable(&path, e))?;
        file.flush().await.map_err(|e| not_writable(&path, e))?;
        Ok(())
    }

    /// Move the partial artifact to its final name
    ///
    /// # Errors
    ///
    /// Returns `JobNotStarted` if there is no partial artifact, or
    /// `DestinationNotWritable` if the rename fails.
    pub async fn finalize(
        &self,
        job_type: JobType,
        key: &ArtifactKey,
    ) -> Result<PathBuf, BatchError> {
        let partial = self.partial_path(key);
        if !exists(&partial).await {
            return Err(BatchError::JobNotStarted);
        }

        let final_path = self.final_path(job_type, key);
        fs::rename(&partial, &final_path)
            .await
            .map_err(|e| not_writable(&final_path, e))?;

        tracing::info!(key = %key, path = %final_path.display(), "Artifact finalized");
        Ok(final_path)
    }

    /// Record that a job failed; the partial artifact is kept
    ///
    /// # Errors
    ///
    /// Returns `DestinationNotWritable` if the marker cannot be written.
    pub async fn mark_failed(&self, key: &ArtifactKey, reason: &str) -> Result<(), BatchError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| not_writable(&self.dir, e))?;
        let path = self.failed_path(key);
        fs::write(&path, reason.as_bytes())
            .await
            .map_err(|e| not_writable(&path, e))
    }

    /// Remove a job's partial artifact, if any
    pub async fn discard(&self, key: &ArtifactKey) {
        let path = self.partial_path(key);
        if let Err(e) = fs::remove_file(&path).await {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "Could not remove partial artifact");
            }
        }
    }

    /// Read and delete a finalized artifact
    ///
    /// Returns `None` if no export job has a finalized artifact under `key`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the artifact exists but cannot be read or removed.
    pub async fn take(&self, key: &ArtifactKey) -> std::io::Result<Option<Download>> {
        for job_type in JobType::all().into_iter().filter(|jt| !jt.is_void()) {
            let path = self.final_path(job_type, key);
            match fs::read(&path).await {
                Ok(content) => {
                    fs::remove_file(&path).await?;
                    return Ok(Some(Download {
                        file_name: Self::final_name(job_type, key),
                        content,
                    }));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}
