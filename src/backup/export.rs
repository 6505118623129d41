use std::future::Future;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::BackupError;
use crate::firestore::reference::DocumentReference;
use crate::store::DocumentStore;

use super::confirm::Confirm;
use super::envelope::Envelope;
use super::layout::BackupLayout;
use super::stamp::BackupStamp;
use super::document_in;

/// How an exported backup replaces the remote document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Delete the document, then create it from the backup. If the create
    /// fails the document stays deleted.
    #[default]
    Replace,
    /// Overwrite the document with a single write.
    Atomic,
}

/// Restores the backup `<environment>/<document>/<stamp>.json` into the
/// remote document `<environment>/<document>`.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub environment: String,
    pub document: String,
    pub stamp: BackupStamp,
    pub envelope: Envelope,
    pub mode: WriteMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Exported {
        document: DocumentReference,
        source: PathBuf,
    },
    /// The operator declined to write into production. Nothing was read or
    /// written.
    Cancelled,
}

impl ExportJob {
    pub fn doc_ref(&self) -> Result<DocumentReference, BackupError> {
        document_in(&self.environment, &self.document)
    }
}

/// Runs `job` against `store`. Exporting into `production_env` asks `confirm`
/// first; nothing touches the store until the operator agrees.
pub async fn export_document<S, C>(
    store: &mut S,
    layout: &BackupLayout,
    production_env: &str,
    job: &ExportJob,
    confirm: &mut C,
) -> Result<ExportOutcome, BackupError>
where
    S: DocumentStore + ?Sized,
    C: Confirm + ?Sized,
{
    let doc_ref = job.doc_ref()?;
    if !confirmed(job, production_env, confirm)? {
        return Ok(ExportOutcome::Cancelled);
    }

    transfer(store, layout, job, doc_ref).await
}

/// Like [`export_document`], but the store is only created by `connect` once
/// the operator has agreed. A cancelled export never reads credentials or
/// opens a connection.
pub async fn export_with<S, C, F, Fut>(
    connect: F,
    layout: &BackupLayout,
    production_env: &str,
    job: &ExportJob,
    confirm: &mut C,
) -> Result<ExportOutcome, BackupError>
where
    S: DocumentStore,
    C: Confirm + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<S, BackupError>>,
{
    let doc_ref = job.doc_ref()?;
    if !confirmed(job, production_env, confirm)? {
        return Ok(ExportOutcome::Cancelled);
    }

    let mut store = connect().await?;
    transfer(&mut store, layout, job, doc_ref).await
}

fn confirmed<C>(job: &ExportJob, production_env: &str, confirm: &mut C) -> Result<bool, BackupError>
where
    C: Confirm + ?Sized,
{
    if job.environment != production_env {
        return Ok(true);
    }

    let message = format!(
        "are you sure you want to export into {}?",
        production_env.to_uppercase()
    );
    let confirmed = confirm
        .confirm(&message)
        .map_err(|e| anyhow::Error::new(e).context("Failed to read confirmation"))?;

    if !confirmed {
        tracing::warn!(environment = %job.environment, "Export cancelled by operator");
    }
    Ok(confirmed)
}

async fn transfer<S>(
    store: &mut S,
    layout: &BackupLayout,
    job: &ExportJob,
    doc_ref: DocumentReference,
) -> Result<ExportOutcome, BackupError>
where
    S: DocumentStore + ?Sized,
{
    let source = layout.file_for(&doc_ref, &job.stamp);
    tracing::debug!(document = %doc_ref, source = %source.display(), "Resolved export");

    let payload = read_backup(&source).await?;
    let body = job.envelope.body_from(&doc_ref, payload)?;

    match job.mode {
        WriteMode::Replace => {
            store.delete_document(&doc_ref).await?;
            store.create_document(&doc_ref, &body).await?;
        }
        WriteMode::Atomic => store.set_document(&doc_ref, &body).await?,
    }

    tracing::info!(document = %doc_ref, source = %source.display(), mode = ?job.mode, "Exported backup");

    Ok(ExportOutcome::Exported {
        document: doc_ref,
        source,
    })
}

async fn read_backup(path: &std::path::Path) -> Result<Value, BackupError> {
    let bytes = tokio::fs::read(path).await.map_err(BackupError::io(path))?;
    serde_json::from_slice(&bytes).map_err(BackupError::json(path))
}
