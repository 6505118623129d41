use std::path::{Path, PathBuf};

use crate::error::BackupError;
use crate::firestore::reference::DocumentReference;

use super::stamp::BackupStamp;

pub const DEFAULT_BACKUP_ROOT: &str = "backup";

/// Where backup files live on disk: one directory per document, mirroring
/// the document path, holding one `<stamp>.json` per capture.
///
/// ```text
/// backup/
/// └── dev/
///     └── decks/
///         ├── 202211190947.json
///         └── 202212011230.json
/// ```
#[derive(Debug, Clone)]
pub struct BackupLayout {
    root: PathBuf,
}

impl Default for BackupLayout {
    fn default() -> Self {
        Self::new(DEFAULT_BACKUP_ROOT)
    }
}

impl BackupLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir_for(&self, doc_ref: &DocumentReference) -> PathBuf {
        doc_ref
            .segments()
            .into_iter()
            .fold(self.root.clone(), |dir, segment| dir.join(segment))
    }

    pub fn file_for(&self, doc_ref: &DocumentReference, stamp: &BackupStamp) -> PathBuf {
        self.dir_for(doc_ref).join(stamp.file_name())
    }

    /// The stamps of all backups of `doc_ref`, newest first. Files whose
    /// name isn't a stamp are ignored, and a document that was never backed
    /// up has no backups rather than an error.
    pub async fn list(
        &self,
        doc_ref: &DocumentReference,
    ) -> Result<Vec<BackupStamp>, BackupError> {
        let dir = self.dir_for(doc_ref);

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(BackupError::io(&dir)(e)),
        };

        let mut stamps = vec![];
        while let Some(entry) = entries.next_entry().await.map_err(BackupError::io(&dir))? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stamp) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<BackupStamp>().ok())
            {
                stamps.push(stamp);
            }
        }

        stamps.sort_unstable_by(|a, b| b.cmp(a));
        Ok(stamps)
    }
}
