use std::path::PathBuf;

use firestore_grpc::tonic;

#[derive(thiserror::Error)]
pub enum BackupError {
    #[error("{0}")]
    DocumentAlreadyExists(String),

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("invalid document path '{0}'")]
    InvalidPath(String),

    #[error("invalid backup stamp '{0}', expected YYYYMMDDHHmm")]
    InvalidStamp(String),

    #[error("document body must be a JSON object, got {0}")]
    InvalidDocument(String),

    #[error("document '{document}' has no '{field}' field")]
    MissingEnvelopeField {
        document: String,
        field: &'static str,
    },

    #[error(
        "serde: {source}{}",
        document.as_ref().map(|d| format!(" in document '{d}'")).unwrap_or_default())
    ]
    FirestoreSerdeError {
        source: crate::firestore::codec::Error,
        document: Option<String>,
    },

    #[error("grpc: {0}")]
    GrpcError(#[from] tonic::transport::Error),

    #[error("failed to access '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON in '{}'", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BackupError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| BackupError::Io { path, source }
    }

    pub(crate) fn json(path: impl Into<PathBuf>) -> impl FnOnce(serde_json::Error) -> Self {
        let path = path.into();
        move |source| BackupError::Json { path, source }
    }
}

impl From<crate::firestore::codec::Error> for BackupError {
    fn from(e: crate::firestore::codec::Error) -> Self {
        BackupError::FirestoreSerdeError {
            source: e,
            document: None,
        }
    }
}

impl std::fmt::Debug for BackupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

// Taken from https://www.lpalmieri.com/posts/error-handling-rust/#internal-errors
fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
