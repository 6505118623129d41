//! Moving documents between Firestore and local JSON backups.
//!
//! - [`import_document`] snapshots a remote document into
//!   `backup/<collection>/<document>/<stamp>.json`.
//! - [`export_document`] restores such a snapshot into the remote document,
//!   asking for confirmation first when the target is production.
//!
//! Both take the store as an argument so that one client, created by the
//! caller, serves the whole process. [`export_with`] defers creating that
//! client until the production guard has passed.

mod confirm;
mod envelope;
mod export;
mod import;
mod layout;
mod stamp;

pub use confirm::{AssumeYes, Confirm, Prompt};
pub use envelope::Envelope;
pub use export::{export_document, export_with, ExportJob, ExportOutcome, WriteMode};
pub use import::{import_document, render};
pub use layout::{BackupLayout, DEFAULT_BACKUP_ROOT};
pub use stamp::BackupStamp;

use crate::error::BackupError;
use crate::firestore::reference::DocumentReference;

/// The document that holds an environment's data unless told otherwise.
pub const DEFAULT_DOCUMENT: &str = "1103";

/// The document `document` in the environment's top-level collection,
/// e.g. `dev/1103`. `document` may itself be a nested path such as
/// `1103/history/2022`.
pub fn document_in(environment: &str, document: &str) -> Result<DocumentReference, BackupError> {
    DocumentReference::try_from(format!("{environment}/{document}").as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::reference::collection;

    #[test]
    fn nested_documents_split_into_collections() {
        let doc_ref = document_in("dev", "decks/sub/x").unwrap();

        assert_eq!(doc_ref, collection("dev").doc("decks").collection("sub").doc("x"));
        assert_eq!(doc_ref.parent().to_string(), "dev/decks/sub");
        assert_eq!(doc_ref.id(), "x");
    }

    #[test]
    fn rejects_documents_that_would_leave_the_backup_root() {
        for (environment, document) in [
            ("dev", "/tmp/evil"),
            ("..", ".."),
            ("", "1103"),
            ("dev", ""),
            ("dev", "decks/sub"),
            ("dev", "../../etc"),
        ] {
            assert!(
                matches!(
                    document_in(environment, document),
                    Err(BackupError::InvalidPath(_))
                ),
                "expected '{environment}' / '{document}' to be rejected"
            );
        }
    }
}
