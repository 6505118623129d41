//! The operations the backup commands need from a document database.
//!
//! [`FirestoreClient`] is the real implementation. [`MemoryStore`] keeps
//! documents in a map and records every call made against it.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BackupError;
use crate::firestore::client::FirestoreClient;
use crate::firestore::reference::DocumentReference;

mod memory;

pub use memory::{MemoryStore, StoreCall};

#[async_trait]
pub trait DocumentStore: Send {
    /// The document body at `doc_ref`, or `None` if there is no document.
    async fn get_document(
        &mut self,
        doc_ref: &DocumentReference,
    ) -> Result<Option<Value>, BackupError>;

    /// Creates a document, failing if one already exists at `doc_ref`.
    async fn create_document(
        &mut self,
        doc_ref: &DocumentReference,
        body: &Value,
    ) -> Result<(), BackupError>;

    /// Creates or overwrites the document in a single write.
    async fn set_document(
        &mut self,
        doc_ref: &DocumentReference,
        body: &Value,
    ) -> Result<(), BackupError>;

    /// Deletes the document. Missing documents are not an error.
    async fn delete_document(&mut self, doc_ref: &DocumentReference) -> Result<(), BackupError>;
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn get_document(
        &mut self,
        doc_ref: &DocumentReference,
    ) -> Result<Option<Value>, BackupError> {
        FirestoreClient::get_document(self, doc_ref).await
    }

    async fn create_document(
        &mut self,
        doc_ref: &DocumentReference,
        body: &Value,
    ) -> Result<(), BackupError> {
        self.create_document_at_ref(doc_ref, body).await
    }

    async fn set_document(
        &mut self,
        doc_ref: &DocumentReference,
        body: &Value,
    ) -> Result<(), BackupError> {
        FirestoreClient::set_document(self, doc_ref, body).await
    }

    async fn delete_document(&mut self, doc_ref: &DocumentReference) -> Result<(), BackupError> {
        FirestoreClient::delete_document(self, doc_ref).await
    }
}
