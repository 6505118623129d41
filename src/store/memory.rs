use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BackupError;
use crate::firestore::reference::DocumentReference;

use super::DocumentStore;

/// A remote call made against a [`MemoryStore`], keyed by document path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get(String),
    Create(String),
    Set(String),
    Delete(String),
}

/// An in-memory [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: BTreeMap<String, Value>,
    calls: Vec<StoreCall>,
    fail_creates: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document without recording a call.
    pub fn with_document(mut self, path: impl Into<String>, body: Value) -> Self {
        self.documents.insert(path.into(), body);
        self
    }

    /// Makes every subsequent create fail, to observe what a failed write
    /// leaves behind.
    pub fn failing_creates(mut self) -> Self {
        self.fail_creates = true;
        self
    }

    pub fn document(&self, path: &str) -> Option<&Value> {
        self.documents.get(path)
    }

    pub fn calls(&self) -> &[StoreCall] {
        &self.calls
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_document(
        &mut self,
        doc_ref: &DocumentReference,
    ) -> Result<Option<Value>, BackupError> {
        let path = doc_ref.to_string();
        self.calls.push(StoreCall::Get(path.clone()));
        Ok(self.documents.get(&path).cloned())
    }

    async fn create_document(
        &mut self,
        doc_ref: &DocumentReference,
        body: &Value,
    ) -> Result<(), BackupError> {
        let path = doc_ref.to_string();
        self.calls.push(StoreCall::Create(path.clone()));

        if self.fail_creates {
            return Err(anyhow::anyhow!("create rejected for '{path}'").into());
        }
        if self.documents.contains_key(&path) {
            return Err(BackupError::DocumentAlreadyExists(path));
        }

        self.documents.insert(path, body.clone());
        Ok(())
    }

    async fn set_document(
        &mut self,
        doc_ref: &DocumentReference,
        body: &Value,
    ) -> Result<(), BackupError> {
        let path = doc_ref.to_string();
        self.calls.push(StoreCall::Set(path.clone()));
        self.documents.insert(path, body.clone());
        Ok(())
    }

    async fn delete_document(&mut self, doc_ref: &DocumentReference) -> Result<(), BackupError> {
        let path = doc_ref.to_string();
        self.calls.push(StoreCall::Delete(path.clone()));
        self.documents.remove(&path);
        Ok(())
    }
}
