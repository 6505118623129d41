use std::fmt::Display;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use firestore_grpc::tonic;
use firestore_grpc::v1::firestore_client::FirestoreClient as GrpcFirestoreClient;
use firestore_grpc::v1::{
    CreateDocumentRequest, DeleteDocumentRequest, DocumentMask, GetDocumentRequest,
    UpdateDocumentRequest,
};
use firestore_grpc::tonic::{
    codegen::InterceptedService, metadata::MetadataValue, transport::Channel, Request, Status,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::BackupError;
use crate::ServiceAccount;

use super::codec::{deserialize_document_fields, serialize_to_document};
use super::reference::{CollectionReference, DocumentReference};
use super::token_provider::FirestoreTokenProvider;

mod options;

pub use options::{FirestoreClientOptions, DEFAULT_HOST_URL};

type InterceptorFunction = Box<dyn FnMut(Request<()>) -> Result<Request<()>, Status> + Send>;

/// A gRPC client for a single Firestore project's default database.
pub struct FirestoreClient {
    client: GrpcFirestoreClient<InterceptedService<Channel, InterceptorFunction>>,
    root_resource_path: String,
}

fn create_auth_interceptor(mut token_provider: FirestoreTokenProvider) -> InterceptorFunction {
    Box::new(move |mut req: Request<()>| {
        let token = token_provider
            .get_token()
            .map_err(|_| Status::unauthenticated("Could not get token from token provider"))?;

        let bearer_token = format!("Bearer {token}");
        let mut header_value = MetadataValue::from_str(&bearer_token).map_err(|_| {
            Status::unauthenticated("Failed to construct metadata value for authorization token")
        })?;
        header_value.set_sensitive(true);

        req.metadata_mut().insert("authorization", header_value);

        Ok(req)
    })
}

impl FirestoreClient {
    /// Connects to Firestore with the given service account. The connection
    /// and its credentials live as long as the client.
    pub async fn initialise(
        service_account: ServiceAccount,
        options: FirestoreClientOptions,
    ) -> Result<Self, BackupError> {
        tracing::debug!(host_url = %options.host_url, "Connecting to Firestore");

        let channel = Channel::from_shared(options.host_url.clone())
            .context("Failed to create gRPC channel")?
            .connect()
            .await?;

        let root_resource_path = root_resource_path(&service_account.project_id);
        let token_provider = FirestoreTokenProvider::new(service_account);
        let client =
            GrpcFirestoreClient::with_interceptor(channel, create_auth_interceptor(token_provider));

        Ok(Self {
            client,
            root_resource_path,
        })
    }

    /// Retrieves the document at `doc_ref`, or `None` if there is none.
    pub async fn get_document<T: DeserializeOwned>(
        &mut self,
        doc_ref: &DocumentReference,
    ) -> Result<Option<T>, BackupError> {
        let request = GetDocumentRequest {
            name: self.get_name_with(doc_ref),
            mask: None,
            consistency_selector: None,
        };

        match self.client.get_document(request).await {
            Ok(res) => {
                let doc = res.into_inner();
                let deserialized = deserialize_document_fields::<T>(doc.fields)
                    .map_err(|e| serde_err_with_doc(e, doc_ref))?;
                Ok(Some(deserialized))
            }
            Err(err) if err.code() == tonic::Code::NotFound => Ok(None),
            Err(err) => Err(anyhow!(err).into()),
        }
    }

    /// Creates a document at `doc_ref`, failing with
    /// [`DocumentAlreadyExists`](BackupError::DocumentAlreadyExists) if
    /// there already is one.
    pub async fn create_document_at_ref<T: Serialize + ?Sized>(
        &mut self,
        doc_ref: &DocumentReference,
        document: &T,
    ) -> Result<(), BackupError> {
        // Name and timestamps must be left empty on create.
        let doc = serialize_to_document(document, String::new())
            .map_err(|e| serde_err_with_doc(e, doc_ref))?;

        let (parent, collection_id) = self.split_collection_parent_and_name(&doc_ref.parent());
        let request = CreateDocumentRequest {
            parent,
            collection_id,
            document_id: doc_ref.id().to_string(),
            document: Some(doc),
            mask: Some(DocumentMask {
                field_paths: vec![],
            }),
        };

        match self.client.create_document(request).await {
            Ok(_) => Ok(()),
            Err(err) if err.code() == tonic::Code::AlreadyExists => Err(
                BackupError::DocumentAlreadyExists(err.message().to_string()),
            ),
            Err(err) => Err(anyhow!(err).into()),
        }
    }

    /// Creates or overwrites the document at `doc_ref` in a single write.
    pub async fn set_document<T: Serialize + ?Sized>(
        &mut self,
        doc_ref: &DocumentReference,
        document: &T,
    ) -> Result<(), BackupError> {
        let name = self.get_name_with(doc_ref);
        let doc = serialize_to_document(document, name)
            .map_err(|e| serde_err_with_doc(e, doc_ref))?;

        let request = UpdateDocumentRequest {
            document: Some(doc),
            update_mask: None,
            mask: Some(DocumentMask {
                field_paths: vec![],
            }),
            current_document: None,
        };

        self.client
            .update_document(request)
            .await
            .map_err(|err| anyhow!(err))?;

        Ok(())
    }

    /// Deletes the document at `doc_ref`. Deleting a document that doesn't
    /// exist is not an error.
    pub async fn delete_document(
        &mut self,
        doc_ref: &DocumentReference,
    ) -> Result<(), BackupError> {
        let request = DeleteDocumentRequest {
            name: self.get_name_with(doc_ref),
            current_document: None,
        };

        self.client
            .delete_document(request)
            .await
            .context("Failed to delete document")?;

        Ok(())
    }

    fn get_name_with(&self, item: impl Display) -> String {
        format!("{}/{}", self.root_resource_path, item)
    }

    fn split_collection_parent_and_name(
        &self,
        collection: &CollectionReference,
    ) -> (String, String) {
        let parent = collection
            .parent()
            .map(|p| self.get_name_with(p))
            .unwrap_or_else(|| self.root_resource_path.clone());
        let name = collection.name().to_string();

        (parent, name)
    }
}

fn root_resource_path(project_id: &str) -> String {
    format!("projects/{project_id}/databases/(default)/documents")
}

fn serde_err_with_doc(err: super::codec::Error, doc_ref: &DocumentReference) -> BackupError {
    BackupError::FirestoreSerdeError {
        source: err,
        document: Some(doc_ref.to_string()),
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn implements_send() {
        fn assert_send<T: Send>() {}
        assert_send::<super::FirestoreClient>();
    }

    #[test]
    fn interceptor_attaches_a_sensitive_bearer_token() {
        let service_account = crate::ServiceAccount {
            project_id: "awa-log-test".to_string(),
            private_key: include_str!("../../../tests/fixtures/test-key.pem").to_string(),
            private_key_id: "test-key-id".to_string(),
            client_email: "backup@awa-log-test.iam.gserviceaccount.com".to_string(),
            client_id: "42".to_string(),
        };
        let mut intercept = super::create_auth_interceptor(
            super::FirestoreTokenProvider::new(service_account),
        );

        let req = intercept(super::Request::new(())).unwrap();

        let header = req.metadata().get("authorization").unwrap();
        assert!(header.is_sensitive());
        assert!(header.to_str().unwrap().starts_with("Bearer ey"));
    }

    #[test]
    fn resource_path_uses_default_database() {
        assert_eq!(
            super::root_resource_path("awa-log"),
            "projects/awa-log/databases/(default)/documents"
        );
    }
}
