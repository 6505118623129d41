//! # Firestore
//!
//! A small gRPC client for the parts of Firestore the backup tool needs:
//! reading, creating, overwriting and deleting single documents.
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use awalog_backup::{
//!     firestore::{client::{FirestoreClient, FirestoreClientOptions}, collection},
//!     ServiceAccount,
//! };
//!
//! let service_account = ServiceAccount::from_file("./serviceAccountKey.json")?;
//! let mut client =
//!     FirestoreClient::initialise(service_account, FirestoreClientOptions::default()).await?;
//!
//! let doc_ref = collection("dev").doc("1103");
//! let doc: Option<serde_json::Value> = client.get_document(&doc_ref).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod codec;
pub mod reference;
mod token_provider;

pub use reference::collection;
