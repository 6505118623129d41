//! # awalog-backup
//!
//! Backs up awalog's Firestore documents to local JSON files and restores
//! them again.
//!
//! - [`backup`]: the import (remote → file) and export (file → remote)
//!   operations, and the on-disk layout of backups.
//! - [`store`]: the [`DocumentStore`](store::DocumentStore) trait those
//!   operations run against.
//! - [`firestore`]: the Firestore client implementing it.

pub mod backup;
pub mod config;
pub mod error;
pub mod firestore;
mod service_account;
pub mod store;

pub use service_account::ServiceAccount;
