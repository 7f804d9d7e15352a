//! Storage module for object management
//!
//! Provides the backend-neutral [`ObjectStore`] contract with an
//! S3-compatible implementation and an in-memory one.

mod memory_store;
mod object_store;
mod s3_store;

pub use memory_store::InMemoryObjectStore;
pub use object_store::{ListPage, ObjectStore, SignedUrl};
pub use s3_store::{resolve_credentials, S3ObjectStore};
