//! Backend-neutral object storage contract
//!
//! Every backend (S3-compatible remote storage, in-memory) implements
//! [`ObjectStore`]. Callers hold it as `Arc<dyn ObjectStore>` so a single
//! client handle is created at startup and shared by all requests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::error::AppError;

/// One page of object keys returned by a backend listing call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Object keys in backend enumeration order
    pub keys: Vec<String>,
    /// Opaque token to fetch the next page, `None` when the listing is exhausted
    pub next_token: Option<String>,
}

/// A time-limited URL granting unauthenticated read access to one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short backend identifier used in logs
    fn backend_name(&self) -> &'static str;

    /// Name of the bucket every call operates on
    fn bucket_name(&self) -> String;

    /// Write `data` under `key`, replacing any existing object
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), AppError>;

    /// Read the whole object, `None` when it does not exist
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError>;

    /// Check whether an object exists
    async fn exists(&self, key: &str) -> Result<bool, AppError>;

    /// Remove an object. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Fetch one page of keys starting with `prefix`.
    ///
    /// A bucket that does not exist yields an empty, exhausted page.
    async fn list_page(
        &self,
        prefix: &str,
        page_token: Option<String>,
        max_keys: usize,
    ) -> Result<ListPage, AppError>;

    /// Produce a signed GET URL valid for `expiry_secs` seconds
    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<SignedUrl, AppError>;
}
