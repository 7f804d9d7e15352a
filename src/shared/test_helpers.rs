use std::sync::Arc;

use async_trait::async_trait;

use crate::core::error::AppError;
use crate::modules::storage::{InMemoryObjectStore, ListPage, ObjectStore, SignedUrl};

pub fn memory_store() -> Arc<InMemoryObjectStore> {
    Arc::new(InMemoryObjectStore::new(
        "pdf-bucket",
        b"test-signing-key".to_vec(),
    ))
}

/// Backend whose every call fails
///
/// With `signing_only` set, objects always exist and only URL signing fails.
#[derive(Default)]
pub struct FailingObjectStore {
    signing_only: bool,
}

impl FailingObjectStore {
    pub fn signing_only() -> Self {
        Self { signing_only: true }
    }

    fn unavailable() -> AppError {
        AppError::Storage("backend unavailable".to_string())
    }
}

#[async_trait]
impl ObjectStore for FailingObjectStore {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    fn bucket_name(&self) -> String {
        "pdf-bucket".to_string()
    }

    async fn put(&self, _key: &str, _data: &[u8], _content_type: &str) -> Result<(), AppError> {
        Err(Self::unavailable())
    }

    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, AppError> {
        Err(Self::unavailable())
    }

    async fn exists(&self, _key: &str) -> Result<bool, AppError> {
        if self.signing_only {
            Ok(true)
        } else {
            Err(Self::unavailable())
        }
    }

    async fn delete(&self, _key: &str) -> Result<(), AppError> {
        Err(Self::unavailable())
    }

    async fn list_page(
        &self,
        _prefix: &str,
        _page_token: Option<String>,
        _max_keys: usize,
    ) -> Result<ListPage, AppError> {
        Err(Self::unavailable())
    }

    async fn presign_get(&self, _key: &str, _expiry_secs: u32) -> Result<SignedUrl, AppError> {
        Err(AppError::Signing("credentials cannot sign".to_string()))
    }
}
