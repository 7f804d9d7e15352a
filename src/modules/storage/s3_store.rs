//! S3-compatible storage backend
//!
//! Talks to any S3 XML API endpoint: Google Cloud Storage through its
//! interoperability endpoint, AWS S3, or MinIO.
//!
//! Uses rust-s3 crate for lightweight S3 operations. The crate is built
//! without `fail-on-err`, so non-2xx responses come back as data and the
//! status code is inspected here.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::{debug, info, warn};

use crate::core::config::{CredentialSource, StorageConfig};
use crate::core::error::AppError;
use crate::modules::storage::object_store::{ListPage, ObjectStore, SignedUrl};

/// Resolve a credential source into concrete S3 credentials
///
/// Ambient resolution looks at `AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY`,
/// the shared credentials profile and instance metadata, in that order.
pub fn resolve_credentials(source: &CredentialSource) -> Result<Credentials, AppError> {
    match source {
        CredentialSource::Static {
            access_key,
            secret_key,
        } => Credentials::new(
            Some(access_key.as_str()),
            Some(secret_key.as_str()),
            None,
            None,
            None,
        )
            .map_err(|e| AppError::Config(format!("Failed to create storage credentials: {}", e))),
        CredentialSource::Ambient => Credentials::default().map_err(|e| {
            AppError::Config(format!("Failed to resolve ambient storage credentials: {}", e))
        }),
    }
}

/// S3-compatible object store
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    endpoint: String,
}

impl S3ObjectStore {
    /// Create a client for the configured bucket
    ///
    /// No request is sent here; bucket existence and credential validity are
    /// only discovered by the first operation.
    pub fn new(config: &StorageConfig, credentials: Credentials) -> Result<Self, AppError> {
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| AppError::Config(format!("Failed to create storage bucket handle: {}", e)))?;

        // http://endpoint/bucket instead of http://bucket.endpoint
        if config.path_style {
            bucket.set_path_style();
        }

        let store = Self {
            bucket,
            endpoint: config.endpoint.clone(),
        };

        info!(
            "S3 object store initialized for endpoint: {}, bucket: {}, path_style: {}",
            store.endpoint,
            store.bucket.name(),
            config.path_style
        );

        Ok(store)
    }

    fn backend_error(action: &str, key: &str, e: impl std::fmt::Display) -> AppError {
        AppError::Storage(format!("Failed to {} '{}': {}", action, key, e))
    }
}

/// Whether a status code from the S3 API means "no such key/bucket"
pub(crate) fn is_not_found_status(status: u16) -> bool {
    status == 404
}

pub(crate) fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn backend_name(&self) -> &'static str {
        "s3"
    }

    fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), AppError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| Self::backend_error("upload", key, e))?;

        let status = response.status_code();
        if !is_success_status(status) {
            return Err(Self::backend_error(
                "upload",
                key,
                format!("status {}", status),
            ));
        }

        debug!("Uploaded object '{}' to bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        let response = self
            .bucket
            .get_object(key)
            .await
            .map_err(|e| Self::backend_error("download", key, e))?;

        let status = response.status_code();
        if is_not_found_status(status) {
            return Ok(None);
        }
        if !is_success_status(status) {
            return Err(Self::backend_error(
                "download",
                key,
                format!("status {}", status),
            ));
        }

        debug!(
            "Downloaded object '{}' from bucket '{}'",
            key,
            self.bucket.name()
        );
        Ok(Some(response.to_vec()))
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        match self.bucket.head_object(key).await {
            Ok((_, status)) if is_success_status(status) => Ok(true),
            Ok((_, status)) if is_not_found_status(status) => Ok(false),
            Ok((_, status)) => Err(Self::backend_error(
                "check existence of",
                key,
                format!("status {}", status),
            )),
            Err(e) => Err(Self::backend_error("check existence of", key, e)),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| Self::backend_error("delete", key, e))?;

        let status = response.status_code();
        if !is_success_status(status) && !is_not_found_status(status) {
            return Err(Self::backend_error(
                "delete",
                key,
                format!("status {}", status),
            ));
        }

        debug!("Deleted object '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    async fn list_page(
        &self,
        prefix: &str,
        page_token: Option<String>,
        max_keys: usize,
    ) -> Result<ListPage, AppError> {
        let result = self
            .bucket
            .list_page(prefix.to_string(), None, page_token, None, Some(max_keys))
            .await;

        match result {
            Ok((page, status)) if is_success_status(status) => {
                let next_token = if page.is_truncated {
                    page.next_continuation_token
                } else {
                    None
                };
                Ok(ListPage {
                    keys: page.contents.into_iter().map(|obj| obj.key).collect(),
                    next_token,
                })
            }
            Ok((_, status)) if is_not_found_status(status) => Ok(ListPage::default()),
            Ok((_, status)) => Err(Self::backend_error(
                "list",
                prefix,
                format!("status {}", status),
            )),
            Err(e) => {
                // The error body of a missing bucket does not parse as a listing,
                // so ask the backend directly before reporting a failure.
                match self.bucket.exists().await {
                    Ok(false) => {
                        warn!(
                            "Bucket '{}' does not exist, returning empty listing",
                            self.bucket.name()
                        );
                        Ok(ListPage::default())
                    }
                    _ => Err(Self::backend_error("list", prefix, e)),
                }
            }
        }
    }

    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<SignedUrl, AppError> {
        let issued_at = Utc::now();
        let url = self
            .bucket
            .presign_get(key, expiry_secs, None)
            .await
            .map_err(|e| {
                AppError::Signing(format!(
                    "Failed to generate presigned URL for '{}': {}",
                    key, e
                ))
            })?;

        Ok(SignedUrl {
            url,
            expires_at: issued_at + Duration::seconds(i64::from(expiry_secs)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(path_style: bool) -> StorageConfig {
        StorageConfig {
            backend: crate::core::config::StorageBackend::S3,
            bucket: "pdf-bucket".to_string(),
            endpoint: "http://localhost:9000".to_string(),
            region: "us-east-1".to_string(),
            path_style,
            credentials: CredentialSource::Static {
                access_key: "access".to_string(),
                secret_key: "secret".to_string(),
            },
            signed_url_expiry_secs: 3600,
        }
    }

    #[test]
    fn test_status_classification() {
        assert!(is_success_status(200));
        assert!(is_success_status(204));
        assert!(!is_success_status(404));
        assert!(!is_success_status(500));
        assert!(is_not_found_status(404));
        assert!(!is_not_found_status(403));
    }

    #[test]
    fn test_resolve_static_credentials() {
        let credentials = resolve_credentials(&CredentialSource::Static {
            access_key: "access".to_string(),
            secret_key: "secret".to_string(),
        })
        .unwrap();

        assert_eq!(credentials.access_key.as_deref(), Some("access"));
        assert_eq!(credentials.secret_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_new_does_not_contact_backend() {
        let config = test_config(true);
        let credentials = resolve_credentials(&config.credentials).unwrap();
        let store = S3ObjectStore::new(&config, credentials).unwrap();

        assert_eq!(store.bucket_name(), "pdf-bucket");
        assert_eq!(store.backend_name(), "s3");
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_reported_as_missing() {
        let mut config = test_config(true);
        config.endpoint = "http://127.0.0.1:1".to_string();
        let credentials = resolve_credentials(&config.credentials).unwrap();
        let store = S3ObjectStore::new(&config, credentials).unwrap();

        // The request URL, and so the key, ends up in the transport error text
        let key = "invoice-404.pdf";

        assert!(matches!(store.get(key).await, Err(AppError::Storage(_))));
        assert!(matches!(store.exists(key).await, Err(AppError::Storage(_))));
        assert!(matches!(store.delete(key).await, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn test_presign_get_is_local_and_carries_expiry() {
        let config = test_config(true);
        let credentials = resolve_credentials(&config.credentials).unwrap();
        let store = S3ObjectStore::new(&config, credentials).unwrap();

        let before = Utc::now();
        let signed = store.presign_get("a.pdf", 3600).await.unwrap();

        assert!(signed.url.starts_with("http://localhost:9000/"));
        assert!(signed.url.contains("/pdf-bucket/a.pdf?"));
        assert!(signed.url.contains("X-Amz-Expires=3600"));
        assert!(signed.url.contains("X-Amz-Signature="));
        assert!(signed.expires_at >= before + Duration::seconds(3600));
    }
}
