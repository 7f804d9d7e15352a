use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, warn};

use crate::core::error::{AppError, Result};
use crate::features::pdfs::dtos::{SignedUrlDto, UploadedPdfDto};
use crate::modules::storage::ObjectStore;
use crate::shared::constants::DEFAULT_PAGE_SIZE;
use crate::shared::validation::{content_type_for, validate_object_name};

/// Service for PDF objects kept in a single bucket
///
/// Every method is one independent backend round trip (delete and signed URL
/// generation probe for existence first). Nothing is cached or retried.
pub struct PdfService {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    signed_url_expiry_secs: u32,
}

impl PdfService {
    pub fn new(store: Arc<dyn ObjectStore>, signed_url_expiry_secs: u32) -> Self {
        let bucket = store.bucket_name();
        Self {
            store,
            bucket,
            signed_url_expiry_secs,
        }
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket
    }

    fn check_name(object_name: &str) -> Result<()> {
        validate_object_name(object_name).map_err(AppError::InvalidInput)
    }

    /// Upload an object, overwriting any existing object with the same name
    ///
    /// The content is read to the end before anything is sent; a read
    /// failure is reported as invalid input and the bucket is left untouched.
    pub async fn upload<R>(&self, object_name: &str, mut content: R) -> Result<UploadedPdfDto>
    where
        R: AsyncRead + Unpin + Send,
    {
        Self::check_name(object_name)?;

        let mut data = Vec::new();
        content.read_to_end(&mut data).await.map_err(|e| {
            AppError::InvalidInput(format!("Failed to read content for '{}': {}", object_name, e))
        })?;

        let content_type = content_type_for(object_name);
        self.store.put(object_name, &data, content_type).await?;

        info!(
            "Object uploaded: bucket={}, name={}, size={}",
            self.bucket,
            object_name,
            data.len()
        );

        Ok(UploadedPdfDto {
            object_name: object_name.to_string(),
            bucket: self.bucket.clone(),
            content_type: content_type.to_string(),
            size: data.len() as u64,
        })
    }

    /// Read a whole object into memory, `None` when it does not exist
    pub async fn download(&self, object_name: &str) -> Result<Option<Vec<u8>>> {
        Self::check_name(object_name)?;

        let content = self.store.get(object_name).await?;
        match &content {
            Some(data) => debug!(
                "Object downloaded: bucket={}, name={}, size={}",
                self.bucket,
                object_name,
                data.len()
            ),
            None => debug!(
                "Object not found: bucket={}, name={}",
                self.bucket, object_name
            ),
        }
        Ok(content)
    }

    /// List every object name ending with `suffix`
    ///
    /// Walks the whole listing (one backend call per page of keys), so the
    /// cost grows with the number of objects under `prefix`, not with the
    /// number of matches. A missing bucket yields an empty list.
    pub async fn list_by_suffix(&self, suffix: &str, prefix: Option<&str>) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut page_token = None;

        loop {
            let (matches, next) = self
                .list_page(suffix, prefix, page_token, DEFAULT_PAGE_SIZE)
                .await?;
            names.extend(matches);

            match next {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        info!(
            "Listed objects: bucket={}, suffix={}, prefix={}, count={}",
            self.bucket,
            suffix,
            prefix.unwrap_or(""),
            names.len()
        );
        Ok(names)
    }

    /// Fetch one backend page of names and keep those ending with `suffix`
    ///
    /// The page may hold fewer than `page_size` names since filtering happens
    /// after the backend returns the page. Returns the matches and the token
    /// for the next page.
    pub async fn list_page(
        &self,
        suffix: &str,
        prefix: Option<&str>,
        page_token: Option<String>,
        page_size: usize,
    ) -> Result<(Vec<String>, Option<String>)> {
        let page = self
            .store
            .list_page(prefix.unwrap_or(""), page_token, page_size)
            .await?;

        let matches = page
            .keys
            .into_iter()
            .filter(|key| key.ends_with(suffix))
            .collect();

        Ok((matches, page.next_token))
    }

    /// Generate a time-limited download URL for an existing object
    ///
    /// A missing object and a signing failure are reported as different
    /// errors.
    pub async fn sign_url(&self, object_name: &str) -> Result<SignedUrlDto> {
        Self::check_name(object_name)?;

        if !self.store.exists(object_name).await? {
            return Err(AppError::NotFound(format!(
                "Object '{}' not found",
                object_name
            )));
        }

        let signed = self
            .store
            .presign_get(object_name, self.signed_url_expiry_secs)
            .await
            .inspect_err(|e| {
                warn!(
                    "Failed to sign URL: bucket={}, name={}, error={}",
                    self.bucket, object_name, e
                )
            })?;

        debug!(
            "Signed URL generated: bucket={}, name={}, expires_at={}",
            self.bucket, object_name, signed.expires_at
        );

        Ok(SignedUrlDto {
            object_name: object_name.to_string(),
            url: signed.url,
            expires_at: signed.expires_at,
        })
    }

    /// Delete an object
    ///
    /// Returns `false` when no object existed under the name.
    pub async fn delete(&self, object_name: &str) -> Result<bool> {
        Self::check_name(object_name)?;

        if !self.store.exists(object_name).await? {
            debug!(
                "Nothing to delete: bucket={}, name={}",
                self.bucket, object_name
            );
            return Ok(false);
        }

        self.store.delete(object_name).await?;

        info!(
            "Object deleted: bucket={}, name={}",
            self.bucket, object_name
        );
        Ok(true)
    }
}
