use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::shared::constants::{DEFAULT_LIST_SUFFIX, MAX_PAGE_SIZE};

/// Upload PDF request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadPdfDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/pdf")]
    pub file: String,
    /// Object name to store under; defaults to the uploaded filename
    #[schema(example = "invoices/2024-001.pdf")]
    pub name: Option<String>,
}

/// Response DTO for a stored object
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadedPdfDto {
    /// Name of the object inside the bucket
    pub object_name: String,
    /// Bucket the object was written to
    pub bucket: String,
    /// MIME type stored with the object
    pub content_type: String,
    /// Size of the object in bytes
    pub size: u64,
}

/// Query parameters for listing objects
///
/// Without `page_size` or `page_token` the whole bucket is walked and every
/// matching name returned at once.
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPdfsQuery {
    /// Keep only names ending with this suffix (default: ".pdf")
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// Only consider names starting with this prefix (filtered by the backend)
    #[serde(default)]
    pub prefix: Option<String>,

    /// Number of keys to request from the backend for one page (max: 1000)
    #[validate(range(min = 1, max = 1000, message = "page_size must be between 1 and 1000"))]
    #[param(minimum = 1, maximum = 1000)]
    pub page_size: Option<usize>,

    /// Continuation token returned as `meta.next_page_token` by a previous page
    pub page_token: Option<String>,
}

fn default_suffix() -> String {
    DEFAULT_LIST_SUFFIX.to_string()
}

impl Default for ListPdfsQuery {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
            prefix: None,
            page_size: None,
            page_token: None,
        }
    }
}

impl ListPdfsQuery {
    pub fn is_paginated(&self) -> bool {
        self.page_size.is_some() || self.page_token.is_some()
    }

    /// Get clamped page_size (respects MAX_PAGE_SIZE)
    pub fn limit(&self) -> Option<usize> {
        self.page_size.map(|size| size.clamp(1, MAX_PAGE_SIZE))
    }
}

/// Response DTO for a signed download URL
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignedUrlDto {
    pub object_name: String,
    /// URL granting read access without further authentication
    pub url: String,
    /// Instant after which the backend rejects the URL
    pub expires_at: DateTime<Utc>,
}

/// Response DTO for delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletePdfResponseDto {
    /// False when no object existed under the name
    pub deleted: bool,
}
