/// Suffix used when a listing does not ask for one
pub const DEFAULT_LIST_SUFFIX: &str = ".pdf";

/// Default number of keys requested per backend listing page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// S3 never returns more than 1000 keys per page
pub const MAX_PAGE_SIZE: usize = 1000;

/// Object names longer than this are rejected by GCS and S3 alike
pub const MAX_OBJECT_NAME_BYTES: usize = 1024;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";
