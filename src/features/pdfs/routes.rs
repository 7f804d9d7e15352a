use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::features::pdfs::handlers::{
    delete_pdf, download_pdf, get_signed_url, list_pdfs, upload_pdf,
};
use crate::features::pdfs::services::PdfService;

/// Largest accepted file part, in bytes
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit(pub usize);

#[derive(Clone, FromRef)]
pub struct PdfsState {
    pub service: Arc<PdfService>,
    pub upload_limit: UploadLimit,
}

/// Create routes for the pdfs feature
pub fn routes(pdf_service: Arc<PdfService>, max_upload_size: usize) -> Router {
    let state = PdfsState {
        service: pdf_service,
        upload_limit: UploadLimit(max_upload_size),
    };

    Router::new()
        .route(
            "/api/pdfs",
            // Allow body size up to max_upload_size + buffer for multipart overhead
            get(list_pdfs)
                .post(upload_pdf)
                .layer(DefaultBodyLimit::max(max_upload_size + 1024 * 1024)),
        )
        .route("/api/pdfs/{name}", get(download_pdf).delete(delete_pdf))
        .route("/api/pdfs/{name}/signed-url", get(get_signed_url))
        .with_state(state)
}
