use utoipa::{Modify, OpenApi};

use crate::features::pdfs::{dtos as pdfs_dtos, handlers as pdfs_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        pdfs_handlers::upload_pdf,
        pdfs_handlers::list_pdfs,
        pdfs_handlers::download_pdf,
        pdfs_handlers::get_signed_url,
        pdfs_handlers::delete_pdf,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Pdfs
            pdfs_dtos::UploadPdfDto,
            pdfs_dtos::UploadedPdfDto,
            pdfs_dtos::SignedUrlDto,
            pdfs_dtos::DeletePdfResponseDto,
            ApiResponse<pdfs_dtos::UploadedPdfDto>,
            ApiResponse<pdfs_dtos::SignedUrlDto>,
            ApiResponse<pdfs_dtos::DeletePdfResponseDto>,
            ApiResponse<Vec<String>>,
        )
    ),
    tags(
        (name = "pdfs", description = "PDF upload, listing, download, signed URLs and deletion"),
    ),
    info(
        title = "PDF Store API",
        version = "0.1.0",
        description = "API documentation for PDF Store",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
