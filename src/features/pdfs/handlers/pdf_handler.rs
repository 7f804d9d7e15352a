use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::pdfs::dtos::{
    DeletePdfResponseDto, ListPdfsQuery, SignedUrlDto, UploadPdfDto, UploadedPdfDto,
};
use crate::features::pdfs::routes::UploadLimit;
use crate::features::pdfs::services::PdfService;
use crate::shared::constants::DEFAULT_PAGE_SIZE;
use crate::shared::types::{ApiResponse, Meta};
use crate::shared::validation::content_type_for;

/// Map a multipart read failure, keeping body-limit rejections as 413
fn multipart_error(context: &str, e: MultipartError) -> AppError {
    debug!("{}: {}", context, e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{}: {}", context, e.body_text()))
    } else {
        AppError::InvalidInput(format!("{}: {}", context, e.body_text()))
    }
}

/// Upload a PDF
///
/// Accepts multipart/form-data with:
/// - `file`: The file to upload (required)
/// - `name`: Object name override (optional, defaults to the uploaded filename)
#[utoipa::path(
    post,
    path = "/api/pdfs",
    tag = "pdfs",
    request_body(
        content = UploadPdfDto,
        content_type = "multipart/form-data",
        description = "File upload form with an optional object name",
    ),
    responses(
        (status = 201, description = "Object stored", body = ApiResponse<UploadedPdfDto>),
        (status = 400, description = "Missing file or invalid object name"),
        (status = 413, description = "File too large"),
        (status = 502, description = "Storage backend error")
    )
)]
pub async fn upload_pdf(
    State(service): State<Arc<PdfService>>,
    State(UploadLimit(max_upload_size)): State<UploadLimit>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadedPdfDto>>)> {
    let mut file_data = None;
    let mut file_name: Option<String> = None;
    let mut name_override: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart data", e))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Failed to read file data", e))?;
                file_data = Some(data);
            }
            "name" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("Failed to read name field", e))?;
                if !text.is_empty() {
                    name_override = Some(text);
                }
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let file_data =
        file_data.ok_or_else(|| AppError::InvalidInput("File is required".to_string()))?;
    let object_name = name_override
        .or(file_name)
        .ok_or_else(|| AppError::InvalidInput("Filename is required".to_string()))?;

    if file_data.len() > max_upload_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File too large. Maximum size is {} bytes",
            max_upload_size
        )));
    }

    let response = service.upload(&object_name, &file_data[..]).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(response), None, None)),
    ))
}

/// List object names by suffix
///
/// Returns every match unless `page_size` or `page_token` is given, in which
/// case a single backend page is returned with `meta.next_page_token`.
#[utoipa::path(
    get,
    path = "/api/pdfs",
    tag = "pdfs",
    params(ListPdfsQuery),
    responses(
        (status = 200, description = "Matching object names", body = ApiResponse<Vec<String>>),
        (status = 400, description = "Invalid query parameters"),
        (status = 502, description = "Storage backend error")
    )
)]
pub async fn list_pdfs(
    State(service): State<Arc<PdfService>>,
    Query(params): Query<ListPdfsQuery>,
) -> Result<Json<ApiResponse<Vec<String>>>> {
    params
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (names, next_page_token) = if params.is_paginated() {
        let page_size = params.limit().unwrap_or(DEFAULT_PAGE_SIZE);
        service
            .list_page(
                &params.suffix,
                params.prefix.as_deref(),
                params.page_token.clone(),
                page_size,
            )
            .await?
    } else {
        let names = service
            .list_by_suffix(&params.suffix, params.prefix.as_deref())
            .await?;
        (names, None)
    };

    let total = names.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(names),
        None,
        Some(Meta {
            total,
            next_page_token,
        }),
    )))
}

/// Download an object
#[utoipa::path(
    get,
    path = "/api/pdfs/{name}",
    tag = "pdfs",
    params(
        ("name" = String, Path, description = "Object name")
    ),
    responses(
        (status = 200, description = "Object content", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Object not found"),
        (status = 502, description = "Storage backend error")
    )
)]
pub async fn download_pdf(
    State(service): State<Arc<PdfService>>,
    Path(name): Path<String>,
) -> Result<Response> {
    let content = service
        .download(&name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Object '{}' not found", name)))?;

    let file_name = name.rsplit('/').next().unwrap_or(&name).replace('"', "_");

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&name).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        content,
    )
        .into_response())
}

/// Generate a signed download URL
#[utoipa::path(
    get,
    path = "/api/pdfs/{name}/signed-url",
    tag = "pdfs",
    params(
        ("name" = String, Path, description = "Object name")
    ),
    responses(
        (status = 200, description = "Signed URL", body = ApiResponse<SignedUrlDto>),
        (status = 404, description = "Object not found"),
        (status = 502, description = "Signing or storage backend error")
    )
)]
pub async fn get_signed_url(
    State(service): State<Arc<PdfService>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<SignedUrlDto>>> {
    let signed = service.sign_url(&name).await?;

    Ok(Json(ApiResponse::success(Some(signed), None, None)))
}

/// Delete an object
///
/// Deleting a missing object succeeds with `deleted: false`.
#[utoipa::path(
    delete,
    path = "/api/pdfs/{name}",
    tag = "pdfs",
    params(
        ("name" = String, Path, description = "Object name")
    ),
    responses(
        (status = 200, description = "Delete outcome", body = ApiResponse<DeletePdfResponseDto>),
        (status = 400, description = "Invalid object name"),
        (status = 502, description = "Storage backend error")
    )
)]
pub async fn delete_pdf(
    State(service): State<Arc<PdfService>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<DeletePdfResponseDto>>> {
    let deleted = service.delete(&name).await?;

    let message = if deleted {
        "Object deleted successfully"
    } else {
        "Object did not exist"
    };

    Ok(Json(ApiResponse::success(
        Some(DeletePdfResponseDto { deleted }),
        Some(message.to_string()),
        None,
    )))
}
