// handlers/protected/documents.rs - documents, versions, comments and history
//
// Document create and version upload take multipart/form-data; everything
// else is JSON.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};

use crate::api::{ApiJson, ApiQuery, IdPath, Page, PaginationParams};
use crate::auth::permissions::{
    require, CAN_CREATE_COMMENT, CAN_CREATE_DOCUMENT, CAN_CREATE_MY_DOCUMENT, CAN_CREATE_VERSION,
    CAN_DELETE_DOCUMENT, CAN_DELETE_MY_DOCUMENT, CAN_DOWNLOAD_DOCUMENT, CAN_EDIT_DOCUMENT,
    CAN_EDIT_MY_DOCUMENT, CAN_MANAGE_COMMENT, CAN_MANAGE_DOCUMENT, CAN_MANAGE_DOCUMENT_HISTORY,
    CAN_MANAGE_MY_DOCUMENT, CAN_MANAGE_VERSION, CAN_SHOW_DOCUMENT, CAN_SHOW_MY_DOCUMENT,
};
use crate::database::models::{Document, DocumentComment, DocumentHistory, VersionHistory};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::document_service::{
    CommentRequest, DocumentDetail, DocumentFields, DocumentQuery, DocumentService,
    UpdateDocumentRequest,
};
use crate::state::AppState;
use crate::storage::UploadedFile;

fn service(state: &AppState) -> DocumentService {
    DocumentService::new(state.pool.clone(), state.store.clone())
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("Uploaded file is too large")
    } else {
        ApiError::bad_request(err.body_text())
    }
}

fn parse_id(field: &str, value: &str) -> Result<Option<i32>, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| ApiError::field_error(field, "Must be an integer"))
}

/// Split comma separated tag fields; repeated `tags` fields accumulate
fn push_tags(tags: &mut Vec<String>, value: &str) {
    tags.extend(
        value
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned),
    );
}

async fn read_file(field: axum::extract::multipart::Field<'_>) -> Result<UploadedFile, ApiError> {
    let file_name = field.file_name().map(str::to_owned);
    let content_type = field.content_type().map(str::to_owned);
    let bytes = field.bytes().await.map_err(multipart_error)?;
    Ok(UploadedFile {
        file_name,
        content_type,
        bytes,
    })
}

async fn read_document_form(
    mut multipart: Multipart,
) -> Result<(DocumentFields, Option<UploadedFile>), ApiError> {
    let mut fields = DocumentFields::default();
    let mut name = None;
    let mut category_id = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let upload = read_file(field).await?;
                // browsers send an empty part when no file was chosen
                if !upload.bytes.is_empty() {
                    file = Some(upload);
                }
            }
            "name" => name = Some(field.text().await.map_err(multipart_error)?),
            "category_id" => {
                let text = field.text().await.map_err(multipart_error)?;
                category_id = parse_id("category_id", &text)?;
            }
            "sub_category_id" => {
                let text = field.text().await.map_err(multipart_error)?;
                fields.sub_category_id = parse_id("sub_category_id", &text)?;
            }
            "description" => {
                fields.description = Some(field.text().await.map_err(multipart_error)?)
            }
            "tags" => {
                let text = field.text().await.map_err(multipart_error)?;
                push_tags(&mut fields.tags, &text);
            }
            other => tracing::debug!("Ignoring unknown form field {:?}", other),
        }
    }

    fields.name = name.ok_or_else(|| ApiError::field_error("name", "Field required"))?;
    fields.category_id =
        category_id.ok_or_else(|| ApiError::field_error("category_id", "Field required"))?;
    Ok((fields, file))
}

async fn read_version_form(mut multipart: Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            return read_file(field).await;
        }
    }
    Err(ApiError::field_error("file", "Field required"))
}

/// `attachment` disposition with quotes and control characters stripped from the name
fn content_disposition(file_name: &str) -> HeaderValue {
    let safe: String = file_name
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", safe))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// GET /api/v1/documents
pub async fn documents_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<PaginationParams>,
    ApiQuery(query): ApiQuery<DocumentQuery>,
) -> ApiResult<Page<Document>> {
    require(&user, &[CAN_MANAGE_DOCUMENT])?;
    let page = params.resolve(&state.config.api)?;
    let documents = service(&state).list_documents(page, query).await?;
    Ok(ApiResponse::success(documents))
}

/// POST /api/v1/documents (multipart)
pub async fn documents_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<DocumentDetail> {
    require(&user, &[CAN_CREATE_DOCUMENT, CAN_CREATE_MY_DOCUMENT])?;
    let (fields, file) = read_document_form(multipart).await?;
    let detail = service(&state).create_document(&user, fields, file).await?;
    Ok(ApiResponse::created(detail))
}

/// GET /api/v1/documents/my
pub async fn my_documents_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<PaginationParams>,
    ApiQuery(query): ApiQuery<DocumentQuery>,
) -> ApiResult<Page<Document>> {
    require(&user, &[CAN_MANAGE_MY_DOCUMENT])?;
    let page = params.resolve(&state.config.api)?;
    let documents = service(&state).list_my_documents(&user, page, query).await?;
    Ok(ApiResponse::success(documents))
}

/// GET /api/v1/documents/history - the caller's own actions
pub async fn my_history_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> ApiResult<Page<DocumentHistory>> {
    require(&user, &[CAN_MANAGE_DOCUMENT_HISTORY])?;
    let page = params.resolve(&state.config.api)?;
    let history = service(&state).history_by_user(user.id, page).await?;
    Ok(ApiResponse::success(history))
}

/// GET /api/v1/documents/:id
pub async fn document_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<DocumentDetail> {
    // ownership is checked once the document is loaded
    require(&user, &[CAN_SHOW_DOCUMENT, CAN_SHOW_MY_DOCUMENT])?;
    let detail = service(&state).get_document(&user, id).await?;
    Ok(ApiResponse::success(detail))
}

/// PUT /api/v1/documents/:id
pub async fn document_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
    ApiJson(request): ApiJson<UpdateDocumentRequest>,
) -> ApiResult<Document> {
    require(&user, &[CAN_EDIT_DOCUMENT, CAN_EDIT_MY_DOCUMENT])?;
    let document = service(&state).update_document(&user, id, request).await?;
    Ok(ApiResponse::success(document))
}

/// DELETE /api/v1/documents/:id
pub async fn document_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<()> {
    require(&user, &[CAN_DELETE_DOCUMENT, CAN_DELETE_MY_DOCUMENT])?;
    service(&state).delete_document(&user, id).await?;
    Ok(ApiResponse::no_content())
}

/// GET /api/v1/documents/:id/versions
pub async fn versions_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<Vec<VersionHistory>> {
    require(&user, &[CAN_MANAGE_VERSION])?;
    let versions = service(&state).list_versions(id).await?;
    Ok(ApiResponse::success(versions))
}

/// POST /api/v1/documents/:id/versions (multipart, single `file` field)
pub async fn versions_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
    multipart: Multipart,
) -> ApiResult<VersionHistory> {
    require(&user, &[CAN_CREATE_VERSION])?;
    let file = read_version_form(multipart).await?;
    let version = service(&state).create_version(&user, id, file).await?;
    Ok(ApiResponse::created(version))
}

/// GET /api/v1/documents/:id/download - raw bytes of the current version
pub async fn download_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> Result<Response, ApiError> {
    require(&user, &[CAN_DOWNLOAD_DOCUMENT])?;
    let download = service(&state).download_current(id).await?;

    let content_type = HeaderValue::from_str(&download.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let headers = [
        (header::CONTENT_TYPE, content_type),
        (header::CONTENT_DISPOSITION, content_disposition(&download.file_name)),
    ];
    Ok((headers, download.bytes).into_response())
}

/// GET /api/v1/documents/:id/comments
pub async fn comments_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<Vec<DocumentComment>> {
    require(&user, &[CAN_MANAGE_COMMENT])?;
    let comments = service(&state).list_comments(id).await?;
    Ok(ApiResponse::success(comments))
}

/// POST /api/v1/documents/:id/comments
pub async fn comments_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
    ApiJson(request): ApiJson<CommentRequest>,
) -> ApiResult<DocumentComment> {
    require(&user, &[CAN_CREATE_COMMENT])?;
    let comment = service(&state).create_comment(&user, id, request).await?;
    Ok(ApiResponse::created(comment))
}

/// GET /api/v1/documents/:id/history
pub async fn document_history_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> ApiResult<Page<DocumentHistory>> {
    require(&user, &[CAN_MANAGE_DOCUMENT_HISTORY])?;
    let page = params.resolve(&state.config.api)?;
    let history = service(&state).history_by_document(id, page).await?;
    Ok(ApiResponse::success(history))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_optional_ids() {
        assert_eq!(parse_id("category_id", " 12 ").unwrap(), Some(12));
        assert_eq!(parse_id("category_id", "").unwrap(), None);
        assert_eq!(parse_id("category_id", "abc").unwrap_err().status_code(), 400);
    }

    #[test]
    fn tags_accept_commas_and_repeats() {
        let mut tags = Vec::new();
        push_tags(&mut tags, "legal, 2024 ,");
        push_tags(&mut tags, "contracts");
        assert_eq!(tags, vec!["legal", "2024", "contracts"]);
    }

    #[test]
    fn disposition_strips_quotes() {
        let value = content_disposition("q\"1\" report.pdf");
        assert_eq!(value.to_str().unwrap(), "attachment; filename=\"q1 report.pdf\"");
    }
}
