use axum::{extract::State, Extension};

use crate::api::{ApiJson, ApiQuery, IdPath, Page, PaginationParams};
use crate::auth::permissions::{require, CAN_CREATE_TAG, CAN_DELETE_TAG, CAN_EDIT_TAG, CAN_MANAGE_TAG};
use crate::database::models::Tag;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::tag_service::{TagRequest, TagService};
use crate::state::AppState;

/// GET /api/v1/tags
pub async fn tags_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> ApiResult<Page<Tag>> {
    require(&user, &[CAN_MANAGE_TAG])?;
    let page = params.resolve(&state.config.api)?;
    let tags = TagService::new(state.pool.clone()).list_tags(page).await?;
    Ok(ApiResponse::success(tags))
}

/// POST /api/v1/tags
pub async fn tags_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<TagRequest>,
) -> ApiResult<Tag> {
    require(&user, &[CAN_CREATE_TAG])?;
    let tag = TagService::new(state.pool.clone()).create_tag(request).await?;
    Ok(ApiResponse::created(tag))
}

/// GET /api/v1/tags/:id
pub async fn tag_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<Tag> {
    require(&user, &[CAN_MANAGE_TAG])?;
    let tag = TagService::new(state.pool.clone()).get_tag(id).await?;
    Ok(ApiResponse::success(tag))
}

/// PUT /api/v1/tags/:id
pub async fn tag_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
    ApiJson(request): ApiJson<TagRequest>,
) -> ApiResult<Tag> {
    require(&user, &[CAN_EDIT_TAG])?;
    let tag = TagService::new(state.pool.clone()).update_tag(id, request).await?;
    Ok(ApiResponse::success(tag))
}

/// DELETE /api/v1/tags/:id
pub async fn tag_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<()> {
    require(&user, &[CAN_DELETE_TAG])?;
    TagService::new(state.pool.clone()).delete_tag(id).await?;
    Ok(ApiResponse::no_content())
}
