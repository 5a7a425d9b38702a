use axum::{extract::State, Extension};
use serde::Deserialize;

use crate::api::{ApiJson, ApiQuery, IdPath, Page, PaginationParams};
use crate::auth::permissions::{
    require, CAN_CREATE_CATEGORY, CAN_CREATE_SUB_CATEGORY, CAN_DELETE_CATEGORY,
    CAN_DELETE_SUB_CATEGORY, CAN_EDIT_CATEGORY, CAN_EDIT_SUB_CATEGORY, CAN_MANAGE_CATEGORY,
    CAN_MANAGE_SUB_CATEGORY,
};
use crate::database::models::{Category, SubCategory};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::category_service::{
    CategoryDetail, CategoryRequest, CategoryService, CreateSubCategoryRequest,
    UpdateSubCategoryRequest,
};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SubCategoryFilter {
    pub category_id: Option<i32>,
}

/// GET /api/v1/categories
pub async fn categories_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> ApiResult<Page<Category>> {
    require(&user, &[CAN_MANAGE_CATEGORY])?;
    let page = params.resolve(&state.config.api)?;
    let categories = CategoryService::new(state.pool.clone()).list_categories(page).await?;
    Ok(ApiResponse::success(categories))
}

/// POST /api/v1/categories
pub async fn categories_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CategoryRequest>,
) -> ApiResult<Category> {
    require(&user, &[CAN_CREATE_CATEGORY])?;
    let category = CategoryService::new(state.pool.clone()).create_category(request).await?;
    Ok(ApiResponse::created(category))
}

/// GET /api/v1/categories/:id
pub async fn category_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<CategoryDetail> {
    require(&user, &[CAN_MANAGE_CATEGORY])?;
    let category = CategoryService::new(state.pool.clone()).get_category(id).await?;
    Ok(ApiResponse::success(category))
}

/// PUT /api/v1/categories/:id
pub async fn category_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
    ApiJson(request): ApiJson<CategoryRequest>,
) -> ApiResult<Category> {
    require(&user, &[CAN_EDIT_CATEGORY])?;
    let category = CategoryService::new(state.pool.clone())
        .update_category(id, request)
        .await?;
    Ok(ApiResponse::success(category))
}

/// DELETE /api/v1/categories/:id
pub async fn category_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<()> {
    require(&user, &[CAN_DELETE_CATEGORY])?;
    CategoryService::new(state.pool.clone()).delete_category(id).await?;
    Ok(ApiResponse::no_content())
}

/// GET /api/v1/categories/sub-categories
pub async fn sub_categories_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<PaginationParams>,
    ApiQuery(filter): ApiQuery<SubCategoryFilter>,
) -> ApiResult<Page<SubCategory>> {
    require(&user, &[CAN_MANAGE_SUB_CATEGORY])?;
    let page = params.resolve(&state.config.api)?;
    let sub_categories = CategoryService::new(state.pool.clone())
        .list_sub_categories(page, filter.category_id)
        .await?;
    Ok(ApiResponse::success(sub_categories))
}

/// POST /api/v1/categories/sub-categories
pub async fn sub_categories_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateSubCategoryRequest>,
) -> ApiResult<SubCategory> {
    require(&user, &[CAN_CREATE_SUB_CATEGORY])?;
    let sub_category = CategoryService::new(state.pool.clone())
        .create_sub_category(request)
        .await?;
    Ok(ApiResponse::created(sub_category))
}

/// PUT /api/v1/categories/sub-categories/:id
pub async fn sub_category_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
    ApiJson(request): ApiJson<UpdateSubCategoryRequest>,
) -> ApiResult<SubCategory> {
    require(&user, &[CAN_EDIT_SUB_CATEGORY])?;
    let sub_category = CategoryService::new(state.pool.clone())
        .update_sub_category(id, request)
        .await?;
    Ok(ApiResponse::success(sub_category))
}

/// DELETE /api/v1/categories/sub-categories/:id
pub async fn sub_category_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<()> {
    require(&user, &[CAN_DELETE_SUB_CATEGORY])?;
    CategoryService::new(state.pool.clone()).delete_sub_category(id).await?;
    Ok(ApiResponse::no_content())
}
