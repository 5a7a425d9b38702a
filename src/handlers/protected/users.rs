use axum::{extract::State, Extension};

use crate::api::{ApiJson, ApiQuery, IdPath, Page, PaginationParams};
use crate::auth::permissions::{
    require, CAN_CREATE_USER, CAN_DELETE_USER, CAN_EDIT_USER, CAN_MANAGE_USER,
};
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::user_service::{CreateUserRequest, UpdateUserRequest, UserService};
use crate::state::AppState;

/// GET /api/v1/users/me
pub async fn me_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<User> {
    let record = UserService::new(state.pool.clone()).get_user(user.id).await?;
    Ok(ApiResponse::success(record))
}

/// GET /api/v1/users
pub async fn users_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> ApiResult<Page<User>> {
    require(&user, &[CAN_MANAGE_USER])?;
    let page = params.resolve(&state.config.api)?;
    let users = UserService::new(state.pool.clone()).list_users(page).await?;
    Ok(ApiResponse::success(users))
}

/// POST /api/v1/users
pub async fn users_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> ApiResult<User> {
    require(&user, &[CAN_CREATE_USER])?;
    let created = UserService::new(state.pool.clone()).create_user(request).await?;
    Ok(ApiResponse::created(created))
}

/// GET /api/v1/users/:id
pub async fn user_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<User> {
    require(&user, &[CAN_MANAGE_USER])?;
    let record = UserService::new(state.pool.clone()).get_user(id).await?;
    Ok(ApiResponse::success(record))
}

/// PUT /api/v1/users/:id
pub async fn user_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> ApiResult<User> {
    require(&user, &[CAN_EDIT_USER])?;
    let updated = UserService::new(state.pool.clone()).update_user(id, request).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/v1/users/:id
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<()> {
    require(&user, &[CAN_DELETE_USER])?;
    UserService::new(state.pool.clone()).delete_user(user.id, id).await?;
    Ok(ApiResponse::no_content())
}
