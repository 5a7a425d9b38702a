// Role management. Reads need manage_user; writes are admin-only.

use axum::{extract::State, Extension};

use crate::api::{ApiJson, ApiQuery, IdPath, Page, PaginationParams};
use crate::auth::permissions::{require, require_admin, CAN_MANAGE_USER};
use crate::database::models::{Permission, RoleWithPermissions};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::role_service::{CreateRoleRequest, RoleService, UpdateRoleRequest};
use crate::state::AppState;

/// GET /api/v1/users/permissions
pub async fn permissions_get(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
) -> ApiResult<Vec<Permission>> {
    let permissions = RoleService::new(state.pool.clone()).list_permissions().await?;
    Ok(ApiResponse::success(permissions))
}

/// GET /api/v1/users/roles
pub async fn roles_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> ApiResult<Page<RoleWithPermissions>> {
    require(&user, &[CAN_MANAGE_USER])?;
    let page = params.resolve(&state.config.api)?;
    let roles = RoleService::new(state.pool.clone()).list_roles(page).await?;
    Ok(ApiResponse::success(roles))
}

/// POST /api/v1/users/roles
pub async fn roles_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateRoleRequest>,
) -> ApiResult<RoleWithPermissions> {
    require_admin(&user)?;
    let role = RoleService::new(state.pool.clone()).create_role(request).await?;
    Ok(ApiResponse::created(role))
}

/// GET /api/v1/users/roles/:id
pub async fn role_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<RoleWithPermissions> {
    require(&user, &[CAN_MANAGE_USER])?;
    let role = RoleService::new(state.pool.clone()).get_role(id).await?;
    Ok(ApiResponse::success(role))
}

/// PUT /api/v1/users/roles/:id
pub async fn role_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
    ApiJson(request): ApiJson<UpdateRoleRequest>,
) -> ApiResult<RoleWithPermissions> {
    require_admin(&user)?;
    let role = RoleService::new(state.pool.clone()).update_role(id, request).await?;
    Ok(ApiResponse::success(role))
}

/// DELETE /api/v1/users/roles/:id
pub async fn role_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> ApiResult<()> {
    require_admin(&user)?;
    RoleService::new(state.pool.clone()).delete_role(id).await?;
    Ok(ApiResponse::no_content())
}
