// handlers/public/auth/login.rs - POST /api/v1/login

use axum::extract::State;

use crate::api::ApiJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::auth_service::{AuthService, LoginRequest, TokenResponse};
use crate::state::AppState;

/**
 * POST /api/v1/login - Exchange email and password for a bearer token
 *
 * Input: `{ "email": "string", "password": "string" }`
 *
 * Output: `{ "success": true, "data": { "access_token", "token_type": "bearer", "expires_in" } }`
 *
 * 400 malformed email or short password, 401 unknown email or wrong
 * password (same message for both), 403 inactive account.
 */
pub async fn login_post(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let service = AuthService::new(state.pool.clone(), state.config.security.clone());
    let token = service.login(&request).await?;
    Ok(ApiResponse::success(token))
}
