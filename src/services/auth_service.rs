use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::password::verify_password;
use crate::auth::{generate_jwt, TokenUser};
use crate::config::SecurityConfig;
use crate::services::user_service::UserService;
use crate::services::{check_password_length, normalize_email, ServiceError};

const INVALID_CREDENTIALS: &str = "Incorrect email or password";

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds
    pub expires_in: u64,
}

pub struct AuthService {
    pool: PgPool,
    security: SecurityConfig,
}

impl AuthService {
    pub fn new(pool: PgPool, security: SecurityConfig) -> Self {
        Self { pool, security }
    }

    /// Exchange credentials for a bearer token carrying the user's role permissions
    pub async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, ServiceError> {
        let email = normalize_email(&request.email)?;
        check_password_length(&request.password)?;

        let record = UserService::new(self.pool.clone())
            .get_user_by_email(&email)
            .await?;

        let Some(record) = record else {
            warn!("Login failed: unknown email {}", email);
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password(&request.password, &record.user.password).await? {
            warn!("Login failed: wrong password for user {}", record.user.id);
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        if !record.user.is_active {
            warn!("Login refused: user {} is inactive", record.user.id);
            return Err(ServiceError::Forbidden("User account is inactive".to_string()));
        }

        let token = generate_jwt(TokenUser::from(&record), &self.security)?;
        info!("User {} logged in", record.user.id);

        Ok(TokenResponse {
            access_token: token,
            token_type: "bearer".to_string(),
            expires_in: self.security.jwt_expiry_hours * 3600,
        })
    }
}
