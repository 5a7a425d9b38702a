pub mod password;
pub mod permissions;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::database::models::UserWithPermissions;

/// User snapshot embedded in the access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUser {
    pub id: i32,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_admin: bool,
    pub role: Option<String>,
    pub permissions: Vec<String>,
}

impl From<&UserWithPermissions> for TokenUser {
    fn from(record: &UserWithPermissions) -> Self {
        Self {
            id: record.user.id,
            email: record.user.email.clone(),
            is_active: record.user.is_active,
            is_superuser: record.user.is_superuser,
            is_admin: record.user.is_admin,
            role: record.role_name.clone(),
            permissions: record.permissions.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user: TokenUser,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user: TokenUser, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user.id.to_string(),
            user,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Sign a token for `user` with the configured secret and lifetime
pub fn generate_jwt(user: TokenUser, security: &SecurityConfig) -> Result<String, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let claims = Claims::new(user, security.jwt_expiry_hours);
    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry, returning the embedded claims
pub fn decode_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());

    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn sample_user() -> TokenUser {
        TokenUser {
            id: 7,
            email: "clerk@example.com".to_string(),
            is_active: true,
            is_superuser: false,
            is_admin: false,
            role: Some("clerk".to_string()),
            permissions: vec!["create_document".to_string()],
        }
    }

    #[test]
    fn round_trips_token_user() {
        let security = AppConfig::development().security;
        let token = generate_jwt(sample_user(), &security).unwrap();
        let claims = decode_jwt(&token, &security).unwrap();
        assert_eq!(claims.user, sample_user());
        assert_eq!(claims.sub, "7");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let security = AppConfig::development().security;
        let token = generate_jwt(sample_user(), &security).unwrap();

        let mut other = security.clone();
        other.jwt_secret = "another-secret".to_string();
        assert!(matches!(decode_jwt(&token, &other), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let security = AppConfig::development().security;
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "7".to_string(),
            user: sample_user(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(security.jwt_secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(decode_jwt(&token, &security), Err(JwtError::Expired)));
    }

    #[test]
    fn refuses_empty_secret() {
        let mut security = AppConfig::development().security;
        security.jwt_secret.clear();
        assert!(matches!(
            generate_jwt(sample_user(), &security),
            Err(JwtError::InvalidSecret)
        ));
    }
}
