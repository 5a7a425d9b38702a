use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub role_id: Option<i32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    /// bcrypt hash, never serialized into responses
    #[serde(skip_serializing, default)]
    pub password: String,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_admin: bool,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// User row joined with its role name and the role's permission names
#[derive(Debug, Clone, FromRow)]
pub struct UserWithPermissions {
    #[sqlx(flatten)]
    pub user: User,
    pub role_name: Option<String>,
    pub permissions: Vec<String>,
}
