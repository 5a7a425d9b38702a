use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Permission {
    pub id: i32,
    pub name: String,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Role joined with the names of its permissions
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub role: Role,
    pub permissions: Vec<String>,
}
