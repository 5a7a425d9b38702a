use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: i32,
    pub name: String,
    pub user_id: Option<i32>,
    pub category_id: i32,
    pub sub_category_id: Option<i32>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.user_id == Some(user_id)
    }
}

/// One stored file revision of a document
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VersionHistory {
    pub id: i32,
    pub document_id: Option<i32>,
    pub document_name: Option<String>,
    pub version_number: i32,
    pub current_version: bool,
    #[serde(skip_serializing)]
    pub file_path: String,
    pub original_filename: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub checksum: String,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Audit trail entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentHistory {
    pub id: i32,
    pub document_id: Option<i32>,
    pub action: String,
    pub action_by: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentComment {
    pub id: i32,
    pub document_id: i32,
    pub user_id: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
