use sqlx::PgConnection;

use crate::api::Pagination;
use crate::database::manager::DatabaseError;
use crate::database::models::{Document, DocumentComment, DocumentHistory, VersionHistory};
use crate::types::DocumentAction;

const DOCUMENT_COLUMNS: &str = "id, name, user_id, category_id, sub_category_id, description, \
     tags, created_at, updated_at";

const VERSION_COLUMNS: &str = "id, document_id, document_name, version_number, current_version, \
     file_path, original_filename, content_type, size_bytes, checksum, created_by, \
     created_at, updated_at";

const DOCUMENT_FILTER: &str = "($1::int IS NULL OR category_id = $1) \
     AND ($2::int IS NULL OR sub_category_id = $2) \
     AND ($3::int IS NULL OR user_id = $3) \
     AND ($4::text IS NULL OR $4 = ANY(tags)) \
     AND ($5::text IS NULL OR name ILIKE '%' || $5 || '%')";

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub name: String,
    pub user_id: i32,
    pub category_id: i32,
    pub sub_category_id: Option<i32>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Partial update; `None` leaves the column unchanged.
/// `Some(None)` clears the nullable columns.
#[derive(Debug, Clone, Default)]
pub struct DocumentChanges {
    pub name: Option<String>,
    pub category_id: Option<i32>,
    pub sub_category_id: Option<Option<i32>>,
    pub description: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

/// Optional list filters, all combined with AND
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub category_id: Option<i32>,
    pub sub_category_id: Option<i32>,
    pub user_id: Option<i32>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

pub struct DocumentRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> DocumentRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&mut self, id: i32) -> Result<Option<Document>, DatabaseError> {
        let sql = format!("SELECT {} FROM documents WHERE id = $1", DOCUMENT_COLUMNS);
        let document = sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(document)
    }

    /// Fetch and row-lock the document until the transaction ends
    pub async fn get_for_update(&mut self, id: i32) -> Result<Option<Document>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM documents WHERE id = $1 FOR UPDATE",
            DOCUMENT_COLUMNS
        );
        let document = sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(document)
    }

    pub async fn add(&mut self, new: &NewDocument) -> Result<Document, DatabaseError> {
        let sql = format!(
            "INSERT INTO documents (name, user_id, category_id, sub_category_id, description, tags) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            DOCUMENT_COLUMNS
        );
        let document = sqlx::query_as::<_, Document>(&sql)
            .bind(&new.name)
            .bind(new.user_id)
            .bind(new.category_id)
            .bind(new.sub_category_id)
            .bind(&new.description)
            .bind(&new.tags)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(document)
    }

    pub async fn update(
        &mut self,
        id: i32,
        changes: &DocumentChanges,
    ) -> Result<Option<Document>, DatabaseError> {
        let sql = format!(
            "UPDATE documents SET \
                name = COALESCE($2, name), \
                category_id = COALESCE($3, category_id), \
                sub_category_id = CASE WHEN $4 THEN $5 ELSE sub_category_id END, \
                description = CASE WHEN $6 THEN $7 ELSE description END, \
                tags = COALESCE($8, tags), \
                updated_at = now() \
             WHERE id = $1 RETURNING {}",
            DOCUMENT_COLUMNS
        );
        let document = sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .bind(&changes.name)
            .bind(changes.category_id)
            .bind(changes.sub_category_id.is_some())
            .bind(changes.sub_category_id.flatten())
            .bind(changes.description.is_some())
            .bind(changes.description.clone().flatten())
            .bind(&changes.tags)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(document)
    }

    pub async fn delete(&mut self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(
        &mut self,
        page: Pagination,
        filter: &DocumentFilter,
    ) -> Result<Vec<Document>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM documents WHERE {} ORDER BY created_at DESC, id DESC LIMIT $6 OFFSET $7",
            DOCUMENT_COLUMNS, DOCUMENT_FILTER
        );
        let documents = sqlx::query_as::<_, Document>(&sql)
            .bind(filter.category_id)
            .bind(filter.sub_category_id)
            .bind(filter.user_id)
            .bind(&filter.tag)
            .bind(&filter.search)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(documents)
    }

    pub async fn count(&mut self, filter: &DocumentFilter) -> Result<i64, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM documents WHERE {}", DOCUMENT_FILTER);
        let total = sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.category_id)
            .bind(filter.sub_category_id)
            .bind(filter.user_id)
            .bind(&filter.tag)
            .bind(&filter.search)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(total)
    }

    pub async fn count_by_sub_category(&mut self, sub_category_id: i32) -> Result<i64, DatabaseError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM documents WHERE sub_category_id = $1",
        )
        .bind(sub_category_id)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(total)
    }
}

#[derive(Debug, Clone)]
pub struct NewVersion {
    pub document_id: i32,
    pub document_name: String,
    pub version_number: i32,
    pub file_path: String,
    pub original_filename: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub checksum: String,
    pub created_by: i32,
}

pub struct VersionRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> VersionRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Insert as the current version. The caller clears the previous one first.
    pub async fn add(&mut self, new: &NewVersion) -> Result<VersionHistory, DatabaseError> {
        let sql = format!(
            "INSERT INTO version_histories (document_id, document_name, version_number, \
             current_version, file_path, original_filename, content_type, size_bytes, \
             checksum, created_by) \
             VALUES ($1, $2, $3, TRUE, $4, $5, $6, $7, $8, $9) RETURNING {}",
            VERSION_COLUMNS
        );
        let version = sqlx::query_as::<_, VersionHistory>(&sql)
            .bind(new.document_id)
            .bind(&new.document_name)
            .bind(new.version_number)
            .bind(&new.file_path)
            .bind(&new.original_filename)
            .bind(&new.content_type)
            .bind(new.size_bytes)
            .bind(&new.checksum)
            .bind(new.created_by)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(version)
    }

    pub async fn clear_current(&mut self, document_id: i32) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE version_histories SET current_version = FALSE, updated_at = now() \
             WHERE document_id = $1 AND current_version",
        )
        .bind(document_id)
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn next_version_number(&mut self, document_id: i32) -> Result<i32, DatabaseError> {
        let next = sqlx::query_scalar::<_, i32>(
            "SELECT COALESCE(MAX(version_number), 0) + 1 FROM version_histories \
             WHERE document_id = $1",
        )
        .bind(document_id)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(next)
    }

    pub async fn current(&mut self, document_id: i32) -> Result<Option<VersionHistory>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM version_histories WHERE document_id = $1 AND current_version",
            VERSION_COLUMNS
        );
        let version = sqlx::query_as::<_, VersionHistory>(&sql)
            .bind(document_id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(version)
    }

    /// Newest first
    pub async fn list_for_document(&mut self, document_id: i32) -> Result<Vec<VersionHistory>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM version_histories WHERE document_id = $1 \
             ORDER BY version_number DESC",
            VERSION_COLUMNS
        );
        let versions = sqlx::query_as::<_, VersionHistory>(&sql)
            .bind(document_id)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(versions)
    }
}

const HISTORY_COLUMNS: &str = "id, document_id, action, action_by, description, created_at, updated_at";

pub struct HistoryRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> HistoryRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn record(
        &mut self,
        document_id: Option<i32>,
        action: DocumentAction,
        action_by: i32,
        description: Option<String>,
    ) -> Result<DocumentHistory, DatabaseError> {
        let sql = format!(
            "INSERT INTO document_histories (document_id, action, action_by, description) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            HISTORY_COLUMNS
        );
        let entry = sqlx::query_as::<_, DocumentHistory>(&sql)
            .bind(document_id)
            .bind(action.as_str())
            .bind(action_by)
            .bind(description)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(entry)
    }

    pub async fn list_by_user(
        &mut self,
        user_id: i32,
        page: Pagination,
    ) -> Result<Vec<DocumentHistory>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM document_histories WHERE action_by = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
            HISTORY_COLUMNS
        );
        let entries = sqlx::query_as::<_, DocumentHistory>(&sql)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(entries)
    }

    pub async fn count_by_user(&mut self, user_id: i32) -> Result<i64, DatabaseError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM document_histories WHERE action_by = $1",
        )
        .bind(user_id)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(total)
    }

    pub async fn list_by_document(
        &mut self,
        document_id: i32,
        page: Pagination,
    ) -> Result<Vec<DocumentHistory>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM document_histories WHERE document_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
            HISTORY_COLUMNS
        );
        let entries = sqlx::query_as::<_, DocumentHistory>(&sql)
            .bind(document_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(entries)
    }

    pub async fn count_by_document(&mut self, document_id: i32) -> Result<i64, DatabaseError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM document_histories WHERE document_id = $1",
        )
        .bind(document_id)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(total)
    }
}

pub struct CommentRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> CommentRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn add(
        &mut self,
        document_id: i32,
        user_id: i32,
        comment: &str,
    ) -> Result<DocumentComment, DatabaseError> {
        let comment = sqlx::query_as::<_, DocumentComment>(
            "INSERT INTO document_comments (document_id, user_id, comment) VALUES ($1, $2, $3) \
             RETURNING id, document_id, user_id, comment, created_at, updated_at",
        )
        .bind(document_id)
        .bind(user_id)
        .bind(comment)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(comment)
    }

    /// Oldest first
    pub async fn list_for_document(&mut self, document_id: i32) -> Result<Vec<DocumentComment>, DatabaseError> {
        let comments = sqlx::query_as::<_, DocumentComment>(
            "SELECT id, document_id, user_id, comment, created_at, updated_at \
             FROM document_comments WHERE document_id = $1 ORDER BY created_at, id",
        )
        .bind(document_id)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(comments)
    }
}
