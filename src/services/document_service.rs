//! Documents, their stored versions, comments and audit history.
//!
//! Every mutation records a [`DocumentAction`] in `document_histories` inside
//! the same transaction as the change itself. Uploaded files are written
//! before the rows that reference them; when the transaction fails the file
//! is removed again.

use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{error, info};

use crate::api::{nullable, Page, Pagination};
use crate::auth::permissions::{
    is_authorized_owned, CAN_DELETE_DOCUMENT, CAN_DELETE_MY_DOCUMENT, CAN_EDIT_DOCUMENT,
    CAN_EDIT_MY_DOCUMENT, CAN_SHOW_DOCUMENT, CAN_SHOW_MY_DOCUMENT,
};
use crate::database::models::{Document, DocumentComment, DocumentHistory, VersionHistory};
use crate::database::repositories::{DocumentChanges, DocumentFilter, NewDocument, NewVersion};
use crate::database::UnitOfWork;
use crate::middleware::AuthUser;
use crate::services::{required_text, ServiceError};
use crate::storage::{FileStore, StoredFile, UploadedFile};
use crate::types::DocumentAction;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Fields of a new document, collected from the multipart form
#[derive(Debug, Clone, Default)]
pub struct DocumentFields {
    pub name: String,
    pub category_id: i32,
    pub sub_category_id: Option<i32>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Omitted fields are left alone; `null` clears `sub_category_id` and `description`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDocumentRequest {
    pub name: Option<String>,
    pub category_id: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub sub_category_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

/// `?category_id=&sub_category_id=&tag=&search=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentQuery {
    pub category_id: Option<i32>,
    pub sub_category_id: Option<i32>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

impl DocumentQuery {
    fn into_filter(self, user_id: Option<i32>) -> DocumentFilter {
        DocumentFilter {
            category_id: self.category_id,
            sub_category_id: self.sub_category_id,
            user_id,
            tag: self.tag.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            search: self.search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub document: Document,
    pub current_version: Option<VersionHistory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentRequest {
    pub comment: String,
}

/// Bytes of a stored version plus what to tell the client about them
#[derive(Debug, Clone)]
pub struct Download {
    pub bytes: Bytes,
    pub file_name: String,
    pub content_type: String,
}

/// Trim, drop blanks and duplicates, keep first-seen order
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

fn forbidden() -> ServiceError {
    ServiceError::Forbidden("You do not have permission to perform this action".to_string())
}

pub struct DocumentService {
    pool: PgPool,
    store: FileStore,
}

impl DocumentService {
    pub fn new(pool: PgPool, store: FileStore) -> Self {
        Self { pool, store }
    }

    /// Insert the document and, when a file is attached, its first version
    pub async fn create_document(
        &self,
        user: &AuthUser,
        fields: DocumentFields,
        file: Option<UploadedFile>,
    ) -> Result<DocumentDetail, ServiceError> {
        let new = NewDocument {
            name: required_text("name", &fields.name)?,
            user_id: user.id,
            category_id: fields.category_id,
            sub_category_id: fields.sub_category_id,
            description: fields.description.filter(|d| !d.trim().is_empty()),
            tags: normalize_tags(&fields.tags),
        };

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        check_classification(&mut uow, new.category_id, new.sub_category_id).await?;

        let stored = match &file {
            Some(upload) => Some(self.store.save(upload).await?),
            None => None,
        };

        let result = insert_document(uow, &new, stored.as_ref(), user.id).await;
        if result.is_err() {
            if let Some(stored) = &stored {
                self.discard(stored).await;
            }
        }

        let detail = result?;
        info!("User {} created document {}", user.id, detail.document.id);
        Ok(detail)
    }

    pub async fn update_document(
        &self,
        user: &AuthUser,
        id: i32,
        request: UpdateDocumentRequest,
    ) -> Result<Document, ServiceError> {
        let name = request
            .name
            .as_deref()
            .map(|n| required_text("name", n))
            .transpose()?;

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let existing = uow
            .documents()
            .get_for_update(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Document", id))?;

        if !is_authorized_owned(user, &[CAN_EDIT_DOCUMENT], &[CAN_EDIT_MY_DOCUMENT], existing.user_id) {
            return Err(forbidden());
        }

        if request.category_id.is_some() || request.sub_category_id.is_some() {
            let category_id = request.category_id.unwrap_or(existing.category_id);
            let sub_category_id = request.sub_category_id.unwrap_or(existing.sub_category_id);
            check_classification(&mut uow, category_id, sub_category_id).await?;
        }

        let changes = DocumentChanges {
            name,
            category_id: request.category_id,
            sub_category_id: request.sub_category_id,
            description: request
                .description
                .map(|d| d.filter(|d| !d.trim().is_empty())),
            tags: request.tags.map(normalize_tags),
        };
        let document = uow
            .documents()
            .update(id, &changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("Document", id))?;
        uow.history()
            .record(
                Some(id),
                DocumentAction::Updated,
                user.id,
                Some(format!("Updated document {}", document.name)),
            )
            .await?;
        uow.commit().await?;
        Ok(document)
    }

    /// Comments go with the document; versions and history stay with a null document
    pub async fn delete_document(&self, user: &AuthUser, id: i32) -> Result<(), ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let document = uow
            .documents()
            .get_for_update(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Document", id))?;

        if !is_authorized_owned(user, &[CAN_DELETE_DOCUMENT], &[CAN_DELETE_MY_DOCUMENT], document.user_id) {
            return Err(forbidden());
        }

        uow.history()
            .record(
                Some(id),
                DocumentAction::Deleted,
                user.id,
                Some(format!("Deleted document {}", document.name)),
            )
            .await?;
        uow.documents().delete(id).await?;
        uow.commit().await?;

        info!("User {} deleted document {}", user.id, id);
        Ok(())
    }

    pub async fn get_document(&self, user: &AuthUser, id: i32) -> Result<DocumentDetail, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let document = uow
            .documents()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Document", id))?;

        if !is_authorized_owned(user, &[CAN_SHOW_DOCUMENT], &[CAN_SHOW_MY_DOCUMENT], document.user_id) {
            return Err(forbidden());
        }

        let current_version = uow.versions().current(id).await?;
        Ok(DocumentDetail {
            document,
            current_version,
        })
    }

    pub async fn list_documents(
        &self,
        page: Pagination,
        query: DocumentQuery,
    ) -> Result<Page<Document>, ServiceError> {
        self.list(page, query.into_filter(None)).await
    }

    pub async fn list_my_documents(
        &self,
        user: &AuthUser,
        page: Pagination,
        query: DocumentQuery,
    ) -> Result<Page<Document>, ServiceError> {
        self.list(page, query.into_filter(Some(user.id))).await
    }

    async fn list(&self, page: Pagination, filter: DocumentFilter) -> Result<Page<Document>, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let total = uow.documents().count(&filter).await?;
        let documents = uow.documents().list(page, &filter).await?;
        Ok(Page::new(page, total, documents))
    }

    /// Store `file` as the new current version of document `id`.
    ///
    /// The document row stays locked until commit, so concurrent uploads to
    /// one document are applied one after another.
    pub async fn create_version(
        &self,
        user: &AuthUser,
        id: i32,
        file: UploadedFile,
    ) -> Result<VersionHistory, ServiceError> {
        if file.bytes.is_empty() {
            return Err(ServiceError::validation("file", "Must not be empty"));
        }

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let document = uow
            .documents()
            .get_for_update(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Document", id))?;

        let stored = self.store.save(&file).await?;

        let result = commit_version(uow, &document, &stored, user.id).await;
        if result.is_err() {
            self.discard(&stored).await;
        }

        let version = result?;
        info!(
            "User {} uploaded version {} of document {}",
            user.id, version.version_number, id
        );
        Ok(version)
    }

    /// Newest first
    pub async fn list_versions(&self, id: i32) -> Result<Vec<VersionHistory>, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        ensure_document(&mut uow, id).await?;
        Ok(uow.versions().list_for_document(id).await?)
    }

    pub async fn current_version(&self, id: i32) -> Result<VersionHistory, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        ensure_document(&mut uow, id).await?;
        uow.versions()
            .current(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Document {} has no file", id)))
    }

    pub async fn download_current(&self, id: i32) -> Result<Download, ServiceError> {
        let version = self.current_version(id).await?;

        let bytes = self.store.read(&version.file_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                error!("File for version {} is missing: {}", version.id, version.file_path);
                ServiceError::NotFound("File not found".to_string())
            } else {
                ServiceError::Storage(e)
            }
        })?;

        Ok(Download {
            bytes,
            file_name: version
                .original_filename
                .clone()
                .unwrap_or_else(|| format!("document-{}-v{}", id, version.version_number)),
            content_type: version
                .content_type
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        })
    }

    pub async fn create_comment(
        &self,
        user: &AuthUser,
        id: i32,
        request: CommentRequest,
    ) -> Result<DocumentComment, ServiceError> {
        let text = required_text("comment", &request.comment)?;

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        ensure_document(&mut uow, id).await?;
        let comment = uow.comments().add(id, user.id, &text).await?;
        uow.commit().await?;
        Ok(comment)
    }

    /// Oldest first
    pub async fn list_comments(&self, id: i32) -> Result<Vec<DocumentComment>, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        ensure_document(&mut uow, id).await?;
        Ok(uow.comments().list_for_document(id).await?)
    }

    /// Actions taken by `user_id`, newest first
    pub async fn history_by_user(
        &self,
        user_id: i32,
        page: Pagination,
    ) -> Result<Page<DocumentHistory>, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let total = uow.history().count_by_user(user_id).await?;
        let entries = uow.history().list_by_user(user_id, page).await?;
        Ok(Page::new(page, total, entries))
    }

    pub async fn history_by_document(
        &self,
        id: i32,
        page: Pagination,
    ) -> Result<Page<DocumentHistory>, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        ensure_document(&mut uow, id).await?;
        let total = uow.history().count_by_document(id).await?;
        let entries = uow.history().list_by_document(id, page).await?;
        Ok(Page::new(page, total, entries))
    }

    async fn discard(&self, stored: &StoredFile) {
        if let Err(e) = self.store.remove(&stored.path).await {
            error!("Failed to remove orphaned file {}: {}", stored.path, e);
        }
    }
}

async fn ensure_document(uow: &mut UnitOfWork, id: i32) -> Result<Document, ServiceError> {
    uow.documents()
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Document", id))
}

/// The category must exist and the sub-category, if any, must belong to it
async fn check_classification(
    uow: &mut UnitOfWork,
    category_id: i32,
    sub_category_id: Option<i32>,
) -> Result<(), ServiceError> {
    if uow.categories().get(category_id).await?.is_none() {
        return Err(ServiceError::validation("category_id", "Category does not exist"));
    }

    if let Some(sub_category_id) = sub_category_id {
        match uow.sub_categories().get(sub_category_id).await? {
            None => {
                return Err(ServiceError::validation(
                    "sub_category_id",
                    "Sub category does not exist",
                ))
            }
            Some(sub) if sub.category_id != category_id => {
                return Err(ServiceError::validation(
                    "sub_category_id",
                    "Sub category does not belong to the category",
                ))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

async fn insert_document(
    mut uow: UnitOfWork,
    new: &NewDocument,
    stored: Option<&StoredFile>,
    user_id: i32,
) -> Result<DocumentDetail, ServiceError> {
    let document = uow.documents().add(new).await?;
    let current_version = match stored {
        Some(stored) => Some(insert_version(&mut uow, &document, stored, user_id).await?),
        None => None,
    };
    uow.history()
        .record(
            Some(document.id),
            DocumentAction::Created,
            user_id,
            Some(format!("Created document {}", document.name)),
        )
        .await?;
    uow.commit().await?;

    Ok(DocumentDetail {
        document,
        current_version,
    })
}

async fn commit_version(
    mut uow: UnitOfWork,
    document: &Document,
    stored: &StoredFile,
    user_id: i32,
) -> Result<VersionHistory, ServiceError> {
    let version = insert_version(&mut uow, document, stored, user_id).await?;
    uow.history()
        .record(
            Some(document.id),
            DocumentAction::VersionUploaded,
            user_id,
            Some(format!("Uploaded version {}", version.version_number)),
        )
        .await?;
    uow.commit().await?;
    Ok(version)
}

/// Demote the current version and insert `stored` as the next one
async fn insert_version(
    uow: &mut UnitOfWork,
    document: &Document,
    stored: &StoredFile,
    user_id: i32,
) -> Result<VersionHistory, ServiceError> {
    uow.versions().clear_current(document.id).await?;
    let version_number = uow.versions().next_version_number(document.id).await?;

    let version = uow
        .versions()
        .add(&NewVersion {
            document_id: document.id,
            document_name: document.name.clone(),
            version_number,
            file_path: stored.path.clone(),
            original_filename: stored.file_name.clone(),
            content_type: stored.content_type.clone(),
            size_bytes: stored.size,
            checksum: stored.checksum.clone(),
            created_by: user_id,
        })
        .await?;
    Ok(version)
}
