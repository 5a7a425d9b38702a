use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::api::{Page, Pagination};
use crate::database::models::Tag;
use crate::database::{DatabaseError, UnitOfWork};
use crate::services::{required_text, ServiceError};

#[derive(Debug, Clone, Deserialize)]
pub struct TagRequest {
    pub title: String,
}

fn title_taken(err: DatabaseError, title: &str) -> ServiceError {
    if err.is_unique_violation("tags_title_key") {
        return ServiceError::Conflict(format!("Tag with title: {} already exists", title));
    }
    err.into()
}

pub struct TagService {
    pool: PgPool,
}

impl TagService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_tag(&self, request: TagRequest) -> Result<Tag, ServiceError> {
        let title = required_text("title", &request.title)?;

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let tag = uow
            .tags()
            .add(&title)
            .await
            .map_err(|e| title_taken(e, &title))?;
        uow.commit().await?;

        info!("Created tag {} ({})", tag.id, tag.title);
        Ok(tag)
    }

    pub async fn list_tags(&self, page: Pagination) -> Result<Page<Tag>, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let total = uow.tags().count().await?;
        let tags = uow.tags().list(page).await?;
        Ok(Page::new(page, total, tags))
    }

    pub async fn get_tag(&self, id: i32) -> Result<Tag, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let tag = uow.tags().get(id).await?;
        tag.ok_or_else(|| ServiceError::not_found("Tag", id))
    }

    pub async fn update_tag(&self, id: i32, request: TagRequest) -> Result<Tag, ServiceError> {
        let title = required_text("title", &request.title)?;

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let tag = uow
            .tags()
            .update(id, &title)
            .await
            .map_err(|e| title_taken(e, &title))?
            .ok_or_else(|| ServiceError::not_found("Tag", id))?;
        uow.commit().await?;
        Ok(tag)
    }

    pub async fn delete_tag(&self, id: i32) -> Result<(), ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        if !uow.tags().delete(id).await? {
            return Err(ServiceError::not_found("Tag", id));
        }
        uow.commit().await?;

        info!("Deleted tag {}", id);
        Ok(())
    }
}
