use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use crate::api::{Page, Pagination};
use crate::database::models::{Category, SubCategory};
use crate::database::{DatabaseError, UnitOfWork};
use crate::services::{map_constraint, required_text, ServiceError};

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRequest {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubCategoryRequest {
    pub title: String,
    pub category_id: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSubCategoryRequest {
    pub title: Option<String>,
    pub category_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub sub_categories: Vec<SubCategory>,
}

fn category_write_error(err: DatabaseError, title: &str) -> ServiceError {
    if err.is_unique_violation("categories_title_key") {
        return ServiceError::Conflict(format!("Category with title: {} already exists", title));
    }
    err.into()
}

fn sub_category_write_error(err: DatabaseError, title: &str) -> ServiceError {
    if err.is_unique_violation("sub_categories_title_key") {
        return ServiceError::Conflict(format!(
            "Sub category with title: {} already exists",
            title
        ));
    }
    map_constraint(err, &[("sub_categories_category_id_fkey", || {
        ServiceError::validation("category_id", "Category does not exist")
    })])
}

fn sub_category_in_use(action: &str) -> ServiceError {
    ServiceError::Conflict(format!(
        "Cannot {} sub category because it is used by documents",
        action
    ))
}

/// Covers a document added between the usage count and the delete
fn sub_category_delete_error(err: DatabaseError) -> ServiceError {
    map_constraint(err, &[("documents_sub_category_id_fkey", || {
        sub_category_in_use("delete")
    })])
}

pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_category(&self, request: CategoryRequest) -> Result<Category, ServiceError> {
        let title = required_text("title", &request.title)?;

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let category = uow
            .categories()
            .add(&title)
            .await
            .map_err(|e| category_write_error(e, &title))?;
        uow.commit().await?;

        info!("Created category {} ({})", category.id, category.title);
        Ok(category)
    }

    pub async fn list_categories(&self, page: Pagination) -> Result<Page<Category>, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let total = uow.categories().count().await?;
        let categories = uow.categories().list(page).await?;
        Ok(Page::new(page, total, categories))
    }

    pub async fn get_category(&self, id: i32) -> Result<CategoryDetail, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let category = uow
            .categories()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Category", id))?;
        let sub_categories = uow.sub_categories().list_for_category(id).await?;
        Ok(CategoryDetail {
            category,
            sub_categories,
        })
    }

    pub async fn update_category(&self, id: i32, request: CategoryRequest) -> Result<Category, ServiceError> {
        let title = required_text("title", &request.title)?;

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let category = uow
            .categories()
            .update(id, &title)
            .await
            .map_err(|e| category_write_error(e, &title))?
            .ok_or_else(|| ServiceError::not_found("Category", id))?;
        uow.commit().await?;
        Ok(category)
    }

    /// Refused while sub-categories or documents reference the category
    pub async fn delete_category(&self, id: i32) -> Result<(), ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let deleted = uow.categories().delete(id).await.map_err(|e| {
            map_constraint(
                e,
                &[
                    ("sub_categories_category_id_fkey", || {
                        ServiceError::Conflict(
                            "Cannot delete category because it has sub categories".to_string(),
                        )
                    }),
                    ("documents_category_id_fkey", || {
                        ServiceError::Conflict(
                            "Cannot delete category because it is used by documents".to_string(),
                        )
                    }),
                ],
            )
        })?;
        if !deleted {
            return Err(ServiceError::not_found("Category", id));
        }
        uow.commit().await?;

        info!("Deleted category {}", id);
        Ok(())
    }

    pub async fn create_sub_category(
        &self,
        request: CreateSubCategoryRequest,
    ) -> Result<SubCategory, ServiceError> {
        let title = required_text("title", &request.title)?;

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let sub_category = uow
            .sub_categories()
            .add(&title, request.category_id)
            .await
            .map_err(|e| sub_category_write_error(e, &title))?;
        uow.commit().await?;

        info!("Created sub category {} ({})", sub_category.id, sub_category.title);
        Ok(sub_category)
    }

    pub async fn list_sub_categories(
        &self,
        page: Pagination,
        category_id: Option<i32>,
    ) -> Result<Page<SubCategory>, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let total = uow.sub_categories().count(category_id).await?;
        let sub_categories = uow.sub_categories().list(page, category_id).await?;
        Ok(Page::new(page, total, sub_categories))
    }

    pub async fn update_sub_category(
        &self,
        id: i32,
        request: UpdateSubCategoryRequest,
    ) -> Result<SubCategory, ServiceError> {
        let title = request
            .title
            .as_deref()
            .map(|t| required_text("title", t))
            .transpose()?;

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        if let Some(category_id) = request.category_id {
            let current = uow
                .sub_categories()
                .get(id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Sub category", id))?;
            // documents keep their category, so they would point at a foreign sub category
            if current.category_id != category_id
                && uow.documents().count_by_sub_category(id).await? > 0
            {
                return Err(sub_category_in_use("move"));
            }
        }
        let sub_category = uow
            .sub_categories()
            .update(id, title.as_deref(), request.category_id)
            .await
            .map_err(|e| sub_category_write_error(e, title.as_deref().unwrap_or_default()))?
            .ok_or_else(|| ServiceError::not_found("Sub category", id))?;
        uow.commit().await?;
        Ok(sub_category)
    }

    pub async fn delete_sub_category(&self, id: i32) -> Result<(), ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        if uow.documents().count_by_sub_category(id).await? > 0 {
            return Err(sub_category_in_use("delete"));
        }
        let deleted = uow
            .sub_categories()
            .delete(id)
            .await
            .map_err(sub_category_delete_error)?;
        if !deleted {
            return Err(ServiceError::not_found("Sub category", id));
        }
        uow.commit().await?;

        info!("Deleted sub category {}", id);
        Ok(())
    }
}
