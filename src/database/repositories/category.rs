use sqlx::PgConnection;

use crate::api::Pagination;
use crate::database::manager::DatabaseError;
use crate::database::models::{Category, SubCategory};

pub struct CategoryRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> CategoryRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&mut self, id: i32) -> Result<Option<Category>, DatabaseError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, title, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(category)
    }

    pub async fn add(&mut self, title: &str) -> Result<Category, DatabaseError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (title) VALUES ($1) \
             RETURNING id, title, created_at, updated_at",
        )
        .bind(title)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(category)
    }

    pub async fn update(&mut self, id: i32, title: &str) -> Result<Option<Category>, DatabaseError> {
        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories SET title = $2, updated_at = now() WHERE id = $1 \
             RETURNING id, title, created_at, updated_at",
        )
        .bind(id)
        .bind(title)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(category)
    }

    pub async fn delete(&mut self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&mut self, page: Pagination) -> Result<Vec<Category>, DatabaseError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, title, created_at, updated_at FROM categories \
             ORDER BY title LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(categories)
    }

    pub async fn count(&mut self) -> Result<i64, DatabaseError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(total)
    }
}

pub struct SubCategoryRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> SubCategoryRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&mut self, id: i32) -> Result<Option<SubCategory>, DatabaseError> {
        let sub_category = sqlx::query_as::<_, SubCategory>(
            "SELECT id, title, category_id, created_at, updated_at \
             FROM sub_categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(sub_category)
    }

    pub async fn add(&mut self, title: &str, category_id: i32) -> Result<SubCategory, DatabaseError> {
        let sub_category = sqlx::query_as::<_, SubCategory>(
            "INSERT INTO sub_categories (title, category_id) VALUES ($1, $2) \
             RETURNING id, title, category_id, created_at, updated_at",
        )
        .bind(title)
        .bind(category_id)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(sub_category)
    }

    pub async fn update(
        &mut self,
        id: i32,
        title: Option<&str>,
        category_id: Option<i32>,
    ) -> Result<Option<SubCategory>, DatabaseError> {
        let sub_category = sqlx::query_as::<_, SubCategory>(
            "UPDATE sub_categories SET \
                title = COALESCE($2, title), \
                category_id = COALESCE($3, category_id), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING id, title, category_id, created_at, updated_at",
        )
        .bind(id)
        .bind(title)
        .bind(category_id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(sub_category)
    }

    pub async fn delete(&mut self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM sub_categories WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(
        &mut self,
        page: Pagination,
        category_id: Option<i32>,
    ) -> Result<Vec<SubCategory>, DatabaseError> {
        let sub_categories = sqlx::query_as::<_, SubCategory>(
            "SELECT id, title, category_id, created_at, updated_at FROM sub_categories \
             WHERE ($1::int IS NULL OR category_id = $1) \
             ORDER BY title LIMIT $2 OFFSET $3",
        )
        .bind(category_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(sub_categories)
    }

    pub async fn count(&mut self, category_id: Option<i32>) -> Result<i64, DatabaseError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sub_categories WHERE ($1::int IS NULL OR category_id = $1)",
        )
        .bind(category_id)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(total)
    }

    pub async fn list_for_category(&mut self, category_id: i32) -> Result<Vec<SubCategory>, DatabaseError> {
        let sub_categories = sqlx::query_as::<_, SubCategory>(
            "SELECT id, title, category_id, created_at, updated_at FROM sub_categories \
             WHERE category_id = $1 ORDER BY title",
        )
        .bind(category_id)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(sub_categories)
    }
}
