use sqlx::PgConnection;

use crate::api::Pagination;
use crate::database::manager::DatabaseError;
use crate::database::models::Tag;

pub struct TagRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> TagRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&mut self, id: i32) -> Result<Option<Tag>, DatabaseError> {
        let tag = sqlx::query_as::<_, Tag>(
            "SELECT id, title, created_at, updated_at FROM tags WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(tag)
    }

    pub async fn add(&mut self, title: &str) -> Result<Tag, DatabaseError> {
        let tag = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (title) VALUES ($1) RETURNING id, title, created_at, updated_at",
        )
        .bind(title)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(tag)
    }

    pub async fn update(&mut self, id: i32, title: &str) -> Result<Option<Tag>, DatabaseError> {
        let tag = sqlx::query_as::<_, Tag>(
            "UPDATE tags SET title = $2, updated_at = now() WHERE id = $1 \
             RETURNING id, title, created_at, updated_at",
        )
        .bind(id)
        .bind(title)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(tag)
    }

    pub async fn delete(&mut self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&mut self, page: Pagination) -> Result<Vec<Tag>, DatabaseError> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, title, created_at, updated_at FROM tags \
             ORDER BY title LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(tags)
    }

    pub async fn count(&mut self) -> Result<i64, DatabaseError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tags")
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(total)
    }
}
