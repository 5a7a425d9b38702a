use sqlx::PgConnection;

use crate::api::Pagination;
use crate::database::manager::DatabaseError;
use crate::database::models::{Permission, Role, RoleWithPermissions};

const ROLE_WITH_PERMISSIONS: &str = r#"
    SELECT r.id, r.name, r.created_at, r.updated_at,
           ARRAY(
               SELECT p.name::text
               FROM roles_permissions rp
               JOIN permissions p ON p.id = rp.permission_id
               WHERE rp.role_id = r.id
               ORDER BY p.name
           ) AS permissions
    FROM roles r
"#;

pub struct RoleRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> RoleRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&mut self, id: i32) -> Result<Option<RoleWithPermissions>, DatabaseError> {
        let sql = format!("{} WHERE r.id = $1", ROLE_WITH_PERMISSIONS);
        let role = sqlx::query_as::<_, RoleWithPermissions>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(role)
    }

    pub async fn exists(&mut self, id: i32) -> Result<bool, DatabaseError> {
        let found = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM roles WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(found)
    }

    pub async fn add(&mut self, name: &str) -> Result<Role, DatabaseError> {
        let role = sqlx::query_as::<_, Role>(
            "INSERT INTO roles (name) VALUES ($1) RETURNING id, name, created_at, updated_at",
        )
        .bind(name)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(role)
    }

    pub async fn rename(&mut self, id: i32, name: &str) -> Result<Option<Role>, DatabaseError> {
        let role = sqlx::query_as::<_, Role>(
            "UPDATE roles SET name = $2, updated_at = now() WHERE id = $1 \
             RETURNING id, name, created_at, updated_at",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(role)
    }

    pub async fn delete(&mut self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the role's permission links. Names missing from the catalog are skipped.
    pub async fn set_permissions(
        &mut self,
        role_id: i32,
        names: &[String],
    ) -> Result<u64, DatabaseError> {
        sqlx::query("DELETE FROM roles_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *self.conn)
            .await?;

        let result = sqlx::query(
            "INSERT INTO roles_permissions (role_id, permission_id) \
             SELECT $1, id FROM permissions WHERE name = ANY($2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(role_id)
        .bind(names)
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn list(&mut self, page: Pagination) -> Result<Vec<RoleWithPermissions>, DatabaseError> {
        let sql = format!("{} ORDER BY r.name LIMIT $1 OFFSET $2", ROLE_WITH_PERMISSIONS);
        let roles = sqlx::query_as::<_, RoleWithPermissions>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(roles)
    }

    pub async fn count(&mut self) -> Result<i64, DatabaseError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM roles")
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(total)
    }
}

pub struct PermissionRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PermissionRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&mut self) -> Result<Vec<Permission>, DatabaseError> {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT id, name, label, created_at, updated_at FROM permissions ORDER BY id",
        )
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(permissions)
    }

    /// Insert catalog entries that are not present yet; returns how many were added
    pub async fn sync(&mut self, catalog: &[(&str, &str)]) -> Result<u64, DatabaseError> {
        let mut inserted = 0;
        for (name, label) in catalog {
            let result = sqlx::query(
                "INSERT INTO permissions (name, label) VALUES ($1, $2) \
                 ON CONFLICT (name) DO NOTHING",
            )
            .bind(*name)
            .bind(*label)
            .execute(&mut *self.conn)
            .await?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }
}
