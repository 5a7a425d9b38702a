use sqlx::PgConnection;

use crate::api::Pagination;
use crate::database::manager::DatabaseError;
use crate::database::models::{User, UserWithPermissions};

const USER_COLUMNS: &str = "id, role_id, first_name, last_name, email, password, phone_number, \
     is_active, is_superuser, is_admin, avatar, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct NewUser {
    pub role_id: Option<i32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub is_superuser: bool,
    pub is_admin: bool,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub role_id: Option<i32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: Option<bool>,
    pub avatar: Option<String>,
}

pub struct UserRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> UserRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&mut self, id: i32) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(user)
    }

    /// User with role name and the role's permission names, for token issuing
    pub async fn get_with_permissions_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<UserWithPermissions>, DatabaseError> {
        let user = sqlx::query_as::<_, UserWithPermissions>(
            r#"
            SELECT u.id, u.role_id, u.first_name, u.last_name, u.email, u.password,
                   u.phone_number, u.is_active, u.is_superuser, u.is_admin, u.avatar,
                   u.created_at, u.updated_at,
                   r.name::text AS role_name,
                   ARRAY(
                       SELECT p.name::text
                       FROM roles_permissions rp
                       JOIN permissions p ON p.id = rp.permission_id
                       WHERE rp.role_id = u.role_id
                       ORDER BY p.name
                   ) AS permissions
            FROM users u
            LEFT JOIN roles r ON r.id = u.role_id
            WHERE u.email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(user)
    }

    pub async fn add(&mut self, new: &NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (role_id, first_name, last_name, email, password, phone_number, \
             is_active, is_superuser, is_admin) \
             VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $8) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(new.role_id)
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(&new.phone_number)
            .bind(new.is_superuser)
            .bind(new.is_admin)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(user)
    }

    pub async fn update(
        &mut self,
        id: i32,
        changes: &UserChanges,
    ) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "UPDATE users SET \
                role_id = COALESCE($2, role_id), \
                first_name = COALESCE($3, first_name), \
                last_name = COALESCE($4, last_name), \
                email = COALESCE($5, email), \
                password = COALESCE($6, password), \
                phone_number = COALESCE($7, phone_number), \
                is_active = COALESCE($8, is_active), \
                avatar = COALESCE($9, avatar), \
                updated_at = now() \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.role_id)
            .bind(&changes.first_name)
            .bind(&changes.last_name)
            .bind(&changes.email)
            .bind(&changes.password_hash)
            .bind(&changes.phone_number)
            .bind(changes.is_active)
            .bind(&changes.avatar)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(user)
    }

    pub async fn delete(&mut self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&mut self, page: Pagination) -> Result<Vec<User>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(users)
    }

    pub async fn count(&mut self) -> Result<i64, DatabaseError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(total)
    }
}
