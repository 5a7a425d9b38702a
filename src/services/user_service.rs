use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::api::{Page, Pagination};
use crate::auth::password::hash_password;
use crate::database::models::{User, UserWithPermissions};
use crate::database::repositories::{NewUser, UserChanges};
use crate::database::{DatabaseError, UnitOfWork};
use crate::services::{check_password_length, map_constraint, normalize_email, ServiceError};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub role_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub role_id: Option<i32>,
    pub is_active: Option<bool>,
    pub avatar: Option<String>,
}

fn email_taken(email: &str) -> ServiceError {
    ServiceError::Conflict(format!("User with email: {} already exists", email))
}

fn write_error(err: DatabaseError, email: &str) -> ServiceError {
    if err.is_unique_violation("users_email_key") {
        return email_taken(email);
    }
    map_constraint(err, &[("users_role_id_fkey", || {
        ServiceError::validation("role_id", "Role does not exist")
    })])
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, ServiceError> {
        let email = normalize_email(&request.email)?;
        check_password_length(&request.password)?;

        let new = NewUser {
            role_id: request.role_id,
            first_name: request.first_name,
            last_name: request.last_name,
            email,
            password_hash: hash_password(&request.password).await?,
            phone_number: request.phone_number,
            is_superuser: false,
            is_admin: false,
        };
        self.insert(new).await
    }

    /// Active admin account with every permission; used by the admin CLI
    pub async fn create_superuser(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let email = normalize_email(email)?;
        check_password_length(password)?;

        let new = NewUser {
            role_id: None,
            first_name: None,
            last_name: None,
            email,
            password_hash: hash_password(password).await?,
            phone_number: None,
            is_superuser: true,
            is_admin: true,
        };
        self.insert(new).await
    }

    async fn insert(&self, new: NewUser) -> Result<User, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let user = uow
            .users()
            .add(&new)
            .await
            .map_err(|e| write_error(e, &new.email))?;
        uow.commit().await?;

        info!("Created user {} ({})", user.id, user.email);
        Ok(user)
    }

    pub async fn update_user(&self, id: i32, request: UpdateUserRequest) -> Result<User, ServiceError> {
        let email = request.email.as_deref().map(normalize_email).transpose()?;
        let password_hash = match request.password.as_deref() {
            Some(password) => {
                check_password_length(password)?;
                Some(hash_password(password).await?)
            }
            None => None,
        };

        let changes = UserChanges {
            role_id: request.role_id,
            first_name: request.first_name,
            last_name: request.last_name,
            email,
            password_hash,
            phone_number: request.phone_number,
            is_active: request.is_active,
            avatar: request.avatar,
        };

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let updated = uow
            .users()
            .update(id, &changes)
            .await
            .map_err(|e| write_error(e, changes.email.as_deref().unwrap_or_default()))?;
        let user = updated.ok_or_else(|| ServiceError::not_found("User", id))?;
        uow.commit().await?;
        Ok(user)
    }

    pub async fn get_user(&self, id: i32) -> Result<User, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let user = uow.users().get(id).await?;
        user.ok_or_else(|| ServiceError::not_found("User", id))
    }

    /// Lookup for login; carries the role name and the role's permission names
    pub async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserWithPermissions>, ServiceError> {
        let email = normalize_email(email)?;
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        Ok(uow.users().get_with_permissions_by_email(&email).await?)
    }

    pub async fn list_users(&self, page: Pagination) -> Result<Page<User>, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let total = uow.users().count().await?;
        let users = uow.users().list(page).await?;
        Ok(Page::new(page, total, users))
    }

    /// Users that still own documents, versions, history or comments cannot be removed
    pub async fn delete_user(&self, actor_id: i32, id: i32) -> Result<(), ServiceError> {
        if actor_id == id {
            return Err(ServiceError::BadRequest(
                "You cannot delete your own account".to_string(),
            ));
        }

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let deleted = uow.users().delete(id).await.map_err(|e| match e {
            DatabaseError::ForeignKeyViolation { .. } => ServiceError::Conflict(
                "Cannot delete user because they still own documents or history".to_string(),
            ),
            other => other.into(),
        })?;
        if !deleted {
            return Err(ServiceError::not_found("User", id));
        }
        uow.commit().await?;

        info!("Deleted user {}", id);
        Ok(())
    }
}
