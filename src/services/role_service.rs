use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::api::{Page, Pagination};
use crate::auth::permissions::PERMISSIONS;
use crate::database::models::{Permission, RoleWithPermissions};
use crate::database::{DatabaseError, UnitOfWork};
use crate::services::{map_constraint, required_text, ServiceError};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    /// Replaces the whole permission set when present
    pub permissions: Option<Vec<String>>,
}

fn name_taken(err: DatabaseError, name: &str) -> ServiceError {
    if err.is_unique_violation("roles_name_key") {
        return ServiceError::Conflict(format!("Role with name: {} already exists", name));
    }
    err.into()
}

/// A role must keep at least one permission
fn check_permissions(permissions: &[String]) -> Result<(), ServiceError> {
    if permissions.is_empty() {
        return Err(ServiceError::validation(
            "permissions",
            "At least one permission is required",
        ));
    }
    Ok(())
}

pub struct RoleService {
    pool: PgPool,
}

impl RoleService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_permissions(&self) -> Result<Vec<Permission>, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        Ok(uow.permissions().list().await?)
    }

    /// Insert missing catalog entries; existing rows are left untouched
    pub async fn sync_permissions(&self) -> Result<u64, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let inserted = uow.permissions().sync(PERMISSIONS).await?;
        uow.commit().await?;

        if inserted > 0 {
            info!("Added {} permissions to the catalog", inserted);
        }
        Ok(inserted)
    }

    /// Permission names outside the catalog are ignored
    pub async fn create_role(&self, request: CreateRoleRequest) -> Result<RoleWithPermissions, ServiceError> {
        let name = required_text("name", &request.name)?;
        check_permissions(&request.permissions)?;

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let role = uow
            .roles()
            .add(&name)
            .await
            .map_err(|e| name_taken(e, &name))?;
        uow.roles().set_permissions(role.id, &request.permissions).await?;
        let created = uow
            .roles()
            .get(role.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Role", role.id))?;
        uow.commit().await?;

        info!("Created role {} with {} permissions", created.role.name, created.permissions.len());
        Ok(created)
    }

    pub async fn update_role(
        &self,
        id: i32,
        request: UpdateRoleRequest,
    ) -> Result<RoleWithPermissions, ServiceError> {
        let name = request
            .name
            .as_deref()
            .map(|n| required_text("name", n))
            .transpose()?;
        if let Some(permissions) = &request.permissions {
            check_permissions(permissions)?;
        }

        let mut uow = UnitOfWork::begin(&self.pool).await?;
        if !uow.roles().exists(id).await? {
            return Err(ServiceError::not_found("Role", id));
        }
        if let Some(name) = &name {
            uow.roles()
                .rename(id, name)
                .await
                .map_err(|e| name_taken(e, name))?;
        }
        if let Some(permissions) = &request.permissions {
            uow.roles().set_permissions(id, permissions).await?;
        }
        let updated = uow
            .roles()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Role", id))?;
        uow.commit().await?;
        Ok(updated)
    }

    pub async fn delete_role(&self, id: i32) -> Result<(), ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let deleted = uow.roles().delete(id).await.map_err(|e| {
            map_constraint(e, &[("users_role_id_fkey", || {
                ServiceError::Conflict(
                    "Cannot delete role because it is assigned to one or more users".to_string(),
                )
            })])
        })?;
        if !deleted {
            return Err(ServiceError::not_found("Role", id));
        }
        uow.commit().await?;

        info!("Deleted role {}", id);
        Ok(())
    }

    pub async fn get_role(&self, id: i32) -> Result<RoleWithPermissions, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let role = uow.roles().get(id).await?;
        role.ok_or_else(|| ServiceError::not_found("Role", id))
    }

    pub async fn list_roles(&self, page: Pagination) -> Result<Page<RoleWithPermissions>, ServiceError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let total = uow.roles().count().await?;
        let roles = uow.roles().list(page).await?;
        Ok(Page::new(page, total, roles))
    }
}
