use sqlx::{PgPool, Postgres, Transaction};

use crate::database::manager::DatabaseError;
use crate::database::repositories::{
    CategoryRepository, CommentRepository, DocumentRepository, HistoryRepository,
    PermissionRepository, RoleRepository, SubCategoryRepository, TagRepository, UserRepository,
    VersionRepository,
};

/// One database transaction shared by every repository handed out from it.
///
/// Dropping a unit of work without calling [`UnitOfWork::commit`] rolls the
/// transaction back.
pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl UnitOfWork {
    pub async fn begin(pool: &PgPool) -> Result<Self, DatabaseError> {
        let tx = pool.begin().await?;
        Ok(Self { tx })
    }

    pub async fn commit(self) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }

    pub fn users(&mut self) -> UserRepository<'_> {
        UserRepository::new(&mut self.tx)
    }

    pub fn roles(&mut self) -> RoleRepository<'_> {
        RoleRepository::new(&mut self.tx)
    }

    pub fn permissions(&mut self) -> PermissionRepository<'_> {
        PermissionRepository::new(&mut self.tx)
    }

    pub fn categories(&mut self) -> CategoryRepository<'_> {
        CategoryRepository::new(&mut self.tx)
    }

    pub fn sub_categories(&mut self) -> SubCategoryRepository<'_> {
        SubCategoryRepository::new(&mut self.tx)
    }

    pub fn tags(&mut self) -> TagRepository<'_> {
        TagRepository::new(&mut self.tx)
    }

    pub fn documents(&mut self) -> DocumentRepository<'_> {
        DocumentRepository::new(&mut self.tx)
    }

    pub fn versions(&mut self) -> VersionRepository<'_> {
        VersionRepository::new(&mut self.tx)
    }

    pub fn history(&mut self) -> HistoryRepository<'_> {
        HistoryRepository::new(&mut self.tx)
    }

    pub fn comments(&mut self) -> CommentRepository<'_> {
        CommentRepository::new(&mut self.tx)
    }
}
