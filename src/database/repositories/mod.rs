//! Table-level data access. Each repository borrows the connection of the
//! [`UnitOfWork`](crate::database::UnitOfWork) that created it.

pub mod category;
pub mod document;
pub mod role;
pub mod tag;
pub mod user;

pub use category::{CategoryRepository, SubCategoryRepository};
pub use document::{
    CommentRepository, DocumentChanges, DocumentFilter, DocumentRepository, HistoryRepository,
    NewDocument, NewVersion, VersionRepository,
};
pub use role::{PermissionRepository, RoleRepository};
pub use tag::TagRepository;
pub use user::{NewUser, UserChanges, UserRepository};
