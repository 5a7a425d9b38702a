pub mod category;
pub mod document;
pub mod role;
pub mod tag;
pub mod user;

pub use category::{Category, SubCategory};
pub use document::{Document, DocumentComment, DocumentHistory, VersionHistory};
pub use role::{Permission, Role, RoleWithPermissions};
pub use tag::Tag;
pub use user::{User, UserWithPermissions};
