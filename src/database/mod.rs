pub mod manager;
pub mod models;
pub mod repositories;
pub mod uow;

pub use manager::{DatabaseError, DatabaseManager};
pub use uow::UnitOfWork;
