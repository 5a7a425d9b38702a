pub mod extract;
pub mod pagination;

pub use extract::{nullable, ApiJson, ApiQuery, IdPath};
pub use pagination::{Page, Pagination, PaginationParams};
