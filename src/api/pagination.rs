use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::error::ApiError;

/// Raw `?page=&size=` query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// Validated, 1-based pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub size: i64,
}

impl PaginationParams {
    /// Apply defaults and limits. Pages start at 1; oversized pages are clamped.
    pub fn resolve(&self, api: &ApiConfig) -> Result<Pagination, ApiError> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(ApiError::field_error("page", "Must be greater than or equal to 1"));
        }

        let size = self.size.unwrap_or(api.default_page_size);
        if size < 1 {
            return Err(ApiError::field_error("size", "Must be greater than or equal to 1"));
        }

        let size = size.min(api.max_page_size);
        // the row offset must fit in a BIGINT
        if (page - 1).checked_mul(size).is_none() {
            return Err(ApiError::field_error("page", "Page number is too large"));
        }

        Ok(Pagination { page, size })
    }
}

impl Pagination {
    pub fn new(page: i64, size: i64) -> Self {
        Self { page, size }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.size
    }

    pub fn limit(&self) -> i64 {
        self.size
    }
}

/// Paged list envelope: `{ current, size, total, data }`
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub current: i64,
    pub size: i64,
    pub total: i64,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(pagination: Pagination, total: i64, data: Vec<T>) -> Self {
        Self {
            current: pagination.page,
            size: pagination.size,
            total,
            data,
        }
    }
}
