use serde::{Deserialize, Serialize};

/// `limit`/`offset` query parameters accepted by every list endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl PageParams {
    pub fn limit_or(&self, default: usize, max: usize) -> usize {
        self.limit.unwrap_or(default).min(max)
    }

    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

/// Uniform list envelope: `{items, total, limit, offset}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl<T> Page<T> {
    /// Slice a fully materialized result set into one page.
    pub fn slice(mut items: Vec<T>, params: PageParams, default_limit: usize, max_limit: usize) -> Self {
        let total = items.len();
        let limit = params.limit_or(default_limit, max_limit);
        let offset = params.offset().min(total);
        let mut page: Vec<T> = items.drain(offset..).collect();
        page.truncate(limit);
        Self {
            items: page,
            total,
            limit,
            offset,
        }
    }
}
