//! HTTP handlers: public pages, the manage console, and the JSON APIs.

pub mod blogs;
pub mod comments;
pub mod pages;
pub mod users;

use crate::sql::Limit;
use serde::Serialize;

pub const PAGE_SIZE: i64 = 10;

/// Pagination over a known item count: offset/limit for the query plus
/// previous/next flags for templates and API clients.
#[derive(Clone, Debug, Serialize)]
pub struct Page {
    pub item_count: i64,
    pub page_index: i64,
    pub page_size: i64,
    pub page_count: i64,
    pub offset: i64,
    pub limit: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Page {
    /// An out-of-range index falls back to the first page.
    pub fn new(item_count: i64, page_index: i64) -> Self {
        let page_size = PAGE_SIZE;
        let page_count = item_count / page_size + if item_count % page_size > 0 { 1 } else { 0 };
        let (page_index, offset) = if item_count == 0 || page_index > page_count {
            (1, 0)
        } else {
            (page_index, page_size * (page_index - 1))
        };
        Page {
            item_count,
            page_index,
            page_size,
            page_count,
            offset,
            limit: page_size,
            has_next: page_index < page_count,
            has_previous: page_index > 1,
        }
    }

    pub fn limit(&self) -> Limit {
        Limit::OffsetCount(self.offset as u32, self.limit as u32)
    }
}

/// Page index from an optional query value; anything unusable means page 1.
pub fn page_index_from(value: Option<&str>) -> i64 {
    value
        .and_then(|s| s.parse().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(1)
}
