use serde::{Deserialize, Serialize};

use crate::errors::{ServiceError, ServiceResult};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const DEFAULT_COMMENT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Highest page index whose row offset stays within a signed 64-bit `OFFSET`.
pub const MAX_PAGE_INDEX: u64 = i64::MAX as u64 / MAX_PAGE_SIZE;

/// Zero-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
}

impl PageRequest {
    pub fn new(page: u64, size: u64) -> Self {
        Self { page: page.min(MAX_PAGE_INDEX), size: size.clamp(1, MAX_PAGE_SIZE) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArticleSort {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    ViewCount,
}

impl ArticleSort {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "createdAt" | "created_at" => Some(ArticleSort::CreatedAt),
            "updatedAt" | "updated_at" => Some(ArticleSort::UpdatedAt),
            "title" => Some(ArticleSort::Title),
            "viewCount" | "view_count" => Some(ArticleSort::ViewCount),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArticlePageRequest {
    pub window: PageRequest,
    pub sort: ArticleSort,
    pub descending: bool,
}

impl ArticlePageRequest {
    pub fn new(page: u64, size: u64) -> Self {
        Self { window: PageRequest::new(page, size), sort: ArticleSort::CreatedAt, descending: false }
    }
}

impl Default for ArticlePageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// Query string: `?page=0&size=10&sort=createdAt&direction=asc`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub size: Option<u64>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

impl PageParams {
    pub fn window(&self, default_size: u64) -> ServiceResult<PageRequest> {
        let page = self.page.unwrap_or(0);
        if page > MAX_PAGE_INDEX {
            return Err(ServiceError::bad_request(
                "INVALID_PAGE",
                format!("Page must be at most {}", MAX_PAGE_INDEX),
            ));
        }
        Ok(PageRequest::new(page, self.size.unwrap_or(default_size)))
    }

    pub fn article_request(&self) -> ServiceResult<ArticlePageRequest> {
        let sort = match self.sort.as_deref() {
            None => ArticleSort::default(),
            Some(raw) => ArticleSort::parse(raw).ok_or_else(|| {
                ServiceError::bad_request("INVALID_SORT", format!("Cannot sort articles by '{}'", raw))
            })?,
        };
        let descending = match self.direction.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => false,
            Some("desc") => true,
            Some(other) => {
                return Err(ServiceError::bad_request(
                    "INVALID_SORT",
                    format!("Sort direction must be 'asc' or 'desc', got '{}'", other),
                ))
            }
        };
        Ok(ArticlePageRequest { window: self.window(DEFAULT_PAGE_SIZE)?, sort, descending })
    }
}

#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub total: u64,
    pub page: u64,
    pub size: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, window: PageRequest, total: u64) -> Self {
        Self {
            data,
            meta: PaginationMeta {
                total,
                page: window.page,
                size: window.size,
                total_pages: total.div_ceil(window.size),
            },
        }
    }
}
