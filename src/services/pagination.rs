use sea_orm::{EntityTrait, QuerySelect};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// A requested page, already clamped to sane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn new(
        page: Option<u64>,
        page_size: Option<u64>,
        default_page_size: u64,
        max_page_size: u64,
    ) -> Self {
        let max_page_size = max_page_size.max(1);
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(default_page_size)
                .clamp(1, max_page_size),
        }
    }

    /// Saturates instead of overflowing for absurdly large pages.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Whether the page lies past the last one of `total_count` items.
    /// The first page always exists, even when empty.
    pub fn is_past_end(&self, total_count: u64) -> bool {
        self.page > 1 && self.offset() >= total_count
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }
}

pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> PaginatedResult<T> {
    /// Number of pages; an empty result still has one (empty) page.
    pub fn num_pages(&self) -> u64 {
        self.total_count.div_ceil(self.page_size).max(1)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Apply limit/offset for the requested page.
pub fn apply_pagination<T: EntityTrait>(
    query: sea_orm::Select<T>,
    request: &PageRequest,
) -> sea_orm::Select<T> {
    query.limit(request.page_size).offset(request.offset())
}
