//! Pagination state for list pages
//!
//! Every listing (public news, category pages, admin tables) keeps a
//! 1-indexed page number, a page size, and the total count reported by the
//! backend. Navigation helpers clamp into the valid page range.

use serde::Serialize;

/// Number of page links shown on each side of the current page
const PAGE_WINDOW: u32 = 2;

/// Pagination state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "PaginationView")]
pub struct Pagination {
    /// Current page (1-indexed)
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Total number of items across all pages
    pub total_count: u64,
}

impl Pagination {
    /// Create pagination state; page and limit are raised to at least 1
    pub fn new(page: u32, limit: u32, total_count: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            total_count,
        }
    }

    /// State before the count is known
    pub fn request(page: u32, limit: u32) -> Self {
        Self::new(page, limit, 0)
    }

    /// Same page and limit with the count the backend reported
    pub fn with_total(self, total_count: u64) -> Self {
        Self { total_count, ..self }
    }

    /// `ceil(total_count / limit)`
    pub fn total_pages(&self) -> u32 {
        let limit = u64::from(self.limit);
        let pages = self.total_count.div_ceil(limit);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Number of items to skip for the current page
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Highest reachable page (1 for an empty listing)
    pub fn last_page(&self) -> u32 {
        self.total_pages().max(1)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn next_page(&self) -> u32 {
        self.go_to_page(self.page.saturating_add(1))
    }

    pub fn prev_page(&self) -> u32 {
        self.go_to_page(self.page.saturating_sub(1))
    }

    /// Clamp a requested page into `1..=last_page`
    pub fn go_to_page(&self, page: u32) -> u32 {
        page.clamp(1, self.last_page())
    }

    /// Page links around the current page
    pub fn page_numbers(&self) -> Vec<u32> {
        let last = self.last_page();
        let current = self.go_to_page(self.page);
        let start = current.saturating_sub(PAGE_WINDOW).max(1);
        let end = current.saturating_add(PAGE_WINDOW).min(last);
        (start..=end).collect()
    }
}

/// Template-facing view of `Pagination`
#[derive(Debug, Serialize)]
struct PaginationView {
    page: u32,
    limit: u32,
    total_count: u64,
    total_pages: u32,
    has_next: bool,
    has_prev: bool,
    next_page: u32,
    prev_page: u32,
    pages: Vec<u32>,
}

impl From<Pagination> for PaginationView {
    fn from(p: Pagination) -> Self {
        Self {
            page: p.page,
            limit: p.limit,
            total_count: p.total_count,
            total_pages: p.total_pages(),
            has_next: p.has_next(),
            has_prev: p.has_prev(),
            next_page: p.next_page(),
            prev_page: p.prev_page(),
            pages: p.page_numbers(),
        }
    }
}

/// One page of items plus its pagination state
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paged<T> {
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self { items, pagination }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
