//! Page-number pagination over ordered sequences
//!
//! Page numbers are 1-based and clamped rather than rejected: a missing or
//! non-numeric page is page 1, anything past the end is the last page, and an
//! empty sequence still has one (empty) page.

use serde::Serialize;

/// Posts per page unless configured otherwise
pub const POSTS_ON_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: usize,
}

/// Resolved slice of a sequence, suitable for `LIMIT` / `OFFSET`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: usize,
    pub num_pages: usize,
    pub offset: usize,
    pub limit: usize,
}

/// One page of items plus navigation info
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub num_pages: usize,
    pub total: usize,
    pub per_page: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    fn new(items: Vec<T>, window: PageWindow, total: usize, per_page: usize) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            total,
            per_page,
            has_next: window.number < window.num_pages,
            has_previous: window.number > 1,
        }
    }

    pub fn next_page_number(&self) -> Option<usize> {
        self.has_next.then_some(self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<usize> {
        self.has_previous.then_some(self.number - 1)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(POSTS_ON_PAGE)
    }
}

impl Paginator {
    /// A zero page size is treated as one item per page
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn num_pages(&self, total: usize) -> usize {
        total.div_ceil(self.per_page).max(1)
    }

    /// Resolve a raw `?page=` value against a sequence of `total` items
    pub fn resolve(&self, raw_page: Option<&str>, total: usize) -> PageWindow {
        let num_pages = self.num_pages(total);
        let number = match raw_page.map(str::trim).and_then(parse_page_number) {
            Some(requested) => requested.clamp(1, num_pages),
            None => 1,
        };
        let offset = (number - 1) * self.per_page;

        PageWindow {
            number,
            num_pages,
            offset,
            limit: self.per_page.min(total.saturating_sub(offset)),
        }
    }

    /// Wrap items already fetched for `window`
    pub fn page_from_window<T>(&self, items: Vec<T>, window: PageWindow, total: usize) -> Page<T> {
        Page::new(items, window, total, self.per_page)
    }

    /// Slice an in-memory sequence
    pub fn paginate<T>(&self, items: Vec<T>, raw_page: Option<&str>) -> Page<T> {
        let total = items.len();
        let window = self.resolve(raw_page, total);
        let slice = items
            .into_iter()
            .skip(window.offset)
            .take(window.limit)
            .collect();
        Page::new(slice, window, total, self.per_page)
    }
}

/// Parse a page number; digit strings too large for `usize` saturate so they
/// still land on the last page
fn parse_page_number(raw: &str) -> Option<usize> {
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse::<usize>().unwrap_or(usize::MAX))
}
