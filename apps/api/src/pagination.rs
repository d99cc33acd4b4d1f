//! Page arithmetic over an in-memory slice.
//!
//! `paginate` is total: every input is clamped, nothing fails. `Paginator` keeps
//! the current page and page size between calls the way a list screen does.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE_OPTIONS: &[usize] = &[10, 20, 50, 100];

/// The visible slice plus everything a pager control needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub visible_items: Vec<T>,
    pub current_page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    /// 1-based index of the first visible item, 0 when there are no items.
    pub start_index: usize,
    /// 1-based index of the last visible item, 0 when there are no items.
    pub end_index: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// `ceil(total_items / page_size)`; zero items means zero pages.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1))
}

/// Clamps a requested page into `[1, max(total_pages, 1)]`.
pub fn clamp_page(requested: i64, total_pages: usize) -> usize {
    let upper = i64::try_from(total_pages.max(1)).unwrap_or(i64::MAX);
    // clamp keeps the value in 1..=upper, so the cast back cannot truncate
    requested.clamp(1, upper) as usize
}

/// Picks the effective page size. Zero becomes one; a size outside a non-empty
/// choice list falls back to the first choice.
pub fn resolve_page_size(requested: usize, choices: Option<&[usize]>) -> usize {
    let size = requested.max(1);
    match choices {
        Some(options) if !options.is_empty() && !options.contains(&size) => options[0].max(1),
        _ => size,
    }
}

pub fn paginate<T: Clone>(items: &[T], requested_page: i64, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_pages(total_items, page_size);
    let current_page = clamp_page(requested_page, total_pages);

    let (start_index, end_index, visible_items) = if total_items == 0 {
        (0, 0, Vec::new())
    } else {
        let offset = (current_page - 1) * page_size;
        let end = current_page.saturating_mul(page_size).min(total_items);
        (offset + 1, end, items[offset..end].to_vec())
    };

    Page {
        visible_items,
        current_page,
        page_size,
        total_items,
        total_pages,
        start_index,
        end_index,
        has_next: current_page < total_pages,
        has_prev: current_page > 1,
    }
}

/// Stateful pager mirroring a list screen's controls.
#[derive(Debug, Clone)]
pub struct Paginator {
    current_page: usize,
    page_size: usize,
    page_size_options: Vec<usize>,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE_OPTIONS[0])
    }
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self::with_options(page_size, DEFAULT_PAGE_SIZE_OPTIONS.to_vec())
    }

    pub fn with_options(page_size: usize, page_size_options: Vec<usize>) -> Self {
        let page_size = resolve_page_size(page_size, Some(&page_size_options));
        Self {
            current_page: 1,
            page_size,
            page_size_options,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    /// Records the requested page. It is clamped against the item count on
    /// the next `apply`.
    pub fn set_page(&mut self, page: i64) {
        self.current_page = clamp_page(page, usize::MAX);
    }

    /// Changing the size always returns to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = resolve_page_size(page_size, Some(&self.page_size_options));
        self.current_page = 1;
    }

    pub fn next_page(&mut self, total_items: usize) {
        let last = total_pages(total_items, self.page_size).max(1);
        self.current_page = (self.current_page + 1).min(last);
    }

    pub fn prev_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    pub fn first_page(&mut self) {
        self.current_page = 1;
    }

    pub fn last_page(&mut self, total_items: usize) {
        self.current_page = total_pages(total_items, self.page_size).max(1);
    }

    /// Slices `items` and writes the clamped page back into the pager.
    pub fn apply<T: Clone>(&mut self, items: &[T]) -> Page<T> {
        let requested = i64::try_from(self.current_page).unwrap_or(i64::MAX);
        let page = paginate(items, requested, self.page_size);
        self.current_page = page.current_page;
        page
    }
}
