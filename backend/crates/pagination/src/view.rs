//! Serializable pagination summary consumed by templates and JSON clients.

use serde::Serialize;

use crate::{PaginationError, calculate_page, offset_for, page_window, range_of_elements};

/// Everything a listing needs to render its pager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page after clamping.
    pub page: i64,
    /// Rows per page.
    pub page_size: i64,
    /// Total number of rows in the listing.
    pub total_count: i64,
    /// Number of pages; at least one.
    pub total_pages: i64,
    /// Page numbers to render as links.
    pub pages: Vec<i64>,
    /// One-based index of the first row shown, zero when empty.
    pub start_item: i64,
    /// One-based index of the last row shown, zero when empty.
    pub end_item: i64,
    /// Whether a previous page exists.
    pub has_prev: bool,
    /// Whether a next page exists.
    pub has_next: bool,
    /// Previous page number, clamped to the first page.
    pub prev_page: i64,
    /// Next page number, clamped to the last page.
    pub next_page: i64,
}

impl Pagination {
    /// Assemble the pager for `page` of a listing with `total_count` rows.
    ///
    /// `count_on_page` is the number of rows actually fetched for the page and
    /// `max_window` caps the number of page links.
    ///
    /// # Errors
    /// Propagates [`PaginationError`] for a non-positive page size or a
    /// negative count.
    pub fn build(
        page: i64,
        page_size: i64,
        total_count: i64,
        count_on_page: i64,
        max_window: i64,
    ) -> Result<Self, PaginationError> {
        let calc = calculate_page(total_count, page_size, page)?;
        let range = range_of_elements(
            offset_for(calc.page, page_size),
            total_count,
            count_on_page,
        )?;

        Ok(Self {
            page: calc.page,
            page_size,
            total_count,
            total_pages: calc.total_pages,
            pages: page_window(calc.page, calc.total_pages, max_window),
            start_item: range.start,
            end_item: range.end,
            has_prev: calc.page > 1,
            has_next: calc.page < calc.total_pages,
            prev_page: (calc.page - 1).max(1),
            next_page: (calc.page + 1).min(calc.total_pages),
        })
    }
}
