//! Pure page arithmetic.

use crate::PaginationError;

/// Total page count together with the requested page clamped into range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCalc {
    /// Number of pages needed for the row count; never below one.
    pub total_pages: i64,
    /// Requested page clamped to `1..=total_pages`.
    pub page: i64,
}

/// One-based indices of the first and last rows shown on a page.
///
/// Both fields are zero when there is nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemRange {
    /// Index of the first row on the page.
    pub start: i64,
    /// Index of the last row on the page.
    pub end: i64,
}

/// Parse a page number from a raw query value.
///
/// Missing, blank or non-numeric input yields `default`. Numeric input that
/// is zero or negative is rejected so callers can log it before falling
/// back.
///
/// # Errors
/// Returns [`PaginationError::NonPositivePage`] for numeric values `<= 0`.
///
/// # Examples
/// ```
/// use pagination::{PaginationError, page_from_query};
///
/// assert_eq!(page_from_query(None, 1), Ok(1));
/// assert_eq!(page_from_query(Some("abc"), 1), Ok(1));
/// assert_eq!(page_from_query(Some(" 7 "), 1), Ok(7));
/// assert_eq!(
///     page_from_query(Some("-2"), 1),
///     Err(PaginationError::NonPositivePage { value: -2 })
/// );
/// ```
pub fn page_from_query(raw: Option<&str>, default: u32) -> Result<u32, PaginationError> {
    let Some(trimmed) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(default);
    };
    let Ok(value) = trimmed.parse::<i64>() else {
        return Ok(default);
    };
    if value <= 0 {
        return Err(PaginationError::NonPositivePage { value });
    }
    Ok(u32::try_from(value).unwrap_or(default))
}

/// Compute the page count for `total_count` rows and clamp `page` into it.
///
/// An empty listing still has one (empty) page.
///
/// # Errors
/// Fails when `page_size <= 0` or `total_count < 0`.
///
/// # Examples
/// ```
/// use pagination::calculate_page;
///
/// let calc = calculate_page(101, 10, 40).expect("valid inputs");
/// assert_eq!(calc.total_pages, 11);
/// assert_eq!(calc.page, 11);
/// ```
pub fn calculate_page(
    total_count: i64,
    page_size: i64,
    page: i64,
) -> Result<PageCalc, PaginationError> {
    if page_size <= 0 {
        return Err(PaginationError::NonPositivePageSize { value: page_size });
    }
    if total_count < 0 {
        return Err(PaginationError::NegativeTotalCount { value: total_count });
    }
    #[expect(
        clippy::integer_division,
        clippy::integer_division_remainder_used,
        reason = "ceiling division over positive operands"
    )]
    let total_pages = if total_count == 0 {
        1
    } else {
        (total_count - 1) / page_size + 1
    };
    Ok(PageCalc {
        total_pages,
        page: page.clamp(1, total_pages),
    })
}

/// Row offset of the first row on `page`.
///
/// Pages below one are treated as the first page.
#[must_use]
pub fn offset_for(page: i64, page_size: i64) -> i64 {
    page.max(1).saturating_sub(1).saturating_mul(page_size.max(0))
}

/// One-based row indices for the "showing X-Y of Z" caption.
///
/// # Errors
/// Fails when any input is negative, or when `offset` is at or beyond
/// `total_count` for a non-empty listing.
///
/// # Examples
/// ```
/// use pagination::{ItemRange, range_of_elements};
///
/// assert_eq!(range_of_elements(0, 0, 0), Ok(ItemRange::default()));
/// assert_eq!(
///     range_of_elements(50, 57, 55),
///     Ok(ItemRange { start: 51, end: 57 })
/// );
/// assert!(range_of_elements(60, 57, 0).is_err());
/// ```
pub fn range_of_elements(
    offset: i64,
    total_count: i64,
    count_on_page: i64,
) -> Result<ItemRange, PaginationError> {
    if offset < 0 || total_count < 0 || count_on_page < 0 {
        return Err(PaginationError::NegativeRangeInput {
            offset,
            total: total_count,
            count: count_on_page,
        });
    }
    if total_count == 0 {
        return Ok(ItemRange::default());
    }
    if offset >= total_count {
        return Err(PaginationError::OffsetOutOfRange {
            offset,
            total: total_count,
        });
    }

    let first = offset.saturating_add(1);
    let start = if first > total_count { 0 } else { first };
    let end = offset.saturating_add(count_on_page).min(total_count);
    Ok(ItemRange { start, end })
}

/// Page numbers to render as links, centred on `current`.
///
/// Returns every page when `total_pages <= max_pages`. Otherwise the window
/// holds exactly `max_pages` entries and slides to stay inside
/// `1..=total_pages`. Non-positive totals or window sizes yield no pages.
///
/// # Examples
/// ```
/// use pagination::page_window;
///
/// assert_eq!(page_window(5, 20, 5), vec![3, 4, 5, 6, 7]);
/// assert_eq!(page_window(1, 20, 5), vec![1, 2, 3, 4, 5]);
/// assert_eq!(page_window(20, 20, 5), vec![16, 17, 18, 19, 20]);
/// assert_eq!(page_window(2, 3, 5), vec![1, 2, 3]);
/// ```
#[must_use]
pub fn page_window(current: i64, total_pages: i64, max_pages: i64) -> Vec<i64> {
    if total_pages <= 0 || max_pages <= 0 {
        return Vec::new();
    }
    if total_pages <= max_pages {
        return (1..=total_pages).collect();
    }

    let centre = current.clamp(1, total_pages);
    #[expect(
        clippy::integer_division,
        clippy::integer_division_remainder_used,
        reason = "the window centre rounds towards the lower page"
    )]
    let half = max_pages / 2;
    let mut start = centre - half;
    let mut end = start + max_pages - 1;
    if start < 1 {
        start = 1;
        end = max_pages;
    }
    if end > total_pages {
        end = total_pages;
        start = total_pages - max_pages + 1;
    }
    (start..=end).collect()
}
