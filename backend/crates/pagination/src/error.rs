//! Errors raised by the page arithmetic helpers.

/// Invalid pagination input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// A numeric page parameter was zero or negative.
    #[error("page must be positive, got {value}")]
    NonPositivePage {
        /// Value supplied by the caller.
        value: i64,
    },
    /// The page size was zero or negative.
    #[error("page size must be positive, got {value}")]
    NonPositivePageSize {
        /// Value supplied by the caller.
        value: i64,
    },
    /// The total row count was negative.
    #[error("total count must not be negative, got {value}")]
    NegativeTotalCount {
        /// Value supplied by the caller.
        value: i64,
    },
    /// One of the item range inputs was negative.
    #[error("item range inputs must not be negative (offset {offset}, total {total}, count {count})")]
    NegativeRangeInput {
        /// Row offset of the page.
        offset: i64,
        /// Total number of rows.
        total: i64,
        /// Rows present on the page.
        count: i64,
    },
    /// The offset points past the last row.
    #[error("offset {offset} is beyond the last of {total} rows")]
    OffsetOutOfRange {
        /// Row offset of the page.
        offset: i64,
        /// Total number of rows.
        total: i64,
    },
}
