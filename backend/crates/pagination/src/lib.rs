//! Page arithmetic for paginated admin listings.
//!
//! The helpers here are pure: they turn raw query input and row counts into
//! page numbers, "showing X-Y of Z" item ranges, and the short window of page
//! links rendered under a table. Nothing in this crate touches I/O.
//!
//! ```
//! use pagination::{Pagination, page_from_query};
//!
//! let page = page_from_query(Some("2"), 1).unwrap_or(1);
//! let view = Pagination::build(i64::from(page), 10, 35, 10, 5).expect("valid inputs");
//! assert_eq!(view.total_pages, 4);
//! assert_eq!((view.start_item, view.end_item), (11, 20));
//! assert_eq!(view.pages, vec![1, 2, 3, 4]);
//! ```

mod arithmetic;
mod error;
mod view;

pub use arithmetic::{
    ItemRange, PageCalc, calculate_page, offset_for, page_from_query, page_window,
    range_of_elements,
};
pub use error::PaginationError;
pub use view::Pagination;
