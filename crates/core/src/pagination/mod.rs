//! Exhaustive and single-page list fetching

pub mod cursor;
pub mod offset;
pub mod sort;

pub use cursor::{CursorPaginator, CursorPlan, CursorRun, CursorState, OrderPolicy, ParamCase, Termination};
pub use offset::OffsetPaginator;
pub use sort::{compare_sort_values, sort_records};
