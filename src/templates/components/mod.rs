pub mod pager;
pub mod segment_table;

pub use pager::pager;
pub use segment_table::segment_table;
