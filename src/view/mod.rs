pub mod filter;
pub mod group;

pub use filter::{CategoryFilter, FilterSpec, filter};
pub use group::{Group, GroupingMode, detect_mode, group};
