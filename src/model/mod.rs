pub mod item;
pub mod registry;

pub use item::*;
pub use registry::*;
