//! Array type, layout, and storage

mod core;
mod layout;
mod storage;

pub use self::core::Array;
pub(crate) use self::core::for_each_offset;
pub use layout::{broadcast_shapes, Layout, SliceSpec};
pub use storage::{Storage, ALIGNMENT};
