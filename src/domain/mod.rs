//! Domain logic - pure values independent of git invocations

pub mod branch;
pub mod tag;
pub mod version;

pub use branch::Branch;
pub use tag::Tag;
pub use version::{BuildType, Version};
