//! Cross-crate integration tests.

pub mod end_to_end;
pub mod orphan_ordering;
pub mod properties;
