//! A contiguous memory record list and a fixed stride vector ripped out and
//! ported from a c datastruct library
//!
//! 0 Dependencies, one allocation per container, 0 locks, not thread safe

/// Container errors
pub mod error;
/// Variable length record list in one contiguous allocation
pub mod list;
/// Owned contiguous byte region, shared by both containers
pub mod raw;
/// Fixed stride vector
pub mod vec;

pub use error::ContainerError;
pub use list::{Record, RecordList, RecordView};
pub use vec::StrideVec;
