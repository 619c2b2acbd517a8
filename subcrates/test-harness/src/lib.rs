//! In-memory storage service and pre-built folder trees for `drive-grant` tests.

pub mod error;
pub mod prelude;
pub mod storage;
pub mod trees;
