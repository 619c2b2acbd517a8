//! Folder tree operations: ancestry checks and recursive folder copies.
//!
//! <br>
//!
//! ##### Feature Overview
//!
//! | | <span style="font-weight:normal"><i>returns</i></span>
//! |-----------------------------|:--------------------:|
//! | [`is_descendant`]                      | [`bool`] <br><sup style="text-align: right">(or [`AncestryCheckError`])</sup> |
//! | [`copy_folder_contents`]               | [`CopyFolderFinished`] <br><sup style="text-align: right">(or [`CopyFolderError`])</sup> |
//! | [`copy_folder_contents_with_progress`] | [`CopyFolderFinished`] <br><sup style="text-align: right">(or [`CopyFolderError`])</sup> |
//!
//!
//! [`AncestryCheckError`]: crate::error::AncestryCheckError
//! [`CopyFolderError`]: crate::error::CopyFolderError

mod ancestry;
mod copy;

pub use ancestry::*;
pub use copy::*;
