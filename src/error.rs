//! Error types for storage calls, folder traversal, access granting and configuration.
//!
//! Every public operation in this crate returns its own error type:
//!
//! | operation | error |
//! |-----------|-------|
//! | [`StorageService`] methods | [`StorageError`] |
//! | [`is_descendant`] | [`AncestryCheckError`] |
//! | [`copy_folder_contents`] | [`CopyFolderError`] |
//! | [`AccessGranter::grant_access`] | [`GrantAccessError`] |
//! | [`GrantConfig`] loading and validation | [`ConfigError`] |
//!
//! [`StorageService`]: crate::storage::StorageService
//! [`is_descendant`]: crate::folder::is_descendant
//! [`copy_folder_contents`]: crate::folder::copy_folder_contents
//! [`AccessGranter::grant_access`]: crate::grant::AccessGranter::grant_access
//! [`GrantConfig`]: crate::config::GrantConfig

mod config;
mod folder;
mod grant;
mod storage;

pub use config::*;
pub use folder::*;
pub use grant::*;
pub use storage::*;
