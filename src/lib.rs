//! Per-buyer fulfilment on top of a hosted file-storage service (Google Drive).
//! Replicates a template folder tree into a fresh buyer folder and shares it with the buyer.
//!
//!
//! # Main features
//! - check whether a folder lies anywhere below another one, even when nodes have multiple parents,
//! - copy the contents of a folder recursively, with shortcuts resolved to their targets and
//!   **progress reporting**, if needed, and
//! - grant a buyer read access to their own copy of a template folder, with the template
//!   and orders folders validated against each other beforehand.
//!
//! <br>
//!
//! Visit the [`folder`] and [`grant`] modules for more information and a list of available functions.
//! All remote access goes through the [`StorageService`](storage::StorageService) trait.
//!
//!
//! <br>
//!
//! # Feature flags
//! The following feature flags enable optional functionality:
//! - `drive-http` (*enabled by default*): enables the blocking Google Drive v3 client,
//!   `storage::DriveClient`, built on [`reqwest`](../reqwest/index.html).
//! - `cli` (*disabled by default*): builds the `grant-access` command-line binary.
//! - `fs-err` (*disabled by default*): enables the optional [`fs-err`](../fs_err/index.html) support
//!   for configuration file reads, which means more helpful error messages for underlying IO errors.
//! - `miette` (*disabled by default*): derives `miette::Diagnostic` on all [error types](crate::error).
//!
//!
//! <br>
//!
//! # Examples
//!
//! Granting a buyer access to a copy of the configured template:
//! ```no_run
//! # use drive_grant::config::GrantConfig;
//! # use drive_grant::grant::{AccessGranter, GrantAccessRequest};
//! # use drive_grant::storage::DriveClient;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GrantConfig::from_env()?;
//! let client = DriveClient::new(config.credentials.clone())?;
//!
//! let granter = AccessGranter::new(client, config.defaults.clone());
//!
//! let result = granter.grant_access(
//!     GrantAccessRequest::new("buyer@example.com")
//!         .with_folder_name("Order #1042")
//! )?;
//!
//! println!(
//!     "Shared {} ({} entries copied): {}",
//!     result.name,
//!     result.files.len(),
//!     result.web_view_link.as_deref().unwrap_or("<no link>")
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Copying a folder and getting updates on the progress:
//! ```no_run
//! # use drive_grant::error::CopyFolderError;
//! # use drive_grant::folder::{copy_folder_contents_with_progress, CopyFolderOperation};
//! # use drive_grant::node::NodeId;
//! # use drive_grant::storage::StorageService;
//! # fn copy(storage: &impl StorageService) -> Result<(), CopyFolderError> {
//! let finished = copy_folder_contents_with_progress(
//!     storage,
//!     &NodeId::new("source-folder-id"),
//!     &NodeId::new("destination-folder-id"),
//!     |progress| {
//!         if let CopyFolderOperation::CopyingFile { name, .. } = &progress.current_operation {
//!             println!(
//!                 "Copying {name} ({} files and {} folders so far).",
//!                 progress.files_copied,
//!                 progress.folders_created
//!             );
//!         }
//!     }
//! )?;
//!
//! println!(
//!     "Copied {} files and {} folders, skipped {} entries.",
//!     finished.files_copied,
//!     finished.folders_created,
//!     finished.skipped.len()
//! );
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]


/// This brings in the README's doctests (and is present only when testing).
#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;



pub mod config;
pub mod error;
pub mod folder;
pub mod grant;
mod macros;
pub mod node;
pub mod storage;
