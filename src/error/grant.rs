use thiserror::Error;

use super::{AncestryCheckError, CopyFolderError, FolderTopologyError, StorageError};
use crate::{grant::BuyerFolder, node::NodeId};


/// Broad category of a [`GrantAccessError`].
///
/// Neither configuration nor topology errors go away by retrying;
/// remote operation errors sometimes do (see [`StorageError::is_transient`]).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum GrantErrorKind {
    /// Missing buyer e-mail or template folder.
    Configuration,

    /// The template and orders folders overlap.
    Topology,

    /// A storage service call failed.
    RemoteOperation,
}



/// Access grant error.
///
/// # Partial application
/// Granting access is not atomic. Depending on the variant, some remote side effects
/// may already have happened:
/// - [`UnableToGrantPermission`] means the buyer folder was created, but not shared;
/// - [`CopyFailed`] means the buyer folder was created *and* shared,
///   and some of the template may have been copied into it.
///
/// Blindly retrying after these errors creates a second buyer folder.
///
///
/// [`UnableToGrantPermission`]: GrantAccessError::UnableToGrantPermission
/// [`CopyFailed`]: GrantAccessError::CopyFailed
#[derive(Error, Debug)]
#[cfg_attr(feature = "miette", derive(miette::Diagnostic))]
pub enum GrantAccessError {
    /// No buyer e-mail address was provided.
    #[error("buyer e-mail address is required")]
    MissingBuyerEmail,

    /// No template folder was provided, and none is configured.
    #[error("template folder id is required, but none was provided or configured")]
    MissingTemplateFolderId,

    /// The orders folder (or the target of an orders folder shortcut) could not be fetched.
    #[error("unable to fetch orders folder {folder_id}")]
    UnableToFetchOrdersFolder {
        /// The orders folder that could not be fetched.
        folder_id: NodeId,

        /// Storage error describing why the lookup failed.
        #[source]
        error: StorageError,
    },

    /// The template and orders folders overlap.
    #[error(transparent)]
    InvalidTopology(#[from] FolderTopologyError),

    /// Checking whether the template and orders folders overlap failed.
    #[error(transparent)]
    AncestryCheckFailed(#[from] AncestryCheckError),

    /// The buyer folder could not be created.
    #[error("unable to create buyer folder \"{name}\" inside {parent_id}")]
    UnableToCreateBuyerFolder {
        /// Name of the buyer folder.
        name: String,

        /// The orders folder it should have been created in.
        parent_id: NodeId,

        /// Storage error describing why the folder could not be created.
        #[source]
        error: StorageError,
    },

    /// The buyer could not be granted read access to the buyer folder.
    ///
    /// The buyer folder exists at this point.
    #[error("unable to grant {email_address} read access to folder {folder_id}")]
    UnableToGrantPermission {
        /// The buyer folder, which has already been created.
        folder_id: NodeId,

        /// The buyer's e-mail address.
        email_address: String,

        /// Storage error describing why the permission could not be granted.
        #[source]
        error: StorageError,
    },

    /// Copying the template into the buyer folder failed.
    ///
    /// The buyer folder exists and is already shared with the buyer.
    #[error(
        "buyer folder {} was created and shared, but copying the template into it failed",
        .buyer_folder.id
    )]
    CopyFailed {
        /// The buyer folder, which has already been created and shared.
        buyer_folder: BuyerFolder,

        /// The copy error.
        #[source]
        error: CopyFolderError,
    },
}

impl GrantAccessError {
    /// Returns the broad category of this error.
    pub fn kind(&self) -> GrantErrorKind {
        match self {
            GrantAccessError::MissingBuyerEmail | GrantAccessError::MissingTemplateFolderId => {
                GrantErrorKind::Configuration
            }
            GrantAccessError::InvalidTopology(_) => GrantErrorKind::Topology,
            _ => GrantErrorKind::RemoteOperation,
        }
    }

    /// Returns the underlying storage error, if this error was caused by a storage call.
    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            GrantAccessError::UnableToFetchOrdersFolder { error, .. }
            | GrantAccessError::UnableToCreateBuyerFolder { error, .. }
            | GrantAccessError::UnableToGrantPermission { error, .. } => Some(error),
            GrantAccessError::AncestryCheckFailed(error) => Some(error.storage_error()),
            GrantAccessError::CopyFailed { error, .. } => Some(error.storage_error()),
            _ => None,
        }
    }

    /// Returns the buyer folder if it was already created before this error occurred.
    pub fn created_buyer_folder_id(&self) -> Option<&NodeId> {
        match self {
            GrantAccessError::UnableToGrantPermission { folder_id, .. } => Some(folder_id),
            GrantAccessError::CopyFailed { buyer_folder, .. } => Some(&buyer_folder.id),
            _ => None,
        }
    }
}
