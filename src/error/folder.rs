use thiserror::Error;

use super::StorageError;
use crate::node::NodeId;


/// Ancestry check error.
///
/// Any failed lookup fails the whole check; there is no partial result.
#[derive(Error, Debug)]
#[cfg_attr(feature = "miette", derive(miette::Diagnostic))]
pub enum AncestryCheckError {
    /// The metadata (and parents) of a node on the upward walk could not be fetched.
    #[error("unable to fetch parents of node {node_id}")]
    UnableToFetchNode {
        /// The node whose metadata could not be fetched.
        node_id: NodeId,

        /// Storage error describing why the lookup failed.
        #[source]
        error: StorageError,
    },
}

impl AncestryCheckError {
    /// Returns the underlying storage error.
    pub fn storage_error(&self) -> &StorageError {
        match self {
            AncestryCheckError::UnableToFetchNode { error, .. } => error,
        }
    }
}



/// Folder copy error.
///
/// When this is returned, the traversal has been aborted. Folders and files that
/// were created before the failure remain in the destination.
#[derive(Error, Debug)]
#[cfg_attr(feature = "miette", derive(miette::Diagnostic))]
pub enum CopyFolderError {
    /// The children of a source folder could not be listed.
    #[error("unable to list contents of source folder {folder_id}")]
    UnableToListFolder {
        /// The source folder that could not be listed.
        folder_id: NodeId,

        /// Storage error describing why the listing failed.
        #[source]
        error: StorageError,
    },

    /// A destination folder could not be created.
    #[error("unable to create folder \"{name}\" inside {parent_id}")]
    UnableToCreateFolder {
        /// Name of the folder that could not be created.
        name: String,

        /// The destination folder it should have been created in.
        parent_id: NodeId,

        /// Storage error describing why the folder could not be created.
        #[source]
        error: StorageError,
    },

    /// A source file (or the target of a shortcut) could not be copied.
    #[error("unable to copy file {source_file_id} as \"{name}\" into {parent_id}")]
    UnableToCopyFile {
        /// The file that was being copied.
        source_file_id: NodeId,

        /// The name the copy should have received.
        name: String,

        /// The destination folder it should have been copied into.
        parent_id: NodeId,

        /// Storage error describing why the copy failed.
        #[source]
        error: StorageError,
    },
}

impl CopyFolderError {
    /// Returns the underlying storage error.
    pub fn storage_error(&self) -> &StorageError {
        match self {
            CopyFolderError::UnableToListFolder { error, .. } => error,
            CopyFolderError::UnableToCreateFolder { error, .. } => error,
            CopyFolderError::UnableToCopyFile { error, .. } => error,
        }
    }
}



/// The template folder and the orders folder overlap.
///
/// Copying a template into a folder that is (or is inside) the template,
/// or into a folder that contains the template, would make the copy
/// recurse into its own output.
#[derive(Error, Debug)]
#[cfg_attr(feature = "miette", derive(miette::Diagnostic))]
pub enum FolderTopologyError {
    /// The orders folder is the template folder itself.
    #[error(
        "orders folder cannot be the same as the template folder ({folder_id}); \
        choose a separate orders folder"
    )]
    SameFolder {
        /// The shared folder identifier.
        folder_id: NodeId,
    },

    /// The orders folder is inside the template folder.
    #[error(
        "orders folder {orders_folder_id} is inside the template folder {template_folder_id}; \
        move it outside the template to avoid infinite nesting"
    )]
    OrdersFolderInsideTemplate {
        /// The (resolved) orders folder.
        orders_folder_id: NodeId,

        /// The template folder.
        template_folder_id: NodeId,
    },

    /// The template folder is inside the orders folder.
    #[error(
        "template folder {template_folder_id} is inside the orders folder {orders_folder_id}; \
        move the template outside the orders folder to avoid infinite nesting"
    )]
    TemplateInsideOrdersFolder {
        /// The template folder.
        template_folder_id: NodeId,

        /// The (resolved) orders folder.
        orders_folder_id: NodeId,
    },
}
