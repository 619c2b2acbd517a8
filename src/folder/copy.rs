use std::collections::{HashSet, VecDeque};

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    error::CopyFolderError,
    node::{ManifestEntry, Node, NodeId, NodeKind},
    storage::StorageService,
};


/// Why a source entry was not copied.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// The entry is a shortcut whose target is unknown.
    UnresolvableShortcut,

    /// The entry leads (through a shortcut) to a folder that is already
    /// being copied further up the current path, or to a folder this copy
    /// writes into (the destination or one of the folders it created).
    /// Descending into it would never finish.
    SourceCycle,
}


/// A source entry that was deliberately not copied.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedItem {
    /// Identifier of the skipped source entry.
    pub source_id: NodeId,

    /// Name of the skipped source entry.
    pub name: String,

    /// Why it was skipped.
    pub reason: SkipReason,
}


/// Describes a successful folder copy.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct CopyFolderFinished {
    /// Every folder and file created in the destination, in traversal order.
    ///
    /// A folder's entry always precedes the entries of its contents.
    pub manifest: Vec<ManifestEntry>,

    /// Source entries that were not copied.
    pub skipped: Vec<SkippedItem>,

    /// Total number of folders created.
    pub folders_created: usize,

    /// Total number of files copied.
    pub files_copied: usize,
}



/// Describes the operation currently being performed by a folder copy.
///
/// Used for progress reporting in [`copy_folder_contents_with_progress`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum CopyFolderOperation {
    /// A destination folder is being created.
    CreatingFolder {
        /// Name of the folder being created.
        name: String,

        /// Destination folder it is being created in.
        parent_id: NodeId,
    },

    /// A file is being copied.
    CopyingFile {
        /// The file being copied (for shortcuts, the shortcut's target).
        source_file_id: NodeId,

        /// Name the copy will receive.
        name: String,

        /// Destination folder it is being copied into.
        parent_id: NodeId,
    },
}


/// Folder copying progress.
///
/// This struct is used to report progress to a user-provided closure,
/// see usage in [`copy_folder_contents_with_progress`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CopyFolderProgress {
    /// Number of folders that have been created so far.
    pub folders_created: usize,

    /// Number of files that have been copied so far.
    pub files_copied: usize,

    /// Number of source entries that have been skipped so far.
    pub items_skipped: usize,

    /// The operation that is about to be performed.
    pub current_operation: CopyFolderOperation,
}



/// A source folder whose contents are (partially) copied.
///
/// Folder listings are paginated: one page is queued at a time,
/// and the next page is requested only after the queued entries have been handled.
struct PendingFolder {
    source_folder_id: NodeId,
    destination_folder_id: NodeId,
    queued_items: VecDeque<Node>,
    next_page_token: Option<String>,
    listing_started: bool,
}

impl PendingFolder {
    fn new(source_folder_id: NodeId, destination_folder_id: NodeId) -> Self {
        Self {
            source_folder_id,
            destination_folder_id,
            queued_items: VecDeque::new(),
            next_page_token: None,
            listing_started: false,
        }
    }

    fn has_more_pages(&self) -> bool {
        !self.listing_started || self.next_page_token.is_some()
    }
}


/// What to do with a single listed source entry.
enum PlannedOperation {
    /// Create a folder called `name` and copy `source_folder_id`'s contents into it.
    ///
    /// `listed_id` is the listed entry itself: the folder, or the shortcut pointing at it.
    CopyFolder {
        listed_id: NodeId,
        source_folder_id: NodeId,
        name: String,
    },

    /// Copy the file `source_file_id`, naming the copy `name`.
    CopyFile { source_file_id: NodeId, name: String },

    Skip {
        source_id: NodeId,
        name: String,
        reason: SkipReason,
    },
}

impl PlannedOperation {
    /// Shortcuts are never copied themselves: their target is,
    /// but under the shortcut's name.
    fn for_node(node: Node) -> Self {
        match node.kind {
            NodeKind::Folder => Self::CopyFolder {
                listed_id: node.id.clone(),
                source_folder_id: node.id,
                name: node.name,
            },
            NodeKind::File { .. } => Self::CopyFile {
                source_file_id: node.id,
                name: node.name,
            },
            NodeKind::Shortcut {
                target: Some(target),
            } => {
                if target.is_folder() {
                    Self::CopyFolder {
                        listed_id: node.id,
                        source_folder_id: target.id,
                        name: node.name,
                    }
                } else {
                    Self::CopyFile {
                        source_file_id: target.id,
                        name: node.name,
                    }
                }
            }
            NodeKind::Shortcut { target: None } => Self::Skip {
                source_id: node.id,
                name: node.name,
                reason: SkipReason::UnresolvableShortcut,
            },
        }
    }
}



/// Copies the contents of a source folder into a destination folder, with progress reporting.
///
/// Behaves exactly like [`copy_folder_contents`], but calls `progress_handler`
/// before every folder creation and file copy, and once more after the copy has finished
/// (if anything was created at all).
pub fn copy_folder_contents_with_progress<S, F>(
    storage: &S,
    source_folder_id: &NodeId,
    destination_folder_id: &NodeId,
    mut progress_handler: F,
) -> Result<CopyFolderFinished, CopyFolderError>
where
    S: StorageService + ?Sized,
    F: FnMut(&CopyFolderProgress),
{
    let mut finished = CopyFolderFinished::default();
    let mut last_progress: Option<CopyFolderProgress> = None;

    let mut emit_progress = |finished: &CopyFolderFinished, operation: CopyFolderOperation| {
        let progress = CopyFolderProgress {
            folders_created: finished.folders_created,
            files_copied: finished.files_copied,
            items_skipped: finished.skipped.len(),
            current_operation: operation,
        };

        progress_handler(&progress);
        last_progress = Some(progress);
    };


    // Depth-first, with an explicit stack instead of recursion: the top of the stack
    // is the folder currently being copied, the rest of the stack are its (source) ancestors.
    // Entries come out in the same order a recursive copy would produce them.
    let mut pending_folders = vec![PendingFolder::new(
        source_folder_id.clone(),
        destination_folder_id.clone(),
    )];

    // Folders this copy writes into. Reading one of them as a source would copy
    // the copy's own output.
    let mut destination_folder_ids = HashSet::from([destination_folder_id.clone()]);

    while let Some(current_folder) = pending_folders.last_mut() {
        let Some(source_item) = current_folder.queued_items.pop_front() else {
            if !current_folder.has_more_pages() {
                pending_folders.pop();
                continue;
            }

            let page = storage
                .list_children(
                    &current_folder.source_folder_id,
                    current_folder.next_page_token.as_deref(),
                )
                .map_err(|error| CopyFolderError::UnableToListFolder {
                    folder_id: current_folder.source_folder_id.clone(),
                    error,
                })?;

            debug!(
                source_folder_id = %current_folder.source_folder_id,
                items = page.items.len(),
                has_next_page = page.next_page_token.is_some(),
                "listed source folder page"
            );

            current_folder.listing_started = true;
            current_folder.next_page_token = page.next_page_token;
            current_folder.queued_items.extend(page.items);

            continue;
        };

        let parent_id = current_folder.destination_folder_id.clone();

        match PlannedOperation::for_node(source_item) {
            PlannedOperation::CopyFolder {
                listed_id,
                source_folder_id,
                name,
            } => {
                let is_already_being_copied = pending_folders
                    .iter()
                    .any(|pending| pending.source_folder_id == source_folder_id);
                let is_copy_output = destination_folder_ids.contains(&source_folder_id);

                if is_already_being_copied || is_copy_output {
                    warn!(
                        source_folder_id = %source_folder_id,
                        name = %name,
                        is_copy_output,
                        "skipping folder that is already being copied or written to"
                    );

                    finished.skipped.push(SkippedItem {
                        source_id: listed_id,
                        name,
                        reason: SkipReason::SourceCycle,
                    });

                    continue;
                }


                emit_progress(
                    &finished,
                    CopyFolderOperation::CreatingFolder {
                        name: name.clone(),
                        parent_id: parent_id.clone(),
                    },
                );

                let created_folder = storage.create_folder(&name, &parent_id).map_err(|error| {
                    CopyFolderError::UnableToCreateFolder {
                        name: name.clone(),
                        parent_id: parent_id.clone(),
                        error,
                    }
                })?;

                debug!(
                    source_folder_id = %source_folder_id,
                    folder_id = %created_folder.id,
                    name = %name,
                    "created destination folder"
                );

                finished.manifest.push(created_folder.to_manifest_entry());
                finished.folders_created += 1;

                destination_folder_ids.insert(created_folder.id.clone());
                pending_folders.push(PendingFolder::new(source_folder_id, created_folder.id));
            }
            PlannedOperation::CopyFile {
                source_file_id,
                name,
            } => {
                emit_progress(
                    &finished,
                    CopyFolderOperation::CopyingFile {
                        source_file_id: source_file_id.clone(),
                        name: name.clone(),
                        parent_id: parent_id.clone(),
                    },
                );

                let copied_file = storage
                    .copy_file(&source_file_id, &name, &parent_id)
                    .map_err(|error| CopyFolderError::UnableToCopyFile {
                        source_file_id: source_file_id.clone(),
                        name: name.clone(),
                        parent_id: parent_id.clone(),
                        error,
                    })?;

                debug!(
                    source_file_id = %source_file_id,
                    file_id = %copied_file.id,
                    name = %name,
                    "copied file"
                );

                finished.manifest.push(copied_file.to_manifest_entry());
                finished.files_copied += 1;
            }
            PlannedOperation::Skip {
                source_id,
                name,
                reason,
            } => {
                warn!(
                    source_id = %source_id,
                    name = %name,
                    ?reason,
                    "skipping source entry"
                );

                finished.skipped.push(SkippedItem {
                    source_id,
                    name,
                    reason,
                });
            }
        }
    }


    // One last progress update - everything is done at this point.
    if let Some(mut progress) = last_progress {
        progress.folders_created = finished.folders_created;
        progress.files_copied = finished.files_copied;
        progress.items_skipped = finished.skipped.len();

        progress_handler(&progress);
    }

    Ok(finished)
}


/// Copies the contents of a source folder into a destination folder.
///
/// The source folder itself is not copied, only what is inside it;
/// the destination folder must already exist. The source tree is only ever read.
///
///
/// # Entries
/// All non-trashed direct children of `source_folder_id` are listed, following
/// continuation tokens until the listing is exhausted. Then, for each child:
/// - a **folder** is re-created (same name) inside the destination, and its contents
///   are copied into the new folder,
/// - a **file** is copied into the destination under the same name,
/// - a **shortcut to a folder** is re-created as a real folder named after the shortcut,
///   and the *target* folder's contents are copied into it,
/// - a **shortcut to a file** results in a copy of the *target* file, named after the shortcut,
/// - a **shortcut without a target** is skipped (see [`SkipReason::UnresolvableShortcut`]).
///
/// There is no depth limit. Shortcuts can, however, point back up the source tree
/// or into the destination; a folder that is already being copied further up the current path
/// is not descended into again, and neither is the destination folder or any folder created
/// by this copy (see [`SkipReason::SourceCycle`]).
///
///
/// # Return value
/// Upon success, returns a [`CopyFolderFinished`], whose `manifest` lists every created folder and file
/// in traversal order: a folder's entry precedes the entries of its contents.
///
///
/// # Errors
/// The first failing list, create or copy call aborts the whole copy with a [`CopyFolderError`].
/// There is no rollback: whatever was created before the failure stays in the destination.
pub fn copy_folder_contents<S>(
    storage: &S,
    source_folder_id: &NodeId,
    destination_folder_id: &NodeId,
) -> Result<CopyFolderFinished, CopyFolderError>
where
    S: StorageService + ?Sized,
{
    copy_folder_contents_with_progress(storage, source_folder_id, destination_folder_id, |_| {})
}
