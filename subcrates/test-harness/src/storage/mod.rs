use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use drive_grant::{
    error::StorageError,
    node::{Node, NodeId, NodeKind, ShortcutTarget},
    storage::{ListPage, PermissionGrant, StorageService},
};

mod calls;
mod failures;

pub use calls::*;
pub use failures::FailOn;
use failures::InjectedFailure;


/// Page size used by [`InMemoryStorage::new`] (the same default the Drive API uses).
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// MIME type of files added with [`InMemoryStorage::add_file`].
pub const TEXT_MIME_TYPE: &str = "text/plain";



struct StoredNode {
    node: Node,
    trashed: bool,
}


#[derive(Default)]
struct StorageState {
    nodes: HashMap<NodeId, StoredNode>,

    /// Node ids in insertion order; listings return children in this order.
    insertion_order: Vec<NodeId>,

    permissions: HashMap<NodeId, Vec<PermissionGrant>>,

    calls: Vec<StorageCall>,

    failures: Vec<InjectedFailure>,

    next_id: u64,
}

impl StorageState {
    fn insert(&mut self, id_prefix: &str, name: &str, kind: NodeKind, parents: Vec<NodeId>) -> Node {
        self.next_id += 1;
        let id = NodeId::new(format!("{}-{}", id_prefix, self.next_id));

        let node = Node {
            id: id.clone(),
            name: name.to_string(),
            kind,
            parents,
            web_view_link: Some(format!("https://drive.example.com/{}", id)),
        };

        self.nodes.insert(
            id.clone(),
            StoredNode {
                node: node.clone(),
                trashed: false,
            },
        );
        self.insertion_order.push(id);

        node
    }

    fn stored_node_mut(&mut self, node_id: &NodeId) -> &mut StoredNode {
        self.nodes
            .get_mut(node_id)
            .unwrap_or_else(|| panic!("node {} does not exist in the harness", node_id))
    }

    fn lookup(&self, node_id: &NodeId) -> Result<&Node, StorageError> {
        self.nodes
            .get(node_id)
            .map(|stored| &stored.node)
            .ok_or_else(|| StorageError::Rejected {
                status: 404,
                reason: Some("notFound".to_string()),
                message: format!("File not found: {}.", node_id),
            })
    }

    fn lookup_folder(&self, folder_id: &NodeId) -> Result<&Node, StorageError> {
        let folder = self.lookup(folder_id)?;

        if !folder.is_folder() {
            return Err(StorageError::Rejected {
                status: 400,
                reason: Some("invalidParent".to_string()),
                message: format!("{} is not a folder", folder_id),
            });
        }

        Ok(folder)
    }

    fn children(&self, parent_id: &NodeId) -> Vec<Node> {
        self.insertion_order
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .filter(|stored| !stored.trashed && stored.node.parents.contains(parent_id))
            .map(|stored| stored.node.clone())
            .collect()
    }

    /// Records the call and returns the injected failure for it, if there is one.
    fn record(&mut self, call: StorageCall) -> Result<(), StorageError> {
        let failure = self
            .failures
            .iter()
            .find(|failure| failure.fail_on.matches(&call))
            .map(InjectedFailure::to_storage_error);

        self.calls.push(call);

        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}



/// An in-memory [`StorageService`] with the same observable behaviour as the Drive API
/// (as far as `drive-grant` is concerned).
///
/// - listings exclude trashed nodes, are returned in insertion order and are paginated,
/// - unknown ids are rejected with status 404 and reason `notFound`,
/// - folders can only be created (and files copied) into existing folders,
/// - folders can't be copied with [`StorageService::copy_file`].
///
/// Every call is recorded (see [`Self::calls`]), and any call can be made to fail
/// (see [`Self::fail`]). The tree is built with the `add_*` methods.
pub struct InMemoryStorage {
    state: Mutex<StorageState>,
    page_size: usize,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Listings will return at most `page_size` nodes per page.
    pub fn with_page_size(page_size: usize) -> Self {
        assert!(page_size > 0, "page size must be at least 1");

        Self {
            state: Mutex::new(StorageState::default()),
            page_size,
        }
    }

    fn state(&self) -> MutexGuard<'_, StorageState> {
        self.state.lock().unwrap()
    }


    /*
     * Tree construction
     */

    /// Adds a folder without parents (like the root of a drive).
    pub fn add_root_folder(&self, name: &str) -> NodeId {
        self.state()
            .insert("folder", name, NodeKind::Folder, Vec::new())
            .id
    }

    pub fn add_folder(&self, name: &str, parent_id: &NodeId) -> NodeId {
        self.state()
            .insert("folder", name, NodeKind::Folder, vec![parent_id.clone()])
            .id
    }

    /// Adds a plain text file.
    pub fn add_file(&self, name: &str, parent_id: &NodeId) -> NodeId {
        self.add_file_with_mime_type(name, parent_id, TEXT_MIME_TYPE)
    }

    pub fn add_file_with_mime_type(&self, name: &str, parent_id: &NodeId, mime_type: &str) -> NodeId {
        self.state()
            .insert(
                "file",
                name,
                NodeKind::File {
                    mime_type: mime_type.to_string(),
                },
                vec![parent_id.clone()],
            )
            .id
    }

    /// Adds a shortcut to an existing node. The target's MIME type is taken from the target.
    pub fn add_shortcut(&self, name: &str, parent_id: &NodeId, target_id: &NodeId) -> NodeId {
        let mut state = self.state();

        let target_mime_type = state
            .nodes
            .get(target_id)
            .map(|stored| stored.node.kind.mime_type().to_string())
            .unwrap_or_else(|| panic!("shortcut target {} does not exist in the harness", target_id));

        state
            .insert(
                "shortcut",
                name,
                NodeKind::Shortcut {
                    target: Some(ShortcutTarget {
                        id: target_id.clone(),
                        mime_type: Some(target_mime_type),
                    }),
                },
                vec![parent_id.clone()],
            )
            .id
    }

    /// Adds a shortcut whose target is unknown.
    pub fn add_unresolvable_shortcut(&self, name: &str, parent_id: &NodeId) -> NodeId {
        self.state()
            .insert(
                "shortcut",
                name,
                NodeKind::Shortcut { target: None },
                vec![parent_id.clone()],
            )
            .id
    }

    /// Adds another parent to an existing node.
    pub fn add_parent(&self, node_id: &NodeId, parent_id: &NodeId) {
        self.state()
            .stored_node_mut(node_id)
            .node
            .parents
            .push(parent_id.clone());
    }

    /// Replaces the parents of an existing node (this can create malformed, cyclic trees).
    pub fn set_parents(&self, node_id: &NodeId, parents: Vec<NodeId>) {
        self.state().stored_node_mut(node_id).node.parents = parents;
    }

    /// Moves a node to the trash: it is still fetchable, but no longer listed.
    pub fn trash(&self, node_id: &NodeId) {
        self.state().stored_node_mut(node_id).trashed = true;
    }


    /*
     * Failure injection
     */

    /// Makes every matching call fail with a `500 backendError` rejection.
    pub fn fail(&self, fail_on: FailOn) {
        self.fail_with(fail_on, 500, Some("backendError"));
    }

    /// Makes every matching call fail with the given status and reason.
    pub fn fail_with(&self, fail_on: FailOn, status: u16, reason: Option<&str>) {
        self.state().failures.push(InjectedFailure {
            fail_on,
            status,
            reason: reason.map(str::to_string),
        });
    }

    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }


    /*
     * Inspection
     */

    /// Returns every call made so far, in order.
    pub fn calls(&self) -> Vec<StorageCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Returns how many times `node_id` has been fetched with [`StorageService::get_node`].
    pub fn get_node_call_count(&self, node_id: &NodeId) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| matches!(call, StorageCall::GetNode { node_id: id } if id == node_id))
            .count()
    }

    /// Returns the number of write calls (folder creations, file copies and permission grants) made so far.
    pub fn write_call_count(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.is_write())
            .count()
    }

    /// Returns the total number of nodes, trashed ones included.
    pub fn node_count(&self) -> usize {
        self.state().nodes.len()
    }

    pub fn node(&self, node_id: &NodeId) -> Option<Node> {
        self.state()
            .nodes
            .get(node_id)
            .map(|stored| stored.node.clone())
    }

    /// Returns the non-trashed children of a node, in listing order (unpaginated).
    pub fn children(&self, parent_id: &NodeId) -> Vec<Node> {
        self.state().children(parent_id)
    }

    pub fn child_named(&self, parent_id: &NodeId, name: &str) -> Option<Node> {
        self.children(parent_id)
            .into_iter()
            .find(|child| child.name == name)
    }

    /// Returns the permissions granted on a node so far, in order.
    pub fn permissions(&self, node_id: &NodeId) -> Vec<PermissionGrant> {
        self.state()
            .permissions
            .get(node_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Describes the tree below `root_id` as a list of relative paths, in depth-first pre-order.
    ///
    /// Folder paths end with `/`. Shortcuts are listed as `name -> target id`
    /// (or `name -> ?` if unresolvable) and are not followed.
    pub fn tree_paths(&self, root_id: &NodeId) -> Vec<String> {
        let state = self.state();

        let mut paths = Vec::new();
        let mut pending: Vec<(String, Node)> = state
            .children(root_id)
            .into_iter()
            .rev()
            .map(|child| (String::new(), child))
            .collect();

        while let Some((prefix, node)) = pending.pop() {
            let path = format!("{}{}", prefix, node.name);

            match &node.kind {
                NodeKind::Folder => {
                    let folder_prefix = format!("{}/", path);
                    paths.push(folder_prefix.clone());

                    pending.extend(
                        state
                            .children(&node.id)
                            .into_iter()
                            .rev()
                            .map(|child| (folder_prefix.clone(), child)),
                    );
                }
                NodeKind::File { .. } => paths.push(path),
                NodeKind::Shortcut { target } => {
                    let target = target
                        .as_ref()
                        .map(|target| target.id.to_string())
                        .unwrap_or_else(|| "?".to_string());

                    paths.push(format!("{} -> {}", path, target));
                }
            }
        }

        paths
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}



impl StorageService for InMemoryStorage {
    fn list_children(
        &self,
        parent_id: &NodeId,
        page_token: Option<&str>,
    ) -> Result<ListPage, StorageError> {
        let mut state = self.state();
        state.record(StorageCall::ListChildren {
            parent_id: parent_id.clone(),
            page_token: page_token.map(str::to_string),
        })?;

        state.lookup(parent_id)?;

        let offset = match page_token {
            None => 0,
            Some(token) => token.parse::<usize>().map_err(|_| StorageError::Rejected {
                status: 400,
                reason: Some("invalidPageToken".to_string()),
                message: format!("invalid page token: {}", token),
            })?,
        };

        let children = state.children(parent_id);
        let page_end = (offset + self.page_size).min(children.len());

        let next_page_token = if page_end < children.len() {
            Some(page_end.to_string())
        } else {
            None
        };

        Ok(ListPage {
            items: children
                .into_iter()
                .skip(offset)
                .take(page_end.saturating_sub(offset))
                .collect(),
            next_page_token,
        })
    }

    fn get_node(&self, node_id: &NodeId) -> Result<Node, StorageError> {
        let mut state = self.state();
        state.record(StorageCall::GetNode {
            node_id: node_id.clone(),
        })?;

        state.lookup(node_id).cloned()
    }

    fn create_folder(&self, name: &str, parent_id: &NodeId) -> Result<Node, StorageError> {
        let mut state = self.state();
        state.record(StorageCall::CreateFolder {
            name: name.to_string(),
            parent_id: parent_id.clone(),
        })?;

        state.lookup_folder(parent_id)?;

        Ok(state.insert("folder", name, NodeKind::Folder, vec![parent_id.clone()]))
    }

    fn copy_file(
        &self,
        source_file_id: &NodeId,
        new_name: &str,
        parent_id: &NodeId,
    ) -> Result<Node, StorageError> {
        let mut state = self.state();
        state.record(StorageCall::CopyFile {
            source_file_id: source_file_id.clone(),
            new_name: new_name.to_string(),
            parent_id: parent_id.clone(),
        })?;

        let source_file = state.lookup(source_file_id)?;
        if source_file.is_folder() {
            return Err(StorageError::Rejected {
                status: 403,
                reason: Some("fileNotCopyable".to_string()),
                message: format!("{} is a folder and can't be copied", source_file_id),
            });
        }

        let copied_kind = source_file.kind.clone();
        state.lookup_folder(parent_id)?;

        Ok(state.insert("copy", new_name, copied_kind, vec![parent_id.clone()]))
    }

    fn grant_permission(
        &self,
        node_id: &NodeId,
        permission: &PermissionGrant,
    ) -> Result<(), StorageError> {
        let mut state = self.state();
        state.record(StorageCall::GrantPermission {
            node_id: node_id.clone(),
            permission: permission.clone(),
        })?;

        state.lookup(node_id)?;

        state
            .permissions
            .entry(node_id.clone())
            .or_default()
            .push(permission.clone());

        Ok(())
    }
}
