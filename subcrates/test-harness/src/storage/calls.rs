use drive_grant::{node::NodeId, storage::PermissionGrant};


/// A single call made to an [`InMemoryStorage`](super::InMemoryStorage), as recorded in its call log.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum StorageCall {
    ListChildren {
        parent_id: NodeId,
        page_token: Option<String>,
    },
    GetNode {
        node_id: NodeId,
    },
    CreateFolder {
        name: String,
        parent_id: NodeId,
    },
    CopyFile {
        source_file_id: NodeId,
        new_name: String,
        parent_id: NodeId,
    },
    GrantPermission {
        node_id: NodeId,
        permission: PermissionGrant,
    },
}

impl StorageCall {
    /// Returns `true` for calls that write to storage.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            StorageCall::CreateFolder { .. }
                | StorageCall::CopyFile { .. }
                | StorageCall::GrantPermission { .. }
        )
    }
}
