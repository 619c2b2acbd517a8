use drive_grant::{error::StorageError, node::NodeId};

use super::calls::StorageCall;


/// Which call an injected failure applies to.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FailOn {
    /// Listing the children of the given folder.
    ListChildren(NodeId),

    /// Fetching the given node.
    GetNode(NodeId),

    /// Creating a folder with the given name (anywhere).
    CreateFolder(String),

    /// Copying the given source file.
    CopyFile(NodeId),

    /// Granting any permission.
    GrantPermission,
}

impl FailOn {
    pub(super) fn matches(&self, call: &StorageCall) -> bool {
        match (self, call) {
            (FailOn::ListChildren(id), StorageCall::ListChildren { parent_id, .. }) => {
                id == parent_id
            }
            (FailOn::GetNode(id), StorageCall::GetNode { node_id }) => id == node_id,
            (FailOn::CreateFolder(expected_name), StorageCall::CreateFolder { name, .. }) => {
                expected_name == name
            }
            (FailOn::CopyFile(id), StorageCall::CopyFile { source_file_id, .. }) => {
                id == source_file_id
            }
            (FailOn::GrantPermission, StorageCall::GrantPermission { .. }) => true,
            _ => false,
        }
    }
}


/// A failure that every matching call will return, until cleared.
#[derive(Clone, PartialEq, Eq, Debug)]
pub(super) struct InjectedFailure {
    pub(super) fail_on: FailOn,
    pub(super) status: u16,
    pub(super) reason: Option<String>,
}

impl InjectedFailure {
    pub(super) fn to_storage_error(&self) -> StorageError {
        StorageError::Rejected {
            status: self.status,
            reason: self.reason.clone(),
            message: format!("injected failure ({:?})", self.fail_on),
        }
    }
}
