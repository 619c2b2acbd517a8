//! The hosted file-storage service this crate copies from and into.
//!
//! Everything in this crate talks to storage through the [`StorageService`] trait.
//! With the `drive-http` feature (enabled by default), [`DriveClient`] implements it
//! on top of the Google Drive v3 REST API.
//!
//! <br>
//!
//! ##### Operations
//!
//! | method | used by |
//! |--------|---------|
//! | [`StorageService::list_children`] | [`copy_folder_contents`] |
//! | [`StorageService::get_node`] | [`is_descendant`], [`AccessGranter::grant_access`] |
//! | [`StorageService::create_folder`] | [`copy_folder_contents`], [`AccessGranter::grant_access`] |
//! | [`StorageService::copy_file`] | [`copy_folder_contents`] |
//! | [`StorageService::grant_permission`] | [`AccessGranter::grant_access`] |
//!
//!
//! [`copy_folder_contents`]: crate::folder::copy_folder_contents
//! [`is_descendant`]: crate::folder::is_descendant
//! [`AccessGranter::grant_access`]: crate::grant::AccessGranter::grant_access

use std::{fmt, sync::Arc};

use crate::{
    error::StorageError,
    node::{Node, NodeId},
};

cfg_if::cfg_if! {
    if #[cfg(feature = "drive-http")] {
        mod drive;

        pub use drive::*;
    }
}



/// One page of a folder listing.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ListPage {
    /// Nodes on this page.
    pub items: Vec<Node>,

    /// Continuation token for the next page, or `None` if this was the last page.
    pub next_page_token: Option<String>,
}


/// Role granted by a permission.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PermissionRole {
    /// Can view and download.
    Reader,

    /// Can view and comment.
    Commenter,

    /// Can edit.
    Writer,
}

impl PermissionRole {
    /// Returns the role name the storage service uses.
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionRole::Reader => "reader",
            PermissionRole::Commenter => "commenter",
            PermissionRole::Writer => "writer",
        }
    }
}

impl fmt::Display for PermissionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


/// A permission to grant a single user.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PermissionGrant {
    /// E-mail address of the user.
    pub email_address: String,

    /// Role to grant.
    pub role: PermissionRole,

    /// Whether the storage service should e-mail the user about the new permission.
    pub send_notification_email: bool,
}

impl PermissionGrant {
    /// A read-only permission for `email_address`, without a notification e-mail.
    pub fn reader<S>(email_address: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            email_address: email_address.into(),
            role: PermissionRole::Reader,
            send_notification_email: false,
        }
    }
}



/// A hierarchical file-storage service.
///
/// Implementations are expected to be blocking; each call is one remote request
/// (or one page of one). None of the methods retry.
pub trait StorageService {
    /// Lists one page of the non-trashed direct children of `parent_id`.
    ///
    /// Pass the previous page's [`ListPage::next_page_token`] as `page_token`
    /// to continue a listing.
    fn list_children(
        &self,
        parent_id: &NodeId,
        page_token: Option<&str>,
    ) -> Result<ListPage, StorageError>;

    /// Fetches metadata (including parents and shortcut target) of a single node.
    fn get_node(&self, node_id: &NodeId) -> Result<Node, StorageError>;

    /// Creates a new, empty folder named `name` with `parent_id` as its only parent.
    fn create_folder(&self, name: &str, parent_id: &NodeId) -> Result<Node, StorageError>;

    /// Copies the file `source_file_id` into `parent_id`, naming the copy `new_name`.
    fn copy_file(
        &self,
        source_file_id: &NodeId,
        new_name: &str,
        parent_id: &NodeId,
    ) -> Result<Node, StorageError>;

    /// Grants `permission` on `node_id`.
    fn grant_permission(
        &self,
        node_id: &NodeId,
        permission: &PermissionGrant,
    ) -> Result<(), StorageError>;
}


impl<S> StorageService for &S
where
    S: StorageService + ?Sized,
{
    fn list_children(
        &self,
        parent_id: &NodeId,
        page_token: Option<&str>,
    ) -> Result<ListPage, StorageError> {
        (**self).list_children(parent_id, page_token)
    }

    fn get_node(&self, node_id: &NodeId) -> Result<Node, StorageError> {
        (**self).get_node(node_id)
    }

    fn create_folder(&self, name: &str, parent_id: &NodeId) -> Result<Node, StorageError> {
        (**self).create_folder(name, parent_id)
    }

    fn copy_file(
        &self,
        source_file_id: &NodeId,
        new_name: &str,
        parent_id: &NodeId,
    ) -> Result<Node, StorageError> {
        (**self).copy_file(source_file_id, new_name, parent_id)
    }

    fn grant_permission(
        &self,
        node_id: &NodeId,
        permission: &PermissionGrant,
    ) -> Result<(), StorageError> {
        (**self).grant_permission(node_id, permission)
    }
}


impl<S> StorageService for Arc<S>
where
    S: StorageService + ?Sized,
{
    fn list_children(
        &self,
        parent_id: &NodeId,
        page_token: Option<&str>,
    ) -> Result<ListPage, StorageError> {
        (**self).list_children(parent_id, page_token)
    }

    fn get_node(&self, node_id: &NodeId) -> Result<Node, StorageError> {
        (**self).get_node(node_id)
    }

    fn create_folder(&self, name: &str, parent_id: &NodeId) -> Result<Node, StorageError> {
        (**self).create_folder(name, parent_id)
    }

    fn copy_file(
        &self,
        source_file_id: &NodeId,
        new_name: &str,
        parent_id: &NodeId,
    ) -> Result<Node, StorageError> {
        (**self).copy_file(source_file_id, new_name, parent_id)
    }

    fn grant_permission(
        &self,
        node_id: &NodeId,
        permission: &PermissionGrant,
    ) -> Result<(), StorageError> {
        (**self).grant_permission(node_id, permission)
    }
}
