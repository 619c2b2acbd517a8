//! Per-buyer access grants: create a buyer folder, share it, copy the template into it.

use serde::{Deserialize, Serialize};
use tracing::info;

use self::prepared::PreparedGrant;
use crate::{
    config::GrantDefaults,
    error::GrantAccessError,
    folder::{copy_folder_contents_with_progress, CopyFolderProgress, SkippedItem},
    node::{ManifestEntry, Node, NodeId},
    storage::{PermissionGrant, StorageService},
};

mod prepared;



/// A request to grant a buyer access to a copy of a template.
#[derive(Clone, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantAccessRequest {
    /// E-mail address of the buyer. Required.
    pub buyer_email: String,

    /// Template folder to copy.
    ///
    /// Falls back to [`GrantDefaults::template_folder_id`].
    #[serde(default)]
    pub template_folder_id: Option<NodeId>,

    /// Name of the buyer folder.
    ///
    /// Defaults to `Order - <buyer e-mail>`.
    #[serde(default)]
    pub folder_name: Option<String>,

    /// Folder to create the buyer folder in (the orders folder).
    ///
    /// Falls back to [`GrantDefaults::orders_folder_id`], and then to the template folder itself,
    /// which is always rejected as overlapping.
    #[serde(default)]
    pub destination_folder_id: Option<NodeId>,
}

impl GrantAccessRequest {
    /// A request for `buyer_email`, with everything else left to the defaults.
    pub fn new<S>(buyer_email: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            buyer_email: buyer_email.into(),
            ..Default::default()
        }
    }

    /// Sets the template folder to copy.
    pub fn with_template_folder<I>(mut self, template_folder_id: I) -> Self
    where
        I: Into<NodeId>,
    {
        self.template_folder_id = Some(template_folder_id.into());
        self
    }

    /// Sets the name of the buyer folder.
    pub fn with_folder_name<S>(mut self, folder_name: S) -> Self
    where
        S: Into<String>,
    {
        self.folder_name = Some(folder_name.into());
        self
    }

    /// Sets the folder to create the buyer folder in.
    pub fn with_destination_folder<I>(mut self, destination_folder_id: I) -> Self
    where
        I: Into<NodeId>,
    {
        self.destination_folder_id = Some(destination_folder_id.into());
        self
    }
}



/// The folder created for (and shared with) a buyer.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerFolder {
    /// Identifier of the buyer folder.
    pub id: NodeId,

    /// Name of the buyer folder.
    pub name: String,

    /// Link to the buyer folder.
    pub web_view_link: Option<String>,
}

impl From<Node> for BuyerFolder {
    fn from(node: Node) -> Self {
        Self {
            id: node.id,
            name: node.name,
            web_view_link: node.web_view_link,
        }
    }
}


/// Describes a successful access grant.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantResult {
    /// Identifier of the buyer folder.
    pub folder_id: NodeId,

    /// Name of the buyer folder.
    pub name: String,

    /// Link to the buyer folder.
    pub web_view_link: Option<String>,

    /// Every folder and file copied into the buyer folder, in traversal order.
    pub files: Vec<ManifestEntry>,

    /// Template entries that were not copied.
    pub skipped: Vec<SkippedItem>,
}

impl GrantResult {
    /// Returns the buyer folder part of this result.
    pub fn buyer_folder(&self) -> BuyerFolder {
        BuyerFolder {
            id: self.folder_id.clone(),
            name: self.name.clone(),
            web_view_link: self.web_view_link.clone(),
        }
    }
}



/// Grants buyers access to their own copies of a template folder.
///
/// Holds the storage service and the [`GrantDefaults`] used for requests
/// that don't name their template or orders folder. There is no other state:
/// concurrent grants (from multiple threads, if `S` allows it) don't interact.
pub struct AccessGranter<S> {
    storage: S,
    defaults: GrantDefaults,
}

impl<S> AccessGranter<S>
where
    S: StorageService,
{
    /// Creates a new access granter.
    pub fn new(storage: S, defaults: GrantDefaults) -> Self {
        Self { storage, defaults }
    }

    /// Returns the storage service.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the configured defaults.
    pub fn defaults(&self) -> &GrantDefaults {
        &self.defaults
    }

    /// Grants a buyer read access to a fresh copy of a template folder.
    ///
    ///
    /// # Steps
    /// 1. The buyer e-mail and template folder are validated (the template folder
    ///    falls back to [`GrantDefaults::template_folder_id`]).
    /// 2. The orders folder is resolved: the request's `destination_folder_id`, else
    ///    [`GrantDefaults::orders_folder_id`], else the template folder itself.
    ///    If the orders folder is a shortcut, its target is used instead (one level only).
    /// 3. The template and orders folders must not overlap: they can't be the same folder,
    ///    and neither may be inside the other (see [`is_descendant`]).
    /// 4. A buyer folder (`folder_name`, or `Order - <buyer e-mail>`) is created in the orders folder.
    /// 5. The buyer is granted `reader` access to it, without a notification e-mail.
    /// 6. The contents of the template are copied into it (see [`copy_folder_contents`]).
    ///
    /// The buyer folder is shared *before* anything is copied into it,
    /// so the buyer has access to it even if the copy fails halfway.
    ///
    ///
    /// # Errors
    /// Returns a [`GrantAccessError`]; see [`GrantAccessError::kind`] for how to classify it.
    /// Nothing is rolled back: see the error type's documentation for which
    /// variants mean the buyer folder already exists.
    ///
    ///
    /// [`is_descendant`]: crate::folder::is_descendant
    /// [`copy_folder_contents`]: crate::folder::copy_folder_contents
    pub fn grant_access(&self, request: GrantAccessRequest) -> Result<GrantResult, GrantAccessError> {
        self.grant_access_with_progress(request, |_| {})
    }

    /// Grants a buyer read access to a fresh copy of a template folder, with progress reporting.
    ///
    /// Behaves exactly like [`Self::grant_access`]; `progress_handler` receives the
    /// progress of the template copy (see [`copy_folder_contents_with_progress`]).
    pub fn grant_access_with_progress<F>(
        &self,
        request: GrantAccessRequest,
        progress_handler: F,
    ) -> Result<GrantResult, GrantAccessError>
    where
        F: FnMut(&CopyFolderProgress),
    {
        let prepared_grant = PreparedGrant::prepare(&self.storage, &self.defaults, request)?;


        let buyer_folder: BuyerFolder = self
            .storage
            .create_folder(
                &prepared_grant.buyer_folder_name,
                &prepared_grant.orders_folder_id,
            )
            .map_err(|error| GrantAccessError::UnableToCreateBuyerFolder {
                name: prepared_grant.buyer_folder_name.clone(),
                parent_id: prepared_grant.orders_folder_id.clone(),
                error,
            })?
            .into();

        info!(
            folder_id = %buyer_folder.id,
            orders_folder_id = %prepared_grant.orders_folder_id,
            name = %buyer_folder.name,
            "created buyer folder"
        );


        self.storage
            .grant_permission(
                &buyer_folder.id,
                &PermissionGrant::reader(prepared_grant.buyer_email.as_str()),
            )
            .map_err(|error| GrantAccessError::UnableToGrantPermission {
                folder_id: buyer_folder.id.clone(),
                email_address: prepared_grant.buyer_email.clone(),
                error,
            })?;

        info!(
            folder_id = %buyer_folder.id,
            buyer_email = %prepared_grant.buyer_email,
            "granted buyer read access"
        );


        let finished_copy = match copy_folder_contents_with_progress(
            &self.storage,
            &prepared_grant.template_folder_id,
            &buyer_folder.id,
            progress_handler,
        ) {
            Ok(finished_copy) => finished_copy,
            Err(error) => {
                return Err(GrantAccessError::CopyFailed {
                    buyer_folder,
                    error,
                })
            }
        };

        info!(
            folder_id = %buyer_folder.id,
            template_folder_id = %prepared_grant.template_folder_id,
            folders_created = finished_copy.folders_created,
            files_copied = finished_copy.files_copied,
            items_skipped = finished_copy.skipped.len(),
            "copied template into buyer folder"
        );

        Ok(GrantResult {
            folder_id: buyer_folder.id,
            name: buyer_folder.name,
            web_view_link: buyer_folder.web_view_link,
            files: finished_copy.manifest,
            skipped: finished_copy.skipped,
        })
    }
}
