use tracing::debug;

use super::GrantAccessRequest;
use crate::{
    config::GrantDefaults,
    error::{FolderTopologyError, GrantAccessError},
    folder::is_descendant,
    node::NodeId,
    storage::StorageService,
};


/// Returns the value only if it's present and not blank.
fn non_blank_id(id: Option<NodeId>) -> Option<NodeId> {
    id.filter(|id| !id.is_empty())
}


/// Fetches the requested orders folder, following at most one shortcut.
///
/// Returns the id of the folder buyer folders should actually be created in.
fn resolve_orders_folder<S>(
    storage: &S,
    requested_orders_folder_id: &NodeId,
) -> Result<NodeId, GrantAccessError>
where
    S: StorageService + ?Sized,
{
    let orders_folder = storage
        .get_node(requested_orders_folder_id)
        .map_err(|error| GrantAccessError::UnableToFetchOrdersFolder {
            folder_id: requested_orders_folder_id.clone(),
            error,
        })?;

    let Some(shortcut_target) = orders_folder.shortcut_target().cloned() else {
        return Ok(orders_folder.id);
    };

    debug!(
        shortcut_id = %orders_folder.id,
        target_id = %shortcut_target.id,
        "orders folder is a shortcut, resolving its target"
    );

    // Exactly one level of indirection: the target is not checked for being a shortcut again.
    let target_folder = storage.get_node(&shortcut_target.id).map_err(|error| {
        GrantAccessError::UnableToFetchOrdersFolder {
            folder_id: shortcut_target.id,
            error,
        }
    })?;

    Ok(target_folder.id)
}


/// Ensures the template and orders folders don't overlap.
///
/// This means that:
/// - they are not the same folder,
/// - the orders folder is not inside the template folder, and
/// - the template folder is not inside the orders folder.
pub(super) fn validate_template_and_orders_folder_pair<S>(
    storage: &S,
    template_folder_id: &NodeId,
    orders_folder_id: &NodeId,
) -> Result<(), GrantAccessError>
where
    S: StorageService + ?Sized,
{
    if orders_folder_id == template_folder_id {
        return Err(FolderTopologyError::SameFolder {
            folder_id: orders_folder_id.clone(),
        }
        .into());
    }

    if is_descendant(storage, orders_folder_id, template_folder_id)? {
        return Err(FolderTopologyError::OrdersFolderInsideTemplate {
            orders_folder_id: orders_folder_id.clone(),
            template_folder_id: template_folder_id.clone(),
        }
        .into());
    }

    if is_descendant(storage, template_folder_id, orders_folder_id)? {
        return Err(FolderTopologyError::TemplateInsideOrdersFolder {
            template_folder_id: template_folder_id.clone(),
            orders_folder_id: orders_folder_id.clone(),
        }
        .into());
    }

    Ok(())
}



/// An auxiliary struct that prepares an access grant.
///
/// Preparation validates the request, resolves the template and orders folders
/// and checks their topology. Nothing is written to storage during preparation.
#[derive(Clone, PartialEq, Eq, Debug)]
pub(super) struct PreparedGrant {
    pub(super) buyer_email: String,

    pub(super) template_folder_id: NodeId,

    /// The resolved orders folder (shortcuts already followed).
    pub(super) orders_folder_id: NodeId,

    pub(super) buyer_folder_name: String,
}

impl PreparedGrant {
    pub(super) fn prepare<S>(
        storage: &S,
        defaults: &GrantDefaults,
        request: GrantAccessRequest,
    ) -> Result<Self, GrantAccessError>
    where
        S: StorageService + ?Sized,
    {
        let buyer_email = request.buyer_email.trim().to_string();
        if buyer_email.is_empty() {
            return Err(GrantAccessError::MissingBuyerEmail);
        }

        let template_folder_id = non_blank_id(request.template_folder_id)
            .or_else(|| non_blank_id(defaults.template_folder_id.clone()))
            .ok_or(GrantAccessError::MissingTemplateFolderId)?;

        // Without any orders folder, buyer folders would land inside the template,
        // which the topology check below rejects.
        let requested_orders_folder_id = non_blank_id(request.destination_folder_id)
            .or_else(|| non_blank_id(defaults.orders_folder_id.clone()))
            .unwrap_or_else(|| template_folder_id.clone());

        let orders_folder_id = resolve_orders_folder(storage, &requested_orders_folder_id)?;

        validate_template_and_orders_folder_pair(storage, &template_folder_id, &orders_folder_id)?;

        let buyer_folder_name = request
            .folder_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("Order - {}", buyer_email));

        Ok(Self {
            buyer_email,
            template_folder_id,
            orders_folder_id,
            buyer_folder_name,
        })
    }
}
