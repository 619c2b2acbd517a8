use std::collections::{HashSet, VecDeque};

use tracing::trace;

use crate::{error::AncestryCheckError, node::NodeId, storage::StorageService};


/// Returns `true` if `child_id` is a transitive descendant of `ancestor_id`.
///
/// A node is never its own descendant, and an empty id is never a descendant
/// or an ancestor of anything; both cases return `false` without touching storage.
///
///
/// # Walk
/// The check walks parent links upward, breadth-first, starting at `child_id`.
/// Each visited node costs one [`StorageService::get_node`] call.
/// The walk stops with `true` as soon as `ancestor_id` appears among any visited node's
/// parents, and with `false` once there are no unvisited parents left.
///
/// Storage services allow multiple parents per node, so the upward graph can contain
/// converging paths. Every node is fetched at most once; the walk terminates
/// even if the parent links of a malformed tree form a cycle.
///
///
/// # Errors
/// If any lookup fails, the whole check fails with
/// [`AncestryCheckError::UnableToFetchNode`]; there is no best-effort answer.
pub fn is_descendant<S>(
    storage: &S,
    child_id: &NodeId,
    ancestor_id: &NodeId,
) -> Result<bool, AncestryCheckError>
where
    S: StorageService + ?Sized,
{
    if child_id.is_empty() || ancestor_id.is_empty() || child_id == ancestor_id {
        return Ok(false);
    }

    let mut pending_nodes = VecDeque::from([child_id.clone()]);
    let mut visited_nodes: HashSet<NodeId> = HashSet::new();

    while let Some(node_id) = pending_nodes.pop_front() {
        if !visited_nodes.insert(node_id.clone()) {
            continue;
        }

        let node = storage.get_node(&node_id).map_err(|error| {
            AncestryCheckError::UnableToFetchNode {
                node_id: node_id.clone(),
                error,
            }
        })?;

        trace!(
            node_id = %node_id,
            parents = node.parents.len(),
            "visited node during ancestry check"
        );

        if node.parents.contains(ancestor_id) {
            return Ok(true);
        }

        pending_nodes.extend(
            node.parents
                .into_iter()
                .filter(|parent_id| !visited_nodes.contains(parent_id)),
        );
    }

    Ok(false)
}
