use std::sync::Arc;

use drive_grant::{
    config::GrantDefaults,
    error::{CopyFolderError, FolderTopologyError, GrantAccessError, GrantErrorKind},
    folder::{SkipReason, SkippedItem},
    grant::{AccessGranter, BuyerFolder, GrantAccessRequest},
    node::NodeId,
    storage::{PermissionGrant, PermissionRole},
};
use drive_grant_test_harness::prelude::*;


fn storefront_granter(tree: &StorefrontTree) -> AccessGranter<&InMemoryStorage> {
    AccessGranter::new(
        &tree.storage,
        GrantDefaults {
            template_folder_id: Some(tree.template.clone()),
            orders_folder_id: Some(tree.orders.clone()),
        },
    )
}



#[test]
pub fn grant_access_copies_template_into_shared_buyer_folder() -> TestResult<()> {
    let tree = StorefrontTree::new();
    let granter = storefront_granter(&tree);

    let result = granter
        .grant_access(
            GrantAccessRequest::new("buyer@example.com").with_folder_name("Order #1042"),
        )
        .unwrap_or_else(|error| {
            panic!("grant_access unexpectedly failed with Err: {}", error);
        });


    assert_eq!(result.name, "Order #1042");
    assert!(result.web_view_link.is_some());

    let buyer_folder = tree.storage.node(&result.folder_id).unwrap();
    assert!(buyer_folder.is_folder());
    assert_eq!(buyer_folder.parents, vec![tree.orders.clone()]);
    assert_eq!(result.buyer_folder(), BuyerFolder::from(buyer_folder));

    assert_eq!(
        result
            .files
            .iter()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>(),
        vec!["Docs", "a.txt", "root.txt"]
    );
    assert_eq!(
        tree.storage.tree_paths(&result.folder_id),
        vec!["Docs/", "Docs/a.txt", "root.txt"]
    );
    assert!(result.skipped.is_empty());

    assert_eq!(
        tree.storage.permissions(&result.folder_id),
        vec![PermissionGrant {
            email_address: "buyer@example.com".to_string(),
            role: PermissionRole::Reader,
            send_notification_email: false,
        }]
    );

    Ok(())
}


#[test]
pub fn permission_is_granted_before_anything_is_copied() -> TestResult<()> {
    let tree = StorefrontTree::new();
    let granter = storefront_granter(&tree);

    let result = granter.grant_access(GrantAccessRequest::new("buyer@example.com"))?;

    let write_calls = tree
        .storage
        .calls()
        .into_iter()
        .filter(StorageCall::is_write)
        .collect::<Vec<_>>();

    assert_matches!(
        &write_calls[0],
        StorageCall::CreateFolder { parent_id, .. } if parent_id == &tree.orders
    );
    assert_matches!(
        &write_calls[1],
        StorageCall::GrantPermission { node_id, .. } if node_id == &result.folder_id
    );
    assert!(
        write_calls[2..]
            .iter()
            .all(|call| !matches!(call, StorageCall::GrantPermission { .. })),
        "permission was granted more than once"
    );
    assert_eq!(write_calls.len(), 2 + result.files.len());

    Ok(())
}


#[test]
pub fn buyer_folder_name_defaults_to_buyer_email() -> TestResult<()> {
    let tree = StorefrontTree::new();
    let granter = storefront_granter(&tree);

    let result = granter.grant_access(GrantAccessRequest::new("  buyer@example.com "))?;

    assert_eq!(result.name, "Order - buyer@example.com");
    assert_eq!(
        tree.storage.permissions(&result.folder_id)[0].email_address,
        "buyer@example.com"
    );

    tree.storage.clear_calls();

    let blank_name_result = granter.grant_access(
        GrantAccessRequest::new("other@example.com").with_folder_name("   "),
    )?;
    assert_eq!(blank_name_result.name, "Order - other@example.com");
    assert_eq!(
        tree.storage.write_call_count(),
        2 + blank_name_result.files.len()
    );

    Ok(())
}


#[test]
pub fn request_folders_override_configured_defaults() -> TestResult<()> {
    let tree = StorefrontTree::new();
    let other_orders = tree.storage.add_folder("Other orders", &tree.my_drive);
    let granter = storefront_granter(&tree);

    let result = granter.grant_access(
        GrantAccessRequest::new("buyer@example.com")
            .with_template_folder(tree.docs.clone())
            .with_destination_folder(other_orders.clone()),
    )?;

    assert_eq!(
        tree.storage.node(&result.folder_id).unwrap().parents,
        vec![other_orders]
    );
    assert_eq!(tree.storage.tree_paths(&result.folder_id), vec!["a.txt"]);

    Ok(())
}


#[test]
pub fn orders_folder_shortcut_is_followed_once() -> TestResult<()> {
    let tree = StorefrontTree::new();
    let orders_shortcut = tree
        .storage
        .add_shortcut("Orders (shortcut)", &tree.products, &tree.orders);

    let granter = AccessGranter::new(
        &tree.storage,
        GrantDefaults {
            template_folder_id: Some(tree.template.clone()),
            orders_folder_id: Some(orders_shortcut),
        },
    );

    let result = granter.grant_access(GrantAccessRequest::new("buyer@example.com"))?;

    assert_eq!(
        tree.storage.node(&result.folder_id).unwrap().parents,
        vec![tree.orders.clone()],
        "buyer folder was not created inside the shortcut's target"
    );

    Ok(())
}


#[test]
pub fn granter_can_be_shared_between_threads() -> TestResult<()> {
    let tree = StorefrontTree::new();
    let storage = Arc::new(tree.storage);

    let granter = Arc::new(AccessGranter::new(
        Arc::clone(&storage),
        GrantDefaults {
            template_folder_id: Some(tree.template.clone()),
            orders_folder_id: Some(tree.orders.clone()),
        },
    ));

    let handles = (0..4)
        .map(|buyer_index| {
            let granter = Arc::clone(&granter);

            std::thread::spawn(move || {
                granter.grant_access(GrantAccessRequest::new(format!(
                    "buyer-{}@example.com",
                    buyer_index
                )))
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        let result = handle.join().unwrap()?;
        assert_eq!(granter.storage().tree_paths(&result.folder_id).len(), 3);
    }

    assert_eq!(storage.children(&tree.orders).len(), 4);

    Ok(())
}



#[test]
pub fn paginated_listings_produce_the_same_buyer_folder() -> TestResult<()> {
    let tree = StorefrontTree::with_page_size(1);
    let granter = storefront_granter(&tree);

    let result = granter.grant_access(GrantAccessRequest::new("buyer@example.com"))?;

    assert_eq!(
        tree.storage.tree_paths(&result.folder_id),
        vec!["Docs/", "Docs/a.txt", "root.txt"]
    );
    assert!(tree.storage.calls().iter().any(|call| matches!(
        call,
        StorageCall::ListChildren { parent_id, page_token: Some(_) } if parent_id == &tree.template
    )));

    Ok(())
}


#[test]
pub fn template_shortcut_to_the_orders_folder_does_not_copy_the_buyer_folder() -> TestResult<()> {
    let tree = StorefrontTree::new();
    tree.storage.add_shortcut("All orders", &tree.template, &tree.orders);

    let granter = storefront_granter(&tree);
    assert_eq!(
        granter.defaults().orders_folder_id.as_ref(),
        Some(&tree.orders)
    );

    let nodes_before_grant = granter.storage().node_count();
    let mut progress_reports = 0;

    let result = granter.grant_access_with_progress(
        GrantAccessRequest::new("buyer@example.com"),
        |_| {
            progress_reports += 1;
            assert!(progress_reports <= 10, "copy keeps creating folders");
        },
    )?;

    assert_eq!(
        tree.storage.tree_paths(&result.folder_id),
        vec!["Docs/", "Docs/a.txt", "root.txt", "All orders/"]
    );
    assert_eq!(
        result.skipped,
        vec![SkippedItem {
            source_id: result.folder_id.clone(),
            name: "Order - buyer@example.com".to_string(),
            reason: SkipReason::SourceCycle,
        }]
    );

    // The buyer folder plus everything listed in the result.
    assert_eq!(
        tree.storage.node_count(),
        nodes_before_grant + 1 + result.files.len()
    );

    Ok(())
}


#[test]
pub fn missing_buyer_email_is_a_configuration_error() -> TestResult<()> {
    let tree = StorefrontTree::new();
    let granter = storefront_granter(&tree);

    let error = granter
        .grant_access(GrantAccessRequest::new("   "))
        .unwrap_err();

    assert_matches!(error, GrantAccessError::MissingBuyerEmail);
    assert_eq!(error.kind(), GrantErrorKind::Configuration);
    assert!(tree.storage.calls().is_empty());

    Ok(())
}


#[test]
pub fn missing_template_folder_is_a_configuration_error() -> TestResult<()> {
    let tree = StorefrontTree::new();
    let granter = AccessGranter::new(&tree.storage, GrantDefaults::default());

    let error = granter
        .grant_access(GrantAccessRequest::new("buyer@example.com"))
        .unwrap_err();

    assert_matches!(error, GrantAccessError::MissingTemplateFolderId);
    assert_eq!(error.kind(), GrantErrorKind::Configuration);

    let blank_template_error = granter
        .grant_access(
            GrantAccessRequest::new("buyer@example.com").with_template_folder(NodeId::new(" ")),
        )
        .unwrap_err();
    assert_matches!(
        blank_template_error,
        GrantAccessError::MissingTemplateFolderId
    );

    Ok(())
}



#[test]
pub fn same_template_and_orders_folder_is_rejected() -> TestResult<()> {
    let tree = StorefrontTree::new();
    let granter = AccessGranter::new(
        &tree.storage,
        GrantDefaults {
            template_folder_id: Some(tree.template.clone()),
            orders_folder_id: None,
        },
    );

    // Without any orders folder, the template folder itself is used.
    let error = granter
        .grant_access(GrantAccessRequest::new("buyer@example.com"))
        .unwrap_err();

    assert_matches!(
        &error,
        GrantAccessError::InvalidTopology(FolderTopologyError::SameFolder { folder_id })
            if folder_id == &tree.template
    );
    assert_eq!(error.kind(), GrantErrorKind::Topology);
    assert_eq!(tree.storage.write_call_count(), 0);

    Ok(())
}


#[test]
pub fn orders_folder_inside_template_is_rejected() -> TestResult<()> {
    let tree = StorefrontTree::new();
    let granter = storefront_granter(&tree);

    let error = granter
        .grant_access(
            GrantAccessRequest::new("buyer@example.com").with_destination_folder(tree.docs.clone()),
        )
        .unwrap_err();

    assert_matches!(
        &error,
        GrantAccessError::InvalidTopology(FolderTopologyError::OrdersFolderInsideTemplate {
            orders_folder_id,
            template_folder_id,
        }) if orders_folder_id == &tree.docs && template_folder_id == &tree.template
    );
    assert_eq!(tree.storage.write_call_count(), 0);

    Ok(())
}


#[test]
pub fn template_inside_orders_folder_is_rejected() -> TestResult<()> {
    let tree = StorefrontTree::new();
    let granter = storefront_granter(&tree);

    let error = granter
        .grant_access(
            GrantAccessRequest::new("buyer@example.com")
                .with_destination_folder(tree.products.clone()),
        )
        .unwrap_err();

    assert_matches!(
        &error,
        GrantAccessError::InvalidTopology(FolderTopologyError::TemplateInsideOrdersFolder {
            template_folder_id,
            orders_folder_id,
        }) if template_folder_id == &tree.template && orders_folder_id == &tree.products
    );
    assert_eq!(error.kind(), GrantErrorKind::Topology);
    assert_eq!(tree.storage.write_call_count(), 0);

    Ok(())
}


#[test]
pub fn topology_is_checked_against_the_shortcut_target() -> TestResult<()> {
    let tree = StorefrontTree::new();

    // The shortcut itself lives outside the template, but points into it.
    let docs_shortcut = tree
        .storage
        .add_shortcut("Docs (shortcut)", &tree.my_drive, &tree.docs);

    let granter = storefront_granter(&tree);

    let error = granter
        .grant_access(
            GrantAccessRequest::new("buyer@example.com").with_destination_folder(docs_shortcut),
        )
        .unwrap_err();

    assert_matches!(
        error,
        GrantAccessError::InvalidTopology(FolderTopologyError::OrdersFolderInsideTemplate {
            orders_folder_id,
            ..
        }) if orders_folder_id == tree.docs
    );
    assert_eq!(tree.storage.write_call_count(), 0);

    Ok(())
}



#[test]
pub fn unknown_orders_folder_is_a_remote_error() -> TestResult<()> {
    let tree = StorefrontTree::new();
    let granter = storefront_granter(&tree);
    let missing = NodeId::new("missing-orders-folder");

    let error = granter
        .grant_access(
            GrantAccessRequest::new("buyer@example.com").with_destination_folder(missing.clone()),
        )
        .unwrap_err();

    assert_matches!(
        &error,
        GrantAccessError::UnableToFetchOrdersFolder { folder_id, .. } if folder_id == &missing
    );
    assert_eq!(error.kind(), GrantErrorKind::RemoteOperation);
    assert_eq!(error.storage_error().and_then(|error| error.status_code()), Some(404));

    Ok(())
}


#[test]
pub fn ancestry_lookup_failure_aborts_before_any_write() -> TestResult<()> {
    let tree = StorefrontTree::new();
    tree.storage.fail(FailOn::GetNode(tree.products.clone()));

    let granter = storefront_granter(&tree);

    let error = granter
        .grant_access(GrantAccessRequest::new("buyer@example.com"))
        .unwrap_err();

    assert_matches!(error, GrantAccessError::AncestryCheckFailed(_));
    assert_eq!(error.kind(), GrantErrorKind::RemoteOperation);
    assert_eq!(tree.storage.write_call_count(), 0);

    Ok(())
}


#[test]
pub fn permission_failure_reports_the_created_folder() -> TestResult<()> {
    let tree = StorefrontTree::new();
    tree.storage
        .fail_with(FailOn::GrantPermission, 400, Some("invalidSharingRequest"));

    let granter = storefront_granter(&tree);

    let error = granter
        .grant_access(GrantAccessRequest::new("buyer@example.com"))
        .unwrap_err();

    let buyer_folder = tree
        .storage
        .child_named(&tree.orders, "Order - buyer@example.com")
        .unwrap();

    assert_matches!(
        &error,
        GrantAccessError::UnableToGrantPermission { folder_id, email_address, error }
            if folder_id == &buyer_folder.id
                && email_address == "buyer@example.com"
                && error.reason() == Some("invalidSharingRequest")
    );
    assert_eq!(error.created_buyer_folder_id(), Some(&buyer_folder.id));

    // Nothing is copied into a folder the buyer can't see.
    assert!(tree.storage.children(&buyer_folder.id).is_empty());

    Ok(())
}


#[test]
pub fn copy_failure_reports_the_shared_buyer_folder() -> TestResult<()> {
    let tree = StorefrontTree::new();
    tree.storage.fail(FailOn::CopyFile(tree.root_txt.clone()));

    let granter = storefront_granter(&tree);

    let error = granter
        .grant_access(GrantAccessRequest::new("buyer@example.com"))
        .unwrap_err();

    let buyer_folder = tree
        .storage
        .child_named(&tree.orders, "Order - buyer@example.com")
        .unwrap();

    assert_matches!(
        &error,
        GrantAccessError::CopyFailed {
            buyer_folder: reported_folder,
            error: CopyFolderError::UnableToCopyFile { source_file_id, .. },
        } if reported_folder.id == buyer_folder.id && source_file_id == &tree.root_txt
    );
    assert_eq!(error.kind(), GrantErrorKind::RemoteOperation);
    assert_eq!(error.created_buyer_folder_id(), Some(&buyer_folder.id));

    // Already shared, and already partially filled: nothing is rolled back.
    assert_eq!(tree.storage.permissions(&buyer_folder.id).len(), 1);
    assert_eq!(
        tree.storage.tree_paths(&buyer_folder.id),
        vec!["Docs/", "Docs/a.txt"]
    );

    Ok(())
}



#[test]
pub fn grant_access_with_progress_reports_the_copy() -> TestResult<()> {
    let tree = ShortcutTree::new();
    let granter = AccessGranter::new(
        &tree.storage,
        GrantDefaults {
            template_folder_id: Some(tree.template.clone()),
            orders_folder_id: Some(tree.destination.clone()),
        },
    );

    let mut last_progress = None;

    let result = granter.grant_access_with_progress(
        GrantAccessRequest::new("buyer@example.com"),
        |progress| last_progress = Some(progress.clone()),
    )?;

    let last_progress = last_progress.expect("no progress was reported");

    assert_eq!(
        last_progress.folders_created + last_progress.files_copied,
        result.files.len()
    );
    assert_eq!(last_progress.items_skipped, 2);
    assert_eq!(result.skipped.len(), 2);

    Ok(())
}


#[test]
pub fn grant_result_serializes_with_camel_case_fields() -> TestResult<()> {
    let tree = StorefrontTree::new();
    let granter = storefront_granter(&tree);

    let result = granter.grant_access(GrantAccessRequest::new("buyer@example.com"))?;

    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["folderId"], result.folder_id.as_str());
    assert_eq!(json["name"], "Order - buyer@example.com");
    assert!(json["webViewLink"].is_string());
    assert_eq!(json["files"].as_array().unwrap().len(), 3);
    assert_eq!(json["files"][0]["mimeType"], "application/vnd.google-apps.folder");
    assert_eq!(json["skipped"].as_array().unwrap().len(), 0);

    Ok(())
}


#[test]
pub fn grant_request_deserializes_from_camel_case_json() -> TestResult<()> {
    let request: GrantAccessRequest = serde_json::from_str(
        r#"{ "buyerEmail": "buyer@example.com", "folderName": "Order #7", "destinationFolderId": "abc" }"#,
    )
    .unwrap();

    assert_eq!(
        request,
        GrantAccessRequest::new("buyer@example.com")
            .with_folder_name("Order #7")
            .with_destination_folder("abc")
    );

    Ok(())
}
