//! JSON records exchanged with the Google Drive v3 and OAuth2 token endpoints.

use serde::{Deserialize, Serialize};

use crate::{
    error::StorageError,
    node::{Node, NodeId, NodeKind, ShortcutTarget, FOLDER_MIME_TYPE},
    storage::{ListPage, PermissionGrant},
};


/// Fields requested for every file resource.
pub(super) const FILE_FIELDS: &str = "id,name,mimeType,parents,webViewLink,shortcutDetails";

/// Fields requested for a listing.
pub(super) const LIST_FIELDS: &str =
    "nextPageToken,files(id,name,mimeType,parents,webViewLink,shortcutDetails)";

/// Reported by Drive for files without a more specific type.
const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";



#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FileList {
    #[serde(default)]
    pub(super) files: Vec<DriveFile>,
    pub(super) next_page_token: Option<String>,
}

impl FileList {
    pub(super) fn into_list_page(self) -> ListPage {
        ListPage {
            items: self.files.into_iter().map(DriveFile::into_node).collect(),
            next_page_token: self.next_page_token.filter(|token| !token.is_empty()),
        }
    }
}


#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DriveFile {
    pub(super) id: String,
    #[serde(default)]
    pub(super) name: String,
    pub(super) mime_type: Option<String>,
    #[serde(default)]
    pub(super) parents: Vec<String>,
    pub(super) web_view_link: Option<String>,
    pub(super) shortcut_details: Option<ShortcutDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ShortcutDetails {
    pub(super) target_id: Option<String>,
    pub(super) target_mime_type: Option<String>,
}

impl DriveFile {
    pub(super) fn into_node(self) -> Node {
        let shortcut_target = self.shortcut_details.and_then(|details| {
            let target_id = details.target_id.filter(|id| !id.trim().is_empty())?;

            Some(ShortcutTarget {
                id: NodeId::new(target_id),
                mime_type: details.target_mime_type,
            })
        });

        let mime_type = self.mime_type.as_deref().unwrap_or(UNKNOWN_MIME_TYPE);

        Node {
            id: NodeId::new(self.id),
            name: self.name,
            kind: NodeKind::from_mime_type(mime_type, shortcut_target),
            parents: self.parents.into_iter().map(NodeId::new).collect(),
            web_view_link: self.web_view_link,
        }
    }
}



#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateFolderBody<'a> {
    pub(super) name: &'a str,
    pub(super) mime_type: &'static str,
    pub(super) parents: [&'a str; 1],
}

impl<'a> CreateFolderBody<'a> {
    pub(super) fn new(name: &'a str, parent_id: &'a NodeId) -> Self {
        Self {
            name,
            mime_type: FOLDER_MIME_TYPE,
            parents: [parent_id.as_str()],
        }
    }
}


#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CopyFileBody<'a> {
    pub(super) name: &'a str,
    pub(super) parents: [&'a str; 1],
}


#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PermissionBody<'a> {
    #[serde(rename = "type")]
    pub(super) grantee_type: &'static str,
    pub(super) role: &'static str,
    pub(super) email_address: &'a str,
}

impl<'a> PermissionBody<'a> {
    pub(super) fn for_user(permission: &'a PermissionGrant) -> Self {
        Self {
            grantee_type: "user",
            role: permission.role.as_str(),
            email_address: &permission.email_address,
        }
    }
}



/// Drive's error envelope: `{"error": {"code": ..., "message": ..., "errors": [...]}}`.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelope {
    pub(super) error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub(super) message: String,
    #[serde(default)]
    pub(super) errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorDetail {
    pub(super) reason: Option<String>,
}

/// Builds a [`StorageError::Rejected`] out of a non-success response body.
///
/// Bodies that aren't Drive error envelopes are kept verbatim as the message.
pub(super) fn rejection_from_body(status: u16, body: &str) -> StorageError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => StorageError::Rejected {
            status,
            reason: envelope
                .error
                .errors
                .into_iter()
                .find_map(|detail| detail.reason),
            message: envelope.error.message,
        },
        Err(_) => StorageError::Rejected {
            status,
            reason: None,
            message: body.trim().to_string(),
        },
    }
}



#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub(super) access_token: String,
    pub(super) expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenErrorResponse {
    pub(super) error: String,
    pub(super) error_description: Option<String>,
}



#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SHORTCUT_MIME_TYPE;

    #[test]
    fn parses_listing_with_shortcuts() {
        let body = r#"{
            "nextPageToken": "page-2",
            "files": [
                {
                    "id": "folder-1",
                    "name": "Docs",
                    "mimeType": "application/vnd.google-apps.folder",
                    "parents": ["template"],
                    "webViewLink": "https://drive.google.com/drive/folders/folder-1"
                },
                {
                    "id": "shortcut-1",
                    "name": "Budget",
                    "mimeType": "application/vnd.google-apps.shortcut",
                    "parents": ["template"],
                    "shortcutDetails": {
                        "targetId": "sheet-1",
                        "targetMimeType": "application/vnd.google-apps.spreadsheet"
                    }
                },
                {
                    "id": "shortcut-2",
                    "name": "Dangling",
                    "mimeType": "application/vnd.google-apps.shortcut",
                    "shortcutDetails": {}
                }
            ]
        }"#;

        let page = serde_json::from_str::<FileList>(body)
            .unwrap()
            .into_list_page();

        assert_eq!(page.next_page_token.as_deref(), Some("page-2"));
        assert_eq!(page.items.len(), 3);

        assert!(page.items[0].is_folder());
        assert_eq!(page.items[0].parents, vec![NodeId::new("template")]);

        let target = page.items[1].shortcut_target().unwrap();
        assert_eq!(target.id, NodeId::new("sheet-1"));
        assert!(!target.is_folder());

        assert_eq!(
            page.items[2].kind,
            NodeKind::Shortcut { target: None }
        );
        assert_eq!(page.items[2].kind.mime_type(), SHORTCUT_MIME_TYPE);
    }

    #[test]
    fn empty_next_page_token_ends_listing() {
        let page = serde_json::from_str::<FileList>(r#"{"nextPageToken": "", "files": []}"#)
            .unwrap()
            .into_list_page();

        assert!(page.next_page_token.is_none());
        assert!(page.items.is_empty());
    }

    #[test]
    fn serializes_request_bodies() {
        let parent = NodeId::new("orders");

        let folder = serde_json::to_value(CreateFolderBody::new("Order - x@gmail.com", &parent))
            .unwrap();
        assert_eq!(folder["mimeType"], FOLDER_MIME_TYPE);
        assert_eq!(folder["parents"][0], "orders");

        let permission = PermissionGrant::reader("x@gmail.com");
        let permission = serde_json::to_value(PermissionBody::for_user(&permission)).unwrap();
        assert_eq!(permission["type"], "user");
        assert_eq!(permission["role"], "reader");
        assert_eq!(permission["emailAddress"], "x@gmail.com");
    }

    #[test]
    fn keeps_drive_error_reason_and_message() {
        let body = r#"{
            "error": {
                "code": 400,
                "message": "Bad Request. User message: \"Invalid recipient.\"",
                "errors": [{ "domain": "global", "reason": "invalidSharingRequest" }]
            }
        }"#;

        let error = rejection_from_body(400, body);

        assert_eq!(error.status_code(), Some(400));
        assert_eq!(error.reason(), Some("invalidSharingRequest"));
        assert!(error.to_string().contains("Invalid recipient"));
    }

    #[test]
    fn keeps_not_found_envelope_details() {
        let body = r#"{
            "error": {
                "code": 404,
                "message": "File not found: orders-parent.",
                "errors": [{
                    "domain": "global",
                    "reason": "notFound",
                    "message": "File not found: orders-parent.",
                    "locationType": "parameter",
                    "location": "fileId"
                }]
            }
        }"#;

        let error = rejection_from_body(404, body);

        assert!(matches!(
            &error,
            StorageError::Rejected { status: 404, reason: Some(reason), message }
                if reason == "notFound" && message == "File not found: orders-parent."
        ));
        assert!(!error.is_transient());
    }

    #[test]
    fn keeps_non_json_error_bodies_verbatim() {
        let error = rejection_from_body(502, "  Bad Gateway\n");

        assert!(matches!(
            error,
            StorageError::Rejected { status: 502, ref message, .. } if message == "Bad Gateway"
        ));
    }
}
