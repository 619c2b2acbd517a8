use reqwest::{
    blocking::{Client, RequestBuilder, Response},
    StatusCode,
    Url,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use self::{
    token::TokenSource,
    wire::{
        rejection_from_body,
        CopyFileBody,
        CreateFolderBody,
        DriveFile,
        FileList,
        PermissionBody,
        FILE_FIELDS,
        LIST_FIELDS,
    },
};
use super::{ListPage, PermissionGrant, StorageService};
use crate::{
    config::OAuthCredentials,
    error::StorageError,
    node::{Node, NodeId},
};

mod token;
mod wire;


/// Base URL of the Google Drive v3 REST API.
pub const DRIVE_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Google's OAuth2 token endpoint.
pub const OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";



/// A blocking [`StorageService`] backed by the Google Drive v3 REST API.
///
/// Authenticates with an OAuth2 refresh token (see [`OAuthCredentials`]);
/// access tokens are obtained lazily and cached until shortly before they expire.
///
/// Every request sets `supportsAllDrives=true`, so shared drives behave like "My Drive".
///
///
/// # Example
/// ```no_run
/// # use drive_grant::config::GrantConfig;
/// # use drive_grant::storage::DriveClient;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = GrantConfig::from_env()?;
/// let client = DriveClient::new(config.credentials.clone())?;
/// # Ok(())
/// # }
/// ```
pub struct DriveClient {
    http: Client,
    api_base_url: Url,
    token_source: TokenSource,
}

impl DriveClient {
    /// Creates a client talking to the public Google endpoints.
    pub fn new(credentials: OAuthCredentials) -> Result<Self, StorageError> {
        Self::with_endpoints(credentials, DRIVE_API_BASE_URL, OAUTH_TOKEN_URL)
    }

    /// Creates a client talking to custom API and token endpoints
    /// (e.g. a proxy or a local stand-in server).
    pub fn with_endpoints(
        credentials: OAuthCredentials,
        api_base_url: &str,
        token_url: &str,
    ) -> Result<Self, StorageError> {
        let api_base_url = Url::parse(api_base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| StorageError::UnexpectedResponse {
                message: format!("invalid storage API base URL: {api_base_url}"),
            })?;

        let http = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|error| StorageError::Transport {
                error: Box::new(error),
            })?;

        Ok(Self {
            http,
            api_base_url,
            token_source: TokenSource::new(credentials, token_url.to_string()),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base_url.clone();

        // The base URL was checked to be a base in `with_endpoints`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        url
    }

    /// Sends an authorized request and decodes a successful JSON response.
    ///
    /// `node_id` only identifies the request in logs.
    fn execute<T>(&self, request: RequestBuilder, node_id: &NodeId) -> Result<T, StorageError>
    where
        T: DeserializeOwned,
    {
        let response = self.send_authorized(request, node_id)?;

        response
            .json::<T>()
            .map_err(|error| StorageError::UnexpectedResponse {
                message: format!("unable to decode response: {error}"),
            })
    }

    fn send_authorized(
        &self,
        request: RequestBuilder,
        node_id: &NodeId,
    ) -> Result<Response, StorageError> {
        let access_token = self.token_source.access_token(&self.http)?;

        let response = request
            .bearer_auth(access_token)
            .send()
            .map_err(|error| StorageError::Transport {
                error: Box::new(error),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.token_source.invalidate();
        }

        // A 404 can concern any id in the request (e.g. a copy's destination parent).
        let body = response.text().unwrap_or_default();
        let error = rejection_from_body(status.as_u16(), &body);

        warn!(
            node_id = %node_id,
            status = status.as_u16(),
            reason = error.reason().unwrap_or_default(),
            "storage service rejected request"
        );

        Err(error)
    }
}


/// Escapes a value for use inside a single-quoted Drive query string.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}


impl StorageService for DriveClient {
    fn list_children(
        &self,
        parent_id: &NodeId,
        page_token: Option<&str>,
    ) -> Result<ListPage, StorageError> {
        debug!(parent_id = %parent_id, page_token, "listing folder");

        let query = format!(
            "'{}' in parents and trashed = false",
            escape_query_value(parent_id.as_str())
        );

        let mut parameters = vec![
            ("q", query.as_str()),
            ("fields", LIST_FIELDS),
            ("supportsAllDrives", "true"),
            ("includeItemsFromAllDrives", "true"),
        ];

        if let Some(page_token) = page_token {
            parameters.push(("pageToken", page_token));
        }

        let request = self.http.get(self.endpoint(&["files"])).query(&parameters);

        let file_list: FileList = self.execute(request, parent_id)?;

        Ok(file_list.into_list_page())
    }

    fn get_node(&self, node_id: &NodeId) -> Result<Node, StorageError> {
        debug!(node_id = %node_id, "fetching node");

        let request = self
            .http
            .get(self.endpoint(&["files", node_id.as_str()]))
            .query(&[("fields", FILE_FIELDS), ("supportsAllDrives", "true")]);

        let file: DriveFile = self.execute(request, node_id)?;

        Ok(file.into_node())
    }

    fn create_folder(&self, name: &str, parent_id: &NodeId) -> Result<Node, StorageError> {
        debug!(parent_id = %parent_id, name, "creating folder");

        let request = self
            .http
            .post(self.endpoint(&["files"]))
            .query(&[("fields", FILE_FIELDS), ("supportsAllDrives", "true")])
            .json(&CreateFolderBody::new(name, parent_id));

        let file: DriveFile = self.execute(request, parent_id)?;

        Ok(file.into_node())
    }

    fn copy_file(
        &self,
        source_file_id: &NodeId,
        new_name: &str,
        parent_id: &NodeId,
    ) -> Result<Node, StorageError> {
        debug!(
            source_file_id = %source_file_id,
            parent_id = %parent_id,
            name = new_name,
            "copying file"
        );

        let request = self
            .http
            .post(self.endpoint(&["files", source_file_id.as_str(), "copy"]))
            .query(&[("fields", FILE_FIELDS), ("supportsAllDrives", "true")])
            .json(&CopyFileBody {
                name: new_name,
                parents: [parent_id.as_str()],
            });

        let file: DriveFile = self.execute(request, source_file_id)?;

        Ok(file.into_node())
    }

    fn grant_permission(
        &self,
        node_id: &NodeId,
        permission: &PermissionGrant,
    ) -> Result<(), StorageError> {
        debug!(
            node_id = %node_id,
            role = %permission.role,
            "granting permission"
        );

        let send_notification_email = if permission.send_notification_email {
            "true"
        } else {
            "false"
        };

        let request = self
            .http
            .post(self.endpoint(&["files", node_id.as_str(), "permissions"]))
            .query(&[
                ("sendNotificationEmail", send_notification_email),
                ("supportsAllDrives", "true"),
                ("fields", "id"),
            ])
            .json(&PermissionBody::for_user(permission));

        self.send_authorized(request, node_id)?;

        Ok(())
    }
}
