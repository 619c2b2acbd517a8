#![cfg(feature = "drive-http")]

use drive_grant::{
    config::OAuthCredentials,
    error::StorageError,
    node::NodeId,
    storage::{DriveClient, StorageService},
};
use drive_grant_test_harness::prelude::*;
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::{
    matchers::{body_string_contains, header, method, path, query_param},
    Mock,
    MockServer,
    ResponseTemplate,
};


/// A local stand-in for the Drive API and the OAuth2 token endpoint.
///
/// The mock server runs on its own thread, so the blocking client is driven
/// from the test thread while the runtime is only used to set up the mocks.
struct StandInDrive {
    server: MockServer,
    runtime: Runtime,
}

impl StandInDrive {
    fn start() -> TestResult<Self> {
        let runtime = Runtime::new()?;
        let server = runtime.block_on(MockServer::start());

        Ok(Self { server, runtime })
    }

    fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    fn mount_token(&self, access_token: &str, expires_in: u64, expected_refreshes: u64) {
        self.mount(
            Mock::given(method("POST"))
                .and(path("/token"))
                .and(body_string_contains("grant_type=refresh_token"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "access_token": access_token,
                    "expires_in": expires_in,
                    "token_type": "Bearer",
                })))
                .expect(expected_refreshes),
        );
    }

    fn client(&self) -> TestResult<DriveClient> {
        let client = DriveClient::with_endpoints(
            OAuthCredentials {
                client_id: "client".to_string(),
                client_secret: "secret".to_string(),
                refresh_token: "refresh".to_string(),
            },
            &format!("{}/drive/v3", self.server.uri()),
            &format!("{}/token", self.server.uri()),
        )?;

        Ok(client)
    }

    fn verify(&self) {
        self.runtime.block_on(self.server.verify());
    }
}


fn text_file_response(file_id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": file_id,
        "name": "a.txt",
        "mimeType": "text/plain",
        "parents": ["docs"],
        "webViewLink": format!("https://drive.google.com/file/d/{}/view", file_id),
    }))
}



#[test]
pub fn access_token_is_reused_until_it_expires() -> TestResult<()> {
    let drive = StandInDrive::start()?;
    drive.mount_token("token-1", 3600, 1);
    drive.mount(
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/abc"))
            .and(header("authorization", "Bearer token-1"))
            .and(query_param("supportsAllDrives", "true"))
            .respond_with(text_file_response("abc"))
            .expect(2),
    );

    let client = drive.client()?;
    let file_id = NodeId::new("abc");

    let first_fetch = client.get_node(&file_id)?;
    let second_fetch = client.get_node(&file_id)?;

    assert_eq!(first_fetch, second_fetch);
    assert_eq!(first_fetch.parents, vec![NodeId::new("docs")]);
    assert_eq!(first_fetch.kind.mime_type(), "text/plain");

    drive.verify();
    Ok(())
}


#[test]
pub fn tokens_about_to_expire_are_refreshed_early() -> TestResult<()> {
    let drive = StandInDrive::start()?;

    // Expires within the 60 second margin, so it is never reused.
    drive.mount_token("short-lived", 45, 2);
    drive.mount(
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/abc"))
            .and(header("authorization", "Bearer short-lived"))
            .respond_with(text_file_response("abc"))
            .expect(2),
    );

    let client = drive.client()?;
    let file_id = NodeId::new("abc");

    client.get_node(&file_id)?;
    client.get_node(&file_id)?;

    drive.verify();
    Ok(())
}


#[test]
pub fn unauthorized_response_drops_the_cached_token() -> TestResult<()> {
    let drive = StandInDrive::start()?;
    drive.mount_token("token-1", 3600, 2);

    drive.mount(
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/abc"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {
                    "code": 401,
                    "message": "Request had invalid authentication credentials.",
                    "errors": [{ "domain": "global", "reason": "authError" }],
                }
            })))
            .up_to_n_times(1)
            .expect(1),
    );
    drive.mount(
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/abc"))
            .respond_with(text_file_response("abc"))
            .expect(1),
    );

    let client = drive.client()?;
    let file_id = NodeId::new("abc");

    let rejected_fetch = client.get_node(&file_id);

    assert_matches!(
        rejected_fetch,
        Err(StorageError::Rejected { status: 401, reason: Some(reason), .. })
            if reason == "authError"
    );

    client.get_node(&file_id)?;

    drive.verify();
    Ok(())
}


#[test]
pub fn not_found_keeps_the_service_message() -> TestResult<()> {
    let drive = StandInDrive::start()?;
    drive.mount_token("token-1", 3600, 1);
    drive.mount(
        Mock::given(method("POST"))
            .and(path("/drive/v3/files/abc/copy"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {
                    "code": 404,
                    "message": "File not found: missing-parent.",
                    "errors": [{
                        "domain": "global",
                        "reason": "notFound",
                        "message": "File not found: missing-parent.",
                    }],
                }
            })))
            .expect(1),
    );

    let client = drive.client()?;

    let result = client.copy_file(
        &NodeId::new("abc"),
        "a.txt",
        &NodeId::new("missing-parent"),
    );

    assert_matches!(
        &result,
        Err(StorageError::Rejected { status: 404, reason: Some(reason), message })
            if reason == "notFound" && message.contains("missing-parent")
    );

    drive.verify();
    Ok(())
}


#[test]
pub fn rejected_refresh_token_is_an_authorization_error() -> TestResult<()> {
    let drive = StandInDrive::start()?;
    drive.mount(
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Token has been expired or revoked.",
            })))
            .expect(1),
    );
    drive.mount(
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/abc"))
            .respond_with(text_file_response("abc"))
            .expect(0),
    );

    let client = drive.client()?;

    let result = client.get_node(&NodeId::new("abc"));

    assert_matches!(
        result,
        Err(StorageError::Authorization { message })
            if message == "invalid_grant: Token has been expired or revoked."
    );

    drive.verify();
    Ok(())
}
