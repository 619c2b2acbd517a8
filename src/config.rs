//! Configuration: default folders and storage service credentials.
//!
//! Configuration is loaded once (from environment variables or a TOML file),
//! validated eagerly and then passed explicitly to [`AccessGranter`] and [`DriveClient`].
//!
//! <br>
//!
//! ##### Environment variables
//!
//! | variable | field |
//! |----------|-------|
//! | `GOOGLE_TEMPLATE_FOLDER_ID` | [`GrantDefaults::template_folder_id`] |
//! | `GOOGLE_ORDERS_FOLDER_ID` | [`GrantDefaults::orders_folder_id`] |
//! | `GOOGLE_OAUTH_CLIENT_ID` | [`OAuthCredentials::client_id`] |
//! | `GOOGLE_OAUTH_CLIENT_SECRET` | [`OAuthCredentials::client_secret`] |
//! | `GOOGLE_OAUTH_REFRESH_TOKEN` | [`OAuthCredentials::refresh_token`] |
//!
//! ##### TOML file
//! ```toml
//! template_folder_id = "1AbCdEf"
//! orders_folder_id = "1GhIjKl"
//!
//! [credentials]
//! client_id = "1234.apps.googleusercontent.com"
//! client_secret = "..."
//! refresh_token = "..."
//! ```
//!
//!
//! [`AccessGranter`]: crate::grant::AccessGranter
//! [`DriveClient`]: https://docs.rs/drive-grant/latest/drive_grant/storage/struct.DriveClient.html

use std::{fmt, path::Path};

use serde::Deserialize;
use tracing::debug;

use crate::{error::ConfigError, node::NodeId, use_enabled_fs_module};

use_enabled_fs_module!();


const TEMPLATE_FOLDER_ID_VARIABLE: &str = "GOOGLE_TEMPLATE_FOLDER_ID";
const ORDERS_FOLDER_ID_VARIABLE: &str = "GOOGLE_ORDERS_FOLDER_ID";
const CLIENT_ID_VARIABLE: &str = "GOOGLE_OAUTH_CLIENT_ID";
const CLIENT_SECRET_VARIABLE: &str = "GOOGLE_OAUTH_CLIENT_SECRET";
const REFRESH_TOKEN_VARIABLE: &str = "GOOGLE_OAUTH_REFRESH_TOKEN";



/// OAuth2 credentials used to obtain storage service access tokens.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthCredentials {
    /// OAuth client identifier.
    pub client_id: String,

    /// OAuth client secret.
    pub client_secret: String,

    /// Long-lived refresh token of the account that owns the template and orders folders.
    pub refresh_token: String,
}

impl OAuthCredentials {
    fn missing_values(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if self.client_id.trim().is_empty() {
            missing.push(CLIENT_ID_VARIABLE);
        }
        if self.client_secret.trim().is_empty() {
            missing.push(CLIENT_SECRET_VARIABLE);
        }
        if self.refresh_token.trim().is_empty() {
            missing.push(REFRESH_TOKEN_VARIABLE);
        }

        missing
    }
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}



/// Folders used when a grant request doesn't name them explicitly.
#[derive(Clone, PartialEq, Eq, Debug, Default, Deserialize)]
pub struct GrantDefaults {
    /// Template folder to copy when a request doesn't specify one.
    #[serde(default)]
    pub template_folder_id: Option<NodeId>,

    /// Folder under which buyer folders are created when a request doesn't specify one.
    ///
    /// If this is also unset, buyer folders are created inside the template folder itself,
    /// which the topology check then rejects.
    #[serde(default)]
    pub orders_folder_id: Option<NodeId>,
}

impl GrantDefaults {
    fn validate(&self) -> Result<(), ConfigError> {
        if matches!(&self.template_folder_id, Some(id) if id.is_empty()) {
            return Err(ConfigError::EmptyValue {
                name: "template_folder_id",
            });
        }

        if matches!(&self.orders_folder_id, Some(id) if id.is_empty()) {
            return Err(ConfigError::EmptyValue {
                name: "orders_folder_id",
            });
        }

        Ok(())
    }
}



/// Complete configuration: default folders plus storage service credentials.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
pub struct GrantConfig {
    /// Default template and orders folders.
    #[serde(flatten)]
    pub defaults: GrantDefaults,

    /// Storage service credentials.
    pub credentials: OAuthCredentials,
}

impl GrantConfig {
    /// Loads configuration from the process environment and validates it.
    ///
    /// See the [module documentation](self) for the variable names.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup and validates it.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let config = Self {
            defaults: GrantDefaults {
                template_folder_id: non_blank(TEMPLATE_FOLDER_ID_VARIABLE).map(NodeId::new),
                orders_folder_id: non_blank(ORDERS_FOLDER_ID_VARIABLE).map(NodeId::new),
            },
            credentials: OAuthCredentials {
                client_id: non_blank(CLIENT_ID_VARIABLE).unwrap_or_default(),
                client_secret: non_blank(CLIENT_SECRET_VARIABLE).unwrap_or_default(),
                refresh_token: non_blank(REFRESH_TOKEN_VARIABLE).unwrap_or_default(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file and validates it.
    pub fn from_file<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading configuration file");

        let contents =
            fs::read_to_string(path).map_err(|error| ConfigError::UnableToReadFile {
                path: path.to_path_buf(),
                error,
            })?;

        let config: Self =
            toml::from_str(&contents).map_err(|error| ConfigError::InvalidFile {
                path: path.to_path_buf(),
                error,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Checks that all credentials are present and that no configured folder id is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing = self.credentials.missing_values();
        if !missing.is_empty() {
            return Err(ConfigError::MissingCredentials { missing });
        }

        self.defaults.validate()
    }
}
