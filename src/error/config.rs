use std::path::PathBuf;

use thiserror::Error;


/// Configuration loading or validation error.
#[derive(Error, Debug)]
#[cfg_attr(feature = "miette", derive(miette::Diagnostic))]
pub enum ConfigError {
    /// One or more OAuth credential values are missing.
    #[error(
        "missing storage service credentials: {}",
        .missing.join(", ")
    )]
    MissingCredentials {
        /// Names of the missing values (environment variable or TOML key names).
        missing: Vec<&'static str>,
    },

    /// A configured value is present, but blank.
    #[error("configuration value \"{name}\" is set, but empty")]
    EmptyValue {
        /// Name of the blank value.
        name: &'static str,
    },

    /// The configuration file could not be read.
    #[error("unable to read configuration file: {}", .path.display())]
    UnableToReadFile {
        /// Path of the configuration file.
        path: PathBuf,

        /// IO error describing why the file could not be read.
        #[source]
        error: std::io::Error,
    },

    /// The configuration file is not valid TOML, or does not match the expected structure.
    #[error("invalid configuration file: {}", .path.display())]
    InvalidFile {
        /// Path of the configuration file.
        path: PathBuf,

        /// Parsing error.
        #[source]
        error: toml::de::Error,
    },
}
