use drive_grant::error::{
    AncestryCheckError,
    ConfigError,
    CopyFolderError,
    GrantAccessError,
    StorageError,
};
use thiserror::Error;

/// Main `Error` for use in unit and integration tests.
///
/// Implements `From` for every error type of `drive-grant`,
/// as well as for [`std::io::Error`].
#[derive(Error, Debug)]
pub enum TestError {
    #[error("std::io::Error")]
    IoError(
        #[from]
        #[source]
        std::io::Error,
    ),

    #[error("storage error")]
    StorageError(
        #[from]
        #[source]
        StorageError,
    ),

    #[error("ancestry check error")]
    AncestryCheckError(
        #[from]
        #[source]
        AncestryCheckError,
    ),

    #[error("folder copy error")]
    CopyFolderError(
        #[from]
        #[source]
        CopyFolderError,
    ),

    #[error("access grant error")]
    GrantAccessError(
        #[from]
        #[source]
        GrantAccessError,
    ),

    #[error("configuration error")]
    ConfigError(
        #[from]
        #[source]
        ConfigError,
    ),
}

/// A main `Result` type for use in unit and integration tests (shorthand for the [`TestError`] error).
pub type TestResult<O = ()> = std::result::Result<O, TestError>;
