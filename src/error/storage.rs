use thiserror::Error;


/// An error returned by a [`StorageService`] call.
///
/// The storage service's own status code and reason are preserved,
/// so callers can tell e.g. an invalid sharing recipient apart from a rate limit
/// (or a missing node, reported as status 404 with reason `notFound`).
///
///
/// [`StorageService`]: crate::storage::StorageService
#[derive(Error, Debug)]
#[cfg_attr(feature = "miette", derive(miette::Diagnostic))]
pub enum StorageError {
    /// The storage service answered, but rejected the request.
    #[error("storage service rejected the request (status {status}): {message}")]
    Rejected {
        /// Status code returned by the service.
        status: u16,

        /// Machine-readable reason returned by the service, if any
        /// (e.g. `rateLimitExceeded`, `invalidSharingRequest`).
        reason: Option<String>,

        /// Human-readable message returned by the service.
        message: String,
    },

    /// The storage service could not be reached, or the connection failed mid-request.
    #[error("unable to reach the storage service")]
    Transport {
        /// Underlying transport error.
        #[source]
        error: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Credentials were rejected, or an access token could not be obtained.
    #[error("unable to authorize with the storage service: {message}")]
    Authorization {
        /// Description of the authorization failure.
        message: String,
    },

    /// The storage service returned a response this crate does not understand.
    #[error("unexpected response from the storage service: {message}")]
    UnexpectedResponse {
        /// Description of what was unexpected.
        message: String,
    },
}

impl StorageError {
    /// Returns the status code associated with this error, if there is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            StorageError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the machine-readable reason reported by the service, if there is one.
    pub fn reason(&self) -> Option<&str> {
        match self {
            StorageError::Rejected { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if retrying the same request later could plausibly succeed.
    ///
    /// This crate never retries on its own; this is a hint for callers.
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::Transport { .. } => true,
            StorageError::Rejected { status, reason, .. } => {
                *status == 429
                    || *status >= 500
                    || matches!(
                        reason.as_deref(),
                        Some("rateLimitExceeded") | Some("userRateLimitExceeded")
                    )
            }
            _ => false,
        }
    }
}
