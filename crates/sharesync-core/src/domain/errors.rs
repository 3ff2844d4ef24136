//! Domain error types
//!
//! This module defines the error taxonomy of the sharing subsystem:
//! validation failures of domain values, failures reported by the remote
//! share source, capability preconditions, and the umbrella [`ShareError`]
//! carried by failed operations.
//!
//! Every error here is `Clone` so that it can travel inside an
//! `OperationResult::Error` and be replayed to late subscribers.

use thiserror::Error;

use super::newtypes::RemoteShareId;

/// Errors that can occur when constructing or validating domain values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid remote path format or content
    #[error("Invalid remote path: {0}")]
    InvalidRemotePath(String),

    /// Invalid remote share identity
    #[error("Invalid share ID: {0}")]
    InvalidShareId(String),

    /// Invalid account name
    #[error("Invalid account name: {0}")]
    InvalidAccountName(String),

    /// Permission bits outside the range the server understands
    #[error("Invalid permissions: {0}")]
    InvalidPermissions(u32),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

/// Failures reported by the remote share source
///
/// These are passed through the repository unchanged; the engine never
/// retries them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Transport-level failure (connection refused, DNS, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// The remote call did not complete in time
    #[error("Remote call timed out after {0} seconds")]
    Timeout(u64),

    /// The server answered with a failure status
    #[error("Server returned failure ({status}): {message}")]
    Server {
        /// Status code reported by the server
        status: u16,
        /// Server-provided message
        message: String,
    },

    /// The target share or file does not exist on the server
    #[error("Not found on server: {0}")]
    NotFound(String),

    /// Credentials were rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The server answered with something that could not be understood
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Operation attempted against a capability the server does not grant
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    /// No capability snapshot has been fetched yet for the account
    #[error("server capabilities have not been loaded")]
    CapabilitiesNotLoaded,

    /// The sharing API is disabled on the server
    #[error("sharing API is disabled on the server")]
    SharingApiDisabled,

    /// Public links are disabled on the server
    #[error("public links are disabled on the server")]
    PublicSharingDisabled,

    /// The path already has a public link and the server allows only one
    #[error("server does not allow multiple public links for {0}")]
    MultiplePublicLinksUnsupported(String),

    /// The server requires a password on public links
    #[error("server enforces a password on public links")]
    PasswordEnforced,

    /// The server requires an expiration date on public links
    #[error("server enforces an expiration date on public links")]
    ExpirationEnforced,

    /// Public upload was requested but the server does not support it
    #[error("public upload is disabled on the server")]
    PublicUploadDisabled,
}

/// Error surfaced by any share operation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShareError {
    /// Network, transport or protocol failure from the remote source
    #[error("Remote operation failed: {0}")]
    Remote(#[from] RemoteError),

    /// Local cache read or write failure (fatal to this operation only)
    #[error("Local share cache failed: {0}")]
    LocalCache(String),

    /// The server capabilities do not permit the operation
    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    /// A delete for this share identity is already in flight
    #[error("Delete already in progress for share {0}")]
    DeleteInProgress(RemoteShareId),

    /// Invalid domain value
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl ShareError {
    /// Wraps a storage-port failure, keeping the whole context chain
    pub fn local_cache(err: &anyhow::Error) -> Self {
        ShareError::LocalCache(format!("{err:#}"))
    }

    /// Returns true if the failure came from the remote source
    pub fn is_remote(&self) -> bool {
        matches!(self, ShareError::Remote(_))
    }

    /// Returns true if the operation was rejected locally before any remote call
    pub fn is_precondition(&self) -> bool {
        matches!(self, ShareError::Precondition(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidRemotePath("bad".to_string());
        assert_eq!(err.to_string(), "Invalid remote path: bad");

        let err = RemoteError::Server {
            status: 404,
            message: "Wrong share ID, share doesn't exist".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Server returned failure (404): Wrong share ID, share doesn't exist"
        );

        let err = ShareError::from(PreconditionError::PasswordEnforced);
        assert_eq!(
            err.to_string(),
            "Precondition failed: server enforces a password on public links"
        );
    }

    #[test]
    fn test_local_cache_keeps_context_chain() {
        let err = anyhow::anyhow!("disk full").context("write share row");
        let share_err = ShareError::local_cache(&err);
        assert_eq!(
            share_err,
            ShareError::LocalCache("write share row: disk full".to_string())
        );
    }

    #[test]
    fn test_classification() {
        let remote = ShareError::from(RemoteError::Network("reset by peer".into()));
        assert!(remote.is_remote());
        assert!(!remote.is_precondition());

        let precondition = ShareError::from(PreconditionError::PublicSharingDisabled);
        assert!(precondition.is_precondition());
        assert!(!precondition.is_remote());
    }
}
