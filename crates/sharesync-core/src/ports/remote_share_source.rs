//! Remote share source port (driven/secondary port)
//!
//! This module defines the interface for share CRUD against the remote
//! server. The wire protocol is the adapter's business; the core only sees
//! share records and [`RemoteError`]s.
//!
//! ## Design Notes
//!
//! - Errors are typed ([`RemoteError`]) rather than `anyhow` because the
//!   repository passes them through unchanged to observers.
//! - Timeouts and retries belong to the adapter. The engine can add an
//!   outer timeout through configuration but never retries.

use crate::domain::{
    AccountName, PublicShareParams, PublicShareUpdate, RemoteError, RemotePath, RemoteShareId,
    Share, ShareList,
};

/// Port trait for remote share operations
#[async_trait::async_trait]
pub trait IRemoteShareSource: Send + Sync {
    /// Lists the shares the server reports for `path`
    ///
    /// The server may include shares of other paths (e.g. reshares); the
    /// repository filters them out.
    async fn list(&self, account: &AccountName, path: &RemotePath)
        -> Result<ShareList, RemoteError>;

    /// Creates a public link and returns the record with its remote identity
    async fn create(
        &self,
        account: &AccountName,
        params: &PublicShareParams,
    ) -> Result<Share, RemoteError>;

    /// Applies changes to an existing public link and returns the new record
    async fn update(
        &self,
        account: &AccountName,
        remote_id: &RemoteShareId,
        changes: &PublicShareUpdate,
    ) -> Result<Share, RemoteError>;

    /// Deletes a share
    async fn delete(&self, account: &AccountName, remote_id: &RemoteShareId)
        -> Result<(), RemoteError>;
}
