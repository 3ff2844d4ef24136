//! Local share cache port (driven/secondary port)
//!
//! Persists the last-known share records per account and file.
//!
//! ## Design Notes
//!
//! - Methods are synchronous: cache access is short and must not be
//!   interleaved with other tasks halfway through an operation.
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   and don't need domain-level classification; the repository maps them
//!   to `ShareError::LocalCache`.
//! - Every method is atomic with respect to the others. In particular a
//!   partially applied [`replace_for_path`](ILocalShareCache::replace_for_path)
//!   must never be observable.

use crate::domain::{AccountName, RemotePath, RemoteShareId, Share, ShareList};

/// Port trait for the local share mirror
pub trait ILocalShareCache: Send + Sync {
    /// Inserts a share or updates the record with the same remote identity
    ///
    /// The account is taken from [`Share::account_owner`].
    fn upsert(&self, share: &Share) -> anyhow::Result<()>;

    /// Removes a share; returns whether a record was removed
    fn remove(&self, account: &AccountName, remote_id: &RemoteShareId) -> anyhow::Result<bool>;

    /// Shares of `path`, in insertion order
    fn query_by_path(&self, account: &AccountName, path: &RemotePath)
        -> anyhow::Result<ShareList>;

    /// Looks up a single share by remote identity
    fn get(&self, account: &AccountName, remote_id: &RemoteShareId)
        -> anyhow::Result<Option<Share>>;

    /// Replaces every share of `path` with `shares`, in one step
    fn replace_for_path(
        &self,
        account: &AccountName,
        path: &RemotePath,
        shares: &ShareList,
    ) -> anyhow::Result<()>;
}
