//! In-memory implementation of ILocalShareCache
//!
//! Shares are kept per account in insertion order, so a list read back
//! for a path is in the order the server returned it. Every write takes
//! the lock once, which makes `replace_for_path` atomic for readers.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

use sharesync_core::domain::{AccountName, RemotePath, RemoteShareId, Share, ShareList};
use sharesync_core::ports::ILocalShareCache;

use crate::CacheError;

/// Snapshot format version written by [`MemoryShareCache::to_json`]
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    shares: Vec<Share>,
}

/// Process-local share cache
///
/// Accounts are isolated: no query for one account ever returns a share
/// owned by another.
#[derive(Debug, Default)]
pub struct MemoryShareCache {
    accounts: RwLock<HashMap<AccountName, Vec<Share>>>,
}

impl MemoryShareCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached shares across all accounts
    pub fn len(&self) -> Result<usize, CacheError> {
        Ok(self.read()?.values().map(Vec::len).sum())
    }

    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }

    /// Forgets every share of `account`, e.g. when it is removed
    pub fn clear_account(&self, account: &AccountName) -> Result<usize, CacheError> {
        let removed = self.write()?.remove(account).map_or(0, |shares| shares.len());
        debug!(account = %account, removed, "Cleared cached shares");
        Ok(removed)
    }

    /// Serializes the whole cache
    pub fn to_json(&self) -> Result<String, CacheError> {
        let shares = self.read()?.values().flatten().cloned().collect();
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            shares,
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Rebuilds a cache from a [`to_json`](Self::to_json) snapshot
    pub fn from_json(json: &str) -> Result<Self, CacheError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CacheError::SerializationError(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let mut accounts: HashMap<AccountName, Vec<Share>> = HashMap::new();
        for share in snapshot.shares {
            accounts
                .entry(share.account_owner().clone())
                .or_default()
                .push(share);
        }
        Ok(Self {
            accounts: RwLock::new(accounts),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<AccountName, Vec<Share>>>, CacheError> {
        self.accounts.read().map_err(|_| CacheError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<AccountName, Vec<Share>>>, CacheError> {
        self.accounts.write().map_err(|_| CacheError::LockPoisoned)
    }
}

impl ILocalShareCache for MemoryShareCache {
    fn upsert(&self, share: &Share) -> anyhow::Result<()> {
        let mut accounts = self.write()?;
        let shares = accounts.entry(share.account_owner().clone()).or_default();
        match shares.iter_mut().find(|s| s.remote_id() == share.remote_id()) {
            Some(existing) => *existing = share.clone(),
            None => shares.push(share.clone()),
        }
        Ok(())
    }

    fn remove(&self, account: &AccountName, remote_id: &RemoteShareId) -> anyhow::Result<bool> {
        let mut accounts = self.write()?;
        let Some(shares) = accounts.get_mut(account) else {
            return Ok(false);
        };
        let before = shares.len();
        shares.retain(|s| s.remote_id() != remote_id);
        Ok(shares.len() != before)
    }

    fn query_by_path(&self, account: &AccountName, path: &RemotePath) -> anyhow::Result<ShareList> {
        let accounts = self.read()?;
        Ok(accounts
            .get(account)
            .map(|shares| shares.iter().filter(|s| s.path() == path).cloned().collect())
            .unwrap_or_default())
    }

    fn get(
        &self,
        account: &AccountName,
        remote_id: &RemoteShareId,
    ) -> anyhow::Result<Option<Share>> {
        let accounts = self.read()?;
        Ok(accounts
            .get(account)
            .and_then(|shares| shares.iter().find(|s| s.remote_id() == remote_id))
            .cloned())
    }

    fn replace_for_path(
        &self,
        account: &AccountName,
        path: &RemotePath,
        replacement: &ShareList,
    ) -> anyhow::Result<()> {
        let mut accounts = self.write()?;
        let shares = accounts.entry(account.clone()).or_default();
        shares.retain(|s| s.path() != path);
        // Identities are unique per account; a share that moved to this path
        // replaces its old record
        shares.retain(|s| !replacement.contains(s.remote_id()));
        shares.extend(
            replacement
                .iter()
                .filter(|s| s.account_owner() == account && s.path() == path)
                .cloned(),
        );
        Ok(())
    }
}
