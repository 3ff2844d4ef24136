//! Repositories reconciling local state with the remote server
//!
//! [`ShareRepository`] is the single source of truth for the shares of a
//! file. The remote server is authoritative; the local cache is a
//! read-through / write-through mirror of it. A mutation either completes
//! against the remote and is then mirrored locally, or fails and leaves the
//! cache untouched. Nothing is queued offline and nothing is applied
//! optimistically.
//!
//! A list response can be older than a mutation that completed while the
//! list request was on the wire. Every mutation mirrored during that window
//! is replayed onto the response before it reaches the cache or the caller,
//! and a response older than one already mirrored for the same path never
//! overwrites the cache.
//!
//! [`CapabilityRepository`] keeps the last capability snapshot per account
//! for the whole process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::domain::{
    AccountName, Capability, PublicShareParams, PublicShareUpdate, RemotePath, RemoteShareId,
    Share, ShareError, ShareList,
};
use crate::in_flight::{DeleteGuard, InFlightDeletes};
use crate::ports::{ICapabilityProvider, ILocalShareCache, IRemoteShareSource};

/// Change mirrored into the cache after a successful remote call
#[derive(Debug, Clone)]
enum Mutation {
    Upserted(Share),
    Removed(RemoteShareId),
}

impl Mutation {
    fn apply(&self, account: &AccountName, path: &RemotePath, shares: &mut ShareList) {
        match self {
            Mutation::Upserted(share) => {
                if share.path() == path && share.account_owner() == account {
                    shares.upsert(share.clone());
                }
            }
            Mutation::Removed(remote_id) => {
                shares.remove(remote_id);
            }
        }
    }
}

#[derive(Debug)]
struct OpenRefresh {
    account: AccountName,
    path: RemotePath,
    mutations: Vec<Mutation>,
}

#[derive(Debug, Default)]
struct Reconciler {
    next_refresh: u64,
    open: HashMap<u64, OpenRefresh>,
    /// Newest refresh written to the cache, per (account, path)
    mirrored: HashMap<(AccountName, RemotePath), u64>,
}

/// Open list request; closed on drop, whatever the outcome
struct RefreshWindow<'a> {
    repository: &'a ShareRepository,
    id: u64,
}

impl Drop for RefreshWindow<'_> {
    fn drop(&mut self) {
        self.repository.reconciler().open.remove(&self.id);
    }
}

/// Merges the remote share source and the local cache
///
/// The repository is the only component that mutates the cache. Share it
/// between every engine of an account: delete claims and list
/// reconciliation are tracked here.
pub struct ShareRepository {
    remote: Arc<dyn IRemoteShareSource>,
    cache: Arc<dyn ILocalShareCache>,
    reconciler: Mutex<Reconciler>,
    deletes: InFlightDeletes,
}

impl ShareRepository {
    /// Creates a new repository over the given sources
    pub fn new(remote: Arc<dyn IRemoteShareSource>, cache: Arc<dyn ILocalShareCache>) -> Self {
        Self {
            remote,
            cache,
            reconciler: Mutex::new(Reconciler::default()),
            deletes: InFlightDeletes::new(),
        }
    }

    /// Cached shares of `path`, without touching the network
    pub fn list_shares(
        &self,
        path: &RemotePath,
        account: &AccountName,
    ) -> Result<ShareList, ShareError> {
        self.cache
            .query_by_path(account, path)
            .map_err(|e| ShareError::local_cache(&e))
    }

    /// Fetches the shares of `path` from the server and mirrors them locally
    ///
    /// Records the server returns for other paths or accounts are ignored.
    /// Mutations completed while the request was on the wire are replayed
    /// onto the response. The cached shares of `path` are then replaced in
    /// one step, which drops shares that vanished remotely, unless a newer
    /// refresh of the same path was mirrored first.
    pub async fn refresh_shares(
        &self,
        path: &RemotePath,
        account: &AccountName,
    ) -> Result<ShareList, ShareError> {
        let window = self.open_refresh(account, path);
        let remote = self.remote.list(account, path).await?;
        let total = remote.len();

        let mut shares: ShareList = remote
            .into_iter()
            .filter(|s| s.path() == path && s.account_owner() == account)
            .collect();

        if shares.len() != total {
            debug!(
                account = %account,
                path = %path,
                ignored = total - shares.len(),
                "Ignoring shares reported for other paths"
            );
        }

        {
            let mut state = self.reconciler();
            let replayed = state
                .open
                .remove(&window.id)
                .map(|open| open.mutations)
                .unwrap_or_default();
            for mutation in &replayed {
                mutation.apply(account, path, &mut shares);
            }
            if !replayed.is_empty() {
                debug!(
                    account = %account,
                    path = %path,
                    replayed = replayed.len(),
                    "Replayed mutations onto list response"
                );
            }

            let key = (account.clone(), path.clone());
            let superseded = state
                .mirrored
                .get(&key)
                .is_some_and(|newest| *newest > window.id);
            if superseded {
                debug!(
                    account = %account,
                    path = %path,
                    "Newer list already mirrored, cache left as is"
                );
            } else {
                self.cache
                    .replace_for_path(account, path, &shares)
                    .map_err(|e| ShareError::local_cache(&e))?;
                state.mirrored.insert(key, window.id);
                debug!(account = %account, path = %path, count = shares.len(), "Share cache reconciled");
            }
        }

        Ok(shares)
    }

    /// Creates a public link on the server and mirrors it locally
    ///
    /// On failure the cache is untouched and the remote error is passed
    /// through unchanged.
    pub async fn insert_public_share(
        &self,
        params: &PublicShareParams,
        account: &AccountName,
    ) -> Result<Share, ShareError> {
        let share = self.remote.create(account, params).await?;
        self.mirror(account, Mutation::Upserted(share.clone()))?;

        info!(
            account = %account,
            path = %share.path(),
            remote_id = %share.remote_id(),
            "Public share created"
        );
        Ok(share)
    }

    /// Applies changes to a public link on the server and mirrors the result
    pub async fn update_public_share(
        &self,
        remote_id: &RemoteShareId,
        changes: &PublicShareUpdate,
        account: &AccountName,
    ) -> Result<Share, ShareError> {
        let share = self.remote.update(account, remote_id, changes).await?;
        self.mirror(account, Mutation::Upserted(share.clone()))?;

        info!(account = %account, remote_id = %remote_id, "Public share updated");
        Ok(share)
    }

    /// Claims `remote_id` for deletion
    ///
    /// # Errors
    ///
    /// Returns `ShareError::DeleteInProgress` while another delete of the
    /// same share, from any engine of this repository, is in flight.
    pub fn claim_delete(
        &self,
        remote_id: &RemoteShareId,
        account: &AccountName,
    ) -> Result<DeleteGuard, ShareError> {
        self.deletes
            .try_begin(account, remote_id)
            .ok_or_else(|| ShareError::DeleteInProgress(remote_id.clone()))
    }

    /// Returns true while a delete of `remote_id` is in flight
    pub fn is_deleting(&self, remote_id: &RemoteShareId, account: &AccountName) -> bool {
        self.deletes.contains(account, remote_id)
    }

    /// Deletes the claimed share on the server, then removes it locally
    pub async fn delete_share(&self, claim: &DeleteGuard) -> Result<(), ShareError> {
        let (account, remote_id) = (claim.account(), claim.remote_id());
        self.remote.delete(account, remote_id).await?;
        self.mirror(account, Mutation::Removed(remote_id.clone()))?;

        info!(account = %account, remote_id = %remote_id, "Share deleted");
        Ok(())
    }

    fn reconciler(&self) -> MutexGuard<'_, Reconciler> {
        self.reconciler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn open_refresh(&self, account: &AccountName, path: &RemotePath) -> RefreshWindow<'_> {
        let mut state = self.reconciler();
        state.next_refresh += 1;
        let id = state.next_refresh;
        state.open.insert(
            id,
            OpenRefresh {
                account: account.clone(),
                path: path.clone(),
                mutations: Vec::new(),
            },
        );
        RefreshWindow {
            repository: self,
            id,
        }
    }

    /// Records `mutation` for every open list request, then writes it to the cache
    fn mirror(&self, account: &AccountName, mutation: Mutation) -> Result<(), ShareError> {
        let mut state = self.reconciler();
        for open in state.open.values_mut().filter(|open| &open.account == account) {
            if let Mutation::Upserted(share) = &mutation {
                if share.path() != &open.path {
                    continue;
                }
            }
            open.mutations.push(mutation.clone());
        }

        match &mutation {
            Mutation::Upserted(share) => self
                .cache
                .upsert(share)
                .map_err(|e| ShareError::local_cache(&e))?,
            Mutation::Removed(remote_id) => {
                let removed = self
                    .cache
                    .remove(account, remote_id)
                    .map_err(|e| ShareError::local_cache(&e))?;
                if !removed {
                    warn!(
                        account = %account,
                        remote_id = %remote_id,
                        "Deleted share was not in the local cache"
                    );
                }
            }
        }
        Ok(())
    }
}

/// Process-wide capability cache, one snapshot per account
///
/// A snapshot is fetched once per session and replaced only by an explicit
/// [`refresh`](CapabilityRepository::refresh).
pub struct CapabilityRepository {
    provider: Arc<dyn ICapabilityProvider>,
    snapshots: DashMap<AccountName, Capability>,
}

impl CapabilityRepository {
    pub fn new(provider: Arc<dyn ICapabilityProvider>) -> Self {
        Self {
            provider,
            snapshots: DashMap::new(),
        }
    }

    /// Last fetched snapshot, if any
    pub fn snapshot(&self, account: &AccountName) -> Option<Capability> {
        self.snapshots.get(account).map(|c| c.value().clone())
    }

    /// Cached snapshot, or a fetch when none is cached yet
    pub async fn get_or_fetch(&self, account: &AccountName) -> Result<Capability, ShareError> {
        if let Some(capability) = self.snapshot(account) {
            return Ok(capability);
        }
        self.refresh(account).await
    }

    /// Fetches a fresh snapshot; on failure the previous one stays cached
    pub async fn refresh(&self, account: &AccountName) -> Result<Capability, ShareError> {
        let capability = self.provider.fetch(account).await?;
        self.snapshots.insert(account.clone(), capability.clone());
        debug!(
            account = %account,
            version = %capability.version_string,
            "Capabilities refreshed"
        );
        Ok(capability)
    }

    /// Drops the cached snapshot (e.g. on logout)
    pub fn invalidate(&self, account: &AccountName) {
        self.snapshots.remove(account);
    }
}
