//! At-most-one in-flight delete per share identity
//!
//! [`InFlightDeletes::try_begin`] claims a share identity of an account and
//! returns a [`DeleteGuard`]; the claim is released when the guard is
//! dropped, on success, failure, timeout or cancellation alike.
//!
//! The set is owned by [`ShareRepository`](crate::repository::ShareRepository),
//! so every engine working on the same repository sees the same claims.

use std::sync::Arc;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{AccountName, RemoteShareId};

type ClaimKey = (AccountName, RemoteShareId);

/// Set of share identities with a delete in progress
#[derive(Debug, Default, Clone)]
pub struct InFlightDeletes {
    active: Arc<DashMap<ClaimKey, Instant>>,
}

impl InFlightDeletes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `remote_id` of `account`, or returns `None` if it is already claimed
    pub fn try_begin(
        &self,
        account: &AccountName,
        remote_id: &RemoteShareId,
    ) -> Option<DeleteGuard> {
        let key = (account.clone(), remote_id.clone());
        match self.active.entry(key.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                Some(DeleteGuard {
                    active: Arc::clone(&self.active),
                    key,
                })
            }
        }
    }

    pub fn contains(&self, account: &AccountName, remote_id: &RemoteShareId) -> bool {
        self.active
            .contains_key(&(account.clone(), remote_id.clone()))
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Claim on one share identity, released on drop
#[derive(Debug)]
pub struct DeleteGuard {
    active: Arc<DashMap<ClaimKey, Instant>>,
    key: ClaimKey,
}

impl DeleteGuard {
    pub fn account(&self) -> &AccountName {
        &self.key.0
    }

    pub fn remote_id(&self) -> &RemoteShareId {
        &self.key.1
    }
}

impl Drop for DeleteGuard {
    fn drop(&mut self) {
        if let Some((_, started)) = self.active.remove(&self.key) {
            tracing::trace!(
                account = %self.key.0,
                remote_id = %self.key.1,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Delete claim released"
            );
        }
    }
}
