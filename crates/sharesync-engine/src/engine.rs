//! Share-state synchronization engine
//!
//! The [`ShareSyncEngine`] drives every share request of one file for one
//! account and exposes the resulting state on five [`StateStream`]s:
//!
//! | Stream | Payload | Request |
//! |--------|---------|---------|
//! | `shares` | [`ShareList`] | [`load_shares`](ShareSyncEngine::load_shares), [`show_cached_shares`](ShareSyncEngine::show_cached_shares) |
//! | `share_creation` | [`Share`] | [`create_public_share`](ShareSyncEngine::create_public_share) |
//! | `share_update` | [`Share`] | [`update_public_share`](ShareSyncEngine::update_public_share) |
//! | `share_deletion` | `()` | [`delete_share`](ShareSyncEngine::delete_share) |
//! | `capabilities` | [`Capability`] | [`load_capabilities`](ShareSyncEngine::load_capabilities), [`refresh_capabilities`](ShareSyncEngine::refresh_capabilities) |
//!
//! ## Request Flow
//!
//! 1. The request's stream moves to Loading, keeping the displayed data
//! 2. The use case runs (capability gating, remote call, cache mirror)
//! 3. The outcome is published unless a newer request superseded it
//! 4. A successful mutation re-derives the `shares` list in place
//!
//! Nothing is retried. Requests run on the caller's task; the engine is
//! cheap to clone, so callers may `tokio::spawn` each request.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use sharesync_core::config::Config;
use sharesync_core::domain::{
    AccountName, Capability, DomainError, PublicShareParams, PublicShareUpdate, RemoteError,
    RemotePath, RemoteShareId, Share, ShareError, ShareList,
};
use sharesync_core::repository::{CapabilityRepository, ShareRepository};
use sharesync_core::usecases::{
    CreatePublicShareUseCase, DeleteShareUseCase, RefreshCapabilitiesUseCase,
    RefreshSharesUseCase, UpdatePublicShareUseCase,
};

use crate::stream::StateStream;

/// Orchestrates the share requests of one file for one account
#[derive(Clone)]
pub struct ShareSyncEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    account: AccountName,
    path: RemotePath,
    timeout: Option<Duration>,

    refresh_shares: RefreshSharesUseCase,
    create_share: CreatePublicShareUseCase,
    update_share: UpdatePublicShareUseCase,
    delete_share: DeleteShareUseCase,
    capabilities: RefreshCapabilitiesUseCase,

    shares_stream: StateStream<ShareList>,
    creation_stream: StateStream<Share>,
    update_stream: StateStream<Share>,
    deletion_stream: StateStream<()>,
    capability_stream: StateStream<Capability>,
}

impl ShareSyncEngine {
    /// Creates an engine for `path` of `account`
    ///
    /// # Arguments
    ///
    /// * `account` - Account every request is made for
    /// * `path` - File or folder whose shares are managed
    /// * `shares` - Repository shared by all engines of the account; delete
    ///   claims and list reconciliation live there
    /// * `capabilities` - Process-wide capability cache
    /// * `config` - Remote timeout and public link defaults
    pub fn new(
        account: AccountName,
        path: RemotePath,
        shares: Arc<ShareRepository>,
        capabilities: Arc<CapabilityRepository>,
        config: &Config,
    ) -> Self {
        let inner = EngineInner {
            account,
            path,
            timeout: config.remote.timeout(),
            refresh_shares: RefreshSharesUseCase::new(Arc::clone(&shares)),
            create_share: CreatePublicShareUseCase::new(
                Arc::clone(&shares),
                Arc::clone(&capabilities),
                config.sharing.clone(),
            ),
            update_share: UpdatePublicShareUseCase::new(
                Arc::clone(&shares),
                Arc::clone(&capabilities),
            ),
            delete_share: DeleteShareUseCase::new(shares),
            capabilities: RefreshCapabilitiesUseCase::new(capabilities),
            shares_stream: StateStream::new("shares"),
            creation_stream: StateStream::new("share_creation"),
            update_stream: StateStream::new("share_update"),
            deletion_stream: StateStream::new("share_deletion"),
            capability_stream: StateStream::new("capabilities"),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn account(&self) -> &AccountName {
        &self.inner.account
    }

    pub fn path(&self) -> &RemotePath {
        &self.inner.path
    }

    // --- Streams ---

    pub fn shares(&self) -> &StateStream<ShareList> {
        &self.inner.shares_stream
    }

    pub fn share_creation(&self) -> &StateStream<Share> {
        &self.inner.creation_stream
    }

    pub fn share_update(&self) -> &StateStream<Share> {
        &self.inner.update_stream
    }

    pub fn share_deletion(&self) -> &StateStream<()> {
        &self.inner.deletion_stream
    }

    pub fn capabilities(&self) -> &StateStream<Capability> {
        &self.inner.capability_stream
    }

    /// Returns true while a delete of `remote_id` is in flight, from any
    /// engine sharing this engine's repository
    pub fn is_deleting(&self, remote_id: &RemoteShareId) -> bool {
        self.inner
            .delete_share
            .is_deleting(remote_id, &self.inner.account)
    }

    // --- Shares ---

    /// Emits the cached share list as an immediate success
    ///
    /// Supersedes any list refresh still in flight. When the cache holds no
    /// share for the file, nothing is emitted and `None` is returned: an
    /// empty cache does not tell "no shares" from "never loaded", so only
    /// [`load_shares`](Self::load_shares) may produce `Success([])`.
    pub fn show_cached_shares(&self) -> Result<Option<ShareList>, ShareError> {
        let inner = &self.inner;
        let cached = inner.refresh_shares.cached(&inner.path, &inner.account)?;
        if cached.is_empty() {
            debug!("No cached shares, list stream left as is");
            return Ok(None);
        }
        inner.shares_stream.succeed(cached.clone());
        Ok(Some(cached))
    }

    /// Refreshes the share list from the server
    ///
    /// While loading, the stream shows the list already displayed or, on a
    /// first load, the cached one. A failed refresh keeps that list as
    /// `last_known`. Creates and deletes that complete while the request is
    /// on the wire are already part of the published list.
    #[tracing::instrument(
        skip(self),
        fields(account = %self.inner.account, path = %self.inner.path)
    )]
    pub async fn load_shares(&self) -> Result<ShareList, ShareError> {
        let inner = &self.inner;

        let fallback = match inner.refresh_shares.cached(&inner.path, &inner.account) {
            Ok(cached) => Some(cached).filter(|list| !list.is_empty()),
            Err(e) => {
                warn!(error = %e, "Cached shares unavailable");
                None
            }
        };
        let ticket = inner.shares_stream.begin(fallback);

        let result = self
            .remote(inner.refresh_shares.execute(&inner.path, &inner.account))
            .await;

        match &result {
            Ok(list) => debug!(count = list.len(), "Shares refreshed"),
            Err(e) => warn!(error = %e, "Share refresh failed"),
        }
        inner.shares_stream.publish(ticket, result.clone());
        result
    }

    /// Public link request for this engine's file with the configured defaults
    pub fn public_share_request(&self) -> PublicShareParams {
        self.inner.create_share.request(self.inner.path.clone())
    }

    /// Creates a public link
    ///
    /// The request is checked against the capability snapshot first; a
    /// rejected request ends as `Error(Precondition)` on the creation stream
    /// without any remote call. On success the link is appended to the
    /// displayed share list.
    #[tracing::instrument(
        skip(self, params),
        fields(account = %self.inner.account, path = %self.inner.path)
    )]
    pub async fn create_public_share(
        &self,
        params: PublicShareParams,
    ) -> Result<Share, ShareError> {
        let inner = &self.inner;
        let ticket = inner.creation_stream.begin(None);

        let result = if params.path != inner.path {
            Err(DomainError::ValidationFailed(format!(
                "share path {} does not belong to {}",
                params.path, inner.path
            ))
            .into())
        } else {
            self.remote(inner.create_share.execute(params, &inner.account))
                .await
        };

        match &result {
            Ok(share) => {
                info!(remote_id = %share.remote_id(), "Public share created");
                inner
                    .shares_stream
                    .modify_data(|list| list.upsert(share.clone()));
            }
            Err(e) => warn!(error = %e, "Public share creation failed"),
        }
        inner.creation_stream.publish(ticket, result.clone());
        result
    }

    /// Edits an existing public link; the displayed list is updated in place
    #[tracing::instrument(
        skip(self, remote_id, changes),
        fields(account = %self.inner.account, remote_id = %remote_id)
    )]
    pub async fn update_public_share(
        &self,
        remote_id: RemoteShareId,
        changes: PublicShareUpdate,
    ) -> Result<Share, ShareError> {
        let inner = &self.inner;
        let ticket = inner.update_stream.begin(None);

        let result = self
            .remote(
                inner
                    .update_share
                    .execute(&remote_id, &changes, &inner.account),
            )
            .await;

        match &result {
            Ok(share) => {
                info!("Public share updated");
                inner
                    .shares_stream
                    .modify_data(|list| list.upsert(share.clone()));
            }
            Err(e) => warn!(error = %e, "Public share update failed"),
        }
        inner.update_stream.publish(ticket, result.clone());
        result
    }

    /// Deletes a share of any type
    ///
    /// At most one delete per share identity is in flight across every
    /// engine of the repository. A second request for the same identity
    /// fails with `ShareError::DeleteInProgress` immediately and leaves every
    /// stream untouched. On success the share
    /// is removed from the displayed list without another list fetch.
    #[tracing::instrument(
        skip(self, remote_id),
        fields(account = %self.inner.account, remote_id = %remote_id)
    )]
    pub async fn delete_share(&self, remote_id: RemoteShareId) -> Result<(), ShareError> {
        let inner = &self.inner;

        let claim = match inner.delete_share.claim(&remote_id, &inner.account) {
            Ok(claim) => claim,
            Err(e) => {
                warn!("Delete already in progress, request ignored");
                return Err(e);
            }
        };

        let ticket = inner.deletion_stream.begin(None);
        let result = self.remote(inner.delete_share.execute(&claim)).await;

        match &result {
            Ok(()) => {
                info!("Share deleted");
                inner.shares_stream.modify_data(|list| {
                    list.remove(&remote_id);
                });
            }
            Err(e) => warn!(error = %e, "Share deletion failed"),
        }
        inner.deletion_stream.publish(ticket, result.clone());
        result
    }

    // --- Capabilities ---

    /// Capabilities of the server, fetched once per session
    ///
    /// A snapshot already cached is emitted as an immediate success.
    #[tracing::instrument(skip(self), fields(account = %self.inner.account))]
    pub async fn load_capabilities(&self) -> Result<Capability, ShareError> {
        let inner = &self.inner;

        if let Some(capability) = inner.capabilities.cached(&inner.account) {
            debug!("Capabilities served from cache");
            inner.capability_stream.succeed(capability.clone());
            return Ok(capability);
        }

        let ticket = inner.capability_stream.begin(None);
        let result = self.remote(inner.capabilities.load(&inner.account)).await;
        if let Err(e) = &result {
            warn!(error = %e, "Capability fetch failed");
        }
        inner.capability_stream.publish(ticket, result.clone());
        result
    }

    /// Fetches a new capability snapshot, replacing the cached one on success
    #[tracing::instrument(skip(self), fields(account = %self.inner.account))]
    pub async fn refresh_capabilities(&self) -> Result<Capability, ShareError> {
        let inner = &self.inner;
        let ticket = inner.capability_stream.begin(None);
        let result = self.remote(inner.capabilities.execute(&inner.account)).await;
        if let Err(e) = &result {
            warn!(error = %e, "Capability refresh failed");
        }
        inner.capability_stream.publish(ticket, result.clone());
        result
    }

    /// Bounds a remote-backed call by the configured timeout, if any
    async fn remote<T>(
        &self,
        call: impl Future<Output = Result<T, ShareError>>,
    ) -> Result<T, ShareError> {
        match self.inner.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(RemoteError::Timeout(limit.as_secs()).into()),
            },
            None => call.await,
        }
    }
}

impl std::fmt::Debug for ShareSyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareSyncEngine")
            .field("account", &self.inner.account)
            .field("path", &self.inner.path)
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}
