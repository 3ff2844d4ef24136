//! Shared fixtures for the engine integration tests
//!
//! The fakes keep a tiny server state in memory. Each remote operation goes
//! through a [`Gate`]: while a gate holds, calls park until the test
//! releases them, which makes in-flight states observable without sleeps.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use sharesync_cache::MemoryShareCache;
use sharesync_core::config::Config;
use sharesync_core::domain::{
    AccountName, Capability, CapabilityFlag, PublicShareParams, PublicShareUpdate, RemoteError,
    RemotePath, RemoteShareId, Share, ShareList,
};
use sharesync_core::ports::{ICapabilityProvider, IRemoteShareSource};
use sharesync_core::repository::{CapabilityRepository, ShareRepository};
use sharesync_engine::ShareSyncEngine;

// ============================================================================
// Gate
// ============================================================================

/// Holds remote calls until the test lets them through
#[derive(Default)]
pub struct Gate {
    hold: AtomicBool,
    entries: AtomicUsize,
    entered: Notify,
    parked: Mutex<Vec<Arc<Notify>>>,
}

impl Gate {
    /// Parks every following call until released
    pub fn hold(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    /// Stops holding and releases every parked call
    pub fn open(&self) {
        self.hold.store(false, Ordering::SeqCst);
        for parked in self.parked.lock().unwrap().drain(..) {
            parked.notify_one();
        }
    }

    /// Waits until `count` calls in total have reached the gate
    pub async fn wait_entered(&self, count: usize) {
        loop {
            if self.entries.load(Ordering::SeqCst) >= count {
                return;
            }
            self.entered.notified().await;
        }
    }

    pub fn release_oldest(&self) {
        let parked = self.parked.lock().unwrap().remove(0);
        parked.notify_one();
    }

    pub fn release_newest(&self) {
        let parked = self.parked.lock().unwrap().pop();
        if let Some(parked) = parked {
            parked.notify_one();
        }
    }

    pub fn parked(&self) -> usize {
        self.parked.lock().unwrap().len()
    }

    async fn pass(&self) {
        let release = if self.hold.load(Ordering::SeqCst) {
            let release = Arc::new(Notify::new());
            self.parked.lock().unwrap().push(Arc::clone(&release));
            Some(release)
        } else {
            None
        };
        self.entries.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();

        if let Some(release) = release {
            release.notified().await;
        }
    }
}

// ============================================================================
// Remote share source
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Create,
    Update,
    Delete,
}

/// Remote source backed by an in-memory server share list
#[derive(Default)]
pub struct FakeRemote {
    server: Mutex<Vec<Share>>,
    failures: Mutex<HashMap<Op, RemoteError>>,
    calls: Mutex<HashMap<Op, usize>>,
    next_id: AtomicUsize,
    pub list_gate: Gate,
    pub create_gate: Gate,
    pub update_gate: Gate,
    pub delete_gate: Gate,
}

impl FakeRemote {
    pub fn with_shares(shares: Vec<Share>) -> Self {
        let remote = Self::default();
        remote.set_server(shares);
        remote
    }

    pub fn set_server(&self, shares: Vec<Share>) {
        *self.server.lock().unwrap() = shares;
    }

    pub fn server(&self) -> Vec<Share> {
        self.server.lock().unwrap().clone()
    }

    pub fn fail_next(&self, op: Op, err: RemoteError) {
        self.failures.lock().unwrap().insert(op, err);
    }

    pub fn calls(&self, op: Op) -> usize {
        self.calls.lock().unwrap().get(&op).copied().unwrap_or(0)
    }

    fn record(&self, op: Op) {
        *self.calls.lock().unwrap().entry(op).or_insert(0) += 1;
    }

    fn take_failure(&self, op: Op) -> Result<(), RemoteError> {
        match self.failures.lock().unwrap().remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl IRemoteShareSource for FakeRemote {
    async fn list(
        &self,
        _account: &AccountName,
        _path: &RemotePath,
    ) -> Result<ShareList, RemoteError> {
        self.record(Op::List);
        // The answer is fixed when the request reaches the server
        let snapshot: ShareList = self.server().into();
        self.list_gate.pass().await;
        self.take_failure(Op::List)?;
        Ok(snapshot)
    }

    async fn create(
        &self,
        account: &AccountName,
        params: &PublicShareParams,
    ) -> Result<Share, RemoteError> {
        self.record(Op::Create);
        self.create_gate.pass().await;
        self.take_failure(Op::Create)?;

        let id = 100 + self.next_id.fetch_add(1, Ordering::SeqCst);
        let share = Share::new_public_link(
            RemoteShareId::new(id.to_string()).unwrap(),
            account.clone(),
            params.path.clone(),
            params.name.clone(),
            format!("http://server:port/s/{id}"),
        )
        .with_permissions(params.permissions)
        .with_password(params.password.clone())
        .with_expiration_millis(params.expiration_millis)
        .with_public_upload(params.public_upload);
        self.server.lock().unwrap().push(share.clone());
        Ok(share)
    }

    async fn update(
        &self,
        _account: &AccountName,
        remote_id: &RemoteShareId,
        changes: &PublicShareUpdate,
    ) -> Result<Share, RemoteError> {
        self.record(Op::Update);
        self.update_gate.pass().await;
        self.take_failure(Op::Update)?;

        let mut server = self.server.lock().unwrap();
        let existing = server
            .iter_mut()
            .find(|s| s.remote_id() == remote_id)
            .ok_or_else(|| RemoteError::NotFound(remote_id.to_string()))?;
        let mut updated = existing.clone();
        if let Some(name) = &changes.name {
            updated = updated.with_name(name.clone());
        }
        if let Some(password) = &changes.password {
            updated = updated.with_password(Some(password.clone()));
        }
        if let Some(millis) = changes.expiration_millis {
            updated = updated.with_expiration_millis(millis);
        }
        if let Some(permissions) = changes.permissions {
            updated = updated.with_permissions(permissions);
        }
        if let Some(public_upload) = changes.public_upload {
            updated = updated.with_public_upload(public_upload);
        }
        *existing = updated.clone();
        Ok(updated)
    }

    async fn delete(
        &self,
        _account: &AccountName,
        remote_id: &RemoteShareId,
    ) -> Result<(), RemoteError> {
        self.record(Op::Delete);
        self.delete_gate.pass().await;
        self.take_failure(Op::Delete)?;

        let mut server = self.server.lock().unwrap();
        let before = server.len();
        server.retain(|s| s.remote_id() != remote_id);
        if server.len() == before {
            return Err(RemoteError::NotFound(remote_id.to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// Capability provider
// ============================================================================

pub struct FakeCapabilities {
    capability: Mutex<Capability>,
    failure: Mutex<Option<RemoteError>>,
    fetches: AtomicUsize,
    pub gate: Gate,
}

impl FakeCapabilities {
    pub fn new(capability: Capability) -> Self {
        Self {
            capability: Mutex::new(capability),
            failure: Mutex::new(None),
            fetches: AtomicUsize::new(0),
            gate: Gate::default(),
        }
    }

    pub fn set(&self, capability: Capability) {
        *self.capability.lock().unwrap() = capability;
    }

    pub fn fail_next(&self, err: RemoteError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ICapabilityProvider for FakeCapabilities {
    async fn fetch(&self, _account: &AccountName) -> Result<Capability, RemoteError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.gate.pass().await;
        if let Some(err) = self.failure.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self.capability.lock().unwrap().clone())
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn account() -> AccountName {
    AccountName::new("admin").unwrap()
}

pub fn path() -> RemotePath {
    RemotePath::new("/Photos/image.jpg").unwrap()
}

pub fn id(value: &str) -> RemoteShareId {
    RemoteShareId::new(value).unwrap()
}

pub fn link(share_id: &str, name: &str) -> Share {
    Share::new_public_link(
        id(share_id),
        account(),
        path(),
        name,
        format!("http://server:port/s/{share_id}"),
    )
}

/// Everything enabled, nothing enforced
pub fn permissive() -> Capability {
    Capability {
        sharing_api_enabled: CapabilityFlag::True,
        public_enabled: CapabilityFlag::True,
        public_password_enforced: CapabilityFlag::False,
        public_expire_date_enforced: CapabilityFlag::False,
        public_upload: CapabilityFlag::True,
        public_multiple: CapabilityFlag::True,
        resharing: CapabilityFlag::True,
        ..Capability::unknown("10.1.1")
    }
}

pub fn ids(list: &ShareList) -> Vec<String> {
    list.iter().map(|s| s.remote_id().to_string()).collect()
}

/// An engine wired to fakes, with handles on every collaborator
pub struct Harness {
    pub engine: ShareSyncEngine,
    pub remote: Arc<FakeRemote>,
    pub provider: Arc<FakeCapabilities>,
    pub cache: Arc<MemoryShareCache>,
    pub repository: Arc<ShareRepository>,
    pub capabilities: Arc<CapabilityRepository>,
}

impl Harness {
    pub fn new(server: Vec<Share>) -> Self {
        Self::with(server, permissive(), &Config::default())
    }

    pub fn with(server: Vec<Share>, capability: Capability, config: &Config) -> Self {
        let remote = Arc::new(FakeRemote::with_shares(server));
        let provider = Arc::new(FakeCapabilities::new(capability));
        let cache = Arc::new(MemoryShareCache::new());
        let shares = Arc::new(ShareRepository::new(remote.clone(), cache.clone()));
        let capabilities = Arc::new(CapabilityRepository::new(provider.clone()));
        let engine = ShareSyncEngine::new(
            account(),
            path(),
            Arc::clone(&shares),
            capabilities.clone(),
            config,
        );
        Self {
            engine,
            remote,
            provider,
            cache,
            repository: shares,
            capabilities,
        }
    }

    /// Another engine for the same file, on the same repositories
    pub fn second_engine(&self) -> ShareSyncEngine {
        ShareSyncEngine::new(
            account(),
            path(),
            Arc::clone(&self.repository),
            Arc::clone(&self.capabilities),
            &Config::default(),
        )
    }
}
