//! In-memory fakes of the ports, shared by the unit tests of this crate

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::domain::{
    AccountName, Capability, CapabilityFlag, PublicShareParams, PublicShareUpdate, RemoteError,
    RemotePath, RemoteShareId, Share, ShareList,
};
use crate::ports::{ICapabilityProvider, ILocalShareCache, IRemoteShareSource};

pub fn account() -> AccountName {
    AccountName::new("admin").unwrap()
}

pub fn path() -> RemotePath {
    RemotePath::new("/Photos/image.jpg").unwrap()
}

pub fn link(id: &str, name: &str) -> Share {
    Share::new_public_link(
        RemoteShareId::new(id).unwrap(),
        account(),
        path(),
        name,
        format!("http://server:port/s/{id}"),
    )
}

/// Remote source answering from memory; one injected failure at a time
#[derive(Default)]
pub struct FakeRemote {
    listed: Mutex<Vec<Share>>,
    failure: Mutex<Option<RemoteError>>,
    next_id: AtomicU64,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    list_gate: Mutex<Option<Arc<Notify>>>,
    list_entered: Notify,
}

impl FakeRemote {
    pub fn with_list(shares: Vec<Share>) -> Self {
        let remote = Self::default();
        *remote.listed.lock().unwrap() = shares;
        remote
    }

    pub fn set_list(&self, shares: Vec<Share>) {
        *self.listed.lock().unwrap() = shares;
    }

    /// Parks the next list call, after its answer is fixed, until the
    /// returned gate is notified
    pub fn hold_list(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.list_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Resolves once a held list call is parked
    pub async fn list_entered(&self) {
        self.list_entered.notified().await;
    }

    pub fn fail_next(&self, err: RemoteError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> Result<(), RemoteError> {
        match self.failure.lock().unwrap().take() {
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
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let answer: ShareList = self.listed.lock().unwrap().clone().into();
        let gate = self.list_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            self.list_entered.notify_one();
            gate.notified().await;
        }
        self.take_failure()?;
        Ok(answer)
    }

    async fn create(
        &self,
        account: &AccountName,
        params: &PublicShareParams,
    ) -> Result<Share, RemoteError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        let id = 100 + self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(Share::new_public_link(
            RemoteShareId::new(id.to_string()).unwrap(),
            account.clone(),
            params.path.clone(),
            params.name.clone(),
            format!("http://server:port/s/{id}"),
        )
        .with_permissions(params.permissions)
        .with_password(params.password.clone())
        .with_expiration_millis(params.expiration_millis)
        .with_public_upload(params.public_upload))
    }

    async fn update(
        &self,
        account: &AccountName,
        remote_id: &RemoteShareId,
        changes: &PublicShareUpdate,
    ) -> Result<Share, RemoteError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        let name = changes.name.clone().unwrap_or_else(|| "updated".to_string());
        Ok(Share::new_public_link(
            remote_id.clone(),
            account.clone(),
            path(),
            name,
            format!("http://server:port/s/{remote_id}"),
        ))
    }

    async fn delete(
        &self,
        _account: &AccountName,
        _remote_id: &RemoteShareId,
    ) -> Result<(), RemoteError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()
    }
}

/// Cache over a single vector; writes can be made to fail
#[derive(Default)]
pub struct VecCache {
    rows: Mutex<Vec<Share>>,
    fail_writes: AtomicBool,
}

impl VecCache {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("cache is read-only");
        }
        Ok(())
    }
}

impl ILocalShareCache for VecCache {
    fn upsert(&self, share: &Share) -> anyhow::Result<()> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|s| {
            s.account_owner() == share.account_owner() && s.remote_id() == share.remote_id()
        }) {
            Some(existing) => *existing = share.clone(),
            None => rows.push(share.clone()),
        }
        Ok(())
    }

    fn remove(&self, account: &AccountName, remote_id: &RemoteShareId) -> anyhow::Result<bool> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| !(s.account_owner() == account && s.remote_id() == remote_id));
        Ok(rows.len() != before)
    }

    fn query_by_path(
        &self,
        account: &AccountName,
        path: &RemotePath,
    ) -> anyhow::Result<ShareList> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|s| s.account_owner() == account && s.path() == path)
            .cloned()
            .collect())
    }

    fn get(
        &self,
        account: &AccountName,
        remote_id: &RemoteShareId,
    ) -> anyhow::Result<Option<Share>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|s| s.account_owner() == account && s.remote_id() == remote_id)
            .cloned())
    }

    fn replace_for_path(
        &self,
        account: &AccountName,
        path: &RemotePath,
        shares: &ShareList,
    ) -> anyhow::Result<()> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|s| !(s.account_owner() == account && s.path() == path));
        rows.extend(shares.iter().cloned());
        Ok(())
    }
}

/// Capability provider answering with a fixed snapshot
pub struct FakeCapabilities {
    capability: Capability,
    failure: Mutex<Option<RemoteError>>,
    fetch_calls: AtomicUsize,
}

impl FakeCapabilities {
    /// Sharing API on, nothing enforced, every public feature set to `flag`
    pub fn new(flag: CapabilityFlag) -> Self {
        Self::with(Capability {
            sharing_api_enabled: CapabilityFlag::True,
            public_enabled: flag,
            public_password_enforced: CapabilityFlag::False,
            public_expire_date_enforced: CapabilityFlag::False,
            public_upload: flag,
            public_multiple: flag,
            resharing: flag,
            ..Capability::unknown("10.1.1")
        })
    }

    pub fn with(capability: Capability) -> Self {
        Self {
            capability,
            failure: Mutex::new(None),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(&self, err: RemoteError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ICapabilityProvider for FakeCapabilities {
    async fn fetch(&self, _account: &AccountName) -> Result<Capability, RemoteError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failure.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self.capability.clone())
    }
}
