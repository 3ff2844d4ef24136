//! Capability snapshot use case

use std::sync::Arc;

use crate::domain::{AccountName, Capability, ShareError};
use crate::repository::CapabilityRepository;

/// Use case for reading the sharing capabilities of the server
pub struct RefreshCapabilitiesUseCase {
    repository: Arc<CapabilityRepository>,
}

impl RefreshCapabilitiesUseCase {
    pub fn new(repository: Arc<CapabilityRepository>) -> Self {
        Self { repository }
    }

    /// Snapshot fetched earlier in this session, if any
    pub fn cached(&self, account: &AccountName) -> Option<Capability> {
        self.repository.snapshot(account)
    }

    /// Cached snapshot, fetching it on first use
    pub async fn load(&self, account: &AccountName) -> Result<Capability, ShareError> {
        self.repository.get_or_fetch(account).await
    }

    /// Fetches a new snapshot regardless of the cache
    pub async fn execute(&self, account: &AccountName) -> Result<Capability, ShareError> {
        self.repository.refresh(account).await
    }
}
