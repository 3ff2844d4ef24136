//! Share list use case
//!
//! Serves the cached share list of a file immediately and refreshes it from
//! the remote source on demand.

use std::sync::Arc;

use crate::domain::{AccountName, RemotePath, ShareError, ShareList};
use crate::repository::ShareRepository;

/// Use case for reading the shares of one file
pub struct RefreshSharesUseCase {
    repository: Arc<ShareRepository>,
}

impl RefreshSharesUseCase {
    pub fn new(repository: Arc<ShareRepository>) -> Self {
        Self { repository }
    }

    /// Last known shares of `path`, straight from the local cache
    pub fn cached(&self, path: &RemotePath, account: &AccountName) -> Result<ShareList, ShareError> {
        self.repository.list_shares(path, account)
    }

    /// Fetches the shares of `path` from the server and reconciles the cache
    ///
    /// # Errors
    ///
    /// Returns `ShareError::Remote` when the listing fails (the cache is left
    /// as it was) or `ShareError::LocalCache` when reconciliation fails.
    pub async fn execute(
        &self,
        path: &RemotePath,
        account: &AccountName,
    ) -> Result<ShareList, ShareError> {
        self.repository.refresh_shares(path, account).await
    }
}
