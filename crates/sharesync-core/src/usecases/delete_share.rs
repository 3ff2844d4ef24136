//! Share deletion use case

use std::sync::Arc;

use crate::domain::{AccountName, RemoteShareId, ShareError};
use crate::in_flight::DeleteGuard;
use crate::repository::ShareRepository;

/// Use case for deleting a share of any type
///
/// A delete runs under a claim from [`claim`](Self::claim); the repository
/// hands out one claim per share identity at a time.
pub struct DeleteShareUseCase {
    repository: Arc<ShareRepository>,
}

impl DeleteShareUseCase {
    pub fn new(repository: Arc<ShareRepository>) -> Self {
        Self { repository }
    }

    /// Claims `remote_id` for deletion
    ///
    /// # Errors
    ///
    /// Returns `ShareError::DeleteInProgress` if a delete of the same share
    /// is already in flight.
    pub fn claim(
        &self,
        remote_id: &RemoteShareId,
        account: &AccountName,
    ) -> Result<DeleteGuard, ShareError> {
        self.repository.claim_delete(remote_id, account)
    }

    pub fn is_deleting(&self, remote_id: &RemoteShareId, account: &AccountName) -> bool {
        self.repository.is_deleting(remote_id, account)
    }

    /// Deletes the claimed share remotely, then from the local cache
    ///
    /// # Errors
    ///
    /// Returns `ShareError::Remote` if the server refused or could not be
    /// reached (the cache is untouched), or `ShareError::LocalCache`.
    pub async fn execute(&self, claim: &DeleteGuard) -> Result<(), ShareError> {
        self.repository.delete_share(claim).await
    }
}
