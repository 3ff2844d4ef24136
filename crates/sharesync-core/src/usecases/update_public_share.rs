//! Public link update use case

use std::sync::Arc;

use tracing::warn;

use crate::domain::{
    AccountName, Capability, PreconditionError, PublicShareUpdate, RemoteShareId, Share,
    ShareError,
};
use crate::repository::{CapabilityRepository, ShareRepository};

/// Use case for editing an existing public link
///
/// Edits are checked against the capability snapshot when one is loaded.
/// Without a snapshot the server stays the only judge, since the link
/// already exists and was accepted once.
pub struct UpdatePublicShareUseCase {
    shares: Arc<ShareRepository>,
    capabilities: Arc<CapabilityRepository>,
}

impl UpdatePublicShareUseCase {
    pub fn new(shares: Arc<ShareRepository>, capabilities: Arc<CapabilityRepository>) -> Self {
        Self {
            shares,
            capabilities,
        }
    }

    /// Applies `changes` to the link `remote_id`
    ///
    /// # Errors
    ///
    /// Returns `ShareError::Precondition` when the changes would break an
    /// enforced policy, or the repository error otherwise.
    pub async fn execute(
        &self,
        remote_id: &RemoteShareId,
        changes: &PublicShareUpdate,
        account: &AccountName,
    ) -> Result<Share, ShareError> {
        if let Some(capability) = self.capabilities.snapshot(account) {
            if let Err(e) = check_update(&capability, changes) {
                warn!(
                    account = %account,
                    remote_id = %remote_id,
                    error = %e,
                    "Public share update rejected"
                );
                return Err(e.into());
            }
        }

        self.shares
            .update_public_share(remote_id, changes, account)
            .await
    }
}

fn check_update(
    capability: &Capability,
    changes: &PublicShareUpdate,
) -> Result<(), PreconditionError> {
    if capability.public_password_enforced.is_true() && changes.password.as_deref() == Some("") {
        return Err(PreconditionError::PasswordEnforced);
    }
    if capability.public_expire_date_enforced.is_true() && changes.expiration_millis == Some(0) {
        return Err(PreconditionError::ExpirationEnforced);
    }
    if changes.public_upload == Some(true) && !capability.public_upload.is_true() {
        return Err(PreconditionError::PublicUploadDisabled);
    }
    Ok(())
}
