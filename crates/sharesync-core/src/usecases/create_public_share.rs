//! Public link creation use case
//!
//! Gates the request against the last capability snapshot, derives a link
//! name when none was given, then creates the link through the repository.
//! A rejected request never reaches the remote source.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::SharingConfig;
use crate::domain::{
    check_create_public_share, default_link_name, AccountName, PublicShareParams, RemotePath,
    Share, ShareError, ShareList,
};
use crate::repository::{CapabilityRepository, ShareRepository};

/// Use case for creating public links
pub struct CreatePublicShareUseCase {
    shares: Arc<ShareRepository>,
    capabilities: Arc<CapabilityRepository>,
    sharing: SharingConfig,
}

impl CreatePublicShareUseCase {
    /// Creates a new CreatePublicShareUseCase
    ///
    /// # Arguments
    ///
    /// * `shares` - Repository performing the remote create and cache upsert
    /// * `capabilities` - Source of the snapshot the request is gated on
    /// * `sharing` - Link name template and default permissions
    pub fn new(
        shares: Arc<ShareRepository>,
        capabilities: Arc<CapabilityRepository>,
        sharing: SharingConfig,
    ) -> Self {
        Self {
            shares,
            capabilities,
            sharing,
        }
    }

    /// Request skeleton for `path` with the configured default permissions
    /// and an empty name, to be derived on execution
    pub fn request(&self, path: RemotePath) -> PublicShareParams {
        let mut params = PublicShareParams::new(path, "");
        params.permissions = self.sharing.default_permissions();
        params
    }

    /// Checks `params` against the capabilities without creating anything
    ///
    /// `existing` is the last known share list of the target path.
    pub fn check(
        &self,
        params: &PublicShareParams,
        existing: &ShareList,
        account: &AccountName,
    ) -> Result<(), ShareError> {
        let capability = self.capabilities.snapshot(account);
        check_create_public_share(capability.as_ref(), existing, params)?;
        Ok(())
    }

    /// Creates a public link
    ///
    /// This method:
    /// 1. Reads the cached shares of the target path
    /// 2. Checks the request against the capability snapshot
    /// 3. Derives a default name if the request carries none
    /// 4. Creates the link remotely and mirrors it in the cache
    ///
    /// # Errors
    ///
    /// Returns `ShareError::Precondition` if the capabilities forbid the
    /// request (no remote call is made), or the repository error otherwise.
    pub async fn execute(
        &self,
        mut params: PublicShareParams,
        account: &AccountName,
    ) -> Result<Share, ShareError> {
        let existing = self.shares.list_shares(&params.path, account)?;

        if let Err(e) = self.check(&params, &existing, account) {
            warn!(account = %account, path = %params.path, error = %e, "Public share rejected");
            return Err(e);
        }

        if params.name.trim().is_empty() {
            let file_name = params.path.file_name().unwrap_or_default();
            params.name = default_link_name(&self.sharing.link_name_template, file_name, &existing);
            debug!(name = %params.name, "Derived public share name");
        }

        self.shares.insert_public_share(&params, account).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Capability, CapabilityFlag, PreconditionError, SharePermissions};
    use crate::ports::{ICapabilityProvider, ILocalShareCache};
    use crate::test_support::{account, link, path, FakeCapabilities, FakeRemote, VecCache};

    struct Fixture {
        usecase: CreatePublicShareUseCase,
        remote: Arc<FakeRemote>,
        cache: Arc<VecCache>,
        capabilities: Arc<CapabilityRepository>,
    }

    fn fixture(flag: CapabilityFlag) -> Fixture {
        fixture_with(FakeCapabilities::new(flag))
    }

    fn fixture_with(provider: FakeCapabilities) -> Fixture {
        let remote = Arc::new(FakeRemote::default());
        let cache = Arc::new(VecCache::default());
        let shares = Arc::new(ShareRepository::new(remote.clone(), cache.clone()));
        let capabilities = Arc::new(CapabilityRepository::new(Arc::new(provider)));
        Fixture {
            usecase: CreatePublicShareUseCase::new(
                shares,
                capabilities.clone(),
                SharingConfig::default(),
            ),
            remote,
            cache,
            capabilities,
        }
    }

    #[tokio::test]
    async fn test_rejected_without_capabilities() {
        let f = fixture(CapabilityFlag::True);

        let err = f
            .usecase
            .execute(f.usecase.request(path()), &account())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ShareError::Precondition(PreconditionError::CapabilitiesNotLoaded)
        );
        assert_eq!(f.remote.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_second_link_rejected_when_multiple_unsupported() {
        let provider = FakeCapabilities::new(CapabilityFlag::True);
        let f = fixture_with(FakeCapabilities::with(Capability {
            public_multiple: CapabilityFlag::False,
            ..provider.fetch(&account()).await.unwrap()
        }));
        f.capabilities.refresh(&account()).await.unwrap();
        f.cache.upsert(&link("1", "image.jpg link")).unwrap();

        let err = f
            .usecase
            .execute(f.usecase.request(path()), &account())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ShareError::Precondition(PreconditionError::MultiplePublicLinksUnsupported(
                "/Photos/image.jpg".to_string()
            ))
        );
        assert_eq!(f.remote.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_derives_name_and_mirrors_share() {
        let f = fixture(CapabilityFlag::True);
        f.capabilities.refresh(&account()).await.unwrap();
        f.cache.upsert(&link("1", "image.jpg link")).unwrap();

        let share = f
            .usecase
            .execute(f.usecase.request(path()), &account())
            .await
            .unwrap();

        assert_eq!(share.name(), "image.jpg link (2)");
        assert_eq!(share.permissions(), SharePermissions::read_only());
        assert_eq!(f.remote.create_calls(), 1);
        assert_eq!(f.cache.query_by_path(&account(), &path()).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_explicit_name_is_kept() {
        let f = fixture(CapabilityFlag::True);
        f.capabilities.refresh(&account()).await.unwrap();

        let mut params = f.usecase.request(path());
        params.name = "holiday".to_string();
        let share = f.usecase.execute(params, &account()).await.unwrap();
        assert_eq!(share.name(), "holiday");
    }
}
