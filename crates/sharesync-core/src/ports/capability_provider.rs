//! Capability provider port (driven/secondary port)
//!
//! Fetches the sharing capabilities advertised by the server for an account.
//! Caching is not the provider's concern; see
//! [`CapabilityRepository`](crate::repository::CapabilityRepository).

use crate::domain::{AccountName, Capability, RemoteError};

/// Port trait for fetching server capabilities
#[async_trait::async_trait]
pub trait ICapabilityProvider: Send + Sync {
    /// Fetches a fresh capability snapshot for the account
    async fn fetch(&self, account: &AccountName) -> Result<Capability, RemoteError>;
}
