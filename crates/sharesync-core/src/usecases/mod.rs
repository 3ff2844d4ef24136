//! Use cases (interactors) for ShareSync
//!
//! This module contains the application use cases that orchestrate
//! domain rules and the repositories. Use cases are thin coordinators
//! that delegate gating rules to domain functions and I/O to repositories.
//!
//! ## Use Cases
//!
//! - [`RefreshSharesUseCase`] - Cached and refreshed share lists of a file
//! - [`CreatePublicShareUseCase`] - Capability-gated public link creation
//! - [`UpdatePublicShareUseCase`] - Edits of an existing public link
//! - [`DeleteShareUseCase`] - Share removal
//! - [`RefreshCapabilitiesUseCase`] - Server capability snapshots

pub mod create_public_share;
pub mod delete_share;
pub mod refresh_capabilities;
pub mod refresh_shares;
pub mod update_public_share;

pub use create_public_share::CreatePublicShareUseCase;
pub use delete_share::DeleteShareUseCase;
pub use refresh_capabilities::RefreshCapabilitiesUseCase;
pub use refresh_shares::RefreshSharesUseCase;
pub use update_public_share::UpdatePublicShareUseCase;
