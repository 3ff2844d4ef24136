//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates or in
//! the host application.
//!
//! ## Ports Overview
//!
//! - [`IRemoteShareSource`] - Share CRUD against the remote server
//! - [`ILocalShareCache`] - Last-known share records per account and file
//! - [`ICapabilityProvider`] - Server capability snapshots

pub mod capability_provider;
pub mod local_share_cache;
pub mod remote_share_source;

pub use capability_provider::ICapabilityProvider;
pub use local_share_cache::ILocalShareCache;
pub use remote_share_source::IRemoteShareSource;
