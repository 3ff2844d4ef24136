//! ShareSync Engine - Observable share-state synchronization
//!
//! Provides:
//! - One engine per (account, file) driving list, create, update and delete
//! - Loading / Success / Error streams with latest-request-wins semantics
//! - At most one in-flight delete per share identity
//! - Tracing subscriber initialisation from the configuration
//!
//! ## Modules
//!
//! - [`engine`] - [`ShareSyncEngine`], the request orchestrator
//! - [`stream`] - [`StateStream`] latest-value pub/sub and [`Subscription`]
//! - [`logging`] - `tracing-subscriber` setup
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sharesync_core::config::Config;
//! use sharesync_core::domain::{AccountName, RemotePath};
//! use sharesync_core::ports::{ICapabilityProvider, IRemoteShareSource};
//! use sharesync_core::repository::{CapabilityRepository, ShareRepository};
//! use sharesync_cache::MemoryShareCache;
//! use sharesync_engine::ShareSyncEngine;
//!
//! # async fn example(
//! #     remote: Arc<dyn IRemoteShareSource>,
//! #     provider: Arc<dyn ICapabilityProvider>,
//! # ) -> anyhow::Result<()> {
//! let config = Config::load_or_default(&Config::default_path());
//! sharesync_engine::logging::init_tracing(&config.logging)?;
//!
//! let shares = Arc::new(ShareRepository::new(remote, Arc::new(MemoryShareCache::new())));
//! let capabilities = Arc::new(CapabilityRepository::new(provider));
//! let engine = ShareSyncEngine::new(
//!     AccountName::new("admin")?,
//!     RemotePath::new("/Photos/image.jpg")?,
//!     shares,
//!     capabilities,
//!     &config,
//! );
//!
//! let mut list = engine.shares().subscribe();
//! tokio::spawn({
//!     let engine = engine.clone();
//!     async move { engine.load_shares().await }
//! });
//! while let Some(state) = list.changed().await {
//!     println!("{state:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod logging;
pub mod stream;

pub use engine::ShareSyncEngine;
pub use stream::{StateStream, Subscription, Ticket};
