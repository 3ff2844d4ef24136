//! Domain entities and business logic
//!
//! This module contains the core domain types for ShareSync:
//! - Newtypes for type-safe identifiers and validated domain values
//! - Share entities and per-file share lists
//! - Server capability snapshots and the gating rules derived from them
//! - Observable operation state
//! - Domain-specific error types

pub mod capability;
pub mod errors;
pub mod newtypes;
pub mod operation;
pub mod share;

// Re-export commonly used types
pub use capability::{check_create_public_share, Capability, CapabilityFlag};
pub use errors::{DomainError, PreconditionError, RemoteError, ShareError};
pub use newtypes::*;
pub use operation::OperationResult;
pub use share::{
    default_link_name, PublicShareParams, PublicShareUpdate, Share, ShareList, ShareType,
    FILE_NAME_PLACEHOLDER,
};
