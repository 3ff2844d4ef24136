//! Server capabilities and share gating rules
//!
//! The server advertises which sharing features it supports. A
//! [`Capability`] snapshot is fetched once per session and consulted before
//! any public link is created. When no snapshot is available the most
//! restrictive behaviour applies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::PreconditionError;
use super::share::{PublicShareParams, ShareList};

/// Tri-state capability flag as reported by the server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityFlag {
    /// The server did not report the flag
    #[default]
    Unknown,
    False,
    True,
}

impl CapabilityFlag {
    /// Only an explicit `True` enables a feature
    pub fn is_true(&self) -> bool {
        matches!(self, CapabilityFlag::True)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, CapabilityFlag::Unknown)
    }
}

impl From<bool> for CapabilityFlag {
    fn from(value: bool) -> Self {
        if value {
            CapabilityFlag::True
        } else {
            CapabilityFlag::False
        }
    }
}

/// Snapshot of the sharing features advertised by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Server version string, e.g. "10.1.1"
    pub version_string: String,
    /// The sharing API is available at all
    pub sharing_api_enabled: CapabilityFlag,
    /// Public links may be created
    pub public_enabled: CapabilityFlag,
    /// Public links must carry a password
    pub public_password_enforced: CapabilityFlag,
    /// Public links must carry an expiration date
    pub public_expire_date_enforced: CapabilityFlag,
    /// Default expiration offered for new links, in days (0 = none)
    pub public_expire_date_days: u32,
    /// Anonymous uploads into shared folders are allowed
    pub public_upload: CapabilityFlag,
    /// More than one public link per file is allowed
    pub public_multiple: CapabilityFlag,
    /// Received shares may be shared again
    pub resharing: CapabilityFlag,
    /// When the snapshot was fetched
    pub fetched_at: DateTime<Utc>,
}

impl Capability {
    /// Snapshot with every flag unknown (nothing is permitted)
    pub fn unknown(version_string: impl Into<String>) -> Self {
        Self {
            version_string: version_string.into(),
            sharing_api_enabled: CapabilityFlag::Unknown,
            public_enabled: CapabilityFlag::Unknown,
            public_password_enforced: CapabilityFlag::Unknown,
            public_expire_date_enforced: CapabilityFlag::Unknown,
            public_expire_date_days: 0,
            public_upload: CapabilityFlag::Unknown,
            public_multiple: CapabilityFlag::Unknown,
            resharing: CapabilityFlag::Unknown,
            fetched_at: Utc::now(),
        }
    }

    /// Returns true if a new public link may be created at all
    pub fn allows_public_links(&self) -> bool {
        self.sharing_api_enabled.is_true() && self.public_enabled.is_true()
    }

    /// Returns true if a file may carry more than one public link
    pub fn allows_multiple_public_links(&self) -> bool {
        self.public_multiple.is_true()
    }
}

/// Checks a public link creation against the last fetched capabilities
///
/// `existing` is the last known share list of the target path.
///
/// # Errors
/// Returns the first violated precondition. `None` capabilities reject the
/// request with [`PreconditionError::CapabilitiesNotLoaded`].
pub fn check_create_public_share(
    capability: Option<&Capability>,
    existing: &ShareList,
    params: &PublicShareParams,
) -> Result<(), PreconditionError> {
    let capability = capability.ok_or(PreconditionError::CapabilitiesNotLoaded)?;

    if !capability.sharing_api_enabled.is_true() {
        return Err(PreconditionError::SharingApiDisabled);
    }
    if !capability.public_enabled.is_true() {
        return Err(PreconditionError::PublicSharingDisabled);
    }
    if existing.has_public_link() && !capability.allows_multiple_public_links() {
        return Err(PreconditionError::MultiplePublicLinksUnsupported(
            params.path.to_string(),
        ));
    }
    if capability.public_password_enforced.is_true() && !params.has_password() {
        return Err(PreconditionError::PasswordEnforced);
    }
    if capability.public_expire_date_enforced.is_true() && !params.has_expiration() {
        return Err(PreconditionError::ExpirationEnforced);
    }
    if params.public_upload && !capability.public_upload.is_true() {
        return Err(PreconditionError::PublicUploadDisabled);
    }
    Ok(())
}
