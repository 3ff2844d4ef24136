//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for share identifiers and
//! values. Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// Identifiers
// ============================================================================

/// Server-assigned identity of a share
///
/// Opaque to the client; only required to be non-empty and free of
/// whitespace. Unique within an account once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteShareId(String);

impl RemoteShareId {
    /// Create a new RemoteShareId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains whitespace
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DomainError::InvalidShareId(
                "Share ID cannot be empty".to_string(),
            ));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidShareId(format!(
                "Share ID contains whitespace: {id:?}"
            )));
        }
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RemoteShareId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemoteShareId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RemoteShareId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemoteShareId> for String {
    fn from(id: RemoteShareId) -> Self {
        id.0
    }
}

/// Name of the account a share belongs to (e.g. `admin@server`)
///
/// Used as the isolation key for the local cache and the capability cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountName(String);

impl AccountName {
    /// Create a new AccountName
    ///
    /// # Errors
    /// Returns error if the name is empty or blank
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::InvalidAccountName(
                "Account name cannot be empty".to_string(),
            ));
        }
        Ok(Self(name))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AccountName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AccountName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AccountName> for String {
    fn from(name: AccountName) -> Self {
        name.0
    }
}

// ============================================================================
// Paths
// ============================================================================

/// A server-side file path (must start with /)
///
/// Represents paths in server format, e.g., "/Photos/image.jpg"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemotePath(String);

impl RemotePath {
    /// Create a new RemotePath
    ///
    /// # Errors
    /// Returns error if path doesn't start with /, contains `//` or `..`
    pub fn new(path: impl Into<String>) -> Result<Self, DomainError> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path must start with '/': {path}"
            )));
        }

        if path.len() > 1 && path.contains("//") {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path contains invalid double slashes: {path}"
            )));
        }

        if path.contains("..") {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path contains invalid traversal: {path}"
            )));
        }

        Ok(Self(path))
    }

    /// Create the root path "/"
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the file name component
    ///
    /// A trailing slash (folder paths) is ignored.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.0.trim_end_matches('/');
        if trimmed.is_empty() {
            return None;
        }
        trimmed.rsplit('/').next()
    }
}

impl Display for RemotePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemotePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RemotePath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemotePath> for String {
    fn from(path: RemotePath) -> Self {
        path.0
    }
}

// ============================================================================
// Permissions
// ============================================================================

/// Share permission bitmask as understood by the server
///
/// `READ=1`, `UPDATE=2`, `CREATE=4`, `DELETE=8`, `SHARE=16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SharePermissions(u32);

impl SharePermissions {
    pub const READ: u32 = 1;
    pub const UPDATE: u32 = 2;
    pub const CREATE: u32 = 4;
    pub const DELETE: u32 = 8;
    pub const SHARE: u32 = 16;

    const ALL: u32 = Self::READ | Self::UPDATE | Self::CREATE | Self::DELETE | Self::SHARE;

    /// Create a permission set from raw bits
    ///
    /// # Errors
    /// Returns error if unknown bits are set
    pub fn new(bits: u32) -> Result<Self, DomainError> {
        if bits & !Self::ALL != 0 {
            return Err(DomainError::InvalidPermissions(bits));
        }
        Ok(Self(bits))
    }

    /// Public link that can only be viewed / downloaded
    #[must_use]
    pub const fn read_only() -> Self {
        Self(Self::READ)
    }

    /// Public link to a folder that only accepts uploads (file drop)
    #[must_use]
    pub const fn upload_only() -> Self {
        Self(Self::CREATE)
    }

    /// Public link to a folder with download, upload and edit rights
    #[must_use]
    pub const fn read_write_upload() -> Self {
        Self(Self::READ | Self::UPDATE | Self::CREATE | Self::DELETE)
    }

    /// Raw bits
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Returns true if every bit of `flag` is set
    #[must_use]
    pub const fn contains(&self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    /// Returns true if the permission set allows uploading into the share
    #[must_use]
    pub const fn allows_upload(&self) -> bool {
        self.contains(Self::CREATE)
    }
}

impl Default for SharePermissions {
    fn default() -> Self {
        Self::read_only()
    }
}

impl TryFrom<u32> for SharePermissions {
    type Error = DomainError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl From<SharePermissions> for u32 {
    fn from(p: SharePermissions) -> Self {
        p.0
    }
}

impl Display for SharePermissions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
