//! Share domain entity
//!
//! A [`Share`] is a public link or a private (user, group, federated) share
//! of one remote file or folder. Shares are created and mutated only by the
//! remote server; the client keeps a mirror of them in a [`ShareList`] per
//! file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::{AccountName, RemotePath, RemoteShareId, SharePermissions};

/// Kind of share as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareType {
    /// Link accessible without authenticating as a specific account
    PublicLink,
    /// Share with a single user of the same server
    User,
    /// Share with a group of users
    Group,
    /// Share with a user on another server
    Federated,
}

impl ShareType {
    /// Returns true for shares that are reachable through a link
    pub fn is_public(&self) -> bool {
        matches!(self, ShareType::PublicLink)
    }
}

impl std::fmt::Display for ShareType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ShareType::PublicLink => "public_link",
            ShareType::User => "user",
            ShareType::Group => "group",
            ShareType::Federated => "federated",
        };
        write!(f, "{s}")
    }
}

/// Converts an epoch-milliseconds expiration into a date; `0` means never
pub fn expiration_from_millis(millis: i64) -> Option<DateTime<Utc>> {
    if millis <= 0 {
        return None;
    }
    DateTime::from_timestamp_millis(millis)
}

/// Converts an expiration date back into epoch-milliseconds; `None` is `0`
pub fn expiration_to_millis(expiration: Option<&DateTime<Utc>>) -> i64 {
    expiration.map_or(0, DateTime::timestamp_millis)
}

/// A share of a remote file or folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    /// Server-assigned identity
    remote_id: RemoteShareId,
    /// Public link or private share
    share_type: ShareType,
    /// Account the share was listed for
    account_owner: AccountName,
    /// Shared file or folder
    path: RemotePath,
    /// Whether `path` is a folder
    is_folder: bool,
    /// Display name of the link
    name: String,
    /// Full URL of a public link
    share_link: Option<String>,
    /// Link token (last path segment of the URL)
    token: Option<String>,
    /// Recipient of a private share
    share_with: Option<String>,
    /// Permission bitmask
    permissions: SharePermissions,
    /// Password protecting a public link, when known to the client
    password: Option<String>,
    /// Whether anonymous uploads are allowed into a shared folder
    public_upload: bool,
    /// When the link stops working (None = never)
    expiration: Option<DateTime<Utc>>,
    /// When the share was created on the server
    shared_at: DateTime<Utc>,
}

impl Share {
    /// Creates a public link record as returned by the server
    pub fn new_public_link(
        remote_id: RemoteShareId,
        account_owner: AccountName,
        path: RemotePath,
        name: impl Into<String>,
        share_link: impl Into<String>,
    ) -> Self {
        let share_link = share_link.into();
        let token = share_link
            .rsplit('/')
            .next()
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        Self {
            remote_id,
            share_type: ShareType::PublicLink,
            account_owner,
            path,
            is_folder: false,
            name: name.into(),
            share_link: Some(share_link),
            token,
            share_with: None,
            permissions: SharePermissions::read_only(),
            password: None,
            public_upload: false,
            expiration: None,
            shared_at: Utc::now(),
        }
    }

    /// Creates a private share record (user, group or federated)
    pub fn new_private(
        remote_id: RemoteShareId,
        account_owner: AccountName,
        path: RemotePath,
        share_type: ShareType,
        share_with: impl Into<String>,
    ) -> Self {
        let share_with = share_with.into();
        Self {
            remote_id,
            share_type,
            account_owner,
            path,
            is_folder: false,
            name: share_with.clone(),
            share_link: None,
            token: None,
            share_with: Some(share_with),
            permissions: SharePermissions::read_only(),
            password: None,
            public_upload: false,
            expiration: None,
            shared_at: Utc::now(),
        }
    }

    // --- Builder-style setters ---

    pub fn with_folder(mut self, is_folder: bool) -> Self {
        self.is_folder = is_folder;
        self
    }

    pub fn with_permissions(mut self, permissions: SharePermissions) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password.filter(|p| !p.is_empty());
        self
    }

    pub fn with_public_upload(mut self, public_upload: bool) -> Self {
        self.public_upload = public_upload;
        self
    }

    pub fn with_expiration(mut self, expiration: Option<DateTime<Utc>>) -> Self {
        self.expiration = expiration;
        self
    }

    /// Sets the expiration from epoch-milliseconds (`0` = never)
    pub fn with_expiration_millis(mut self, millis: i64) -> Self {
        self.expiration = expiration_from_millis(millis);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_shared_at(mut self, shared_at: DateTime<Utc>) -> Self {
        self.shared_at = shared_at;
        self
    }

    // --- Getters ---

    pub fn remote_id(&self) -> &RemoteShareId {
        &self.remote_id
    }

    pub fn share_type(&self) -> ShareType {
        self.share_type
    }

    pub fn account_owner(&self) -> &AccountName {
        &self.account_owner
    }

    pub fn path(&self) -> &RemotePath {
        &self.path
    }

    pub fn is_folder(&self) -> bool {
        self.is_folder
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn share_link(&self) -> Option<&str> {
        self.share_link.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn share_with(&self) -> Option<&str> {
        self.share_with.as_deref()
    }

    pub fn permissions(&self) -> SharePermissions {
        self.permissions
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn is_password_protected(&self) -> bool {
        self.password.is_some()
    }

    pub fn public_upload(&self) -> bool {
        self.public_upload
    }

    pub fn expiration(&self) -> Option<&DateTime<Utc>> {
        self.expiration.as_ref()
    }

    /// Expiration as epoch-milliseconds, `0` when the share never expires
    pub fn expiration_millis(&self) -> i64 {
        expiration_to_millis(self.expiration.as_ref())
    }

    pub fn shared_at(&self) -> DateTime<Utc> {
        self.shared_at
    }

    // --- Queries ---

    pub fn is_public_link(&self) -> bool {
        self.share_type.is_public()
    }

    /// Returns true if the share never expires
    pub fn never_expires(&self) -> bool {
        self.expiration.is_none()
    }

    /// Returns true if the share had expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|exp| exp <= now)
    }
}

/// Shares of a single file, in server-returned order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareList(Vec<Share>);

impl ShareList {
    /// Creates an empty list
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Share> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Share] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Share> {
        self.0
    }

    pub fn get(&self, remote_id: &RemoteShareId) -> Option<&Share> {
        self.0.iter().find(|s| s.remote_id() == remote_id)
    }

    pub fn contains(&self, remote_id: &RemoteShareId) -> bool {
        self.get(remote_id).is_some()
    }

    /// Public links only, in list order
    pub fn public_links(&self) -> impl Iterator<Item = &Share> {
        self.0.iter().filter(|s| s.is_public_link())
    }

    pub fn has_public_link(&self) -> bool {
        self.public_links().next().is_some()
    }

    /// Removes the share with the given identity; returns whether it was present
    pub fn remove(&mut self, remote_id: &RemoteShareId) -> bool {
        let before = self.0.len();
        self.0.retain(|s| s.remote_id() != remote_id);
        self.0.len() != before
    }

    /// Replaces the share with the same identity in place, or appends it
    pub fn upsert(&mut self, share: Share) {
        match self
            .0
            .iter_mut()
            .find(|s| s.remote_id() == share.remote_id())
        {
            Some(existing) => *existing = share,
            None => self.0.push(share),
        }
    }
}

impl From<Vec<Share>> for ShareList {
    fn from(shares: Vec<Share>) -> Self {
        Self(shares)
    }
}

impl FromIterator<Share> for ShareList {
    fn from_iter<I: IntoIterator<Item = Share>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ShareList {
    type Item = Share;
    type IntoIter = std::vec::IntoIter<Share>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ShareList {
    type Item = &'a Share;
    type IntoIter = std::slice::Iter<'a, Share>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Parameters of a public link creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicShareParams {
    /// File or folder to share
    pub path: RemotePath,
    /// Permission bitmask of the link
    pub permissions: SharePermissions,
    /// Display name; empty means "derive a default name"
    pub name: String,
    /// Optional password; empty means none
    pub password: Option<String>,
    /// Expiration as epoch-milliseconds, `0` for never
    pub expiration_millis: i64,
    /// Allow anonymous uploads into a shared folder
    pub public_upload: bool,
}

impl PublicShareParams {
    /// Read-only link with no password and no expiration
    pub fn new(path: RemotePath, name: impl Into<String>) -> Self {
        Self {
            path,
            permissions: SharePermissions::read_only(),
            name: name.into(),
            password: None,
            expiration_millis: 0,
            public_upload: false,
        }
    }

    pub fn has_password(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn has_expiration(&self) -> bool {
        self.expiration_millis > 0
    }
}

/// Changes applied to an existing public link
///
/// Fields left as `None` are not modified on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicShareUpdate {
    pub name: Option<String>,
    /// `Some("")` removes the password
    pub password: Option<String>,
    /// `Some(0)` removes the expiration
    pub expiration_millis: Option<i64>,
    pub permissions: Option<SharePermissions>,
    pub public_upload: Option<bool>,
}

/// Placeholder substituted with the file name in link name templates
pub const FILE_NAME_PLACEHOLDER: &str = "{file}";

/// Derives a default public link name that does not collide with `existing`
///
/// `template` is expanded with the file name (`"{file} link"` gives
/// `"image.jpg link"`); on collision ` (2)`, ` (3)`, ... is appended.
pub fn default_link_name(template: &str, file_name: &str, existing: &ShareList) -> String {
    let base = template.replace(FILE_NAME_PLACEHOLDER, file_name);
    let taken = |candidate: &str| existing.public_links().any(|s| s.name() == candidate);

    if !taken(&base) {
        return base;
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{base} ({suffix})");
        if !taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}
