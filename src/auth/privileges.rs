//! Privileges and role presets

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Capabilities a token can grant.
///
/// The discriminant is the wire value. Variants are declared in ascending
/// wire order so the derived `Ord` matches the canonical encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u16)]
pub enum PrivilegeKind {
    /// Join the channel
    Join = 1,
    /// Publish an audio stream
    PublishAudio = 2,
    /// Publish a video stream
    PublishVideo = 3,
    /// Publish a data stream
    #[serde(rename = "publish-data")]
    PublishDataStream = 4,
}

impl PrivilegeKind {
    pub const ALL: [PrivilegeKind; 4] = [
        PrivilegeKind::Join,
        PrivilegeKind::PublishAudio,
        PrivilegeKind::PublishVideo,
        PrivilegeKind::PublishDataStream,
    ];

    /// Wire value of this kind
    pub fn to_u16(self) -> u16 {
        self as u16
    }

    /// Look up a kind by its wire value
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.to_u16() == value)
    }

    /// Parse from string, including "all" which expands to every kind
    pub fn parse_all(s: &str) -> Option<Vec<PrivilegeKind>> {
        match s.to_lowercase().as_str() {
            "join" => Some(vec![PrivilegeKind::Join]),
            "publish-audio" => Some(vec![PrivilegeKind::PublishAudio]),
            "publish-video" => Some(vec![PrivilegeKind::PublishVideo]),
            "publish-data" => Some(vec![PrivilegeKind::PublishDataStream]),
            "all" => Some(Self::ALL.to_vec()),
            _ => None,
        }
    }
}

impl fmt::Display for PrivilegeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrivilegeKind::Join => write!(f, "join"),
            PrivilegeKind::PublishAudio => write!(f, "publish-audio"),
            PrivilegeKind::PublishVideo => write!(f, "publish-video"),
            PrivilegeKind::PublishDataStream => write!(f, "publish-data"),
        }
    }
}

/// A single grant: capability + absolute expiry (seconds since epoch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Privilege {
    pub kind: PrivilegeKind,
    pub expire_at: u32,
}

impl Privilege {
    pub fn new(kind: PrivilegeKind, expire_at: u32) -> Self {
        Self { kind, expire_at }
    }

    /// A privilege is valid while `now` is strictly before its expiry
    pub fn is_valid_at(&self, now: u32) -> bool {
        self.expire_at > now
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind, self.expire_at)
    }
}

/// A set of privileges, at most one per kind, always ordered by kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivilegeSet {
    privileges: BTreeMap<PrivilegeKind, u32>,
}

impl PrivilegeSet {
    pub fn new() -> Self {
        Self {
            privileges: BTreeMap::new(),
        }
    }

    /// Add a privilege. A later grant of the same kind replaces the earlier one.
    pub fn add(&mut self, privilege: Privilege) {
        self.privileges.insert(privilege.kind, privilege.expire_at);
    }

    /// Add multiple privileges
    pub fn add_all(&mut self, privileges: impl IntoIterator<Item = Privilege>) {
        for privilege in privileges {
            self.add(privilege);
        }
    }

    /// Get the grant for a kind, if present
    pub fn get(&self, kind: PrivilegeKind) -> Option<Privilege> {
        self.privileges
            .get(&kind)
            .map(|&expire_at| Privilege::new(kind, expire_at))
    }

    /// Time at which the last privilege in the set expires
    pub fn latest_expiry(&self) -> Option<u32> {
        self.privileges.values().copied().max()
    }

    /// Iterate in ascending kind order
    pub fn iter(&self) -> impl Iterator<Item = Privilege> + '_ {
        self.privileges
            .iter()
            .map(|(&kind, &expire_at)| Privilege::new(kind, expire_at))
    }

    pub fn len(&self) -> usize {
        self.privileges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.privileges.is_empty()
    }
}

impl FromIterator<Privilege> for PrivilegeSet {
    fn from_iter<T: IntoIterator<Item = Privilege>>(iter: T) -> Self {
        let mut set = PrivilegeSet::new();
        set.add_all(iter);
        set
    }
}

/// Preset privilege bundles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May join and publish every stream type
    Publisher,
    /// May join only
    Subscriber,
}

impl Role {
    /// Kinds granted by this role
    pub fn kinds(self) -> &'static [PrivilegeKind] {
        match self {
            Role::Publisher => &PrivilegeKind::ALL,
            Role::Subscriber => &[PrivilegeKind::Join],
        }
    }

    /// Build a privilege set where every kind expires at `expire_at`
    pub fn privileges(self, expire_at: u32) -> PrivilegeSet {
        self.kinds()
            .iter()
            .map(|&kind| Privilege::new(kind, expire_at))
            .collect()
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "publisher" => Ok(Role::Publisher),
            "subscriber" => Ok(Role::Subscriber),
            _ => Err(format!(
                "Invalid role: '{}'. Must be: publisher or subscriber",
                s
            )),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Publisher => write!(f, "publisher"),
            Role::Subscriber => write!(f, "subscriber"),
        }
    }
}
