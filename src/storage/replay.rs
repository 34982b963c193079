//! In-memory record of presented tokens (replay rejection within one process)

use crate::auth::Claims;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Identity of one issuance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplayKey {
    pub uid: u32,
    pub salt: u32,
    pub issued_at: u32,
}

impl From<&Claims> for ReplayKey {
    fn from(claims: &Claims) -> Self {
        Self {
            uid: claims.uid,
            salt: claims.salt,
            issued_at: claims.issued_at,
        }
    }
}

struct Seen {
    /// Key -> time at which its token stops granting anything
    keys: HashMap<ReplayKey, u32>,
    /// Time of the last eviction pass
    swept_at: u32,
}

/// Remembers every presented token until its last privilege expires.
///
/// A key is forgotten only once `now` reaches the expiry it was recorded
/// with, so a token can never be accepted twice while any of its privileges
/// is still valid.
pub struct ReplayGuard {
    seen: Mutex<Seen>,
}

impl ReplayGuard {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(Seen {
                keys: HashMap::new(),
                swept_at: 0,
            }),
        }
    }

    /// Record `key` until `expire_at` if it has not been seen. Returns false
    /// on a replay.
    pub fn check_and_record(&self, key: ReplayKey, expire_at: u32, now: u32) -> bool {
        let mut seen = self.seen.lock();

        if now > seen.swept_at {
            seen.keys.retain(|_, &mut forget_at| forget_at > now);
            seen.swept_at = now;
        }

        match seen.keys.get(&key) {
            Some(&forget_at) if forget_at > now => false,
            _ => {
                seen.keys.insert(key, expire_at);
                true
            }
        }
    }

    /// Number of keys currently remembered
    pub fn len(&self) -> usize {
        self.seen.lock().keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().keys.is_empty()
    }
}

impl Default for ReplayGuard {
    fn default() -> Self {
        Self::new()
    }
}
