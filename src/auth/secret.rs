//! Root signing secret

use std::fmt;
use zeroize::Zeroizing;

/// The app certificate shared between issuer and verifier.
///
/// There is exactly one copy of the bytes. It is wiped on drop and never
/// appears in `Debug` output.
pub struct RootSecret {
    key: Zeroizing<Vec<u8>>,
}

impl RootSecret {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: Zeroizing::new(key.into()),
        }
    }

    /// Get the key bytes (for signing only)
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl fmt::Debug for RootSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RootSecret([REDACTED])")
    }
}
