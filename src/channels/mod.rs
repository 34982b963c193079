//! Channel naming
//!
//! A channel name is any non-empty UTF-8 string of at most
//! [`MAX_CHANNEL_LEN`] bytes. The limit is counted in bytes, not characters,
//! because the name is length-prefixed on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum channel name length in bytes
pub const MAX_CHANNEL_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("channel name cannot be empty")]
    Empty,

    #[error("channel name is {len} bytes, limit is {}", MAX_CHANNEL_LEN)]
    TooLong { len: usize },
}

/// A validated channel name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelName {
    name: String,
}

impl ChannelName {
    /// Parse and validate a channel name
    pub fn parse(name: &str) -> Result<Self, ChannelError> {
        Self::validate(name)?;
        Ok(Self {
            name: name.to_string(),
        })
    }

    fn validate(name: &str) -> Result<(), ChannelError> {
        if name.is_empty() {
            return Err(ChannelError::Empty);
        }

        if name.len() > MAX_CHANNEL_LEN {
            return Err(ChannelError::TooLong { len: name.len() });
        }

        Ok(())
    }

    /// Get the channel name as a string slice
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Length of the name in bytes
    pub fn len(&self) -> usize {
        self.name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

impl TryFrom<String> for ChannelName {
    type Error = ChannelError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::validate(&name)?;
        Ok(Self { name })
    }
}

impl From<ChannelName> for String {
    fn from(channel: ChannelName) -> Self {
        channel.name
    }
}

impl PartialEq<str> for ChannelName {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<&str> for ChannelName {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
