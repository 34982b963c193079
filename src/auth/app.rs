//! Application identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum app identifier length in bytes
pub const MAX_APP_ID_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppIdError {
    #[error("app id cannot be empty")]
    Empty,

    #[error("app id is {len} bytes, limit is {}", MAX_APP_ID_LEN)]
    TooLong { len: usize },
}

/// Public identifier of the tenant that issued a token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppId {
    id: String,
}

impl AppId {
    pub fn parse(id: &str) -> Result<Self, AppIdError> {
        Self::try_from(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl TryFrom<String> for AppId {
    type Error = AppIdError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        if id.is_empty() {
            return Err(AppIdError::Empty);
        }
        if id.len() > MAX_APP_ID_LEN {
            return Err(AppIdError::TooLong { len: id.len() });
        }
        Ok(Self { id })
    }
}

impl From<AppId> for String {
    fn from(app: AppId) -> Self {
        app.id
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
