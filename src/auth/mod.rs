//! Authentication and authorization
//!
//! A token carries its own claims and is checked offline with the shared root
//! secret:
//! - `privileges`: what the holder may do, each with its own expiry
//! - `signer`: HMAC-SHA256 over the version byte and encoded claims
//! - `tokens`: the base64 envelope around version, signature and claims

mod app;
mod privileges;
mod secret;
pub mod signer;
mod tokens;

pub use app::{AppId, AppIdError, MAX_APP_ID_LEN};
pub use privileges::{Privilege, PrivilegeKind, PrivilegeSet, Role};
pub use secret::RootSecret;
pub use tokens::{AccessToken, Claims, FormatVersion, ParseError, RawToken, MAX_TOKEN_LEN};
