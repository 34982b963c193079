//! rtc-token - signed, time-bound admission tokens for real-time channels
//!
//! An issuer holding the app certificate signs a compact token naming a
//! channel, a user and a set of expiring privileges. Any verifier holding the
//! same certificate can check it offline, without a call back to the issuer.
//!
//! ```
//! use rtc_token::{AccessTokenService, PrivilegeKind, Role, TokenConfig};
//!
//! let config = TokenConfig::from_parts("app1", b"s3cr3t".to_vec()).unwrap();
//! let service = AccessTokenService::new(config);
//!
//! let now = 1_700_000_000;
//! let token = service.issue_with_role("room42", 7, Role::Publisher, now).unwrap();
//!
//! let claims = service.verify(token.as_str(), now, PrivilegeKind::Join).unwrap();
//! assert_eq!(claims.uid, 7);
//! ```

pub mod auth;
pub mod channels;
pub mod codec;
pub mod config;
pub mod service;
pub mod storage;

pub use auth::{AccessToken, Claims, Privilege, PrivilegeKind, PrivilegeSet, Role, RootSecret};
pub use channels::ChannelName;
pub use config::{TokenConfig, UidPolicy};
pub use service::{
    unix_now, AccessTokenService, ConstructionError, FixedSalt, InvalidToken, RandomSalt,
    SaltSource, VerifyError,
};
pub use storage::ReplayGuard;
