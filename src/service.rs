//! Issue and verify access tokens
//!
//! Both operations are pure functions of their inputs, the configured secret
//! and (for issuance) one salt draw, so a single service can be shared across
//! threads behind an `Arc` without locking. The optional [`ReplayGuard`] is
//! the only mutable state and synchronizes itself.

use crate::auth::{
    signer, AccessToken, AppId, Claims, FormatVersion, ParseError, PrivilegeKind, PrivilegeSet,
    RawToken, Role, RootSecret,
};
use crate::channels::{ChannelError, ChannelName};
use crate::codec::{DecodeError, Message};
use crate::config::{TokenConfig, UidPolicy};
use crate::storage::{ReplayGuard, ReplayKey};
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

/// Claims supplied to `issue` were invalid. These are caller bugs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("invalid channel name: {0}")]
    InvalidChannelName(#[from] ChannelError),

    #[error("privilege {kind} expires at {expire_at}, not after {now}")]
    ExpiredPrivilege {
        kind: PrivilegeKind,
        expire_at: u32,
        now: u32,
    },

    #[error("token must grant at least one privilege")]
    NoPrivileges,

    #[error("uid 0 is only allowed when wildcard uids are enabled")]
    WildcardUid,
}

/// Why a presented token was rejected.
///
/// Use [`VerifyError::reason`] for logs and convert to [`InvalidToken`]
/// before answering an untrusted caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("malformed token: {0}")]
    Parse(#[from] ParseError),

    #[error("unsupported token version {0}")]
    UnsupportedVersion(u8),

    #[error("bad signature")]
    BadSignature,

    #[error("undecodable claims: {0}")]
    Decode(#[from] DecodeError),

    #[error("token was issued for another app")]
    AppMismatch,

    #[error("token was issued for another channel")]
    ChannelMismatch,

    #[error("token was issued for another uid")]
    UidMismatch,

    #[error("privilege {0} not granted")]
    PrivilegeMissing(PrivilegeKind),

    #[error("privilege {kind} expired at {expire_at}")]
    PrivilegeExpired { kind: PrivilegeKind, expire_at: u32 },

    #[error("token already presented")]
    Replayed,
}

impl VerifyError {
    /// Stable label for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            VerifyError::Parse(_) => "malformed",
            VerifyError::UnsupportedVersion(_) => "unsupported_version",
            VerifyError::BadSignature => "bad_signature",
            VerifyError::Decode(_) => "undecodable",
            VerifyError::AppMismatch => "app_mismatch",
            VerifyError::ChannelMismatch => "channel_mismatch",
            VerifyError::UidMismatch => "uid_mismatch",
            VerifyError::PrivilegeMissing(_) => "privilege_missing",
            VerifyError::PrivilegeExpired { .. } => "privilege_expired",
            VerifyError::Replayed => "replayed",
        }
    }
}

/// The only rejection an untrusted caller gets to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid token")]
pub struct InvalidToken;

impl From<VerifyError> for InvalidToken {
    fn from(_: VerifyError) -> Self {
        InvalidToken
    }
}

/// Source of per-token salt values
pub trait SaltSource: Send + Sync {
    fn salt(&self) -> u32;
}

/// Salt from the thread-local CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSalt;

impl SaltSource for RandomSalt {
    fn salt(&self) -> u32 {
        rand::rng().random()
    }
}

/// The same salt every time (tests and reproducible fixtures)
#[derive(Debug, Clone, Copy)]
pub struct FixedSalt(pub u32);

impl SaltSource for FixedSalt {
    fn salt(&self) -> u32 {
        self.0
    }
}

/// Current time in whole seconds since the epoch, clamped to `u32`
pub fn unix_now() -> u32 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}

/// Issues and verifies tokens for one app
pub struct AccessTokenService {
    app_id: AppId,
    secret: RootSecret,
    default_ttl: u32,
    uid_policy: UidPolicy,
    salt: Box<dyn SaltSource>,
    replay: Option<ReplayGuard>,
}

impl AccessTokenService {
    pub fn new(config: TokenConfig) -> Self {
        Self {
            app_id: config.app_id,
            secret: config.secret,
            default_ttl: config.default_ttl,
            uid_policy: config.uid_policy,
            salt: Box::new(RandomSalt),
            replay: None,
        }
    }

    /// Replace the salt source
    pub fn with_salt_source(mut self, salt: impl SaltSource + 'static) -> Self {
        self.salt = Box::new(salt);
        self
    }

    /// Reject tokens presented more than once
    pub fn with_replay_guard(mut self, guard: ReplayGuard) -> Self {
        self.replay = Some(guard);
        self
    }

    pub fn app_id(&self) -> &AppId {
        &self.app_id
    }

    pub fn default_ttl(&self) -> u32 {
        self.default_ttl
    }

    /// Sign a token granting `privileges` on `channel` to `uid`
    pub fn issue(
        &self,
        channel: &str,
        uid: u32,
        privileges: PrivilegeSet,
        now: u32,
    ) -> Result<AccessToken, ConstructionError> {
        let channel = ChannelName::parse(channel)?;

        if uid == 0 && self.uid_policy == UidPolicy::Exact {
            return Err(ConstructionError::WildcardUid);
        }

        if privileges.is_empty() {
            return Err(ConstructionError::NoPrivileges);
        }

        if let Some(expired) = privileges.iter().find(|p| !p.is_valid_at(now)) {
            return Err(ConstructionError::ExpiredPrivilege {
                kind: expired.kind,
                expire_at: expired.expire_at,
                now,
            });
        }

        let claims = Message {
            app_id: self.app_id.clone(),
            channel,
            uid,
            issued_at: now,
            salt: self.salt.salt(),
            privileges,
        };

        let version = FormatVersion::CURRENT.to_u8();
        let message = claims.encode();
        let signature = signer::sign(&self.secret, version, &message);
        let token = RawToken::pack(version, &signature, &message);

        debug!(
            channel = %claims.channel,
            uid = claims.uid,
            privileges = claims.privileges.len(),
            "issued token"
        );

        Ok(AccessToken::new(token, claims))
    }

    /// Sign a token with the role's privileges, all expiring after the default ttl
    pub fn issue_with_role(
        &self,
        channel: &str,
        uid: u32,
        role: Role,
        now: u32,
    ) -> Result<AccessToken, ConstructionError> {
        let expire_at = now.saturating_add(self.default_ttl);
        self.issue(channel, uid, role.privileges(expire_at), now)
    }

    /// Check `token` and that it grants `required` at `now`
    pub fn verify(
        &self,
        token: &str,
        now: u32,
        required: PrivilegeKind,
    ) -> Result<Claims, VerifyError> {
        self.authenticate(token, now, required)
            .and_then(|claims| self.record(claims, now))
            .inspect_err(|err| debug!(reason = err.reason(), "rejected token"))
    }

    /// As [`verify`](Self::verify), and also that the token names this channel and uid
    pub fn verify_for(
        &self,
        token: &str,
        channel: &str,
        uid: u32,
        now: u32,
        required: PrivilegeKind,
    ) -> Result<Claims, VerifyError> {
        self.authenticate(token, now, required)
            .and_then(|claims| {
                if claims.channel != channel {
                    return Err(VerifyError::ChannelMismatch);
                }
                if !self.admits_uid(claims.uid, uid) {
                    return Err(VerifyError::UidMismatch);
                }
                Ok(claims)
            })
            .and_then(|claims| self.record(claims, now))
            .inspect_err(|err| debug!(reason = err.reason(), "rejected token"))
    }

    fn admits_uid(&self, claimed: u32, presented: u32) -> bool {
        claimed == presented || (claimed == 0 && self.uid_policy == UidPolicy::AllowWildcard)
    }

    fn authenticate(
        &self,
        token: &str,
        now: u32,
        required: PrivilegeKind,
    ) -> Result<Claims, VerifyError> {
        let raw = RawToken::parse(token)?;

        let version = FormatVersion::from_u8(raw.version)
            .ok_or(VerifyError::UnsupportedVersion(raw.version))?;

        // Nothing in the message is looked at before this check
        if !signer::verify(&self.secret, version.to_u8(), &raw.message, &raw.signature) {
            return Err(VerifyError::BadSignature);
        }

        let claims = Message::decode(&raw.message)?;

        if claims.app_id != self.app_id {
            return Err(VerifyError::AppMismatch);
        }

        let privilege = claims
            .privileges
            .get(required)
            .ok_or(VerifyError::PrivilegeMissing(required))?;

        if !privilege.is_valid_at(now) {
            return Err(VerifyError::PrivilegeExpired {
                kind: privilege.kind,
                expire_at: privilege.expire_at,
            });
        }

        Ok(claims)
    }

    fn record(&self, claims: Claims, now: u32) -> Result<Claims, VerifyError> {
        let Some(guard) = &self.replay else {
            return Ok(claims);
        };

        // Remember the token for as long as any of its privileges admits it
        let expire_at = claims.privileges.latest_expiry().unwrap_or(now);
        if !guard.check_and_record(ReplayKey::from(&claims), expire_at, now) {
            return Err(VerifyError::Replayed);
        }

        Ok(claims)
    }
}
