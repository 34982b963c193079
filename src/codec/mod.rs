//! Canonical claim encoding
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! app_id      u16 len + utf8
//! channel     u16 len + utf8   (<= 64 bytes)
//! uid         u32
//! issued_at   u32
//! salt        u32
//! count       u16
//! count x     { kind u16, expire_at u32 }   ascending by kind
//! ```
//!
//! The field order is fixed by the token format version. Decoding accepts
//! exactly the bytes `encode` produces and nothing else.

use crate::auth::{AppId, AppIdError, Privilege, PrivilegeKind, PrivilegeSet};
use crate::channels::{ChannelError, ChannelName};
use bytes::{Buf, BufMut};
use serde::Serialize;
use thiserror::Error;

/// Size of one encoded (kind, expire_at) pair
const PRIVILEGE_LEN: usize = 2 + 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("truncated input reading {0}")]
    TruncatedInput(&'static str),

    #[error("{0} trailing bytes after message")]
    TrailingData(usize),

    #[error("privilege count {declared} does not match {present} pairs present")]
    PrivilegeCountMismatch { declared: u16, present: usize },

    #[error("{0} is not valid utf-8")]
    InvalidUtf8(&'static str),

    #[error("invalid app id: {0}")]
    InvalidAppId(#[from] AppIdError),

    #[error("invalid channel name: {0}")]
    InvalidChannelName(#[from] ChannelError),

    #[error("unknown privilege kind {0}")]
    UnknownPrivilege(u16),

    #[error("privileges are not in strictly ascending order")]
    NonCanonical,
}

/// The signed claim set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub app_id: AppId,
    pub channel: ChannelName,
    pub uid: u32,
    pub issued_at: u32,
    pub salt: u32,
    pub privileges: PrivilegeSet,
}

impl Message {
    /// Encode into the canonical byte layout
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());

        put_str(&mut buf, self.app_id.as_str());
        put_str(&mut buf, self.channel.as_str());
        buf.put_u32_le(self.uid);
        buf.put_u32_le(self.issued_at);
        buf.put_u32_le(self.salt);

        // At most one entry per kind, so the count always fits
        buf.put_u16_le(self.privileges.len() as u16);
        for privilege in self.privileges.iter() {
            buf.put_u16_le(privilege.kind.to_u16());
            buf.put_u32_le(privilege.expire_at);
        }

        buf
    }

    fn encoded_len(&self) -> usize {
        2 + self.app_id.as_str().len()
            + 2
            + self.channel.len()
            + 4 * 3
            + 2
            + self.privileges.len() * PRIVILEGE_LEN
    }

    /// Decode a message, rejecting anything that is not a canonical encoding
    pub fn decode(mut buf: &[u8]) -> Result<Self, DecodeError> {
        let app_id = AppId::try_from(get_str(&mut buf, "app_id")?)?;
        let channel = ChannelName::try_from(get_str(&mut buf, "channel")?)?;
        let uid = get_u32(&mut buf, "uid")?;
        let issued_at = get_u32(&mut buf, "issued_at")?;
        let salt = get_u32(&mut buf, "salt")?;

        let declared = get_u16(&mut buf, "privilege count")?;
        if buf.remaining() % PRIVILEGE_LEN == 0 {
            let present = buf.remaining() / PRIVILEGE_LEN;
            if present != declared as usize {
                return Err(DecodeError::PrivilegeCountMismatch { declared, present });
            }
        }

        let mut privileges = PrivilegeSet::new();
        let mut last: Option<PrivilegeKind> = None;
        for _ in 0..declared {
            let raw = get_u16(&mut buf, "privilege kind")?;
            let expire_at = get_u32(&mut buf, "privilege expiry")?;

            let kind = PrivilegeKind::from_u16(raw).ok_or(DecodeError::UnknownPrivilege(raw))?;
            if last.is_some_and(|prev| prev >= kind) {
                return Err(DecodeError::NonCanonical);
            }
            last = Some(kind);

            privileges.add(Privilege::new(kind, expire_at));
        }

        if buf.has_remaining() {
            return Err(DecodeError::TrailingData(buf.remaining()));
        }

        Ok(Self {
            app_id,
            channel,
            uid,
            issued_at,
            salt,
            privileges,
        })
    }
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    // Callers only pass validated ids and channel names, both well under u16::MAX
    buf.put_u16_le(s.len() as u16);
    buf.put_slice(s.as_bytes());
}

fn get_u16(buf: &mut &[u8], field: &'static str) -> Result<u16, DecodeError> {
    match buf.remaining() >= 2 {
        true => Ok(buf.get_u16_le()),
        false => Err(DecodeError::TruncatedInput(field)),
    }
}

fn get_u32(buf: &mut &[u8], field: &'static str) -> Result<u32, DecodeError> {
    match buf.remaining() >= 4 {
        true => Ok(buf.get_u32_le()),
        false => Err(DecodeError::TruncatedInput(field)),
    }
}

fn get_str(buf: &mut &[u8], field: &'static str) -> Result<String, DecodeError> {
    let len = get_u16(buf, field)? as usize;
    if buf.remaining() < len {
        return Err(DecodeError::TruncatedInput(field));
    }

    let bytes = buf[..len].to_vec();
    buf.advance(len);

    String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8(field))
}
