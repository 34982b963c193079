//! Token envelope
//!
//! A token is `version ‖ signature ‖ message`, rendered as URL-safe base64
//! without padding so it can travel in a query parameter or header as-is.

use crate::auth::signer::SIGNATURE_LEN;
use crate::codec::Message;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use std::fmt;
use thiserror::Error;

/// Longest token text accepted by [`RawToken::parse`]
pub const MAX_TOKEN_LEN: usize = 4096;

/// Shortest decoded envelope: version byte + signature
const MIN_ENVELOPE_LEN: usize = 1 + SIGNATURE_LEN;

/// Claims carried by a token whose signature has been checked
pub type Claims = Message;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("token is not url-safe base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("malformed token ({0} bytes)")]
    MalformedToken(usize),
}

/// Envelope layouts this crate can read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FormatVersion {
    /// Layout described in [`crate::codec`], HMAC-SHA256 signature
    V1 = 1,
}

impl FormatVersion {
    /// Version used for newly issued tokens
    pub const CURRENT: FormatVersion = FormatVersion::V1;

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(FormatVersion::V1),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// The three parts of a token, before any verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub version: u8,
    pub signature: [u8; SIGNATURE_LEN],
    pub message: Vec<u8>,
}

impl RawToken {
    /// Concatenate and encode
    pub fn pack(version: u8, signature: &[u8; SIGNATURE_LEN], message: &[u8]) -> String {
        let mut envelope = Vec::with_capacity(MIN_ENVELOPE_LEN + message.len());
        envelope.push(version);
        envelope.extend_from_slice(signature);
        envelope.extend_from_slice(message);

        URL_SAFE_NO_PAD.encode(envelope)
    }

    /// Decode and split by fixed offsets. Nothing here is authenticated yet.
    pub fn parse(token: &str) -> Result<Self, ParseError> {
        if token.len() > MAX_TOKEN_LEN {
            return Err(ParseError::MalformedToken(token.len()));
        }

        let envelope = URL_SAFE_NO_PAD.decode(token)?;
        if envelope.len() < MIN_ENVELOPE_LEN {
            return Err(ParseError::MalformedToken(envelope.len()));
        }

        let mut signature = [0u8; SIGNATURE_LEN];
        signature.copy_from_slice(&envelope[1..MIN_ENVELOPE_LEN]);

        Ok(Self {
            version: envelope[0],
            signature,
            message: envelope[MIN_ENVELOPE_LEN..].to_vec(),
        })
    }

    /// Re-encode into token text
    pub fn to_token_string(&self) -> String {
        Self::pack(self.version, &self.signature, &self.message)
    }
}

/// An issued token
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The full token string
    token: String,
    /// Claims that were signed
    claims: Claims,
}

impl AccessToken {
    pub(crate) fn new(token: String, claims: Claims) -> Self {
        Self { token, claims }
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn into_string(self) -> String {
        self.token
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token)
    }
}
