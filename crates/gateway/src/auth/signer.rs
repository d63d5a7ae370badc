//! Signed `auth` cookie tokens
//!
//! Token format: `{issued_at_ms}.{base64(name:value)}.{hmac_sha256_hex}`
//!
//! The HMAC covers `{issued_at_ms}.{base64(name:value)}`. The token is the
//! only session record the gateway has; nothing is stored server-side, so
//! the signature is checked before anything embedded in the token is parsed.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;
use time::OffsetDateTime;

use super::credential::UpstreamCredential;

type HmacSha256 = Hmac<Sha256>;

/// Token lifetime: 365 days, in milliseconds
pub const TOKEN_TTL_MS: i64 = 365 * 24 * 60 * 60 * 1000;

#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),
}

/// A minted `auth` cookie value
#[derive(Clone, PartialEq, Eq)]
pub struct SignedToken(String);

impl SignedToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SignedToken(<redacted>)")
    }
}

/// Mints and verifies `auth` cookie tokens with a process-wide secret
#[derive(Clone)]
pub struct CredentialSigner {
    mac: HmacSha256,
}

impl CredentialSigner {
    pub fn new(secret: &[u8]) -> Result<Self, SignerError> {
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        Ok(Self { mac })
    }

    /// Mint a token issued now
    pub fn mint(&self, credential: &UpstreamCredential) -> SignedToken {
        self.mint_at(credential, now_ms())
    }

    /// Mint a token with an explicit issue time
    pub fn mint_at(&self, credential: &UpstreamCredential, issued_at_ms: i64) -> SignedToken {
        let encoded = STANDARD.encode(format!("{}:{}", credential.name(), credential.value()));
        let payload = format!("{}.{}", issued_at_ms, encoded);
        let signature = self.sign(&payload);

        SignedToken(format!("{}.{}", payload, signature))
    }

    /// Verify a token against the current time
    pub fn verify(&self, token: Option<&str>) -> Option<UpstreamCredential> {
        self.verify_at(token, now_ms())
    }

    /// Verify a token against `now_ms`.
    ///
    /// Returns `None` for anything that is not an unexpired token minted by
    /// this signer and carrying a well-formed credential.
    pub fn verify_at(&self, token: Option<&str>, now_ms: i64) -> Option<UpstreamCredential> {
        let token = token.filter(|t| !t.is_empty())?;

        let mut parts = token.split('.');
        let (timestamp, encoded, signature) = match (parts.next(), parts.next(), parts.next()) {
            (Some(t), Some(e), Some(s)) if parts.next().is_none() => (t, e, s),
            _ => return None,
        };
        if timestamp.is_empty() || encoded.is_empty() || signature.is_empty() {
            return None;
        }

        let expected = self.sign(&format!("{}.{}", timestamp, encoded));
        if !bool::from(signature.as_bytes().ct_eq(expected.as_bytes())) {
            return None;
        }

        let issued_at_ms: i64 = timestamp.parse().ok()?;
        if now_ms.saturating_sub(issued_at_ms) >= TOKEN_TTL_MS {
            return None;
        }

        let decoded = STANDARD.decode(encoded).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (name, value) = decoded.split_once(':')?;

        UpstreamCredential::new(name, value)
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
