//! # fx-auth-simple
//!
//! Argon2-based implementation of `AuthProvider`.
//! Handles password hashing and HMAC-signed session tokens, plus the mailer
//! stub used until a real delivery service is wired in.

mod mailer;

pub use mailer::LogMailer;

use anyhow::{anyhow, bail};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use fx_core::error::{AppError, Result};
use fx_core::traits::AuthProvider;
use hmac::{Hmac, Mac};
use rand_core::{OsRng, RngCore};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Shortest accepted session signing key, in bytes.
pub const MIN_KEY_BYTES: usize = 32;

/// Token body: 16 bytes of user id followed by the expiry as big-endian unix seconds.
const BODY_LEN: usize = 16 + 8;

pub struct SimpleAuthProvider {
    mac: HmacSha256,
    session_ttl: Duration,
}

impl SimpleAuthProvider {
    /// Accepts a signing key (e.g., from an environment variable)
    pub fn new(key: &[u8], session_ttl: Duration) -> anyhow::Result<Self> {
        if key.len() < MIN_KEY_BYTES {
            bail!("session key must be at least {MIN_KEY_BYTES} bytes, got {}", key.len());
        }
        let mac = HmacSha256::new_from_slice(key)
            .map_err(|e| anyhow!("initialising session signer: {e}"))?;
        Ok(Self { mac, session_ttl })
    }

    /// A provider with a fresh random key. Sessions do not survive a restart.
    pub fn with_random_key(session_ttl: Duration) -> anyhow::Result<Self> {
        let mut key = [0u8; MIN_KEY_BYTES];
        OsRng.fill_bytes(&mut key);
        Self::new(&key, session_ttl)
    }

    fn sign(&self, body: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(body.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    fn issue_until(&self, user_id: Uuid, expires_at: i64) -> String {
        let mut body = Vec::with_capacity(BODY_LEN);
        body.extend_from_slice(user_id.as_bytes());
        body.extend_from_slice(&expires_at.to_be_bytes());
        let body = URL_SAFE_NO_PAD.encode(body);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(&body));
        format!("{body}.{signature}")
    }
}

impl AuthProvider for SimpleAuthProvider {
    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(anyhow!("hashing password: {e}")))?;
        Ok(hash.to_string())
    }

    /// Verifies if a provided password matches a stored Argon2 hash.
    fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    fn issue_session(&self, user_id: Uuid) -> String {
        let expires_at = (Utc::now() + self.session_ttl).timestamp();
        self.issue_until(user_id, expires_at)
    }

    fn verify_session(&self, token: &str) -> Option<Uuid> {
        let (body, signature) = token.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac.clone();
        mac.update(body.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let body = URL_SAFE_NO_PAD.decode(body).ok()?;
        if body.len() != BODY_LEN {
            return None;
        }
        let (id, expiry) = body.split_at(16);
        let expires_at = i64::from_be_bytes(expiry.try_into().ok()?);
        if expires_at <= Utc::now().timestamp() {
            return None;
        }
        Uuid::from_slice(id).ok()
    }
}
