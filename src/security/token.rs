//! Anti-forgery tokens and download handles
//!
//! Both are self-contained HMAC-SHA256 signatures, so nothing is stored
//! server-side to validate them:
//!
//! - token: `<nonce>.<expires>.<mac>`, signed over `<action>|<nonce>|<expires>`
//! - download handle: `<key>.<expires>.<mac>`, signed over
//!   `download:<key>|<key>|<expires>`
//!
//! `expires` is a unix timestamp in seconds and `mac` is lowercase hex.

use crate::config::{SecretString, SecurityConfig};
use crate::domain::{ArtifactKey, BatchError};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Action prefix for download handles
const DOWNLOAD_ACTION: &str = "download";

/// Issues and verifies signed tokens
#[derive(Clone)]
pub struct TokenAuthority {
    secret: SecretString,
    token_ttl: Duration,
    download_ttl: Duration,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("token_ttl", &self.token_ttl)
            .field("download_ttl", &self.download_ttl)
            .finish_non_exhaustive()
    }
}

fn ttl(seconds: u64) -> Duration {
    let seconds = i64::try_from(seconds).unwrap_or(i64::MAX).min(i64::MAX / 1000);
    Duration::seconds(seconds)
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> i64 {
    now.checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
        .timestamp()
}

impl TokenAuthority {
    /// Creates an authority keyed by `secret`
    pub fn new(secret: SecretString, token_ttl_seconds: u64, download_ttl_seconds: u64) -> Self {
        Self {
            secret,
            token_ttl: ttl(token_ttl_seconds),
            download_ttl: ttl(download_ttl_seconds),
        }
    }

    /// Creates an authority from the `[security]` section
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(
            config.token_secret.clone(),
            config.token_ttl_seconds,
            config.download_ttl_seconds,
        )
    }

    fn sign(&self, action: &str, subject: &str, expires: i64) -> Result<String, BatchError> {
        let mut mac = self.mac()?;
        mac.update(format!("{action}|{subject}|{expires}").as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn mac(&self) -> Result<HmacSha256, BatchError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| BatchError::AuthorizationFailed)
    }

    fn check(
        &self,
        action: &str,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<String, BatchError> {
        let mut parts = value.trim().splitn(3, '.');
        let (Some(subject), Some(expires), Some(signature)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(BatchError::AuthorizationFailed);
        };

        let expires: i64 = expires
            .parse()
            .map_err(|_| BatchError::AuthorizationFailed)?;
        let signature = hex::decode(signature).map_err(|_| BatchError::AuthorizationFailed)?;

        let mut mac = self.mac()?;
        mac.update(format!("{action}|{subject}|{expires}").as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| BatchError::AuthorizationFailed)?;

        if now.timestamp() > expires {
            tracing::debug!(action = %action, "Expired token rejected");
            return Err(BatchError::AuthorizationFailed);
        }

        Ok(subject.to_string())
    }

    /// Issue a token for `action`
    ///
    /// # Errors
    ///
    /// Returns `AuthorizationFailed` if the signing key is unusable.
    pub fn issue(&self, action: &str) -> Result<String, BatchError> {
        self.issue_at(action, Utc::now())
    }

    /// Issue a token for `action` as if the current time were `now`
    ///
    /// # Errors
    ///
    /// Returns `AuthorizationFailed` if the signing key is unusable.
    pub fn issue_at(&self, action: &str, now: DateTime<Utc>) -> Result<String, BatchError> {
        let nonce = Uuid::new_v4().simple().to_string();
        let expires = expiry(now, self.token_ttl);
        let signature = self.sign(action, &nonce, expires)?;
        Ok(format!("{nonce}.{expires}.{signature}"))
    }

    /// Verify that `token` was issued for `action` and has not expired
    ///
    /// # Errors
    ///
    /// Returns `AuthorizationFailed` on a malformed, expired or mismatched token.
    pub fn verify(&self, action: &str, token: &str) -> Result<(), BatchError> {
        self.verify_at(action, token, Utc::now())
    }

    /// [`verify`](Self::verify) at a fixed time
    ///
    /// # Errors
    ///
    /// Returns `AuthorizationFailed` on a malformed, expired or mismatched token.
    pub fn verify_at(&self, action: &str, token: &str, now: DateTime<Utc>) -> Result<(), BatchError> {
        self.check(action, token, now).map(|_| ())
    }

    /// Create a download handle for a finalized artifact
    ///
    /// # Errors
    ///
    /// Returns `AuthorizationFailed` if the signing key is unusable.
    pub fn download_handle(&self, key: &ArtifactKey) -> Result<String, BatchError> {
        self.download_handle_at(key, Utc::now())
    }

    /// [`download_handle`](Self::download_handle) at a fixed time
    ///
    /// # Errors
    ///
    /// Returns `AuthorizationFailed` if the signing key is unusable.
    pub fn download_handle_at(
        &self,
        key: &ArtifactKey,
        now: DateTime<Utc>,
    ) -> Result<String, BatchError> {
        let expires = expiry(now, self.download_ttl);
        let action = format!("{DOWNLOAD_ACTION}:{key}");
        let signature = self.sign(&action, key.as_str(), expires)?;
        Ok(format!("{key}.{expires}.{signature}"))
    }

    /// Verify a download handle and return the artifact key it grants
    ///
    /// # Errors
    ///
    /// Returns `AuthorizationFailed` on a malformed, expired or forged handle.
    pub fn verify_download(&self, handle: &str) -> Result<ArtifactKey, BatchError> {
        self.verify_download_at(handle, Utc::now())
    }

    /// [`verify_download`](Self::verify_download) at a fixed time
    ///
    /// # Errors
    ///
    /// Returns `AuthorizationFailed` on a malformed, expired or forged handle.
    pub fn verify_download_at(
        &self,
        handle: &str,
        now: DateTime<Utc>,
    ) -> Result<ArtifactKey, BatchError> {
        let key_part = handle.split('.').next().unwrap_or_default();
        let key: ArtifactKey = key_part
            .parse()
            .map_err(|_| BatchError::AuthorizationFailed)?;
        let action = format!("{DOWNLOAD_ACTION}:{key}");
        self.check(&action, handle, now)?;
        Ok(key)
    }
}
