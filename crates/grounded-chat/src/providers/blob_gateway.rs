//! HTTP blob gateway with locally minted signed links
//!
//! The gateway serves corpus objects at `/{container}/{object}` and honors
//! query-string capability tokens. Links are signed here with HMAC-SHA256
//! over the container, object name, expiry, and permission, so the gateway
//! can verify them without shared session state.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use ring::hmac;
use std::time::Duration;

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::providers::blob::BlobLinkProvider;
use crate::types::SignedDownloadLink;

/// Blob gateway client and link signer
pub struct BlobGateway {
    client: Client,
    base_url: String,
    container: String,
    key: hmac::Key,
}

impl BlobGateway {
    /// Create a new gateway client
    ///
    /// `signing_key` in the config is base64url without padding.
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let key_bytes = URL_SAFE_NO_PAD
            .decode(&config.signing_key)
            .map_err(|e| Error::Config(format!("Invalid signing key: {}", e)))?;
        if key_bytes.is_empty() {
            return Err(Error::Config("Signing key must not be empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            container: config.container.clone(),
            key: hmac::Key::new(hmac::HMAC_SHA256, &key_bytes),
        })
    }

    fn object_url(&self, object_name: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.container, object_name)
    }

    /// Signature payload: one capability, one object, read-only
    fn signing_payload(container: &str, object_name: &str, expires_unix: i64) -> String {
        format!("{}\n{}\n{}\nr", container, object_name, expires_unix)
    }

    fn sign(&self, object_name: &str, expires_unix: i64) -> String {
        let payload = Self::signing_payload(&self.container, object_name, expires_unix);
        let tag = hmac::sign(&self.key, payload.as_bytes());
        URL_SAFE_NO_PAD.encode(tag.as_ref())
    }

    /// Verify a capability token minted by `sign`. Used by tests and by
    /// gateways embedding this crate.
    pub fn verify(&self, object_name: &str, expires_unix: i64, signature: &str) -> bool {
        let payload = Self::signing_payload(&self.container, object_name, expires_unix);
        let Ok(sig_bytes) = URL_SAFE_NO_PAD.decode(signature) else {
            return false;
        };
        if Utc::now().timestamp() >= expires_unix {
            return false;
        }
        hmac::verify(&self.key, payload.as_bytes(), &sig_bytes).is_ok()
    }
}

#[async_trait]
impl BlobLinkProvider for BlobGateway {
    async fn exists(&self, object_name: &str) -> Result<bool> {
        let response = self
            .client
            .head(self.object_url(object_name))
            .send()
            .await
            .map_err(|e| Error::unavailable(format!("Blob existence check failed: {}", e)))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(Error::backend(format!(
                "Blob gateway returned HTTP {} for '{}'",
                status, object_name
            ))),
        }
    }

    async fn sign_download(
        &self,
        object_name: &str,
        ttl: Duration,
    ) -> Result<SignedDownloadLink> {
        let expires_at: DateTime<Utc> = Utc::now()
            + chrono::Duration::from_std(ttl)
                .map_err(|e| Error::internal(format!("Invalid link TTL: {}", e)))?;
        let expires_unix = expires_at.timestamp();

        let signature = self.sign(object_name, expires_unix);
        let content_type = mime_guess::from_path(object_name)
            .first_or_octet_stream()
            .to_string();

        let url = format!(
            "{}?exp={}&perm=r&ct={}&sig={}",
            self.object_url(object_name),
            expires_unix,
            urlencode(&content_type),
            signature
        );

        Ok(SignedDownloadLink {
            url,
            expires_at: Utc
                .timestamp_opt(expires_unix, 0)
                .single()
                .unwrap_or(expires_at),
        })
    }

    fn name(&self) -> &str {
        "blob-gateway"
    }
}

/// Minimal percent-encoding for query values (content types only contain
/// alphanumerics, '/', '+', '-', '.')
fn urlencode(value: &str) -> String {
    value.replace('+', "%2B").replace('/', "%2F")
}
