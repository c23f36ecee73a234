//! Blob access provider trait for signed download links

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;
use crate::types::SignedDownloadLink;

/// Trait for object existence checks and signed, read-only link issuance
///
/// Implementations:
/// - `BlobGateway`: HTTP blob gateway with locally minted HMAC links
#[async_trait]
pub trait BlobLinkProvider: Send + Sync {
    /// Whether the named object exists in the grounding corpus namespace
    async fn exists(&self, object_name: &str) -> Result<bool>;

    /// Mint a read-only download link valid for `ttl`
    ///
    /// The link is scoped to the single object, never the container.
    async fn sign_download(&self, object_name: &str, ttl: Duration) -> Result<SignedDownloadLink>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
