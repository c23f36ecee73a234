//! Signed download link type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Time-bounded, read-only download link for one stored object
///
/// Minted per request and never cached beyond it. `expires_at` is always in
/// the future at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedDownloadLink {
    /// Capability URL granting read access to a single object
    pub url: String,
    /// Instant after which the link is no longer honored
    pub expires_at: DateTime<Utc>,
}
