//! Citation resolver: filenames to short-lived download links

use std::sync::Arc;
use std::time::Duration;

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::providers::BlobLinkProvider;
use crate::types::SignedDownloadLink;

/// Maps citation filenames to signed, read-only download links
pub struct CitationResolver {
    provider: Arc<dyn BlobLinkProvider>,
    link_ttl: Duration,
}

impl CitationResolver {
    /// Create a resolver over the given blob provider
    ///
    /// The configured TTL is clamped to the configured maximum window.
    pub fn new(provider: Arc<dyn BlobLinkProvider>, config: &StorageConfig) -> Self {
        let ttl_secs = config.link_ttl_secs.min(config.max_link_ttl_secs).max(1);
        Self {
            provider,
            link_ttl: Duration::from_secs(ttl_secs),
        }
    }

    /// Resolve a citation filename into a fresh signed link
    pub async fn resolve(&self, file_name: &str) -> Result<SignedDownloadLink> {
        validate_file_name(file_name)?;

        if !self.provider.exists(file_name).await? {
            return Err(Error::not_found(format!(
                "No citation document named '{}'",
                file_name
            )));
        }

        let link = self.provider.sign_download(file_name, self.link_ttl).await?;
        tracing::debug!(
            "Issued download link for '{}' via {}, expires {}",
            file_name,
            self.provider.name(),
            link.expires_at
        );
        Ok(link)
    }
}

/// Reject empty names, absolute paths, and traversal sequences
fn validate_file_name(file_name: &str) -> Result<()> {
    if file_name.trim().is_empty() {
        return Err(Error::invalid_argument("File name must not be empty"));
    }
    if file_name.starts_with('/') || file_name.starts_with('\\') {
        return Err(Error::invalid_argument(
            "File name must not be an absolute path",
        ));
    }
    // Windows drive prefixes ("C:\...") count as absolute too
    if file_name.len() >= 2 && file_name.as_bytes()[1] == b':' {
        return Err(Error::invalid_argument(
            "File name must not be an absolute path",
        ));
    }
    let has_traversal = file_name
        .split(['/', '\\'])
        .any(|segment| segment == "..");
    if has_traversal {
        return Err(Error::invalid_argument(
            "File name must not contain path traversal segments",
        ));
    }
    Ok(())
}
