//! Index registry with a single-flight listing cache
//!
//! The catalog listing is the only shared mutable state in the service. It
//! is cached process-wide for one refresh interval, and refreshes obey an
//! at-most-one-in-flight rule: while a refresh runs, concurrent callers see
//! the stale value instead of issuing duplicate catalog calls.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::config::RegistryConfig;
use crate::error::Result;
use crate::providers::SearchProvider;
use crate::types::IndexDescriptor;

struct CachedListing {
    indexes: Vec<IndexDescriptor>,
    refreshed_at: Instant,
}

/// Enumerates the search indexes exposed to clients
pub struct IndexRegistry {
    provider: Arc<dyn SearchProvider>,
    refresh_interval: Duration,
    cached: RwLock<Option<CachedListing>>,
    // Held only by the one task performing a refresh. Never held while the
    // value lock is held, and the value lock is never held across an await.
    refresh_guard: Mutex<()>,
}

impl IndexRegistry {
    /// Create a registry backed by the given search provider
    pub fn new(provider: Arc<dyn SearchProvider>, config: &RegistryConfig) -> Self {
        Self {
            provider,
            refresh_interval: Duration::from_secs(config.refresh_interval_secs),
            cached: RwLock::new(None),
            refresh_guard: Mutex::new(()),
        }
    }

    /// List the available indexes, serving the cached listing when fresh
    pub async fn list_indexes(&self) -> Result<Vec<IndexDescriptor>> {
        if let Some(fresh) = self.read_cache(false) {
            return Ok(fresh);
        }

        match self.refresh_guard.try_lock() {
            Ok(_guard) => {
                // Lost a race with a refresh that just finished?
                if let Some(fresh) = self.read_cache(false) {
                    return Ok(fresh);
                }
                self.refresh().await
            }
            Err(_) => {
                // A refresh is in flight. Serve the stale listing if we have
                // one; otherwise wait for that refresh to complete.
                if let Some(stale) = self.read_cache(true) {
                    return Ok(stale);
                }
                let _guard = self.refresh_guard.lock().await;
                if let Some(fresh) = self.read_cache(false) {
                    return Ok(fresh);
                }
                self.refresh().await
            }
        }
    }

    /// Whether `name` is a currently listed index
    pub async fn contains(&self, name: &str) -> Result<bool> {
        let indexes = self.list_indexes().await?;
        Ok(indexes.iter().any(|i| i.name == name))
    }

    fn read_cache(&self, accept_stale: bool) -> Option<Vec<IndexDescriptor>> {
        let cached = self.cached.read();
        cached.as_ref().and_then(|c| {
            if accept_stale || c.refreshed_at.elapsed() < self.refresh_interval {
                Some(c.indexes.clone())
            } else {
                None
            }
        })
    }

    async fn refresh(&self) -> Result<Vec<IndexDescriptor>> {
        tracing::debug!("Refreshing index catalog via {}", self.provider.name());
        let indexes = self.provider.list_indexes().await?;
        tracing::info!("Index catalog refreshed: {} indexes", indexes.len());

        *self.cached.write() = Some(CachedListing {
            indexes: indexes.clone(),
            refreshed_at: Instant::now(),
        });
        Ok(indexes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::providers::search::SearchHit;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCatalog {
        calls: AtomicUsize,
        delay_ms: u64,
    }

    #[async_trait]
    impl SearchProvider for CountingCatalog {
        async fn list_indexes(&self) -> Result<Vec<IndexDescriptor>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            Ok(vec![
                IndexDescriptor::new("docs-2024"),
                IndexDescriptor::with_label("handbook", "Employee Handbook"),
            ])
        }

        async fn query(&self, _: &str, _: &str, _: usize) -> Result<Vec<SearchHit>> {
            Err(Error::internal("not used"))
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn registry(provider: Arc<CountingCatalog>, interval_secs: u64) -> IndexRegistry {
        IndexRegistry::new(
            provider,
            &RegistryConfig {
                refresh_interval_secs: interval_secs,
            },
        )
    }

    #[tokio::test]
    async fn second_call_within_interval_hits_cache() {
        let provider = Arc::new(CountingCatalog {
            calls: AtomicUsize::new(0),
            delay_ms: 0,
        });
        let registry = registry(Arc::clone(&provider), 60);

        let first = registry.list_indexes().await.unwrap();
        let second = registry.list_indexes().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_cold_calls_trigger_one_catalog_call() {
        let provider = Arc::new(CountingCatalog {
            calls: AtomicUsize::new(0),
            delay_ms: 50,
        });
        let registry = Arc::new(registry(Arc::clone(&provider), 60));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move { registry.list_indexes().await })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn contains_checks_listed_names() {
        let provider = Arc::new(CountingCatalog {
            calls: AtomicUsize::new(0),
            delay_ms: 0,
        });
        let registry = registry(provider, 60);

        assert!(registry.contains("docs-2024").await.unwrap());
        assert!(!registry.contains("missing-index").await.unwrap());
    }
}
