use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::{CacheBackend, ListView};
use crate::errors::ServiceError;

/// Read-through cache for list pages. Storage stays authoritative: any cache
/// failure, or a cached value that no longer deserializes, falls through to
/// the loader.
#[derive(Clone)]
pub struct PageCache {
    cache: Arc<dyn CacheBackend>,
    ttl: Duration,
}

impl PageCache {
    pub fn new(cache: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub async fn get_or_load<T, F, Fut>(
        &self,
        view: ListView,
        page: u64,
        loader: F,
    ) -> Result<Vec<T>, ServiceError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, ServiceError>>,
    {
        let key = view.page_key(page);

        match self.cache.get(&key).await {
            Ok(Some(cached)) => match serde_json::from_str::<Vec<T>>(&cached) {
                Ok(items) => {
                    debug!(key = %key, "List cache hit");
                    return Ok(items);
                }
                Err(err) => warn!(key = %key, "Discarding unreadable cached page: {}", err),
            },
            Ok(None) => debug!(key = %key, "List cache miss"),
            Err(err) => warn!(key = %key, "List cache read failed: {}", err),
        }

        let items = loader().await?;

        match serde_json::to_string(&items) {
            Ok(serialized) => {
                if let Err(err) = self.cache.set(&key, &serialized, Some(self.ttl)).await {
                    warn!(key = %key, "Failed to cache list page: {}", err);
                }
            }
            Err(err) => warn!(key = %key, "Failed to serialize list page: {}", err),
        }

        Ok(items)
    }
}
