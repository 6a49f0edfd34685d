use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::types::{Material, MaterialId};

/// Read-through cache of stored documents, keyed by id.
pub struct CacheManager {
    cache: Arc<Mutex<LruCache<MaterialId, Material>>>,
}

impl CacheManager {
    pub fn new(cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity)))
        }
    }

    pub async fn get(&self, id: &MaterialId) -> Option<Material> {
        let mut cache = self.cache.lock().await;
        cache.get(id).cloned()
    }

    pub async fn put(&self, material: Material) {
        let mut cache = self.cache.lock().await;
        cache.put(material.id.clone(), material);
    }

    pub async fn invalidate(&self, id: &MaterialId) {
        let mut cache = self.cache.lock().await;
        cache.pop(id);
    }
}
