use crate::domain::model::{CatalogItem, CatalogQuery, ItemId};
use crate::domain::ports::{CacheScope, CatalogCache, CatalogSource};
use crate::utils::error::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Snapshots of catalog queries, dropped wholesale on invalidation.
#[derive(Debug, Default)]
pub struct CatalogCacheStore {
    entries: RwLock<HashMap<CatalogQuery, Vec<CatalogItem>>>,
    generation: AtomicU64,
}

impl CatalogCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, query: &CatalogQuery) -> Option<Vec<CatalogItem>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(query)
            .cloned()
    }

    /// Stores `items` unless the cache was invalidated after `generation` was read.
    pub fn put(&self, query: CatalogQuery, items: Vec<CatalogItem>, generation: u64) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        entries.insert(query, items);
        true
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CatalogCache for CatalogCacheStore {
    fn invalidate(&self, scope: CacheScope) {
        if scope != CacheScope::Catalog {
            return;
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("Catalog cache invalidated (generation {})", generation);
    }
}

/// Read side of the catalog: fetches filtered snapshots through the cache.
pub struct Catalog {
    source: Arc<dyn CatalogSource>,
    cache: Arc<CatalogCacheStore>,
}

impl Catalog {
    pub fn new(source: Arc<dyn CatalogSource>, cache: Arc<CatalogCacheStore>) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &Arc<CatalogCacheStore> {
        &self.cache
    }

    /// Items matching `query`, ordered by name.
    pub async fn browse(&self, query: &CatalogQuery) -> Result<Vec<CatalogItem>> {
        if let Some(items) = self.cache.get(query) {
            tracing::debug!("Catalog cache hit ({} items)", items.len());
            return Ok(items);
        }

        let generation = self.cache.generation();
        let mut items = self.source.list_items(query).await?;
        items.retain(|item| query.matches(item));
        items.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::debug!("Fetched {} catalog items", items.len());

        self.cache.put(query.clone(), items.clone(), generation);
        Ok(items)
    }

    pub async fn item(&self, id: &ItemId) -> Result<Option<CatalogItem>> {
        let items = self.browse(&CatalogQuery::all()).await?;
        Ok(items.into_iter().find(|item| &item.id == id))
    }
}
