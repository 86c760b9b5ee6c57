use crate::domain::model::{CatalogItem, CatalogQuery, ItemDraft, ItemId, PurchaseRecord, UserId};
use crate::utils::error::{InventoryResult, Result};
use async_trait::async_trait;

/// Authoritative stock store. Both procedures are atomic on the remote side;
/// `purchase` is not idempotent, every call decrements stock again.
#[async_trait]
pub trait InventoryService: Send + Sync {
    async fn purchase(&self, item_id: &ItemId, quantity: u32) -> InventoryResult;
    async fn restock(&self, item_id: &ItemId, quantity: u32) -> InventoryResult;
}

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_items(&self, query: &CatalogQuery) -> Result<Vec<CatalogItem>>;
}

/// Catalog maintenance for administrators.
#[async_trait]
pub trait CatalogAdmin: Send + Sync {
    async fn insert_item(&self, draft: &ItemDraft) -> Result<CatalogItem>;
    /// Fails with `InventoryError::NotFound` when no item has `item_id`.
    async fn update_item(&self, item_id: &ItemId, draft: &ItemDraft) -> Result<CatalogItem>;
    /// Deleting an absent item succeeds.
    async fn delete_item(&self, item_id: &ItemId) -> Result<()>;
}

#[async_trait]
pub trait PurchaseHistory: Send + Sync {
    /// Purchases of `user`, newest first.
    async fn purchases_for(&self, user: &UserId) -> Result<Vec<PurchaseRecord>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheScope {
    Catalog,
    Purchases,
}

pub trait CatalogCache: Send + Sync {
    fn invalidate(&self, scope: CacheScope);
}

pub trait IdentityProvider: Send + Sync {
    fn current_user_id(&self) -> Option<UserId>;
}
