use crate::domain::model::{CatalogItem, ItemDraft, ItemId};
use crate::domain::ports::{CacheScope, CatalogAdmin, CatalogCache, InventoryService};
use crate::utils::error::{Result, StoreError};
use crate::utils::validation::validate_non_empty_string;
use std::sync::Arc;

/// Below this many units an item is flagged as running low.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    OutOfStock,
    Low,
    InStock,
}

impl StockLevel {
    pub fn classify(available: u32) -> Self {
        match available {
            0 => StockLevel::OutOfStock,
            n if n < LOW_STOCK_THRESHOLD => StockLevel::Low,
            _ => StockLevel::InStock,
        }
    }
}

/// Dashboard counts over a catalog snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InventorySummary {
    pub total_items: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
}

impl InventorySummary {
    pub fn from_items(items: &[CatalogItem]) -> Self {
        items.iter().fold(
            Self {
                total_items: items.len(),
                ..Self::default()
            },
            |mut summary, item| {
                match StockLevel::classify(item.available_quantity) {
                    StockLevel::OutOfStock => summary.out_of_stock += 1,
                    StockLevel::Low => summary.low_stock += 1,
                    StockLevel::InStock => {}
                }
                summary
            },
        )
    }
}

/// Out-of-band catalog and stock changes for administrators. Every successful
/// change drops cached catalog snapshots.
pub struct StockAdmin {
    inventory: Arc<dyn InventoryService>,
    catalog: Arc<dyn CatalogAdmin>,
    cache: Arc<dyn CatalogCache>,
}

impl StockAdmin {
    pub fn new(
        inventory: Arc<dyn InventoryService>,
        catalog: Arc<dyn CatalogAdmin>,
        cache: Arc<dyn CatalogCache>,
    ) -> Self {
        Self {
            inventory,
            catalog,
            cache,
        }
    }

    pub async fn restock(&self, item_id: &ItemId, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(StoreError::ValidationError {
                message: format!("restock quantity for {} must be at least 1", item_id),
            });
        }

        self.inventory.restock(item_id, quantity).await?;
        self.cache.invalidate(CacheScope::Catalog);
        tracing::info!("Restocked {} by {}", item_id, quantity);
        Ok(())
    }

    pub async fn add_item(&self, draft: &ItemDraft) -> Result<CatalogItem> {
        validate_draft(draft)?;
        let item = self.catalog.insert_item(draft).await?;
        self.cache.invalidate(CacheScope::Catalog);
        Ok(item)
    }

    pub async fn update_item(&self, item_id: &ItemId, draft: &ItemDraft) -> Result<CatalogItem> {
        validate_draft(draft)?;
        let item = self.catalog.update_item(item_id, draft).await?;
        self.cache.invalidate(CacheScope::Catalog);
        Ok(item)
    }

    pub async fn delete_item(&self, item_id: &ItemId) -> Result<()> {
        self.catalog.delete_item(item_id).await?;
        self.cache.invalidate(CacheScope::Catalog);
        Ok(())
    }
}

fn validate_draft(draft: &ItemDraft) -> Result<()> {
    validate_non_empty_string("name", &draft.name)?;
    validate_non_empty_string("category", &draft.category)?;
    if draft.price.is_sign_negative() {
        return Err(StoreError::ValidationError {
            message: format!("price of {} cannot be negative", draft.name),
        });
    }
    Ok(())
}
