use crate::domain::model::{
    CatalogItem, CatalogQuery, ItemDraft, ItemId, PurchaseRecord, PurchasedItem, UserId,
};
use crate::domain::ports::{
    CatalogAdmin, CatalogSource, IdentityProvider, InventoryService, PurchaseHistory,
};
use crate::utils::error::{InventoryError, InventoryResult, Result};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// In-process stand-in for the remote store. Each procedure runs under one
/// lock, so check-and-decrement is atomic across concurrent sessions.
pub struct InMemoryStore {
    items: Mutex<BTreeMap<ItemId, CatalogItem>>,
    purchases: Mutex<Vec<(Option<UserId>, PurchaseRecord)>>,
    buyer: Option<UserId>,
}

impl InMemoryStore {
    pub fn new(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        Self {
            items: Mutex::new(items.into_iter().map(|i| (i.id.clone(), i)).collect()),
            purchases: Mutex::new(Vec::new()),
            buyer: None,
        }
    }

    /// Attributes subsequent purchases to `user`, the way the remote store
    /// attributes them to the authenticated caller.
    pub fn acting_as(mut self, user: UserId) -> Self {
        self.buyer = Some(user);
        self
    }

    pub async fn available(&self, item_id: &ItemId) -> Option<u32> {
        self.items
            .lock()
            .await
            .get(item_id)
            .map(|item| item.available_quantity)
    }

    pub async fn purchase_count(&self) -> usize {
        self.purchases.lock().await.len()
    }
}

#[async_trait]
impl InventoryService for InMemoryStore {
    async fn purchase(&self, item_id: &ItemId, quantity: u32) -> InventoryResult {
        let mut items = self.items.lock().await;
        let item = items
            .get_mut(item_id)
            .ok_or_else(|| InventoryError::NotFound(item_id.clone()))?;
        if quantity == 0 || quantity > item.available_quantity {
            return Err(InventoryError::InsufficientStock(item_id.clone()));
        }
        item.available_quantity -= quantity;

        let record = PurchaseRecord {
            id: format!("p-{}", self.purchases.lock().await.len() + 1),
            quantity,
            total_price: item.price * Decimal::from(quantity),
            created_at: Utc::now(),
            item: Some(PurchasedItem {
                id: item.id.clone(),
                name: item.name.clone(),
                category: item.category.clone(),
                image_url: item.image_url.clone(),
            }),
        };
        self.purchases.lock().await.push((self.buyer.clone(), record));
        Ok(())
    }

    async fn restock(&self, item_id: &ItemId, quantity: u32) -> InventoryResult {
        let mut items = self.items.lock().await;
        let item = items
            .get_mut(item_id)
            .ok_or_else(|| InventoryError::NotFound(item_id.clone()))?;
        item.available_quantity = item.available_quantity.saturating_add(quantity);
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for InMemoryStore {
    async fn list_items(&self, query: &CatalogQuery) -> Result<Vec<CatalogItem>> {
        let mut items: Vec<CatalogItem> = self
            .items
            .lock()
            .await
            .values()
            .filter(|item| query.matches(item))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }
}

#[async_trait]
impl CatalogAdmin for InMemoryStore {
    async fn insert_item(&self, draft: &ItemDraft) -> Result<CatalogItem> {
        let mut items = self.items.lock().await;
        let id = (items.len() + 1..)
            .map(|n| ItemId(format!("item-{}", n)))
            .find(|id| !items.contains_key(id))
            .unwrap_or_else(|| ItemId(format!("item-{}", Utc::now().timestamp_micros())));

        let item = draft.clone().into_item(id.clone());
        items.insert(id, item.clone());
        Ok(item)
    }

    async fn update_item(&self, item_id: &ItemId, draft: &ItemDraft) -> Result<CatalogItem> {
        let mut items = self.items.lock().await;
        let item = items
            .get_mut(item_id)
            .ok_or_else(|| InventoryError::NotFound(item_id.clone()))?;
        *item = draft.clone().into_item(item_id.clone());
        Ok(item.clone())
    }

    async fn delete_item(&self, item_id: &ItemId) -> Result<()> {
        self.items.lock().await.remove(item_id);
        Ok(())
    }
}

#[async_trait]
impl PurchaseHistory for InMemoryStore {
    async fn purchases_for(&self, user: &UserId) -> Result<Vec<PurchaseRecord>> {
        Ok(self
            .purchases
            .lock()
            .await
            .iter()
            .rev()
            .filter(|(buyer, _)| buyer.as_ref() == Some(user))
            .map(|(_, record)| record.clone())
            .collect())
    }
}

/// Identity fixed for the lifetime of the session.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<UserId>);

impl StaticIdentity {
    pub fn signed_in(user: UserId) -> Self {
        Self(Some(user))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<UserId> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn store() -> InMemoryStore {
        InMemoryStore::new(vec![
            CatalogItem::new("a", "Marzipan", "Candy", dec!(2.50), 3),
            CatalogItem::new("b", "Cupcake", "Cakes", dec!(4.00), 1),
        ])
        .acting_as(UserId("u1".to_string()))
    }

    #[tokio::test]
    async fn test_purchase_decrements_and_records() {
        let store = store();
        store.purchase(&ItemId::new("a"), 2).await.unwrap();

        assert_eq!(store.available(&ItemId::new("a")).await, Some(1));
        let history = store.purchases_for(&UserId("u1".to_string())).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].total_price, dec!(5.00));
    }

    #[tokio::test]
    async fn test_purchase_beyond_stock_changes_nothing() {
        let store = store();
        let err = store.purchase(&ItemId::new("b"), 2).await.unwrap_err();

        assert_eq!(err, InventoryError::InsufficientStock(ItemId::new("b")));
        assert_eq!(store.available(&ItemId::new("b")).await, Some(1));
        assert_eq!(store.purchase_count().await, 0);
    }

    #[tokio::test]
    async fn test_purchase_unknown_item() {
        let err = store().purchase(&ItemId::new("zz"), 1).await.unwrap_err();
        assert_eq!(err, InventoryError::NotFound(ItemId::new("zz")));
    }

    #[tokio::test]
    async fn test_concurrent_buyers_never_oversell() {
        let store = Arc::new(store());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.purchase(&ItemId::new("a"), 1).await })
            })
            .collect();

        let mut committed = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                committed += 1;
            }
        }
        assert_eq!(committed, 3);
        assert_eq!(store.available(&ItemId::new("a")).await, Some(0));
    }

    #[tokio::test]
    async fn test_restock_and_listing() {
        let store = store();
        store.restock(&ItemId::new("b"), 9).await.unwrap();

        let items = store.list_items(&CatalogQuery::all()).await.unwrap();
        assert_eq!(items[0].name, "Cupcake");
        assert_eq!(items[0].available_quantity, 10);
    }

    #[tokio::test]
    async fn test_history_is_newest_first_and_per_user() {
        let store = store();
        store.purchase(&ItemId::new("a"), 1).await.unwrap();
        store.purchase(&ItemId::new("b"), 1).await.unwrap();

        let history = store.purchases_for(&UserId("u1".to_string())).await.unwrap();
        let names: Vec<&str> = history
            .iter()
            .map(|p| p.item.as_ref().unwrap().name.as_str())
            .collect();
        assert_eq!(names, vec!["Cupcake", "Marzipan"]);

        let other = store.purchases_for(&UserId("u2".to_string())).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_admin_round_trip() {
        let store = store();
        let draft = ItemDraft::new("Jalebi", "Candy", dec!(30), 6);

        let created = store.insert_item(&draft).await.unwrap();
        assert_eq!(created.id, ItemId::new("item-3"));
        assert_eq!(store.available(&created.id).await, Some(6));

        let renamed = ItemDraft::new("Imarti", "Candy", dec!(35), 6);
        let updated = store.update_item(&created.id, &renamed).await.unwrap();
        assert_eq!(updated.name, "Imarti");
        assert_eq!(updated.id, created.id);

        store.delete_item(&created.id).await.unwrap();
        assert_eq!(store.available(&created.id).await, None);
        store.delete_item(&created.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_skips_taken_ids() {
        let store = InMemoryStore::new(vec![CatalogItem::new(
            "item-2",
            "Peda",
            "Candy",
            dec!(10),
            1,
        )]);

        let created = store
            .insert_item(&ItemDraft::new("Barfi", "Candy", dec!(12), 4))
            .await
            .unwrap();
        assert_eq!(created.id, ItemId::new("item-3"));
    }

    #[tokio::test]
    async fn test_update_unknown_item_is_not_found() {
        let err = store()
            .update_item(&ItemId::new("zz"), &ItemDraft::new("X", "Candy", dec!(1), 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::utils::error::StoreError::InventoryError(InventoryError::NotFound(_))
        ));
    }

    #[test]
    fn test_static_identity() {
        assert_eq!(StaticIdentity::anonymous().current_user_id(), None);
        assert_eq!(
            StaticIdentity::signed_in(UserId("x".to_string())).current_user_id(),
            Some(UserId("x".to_string()))
        );
    }
}
