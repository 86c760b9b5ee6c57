use crate::domain::model::PurchaseRecord;
use crate::domain::ports::{IdentityProvider, PurchaseHistory};
use crate::utils::error::Result;
use rust_decimal::Decimal;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderStats {
    pub total_orders: usize,
    pub total_spent: Decimal,
    pub favorite_category: Option<String>,
}

impl OrderStats {
    /// Favorite category is the one with the most units bought; the first
    /// category seen wins a tie.
    pub fn from_purchases(purchases: &[PurchaseRecord]) -> Self {
        let mut per_category: Vec<(&str, u64)> = Vec::new();
        for purchase in purchases {
            let Some(item) = &purchase.item else {
                continue;
            };
            match per_category.iter_mut().find(|(name, _)| *name == item.category) {
                Some((_, units)) => *units += u64::from(purchase.quantity),
                None => per_category.push((item.category.as_str(), u64::from(purchase.quantity))),
            }
        }

        let favorite_category = per_category
            .iter()
            .fold(None::<(&str, u64)>, |best, &(name, units)| match best {
                Some((_, best_units)) if best_units >= units => best,
                _ => Some((name, units)),
            })
            .map(|(name, _)| name.to_string());

        Self {
            total_orders: purchases.len(),
            total_spent: purchases.iter().map(|p| p.total_price).sum(),
            favorite_category,
        }
    }
}

/// Purchase history of whoever is signed in.
pub struct OrderHistory {
    history: Arc<dyn PurchaseHistory>,
    identity: Arc<dyn IdentityProvider>,
}

impl OrderHistory {
    pub fn new(history: Arc<dyn PurchaseHistory>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { history, identity }
    }

    /// Newest first; empty for anonymous sessions.
    pub async fn purchases(&self) -> Result<Vec<PurchaseRecord>> {
        match self.identity.current_user_id() {
            Some(user) => self.history.purchases_for(&user).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn stats(&self) -> Result<Option<OrderStats>> {
        if self.identity.current_user_id().is_none() {
            return Ok(None);
        }
        let purchases = self.purchases().await?;
        Ok(Some(OrderStats::from_purchases(&purchases)))
    }
}
