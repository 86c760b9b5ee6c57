use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category labels offered by the storefront. Labels are owned by the remote
/// store, so items carrying other labels are still accepted.
pub const CATEGORIES: [&str; 8] = [
    "Chocolate",
    "Candy",
    "Pastry",
    "Ice Cream",
    "Cookies",
    "Cakes",
    "Gummies",
    "Hard Candy",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Snapshot of a catalog entry as last fetched from the remote store.
///
/// `available_quantity` is only authoritative at the store; here it is a
/// read-only upper bound that may already be stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    #[serde(rename = "quantity")]
    pub available_quantity: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CatalogItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: Decimal,
        available_quantity: u32,
    ) -> Self {
        Self {
            id: ItemId::new(id),
            name: name.into(),
            category: category.into(),
            price,
            available_quantity,
            description: None,
            image_url: None,
        }
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.available_quantity == 0
    }
}

/// Editable fields of a catalog item, as sent on create and update.
/// The store assigns the id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ItemDraft {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            price,
            quantity,
            description: None,
            image_url: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The catalog row this draft becomes once stored under `id`.
    pub fn into_item(self, id: ItemId) -> CatalogItem {
        CatalogItem {
            id,
            name: self.name,
            category: self.category,
            price: self.price,
            available_quantity: self.quantity,
            description: self.description,
            image_url: self.image_url,
        }
    }
}

/// One catalog item plus the quantity currently selected for purchase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub item: CatalogItem,
    pub quantity: u32,
}

impl CartLine {
    pub fn item_id(&self) -> &ItemId {
        &self.item.id
    }

    pub fn line_total(&self) -> Decimal {
        self.item.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartTotals {
    pub total_items: u64,
    pub total_price: Decimal,
}

/// A persisted purchase as returned by the order store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub id: String,
    pub quantity: u32,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "sweet", default)]
    pub item: Option<PurchasedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasedItem {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Filter applied when browsing the catalog. Price bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl CatalogQuery {
    /// Slider bounds of the browse page; values at the edges mean "no bound".
    pub const PRICE_FLOOR: u32 = 0;
    pub const PRICE_CEILING: u32 = 100;

    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.trim().is_empty() {
            None
        } else {
            Some(search)
        };
        self
    }

    /// `"all"` and the empty string both clear the category filter.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = match category.as_str() {
            "" | "all" => None,
            _ => Some(category),
        };
        self
    }

    pub fn with_price_range(mut self, min: Decimal, max: Decimal) -> Self {
        self.min_price = (min > Decimal::from(Self::PRICE_FLOOR)).then_some(min);
        self.max_price = (max < Decimal::from(Self::PRICE_CEILING)).then_some(max);
        self
    }

    pub fn matches(&self, item: &CatalogItem) -> bool {
        if let Some(search) = &self.search {
            if !item.name.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &item.category != category {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if item.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if item.price > max {
                return false;
            }
        }
        true
    }
}
