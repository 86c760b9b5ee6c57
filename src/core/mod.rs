pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

pub use crate::domain::model::{CartLine, CartTotals, CatalogItem, CatalogQuery, ItemId, UserId};
pub use crate::domain::ports::{
    CacheScope, CatalogCache, CatalogSource, IdentityProvider, InventoryService, PurchaseHistory,
};
pub use crate::utils::error::Result;
