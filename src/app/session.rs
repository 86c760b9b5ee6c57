use crate::adapters::{HttpStore, InMemoryStore, StaticIdentity};
use crate::config::{Backend, StorefrontConfig};
use crate::core::admin::{InventorySummary, StockAdmin};
use crate::core::cart::CartStore;
use crate::core::catalog::{Catalog, CatalogCacheStore};
use crate::core::checkout::{CheckoutResult, CheckoutSequencer};
use crate::core::orders::{OrderHistory, OrderStats};
use crate::domain::model::{
    CatalogItem, CatalogQuery, ItemDraft, ItemId, PurchaseRecord, UserId,
};
use crate::domain::ports::{
    CatalogAdmin, CatalogSource, IdentityProvider, InventoryService, PurchaseHistory,
};
use crate::utils::error::Result;
use crate::utils::validation::validate_required_field;
use std::sync::Arc;
use std::time::Duration;

/// The remote collaborators a session talks to.
#[derive(Clone)]
pub struct Services {
    pub inventory: Arc<dyn InventoryService>,
    pub catalog: Arc<dyn CatalogSource>,
    pub catalog_admin: Arc<dyn CatalogAdmin>,
    pub history: Arc<dyn PurchaseHistory>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl Services {
    /// Uses one in-memory store for every role.
    pub fn in_memory(store: Arc<InMemoryStore>, identity: StaticIdentity) -> Self {
        Self {
            inventory: store.clone(),
            catalog: store.clone(),
            catalog_admin: store.clone(),
            history: store,
            identity: Arc::new(identity),
        }
    }

    pub fn http(store: HttpStore, identity: StaticIdentity) -> Self {
        let store = Arc::new(store);
        Self {
            inventory: store.clone(),
            catalog: store.clone(),
            catalog_admin: store.clone(),
            history: store,
            identity: Arc::new(identity),
        }
    }
}

/// One interactive session: owns the cart and the components that act on it.
pub struct StorefrontSession {
    cart: CartStore,
    catalog: Catalog,
    checkout: Arc<CheckoutSequencer>,
    admin: StockAdmin,
    orders: OrderHistory,
}

impl StorefrontSession {
    pub fn new(services: Services, line_deadline: Option<Duration>) -> Self {
        let cache = Arc::new(CatalogCacheStore::new());

        let mut checkout = CheckoutSequencer::new(
            services.inventory.clone(),
            cache.clone(),
            services.identity.clone(),
        );
        if let Some(deadline) = line_deadline {
            checkout = checkout.with_line_deadline(deadline);
        }

        Self {
            cart: CartStore::new(),
            catalog: Catalog::new(services.catalog, cache.clone()),
            checkout: Arc::new(checkout),
            admin: StockAdmin::new(services.inventory, services.catalog_admin, cache),
            orders: OrderHistory::new(services.history, services.identity),
        }
    }

    /// Wires a session from configuration. `user` overrides the configured session user.
    pub fn from_config(config: &StorefrontConfig, user: Option<UserId>) -> Result<Self> {
        let user = user.or_else(|| config.session_user());
        let identity = match &user {
            Some(user) => StaticIdentity::signed_in(user.clone()),
            None => StaticIdentity::anonymous(),
        };

        let services = match config.store.backend {
            Backend::Memory => {
                let mut store = InMemoryStore::new(config.seed_items());
                if let Some(user) = user {
                    store = store.acting_as(user);
                }
                tracing::info!("Using in-memory store with {} items", config.seed.len());
                Services::in_memory(Arc::new(store), identity)
            }
            Backend::Http => {
                let endpoint = validate_required_field("store.endpoint", &config.store.endpoint)?;
                let api_key = config.api_key().map(str::to_string);
                let mut store = HttpStore::new(endpoint, api_key, config.timeout())?;
                if let Some(token) = config.access_token() {
                    store = store.with_access_token(token);
                }
                tracing::info!("Using remote store at {}", endpoint);
                Services::http(store, identity)
            }
        };

        Ok(Self::new(services, config.line_deadline()))
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    pub async fn browse(&self, query: &CatalogQuery) -> Result<Vec<CatalogItem>> {
        self.catalog.browse(query).await
    }

    /// Adds `quantity` of the item using its current catalog snapshot.
    /// Returns false when the item is unknown or out of stock.
    pub async fn add_to_cart(&mut self, item_id: &ItemId, quantity: u32) -> Result<bool> {
        let Some(item) = self.catalog.item(item_id).await? else {
            tracing::warn!("Unknown item {}", item_id);
            return Ok(false);
        };
        if item.is_out_of_stock() {
            tracing::warn!("{} is out of stock", item.name);
            return Ok(false);
        }
        self.cart.add(&item, quantity);
        Ok(true)
    }

    pub async fn checkout(&mut self) -> CheckoutResult {
        self.checkout.commit(&mut self.cart).await
    }

    /// Hands the cart to a detached checkout task; the session keeps an empty
    /// cart until the caller puts the returned one back with `restore_cart`.
    pub fn spawn_checkout(&mut self) -> tokio::task::JoinHandle<(CartStore, CheckoutResult)> {
        let cart = std::mem::take(&mut self.cart);
        self.checkout.clone().spawn_commit(cart)
    }

    pub fn restore_cart(&mut self, cart: CartStore) {
        self.cart = cart;
    }

    pub async fn restock(&self, item_id: &ItemId, quantity: u32) -> Result<()> {
        self.admin.restock(item_id, quantity).await
    }

    pub async fn add_item(&self, draft: &ItemDraft) -> Result<CatalogItem> {
        self.admin.add_item(draft).await
    }

    pub async fn update_item(&self, item_id: &ItemId, draft: &ItemDraft) -> Result<CatalogItem> {
        self.admin.update_item(item_id, draft).await
    }

    pub async fn delete_item(&self, item_id: &ItemId) -> Result<()> {
        self.admin.delete_item(item_id).await
    }

    /// Stock counts over the whole catalog, as the admin dashboard shows them.
    pub async fn inventory_summary(&self) -> Result<InventorySummary> {
        let items = self.catalog.browse(&CatalogQuery::all()).await?;
        Ok(InventorySummary::from_items(&items))
    }

    pub async fn order_history(&self) -> Result<Vec<PurchaseRecord>> {
        self.orders.purchases().await
    }

    pub async fn order_stats(&self) -> Result<Option<OrderStats>> {
        self.orders.stats().await
    }
}
