use crate::domain::model::{CatalogItem, CatalogQuery, ItemDraft, ItemId, PurchaseRecord, UserId};
use crate::domain::ports::{CatalogAdmin, CatalogSource, InventoryService, PurchaseHistory};
use crate::utils::error::{InventoryError, InventoryResult, Result, StoreError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;
use url::Url;

const PURCHASE_RPC: &str = "rest/v1/rpc/purchase_sweet";
const RESTOCK_RPC: &str = "rest/v1/rpc/restock_sweet";
const CATALOG_TABLE: &str = "rest/v1/sweets";
const PURCHASES_TABLE: &str = "rest/v1/purchases";
const PURCHASE_COLUMNS: &str =
    "id,quantity,total_price,created_at,sweet:sweets(id,name,image_url,category)";

/// Remote store reached over its REST/RPC surface.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base: Url,
    api_key: Option<String>,
    access_token: Option<String>,
}

impl HttpStore {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(endpoint).map_err(|e| StoreError::InvalidConfigValueError {
            field: "store.endpoint".to_string(),
            value: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            api_key,
            access_token: None,
        })
    }

    /// Bearer token of the signed-in user; purchases are attributed to it.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| StoreError::ConfigError {
                message: format!("cannot build store URL for {}: {}", path, e),
            })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match &self.api_key {
            Some(key) => request.header("apikey", key),
            None => request,
        };
        match self.access_token.as_ref().or(self.api_key.as_ref()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn call_rpc(
        &self,
        path: &str,
        body: serde_json::Value,
        item_id: &ItemId,
    ) -> InventoryResult {
        let url = self
            .url(path)
            .map_err(|e| InventoryError::Transient(e.to_string()))?;
        tracing::debug!("POST {} for item {}", url, item_id);

        let response = self
            .authorize(self.client.post(url))
            .json(&body)
            .send()
            .await
            .map_err(|e| InventoryError::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        tracing::debug!("Store rejected {} ({}): {}", item_id, status, text);
        Err(classify_rejection(status, &text, item_id))
    }
}

/// Escapes LIKE wildcards in user text. The server turns every `*` into `%`,
/// so a literal `*` can only be narrowed to `_`; `Catalog::browse` re-applies
/// the exact substring match afterwards.
fn ilike_literal(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len());
    for c in search.chars() {
        match c {
            '\\' | '%' | '_' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '*' => escaped.push('_'),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Maps a failed RPC response onto the purchase contract.
pub fn classify_rejection(status: StatusCode, body: &str, item_id: &ItemId) -> InventoryError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());
    let lowered = message.to_lowercase();

    if status == StatusCode::NOT_FOUND {
        return InventoryError::NotFound(item_id.clone());
    }
    if status.is_client_error() {
        if lowered.contains("insufficient") {
            return InventoryError::InsufficientStock(item_id.clone());
        }
        if lowered.contains("not found") {
            return InventoryError::NotFound(item_id.clone());
        }
    }
    InventoryError::Transient(format!("{}: {}", status, message))
}

#[async_trait]
impl InventoryService for HttpStore {
    async fn purchase(&self, item_id: &ItemId, quantity: u32) -> InventoryResult {
        let body = serde_json::json!({
            "sweet_id": item_id,
            "purchase_quantity": quantity,
        });
        self.call_rpc(PURCHASE_RPC, body, item_id).await
    }

    async fn restock(&self, item_id: &ItemId, quantity: u32) -> InventoryResult {
        let body = serde_json::json!({
            "sweet_id": item_id,
            "restock_quantity": quantity,
        });
        self.call_rpc(RESTOCK_RPC, body, item_id).await
    }
}

#[async_trait]
impl CatalogSource for HttpStore {
    async fn list_items(&self, query: &CatalogQuery) -> Result<Vec<CatalogItem>> {
        let mut params: Vec<(&str, String)> = vec![
            ("select", "*".to_string()),
            ("order", "name.asc".to_string()),
        ];
        if let Some(search) = &query.search {
            params.push(("name", format!("ilike.*{}*", ilike_literal(search))));
        }
        if let Some(category) = &query.category {
            params.push(("category", format!("eq.{}", category)));
        }
        if let Some(min) = query.min_price {
            params.push(("price", format!("gte.{}", min)));
        }
        if let Some(max) = query.max_price {
            params.push(("price", format!("lte.{}", max)));
        }

        let items = self
            .authorize(self.client.get(self.url(CATALOG_TABLE)?))
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<CatalogItem>>()
            .await?;
        tracing::debug!("Store returned {} catalog rows", items.len());
        Ok(items)
    }
}

#[async_trait]
impl CatalogAdmin for HttpStore {
    async fn insert_item(&self, draft: &ItemDraft) -> Result<CatalogItem> {
        let rows = self
            .authorize(self.client.post(self.url(CATALOG_TABLE)?))
            .header("Prefer", "return=representation")
            .json(&[draft])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<CatalogItem>>()
            .await?;

        let item = rows.into_iter().next().ok_or_else(|| StoreError::ValidationError {
            message: format!("store returned no row for new item {}", draft.name),
        })?;
        tracing::info!("Created catalog item {} ({})", item.name, item.id);
        Ok(item)
    }

    async fn update_item(&self, item_id: &ItemId, draft: &ItemDraft) -> Result<CatalogItem> {
        let rows = self
            .authorize(self.client.patch(self.url(CATALOG_TABLE)?))
            .query(&[("id", format!("eq.{}", item_id))])
            .header("Prefer", "return=representation")
            .json(draft)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<CatalogItem>>()
            .await?;

        let item = rows
            .into_iter()
            .next()
            .ok_or_else(|| InventoryError::NotFound(item_id.clone()))?;
        tracing::info!("Updated catalog item {}", item.id);
        Ok(item)
    }

    async fn delete_item(&self, item_id: &ItemId) -> Result<()> {
        self.authorize(self.client.delete(self.url(CATALOG_TABLE)?))
            .query(&[("id", format!("eq.{}", item_id))])
            .send()
            .await?
            .error_for_status()?;
        tracing::info!("Deleted catalog item {}", item_id);
        Ok(())
    }
}

#[async_trait]
impl PurchaseHistory for HttpStore {
    async fn purchases_for(&self, user: &UserId) -> Result<Vec<PurchaseRecord>> {
        let params = [
            ("select", PURCHASE_COLUMNS.to_string()),
            ("user_id", format!("eq.{}", user)),
            ("order", "created_at.desc".to_string()),
        ];

        let records = self
            .authorize(self.client.get(self.url(PURCHASES_TABLE)?))
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<PurchaseRecord>>()
            .await?;
        Ok(records)
    }
}
