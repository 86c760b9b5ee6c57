use crate::core::cart::CartStore;
use crate::domain::model::{CartLine, CartTotals, ItemId, UserId};
use crate::domain::ports::{CacheScope, CatalogCache, IdentityProvider, InventoryService};
use crate::utils::error::InventoryError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Why a single cart line could not be purchased.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineRejection {
    #[error("insufficient stock for item {0}")]
    InsufficientStock(ItemId),

    #[error("store unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("{0}")]
    Unknown(String),
}

impl From<InventoryError> for LineRejection {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::InsufficientStock(id) => LineRejection::InsufficientStock(id),
            InventoryError::Transient(message) => LineRejection::RemoteUnavailable(message),
            InventoryError::NotFound(id) => LineRejection::Unknown(format!("item {} not found", id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Committed,
    Rejected(LineRejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineReport {
    pub item_id: ItemId,
    pub item_name: String,
    pub quantity: u32,
    pub outcome: LineOutcome,
}

impl LineReport {
    fn new(line: &CartLine, outcome: LineOutcome) -> Self {
        Self {
            item_id: line.item.id.clone(),
            item_name: line.item.name.clone(),
            quantity: line.quantity,
            outcome,
        }
    }

    pub fn is_committed(&self) -> bool {
        self.outcome == LineOutcome::Committed
    }
}

/// A checkout that stopped at its first rejected line.
///
/// Lines before `failed_index` are committed at the store and stay committed.
/// The cart is left exactly as it was before the attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialFailure {
    pub failed_index: usize,
    pub failed_item: ItemId,
    pub failed_item_name: String,
    pub reason: LineRejection,
    pub committed_count: usize,
    /// Attempted lines in commit order; the last one is the rejected line.
    pub lines: Vec<LineReport>,
}

impl PartialFailure {
    /// Items already purchased in this attempt. Retrying them would buy them twice.
    pub fn committed_item_ids(&self) -> Vec<&ItemId> {
        self.lines
            .iter()
            .filter(|report| report.is_committed())
            .map(|report| &report.item_id)
            .collect()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("cart is empty")]
    Empty,

    #[error("sign in to check out")]
    Unauthenticated,

    #[error("failed to purchase {}: {}", .0.failed_item_name, .0.reason)]
    Rejected(PartialFailure),
}

impl CheckoutError {
    pub fn partial_failure(&self) -> Option<&PartialFailure> {
        match self {
            CheckoutError::Rejected(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Result of a checkout where every line was committed.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    pub user: UserId,
    pub lines: Vec<LineReport>,
    pub totals: CartTotals,
    pub completed_at: DateTime<Utc>,
}

pub type CheckoutResult = std::result::Result<CheckoutReceipt, CheckoutError>;

/// Turns a cart into remote stock decrements, one `purchase` per line, in
/// cart order, stopping at the first rejection without undoing prior commits.
pub struct CheckoutSequencer {
    inventory: Arc<dyn InventoryService>,
    cache: Arc<dyn CatalogCache>,
    identity: Arc<dyn IdentityProvider>,
    line_deadline: Option<Duration>,
}

impl CheckoutSequencer {
    pub fn new(
        inventory: Arc<dyn InventoryService>,
        cache: Arc<dyn CatalogCache>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            inventory,
            cache,
            identity,
            line_deadline: None,
        }
    }

    /// Bounds each `purchase` call; an expired call counts as `RemoteUnavailable`.
    pub fn with_line_deadline(mut self, deadline: Duration) -> Self {
        self.line_deadline = Some(deadline);
        self
    }

    pub async fn commit(&self, cart: &mut CartStore) -> CheckoutResult {
        if cart.is_empty() {
            return Err(CheckoutError::Empty);
        }
        let user = self
            .identity
            .current_user_id()
            .ok_or(CheckoutError::Unauthenticated)?;

        let lines = cart.lines().to_vec();
        let totals = cart.totals();
        tracing::info!(
            "Starting checkout for {} ({} lines, {} items)",
            user,
            lines.len(),
            totals.total_items
        );

        let mut reports = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            match self.purchase_line(line).await {
                Ok(()) => {
                    tracing::debug!(
                        "Committed line {}: {} x{}",
                        index + 1,
                        line.item.id,
                        line.quantity
                    );
                    reports.push(LineReport::new(line, LineOutcome::Committed));
                }
                Err(reason) => {
                    tracing::warn!(
                        "Checkout stopped at line {} ({}): {}; {} line(s) already committed",
                        index + 1,
                        line.item.id,
                        reason,
                        index
                    );
                    reports.push(LineReport::new(line, LineOutcome::Rejected(reason.clone())));
                    return Err(CheckoutError::Rejected(PartialFailure {
                        failed_index: index,
                        failed_item: line.item.id.clone(),
                        failed_item_name: line.item.name.clone(),
                        reason,
                        committed_count: index,
                        lines: reports,
                    }));
                }
            }
        }

        cart.clear();
        cart.set_open(false);
        self.cache.invalidate(CacheScope::Catalog);
        self.cache.invalidate(CacheScope::Purchases);

        tracing::info!(
            "Checkout completed: {} lines, total {}",
            reports.len(),
            totals.total_price
        );

        Ok(CheckoutReceipt {
            user,
            lines: reports,
            totals,
            completed_at: Utc::now(),
        })
    }

    /// Runs `commit` on a detached task. Dropping the handle does not cancel
    /// the sequence; the cart is handed back when it finishes.
    pub fn spawn_commit(
        self: Arc<Self>,
        mut cart: CartStore,
    ) -> JoinHandle<(CartStore, CheckoutResult)> {
        tokio::spawn(async move {
            let result = self.commit(&mut cart).await;
            (cart, result)
        })
    }

    async fn purchase_line(&self, line: &CartLine) -> Result<(), LineRejection> {
        let call = self.inventory.purchase(&line.item.id, line.quantity);
        let result = match self.line_deadline {
            Some(deadline) => match tokio::time::timeout(deadline, call).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(LineRejection::RemoteUnavailable(format!(
                        "no response within {:?}",
                        deadline
                    )))
                }
            },
            None => call.await,
        };
        result.map_err(LineRejection::from)
    }
}
