use crate::domain::model::{CartLine, CartTotals, CatalogItem, ItemId};
use rust_decimal::Decimal;

/// Session-scoped reservation ledger.
///
/// Quantities are clamped to the available quantity of the catalog snapshot
/// the caller supplied. That bound is advisory: the remote store re-checks it
/// when the line is purchased. Totals are always derived from the current
/// lines and never stored.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    lines: Vec<CartLine>,
    is_open: bool,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` units of `item`, merging into an existing line for the
    /// same item. Zero-stock items and zero quantities are ignored.
    pub fn add(&mut self, item: &CatalogItem, quantity: u32) {
        if item.is_out_of_stock() {
            tracing::debug!("Ignoring add of out-of-stock item {}", item.id);
            return;
        }
        if quantity == 0 {
            return;
        }

        let ceiling = item.available_quantity;
        match self.lines.iter_mut().find(|line| line.item.id == item.id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(quantity).min(ceiling);
                // the caller's snapshot is at least as fresh as the stored one
                line.item = item.clone();
            }
            None => self.lines.push(CartLine {
                item: item.clone(),
                quantity: quantity.min(ceiling),
            }),
        }

        self.is_open = true;
    }

    pub fn add_one(&mut self, item: &CatalogItem) {
        self.add(item, 1);
    }

    /// Removes the line for `item_id`; absent lines are ignored.
    pub fn remove(&mut self, item_id: &ItemId) {
        self.lines.retain(|line| &line.item.id != item_id);
    }

    /// Replaces the quantity of an existing line. Non-positive quantities
    /// remove the line; missing lines are ignored.
    pub fn set_quantity(&mut self, item_id: &ItemId, quantity: i64) {
        if quantity <= 0 {
            self.remove(item_id);
            return;
        }

        let Some(line) = self.lines.iter_mut().find(|line| &line.item.id == item_id) else {
            return;
        };

        let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
        line.quantity = requested.min(line.item.available_quantity);
        if line.quantity == 0 {
            self.remove(item_id);
        }
    }

    pub fn increment(&mut self, item_id: &ItemId) {
        if let Some(current) = self.quantity_of(item_id) {
            self.set_quantity(item_id, i64::from(current) + 1);
        }
    }

    pub fn decrement(&mut self, item_id: &ItemId) {
        if let Some(current) = self.quantity_of(item_id) {
            self.set_quantity(item_id, i64::from(current) - 1);
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn totals(&self) -> CartTotals {
        self.lines.iter().fold(CartTotals::default(), |acc, line| CartTotals {
            total_items: acc.total_items + u64::from(line.quantity),
            total_price: acc.total_price + line.line_total(),
        })
    }

    pub fn total_items(&self) -> u64 {
        self.totals().total_items
    }

    pub fn total_price(&self) -> Decimal {
        self.totals().total_price
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, item_id: &ItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.item.id == item_id)
    }

    pub fn quantity_of(&self, item_id: &ItemId) -> Option<u32> {
        self.line(item_id).map(|line| line.quantity)
    }

    /// Whether the line is already at its last-known stock ceiling.
    pub fn is_at_ceiling(&self, item_id: &ItemId) -> bool {
        self.line(item_id)
            .map(|line| line.quantity >= line.item.available_quantity)
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn set_open(&mut self, open: bool) {
        self.is_open = open;
    }
}
