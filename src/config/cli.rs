use crate::domain::model::{ItemDraft, ItemId};
use rust_decimal::Decimal;
use crate::utils::error::Result;
use crate::utils::validation::{validate_range, Validate};
use clap::Parser;
use std::str::FromStr;

#[derive(Debug, Clone, Parser)]
#[command(name = "storefront")]
#[command(about = "Browse the catalog, fill a cart and check it out")]
pub struct CliConfig {
    #[arg(short, long, default_value = "storefront.toml")]
    pub config: String,

    /// Signed-in user; overrides [session] user_id
    #[arg(long)]
    pub user: Option<String>,

    /// Add ITEM or ITEM:QTY to the cart (repeatable)
    #[arg(long = "add", value_name = "ITEM[:QTY]")]
    pub add: Vec<LineArg>,

    /// Set the quantity of a cart line; 0 removes it (repeatable)
    #[arg(long = "set", value_name = "ITEM:QTY")]
    pub set: Vec<LineArg>,

    /// Remove a cart line (repeatable)
    #[arg(long = "remove", value_name = "ITEM")]
    pub remove: Vec<String>,

    /// Restock ITEM:QTY before shopping (repeatable)
    #[arg(long = "restock", value_name = "ITEM:QTY")]
    pub restock: Vec<LineArg>,

    /// Create a catalog item NAME:CATEGORY:PRICE:QTY before shopping (repeatable)
    #[arg(long = "new-item", value_name = "NAME:CATEGORY:PRICE:QTY")]
    pub new_items: Vec<ItemArg>,

    /// Delete a catalog item before shopping (repeatable)
    #[arg(long = "delete-item", value_name = "ITEM")]
    pub delete_items: Vec<String>,

    /// Print total, low-stock and out-of-stock counts
    #[arg(long)]
    pub summary: bool,

    /// Only list catalog items whose name contains this text
    #[arg(long)]
    pub search: Option<String>,

    /// Only list catalog items in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Per-line purchase deadline in milliseconds; overrides [checkout] deadline_ms
    #[arg(long)]
    pub deadline_ms: Option<u64>,

    /// Print order history and stats after checkout
    #[arg(long)]
    pub history: bool,

    /// Build the cart and print it without checking out
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// `ITEM` or `ITEM:QTY` as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineArg {
    pub item_id: ItemId,
    pub quantity: i64,
}

impl FromStr for LineArg {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let (id, quantity) = match value.rsplit_once(':') {
            Some((id, qty)) => {
                let quantity = qty
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| format!("invalid quantity '{}': {}", qty, e))?;
                (id, quantity)
            }
            None => (value, 1),
        };
        let id = id.trim();
        if id.is_empty() {
            return Err(format!("missing item id in '{}'", value));
        }
        Ok(Self {
            item_id: ItemId::new(id),
            quantity,
        })
    }
}

/// `NAME:CATEGORY:PRICE:QTY` as given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemArg(pub ItemDraft);

impl FromStr for ItemArg {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = value.split(':').map(str::trim).collect();
        let [name, category, price, quantity] = parts.as_slice() else {
            return Err(format!("expected NAME:CATEGORY:PRICE:QTY, got '{}'", value));
        };
        let price = price
            .parse::<Decimal>()
            .map_err(|e| format!("invalid price '{}': {}", price, e))?;
        let quantity = quantity
            .parse::<u32>()
            .map_err(|e| format!("invalid quantity '{}': {}", quantity, e))?;
        Ok(Self(ItemDraft::new(*name, *category, price, quantity)))
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(deadline) = self.deadline_ms {
            validate_range("--deadline-ms", deadline, 1, 600_000)?;
        }
        for line in self.add.iter().chain(&self.restock) {
            validate_range(
                &format!("quantity for {}", line.item_id),
                line.quantity,
                1,
                i64::from(u32::MAX),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_args() {
        assert_eq!(
            "choc-1:3".parse::<LineArg>().unwrap(),
            LineArg {
                item_id: ItemId::new("choc-1"),
                quantity: 3
            }
        );
        assert_eq!("choc-1".parse::<LineArg>().unwrap().quantity, 1);
        assert_eq!("choc-1:-1".parse::<LineArg>().unwrap().quantity, -1);
        assert!(":4".parse::<LineArg>().is_err());
        assert!("choc-1:many".parse::<LineArg>().is_err());
    }

    #[test]
    fn test_parse_item_args() {
        let ItemArg(draft) = "Kaju Katli:Candy:120.50:8".parse::<ItemArg>().unwrap();
        assert_eq!(draft.name, "Kaju Katli");
        assert_eq!(draft.category, "Candy");
        assert_eq!(draft.price, Decimal::new(12050, 2));
        assert_eq!(draft.quantity, 8);

        assert!("Kaju Katli:Candy:120".parse::<ItemArg>().is_err());
        assert!("Kaju Katli:Candy:cheap:8".parse::<ItemArg>().is_err());
        assert!("Kaju Katli:Candy:120:-1".parse::<ItemArg>().is_err());
    }

    #[test]
    fn test_cli_parsing_and_validation() {
        let config = CliConfig::parse_from([
            "storefront",
            "--add",
            "a:2",
            "--add",
            "b",
            "--set",
            "a:0",
            "--remove",
            "b",
            "--dry-run",
        ]);
        assert_eq!(config.add.len(), 2);
        assert_eq!(config.set[0].quantity, 0);
        assert_eq!(config.remove, vec!["b".to_string()]);
        assert!(config.dry_run);
        assert!(config.validate().is_ok());

        let config = CliConfig::parse_from(["storefront", "--add", "a:0"]);
        assert!(config.validate().is_err());
    }
}
