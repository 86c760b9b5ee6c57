use clap::Parser;
use storefront::core::admin::StockLevel;
use storefront::domain::model::{CatalogQuery, UserId, CATEGORIES};
use storefront::utils::error::ErrorSeverity;
use storefront::utils::money::format_inr;
use storefront::utils::{logger, validation::Validate};
use storefront::{CliConfig, StoreError, StorefrontConfig, StorefrontSession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting storefront");
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = cli.validate() {
        tracing::error!("Invalid arguments: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let mut config = match StorefrontConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };
    if let Some(deadline) = cli.deadline_ms {
        config.checkout.deadline_ms = Some(deadline);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let user = cli.user.clone().map(UserId);
    let exit_code = match run(&cli, &config, user).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("Storefront run failed: {} (severity: {:?})", e, e.severity());
            tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            }
        }
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

async fn run(
    cli: &CliConfig,
    config: &StorefrontConfig,
    user: Option<UserId>,
) -> Result<(), StoreError> {
    let mut session = StorefrontSession::from_config(config, user)?;

    for line in &cli.restock {
        session
            .restock(&line.item_id, u32::try_from(line.quantity).unwrap_or(u32::MAX))
            .await?;
    }

    for item in &cli.new_items {
        let created = session.add_item(&item.0).await?;
        println!("Created {} as {}", created.name, created.id);
    }
    for id in &cli.delete_items {
        session.delete_item(&id.as_str().into()).await?;
    }

    let mut query = CatalogQuery::all();
    if let Some(search) = &cli.search {
        query = query.with_search(search.clone());
    }
    if let Some(category) = &cli.category {
        if category != "all" && !CATEGORIES.contains(&category.as_str()) {
            tracing::warn!("Unknown category '{}', expected one of {:?}", category, CATEGORIES);
        }
        query = query.with_category(category.clone());
    }
    println!("Catalog:");
    for item in session.browse(&query).await? {
        let stock = match StockLevel::classify(item.available_quantity) {
            StockLevel::OutOfStock => "out of stock".to_string(),
            StockLevel::Low => format!("{} left (low)", item.available_quantity),
            StockLevel::InStock => format!("{} left", item.available_quantity),
        };
        println!(
            "  {:<12} {:<24} {:<12} {:>12}  {}",
            item.id,
            item.name,
            item.category,
            format_inr(item.price),
            stock
        );
    }

    if cli.summary {
        let summary = session.inventory_summary().await?;
        println!(
            "Inventory: {} items, {} low on stock, {} out of stock",
            summary.total_items, summary.low_stock, summary.out_of_stock
        );
    }

    for line in &cli.add {
        let quantity = u32::try_from(line.quantity).unwrap_or(u32::MAX);
        session.add_to_cart(&line.item_id, quantity).await?;
    }
    for line in &cli.set {
        session.cart_mut().set_quantity(&line.item_id, line.quantity);
    }
    for id in &cli.remove {
        session.cart_mut().remove(&id.as_str().into());
    }

    let totals = session.cart().totals();
    println!("Cart ({} items):", totals.total_items);
    for line in session.cart().lines() {
        println!(
            "  {:<24} x{:<4} {:>12}",
            line.item.name,
            line.quantity,
            format_inr(line.line_total())
        );
    }
    println!("Total: {}", format_inr(totals.total_price));

    if cli.dry_run {
        tracing::info!("Dry run, skipping checkout");
        return Ok(());
    }

    match session.checkout().await {
        Ok(receipt) => {
            println!(
                "✅ Order placed: {} lines, {}",
                receipt.lines.len(),
                format_inr(receipt.totals.total_price)
            );
        }
        Err(e) => {
            if let Some(failure) = e.partial_failure() {
                let committed: Vec<String> = failure
                    .committed_item_ids()
                    .iter()
                    .map(|id| id.to_string())
                    .collect();
                if !committed.is_empty() {
                    eprintln!("⚠️  Already purchased: {}", committed.join(", "));
                }
            }
            return Err(e.into());
        }
    }

    if cli.history {
        println!("Order history:");
        for purchase in session.order_history().await? {
            let name = purchase
                .item
                .as_ref()
                .map(|item| item.name.as_str())
                .unwrap_or("(removed item)");
            println!(
                "  {}  {:<24} x{:<4} {:>12}",
                purchase.created_at.format("%Y-%m-%d %H:%M"),
                name,
                purchase.quantity,
                format_inr(purchase.total_price)
            );
        }
        if let Some(stats) = session.order_stats().await? {
            println!(
                "Orders: {}, spent: {}, favorite: {}",
                stats.total_orders,
                format_inr(stats.total_spent),
                stats.favorite_category.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}
