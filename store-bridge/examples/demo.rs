//! End-to-end bridge walkthrough against the in-memory store
//!
//! Lists a small catalog, buys one product, and finalizes the purchase.
//!
//! Run: cargo run --example demo

use rust_decimal::Decimal;
use store_bridge::{BridgeConfig, ConfiguredProduct, MemoryStore, StoreBridge, StoreProduct};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("store_bridge=debug")),
        )
        .init();

    let (store, events) = MemoryStore::new();
    store.insert_product(StoreProduct {
        internal_product_id: "com.example.gold100".to_string(),
        price: Decimal::new(99, 2),
        currency: "EUR".to_string(),
    });
    store.insert_product(StoreProduct {
        internal_product_id: "com.example.gems10".to_string(),
        price: Decimal::new(499, 2),
        currency: "EUR".to_string(),
    });
    store.set_auto_purchase(true);
    store.set_cached_receipt(Some("demo-receipt".to_string()));

    let config = BridgeConfig::new().with_obfuscation_salt("demo-salt");
    let bridge = StoreBridge::start(config, store.clone(), events);

    println!("📦 Listing products...");
    let listing = bridge
        .list_products(vec![
            ConfiguredProduct {
                product_id: "gold100".to_string(),
                app_store_id: Some("com.example.gold100".to_string()),
                googleplay_id: None,
            },
            ConfiguredProduct {
                product_id: "gems10".to_string(),
                app_store_id: Some("com.example.gems10".to_string()),
                googleplay_id: None,
            },
        ])
        .await?;
    for product in &listing {
        println!(
            "   {} -> {} {} ({})",
            product.product_id, product.price, product.currency, product.internal_product_id
        );
    }

    println!("💳 Purchasing {}...", listing[0].product_id);
    let purchased = bridge
        .launch_purchase(listing[0].clone(), "demo-user")
        .await?;
    println!(
        "   Got {} for {} {}, token {}",
        purchased.product_id, purchased.paid_price, purchased.paid_currency, purchased.token
    );

    println!("✅ Acknowledging delivery...");
    bridge.terminate_purchase(&purchased.token).await?;
    println!(
        "   Store finalized transactions: {:?}",
        store.finished_transactions()
    );

    bridge.shutdown().await;
    Ok(())
}
