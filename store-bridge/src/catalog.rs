//! Product catalog resolution
//!
//! Turns backend catalog entries into store-priced listings. Each call
//! queries the platform store for the SKUs configured for the active
//! platform and joins the answer back onto the entries that asked.

use shared::error::{BridgeError, BridgeResult, ErrorCategory};
use shared::models::{ConfiguredProduct, ProductInfo, StoreType};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::registry::RequestRegistry;
use crate::store::{StoreProduct, StoreService};

#[derive(Debug)]
pub struct CatalogResolver {
    store: Arc<dyn StoreService>,
    store_type: StoreType,
    listings: RequestRegistry<(), Vec<StoreProduct>>,
}

impl CatalogResolver {
    pub fn new(store: Arc<dyn StoreService>, store_type: StoreType) -> Self {
        Self {
            store,
            store_type,
            listings: RequestRegistry::new(),
        }
    }

    /// Enrich configured products with the store's pricing
    ///
    /// Entries without a SKU for the active platform, and entries the
    /// store does not recognize, are left out of the result.
    pub async fn list_products(
        &self,
        products: Vec<ConfiguredProduct>,
    ) -> BridgeResult<Vec<ProductInfo>> {
        if products.is_empty() {
            return Err(BridgeError::bad_parameters("No products to list"));
        }
        let store_ids: Vec<String> = products
            .iter()
            .filter_map(|product| product.store_id(self.store_type))
            .map(str::to_string)
            .collect();
        if store_ids.is_empty() {
            return Err(BridgeError::bad_parameters(
                "None of the products are configured for this store",
            ));
        }

        let query = Uuid::new_v4();
        debug!(%query, count = store_ids.len(), "Querying store for products");

        // Register before sending: the response can arrive on the dispatch
        // task before query_products returns.
        let rx = self.listings.register(query, ())?;
        if let Err(err) = self.store.query_products(query, store_ids).await {
            self.listings.discard(&query);
            return Err(err);
        }

        let store_products = rx
            .await
            .map_err(|_| BridgeError::internal("Product query dropped without a response"))??;
        Ok(resolve_listing(&products, store_products, self.store_type))
    }

    /// Hand a store response to the query that is waiting for it
    pub fn complete(&self, query: Uuid, result: BridgeResult<Vec<StoreProduct>>) {
        if let Err(err) = &result {
            match err.code.category() {
                ErrorCategory::Session => {
                    warn!(%query, code = %err.code, "Product query failed: {}", err)
                }
                _ => debug!(%query, code = %err.code, "Product query failed: {}", err),
            }
        }
        if !self.listings.resolve(&query, result) {
            debug!(%query, "Dropping products response for unknown query");
        }
    }

    /// Fail every listing still in flight. Teardown only.
    pub fn cancel_all(&self, err: BridgeError) -> usize {
        self.listings.cancel_all(err)
    }
}

/// Join store pricing onto the configured entries that asked for it
fn resolve_listing(
    configured: &[ConfiguredProduct],
    store_products: Vec<StoreProduct>,
    store_type: StoreType,
) -> Vec<ProductInfo> {
    let mut by_sku: HashMap<&str, &ConfiguredProduct> = configured
        .iter()
        .filter_map(|product| product.store_id(store_type).map(|sku| (sku, product)))
        .collect();

    let mut listing = Vec::with_capacity(store_products.len());
    for store_product in store_products {
        match by_sku.remove(store_product.internal_product_id.as_str()) {
            Some(entry) => listing.push(ProductInfo {
                product_id: entry.product_id.clone(),
                price: store_product.price,
                currency: store_product.currency,
                internal_product_id: store_product.internal_product_id,
            }),
            None => debug!(
                internal_product_id = %store_product.internal_product_id,
                "Store returned a product no catalog entry asked for"
            ),
        }
    }
    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreEvent};
    use rust_decimal::Decimal;
    use shared::error::ErrorCode;

    fn configured(product_id: &str, sku: &str) -> ConfiguredProduct {
        ConfiguredProduct {
            product_id: product_id.to_string(),
            app_store_id: Some(sku.to_string()),
            googleplay_id: None,
        }
    }

    fn store_product(sku: &str, cents: i64) -> StoreProduct {
        StoreProduct {
            internal_product_id: sku.to_string(),
            price: Decimal::new(cents, 2),
            currency: "EUR".to_string(),
        }
    }

    #[test]
    fn test_resolve_listing_joins_on_sku() {
        let entries = vec![
            configured("gold100", "com.example.gold100"),
            configured("gems10", "com.example.gems10"),
        ];
        let answer = vec![
            store_product("com.example.gems10", 199),
            store_product("com.example.gold100", 99),
        ];

        let listing = resolve_listing(&entries, answer, StoreType::Appstore);
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].product_id, "gems10");
        assert_eq!(listing[0].price, Decimal::new(199, 2));
        assert_eq!(listing[1].product_id, "gold100");
        assert_eq!(listing[1].internal_product_id, "com.example.gold100");
    }

    #[test]
    fn test_resolve_listing_drops_unrequested_store_products() {
        let entries = vec![configured("gold100", "com.example.gold100")];
        let answer = vec![
            store_product("com.example.gold100", 99),
            store_product("com.example.mystery", 999),
        ];

        let listing = resolve_listing(&entries, answer, StoreType::Appstore);
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].product_id, "gold100");
    }

    #[tokio::test]
    async fn test_empty_input_never_reaches_the_store() {
        let (store, _events) = MemoryStore::new();
        let catalog = CatalogResolver::new(store.clone(), StoreType::Appstore);

        let err = catalog.list_products(Vec::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BadParameters);
        assert!(store.recorded_queries().is_empty());
    }

    #[tokio::test]
    async fn test_no_skus_for_platform_never_reaches_the_store() {
        let (store, _events) = MemoryStore::new();
        let catalog = CatalogResolver::new(store.clone(), StoreType::Googleplay);

        // Configured for the App Store only
        let err = catalog
            .list_products(vec![configured("gold100", "com.example.gold100")])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BadParameters);
        assert!(store.recorded_queries().is_empty());
    }

    #[tokio::test]
    async fn test_list_products_round_trip() {
        let (store, mut events) = MemoryStore::new();
        store.insert_product(store_product("com.example.gold100", 99));
        let catalog = Arc::new(CatalogResolver::new(store.clone(), StoreType::Appstore));

        // Stand-in for the bridge dispatch loop
        let pump = {
            let catalog = Arc::clone(&catalog);
            tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    if let StoreEvent::ProductsResponse { query, result } = event {
                        catalog.complete(query, result);
                    }
                }
            })
        };

        let listing = catalog
            .list_products(vec![
                configured("gold100", "com.example.gold100"),
                configured("unknown", "com.example.unknown"),
            ])
            .await
            .unwrap();

        // The store only knows one of the two SKUs
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].product_id, "gold100");
        assert_eq!(listing[0].currency, "EUR");

        pump.abort();
    }

    #[tokio::test]
    async fn test_send_failure_unregisters_the_query() {
        let (store, _events) = MemoryStore::new();
        store.set_query_failure(Some(BridgeError::network("Store unreachable")));
        let catalog = CatalogResolver::new(store.clone(), StoreType::Appstore);

        let err = catalog
            .list_products(vec![configured("gold100", "com.example.gold100")])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NetworkError);
        assert_eq!(catalog.cancel_all(BridgeError::canceled("test")), 0);
    }
}
