//! Platform store abstraction
//!
//! [`StoreService`] is the seam between the bridge and whatever billing
//! backend sits underneath it. Commands flow in through the trait; the
//! store answers asynchronously by emitting [`StoreEvent`]s on the channel
//! handed to the bridge at startup. [`MemoryStore`] is the in-process
//! implementation used by the integration tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::BridgeResult;
use shared::models::Transaction;
use uuid::Uuid;

pub mod memory;

pub use memory::MemoryStore;

/// A product as the platform store describes it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreProduct {
    /// Store-side SKU
    pub internal_product_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// ISO 4217 currency code
    pub currency: String,
}

/// Instruction to start a payment flow in the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOrder {
    /// Store-side SKU to charge for
    pub internal_product_id: String,
    /// Obfuscated account identity attached to the purchase
    pub user_digest: String,
}

/// Asynchronous notifications flowing from the store to the bridge
#[derive(Debug)]
pub enum StoreEvent {
    /// Answer to a [`StoreService::query_products`] call
    ProductsResponse {
        query: Uuid,
        result: BridgeResult<Vec<StoreProduct>>,
    },
    /// A transaction entered a new state
    TransactionUpdated(Transaction),
}

/// Commands the bridge sends to the platform store
///
/// Implementations return as soon as the command is handed off; outcomes
/// arrive later as [`StoreEvent`]s. An event may even arrive before the
/// initiating call returns, which is why callers register their interest
/// first and send second.
#[async_trait]
pub trait StoreService: Send + Sync + std::fmt::Debug {
    /// Ask the store to describe the given SKUs
    ///
    /// The answer comes back as [`StoreEvent::ProductsResponse`] tagged
    /// with `query`. SKUs the store does not know are simply absent from
    /// the response.
    async fn query_products(&self, query: Uuid, store_ids: Vec<String>) -> BridgeResult<()>;

    /// Start the platform payment flow for an order
    ///
    /// Progress is reported through [`StoreEvent::TransactionUpdated`].
    async fn launch_payment(&self, order: PaymentOrder) -> BridgeResult<()>;

    /// Tell the store a transaction's content has been delivered and it
    /// can be closed out
    async fn finish_transaction(&self, transaction_id: &str) -> BridgeResult<()>;

    /// Receipt data the store already holds locally, if any
    async fn cached_receipt(&self) -> Option<String>;

    /// Ask the store to refresh its local receipt data
    async fn refresh_receipt(&self) -> BridgeResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_product_price_serializes_as_number() {
        let product = StoreProduct {
            internal_product_id: "com.example.gold100".to_string(),
            price: Decimal::new(99, 2),
            currency: "EUR".to_string(),
        };

        // The store glue on the other side has no decimal type
        let json = serde_json::to_string(&product).unwrap();
        assert!(json.contains("\"price\":0.99"));

        let parsed: StoreProduct = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.price, Decimal::new(99, 2));
    }

    #[test]
    fn test_payment_order_shape() {
        let order = PaymentOrder {
            internal_product_id: "com.example.gold100".to_string(),
            user_digest: "ab12".to_string(),
        };

        let json = serde_json::to_string(&order).unwrap();
        assert_eq!(
            json,
            r#"{"internal_product_id":"com.example.gold100","user_digest":"ab12"}"#
        );
    }
}
