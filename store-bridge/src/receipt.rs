//! Receipt acquisition
//!
//! A purchase cannot be handed to the caller without proof of payment.
//! The fetcher tries the cheapest source first and escalates: receipt
//! data attached to the transaction, then the store's local cache, then
//! a store-side refresh followed by a second cache read.

use shared::error::{BridgeError, BridgeResult};
use shared::models::Transaction;
use std::sync::Arc;
use tracing::debug;

use crate::store::StoreService;

#[derive(Debug, Clone)]
pub struct ReceiptFetcher {
    store: Arc<dyn StoreService>,
}

impl ReceiptFetcher {
    pub fn new(store: Arc<dyn StoreService>) -> Self {
        Self { store }
    }

    /// Produce receipt data for a transaction
    ///
    /// Fails with a network error when even a refresh leaves the store
    /// without receipt data.
    pub async fn fetch(&self, transaction: &Transaction) -> BridgeResult<String> {
        if let Some(receipt) = transaction.receipt_ref.clone() {
            return Ok(receipt);
        }
        if let Some(receipt) = self.store.cached_receipt().await {
            return Ok(receipt);
        }
        debug!(
            transaction_id = %transaction.id,
            "No cached receipt, asking the store for a refresh"
        );
        self.store.refresh_receipt().await?;
        if let Some(receipt) = self.store.cached_receipt().await {
            return Ok(receipt);
        }
        Err(BridgeError::network(
            "Could not fetch a receipt for the transaction",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use shared::error::ErrorCode;
    use shared::models::TransactionState;

    fn purchased(id: &str) -> Transaction {
        Transaction::new(id, TransactionState::Purchased, "gold.100")
    }

    #[tokio::test]
    async fn test_transaction_receipt_wins_without_store_calls() {
        let (store, _events) = MemoryStore::new();
        store.set_cached_receipt(Some("cached".to_string()));
        let fetcher = ReceiptFetcher::new(store.clone());

        let mut transaction = purchased("t1");
        transaction.receipt_ref = Some("attached".to_string());

        let receipt = fetcher.fetch(&transaction).await.unwrap();
        assert_eq!(receipt, "attached");
        assert_eq!(store.receipt_reads(), 0);
        assert_eq!(store.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_cached_receipt_avoids_refresh() {
        let (store, _events) = MemoryStore::new();
        store.set_cached_receipt(Some("cached".to_string()));
        let fetcher = ReceiptFetcher::new(store.clone());

        let receipt = fetcher.fetch(&purchased("t1")).await.unwrap();
        assert_eq!(receipt, "cached");
        assert_eq!(store.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_refresh_then_reread() {
        let (store, _events) = MemoryStore::new();
        store.set_receipt_after_refresh(Some("fresh".to_string()));
        let fetcher = ReceiptFetcher::new(store.clone());

        let receipt = fetcher.fetch(&purchased("t1")).await.unwrap();
        assert_eq!(receipt, "fresh");
        assert_eq!(store.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_propagates() {
        let (store, _events) = MemoryStore::new();
        store.set_refresh_failure(Some(BridgeError::server("Receipt service unavailable")));
        let fetcher = ReceiptFetcher::new(store.clone());

        let err = fetcher.fetch(&purchased("t1")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ServerError);
    }

    #[tokio::test]
    async fn test_no_receipt_anywhere_is_a_network_error() {
        let (store, _events) = MemoryStore::new();
        let fetcher = ReceiptFetcher::new(store.clone());

        let err = fetcher.fetch(&purchased("t1")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NetworkError);
        assert_eq!(store.refresh_calls(), 1);
    }
}
