//! In-memory store implementation (for In-Process testing)
//!
//! Behaves like a scriptable platform store: a seeded catalog, injectable
//! failures, and optional automatic responses. Every command is recorded
//! so tests can assert on exactly what the bridge asked for.

use async_trait::async_trait;
use shared::error::{BridgeError, BridgeResult};
use shared::models::{Transaction, TransactionState};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::store::{PaymentOrder, StoreEvent, StoreProduct, StoreService};

/// Scriptable in-memory [`StoreService`]
#[derive(Debug)]
pub struct MemoryStore {
    /// Products the store knows, keyed by store-side SKU
    catalog: Mutex<HashMap<String, StoreProduct>>,
    /// Receipt data returned by `cached_receipt`
    receipt: Mutex<Option<String>>,
    /// Receipt data that becomes available after the next `refresh_receipt`
    receipt_after_refresh: Mutex<Option<String>>,
    query_failure: Mutex<Option<BridgeError>>,
    payment_failure: Mutex<Option<BridgeError>>,
    refresh_failure: Mutex<Option<BridgeError>>,
    /// When set, each query is answered from the catalog immediately
    auto_answer_queries: AtomicBool,
    /// When set, each payment produces a Purchasing then a Purchased update
    auto_purchase: AtomicBool,
    next_transaction: AtomicU64,
    queries: Mutex<Vec<(Uuid, Vec<String>)>>,
    payments: Mutex<Vec<PaymentOrder>>,
    finished: Mutex<Vec<String>>,
    refresh_calls: AtomicUsize,
    receipt_reads: AtomicUsize,
    /// Event channel into the bridge dispatch loop
    events: mpsc::UnboundedSender<StoreEvent>,
}

impl MemoryStore {
    /// Create a store together with the event stream the bridge consumes
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<StoreEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = Self {
            catalog: Mutex::new(HashMap::new()),
            receipt: Mutex::new(None),
            receipt_after_refresh: Mutex::new(None),
            query_failure: Mutex::new(None),
            payment_failure: Mutex::new(None),
            refresh_failure: Mutex::new(None),
            auto_answer_queries: AtomicBool::new(true),
            auto_purchase: AtomicBool::new(false),
            next_transaction: AtomicU64::new(1),
            queries: Mutex::new(Vec::new()),
            payments: Mutex::new(Vec::new()),
            finished: Mutex::new(Vec::new()),
            refresh_calls: AtomicUsize::new(0),
            receipt_reads: AtomicUsize::new(0),
            events: tx,
        };
        (Arc::new(store), rx)
    }

    // ==================== Scripting ====================

    pub fn insert_product(&self, product: StoreProduct) {
        self.catalog
            .lock()
            .unwrap()
            .insert(product.internal_product_id.clone(), product);
    }

    pub fn set_cached_receipt(&self, receipt: Option<String>) {
        *self.receipt.lock().unwrap() = receipt;
    }

    /// Make receipt data appear once the bridge asks for a refresh
    pub fn set_receipt_after_refresh(&self, receipt: Option<String>) {
        *self.receipt_after_refresh.lock().unwrap() = receipt;
    }

    pub fn set_query_failure(&self, err: Option<BridgeError>) {
        *self.query_failure.lock().unwrap() = err;
    }

    pub fn set_payment_failure(&self, err: Option<BridgeError>) {
        *self.payment_failure.lock().unwrap() = err;
    }

    pub fn set_refresh_failure(&self, err: Option<BridgeError>) {
        *self.refresh_failure.lock().unwrap() = err;
    }

    pub fn set_auto_answer_queries(&self, enabled: bool) {
        self.auto_answer_queries.store(enabled, Ordering::SeqCst);
    }

    pub fn set_auto_purchase(&self, enabled: bool) {
        self.auto_purchase.store(enabled, Ordering::SeqCst);
    }

    /// Emit a transaction update as if the store reported it
    pub fn push_transaction(&self, transaction: Transaction) {
        let _ = self.events.send(StoreEvent::TransactionUpdated(transaction));
    }

    /// Emit a products response for a specific query
    pub fn push_products_response(&self, query: Uuid, result: BridgeResult<Vec<StoreProduct>>) {
        let _ = self.events.send(StoreEvent::ProductsResponse { query, result });
    }

    // ==================== Recorders ====================

    pub fn recorded_queries(&self) -> Vec<(Uuid, Vec<String>)> {
        self.queries.lock().unwrap().clone()
    }

    pub fn recorded_payments(&self) -> Vec<PaymentOrder> {
        self.payments.lock().unwrap().clone()
    }

    pub fn finished_transactions(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn receipt_reads(&self) -> usize {
        self.receipt_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreService for MemoryStore {
    async fn query_products(&self, query: Uuid, store_ids: Vec<String>) -> BridgeResult<()> {
        self.queries.lock().unwrap().push((query, store_ids.clone()));
        if let Some(err) = self.query_failure.lock().unwrap().clone() {
            return Err(err);
        }
        if self.auto_answer_queries.load(Ordering::SeqCst) {
            // Unknown SKUs are left out of the answer, like a real store
            let catalog = self.catalog.lock().unwrap();
            let products: Vec<StoreProduct> = store_ids
                .iter()
                .filter_map(|id| catalog.get(id).cloned())
                .collect();
            let _ = self.events.send(StoreEvent::ProductsResponse {
                query,
                result: Ok(products),
            });
        }
        Ok(())
    }

    async fn launch_payment(&self, order: PaymentOrder) -> BridgeResult<()> {
        let sku = order.internal_product_id.clone();
        self.payments.lock().unwrap().push(order);
        if let Some(err) = self.payment_failure.lock().unwrap().clone() {
            return Err(err);
        }
        if self.auto_purchase.load(Ordering::SeqCst) {
            let id = format!(
                "txn-{}",
                self.next_transaction.fetch_add(1, Ordering::SeqCst)
            );
            let _ = self.events.send(StoreEvent::TransactionUpdated(
                Transaction::new(&id, TransactionState::Purchasing, &sku),
            ));
            let _ = self.events.send(StoreEvent::TransactionUpdated(
                Transaction::new(&id, TransactionState::Purchased, &sku),
            ));
        }
        Ok(())
    }

    async fn finish_transaction(&self, transaction_id: &str) -> BridgeResult<()> {
        self.finished.lock().unwrap().push(transaction_id.to_string());
        Ok(())
    }

    async fn cached_receipt(&self) -> Option<String> {
        self.receipt_reads.fetch_add(1, Ordering::SeqCst);
        self.receipt.lock().unwrap().clone()
    }

    async fn refresh_receipt(&self) -> BridgeResult<()> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.refresh_failure.lock().unwrap().clone() {
            return Err(err);
        }
        if let Some(receipt) = self.receipt_after_refresh.lock().unwrap().take() {
            *self.receipt.lock().unwrap() = Some(receipt);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(sku: &str, cents: i64) -> StoreProduct {
        StoreProduct {
            internal_product_id: sku.to_string(),
            price: Decimal::new(cents, 2),
            currency: "EUR".to_string(),
        }
    }

    #[tokio::test]
    async fn test_auto_answer_serves_known_skus_only() {
        let (store, mut events) = MemoryStore::new();
        store.insert_product(product("gold.100", 99));

        let query = Uuid::new_v4();
        store
            .query_products(query, vec!["gold.100".to_string(), "gems.10".to_string()])
            .await
            .unwrap();

        match events.recv().await.unwrap() {
            StoreEvent::ProductsResponse { query: q, result } => {
                assert_eq!(q, query);
                let products = result.unwrap();
                assert_eq!(products.len(), 1);
                assert_eq!(products[0].internal_product_id, "gold.100");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(store.recorded_queries().len(), 1);
    }

    #[tokio::test]
    async fn test_auto_purchase_reports_purchasing_then_purchased() {
        let (store, mut events) = MemoryStore::new();
        store.set_auto_purchase(true);

        store
            .launch_payment(PaymentOrder {
                internal_product_id: "gold.100".to_string(),
                user_digest: "d1".to_string(),
            })
            .await
            .unwrap();

        match events.recv().await.unwrap() {
            StoreEvent::TransactionUpdated(txn) => {
                assert_eq!(txn.state, TransactionState::Purchasing);
                assert_eq!(txn.internal_product_id, "gold.100");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        match events.recv().await.unwrap() {
            StoreEvent::TransactionUpdated(txn) => {
                assert_eq!(txn.state, TransactionState::Purchased);
                assert_eq!(txn.id, "txn-1");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_refresh_makes_receipt_available() {
        let (store, _events) = MemoryStore::new();
        store.set_receipt_after_refresh(Some("receipt-data".to_string()));

        assert_eq!(store.cached_receipt().await, None);
        store.refresh_receipt().await.unwrap();
        assert_eq!(
            store.cached_receipt().await,
            Some("receipt-data".to_string())
        );
        assert_eq!(store.refresh_calls(), 1);
        assert_eq!(store.receipt_reads(), 2);
    }
}
