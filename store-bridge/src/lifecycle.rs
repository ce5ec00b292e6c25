//! Transaction lifecycle management
//!
//! Routes transaction updates from the store to the purchase requests
//! waiting on them, parks updates nobody asked for, and finalizes
//! transactions with the store at the right moment: failed ones
//! immediately, delivered ones only once the application acknowledges
//! them through `terminate_purchase`.

use shared::error::{BridgeError, BridgeResult, ErrorCode};
use shared::models::{ProductInfo, PurchasedProduct, StoreType, Transaction, TransactionState};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::pending::{PendingClaim, PendingQueue};
use crate::receipt::ReceiptFetcher;
use crate::registry::RequestRegistry;
use crate::store::{PaymentOrder, StoreService};
use crate::util::user_digest;

#[derive(Debug)]
pub struct LifecycleManager {
    store: Arc<dyn StoreService>,
    store_type: StoreType,
    obfuscation_salt: Option<String>,
    requests: RequestRegistry<ProductInfo, PurchasedProduct>,
    pending: Arc<PendingQueue>,
    receipts: ReceiptFetcher,
    /// Delivered transactions waiting for the application to acknowledge
    awaiting_finalize: Arc<Mutex<HashMap<String, Transaction>>>,
}

impl LifecycleManager {
    pub fn new(
        store: Arc<dyn StoreService>,
        store_type: StoreType,
        obfuscation_salt: Option<String>,
    ) -> Self {
        Self {
            receipts: ReceiptFetcher::new(Arc::clone(&store)),
            store,
            store_type,
            obfuscation_salt,
            requests: RequestRegistry::new(),
            pending: Arc::new(PendingQueue::new()),
            awaiting_finalize: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Start a payment flow and wait for its outcome
    pub async fn launch_purchase(
        &self,
        product: ProductInfo,
        user_id: &str,
    ) -> BridgeResult<PurchasedProduct> {
        if product.internal_product_id.is_empty() {
            return Err(BridgeError::bad_parameters(
                "Product has no store identifier",
            ));
        }
        if user_id.is_empty() {
            return Err(BridgeError::with_message(
                ErrorCode::NotLoggedIn,
                "A user must be logged in to purchase",
            ));
        }

        // The store may have decided this purchase before anyone asked for
        // it (restores, interrupted sessions). Serve those before charging
        // the user again.
        if let Some(parked) = self.pending.claim_for_product(&product.internal_product_id) {
            info!(
                transaction_id = %parked.id,
                internal_product_id = %parked.internal_product_id,
                "Delivering a parked transaction instead of launching a payment"
            );
            return deliver(
                self.receipts.clone(),
                Arc::clone(&self.pending),
                Arc::clone(&self.awaiting_finalize),
                self.store_type,
                product,
                parked,
            )
            .await;
        }

        let request = Uuid::new_v4();
        let order = PaymentOrder {
            internal_product_id: product.internal_product_id.clone(),
            user_digest: user_digest(self.obfuscation_salt.as_deref(), user_id),
        };
        debug!(%request, internal_product_id = %order.internal_product_id, "Launching payment");

        // Register before launching: the store can report the transaction
        // before launch_payment returns.
        let rx = self.requests.register(request, product)?;
        if let Err(err) = self.store.launch_payment(order).await {
            self.requests.discard(&request);
            return Err(err);
        }

        rx.await
            .map_err(|_| BridgeError::internal("Purchase request dropped without an outcome"))?
    }

    /// Acknowledge a delivered purchase and close it out with the store
    pub async fn terminate_purchase(&self, token: &str) -> BridgeResult<()> {
        let delivered = self.awaiting_finalize.lock().unwrap().remove(token);
        if let Some(transaction) = delivered {
            debug!(transaction_id = %transaction.id, "Finalizing delivered transaction");
            return self.store.finish_transaction(&transaction.id).await;
        }

        match self.pending.claim_decided(token) {
            PendingClaim::Claimed(transaction) => {
                // The application never requested this one but chose to
                // discard it. It is decided, so finalizing is safe.
                debug!(transaction_id = %transaction.id, "Finalizing parked transaction");
                self.store.finish_transaction(&transaction.id).await
            }
            PendingClaim::Held(state) => Err(BridgeError::logic(format!(
                "Transaction {} is still {:?} and cannot be finalized",
                token, state
            ))),
            PendingClaim::NotFound => {
                Err(BridgeError::logic(format!("Unknown transaction {}", token)))
            }
        }
    }

    /// Route a transaction update to whoever is waiting on it
    pub async fn handle_update(&self, transaction: Transaction) {
        match transaction.state {
            TransactionState::Purchasing => {
                debug!(
                    transaction_id = %transaction.id,
                    internal_product_id = %transaction.internal_product_id,
                    "Payment sheet in progress"
                );
            }
            TransactionState::Deferred => {
                // Stays open with the store; a later update decides it
                info!(
                    transaction_id = %transaction.id,
                    internal_product_id = %transaction.internal_product_id,
                    "Purchase deferred, awaiting external approval"
                );
            }
            TransactionState::Failed => self.handle_failed(transaction).await,
            TransactionState::Purchased | TransactionState::Restored => {
                self.handle_deliverable(transaction);
            }
        }
    }

    async fn handle_failed(&self, transaction: Transaction) {
        let claimed = self
            .requests
            .claim_latest(|key| key.internal_product_id == transaction.internal_product_id);
        match claimed {
            Some(request) => {
                let err = match &transaction.failure {
                    Some(failure) if failure.canceled => {
                        BridgeError::canceled("Purchase canceled by user")
                    }
                    Some(failure) => BridgeError::store(failure.message.clone()),
                    None => BridgeError::store("Purchase failed"),
                };
                info!(
                    transaction_id = %transaction.id,
                    code = %err.code,
                    "Purchase failed: {}",
                    err
                );
                request.complete(Err(err));
            }
            None => debug!(
                transaction_id = %transaction.id,
                "No requester waiting for the failed transaction"
            ),
        }

        // Nothing to deliver, so the transaction is closed out right away.
        if let Err(err) = self.store.finish_transaction(&transaction.id).await {
            warn!(
                transaction_id = %transaction.id,
                "Could not finalize failed transaction: {}",
                err
            );
        }
    }

    fn handle_deliverable(&self, transaction: Transaction) {
        let claimed = self
            .requests
            .claim_latest(|key| key.internal_product_id == transaction.internal_product_id);
        match claimed {
            Some(request) => {
                // Receipt fetching must not block the update stream
                let receipts = self.receipts.clone();
                let pending = Arc::clone(&self.pending);
                let awaiting = Arc::clone(&self.awaiting_finalize);
                let store_type = self.store_type;
                tokio::spawn(async move {
                    let product = request.key.clone();
                    let outcome =
                        deliver(receipts, pending, awaiting, store_type, product, transaction)
                            .await;
                    request.complete(outcome);
                });
            }
            None => self.pending.enqueue(transaction),
        }
    }

    /// Fail every outstanding purchase request. Teardown only.
    pub fn cancel_all(&self, err: BridgeError) -> usize {
        self.requests.cancel_all(err)
    }

    /// Number of parked transactions still waiting for a requester
    pub fn pending_deliveries(&self) -> usize {
        self.pending.len()
    }
}

/// Turn a deliverable transaction into the purchase payload
///
/// The transaction enters `awaiting_finalize` before the outcome is
/// returned, so a terminate call issued right after the callback always
/// finds it. On receipt failure the transaction is parked instead; the
/// user already paid and a later launch for the same product claims it.
async fn deliver(
    receipts: ReceiptFetcher,
    pending: Arc<PendingQueue>,
    awaiting_finalize: Arc<Mutex<HashMap<String, Transaction>>>,
    store_type: StoreType,
    product: ProductInfo,
    transaction: Transaction,
) -> BridgeResult<PurchasedProduct> {
    match receipts.fetch(&transaction).await {
        Ok(receipt) => {
            let purchased = PurchasedProduct {
                store_type,
                product_id: product.product_id,
                internal_product_id: transaction.internal_product_id.clone(),
                paid_price: product.price,
                paid_currency: product.currency,
                receipt,
                token: transaction.id.clone(),
            };
            awaiting_finalize
                .lock()
                .unwrap()
                .insert(transaction.id.clone(), transaction);
            Ok(purchased)
        }
        Err(err) => {
            warn!(
                transaction_id = %transaction.id,
                "Receipt fetch failed, parking the transaction: {}",
                err
            );
            pending.enqueue(transaction);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;

    fn product_info(product_id: &str, sku: &str) -> ProductInfo {
        ProductInfo {
            product_id: product_id.to_string(),
            price: Decimal::new(99, 2),
            currency: "EUR".to_string(),
            internal_product_id: sku.to_string(),
        }
    }

    fn manager(store: Arc<MemoryStore>) -> LifecycleManager {
        LifecycleManager::new(store, StoreType::Appstore, None)
    }

    #[tokio::test]
    async fn test_launch_requires_store_identifier() {
        let (store, _events) = MemoryStore::new();
        let manager = manager(store.clone());

        let err = manager
            .launch_purchase(product_info("gold100", ""), "alice")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BadParameters);
        assert!(store.recorded_payments().is_empty());
    }

    #[tokio::test]
    async fn test_launch_requires_a_user() {
        let (store, _events) = MemoryStore::new();
        let manager = manager(store.clone());

        let err = manager
            .launch_purchase(product_info("gold100", "com.example.gold100"), "")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotLoggedIn);
        assert!(store.recorded_payments().is_empty());
    }

    #[tokio::test]
    async fn test_failed_transaction_is_finalized_without_receipts() {
        let (store, _events) = MemoryStore::new();
        let manager = manager(store.clone());

        let mut failed = Transaction::new("t1", TransactionState::Failed, "com.example.gold100");
        failed.failure = Some(shared::models::TransactionFailure {
            canceled: false,
            message: "Card declined".to_string(),
        });
        manager.handle_update(failed).await;

        assert_eq!(store.finished_transactions(), vec!["t1".to_string()]);
        assert_eq!(store.receipt_reads(), 0);
        assert_eq!(store.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_parked_purchase_is_served_without_a_payment() {
        let (store, _events) = MemoryStore::new();
        let manager = manager(store.clone());

        let mut parked = Transaction::new("t1", TransactionState::Purchased, "com.example.gold100");
        parked.receipt_ref = Some("receipt".to_string());
        manager.handle_update(parked).await;
        assert_eq!(manager.pending_deliveries(), 1);

        let purchased = manager
            .launch_purchase(product_info("gold100", "com.example.gold100"), "alice")
            .await
            .unwrap();
        assert_eq!(purchased.token, "t1");
        assert_eq!(purchased.receipt, "receipt");
        assert!(store.recorded_payments().is_empty());
        assert_eq!(manager.pending_deliveries(), 0);
    }

    #[tokio::test]
    async fn test_terminate_unknown_token() {
        let (store, _events) = MemoryStore::new();
        let manager = manager(store);

        let err = manager.terminate_purchase("t9").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LogicError);
    }

    #[tokio::test]
    async fn test_terminate_holds_undecided_pending_transaction() {
        let (store, _events) = MemoryStore::new();
        let manager = manager(store.clone());

        manager.pending.enqueue(Transaction::new(
            "t1",
            TransactionState::Purchasing,
            "com.example.gold100",
        ));

        let err = manager.terminate_purchase("t1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LogicError);
        // Still parked, a later update can decide it
        assert_eq!(manager.pending_deliveries(), 1);
        assert!(store.finished_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_terminate_finalizes_parked_deliverable() {
        let (store, _events) = MemoryStore::new();
        let manager = manager(store.clone());

        manager
            .handle_update(Transaction::new(
                "t1",
                TransactionState::Purchased,
                "com.example.gold100",
            ))
            .await;

        manager.terminate_purchase("t1").await.unwrap();
        assert_eq!(store.finished_transactions(), vec!["t1".to_string()]);
        assert_eq!(manager.pending_deliveries(), 0);
    }
}
