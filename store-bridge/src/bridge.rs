//! Store bridge facade
//!
//! Wires the catalog resolver and the lifecycle manager to a platform
//! store and runs the dispatch loop that feeds store events into them.
//! One bridge per store; `start` brings it up and `shutdown` tears it
//! down, failing whatever is still in flight.

use shared::error::{BridgeError, BridgeResult};
use shared::models::{ConfiguredProduct, ProductInfo, PurchasedProduct};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::catalog::CatalogResolver;
use crate::config::BridgeConfig;
use crate::lifecycle::LifecycleManager;
use crate::store::{StoreEvent, StoreService};

#[derive(Debug)]
pub struct StoreBridge {
    catalog: Arc<CatalogResolver>,
    lifecycle: Arc<LifecycleManager>,
    shutdown_token: CancellationToken,
    dispatch_handle: Mutex<Option<JoinHandle<()>>>,
}

impl StoreBridge {
    /// Bring up a bridge over the given store and start dispatching its
    /// events
    pub fn start(
        config: BridgeConfig,
        store: Arc<dyn StoreService>,
        events: mpsc::UnboundedReceiver<StoreEvent>,
    ) -> Self {
        info!(store_type = config.store_type.as_str(), "Starting store bridge");

        let catalog = Arc::new(CatalogResolver::new(Arc::clone(&store), config.store_type));
        let lifecycle = Arc::new(LifecycleManager::new(
            store,
            config.store_type,
            config.obfuscation_salt,
        ));
        let shutdown_token = CancellationToken::new();
        let dispatch_handle = tokio::spawn(dispatch_loop(
            Arc::clone(&catalog),
            Arc::clone(&lifecycle),
            events,
            shutdown_token.clone(),
        ));

        Self {
            catalog,
            lifecycle,
            shutdown_token,
            dispatch_handle: Mutex::new(Some(dispatch_handle)),
        }
    }

    /// See [`CatalogResolver::list_products`]
    pub async fn list_products(
        &self,
        products: Vec<ConfiguredProduct>,
    ) -> BridgeResult<Vec<ProductInfo>> {
        self.catalog.list_products(products).await
    }

    /// See [`LifecycleManager::launch_purchase`]
    pub async fn launch_purchase(
        &self,
        product: ProductInfo,
        user_id: &str,
    ) -> BridgeResult<PurchasedProduct> {
        self.lifecycle.launch_purchase(product, user_id).await
    }

    /// See [`LifecycleManager::terminate_purchase`]
    pub async fn terminate_purchase(&self, token: &str) -> BridgeResult<()> {
        self.lifecycle.terminate_purchase(token).await
    }

    /// Number of parked transactions still waiting for a requester
    pub fn pending_deliveries(&self) -> usize {
        self.lifecycle.pending_deliveries()
    }

    /// Stop the dispatch loop and fail everything still in flight
    ///
    /// Safe to call more than once; later calls find nothing to do.
    pub async fn shutdown(&self) {
        self.shutdown_token.cancel();
        let handle = self.dispatch_handle.lock().unwrap().take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                error!("Dispatch task ended abnormally: {}", err);
            }
        }

        let canceled = self
            .catalog
            .cancel_all(BridgeError::canceled("Bridge shut down"))
            + self
                .lifecycle
                .cancel_all(BridgeError::canceled("Bridge shut down"));
        if canceled > 0 {
            info!(count = canceled, "Canceled outstanding requests at shutdown");
        }
    }
}

async fn dispatch_loop(
    catalog: Arc<CatalogResolver>,
    lifecycle: Arc<LifecycleManager>,
    mut events: mpsc::UnboundedReceiver<StoreEvent>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("Dispatch loop shutting down");
                break;
            }
            event = events.recv() => match event {
                Some(StoreEvent::ProductsResponse { query, result }) => {
                    catalog.complete(query, result);
                }
                Some(StoreEvent::TransactionUpdated(transaction)) => {
                    lifecycle.handle_update(transaction).await;
                }
                None => {
                    debug!("Store event channel closed, dispatch loop exiting");
                    break;
                }
            }
        }
    }
}
