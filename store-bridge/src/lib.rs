//! Store Bridge - in-app purchase plumbing between an application runtime
//! and a platform store
//!
//! Resolves configured catalog entries into store-priced listings, launches
//! purchases, correlates asynchronous transaction updates back to the
//! requests that caused them, and finalizes transactions only after the
//! application acknowledges delivery.

pub mod bridge;
pub mod catalog;
pub mod config;
pub mod lifecycle;
pub mod pending;
pub mod receipt;
pub mod registry;
pub mod store;
pub mod util;

pub use bridge::StoreBridge;
pub use config::BridgeConfig;
pub use store::{MemoryStore, PaymentOrder, StoreEvent, StoreProduct, StoreService};

// Re-export shared types for convenience
pub use shared::error::{BridgeError, BridgeResult, ErrorCode, ErrorPayload};
pub use shared::models::{
    ConfiguredProduct, ProductInfo, PurchasedProduct, StoreType, Transaction, TransactionFailure,
    TransactionState,
};
