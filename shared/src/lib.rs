//! Shared types for the store bridge
//!
//! Common types used across the bridge crates: the error taxonomy,
//! product and catalog payloads, and transaction lifecycle types.

pub mod error;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Error re-exports (for convenient access)
pub use error::{BridgeError, BridgeResult, ErrorCode};

// Model re-exports
pub use models::{
    ConfiguredProduct, ProductInfo, PurchasedProduct, StoreType, Transaction, TransactionFailure,
    TransactionState,
};
