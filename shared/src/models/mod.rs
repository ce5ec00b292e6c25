//! Data models
//!
//! Shared between the bridge runtime and the embedding application.
//! Everything here crosses a serialization boundary, so all types derive
//! Serialize/Deserialize.

pub mod product;
pub mod transaction;

// Re-exports
pub use product::*;
pub use transaction::*;
