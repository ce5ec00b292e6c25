//! Transaction Models
//!
//! Lifecycle states and update payloads for platform store transactions.

use serde::{Deserialize, Serialize};

// ============================================================================
// Transaction State
// ============================================================================

/// Platform store transaction state
///
/// `Purchasing` and `Deferred` are transient; `Failed` is terminal with
/// nothing to deliver; `Purchased` and `Restored` are terminal states the
/// application must be handed the product for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionState {
    /// Payment sheet is open, outcome unknown
    Purchasing,
    /// Payment went through, product must be delivered
    Purchased,
    /// Payment did not go through
    Failed,
    /// Prior purchase replayed by the store, product must be delivered
    Restored,
    /// Awaiting external approval (e.g. family purchase approval)
    Deferred,
}

impl TransactionState {
    /// Whether this state carries a product that must reach the application
    #[inline]
    pub const fn is_terminal_deliverable(&self) -> bool {
        matches!(self, Self::Purchased | Self::Restored)
    }
}

// ============================================================================
// Transaction
// ============================================================================

/// Failure details attached to a `Failed` transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionFailure {
    /// True when the user dismissed the payment sheet
    pub canceled: bool,
    /// Store-provided failure description
    pub message: String,
}

/// A platform store transaction update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Store-assigned transaction identifier
    pub id: String,
    /// Current lifecycle state
    pub state: TransactionState,
    /// Store SKU the transaction is for
    pub internal_product_id: String,
    /// Receipt data attached to the update, if the store provided any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_ref: Option<String>,
    /// Failure details, present only when `state` is `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<TransactionFailure>,
}

impl Transaction {
    /// Create an update with the given state and no receipt or failure data
    pub fn new(
        id: impl Into<String>,
        state: TransactionState,
        internal_product_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            state,
            internal_product_id: internal_product_id.into(),
            receipt_ref: None,
            failure: None,
        }
    }
}
