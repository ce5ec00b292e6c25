//! Pending delivery queue
//!
//! Transactions reported by the store with nobody waiting for them are
//! parked here until a matching purchase request arrives or the caller
//! finalizes them directly. Entries keep arrival order so the oldest
//! matching delivery is handed out first.

use chrono::{DateTime, Utc};
use shared::models::{Transaction, TransactionState};
use std::sync::Mutex;
use tracing::{debug, info};

/// A parked transaction together with when it was first seen
#[derive(Debug, Clone)]
pub struct PendingDelivery {
    pub transaction: Transaction,
    pub enqueued_at: DateTime<Utc>,
}

/// Outcome of trying to claim a specific parked transaction
#[derive(Debug)]
pub enum PendingClaim {
    /// The transaction was parked in a deliverable state and has been
    /// removed from the queue
    Claimed(Transaction),
    /// The transaction is parked but not yet decided; it stays in the queue
    Held(TransactionState),
    /// No parked transaction carries this identity
    NotFound,
}

/// FIFO queue of transactions awaiting a requester
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: Mutex<Vec<PendingDelivery>>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a transaction, or refresh the snapshot of one already parked
    ///
    /// Re-enqueueing the same transaction id replaces the stored snapshot
    /// in place: queue position and the original arrival time both survive.
    pub fn enqueue(&self, transaction: Transaction) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(existing) = entries
            .iter_mut()
            .find(|entry| entry.transaction.id == transaction.id)
        {
            debug!(
                transaction_id = %transaction.id,
                state = ?transaction.state,
                "Refreshing already parked transaction"
            );
            existing.transaction = transaction;
            return;
        }
        info!(
            transaction_id = %transaction.id,
            internal_product_id = %transaction.internal_product_id,
            state = ?transaction.state,
            "Parking transaction until a requester shows up"
        );
        entries.push(PendingDelivery {
            transaction,
            enqueued_at: Utc::now(),
        });
    }

    /// Remove and return the oldest deliverable transaction for a product
    pub fn claim_for_product(&self, internal_product_id: &str) -> Option<Transaction> {
        let mut entries = self.entries.lock().unwrap();
        let index = entries.iter().position(|entry| {
            entry.transaction.internal_product_id == internal_product_id
                && entry.transaction.state.is_terminal_deliverable()
        })?;
        Some(entries.remove(index).transaction)
    }

    /// Claim a parked transaction by id for finalization
    ///
    /// Only decided transactions leave the queue; an undecided one is
    /// reported but held, so a later state update can still settle it.
    pub fn claim_decided(&self, transaction_id: &str) -> PendingClaim {
        let mut entries = self.entries.lock().unwrap();
        let Some(index) = entries
            .iter()
            .position(|entry| entry.transaction.id == transaction_id)
        else {
            return PendingClaim::NotFound;
        };
        if entries[index].transaction.state.is_terminal_deliverable() {
            PendingClaim::Claimed(entries.remove(index).transaction)
        } else {
            PendingClaim::Held(entries[index].transaction.state)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
