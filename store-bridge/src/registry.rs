//! Request correlation registry
//!
//! Maps generated request identities to the oneshot channels their callers
//! await on. Store responses are matched back here by the dispatch loop;
//! removal and completion happen under one lock acquisition, so a request
//! can be completed at most once no matter how many responses arrive.

use shared::error::{BridgeError, BridgeResult};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::oneshot;
use uuid::Uuid;

/// An entry removed from the registry, ready to be completed
///
/// Holds the caller's context alongside the completion channel so the
/// holder can build the outcome before sending it.
#[derive(Debug)]
pub struct ClaimedRequest<K, T> {
    /// Identity the request was registered under
    pub id: Uuid,
    /// Caller context captured at registration
    pub key: K,
    tx: oneshot::Sender<BridgeResult<T>>,
}

impl<K, T> ClaimedRequest<K, T> {
    /// Complete the request. A caller that already gave up is ignored.
    pub fn complete(self, outcome: BridgeResult<T>) {
        let _ = self.tx.send(outcome);
    }
}

#[derive(Debug)]
struct Entry<K, T> {
    key: K,
    /// Registration order, used to pick the most recent match
    seq: u64,
    tx: oneshot::Sender<BridgeResult<T>>,
}

#[derive(Debug)]
struct Inner<K, T> {
    entries: HashMap<Uuid, Entry<K, T>>,
    next_seq: u64,
}

/// Identity-keyed registry of outstanding requests
///
/// `K` is the caller context kept with each entry, `T` the success payload
/// delivered through the oneshot channel. All mutation happens behind one
/// mutex; the lock is never held across an await point.
#[derive(Debug)]
pub struct RequestRegistry<K, T> {
    inner: Mutex<Inner<K, T>>,
}

impl<K, T> RequestRegistry<K, T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                next_seq: 0,
            }),
        }
    }

    /// Register a request under `id` and get the receiver its outcome will
    /// arrive on
    ///
    /// Callers generate fresh v4 identities, so an occupied slot means the
    /// same id was registered twice and is rejected.
    pub fn register(&self, id: Uuid, key: K) -> BridgeResult<oneshot::Receiver<BridgeResult<T>>> {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.inner.lock().unwrap();
        if inner.entries.contains_key(&id) {
            return Err(BridgeError::already_in_progress(format!(
                "Request {} is already registered",
                id
            )));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(id, Entry { key, seq, tx });
        Ok(rx)
    }

    /// Remove the entry for `id` and complete it with `outcome`
    ///
    /// Returns false when no entry exists, which is how late or duplicate
    /// responses get dropped.
    pub fn resolve(&self, id: &Uuid, outcome: BridgeResult<T>) -> bool {
        let entry = self.inner.lock().unwrap().entries.remove(id);
        match entry {
            Some(entry) => {
                let _ = entry.tx.send(outcome);
                true
            }
            None => false,
        }
    }

    /// Drop the entry for `id` without completing it
    ///
    /// Used when the initiating send fails before any response can exist.
    pub fn discard(&self, id: &Uuid) {
        self.inner.lock().unwrap().entries.remove(id);
    }

    /// Remove and return the most recently registered entry matching the
    /// predicate
    pub fn claim_latest(
        &self,
        mut predicate: impl FnMut(&K) -> bool,
    ) -> Option<ClaimedRequest<K, T>> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner
            .entries
            .iter()
            .filter(|(_, entry)| predicate(&entry.key))
            .max_by_key(|(_, entry)| entry.seq)
            .map(|(id, _)| *id)?;
        let entry = inner.entries.remove(&id)?;
        Some(ClaimedRequest {
            id,
            key: entry.key,
            tx: entry.tx,
        })
    }

    /// Fail every outstanding entry with `err`, returning how many there
    /// were. Teardown only.
    pub fn cancel_all(&self, err: BridgeError) -> usize {
        let entries: Vec<Entry<K, T>> = {
            let mut inner = self.inner.lock().unwrap();
            inner.entries.drain().map(|(_, entry)| entry).collect()
        };
        let count = entries.len();
        for entry in entries {
            let _ = entry.tx.send(Err(err.clone()));
        }
        count
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, T> Default for RequestRegistry<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
