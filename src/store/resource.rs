//! Async operation driver shared by every domain machine.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use super::{Reducer, Store};
use crate::error::{PortalError, Result};

/// A store plus per-category in-flight sequence numbers.
///
/// Overlapping invocations of the same category follow a supersede policy:
/// the most recent invocation owns the category, and results of older ones
/// are handed back to their callers without touching state.
pub struct Resource<S: Reducer> {
    store: Store<S>,
    inflight: Arc<Mutex<BTreeMap<S::Category, u64>>>,
}

impl<S: Reducer> Clone for Resource<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            inflight: Arc::clone(&self.inflight),
        }
    }
}

impl<S: Reducer> fmt::Debug for Resource<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl<S: Reducer> Resource<S> {
    pub fn new(name: &'static str) -> Self {
        Self {
            store: Store::new(name),
            inflight: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    /// Run one operation of `category` through its state machine.
    ///
    /// Dispatches `started` before polling `call`, then exactly one of:
    /// `commit(&value)` on success, `failed` on error (message from the error,
    /// or `fallback` when it has none), or `settled` on session expiry. The
    /// category is also settled if the returned future is dropped mid-flight.
    pub async fn execute<T, Fut, F>(
        &self,
        category: S::Category,
        fallback: &str,
        call: Fut,
        commit: F,
    ) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
        F: FnOnce(&T) -> S::Action,
    {
        let seq = self.begin(category);
        let mut guard = SettleGuard {
            resource: self,
            category,
            seq,
            armed: true,
        };
        self.store.dispatch(S::started(category));

        let result = call.await;
        guard.armed = false;

        if !self.is_current(category, seq) {
            debug!(
                name: "store.superseded",
                store = self.store.name(),
                category = ?category,
                "Discarding result of superseded call"
            );
            return result;
        }

        match &result {
            Ok(value) => {
                self.store.dispatch(commit(value));
            }
            Err(PortalError::SessionExpired) => {
                self.store.dispatch(S::settled(category));
            }
            Err(err) => {
                self.store
                    .dispatch(S::failed(category, err.user_message(fallback)));
            }
        }
        result
    }

    fn begin(&self, category: S::Category) -> u64 {
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        let seq = inflight.entry(category).or_insert(0);
        *seq += 1;
        *seq
    }

    fn is_current(&self, category: S::Category, seq: u64) -> bool {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&category)
            .is_some_and(|current| *current == seq)
    }
}

/// Settles the category when an operation future is dropped before completion.
struct SettleGuard<'a, S: Reducer> {
    resource: &'a Resource<S>,
    category: S::Category,
    seq: u64,
    armed: bool,
}

impl<S: Reducer> Drop for SettleGuard<'_, S> {
    fn drop(&mut self) {
        if self.armed && self.resource.is_current(self.category, self.seq) {
            debug!(
                name: "store.cancelled",
                store = self.resource.store.name(),
                category = ?self.category,
                "Operation dropped while in flight"
            );
            self.resource.store.dispatch(S::settled(self.category));
        }
    }
}
