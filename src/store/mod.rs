//! Reducer-driven domain state.
//!
//! Every backend domain owns one [`Store`]: a state value that only changes
//! when an action is passed through the domain's pure [`Reducer`]. Consumers
//! read snapshots or subscribe to a watch channel and re-render on change.
//!
//! # Architecture
//!
//! - [`Reducer`]: pure transition function over a closed action enum
//! - [`Store`]: versioned state cell with synchronous `dispatch`
//! - [`Activities`]: per-category `{loading, error}` sub-states
//! - [`Resource`]: a store plus the in-flight bookkeeping used by async
//!   operations
//!
//! # Example
//!
//! ```rust
//! use hrms_portal::store::Store;
//! use hrms_portal::domains::projects::{ProjectsAction, ProjectsActivity, ProjectsState};
//!
//! let store: Store<ProjectsState> = Store::new("projects");
//! store.dispatch(ProjectsAction::Started(ProjectsActivity::Query));
//! assert!(store.state().activity.is_loading(ProjectsActivity::Query));
//! assert_eq!(store.version(), 1);
//! ```

mod activity;
mod resource;

pub use activity::{Activities, Activity};
pub use resource::Resource;

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

/// A domain state together with its pure transition function.
pub trait Reducer: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Closed set of transitions for this domain.
    type Action: fmt::Debug + Send;
    /// Action categories that carry their own loading/error flags.
    type Category: Copy + Ord + fmt::Debug + Send + Sync + 'static;

    /// Returns the next state. Must not depend on anything but its inputs.
    #[must_use]
    fn reduce(&self, action: Self::Action) -> Self;

    /// Action marking `category` in flight.
    fn started(category: Self::Category) -> Self::Action;

    /// Action recording a failure of `category`.
    fn failed(category: Self::Category, message: String) -> Self::Action;

    /// Action ending `category` without a result or an error.
    fn settled(category: Self::Category) -> Self::Action;
}

/// Immutable view of a store at one version.
#[derive(Debug)]
pub struct Snapshot<S> {
    pub version: u64,
    pub state: Arc<S>,
}

impl<S> Clone for Snapshot<S> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            state: Arc::clone(&self.state),
        }
    }
}

/// Versioned state cell for one domain.
pub struct Store<S: Reducer> {
    name: &'static str,
    tx: Arc<watch::Sender<Snapshot<S>>>,
}

impl<S: Reducer> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<S: Reducer> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.name)
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}

impl<S: Reducer> Store<S> {
    /// Create a store holding the default state.
    pub fn new(name: &'static str) -> Self {
        let (tx, _rx) = watch::channel(Snapshot {
            version: 0,
            state: Arc::new(S::default()),
        });
        Self {
            name,
            tx: Arc::new(tx),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply `action` through the reducer.
    ///
    /// Returns `true` when the state changed. Unchanged states keep their
    /// version so memoized consumers are not invalidated.
    pub fn dispatch(&self, action: S::Action) -> bool {
        tracing::trace!(name: "store.dispatch", store = self.name, action = ?action);
        self.tx.send_if_modified(|current| {
            let next = current.state.reduce(action);
            if next == *current.state {
                return false;
            }
            current.version += 1;
            current.state = Arc::new(next);
            true
        })
    }

    /// Put the store back to its initial state.
    pub fn reset(&self) {
        self.tx.send_if_modified(|current| {
            if *current.state == S::default() {
                return false;
            }
            current.version += 1;
            current.state = Arc::new(S::default());
            true
        });
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot<S> {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn state(&self) -> Arc<S> {
        Arc::clone(&self.tx.borrow().state)
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.tx.borrow().version
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<S>> {
        self.tx.subscribe()
    }
}
