use std::{future::Future, sync::Arc};

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::debug;

/// Why a coalesced computation settled without a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Aborted {
    /// The computation panicked.
    #[error("computation panicked")]
    Panicked,
    /// The computation's task was cancelled by the runtime.
    #[error("computation was cancelled")]
    Cancelled,
}

impl From<JoinError> for Aborted {
    fn from(err: JoinError) -> Self {
        if err.is_panic() {
            Self::Panicked
        } else {
            Self::Cancelled
        }
    }
}

/// Outcome of a coalesced computation, shared by every waiter.
pub type Settled<V> = Result<V, Aborted>;

type Pending<V> = Shared<BoxFuture<'static, Settled<V>>>;

/// Request coalescer: at most one computation in flight per key.
///
/// The first caller for a key starts the computation on the runtime; later callers for the same
/// key await the same result. The computation runs on its own task, so it completes even if every
/// caller stops waiting. Its entry is dropped as soon as it settles, whether it returned or
/// panicked.
pub struct InFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    pending: Arc<DashMap<String, Pending<V>>>,
}

impl<V> Default for InFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
        }
    }
}

impl<V> InFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty coalescer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a computation for `key` has not settled yet.
    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.contains_key(key)
    }

    /// Number of computations currently in flight.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Join the in-flight computation for `key`, or start one with `factory`.
    ///
    /// `factory` only builds the future; it is called under the map's shard lock and must not
    /// touch this coalescer itself.
    pub async fn get_or_start<F, Fut>(&self, key: &str, factory: F) -> Settled<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let shared = match self.pending.entry(key.to_owned()) {
            Entry::Occupied(entry) => {
                debug!(key, "joining in-flight computation");
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                let pending = Arc::clone(&self.pending);
                let owned_key = key.to_owned();
                let work = tokio::spawn(factory());
                let shared = async move {
                    let settled = work.await.map_err(Aborted::from);
                    pending.remove(&owned_key);
                    settled
                }
                .boxed()
                .shared();
                entry.insert(shared.clone());
                tokio::spawn(shared.clone());
                shared
            }
        };

        shared.await
    }
}
