//! Narrow interfaces to the outside world used by the filter store.
//!
//! Everything runs on the UI thread, so ports take `&self` and rely on
//! interior mutability in their implementations.

use contracts::shared::filters::QueryParams;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("browser window is not available")]
    NoWindow,
    #[error("storage is not available")]
    StorageUnavailable,
    #[error("storage operation failed: {0}")]
    Storage(String),
    #[error("history update failed: {0}")]
    History(String),
    #[error("query string could not be encoded: {0}")]
    Encode(String),
}

/// Current URL query parameters
pub trait QueryStore {
    fn read(&self) -> QueryParams;

    /// Replace the query string without adding a history entry
    fn replace(&self, params: &QueryParams) -> Result<(), PortError>;
}

/// String blobs under fixed keys (localStorage in the browser)
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>, PortError>;
    fn write(&self, key: &str, value: &str) -> Result<(), PortError>;
    fn delete(&self, key: &str) -> Result<(), PortError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

/// Deferred execution on the UI thread
pub trait Scheduler {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskId;

    /// Cancelling a task that already ran is a no-op
    fn cancel(&self, id: TaskId);
}

/// Notifies when the URL query changes through navigation (back/forward)
pub trait RouteObserver {
    fn subscribe(&self, on_change: Rc<dyn Fn()>) -> RouteSubscription;
}

/// Keeps a route listener alive; dropping it unsubscribes
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct RouteSubscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl RouteSubscription {
    pub fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Subscription with nothing to release
    pub fn noop() -> Self {
        Self { unsubscribe: None }
    }
}

impl Drop for RouteSubscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

/// The collaborators one store instance talks to
#[derive(Clone)]
pub struct FilterPorts {
    pub query: Rc<dyn QueryStore>,
    pub storage: Rc<dyn KeyValueStore>,
    pub scheduler: Rc<dyn Scheduler>,
}
