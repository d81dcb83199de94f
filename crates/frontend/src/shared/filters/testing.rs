//! In-memory ports and a virtual clock for store tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use contracts::shared::filters::QueryParams;

use super::ports::{
    FilterPorts, KeyValueStore, PortError, QueryStore, RouteObserver, RouteSubscription,
    Scheduler, TaskId,
};

/// Runs scheduled tasks only when the test advances time
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<u64>,
    next_id: Cell<u64>,
    tasks: RefCell<BTreeMap<(u64, u64), Box<dyn FnOnce()>>>,
}

impl ManualScheduler {
    pub fn advance(&self, ms: u64) {
        let target = self.now.get() + ms;
        loop {
            let next = {
                let mut tasks = self.tasks.borrow_mut();
                match tasks.keys().next().copied() {
                    Some(key) if key.0 <= target => tasks.remove(&key).map(|task| (key.0, task)),
                    _ => None,
                }
            };
            let Some((due, task)) = next else { break };
            self.now.set(due);
            task();
        }
        self.now.set(target);
    }

    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let due = self.now.get() + u64::from(delay_ms);
        self.tasks.borrow_mut().insert((due, id), task);
        TaskId(id)
    }

    fn cancel(&self, id: TaskId) {
        self.tasks.borrow_mut().retain(|(_, task_id), _| *task_id != id.0);
    }
}

#[derive(Default)]
pub struct MemoryQueryStore {
    params: RefCell<QueryParams>,
    writes: RefCell<Vec<QueryParams>>,
    fail: Cell<bool>,
}

impl MemoryQueryStore {
    pub fn with_params(pairs: &[(&str, &str)]) -> Self {
        let store = Self::default();
        store.set_url(pairs);
        store
    }

    /// Change the URL as a navigation would, without recording a write
    pub fn set_url(&self, pairs: &[(&str, &str)]) {
        *self.params.borrow_mut() = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
    }

    pub fn current(&self) -> QueryParams {
        self.params.borrow().clone()
    }

    pub fn writes(&self) -> Vec<QueryParams> {
        self.writes.borrow().clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail.set(fail);
    }
}

impl QueryStore for MemoryQueryStore {
    fn read(&self) -> QueryParams {
        self.current()
    }

    fn replace(&self, params: &QueryParams) -> Result<(), PortError> {
        if self.fail.get() {
            return Err(PortError::History("replaceState rejected".to_string()));
        }
        *self.params.borrow_mut() = params.clone();
        self.writes.borrow_mut().push(params.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RefCell<HashMap<String, String>>,
    writes: RefCell<Vec<(String, String)>>,
    fail_writes: Cell<bool>,
    fail_reads: Cell<bool>,
    fail_deletes: Cell<bool>,
}

impl MemoryKeyValueStore {
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.entries.borrow_mut().insert(key.to_string(), value.to_string());
        store
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.borrow().clone()
    }

    /// Simulate a full quota
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Simulate storage blocked by privacy settings
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.set(fail);
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>, PortError> {
        if self.fail_reads.get() {
            return Err(PortError::Storage("SecurityError".to_string()));
        }
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PortError> {
        if self.fail_writes.get() {
            return Err(PortError::Storage("QuotaExceededError".to_string()));
        }
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        self.writes.borrow_mut().push((key.to_string(), value.to_string()));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), PortError> {
        if self.fail_deletes.get() {
            return Err(PortError::Storage("SecurityError".to_string()));
        }
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeRouteObserver {
    next_id: Cell<u64>,
    listeners: Rc<RefCell<Vec<(u64, Rc<dyn Fn()>)>>>,
}

impl FakeRouteObserver {
    /// Fire every listener, as a back/forward navigation would
    pub fn navigate(&self) {
        let listeners: Vec<_> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl RouteObserver for FakeRouteObserver {
    fn subscribe(&self, on_change: Rc<dyn Fn()>) -> RouteSubscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, on_change));
        let listeners = Rc::clone(&self.listeners);
        RouteSubscription::new(move || {
            listeners.borrow_mut().retain(|(listener_id, _)| *listener_id != id);
        })
    }
}

/// Fakes wired together, with typed handles kept for assertions
pub struct Harness {
    pub query: Rc<MemoryQueryStore>,
    pub storage: Rc<MemoryKeyValueStore>,
    pub scheduler: Rc<ManualScheduler>,
}

impl Harness {
    pub fn new(query: MemoryQueryStore, storage: MemoryKeyValueStore) -> Self {
        Self {
            query: Rc::new(query),
            storage: Rc::new(storage),
            scheduler: Rc::new(ManualScheduler::default()),
        }
    }

    pub fn empty() -> Self {
        Self::new(MemoryQueryStore::default(), MemoryKeyValueStore::default())
    }

    pub fn ports(&self) -> FilterPorts {
        FilterPorts {
            query: self.query.clone(),
            storage: self.storage.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}
