//! Canonical filter state and its synchronization with the URL and
//! persisted storage.
//!
//! Resolution order on load and on navigation is URL > storage > defaults.
//! Mutations update the in-memory state synchronously; the URL and the
//! storage blob follow after `debounce_ms` of quiet time.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use chrono::NaiveDate;
use contracts::shared::filters::{
    resolve, DateRange, DayType, FilterField, FilterPatch, FilterState, QueryParams,
};

use super::config::FilterSyncConfig;
use super::debounce::Debouncer;
use super::ports::{FilterPorts, PortError, RouteObserver, RouteSubscription};

/// How a mutation derives the next state from the previous one
pub enum FilterUpdate {
    /// Shallow overlay of the specified fields
    Patch(FilterPatch),
    /// Full replacement computed from the previous state
    With(Box<dyn FnOnce(&FilterState) -> FilterState>),
}

impl FilterUpdate {
    pub fn with(updater: impl FnOnce(&FilterState) -> FilterState + 'static) -> Self {
        FilterUpdate::With(Box::new(updater))
    }
}

impl From<FilterPatch> for FilterUpdate {
    fn from(patch: FilterPatch) -> Self {
        FilterUpdate::Patch(patch)
    }
}

/// Non-fatal synchronization problems. The in-memory state stays valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncDiagnostic {
    CorruptPersistedBlob(String),
    StorageReadFailed(PortError),
    StorageWriteFailed(PortError),
    StorageDeleteFailed(PortError),
    UrlWriteFailed(PortError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Listener = Rc<dyn Fn(&Rc<FilterState>)>;

struct Inner {
    config: FilterSyncConfig,
    defaults: FilterState,
    ports: FilterPorts,
    state: RefCell<Rc<FilterState>>,
    url_sync: Debouncer,
    storage_sync: Debouncer,
    listeners: RefCell<Vec<(SubscriberId, Listener)>>,
    next_listener: Cell<u64>,
    diagnostics: RefCell<Vec<SyncDiagnostic>>,
    // Query of the last successful URL write
    last_written: RefCell<Option<QueryParams>>,
}

impl Inner {
    fn report(&self, diagnostic: SyncDiagnostic) {
        log::warn!("filters: {:?}", diagnostic);
        self.diagnostics.borrow_mut().push(diagnostic);
    }
}

fn report(inner: &Weak<Inner>, diagnostic: SyncDiagnostic) {
    match inner.upgrade() {
        Some(inner) => inner.report(diagnostic),
        None => log::warn!("filters: {:?} after store was dropped", diagnostic),
    }
}

/// Owner of the canonical [`FilterState`]. Clones share the same state.
#[derive(Clone)]
pub struct FilterStateStore {
    inner: Rc<Inner>,
}

impl FilterStateStore {
    pub fn new(config: FilterSyncConfig, defaults: FilterState, ports: FilterPorts) -> Self {
        let url_sync = Debouncer::new(Rc::clone(&ports.scheduler), config.debounce_ms);
        let storage_sync = Debouncer::new(Rc::clone(&ports.scheduler), config.debounce_ms);
        let store = Self {
            inner: Rc::new(Inner {
                state: RefCell::new(Rc::new(defaults.clone())),
                config,
                defaults,
                ports,
                url_sync,
                storage_sync,
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
                diagnostics: RefCell::new(Vec::new()),
                last_written: RefCell::new(None),
            }),
        };
        let initial = store.initialize();
        *store.inner.state.borrow_mut() = Rc::new(initial);
        store
    }

    /// Resolve the state from the current URL, the persisted blob and the
    /// defaults. Reads only; a corrupt blob is reported and skipped.
    pub fn initialize(&self) -> FilterState {
        let url = FilterPatch::from_query(&self.inner.ports.query.read());
        let persisted = self.read_persisted();
        resolve(&self.inner.defaults, persisted.as_ref(), &url)
    }

    fn read_persisted(&self) -> Option<FilterPatch> {
        let key = &self.inner.config.storage_key;
        match self.inner.ports.storage.read(key) {
            Ok(Some(raw)) => match FilterPatch::from_json(&raw) {
                Ok(patch) => Some(patch),
                Err(err) => {
                    self.inner
                        .report(SyncDiagnostic::CorruptPersistedBlob(err.to_string()));
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                self.inner.report(SyncDiagnostic::StorageReadFailed(err));
                None
            }
        }
    }

    /// Current snapshot. Never mutated after it is handed out.
    pub fn state(&self) -> Rc<FilterState> {
        Rc::clone(&self.inner.state.borrow())
    }

    /// Apply `update`, publish the new snapshot and schedule the outbound
    /// sync. A panicking updater propagates to the caller.
    pub fn mutate(&self, update: impl Into<FilterUpdate>) {
        let previous = self.state();
        let next = match update.into() {
            FilterUpdate::Patch(patch) => previous.overlay(&patch),
            FilterUpdate::With(updater) => updater(previous.as_ref()).normalized(),
        };
        self.commit(next);
        self.schedule_storage_sync();
        self.schedule_url_sync();
    }

    pub fn update_date_range(&self, start: NaiveDate, end: NaiveDate) {
        self.mutate(FilterPatch::new().date_range(Some(DateRange::new(start, end))));
    }

    pub fn clear_date_range(&self) {
        self.mutate(FilterPatch::new().date_range(None));
    }

    pub fn set_scalar(&self, field: FilterField, value: impl Into<String>) {
        self.mutate(FilterPatch::new().scalar(field, value));
    }

    pub fn set_day_type(&self, day_type: DayType) {
        self.mutate(FilterPatch::new().day_type(day_type));
    }

    pub fn set_facet<I, S>(&self, field: FilterField, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mutate(FilterPatch::new().facet(field, values));
    }

    pub fn toggle_facet(&self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        self.mutate(FilterUpdate::with(move |previous| {
            previous.clone().toggled(field, &value)
        }));
    }

    /// Back to defaults. The persisted blob is deleted right away so it
    /// cannot come back on the next load; the URL follows after the debounce.
    pub fn reset(&self) {
        self.inner.storage_sync.cancel();
        if let Err(err) = self.inner.ports.storage.delete(&self.inner.config.storage_key) {
            self.inner.report(SyncDiagnostic::StorageDeleteFailed(err));
        }
        self.commit(self.inner.defaults.clone());
        self.schedule_url_sync();
    }

    /// Re-resolve from the URL after a navigation. Pending outbound writes
    /// are dropped: the URL being navigated to wins over them. A URL equal
    /// to the one this store last wrote is not a navigation.
    pub fn reinitialize(&self) {
        let current = self.inner.ports.query.read();
        if self.inner.last_written.borrow().as_ref() == Some(&current) {
            log::debug!("filters: ignoring notification for own URL write");
            return;
        }

        let url_dropped = self.inner.url_sync.cancel();
        let storage_dropped = self.inner.storage_sync.cancel();
        if url_dropped || storage_dropped {
            log::debug!("filters: navigation superseded pending sync");
        }
        let next = self.initialize();
        if next != *self.state() {
            self.commit(next);
        }
    }

    /// Re-initialize whenever `observer` reports a navigation
    pub fn attach(&self, observer: &dyn RouteObserver) -> RouteSubscription {
        let inner = Rc::downgrade(&self.inner);
        observer.subscribe(Rc::new(move || {
            if let Some(inner) = inner.upgrade() {
                FilterStateStore { inner }.reinitialize();
            }
        }))
    }

    pub fn is_filter_relevant(&self, field: FilterField, path: &str) -> bool {
        self.inner.config.pages.is_relevant(field, path)
    }

    /// Fields honored on `path`, in declaration order
    pub fn relevant_fields(&self, path: &str) -> Vec<FilterField> {
        self.inner.config.pages.relevant_fields(path)
    }

    /// Call `listener` with every new snapshot
    pub fn subscribe(&self, listener: impl Fn(&Rc<FilterState>) + 'static) -> SubscriberId {
        let id = SubscriberId(self.inner.next_listener.get());
        self.inner.next_listener.set(id.0 + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(listener_id, _)| *listener_id != id);
    }

    pub fn diagnostics(&self) -> Vec<SyncDiagnostic> {
        self.inner.diagnostics.borrow().clone()
    }

    pub fn take_diagnostics(&self) -> Vec<SyncDiagnostic> {
        self.inner.diagnostics.take()
    }

    /// Whether an outbound write is still waiting for the debounce
    pub fn has_pending_sync(&self) -> bool {
        self.inner.url_sync.is_pending() || self.inner.storage_sync.is_pending()
    }

    fn commit(&self, next: FilterState) {
        let snapshot = Rc::new(next);
        *self.inner.state.borrow_mut() = Rc::clone(&snapshot);

        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    // Scheduled before the URL write so that a URL-driven re-initialization
    // never reads a stale blob.
    fn schedule_storage_sync(&self) {
        let snapshot = self.state();
        let storage = Rc::clone(&self.inner.ports.storage);
        let key = self.inner.config.storage_key.clone();
        let inner = Rc::downgrade(&self.inner);
        self.inner.storage_sync.call(move || {
            let result = snapshot
                .to_json()
                .map_err(|err| PortError::Encode(err.to_string()))
                .and_then(|raw| storage.write(&key, &raw));
            if let Err(err) = result {
                report(&inner, SyncDiagnostic::StorageWriteFailed(err));
            }
        });
    }

    fn schedule_url_sync(&self) {
        let snapshot = self.state();
        let query = Rc::clone(&self.inner.ports.query);
        let inner = Rc::downgrade(&self.inner);
        self.inner.url_sync.call(move || {
            let mut params: QueryParams = query.read();
            snapshot.apply_to_query(&mut params);
            match query.replace(&params) {
                Ok(()) => {
                    if let Some(inner) = inner.upgrade() {
                        *inner.last_written.borrow_mut() = Some(params);
                    }
                }
                Err(err) => report(&inner, SyncDiagnostic::UrlWriteFailed(err)),
            }
        });
    }
}
