//! Browser implementations of the filter store ports.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use contracts::shared::filters::{parse_query, QueryParams};
use gloo_timers::future::TimeoutFuture;
use leptos::task::spawn_local;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::window;

use super::ports::{
    FilterPorts, KeyValueStore, PortError, QueryStore, RouteObserver, RouteSubscription,
    Scheduler, TaskId,
};

fn describe(err: JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

/// Path of the current page, `/` when unavailable
pub fn current_path() -> String {
    window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// Parameters of a search string. Falls back to pair-by-pair parsing when
/// the string holds nested or repeated keys.
fn parse_search(search: &str) -> QueryParams {
    let search = search.trim_start_matches('?');
    match serde_qs::from_str(search) {
        Ok(params) => params,
        Err(err) => {
            log::warn!("filters: lenient parse of query string ({})", err);
            parse_query(search)
        }
    }
}

/// `window.location.search` / `history.replaceState`
pub struct BrowserQueryStore;

impl QueryStore for BrowserQueryStore {
    fn read(&self) -> QueryParams {
        let search = window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        parse_search(&search)
    }

    fn replace(&self, params: &QueryParams) -> Result<(), PortError> {
        let window = window().ok_or(PortError::NoWindow)?;
        let query =
            serde_qs::to_string(params).map_err(|err| PortError::Encode(err.to_string()))?;

        let location = window.location();
        let path = location
            .pathname()
            .map_err(|err| PortError::History(describe(err)))?;
        let hash = location.hash().unwrap_or_default();
        let new_url = if query.is_empty() {
            format!("{}{}", path, hash)
        } else {
            format!("{}?{}{}", path, query, hash)
        };

        window
            .history()
            .map_err(|err| PortError::History(describe(err)))?
            .replace_state_with_url(&JsValue::NULL, "", Some(&new_url))
            .map_err(|err| PortError::History(describe(err)))
    }
}

/// `window.localStorage`
pub struct LocalStorageStore;

fn local_storage() -> Result<web_sys::Storage, PortError> {
    window()
        .ok_or(PortError::NoWindow)?
        .local_storage()
        .map_err(|err| PortError::Storage(describe(err)))?
        .ok_or(PortError::StorageUnavailable)
}

impl KeyValueStore for LocalStorageStore {
    fn read(&self, key: &str) -> Result<Option<String>, PortError> {
        local_storage()?
            .get_item(key)
            .map_err(|err| PortError::Storage(describe(err)))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PortError> {
        local_storage()?
            .set_item(key, value)
            .map_err(|err| PortError::Storage(describe(err)))
    }

    fn delete(&self, key: &str) -> Result<(), PortError> {
        local_storage()?
            .remove_item(key)
            .map_err(|err| PortError::Storage(describe(err)))
    }
}

/// Timer-backed scheduler. A cancelled task is removed from the table and
/// its timer finds nothing to run.
#[derive(Default)]
pub struct TimeoutScheduler {
    next_id: Cell<u64>,
    tasks: Rc<RefCell<HashMap<TaskId, Box<dyn FnOnce()>>>>,
}

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskId {
        let id = TaskId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.tasks.borrow_mut().insert(id, task);

        let tasks = Rc::clone(&self.tasks);
        spawn_local(async move {
            TimeoutFuture::new(delay_ms).await;
            let task = tasks.borrow_mut().remove(&id);
            if let Some(task) = task {
                task();
            }
        });
        id
    }

    fn cancel(&self, id: TaskId) {
        self.tasks.borrow_mut().remove(&id);
    }
}

/// Fires on browser back/forward (`popstate`)
pub struct PopStateObserver;

impl RouteObserver for PopStateObserver {
    fn subscribe(&self, on_change: Rc<dyn Fn()>) -> RouteSubscription {
        let Some(window) = window() else {
            return RouteSubscription::noop();
        };

        let handler = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            on_change();
        }) as Box<dyn FnMut(_)>);

        if let Err(err) =
            window.add_event_listener_with_callback("popstate", handler.as_ref().unchecked_ref())
        {
            log::error!("Failed to listen for popstate: {}", describe(err));
            return RouteSubscription::noop();
        }

        RouteSubscription::new(move || {
            if let Err(err) = window
                .remove_event_listener_with_callback("popstate", handler.as_ref().unchecked_ref())
            {
                log::warn!("Failed to remove popstate listener: {}", describe(err));
            }
        })
    }
}

impl FilterPorts {
    pub fn browser() -> Self {
        Self {
            query: Rc::new(BrowserQueryStore),
            storage: Rc::new(LocalStorageStore),
            scheduler: Rc::new(TimeoutScheduler::default()),
        }
    }
}
