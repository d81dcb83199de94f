use chrono::{NaiveDate, Utc};
use contracts::shared::filters::{DayType, FilterField, FilterState};
use leptos::prelude::*;

use super::browser::{current_path, PopStateObserver};
use super::config::FilterSyncConfig;
use super::ports::{FilterPorts, RouteSubscription};
use super::store::{FilterStateStore, FilterUpdate};

/// Global filters as seen by dashboard components
#[derive(Clone, Copy)]
pub struct FilterContext {
    /// Latest snapshot, updated on every mutation and navigation
    pub filters: RwSignal<FilterState>,
    store: StoredValue<FilterStateStore, LocalStorage>,
    // Dropped together with the provider's owner
    _route: StoredValue<RouteSubscription, LocalStorage>,
}

impl FilterContext {
    fn store(&self) -> FilterStateStore {
        self.store.get_value()
    }

    pub fn set_filters(&self, update: impl Into<FilterUpdate>) {
        self.store().mutate(update);
    }

    pub fn reset_filters(&self) {
        self.store().reset();
    }

    pub fn update_date_range(&self, start: NaiveDate, end: NaiveDate) {
        self.store().update_date_range(start, end);
    }

    pub fn clear_date_range(&self) {
        self.store().clear_date_range();
    }

    pub fn update_filter(&self, field: FilterField, value: impl Into<String>) {
        self.store().set_scalar(field, value);
    }

    pub fn set_day_type(&self, day_type: DayType) {
        self.store().set_day_type(day_type);
    }

    pub fn set_facet(&self, field: FilterField, values: Vec<String>) {
        self.store().set_facet(field, values);
    }

    pub fn toggle_facet(&self, field: FilterField, value: impl Into<String>) {
        self.store().toggle_facet(field, value);
    }

    /// Whether `field` applies on the page currently shown
    pub fn is_filter_relevant(&self, field: FilterField) -> bool {
        self.store().is_filter_relevant(field, &current_path())
    }

    pub fn relevant_fields(&self) -> Vec<FilterField> {
        self.store().relevant_fields(&current_path())
    }
}

/// Owns the filter store for everything below it
#[component]
pub fn FilterProvider(children: Children) -> impl IntoView {
    let config = FilterSyncConfig::load_or_default();
    let defaults = config.defaults(Utc::now().date_naive());
    let store = FilterStateStore::new(config, defaults, FilterPorts::browser());

    let filters = RwSignal::new(store.state().as_ref().clone());
    store.subscribe(move |snapshot| filters.set(snapshot.as_ref().clone()));
    let route = store.attach(&PopStateObserver);

    log::debug!(
        "filters: initialized with {} active filter(s)",
        filters.with_untracked(|f| f.active_filter_count())
    );

    provide_context(FilterContext {
        filters,
        store: StoredValue::new_local(store),
        _route: StoredValue::new_local(route),
    });

    children()
}

/// Hook to access the global filters
pub fn use_filters() -> FilterContext {
    use_context::<FilterContext>().expect("FilterProvider not found in component tree")
}
