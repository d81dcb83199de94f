//! Global filter synchronization: one canonical [`FilterState`] kept in
//! step with the URL query and `localStorage`.
//!
//! [`FilterState`]: contracts::shared::filters::FilterState

pub mod active_filters_bar;
pub mod browser;
pub mod config;
pub mod context;
pub mod debounce;
pub mod ports;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use active_filters_bar::ActiveFiltersBar;
pub use config::FilterSyncConfig;
pub use context::{use_filters, FilterContext, FilterProvider};
pub use ports::{FilterPorts, KeyValueStore, PortError, QueryStore, RouteObserver, Scheduler};
pub use store::{FilterStateStore, FilterUpdate, SyncDiagnostic};
