use crate::shared::filters::{ActiveFiltersBar, FilterProvider};
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    // Global filters are shared by every dashboard page via context.
    view! {
        <FilterProvider>
            <header class="dashboard-header">
                <h1>"Retail Insights Dashboard PH"</h1>
                <ActiveFiltersBar />
            </header>
        </FilterProvider>
    }
}
