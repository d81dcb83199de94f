use contracts::shared::filters::FilterField;
use leptos::prelude::*;

use super::context::use_filters;

/// Chips describing the active filters, plus a reset button
#[component]
pub fn ActiveFiltersBar() -> impl IntoView {
    let ctx = use_filters();
    let chips = move || ctx.filters.with(|f| f.summary());
    let has_active = move || ctx.filters.with(|f| f.has_active_filters());
    // Active filters the current page does not honor
    let ignored_here = move || {
        let relevant = ctx.relevant_fields();
        ctx.filters.with(|f| {
            FilterField::FIELDS
                .into_iter()
                .filter(|field| f.is_active(*field) && !relevant.contains(field))
                .count()
        })
    };

    view! {
        <div class="active-filters">
            <Show
                when=has_active
                fallback=|| view! { <span class="active-filters__empty">"No filters applied"</span> }
            >
                <For
                    each=chips
                    key=|chip| chip.clone()
                    children=move |chip| {
                        view! { <span class="active-filters__chip">{chip}</span> }
                    }
                />
                <Show when=move || ignored_here() != 0>
                    <span class="active-filters__ignored">
                        {move || format!("{} not used on this page", ignored_here())}
                    </span>
                </Show>
                <button class="active-filters__reset" on:click=move |_| ctx.reset_filters()>
                    "Reset filters"
                </button>
            </Show>
        </div>
    }
}
