use super::patch::FilterPatch;
use super::state::FilterState;

fn pick<T: Clone>(patch: &Option<T>, current: &T) -> T {
    patch.as_ref().unwrap_or(current).clone()
}

impl FilterState {
    /// Field-by-field overlay: every field the patch specifies wins,
    /// `date_range` is replaced wholesale. The result is normalized.
    pub fn overlay(&self, patch: &FilterPatch) -> FilterState {
        FilterState {
            date_range: patch.date_range.unwrap_or(self.date_range),
            category: pick(&patch.category, &self.category),
            brand: pick(&patch.brand, &self.brand),
            location: pick(&patch.location, &self.location),
            weekday_weekend: patch.weekday_weekend.unwrap_or(self.weekday_weekend),
            categories: pick(&patch.categories, &self.categories),
            brands: pick(&patch.brands, &self.brands),
            genders: pick(&patch.genders, &self.genders),
            age_groups: pick(&patch.age_groups, &self.age_groups),
            locations: pick(&patch.locations, &self.locations),
            products: pick(&patch.products, &self.products),
            income_ranges: pick(&patch.income_ranges, &self.income_ranges),
        }
        .normalized()
    }
}

/// Resolve the canonical state with precedence URL > persisted > defaults
pub fn resolve(
    defaults: &FilterState,
    persisted: Option<&FilterPatch>,
    url: &FilterPatch,
) -> FilterState {
    let base = match persisted {
        Some(patch) => defaults.overlay(patch),
        None => defaults.clone().normalized(),
    };
    base.overlay(url)
}
