use std::collections::BTreeSet;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use super::state::{is_blank, DateRange, DayType, FilterField};

/// Partial filter selection coming from one source (URL, persisted blob,
/// or a caller's update). `None` means "not specified by this source".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPatch {
    /// `Some(None)` clears the range, `None` leaves it untouched
    #[serde(default, deserialize_with = "deserialize_date_range")]
    pub date_range: Option<Option<DateRange>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub weekday_weekend: Option<DayType>,
    #[serde(default)]
    pub categories: Option<BTreeSet<String>>,
    #[serde(default)]
    pub brands: Option<BTreeSet<String>>,
    #[serde(default)]
    pub genders: Option<BTreeSet<String>>,
    #[serde(default)]
    pub age_groups: Option<BTreeSet<String>>,
    #[serde(default)]
    pub locations: Option<BTreeSet<String>>,
    #[serde(default)]
    pub products: Option<BTreeSet<String>>,
    #[serde(default)]
    pub income_ranges: Option<BTreeSet<String>>,
}

#[derive(Deserialize)]
struct RawDateRange {
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
}

/// `null` or `{start: null, end: null}` is an explicitly empty range;
/// a range with a single bound is treated as unspecified.
fn deserialize_date_range<'de, D>(deserializer: D) -> Result<Option<Option<DateRange>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawDateRange>::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(Some(None));
    };
    let start = raw.start.filter(|s| !is_blank(s));
    let end = raw.end.filter(|s| !is_blank(s));
    match (start, end) {
        (None, None) => Ok(Some(None)),
        (Some(start), Some(end)) => DateRange::parse(Some(&start), Some(&end))
            .map(|range| Some(Some(range)))
            .ok_or_else(|| D::Error::custom(format!("invalid date range {start}..{end}"))),
        _ => Ok(None),
    }
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn date_range(mut self, range: Option<DateRange>) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn day_type(mut self, day_type: DayType) -> Self {
        self.weekday_weekend = Some(day_type);
        self
    }

    /// Set a single-select facet. Ignored for other fields.
    pub fn scalar(mut self, field: FilterField, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match field {
            FilterField::Category => self.category = value,
            FilterField::Brand => self.brand = value,
            FilterField::Location => self.location = value,
            _ => {}
        }
        self
    }

    /// Replace a multi-valued facet. Ignored for other fields.
    pub fn facet<I, S>(mut self, field: FilterField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(slot) = self.facet_slot(field) {
            *slot = Some(values.into_iter().map(Into::into).collect());
        }
        self
    }

    pub(crate) fn facet_slot(&mut self, field: FilterField) -> Option<&mut Option<BTreeSet<String>>> {
        match field {
            FilterField::Categories => Some(&mut self.categories),
            FilterField::Brands => Some(&mut self.brands),
            FilterField::Genders => Some(&mut self.genders),
            FilterField::AgeGroups => Some(&mut self.age_groups),
            FilterField::Locations => Some(&mut self.locations),
            FilterField::Products => Some(&mut self.products),
            FilterField::IncomeRanges => Some(&mut self.income_ranges),
            _ => None,
        }
    }
}
