use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Sentinel for single-select facets meaning "no filter applied"
pub const ALL: &str = "All";

/// Date format used on the wire (URL and persisted blob)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive date range. Both bounds are always present together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse both bounds. A missing or malformed bound yields `None`,
    /// so a half-populated range can never be built.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Option<Self> {
        let start = parse_date(start?)?;
        let end = parse_date(end?)?;
        Some(Self { start, end })
    }
}

/// Parse "YYYY-MM-DD" or a full ISO timestamp ("2025-05-30T00:00:00Z")
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
}

/// Weekday / weekend toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    #[default]
    All,
    Weekday,
    Weekend,
}

impl DayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::All => "all",
            DayType::Weekday => "weekday",
            DayType::Weekend => "weekend",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "all" => Some(DayType::All),
            "weekday" => Some(DayType::Weekday),
            "weekend" => Some(DayType::Weekend),
            _ => None,
        }
    }
}

/// Names every field of [`FilterState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterField {
    DateRange,
    Category,
    Brand,
    Location,
    WeekdayWeekend,
    Categories,
    Brands,
    Genders,
    AgeGroups,
    Locations,
    Products,
    IncomeRanges,
}

impl FilterField {
    pub const FIELDS: [FilterField; 12] = [
        FilterField::DateRange,
        FilterField::Category,
        FilterField::Brand,
        FilterField::Location,
        FilterField::WeekdayWeekend,
        FilterField::Categories,
        FilterField::Brands,
        FilterField::Genders,
        FilterField::AgeGroups,
        FilterField::Locations,
        FilterField::Products,
        FilterField::IncomeRanges,
    ];

    /// Field name as used in the persisted blob
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::DateRange => "dateRange",
            FilterField::Category => "category",
            FilterField::Brand => "brand",
            FilterField::Location => "location",
            FilterField::WeekdayWeekend => "weekdayWeekend",
            FilterField::Categories => "categories",
            FilterField::Brands => "brands",
            FilterField::Genders => "genders",
            FilterField::AgeGroups => "ageGroups",
            FilterField::Locations => "locations",
            FilterField::Products => "products",
            FilterField::IncomeRanges => "incomeRanges",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::FIELDS.into_iter().find(|f| f.as_str() == name)
    }

    /// Single-select facet with the "All" sentinel
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            FilterField::Category | FilterField::Brand | FilterField::Location
        )
    }

    /// Multi-valued facet where the empty set means "no filter"
    pub fn is_multi(&self) -> bool {
        matches!(
            self,
            FilterField::Categories
                | FilterField::Brands
                | FilterField::Genders
                | FilterField::AgeGroups
                | FilterField::Locations
                | FilterField::Products
                | FilterField::IncomeRanges
        )
    }

    /// Human-readable label used in filter summaries
    pub fn label(&self) -> &'static str {
        match self {
            FilterField::DateRange => "Date",
            FilterField::Category => "Category",
            FilterField::Brand => "Brand",
            FilterField::Location => "Location",
            FilterField::WeekdayWeekend => "Days",
            FilterField::Categories => "categories",
            FilterField::Brands => "brands",
            FilterField::Genders => "genders",
            FilterField::AgeGroups => "age groups",
            FilterField::Locations => "locations",
            FilterField::Products => "products",
            FilterField::IncomeRanges => "income ranges",
        }
    }
}

/// Canonical filter selection shared by all dashboard pages.
///
/// Multi-valued facets are sets and are never absent; the date range is
/// either fully populated or `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub date_range: Option<DateRange>,
    pub category: String,
    pub brand: String,
    pub location: String,
    pub weekday_weekend: DayType,
    pub categories: BTreeSet<String>,
    pub brands: BTreeSet<String>,
    pub genders: BTreeSet<String>,
    pub age_groups: BTreeSet<String>,
    pub locations: BTreeSet<String>,
    pub products: BTreeSet<String>,
    pub income_ranges: BTreeSet<String>,
}

impl Default for FilterState {
    /// "All time", every facet unfiltered
    fn default() -> Self {
        Self {
            date_range: None,
            category: ALL.to_string(),
            brand: ALL.to_string(),
            location: ALL.to_string(),
            weekday_weekend: DayType::All,
            categories: BTreeSet::new(),
            brands: BTreeSet::new(),
            genders: BTreeSet::new(),
            age_groups: BTreeSet::new(),
            locations: BTreeSet::new(),
            products: BTreeSet::new(),
            income_ranges: BTreeSet::new(),
        }
    }
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl FilterState {
    /// Defaults with a rolling window of `days` ending at `today`
    pub fn with_rolling_window(today: NaiveDate, days: u32) -> Self {
        let start = today - Duration::days(i64::from(days));
        Self {
            date_range: Some(DateRange::new(start, today)),
            ..Self::default()
        }
    }

    pub fn scalar(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Category => Some(&self.category),
            FilterField::Brand => Some(&self.brand),
            FilterField::Location => Some(&self.location),
            _ => None,
        }
    }

    pub fn scalar_mut(&mut self, field: FilterField) -> Option<&mut String> {
        match field {
            FilterField::Category => Some(&mut self.category),
            FilterField::Brand => Some(&mut self.brand),
            FilterField::Location => Some(&mut self.location),
            _ => None,
        }
    }

    pub fn facet(&self, field: FilterField) -> Option<&BTreeSet<String>> {
        match field {
            FilterField::Categories => Some(&self.categories),
            FilterField::Brands => Some(&self.brands),
            FilterField::Genders => Some(&self.genders),
            FilterField::AgeGroups => Some(&self.age_groups),
            FilterField::Locations => Some(&self.locations),
            FilterField::Products => Some(&self.products),
            FilterField::IncomeRanges => Some(&self.income_ranges),
            _ => None,
        }
    }

    pub fn facet_mut(&mut self, field: FilterField) -> Option<&mut BTreeSet<String>> {
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

    /// Drop blank members from every facet, trim scalars and restore the
    /// sentinel on blank ones. Must run after every merge and every mutation.
    pub fn normalized(mut self) -> Self {
        for field in FilterField::FIELDS {
            if let Some(scalar) = self.scalar_mut(field) {
                if is_blank(scalar) {
                    *scalar = ALL.to_string();
                } else if scalar.trim().len() != scalar.len() {
                    *scalar = scalar.trim().to_string();
                }
            }
            if let Some(facet) = self.facet_mut(field) {
                facet.retain(|value| !is_blank(value));
            }
        }
        self
    }

    /// Add `value` to a multi-valued facet, or remove it when present.
    /// Other fields are returned unchanged.
    pub fn toggled(mut self, field: FilterField, value: &str) -> Self {
        if let Some(facet) = self.facet_mut(field) {
            if !facet.remove(value) {
                facet.insert(value.to_string());
            }
        }
        self
    }

    /// Whether `field` currently narrows the data set
    pub fn is_active(&self, field: FilterField) -> bool {
        match field {
            FilterField::DateRange => self.date_range.is_some(),
            FilterField::WeekdayWeekend => self.weekday_weekend != DayType::All,
            f if f.is_scalar() => self.scalar(f).is_some_and(|v| v != ALL),
            f => self.facet(f).is_some_and(|set| !set.is_empty()),
        }
    }

    pub fn active_filter_count(&self) -> usize {
        FilterField::FIELDS
            .into_iter()
            .filter(|f| self.is_active(*f))
            .count()
    }

    pub fn has_active_filters(&self) -> bool {
        FilterField::FIELDS.into_iter().any(|f| self.is_active(f))
    }

    /// Short descriptions of active filters, e.g. `"Date: 2025-04-30 to 2025-05-30"`
    /// or `"3 brands"`
    pub fn summary(&self) -> Vec<String> {
        let mut parts = Vec::new();
        for field in FilterField::FIELDS {
            if !self.is_active(field) {
                continue;
            }
            match field {
                FilterField::DateRange => {
                    if let Some(range) = self.date_range {
                        parts.push(format!("Date: {} to {}", range.start, range.end));
                    }
                }
                FilterField::WeekdayWeekend => {
                    parts.push(format!("Days: {}", self.weekday_weekend.as_str()));
                }
                f if f.is_scalar() => {
                    if let Some(value) = self.scalar(f) {
                        parts.push(format!("{}: {}", f.label(), value));
                    }
                }
                f => {
                    if let Some(set) = self.facet(f) {
                        parts.push(format!("{} {}", set.len(), f.label()));
                    }
                }
            }
        }
        parts
    }
}
