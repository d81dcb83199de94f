use std::collections::{BTreeMap, BTreeSet};

use super::patch::FilterPatch;
use super::state::{is_blank, DateRange, DayType, FilterField, FilterState, ALL, DATE_FORMAT};

/// Decoded URL query parameters, sorted by key for deterministic output
pub type QueryParams = BTreeMap<String, String>;

/// Recognized URL parameter names
pub mod param {
    pub const START: &str = "start";
    pub const END: &str = "end";
    pub const CATEGORY: &str = "category";
    pub const BRAND: &str = "brand";
    pub const LOCATION: &str = "location";
    pub const DAY_TYPE: &str = "dayType";
    pub const CATEGORIES: &str = "categories";
    pub const BRANDS: &str = "brands";
    pub const GENDERS: &str = "genders";
    pub const AGE_GROUPS: &str = "ageGroups";
    pub const LOCATIONS: &str = "locations";
    pub const PRODUCTS: &str = "products";
    pub const INCOME_RANGES: &str = "incomeRanges";

    pub const RECOGNIZED: [&str; 13] = [
        START,
        END,
        CATEGORY,
        BRAND,
        LOCATION,
        DAY_TYPE,
        CATEGORIES,
        BRANDS,
        GENDERS,
        AGE_GROUPS,
        LOCATIONS,
        PRODUCTS,
        INCOME_RANGES,
    ];
}

/// Separator between members of a multi-valued parameter
pub const MEMBER_DELIMITER: char = ',';

impl FilterField {
    /// URL parameter carrying this field; the date range uses
    /// [`param::START`] and [`param::END`] instead
    pub fn query_key(&self) -> Option<&'static str> {
        match self {
            FilterField::DateRange => None,
            FilterField::Category => Some(param::CATEGORY),
            FilterField::Brand => Some(param::BRAND),
            FilterField::Location => Some(param::LOCATION),
            FilterField::WeekdayWeekend => Some(param::DAY_TYPE),
            FilterField::Categories => Some(param::CATEGORIES),
            FilterField::Brands => Some(param::BRANDS),
            FilterField::Genders => Some(param::GENDERS),
            FilterField::AgeGroups => Some(param::AGE_GROUPS),
            FilterField::Locations => Some(param::LOCATIONS),
            FilterField::Products => Some(param::PRODUCTS),
            FilterField::IncomeRanges => Some(param::INCOME_RANGES),
        }
    }
}

/// Join members with `,`. Inside a member `%` becomes `%25` and `,`
/// becomes `%2C`, so members containing the delimiter survive.
pub fn encode_members(members: &BTreeSet<String>) -> String {
    members
        .iter()
        .map(|m| m.replace('%', "%25").replace(MEMBER_DELIMITER, "%2C"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Inverse of [`encode_members`]. Blank members are dropped and a member
/// that fails to decode is kept as written.
pub fn decode_members(raw: &str) -> BTreeSet<String> {
    raw.split(MEMBER_DELIMITER)
        .filter(|m| !is_blank(m))
        .map(|m| match urlencoding::decode(m) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => m.to_string(),
        })
        .filter(|m| !is_blank(m))
        .collect()
}

fn decode_component(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    let decoded = urlencoding::decode(&raw).map(|d| d.into_owned()).ok();
    decoded.unwrap_or(raw)
}

/// Parse a `location.search` string pair by pair. Bracketed keys are kept
/// as plain keys, the first value of a repeated key wins and a component
/// that fails to decode is kept as written.
pub fn parse_query(search: &str) -> QueryParams {
    let mut params = QueryParams::new();
    for pair in search.trim_start_matches('?').split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key);
        if key.is_empty() {
            continue;
        }
        params.entry(key).or_insert_with(|| decode_component(value));
    }
    params
}

fn non_blank<'a>(params: &'a QueryParams, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str).filter(|v| !is_blank(v))
}

impl FilterPatch {
    /// Read recognized parameters. Unknown parameters and malformed values
    /// are ignored.
    pub fn from_query(params: &QueryParams) -> Self {
        let mut patch = FilterPatch::new();

        if let Some(range) = DateRange::parse(
            non_blank(params, param::START),
            non_blank(params, param::END),
        ) {
            patch.date_range = Some(Some(range));
        }

        for field in FilterField::FIELDS {
            let Some(raw) = field.query_key().and_then(|key| non_blank(params, key)) else {
                continue;
            };
            if field.is_scalar() {
                patch = patch.scalar(field, raw.trim());
            } else if field == FilterField::WeekdayWeekend {
                patch.weekday_weekend = DayType::parse(raw);
            } else if let Some(slot) = patch.facet_slot(field) {
                let members = decode_members(raw);
                if !members.is_empty() {
                    *slot = Some(members);
                }
            }
        }

        patch
    }
}

impl FilterState {
    /// Query parameters for this state. Sentinels and empty facets are
    /// omitted, so the default state produces no parameters.
    pub fn to_query(&self) -> QueryParams {
        let mut params = QueryParams::new();

        if let Some(range) = self.date_range {
            params.insert(param::START.to_string(), range.start.format(DATE_FORMAT).to_string());
            params.insert(param::END.to_string(), range.end.format(DATE_FORMAT).to_string());
        }

        for field in FilterField::FIELDS {
            let Some(key) = field.query_key() else {
                continue;
            };
            let value = if let Some(scalar) = self.scalar(field) {
                (scalar != ALL && !is_blank(scalar)).then(|| scalar.to_string())
            } else if let Some(members) = self.facet(field) {
                (!members.is_empty()).then(|| encode_members(members))
            } else if field == FilterField::WeekdayWeekend {
                (self.weekday_weekend != DayType::All)
                    .then(|| self.weekday_weekend.as_str().to_string())
            } else {
                None
            };
            if let Some(value) = value {
                params.insert(key.to_string(), value);
            }
        }

        params
    }

    /// Rewrite the recognized parameters in `params`, keeping any
    /// unrelated ones as they are
    pub fn apply_to_query(&self, params: &mut QueryParams) {
        params.retain(|key, _| !param::RECOGNIZED.contains(&key.as_str()));
        params.extend(self.to_query());
    }
}
