//! Search filter and option normalization
//!
//! Turns the raw key/value pairs of a search request into a canonical
//! `NormalizedFilter` and `SearchOptions`. Normalization never fails:
//! - unknown keys are dropped
//! - unparsable numbers are dropped (never defaulted to zero)
//! - text is NFKC-normalized, trimmed, whitespace-collapsed and lowercased
//! - out-of-range options are clamped or replaced by their defaults

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use super::string_normalization::normalize_filter_text;
use crate::config::SearchConfig;

const NAME_KEYS: &[&str] = &["name", "search", "text"];
const TYPE_KEYS: &[&str] = &["typeId", "type_id", "type"];
const RARITY_KEYS: &[&str] = &["rarityId", "rarity_id", "rarity"];
const SET_KEYS: &[&str] = &["setId", "set_id", "set"];
const FACTION_KEYS: &[&str] = &["faction"];
const SERIES_KEYS: &[&str] = &["series"];
const LEVEL_MIN_KEYS: &[&str] = &["levelMin", "level_min"];
const LEVEL_MAX_KEYS: &[&str] = &["levelMax", "level_max"];
const COST_MIN_KEYS: &[&str] = &["costMin", "cost_min"];
const COST_MAX_KEYS: &[&str] = &["costMax", "cost_max"];

const PAGE_KEYS: &[&str] = &["page"];
const LIMIT_KEYS: &[&str] = &["limit", "pageSize"];
const SORT_BY_KEYS: &[&str] = &["sortBy", "sort"];
const SORT_ORDER_KEYS: &[&str] = &["sortOrder", "order"];
const INCLUDE_RELATIONS_KEYS: &[&str] = &["includeRelations"];

/// Inclusive numeric bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NumericRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
}

impl NumericRange {
    fn from_bounds(min: Option<i32>, max: Option<i32>) -> Option<Self> {
        if min.is_none() && max.is_none() {
            None
        } else {
            Some(Self { min, max })
        }
    }

    /// `min > max`: no value can satisfy the range.
    pub fn is_inverted(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if min > max)
    }

    pub fn contains(&self, value: i32) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Canonical card filters. Absent filters are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rarity_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<NumericRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<NumericRange>,
}

impl NormalizedFilter {
    pub fn from_raw(raw: &HashMap<String, String>) -> Self {
        Self {
            name: first_text(raw, NAME_KEYS),
            type_id: first_parsed(raw, TYPE_KEYS),
            rarity_id: first_parsed(raw, RARITY_KEYS),
            set_id: first_parsed(raw, SET_KEYS),
            faction: first_text(raw, FACTION_KEYS),
            series: first_text(raw, SERIES_KEYS),
            level: NumericRange::from_bounds(
                first_parsed(raw, LEVEL_MIN_KEYS),
                first_parsed(raw, LEVEL_MAX_KEYS),
            ),
            cost: NumericRange::from_bounds(
                first_parsed(raw, COST_MIN_KEYS),
                first_parsed(raw, COST_MAX_KEYS),
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Set filters keyed by their canonical names, in sorted order.
    ///
    /// Ranges flatten into `levelMin`/`levelMax`/`costMin`/`costMax` so that
    /// every entry is a scalar.
    pub fn canonical_fields(&self) -> BTreeMap<&'static str, Value> {
        let mut fields = BTreeMap::new();
        let mut put = |key: &'static str, value: Option<Value>| {
            if let Some(value) = value {
                fields.insert(key, value);
            }
        };
        put("name", self.name.clone().map(Value::from));
        put("typeId", self.type_id.map(Value::from));
        put("rarityId", self.rarity_id.map(Value::from));
        put("setId", self.set_id.map(Value::from));
        put("faction", self.faction.clone().map(Value::from));
        put("series", self.series.clone().map(Value::from));
        put("levelMin", self.level.and_then(|r| r.min).map(Value::from));
        put("levelMax", self.level.and_then(|r| r.max).map(Value::from));
        put("costMin", self.cost.and_then(|r| r.min).map(Value::from));
        put("costMax", self.cost.and_then(|r| r.max).map(Value::from));
        fields
    }
}

/// Allow-listed sort fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Name,
    Level,
    Cost,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(Self::Name),
            "level" => Some(Self::Level),
            "cost" => Some(Self::Cost),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Level => "level",
            Self::Cost => "cost",
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Page size bounds applied while normalizing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl From<&SearchConfig> for SearchLimits {
    fn from(config: &SearchConfig) -> Self {
        let max_limit = config.max_limit.max(1);
        Self {
            default_limit: config.default_limit.clamp(1, max_limit),
            max_limit,
        }
    }
}

/// Validated pagination, sorting and projection options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub include_relations: bool,
}

impl SearchOptions {
    pub fn from_raw(raw: &HashMap<String, String>, limits: &SearchLimits) -> Self {
        let page = first_parsed::<i64>(raw, PAGE_KEYS)
            .map(|p| p.clamp(1, u32::MAX as i64) as u32)
            .unwrap_or(1);

        let limit = first_parsed::<i64>(raw, LIMIT_KEYS)
            .map(|l| l.clamp(1, limits.max_limit as i64) as u32)
            .unwrap_or(limits.default_limit);

        // An unknown sort field resets the whole sort to the default, order included.
        let sort_field = first_valid(raw, SORT_BY_KEYS, |v| SortField::parse(v.trim()));
        let (sort_by, sort_order) = match sort_field {
            Some(field) => (field, parse_sort_order(raw)),
            None if first_raw(raw, SORT_BY_KEYS).is_some() => {
                (SortField::default(), SortOrder::default())
            }
            None => (SortField::default(), parse_sort_order(raw)),
        };

        let include_relations =
            first_valid(raw, INCLUDE_RELATIONS_KEYS, parse_bool).unwrap_or(false);

        Self {
            page,
            limit,
            sort_by,
            sort_order,
            include_relations,
        }
    }

    pub fn with_limits(limits: &SearchLimits) -> Self {
        Self::from_raw(&HashMap::new(), limits)
    }

    /// Rows to skip for the requested page.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    pub fn canonical_fields(&self) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([
            ("includeRelations", Value::from(self.include_relations)),
            ("limit", Value::from(self.limit)),
            ("page", Value::from(self.page)),
            ("sortBy", Value::from(self.sort_by.as_str())),
            ("sortOrder", Value::from(self.sort_order.as_str())),
        ])
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::with_limits(&SearchLimits::default())
    }
}

/// Split mixed query-string items into filter and option maps.
///
/// When a key repeats, the last occurrence wins.
pub fn split_query_items(
    items: &[(String, String)],
) -> (HashMap<String, String>, HashMap<String, String>) {
    let mut filters = HashMap::new();
    let mut options = HashMap::new();
    for (key, value) in items {
        if is_option_key(key) {
            options.insert(key.clone(), value.clone());
        } else {
            filters.insert(key.clone(), value.clone());
        }
    }
    (filters, options)
}

fn is_option_key(key: &str) -> bool {
    [
        PAGE_KEYS,
        LIMIT_KEYS,
        SORT_BY_KEYS,
        SORT_ORDER_KEYS,
        INCLUDE_RELATIONS_KEYS,
    ]
    .iter()
    .any(|keys| keys.contains(&key))
}

fn parse_sort_order(raw: &HashMap<String, String>) -> SortOrder {
    first_valid(raw, SORT_ORDER_KEYS, SortOrder::parse).unwrap_or_default()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn first_raw<'a>(raw: &'a HashMap<String, String>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| raw.get(*k)).map(String::as_str)
}

/// First alias whose value `parse` accepts, in alias priority order.
fn first_valid<T>(
    raw: &HashMap<String, String>,
    keys: &[&str],
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    keys.iter()
        .filter_map(|k| raw.get(*k))
        .find_map(|v| parse(v))
}

fn first_text(raw: &HashMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| raw.get(*k))
        .find_map(|v| normalize_filter_text(v))
}

fn first_parsed<T: std::str::FromStr>(raw: &HashMap<String, String>, keys: &[&str]) -> Option<T> {
    keys.iter()
        .filter_map(|k| raw.get(*k))
        .find_map(|v| v.trim().parse::<T>().ok())
}
