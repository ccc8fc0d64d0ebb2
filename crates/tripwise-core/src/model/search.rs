// ── Search parameters, filter, sort and pagination state ──

use chrono::{NaiveDate, NaiveTime, Timelike};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TripType {
    OneWay,
    RoundTrip,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CabinClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

/// Identity of one flight search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchParams {
    /// Candidate origin airport codes (a city may map to several airports).
    pub origin: Vec<String>,
    pub destination: Vec<String>,
    pub departure_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    pub passengers: u32,
    #[serde(default)]
    pub cabin_class: CabinClass,
    pub trip_type: TripType,
    /// Desired number of results. Generators treat this as a target, not a guarantee.
    pub result_count: usize,
}

/// Coarse time-of-day bucket for the departure filter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DepartureWindow {
    /// 00:00–05:59
    EarlyMorning,
    /// 06:00–11:59
    Morning,
    /// 12:00–17:59
    Afternoon,
    /// 18:00–23:59
    Evening,
}

impl DepartureWindow {
    pub fn of(time: NaiveTime) -> Self {
        match time.hour() {
            0..=5 => Self::EarlyMorning,
            6..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    pub fn contains(self, time: NaiveTime) -> bool {
        Self::of(time) == self
    }
}

/// Active filter predicates.
///
/// Empty allow-lists and `None` stop limits mean "no constraint".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Inclusive display-price bounds in the base currency.
    pub price_range: (u64, u64),
    pub airlines: Vec<String>,
    pub max_stops: Option<u8>,
    pub departure_windows: Vec<DepartureWindow>,
    /// Inclusive total-duration bounds in minutes.
    pub duration_range: (u32, u32),
    pub aircraft: Vec<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            price_range: (0, u64::MAX),
            airlines: Vec::new(),
            max_stops: None,
            departure_windows: Vec::new(),
            duration_range: (0, u32::MAX),
            aircraft: Vec::new(),
        }
    }
}

impl FilterState {
    /// Unconstrained filters bounded by the observed facet ranges.
    pub fn bounded_by(available: &AvailableFilters) -> Self {
        Self {
            price_range: available.price_range,
            duration_range: available.duration_range,
            ..Self::default()
        }
    }

    /// Shallow merge: every field present in the patch replaces the current one.
    pub fn merge(&mut self, patch: FilterPatch) {
        if let Some(v) = patch.price_range {
            self.price_range = v;
        }
        if let Some(v) = patch.airlines {
            self.airlines = v;
        }
        if let Some(v) = patch.max_stops {
            self.max_stops = v;
        }
        if let Some(v) = patch.departure_windows {
            self.departure_windows = v;
        }
        if let Some(v) = patch.duration_range {
            self.duration_range = v;
        }
        if let Some(v) = patch.aircraft {
            self.aircraft = v;
        }
    }
}

/// Partial filter update. `max_stops: Some(None)` clears the stop limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub price_range: Option<(u64, u64)>,
    pub airlines: Option<Vec<String>>,
    pub max_stops: Option<Option<u8>>,
    pub departure_windows: Option<Vec<DepartureWindow>>,
    pub duration_range: Option<(u32, u32)>,
    pub aircraft: Option<Vec<String>>,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortField {
    #[default]
    Price,
    Duration,
    Departure,
    Arrival,
    Airline,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// Page window over the filtered results. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            total: 0,
        }
    }
}

impl Pagination {
    pub fn total_pages(&self) -> usize {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit)
    }

    /// Index range of the current page, clamped to `total`.
    pub fn window(&self) -> std::ops::Range<usize> {
        let start = self
            .page
            .saturating_sub(1)
            .saturating_mul(self.limit)
            .min(self.total);
        let end = start.saturating_add(self.limit).min(self.total);
        start..end
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationPatch {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirlineFacet {
    pub name: String,
    pub count: usize,
}

/// Facet catalog derived from a raw result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableFilters {
    /// Airline code -> observed name and leg count, in first-seen order.
    pub airlines: IndexMap<String, AirlineFacet>,
    /// Aircraft type -> leg count, in first-seen order.
    pub aircraft: IndexMap<String, usize>,
    pub price_range: (u64, u64),
    pub duration_range: (u32, u32),
}
