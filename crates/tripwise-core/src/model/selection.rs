// ── Selection records ──
//
// A selection pins one picked list item to an opaque id that checkout pages
// receive as their only input.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::flight::SearchResult;
use super::hotel::{HotelDetail, HotelListItem, HotelSearchParams};
use super::search::SearchParams;

/// Opaque selection identifier, a random v4 UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionId(Uuid);

impl SelectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SelectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SelectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SelectionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl From<Uuid> for SelectionId {
    fn from(u: Uuid) -> Self {
        Self(u)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSelection {
    pub id: SelectionId,
    pub created_at: DateTime<Utc>,
    pub search_params: SearchParams,
    pub item: SearchResult,
}

impl FlightSelection {
    /// Fare for the whole party in the base currency: display price times passengers.
    ///
    /// Recomputed identically from the record on every call, so checkout pages
    /// reached by deep link can re-initialise a draft safely.
    pub fn base_fare(&self) -> u64 {
        self.item
            .display_price()
            .saturating_mul(u64::from(self.search_params.passengers.max(1)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelSelection {
    pub id: SelectionId,
    pub created_at: DateTime<Utc>,
    pub search_params: HotelSearchParams,
    pub list_item: HotelListItem,
    /// Detail payload, fetched lazily and cached once per selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<HotelDetail>,
}

impl HotelSelection {
    pub fn nights(&self) -> u32 {
        self.search_params.nights()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionRecord {
    Flight(FlightSelection),
    Hotel(HotelSelection),
}

impl SelectionRecord {
    pub fn id(&self) -> SelectionId {
        match self {
            Self::Flight(s) => s.id,
            Self::Hotel(s) => s.id,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Flight(s) => s.created_at,
            Self::Hotel(s) => s.created_at,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Flight(_) => "flight",
            Self::Hotel(_) => "hotel",
        }
    }

    pub fn as_flight(&self) -> Option<&FlightSelection> {
        match self {
            Self::Flight(s) => Some(s),
            Self::Hotel(_) => None,
        }
    }

    pub fn as_hotel(&self) -> Option<&HotelSelection> {
        match self {
            Self::Hotel(s) => Some(s),
            Self::Flight(_) => None,
        }
    }

    /// One-line description for listings.
    pub fn summary(&self) -> String {
        match self {
            Self::Flight(s) => {
                let leg = s.item.primary_leg();
                format!(
                    "{} {} {}→{}",
                    leg.airline.code,
                    leg.flight_number,
                    leg.route.origin,
                    leg.route.destination
                )
            }
            Self::Hotel(s) => format!("{} ({})", s.list_item.name, s.list_item.city),
        }
    }
}
