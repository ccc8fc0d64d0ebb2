// ── Flight result domain types ──
//
// A search result is either a single one-way leg with its own price, or an
// outbound + return pair carrying one bundle price. Every consumer matches on
// the variant; nothing inspects field presence.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Airline {
    /// IATA carrier code (e.g. "GA").
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub origin: String,
    pub destination: String,
}

/// Whether a leg flies non-stop.
///
/// Transit legs are not broken down by hop count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightType {
    Direct,
    Transit,
}

/// One directional flight segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightLeg {
    pub flight_number: String,
    pub airline: Airline,
    pub aircraft: String,
    pub flight_type: FlightType,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    /// Human-readable block time, `"<H>h <M>m"`.
    pub duration: String,
    pub route: Route,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transit_airport: Option<String>,
}

impl FlightLeg {
    pub fn is_direct(&self) -> bool {
        matches!(self.flight_type, FlightType::Direct)
    }

    /// Block time in minutes. Malformed durations count as zero.
    pub fn duration_minutes(&self) -> u32 {
        parse_duration(&self.duration)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneWayResult {
    pub id: String,
    /// Fare in the base currency.
    pub price: u64,
    #[serde(flatten)]
    pub leg: FlightLeg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTripResult {
    pub id: String,
    pub outbound: FlightLeg,
    #[serde(rename = "return")]
    pub inbound: FlightLeg,
    /// Bundle fare for both legs in the base currency. Not a leg sum.
    pub total_price: u64,
}

/// A flight search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchResult {
    OneWay(OneWayResult),
    RoundTrip(RoundTripResult),
}

impl SearchResult {
    pub fn id(&self) -> &str {
        match self {
            Self::OneWay(r) => &r.id,
            Self::RoundTrip(r) => &r.id,
        }
    }

    /// The price shown to the user: the one-way fare or the round-trip bundle.
    pub fn display_price(&self) -> u64 {
        match self {
            Self::OneWay(r) => r.price,
            Self::RoundTrip(r) => r.total_price,
        }
    }

    /// The leg that represents the result for departure, arrival and
    /// airline purposes (the outbound leg of a round trip).
    pub fn primary_leg(&self) -> &FlightLeg {
        match self {
            Self::OneWay(r) => &r.leg,
            Self::RoundTrip(r) => &r.outbound,
        }
    }

    /// All legs in travel order.
    pub fn legs(&self) -> Vec<&FlightLeg> {
        match self {
            Self::OneWay(r) => vec![&r.leg],
            Self::RoundTrip(r) => vec![&r.outbound, &r.inbound],
        }
    }

    /// Total block time across every leg, in minutes.
    pub fn total_duration_minutes(&self) -> u32 {
        match self {
            Self::OneWay(r) => r.leg.duration_minutes(),
            Self::RoundTrip(r) => r
                .outbound
                .duration_minutes()
                .saturating_add(r.inbound.duration_minutes()),
        }
    }

    pub fn is_round_trip(&self) -> bool {
        matches!(self, Self::RoundTrip(_))
    }
}

/// Parse a `"<H>h <M>m"` duration into minutes.
///
/// Either component may be missing (`"45m"`, `"2h"`). Anything that does not
/// fit the pattern yields 0.
pub fn parse_duration(raw: &str) -> u32 {
    let mut hours: Option<u32> = None;
    let mut minutes: Option<u32> = None;

    for token in raw.split_whitespace() {
        if let Some(h) = token.strip_suffix('h') {
            match (hours, h.parse::<u32>()) {
                (None, Ok(v)) => hours = Some(v),
                _ => return 0,
            }
        } else if let Some(m) = token.strip_suffix('m') {
            match (minutes, m.parse::<u32>()) {
                (None, Ok(v)) => minutes = Some(v),
                _ => return 0,
            }
        } else {
            return 0;
        }
    }

    if hours.is_none() && minutes.is_none() {
        return 0;
    }

    hours
        .unwrap_or(0)
        .saturating_mul(60)
        .saturating_add(minutes.unwrap_or(0))
}

/// Render minutes back into the `"<H>h <M>m"` form.
pub fn format_duration(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}
