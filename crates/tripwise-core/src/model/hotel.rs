// ── Hotel domain types ──

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Parameters of a hotel search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelSearchParams {
    pub city: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub rooms: u32,
}

impl HotelSearchParams {
    /// Nights between check-in and check-out. Inverted or equal dates count as one night.
    pub fn nights(&self) -> u32 {
        let days = (self.check_out - self.check_in).num_days();
        u32::try_from(days).ok().filter(|n| *n > 0).unwrap_or(1)
    }
}

/// A hotel as it appears in a result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelListItem {
    pub id: String,
    pub name: String,
    pub city: String,
    pub stars: u8,
    pub rating: f32,
    /// Cheapest nightly rate in the base currency.
    pub nightly_rate: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomOption {
    pub code: String,
    pub name: String,
    pub nightly_rate: u64,
    pub max_guests: u32,
    pub breakfast_included: bool,
}

/// Full hotel payload, resolved lazily after a selection is made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelDetail {
    pub id: String,
    pub name: String,
    pub city: String,
    pub address: String,
    pub stars: u8,
    pub rating: f32,
    pub description: String,
    pub amenities: Vec<String>,
    pub rooms: Vec<RoomOption>,
}

impl HotelDetail {
    pub fn to_list_item(&self) -> HotelListItem {
        HotelListItem {
            id: self.id.clone(),
            name: self.name.clone(),
            city: self.city.clone(),
            stars: self.stars,
            rating: self.rating,
            nightly_rate: self
                .rooms
                .iter()
                .map(|r| r.nightly_rate)
                .min()
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(check_in: (i32, u32, u32), check_out: (i32, u32, u32)) -> HotelSearchParams {
        let date = |(y, m, d): (i32, u32, u32)| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        HotelSearchParams {
            city: "Denpasar".into(),
            check_in: date(check_in),
            check_out: date(check_out),
            guests: 2,
            rooms: 1,
        }
    }

    #[test]
    fn nights_between_dates() {
        assert_eq!(params((2026, 11, 2), (2026, 11, 5)).nights(), 3);
    }

    #[test]
    fn inverted_dates_count_one_night() {
        assert_eq!(params((2026, 11, 5), (2026, 11, 2)).nights(), 1);
        assert_eq!(params((2026, 11, 5), (2026, 11, 5)).nights(), 1);
    }
}
