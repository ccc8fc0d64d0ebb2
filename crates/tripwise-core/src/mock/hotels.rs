// ── Hotel catalog ──
//
// A fixed registry of hotels with a simulated lookup delay. A miss is the
// one failure the core models as a real error.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{HotelDetail, HotelListItem, RoomOption};

/// Asynchronous hotel detail lookup.
pub trait HotelCatalog: Send + Sync {
    fn get_hotel_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<HotelDetail, CoreError>> + Send;
}

#[derive(Debug, Clone)]
pub struct MockHotelCatalog {
    hotels: Vec<HotelDetail>,
    latency: Duration,
}

impl MockHotelCatalog {
    pub fn new(latency: Duration) -> Self {
        Self {
            hotels: seed_hotels(),
            latency,
        }
    }

    pub fn with_hotels(hotels: Vec<HotelDetail>, latency: Duration) -> Self {
        Self { hotels, latency }
    }

    /// List items, optionally restricted to a city (case-insensitive).
    pub fn list(&self, city: Option<&str>) -> Vec<HotelListItem> {
        self.hotels
            .iter()
            .filter(|h| city.is_none_or(|c| h.city.eq_ignore_ascii_case(c.trim())))
            .map(HotelDetail::to_list_item)
            .collect()
    }

    /// Synchronous list-item lookup, for building selections.
    pub fn list_item(&self, id: &str) -> Option<HotelListItem> {
        self.hotels
            .iter()
            .find(|h| h.id == id)
            .map(HotelDetail::to_list_item)
    }
}

impl Default for MockHotelCatalog {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl HotelCatalog for MockHotelCatalog {
    async fn get_hotel_by_id(&self, id: &str) -> Result<HotelDetail, CoreError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match self.hotels.iter().find(|h| h.id == id) {
            Some(hotel) => {
                debug!(hotel = id, "hotel detail resolved");
                Ok(hotel.clone())
            }
            None => {
                warn!(hotel = id, "hotel not in catalog");
                Err(CoreError::HotelNotFound { id: id.to_owned() })
            }
        }
    }
}

fn room(code: &str, name: &str, nightly_rate: u64, max_guests: u32, breakfast: bool) -> RoomOption {
    RoomOption {
        code: code.into(),
        name: name.into(),
        nightly_rate,
        max_guests,
        breakfast_included: breakfast,
    }
}

fn amenities(items: &[&str]) -> Vec<String> {
    items.iter().map(|a| (*a).to_owned()).collect()
}

#[allow(clippy::too_many_lines)]
fn seed_hotels() -> Vec<HotelDetail> {
    vec![
        HotelDetail {
            id: "HTL-DPS-001".into(),
            name: "Seminyak Beach Resort".into(),
            city: "Bali".into(),
            address: "Jl. Kayu Aya 1, Seminyak".into(),
            stars: 5,
            rating: 4.7,
            description: "Beachfront resort with lagoon pools and a spa.".into(),
            amenities: amenities(&["pool", "spa", "beach access", "wifi"]),
            rooms: vec![
                room("DLX", "Deluxe King", 2_150_000, 2, true),
                room("STE", "Lagoon Suite", 3_900_000, 3, true),
            ],
        },
        HotelDetail {
            id: "HTL-DPS-002".into(),
            name: "Ubud Valley Villas".into(),
            city: "Bali".into(),
            address: "Jl. Raya Sanggingan 88, Ubud".into(),
            stars: 4,
            rating: 4.6,
            description: "Private villas overlooking the Ayung river valley.".into(),
            amenities: amenities(&["private pool", "yoga deck", "wifi"]),
            rooms: vec![
                room("VIL1", "One Bedroom Villa", 1_750_000, 2, true),
                room("VIL2", "Two Bedroom Villa", 2_900_000, 4, true),
            ],
        },
        HotelDetail {
            id: "HTL-CGK-001".into(),
            name: "Thamrin City Hotel".into(),
            city: "Jakarta".into(),
            address: "Jl. M.H. Thamrin 10, Jakarta Pusat".into(),
            stars: 4,
            rating: 4.4,
            description: "Business hotel steps from the MRT.".into(),
            amenities: amenities(&["gym", "meeting rooms", "wifi"]),
            rooms: vec![
                room("SUP", "Superior Twin", 950_000, 2, false),
                room("EXE", "Executive King", 1_450_000, 2, true),
            ],
        },
        HotelDetail {
            id: "HTL-CGK-002".into(),
            name: "Kemang Boutique Stay".into(),
            city: "Jakarta".into(),
            address: "Jl. Kemang Raya 21, Jakarta Selatan".into(),
            stars: 3,
            rating: 4.2,
            description: "Small hotel in a lively dining district.".into(),
            amenities: amenities(&["rooftop bar", "wifi"]),
            rooms: vec![room("STD", "Standard Queen", 620_000, 2, false)],
        },
        HotelDetail {
            id: "HTL-YIA-001".into(),
            name: "Malioboro Heritage Inn".into(),
            city: "Yogyakarta".into(),
            address: "Jl. Malioboro 52, Yogyakarta".into(),
            stars: 3,
            rating: 4.3,
            description: "Restored colonial house near the kraton.".into(),
            amenities: amenities(&["garden", "bicycle rental", "wifi"]),
            rooms: vec![
                room("STD", "Standard Double", 540_000, 2, true),
                room("FAM", "Family Room", 880_000, 4, true),
            ],
        },
        HotelDetail {
            id: "HTL-BDO-001".into(),
            name: "Dago Highlands Hotel".into(),
            city: "Bandung".into(),
            address: "Jl. Ir. H. Juanda 300, Bandung".into(),
            stars: 4,
            rating: 4.5,
            description: "Hillside hotel with views over the city.".into(),
            amenities: amenities(&["heated pool", "restaurant", "wifi"]),
            rooms: vec![room("DLX", "Deluxe Valley View", 1_100_000, 2, true)],
        },
    ]
}
