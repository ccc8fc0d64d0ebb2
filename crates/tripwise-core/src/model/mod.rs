// ── Domain model ──
//
// Canonical types shared by the stores, the mock data sources and the
// front-ends. Everything serializes with serde so stores can persist it.

pub mod checkout;
pub mod currency;
pub mod flight;
pub mod hotel;
pub mod search;
pub mod selection;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use tripwise_core::model::*` gives you everything.

// Flights
pub use flight::{
    Airline, FlightLeg, FlightType, OneWayResult, RoundTripResult, Route, SearchResult,
    format_duration, parse_duration,
};

// Search state
pub use search::{
    AirlineFacet, AvailableFilters, CabinClass, DEFAULT_PAGE_LIMIT, DepartureWindow, FilterPatch,
    FilterState, Pagination, PaginationPatch, SearchParams, SortDirection, SortField, SortState,
    TripType,
};

// Hotels
pub use hotel::{HotelDetail, HotelListItem, HotelSearchParams, RoomOption};

// Selections
pub use selection::{FlightSelection, HotelSelection, SelectionId, SelectionRecord};

// Currency
pub use currency::{
    CurrencyCode, RateTable, as_amount, convert_from_base, convert_to_base, default_rates,
    format_amount,
};

// Checkout
pub use checkout::{
    Contact, ConvertedLine, DraftStatus, FlightDraft, HotelDraft, Passenger, PaymentChoice,
    PaymentMethod, PriceBreakdown, PriceComponent, PriceLine, Priced, SeatChoice,
    SelectedBreakdown, TicketType,
};
