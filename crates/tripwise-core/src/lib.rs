//! State layer for the tripwise booking flow.
//!
//! Every store is an explicitly constructed object with its own lifecycle;
//! front-ends build one of each per session and pass references around.
//!
//! - **[`SearchStore`]** owns one flight search from raw results through a
//!   filtered, sorted, paginated view, plus the facet catalog derived from
//!   the raw set.
//!
//! - **[`SelectionStore`]** turns a list pick into a persisted record
//!   addressable by an opaque [`SelectionId`], with a capped
//!   most-recent-first history.
//!
//! - **[`CurrencyStore`]** holds the exchange-rate table and the display
//!   currency. Pure data; conversion helpers live in [`model::currency`].
//!
//! - **[`FlightCheckoutStore`] / [`HotelCheckoutStore`]** accumulate the
//!   price-affecting choices of one booking in the base currency and expose
//!   the breakdown, converted on read.
//!
//! - **[`loader`]** runs the simulated backends in [`mock`] into the stores.
//!
//! State persists through the [`Storage`] trait as versioned JSON envelopes.

pub mod config;
pub mod error;
pub mod loader;
pub mod mock;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::StoreConfig;
pub use error::CoreError;
pub use mock::{FlightGenerator, HotelCatalog, MockHotelCatalog};
pub use store::{
    CurrencyState, CurrencyStore, FileStorage, FlightCheckoutStore, HotelCheckoutStore,
    MemoryStorage, SearchStore, SelectionStore, Storage,
};

pub use model::{
    // Checkout
    DraftStatus,
    FlightDraft,
    HotelDraft,
    PaymentMethod,
    PriceBreakdown,
    SelectedBreakdown,
    TicketType,
    // Currency
    CurrencyCode,
    // Search
    FilterPatch,
    FilterState,
    SearchParams,
    SearchResult,
    SortDirection,
    SortField,
    SortState,
    // Selections
    HotelSearchParams,
    SelectionId,
    SelectionRecord,
};
