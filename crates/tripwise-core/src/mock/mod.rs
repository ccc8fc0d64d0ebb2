// ── Simulated data sources ──
//
// Stand-ins for the fare search and hotel inventory backends. Both are
// deterministic so that re-running a command reproduces the same data.

pub mod flights;
pub mod hotels;

pub use flights::FlightGenerator;
pub use hotels::{HotelCatalog, MockHotelCatalog};
