// ── Stores ──
//
// Each store is an explicitly constructed object that owns its state and
// serializes its own mutations. Front-ends build one of each per session
// and hand references to whatever needs them.

pub mod checkout;
pub mod currency;
pub mod persist;
pub mod search;
pub mod selection;

pub use checkout::{Draft, DraftBook, FlightCheckoutStore, HotelCheckoutStore};
pub use currency::{CurrencyState, CurrencyStore};
pub use persist::{FileStorage, MemoryStorage, PersistSlot, Storage};
pub use search::{SearchSnapshot, SearchStore};
pub use selection::SelectionStore;
