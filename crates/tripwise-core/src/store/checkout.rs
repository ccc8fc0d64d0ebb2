// ── Checkout draft stores ──
//
// One draft per booking id, every amount in the base currency. Each setter
// touches exactly one facet and re-derives `total` from the price lines
// before the entry lock is released, so readers never see a stale total.
// Conversion into the display currency happens only in
// `get_selected_breakdown`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::currency::CurrencyStore;
use super::persist::{FLIGHT_CHECKOUT_KEY, HOTEL_CHECKOUT_KEY, PersistSlot, Storage};
use crate::model::{
    Contact, ConvertedLine, CurrencyCode, DraftStatus, FlightDraft, HotelDraft, Passenger,
    PaymentChoice, PaymentMethod, PriceBreakdown, Priced, SeatChoice, SelectedBreakdown,
    SelectionId, TicketType, as_amount, convert_from_base,
};

const SCHEMA_VERSION: u32 = 1;

/// A checkout draft the shared book can hold.
pub trait Draft: Priced + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn booking_id(&self) -> SelectionId;
    fn status_mut(&mut self) -> &mut DraftStatus;
    fn total_mut(&mut self) -> &mut u64;
    fn stamp(&mut self);

    /// Recompute the stored total from the price lines.
    fn refresh(&mut self) {
        let total = self.sum_of_lines();
        *self.total_mut() = total;
        self.stamp();
    }
}

impl Draft for FlightDraft {
    fn booking_id(&self) -> SelectionId {
        self.booking_id
    }
    fn status_mut(&mut self) -> &mut DraftStatus {
        &mut self.status
    }
    fn total_mut(&mut self) -> &mut u64 {
        &mut self.total
    }
    fn stamp(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Draft for HotelDraft {
    fn booking_id(&self) -> SelectionId {
        self.booking_id
    }
    fn status_mut(&mut self) -> &mut DraftStatus {
        &mut self.status
    }
    fn total_mut(&mut self) -> &mut u64 {
        &mut self.total
    }
    fn stamp(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ── DraftBook ───────────────────────────────────────────────────────

/// Keyed draft storage shared by the flight and hotel stores.
pub struct DraftBook<D: Draft> {
    drafts: DashMap<SelectionId, D>,
    base: CurrencyCode,
    slot: Option<PersistSlot>,
    /// Held from a mutation through its save so writes land in order.
    write: Mutex<()>,
}

impl<D: Draft> DraftBook<D> {
    fn new(base: CurrencyCode) -> Self {
        Self {
            drafts: DashMap::new(),
            base,
            slot: None,
            write: Mutex::new(()),
        }
    }

    fn open(storage: Arc<dyn Storage>, key: &'static str, base: CurrencyCode) -> Self {
        let slot = PersistSlot::new(storage, key, SCHEMA_VERSION);
        let drafts = DashMap::new();
        for draft in slot.load::<Vec<D>>().unwrap_or_default() {
            drafts.insert(draft.booking_id(), draft);
        }
        debug!(key, restored = drafts.len(), "checkout drafts opened");
        Self {
            drafts,
            base,
            slot: Some(slot),
            write: Mutex::new(()),
        }
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write every draft. Callers hold the write lock and no entry guard.
    fn persist(&self, _writes: &MutexGuard<'_, ()>) {
        if let Some(slot) = &self.slot {
            let mut all: Vec<D> = self.drafts.iter().map(|e| e.value().clone()).collect();
            all.sort_by_key(|d| d.booking_id());
            slot.save(&all);
        }
    }

    fn insert(&self, mut draft: D) {
        draft.refresh();
        let writes = self.lock_writes();
        self.drafts.insert(draft.booking_id(), draft);
        self.persist(&writes);
    }

    /// Apply `edit` to one draft and refresh its total. `false` when the
    /// id has no draft.
    fn update(&self, id: &SelectionId, field: &'static str, edit: impl FnOnce(&mut D)) -> bool {
        let writes = self.lock_writes();
        {
            let Some(mut entry) = self.drafts.get_mut(id) else {
                debug!(%id, field, "no draft for booking id, ignoring update");
                return false;
            };
            edit(entry.value_mut());
            entry.value_mut().refresh();
        }
        self.persist(&writes);
        true
    }

    fn set_status(&self, id: &SelectionId, status: DraftStatus) -> bool {
        self.update(id, "status", |draft| {
            let previous = *draft.status_mut();
            if !previous.allows(status) {
                warn!(%id, from = %previous, to = %status, "backward checkout status transition");
            }
            *draft.status_mut() = status;
        })
    }

    fn get(&self, id: &SelectionId) -> Option<D> {
        self.drafts.get(id).map(|e| e.value().clone())
    }

    fn remove(&self, id: &SelectionId) -> bool {
        let writes = self.lock_writes();
        let removed = self.drafts.remove(id).is_some();
        if removed {
            self.persist(&writes);
        }
        removed
    }

    /// Drop every draft whose id fails `keep`. Returns how many went.
    fn retain(&self, keep: impl Fn(&SelectionId) -> bool) -> usize {
        let writes = self.lock_writes();
        let before = self.drafts.len();
        self.drafts.retain(|id, _| keep(id));
        let pruned = before - self.drafts.len();
        if pruned > 0 {
            self.persist(&writes);
        }
        pruned
    }

    fn ids(&self) -> Vec<SelectionId> {
        let mut ids: Vec<SelectionId> = self.drafts.iter().map(|e| *e.key()).collect();
        ids.sort();
        ids
    }

    fn price_breakdown(&self, id: &SelectionId) -> Option<PriceBreakdown> {
        let entry = self.drafts.get(id)?;
        let lines = entry.price_lines();
        let total = entry.sum_of_lines();
        Some(PriceBreakdown {
            currency: self.base,
            lines,
            total,
        })
    }

    fn selected_breakdown(
        &self,
        id: &SelectionId,
        currency: &CurrencyStore,
    ) -> Option<SelectedBreakdown> {
        self.price_breakdown(id)
            .map(|breakdown| to_selected(&breakdown, currency))
    }
}

/// Convert a base breakdown. Any failed or non-finite conversion yields
/// the base amounts labelled with the base currency.
fn to_selected(breakdown: &PriceBreakdown, currency: &CurrencyStore) -> SelectedBreakdown {
    let state = currency.snapshot();
    let base = breakdown.currency;
    let convert = |amount: u64| {
        convert_from_base(as_amount(amount), base, state.currency, &state.rates)
            .filter(|v| v.is_finite())
    };

    let lines: Option<Vec<ConvertedLine>> = breakdown
        .lines
        .iter()
        .map(|line| {
            convert(line.amount).map(|amount| ConvertedLine {
                component: line.component,
                amount,
            })
        })
        .collect();

    if let (Some(lines), Some(total)) = (lines, convert(breakdown.total)) {
        return SelectedBreakdown {
            currency: state.currency,
            lines,
            total,
            fallback: false,
        };
    }

    debug!(display = %state.currency, %base, "rate lookup failed, showing base amounts");
    SelectedBreakdown {
        currency: base,
        lines: breakdown
            .lines
            .iter()
            .map(|line| ConvertedLine {
                component: line.component,
                amount: as_amount(line.amount),
            })
            .collect(),
        total: as_amount(breakdown.total),
        fallback: true,
    }
}

// ── FlightCheckoutStore ─────────────────────────────────────────────

pub struct FlightCheckoutStore {
    book: DraftBook<FlightDraft>,
}

impl FlightCheckoutStore {
    pub fn new(base: CurrencyCode) -> Self {
        Self {
            book: DraftBook::new(base),
        }
    }

    pub fn open(storage: Arc<dyn Storage>, base: CurrencyCode) -> Self {
        Self {
            book: DraftBook::open(storage, FLIGHT_CHECKOUT_KEY, base),
        }
    }

    /// Create or overwrite the draft for `id`.
    pub fn init_draft(&self, id: SelectionId, base_fare: u64) {
        debug!(%id, base_fare, "flight draft initialised");
        self.book.insert(FlightDraft::new(id, base_fare));
    }

    pub fn set_ticket_type(&self, id: &SelectionId, ticket_type: TicketType) -> bool {
        self.book
            .update(id, "ticket_type", |d| d.ticket_type = ticket_type)
    }

    pub fn set_passengers(&self, id: &SelectionId, passengers: Vec<Passenger>) -> bool {
        self.book.update(id, "passengers", |d| d.passengers = passengers)
    }

    pub fn set_contact(&self, id: &SelectionId, contact: Contact) -> bool {
        self.book.update(id, "contact", |d| d.contact = Some(contact))
    }

    pub fn set_extras_total(&self, id: &SelectionId, extras_total: u64) -> bool {
        self.book
            .update(id, "extras_total", |d| d.extras_total = extras_total)
    }

    pub fn set_seat(&self, id: &SelectionId, seat: impl Into<String>, price: u64) -> bool {
        let seat = seat.into();
        self.book.update(id, "seat", |d| {
            d.seat = Some(SeatChoice { seat, price });
        })
    }

    pub fn clear_seat(&self, id: &SelectionId) -> bool {
        self.book.update(id, "seat", |d| d.seat = None)
    }

    pub fn set_payment_method(&self, id: &SelectionId, method: PaymentMethod, fee: u64) -> bool {
        self.book.update(id, "payment", |d| {
            d.payment = Some(PaymentChoice { method, fee });
        })
    }

    /// Stored verbatim; backward moves are only logged.
    pub fn set_status(&self, id: &SelectionId, status: DraftStatus) -> bool {
        self.book.set_status(id, status)
    }

    pub fn get_draft(&self, id: &SelectionId) -> Option<FlightDraft> {
        self.book.get(id)
    }

    pub fn remove_draft(&self, id: &SelectionId) -> bool {
        self.book.remove(id)
    }

    /// Drop drafts whose booking id fails `keep`, returning the count.
    pub fn retain_drafts(&self, keep: impl Fn(&SelectionId) -> bool) -> usize {
        self.book.retain(keep)
    }

    pub fn draft_ids(&self) -> Vec<SelectionId> {
        self.book.ids()
    }

    pub fn get_price_breakdown(&self, id: &SelectionId) -> Option<PriceBreakdown> {
        self.book.price_breakdown(id)
    }

    pub fn get_selected_breakdown(
        &self,
        id: &SelectionId,
        currency: &CurrencyStore,
    ) -> Option<SelectedBreakdown> {
        self.book.selected_breakdown(id, currency)
    }
}

// ── HotelCheckoutStore ──────────────────────────────────────────────

pub struct HotelCheckoutStore {
    book: DraftBook<HotelDraft>,
}

impl HotelCheckoutStore {
    pub fn new(base: CurrencyCode) -> Self {
        Self {
            book: DraftBook::new(base),
        }
    }

    pub fn open(storage: Arc<dyn Storage>, base: CurrencyCode) -> Self {
        Self {
            book: DraftBook::open(storage, HOTEL_CHECKOUT_KEY, base),
        }
    }

    /// Create or overwrite the draft for `id`.
    pub fn init_draft(&self, id: SelectionId, nightly_rate: u64, nights: u32) {
        debug!(%id, nightly_rate, nights, "hotel draft initialised");
        self.book.insert(HotelDraft::new(id, nightly_rate, nights));
    }

    /// Zero rooms is treated as one.
    pub fn set_rooms(&self, id: &SelectionId, rooms: u32) -> bool {
        self.book.update(id, "rooms", |d| d.rooms = rooms.max(1))
    }

    pub fn set_guest(&self, id: &SelectionId, guest: Contact) -> bool {
        self.book.update(id, "guest", |d| d.guest = Some(guest))
    }

    pub fn set_special_request(&self, id: &SelectionId, request: Option<String>) -> bool {
        let request = request.filter(|r| !r.trim().is_empty());
        self.book
            .update(id, "special_request", |d| d.special_request = request)
    }

    pub fn set_extras_total(&self, id: &SelectionId, extras_total: u64) -> bool {
        self.book
            .update(id, "extras_total", |d| d.extras_total = extras_total)
    }

    pub fn set_payment_method(&self, id: &SelectionId, method: PaymentMethod, fee: u64) -> bool {
        self.book.update(id, "payment", |d| {
            d.payment = Some(PaymentChoice { method, fee });
        })
    }

    pub fn set_status(&self, id: &SelectionId, status: DraftStatus) -> bool {
        self.book.set_status(id, status)
    }

    pub fn get_draft(&self, id: &SelectionId) -> Option<HotelDraft> {
        self.book.get(id)
    }

    pub fn remove_draft(&self, id: &SelectionId) -> bool {
        self.book.remove(id)
    }

    /// Drop drafts whose booking id fails `keep`, returning the count.
    pub fn retain_drafts(&self, keep: impl Fn(&SelectionId) -> bool) -> usize {
        self.book.retain(keep)
    }

    pub fn draft_ids(&self) -> Vec<SelectionId> {
        self.book.ids()
    }

    pub fn get_price_breakdown(&self, id: &SelectionId) -> Option<PriceBreakdown> {
        self.book.price_breakdown(id)
    }

    pub fn get_selected_breakdown(
        &self,
        id: &SelectionId,
        currency: &CurrencyStore,
    ) -> Option<SelectedBreakdown> {
        self.book.selected_breakdown(id, currency)
    }
}
