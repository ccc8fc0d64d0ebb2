// ── Selection store ──
//
// Bridges a transient list pick into a persisted record addressable by an
// opaque id. Records and the most-recent-first history live in one book
// behind a `watch` channel so both change together.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use super::persist::{PersistSlot, SELECTIONS_KEY, Storage};
use crate::config::DEFAULT_HISTORY_CAPACITY;
use crate::model::{
    FlightSelection, HotelDetail, HotelListItem, HotelSearchParams, HotelSelection, SearchParams,
    SearchResult, SelectionId, SelectionRecord,
};

const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SelectionBook {
    records: HashMap<SelectionId, Arc<SelectionRecord>>,
    /// Most recent first.
    history: VecDeque<SelectionId>,
}

impl SelectionBook {
    /// Put `id` at the front of the history and evict past `capacity`.
    fn touch(&mut self, id: SelectionId, capacity: usize) {
        self.history.retain(|h| *h != id);
        self.history.push_front(id);
        while self.history.len() > capacity {
            if let Some(evicted) = self.history.pop_back() {
                self.records.remove(&evicted);
                debug!(id = %evicted, "evicted selection from history");
            }
        }
    }
}

pub struct SelectionStore {
    book: watch::Sender<SelectionBook>,
    capacity: usize,
    slot: Option<PersistSlot>,
    /// Held from a mutation through its save so writes land in order.
    write: Mutex<()>,
}

impl SelectionStore {
    /// In-memory store with the default history capacity.
    pub fn new() -> Self {
        Self::build(DEFAULT_HISTORY_CAPACITY, None)
    }

    /// Store backed by `storage`, restoring whatever was persisted.
    pub fn open(storage: Arc<dyn Storage>, capacity: usize) -> Self {
        Self::build(
            capacity,
            Some(PersistSlot::new(storage, SELECTIONS_KEY, SCHEMA_VERSION)),
        )
    }

    fn build(capacity: usize, slot: Option<PersistSlot>) -> Self {
        let capacity = capacity.max(1);
        let mut book: SelectionBook = slot
            .as_ref()
            .and_then(|slot| slot.load())
            .unwrap_or_default();
        // Drop history entries that point nowhere and honour a smaller capacity.
        book.history.retain(|id| book.records.contains_key(id));
        book.history.truncate(capacity);
        let kept: HashSet<SelectionId> = book.history.iter().copied().collect();
        book.records.retain(|id, _| kept.contains(id));

        let (book, _) = watch::channel(book);
        Self {
            book,
            capacity,
            slot,
            write: Mutex::new(()),
        }
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Callers hold the write lock.
    fn persist(&self, _writes: &MutexGuard<'_, ()>) {
        if let Some(slot) = &self.slot {
            slot.save(&*self.book.borrow());
        }
    }

    fn insert(&self, record: SelectionRecord) -> SelectionId {
        let id = record.id();
        let capacity = self.capacity;
        let writes = self.lock_writes();
        self.book.send_modify(|book| {
            book.records.insert(id, Arc::new(record));
            book.touch(id, capacity);
        });
        self.persist(&writes);
        id
    }

    // ── Creation ─────────────────────────────────────────────────────

    pub fn create_flight_selection(
        &self,
        item: SearchResult,
        search_params: SearchParams,
    ) -> SelectionId {
        let id = SelectionId::new();
        info!(id = %id, result = item.id(), "created flight selection");
        self.insert(SelectionRecord::Flight(FlightSelection {
            id,
            created_at: Utc::now(),
            search_params,
            item,
        }))
    }

    pub fn create_hotel_selection(
        &self,
        list_item: HotelListItem,
        search_params: HotelSearchParams,
    ) -> SelectionId {
        let id = SelectionId::new();
        info!(id = %id, hotel = %list_item.id, "created hotel selection");
        self.insert(SelectionRecord::Hotel(HotelSelection {
            id,
            created_at: Utc::now(),
            search_params,
            list_item,
            resolved: None,
        }))
    }

    // ── Lookup ───────────────────────────────────────────────────────

    /// Look up a selection. `None` means expired or invalid.
    pub fn get_selection(&self, id: &SelectionId) -> Option<Arc<SelectionRecord>> {
        self.book.borrow().records.get(id).cloned()
    }

    /// Ids, most recent first.
    pub fn history(&self) -> Vec<SelectionId> {
        self.book.borrow().history.iter().copied().collect()
    }

    /// Records in history order.
    pub fn list(&self) -> Vec<Arc<SelectionRecord>> {
        let book = self.book.borrow();
        book.history
            .iter()
            .filter_map(|id| book.records.get(id).cloned())
            .collect()
    }

    /// Whether `id` is still a live selection.
    pub fn contains(&self, id: &SelectionId) -> bool {
        self.book.borrow().records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.book.borrow().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.book.borrow().records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Attach the resolved hotel payload. Missing ids and flight
    /// selections are ignored.
    pub fn set_resolved_hotel_data(&self, id: &SelectionId, detail: HotelDetail) {
        let writes = self.lock_writes();
        let updated = self.book.send_if_modified(|book| {
            let Some(record) = book.records.get_mut(id) else {
                return false;
            };
            let SelectionRecord::Hotel(hotel) = &**record else {
                return false;
            };
            let mut hotel = hotel.clone();
            hotel.resolved = Some(detail);
            *record = Arc::new(SelectionRecord::Hotel(hotel));
            true
        });

        if updated {
            debug!(id = %id, "cached resolved hotel data");
            self.persist(&writes);
        } else {
            debug!(id = %id, "ignored hotel data for unknown or non-hotel selection");
        }
    }

    /// Remove one selection. Returns whether it existed.
    pub fn remove_selection(&self, id: &SelectionId) -> bool {
        let writes = self.lock_writes();
        let removed = self.book.send_if_modified(|book| {
            let existed = book.records.remove(id).is_some();
            book.history.retain(|h| h != id);
            existed
        });
        if removed {
            self.persist(&writes);
        }
        removed
    }

    pub fn clear_all(&self) {
        let _writes = self.lock_writes();
        self.book.send_modify(|book| *book = SelectionBook::default());
        if let Some(slot) = &self.slot {
            slot.clear();
        }
    }
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::flight::tests::leg;
    use crate::model::{CabinClass, OneWayResult, TripType};
    use crate::store::persist::MemoryStorage;
    use chrono::NaiveDate;

    fn params() -> SearchParams {
        SearchParams {
            origin: vec!["CGK".into()],
            destination: vec!["DPS".into()],
            departure_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            return_date: None,
            passengers: 2,
            cabin_class: CabinClass::Economy,
            trip_type: TripType::OneWay,
            result_count: 10,
        }
    }

    fn flight(id: &str) -> SearchResult {
        SearchResult::OneWay(OneWayResult {
            id: id.into(),
            price: 750_000,
            leg: leg("GA", "A320", true, "08:00", "1h 50m"),
        })
    }

    fn hotel_item() -> HotelListItem {
        HotelListItem {
            id: "htl-001".into(),
            name: "Seminyak Bay Resort".into(),
            city: "Denpasar".into(),
            stars: 4,
            rating: 8.7,
            nightly_rate: 900_000,
        }
    }

    fn hotel_params() -> HotelSearchParams {
        HotelSearchParams {
            city: "Denpasar".into(),
            check_in: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 11, 5).unwrap(),
            guests: 2,
            rooms: 1,
        }
    }

    fn detail() -> HotelDetail {
        HotelDetail {
            id: "htl-001".into(),
            name: "Seminyak Bay Resort".into(),
            city: "Denpasar".into(),
            address: "Jl. Kayu Aya 1".into(),
            stars: 4,
            rating: 8.7,
            description: String::new(),
            amenities: vec!["pool".into()],
            rooms: Vec::new(),
        }
    }

    #[test]
    fn create_and_get_flight_selection() {
        let store = SelectionStore::new();
        let id = store.create_flight_selection(flight("f1"), params());

        let record = store.get_selection(&id).unwrap();
        let selection = record.as_flight().unwrap();
        assert_eq!(selection.item.id(), "f1");
        assert_eq!(selection.base_fare(), 1_500_000);
        assert_eq!(store.history(), vec![id]);
    }

    #[test]
    fn repeated_lookup_is_stable() {
        let store = SelectionStore::new();
        let id = store.create_hotel_selection(hotel_item(), hotel_params());
        assert_eq!(store.get_selection(&id), store.get_selection(&id));
    }

    #[test]
    fn unknown_id_is_none() {
        let store = SelectionStore::new();
        assert!(store.get_selection(&SelectionId::new()).is_none());
    }

    #[test]
    fn history_is_capped_and_evicts_oldest() {
        let store = SelectionStore::build(3, None);
        let ids: Vec<SelectionId> = (0..5)
            .map(|i| store.create_flight_selection(flight(&format!("f{i}")), params()))
            .collect();

        assert_eq!(store.history(), vec![ids[4], ids[3], ids[2]]);
        assert_eq!(store.len(), 3);
        assert!(store.get_selection(&ids[0]).is_none());
        assert!(store.get_selection(&ids[1]).is_none());
        assert!(!store.contains(&ids[0]));
        assert!(store.contains(&ids[4]));
    }

    #[test]
    fn concurrent_creates_persist_the_final_history() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let store = Arc::new(SelectionStore::open(Arc::clone(&storage), 50));

        std::thread::scope(|scope| {
            for t in 0..4 {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    for i in 0..10 {
                        store.create_flight_selection(flight(&format!("f{t}-{i}")), params());
                    }
                });
            }
        });

        let reopened = SelectionStore::open(storage, 50);
        assert_eq!(reopened.history(), store.history());
        assert_eq!(reopened.len(), 40);
    }

    #[test]
    fn resolved_hotel_data_is_attached_once_per_call() {
        let store = SelectionStore::new();
        let id = store.create_hotel_selection(hotel_item(), hotel_params());
        store.set_resolved_hotel_data(&id, detail());

        let record = store.get_selection(&id).unwrap();
        let resolved = record.as_hotel().unwrap().resolved.as_ref().unwrap();
        assert_eq!(resolved.address, "Jl. Kayu Aya 1");
    }

    #[test]
    fn resolved_data_ignored_for_missing_or_flight() {
        let store = SelectionStore::new();
        let flight_id = store.create_flight_selection(flight("f1"), params());
        let before = store.get_selection(&flight_id);

        store.set_resolved_hotel_data(&flight_id, detail());
        store.set_resolved_hotel_data(&SelectionId::new(), detail());

        assert_eq!(store.get_selection(&flight_id), before);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_and_clear() {
        let store = SelectionStore::new();
        let a = store.create_flight_selection(flight("a"), params());
        let b = store.create_flight_selection(flight("b"), params());

        assert!(store.remove_selection(&a));
        assert!(!store.remove_selection(&a));
        assert_eq!(store.history(), vec![b]);

        store.clear_all();
        assert!(store.is_empty());
        assert!(store.history().is_empty());
    }

    #[test]
    fn survives_reopen() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let id = {
            let store = SelectionStore::open(Arc::clone(&storage), 100);
            let id = store.create_hotel_selection(hotel_item(), hotel_params());
            store.set_resolved_hotel_data(&id, detail());
            id
        };

        let reopened = SelectionStore::open(storage, 100);
        let record = reopened.get_selection(&id).unwrap();
        assert!(record.as_hotel().unwrap().resolved.is_some());
        assert_eq!(reopened.history(), vec![id]);
    }

    #[test]
    fn reopen_with_smaller_capacity_trims() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let store = SelectionStore::open(Arc::clone(&storage), 10);
        let ids: Vec<SelectionId> = (0..4)
            .map(|i| store.create_flight_selection(flight(&format!("f{i}")), params()))
            .collect();

        let reopened = SelectionStore::open(storage, 2);
        assert_eq!(reopened.history(), vec![ids[3], ids[2]]);
        assert_eq!(reopened.len(), 2);
    }

    #[test]
    fn cleared_store_reopens_empty() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let store = SelectionStore::open(Arc::clone(&storage), 10);
        store.create_flight_selection(flight("a"), params());
        store.clear_all();

        assert!(SelectionStore::open(storage, 10).is_empty());
    }
}
