// ── Flight search state store ──
//
// Owns one active search: raw results, derived facets, the filtered and
// sorted view, and the page window over it. Every mutation runs inside a
// single `send_modify`, so readers never observe a view whose pagination
// total disagrees with its filtered length.

use std::cmp::Ordering;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::model::{
    AirlineFacet, AvailableFilters, FilterPatch, FilterState, Pagination, PaginationPatch,
    SearchParams, SearchResult, SortDirection, SortField, SortState,
};

/// Point-in-time view of the search store.
#[derive(Debug, Clone, Default)]
pub struct SearchSnapshot {
    pub params: Option<SearchParams>,
    pub loading: bool,
    pub raw: Vec<Arc<SearchResult>>,
    pub filtered: Vec<Arc<SearchResult>>,
    pub filters: FilterState,
    pub sort: SortState,
    pub pagination: Pagination,
    pub available: AvailableFilters,
}

impl SearchSnapshot {
    /// Results on the current page.
    pub fn current_page(&self) -> &[Arc<SearchResult>] {
        self.filtered
            .get(self.pagination.window())
            .unwrap_or_default()
    }
}

/// Store for the active flight search.
pub struct SearchStore {
    state: watch::Sender<SearchSnapshot>,
    default_limit: usize,
}

impl SearchStore {
    pub fn new() -> Self {
        Self::with_page_limit(crate::model::DEFAULT_PAGE_LIMIT)
    }

    pub fn with_page_limit(limit: usize) -> Self {
        let initial = SearchSnapshot {
            pagination: Pagination {
                limit,
                ..Pagination::default()
            },
            ..SearchSnapshot::default()
        };
        let (state, _) = watch::channel(initial);
        Self {
            state,
            default_limit: limit,
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Replace the active search identity and mark it loading.
    pub fn set_search_params(&self, params: SearchParams) {
        self.state.send_modify(|s| {
            s.params = Some(params);
            s.loading = true;
        });
    }

    /// Load a freshly generated result set.
    ///
    /// Facets are rebuilt from scratch, the price and duration bounds reset
    /// to the observed ranges, and pagination returns to page 1 before the
    /// view is recomputed.
    pub fn set_raw_flights(&self, results: Vec<SearchResult>) {
        let raw: Vec<Arc<SearchResult>> = results.into_iter().map(Arc::new).collect();
        let available = derive_available_filters(&raw);
        debug!(
            results = raw.len(),
            airlines = available.airlines.len(),
            aircraft = available.aircraft.len(),
            "raw flight results loaded"
        );

        self.state.send_modify(|s| {
            s.filters.price_range = available.price_range;
            s.filters.duration_range = available.duration_range;
            s.pagination.page = 1;
            s.pagination.total = raw.len();
            s.available = available;
            s.raw = raw;
            s.loading = false;
            apply_filters_and_sort(s);
        });
    }

    /// Shallow-merge filter changes, return to page 1 and recompute.
    pub fn update_filters(&self, patch: FilterPatch) {
        self.state.send_modify(|s| {
            s.filters.merge(patch);
            s.pagination.page = 1;
            apply_filters_and_sort(s);
        });
    }

    /// Replace the sort order and recompute. The current page is kept.
    pub fn update_sort(&self, sort: SortState) {
        self.state.send_modify(|s| {
            s.sort = sort;
            apply_filters_and_sort(s);
        });
    }

    /// Move the page window. Filters and sort are not re-run.
    pub fn update_pagination(&self, patch: PaginationPatch) {
        self.state.send_modify(|s| {
            if let Some(page) = patch.page {
                s.pagination.page = page.max(1);
            }
            if let Some(limit) = patch.limit {
                s.pagination.limit = limit;
            }
        });
    }

    /// Restore filters to the bounds of the current facet catalog.
    pub fn reset_filters(&self) {
        self.state.send_modify(|s| {
            s.filters = FilterState::bounded_by(&s.available);
            s.pagination.page = 1;
            apply_filters_and_sort(s);
        });
    }

    /// Drop everything, as when leaving the search context.
    pub fn clear_search(&self) {
        let limit = self.default_limit;
        self.state.send_modify(|s| {
            *s = SearchSnapshot {
                pagination: Pagination {
                    limit,
                    ..Pagination::default()
                },
                ..SearchSnapshot::default()
            };
        });
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> SearchSnapshot {
        self.state.borrow().clone()
    }

    pub fn filtered(&self) -> Vec<Arc<SearchResult>> {
        self.state.borrow().filtered.clone()
    }

    pub fn current_page(&self) -> Vec<Arc<SearchResult>> {
        self.state.borrow().current_page().to_vec()
    }

    pub fn pagination(&self) -> Pagination {
        self.state.borrow().pagination
    }

    pub fn total_pages(&self) -> usize {
        self.state.borrow().pagination.total_pages()
    }

    pub fn filters(&self) -> FilterState {
        self.state.borrow().filters.clone()
    }

    pub fn sort(&self) -> SortState {
        self.state.borrow().sort
    }

    pub fn available_filters(&self) -> AvailableFilters {
        self.state.borrow().available.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Find a loaded result by id.
    pub fn find(&self, id: &str) -> Option<Arc<SearchResult>> {
        self.state
            .borrow()
            .raw
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    /// Subscribe to every state change.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.state.subscribe()
    }
}

impl Default for SearchStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── Derivation ───────────────────────────────────────────────────────

/// Build the facet catalog in one pass over the raw set.
///
/// Airline and aircraft counts are per leg, so an airline flying both legs of
/// a round trip counts twice. An empty set yields zero ranges.
pub(crate) fn derive_available_filters(raw: &[Arc<SearchResult>]) -> AvailableFilters {
    let mut available = AvailableFilters::default();
    let mut price: Option<(u64, u64)> = None;
    let mut duration: Option<(u32, u32)> = None;

    for result in raw {
        for leg in result.legs() {
            available
                .airlines
                .entry(leg.airline.code.clone())
                .and_modify(|f| f.count += 1)
                .or_insert_with(|| AirlineFacet {
                    name: leg.airline.name.clone(),
                    count: 1,
                });
            *available.aircraft.entry(leg.aircraft.clone()).or_insert(0) += 1;
        }

        let p = result.display_price();
        price = Some(price.map_or((p, p), |(lo, hi)| (lo.min(p), hi.max(p))));

        let d = result.total_duration_minutes();
        duration = Some(duration.map_or((d, d), |(lo, hi)| (lo.min(d), hi.max(d))));
    }

    available.price_range = price.unwrap_or((0, 0));
    available.duration_range = duration.unwrap_or((0, 0));
    available
}

/// Whether a result passes every active filter.
pub(crate) fn matches_filters(result: &SearchResult, filters: &FilterState) -> bool {
    let (min_price, max_price) = filters.price_range;
    let price = result.display_price();
    if price < min_price || price > max_price {
        return false;
    }

    let legs = result.legs();

    if !filters.airlines.is_empty()
        && !legs
            .iter()
            .any(|leg| filters.airlines.contains(&leg.airline.code))
    {
        return false;
    }

    // Only "direct only" is enforced; other limits do not count transit hops.
    if filters.max_stops == Some(0) && !legs.iter().all(|leg| leg.is_direct()) {
        return false;
    }

    let (min_duration, max_duration) = filters.duration_range;
    let duration = result.total_duration_minutes();
    if duration < min_duration || duration > max_duration {
        return false;
    }

    if !filters.aircraft.is_empty()
        && !legs
            .iter()
            .any(|leg| filters.aircraft.contains(&leg.aircraft))
    {
        return false;
    }

    if !filters.departure_windows.is_empty() {
        let departs = result.primary_leg().departure_time;
        if !filters.departure_windows.iter().any(|w| w.contains(departs)) {
            return false;
        }
    }

    true
}

fn compare_by(a: &SearchResult, b: &SearchResult, field: SortField) -> Ordering {
    match field {
        SortField::Price => a.display_price().cmp(&b.display_price()),
        SortField::Duration => a
            .total_duration_minutes()
            .cmp(&b.total_duration_minutes()),
        SortField::Departure => a
            .primary_leg()
            .departure_time
            .cmp(&b.primary_leg().departure_time),
        SortField::Arrival => a
            .primary_leg()
            .arrival_time
            .cmp(&b.primary_leg().arrival_time),
        SortField::Airline => a
            .primary_leg()
            .airline
            .name
            .cmp(&b.primary_leg().airline.name),
    }
}

/// Filter the raw set, stable-sort it, and sync the pagination total.
fn apply_filters_and_sort(state: &mut SearchSnapshot) {
    let mut filtered: Vec<Arc<SearchResult>> = state
        .raw
        .iter()
        .filter(|r| matches_filters(r, &state.filters))
        .cloned()
        .collect();

    let SortState { field, direction } = state.sort;
    // `sort_by` is stable: equal keys keep their raw order in both directions.
    filtered.sort_by(|a, b| match direction {
        SortDirection::Asc => compare_by(a, b, field),
        SortDirection::Desc => compare_by(b, a, field),
    });

    state.pagination.total = filtered.len();
    state.filtered = filtered;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::flight::tests::leg;
    use crate::model::{DepartureWindow, OneWayResult, RoundTripResult};

    fn one_way(id: &str, price: u64, airline: &str) -> SearchResult {
        SearchResult::OneWay(OneWayResult {
            id: id.into(),
            price,
            leg: leg(airline, "A320", true, "08:00", "1h 50m"),
        })
    }

    fn one_way_with(
        id: &str,
        price: u64,
        airline: &str,
        direct: bool,
        departs: &str,
        duration: &str,
    ) -> SearchResult {
        SearchResult::OneWay(OneWayResult {
            id: id.into(),
            price,
            leg: leg(airline, "B738", direct, departs, duration),
        })
    }

    fn round_trip(id: &str, total: u64, out_airline: &str, ret_airline: &str) -> SearchResult {
        SearchResult::RoundTrip(RoundTripResult {
            id: id.into(),
            outbound: leg(out_airline, "A320", true, "07:00", "2h 0m"),
            inbound: leg(ret_airline, "A330", false, "19:00", "3h 30m"),
            total_price: total,
        })
    }

    fn ids(results: &[Arc<SearchResult>]) -> Vec<String> {
        results.iter().map(|r| r.id().to_owned()).collect()
    }

    #[test]
    fn airline_filter_scenario() {
        let store = SearchStore::new();
        store.set_raw_flights(vec![
            one_way("a", 500, "A"),
            one_way("b", 150, "B"),
            one_way("c", 300, "A"),
        ]);
        store.update_filters(FilterPatch {
            airlines: Some(vec!["A".into()]),
            ..FilterPatch::default()
        });

        let snap = store.snapshot();
        assert_eq!(ids(&snap.filtered), vec!["c", "a"]);
        assert_eq!(snap.filtered[0].display_price(), 300);
        assert_eq!(snap.filtered[1].display_price(), 500);
        assert_eq!(snap.pagination.total, 2);
    }

    #[test]
    fn raw_load_resets_bounds_and_page() {
        let store = SearchStore::new();
        store.set_raw_flights(vec![one_way("a", 100, "A")]);
        store.update_pagination(PaginationPatch {
            page: Some(4),
            limit: None,
        });
        store.update_filters(FilterPatch {
            price_range: Some((0, 50)),
            ..FilterPatch::default()
        });
        assert_eq!(store.pagination().total, 0);

        store.set_raw_flights(vec![one_way("x", 900, "A"), one_way("y", 400, "B")]);

        let snap = store.snapshot();
        assert_eq!(snap.filters.price_range, (400, 900));
        assert_eq!(snap.filters.duration_range, (110, 110));
        assert_eq!(snap.pagination.page, 1);
        assert_eq!(snap.pagination.total, 2);
        assert!(!snap.loading);
    }

    #[test]
    fn facets_merge_legs_of_round_trips() {
        let store = SearchStore::new();
        store.set_raw_flights(vec![
            round_trip("r1", 2_000, "GA", "GA"),
            round_trip("r2", 1_500, "GA", "QG"),
            one_way("o1", 700, "QG"),
        ]);

        let available = store.available_filters();
        assert_eq!(available.airlines["GA"].count, 3);
        assert_eq!(available.airlines["QG"].count, 2);
        assert_eq!(available.aircraft["A320"], 3);
        assert_eq!(available.aircraft["A330"], 2);
        assert_eq!(available.price_range, (700, 2_000));
        // 2h + 3h30m for the round trips, 1h50m for the one-way leg.
        assert_eq!(available.duration_range, (110, 330));
    }

    #[test]
    fn empty_raw_set_yields_zero_ranges() {
        let store = SearchStore::new();
        store.set_raw_flights(Vec::new());
        let snap = store.snapshot();
        assert_eq!(snap.available.price_range, (0, 0));
        assert_eq!(snap.pagination.total, 0);
        assert!(snap.current_page().is_empty());
    }

    #[test]
    fn round_trip_price_is_bundle_and_duration_is_summed() {
        let store = SearchStore::new();
        store.set_raw_flights(vec![round_trip("r1", 2_000, "GA", "QG")]);

        store.update_filters(FilterPatch {
            duration_range: Some((330, 330)),
            ..FilterPatch::default()
        });
        assert_eq!(store.pagination().total, 1);

        store.update_filters(FilterPatch {
            duration_range: Some((0, 329)),
            ..FilterPatch::default()
        });
        assert_eq!(store.pagination().total, 0);
    }

    #[test]
    fn airline_filter_matches_any_leg() {
        let store = SearchStore::new();
        store.set_raw_flights(vec![round_trip("r1", 2_000, "GA", "QG"), one_way("o", 1, "JT")]);
        store.update_filters(FilterPatch {
            airlines: Some(vec!["QG".into()]),
            ..FilterPatch::default()
        });
        assert_eq!(ids(&store.filtered()), vec!["r1"]);
    }

    #[test]
    fn direct_only_requires_every_leg_direct() {
        let store = SearchStore::new();
        store.set_raw_flights(vec![
            round_trip("r1", 2_000, "GA", "GA"),
            one_way_with("d", 800, "GA", true, "09:00", "1h 0m"),
            one_way_with("t", 600, "GA", false, "10:00", "4h 0m"),
        ]);

        store.update_filters(FilterPatch {
            max_stops: Some(Some(0)),
            ..FilterPatch::default()
        });
        assert_eq!(ids(&store.filtered()), vec!["d"]);

        // Non-zero limits pass everything through.
        store.update_filters(FilterPatch {
            max_stops: Some(Some(1)),
            ..FilterPatch::default()
        });
        assert_eq!(store.pagination().total, 3);
    }

    #[test]
    fn aircraft_filter_matches_any_leg() {
        let store = SearchStore::new();
        store.set_raw_flights(vec![round_trip("r1", 2_000, "GA", "GA"), one_way("o", 500, "GA")]);
        store.update_filters(FilterPatch {
            aircraft: Some(vec!["A330".into()]),
            ..FilterPatch::default()
        });
        assert_eq!(ids(&store.filtered()), vec!["r1"]);
    }

    #[test]
    fn departure_window_filter() {
        let store = SearchStore::new();
        store.set_raw_flights(vec![
            one_way_with("early", 100, "GA", true, "05:10", "1h 0m"),
            one_way_with("noon", 200, "GA", true, "12:30", "1h 0m"),
            one_way_with("night", 300, "GA", true, "21:45", "1h 0m"),
        ]);
        store.update_filters(FilterPatch {
            departure_windows: Some(vec![DepartureWindow::EarlyMorning, DepartureWindow::Evening]),
            ..FilterPatch::default()
        });
        assert_eq!(ids(&store.filtered()), vec!["early", "night"]);
    }

    #[test]
    fn sort_by_each_field() {
        let store = SearchStore::new();
        store.set_raw_flights(vec![
            one_way_with("a", 300, "QG", true, "10:00", "2h 0m"),
            one_way_with("b", 100, "GA", true, "06:00", "3h 0m"),
            one_way_with("c", 200, "JT", true, "08:00", "1h 0m"),
        ]);

        store.update_sort(SortState::new(SortField::Duration, SortDirection::Asc));
        assert_eq!(ids(&store.filtered()), vec!["c", "a", "b"]);

        store.update_sort(SortState::new(SortField::Departure, SortDirection::Desc));
        assert_eq!(ids(&store.filtered()), vec!["a", "c", "b"]);

        store.update_sort(SortState::new(SortField::Airline, SortDirection::Asc));
        assert_eq!(ids(&store.filtered()), vec!["b", "c", "a"]);

        store.update_sort(SortState::new(SortField::Price, SortDirection::Desc));
        assert_eq!(ids(&store.filtered()), vec!["a", "c", "b"]);
    }

    #[test]
    fn equal_keys_keep_raw_order() {
        let store = SearchStore::new();
        store.set_raw_flights(vec![
            one_way("first", 100, "GA"),
            one_way("cheap", 50, "GA"),
            one_way("second", 100, "QG"),
            one_way("third", 100, "JT"),
        ]);

        let before = ids(&store.filtered());
        assert_eq!(before, vec!["cheap", "first", "second", "third"]);

        store.update_sort(SortState::new(SortField::Price, SortDirection::Asc));
        assert_eq!(ids(&store.filtered()), before);

        store.update_sort(SortState::new(SortField::Price, SortDirection::Desc));
        assert_eq!(
            ids(&store.filtered()),
            vec!["first", "second", "third", "cheap"]
        );
    }

    #[test]
    fn sort_keeps_page_but_filters_reset_it() {
        let store = SearchStore::with_page_limit(1);
        store.set_raw_flights(vec![one_way("a", 1, "A"), one_way("b", 2, "A"), one_way("c", 3, "B")]);
        store.update_pagination(PaginationPatch {
            page: Some(3),
            limit: None,
        });

        store.update_sort(SortState::new(SortField::Price, SortDirection::Desc));
        assert_eq!(store.pagination().page, 3);
        assert_eq!(ids(&store.current_page()), vec!["a"]);

        store.update_filters(FilterPatch {
            airlines: Some(vec!["A".into()]),
            ..FilterPatch::default()
        });
        assert_eq!(store.pagination().page, 1);
        assert_eq!(store.pagination().total, 2);
    }

    #[test]
    fn pagination_moves_window_only() {
        let store = SearchStore::with_page_limit(2);
        store.set_raw_flights((0..5).map(|i| one_way(&format!("f{i}"), i, "GA")).collect());

        store.update_pagination(PaginationPatch {
            page: Some(3),
            limit: None,
        });
        assert_eq!(ids(&store.current_page()), vec!["f4"]);
        assert_eq!(store.total_pages(), 3);

        store.update_pagination(PaginationPatch {
            page: None,
            limit: Some(4),
        });
        assert!(store.current_page().is_empty());
        assert_eq!(store.pagination().total, 5);
    }

    #[test]
    fn total_tracks_filtered_length_across_mutations() {
        let store = SearchStore::new();
        store.set_raw_flights(vec![
            round_trip("r1", 2_000, "GA", "QG"),
            one_way_with("d", 800, "GA", true, "09:00", "1h 0m"),
            one_way_with("t", 600, "JT", false, "10:00", "4h 0m"),
        ]);
        let check = |store: &SearchStore| {
            let snap = store.snapshot();
            assert_eq!(snap.pagination.total, snap.filtered.len());
        };
        check(&store);

        store.update_filters(FilterPatch {
            price_range: Some((700, 5_000)),
            ..FilterPatch::default()
        });
        check(&store);
        store.update_sort(SortState::new(SortField::Arrival, SortDirection::Desc));
        check(&store);
        store.update_filters(FilterPatch {
            max_stops: Some(Some(0)),
            ..FilterPatch::default()
        });
        check(&store);
        store.reset_filters();
        check(&store);
        assert_eq!(store.pagination().total, 3);
    }

    #[test]
    fn reset_filters_uses_available_bounds() {
        let store = SearchStore::new();
        store.set_raw_flights(vec![one_way("a", 500, "A"), one_way("b", 150, "B")]);
        store.update_filters(FilterPatch {
            price_range: Some((0, 10)),
            airlines: Some(vec!["Z".into()]),
            ..FilterPatch::default()
        });
        assert_eq!(store.pagination().total, 0);

        store.reset_filters();
        let filters = store.filters();
        assert_eq!(filters.price_range, (150, 500));
        assert!(filters.airlines.is_empty());
        assert_eq!(store.pagination().total, 2);
    }

    #[test]
    fn params_mark_loading_and_clear_resets() {
        let store = SearchStore::with_page_limit(5);
        store.set_search_params(SearchParams {
            origin: vec!["CGK".into()],
            destination: vec!["DPS".into()],
            departure_date: chrono::NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            return_date: None,
            passengers: 1,
            cabin_class: crate::model::CabinClass::Economy,
            trip_type: crate::model::TripType::OneWay,
            result_count: 10,
        });
        assert!(store.is_loading());

        store.set_raw_flights(vec![one_way("a", 1, "A")]);
        assert!(store.find("a").is_some());

        store.clear_search();
        let snap = store.snapshot();
        assert!(snap.params.is_none());
        assert!(snap.raw.is_empty());
        assert_eq!(snap.pagination.limit, 5);
        assert_eq!(snap.filters, FilterState::default());
    }

    #[test]
    fn subscribers_see_updates() {
        let store = SearchStore::new();
        let mut rx = store.subscribe();
        store.set_raw_flights(vec![one_way("a", 1, "A")]);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().pagination.total, 1);
    }

    #[test]
    fn changed_resolves_after_a_mutation() {
        let store = SearchStore::new();
        let mut rx = store.subscribe();
        store.update_sort(SortState::new(SortField::Duration, SortDirection::Desc));
        tokio_test::block_on(rx.changed()).unwrap();
        assert_eq!(rx.borrow().sort.field, SortField::Duration);
    }
}
