// ── Loaders ──
//
// Async glue between the simulated backends and the stores. The only
// suspension points in the system are the simulated delays here; stores
// themselves are synchronous.

use std::time::Duration;

use tracing::{debug, info};

use crate::error::CoreError;
use crate::mock::{FlightGenerator, HotelCatalog};
use crate::model::{HotelDetail, SearchParams, SelectionId, SelectionRecord};
use crate::store::{SearchStore, SelectionStore};

/// Run one flight search into `store`. Returns the raw result count.
pub async fn load_flights(
    store: &SearchStore,
    generator: &FlightGenerator,
    params: SearchParams,
    latency: Duration,
) -> usize {
    store.set_search_params(params.clone());
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
    let results = generator.generate(&params);
    let count = results.len();
    store.set_raw_flights(results);
    info!(results = count, "flight search loaded");
    count
}

/// Resolved hotel detail for a hotel selection, fetched at most once.
///
/// A cached payload on the record is returned without touching the
/// catalog. Otherwise the catalog is queried and the answer cached.
pub async fn resolve_hotel_selection<C: HotelCatalog>(
    selections: &SelectionStore,
    catalog: &C,
    id: &SelectionId,
) -> Result<HotelDetail, CoreError> {
    let record = selections
        .get_selection(id)
        .ok_or(CoreError::SelectionNotFound { id: *id })?;
    let hotel = record.as_hotel().ok_or_else(|| CoreError::NotAHotelSelection {
        id: *id,
        kind: record.kind().to_owned(),
    })?;

    if let Some(detail) = &hotel.resolved {
        debug!(%id, "using cached hotel detail");
        return Ok(detail.clone());
    }

    let detail = catalog.get_hotel_by_id(&hotel.list_item.id).await?;
    selections.set_resolved_hotel_data(id, detail.clone());
    Ok(detail)
}

/// Base fare for a flight draft: display price × passengers.
pub fn flight_base_fare(record: &SelectionRecord) -> Result<u64, CoreError> {
    record
        .as_flight()
        .map(crate::model::FlightSelection::base_fare)
        .ok_or_else(|| CoreError::NotAFlightSelection {
            id: record.id(),
            kind: record.kind().to_owned(),
        })
}

/// Nightly rate and night count for a hotel draft.
pub fn hotel_stay(record: &SelectionRecord) -> Result<(u64, u32), CoreError> {
    let hotel = record.as_hotel().ok_or_else(|| CoreError::NotAHotelSelection {
        id: record.id(),
        kind: record.kind().to_owned(),
    })?;
    Ok((hotel.list_item.nightly_rate, hotel.nights()))
}
