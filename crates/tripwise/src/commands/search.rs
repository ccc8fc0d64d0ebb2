//! Flight search command handler.

use std::sync::Arc;

use tabled::Tabled;
use tripwise_core::loader;
use tripwise_core::model::{
    AvailableFilters, FilterPatch, PaginationPatch, SearchParams, SearchResult, SortDirection,
    SortState, TripType, format_duration,
};

use crate::cli::{FilterArgs, FlightQueryArgs, GlobalOpts, SearchArgs};
use crate::context::AppContext;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct FlightRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Airline")]
    airline: String,
    #[tabled(rename = "Route")]
    route: String,
    #[tabled(rename = "Depart")]
    depart: String,
    #[tabled(rename = "Arrive")]
    arrive: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Stops")]
    stops: String,
    #[tabled(rename = "Aircraft")]
    aircraft: String,
    #[tabled(rename = "Price")]
    price: String,
}

impl FlightRow {
    fn new(result: &SearchResult, ctx: &AppContext) -> Self {
        let legs = result.legs();
        let leg = result.primary_leg();
        let route = legs
            .iter()
            .map(|l| format!("{}→{}", l.route.origin, l.route.destination))
            .collect::<Vec<_>>()
            .join(" / ");
        let stops = legs
            .iter()
            .map(|l| l.transit_airport.as_deref().unwrap_or("direct"))
            .collect::<Vec<_>>()
            .join(" / ");
        Self {
            id: result.id().to_owned(),
            airline: leg.airline.name.clone(),
            route,
            depart: leg.departure_time.format("%H:%M").to_string(),
            arrive: leg.arrival_time.format("%H:%M").to_string(),
            duration: format_duration(result.total_duration_minutes()),
            stops,
            aircraft: leg.aircraft.clone(),
            price: util::display_price(result.display_price(), ctx.base_currency(), ctx.display()),
        }
    }
}

// ── Shared helpers ──────────────────────────────────────────────────

/// Turn the query flags into search params. Codes are upper-cased so the
/// same search typed differently stays the same search.
pub fn build_params(query: &FlightQueryArgs, ctx: &AppContext) -> Result<SearchParams, CliError> {
    if let Some(ret) = query.return_date {
        if ret < query.date {
            return Err(CliError::Validation {
                field: "return".into(),
                reason: format!("return date {ret} is before departure {}", query.date),
            });
        }
    }
    if query.passengers == 0 {
        return Err(CliError::Validation {
            field: "passengers".into(),
            reason: "at least one passenger is required".into(),
        });
    }

    let codes = |raw: &[String]| -> Vec<String> {
        raw.iter()
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .collect()
    };

    Ok(SearchParams {
        origin: codes(&query.from),
        destination: codes(&query.to),
        departure_date: query.date,
        return_date: query.return_date,
        passengers: query.passengers,
        cabin_class: query.cabin,
        trip_type: if query.return_date.is_some() {
            TripType::RoundTrip
        } else {
            TripType::OneWay
        },
        result_count: query.count.unwrap_or(ctx.settings.result_count),
    })
}

/// Run a search into the context's search store.
pub async fn run_search(
    ctx: &AppContext,
    params: SearchParams,
    global: &GlobalOpts,
) -> usize {
    util::with_spinner(
        "Searching flights...",
        global,
        loader::load_flights(&ctx.search, &ctx.generator, params, ctx.settings.latency),
    )
    .await
}

/// Only flags that were actually given become patch fields.
fn filter_patch(args: &FilterArgs, ctx: &AppContext) -> FilterPatch {
    let current = ctx.search.filters();
    let mut patch = FilterPatch::default();

    if args.min_price.is_some() || args.max_price.is_some() {
        patch.price_range = Some((
            args.min_price.unwrap_or(current.price_range.0),
            args.max_price.unwrap_or(current.price_range.1),
        ));
    }
    if args.min_duration.is_some() || args.max_duration.is_some() {
        patch.duration_range = Some((
            args.min_duration.unwrap_or(current.duration_range.0),
            args.max_duration.unwrap_or(current.duration_range.1),
        ));
    }
    if !args.airline.is_empty() {
        patch.airlines = Some(args.airline.iter().map(|a| a.to_ascii_uppercase()).collect());
    }
    if args.direct {
        patch.max_stops = Some(Some(0));
    }
    if !args.window.is_empty() {
        patch.departure_windows = Some(args.window.clone());
    }
    if !args.aircraft.is_empty() {
        patch.aircraft = Some(args.aircraft.clone());
    }
    patch
}

fn facets_summary(available: &AvailableFilters) -> String {
    let airlines = available
        .airlines
        .iter()
        .map(|(code, f)| format!("{code} {} ({})", f.name, f.count))
        .collect::<Vec<_>>()
        .join(", ");
    let aircraft = available
        .aircraft
        .iter()
        .map(|(name, count)| format!("{name} ({count})"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Airlines: {airlines}\nAircraft: {aircraft}\nPrice:    {} - {}\nDuration: {} - {}",
        available.price_range.0,
        available.price_range.1,
        format_duration(available.duration_range.0),
        format_duration(available.duration_range.1),
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &AppContext, args: SearchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.page == 0 {
        return Err(CliError::Validation {
            field: "page".into(),
            reason: "pages start at 1".into(),
        });
    }
    if args.limit == Some(0) {
        return Err(CliError::Validation {
            field: "limit".into(),
            reason: "must be at least 1".into(),
        });
    }

    let params = build_params(&args.query, ctx)?;
    run_search(ctx, params, global).await;

    let patch = filter_patch(&args.filters, ctx);
    if patch != FilterPatch::default() {
        ctx.search.update_filters(patch);
    }
    let direction = if args.desc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };
    ctx.search.update_sort(SortState::new(args.sort, direction));
    ctx.search.update_pagination(PaginationPatch {
        page: Some(args.page),
        limit: args.limit,
    });

    let snap = ctx.search.snapshot();
    let page: Vec<Arc<SearchResult>> = snap.current_page().to_vec();

    if args.facets && output::is_table(&global.output) {
        output::print_output(&facets_summary(&snap.available), global.quiet);
    }

    let out = output::render_list(
        &global.output,
        &page,
        |r| FlightRow::new(r, ctx),
        |r| r.id().to_owned(),
    )?;
    output::print_output(&out, global.quiet);

    if output::is_table(&global.output) {
        output::notice(
            &format!(
                "Page {} of {} · {} of {} results match",
                snap.pagination.page,
                snap.pagination.total_pages().max(1),
                snap.filtered.len(),
                snap.raw.len(),
            ),
            global.quiet,
        );
    }
    Ok(())
}
