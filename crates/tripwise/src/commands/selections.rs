//! Selection history command handlers.

use std::fmt::Write as _;
use std::sync::Arc;

use tabled::Tabled;
use tripwise_core::model::{SelectionRecord, format_duration};

use crate::cli::{GlobalOpts, SelectionsArgs, SelectionsCommand};
use crate::context::AppContext;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SelectionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Summary")]
    summary: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Resolved")]
    resolved: String,
}

impl From<&Arc<SelectionRecord>> for SelectionRow {
    fn from(r: &Arc<SelectionRecord>) -> Self {
        let resolved = match r.as_hotel() {
            Some(h) if h.resolved.is_some() => "yes",
            Some(_) => "no",
            None => "-",
        };
        Self {
            id: r.id().to_string(),
            kind: r.kind().into(),
            summary: r.summary(),
            created: r.created_at().format("%Y-%m-%d %H:%M").to_string(),
            resolved: resolved.into(),
        }
    }
}

fn detail(record: &SelectionRecord, ctx: &AppContext) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Selection {}", record.id());
    let _ = writeln!(out, "  Type:     {}", record.kind());
    let _ = writeln!(
        out,
        "  Created:  {}",
        record.created_at().format("%Y-%m-%d %H:%M:%S UTC")
    );
    match record {
        SelectionRecord::Flight(f) => {
            for leg in f.item.legs() {
                let _ = writeln!(
                    out,
                    "  Leg:      {} {} {}→{} {}-{} ({})",
                    leg.airline.code,
                    leg.flight_number,
                    leg.route.origin,
                    leg.route.destination,
                    leg.departure_time.format("%H:%M"),
                    leg.arrival_time.format("%H:%M"),
                    format_duration(leg.duration_minutes()),
                );
            }
            let _ = writeln!(
                out,
                "  Date:     {}{}",
                f.search_params.departure_date,
                f.search_params
                    .return_date
                    .map(|d| format!(" / {d}"))
                    .unwrap_or_default()
            );
            let _ = writeln!(out, "  Pax:      {}", f.search_params.passengers);
            let _ = write!(
                out,
                "  Fare:     {}",
                util::display_price(f.base_fare(), ctx.base_currency(), ctx.display())
            );
        }
        SelectionRecord::Hotel(h) => {
            let _ = writeln!(out, "  Hotel:    {} ({})", h.list_item.name, h.list_item.city);
            let _ = writeln!(
                out,
                "  Stay:     {} → {} ({} nights)",
                h.search_params.check_in,
                h.search_params.check_out,
                h.nights()
            );
            let _ = writeln!(
                out,
                "  Guests:   {} in {} room(s)",
                h.search_params.guests, h.search_params.rooms
            );
            let _ = write!(
                out,
                "  Nightly:  {}",
                util::display_price(h.list_item.nightly_rate, ctx.base_currency(), ctx.display())
            );
        }
    }
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(ctx: &AppContext, args: SelectionsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        SelectionsCommand::List => {
            let records = ctx.selections.list();
            let out = output::render_list(
                &global.output,
                &records,
                |r| SelectionRow::from(r),
                |r| r.id().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SelectionsCommand::Get { id } => {
            let (_, record) = util::resolve_selection(&ctx.selections, &id)?;
            let out = output::render_single(
                &global.output,
                record.as_ref(),
                |r| detail(r, ctx),
                |r| r.id().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SelectionsCommand::Remove { id } => {
            let sid = util::parse_selection_id(&id)?;
            if !ctx.selections.remove_selection(&sid) {
                return Err(CliError::NotFound {
                    resource_type: "selection".into(),
                    identifier: id,
                    list_command: "selections list".into(),
                });
            }
            // A draft without its selection can never be reopened.
            ctx.flights.remove_draft(&sid);
            ctx.hotels.remove_draft(&sid);
            output::notice("Selection removed", global.quiet);
            Ok(())
        }

        SelectionsCommand::Clear => {
            let count = ctx.selections.len();
            if !util::confirm(
                &format!("Remove all {count} selections?"),
                "selections clear",
                global.yes,
            )? {
                return Ok(());
            }
            ctx.selections.clear_all();
            for sid in ctx.flights.draft_ids() {
                ctx.flights.remove_draft(&sid);
            }
            for sid in ctx.hotels.draft_ids() {
                ctx.hotels.remove_draft(&sid);
            }
            output::notice(&format!("Removed {count} selections"), global.quiet);
            Ok(())
        }
    }
}
