//! Checkout draft command handlers.
//!
//! The selection record decides which draft store a command talks to.
//! Every setter reports the recomputed total on stderr so scripted runs
//! can keep stdout for `show`.

use std::fmt::Write as _;

use serde::Serialize;
use tripwise_core::loader;
use tripwise_core::model::{
    Contact, DraftStatus, FlightDraft, HotelDraft, Passenger, PriceBreakdown, SelectedBreakdown,
    SelectionId, SelectionRecord,
};

use crate::cli::{CheckoutArgs, CheckoutCommand, GlobalOpts};
use crate::context::AppContext;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Flight,
    Hotel,
}

impl Kind {
    fn of(record: &SelectionRecord) -> Self {
        match record {
            SelectionRecord::Flight(_) => Self::Flight,
            SelectionRecord::Hotel(_) => Self::Hotel,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Flight => "flight",
            Self::Hotel => "hotel",
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum DraftView {
    Flight(FlightDraft),
    Hotel(HotelDraft),
}

#[derive(Serialize)]
struct CheckoutView {
    draft: DraftView,
    breakdown: PriceBreakdown,
    selected: SelectedBreakdown,
}

// ── Helpers ─────────────────────────────────────────────────────────

fn require(kind: Kind, expected: Kind, id: &SelectionId) -> Result<(), CliError> {
    if kind == expected {
        Ok(())
    } else {
        Err(CliError::WrongKind {
            id: id.to_string(),
            expected: expected.name().into(),
            actual: kind.name().into(),
        })
    }
}

fn applied(found: bool, id: &SelectionId) -> Result<(), CliError> {
    if found {
        Ok(())
    } else {
        Err(CliError::NoDraft { id: id.to_string() })
    }
}

fn parse_passenger(raw: &str) -> Result<Passenger, CliError> {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    match parts.as_slice() {
        [title, first, last] if !first.is_empty() && !last.is_empty() => Ok(Passenger {
            title: (*title).to_owned(),
            first_name: (*first).to_owned(),
            last_name: (*last).to_owned(),
            date_of_birth: None,
        }),
        _ => Err(CliError::Validation {
            field: "passenger".into(),
            reason: format!("expected TITLE:FIRST:LAST, got '{raw}'"),
        }),
    }
}

fn breakdowns(
    ctx: &AppContext,
    kind: Kind,
    id: &SelectionId,
) -> Result<(PriceBreakdown, SelectedBreakdown), CliError> {
    let pair = match kind {
        Kind::Flight => ctx
            .flights
            .get_price_breakdown(id)
            .zip(ctx.flights.get_selected_breakdown(id, ctx.display())),
        Kind::Hotel => ctx
            .hotels
            .get_price_breakdown(id)
            .zip(ctx.hotels.get_selected_breakdown(id, ctx.display())),
    };
    pair.ok_or_else(|| CliError::NoDraft { id: id.to_string() })
}

fn report_total(
    ctx: &AppContext,
    kind: Kind,
    id: &SelectionId,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (_, selected) = breakdowns(ctx, kind, id)?;
    let color = output::should_color(&global.color);
    output::notice(
        &format!(
            "Total: {}",
            output::paint_amount(selected.total, selected.currency, color)
        ),
        global.quiet,
    );
    Ok(())
}

fn status_of(ctx: &AppContext, kind: Kind, id: &SelectionId) -> Option<DraftStatus> {
    match kind {
        Kind::Flight => ctx.flights.get_draft(id).map(|d| d.status),
        Kind::Hotel => ctx.hotels.get_draft(id).map(|d| d.status),
    }
}

fn flight_detail(d: &FlightDraft, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Flight checkout {}", d.booking_id);
    let _ = writeln!(out, "  Status:     {}", output::paint_status(d.status, color));
    let _ = writeln!(out, "  Ticket:     {}", d.ticket_type);
    if d.passengers.is_empty() {
        let _ = writeln!(out, "  Passengers: -");
    }
    for p in &d.passengers {
        let _ = writeln!(out, "  Passenger:  {} {} {}", p.title, p.first_name, p.last_name);
    }
    if let Some(c) = &d.contact {
        let _ = writeln!(out, "  Contact:    {} <{}> {}", c.name, c.email, c.phone);
    }
    if let Some(s) = &d.seat {
        let _ = writeln!(out, "  Seat:       {}", s.seat);
    }
    if let Some(p) = &d.payment {
        let _ = writeln!(out, "  Payment:    {}", p.method);
    }
    out
}

fn hotel_detail(d: &HotelDraft, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Hotel checkout {}", d.booking_id);
    let _ = writeln!(out, "  Status:     {}", output::paint_status(d.status, color));
    let _ = writeln!(out, "  Stay:       {} night(s), {} room(s)", d.nights, d.rooms);
    if let Some(g) = &d.guest {
        let _ = writeln!(out, "  Guest:      {} <{}> {}", g.name, g.email, g.phone);
    }
    if let Some(r) = &d.special_request {
        let _ = writeln!(out, "  Request:    {r}");
    }
    if let Some(p) = &d.payment {
        let _ = writeln!(out, "  Payment:    {}", p.method);
    }
    out
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(ctx: &AppContext, args: CheckoutArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let raw_id = match &args.command {
        CheckoutCommand::Init { id }
        | CheckoutCommand::Ticket { id, .. }
        | CheckoutCommand::Seat { id, .. }
        | CheckoutCommand::Extras { id, .. }
        | CheckoutCommand::Pax { id, .. }
        | CheckoutCommand::Pay { id, .. }
        | CheckoutCommand::Status { id, .. }
        | CheckoutCommand::Show { id }
        | CheckoutCommand::Discard { id } => id.clone(),
    };
    let (sid, record) = util::resolve_selection(&ctx.selections, &raw_id)?;
    let kind = Kind::of(&record);

    match args.command {
        CheckoutCommand::Init { .. } => {
            match kind {
                Kind::Flight => {
                    let fare = loader::flight_base_fare(&record)?;
                    ctx.flights.init_draft(sid, fare);
                }
                Kind::Hotel => {
                    let (rate, nights) = loader::hotel_stay(&record)?;
                    ctx.hotels.init_draft(sid, rate, nights);
                    if let Some(h) = record.as_hotel() {
                        ctx.hotels.set_rooms(&sid, h.search_params.rooms);
                    }
                }
            }
            output::notice(&format!("Started {} checkout", kind.name()), global.quiet);
            report_total(ctx, kind, &sid, global)
        }

        CheckoutCommand::Ticket { ticket, .. } => {
            require(kind, Kind::Flight, &sid)?;
            applied(ctx.flights.set_ticket_type(&sid, ticket), &sid)?;
            report_total(ctx, kind, &sid, global)
        }

        CheckoutCommand::Seat {
            seat, price, clear, ..
        } => {
            require(kind, Kind::Flight, &sid)?;
            let found = match seat {
                Some(label) if !clear => ctx.flights.set_seat(&sid, label, price),
                _ => ctx.flights.clear_seat(&sid),
            };
            applied(found, &sid)?;
            report_total(ctx, kind, &sid, global)
        }

        CheckoutCommand::Extras { amount, .. } => {
            let found = match kind {
                Kind::Flight => ctx.flights.set_extras_total(&sid, amount),
                Kind::Hotel => ctx.hotels.set_extras_total(&sid, amount),
            };
            applied(found, &sid)?;
            report_total(ctx, kind, &sid, global)
        }

        CheckoutCommand::Pax {
            passengers,
            name,
            email,
            phone,
            rooms,
            request,
            ..
        } => {
            let contact = match (name, email, phone) {
                (Some(name), Some(email), Some(phone)) => Some(Contact { name, email, phone }),
                _ => None,
            };

            match kind {
                Kind::Flight => {
                    if rooms.is_some() || request.is_some() {
                        return Err(CliError::Validation {
                            field: "rooms/request".into(),
                            reason: "only apply to hotel selections".into(),
                        });
                    }
                    if !passengers.is_empty() {
                        let parsed = passengers
                            .iter()
                            .map(|p| parse_passenger(p))
                            .collect::<Result<Vec<_>, _>>()?;
                        applied(ctx.flights.set_passengers(&sid, parsed), &sid)?;
                    }
                    if let Some(contact) = contact {
                        applied(ctx.flights.set_contact(&sid, contact), &sid)?;
                    }
                }
                Kind::Hotel => {
                    if !passengers.is_empty() {
                        return Err(CliError::Validation {
                            field: "passenger".into(),
                            reason: "only applies to flight selections; use --name for the guest"
                                .into(),
                        });
                    }
                    if let Some(contact) = contact {
                        applied(ctx.hotels.set_guest(&sid, contact), &sid)?;
                    }
                    if let Some(rooms) = rooms {
                        applied(ctx.hotels.set_rooms(&sid, rooms), &sid)?;
                    }
                    if let Some(request) = request {
                        applied(ctx.hotels.set_special_request(&sid, Some(request)), &sid)?;
                    }
                }
            }
            report_total(ctx, kind, &sid, global)
        }

        CheckoutCommand::Pay { method, .. } => {
            let fee = ctx.settings.payment_fee(method);
            let found = match kind {
                Kind::Flight => ctx.flights.set_payment_method(&sid, method, fee),
                Kind::Hotel => ctx.hotels.set_payment_method(&sid, method, fee),
            };
            applied(found, &sid)?;
            report_total(ctx, kind, &sid, global)
        }

        CheckoutCommand::Status { status, .. } => {
            let previous = status_of(ctx, kind, &sid);
            let found = match kind {
                Kind::Flight => ctx.flights.set_status(&sid, status),
                Kind::Hotel => ctx.hotels.set_status(&sid, status),
            };
            applied(found, &sid)?;
            let color = output::should_color(&global.color);
            if let Some(prev) = previous.filter(|p| !p.allows(status)) {
                output::notice(
                    &format!("Status moved back from {prev} to {status}"),
                    global.quiet,
                );
            }
            output::notice(
                &format!("Status: {}", output::paint_status(status, color)),
                global.quiet,
            );
            Ok(())
        }

        CheckoutCommand::Show { .. } => {
            let draft = match kind {
                Kind::Flight => ctx.flights.get_draft(&sid).map(DraftView::Flight),
                Kind::Hotel => ctx.hotels.get_draft(&sid).map(DraftView::Hotel),
            }
            .ok_or_else(|| CliError::NoDraft {
                id: sid.to_string(),
            })?;
            let (breakdown, selected) = breakdowns(ctx, kind, &sid)?;
            let view = CheckoutView {
                draft,
                breakdown,
                selected,
            };

            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &view,
                |v| {
                    let head = match &v.draft {
                        DraftView::Flight(d) => flight_detail(d, color),
                        DraftView::Hotel(d) => hotel_detail(d, color),
                    };
                    format!(
                        "{head}\n{}",
                        util::format_breakdown(&v.breakdown, &v.selected, color)
                    )
                },
                |v| format!("{:.2}", v.selected.total),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CheckoutCommand::Discard { .. } => {
            let removed = match kind {
                Kind::Flight => ctx.flights.remove_draft(&sid),
                Kind::Hotel => ctx.hotels.remove_draft(&sid),
            };
            applied(removed, &sid)?;
            output::notice("Draft discarded", global.quiet);
            Ok(())
        }
    }
}
