//! Hotel catalog command handlers.

use std::fmt::Write as _;

use tabled::Tabled;
use tripwise_core::loader;
use tripwise_core::model::{HotelDetail, HotelListItem};

use crate::cli::{GlobalOpts, HotelArgs, HotelCommand};
use crate::context::AppContext;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct HotelRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Stars")]
    stars: String,
    #[tabled(rename = "Rating")]
    rating: String,
    #[tabled(rename = "From")]
    from: String,
}

impl HotelRow {
    fn new(h: &HotelListItem, ctx: &AppContext) -> Self {
        Self {
            id: h.id.clone(),
            name: h.name.clone(),
            city: h.city.clone(),
            stars: "★".repeat(usize::from(h.stars)),
            rating: format!("{:.1}", h.rating),
            from: util::display_price(h.nightly_rate, ctx.base_currency(), ctx.display()),
        }
    }
}

#[derive(Tabled)]
struct RoomRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Room")]
    name: String,
    #[tabled(rename = "Guests")]
    guests: u32,
    #[tabled(rename = "Breakfast")]
    breakfast: String,
    #[tabled(rename = "Nightly")]
    nightly: String,
}

fn detail(h: &HotelDetail, ctx: &AppContext) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", h.name, "★".repeat(usize::from(h.stars)));
    let _ = writeln!(out, "  {}, {}", h.address, h.city);
    let _ = writeln!(out, "  Rating: {:.1}", h.rating);
    if !h.amenities.is_empty() {
        let _ = writeln!(out, "  Amenities: {}", h.amenities.join(", "));
    }
    let _ = writeln!(out, "\n{}\n", h.description);
    let rows: Vec<RoomRow> = h
        .rooms
        .iter()
        .map(|r| RoomRow {
            code: r.code.clone(),
            name: r.name.clone(),
            guests: r.max_guests,
            breakfast: if r.breakfast_included { "yes" } else { "no" }.into(),
            nightly: util::display_price(r.nightly_rate, ctx.base_currency(), ctx.display()),
        })
        .collect();
    out.push_str(&output::render_table(&rows));
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &AppContext, args: HotelArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        HotelCommand::List { city } => {
            let hotels = ctx.catalog.list(city.as_deref());
            let out = output::render_list(
                &global.output,
                &hotels,
                |h| HotelRow::new(h, ctx),
                |h| h.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HotelCommand::Resolve { id } => {
            let sid = util::parse_selection_id(&id)?;
            let detail_data = util::with_spinner(
                "Fetching hotel...",
                global,
                loader::resolve_hotel_selection(&ctx.selections, &ctx.catalog, &sid),
            )
            .await?;
            let out = output::render_single(
                &global.output,
                &detail_data,
                |h| detail(h, ctx),
                |h| h.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
