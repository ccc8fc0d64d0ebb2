//! Selection creation: pin a flight result or a hotel to an id.

use tripwise_core::model::{HotelSearchParams, SearchResult};

use crate::cli::{GlobalOpts, SelectArgs, SelectCommand};
use crate::context::AppContext;
use crate::error::CliError;
use crate::output;

use super::search;

pub async fn handle(ctx: &AppContext, args: SelectArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let id = match args.command {
        SelectCommand::Flight { result, query } => {
            // Searches are deterministic per (seed, params), so re-running
            // the query reproduces the result ids shown by `search`.
            let params = search::build_params(&query, ctx)?;
            search::run_search(ctx, params.clone(), global).await;

            let item = ctx
                .search
                .find(result.trim())
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "flight result".into(),
                    identifier: result.clone(),
                    list_command: "search".into(),
                })?;
            ctx.selections
                .create_flight_selection(SearchResult::clone(&item), params)
        }

        SelectCommand::Hotel {
            hotel,
            check_in,
            check_out,
            guests,
            rooms,
        } => {
            if check_out <= check_in {
                return Err(CliError::Validation {
                    field: "check-out".into(),
                    reason: "must be after check-in".into(),
                });
            }
            if rooms == 0 || guests == 0 {
                return Err(CliError::Validation {
                    field: "rooms".into(),
                    reason: "rooms and guests must be at least 1".into(),
                });
            }

            let item = ctx
                .catalog
                .list_item(hotel.trim())
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "hotel".into(),
                    identifier: hotel.clone(),
                    list_command: "hotel list".into(),
                })?;
            let params = HotelSearchParams {
                city: item.city.clone(),
                check_in,
                check_out,
                guests,
                rooms,
            };
            ctx.selections.create_hotel_selection(item, params)
        }
    };

    // A new selection may have evicted an old one along with its drafts.
    ctx.prune_orphan_drafts();

    // The id is the output; scripts capture it.
    output::print_output(&id.to_string(), global.quiet);
    Ok(())
}
