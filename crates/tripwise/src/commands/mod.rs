//! Command dispatch: bridges CLI args -> store operations -> output formatting.

pub mod checkout;
pub mod config_cmd;
pub mod currency;
pub mod hotel;
pub mod search;
pub mod select;
pub mod selections;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::context::AppContext;
use crate::error::CliError;

/// Dispatch a store-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &AppContext, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Search(args) => search::handle(ctx, args, global).await,
        Command::Select(args) => select::handle(ctx, args, global).await,
        Command::Selections(args) => selections::handle(ctx, args, global),
        Command::Hotel(args) => hotel::handle(ctx, args, global).await,
        Command::Checkout(args) => checkout::handle(ctx, args, global),
        Command::Currency(args) => currency::handle(ctx, args, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
