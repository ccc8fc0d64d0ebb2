//! Display currency and rate table command handlers.

use serde::Serialize;
use tabled::Tabled;
use tripwise_core::model::CurrencyCode;

use crate::cli::{CurrencyArgs, CurrencyCommand, GlobalOpts};
use crate::context::AppContext;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct RateEntry {
    code: CurrencyCode,
    symbol: &'static str,
    rate: f64,
    selected: bool,
}

#[derive(Tabled)]
struct RateRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Per USD")]
    rate: String,
    #[tabled(rename = "Selected")]
    selected: String,
}

impl From<&RateEntry> for RateRow {
    fn from(e: &RateEntry) -> Self {
        Self {
            code: e.code.to_string(),
            symbol: e.symbol.into(),
            rate: format!("{:.4}", e.rate),
            selected: if e.selected { "*" } else { "" }.into(),
        }
    }
}

/// Parse `CODE=RATE`. Rates must be positive and finite.
fn parse_rate(raw: &str) -> Result<(CurrencyCode, f64), CliError> {
    let invalid = |reason: String| CliError::Validation {
        field: "rate".into(),
        reason,
    };
    let (code, rate) = raw
        .split_once('=')
        .ok_or_else(|| invalid(format!("expected CODE=RATE, got '{raw}'")))?;
    let code: CurrencyCode = code
        .trim()
        .parse()
        .map_err(|_| invalid(format!("unknown currency '{}'", code.trim())))?;
    let rate: f64 = rate
        .trim()
        .parse()
        .map_err(|_| invalid(format!("'{}' is not a number", rate.trim())))?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(invalid(format!("{code} rate must be positive, got {rate}")));
    }
    Ok((code, rate))
}

pub fn handle(ctx: &AppContext, args: CurrencyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        CurrencyCommand::Show => {
            let state = ctx.display().snapshot();
            let entries: Vec<RateEntry> = state
                .rates
                .iter()
                .map(|(code, rate)| RateEntry {
                    code: *code,
                    symbol: code.symbol(),
                    rate: *rate,
                    selected: *code == state.currency,
                })
                .collect();
            let out = output::render_list(
                &global.output,
                &entries,
                |e| RateRow::from(e),
                |e| e.code.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            if output::is_table(&global.output) {
                output::notice(
                    &format!(
                        "Display currency: {} (amounts are held in {})",
                        state.currency,
                        ctx.base_currency()
                    ),
                    global.quiet,
                );
            }
            Ok(())
        }

        CurrencyCommand::Set { code } => {
            ctx.currency.set_currency(code);
            output::notice(&format!("Display currency set to {code}"), global.quiet);
            Ok(())
        }

        CurrencyCommand::Rates { pairs } => {
            let parsed = pairs
                .iter()
                .map(|p| parse_rate(p))
                .collect::<Result<Vec<_>, _>>()?;
            let count = parsed.len();
            ctx.currency.set_rates(parsed);
            output::notice(&format!("Updated {count} rate(s)"), global.quiet);
            Ok(())
        }
    }
}
