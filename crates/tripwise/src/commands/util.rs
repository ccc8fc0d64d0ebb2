//! Shared helpers for command handlers.

use std::future::Future;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use tripwise_core::model::{
    CurrencyCode, PriceBreakdown, SelectedBreakdown, SelectionId, SelectionRecord, as_amount,
    format_amount,
};
use tripwise_core::{CurrencyStore, SelectionStore};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Parse a selection id argument. Malformed ids are reported as unknown.
pub fn parse_selection_id(raw: &str) -> Result<SelectionId, CliError> {
    raw.trim().parse().map_err(|_| CliError::NotFound {
        resource_type: "selection".into(),
        identifier: raw.into(),
        list_command: "selections list".into(),
    })
}

/// Resolve a selection id argument to its record.
pub fn resolve_selection(
    selections: &SelectionStore,
    raw: &str,
) -> Result<(SelectionId, Arc<SelectionRecord>), CliError> {
    let id = parse_selection_id(raw)?;
    let record = selections.get_selection(&id).ok_or_else(|| CliError::NotFound {
        resource_type: "selection".into(),
        identifier: raw.into(),
        list_command: "selections list".into(),
    })?;
    Ok((id, record))
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Await `work` behind a spinner on interactive stderr.
pub async fn with_spinner<F: Future>(message: &str, global: &GlobalOpts, work: F) -> F::Output {
    if global.quiet || !std::io::stderr().is_terminal() {
        return work.await;
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(Duration::from_millis(80));
    let out = work.await;
    spinner.finish_and_clear();
    out
}

/// Human-readable breakdown: base amounts next to display amounts.
pub fn format_breakdown(
    breakdown: &PriceBreakdown,
    selected: &SelectedBreakdown,
    color: bool,
) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    for (line, shown) in breakdown.lines.iter().zip(&selected.lines) {
        if line.amount == 0 {
            continue;
        }
        let _ = writeln!(
            out,
            "  {:<18} {:>18}  {}",
            line.component.to_string(),
            format_amount(as_amount(line.amount), breakdown.currency),
            format_amount(shown.amount, selected.currency),
        );
    }
    let _ = write!(
        out,
        "  {:<18} {:>18}  {}",
        "total",
        format_amount(as_amount(breakdown.total), breakdown.currency),
        crate::output::paint_amount(selected.total, selected.currency, color),
    );
    if selected.fallback {
        let _ = write!(
            out,
            "\n  (no usable rate for the display currency, showing {})",
            breakdown.currency
        );
    }
    out
}

/// Base amount shown in the display currency, or in base when unconvertible.
pub fn display_price(amount: u64, base: CurrencyCode, display: &CurrencyStore) -> String {
    match display.to_display(as_amount(amount), base) {
        Some(v) => format_amount(v, display.currency()),
        None => format_amount(as_amount(amount), base),
    }
}
