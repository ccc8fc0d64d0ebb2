//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::{Input, Select};
use strum::IntoEnumIterator;
use tripwise_core::model::CurrencyCode;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Ask for the handful of settings worth choosing up front.
fn wizard(mut cfg: Config) -> Result<Config, CliError> {
    let currencies: Vec<CurrencyCode> = CurrencyCode::iter().collect();
    let labels: Vec<String> = currencies
        .iter()
        .map(|c| format!("{c} ({})", c.symbol()))
        .collect();
    let current = currencies
        .iter()
        .position(|c| *c == cfg.display_currency)
        .unwrap_or(0);
    let picked = Select::new()
        .with_prompt("Display currency")
        .items(&labels)
        .default(current)
        .interact()
        .map_err(prompt_err)?;
    if let Some(code) = currencies.get(picked) {
        cfg.display_currency = *code;
    }

    cfg.latency = Input::new()
        .with_prompt("Simulated latency")
        .default(cfg.latency.clone())
        .validate_with(|v: &String| humantime::parse_duration(v).map(|_| ()))
        .interact_text()
        .map_err(prompt_err)?;
    Ok(cfg)
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => {
            let path = config::config_path();
            if path.exists()
                && !util::confirm(
                    &format!("Overwrite {}?", path.display()),
                    "config init",
                    global.yes,
                )?
            {
                return Ok(());
            }

            let interactive = !global.yes && std::io::stdin().is_terminal();
            let cfg = if interactive {
                wizard(Config::default())?
            } else {
                Config::default()
            };
            let written = config::save_config(&cfg)?;
            output::notice(
                &format!("Config written to {}", written.display()),
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = if output::is_table(&global.output) {
                toml::to_string_pretty(&cfg)?
            } else {
                output::render_single(&global.output, &cfg, |_| String::new(), |c| {
                    c.data_dir().display().to_string()
                })?
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}
