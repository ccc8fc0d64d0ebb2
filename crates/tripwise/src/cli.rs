//! Clap derive structures for the `tripwise` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use tripwise_core::model::{
    CabinClass, CurrencyCode, DepartureWindow, DraftStatus, PaymentMethod, SortField, TicketType,
};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// tripwise -- search, select and check out flights and hotels
#[derive(Debug, Parser)]
#[command(
    name = "tripwise",
    version,
    about = "Search flights and hotels and walk a booking through checkout",
    long_about = "Search simulated flight and hotel inventory, keep selections \
        addressable by id, and build checkout drafts whose prices are held in \
        one base currency and converted on display.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Directory holding persisted selections, drafts and currency state
    #[arg(long, env = "TRIPWISE_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Keep all state in memory for this invocation only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Display currency for this invocation (does not change the saved one)
    #[arg(long, global = true)]
    pub currency: Option<CurrencyCode>,

    /// Simulated backend delay, e.g. "0s" or "250ms"
    #[arg(long, env = "TRIPWISE_LATENCY", global = true, value_parser = humantime::parse_duration)]
    pub latency: Option<Duration>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TRIPWISE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search flights and print one page of results
    #[command(alias = "s")]
    Search(SearchArgs),

    /// Turn a flight result or hotel into a selection
    Select(SelectArgs),

    /// Inspect and manage saved selections
    #[command(alias = "sel")]
    Selections(SelectionsArgs),

    /// Browse hotels and resolve hotel selections
    Hotel(HotelArgs),

    /// Build the checkout draft for a selection
    #[command(alias = "co")]
    Checkout(CheckoutArgs),

    /// Show or change the display currency and rates
    Currency(CurrencyArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Flight search ────────────────────────────────────────────────────

/// Identity of a flight search. Repeating it reproduces the same results.
#[derive(Debug, Clone, Args)]
pub struct FlightQueryArgs {
    /// Origin airport code(s), comma-separated
    #[arg(long, required = true, value_delimiter = ',')]
    pub from: Vec<String>,

    /// Destination airport code(s), comma-separated
    #[arg(long, required = true, value_delimiter = ',')]
    pub to: Vec<String>,

    /// Departure date (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,

    /// Return date (YYYY-MM-DD); makes the search a round trip
    #[arg(long = "return")]
    pub return_date: Option<NaiveDate>,

    /// Number of passengers
    #[arg(long, short = 'n', default_value = "1")]
    pub passengers: u32,

    /// Cabin class
    #[arg(long, default_value = "economy")]
    pub cabin: CabinClass,

    /// Target number of results (defaults to the configured count)
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub query: FlightQueryArgs,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Sort field
    #[arg(long, default_value = "price")]
    pub sort: SortField,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Page to show (1-based)
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Results per page (defaults to the configured limit)
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,

    /// Print the airline/aircraft facets and price/duration bounds
    #[arg(long)]
    pub facets: bool,
}

#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// Minimum price in the base currency
    #[arg(long)]
    pub min_price: Option<u64>,

    /// Maximum price in the base currency
    #[arg(long)]
    pub max_price: Option<u64>,

    /// Allowed airline codes, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub airline: Vec<String>,

    /// Direct flights only
    #[arg(long)]
    pub direct: bool,

    /// Allowed departure windows, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub window: Vec<DepartureWindow>,

    /// Minimum total duration in minutes
    #[arg(long)]
    pub min_duration: Option<u32>,

    /// Maximum total duration in minutes
    #[arg(long)]
    pub max_duration: Option<u32>,

    /// Allowed aircraft types, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub aircraft: Vec<String>,
}

// ── Select ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SelectArgs {
    #[command(subcommand)]
    pub command: SelectCommand,
}

#[derive(Debug, Subcommand)]
pub enum SelectCommand {
    /// Select a flight result from a search
    Flight {
        /// Result id as shown by `search` (e.g. FL-0003)
        #[arg(long)]
        result: String,

        #[command(flatten)]
        query: FlightQueryArgs,
    },

    /// Select a hotel from the catalog
    Hotel {
        /// Hotel id as shown by `hotel list`
        #[arg(long)]
        hotel: String,

        /// Check-in date (YYYY-MM-DD)
        #[arg(long)]
        check_in: NaiveDate,

        /// Check-out date (YYYY-MM-DD)
        #[arg(long)]
        check_out: NaiveDate,

        #[arg(long, default_value = "2")]
        guests: u32,

        #[arg(long, default_value = "1")]
        rooms: u32,
    },
}

// ── Selections ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SelectionsArgs {
    #[command(subcommand)]
    pub command: SelectionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SelectionsCommand {
    /// List selections, most recent first
    #[command(alias = "ls")]
    List,

    /// Show one selection
    Get { id: String },

    /// Remove a selection and its checkout draft
    #[command(alias = "rm")]
    Remove { id: String },

    /// Remove every selection
    Clear,
}

// ── Hotels ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HotelArgs {
    #[command(subcommand)]
    pub command: HotelCommand,
}

#[derive(Debug, Subcommand)]
pub enum HotelCommand {
    /// List catalog hotels
    #[command(alias = "ls")]
    List {
        /// Only hotels in this city
        #[arg(long)]
        city: Option<String>,
    },

    /// Fetch (once) and show the full detail for a hotel selection
    Resolve {
        /// Selection id
        id: String,
    },
}

// ── Checkout ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    #[command(subcommand)]
    pub command: CheckoutCommand,
}

#[derive(Debug, Subcommand)]
pub enum CheckoutCommand {
    /// Start (or restart) the draft for a selection
    Init { id: String },

    /// Choose the fare product (flights)
    Ticket { id: String, ticket: TicketType },

    /// Choose a seat (flights)
    Seat {
        id: String,

        /// Seat label, e.g. 12A
        #[arg(required_unless_present = "clear")]
        seat: Option<String>,

        /// Seat surcharge in the base currency
        #[arg(long, default_value = "0")]
        price: u64,

        /// Drop the current seat choice
        #[arg(long, conflicts_with = "seat")]
        clear: bool,
    },

    /// Set the add-on extras total in the base currency
    Extras { id: String, amount: u64 },

    /// Record passengers, contact, or hotel stay details
    Pax {
        id: String,

        /// Passenger as TITLE:FIRST:LAST (repeatable, flights)
        #[arg(long = "passenger")]
        passengers: Vec<String>,

        /// Contact / guest name
        #[arg(long, requires_all = ["email", "phone"])]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// Number of rooms (hotels)
        #[arg(long)]
        rooms: Option<u32>,

        /// Special request (hotels); empty clears it
        #[arg(long)]
        request: Option<String>,
    },

    /// Choose a payment method; its fee comes from configuration
    Pay { id: String, method: PaymentMethod },

    /// Record the booking status
    Status { id: String, status: DraftStatus },

    /// Show the draft and its price breakdown
    Show { id: String },

    /// Delete the draft, keeping the selection
    Discard { id: String },
}

// ── Currency ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CurrencyArgs {
    #[command(subcommand)]
    pub command: CurrencyCommand,
}

#[derive(Debug, Subcommand)]
pub enum CurrencyCommand {
    /// Show the display currency and rate table
    Show,

    /// Change the saved display currency
    Set { code: CurrencyCode },

    /// Merge rates into the table, as CODE=RATE per one USD
    Rates {
        #[arg(required = true)]
        pairs: Vec<String>,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file with default values
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
