// ── Currency codes and pivot conversion ──
//
// Rates are expressed per one USD. Amounts stored in the base currency are
// converted by pivoting through the base currency's own rate:
//
//     display = (amount / rates[base]) * rates[display]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
#[allow(clippy::upper_case_acronyms)]
pub enum CurrencyCode {
    IDR,
    USD,
    EUR,
    SGD,
    MYR,
    JPY,
    AUD,
    GBP,
}

impl CurrencyCode {
    /// Built-in rate per one USD, used to seed the rate table and as the
    /// fallback when the table is missing the base currency.
    pub fn default_rate(self) -> f64 {
        match self {
            Self::IDR => 15_500.0,
            Self::USD => 1.0,
            Self::EUR => 0.92,
            Self::SGD => 1.34,
            Self::MYR => 4.72,
            Self::JPY => 149.5,
            Self::AUD => 1.53,
            Self::GBP => 0.79,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::IDR => "Rp",
            Self::USD => "$",
            Self::EUR => "€",
            Self::SGD => "S$",
            Self::MYR => "RM",
            Self::JPY => "¥",
            Self::AUD => "A$",
            Self::GBP => "£",
        }
    }

    /// Minor-unit digits used for display rounding.
    pub fn decimals(self) -> usize {
        match self {
            Self::IDR | Self::JPY => 0,
            _ => 2,
        }
    }
}

pub type RateTable = BTreeMap<CurrencyCode, f64>;

pub fn default_rates() -> RateTable {
    CurrencyCode::iter().map(|c| (c, c.default_rate())).collect()
}

fn usable(rate: Option<&f64>) -> Option<f64> {
    rate.copied().filter(|r| r.is_finite() && *r > 0.0)
}

/// Rate of the base currency, falling back to its built-in value when the
/// table has no usable entry.
fn base_rate(rates: &RateTable, base: CurrencyCode) -> f64 {
    usable(rates.get(&base)).unwrap_or_else(|| base.default_rate())
}

/// Convert an amount held in `base` into `display`.
///
/// Returns `None` when the display currency has no usable rate; callers then
/// show the base amount under the base currency label.
pub fn convert_from_base(
    amount: f64,
    base: CurrencyCode,
    display: CurrencyCode,
    rates: &RateTable,
) -> Option<f64> {
    if base == display {
        return Some(amount);
    }
    let to = usable(rates.get(&display))?;
    let value = (amount / base_rate(rates, base)) * to;
    value.is_finite().then_some(value)
}

/// Inverse of [`convert_from_base`].
pub fn convert_to_base(
    amount: f64,
    base: CurrencyCode,
    display: CurrencyCode,
    rates: &RateTable,
) -> Option<f64> {
    if base == display {
        return Some(amount);
    }
    let from = usable(rates.get(&display))?;
    let value = (amount / from) * base_rate(rates, base);
    value.is_finite().then_some(value)
}

/// Widen a whole base-currency amount for rate arithmetic.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn as_amount(value: u64) -> f64 {
    value as f64
}

/// Format an amount with the currency symbol and its display precision.
pub fn format_amount(amount: f64, currency: CurrencyCode) -> String {
    format!(
        "{} {:.*}",
        currency.symbol(),
        currency.decimals(),
        amount
    )
}
