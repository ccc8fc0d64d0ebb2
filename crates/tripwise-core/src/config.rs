// ── Runtime store configuration ──
//
// Describes how the stores behave: which currency drafts are held in, how
// much selection history to keep, and how long simulated backends take.
// Front-ends build a `StoreConfig` and hand it in; core never reads files.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::model::{CurrencyCode, DEFAULT_PAGE_LIMIT, PaymentMethod};

pub const DEFAULT_HISTORY_CAPACITY: usize = 100;
pub const DEFAULT_RESULT_COUNT: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Pivot currency every draft amount is stored in.
    pub base_currency: CurrencyCode,
    /// Display currency used when nothing has been persisted yet.
    pub display_currency: CurrencyCode,
    /// Most-recent selections kept; older ones are evicted.
    pub history_capacity: usize,
    /// Results per page in the search view.
    pub page_limit: usize,
    /// Target number of generated results per search.
    pub result_count: usize,
    /// Simulated backend latency for loaders.
    pub latency: Duration,
    /// Seed mixed into generated result sets.
    pub seed: u64,
    /// Flat payment fees in the base currency.
    pub payment_fees: BTreeMap<PaymentMethod, u64>,
    /// Rate overrides applied on top of the built-in table.
    pub rates: BTreeMap<CurrencyCode, f64>,
}

impl StoreConfig {
    pub fn payment_fee(&self, method: PaymentMethod) -> u64 {
        self.payment_fees.get(&method).copied().unwrap_or(0)
    }
}

/// Default flat fees, in IDR.
pub fn default_payment_fees() -> BTreeMap<PaymentMethod, u64> {
    BTreeMap::from([
        (PaymentMethod::BankTransfer, 0),
        (PaymentMethod::VirtualAccount, 4_000),
        (PaymentMethod::CreditCard, 15_000),
        (PaymentMethod::EWallet, 2_500),
        (PaymentMethod::Convenience, 7_500),
    ])
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_currency: CurrencyCode::IDR,
            display_currency: CurrencyCode::IDR,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            page_limit: DEFAULT_PAGE_LIMIT,
            result_count: DEFAULT_RESULT_COUNT,
            latency: Duration::from_millis(300),
            seed: 0,
            payment_fees: default_payment_fees(),
            rates: BTreeMap::new(),
        }
    }
}
