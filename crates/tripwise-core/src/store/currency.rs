// ── Currency store ──
//
// Process-wide rate table plus the selected display currency. Reads are
// wait-free snapshots through `ArcSwap`; the two mutators replace the whole
// state with `rcu` so concurrent rate merges never lose an update, and save
// under a write lock so the file ends on the latest state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::persist::{CURRENCY_KEY, PersistSlot, Storage};
use crate::model::{CurrencyCode, RateTable, convert_from_base, default_rates};

const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyState {
    pub currency: CurrencyCode,
    /// Units per one USD.
    pub rates: RateTable,
}

impl Default for CurrencyState {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::IDR,
            rates: default_rates(),
        }
    }
}

pub struct CurrencyStore {
    state: ArcSwap<CurrencyState>,
    slot: Option<PersistSlot>,
    /// Held from a mutation through its save so writes land in order.
    write: Mutex<()>,
}

impl CurrencyStore {
    pub fn new(initial: CurrencyState) -> Self {
        Self {
            state: ArcSwap::from_pointee(initial),
            slot: None,
            write: Mutex::new(()),
        }
    }

    /// Store backed by `storage`. Persisted state wins over `initial`.
    pub fn open(storage: Arc<dyn Storage>, initial: CurrencyState) -> Self {
        let slot = PersistSlot::new(storage, CURRENCY_KEY, SCHEMA_VERSION);
        let state = slot.load().unwrap_or(initial);
        Self {
            state: ArcSwap::from_pointee(state),
            slot: Some(slot),
            write: Mutex::new(()),
        }
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Callers hold the write lock.
    fn persist(&self, _writes: &MutexGuard<'_, ()>) {
        if let Some(slot) = &self.slot {
            slot.save(&*self.state.load_full());
        }
    }

    // ── Mutators ─────────────────────────────────────────────────────

    pub fn set_currency(&self, currency: CurrencyCode) {
        let writes = self.lock_writes();
        self.state.rcu(|current| CurrencyState {
            currency,
            rates: current.rates.clone(),
        });
        info!(%currency, "display currency changed");
        self.persist(&writes);
    }

    /// Merge rates into the table. Existing entries not mentioned are kept.
    pub fn set_rates(&self, partial: impl IntoIterator<Item = (CurrencyCode, f64)>) {
        let partial: Vec<(CurrencyCode, f64)> = partial.into_iter().collect();
        let writes = self.lock_writes();
        self.state.rcu(|current| {
            let mut next = CurrencyState::clone(current);
            next.rates.extend(partial.iter().copied());
            next
        });
        debug!(updated = partial.len(), "exchange rates merged");
        self.persist(&writes);
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<CurrencyState> {
        self.state.load_full()
    }

    pub fn currency(&self) -> CurrencyCode {
        self.state.load().currency
    }

    pub fn rate(&self, code: CurrencyCode) -> Option<f64> {
        self.state.load().rates.get(&code).copied()
    }

    /// Convert a base-currency amount into the selected display currency.
    pub fn to_display(&self, amount: f64, base: CurrencyCode) -> Option<f64> {
        let state = self.state.load();
        convert_from_base(amount, base, state.currency, &state.rates)
    }
}

impl Default for CurrencyStore {
    fn default() -> Self {
        Self::new(CurrencyState::default())
    }
}
