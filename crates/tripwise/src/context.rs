//! Per-invocation session: every store, wired to one storage backend.

use std::sync::Arc;

use tracing::debug;
use tripwise_core::model::{CurrencyCode, SelectionId, default_rates};
use tripwise_core::{
    CurrencyState, CurrencyStore, FileStorage, FlightCheckoutStore, FlightGenerator,
    HotelCheckoutStore, MemoryStorage, MockHotelCatalog, SearchStore, SelectionStore, Storage,
    StoreConfig,
};

use crate::cli::GlobalOpts;
use crate::config::Resolved;

pub struct AppContext {
    pub settings: StoreConfig,
    pub search: SearchStore,
    pub selections: SelectionStore,
    pub currency: CurrencyStore,
    pub flights: FlightCheckoutStore,
    pub hotels: HotelCheckoutStore,
    pub generator: FlightGenerator,
    pub catalog: MockHotelCatalog,
    /// Display-only currency from `--currency`; never persisted.
    display_override: Option<CurrencyStore>,
}

impl AppContext {
    pub fn new(resolved: Resolved, global: &GlobalOpts) -> Self {
        let Resolved {
            store: settings,
            data_dir,
        } = resolved;

        let storage: Arc<dyn Storage> = match data_dir {
            Some(dir) => Arc::new(FileStorage::new(dir)),
            None => Arc::new(MemoryStorage::new()),
        };

        let mut rates = default_rates();
        rates.extend(settings.rates.iter().map(|(c, r)| (*c, *r)));
        let currency = CurrencyStore::open(
            Arc::clone(&storage),
            CurrencyState {
                currency: settings.display_currency,
                rates,
            },
        );
        apply_rate_overrides(&currency, &settings);

        let display_override = global.currency.map(|code| {
            CurrencyStore::new(CurrencyState {
                currency: code,
                rates: currency.snapshot().rates.clone(),
            })
        });

        let ctx = Self {
            search: SearchStore::with_page_limit(settings.page_limit),
            selections: SelectionStore::open(Arc::clone(&storage), settings.history_capacity),
            flights: FlightCheckoutStore::open(Arc::clone(&storage), settings.base_currency),
            hotels: HotelCheckoutStore::open(storage, settings.base_currency),
            generator: FlightGenerator::new(settings.seed),
            catalog: MockHotelCatalog::new(settings.latency),
            currency,
            display_override,
            settings,
        };
        ctx.prune_orphan_drafts();
        ctx
    }

    /// Drop checkout drafts whose selection was evicted or removed.
    pub fn prune_orphan_drafts(&self) {
        let live = |id: &SelectionId| self.selections.contains(id);
        let pruned = self.flights.retain_drafts(live) + self.hotels.retain_drafts(live);
        if pruned > 0 {
            debug!(pruned, "pruned checkout drafts without a selection");
        }
    }

    /// Currency store to convert display amounts with.
    pub fn display(&self) -> &CurrencyStore {
        self.display_override.as_ref().unwrap_or(&self.currency)
    }

    pub fn base_currency(&self) -> CurrencyCode {
        self.settings.base_currency
    }
}

/// Configured rates win over persisted ones; only changed entries are written.
fn apply_rate_overrides(currency: &CurrencyStore, settings: &StoreConfig) {
    let changed: Vec<(CurrencyCode, f64)> = settings
        .rates
        .iter()
        .filter(|(code, rate)| {
            currency
                .rate(**code)
                .is_none_or(|current| (current - **rate).abs() > f64::EPSILON)
        })
        .map(|(code, rate)| (*code, *rate))
        .collect();
    if !changed.is_empty() {
        currency.set_rates(changed);
    }
}
