//! Per-symbol metrics update and the symbol-by-symbol cycle around it.

use tracing::{debug, error, info, warn};

use crate::domain::metrics_row::MetricsRow;
use crate::domain::ohlcv::{OhlcvBar, Period};
use crate::domain::registry::load_symbols;
use crate::ports::clock_port::Clock;
use crate::ports::quote_port::QuotePort;
use crate::ports::store_port::MetricsStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// One metrics row was appended.
    Inserted,
    /// A bar set was absent; nothing was written.
    Skipped,
    /// Computation or insert failed; nothing was written.
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub symbols: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl CycleReport {
    fn record(&mut self, outcome: UpdateOutcome) {
        match outcome {
            UpdateOutcome::Inserted => self.inserted += 1,
            UpdateOutcome::Skipped => self.skipped += 1,
            UpdateOutcome::Failed => self.failed += 1,
        }
    }
}

pub struct MetricsUpdater<'a> {
    quotes: &'a dyn QuotePort,
    store: &'a dyn MetricsStore,
    clock: &'a dyn Clock,
    ema_span: usize,
}

impl<'a> MetricsUpdater<'a> {
    pub fn new(
        quotes: &'a dyn QuotePort,
        store: &'a dyn MetricsStore,
        clock: &'a dyn Clock,
        ema_span: usize,
    ) -> Self {
        Self {
            quotes,
            store,
            clock,
            ema_span,
        }
    }

    /// Fetch a bar set, folding provider errors and empty answers into `None`.
    pub fn fetch(&self, symbol: &str, period: Period) -> Option<Vec<OhlcvBar>> {
        match self.quotes.fetch_bars(symbol, period) {
            Ok(bars) if bars.is_empty() => {
                warn!(symbol, %period, "no data found");
                None
            }
            Ok(bars) => {
                debug!(symbol, %period, bars = bars.len(), "fetched bars");
                Some(bars)
            }
            Err(e) => {
                warn!(symbol, %period, error = %e, "quote fetch failed");
                None
            }
        }
    }

    /// Fetch, derive and append one row for `symbol`.
    pub fn update_symbol(&self, symbol: &str) -> UpdateOutcome {
        let daily = self.fetch(symbol, Period::OneDay);
        let lookback = self.fetch(symbol, Period::TwentyDays);

        let (Some(daily), Some(lookback)) = (daily, lookback) else {
            return UpdateOutcome::Skipped;
        };

        let timestamp = self.clock.now();
        let Some(row) = MetricsRow::compute(symbol, &daily, &lookback, self.ema_span, timestamp)
        else {
            error!(symbol, "could not derive metrics from daily bars");
            return UpdateOutcome::Failed;
        };

        match self.store.insert_metrics(&row) {
            Ok(()) => {
                info!(symbol, %timestamp, "metrics updated");
                UpdateOutcome::Inserted
            }
            Err(e) => {
                error!(symbol, error = %e, "failed to insert metrics");
                UpdateOutcome::Failed
            }
        }
    }

    /// One pass over the registry. An empty registry performs no fetches.
    pub fn run_cycle(&self) -> CycleReport {
        let symbols = load_symbols(self.store);
        let mut report = CycleReport {
            symbols: symbols.len(),
            ..CycleReport::default()
        };

        if symbols.is_empty() {
            warn!("no symbols found; add symbols to the registry");
            return report;
        }

        for symbol in &symbols {
            report.record(self.update_symbol(symbol));
        }

        info!(
            symbols = report.symbols,
            inserted = report.inserted,
            skipped = report.skipped,
            failed = report.failed,
            "cycle complete"
        );
        report
    }
}
