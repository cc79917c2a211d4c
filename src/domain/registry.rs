//! Symbol registry access.

use tracing::{debug, error};

use crate::ports::store_port::MetricsStore;

/// Symbols to process this cycle, in store order.
///
/// A store failure is logged and reported as an empty registry; the caller
/// treats that as "nothing to do this cycle".
pub fn load_symbols(store: &dyn MetricsStore) -> Vec<String> {
    match store.list_symbols() {
        Ok(symbols) => {
            let symbols: Vec<String> = symbols
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            debug!(count = symbols.len(), "loaded symbol registry");
            symbols
        }
        Err(e) => {
            error!(error = %e, "failed to load symbols");
            Vec::new()
        }
    }
}
