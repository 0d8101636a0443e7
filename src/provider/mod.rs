// =============================================================================
// Market Data Provider
// =============================================================================
//
// The dashboard needs exactly two things from a data vendor: the list of
// tradable symbols (for the ticker dropdown) and a trailing window of daily
// OHLCV bars for one symbol. Implementations report failures as
// `anyhow::Error`; the controller turns them into `DashError::DataFetch`.
// =============================================================================

pub mod iex;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{HistoryWindow, PriceTable, Ticker};

pub use iex::IexClient;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// All symbols the provider can serve.
    async fn list_symbols(&self) -> Result<Vec<Ticker>>;

    /// Daily bars for `ticker` covering `window`, oldest first. An empty
    /// history is an error.
    async fn get_history(&self, ticker: &Ticker, window: HistoryWindow) -> Result<PriceTable>;
}

#[cfg(test)]
pub mod testing {
    //! In-memory provider that counts calls, for controller and API tests.

    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;
    use crate::chart::tests::rising_table;

    pub struct StubProvider {
        symbols: Vec<Ticker>,
        bars: usize,
        fail_history: AtomicBool,
        fail_symbols: bool,
        history_calls: AtomicUsize,
        symbol_calls: AtomicUsize,
    }

    impl StubProvider {
        /// Serves `symbols`, each with `bars` rising daily bars.
        pub fn new(symbols: &[&str], bars: usize) -> Self {
            Self {
                symbols: symbols.iter().map(|s| Ticker::new(s)).collect(),
                bars,
                fail_history: AtomicBool::new(false),
                fail_symbols: false,
                history_calls: AtomicUsize::new(0),
                symbol_calls: AtomicUsize::new(0),
            }
        }

        /// Every `list_symbols` call fails.
        pub fn without_symbol_list(mut self) -> Self {
            self.fail_symbols = true;
            self
        }

        pub fn set_failing(&self, failing: bool) {
            self.fail_history.store(failing, Ordering::SeqCst);
        }

        pub fn history_calls(&self) -> usize {
            self.history_calls.load(Ordering::SeqCst)
        }

        pub fn symbol_calls(&self) -> usize {
            self.symbol_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketDataProvider for StubProvider {
        async fn list_symbols(&self) -> Result<Vec<Ticker>> {
            self.symbol_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_symbols {
                anyhow::bail!("symbol service unavailable");
            }
            Ok(self.symbols.clone())
        }

        async fn get_history(&self, ticker: &Ticker, _window: HistoryWindow) -> Result<PriceTable> {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_history.load(Ordering::SeqCst) {
                anyhow::bail!("connection reset while fetching {ticker}");
            }
            Ok(rising_table(self.bars))
        }
    }
}
