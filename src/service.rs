// =============================================================================
// Dashboard Service — shared application state
// =============================================================================
//
// Constructed once in `main` and shared with every request handler as
// `Arc<DashboardService>`. Owns the market data provider, the figure cache,
// the ticker universe, and the configuration.
//
// Thread safety:
//   - parking_lot::RwLock for the ticker universe.
//   - The figure cache manages its own locking and counters.
// =============================================================================

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{info, warn};

use crate::cache::{CacheKey, CacheStats, FigureCache};
use crate::chart::Figure;
use crate::config::DashboardConfig;
use crate::controller::{build_figure, FigureSize, GraphRequest};
use crate::error::DashError;
use crate::layout::DashboardLayout;
use crate::provider::MarketDataProvider;
use crate::types::Ticker;

/// Where the current ticker universe came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolSource {
    Provider,
    Fallback,
}

/// Payload of `GET /api/v1/health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub status: &'static str,
    pub server_time: i64,
    pub uptime_secs: u64,
    pub symbols: usize,
    pub symbol_source: SymbolSource,
    pub cache: CacheStats,
}

pub struct DashboardService {
    provider: Arc<dyn MarketDataProvider>,
    cache: FigureCache,
    symbols: RwLock<Vec<Ticker>>,
    symbol_source: RwLock<SymbolSource>,
    config: DashboardConfig,
    start_time: std::time::Instant,
}

impl DashboardService {
    /// The ticker universe starts as the configured fallback list until
    /// `refresh_symbols` succeeds.
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: DashboardConfig) -> Self {
        let fallback = normalise(config.fallback_symbols.iter().map(Ticker::new));
        Self {
            provider,
            cache: FigureCache::new(config.cache_ttl(), config.cache_max_entries),
            symbols: RwLock::new(fallback),
            symbol_source: RwLock::new(SymbolSource::Fallback),
            config,
            start_time: std::time::Instant::now(),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn figure_size(&self) -> FigureSize {
        FigureSize {
            width: self.config.figure_width,
            height: self.config.figure_height,
        }
    }

    // ── Ticker universe ─────────────────────────────────────────────────

    /// Reload the ticker universe from the provider. On failure the current
    /// list is kept and the error is logged. Returns the universe size.
    pub async fn refresh_symbols(&self) -> usize {
        match self.provider.list_symbols().await {
            Ok(list) if !list.is_empty() => {
                let list = normalise(list);
                let count = list.len();
                *self.symbols.write() = list;
                *self.symbol_source.write() = SymbolSource::Provider;
                info!(count, "ticker universe loaded from provider");
                count
            }
            Ok(_) => {
                warn!("provider returned an empty symbol list, keeping current universe");
                self.symbols.read().len()
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "symbol list unavailable, keeping current universe");
                self.symbols.read().len()
            }
        }
    }

    pub fn symbols(&self) -> Vec<Ticker> {
        self.symbols.read().clone()
    }

    pub fn symbol_source(&self) -> SymbolSource {
        *self.symbol_source.read()
    }

    pub fn has_symbol(&self, ticker: &Ticker) -> bool {
        self.symbols.read().binary_search(ticker).is_ok()
    }

    // ── Graph requests ──────────────────────────────────────────────────

    /// Figure for `request`, served from the cache when possible.
    pub async fn update_graph(&self, request: &GraphRequest) -> Result<Arc<Figure>, DashError> {
        if !self.has_symbol(&request.ticker) {
            return Err(DashError::data_fetch(&request.ticker, "ticker is not in the symbol universe"));
        }

        let key = CacheKey::new(&request.ticker, &request.indicators, request.arglist.as_deref());
        let size = self.figure_size();
        self.cache
            .get_or_compute(key, || build_figure(self.provider.as_ref(), request, size))
            .await
    }

    /// Figure shown in the chart area when `err` prevents rendering.
    pub fn error_figure(&self, err: &DashError) -> Figure {
        Figure::error(err.to_string(), self.config.figure_width, self.config.figure_height)
    }

    // ── Page & status ───────────────────────────────────────────────────

    pub fn layout(&self) -> DashboardLayout {
        DashboardLayout::new(&self.symbols.read(), &self.config)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn health(&self) -> HealthSnapshot {
        HealthSnapshot {
            status: "ok",
            server_time: Utc::now().timestamp_millis(),
            uptime_secs: self.start_time.elapsed().as_secs(),
            symbols: self.symbols.read().len(),
            symbol_source: self.symbol_source(),
            cache: self.cache.stats(),
        }
    }
}

/// Sorted, de-duplicated, non-empty tickers.
fn normalise(tickers: impl IntoIterator<Item = Ticker>) -> Vec<Ticker> {
    let mut list: Vec<Ticker> = tickers.into_iter().filter(|t| !t.is_empty()).collect();
    list.sort();
    list.dedup();
    list
}
