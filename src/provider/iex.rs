// =============================================================================
// IEX Cloud REST Client
// =============================================================================
//
// Public market data over plain HTTPS GET. Authentication is a `token` query
// parameter; the token is never logged or printed through `Debug`, and
// transport errors are stripped of their URL before they propagate.
//
// Endpoints used:
//   GET /ref-data/symbols             -> symbol universe
//   GET /stock/{symbol}/chart/{range} -> daily OHLCV rows
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::MarketDataProvider;
use crate::types::{HistoryWindow, PriceBar, PriceTable, Ticker};

/// IEX-compatible REST client.
#[derive(Clone)]
pub struct IexClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl IexClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a new `IexClient`.
    ///
    /// # Arguments
    /// * `base_url`: API root, e.g. `https://cloud.iexapis.com/stable`.
    /// * `token`: publishable API token, sent as a query parameter.
    /// * `timeout`: per-request timeout; no retries are attempted.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %base_url, "IexClient initialised");

        Ok(Self {
            base_url,
            token: token.into(),
            client,
        })
    }

    /// GET `{base_url}{path}` with the token attached and return the JSON body.
    async fn get_json(&self, path: &str) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);

        let resp = self
            .client
            .get(&url)
            .query(&[("token", self.token.as_str())])
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("GET {path} request failed"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("IEX GET {path} returned {status}: {body}");
        }

        resp.json()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("failed to parse {path} response"))
    }
}

#[async_trait]
impl MarketDataProvider for IexClient {
    #[instrument(skip(self), name = "iex::list_symbols")]
    async fn list_symbols(&self) -> Result<Vec<Ticker>> {
        let body = self.get_json("/ref-data/symbols").await?;
        let symbols = parse_symbols(&body)?;
        debug!(count = symbols.len(), "symbols fetched");
        Ok(symbols)
    }

    #[instrument(skip(self, ticker, window), fields(ticker = %ticker, window = %window), name = "iex::get_history")]
    async fn get_history(&self, ticker: &Ticker, window: HistoryWindow) -> Result<PriceTable> {
        let path = format!("/stock/{}/chart/{}", ticker.as_str().to_lowercase(), window.as_range());
        let body = self.get_json(&path).await?;
        let table = parse_chart(&body)?;
        debug!(bars = table.len(), "history fetched");
        Ok(table)
    }
}

impl std::fmt::Debug for IexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IexClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Response parsing
// =============================================================================

#[derive(Debug, Deserialize)]
struct SymbolRow {
    symbol: String,
    #[serde(default = "enabled_by_default", rename = "isEnabled")]
    is_enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

/// One chart row. Field names are accepted in both the lower-case form the
/// API returns and the capitalised form used by tabular exports.
#[derive(Debug, Deserialize)]
struct ChartRow {
    #[serde(alias = "Date")]
    date: String,
    #[serde(alias = "Open")]
    open: Option<f64>,
    #[serde(alias = "High")]
    high: Option<f64>,
    #[serde(alias = "Low")]
    low: Option<f64>,
    #[serde(alias = "Close")]
    close: Option<f64>,
    #[serde(alias = "Volume", default)]
    volume: Option<f64>,
}

impl ChartRow {
    fn into_bar(self) -> Option<PriceBar> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()?;
        Some(PriceBar::new(
            date,
            self.open?,
            self.high?,
            self.low?,
            self.close?,
            self.volume.unwrap_or(0.0),
        ))
    }
}

/// Enabled symbols from a `/ref-data/symbols` body.
fn parse_symbols(body: &serde_json::Value) -> Result<Vec<Ticker>> {
    let rows: Vec<SymbolRow> =
        serde_json::from_value(body.clone()).context("symbols response is not a list of symbol rows")?;

    let symbols: Vec<Ticker> = rows
        .into_iter()
        .filter(|r| r.is_enabled)
        .map(|r| Ticker::new(r.symbol))
        .filter(|t| !t.is_empty())
        .collect();

    if symbols.is_empty() {
        anyhow::bail!("symbols response contained no enabled symbols");
    }
    Ok(symbols)
}

/// Price table from a `/chart/{range}` body. Malformed rows are skipped; an
/// empty result is an error.
fn parse_chart(body: &serde_json::Value) -> Result<PriceTable> {
    let raw = body.as_array().context("chart response is not an array")?;

    let mut bars = Vec::with_capacity(raw.len());
    for entry in raw {
        let bar = serde_json::from_value::<ChartRow>(entry.clone())
            .ok()
            .and_then(ChartRow::into_bar);
        match bar {
            Some(bar) => bars.push(bar),
            None => warn!(row = %entry, "skipping malformed chart row"),
        }
    }

    if bars.is_empty() {
        anyhow::bail!("chart response contained no usable rows");
    }
    Ok(PriceTable::new(bars))
}
