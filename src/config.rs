// =============================================================================
// Dashboard Configuration
// =============================================================================
//
// Loaded once at startup from `dashboard_config.json`. Every field carries a
// serde default so a partial (or missing) file still yields a usable config.
// Environment variables are applied on top:
//
//   DASH_BIND_ADDR          full listen address
//   PORT                    port on 0.0.0.0 (ignored when DASH_BIND_ADDR is set)
//   DASH_CACHE_TTL_SECS     figure cache TTL
//   DASH_CACHE_MAX_ENTRIES  figure cache capacity
//   IEX_BASE_URL            provider API root
//   IEX_TOKEN               provider token
//   DYNO                    presence enables the analytics script tag
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// =============================================================================
// Default-value helpers
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:8050".to_string()
}

fn default_ticker() -> String {
    "MSFT".to_string()
}

fn default_indicators() -> Vec<String> {
    vec![
        "add_BBANDS".to_string(),
        "add_RSI".to_string(),
        "add_MACD".to_string(),
    ]
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_cache_max_entries() -> usize {
    500
}

fn default_figure_width() -> u32 {
    1100
}

fn default_figure_height() -> u32 {
    600
}

fn default_fallback_symbols() -> Vec<String> {
    ["MSFT", "AAPL", "AMZN", "GOOGL", "META"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_plotly_url() -> String {
    "https://cdn.plot.ly/plotly-finance-1.28.0.min.js".to_string()
}

fn default_external_css() -> Vec<String> {
    vec![
        "https://fonts.googleapis.com/css?family=Overpass:400,400i,700,700i".to_string(),
        "https://cdn.rawgit.com/plotly/dash-app-stylesheets/c6a126a684eaaa94a708d41d6ceb32b28ac78583/dash-technical-charting.css"
            .to_string(),
    ]
}

fn default_analytics_script_url() -> String {
    "https://cdn.rawgit.com/chriddyp/ca0d8f02a1659981a0ea7f013a378bbd/raw/e79f3f789517deec58f41251f7dbb6bee72c44ab/plotly_ga.js"
        .to_string()
}

fn default_provider_base_url() -> String {
    "https://cloud.iexapis.com/stable".to_string()
}

fn default_provider_timeout_secs() -> u64 {
    10
}

// =============================================================================
// ProviderConfig
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,

    /// API token. Usually supplied through `IEX_TOKEN` rather than the file.
    #[serde(default)]
    pub token: String,

    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            token: String::new(),
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// =============================================================================
// DashboardConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Ticker selected when the page first loads.
    #[serde(default = "default_ticker")]
    pub default_ticker: String,

    /// Indicators selected when the page first loads.
    #[serde(default = "default_indicators")]
    pub default_indicators: Vec<String>,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Figures kept at once; the entry closest to expiry is evicted first.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    #[serde(default = "default_figure_width")]
    pub figure_width: u32,

    /// Height of a figure without indicator panels.
    #[serde(default = "default_figure_height")]
    pub figure_height: u32,

    #[serde(default)]
    pub provider: ProviderConfig,

    /// Ticker universe used when the provider's symbol list is unavailable.
    #[serde(default = "default_fallback_symbols")]
    pub fallback_symbols: Vec<String>,

    // --- Page assets ----------------------------------------------------------

    #[serde(default = "default_plotly_url")]
    pub plotly_url: String,

    #[serde(default = "default_external_css")]
    pub external_css: Vec<String>,

    #[serde(default = "default_analytics_script_url")]
    pub analytics_script_url: String,

    #[serde(default)]
    pub analytics_enabled: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            default_ticker: default_ticker(),
            default_indicators: default_indicators(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_max_entries: default_cache_max_entries(),
            figure_width: default_figure_width(),
            figure_height: default_figure_height(),
            provider: ProviderConfig::default(),
            fallback_symbols: default_fallback_symbols(),
            plotly_url: default_plotly_url(),
            external_css: default_external_css(),
            analytics_script_url: default_analytics_script_url(),
            analytics_enabled: false,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dashboard config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse dashboard config from {}", path.display()))?;

        info!(
            path = %path.display(),
            default_ticker = %config.default_ticker,
            cache_ttl_secs = config.cache_ttl_secs,
            "dashboard config loaded"
        );

        Ok(config)
    }

    /// `load`, falling back to defaults when the file is missing or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!(error = %format!("{e:#}"), "using default dashboard config");
            Self::default()
        })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup` (an environment-like key/value source).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("DASH_BIND_ADDR").filter(|v| !v.trim().is_empty()) {
            self.bind_addr = addr.trim().to_string();
        } else if let Some(port) = lookup("PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => self.bind_addr = format!("0.0.0.0:{port}"),
                Err(_) => warn!(port = %port, "ignoring invalid PORT"),
            }
        }

        if let Some(ttl) = lookup("DASH_CACHE_TTL_SECS") {
            match ttl.trim().parse::<u64>() {
                Ok(secs) => self.cache_ttl_secs = secs,
                Err(_) => warn!(value = %ttl, "ignoring invalid DASH_CACHE_TTL_SECS"),
            }
        }
        if let Some(max) = lookup("DASH_CACHE_MAX_ENTRIES") {
            match max.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.cache_max_entries = n,
                _ => warn!(value = %max, "ignoring invalid DASH_CACHE_MAX_ENTRIES"),
            }
        }

        if let Some(url) = lookup("IEX_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.provider.base_url = url.trim().to_string();
        }
        if let Some(token) = lookup("IEX_TOKEN") {
            self.provider.token = token.trim().to_string();
        }

        if lookup("DYNO").is_some() {
            self.analytics_enabled = true;
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
