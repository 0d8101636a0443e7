// =============================================================================
// Dashboard Controller
// =============================================================================
//
// One graph request, start to finish:
//
//   1. Resolve every selected identifier to an `IndicatorKind` and bind its
//      argument segment. Any failure here aborts before data is fetched.
//   2. Fetch the trailing price history for the ticker.
//   3. Build the chart and apply the indicators in selection order.
//   4. Render the figure.
//
// Argument segments pair with indicators by position. An indicator without a
// segment (or with an empty one) runs on its defaults; surplus segments are
// ignored.
// =============================================================================

use serde::Deserialize;
use tracing::{info, warn};

use crate::args::{parse_arglist, ParsedArg};
use crate::chart::{Chart, Figure};
use crate::error::DashError;
use crate::indicators::IndicatorKind;
use crate::provider::MarketDataProvider;
use crate::types::{HistoryWindow, Ticker};

/// Inputs of one graph request, exactly as the page sends them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphRequest {
    pub ticker: Ticker,
    #[serde(default)]
    pub indicators: Vec<String>,
    #[serde(default)]
    pub arglist: Option<String>,
}

impl GraphRequest {
    pub fn new(ticker: impl AsRef<str>, indicators: &[&str], arglist: Option<&str>) -> Self {
        Self {
            ticker: Ticker::new(ticker),
            indicators: indicators.iter().map(|s| s.to_string()).collect(),
            arglist: arglist.map(str::to_string),
        }
    }
}

/// Output dimensions of rendered figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FigureSize {
    pub width: u32,
    pub height: u32,
}

impl Default for FigureSize {
    fn default() -> Self {
        Self {
            width: 1100,
            height: 600,
        }
    }
}

/// Resolve and validate the selection, pairing each indicator with its
/// argument segment.
pub fn plan_indicators(
    indicators: &[String],
    arglist: Option<&str>,
) -> Result<Vec<(IndicatorKind, Vec<ParsedArg>)>, DashError> {
    let mut segments = parse_arglist(arglist).into_iter();

    indicators
        .iter()
        .map(|name| {
            let kind: IndicatorKind = name.parse()?;
            let args = segments.next().unwrap_or_default();
            kind.bind(&args)?;
            Ok((kind, args))
        })
        .collect()
}

/// Build the figure for `request` using `provider` for price history.
pub async fn build_figure(
    provider: &dyn MarketDataProvider,
    request: &GraphRequest,
    size: FigureSize,
) -> Result<Figure, DashError> {
    let plan = plan_indicators(&request.indicators, request.arglist.as_deref())?;
    let ticker = &request.ticker;

    let table = provider
        .get_history(ticker, HistoryWindow::SixMonths)
        .await
        .map_err(|e| {
            warn!(ticker = %ticker, error = %format!("{e:#}"), "price history fetch failed");
            DashError::data_fetch(ticker, format!("{e:#}"))
        })?;
    if table.is_empty() {
        return Err(DashError::data_fetch(ticker, "provider returned no rows"));
    }

    let bars = table.len();
    let mut chart = Chart::new(ticker.clone(), table);
    for (kind, args) in &plan {
        kind.apply(&mut chart, args)?;
    }

    info!(
        ticker = %ticker,
        bars,
        indicators = plan.len(),
        panels = chart.panels().len(),
        "figure rendered"
    );
    Ok(chart.to_figure(size.width, size.height))
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::figure::Trace;
    use crate::provider::testing::StubProvider;

    fn names(figure: &Figure) -> Vec<&str> {
        figure.data.iter().map(Trace::name).collect()
    }

    #[tokio::test]
    async fn rsi_with_single_argument() {
        let provider = StubProvider::new(&["MSFT"], 60);
        let request = GraphRequest::new("MSFT", &["add_RSI"], Some("14"));

        let figure = build_figure(&provider, &request, FigureSize::default()).await.unwrap();

        assert_eq!(provider.history_calls(), 1);
        assert_eq!(figure.width(), 1100);
        assert_eq!(names(&figure), vec!["MSFT", "RSI(14)"]);
    }

    #[tokio::test]
    async fn missing_segments_fall_back_to_defaults() {
        let provider = StubProvider::new(&["MSFT"], 60);
        let request = GraphRequest::new("MSFT", &["add_SMA", "add_EMA", "add_RSI"], Some("5;10"));

        let figure = build_figure(&provider, &request, FigureSize::default()).await.unwrap();

        assert_eq!(names(&figure), vec!["MSFT", "SMA(5)", "EMA(10)", "RSI(14)"]);
    }

    #[tokio::test]
    async fn surplus_segments_are_ignored() {
        let provider = StubProvider::new(&["MSFT"], 60);
        let request = GraphRequest::new("MSFT", &["add_SMA"], Some("5;10;15"));
        let figure = build_figure(&provider, &request, FigureSize::default()).await.unwrap();
        assert_eq!(names(&figure), vec!["MSFT", "SMA(5)"]);
    }

    #[tokio::test]
    async fn unknown_indicator_fails_before_fetch() {
        let provider = StubProvider::new(&["MSFT"], 60);
        let request = GraphRequest::new("MSFT", &["add_RSI", "add_FOO"], None);

        let err = build_figure(&provider, &request, FigureSize::default()).await.unwrap_err();

        assert_eq!(err, DashError::UnknownIndicator("add_FOO".into()));
        assert_eq!(provider.history_calls(), 0);
    }

    #[tokio::test]
    async fn invalid_argument_fails_before_fetch() {
        let provider = StubProvider::new(&["MSFT"], 60);
        let request = GraphRequest::new("MSFT", &["add_MACD"], Some("30,10"));

        let err = build_figure(&provider, &request, FigureSize::default()).await.unwrap_err();

        assert_eq!(err.kind(), "invalid_argument");
        assert_eq!(provider.history_calls(), 0);
    }

    #[tokio::test]
    async fn oversized_period_is_rejected() {
        let provider = StubProvider::new(&["MSFT"], 60);
        let request = GraphRequest::new("MSFT", &["add_ADX"], Some("9223372036854775807"));

        let err = build_figure(&provider, &request, FigureSize::default()).await.unwrap_err();

        assert_eq!(err.kind(), "invalid_argument");
        assert_eq!(provider.history_calls(), 0);
    }

    #[tokio::test]
    async fn fetch_failure_is_surfaced() {
        let provider = StubProvider::new(&["MSFT"], 60);
        provider.set_failing(true);
        let request = GraphRequest::new("MSFT", &["add_RSI"], None);

        let err = build_figure(&provider, &request, FigureSize::default()).await.unwrap_err();

        match err {
            DashError::DataFetch { ticker, reason } => {
                assert_eq!(ticker, Ticker::new("MSFT"));
                assert!(reason.contains("connection reset"));
            }
            other => panic!("expected DataFetch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_selection_renders_price_only() {
        let provider = StubProvider::new(&["MSFT"], 30);
        let request = GraphRequest::new("MSFT", &[], Some("5,3"));
        let figure = build_figure(&provider, &request, FigureSize { width: 800, height: 400 })
            .await
            .unwrap();
        assert_eq!(names(&figure), vec!["MSFT"]);
        assert_eq!(figure.width(), 800);
    }

    #[test]
    fn request_deserialises_with_optional_fields() {
        let request: GraphRequest = serde_json::from_str(r#"{"ticker": "msft"}"#).unwrap();
        assert_eq!(request.ticker, Ticker::new("MSFT"));
        assert!(request.indicators.is_empty());
        assert_eq!(request.arglist, None);
    }
}
