// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
//   GET  /                      dashboard page
//   GET  /api/v1/health         status, symbol count, cache counters
//   GET  /api/v1/options        dropdown options and defaults
//   POST /api/v1/graph          figure for {ticker, indicators, arglist}
//   POST /api/v1/arg-controls   argument panel style for {indicators}
//
// No endpoint requires authentication. CORS is permissive.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::api::page::render_page;
use crate::chart::Figure;
use crate::controller::GraphRequest;
use crate::error::DashError;
use crate::layout::{arg_controls_style, DashboardLayout, DropdownOption};
use crate::service::DashboardService;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full router with CORS and HTTP tracing middleware.
pub fn router(service: Arc<DashboardService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/api/v1/health", get(health))
        .route("/api/v1/options", get(options))
        .route("/api/v1/graph", post(graph))
        .route("/api/v1/arg-controls", post(arg_controls))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

// =============================================================================
// Page
// =============================================================================

async fn index(State(service): State<Arc<DashboardService>>) -> Html<String> {
    Html(render_page(&service.layout(), service.config()))
}

// =============================================================================
// Health
// =============================================================================

async fn health(State(service): State<Arc<DashboardService>>) -> impl IntoResponse {
    Json(service.health())
}

// =============================================================================
// Dropdown options
// =============================================================================

#[derive(Serialize)]
struct OptionsResponse {
    tickers: Vec<DropdownOption>,
    indicators: Vec<DropdownOption>,
    default_ticker: Vec<String>,
    default_indicators: Vec<String>,
}

async fn options(State(service): State<Arc<DashboardService>>) -> impl IntoResponse {
    let DashboardLayout { ticker, indicators, .. } = service.layout();
    Json(OptionsResponse {
        tickers: ticker.options,
        indicators: indicators.options,
        default_ticker: ticker.value,
        default_indicators: indicators.value,
    })
}

// =============================================================================
// Graph
// =============================================================================

#[derive(Serialize)]
struct GraphError {
    error: String,
    kind: &'static str,
    request_id: String,
    figure: Figure,
}

fn status_for(err: &DashError) -> StatusCode {
    match err {
        DashError::DataFetch { .. } => StatusCode::BAD_GATEWAY,
        DashError::UnknownIndicator(_)
        | DashError::InvalidArgument { .. }
        | DashError::ArgumentParse(_) => StatusCode::BAD_REQUEST,
    }
}

async fn graph(
    State(service): State<Arc<DashboardService>>,
    Json(request): Json<GraphRequest>,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!(
        "graph",
        request_id = %request_id,
        ticker = %request.ticker,
        indicators = request.indicators.len()
    );

    async {
        match service.update_graph(&request).await {
            Ok(figure) => {
                info!(traces = figure.data.len(), "graph served");
                Json(figure).into_response()
            }
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "graph request failed");
                let body = GraphError {
                    error: e.to_string(),
                    kind: e.kind(),
                    request_id: request_id.clone(),
                    figure: service.error_figure(&e),
                };
                (status_for(&e), Json(body)).into_response()
            }
        }
    }
    .instrument(span)
    .await
}

// =============================================================================
// Argument panel visibility
// =============================================================================

#[derive(Deserialize)]
struct ArgControlsRequest {
    #[serde(default)]
    indicators: Vec<String>,
}

async fn arg_controls(Json(request): Json<ArgControlsRequest>) -> impl IntoResponse {
    Json(arg_controls_style(&request.indicators))
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::indicators::IndicatorKind;
    use crate::provider::testing::StubProvider;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app(provider: Arc<StubProvider>) -> Router {
        let service = Arc::new(DashboardService::new(provider, DashboardConfig::default()));
        service.refresh_symbols().await;
        router(service)
    }

    async fn post_json(app: Router, path: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get_body(app: Router, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn graph_returns_figure() {
        let provider = Arc::new(StubProvider::new(&["MSFT"], 60));
        let (status, body) = post_json(
            app(provider.clone()).await,
            "/api/v1/graph",
            json!({"ticker": "MSFT", "indicators": ["add_RSI"], "arglist": "14"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["layout"]["width"], 1100);
        assert_eq!(body["data"][0]["type"], "candlestick");
        assert_eq!(body["data"][1]["name"], "RSI(14)");
        assert_eq!(provider.history_calls(), 1);
    }

    #[tokio::test]
    async fn unknown_indicator_is_bad_request_with_error_figure() {
        let provider = Arc::new(StubProvider::new(&["MSFT"], 60));
        let (status, body) = post_json(
            app(provider.clone()).await,
            "/api/v1/graph",
            json!({"ticker": "MSFT", "indicators": ["add_FOO"]}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "unknown_indicator");
        assert_eq!(body["figure"]["data"], json!([]));
        assert!(body["request_id"].as_str().is_some());
        assert_eq!(provider.history_calls(), 0);
    }

    #[tokio::test]
    async fn fetch_failure_is_bad_gateway() {
        let provider = Arc::new(StubProvider::new(&["MSFT"], 60));
        provider.set_failing(true);
        let (status, body) = post_json(
            app(provider).await,
            "/api/v1/graph",
            json!({"ticker": "MSFT", "indicators": []}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["kind"], "data_fetch");
        let message = body["figure"]["layout"]["annotations"][0]["text"].as_str().unwrap();
        assert!(message.contains("MSFT"));
    }

    #[tokio::test]
    async fn arg_controls_toggle_visibility() {
        let router = app(Arc::new(StubProvider::new(&["MSFT"], 10))).await;

        let (_, hidden) = post_json(router.clone(), "/api/v1/arg-controls", json!({"indicators": []})).await;
        assert_eq!(hidden, json!({"display": "none"}));

        let (_, shown) = post_json(router, "/api/v1/arg-controls", json!({"indicators": ["add_RSI"]})).await;
        assert_eq!(shown, json!({"margin-bottom": "20px", "padding-left": "40px"}));
    }

    #[tokio::test]
    async fn options_and_health() {
        let router = app(Arc::new(StubProvider::new(&["MSFT", "AAPL"], 10))).await;

        let (status, body) = get_body(router.clone(), "/api/v1/options").await;
        assert_eq!(status, StatusCode::OK);
        let options: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(options["tickers"].as_array().unwrap().len(), 2);
        assert_eq!(options["default_ticker"], json!(["MSFT"]));
        assert_eq!(options["indicators"].as_array().unwrap().len(), IndicatorKind::ALL.len());

        let (status, body) = get_body(router, "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        let health: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["symbols"], 2);
        assert_eq!(health["symbol_source"], "provider");
    }

    #[tokio::test]
    async fn index_serves_page() {
        let router = app(Arc::new(StubProvider::new(&["MSFT"], 10))).await;
        let (status, body) = get_body(router, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Dash Finance"));
    }
}
