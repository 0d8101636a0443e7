// =============================================================================
// Figure — Plotly-compatible chart description
// =============================================================================
//
// The page hands `data` and `layout` straight to `Plotly.newPlot`, so field
// names follow plotly.js. Only the attributes the dashboard sets are modelled;
// unset options are skipped during serialisation.
// =============================================================================

use std::collections::BTreeMap;

use serde::Serialize;

/// A rendered chart: traces plus layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: FigureLayout,
}

impl Figure {
    /// An empty figure carrying `message` in the middle of the plot area.
    /// Shown in place of the chart when a request fails.
    pub fn error(message: impl Into<String>, width: u32, height: u32) -> Self {
        let hidden = Axis {
            visible: Some(false),
            ..Axis::default()
        };
        let mut yaxes = BTreeMap::new();
        yaxes.insert("yaxis".to_string(), hidden.clone());

        Self {
            data: Vec::new(),
            layout: FigureLayout {
                title: None,
                width,
                height,
                showlegend: false,
                xaxis: hidden,
                yaxes,
                shapes: Vec::new(),
                annotations: vec![Annotation {
                    text: message.into(),
                    xref: "paper",
                    yref: "paper",
                    x: 0.5,
                    y: 0.5,
                    showarrow: false,
                    font: Some(Font {
                        size: 16,
                        color: Some("#b22222".to_string()),
                    }),
                }],
            },
        }
    }

    pub fn width(&self) -> u32 {
        self.layout.width
    }

    pub fn is_error(&self) -> bool {
        self.data.is_empty() && !self.layout.annotations.is_empty()
    }
}

// =============================================================================
// Traces
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Candlestick(CandlestickTrace),
    Scatter(ScatterTrace),
    Bar(BarTrace),
}

impl Trace {
    pub fn name(&self) -> &str {
        match self {
            Self::Candlestick(t) => &t.name,
            Self::Scatter(t) => &t.name,
            Self::Bar(t) => &t.name,
        }
    }

    /// Axis reference of the trace (`y`, `y2`, ...).
    pub fn yaxis(&self) -> &str {
        match self {
            Self::Candlestick(t) => &t.yaxis,
            Self::Scatter(t) => &t.yaxis,
            Self::Bar(t) => &t.yaxis,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandlestickTrace {
    pub name: String,
    pub x: Vec<String>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub yaxis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterTrace {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<Option<f64>>,
    pub mode: &'static str,
    pub yaxis: String,
    pub line: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarTrace {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<Option<f64>>,
    pub yaxis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: String,
}

// =============================================================================
// Layout
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureLayout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    pub width: u32,
    pub height: u32,
    pub showlegend: bool,
    pub xaxis: Axis,
    /// `yaxis`, `yaxis2`, ... keyed by their layout attribute name.
    #[serde(flatten)]
    pub yaxes: BTreeMap<String, Axis>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Shape>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<&'static str>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangeslider: Option<RangeSlider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
}

/// Horizontal reference line spanning the plot width.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub shape_type: &'static str,
    pub xref: &'static str,
    pub yref: String,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub line: LineStyle,
}

impl Shape {
    pub fn hline(yref: impl Into<String>, level: f64) -> Self {
        Self {
            shape_type: "line",
            xref: "paper",
            yref: yref.into(),
            x0: 0.0,
            x1: 1.0,
            y0: level,
            y1: level,
            line: LineStyle {
                color: Some("#888888".to_string()),
                width: 1.0,
                dash: Some("dot"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub xref: &'static str,
    pub yref: &'static str,
    pub x: f64,
    pub y: f64,
    pub showarrow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}
