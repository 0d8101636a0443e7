// =============================================================================
// Chart State
// =============================================================================
//
// A `Chart` is built from one ticker's price table and then mutated in place
// by indicators: price-scale series become overlays on the candlestick, other
// series get their own panel stacked underneath. `to_figure` turns the final
// state into a Plotly figure.
// =============================================================================

pub mod figure;

use std::collections::BTreeMap;

pub use figure::Figure;
use figure::{
    Axis, BarTrace, CandlestickTrace, FigureLayout, LineStyle, Marker, RangeSlider,
    ScatterTrace, Shape, Title, Trace,
};

use crate::types::{PriceTable, Ticker};

/// Extra figure height per indicator panel.
const PANEL_HEIGHT: u32 = 150;
/// Largest vertical share a single panel may take.
const MAX_PANEL_SHARE: f64 = 0.2;
/// Combined vertical share of all panels.
const PANELS_TOTAL_SHARE: f64 = 0.4;
/// Gap between stacked axes (paper coordinates).
const AXIS_GAP: f64 = 0.03;

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Solid,
    Dashed,
    Bars,
}

/// A named series aligned to the chart's bars (`None` during warm-up).
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub name: String,
    pub values: Vec<Option<f64>>,
    pub kind: LineKind,
    pub color: Option<String>,
}

impl Line {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
            kind: LineKind::Solid,
            color: None,
        }
    }

    pub fn kind(mut self, kind: LineKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn color(mut self, color: Option<String>) -> Self {
        self.color = color;
        self
    }
}

/// A sub-chart with its own y-axis and optional horizontal reference bands.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub lines: Vec<Line>,
    pub bands: Vec<f64>,
}

impl Panel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
            bands: Vec::new(),
        }
    }

    pub fn line(mut self, line: Line) -> Self {
        self.lines.push(line);
        self
    }

    pub fn bands(mut self, bands: &[f64]) -> Self {
        self.bands.extend_from_slice(bands);
        self
    }
}

/// Mutable chart state for one ticker.
#[derive(Debug, Clone)]
pub struct Chart {
    ticker: Ticker,
    table: PriceTable,
    overlays: Vec<Line>,
    panels: Vec<Panel>,
}

impl Chart {
    pub fn new(ticker: Ticker, table: PriceTable) -> Self {
        Self {
            ticker,
            table,
            overlays: Vec::new(),
            panels: Vec::new(),
        }
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn table(&self) -> &PriceTable {
        &self.table
    }

    pub fn overlays(&self) -> &[Line] {
        &self.overlays
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Place a trimmed indicator series onto the bar index grid: `values[0]`
    /// lands on bar `start`, anything outside the table is dropped.
    pub fn align(&self, values: &[f64], start: usize) -> Vec<Option<f64>> {
        let len = self.table.len();
        let mut aligned = vec![None; len];
        for (slot, value) in aligned.iter_mut().skip(start).zip(values) {
            *slot = Some(*value);
        }
        aligned
    }

    pub fn add_overlay(&mut self, line: Line) {
        self.overlays.push(line);
    }

    pub fn add_panel(&mut self, panel: Panel) {
        self.panels.push(panel);
    }

    /// Render the current state. Height grows by a fixed amount per panel.
    pub fn to_figure(&self, width: u32, base_height: u32) -> Figure {
        let dates = self.table.dates();
        let bars = self.table.bars();

        let mut data = Vec::with_capacity(1 + self.overlays.len() + self.panels.len());
        data.push(Trace::Candlestick(CandlestickTrace {
            name: self.ticker.to_string(),
            x: dates.clone(),
            open: bars.iter().map(|b| b.open).collect(),
            high: bars.iter().map(|b| b.high).collect(),
            low: bars.iter().map(|b| b.low).collect(),
            close: bars.iter().map(|b| b.close).collect(),
            yaxis: "y".to_string(),
        }));
        for line in &self.overlays {
            data.push(line_trace(line, &dates, "y"));
        }

        let panel_count = self.panels.len();
        let share = if panel_count == 0 {
            0.0
        } else {
            (PANELS_TOTAL_SHARE / panel_count as f64).min(MAX_PANEL_SHARE)
        };
        let panels_total = share * panel_count as f64;

        let mut yaxes = BTreeMap::new();
        let price_bottom = if panel_count == 0 {
            0.0
        } else {
            panels_total + AXIS_GAP
        };
        yaxes.insert(
            "yaxis".to_string(),
            Axis {
                domain: Some([price_bottom, 1.0]),
                title: Some(Title {
                    text: self.ticker.to_string(),
                }),
                ..Axis::default()
            },
        );

        let mut shapes = Vec::new();
        for (i, panel) in self.panels.iter().enumerate() {
            let axis_no = i + 2;
            let yref = format!("y{axis_no}");
            let top = panels_total - share * i as f64;
            let bottom = (top - share + AXIS_GAP).max(0.0);

            yaxes.insert(
                format!("yaxis{axis_no}"),
                Axis {
                    domain: Some([bottom, top]),
                    title: Some(Title {
                        text: panel.title.clone(),
                    }),
                    anchor: Some("x"),
                    ..Axis::default()
                },
            );
            for line in &panel.lines {
                data.push(line_trace(line, &dates, &yref));
            }
            for &level in &panel.bands {
                shapes.push(Shape::hline(yref.clone(), level));
            }
        }

        Figure {
            data,
            layout: FigureLayout {
                title: Some(Title {
                    text: self.ticker.to_string(),
                }),
                width,
                height: base_height + PANEL_HEIGHT * panel_count as u32,
                showlegend: true,
                xaxis: Axis {
                    axis_type: Some("date"),
                    rangeslider: Some(RangeSlider { visible: false }),
                    ..Axis::default()
                },
                yaxes,
                shapes,
                annotations: Vec::new(),
            },
        }
    }
}

fn line_trace(line: &Line, dates: &[String], yaxis: &str) -> Trace {
    match line.kind {
        LineKind::Bars => Trace::Bar(BarTrace {
            name: line.name.clone(),
            x: dates.to_vec(),
            y: line.values.clone(),
            yaxis: yaxis.to_string(),
            marker: line.color.clone().map(|color| Marker { color }),
        }),
        LineKind::Solid | LineKind::Dashed => Trace::Scatter(ScatterTrace {
            name: line.name.clone(),
            x: dates.to_vec(),
            y: line.values.clone(),
            mode: "lines",
            yaxis: yaxis.to_string(),
            line: LineStyle {
                color: line.color.clone(),
                width: 1.5,
                dash: (line.kind == LineKind::Dashed).then_some("dash"),
            },
        }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::PriceBar;
    use chrono::{Days, NaiveDate};

    /// `n` daily bars with closes 100, 101, ...
    pub(crate) fn rising_table(n: usize) -> PriceTable {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceTable::new(
            (0..n)
                .map(|i| {
                    let close = 100.0 + i as f64;
                    let date = start.checked_add_days(Days::new(i as u64)).unwrap();
                    PriceBar::new(date, close - 0.5, close + 1.0, close - 1.0, close, 1_000.0)
                })
                .collect(),
        )
    }

    #[test]
    fn align_pads_warmup_with_none() {
        let chart = Chart::new(Ticker::new("MSFT"), rising_table(5));
        let aligned = chart.align(&[1.0, 2.0], 3);
        assert_eq!(aligned, vec![None, None, None, Some(1.0), Some(2.0)]);
        // Overlong input is clipped to the table.
        assert_eq!(chart.align(&[1.0, 2.0, 3.0], 4).len(), 5);
    }

    #[test]
    fn bare_chart_renders_candlestick_only() {
        let chart = Chart::new(Ticker::new("MSFT"), rising_table(10));
        let fig = chart.to_figure(1100, 600);
        assert_eq!(fig.width(), 1100);
        assert_eq!(fig.layout.height, 600);
        assert_eq!(fig.data.len(), 1);
        assert_eq!(fig.data[0].name(), "MSFT");
        assert_eq!(fig.layout.yaxes["yaxis"].domain, Some([0.0, 1.0]));
    }

    #[test]
    fn panels_get_their_own_axes_below_price() {
        let mut chart = Chart::new(Ticker::new("MSFT"), rising_table(10));
        chart.add_overlay(Line::new("SMA(3)", vec![None; 10]));
        chart.add_panel(
            Panel::new("RSI(14)")
                .line(Line::new("RSI(14)", vec![None; 10]))
                .bands(&[30.0, 70.0]),
        );
        chart.add_panel(Panel::new("MOM(10)").line(Line::new("MOM(10)", vec![None; 10]).kind(LineKind::Bars)));

        let fig = chart.to_figure(1100, 600);
        assert_eq!(fig.layout.height, 600 + 2 * PANEL_HEIGHT);
        assert_eq!(fig.data.len(), 4);
        assert_eq!(fig.data[1].yaxis(), "y");
        assert_eq!(fig.data[2].yaxis(), "y2");
        assert_eq!(fig.data[3].yaxis(), "y3");
        assert!(matches!(fig.data[3], Trace::Bar(_)));
        assert_eq!(fig.layout.shapes.len(), 2);

        let price = fig.layout.yaxes["yaxis"].domain.unwrap();
        let first = fig.layout.yaxes["yaxis2"].domain.unwrap();
        let second = fig.layout.yaxes["yaxis3"].domain.unwrap();
        assert!(price[0] > first[1]);
        assert!(first[0] >= second[1]);
        assert!(second[0] >= 0.0);
    }
}
