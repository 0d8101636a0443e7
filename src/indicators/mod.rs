// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators the dashboard can
// draw, plus the closed registry (`IndicatorKind`) that maps the identifiers
// offered in the indicator dropdown to functions that mutate a `Chart`.
//
// Identifiers follow the `add_<NAME>` convention; the dropdown label is the
// identifier without the `add_` prefix. `add_volume` keeps quantmod's
// lower-case spelling.
// =============================================================================

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod roc;
pub mod rsi;
pub mod sma;
mod smoothing;

use std::str::FromStr;

use crate::args::ParsedArg;
use crate::chart::{Chart, Line, LineKind, Panel};
use crate::error::DashError;

/// Every indicator the dashboard knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Sma,
    Ema,
    Bbands,
    Rsi,
    Macd,
    Atr,
    Adx,
    Roc,
    Mom,
    Volume,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 10] = [
        Self::Adx,
        Self::Atr,
        Self::Bbands,
        Self::Ema,
        Self::Macd,
        Self::Mom,
        Self::Roc,
        Self::Rsi,
        Self::Sma,
        Self::Volume,
    ];

    /// Identifier used in requests and the dropdown `value`.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Sma => "add_SMA",
            Self::Ema => "add_EMA",
            Self::Bbands => "add_BBANDS",
            Self::Rsi => "add_RSI",
            Self::Macd => "add_MACD",
            Self::Atr => "add_ATR",
            Self::Adx => "add_ADX",
            Self::Roc => "add_ROC",
            Self::Mom => "add_MOM",
            Self::Volume => "add_volume",
        }
    }

    /// Dropdown label: the identifier without its `add_` prefix.
    pub fn label(&self) -> &'static str {
        &self.id()[4..]
    }

    /// Ordered parameter slots with their defaults.
    pub fn params(&self) -> &'static [ParamSpec] {
        use ParamKind::{Multiplier, Period};

        const MOVING_AVERAGE: &[ParamSpec] = &[ParamSpec::new("timeperiod", Period, 20.0)];
        const BBANDS: &[ParamSpec] = &[
            ParamSpec::new("timeperiod", Period, 20.0),
            ParamSpec::new("nbdevup", Multiplier, 2.0),
            ParamSpec::new("nbdevdn", Multiplier, 2.0),
        ];
        const WILDER: &[ParamSpec] = &[ParamSpec::new("timeperiod", Period, 14.0)];
        const MACD: &[ParamSpec] = &[
            ParamSpec::new("fastperiod", Period, 12.0),
            ParamSpec::new("slowperiod", Period, 26.0),
            ParamSpec::new("signalperiod", Period, 9.0),
        ];
        const ROC: &[ParamSpec] = &[ParamSpec::new("timeperiod", Period, 12.0)];
        const MOM: &[ParamSpec] = &[ParamSpec::new("timeperiod", Period, 10.0)];
        const NONE: &[ParamSpec] = &[];

        match self {
            Self::Sma | Self::Ema => MOVING_AVERAGE,
            Self::Bbands => BBANDS,
            Self::Rsi | Self::Atr | Self::Adx => WILDER,
            Self::Macd => MACD,
            Self::Roc => ROC,
            Self::Mom => MOM,
            Self::Volume => NONE,
        }
    }

    /// Bind positional `args` to this indicator's parameters.
    ///
    /// Numbers fill the slots in order; missing slots keep their defaults. A
    /// single text argument is accepted in last position as the trace color.
    pub fn bind(&self, args: &[ParsedArg]) -> Result<BoundParams, DashError> {
        let specs = self.params();
        let (numeric, color) = match args.split_last() {
            Some((ParsedArg::Text(color), rest)) => (rest, Some(color.clone())),
            _ => (args, None),
        };

        if numeric.len() > specs.len() {
            return Err(DashError::invalid_argument(
                self.id(),
                format!(
                    "expected at most {} numeric argument(s), got {}",
                    specs.len(),
                    numeric.len()
                ),
            ));
        }

        let mut values: Vec<f64> = specs.iter().map(|s| s.default).collect();
        for (i, (arg, spec)) in numeric.iter().zip(specs).enumerate() {
            values[i] = spec.kind.coerce(self.id(), spec.name, arg)?;
        }

        if *self == Self::Macd && values[0] >= values[1] {
            return Err(DashError::invalid_argument(
                self.id(),
                "fastperiod must be smaller than slowperiod",
            ));
        }

        Ok(BoundParams {
            values,
            color: color.filter(|c| !c.is_empty()),
        })
    }

    /// Compute this indicator over the chart's prices and add it to the chart.
    pub fn apply(&self, chart: &mut Chart, args: &[ParsedArg]) -> Result<(), DashError> {
        let params = self.bind(args)?;
        let closes = chart.table().closes();
        let color = params.color.clone();

        match self {
            Self::Sma => {
                let period = params.period(0);
                let values = chart.align(&sma::calculate_sma(&closes, period), period - 1);
                chart.add_overlay(Line::new(format!("SMA({period})"), values).color(color));
            }
            Self::Ema => {
                let period = params.period(0);
                let values = chart.align(&ema::calculate_ema(&closes, period), period - 1);
                chart.add_overlay(Line::new(format!("EMA({period})"), values).color(color));
            }
            Self::Bbands => {
                let period = params.period(0);
                let (up, dn) = (params.values[1], params.values[2]);
                let bands = bollinger::calculate_bollinger(&closes, period, up, dn);
                let start = period - 1;
                let upper: Vec<f64> = bands.iter().map(|b| b.upper).collect();
                let middle: Vec<f64> = bands.iter().map(|b| b.middle).collect();
                let lower: Vec<f64> = bands.iter().map(|b| b.lower).collect();

                let upper = chart.align(&upper, start);
                let middle = chart.align(&middle, start);
                let lower = chart.align(&lower, start);
                chart.add_overlay(
                    Line::new(format!("BBANDS({period}) upper"), upper)
                        .kind(LineKind::Dashed)
                        .color(color.clone()),
                );
                chart.add_overlay(Line::new(format!("BBANDS({period}) middle"), middle).color(color.clone()));
                chart.add_overlay(
                    Line::new(format!("BBANDS({period}) lower"), lower)
                        .kind(LineKind::Dashed)
                        .color(color),
                );
            }
            Self::Rsi => {
                let period = params.period(0);
                let name = format!("RSI({period})");
                let values = chart.align(&rsi::calculate_rsi(&closes, period), period);
                chart.add_panel(
                    Panel::new(name.clone())
                        .line(Line::new(name, values).color(color))
                        .bands(&[rsi::RSI_LOWER_BAND, rsi::RSI_UPPER_BAND]),
                );
            }
            Self::Macd => {
                let (fast, slow, signal) = (params.period(0), params.period(1), params.period(2));
                let series = macd::calculate_macd(&closes, fast, slow, signal);
                let macd_start = macd::MacdSeries::macd_start(slow);
                let signal_start = macd::MacdSeries::signal_start(slow, signal);

                let title = format!("MACD({fast},{slow},{signal})");
                let macd_line = chart.align(&series.macd, macd_start);
                let signal_line = chart.align(&series.signal, signal_start);
                let histogram = chart.align(&series.histogram, signal_start);
                chart.add_panel(
                    Panel::new(title)
                        .line(Line::new("MACD", macd_line).color(color))
                        .line(Line::new("Signal", signal_line).kind(LineKind::Dashed))
                        .line(Line::new("Histogram", histogram).kind(LineKind::Bars)),
                );
            }
            Self::Atr => {
                let period = params.period(0);
                let name = format!("ATR({period})");
                let values = atr::calculate_atr(chart.table().bars(), period);
                let values = chart.align(&values, period);
                chart.add_panel(Panel::new(name.clone()).line(Line::new(name, values).color(color)));
            }
            Self::Adx => {
                let period = params.period(0);
                let name = format!("ADX({period})");
                let values = adx::calculate_adx(chart.table().bars(), period);
                let values = chart.align(&values, adx::adx_start(period));
                chart.add_panel(Panel::new(name.clone()).line(Line::new(name, values).color(color)));
            }
            Self::Roc => {
                let period = params.period(0);
                let name = format!("ROC({period})");
                let values = chart.align(&roc::calculate_roc(&closes, period), period);
                chart.add_panel(
                    Panel::new(name.clone())
                        .line(Line::new(name, values).color(color))
                        .bands(&[0.0]),
                );
            }
            Self::Mom => {
                let period = params.period(0);
                let name = format!("MOM({period})");
                let values = chart.align(&roc::calculate_momentum(&closes, period), period);
                chart.add_panel(
                    Panel::new(name.clone())
                        .line(Line::new(name, values).color(color))
                        .bands(&[0.0]),
                );
            }
            Self::Volume => {
                let values = chart.align(&chart.table().volumes(), 0);
                chart.add_panel(
                    Panel::new("Volume").line(Line::new("Volume", values).kind(LineKind::Bars).color(color)),
                );
            }
        }
        Ok(())
    }
}

impl FromStr for IndicatorKind {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.id() == s)
            .ok_or_else(|| DashError::UnknownIndicator(s.to_string()))
    }
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

// =============================================================================
// Parameter binding
// =============================================================================

/// Longest accepted look-back. Far beyond any history window the provider
/// serves, and small enough that start offsets never overflow.
pub const MAX_PERIOD: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Positive integer look-back.
    Period,
    /// Finite real number (standard-deviation multipliers).
    Multiplier,
}

impl ParamKind {
    fn coerce(&self, indicator: &str, name: &str, arg: &ParsedArg) -> Result<f64, DashError> {
        match (self, arg) {
            (Self::Period, ParsedArg::Int(i)) if (1..=MAX_PERIOD).contains(i) => Ok(*i as f64),
            (Self::Period, ParsedArg::Int(i)) if *i > MAX_PERIOD => Err(DashError::invalid_argument(
                indicator,
                format!("{name} must be at most {MAX_PERIOD}, got {i}"),
            )),
            (Self::Period, other) => Err(DashError::invalid_argument(
                indicator,
                format!("{name} must be a positive integer, got {other}"),
            )),
            (Self::Multiplier, arg) => match arg.as_f64() {
                Some(x) if x.is_finite() => Ok(x),
                _ => Err(DashError::invalid_argument(
                    indicator,
                    format!("{name} must be a finite number, got {arg}"),
                )),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: f64,
}

impl ParamSpec {
    const fn new(name: &'static str, kind: ParamKind, default: f64) -> Self {
        Self { name, kind, default }
    }
}

/// Parameters after defaults and positional overrides are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParams {
    pub values: Vec<f64>,
    pub color: Option<String>,
}

impl BoundParams {
    /// Slot `i` as a look-back period. Period slots are validated positive
    /// integers by `bind`.
    fn period(&self, i: usize) -> usize {
        self.values[i] as usize
    }
}
