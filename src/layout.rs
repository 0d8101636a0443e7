// =============================================================================
// Page Layout — typed UI declaration
// =============================================================================
//
// Everything the page needs to draw its controls: the two dropdowns, the
// argument panel with its help text, and the container styling. Styles are
// typed; they serialise with CSS property names so the page can apply them
// directly, and `to_css` renders them inline.
// =============================================================================

use serde::Serialize;

use crate::config::DashboardConfig;
use crate::indicators::IndicatorKind;
use crate::types::Ticker;

pub const TITLE: &str = "Dash Finance";
pub const ARG_HELP: &str =
    "Use , to separate arguments and ; to separate indicators. () and spaces are ignored";

// =============================================================================
// Style
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_left: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_right: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_top: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_left: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_right: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

fn px(value: u32) -> Option<String> {
    Some(format!("{value}px"))
}

impl Style {
    /// `display: none`.
    pub fn hidden() -> Self {
        Self {
            display: Some("none".into()),
            ..Self::default()
        }
    }

    /// Visible argument panel.
    pub fn arg_panel() -> Self {
        Self {
            margin_bottom: px(20),
            padding_left: px(40),
            ..Self::default()
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.display.as_deref() == Some("none")
    }

    /// Inline CSS declaration list, e.g. `margin-bottom: 20px; padding-left: 40px`.
    pub fn to_css(&self) -> String {
        let props = [
            ("display", &self.display),
            ("width", &self.width),
            ("height", &self.height),
            ("margin-bottom", &self.margin_bottom),
            ("margin-left", &self.margin_left),
            ("margin-right", &self.margin_right),
            ("padding-top", &self.padding_top),
            ("padding-left", &self.padding_left),
            ("padding-right", &self.padding_right),
            ("text-align", &self.text_align),
            ("font-family", &self.font_family),
            ("background-color", &self.background_color),
        ];
        props
            .iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| format!("{name}: {v}")))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Argument panel visibility: hidden when no indicator is selected.
pub fn arg_controls_style(indicators: &[String]) -> Style {
    if indicators.is_empty() {
        Style::hidden()
    } else {
        Style::arg_panel()
    }
}

// =============================================================================
// Dropdowns
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

impl DropdownOption {
    pub fn ticker(ticker: &Ticker) -> Self {
        Self {
            label: ticker.to_string(),
            value: ticker.to_string(),
        }
    }

    pub fn indicator(kind: IndicatorKind) -> Self {
        Self {
            label: kind.label().to_string(),
            value: kind.id().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dropdown {
    pub id: &'static str,
    pub label: &'static str,
    pub options: Vec<DropdownOption>,
    /// Selected values; at most one unless `multi`.
    pub value: Vec<String>,
    pub multi: bool,
}

// =============================================================================
// DashboardLayout
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardLayout {
    pub title: &'static str,
    pub title_style: Style,
    pub ticker: Dropdown,
    pub ticker_style: Style,
    pub indicators: Dropdown,
    pub indicators_style: Style,
    pub arg_label: &'static str,
    pub arg_help: &'static str,
    pub arg_input_style: Style,
    pub arg_controls_style: Style,
    pub container_style: Style,
}

impl DashboardLayout {
    /// Initial page state for the given symbol universe.
    pub fn new(symbols: &[Ticker], config: &DashboardConfig) -> Self {
        let width = config.figure_width;
        let control_width = width.saturating_sub(80) / 2;

        let ticker = Dropdown {
            id: "dropdown",
            label: "Select ticker:",
            options: symbols.iter().map(DropdownOption::ticker).collect(),
            value: vec![Ticker::new(&config.default_ticker).to_string()],
            multi: false,
        };

        let indicators = Dropdown {
            id: "multi",
            label: "Select technical indicators:",
            options: IndicatorKind::ALL.into_iter().map(DropdownOption::indicator).collect(),
            value: config.default_indicators.clone(),
            multi: true,
        };

        Self {
            title: TITLE,
            title_style: Style {
                padding_top: px(20),
                text_align: Some("center".into()),
                ..Style::default()
            },
            ticker,
            ticker_style: Style {
                width: px(control_width),
                display: Some("inline-block".into()),
                padding_left: px(40),
                margin_bottom: px(20),
                ..Style::default()
            },
            indicators_style: Style {
                width: px(control_width),
                display: Some("inline-block".into()),
                padding_right: px(40),
                margin_bottom: px(20),
                ..Style::default()
            },
            arg_controls_style: arg_controls_style(&config.default_indicators),
            indicators,
            arg_label: "Specify parameters of technical indicators:",
            arg_help: ARG_HELP,
            arg_input_style: Style {
                height: px(32),
                width: px(width.saturating_sub(80)),
                ..Style::default()
            },
            container_style: Style {
                width: px(width),
                margin_left: Some("auto".into()),
                margin_right: Some("auto".into()),
                font_family: Some("overpass".into()),
                background_color: Some("#F3F3F3".into()),
                ..Style::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_hides_arg_panel() {
        let style = arg_controls_style(&[]);
        assert!(style.is_hidden());
        assert_eq!(style.to_css(), "display: none");
    }

    #[test]
    fn non_empty_selection_shows_arg_panel() {
        let style = arg_controls_style(&["add_RSI".to_string()]);
        assert!(!style.is_hidden());
        assert_eq!(style.to_css(), "margin-bottom: 20px; padding-left: 40px");

        let json = serde_json::to_value(&style).unwrap();
        assert_eq!(json, serde_json::json!({"margin-bottom": "20px", "padding-left": "40px"}));
    }

    #[test]
    fn layout_uses_configured_defaults() {
        let symbols = vec![Ticker::new("AAPL"), Ticker::new("MSFT")];
        let layout = DashboardLayout::new(&symbols, &DashboardConfig::default());

        assert_eq!(layout.title, "Dash Finance");
        assert_eq!(layout.ticker.value, vec!["MSFT"]);
        assert_eq!(layout.ticker.options.len(), 2);
        assert!(layout.indicators.multi);
        assert_eq!(layout.indicators.value, vec!["add_BBANDS", "add_RSI", "add_MACD"]);
        assert!(layout
            .indicators
            .options
            .contains(&DropdownOption { label: "RSI".into(), value: "add_RSI".into() }));
        assert!(!layout.arg_controls_style.is_hidden());
        assert_eq!(layout.container_style.width.as_deref(), Some("1100px"));
    }
}
