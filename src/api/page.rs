// =============================================================================
// Dashboard Page — single HTML document
// =============================================================================
//
// Controls are rendered server-side from `DashboardLayout`; the inline script
// posts the current inputs to the JSON API whenever a control changes and
// draws the returned figure with plotly.js.
// =============================================================================

use crate::config::DashboardConfig;
use crate::layout::{DashboardLayout, Dropdown};

/// Minimal HTML escaping for text and attribute values.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_dropdown(dropdown: &Dropdown) -> String {
    let options: String = dropdown
        .options
        .iter()
        .map(|opt| {
            let selected = if dropdown.value.contains(&opt.value) { " selected" } else { "" };
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                escape(&opt.value),
                selected,
                escape(&opt.label)
            )
        })
        .collect();
    let multiple = if dropdown.multi { " multiple size=\"6\"" } else { "" };
    format!(
        r#"<label for="{id}">{label}</label>
            <select id="{id}"{multiple}>{options}</select>"#,
        id = dropdown.id,
        label = escape(dropdown.label),
    )
}

/// Full page for `layout`, with asset URLs taken from `config`.
pub fn render_page(layout: &DashboardLayout, config: &DashboardConfig) -> String {
    let stylesheets: String = config
        .external_css
        .iter()
        .map(|href| format!(r#"<link rel="stylesheet" href="{}">"#, escape(href)))
        .collect::<Vec<_>>()
        .join("\n    ");
    let analytics = if config.analytics_enabled {
        format!(r#"<script src="{}"></script>"#, escape(&config.analytics_script_url))
    } else {
        String::new()
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    {stylesheets}
    <script src="{plotly}"></script>
    {analytics}
    <style>
        select {{ width: 100%; }}
        #arglist {{ box-sizing: border-box; }}
    </style>
</head>
<body>
<div id="container" style="{container_style}">
    <div>
        <h2 style="{title_style}">{title}</h2>
        <div style="{ticker_style}">
            {ticker}
        </div>
        <div style="{indicators_style}">
            {indicators}
        </div>
    </div>
    <div id="arg-controls" style="{arg_controls_style}">
        <label for="arglist">{arg_label}</label>
        <p>{arg_help}</p>
        <input id="arglist" type="text" style="{arg_input_style}">
    </div>
    <div id="output"></div>
</div>
<script>
    const tickerEl = document.getElementById('{ticker_id}');
    const multiEl = document.getElementById('{indicators_id}');
    const argEl = document.getElementById('arglist');
    const panelEl = document.getElementById('arg-controls');
    let pending = 0;

    function selectedIndicators() {{
        return Array.from(multiEl.selectedOptions).map(o => o.value);
    }}

    function applyStyle(el, style) {{
        el.removeAttribute('style');
        for (const [prop, value] of Object.entries(style)) {{
            el.style.setProperty(prop, value);
        }}
    }}

    async function postJson(path, body) {{
        const resp = await fetch(path, {{
            method: 'POST',
            headers: {{ 'Content-Type': 'application/json' }},
            body: JSON.stringify(body)
        }});
        return resp.json();
    }}

    async function updateArgControls() {{
        const style = await postJson('/api/v1/arg-controls', {{ indicators: selectedIndicators() }});
        applyStyle(panelEl, style);
    }}

    async function updateGraph() {{
        const request = ++pending;
        const body = {{
            ticker: tickerEl.value,
            indicators: selectedIndicators(),
            arglist: argEl.value
        }};
        const result = await postJson('/api/v1/graph', body);
        if (request !== pending) return;
        const figure = result.figure || result;
        Plotly.newPlot('output', figure.data, figure.layout);
    }}

    let argTimer = null;
    tickerEl.addEventListener('change', updateGraph);
    multiEl.addEventListener('change', () => {{ updateArgControls(); updateGraph(); }});
    argEl.addEventListener('input', () => {{
        clearTimeout(argTimer);
        argTimer = setTimeout(updateGraph, 400);
    }});

    window.onload = updateGraph;
</script>
</body>
</html>"##,
        title = escape(layout.title),
        plotly = escape(&config.plotly_url),
        container_style = layout.container_style.to_css(),
        title_style = layout.title_style.to_css(),
        ticker_style = layout.ticker_style.to_css(),
        indicators_style = layout.indicators_style.to_css(),
        ticker = render_dropdown(&layout.ticker),
        indicators = render_dropdown(&layout.indicators),
        ticker_id = layout.ticker.id,
        indicators_id = layout.indicators.id,
        arg_controls_style = layout.arg_controls_style.to_css(),
        arg_label = escape(layout.arg_label),
        arg_help = escape(layout.arg_help),
        arg_input_style = layout.arg_input_style.to_css(),
    )
}
