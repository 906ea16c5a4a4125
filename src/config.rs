use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Glyph and edge geometry knobs shared by the chart renderer and the shape
/// builders. Distances are in chart units (pre-scaling pixels).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    pub node_size: f32,
    pub node_padding: f32,
    pub marker_size: f32,
    pub union_marker_size: f32,
    pub line_width: f32,
    pub line_width_active: f32,
    pub edge_line_width: f32,
    pub infertile_width: f32,
    pub infertile_height: f32,
    pub polyline_step: f32,
    pub max_visible_cancers: usize,
    pub font_size: f32,
    pub title_font_size: f32,
    pub font_weight: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            node_size: 80.0,
            node_padding: 10.0,
            marker_size: 24.0,
            union_marker_size: 52.0,
            line_width: 2.0,
            line_width_active: 2.6,
            edge_line_width: 1.0,
            infertile_width: 25.0,
            infertile_height: 102.0,
            polyline_step: 115.0,
            max_visible_cancers: 4,
            font_size: 9.0,
            title_font_size: 10.0,
            font_weight: 400,
        }
    }
}

/// Generational grid spacing for the slot tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub horizontal_shift: f32,
    pub vertical_shift: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_shift: 100.0,
            vertical_shift: 180.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            padding: 20.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub hours_per_day: u32,
    pub unassigned_label: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            hours_per_day: 24,
            unassigned_label: "Unassigned".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub chart: ChartConfig,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub scheduler: SchedulerConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::clinical();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            chart: ChartConfig::default(),
            layout: LayoutConfig::default(),
            render,
            scheduler: SchedulerConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartConfigFile {
    node_size: Option<f32>,
    node_padding: Option<f32>,
    marker_size: Option<f32>,
    union_marker_size: Option<f32>,
    line_width: Option<f32>,
    line_width_active: Option<f32>,
    edge_line_width: Option<f32>,
    infertile_width: Option<f32>,
    infertile_height: Option<f32>,
    polyline_step: Option<f32>,
    max_visible_cancers: Option<usize>,
    font_size: Option<f32>,
    title_font_size: Option<f32>,
    font_weight: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    horizontal_shift: Option<f32>,
    vertical_shift: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    padding: Option<f32>,
    background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchedulerConfigFile {
    hours_per_day: Option<u32>,
    unassigned_label: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    text_color: Option<String>,
    fill_active: Option<String>,
    fill_common: Option<String>,
    stroke_active: Option<String>,
    stroke_common: Option<String>,
    stroke_full: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    chart: Option<ChartConfigFile>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
    scheduler: Option<SchedulerConfigFile>,
}

/// Loads defaults, then overlays the optional config file field by field.
/// Strict JSON is tried first; json5 accepts hand-written files with comments
/// and trailing commas.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = match serde_json::from_str(&contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(&contents)
            .map_err(|err| anyhow::anyhow!("failed to parse config `{}`: {err}", path.display()))?,
    };

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "print" {
            config.theme = Theme::print();
        } else if theme_name == "clinical" || theme_name == "default" {
            config.theme = Theme::clinical();
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.fill_active {
            config.theme.fill_active = v;
        }
        if let Some(v) = vars.fill_common {
            config.theme.fill_common = v;
        }
        if let Some(v) = vars.stroke_active {
            config.theme.stroke_active = v;
        }
        if let Some(v) = vars.stroke_common {
            config.theme.stroke_common = v;
        }
        if let Some(v) = vars.stroke_full {
            config.theme.stroke_full = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v.clone();
            config.render.background = v;
        }
    }

    if let Some(chart) = parsed.chart {
        if let Some(v) = chart.node_size {
            config.chart.node_size = v;
        }
        if let Some(v) = chart.node_padding {
            config.chart.node_padding = v;
        }
        if let Some(v) = chart.marker_size {
            config.chart.marker_size = v;
        }
        if let Some(v) = chart.union_marker_size {
            config.chart.union_marker_size = v;
        }
        if let Some(v) = chart.line_width {
            config.chart.line_width = v;
        }
        if let Some(v) = chart.line_width_active {
            config.chart.line_width_active = v;
        }
        if let Some(v) = chart.edge_line_width {
            config.chart.edge_line_width = v;
        }
        if let Some(v) = chart.infertile_width {
            config.chart.infertile_width = v;
        }
        if let Some(v) = chart.infertile_height {
            config.chart.infertile_height = v;
        }
        if let Some(v) = chart.polyline_step {
            config.chart.polyline_step = v;
        }
        if let Some(v) = chart.max_visible_cancers {
            config.chart.max_visible_cancers = v;
        }
        if let Some(v) = chart.font_size {
            config.chart.font_size = v;
        }
        if let Some(v) = chart.title_font_size {
            config.chart.title_font_size = v;
        }
        if let Some(v) = chart.font_weight {
            config.chart.font_weight = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.horizontal_shift {
            config.layout.horizontal_shift = v;
        }
        if let Some(v) = layout.vertical_shift {
            config.layout.vertical_shift = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.padding {
            config.render.padding = v;
        }
        if let Some(v) = render.background {
            config.render.background = v;
        }
    }

    if let Some(scheduler) = parsed.scheduler {
        if let Some(v) = scheduler.hours_per_day {
            config.scheduler.hours_per_day = v;
        }
        if let Some(v) = scheduler.unassigned_label {
            config.scheduler.unassigned_label = v;
        }
    }

    Ok(config)
}
