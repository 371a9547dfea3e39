use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Obstacle boxes are shrunk by these factors before intersection tests;
    /// exact edge contact is numerically unstable.
    pub box_scale_x: f32,
    pub box_scale_y: f32,
    pub curve_tension: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            box_scale_x: 0.999,
            box_scale_y: 0.998,
            curve_tension: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Horizontal gap after every terminal and label, as a fraction of the font size.
    pub gap_x_ratio: f32,
    /// Vertical gap between stacked elements, as a fraction of the font size.
    pub gap_y_ratio: f32,
    /// Extra headroom below a bar that carries secondary edge labels.
    pub secondary_clearance_ratio: f32,
    /// Distance kept between a routed curve's ends and the labels they join.
    pub endpoint_gap: f32,
    pub label_line_height: f32,
    pub flabel_font_scale: f32,
    pub secondary_font_scale: f32,
    pub padding: f32,
    pub fast_text_metrics: bool,
    /// Function labels that mark the head of a phrase; a child carrying one
    /// anchors its parent's connector.
    pub head_flabels: Vec<String>,
    pub routing: RoutingConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            gap_x_ratio: 1.0 / 3.0,
            gap_y_ratio: 1.0 / 3.0,
            secondary_clearance_ratio: 1.0 / 3.0,
            endpoint_gap: 2.0,
            label_line_height: 1.25,
            flabel_font_scale: 0.7,
            secondary_font_scale: 0.6,
            padding: 20.0,
            fast_text_metrics: false,
            head_flabels: vec!["HD".to_string()],
            routing: RoutingConfig::default(),
        }
    }
}

impl LayoutConfig {
    pub fn gap_x(&self, theme: &Theme) -> f32 {
        theme.font_size * self.gap_x_ratio
    }

    pub fn gap_y(&self, theme: &Theme) -> f32 {
        theme.font_size * self.gap_y_ratio
    }

    pub fn secondary_clearance(&self, theme: &Theme) -> f32 {
        theme.font_size * self.secondary_clearance_ratio
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    /// Default font for rasterising; follows the theme when loaded from a file.
    pub font_family: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            font_family: "Source Sans Pro".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            font_family: primary_family(&theme.font_family),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    text_color: Option<String>,
    flabel_color: Option<String>,
    line_color: Option<String>,
    line_width: Option<f32>,
    secondary_color: Option<String>,
    secondary_label_background: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RoutingConfigFile {
    box_scale_x: Option<f32>,
    box_scale_y: Option<f32>,
    curve_tension: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    gap_x_ratio: Option<f32>,
    gap_y_ratio: Option<f32>,
    secondary_clearance_ratio: Option<f32>,
    endpoint_gap: Option<f32>,
    label_line_height: Option<f32>,
    flabel_font_scale: Option<f32>,
    secondary_font_scale: Option<f32>,
    padding: Option<f32>,
    fast_text_metrics: Option<bool>,
    head_flabels: Option<Vec<String>>,
    routing: Option<RoutingConfigFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = match theme_name {
            "modern" => Theme::modern(),
            "classic" | "default" => Theme::classic(),
            other => return Err(anyhow::anyhow!("unknown theme {other:?}")),
        };
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.flabel_color {
            config.theme.flabel_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.line_width {
            config.theme.line_width = v;
        }
        if let Some(v) = vars.secondary_color {
            config.theme.secondary_color = v;
        }
        if let Some(v) = vars.secondary_label_background {
            config.theme.secondary_label_background = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }
    config.render.font_family = primary_family(&config.theme.font_family);

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.gap_x_ratio {
            target.gap_x_ratio = v;
        }
        if let Some(v) = layout.gap_y_ratio {
            target.gap_y_ratio = v;
        }
        if let Some(v) = layout.secondary_clearance_ratio {
            target.secondary_clearance_ratio = v;
        }
        if let Some(v) = layout.endpoint_gap {
            target.endpoint_gap = v;
        }
        if let Some(v) = layout.label_line_height {
            target.label_line_height = v;
        }
        if let Some(v) = layout.flabel_font_scale {
            target.flabel_font_scale = v;
        }
        if let Some(v) = layout.secondary_font_scale {
            target.secondary_font_scale = v;
        }
        if let Some(v) = layout.padding {
            target.padding = v;
        }
        if let Some(v) = layout.fast_text_metrics {
            target.fast_text_metrics = v;
        }
        if let Some(v) = layout.head_flabels {
            target.head_flabels = v;
        }
        if let Some(routing) = layout.routing {
            if let Some(v) = routing.box_scale_x {
                target.routing.box_scale_x = v;
            }
            if let Some(v) = routing.box_scale_y {
                target.routing.box_scale_y = v;
            }
            if let Some(v) = routing.curve_tension {
                target.routing.curve_tension = v;
            }
        }
    }

    Ok(config)
}

/// First name of a CSS font-family list, unquoted.
fn primary_family(font_family: &str) -> String {
    font_family
        .split(',')
        .map(|part| part.trim().trim_matches('"').trim_matches('\''))
        .find(|part| !part.is_empty())
        .unwrap_or("sans-serif")
        .to_string()
}
