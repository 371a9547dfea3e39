use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::text_metrics;
use crate::theme::Theme;

use super::LabelKind;

/// Text measurement as seen by the layout.
pub trait TextMeasure {
    /// Rendered `(width, height)` of `text` in the style of `kind`.
    fn measure(&mut self, text: &str, kind: LabelKind) -> (f32, f32);
}

/// Measures with the theme's font stack, falling back to calibrated per-character
/// widths when no installed font matches.
pub struct ThemeMeasure<'a> {
    theme: &'a Theme,
    config: &'a LayoutConfig,
    cache: HashMap<(String, LabelKind), (f32, f32)>,
}

impl<'a> ThemeMeasure<'a> {
    pub fn new(theme: &'a Theme, config: &'a LayoutConfig) -> Self {
        Self {
            theme,
            config,
            cache: HashMap::new(),
        }
    }
}

impl TextMeasure for ThemeMeasure<'_> {
    fn measure(&mut self, text: &str, kind: LabelKind) -> (f32, f32) {
        if let Some(size) = self.cache.get(&(text.to_string(), kind)) {
            return *size;
        }
        let font_size = font_size_for(kind, self.theme, self.config);
        let size = measure_lines(
            text,
            font_size,
            self.theme.font_family.as_str(),
            self.config,
        );
        self.cache.insert((text.to_string(), kind), size);
        size
    }
}

pub fn font_size_for(kind: LabelKind, theme: &Theme, config: &LayoutConfig) -> f32 {
    match kind {
        LabelKind::Word | LabelKind::Category => theme.font_size,
        LabelKind::Function => theme.font_size * config.flabel_font_scale,
        LabelKind::Secondary => theme.font_size * config.secondary_font_scale,
    }
}

pub(super) fn measure_lines(
    text: &str,
    font_size: f32,
    font_family: &str,
    config: &LayoutConfig,
) -> (f32, f32) {
    if text.is_empty() {
        return (0.0, 0.0);
    }
    let lines = split_lines(text);
    let width = lines
        .iter()
        .map(|line| text_width(line, font_size, font_family, config.fast_text_metrics))
        .fold(0.0, f32::max);
    let height = lines.len() as f32 * font_size * config.label_line_height;
    (width, height)
}

pub fn split_lines(text: &str) -> Vec<String> {
    text.replace("\\n", "\n")
        .split('\n')
        .map(|line| line.trim().to_string())
        .collect()
}

fn text_width(text: &str, font_size: f32, font_family: &str, fast_metrics: bool) -> f32 {
    if fast_metrics {
        return fallback_text_width(text, font_size);
    }
    text_metrics::measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| fallback_text_width(text, font_size))
}

fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

/// Advance widths of a humanist sans at 1px, rounded to three places.
fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.2,
        '.' | ',' | ':' | ';' | '!' | '\'' | '|' => 0.25,
        '(' | ')' | '[' | ']' | '-' => 0.3,
        'I' | 'i' | 'j' | 'l' => 0.25,
        'f' | 'r' | 't' => 0.33,
        'm' | 'w' => 0.8,
        'M' | 'W' => 0.85,
        'å' | 'ä' | 'ö' | 'a' | 'c' | 'e' | 's' | 'z' => 0.5,
        'Å' | 'Ä' | 'Ö' => 0.62,
        'A'..='Z' => 0.6,
        'a'..='z' => 0.53,
        '0'..='9' => 0.5,
        _ => 0.56,
    }
}
