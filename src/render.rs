use crate::config::{LayoutConfig, RenderConfig};
use crate::layout::{LabelKind, PlacedLabel, SegmentKind, TreeLayout, split_lines};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

pub fn render_svg(layout: &TreeLayout, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = String::new();
    let width = layout.width;
    let height = layout.height;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"secondary-arrow\" viewBox=\"0 0 10 10\" refX=\"9\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.secondary_color
    ));
    svg.push_str("</defs>");

    // Connectors cross bars of other subtrees; the halo keeps the crossing readable.
    for line in layout.lines.iter().filter(|l| l.kind == SegmentKind::Connector) {
        svg.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{:.2}\"/>",
            line.x1,
            line.y1,
            line.x2,
            line.y2,
            theme.background,
            theme.line_width * 3.0
        ));
    }
    for line in &layout.lines {
        let stroke_width = match line.kind {
            SegmentKind::Bar => theme.line_width * 0.75,
            SegmentKind::Connector | SegmentKind::MainBar => theme.line_width,
        };
        svg.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{stroke_width:.2}\" stroke-linecap=\"square\"/>",
            line.x1, line.y1, line.x2, line.y2, theme.line_color
        ));
    }

    for curve in &layout.curves {
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\" stroke-dasharray=\"6 4\" marker-end=\"url(#secondary-arrow)\"/>",
            curve.d,
            theme.secondary_color,
            theme.line_width * 0.75
        ));
    }

    for label in &layout.labels {
        if label.kind == LabelKind::Secondary {
            svg.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"3\" ry=\"3\" fill=\"{}\" stroke=\"{}\" stroke-width=\"0.8\"/>",
                label.x - 2.0,
                label.y,
                label.width + 4.0,
                label.height,
                theme.secondary_label_background,
                theme.secondary_color
            ));
        }
        svg.push_str(&label_svg(label, theme, config));
    }

    svg.push_str("</svg>");
    svg
}

fn label_svg(label: &PlacedLabel, theme: &Theme, config: &LayoutConfig) -> String {
    let x = label.center_x();
    let line_height = label.font_size * config.label_line_height;
    // baseline of the first line, leaving the half leading above it
    let start_y = label.y + (line_height + label.font_size) / 2.0 - label.font_size * 0.12;
    let fill = match label.kind {
        LabelKind::Word | LabelKind::Category => theme.text_color.as_str(),
        LabelKind::Function => theme.flabel_color.as_str(),
        LabelKind::Secondary => theme.secondary_color.as_str(),
    };
    let mut text = format!(
        "<text x=\"{x:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{:.2}\" fill=\"{fill}\">",
        escape_xml(&theme.font_family),
        label.font_size
    );
    for (idx, line) in split_lines(&label.text).iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_height };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = render_cfg.font_family.clone();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the png feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::SpecEntry;
    use crate::layout::compute_layout;

    fn config() -> LayoutConfig {
        LayoutConfig {
            fast_text_metrics: true,
            ..Default::default()
        }
    }

    #[test]
    fn render_svg_basic() {
        let spec = vec![
            SpecEntry::terminal("Alpha"),
            SpecEntry::terminal("&"),
            SpecEntry::terminal("Beta"),
            SpecEntry::node("NP", &["Alpha", "&", "Beta"]),
        ];
        let theme = Theme::classic();
        let layout = compute_layout(&spec, &theme, &config()).expect("layout");
        let svg = render_svg(&layout, &theme, &config());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(">Alpha</tspan>"));
        assert!(svg.contains(">&amp;</tspan>"));
        assert!(svg.contains(">NP</tspan>"));
    }

    #[test]
    fn secondary_edges_render_dashed_with_label_box() {
        let spec = vec![
            SpecEntry::terminal("a"),
            SpecEntry::terminal("b"),
            SpecEntry::terminal("c"),
            SpecEntry::node("NP", &["a"]),
            SpecEntry::node("VP", &["b", "c"]).with_secondary("NP", "SB"),
            SpecEntry::node("S", &["NP", "VP"]),
        ];
        let theme = Theme::classic();
        let layout = compute_layout(&spec, &theme, &config()).expect("layout");
        let svg = render_svg(&layout, &theme, &config());
        assert!(svg.contains("stroke-dasharray=\"6 4\""));
        assert!(svg.contains("rx=\"3\""));
        assert!(svg.contains(">SB</tspan>"));
    }
}
