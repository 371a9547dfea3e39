use crate::layout::{LabelKind, SegmentKind, TreeLayout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub tree: Option<String>,
    pub width: f32,
    pub height: f32,
    pub labels: Vec<LabelDump>,
    pub lines: Vec<LineDump>,
    pub curves: Vec<CurveDump>,
    pub unrouted: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct LabelDump {
    pub text: String,
    pub kind: LabelKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
pub struct LineDump {
    pub kind: SegmentKind,
    pub from: [f32; 2],
    pub to: [f32; 2],
}

#[derive(Debug, Serialize)]
pub struct CurveDump {
    pub from: String,
    pub to: String,
    pub label: String,
    pub points: Vec<[f32; 2]>,
    pub d: String,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub label: String,
}

impl LayoutDump {
    pub fn from_layout(layout: &TreeLayout, tree: Option<&str>) -> Self {
        let labels = layout
            .labels
            .iter()
            .map(|label| LabelDump {
                text: label.text.clone(),
                kind: label.kind,
                x: label.x,
                y: label.y,
                width: label.width,
                height: label.height,
            })
            .collect();

        let lines = layout
            .lines
            .iter()
            .map(|line| LineDump {
                kind: line.kind,
                from: [line.x1, line.y1],
                to: [line.x2, line.y2],
            })
            .collect();

        let curves = layout
            .curves
            .iter()
            .map(|curve| CurveDump {
                from: curve.from.clone(),
                to: curve.to.clone(),
                label: curve.label.clone(),
                points: curve.points.iter().map(|p| [p.x, p.y]).collect(),
                d: curve.d.clone(),
            })
            .collect();

        let unrouted = layout
            .unrouted
            .iter()
            .map(|edge| EdgeDump {
                from: edge.from.clone(),
                to: edge.to.clone(),
                label: edge.label.clone(),
            })
            .collect();

        LayoutDump {
            tree: tree.map(str::to_string),
            width: layout.width,
            height: layout.height,
            labels,
            lines,
            curves,
            unrouted,
        }
    }
}

pub fn write_layout_dump(path: &Path, dumps: &[LayoutDump]) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, dumps)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::SpecEntry;
    use crate::layout::compute_layout;
    use crate::theme::Theme;

    #[test]
    fn dump_serialises_kinds_in_lowercase() {
        let spec = vec![
            SpecEntry::terminal("a"),
            SpecEntry::terminal("b"),
            SpecEntry::node("S", &["a", "b"]),
        ];
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..Default::default()
        };
        let layout = compute_layout(&spec, &Theme::classic(), &config).expect("layout");
        let dump = LayoutDump::from_layout(&layout, Some("ab"));
        let json = serde_json::to_value(&dump).expect("json");
        assert_eq!(json["tree"], "ab");
        assert_eq!(json["labels"][0]["kind"], "word");
        assert_eq!(json["labels"][2]["kind"], "category");
        assert!(json["lines"]
            .as_array()
            .expect("lines")
            .iter()
            .any(|line| line["kind"] == "mainBar"));
    }
}
