use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub flabel_color: String,
    pub line_color: String,
    pub line_width: f32,
    pub secondary_color: String,
    pub secondary_label_background: String,
    pub background: String,
}

impl Theme {
    /// Black connectors on white, as in printed treebank diagrams.
    pub fn classic() -> Self {
        Self {
            font_family: "\"Source Sans Pro\", \"Source Sans 3\", sans-serif".to_string(),
            font_size: 22.0,
            text_color: "#000000".to_string(),
            flabel_color: "#444444".to_string(),
            line_color: "#000000".to_string(),
            line_width: 2.0,
            secondary_color: "#1f5fbf".to_string(),
            secondary_label_background: "#FFFFFF".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 16.0,
            text_color: "#1C2430".to_string(),
            flabel_color: "#5B6B85".to_string(),
            line_color: "#7A8AA6".to_string(),
            line_width: 1.5,
            secondary_color: "#C2410C".to_string(),
            secondary_label_background: "#FFF7ED".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}
