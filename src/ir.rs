use serde::{Deserialize, Serialize};

/// A non-tree edge from the entry that declares it to `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryEdge {
    pub id: String,
    pub label: String,
}

/// One node of a parse tree as delivered by a corpus reader.
///
/// Entries without children are terminals; their order in a `Spec` is the word
/// order of the sentence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecEntry {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flabel: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary: Vec<SecondaryEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only: Option<String>,
}

impl SpecEntry {
    pub fn terminal(id: &str) -> Self {
        Self {
            id: id.to_string(),
            label: id.to_string(),
            ..Default::default()
        }
    }

    pub fn node(id: &str, children: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            label: id.to_string(),
            children: children.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_flabel(mut self, flabel: &str) -> Self {
        self.flabel = Some(flabel.to_string());
        self
    }

    pub fn with_secondary(mut self, id: &str, label: &str) -> Self {
        self.secondary.push(SecondaryEdge {
            id: id.to_string(),
            label: label.to_string(),
        });
        self
    }

    pub fn with_only(mut self, only: &str) -> Self {
        self.only = Some(only.to_string());
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }
}

pub type Spec = Vec<SpecEntry>;

/// A named tree, as read from an input file holding several sentences.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tree {
    #[serde(default)]
    pub id: Option<String>,
    pub spec: Spec,
}
