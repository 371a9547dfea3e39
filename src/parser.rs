//! Tree input: JSON/JSON5 specs and a compact line notation.
//!
//! ```text
//! tree jag-ville
//! words: jag|SS ville|HD åka dit
//! IP|OO: åka dit
//! VP [only=ville]: IP ville
//! S: jag VP SB->jag
//! ```
//!
//! `words:` lines declare terminals in sentence order, `ID: ...` lines declare a
//! nonterminal with its children and `LABEL->TARGET` secondary edges. Options in
//! brackets are `only=CHILD` and `label=TEXT` (an empty `label=` hides the node's
//! category). Blank lines or `---` separate trees; `%%` starts a comment line.

use crate::error::ParseError;
use crate::ir::{SecondaryEdge, Spec, SpecEntry, Tree};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static TREE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^tree\s+(\S.*)$").unwrap());
static WORDS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^words\s*:(.*)$").unwrap());
static NODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<id>[^\s:|\[\]]+)(?:\|(?P<flabel>[^\s:\[\]]*))?\s*(?:\[(?P<opts>[^\]]*)\])?\s*:(?P<body>.*)$",
    )
    .unwrap()
});
static OPTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)=(\S*)").unwrap());

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonInput {
    Collection { trees: Vec<Tree> },
    Many(Vec<Spec>),
    One(Spec),
}

/// Read every tree in `input`, choosing the format from its first character.
pub fn parse_trees(input: &str) -> Result<Vec<Tree>, ParseError> {
    let trimmed = input.trim_start();
    let trees = if trimmed.starts_with('[') || trimmed.starts_with('{') {
        parse_json(trimmed)?
    } else {
        parse_notation(input)?
    };
    if trees.is_empty() || trees.iter().all(|tree| tree.spec.is_empty()) {
        return Err(ParseError::Empty);
    }
    Ok(trees)
}

pub fn parse_json(input: &str) -> Result<Vec<Tree>, ParseError> {
    let parsed: JsonInput = json5::from_str(input)?;
    Ok(match parsed {
        JsonInput::Collection { trees } => trees,
        JsonInput::Many(specs) => specs
            .into_iter()
            .map(|spec| Tree { id: None, spec })
            .collect(),
        JsonInput::One(spec) => vec![Tree { id: None, spec }],
    })
}

pub fn parse_notation(input: &str) -> Result<Vec<Tree>, ParseError> {
    let mut trees = Vec::new();
    let mut current = Tree::default();

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.starts_with("%%") {
            continue;
        }
        if line.is_empty() || line == "---" {
            flush(&mut trees, &mut current);
            continue;
        }
        if let Some(caps) = TREE_RE.captures(line) {
            flush(&mut trees, &mut current);
            current.id = Some(caps[1].trim().to_string());
            continue;
        }
        if let Some(caps) = WORDS_RE.captures(line) {
            for token in caps[1].split_whitespace() {
                let (id, flabel) = match token.split_once('|') {
                    Some((id, flabel)) => (id, Some(flabel)),
                    None => (token, None),
                };
                if id.is_empty() {
                    return Err(notation(line_no, format!("empty word in {token:?}")));
                }
                let mut entry = SpecEntry::terminal(id);
                if let Some(flabel) = flabel.filter(|f| !f.is_empty()) {
                    entry = entry.with_flabel(flabel);
                }
                current.spec.push(entry);
            }
            continue;
        }
        if let Some(caps) = NODE_RE.captures(line) {
            current.spec.push(node_entry(&caps, line_no)?);
            continue;
        }
        return Err(notation(line_no, format!("cannot read {line:?}")));
    }
    flush(&mut trees, &mut current);
    Ok(trees)
}

fn node_entry(caps: &regex::Captures<'_>, line_no: usize) -> Result<SpecEntry, ParseError> {
    let mut entry = SpecEntry {
        id: caps["id"].to_string(),
        label: caps["id"].to_string(),
        flabel: caps
            .name("flabel")
            .map(|m| m.as_str().to_string())
            .filter(|f| !f.is_empty()),
        ..Default::default()
    };

    if let Some(opts) = caps.name("opts") {
        for option in OPTION_RE.captures_iter(opts.as_str()) {
            let value = option[2].to_string();
            match &option[1] {
                "only" => entry.only = Some(value),
                "label" => entry.label = value,
                other => return Err(notation(line_no, format!("unknown option {other:?}"))),
            }
        }
    }

    for token in caps["body"].split_whitespace() {
        match token.split_once("->") {
            Some((label, target)) if !target.is_empty() => entry.secondary.push(SecondaryEdge {
                id: target.to_string(),
                label: label.to_string(),
            }),
            Some(_) => {
                return Err(notation(line_no, format!("secondary edge {token:?} has no target")));
            }
            None => entry.children.push(token.to_string()),
        }
    }
    if entry.children.is_empty() {
        return Err(notation(line_no, format!("{:?} has no children", entry.id)));
    }
    Ok(entry)
}

fn flush(trees: &mut Vec<Tree>, current: &mut Tree) {
    if !current.spec.is_empty() {
        trees.push(std::mem::take(current));
    }
}

fn notation(line: usize, message: String) -> ParseError {
    ParseError::Notation { line, message }
}
