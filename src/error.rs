use thiserror::Error;

use crate::layout::BlockId;

/// A spec that cannot be turned into a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("duplicate id {0:?}")]
    DuplicateId(String),
    #[error("{from:?} refers to unknown id {to:?}")]
    UnknownReference { from: String, to: String },
    #[error("{id:?} nominates {only:?} as its only child, but it is not one of its children")]
    OnlyNotAChild { id: String, only: String },
    #[error("invalid spec: entries never placed (cycle or missing child): {0:?}")]
    Unplaceable(Vec<String>),
    #[error("{0:?} is a child of more than one node")]
    SharedChild(String),
}

/// Broken invariants inside the block row engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("block {0} is not in the row")]
    NotInRow(BlockId),
    #[error("nonterminal without children")]
    NoChildren,
    #[error("label over block {child} needs a connector of negative length {length}")]
    NegativeConnector { child: BlockId, length: f32 },
    #[error("no child of the span is eligible for the main group")]
    EmptyMainGroup,
    #[error("main group nomination of block {nominee} matched {matched} runs")]
    Nomination { nominee: BlockId, matched: usize },
    #[error("min height of block {block} would drop from {from} to {to}")]
    HeightDecrease { block: BlockId, from: f32, to: f32 },
}

/// Errors from reading tree descriptions.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON tree input: {0}")]
    Json(#[from] json5::Error),
    #[error("line {line}: {message}")]
    Notation { line: usize, message: String },
    #[error("no trees found in input")]
    Empty,
}

#[derive(Debug, Error)]
pub enum TreeError {
    #[error(transparent)]
    Spec(#[from] SpecError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}
