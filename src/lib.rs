#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
mod text_metrics;
pub mod theme;
pub mod topology;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RoutingConfig, load_config};
pub use error::{LayoutError, ParseError, SpecError, TreeError};
pub use ir::{SecondaryEdge, Spec, SpecEntry, Tree};
pub use layout::{TreeLayout, compute_layout};
pub use parser::parse_trees;
pub use render::render_svg;
pub use theme::Theme;
