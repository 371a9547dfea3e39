use crate::config::load_config;
use crate::ir::Tree;
use crate::layout::compute_layout;
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::parser::parse_trees;
use crate::render::{render_svg, write_output_png, write_output_svg};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "sentree",
    version,
    about = "Render parse trees with routed secondary edges"
)]
pub struct Args {
    /// Input file (JSON/JSON5 spec or tree notation) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme preset, themeVariables, layout overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// Font size, overriding the theme
    #[arg(long = "fontSize")]
    pub font_size: Option<f32>,

    /// Write the computed geometry as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;
    if let Some(size) = args.font_size {
        config.theme.font_size = size;
    }

    let input = read_input(args.input.as_deref())?;
    let trees = parse_trees(&input)?;

    let outputs: Vec<Option<PathBuf>> = if trees.len() == 1 {
        let output = match args.output_format {
            OutputFormat::Svg => args.output.clone(),
            OutputFormat::Png => Some(ensure_output(&args.output, "png")?),
        };
        vec![output]
    } else {
        resolve_multi_outputs(args.output.as_deref(), args.output_format, &trees)?
            .into_iter()
            .map(Some)
            .collect()
    };

    let mut dumps = Vec::new();
    for (idx, (tree, output)) in trees.iter().zip(&outputs).enumerate() {
        let name = tree
            .id
            .clone()
            .unwrap_or_else(|| format!("tree {}", idx + 1));
        let layout = compute_layout(&tree.spec, &config.theme, &config.layout)
            .with_context(|| format!("laying out {name}"))?;
        let svg = render_svg(&layout, &config.theme, &config.layout);
        match args.output_format {
            OutputFormat::Svg => write_output_svg(&svg, output.as_deref())?,
            OutputFormat::Png => {
                let output = ensure_output(output, "png")?;
                write_output_png(&svg, &output, &config.render)?;
            }
        }
        if args.dump_layout.is_some() {
            dumps.push(LayoutDump::from_layout(&layout, tree.id.as_deref()));
        }
    }

    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &dumps)?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

fn resolve_multi_outputs(
    output: Option<&Path>,
    format: OutputFormat,
    trees: &[Tree],
) -> Result<Vec<PathBuf>> {
    let ext = format.extension();
    let base = output.ok_or_else(|| anyhow::anyhow!("Output path required for several trees"))?;
    if base.is_dir() {
        return Ok(trees
            .iter()
            .enumerate()
            .map(|(idx, tree)| match &tree.id {
                Some(id) => base.join(format!("{}.{ext}", file_safe(id))),
                None => base.join(format!("tree-{}.{ext}", idx + 1)),
            })
            .collect());
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("tree");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    Ok((0..trees.len())
        .map(|idx| parent.join(format!("{stem}-{}.{ext}", idx + 1)))
        .collect())
}

fn file_safe(id: &str) -> String {
    id.chars()
        .map(|ch| if ch.is_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect()
}
