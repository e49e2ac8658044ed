//! Builds the icon font and the rust `Icon` enum from a list of icon names.
use anyhow::{Context, Result};
use clap::Parser;
use iconforge::{
    codepoints::CodepointBase,
    config::Config,
    driver::{self, Steps},
    logging,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// YAML config, defaults to ./iconforge.yaml when present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Text file with one icon name per line
    #[arg(short, long)]
    icon_list: Option<PathBuf>,

    /// Directory holding <icon>.svg files
    #[arg(short, long)]
    svg_dir: Option<PathBuf>,

    /// Stroke to path converter binary
    #[arg(long)]
    stroke_to_path: Option<PathBuf>,

    /// Font import wrapper script, run with bash
    #[arg(long)]
    font_import_script: Option<PathBuf>,

    /// Where to write the codepoint manifest for the font import
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Generated rust source file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// First codepoint: a number, `ascii` (0x61) or `private-use` (0xF102)
    #[arg(short = 'b', long)]
    codepoint_base: Option<CodepointBase>,

    /// Don't run the stroke to path converter
    #[arg(long)]
    skip_stroke: bool,

    /// Don't build the font
    #[arg(long)]
    skip_font: bool,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(self, config: &mut Config) -> Steps {
        if let Some(icon_list) = self.icon_list {
            config.icon_list = icon_list;
        }
        if let Some(svg_dir) = self.svg_dir {
            config.svg_dir = Some(svg_dir);
        }
        if let Some(binary) = self.stroke_to_path {
            config.stroke_to_path.binary = binary;
        }
        if let Some(script) = self.font_import_script {
            config.font_import.script = script;
        }
        if let Some(manifest) = self.manifest {
            config.manifest = manifest;
        }
        if let Some(output) = self.output {
            config.output_source = output;
        }
        if let Some(base) = self.codepoint_base {
            config.codepoint_base = base;
        }
        Steps {
            skip_stroke: self.skip_stroke,
            skip_font: self.skip_font,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::setup(args.verbose);

    let mut config = Config::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    let steps = args.apply(&mut config);

    let table = driver::run(&config, steps).context("Icon build failed")?;
    println!(
        "Built {} icons into {:?}",
        table.len(),
        config.output_source
    );
    Ok(())
}
