//! Imports icon svgs into a template font. Normally launched by the font import script.
use anyhow::{Context, Result};
use clap::Parser;
use iconforge::{
    codepoints::{CodepointBase, CodepointTable},
    font_import::{self, DEFAULT_OUTPUT},
    iconlist::IconName,
    logging,
};
use std::{fs, path::PathBuf};

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Icon names, in codepoint order
    icons: Vec<String>,

    /// Codepoint table written by iconforge. Takes precedence over --codepoint-base.
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Template ttf/otf the icons are added to
    #[arg(long, default_value = "Base.ttf")]
    base_font: PathBuf,

    /// Directory holding <icon>.svg files
    #[arg(short, long, default_value = ".")]
    svg_dir: PathBuf,

    /// Font file to write
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// First codepoint when no manifest is given
    #[arg(short = 'b', long, default_value = "ascii")]
    codepoint_base: CodepointBase,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn codepoint_table(&self) -> Result<CodepointTable> {
        let icons: Vec<IconName> = self.icons.iter().map(|name| IconName::new(name)).collect();
        let Some(manifest) = &self.manifest else {
            return CodepointTable::assign(&icons, self.codepoint_base)
                .context("Failed to assign codepoints");
        };
        let json = fs::read_to_string(manifest)
            .with_context(|| format!("Failed to read manifest {manifest:?}"))?;
        let table = CodepointTable::from_json(&json)
            .with_context(|| format!("Failed to parse manifest {manifest:?}"))?;
        table
            .check_icons(&icons)
            .with_context(|| format!("Icons given on the command line don't match {manifest:?}"))?;
        Ok(table)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::setup(args.verbose);

    let table = args.codepoint_table()?;
    tracing::info!(
        "Importing {} icons from {:?} into {:?}",
        table.len(),
        args.svg_dir,
        args.base_font
    );
    font_import::import_icons_to_file(&args.base_font, &table, &args.svg_dir, &args.output)
        .with_context(|| format!("Failed to build {:?}", args.output))?;
    println!("Wrote {:?}", args.output);
    Ok(())
}
