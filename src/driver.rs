//! The build pipeline: icon list, stroke to path, font import, rust source.
use crate::{
    codegen::render_icon_module,
    codepoints::CodepointTable,
    config::Config,
    error::DriverError,
    font_import::ScriptEnv,
    iconlist::{read_icon_list, IconName},
    stroke::StrokeOutcome,
};
use std::path::Path;

/// Which external steps to run. The source file is always generated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Steps {
    pub skip_stroke: bool,
    pub skip_font: bool,
}

/// Converts strokes to paths for every icon and fails if any icon failed.
pub fn stroke_to_path(config: &Config, icons: &[IconName]) -> Result<(), DriverError> {
    let svg_dir = config.svg_dir()?;
    tracing::info!(
        "Converting strokes to paths for {} icons in {svg_dir:?}",
        icons.len()
    );
    let outcomes = config.stroke_to_path.convert_all(svg_dir, icons);
    check_outcomes(&outcomes)
}

fn check_outcomes(outcomes: &[StrokeOutcome]) -> Result<(), DriverError> {
    let failed: Vec<String> = outcomes
        .iter()
        .filter_map(|outcome| match &outcome.result {
            Ok(()) => None,
            Err(e) => {
                tracing::error!("{}: {e}", outcome.icon);
                Some(outcome.icon.to_string())
            }
        })
        .collect();
    if !failed.is_empty() {
        return Err(DriverError::StrokeToPath(failed));
    }
    Ok(())
}

/// Writes the manifest and runs the font import script over the whole table.
pub fn import_font(config: &Config, table: &CodepointTable) -> Result<(), DriverError> {
    let svg_dir = config.svg_dir()?;
    table.write_manifest(&config.manifest)?;
    tracing::info!(
        "Importing {} icons with {:?}",
        table.len(),
        config.font_import.script
    );
    let env = ScriptEnv {
        manifest: Some(config.manifest.as_path()),
        svg_dir: Some(svg_dir),
    };
    config.font_import.run(table, &env)
}

/// Renders the icon module and overwrites `path` with it.
pub fn write_source(config: &Config, table: &CodepointTable, path: &Path) -> Result<(), DriverError> {
    let rust = render_icon_module(table, &config.header)?;
    std::fs::write(path, rust).map_err(|e| DriverError::WriteError(path.to_path_buf(), e))?;
    tracing::info!("Wrote {} icons to {path:?}", table.len());
    Ok(())
}

/// Runs the whole pipeline. Returns the codepoint table both artifacts were built from.
pub fn run(config: &Config, steps: Steps) -> Result<CodepointTable, DriverError> {
    tracing::info!("Reading icons from {:?}", config.icon_list);
    let icons = read_icon_list(&config.icon_list)?;
    let table = CodepointTable::assign(&icons, config.codepoint_base)?;
    tracing::debug!(
        "Assigned {} codepoints starting at {}",
        table.len(),
        table.base()
    );

    if steps.skip_stroke {
        tracing::info!("Skipping stroke to path");
    } else {
        stroke_to_path(config, &icons)?;
    }

    if steps.skip_font {
        tracing::info!("Skipping font import");
    } else {
        import_font(config, &table)?;
    }

    write_source(config, &table, &config.output_source)?;
    Ok(table)
}
