use std::{path::PathBuf, process::ExitStatus};

use thiserror::Error;

use crate::iconlist::IconName;

#[derive(Error, Debug)]
pub enum IconListError {
    #[error("Unable to read icon list {0:?}: {1}")]
    ReadError(PathBuf, std::io::Error),
    #[error("Blank line {0} in icon list, it would shift the codepoints of the icons after it")]
    BlankLine(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodepointError {
    #[error("Icon '{0}' at index {1} overflows the codepoint range")]
    Overflow(IconName, usize),
    #[error("Icon '{0}' would be assigned 0x{1:04x}, which is not a valid character")]
    InvalidCharacter(IconName, u32),
    #[error("'{0}' is not a codepoint base; use a number, 'ascii' or 'private-use'")]
    UnknownBase(String),
    #[error("Icon {0} is '{1}' in the codepoint table but '{2}' was given")]
    IconMismatch(usize, IconName, IconName),
    #[error("The codepoint table lists {0} icons but {1} were given")]
    CountMismatch(usize, usize),
}

#[derive(Debug, Error)]
pub enum StrokeToPathError {
    #[error("Unable to spawn {0:?}: {1}")]
    SpawnError(PathBuf, std::io::Error),
    #[error("Unable to wait on the converter: {0}")]
    WaitError(std::io::Error),
    #[error("Converter exited with {0}: {1}")]
    Failed(ExitStatus, String),
}

#[derive(Debug, Error)]
pub enum SvgImportError {
    #[error("Unable to read {0:?}: {1}")]
    ReadError(PathBuf, std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid SVG: {0}")]
    InvalidSvg(String),
}

#[derive(Debug, Error)]
pub enum FontImportError {
    #[error("Unable to read {0}: {1}")]
    ReadError(&'static str, skrifa::raw::ReadError),
    #[error("Unable to import '{0}': {1}")]
    SvgError(IconName, SvgImportError),
    #[error("Unable to draw template glyph {0}: {1}")]
    DrawError(u32, skrifa::outline::DrawError),
    #[error("Variable fonts are not supported as templates")]
    VariableTemplate,
    #[error("Too many glyphs: {0}")]
    TooManyGlyphs(usize),
    #[error("Unable to build {0}: {1}")]
    CompileError(&'static str, String),
    #[error("{0:?}: {1}")]
    IoError(PathBuf, std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read config {0:?}: {1}")]
    ReadError(PathBuf, std::io::Error),
    #[error("Invalid config {0:?}: {1}")]
    ParseError(PathBuf, serde_yaml::Error),
    #[error("No svg directory configured")]
    MissingSvgDir,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    IconList(#[from] IconListError),
    #[error(transparent)]
    Codepoint(#[from] CodepointError),
    #[error("Stroke to path failed for {}", .0.join(", "))]
    StrokeToPath(Vec<String>),
    #[error("Unable to spawn {0:?}: {1}")]
    FontImportSpawn(PathBuf, std::io::Error),
    #[error("Font import script {0:?} exited with {1}")]
    FontImportFailed(PathBuf, ExitStatus),
    #[error("Unable to write {0:?}: {1}")]
    WriteError(PathBuf, std::io::Error),
    #[error("Unable to write manifest: {0}")]
    ManifestError(#[from] serde_json::Error),
    #[error("Unable to render the icon module: {0}")]
    RenderError(#[from] std::fmt::Error),
}
