//! Build configuration, read from `iconforge.yaml`.
//!
//! Every key is optional. Command line flags override whatever the file says.
use crate::{
    codegen::DEFAULT_HEADER, codepoints::CodepointBase, error::ConfigError,
    font_import::FontImportScript, stroke::StrokeToPath,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG: &str = "iconforge.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// One icon name per line.
    pub icon_list: PathBuf,
    /// Where `<icon>.svg` files live.
    pub svg_dir: Option<PathBuf>,
    pub stroke_to_path: StrokeToPath,
    pub font_import: FontImportScript,
    /// Codepoint table handed to the font import script.
    pub manifest: PathBuf,
    /// The generated rust module.
    pub output_source: PathBuf,
    pub codepoint_base: CodepointBase,
    /// First line of the generated module's doc comment.
    pub header: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            icon_list: PathBuf::from("list.txt"),
            svg_dir: None,
            stroke_to_path: StrokeToPath::default(),
            font_import: FontImportScript::default(),
            manifest: PathBuf::from("codepoints.json"),
            output_source: PathBuf::from("../../src/icon.rs"),
            codepoint_base: CodepointBase::default(),
            header: DEFAULT_HEADER.to_string(),
        }
    }
}

impl Config {
    pub fn parse(content: &str, path: &Path) -> Result<Config, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))
    }

    /// Loads a YAML config file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;
        let config = Config::parse(&content, path)?;
        tracing::debug!("Loaded config from {path:?}");
        Ok(config)
    }

    /// Loads `path` if given. Otherwise loads [`DEFAULT_CONFIG`] from the working
    /// directory if present, else falls back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
        if let Some(path) = path {
            return Config::load(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG);
        if default_path.is_file() {
            return Config::load(default_path);
        }
        tracing::debug!("No {DEFAULT_CONFIG}, using defaults");
        Ok(Config::default())
    }

    pub fn svg_dir(&self) -> Result<&Path, ConfigError> {
        self.svg_dir.as_deref().ok_or(ConfigError::MissingSvgDir)
    }
}
