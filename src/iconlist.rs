//! Reading the ordered list of icons to build.
//!
//! The list is a plain text file with one icon name per line. The order of the
//! lines decides which codepoint each icon receives, see [`crate::codepoints`].
use crate::error::IconListError;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::{fmt, path::Path};

/// The name of an icon, e.g. `arrow-left`. Also the stem of its SVG file.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconName(SmolStr);

impl IconName {
    pub fn new(name: &str) -> Self {
        IconName(SmolStr::new(name))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The file name of the icon's SVG, `<name>.svg`.
    pub fn svg_file_name(&self) -> String {
        format!("{}.svg", self.0)
    }
}

impl fmt::Display for IconName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for IconName {
    fn from(value: &str) -> Self {
        IconName::new(value)
    }
}

/// Parses icon names, one per line, trimming surrounding whitespace.
///
/// A blank line between names is an error: icon *i* gets codepoint `base + i`,
/// so a silently skipped line would shift every icon after it away from its line
/// number. Blank lines after the last name are ignored.
pub fn parse_icon_list(content: &str) -> Result<Vec<IconName>, IconListError> {
    let mut icons = Vec::new();
    let mut blank_line = None;
    for (line_no, line) in content.lines().enumerate() {
        let name = line.trim();
        if name.is_empty() {
            blank_line.get_or_insert(line_no + 1);
            continue;
        }
        if let Some(blank_line) = blank_line {
            return Err(IconListError::BlankLine(blank_line));
        }
        icons.push(IconName::new(name));
    }
    Ok(icons)
}

pub fn read_icon_list(path: &Path) -> Result<Vec<IconName>, IconListError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| IconListError::ReadError(path.to_path_buf(), e))?;
    let icons = parse_icon_list(&content)?;
    tracing::debug!("Read {} icons from {:?}", icons.len(), path);
    Ok(icons)
}
