//! Assignment of icons to codepoints.
//!
//! Icon `i` of the list receives `base + i`. The table is computed once and then
//! shared by the font import and the source generation so the two artifacts can't
//! disagree. Across the process boundary to the font import helper it travels as a
//! JSON manifest.
use crate::{error::CodepointError, iconlist::IconName};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, str::FromStr};

/// The first codepoint handed out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BaseSpec", into = "u32")]
pub struct CodepointBase(u32);

impl CodepointBase {
    /// Lowercase ascii letters, `a` onward.
    pub const ASCII: CodepointBase = CodepointBase(0x61);
    /// Inside the BMP private use area.
    pub const PRIVATE_USE: CodepointBase = CodepointBase(0xF102);

    pub const fn new(base: u32) -> Self {
        CodepointBase(base)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for CodepointBase {
    fn default() -> Self {
        CodepointBase::ASCII
    }
}

impl fmt::Display for CodepointBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<CodepointBase> for u32 {
    fn from(base: CodepointBase) -> Self {
        base.0
    }
}

/// Accepts `ascii`, `private-use`, decimal or `0x` prefixed hex.
impl FromStr for CodepointBase {
    type Err = CodepointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "ascii" => return Ok(CodepointBase::ASCII),
            "private-use" | "pua" => return Ok(CodepointBase::PRIVATE_USE),
            _ => (),
        }
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => s.parse(),
        };
        parsed
            .map(CodepointBase)
            .map_err(|_| CodepointError::UnknownBase(s.to_string()))
    }
}

/// Config files may spell the base as a number or a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum BaseSpec {
    Number(u32),
    Text(String),
}

impl TryFrom<BaseSpec> for CodepointBase {
    type Error = CodepointError;

    fn try_from(spec: BaseSpec) -> Result<Self, Self::Error> {
        match spec {
            BaseSpec::Number(n) => Ok(CodepointBase(n)),
            BaseSpec::Text(s) => s.parse(),
        }
    }
}

/// One icon and the character it is drawn at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphAssignment {
    pub name: IconName,
    pub codepoint: char,
}

/// The ordered icon to codepoint mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodepointTable {
    base: CodepointBase,
    assignments: Vec<GlyphAssignment>,
}

impl CodepointTable {
    /// Assigns `base + i` to the icon at index `i`.
    pub fn assign(icons: &[IconName], base: CodepointBase) -> Result<Self, CodepointError> {
        let assignments = icons
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let raw = u32::try_from(i)
                    .ok()
                    .and_then(|i| base.get().checked_add(i))
                    .ok_or_else(|| CodepointError::Overflow(name.clone(), i))?;
                let codepoint = char::from_u32(raw)
                    .ok_or_else(|| CodepointError::InvalidCharacter(name.clone(), raw))?;
                Ok(GlyphAssignment {
                    name: name.clone(),
                    codepoint,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CodepointTable { base, assignments })
    }

    pub fn base(&self) -> CodepointBase {
        self.base
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GlyphAssignment> {
        self.assignments.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &IconName> {
        self.assignments.iter().map(|a| &a.name)
    }

    /// Checks that the table lists exactly `icons`, in order.
    ///
    /// An empty `icons` means none were given and always passes.
    pub fn check_icons(&self, icons: &[IconName]) -> Result<(), CodepointError> {
        if icons.is_empty() {
            return Ok(());
        }
        let mismatch = self
            .names()
            .zip(icons)
            .enumerate()
            .find(|(_, (listed, given))| listed != given);
        if let Some((index, (listed, given))) = mismatch {
            return Err(CodepointError::IconMismatch(
                index,
                listed.clone(),
                given.clone(),
            ));
        }
        if self.len() != icons.len() {
            return Err(CodepointError::CountMismatch(self.len(), icons.len()));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn write_manifest(&self, path: &Path) -> Result<(), crate::error::DriverError> {
        let json = self.to_json()?;
        std::fs::write(path, json)
            .map_err(|e| crate::error::DriverError::WriteError(path.to_path_buf(), e))
    }
}

impl<'a> IntoIterator for &'a CodepointTable {
    type Item = &'a GlyphAssignment;
    type IntoIter = std::slice::Iter<'a, GlyphAssignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.assignments.iter()
    }
}
