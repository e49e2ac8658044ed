//! Produces the Rust `Icon` enum for a codepoint table.
//!
//! The output is a self contained module: one variant per icon, a `const fn`
//! mapping each variant to its character and a `Display` impl writing that
//! character. Output is deterministic, the same table always renders the same bytes.
use crate::codepoints::{CodepointTable, GlyphAssignment};
use std::fmt::Write;

pub const DEFAULT_HEADER: &str = "Selected bootstrap icons.";

/// `arrow-left` => `ArrowLeft`.
///
/// The first letter of every hyphen separated word is uppercased and the rest
/// lowercased. A name that would start with a digit gets a leading `_` so it stays
/// a valid identifier: `1-circle` => `_1Circle`, `dice-1` => `Dice1`.
pub fn kebab_to_upper_camel(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 1);
    let mut capitalize_next = true;
    for c in s.chars() {
        if c == '-' {
            capitalize_next = true;
            continue;
        }
        if result.is_empty() && c.is_ascii_digit() {
            result.push('_');
        }
        if capitalize_next {
            result.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            result.extend(c.to_lowercase());
        }
    }
    result
}

fn write_variant(rust: &mut String, assignment: &GlyphAssignment) -> Result<(), std::fmt::Error> {
    writeln!(rust, "\t/// {}", assignment.name)?;
    writeln!(rust, "\t{},", kebab_to_upper_camel(assignment.name.as_str()))
}

fn write_match_arm(rust: &mut String, assignment: &GlyphAssignment) -> Result<(), std::fmt::Error> {
    writeln!(
        rust,
        "\t\tIcon::{} => '\\u{{{:x}}}',",
        kebab_to_upper_camel(assignment.name.as_str()),
        assignment.codepoint as u32
    )
}

/// Renders the icon module for `table`.
///
/// `header` becomes the first sentence of the module doc comment.
pub fn render_icon_module(table: &CodepointTable, header: &str) -> Result<String, std::fmt::Error> {
    let mut rust = String::new();
    writeln!(
        rust,
        "//! {header} Machine generated code. Do not change!"
    )?;
    writeln!(rust)?;
    writeln!(rust, "/// Icons")?;
    writeln!(rust, "#[derive(Copy, Clone, Debug, Hash)]")?;
    writeln!(rust, "pub enum Icon {{")?;
    for assignment in table {
        write_variant(&mut rust, assignment)?;
    }
    writeln!(rust, "}}")?;
    writeln!(rust)?;
    writeln!(rust, "/// Converts an icon into a char.")?;
    writeln!(rust, "#[must_use]")?;
    writeln!(rust, "#[allow(clippy::too_many_lines)]")?;
    writeln!(rust, "pub const fn icon_to_char(icon: Icon) -> char {{")?;
    writeln!(rust, "\tmatch icon {{")?;
    for assignment in table {
        write_match_arm(&mut rust, assignment)?;
    }
    writeln!(rust, "\t}}")?;
    writeln!(rust, "}}")?;
    writeln!(rust)?;
    writeln!(rust, "impl std::fmt::Display for Icon {{")?;
    writeln!(
        rust,
        "\tfn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {{"
    )?;
    writeln!(rust, "\t\tuse std::fmt::Write;")?;
    writeln!(rust, "\t\tf.write_char(icon_to_char(*self))")?;
    writeln!(rust, "\t}}")?;
    writeln!(rust, "}}")?;
    Ok(rust)
}
