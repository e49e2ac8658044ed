pub mod codegen;
pub mod codepoints;
pub mod config;
pub mod driver;
pub mod error;
pub mod font_import;
pub mod iconlist;
pub mod logging;
pub mod outline;
mod pens;
pub mod stroke;
pub mod svg_outline;
#[cfg(test)]
mod test_utils;
