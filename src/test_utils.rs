use std::iter::FromIterator;
use std::path::PathBuf;

use kurbo::BezPath;
use write_fonts::{
    tables::{
        cmap::Cmap,
        glyf::{GlyfLocaBuilder, Glyph},
        head::Head,
        hhea::Hhea,
        hmtx::Hmtx,
        loca::LocaFormat,
        maxp::Maxp,
        os2::Os2,
        post::Post,
        vmtx::LongMetric,
    },
    types::{FWord, GlyphId, Tag},
    FontBuilder,
};

use crate::font_import::compile_glyph;

#[track_caller]
pub fn assert_file_eq_impl(actual: &str, file: &str) {
    let expected_path = PathBuf::from_iter(["resources/testdata", file]);
    let expected = std::fs::read_to_string(&expected_path)
        .inspect_err(|err| eprintln!("Failed to read {expected_path:?}: {err}"))
        .unwrap_or_default();
    if actual == expected {
        return;
    }
    let update_expected = std::env::var("UPDATE_EXPECTED").is_ok();
    if update_expected {
        if let Err(err) = std::fs::write(&expected_path, actual) {
            eprintln!("Failed to update expected at {expected_path:?}\n{err}");
        }
    } else {
        assert_eq!(
            actual, expected,
            "Actual string did not match contents of {expected_path:?}.\n\
             Use `UPDATE_EXPECTED=1 cargo test` to regenerate expected output.\n\
             UPDATE_EXPECTED is set: {update_expected:?}"
        );
    }
}

/// Asserts that the given string matches the contents of a file in `resources/testdata`.
#[macro_export]
macro_rules! assert_file_eq {
    ($actual:expr, $expected_file:expr) => {
        $crate::test_utils::assert_file_eq_impl(&$actual, $expected_file);
    };
}

/// Asserts that an expression matches a pattern.
///
/// ## Example
///
/// ```
/// let result = Ok(1);
/// assert_matches!(result, Ok(_));
/// ```
///
/// TODO: Remove this macro once std::assert_matches! is stable.
/// See: https://doc.rust-lang.org/std/assert_matches/macro.assert_matches.html
#[macro_export]
macro_rules! assert_matches {
    ($expression:expr, $pattern:pat) => {
        // We allow redundant pattern matching since the debug output is sometimes more useful. We
        // want "Got <error> and expected .." instead of "failed val.is_ok()".
        #[allow(clippy::redundant_pattern_matching)]
        if !(matches!($expression, $pattern)) {
            let res = $expression;
            panic!(
                "assertion failed: {expr} result {res:?} does not match {pattern}",
                expr = stringify!($expression),
                pattern = stringify!($pattern)
            );
        }
    };
}

fn template_builder() -> FontBuilder<'static> {
    // A 600 wide "a": a 400 unit square, 100 in from the left
    let mut square = BezPath::new();
    square.move_to((100.0, 0.0));
    square.line_to((100.0, 400.0));
    square.line_to((500.0, 400.0));
    square.line_to((500.0, 0.0));
    square.close_path();

    let mut glyf_builder = GlyfLocaBuilder::new();
    glyf_builder.add_glyph(&Glyph::Empty).unwrap();
    glyf_builder
        .add_glyph(&compile_glyph(&square).glyph)
        .unwrap();
    let (glyf, loca, loca_format) = glyf_builder.build();

    let head = Head {
        units_per_em: 1000,
        x_min: 100,
        x_max: 500,
        y_max: 400,
        index_to_loc_format: match loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        },
        ..Default::default()
    };
    let hhea = Hhea {
        ascender: FWord::new(800),
        descender: FWord::new(-200),
        number_of_h_metrics: 2,
        ..Default::default()
    };
    let maxp = Maxp {
        num_glyphs: 2,
        ..Default::default()
    };
    let hmtx = Hmtx::new(
        vec![LongMetric::new(500, 0), LongMetric::new(600, 100)],
        Vec::new(),
    );
    let cmap = Cmap::from_mappings([('a', GlyphId::new(1))]).unwrap();
    let post = Post::new_v2([".notdef", "a"]);

    let mut builder = FontBuilder::new();
    builder
        .add_table(&head)
        .unwrap()
        .add_table(&hhea)
        .unwrap()
        .add_table(&maxp)
        .unwrap()
        .add_table(&hmtx)
        .unwrap()
        .add_table(&glyf)
        .unwrap()
        .add_table(&loca)
        .unwrap()
        .add_table(&cmap)
        .unwrap()
        .add_table(&post)
        .unwrap();
    builder
}

/// Upem 1000, descender -200: an empty .notdef and a square "a" mapped to 'a'.
pub fn template_font() -> Vec<u8> {
    template_builder().build()
}

/// [`template_font`] with an (empty) fvar table.
pub fn variable_template_font() -> Vec<u8> {
    let mut builder = template_builder();
    builder.add_raw(Tag::new(b"fvar"), vec![0u8; 16]);
    builder.build()
}

/// [`template_font`] with an OS/2 table for 'a' only and raw vhea/vmtx tables.
pub fn template_font_with_os2_and_vertical_metrics() -> Vec<u8> {
    let os2 = Os2 {
        x_avg_char_width: 550,
        us_weight_class: 700,
        us_first_char_index: 0x61,
        us_last_char_index: 0x61,
        ..Default::default()
    };
    let mut builder = template_builder();
    builder.add_table(&os2).unwrap();
    builder.add_raw(Tag::new(b"vhea"), vec![0u8; 36]);
    builder.add_raw(Tag::new(b"vmtx"), vec![0u8; 8]);
    builder.build()
}
