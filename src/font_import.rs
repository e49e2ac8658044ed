//! Builds the icon font from a template font and the icon svgs.
//!
//! Every icon of a [`CodepointTable`] is imported into the glyph mapped at its
//! codepoint. If the template has no glyph there a new one is appended, named after
//! the icon. Outlines are scaled into the em square, their contour directions
//! corrected and overlaps removed before they become TrueType glyphs.
//!
//! The driver doesn't call this directly; it runs a wrapper script
//! ([`FontImportScript`]) which launches the `iconforge-import` binary.
use crate::{
    codepoints::CodepointTable,
    error::{DriverError, FontImportError, SvgImportError},
    outline,
    pens::BezPathPen,
    svg_outline::{self, SvgOutline},
};
use kurbo::{BezPath, PathEl, Point};
use serde::{Deserialize, Serialize};
use skrifa::{
    instance::{LocationRef, Size},
    outline::DrawSettings,
    raw::TableProvider,
    FontRef, GlyphId, MetadataProvider, Tag,
};
use std::{
    collections::BTreeMap,
    fmt::Debug,
    path::{Path, PathBuf},
    process::Command,
};
use write_fonts::{
    from_obj::ToOwnedTable,
    read::{tables::glyf::CurvePoint, FontRef as TemplateRef, TableProvider as _},
    tables::{
        cmap::Cmap,
        glyf::{Bbox, Contour, GlyfLocaBuilder, Glyph, SimpleGlyph},
        head::Head,
        hhea::Hhea,
        hmtx::Hmtx,
        loca::LocaFormat,
        maxp::Maxp,
        os2::Os2,
        post::Post,
        vmtx::LongMetric,
    },
    types::{FWord, GlyphId as OutputGlyphId, Tag as OutputTag, UfWord},
    FontBuilder,
};

/// Environment variable carrying the manifest path to the wrapper script.
pub const MANIFEST_ENV: &str = "ICONFORGE_MANIFEST";
/// Environment variable carrying the svg directory to the wrapper script.
pub const SVG_DIR_ENV: &str = "ICONFORGE_SVG_DIR";

pub const DEFAULT_SCRIPT: &str = "run_font_import.sh";
pub const DEFAULT_OUTPUT: &str = "Icons.ttf";

/// Max deviation, in font units, of the quadratic approximation of a cubic.
const QUAD_ACCURACY: f64 = 1.0;

/// Tables written from scratch.
const REBUILT_TABLES: [OutputTag; 9] = [
    OutputTag::new(b"glyf"),
    OutputTag::new(b"loca"),
    OutputTag::new(b"hmtx"),
    OutputTag::new(b"hhea"),
    OutputTag::new(b"maxp"),
    OutputTag::new(b"head"),
    OutputTag::new(b"cmap"),
    OutputTag::new(b"post"),
    OutputTag::new(b"OS/2"),
];

/// Template tables that would be stale once outlines change.
const DROPPED_TABLES: [OutputTag; 9] = [
    OutputTag::new(b"CFF "),
    OutputTag::new(b"CFF2"),
    OutputTag::new(b"VORG"),
    OutputTag::new(b"hdmx"),
    OutputTag::new(b"LTSH"),
    OutputTag::new(b"VDMX"),
    OutputTag::new(b"DSIG"),
    OutputTag::new(b"vhea"),
    OutputTag::new(b"vmtx"),
];

/// Runs `<shell> <script> <icon>...` once for the whole table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontImportScript {
    pub shell: PathBuf,
    pub script: PathBuf,
}

impl Default for FontImportScript {
    fn default() -> Self {
        FontImportScript {
            shell: PathBuf::from("bash"),
            script: PathBuf::from(DEFAULT_SCRIPT),
        }
    }
}

impl FontImportScript {
    fn command(&self, table: &CodepointTable, env: &ScriptEnv) -> Command {
        let mut cmd = Command::new(&self.shell);
        cmd.arg(&self.script)
            .args(table.names().map(|name| name.as_str()));
        if let Some(manifest) = env.manifest {
            cmd.env(MANIFEST_ENV, manifest);
        }
        if let Some(svg_dir) = env.svg_dir {
            cmd.env(SVG_DIR_ENV, svg_dir);
        }
        cmd
    }

    /// Blocks until the script exits. A non-zero exit is an error.
    pub fn run(&self, table: &CodepointTable, env: &ScriptEnv) -> Result<(), DriverError> {
        tracing::debug!("Running {:?} {:?} for {} icons", self.shell, self.script, table.len());
        let status = self
            .command(table, env)
            .status()
            .map_err(|e| DriverError::FontImportSpawn(self.shell.clone(), e))?;
        if !status.success() {
            return Err(DriverError::FontImportFailed(self.script.clone(), status));
        }
        Ok(())
    }
}

/// Paths exported to the wrapper script, when known.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptEnv<'a> {
    pub manifest: Option<&'a Path>,
    pub svg_dir: Option<&'a Path>,
}

/// One glyph of the font being built.
struct GlyphSlot {
    name: String,
    path: BezPath,
    advance: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Bounds {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

impl Bounds {
    fn union(self, other: Bounds) -> Bounds {
        Bounds {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }
}

/// A glyph ready for `glyf`, plus what the other tables need to know about it.
pub(crate) struct CompiledGlyph {
    pub glyph: Glyph,
    pub bounds: Option<Bounds>,
    pub num_points: usize,
    pub num_contours: usize,
}

fn ot_round(v: f64) -> i16 {
    (v + 0.5).floor().clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

fn round_point(p: Point) -> (i16, i16) {
    (ot_round(p.x), ot_round(p.y))
}

/// (x, y, on curve) for a closed, quadratic contour.
fn contour_points(contour: &BezPath) -> Vec<(i16, i16, bool)> {
    let mut points = Vec::new();
    for el in contour.elements() {
        match *el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => {
                let (x, y) = round_point(p);
                points.push((x, y, true));
            }
            PathEl::QuadTo(c, p) => {
                let (cx, cy) = round_point(c);
                let (x, y) = round_point(p);
                points.push((cx, cy, false));
                points.push((x, y, true));
            }
            // to_quadratic leaves no cubics behind, keep the end point regardless
            PathEl::CurveTo(_, _, p) => {
                let (x, y) = round_point(p);
                points.push((x, y, true));
            }
            PathEl::ClosePath => (),
        }
    }
    // An explicit line back to the start duplicates the first point
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// Converts an outline in font units to a TrueType glyph.
pub(crate) fn compile_glyph(path: &BezPath) -> CompiledGlyph {
    let quadratic = outline::to_quadratic(path, QUAD_ACCURACY);
    let contours: Vec<_> = outline::contours(&quadratic)
        .iter()
        .map(contour_points)
        .filter(|points| !points.is_empty())
        .collect();

    let bounds = contours
        .iter()
        .flatten()
        .map(|&(x, y, _)| Bounds {
            x_min: x,
            y_min: y,
            x_max: x,
            y_max: y,
        })
        .reduce(Bounds::union);
    let Some(bounds) = bounds else {
        return CompiledGlyph {
            glyph: Glyph::Empty,
            bounds: None,
            num_points: 0,
            num_contours: 0,
        };
    };

    let num_points = contours.iter().map(Vec::len).sum();
    let num_contours = contours.len();
    let contours = contours
        .into_iter()
        .map(|points| {
            points
                .into_iter()
                .map(|(x, y, on_curve)| {
                    if on_curve {
                        CurvePoint::on_curve(x, y)
                    } else {
                        CurvePoint::off_curve(x, y)
                    }
                })
                .collect::<Vec<_>>()
        })
        .map(Contour::from)
        .collect();
    let glyph = SimpleGlyph {
        bbox: Bbox {
            x_min: bounds.x_min,
            y_min: bounds.y_min,
            x_max: bounds.x_max,
            y_max: bounds.y_max,
        },
        contours,
        instructions: Vec::new(),
    };
    CompiledGlyph {
        glyph: Glyph::Simple(glyph),
        bounds: Some(bounds),
        num_points,
        num_contours,
    }
}

/// Places an svg outline in the em square, corrects contour direction and
/// removes overlaps.
pub fn import_outline(svg: &SvgOutline, upem: u16, descender: i16) -> BezPath {
    let mut path = svg.path.clone();
    path.apply_affine(svg.em_transform(upem, descender));
    let path = outline::correct_direction(&path);
    outline::remove_overlaps(&path)
}

fn default_glyph_name(gid: u32) -> String {
    if gid == 0 {
        ".notdef".to_string()
    } else {
        format!("glyph{gid:05}")
    }
}

fn template_glyphs(font: &FontRef) -> Result<Vec<GlyphSlot>, FontImportError> {
    let num_glyphs = font
        .maxp()
        .map_err(|e| FontImportError::ReadError("maxp", e))?
        .num_glyphs();
    let names = font.glyph_names();
    let metrics = font.glyph_metrics(Size::unscaled(), LocationRef::default());
    let outlines = font.outline_glyphs();

    (0..num_glyphs as u32)
        .map(|gid| {
            let glyph_id = GlyphId::new(gid);
            let mut pen = BezPathPen::new();
            if let Some(outline) = outlines.get(glyph_id) {
                outline
                    .draw(
                        DrawSettings::unhinted(Size::unscaled(), LocationRef::default()),
                        &mut pen,
                    )
                    .map_err(|e| FontImportError::DrawError(gid, e))?;
            }
            let name = names
                .get(glyph_id)
                .map(|n| n.as_str().to_string())
                .unwrap_or_else(|| default_glyph_name(gid));
            let advance = metrics
                .advance_width(glyph_id)
                .unwrap_or_default()
                .round()
                .clamp(0.0, u16::MAX as f32) as u16;
            Ok(GlyphSlot {
                name,
                path: pen.into_inner(),
                advance,
            })
        })
        .collect()
}

/// Recomputes the OS/2 fields that depend on the glyph set and the cmap.
fn update_os2(os2: &mut Os2, glyphs: &[GlyphSlot], cmap: &BTreeMap<u32, usize>) {
    let first = cmap.keys().next().copied().unwrap_or_default();
    let last = cmap.keys().next_back().copied().unwrap_or_default();
    os2.us_first_char_index = first.min(0xFFFF) as u16;
    os2.us_last_char_index = last.min(0xFFFF) as u16;

    let advances: Vec<u64> = glyphs
        .iter()
        .map(|g| g.advance as u64)
        .filter(|advance| *advance > 0)
        .collect();
    if !advances.is_empty() {
        let average = advances.iter().sum::<u64>() as f64 / advances.len() as f64;
        os2.x_avg_char_width = average.round().min(i16::MAX as f64) as i16;
    }
}

fn compile_error(table: &'static str, e: impl Debug) -> FontImportError {
    FontImportError::CompileError(table, format!("{e:?}"))
}

/// Imports every icon of `table` from `<svg_dir>/<name>.svg` into a copy of
/// `template` and returns the new font's bytes.
pub fn import_icons(
    template: &[u8],
    table: &CodepointTable,
    svg_dir: &Path,
) -> Result<Vec<u8>, FontImportError> {
    let font = FontRef::new(template).map_err(|e| FontImportError::ReadError("font", e))?;
    if font.table_data(Tag::new(b"fvar")).is_some() {
        return Err(FontImportError::VariableTemplate);
    }
    let upem = font
        .head()
        .map_err(|e| FontImportError::ReadError("head", e))?
        .units_per_em();
    let descender = font
        .hhea()
        .map_err(|e| FontImportError::ReadError("hhea", e))?
        .descender()
        .to_i16();

    let mut glyphs = template_glyphs(&font)?;
    let mut cmap: BTreeMap<u32, usize> = font
        .charmap()
        .mappings()
        .map(|(codepoint, gid)| (codepoint, gid.to_u32() as usize))
        .filter(|(_, gid)| *gid < glyphs.len())
        .collect();

    for assignment in table {
        let name = &assignment.name;
        let svg_path = svg_dir.join(name.svg_file_name());
        let svg = std::fs::read_to_string(&svg_path).map_err(|e| {
            FontImportError::SvgError(name.clone(), SvgImportError::ReadError(svg_path.clone(), e))
        })?;
        let svg = svg_outline::parse_svg(&svg)
            .map_err(|e| FontImportError::SvgError(name.clone(), e))?;
        let slot = GlyphSlot {
            name: name.to_string(),
            path: import_outline(&svg, upem, descender),
            advance: svg.advance_width(upem),
        };

        let codepoint = assignment.codepoint as u32;
        match cmap.get(&codepoint) {
            Some(&gid) if gid != 0 => {
                tracing::debug!("{name}: replacing glyph {gid} at U+{codepoint:04X}");
                glyphs[gid] = slot;
            }
            _ => {
                glyphs.push(slot);
                tracing::debug!("{name}: new glyph {} at U+{codepoint:04X}", glyphs.len() - 1);
                cmap.insert(codepoint, glyphs.len() - 1);
            }
        }
    }

    if glyphs.len() > u16::MAX as usize {
        return Err(FontImportError::TooManyGlyphs(glyphs.len()));
    }
    build_font(template, &glyphs, &cmap)
}

fn build_font(
    template: &[u8],
    glyphs: &[GlyphSlot],
    cmap: &BTreeMap<u32, usize>,
) -> Result<Vec<u8>, FontImportError> {
    let source = TemplateRef::new(template).map_err(|e| compile_error("font", e))?;
    let num_glyphs = glyphs.len() as u16;

    let mut glyf_builder = GlyfLocaBuilder::new();
    let mut h_metrics = Vec::with_capacity(glyphs.len());
    let mut font_bounds: Option<Bounds> = None;
    let (mut max_points, mut max_contours) = (0usize, 0usize);
    let (mut min_lsb, mut min_rsb, mut max_extent) = (i16::MAX, i16::MAX, i16::MIN);
    let mut max_advance = 0u16;

    for slot in glyphs {
        let compiled = compile_glyph(&slot.path);
        let lsb = match compiled.bounds {
            Some(bounds) => {
                font_bounds = Some(font_bounds.map_or(bounds, |b| b.union(bounds)));
                let rsb = slot.advance as i32 - bounds.x_max as i32;
                min_lsb = min_lsb.min(bounds.x_min);
                min_rsb = min_rsb.min(rsb.clamp(i16::MIN as i32, i16::MAX as i32) as i16);
                max_extent = max_extent.max(bounds.x_max);
                bounds.x_min
            }
            None => 0,
        };
        max_points = max_points.max(compiled.num_points);
        max_contours = max_contours.max(compiled.num_contours);
        max_advance = max_advance.max(slot.advance);
        glyf_builder
            .add_glyph(&compiled.glyph)
            .map_err(|e| compile_error("glyf", e))?;
        h_metrics.push(LongMetric::new(slot.advance, lsb));
    }
    let (glyf, loca, loca_format) = glyf_builder.build();

    let font_bounds = font_bounds.unwrap_or_default();
    let mut head: Head = source
        .head()
        .map_err(|e| compile_error("head", e))?
        .to_owned_table();
    head.x_min = font_bounds.x_min;
    head.y_min = font_bounds.y_min;
    head.x_max = font_bounds.x_max;
    head.y_max = font_bounds.y_max;
    head.index_to_loc_format = match loca_format {
        LocaFormat::Short => 0,
        LocaFormat::Long => 1,
    };

    let mut hhea: Hhea = source
        .hhea()
        .map_err(|e| compile_error("hhea", e))?
        .to_owned_table();
    hhea.number_of_h_metrics = num_glyphs;
    hhea.advance_width_max = UfWord::new(max_advance);
    if font_bounds != Bounds::default() || min_lsb != i16::MAX {
        hhea.min_left_side_bearing = FWord::new(min_lsb);
        hhea.min_right_side_bearing = FWord::new(min_rsb);
        hhea.x_max_extent = FWord::new(max_extent);
    }

    let mut maxp: Maxp = source
        .maxp()
        .map_err(|e| compile_error("maxp", e))?
        .to_owned_table();
    maxp.num_glyphs = num_glyphs;
    if maxp.max_points.is_some() {
        maxp.max_points = Some(max_points.min(u16::MAX as usize) as u16);
        maxp.max_contours = Some(max_contours.min(u16::MAX as usize) as u16);
    }

    let hmtx = Hmtx::new(h_metrics, Vec::new());

    let mut post = Post::new_v2(glyphs.iter().map(|g| g.name.as_str()));
    if let Ok(template_post) = source.post() {
        let template_post: Post = template_post.to_owned_table();
        post.italic_angle = template_post.italic_angle;
        post.underline_position = template_post.underline_position;
        post.underline_thickness = template_post.underline_thickness;
        post.is_fixed_pitch = template_post.is_fixed_pitch;
    }

    let os2 = match source.os2() {
        Ok(os2) => {
            let mut os2: Os2 = os2.to_owned_table();
            update_os2(&mut os2, glyphs, cmap);
            Some(os2)
        }
        Err(e) => {
            if source.table_data(OutputTag::new(b"OS/2")).is_some() {
                tracing::warn!("Dropping unreadable OS/2 table: {e}");
            }
            None
        }
    };

    let cmap = Cmap::from_mappings(cmap.iter().filter_map(|(codepoint, gid)| {
        Some((char::from_u32(*codepoint)?, OutputGlyphId::new(*gid as u32)))
    }))
    .map_err(|e| compile_error("cmap", e))?;

    let mut builder = FontBuilder::new();
    builder.add_table(&head).map_err(|e| compile_error("head", e))?;
    builder.add_table(&hhea).map_err(|e| compile_error("hhea", e))?;
    builder.add_table(&maxp).map_err(|e| compile_error("maxp", e))?;
    builder.add_table(&hmtx).map_err(|e| compile_error("hmtx", e))?;
    builder.add_table(&glyf).map_err(|e| compile_error("glyf", e))?;
    builder.add_table(&loca).map_err(|e| compile_error("loca", e))?;
    builder.add_table(&cmap).map_err(|e| compile_error("cmap", e))?;
    builder.add_table(&post).map_err(|e| compile_error("post", e))?;
    if let Some(os2) = &os2 {
        builder.add_table(os2).map_err(|e| compile_error("OS/2", e))?;
    }
    for record in source.table_directory.table_records() {
        let tag = record.tag();
        if REBUILT_TABLES.contains(&tag) || DROPPED_TABLES.contains(&tag) {
            continue;
        }
        if let Some(data) = source.table_data(tag) {
            builder.add_raw(tag, data.as_bytes());
        }
    }
    tracing::debug!("Built font with {num_glyphs} glyphs");
    Ok(builder.build())
}

/// Reads the template, imports `table` and writes the result to `output`.
pub fn import_icons_to_file(
    template_path: &Path,
    table: &CodepointTable,
    svg_dir: &Path,
    output: &Path,
) -> Result<(), FontImportError> {
    let template = std::fs::read(template_path)
        .map_err(|e| FontImportError::IoError(template_path.to_path_buf(), e))?;
    let font = import_icons(&template, table, svg_dir)?;
    std::fs::write(output, font).map_err(|e| FontImportError::IoError(output.to_path_buf(), e))
}
