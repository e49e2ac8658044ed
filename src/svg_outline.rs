//! Extracts the filled outline of an icon svg.
//!
//! Icons are expected to be simple: after stroke to path conversion everything
//! visible is a filled shape. The svg is resolved with usvg, so presentation
//! attributes, `style`, `<style>` sheets and `<use>` references all count. Filled
//! paths are collected in document order, with every transform applied, into a
//! single [`BezPath`] in svg user units.
use crate::{error::SvgImportError, outline};
use kurbo::{Affine, BezPath, Point, Shape, Size};
use roxmltree::{Document, ParsingOptions};
use usvg::{tiny_skia_path::PathSegment, Group, Node, Options, Tree};

/// The outline of an icon, in svg coordinates (y-down).
#[derive(Clone, Debug)]
pub struct SvgOutline {
    /// Width and height of the svg canvas. The viewBox is already mapped onto it.
    pub size: Size,
    pub path: BezPath,
}

impl SvgOutline {
    /// The transform that maps this outline into a y-up em square of `upem` units
    /// whose bottom sits at `descender`.
    ///
    /// The canvas height scales to `upem`, x starts at 0.
    pub fn em_transform(&self, upem: u16, descender: i16) -> Affine {
        let Size { width, height } = self.size;
        if width == 0.0 || height == 0.0 {
            return Affine::IDENTITY;
        }
        let scale = upem as f64 / height;
        let top = upem as f64 + descender as f64;
        Affine::translate((0.0, top)) * Affine::scale_non_uniform(scale, -scale)
    }

    /// Advance width for the em square chosen by [`Self::em_transform`].
    pub fn advance_width(&self, upem: u16) -> u16 {
        let Size { width, height } = self.size;
        if height == 0.0 {
            return upem;
        }
        (width * upem as f64 / height)
            .round()
            .clamp(0.0, u16::MAX as f64) as u16
    }
}

pub fn parse_svg(svg_content: &str) -> Result<SvgOutline, SvgImportError> {
    let doc = Document::parse_with_options(
        svg_content,
        ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        },
    )
    .map_err(|e| SvgImportError::ParseError(e.to_string()))?;
    let svg_element = doc.root_element();
    if !svg_element.has_tag_name("svg") {
        return Err(SvgImportError::InvalidSvg(format!(
            "Root element is <{}>, not <svg>",
            svg_element.tag_name().name()
        )));
    }

    let tree = Tree::from_xmltree(&doc, &Options::default()).map_err(|e| match e {
        usvg::Error::InvalidSize => {
            SvgImportError::InvalidSvg("SVG must have a viewBox or width/height".to_string())
        }
        e => SvgImportError::ParseError(e.to_string()),
    })?;

    let mut path = BezPath::new();
    collect_filled(tree.root(), &mut path);
    let size = tree.size();
    Ok(SvgOutline {
        size: Size::new(size.width() as f64, size.height() as f64),
        path,
    })
}

/// Appends every visible, filled path under `group` to `path`.
fn collect_filled(group: &Group, path: &mut BezPath) {
    for node in group.children() {
        match node {
            Node::Group(group) => collect_filled(group, path),
            Node::Path(svg_path) => {
                if !svg_path.is_visible() || svg_path.fill().is_none() {
                    tracing::debug!("Skipping unfilled path {:?}", svg_path.id());
                    continue;
                }
                let mut filled = to_bez_path(svg_path.data());
                // Lines have no area to fill
                if outline::contours(&filled).iter().all(|c| c.area() == 0.0) {
                    tracing::debug!("Skipping path {:?} without area", svg_path.id());
                    continue;
                }
                filled.apply_affine(to_affine(svg_path.abs_transform()));
                path.extend(filled);
            }
            Node::Image(_) | Node::Text(_) => {
                tracing::debug!("Ignoring {:?}, only paths are imported", node.id());
            }
        }
    }
}

fn to_affine(ts: usvg::Transform) -> Affine {
    Affine::new([ts.sx, ts.ky, ts.kx, ts.sy, ts.tx, ts.ty].map(f64::from))
}

fn to_point(p: usvg::tiny_skia_path::Point) -> Point {
    Point::new(p.x as f64, p.y as f64)
}

fn to_bez_path(data: &usvg::tiny_skia_path::Path) -> BezPath {
    let mut path = BezPath::new();
    for segment in data.segments() {
        match segment {
            PathSegment::MoveTo(p) => path.move_to(to_point(p)),
            PathSegment::LineTo(p) => path.line_to(to_point(p)),
            PathSegment::QuadTo(p1, p2) => path.quad_to(to_point(p1), to_point(p2)),
            PathSegment::CubicTo(p1, p2, p3) => {
                path.curve_to(to_point(p1), to_point(p2), to_point(p3))
            }
            PathSegment::Close => path.close_path(),
        }
    }
    path
}
