//! Contour clean up before outlines go into `glyf`.
//!
//! Coordinates are y-up font units throughout. A positive signed area means a
//! counterclockwise contour.
use i_overlay::{core::fill_rule::FillRule, float::simplify::SimplifyShape};
use kurbo::{BezPath, CubicBez, ParamCurve, PathEl, PathSeg, Point, Rect, Shape};

/// Contours with less area than this are dropped.
const MIN_AREA: f64 = 0.5;

/// Flattening tolerance, in font units, for contours that get unioned.
const FLATTEN_TOLERANCE: f64 = 0.1;

/// Splits a path into its closed subpaths.
///
/// Open subpaths are closed, a filled outline is implicitly closed anyway.
pub fn contours(path: &BezPath) -> Vec<BezPath> {
    let mut contours = Vec::new();
    let mut current = BezPath::new();
    for el in path.elements() {
        match el {
            PathEl::MoveTo(_) => {
                finish_contour(&mut current, &mut contours);
                current.push(*el);
            }
            PathEl::ClosePath => {
                current.close_path();
                finish_contour(&mut current, &mut contours);
            }
            el => current.push(*el),
        }
    }
    finish_contour(&mut current, &mut contours);
    contours
}

fn finish_contour(current: &mut BezPath, contours: &mut Vec<BezPath>) {
    let contour = std::mem::take(current);
    // A lone move_to draws nothing
    if contour.elements().len() < 2 {
        return;
    }
    let mut contour = contour;
    if !matches!(contour.elements().last(), Some(PathEl::ClosePath)) {
        contour.close_path();
    }
    contours.push(contour);
}

fn join(contours: impl IntoIterator<Item = BezPath>) -> BezPath {
    let mut path = BezPath::new();
    for contour in contours {
        path.extend(contour);
    }
    path
}

/// Reverses the direction of a single closed contour.
pub fn reverse_contour(contour: &BezPath) -> BezPath {
    let segments: Vec<PathSeg> = contour.segments().collect();
    let Some(first) = segments.first() else {
        return contour.clone();
    };
    let start = first.start();
    let mut reversed_segments: Vec<PathSeg> =
        segments.iter().rev().map(PathSeg::reverse).collect();
    // A final line back to the start is what ClosePath draws anyway.
    if let Some(PathSeg::Line(line)) = reversed_segments.last() {
        if line.p1 == start {
            reversed_segments.pop();
        }
    }

    let mut reversed = BezPath::new();
    reversed.move_to(start);
    for seg in reversed_segments {
        match seg {
            PathSeg::Line(line) => reversed.line_to(line.p1),
            PathSeg::Quad(quad) => reversed.quad_to(quad.p1, quad.p2),
            PathSeg::Cubic(cubic) => reversed.curve_to(cubic.p1, cubic.p2, cubic.p3),
        }
    }
    reversed.close_path();
    reversed
}

fn on_curve_points(contour: &BezPath) -> impl Iterator<Item = Point> + '_ {
    contour.elements().iter().filter_map(|el| el.end_point())
}

/// True if every on-curve point of `inner` lies inside `outer`.
fn is_nested(inner: &BezPath, inner_bbox: Rect, outer: &BezPath, outer_bbox: Rect) -> bool {
    if outer_bbox.intersect(inner_bbox) != inner_bbox {
        return false;
    }
    on_curve_points(inner).all(|p| outer.winding(p) != 0)
}

/// Orients every contour by its nesting depth: outer contours (even depth)
/// clockwise, holes (odd depth) counterclockwise, as TrueType expects.
pub fn correct_direction(path: &BezPath) -> BezPath {
    let contours = contours(path);
    let bboxes: Vec<Rect> = contours.iter().map(|c| c.bounding_box()).collect();

    let corrected = contours.iter().enumerate().map(|(i, contour)| {
        let depth = contours
            .iter()
            .enumerate()
            .filter(|(j, other)| *j != i && is_nested(contour, bboxes[i], other, bboxes[*j]))
            .count();
        let is_hole = depth % 2 == 1;
        let is_clockwise = contour.area() < 0.0;
        if is_hole == is_clockwise {
            reverse_contour(contour)
        } else {
            contour.clone()
        }
    });
    join(corrected.collect::<Vec<_>>())
}

/// Removes overlaps so that no two contours cover the same area.
///
/// Degenerate contours (almost no area) and exact duplicates are dropped first.
/// Contours whose bounding boxes touch are then unioned with the nonzero fill
/// rule. A group whose union leaves the contours as they were keeps its
/// original curves; otherwise it is replaced by the flattened union. `path`
/// should already be direction corrected so holes subtract.
pub fn remove_overlaps(path: &BezPath) -> BezPath {
    let mut kept: Vec<BezPath> = Vec::new();
    for contour in contours(path) {
        if contour.area().abs() < MIN_AREA {
            tracing::debug!("Dropping degenerate contour");
            continue;
        }
        if kept.iter().any(|k| k.elements() == contour.elements()) {
            tracing::debug!("Dropping duplicate contour");
            continue;
        }
        kept.push(contour);
    }

    let bboxes: Vec<Rect> = kept.iter().map(|c| c.bounding_box()).collect();
    let mut merged = Vec::new();
    for group in overlap_groups(&bboxes) {
        let members: Vec<&BezPath> = group.iter().map(|&i| &kept[i]).collect();
        if members.len() == 1 {
            merged.push(members[0].clone());
            continue;
        }
        let polygons: Vec<Vec<[f64; 2]>> = members.iter().map(|c| to_polygon(c)).collect();
        let union: Vec<Vec<[f64; 2]>> = polygons
            .simplify_shape(FillRule::NonZero)
            .into_iter()
            .flatten()
            .collect();
        let before: f64 = polygons.iter().map(|p| polygon_area(p).abs()).sum();
        let after: f64 = union.iter().map(|p| polygon_area(p).abs()).sum();
        if union.len() == members.len() && (before - after).abs() < MIN_AREA {
            merged.extend(members.into_iter().cloned());
        } else {
            tracing::debug!(
                "Merged {} overlapping contours into {}",
                members.len(),
                union.len()
            );
            merged.extend(union.iter().filter_map(|p| from_polygon(p)));
        }
    }
    // The union comes out counterclockwise
    correct_direction(&join(merged))
}

/// Groups contour indices whose bounding boxes overlap, directly or through
/// other contours. Groups are ordered by their first contour.
fn overlap_groups(bboxes: &[Rect]) -> Vec<Vec<usize>> {
    let mut group_of: Vec<usize> = (0..bboxes.len()).collect();
    for i in 0..bboxes.len() {
        for j in i + 1..bboxes.len() {
            let (a, b) = (bboxes[i], bboxes[j]);
            let touching = a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1;
            let (keep, replace) = (group_of[i], group_of[j]);
            if touching && keep != replace {
                for group in group_of.iter_mut().filter(|g| **g == replace) {
                    *group = keep;
                }
            }
        }
    }

    let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
    for (i, group) in group_of.into_iter().enumerate() {
        match groups.iter_mut().find(|(id, _)| *id == group) {
            Some((_, members)) => members.push(i),
            None => groups.push((group, vec![i])),
        }
    }
    groups.into_iter().map(|(_, members)| members).collect()
}

fn to_polygon(contour: &BezPath) -> Vec<[f64; 2]> {
    let mut points = Vec::new();
    kurbo::flatten(contour.iter(), FLATTEN_TOLERANCE, |el| {
        if let PathEl::MoveTo(p) | PathEl::LineTo(p) = el {
            points.push([p.x, p.y]);
        }
    });
    points
}

fn from_polygon(points: &[[f64; 2]]) -> Option<BezPath> {
    let [first, rest @ ..] = points else {
        return None;
    };
    let mut contour = BezPath::new();
    contour.move_to((first[0], first[1]));
    for p in rest {
        contour.line_to((p[0], p[1]));
    }
    contour.close_path();
    Some(contour)
}

/// Shoelace area, positive when counterclockwise.
fn polygon_area(points: &[[f64; 2]]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a[0] * b[1] - b[0] * a[1]
        })
        .sum::<f64>()
        / 2.0
}

/// Replaces cubic curves with quadratic approximations within `accuracy`.
pub fn to_quadratic(path: &BezPath, accuracy: f64) -> BezPath {
    let mut quadratic = BezPath::new();
    let mut current = Point::ZERO;
    let mut subpath_start = Point::ZERO;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                quadratic.move_to(p);
                current = p;
                subpath_start = p;
            }
            PathEl::LineTo(p) => {
                quadratic.line_to(p);
                current = p;
            }
            PathEl::QuadTo(p1, p2) => {
                quadratic.quad_to(p1, p2);
                current = p2;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                for (_, _, quad) in CubicBez::new(current, p1, p2, p3).to_quads(accuracy) {
                    quadratic.quad_to(quad.p1, quad.p2);
                }
                current = p3;
            }
            PathEl::ClosePath => {
                quadratic.close_path();
                current = subpath_start;
            }
        }
    }
    quadratic
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Counterclockwise in y-up.
    fn ccw_square(x: f64, y: f64, size: f64) -> BezPath {
        let mut path = BezPath::new();
        path.move_to((x, y));
        path.line_to((x + size, y));
        path.line_to((x + size, y + size));
        path.line_to((x, y + size));
        path.close_path();
        path
    }

    fn areas(path: &BezPath) -> Vec<f64> {
        contours(path).iter().map(|c| c.area()).collect()
    }

    #[test]
    fn splits_and_closes_contours() {
        let mut path = ccw_square(0.0, 0.0, 10.0);
        path.move_to((20.0, 0.0));
        path.line_to((30.0, 0.0));
        path.line_to((30.0, 10.0));
        path.move_to((50.0, 50.0));

        let contours = contours(&path);

        assert_eq!(contours.len(), 2);
        assert_eq!(contours[1].elements().last(), Some(&PathEl::ClosePath));
    }

    #[test]
    fn reverse_flips_area_sign() {
        let square = ccw_square(0.0, 0.0, 10.0);
        let reversed = reverse_contour(&square);

        assert_eq!(square.area(), 100.0);
        assert_eq!(reversed.area(), -100.0);
        assert_eq!(reverse_contour(&reversed).area(), 100.0);
    }

    #[test]
    fn reverse_keeps_curves() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.curve_to((10.0, 0.0), (20.0, 10.0), (20.0, 20.0));
        path.quad_to((10.0, 30.0), (0.0, 20.0));
        path.close_path();

        let reversed = reverse_contour(&path);

        assert_eq!(
            reversed.elements(),
            &[
                PathEl::MoveTo((0.0, 0.0).into()),
                PathEl::LineTo((0.0, 20.0).into()),
                PathEl::QuadTo((10.0, 30.0).into(), (20.0, 20.0).into()),
                PathEl::CurveTo((20.0, 10.0).into(), (10.0, 0.0).into(), (0.0, 0.0).into()),
                PathEl::ClosePath,
            ]
        );
        assert!((reversed.area() + path.area()).abs() < 1e-9);
    }

    #[test]
    fn outer_clockwise_hole_counterclockwise() {
        // Both drawn counterclockwise, as an evenodd svg path often is.
        let mut path = ccw_square(0.0, 0.0, 100.0);
        path.extend(ccw_square(25.0, 25.0, 50.0));

        let corrected = correct_direction(&path);

        assert_eq!(areas(&corrected), vec![-10000.0, 2500.0]);
    }

    #[test]
    fn island_in_hole_is_outer_again() {
        let mut path = ccw_square(0.0, 0.0, 100.0);
        path.extend(ccw_square(10.0, 10.0, 80.0));
        path.extend(reverse_contour(&ccw_square(40.0, 40.0, 20.0)));

        let corrected = correct_direction(&path);

        assert_eq!(areas(&corrected), vec![-10000.0, 6400.0, -400.0]);
    }

    #[test]
    fn crossing_contours_are_both_outer() {
        let mut path = ccw_square(0.0, 0.0, 10.0);
        path.extend(ccw_square(5.0, 5.0, 10.0));

        let corrected = correct_direction(&path);

        assert_eq!(areas(&corrected), vec![-100.0, -100.0]);
    }

    #[test]
    fn drops_degenerate_and_duplicate_contours() {
        let mut path = ccw_square(0.0, 0.0, 10.0);
        path.extend(ccw_square(0.0, 0.0, 10.0));
        path.move_to((20.0, 20.0));
        path.line_to((30.0, 30.0));
        path.close_path();
        path.extend(ccw_square(50.0, 0.0, 10.0));

        let cleaned = remove_overlaps(&path);

        assert_eq!(areas(&cleaned), vec![-100.0, -100.0]);
        assert_eq!(contours(&cleaned)[1].bounding_box().x0, 50.0);
    }

    #[test]
    fn crossing_squares_merge_into_one_contour() {
        let mut path = ccw_square(0.0, 0.0, 10.0);
        path.extend(ccw_square(5.0, 5.0, 10.0));

        let merged = remove_overlaps(&correct_direction(&path));

        let areas = areas(&merged);
        assert_eq!(areas.len(), 1, "{merged:?}");
        assert!((areas[0] + 175.0).abs() < 1e-3, "{areas:?}");
        let bbox = merged.bounding_box();
        assert!(bbox.x0.abs() < 1e-3 && (bbox.x1 - 15.0).abs() < 1e-3, "{bbox:?}");
    }

    #[test]
    fn nested_contours_keep_their_curves() {
        let mut path = kurbo::Circle::new((50.0, 50.0), 50.0).to_path(0.1);
        path.extend(kurbo::Circle::new((50.0, 50.0), 20.0).to_path(0.1));
        let corrected = correct_direction(&path);

        let cleaned = remove_overlaps(&corrected);

        assert_eq!(cleaned.elements(), corrected.elements());
        assert!(cleaned
            .elements()
            .iter()
            .any(|el| matches!(el, PathEl::CurveTo(..))));
    }

    #[test]
    fn overlap_groups_follow_chains() {
        let bboxes = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(100.0, 0.0, 110.0, 10.0),
            Rect::new(20.0, 0.0, 30.0, 10.0),
            Rect::new(5.0, 0.0, 25.0, 10.0),
        ];

        assert_eq!(overlap_groups(&bboxes), vec![vec![0, 2, 3], vec![1]]);
    }

    #[test]
    fn quadratic_has_no_cubics() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.curve_to((0.0, 500.0), (1000.0, 500.0), (1000.0, 0.0));
        path.close_path();

        let quadratic = to_quadratic(&path, 1.0);

        assert!(quadratic
            .elements()
            .iter()
            .all(|el| !matches!(el, PathEl::CurveTo(..))));
        assert!(matches!(quadratic.elements().last(), Some(PathEl::ClosePath)));
        assert!((quadratic.area() - path.area()).abs() / path.area().abs() < 0.01);
        let end = quadratic
            .elements()
            .iter()
            .rev()
            .find_map(PathEl::end_point)
            .unwrap();
        assert_eq!(end, Point::new(1000.0, 0.0));
    }
}
