//! Our own bezier pen, collects skrifa outlines into a kurbo path

use kurbo::{Affine, BezPath, Point};
use skrifa::outline::OutlinePen;

/// Records a glyph's outline as a [`BezPath`], in font units unless a transform is given.
pub(crate) struct BezPathPen {
    path: BezPath,
    transform: Affine,
}

impl BezPathPen {
    pub(crate) fn new() -> Self {
        BezPathPen {
            path: Default::default(),
            transform: Affine::IDENTITY,
        }
    }

    #[cfg(test)]
    pub(crate) fn new_with_transform(transform: Affine) -> Self {
        BezPathPen {
            path: Default::default(),
            transform,
        }
    }

    fn transform_point(&self, x: f32, y: f32) -> Point {
        self.transform * Point::new(x as f64, y as f64)
    }

    pub(crate) fn into_inner(self) -> BezPath {
        self.path
    }
}

impl OutlinePen for BezPathPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.path.move_to(self.transform_point(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path.line_to(self.transform_point(x, y));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.path
            .quad_to(self.transform_point(cx0, cy0), self.transform_point(x, y));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.path.curve_to(
            self.transform_point(cx0, cy0),
            self.transform_point(cx1, cy1),
            self.transform_point(x, y),
        );
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_transformed_commands() {
        let mut pen = BezPathPen::new_with_transform(Affine::scale(2.0));
        pen.move_to(1.0, 1.0);
        pen.line_to(2.0, 1.0);
        pen.quad_to(3.0, 2.0, 2.0, 3.0);
        pen.close();

        assert_eq!(
            pen.into_inner().elements(),
            &[
                PathEl::MoveTo((2.0, 2.0).into()),
                PathEl::LineTo((4.0, 2.0).into()),
                PathEl::QuadTo((6.0, 4.0).into(), (4.0, 6.0).into()),
                PathEl::ClosePath,
            ]
        );
    }
}
