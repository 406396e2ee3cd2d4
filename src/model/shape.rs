//! Shape geometry for annotations.
//!
//! Shapes are a tagged union rather than an inheritance hierarchy, so the
//! set of kinds is closed and exhaustively matched wherever shapes are
//! handled.

use serde::{Deserialize, Serialize};

use crate::format::{ShapeData, Size};

/// A 2D point in image coordinates (origin at the image center).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Shape kind tag, used for new-shape selection and feature constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    Poly,
}

impl ShapeKind {
    /// Display name for the kind selector.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rect => "Box",
            ShapeKind::Poly => "Polygon",
        }
    }
}

/// Per-kind geometry data.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeGeom {
    /// Two opposite corners, stored in the order they were dragged.
    /// Normalized to min corner + absolute size on export and when drawn.
    Rect { corners: [Point; 2] },
    /// Polygon vertices in insertion order.
    Poly { vertices: Vec<Point> },
}

impl ShapeGeom {
    fn empty(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Rect => ShapeGeom::Rect {
                corners: [Point::default(); 2],
            },
            ShapeKind::Poly => ShapeGeom::Poly {
                vertices: Vec::new(),
            },
        }
    }
}

/// A single geometric annotation.
///
/// `valid` is false for placeholder shapes that have not been committed by
/// the session; invalid shapes are never exported and are pruned on shape
/// navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub geom: ShapeGeom,
    pub valid: bool,
}

impl Shape {
    /// Create an invalid placeholder shape of the given kind.
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            geom: ShapeGeom::empty(kind),
            valid: false,
        }
    }

    /// Create a valid box from two opposite corners (any order).
    pub fn from_corners(p0: Point, p1: Point) -> Self {
        Self {
            geom: ShapeGeom::Rect { corners: [p0, p1] },
            valid: true,
        }
    }

    /// Create a valid polygon from its vertex list.
    pub fn from_vertices(vertices: Vec<Point>) -> Self {
        Self {
            geom: ShapeGeom::Poly { vertices },
            valid: true,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self.geom {
            ShapeGeom::Rect { .. } => ShapeKind::Rect,
            ShapeGeom::Poly { .. } => ShapeKind::Poly,
        }
    }

    /// The stored points: the two corners of a box, or the polygon vertices.
    pub fn points(&self) -> &[Point] {
        match &self.geom {
            ShapeGeom::Rect { corners } => corners,
            ShapeGeom::Poly { vertices } => vertices,
        }
    }

    pub fn point_count(&self) -> usize {
        self.points().len()
    }

    /// Clear the points back to empty/zero and invalidate. Retags the
    /// variant when a kind is given. Callers must not retain point data
    /// across a reset.
    pub fn reset(&mut self, kind: Option<ShapeKind>) {
        let kind = kind.unwrap_or_else(|| self.kind());
        self.geom = ShapeGeom::empty(kind);
        self.valid = false;
    }

    /// Add a polygon vertex. An empty polygon is seeded with two coincident
    /// points so a degenerate polygon always holds at least 2; a polygon is
    /// never "complete" — finishing is the session's decision. Boxes have
    /// fixed arity and ignore this.
    pub fn add_point(&mut self, pt: Point) {
        if let ShapeGeom::Poly { vertices } = &mut self.geom {
            if vertices.is_empty() {
                vertices.push(pt);
            }
            vertices.push(pt);
        }
    }

    /// Replace the point at `index` in place (used to preview an
    /// in-progress vertex without committing a new one).
    pub fn modify_point(&mut self, index: usize, pt: Point) {
        match &mut self.geom {
            ShapeGeom::Rect { corners } => {
                if index < corners.len() {
                    corners[index] = pt;
                }
            }
            ShapeGeom::Poly { vertices } => {
                if index < vertices.len() {
                    vertices[index] = pt;
                }
            }
        }
    }

    /// Replace the most recently stored point in place.
    pub fn modify_last_point(&mut self, pt: Point) {
        let count = self.point_count();
        if count > 0 {
            self.modify_point(count - 1, pt);
        }
    }

    /// Insert a polygon vertex at `index`. Out-of-range indices and boxes
    /// are ignored.
    pub fn insert_point(&mut self, index: usize, pt: Point) {
        if let ShapeGeom::Poly { vertices } = &mut self.geom {
            if index <= vertices.len() {
                vertices.insert(index, pt);
            }
        }
    }

    /// Delete the polygon vertex at `index`. Dropping below 2 vertices
    /// empties the polygon and invalidates it.
    pub fn delete_point(&mut self, index: usize) {
        if let ShapeGeom::Poly { vertices } = &mut self.geom {
            if index < vertices.len() {
                vertices.remove(index);
            }
            if vertices.len() < 2 {
                vertices.clear();
                self.valid = false;
            }
        }
    }

    /// The closed outline to render: polygon vertices with the first
    /// repeated at the end, or the four normalized box corners plus the
    /// first again. Empty for a polygon with no vertices.
    pub fn draw_points(&self) -> Vec<Point> {
        match &self.geom {
            ShapeGeom::Rect { corners } => {
                let x0 = corners[0].x.min(corners[1].x);
                let y0 = corners[0].y.min(corners[1].y);
                let x1 = corners[0].x.max(corners[1].x);
                let y1 = corners[0].y.max(corners[1].y);
                vec![
                    Point::new(x0, y0),
                    Point::new(x1, y0),
                    Point::new(x1, y1),
                    Point::new(x0, y1),
                    Point::new(x0, y0),
                ]
            }
            ShapeGeom::Poly { vertices } => {
                if vertices.is_empty() {
                    return Vec::new();
                }
                let mut pts = vertices.clone();
                pts.push(vertices[0]);
                pts
            }
        }
    }

    /// Export data for this shape. Box output is normalized to the
    /// component-wise min corner and absolute size regardless of the order
    /// the drag corners were recorded in.
    pub fn export_data(&self) -> ShapeData {
        match &self.geom {
            ShapeGeom::Rect { corners } => ShapeData::Rect {
                pos: Point::new(
                    corners[0].x.min(corners[1].x),
                    corners[0].y.min(corners[1].y),
                ),
                size: Size {
                    width: (corners[1].x - corners[0].x).abs(),
                    height: (corners[1].y - corners[0].y).abs(),
                },
            },
            ShapeGeom::Poly { vertices } => ShapeData::Poly {
                points: vertices.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(ShapeKind::Rect.name(), "Box");
        assert_eq!(ShapeKind::Poly.name(), "Polygon");
    }

    #[test]
    fn test_new_shape_is_invalid() {
        let rect = Shape::new(ShapeKind::Rect);
        assert!(!rect.valid);
        assert_eq!(rect.point_count(), 2);

        let poly = Shape::new(ShapeKind::Poly);
        assert!(!poly.valid);
        assert_eq!(poly.point_count(), 0);
    }

    #[test]
    fn test_reset_retags_kind() {
        let mut shape = Shape::from_corners(Point::new(1.0, 2.0), Point::new(3.0, 4.0));
        shape.reset(Some(ShapeKind::Poly));
        assert_eq!(shape.kind(), ShapeKind::Poly);
        assert!(!shape.valid);
        assert_eq!(shape.point_count(), 0);

        // No kind keeps the variant
        shape.reset(None);
        assert_eq!(shape.kind(), ShapeKind::Poly);
    }

    #[test]
    fn test_add_point_seeds_pair() {
        let mut poly = Shape::new(ShapeKind::Poly);
        poly.add_point(Point::new(5.0, 5.0));
        assert_eq!(poly.point_count(), 2);
        assert_eq!(poly.points()[0], poly.points()[1]);

        poly.add_point(Point::new(9.0, 1.0));
        assert_eq!(poly.point_count(), 3);
    }

    #[test]
    fn test_add_point_ignored_for_rect() {
        let mut rect = Shape::new(ShapeKind::Rect);
        rect.add_point(Point::new(5.0, 5.0));
        assert_eq!(rect.point_count(), 2);
        assert_eq!(rect.points()[0], Point::default());
    }

    #[test]
    fn test_modify_points() {
        let mut poly = Shape::from_vertices(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ]);
        poly.modify_point(1, Point::new(5.0, 0.0));
        assert_eq!(poly.points()[1], Point::new(5.0, 0.0));

        poly.modify_last_point(Point::new(7.0, 7.0));
        assert_eq!(poly.points()[2], Point::new(7.0, 7.0));

        // Out of range is ignored
        poly.modify_point(10, Point::new(99.0, 99.0));
        assert_eq!(poly.point_count(), 3);
    }

    #[test]
    fn test_insert_and_delete_point() {
        let mut poly = Shape::from_vertices(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ]);
        poly.insert_point(1, Point::new(5.0, -5.0));
        assert_eq!(poly.point_count(), 4);
        assert_eq!(poly.points()[1], Point::new(5.0, -5.0));

        poly.delete_point(1);
        assert_eq!(poly.point_count(), 3);
        assert!(poly.valid);
    }

    #[test]
    fn test_delete_below_two_empties_polygon() {
        let mut poly = Shape::from_vertices(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        poly.delete_point(0);
        assert_eq!(poly.point_count(), 0);
        assert!(!poly.valid);
    }

    #[test]
    fn test_polygon_draw_points_closes_loop() {
        for n in 2usize..6 {
            let vertices: Vec<Point> = (0..n).map(|i| Point::new(i as f32, i as f32 * 2.0)).collect();
            let poly = Shape::from_vertices(vertices);
            let pts = poly.draw_points();
            assert_eq!(pts.len(), n + 1);
            assert_eq!(pts[0], pts[n]);
        }
    }

    #[test]
    fn test_empty_polygon_draw_points() {
        let poly = Shape::new(ShapeKind::Poly);
        assert!(poly.draw_points().is_empty());
    }

    #[test]
    fn test_rect_draw_points_normalized() {
        let rect = Shape::from_corners(Point::new(10.0, 8.0), Point::new(2.0, 4.0));
        let pts = rect.draw_points();
        assert_eq!(pts.len(), 5);
        assert_eq!(pts[0], Point::new(2.0, 4.0));
        assert_eq!(pts[2], Point::new(10.0, 8.0));
        assert_eq!(pts[0], pts[4]);
    }

    #[test]
    fn test_box_export_normalization() {
        let p0 = Point::new(50.0, 80.0);
        let p1 = Point::new(10.0, 20.0);
        let forward = Shape::from_corners(p0, p1).export_data();
        let reverse = Shape::from_corners(p1, p0).export_data();
        assert_eq!(forward, reverse);

        match forward {
            ShapeData::Rect { pos, size } => {
                assert_eq!(pos, Point::new(10.0, 20.0));
                assert_eq!(size.width, 40.0);
                assert_eq!(size.height, 60.0);
            }
            ShapeData::Poly { .. } => panic!("expected rect export"),
        }
    }

    #[test]
    fn test_polygon_export() {
        let vertices = vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(4.0, 3.0)];
        let poly = Shape::from_vertices(vertices.clone());
        match poly.export_data() {
            ShapeData::Poly { points } => assert_eq!(points, vertices),
            ShapeData::Rect { .. } => panic!("expected poly export"),
        }
    }
}
