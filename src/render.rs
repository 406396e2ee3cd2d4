//! Rendering contract between the session and the host's drawing surface.
//!
//! Pixel output is the host's job; this module decides *what* to draw. The
//! renderer resets the surface, applies the viewport transform so all
//! subsequent coordinates are image-space, draws the image slot, then every
//! committed shape with a per-feature color, highlighting the current one.

use crate::constants::{MARKER_RADIUS, STROKE_WIDTH};
use crate::model::{Point, Shape};
use crate::session::AnnotationSession;
use crate::viewport::Viewport;

/// RGBA color, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// Stroke colors cycled by feature index.
pub const FEATURE_COLORS: [Color; 5] = [
    Color::rgb(1.0, 0.08, 0.08),
    Color::rgb(0.0, 0.78, 0.0),
    Color::rgb(0.0, 0.0, 1.0),
    Color::rgb(1.0, 1.0, 0.0),
    Color::rgb(0.2, 0.78, 0.78),
];

/// Marker fill for the current shape's vertices.
pub const HIGHLIGHT_COLOR: Color = Color::rgb(1.0, 1.0, 1.0);

/// A 2D drawing surface supplied by the host.
///
/// The surface is expected to behave like a canvas context: a transform set
/// once per repaint applies to every subsequent draw call.
pub trait DrawSurface {
    /// Reset the transform and wipe the surface.
    fn clear(&mut self);

    /// Translate by `(tx, ty)` then scale uniformly; subsequent coordinates
    /// are image-space.
    fn set_transform(&mut self, tx: f32, ty: f32, scale: f32);

    /// Draw the host's image with its top-left at `(x, y)` and the given
    /// image-space extent.
    fn draw_image(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// Stroke an open path through the given points.
    fn stroke_path(&mut self, points: &[Point], color: Color, width: f32);

    /// Fill a circle (vertex marker).
    fn fill_circle(&mut self, center: Point, radius: f32, color: Color);
}

/// Draws viewport + feature state onto a [`DrawSurface`].
pub struct Renderer;

impl Renderer {
    /// Redraw everything: image, committed shapes, and the in-progress
    /// shape (which is kept valid while being drawn, so it needs no special
    /// casing).
    pub fn repaint<S: DrawSurface>(surface: &mut S, session: &AnnotationSession) {
        let viewport = session.viewport();
        let (view_w, view_h) = viewport.view_size();
        let (image_w, image_h) = viewport.image_size();
        let (offset_x, offset_y) = viewport.offset();

        surface.clear();
        surface.set_transform(
            view_w / 2.0 + offset_x,
            view_h / 2.0 + offset_y,
            viewport.scale(),
        );
        surface.draw_image(-image_w / 2.0, -image_h / 2.0, image_w, image_h);

        for (f_ind, feature) in session.features().iter().enumerate() {
            for (s_ind, shape) in feature.shapes.iter().enumerate() {
                if !shape.valid {
                    continue;
                }
                let current =
                    f_ind == session.feature_index() && s_ind == session.shape_index();
                Self::draw_shape(surface, viewport, shape, f_ind, current);
            }
        }
    }

    fn draw_shape<S: DrawSurface>(
        surface: &mut S,
        viewport: &Viewport,
        shape: &Shape,
        feature_index: usize,
        current: bool,
    ) {
        let points = shape.draw_points();
        if points.is_empty() {
            return;
        }

        let color = FEATURE_COLORS[feature_index % FEATURE_COLORS.len()];
        surface.stroke_path(&points, color, viewport.scale_dist(STROKE_WIDTH));

        if current {
            // The outline repeats the first point to close the loop; skip
            // the duplicate when marking vertices
            for pt in &points[..points.len() - 1] {
                surface.fill_circle(*pt, viewport.scale_dist(MARKER_RADIUS), HIGHLIGHT_COLOR);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnnotatorConfig;
    use crate::format::FeatureDef;
    use crate::model::{Point, ShapeConstraint};
    use crate::session::Mode;

    #[derive(Debug, PartialEq)]
    enum Call {
        Clear,
        Transform(f32, f32, f32),
        Image(f32, f32, f32, f32),
        Path(usize, Color),
        Circle(Color),
    }

    #[derive(Default)]
    struct RecordingSurface {
        calls: Vec<Call>,
    }

    impl DrawSurface for RecordingSurface {
        fn clear(&mut self) {
            self.calls.push(Call::Clear);
        }

        fn set_transform(&mut self, tx: f32, ty: f32, scale: f32) {
            self.calls.push(Call::Transform(tx, ty, scale));
        }

        fn draw_image(&mut self, x: f32, y: f32, width: f32, height: f32) {
            self.calls.push(Call::Image(x, y, width, height));
        }

        fn stroke_path(&mut self, points: &[Point], color: Color, _width: f32) {
            self.calls.push(Call::Path(points.len(), color));
        }

        fn fill_circle(&mut self, _center: Point, _radius: f32, color: Color) {
            self.calls.push(Call::Circle(color));
        }
    }

    fn session_with_box() -> AnnotationSession {
        let mut session = AnnotationSession::new(AnnotatorConfig {
            src: "test.png".to_string(),
            width: 640.0,
            height: 480.0,
            features: vec![FeatureDef {
                name: "head".to_string(),
                required: true,
                shape: ShapeConstraint::Rect,
            }],
            annotations: None,
            style: None,
        })
        .unwrap();
        session.set_mode(Mode::Annotate);
        session.pointer_down(10.0, 10.0);
        session.pointer_move(50.0, 50.0);
        session.pointer_up();
        session
    }

    #[test]
    fn test_repaint_order_and_transform() {
        let session = session_with_box();
        let mut surface = RecordingSurface::default();
        Renderer::repaint(&mut surface, &session);

        assert_eq!(surface.calls[0], Call::Clear);
        assert_eq!(surface.calls[1], Call::Transform(320.0, 240.0, 0.9));
        assert_eq!(surface.calls[2], Call::Image(-320.0, -240.0, 640.0, 480.0));
    }

    #[test]
    fn test_current_box_gets_outline_and_markers() {
        let session = session_with_box();
        let mut surface = RecordingSurface::default();
        Renderer::repaint(&mut surface, &session);

        // One closed 5-point outline in the first feature color
        assert_eq!(surface.calls[3], Call::Path(5, FEATURE_COLORS[0]));
        // Four corner markers, highlight-filled
        let markers = surface
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Circle(_)))
            .count();
        assert_eq!(markers, 4);
        assert_eq!(surface.calls[4], Call::Circle(HIGHLIGHT_COLOR));
    }

    #[test]
    fn test_invalid_shapes_not_drawn() {
        let mut session = session_with_box();
        // Move to a fresh placeholder; the committed box is no longer current
        session.next_shape();
        let mut surface = RecordingSurface::default();
        Renderer::repaint(&mut surface, &session);

        let paths = surface
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Path(..)))
            .count();
        assert_eq!(paths, 1);
        // The committed box is not current, so no markers
        let markers = surface
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Circle(_)))
            .count();
        assert_eq!(markers, 0);
    }

    #[test]
    fn test_feature_colors_distinct() {
        for i in 0..FEATURE_COLORS.len() {
            for j in (i + 1)..FEATURE_COLORS.len() {
                assert_ne!(FEATURE_COLORS[i], FEATURE_COLORS[j]);
            }
        }
    }
}
