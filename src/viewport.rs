//! Pan/zoom viewport state and the screen↔image coordinate mapping.
//!
//! The viewport is the sole authority for the affine map between the
//! drawing surface's pixel grid and image space. Image space is centered on
//! the image midpoint, which makes zoom-about-center a pure scale multiply
//! and keeps the pan clamp symmetric.

use crate::constants::{DEFAULT_VIEW_HEIGHT, DEFAULT_VIEW_WIDTH, FIT_MARGIN};
use crate::model::Point;

/// Pan/zoom transform state for one drawing surface.
///
/// Invariants maintained by every operation: `scale >= default_scale`
/// (zooming out below fit-to-view is disallowed) and each offset stays
/// within half the scaled image extent (the view center can never separate
/// from the image center by more than that).
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
    view_w: f32,
    view_h: f32,
    image_w: f32,
    image_h: f32,
    default_scale: f32,
    dirty: bool,
}

impl Viewport {
    /// Create a viewport for a drawing surface of the given size. Until the
    /// host reports natural image dimensions, the image is assumed to fill
    /// the view.
    pub fn new(view_w: f32, view_h: f32) -> Self {
        let view_w = if view_w > 0.0 { view_w } else { DEFAULT_VIEW_WIDTH };
        let view_h = if view_h > 0.0 { view_h } else { DEFAULT_VIEW_HEIGHT };
        let mut viewport = Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            view_w,
            view_h,
            image_w: view_w,
            image_h: view_h,
            default_scale: 1.0,
            dirty: true,
        };
        viewport.fit_to_view();
        viewport
    }

    /// Map a point from local surface coordinates to image space, clamped
    /// to the image bounds. A drag that leaves the image still produces a
    /// valid in-image point at the boundary, so shapes can never reference
    /// off-image coordinates.
    pub fn screen_to_image(&self, sx: f32, sy: f32) -> Point {
        let half_w = self.image_w / 2.0;
        let half_h = self.image_h / 2.0;
        let x = (sx - self.view_w / 2.0 - self.offset_x) / self.scale;
        let y = (sy - self.view_h / 2.0 - self.offset_y) / self.scale;
        Point::new(x.clamp(-half_w, half_w), y.clamp(-half_h, half_h))
    }

    /// Map an image-space point back to local surface coordinates. Exact
    /// inverse of [`Viewport::screen_to_image`] for in-image points.
    pub fn image_to_screen(&self, pt: Point) -> (f32, f32) {
        (
            pt.x * self.scale + self.view_w / 2.0 + self.offset_x,
            pt.y * self.scale + self.view_h / 2.0 + self.offset_y,
        )
    }

    /// Convert a screen distance to an image-space distance.
    pub fn scale_dist(&self, dist: f32) -> f32 {
        dist / self.scale
    }

    /// Pan the view by a screen-space delta, clamped so the image center
    /// stays reachable.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.offset_x += dx;
        self.offset_y += dy;
        self.clamp_offsets();
        self.dirty = true;
    }

    /// Zoom by a factor, clamped to the fit scale at the low end. Offsets
    /// are re-clamped because zooming out shrinks their legal range.
    pub fn zoom(&mut self, factor: f32) {
        self.scale *= factor;
        if self.scale < self.default_scale {
            self.scale = self.default_scale;
        }
        self.clamp_offsets();
        self.dirty = true;
        log::debug!("🔍 zoom: {:.3}x (default {:.3}x)", self.scale, self.default_scale);
    }

    fn clamp_offsets(&mut self) {
        let x_lim = (self.image_w / 2.0) * self.scale;
        let y_lim = (self.image_h / 2.0) * self.scale;
        self.offset_x = self.offset_x.clamp(-x_lim, x_lim);
        self.offset_y = self.offset_y.clamp(-y_lim, y_lim);
    }

    /// Recompute the default (fit) scale from the current view and image
    /// dimensions, then reset pan/zoom to it.
    pub fn fit_to_view(&mut self) {
        let x_ratio = self.view_w / self.image_w;
        let y_ratio = self.view_h / self.image_h;
        self.default_scale = FIT_MARGIN * x_ratio.min(y_ratio);
        self.scale = self.default_scale;
        self.offset_x = 0.0;
        self.offset_y = 0.0;
        self.dirty = true;
    }

    /// Update the drawing-surface dimensions and reset pan/zoom to the fit
    /// defaults.
    pub fn resize(&mut self, view_w: f32, view_h: f32) {
        if view_w <= 0.0 || view_h <= 0.0 {
            log::warn!("ignoring resize to {}x{}", view_w, view_h);
            return;
        }
        self.view_w = view_w;
        self.view_h = view_h;
        self.fit_to_view();
    }

    /// Record the image's natural dimensions (the image-load notification)
    /// and refit the view around them.
    pub fn set_image_size(&mut self, image_w: f32, image_h: f32) {
        if image_w <= 0.0 || image_h <= 0.0 {
            log::warn!("ignoring image size {}x{}", image_w, image_h);
            return;
        }
        self.image_w = image_w;
        self.image_h = image_h;
        self.fit_to_view();
        log::debug!("image loaded: {}x{}, fit scale {:.3}", image_w, image_h, self.default_scale);
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn default_scale(&self) -> f32 {
        self.default_scale
    }

    pub fn offset(&self) -> (f32, f32) {
        (self.offset_x, self.offset_y)
    }

    pub fn view_size(&self) -> (f32, f32) {
        (self.view_w, self.view_h)
    }

    pub fn image_size(&self) -> (f32, f32) {
        (self.image_w, self.image_h)
    }

    /// Whether a repaint has been requested since the last clear.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the repaint request. Call after redrawing.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}
