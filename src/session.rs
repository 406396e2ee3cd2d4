//! The annotation session: the top-level controller.
//!
//! Owns the feature list, the current feature/shape indices, the viewport,
//! and the pointer-driven drawing state machine. Pointer events arrive in
//! local surface coordinates; the session maps them to image space through
//! the viewport and mutates the current shape. Navigation keeps exactly one
//! shape current and prunes invalid placeholders.
//!
//! The current shape is addressed by index into the owning feature's list,
//! never by a held reference, so pruning can never leave the session
//! pointing at a removed shape.

use crate::config::{AnnotatorConfig, ConfigError, StyleConfig};
use crate::constants::{ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};
use crate::format::{AnnotationData, FeatureDef, ShapeList};
use crate::model::{Feature, Shape, ShapeGeom, ShapeKind};
use crate::viewport::Viewport;

/// Interaction mode for pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Dragging pans the view
    #[default]
    Pan,
    /// Dragging draws the current shape
    Annotate,
}

impl Mode {
    /// Cursor the host should show for this mode.
    pub fn cursor(&self) -> CursorHint {
        match self {
            Mode::Pan => CursorHint::Move,
            Mode::Annotate => CursorHint::Crosshair,
        }
    }
}

/// Cursor hint for the host's drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Move,
    Crosshair,
}

/// Transient pointer-drag state, in local surface coordinates.
#[derive(Debug, Clone, Copy, Default)]
struct DragState {
    /// Drag anchor; advanced per-move while panning, per-vertex while
    /// drawing a polygon
    anchor: (f32, f32),
    /// Last observed pointer position
    last: (f32, f32),
    /// 1-based counter of the polygon vertex currently being previewed
    vertex_count: usize,
    active: bool,
}

/// Enabled flags and label text for the host's navigation controls.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    pub prev_feature: bool,
    pub next_feature: bool,
    pub prev_shape: bool,
    pub next_shape: bool,
    pub delete: bool,
    /// The kind selector is locked while the feature's constraint is not
    /// `any`
    pub kind_locked: bool,
    /// `Annotating: {name} ({i}/{n})`, or `None` with no features
    pub title: Option<String>,
}

/// The annotation controller for one image.
pub struct AnnotationSession {
    src: String,
    features: Vec<Feature>,
    feature_index: usize,
    shape_index: usize,
    mode: Mode,
    selected_kind: ShapeKind,
    drag: DragState,
    viewport: Viewport,
    style: Option<StyleConfig>,
    dirty: bool,
}

impl AnnotationSession {
    /// Build a session from the construction payload. Fails fast on a
    /// missing image source or feature list; no partial session is built.
    pub fn new(config: AnnotatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut session = Self {
            src: config.src,
            features: Vec::new(),
            feature_index: 0,
            shape_index: 0,
            mode: Mode::Pan,
            selected_kind: ShapeKind::Rect,
            drag: DragState::default(),
            viewport: Viewport::new(config.width, config.height),
            style: config.style,
            dirty: true,
        };
        session.import_features(&config.features);
        if let Some(data) = &config.annotations {
            session.import_annotations(data);
        }
        Ok(session)
    }

    // ========================================================================
    // Import/Export
    // ========================================================================

    /// Replace the feature list wholesale from an ordered set of
    /// definitions. All previously held shapes are discarded.
    pub fn import_features(&mut self, defs: &[FeatureDef]) {
        self.features = defs
            .iter()
            .map(|d| Feature::new(&d.name, d.required, d.shape))
            .collect();
        log::debug!("imported {} feature definitions", self.features.len());
        self.select_feature(0);
    }

    /// Replace each feature's shapes with the decoded entry under its name.
    /// Features absent from the data are left with empty shape lists.
    /// Shapes that fail to decode or violate the feature's kind constraint
    /// are skipped, never fatal: this data is user-supplied.
    pub fn import_annotations(&mut self, data: &AnnotationData) {
        for feature in &mut self.features {
            feature.shapes.clear();
            let Some(list) = data.get(&feature.name) else {
                continue;
            };
            for shape_data in &list.shapes {
                if !feature.constraint.allows(shape_data.kind()) {
                    log::warn!(
                        "skipping {:?} shape for feature '{}': constraint is {:?}",
                        shape_data.kind(),
                        feature.name,
                        feature.constraint
                    );
                    continue;
                }
                match shape_data.to_shape() {
                    Ok(shape) => feature.shapes.push(shape),
                    Err(err) => {
                        log::warn!("skipping shape for feature '{}': {}", feature.name, err);
                    }
                }
            }
        }
        self.select_feature(self.feature_index);
    }

    /// Export every valid shape of every feature. Invalid placeholders
    /// never appear; a feature with none exports an empty list.
    pub fn export_all(&self) -> AnnotationData {
        let mut out = AnnotationData::new();
        for feature in &self.features {
            let shapes = feature
                .shapes
                .iter()
                .filter(|s| s.valid)
                .map(|s| s.export_data())
                .collect();
            out.insert(feature.name.clone(), ShapeList { shapes });
        }
        out
    }

    /// Point the annotator at a new image: resets the viewport to the new
    /// surface size and discards all features, shapes, and drag state. The
    /// host re-applies feature definitions afterwards, as at construction.
    pub fn update(&mut self, src: impl Into<String>, width: f32, height: f32) {
        self.src = src.into();
        self.viewport = Viewport::new(width, height);
        self.features.clear();
        self.feature_index = 0;
        self.shape_index = 0;
        self.drag = DragState::default();
        self.dirty = true;
        log::debug!("annotator reset for '{}'", self.src);
    }

    /// The image-load notification: record natural pixel dimensions and
    /// refit the view.
    pub fn image_loaded(&mut self, width: f32, height: f32) {
        self.viewport.set_image_size(width, height);
    }

    // ========================================================================
    // Navigation & collection management
    // ========================================================================

    /// Select a feature by index. Stepping past the end clamps back to the
    /// last feature without reselecting; an empty list is a no-op.
    pub fn select_feature(&mut self, index: usize) {
        if self.features.is_empty() {
            self.feature_index = 0;
            return;
        }
        if index >= self.features.len() {
            self.feature_index = self.features.len() - 1;
            return;
        }

        self.feature_index = index;
        if let Some(kind) = self.features[index].constraint.kind() {
            self.selected_kind = kind;
        }
        log::debug!("feature {} selected: '{}'", index, self.features[index].name);
        self.select_shape(0);
        self.dirty = true;
    }

    /// Select a shape within the current feature, pruning invalid
    /// placeholders first. An eviction at or before the requested index
    /// shifts the target down to compensate. Selecting one past the end
    /// appends a fresh placeholder of the selected kind — that is how
    /// advancing past the last shape begins a new annotation.
    pub fn select_shape(&mut self, index: usize) {
        let selected_kind = self.selected_kind;
        let Some(feature) = self.features.get_mut(self.feature_index) else {
            return;
        };

        let mut target = index as isize;
        let mut i = 0;
        while i < feature.shapes.len() {
            if !feature.shapes[i].valid {
                feature.shapes.remove(i);
                if i as isize <= target {
                    target -= 1;
                }
            } else {
                i += 1;
            }
        }

        if target < 0 {
            return;
        }
        let target = target as usize;
        if target == feature.shapes.len() {
            feature.shapes.push(Shape::new(selected_kind));
        } else if target > feature.shapes.len() {
            return;
        }
        self.shape_index = target;
        self.dirty = true;
    }

    pub fn next_feature(&mut self) {
        self.select_feature(self.feature_index + 1);
    }

    pub fn prev_feature(&mut self) {
        if self.feature_index > 0 {
            self.select_feature(self.feature_index - 1);
        }
    }

    pub fn next_shape(&mut self) {
        self.select_shape(self.shape_index + 1);
    }

    pub fn prev_shape(&mut self) {
        if self.shape_index > 0 {
            self.select_shape(self.shape_index - 1);
        }
    }

    /// Undo the current annotation: reset the shape in place rather than
    /// removing it, so the slot index stays stable. Ignored for a required
    /// feature.
    pub fn delete_current(&mut self) {
        let Some(feature) = self.features.get(self.feature_index) else {
            return;
        };
        if feature.required {
            log::debug!("delete ignored: feature '{}' is required", feature.name);
            return;
        }
        if let Some(shape) = self.current_shape_mut() {
            shape.reset(None);
        }
        self.dirty = true;
    }

    /// Switch between panning and annotating.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Choose the kind for new shapes; also switches to annotate mode.
    /// Ignored while the current feature's constraint locks the selector.
    pub fn set_kind(&mut self, kind: ShapeKind) {
        if self.kind_locked() {
            log::debug!("kind selector is locked by the feature constraint");
            return;
        }
        self.selected_kind = kind;
        self.mode = Mode::Annotate;
    }

    /// Whether the kind selector is locked by the current feature.
    pub fn kind_locked(&self) -> bool {
        self.current_feature()
            .is_some_and(|f| f.constraint.kind().is_some())
    }

    /// Enabled flags and title for the host's controls.
    pub fn control_state(&self) -> ControlState {
        let n = self.features.len();
        let feature = self.features.get(self.feature_index);
        let shapes: &[Shape] = feature.map(|f| f.shapes.as_slice()).unwrap_or(&[]);
        let current_valid = shapes.get(self.shape_index).is_some_and(|s| s.valid);
        let next_valid = shapes.get(self.shape_index + 1).is_some_and(|s| s.valid);

        ControlState {
            prev_feature: self.feature_index > 0,
            next_feature: self.feature_index + 1 < n,
            prev_shape: self.shape_index > 0,
            next_shape: current_valid || next_valid,
            delete: current_valid && feature.is_some_and(|f| !f.required),
            kind_locked: self.kind_locked(),
            title: feature.map(|f| {
                format!("Annotating: {} ({}/{})", f.name, self.feature_index + 1, n)
            }),
        }
    }

    // ========================================================================
    // Pointer state machine
    // ========================================================================

    /// Begin a drag at local surface coordinates. Ignored while a drag is
    /// already active. In annotate mode the current shape is restarted as a
    /// fresh shape of the selected kind; a polygon is seeded with the
    /// preview of its first vertex at the anchor.
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if self.drag.active {
            return;
        }
        self.drag.anchor = (x, y);
        self.drag.last = (x, y);

        if self.mode == Mode::Annotate {
            let anchor_img = self.viewport.screen_to_image(x, y);
            let kind = self.selected_kind;
            match self.current_shape_mut() {
                Some(shape) => {
                    shape.reset(Some(kind));
                    shape.valid = true;
                    if let ShapeGeom::Poly { vertices } = &mut shape.geom {
                        vertices.push(anchor_img);
                    }
                }
                // Nothing to draw into (no features)
                None => return,
            }
            if kind == ShapeKind::Poly {
                self.drag.vertex_count = 1;
            }
            self.dirty = true;
        }
        self.drag.active = true;
    }

    /// Continue an active drag. Panning applies each move's own delta and
    /// advances the anchor; annotating redefines the box from the original
    /// anchor every move, or rewrites the polygon vertex currently being
    /// previewed.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if !self.drag.active {
            return;
        }
        self.drag.last = (x, y);
        let dx = x - self.drag.anchor.0;
        let dy = y - self.drag.anchor.1;

        match self.mode {
            Mode::Pan => {
                self.viewport.pan(dx, dy);
                self.drag.anchor = (x, y);
            }
            Mode::Annotate => {
                let anchor_img = self
                    .viewport
                    .screen_to_image(self.drag.anchor.0, self.drag.anchor.1);
                let live_img = self.viewport.screen_to_image(x, y);
                let slot = self.drag.vertex_count.saturating_sub(1);
                if let Some(shape) = self.current_shape_mut() {
                    match &mut shape.geom {
                        ShapeGeom::Rect { corners } => {
                            corners[0] = anchor_img;
                            corners[1] = live_img;
                        }
                        ShapeGeom::Poly { vertices } => {
                            if slot < vertices.len() {
                                vertices[slot] = live_img;
                            } else if slot == vertices.len() {
                                vertices.push(live_img);
                            }
                        }
                    }
                    self.dirty = true;
                }
            }
        }
    }

    /// End or continue the drag, depending on mode and shape kind.
    ///
    /// A box commits only if the drag actually moved (anchor differing from
    /// the pointer in both axes); a stationary click keeps the drag alive so
    /// it can never produce a zero-size box. A moved polygon drag places its
    /// vertex and keeps going; a stationary click with at least 2 vertices
    /// stored finishes the polygon.
    pub fn pointer_up(&mut self) {
        if !self.drag.active {
            return;
        }
        let moved = self.drag.anchor.0 != self.drag.last.0 && self.drag.anchor.1 != self.drag.last.1;

        match self.mode {
            Mode::Pan => {
                self.drag.active = false;
            }
            Mode::Annotate => match self.current_shape().map(|s| s.kind()) {
                Some(ShapeKind::Rect) => {
                    if moved {
                        self.drag.active = false;
                        log::debug!("box committed");
                    }
                }
                Some(ShapeKind::Poly) => {
                    if moved {
                        self.drag.anchor = self.drag.last;
                        self.drag.vertex_count += 1;
                    } else if self.current_shape().is_some_and(|s| s.point_count() >= 2) {
                        self.drag.active = false;
                        log::debug!(
                            "polygon committed with {} vertices",
                            self.current_shape().map_or(0, |s| s.point_count())
                        );
                    }
                }
                None => {
                    self.drag.active = false;
                }
            },
        }

        if !self.drag.active {
            self.dirty = true;
        }
    }

    /// Abandon an in-progress drag, discarding the shape being drawn. The
    /// host typically wires this to Escape.
    pub fn cancel_drag(&mut self) {
        if !self.drag.active {
            return;
        }
        self.drag.active = false;
        self.drag.vertex_count = 0;
        if self.mode == Mode::Annotate {
            if let Some(shape) = self.current_shape_mut() {
                shape.reset(None);
            }
        }
        self.dirty = true;
        log::debug!("drag cancelled");
    }

    /// Zoom in one step.
    pub fn zoom_in(&mut self) {
        self.viewport.zoom(ZOOM_IN_FACTOR);
    }

    /// Zoom out one step.
    pub fn zoom_out(&mut self) {
        self.viewport.zoom(ZOOM_OUT_FACTOR);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature_index(&self) -> usize {
        self.feature_index
    }

    pub fn shape_index(&self) -> usize {
        self.shape_index
    }

    pub fn current_feature(&self) -> Option<&Feature> {
        self.features.get(self.feature_index)
    }

    pub fn current_shape(&self) -> Option<&Shape> {
        self.current_feature()?.shapes.get(self.shape_index)
    }

    fn current_shape_mut(&mut self) -> Option<&mut Shape> {
        self.features
            .get_mut(self.feature_index)?
            .shapes
            .get_mut(self.shape_index)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selected_kind(&self) -> ShapeKind {
        self.selected_kind
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.active
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Styling supplied at construction, forwarded verbatim to the host.
    pub fn style(&self) -> Option<&StyleConfig> {
        self.style.as_ref()
    }

    /// Whether anything changed since the last repaint.
    pub fn needs_repaint(&self) -> bool {
        self.dirty || self.viewport.is_dirty()
    }

    /// Clear the repaint request. Call after redrawing.
    pub fn clear_repaint(&mut self) {
        self.dirty = false;
        self.viewport.clear_dirty();
    }
}
