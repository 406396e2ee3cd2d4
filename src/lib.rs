//! Interactive image annotation core.
//!
//! A toolkit-independent core for drawing and editing geometric annotations
//! (boxes, polygons) over an image inside a pannable, zoomable 2D view, with
//! JSON import/export keyed by named features. The host application supplies
//! the widgets, the image loader, and a [`render::DrawSurface`]; this crate
//! owns the viewport transform, the pointer-driven drawing state machine, and
//! the feature/shape collections.

pub mod config;
pub mod constants;
pub mod format;
pub mod model;
pub mod render;
pub mod session;
pub mod viewport;

pub use config::{AnnotatorConfig, ConfigError, StyleConfig};
pub use format::{AnnotationData, FeatureDef, FormatError, ShapeData, ShapeList, Size};
pub use model::{Feature, Point, Shape, ShapeConstraint, ShapeGeom, ShapeKind};
pub use render::{Color, DrawSurface, Renderer};
pub use session::{AnnotationSession, ControlState, CursorHint, Mode};
pub use viewport::Viewport;
