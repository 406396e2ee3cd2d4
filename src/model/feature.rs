//! Feature data model: a named, possibly shape-constrained annotation slot.

use serde::{Deserialize, Serialize};

use crate::model::{Shape, ShapeKind};

/// Shape-kind constraint for a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeConstraint {
    Rect,
    Poly,
    #[default]
    Any,
}

impl ShapeConstraint {
    /// The locked kind, or `None` for an unconstrained feature.
    pub fn kind(&self) -> Option<ShapeKind> {
        match self {
            ShapeConstraint::Rect => Some(ShapeKind::Rect),
            ShapeConstraint::Poly => Some(ShapeKind::Poly),
            ShapeConstraint::Any => None,
        }
    }

    pub fn allows(&self, kind: ShapeKind) -> bool {
        self.kind().is_none_or(|k| k == kind)
    }
}

/// A named annotation slot holding zero or more shapes.
///
/// When `constraint` is not [`ShapeConstraint::Any`], every stored shape
/// matches it (enforced at import and by the session's kind lock).
/// `required` blocks the UI-level delete of the feature's annotation; the
/// session enforces this, not the feature itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: String,
    pub required: bool,
    pub constraint: ShapeConstraint,
    pub shapes: Vec<Shape>,
}

impl Feature {
    pub fn new(name: &str, required: bool, constraint: ShapeConstraint) -> Self {
        Self {
            name: name.to_string(),
            required,
            constraint,
            shapes: Vec::new(),
        }
    }

    /// Count of committed (exportable) shapes.
    pub fn valid_count(&self) -> usize {
        self.shapes.iter().filter(|s| s.valid).count()
    }
}
