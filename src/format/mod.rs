//! Wire format for feature definitions and annotation data.
//!
//! The import/export schema is deliberately minimal: annotation data is a
//! map from feature name to a shape list, where each shape is either a
//! `rect` (position + size) or a `poly` (point list). Parsing is lenient —
//! a malformed shape is skipped with a warning instead of failing the whole
//! import, since this data is user-supplied.

mod error;

pub use error::FormatError;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Point, Shape, ShapeConstraint, ShapeKind};

/// Pixel size of an exported box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// A single shape on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeData {
    /// Axis-aligned box: top-left corner and size.
    Rect { pos: Point, size: Size },
    /// Polygon as its ordered point list.
    Poly { points: Vec<Point> },
}

impl ShapeData {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeData::Rect { .. } => ShapeKind::Rect,
            ShapeData::Poly { .. } => ShapeKind::Poly,
        }
    }

    /// Decode into a committed [`Shape`]. A box becomes its two corner
    /// points; a polygon keeps its point list. Polygons with fewer than 2
    /// points are rejected.
    pub fn to_shape(&self) -> Result<Shape, FormatError> {
        match self {
            ShapeData::Rect { pos, size } => Ok(Shape::from_corners(
                *pos,
                Point::new(pos.x + size.width, pos.y + size.height),
            )),
            ShapeData::Poly { points } => {
                if points.len() < 2 {
                    return Err(FormatError::invalid_shape(format!(
                        "polygon needs at least 2 points, got {}",
                        points.len()
                    )));
                }
                Ok(Shape::from_vertices(points.clone()))
            }
        }
    }
}

/// The shape list of one feature, as imported and exported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeList {
    pub shapes: Vec<ShapeData>,
}

/// Annotation data keyed by feature name.
pub type AnnotationData = HashMap<String, ShapeList>;

/// One feature definition from the construction payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDef {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    pub shape: ShapeConstraint,
}

/// Parse annotation data from JSON, skipping malformed shape entries.
pub fn parse_annotations(json: &str) -> Result<AnnotationData, FormatError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    annotations_from_value(&value)
}

/// Decode annotation data from an already-parsed JSON value.
///
/// The overall structure must be an object of `{name: {shapes: [...]}}`
/// entries; within a shape list, entries that fail to decode are dropped
/// with a warning rather than poisoning the healthy remainder.
pub fn annotations_from_value(value: &serde_json::Value) -> Result<AnnotationData, FormatError> {
    let map = value
        .as_object()
        .ok_or_else(|| FormatError::invalid_data("annotation data must be an object"))?;

    let mut out = AnnotationData::new();
    for (name, entry) in map {
        let mut list = ShapeList::default();
        let shapes = entry
            .get("shapes")
            .and_then(|s| s.as_array())
            .map(|a| a.as_slice())
            .unwrap_or_default();
        for shape_value in shapes {
            match serde_json::from_value::<ShapeData>(shape_value.clone()) {
                Ok(shape) => list.shapes.push(shape),
                Err(err) => {
                    log::warn!("skipping malformed shape for feature '{}': {}", name, err);
                }
            }
        }
        out.insert(name.clone(), list);
    }
    Ok(out)
}

/// Serialize annotation data to pretty JSON.
pub fn to_json(data: &AnnotationData) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_data_roundtrip() {
        let rect = ShapeData::Rect {
            pos: Point::new(1.0, 2.0),
            size: Size {
                width: 3.0,
                height: 4.0,
            },
        };
        let json = serde_json::to_string(&rect).unwrap();
        assert!(json.contains("\"type\":\"rect\""));
        assert_eq!(serde_json::from_str::<ShapeData>(&json).unwrap(), rect);

        let poly = ShapeData::Poly {
            points: vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
        };
        let json = serde_json::to_string(&poly).unwrap();
        assert!(json.contains("\"type\":\"poly\""));
        assert_eq!(serde_json::from_str::<ShapeData>(&json).unwrap(), poly);
    }

    #[test]
    fn test_rect_to_shape_corners() {
        let rect = ShapeData::Rect {
            pos: Point::new(1.0, 2.0),
            size: Size {
                width: 3.0,
                height: 4.0,
            },
        };
        let shape = rect.to_shape().unwrap();
        assert!(shape.valid);
        assert_eq!(shape.points(), &[Point::new(1.0, 2.0), Point::new(4.0, 6.0)]);
    }

    #[test]
    fn test_short_polygon_rejected() {
        let poly = ShapeData::Poly {
            points: vec![Point::new(1.0, 1.0)],
        };
        assert!(poly.to_shape().is_err());
    }

    #[test]
    fn test_parse_skips_malformed_shapes() {
        let json = r#"{
            "head": {"shapes": [
                {"type": "rect", "pos": {"x": 1, "y": 2}, "size": {"width": 3, "height": 4}},
                {"type": "blob", "radius": 7},
                {"type": "poly", "points": [{"x": 0, "y": 0}, {"x": 1, "y": 1}]}
            ]},
            "tail": {"shapes": []}
        }"#;
        let data = parse_annotations(json).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data["head"].shapes.len(), 2);
        assert!(data["tail"].shapes.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(parse_annotations("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_to_json() {
        let mut data = AnnotationData::new();
        data.insert(
            "head".to_string(),
            ShapeList {
                shapes: vec![ShapeData::Poly {
                    points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
                }],
            },
        );
        let json = to_json(&data).unwrap();
        assert!(json.contains("\"head\""));
        assert!(json.contains("\"poly\""));
    }

    #[test]
    fn test_feature_def_required_defaults_false() {
        let def: FeatureDef = serde_json::from_str(r#"{"name": "head", "shape": "any"}"#).unwrap();
        assert!(!def.required);
        assert_eq!(def.shape, ShapeConstraint::Any);
    }
}
