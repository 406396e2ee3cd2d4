//! Construction payload for the annotator.
//!
//! The host hands over one [`AnnotatorConfig`] — usually deserialized from
//! its own JSON — naming the image, the drawing-surface dimensions, the
//! features to annotate, and optionally previously exported annotation data
//! plus styling for the host's widgets.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_VIEW_HEIGHT, DEFAULT_VIEW_WIDTH};
use crate::format::{AnnotationData, FeatureDef};

/// Widget styling forwarded verbatim to the host UI layer. The core stores
/// it and hands it back; it never inspects the contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    /// CSS classes for the host's buttons
    #[serde(default)]
    pub classes: Vec<String>,

    /// CSS property/value pairs for the host's buttons
    #[serde(default)]
    pub css: HashMap<String, String>,
}

/// Construction payload for [`crate::session::AnnotationSession`].
///
/// `src` and `features` are required; deserializing a payload without them
/// fails, and an empty `src` or feature list is rejected by
/// [`AnnotatorConfig::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    /// Image reference, handed to the host's image loader
    pub src: String,

    /// Drawing-surface width in pixels
    #[serde(default = "default_width")]
    pub width: f32,

    /// Drawing-surface height in pixels
    #[serde(default = "default_height")]
    pub height: f32,

    /// Features to annotate, in display order
    pub features: Vec<FeatureDef>,

    /// Previously exported annotation data to start from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<AnnotationData>,

    /// Host widget styling, forwarded untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleConfig>,
}

fn default_width() -> f32 {
    DEFAULT_VIEW_WIDTH
}

fn default_height() -> f32 {
    DEFAULT_VIEW_HEIGHT
}

impl AnnotatorConfig {
    /// Parse a config from the host's JSON payload.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the required inputs. Fails fast so no partially working
    /// annotator is ever built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.src.trim().is_empty() {
            return Err(ConfigError::MissingSource);
        }
        if self.features.is_empty() {
            return Err(ConfigError::MissingFeatures);
        }
        Ok(())
    }
}

/// Errors raised while building an annotator from its config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No image source was supplied
    #[error("input src (image source) is required")]
    MissingSource,

    /// No features were supplied
    #[error("input feature array is required and must not be empty")]
    MissingFeatures,

    /// The payload itself failed to parse
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
