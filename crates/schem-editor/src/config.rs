//! Editor tuning knobs.
//!
//! Every field has a default, so a partial JSON object (or none at all)
//! deserializes into a working configuration.

use schem_core::HitOptions;
use serde::{Deserialize, Serialize};

/// Configuration for pointer interaction and the view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Pick radii used when resolving the element under the pointer.
    pub hit: HitOptions,

    /// Screen distance (px) the pointer must travel from a grabbed node
    /// before a grab direction is chosen. Coming back inside this radius
    /// clears the direction again.
    pub grab_threshold_px: f64,

    /// Angular tolerance (radians) for treating an extend drag as running
    /// back along one of the node's existing edges.
    pub reverse_tolerance: f64,

    /// Model-space grid pitch that drag targets snap to. `0` disables
    /// snapping.
    pub grid: f64,

    /// Per wheel-delta-unit zoom factor.
    pub zoom_base: f64,

    /// Smallest allowed view scale (screen px per model unit).
    pub min_scale: f64,

    /// Largest allowed view scale.
    pub max_scale: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hit: HitOptions::default(),
            grab_threshold_px: 20.0,
            reverse_tolerance: 0.01,
            grid: 1.0,
            zoom_base: 1.0013,
            min_scale: 0.01,
            max_scale: 100_000.0,
        }
    }
}
