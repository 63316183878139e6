//! Model ↔ screen mapping: uniform scale plus a screen-space offset.

use crate::config::EditorConfig;
use schem_core::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// Screen pixels per model unit.
    pub scale: f64,
    /// Screen position of the model origin.
    pub offset: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    pub fn new(scale: f64, offset: Vec2) -> Self {
        Self { scale, offset }
    }

    /// The model → screen transform.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    pub fn to_screen(&self, model: Point) -> Point {
        Point::new(model.x * self.scale, model.y * self.scale) + self.offset
    }

    pub fn to_model(&self, screen: Point) -> Point {
        let p = screen - self.offset;
        Point::new(p.x / self.scale, p.y / self.scale)
    }

    /// Scale by `zoom_base ^ -delta_y` around `screen`, so the model point
    /// under the cursor stays put. The scale is clamped to the configured
    /// range.
    pub fn zoom_at(&mut self, screen: Point, delta_y: f64, cfg: &EditorConfig) {
        let anchor = self.to_model(screen);
        let scale = (self.scale * cfg.zoom_base.powf(-delta_y)).clamp(cfg.min_scale, cfg.max_scale);
        self.scale = scale;
        self.offset = screen.to_vec2() - anchor.to_vec2() * scale;
        log::trace!("zoom: scale {scale} offset {:?}", self.offset);
    }

    /// Shift the view by a screen-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }
}
