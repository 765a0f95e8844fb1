use serde::{Deserialize, Serialize};

/// Playfield bounds in pixels, as last reported by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A zero or non-finite dimension means the surface is mid-resize; the
    /// frame must be skipped.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Map a normalized aim point to arena pixels.
    pub fn to_pixels(&self, nx: f32, ny: f32) -> (f32, f32) {
        (nx * self.width, ny * self.height)
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}
