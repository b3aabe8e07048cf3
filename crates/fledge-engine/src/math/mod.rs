//! Small 2D math helpers shared by the renderer and the components.

use glam::{Affine2, Vec2};

mod rect;

pub use rect::{Rect, RectI};

/// Move `value` toward `target` by at most `delta`, without overshooting.
pub fn approach(value: f32, target: f32, delta: f32) -> f32 {
    if value < target {
        (value + delta).min(target)
    } else {
        (value - delta).max(target)
    }
}

/// Vector form of [`approach`]: steps along the straight line to `target`.
pub fn approach_vec2(value: Vec2, target: Vec2, delta: f32) -> Vec2 {
    if (target - value).length() <= delta {
        return target;
    }
    value + (target - value).normalize() * delta
}

/// Compose a sprite transform: translate to `position`, rotate, scale,
/// with `origin` as the pivot point.
pub fn transform(position: Vec2, origin: Vec2, scale: Vec2, rotation: f32) -> Affine2 {
    Affine2::from_translation(position)
        * Affine2::from_angle(rotation)
        * Affine2::from_scale(scale)
        * Affine2::from_translation(-origin)
}
