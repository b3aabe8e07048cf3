use glam::Vec2;

use crate::math::Rect;
use crate::renderer::backend::Texture;

/// A rectangular region of a texture, in pixel coordinates.
/// Sprites and tiles are subtextures into a packed atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Subtexture {
    pub texture: Texture,
    pub rect: Rect,
}

impl Subtexture {
    pub fn new(texture: Texture, rect: Rect) -> Self {
        Self { texture, rect }
    }

    /// The whole texture as a subtexture.
    pub fn whole(texture: Texture) -> Self {
        Self {
            texture,
            rect: Rect::new(0.0, 0.0, texture.width as f32, texture.height as f32),
        }
    }

    pub fn width(&self) -> f32 {
        self.rect.w
    }

    pub fn height(&self) -> f32 {
        self.rect.h
    }

    pub fn size(&self) -> Vec2 {
        self.rect.size()
    }

    /// Normalized UV corners, in quad emission order
    /// (top-left, top-right, bottom-right, bottom-left).
    pub fn uvs(&self) -> [Vec2; 4] {
        let tex = self.texture.size();
        [
            self.rect.top_left() / tex,
            self.rect.top_right() / tex,
            self.rect.bottom_right() / tex,
            self.rect.bottom_left() / tex,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::backend::TextureId;

    #[test]
    fn uvs_are_normalized() {
        let tex = Texture::new(TextureId(1), 128, 64);
        let sub = Subtexture::new(tex, Rect::new(32.0, 16.0, 64.0, 32.0));
        let uvs = sub.uvs();
        assert_eq!(uvs[0], Vec2::new(0.25, 0.25));
        assert_eq!(uvs[2], Vec2::new(0.75, 0.75));
    }

    #[test]
    fn whole_covers_unit_square() {
        let tex = Texture::new(TextureId(1), 32, 32);
        let sub = Subtexture::whole(tex);
        assert_eq!(sub.uvs()[0], Vec2::ZERO);
        assert_eq!(sub.uvs()[2], Vec2::ONE);
    }
}
