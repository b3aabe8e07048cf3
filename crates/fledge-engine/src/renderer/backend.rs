//! The seam between the batcher and a GPU backend.
//!
//! The engine never talks to a graphics API directly. It accumulates plain
//! vertex/index data and describes each draw with a [`RenderPass`]; a
//! platform backend implements [`RenderDevice`] and owns every GPU object
//! behind the ids referenced here.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::renderer::blend::BlendMode;
use crate::renderer::color::Color;

/// Identity of a texture owned by the render device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Identity of a material (shader + uniform set) owned by the render device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

/// Descriptor for a device texture: identity plus the dimensions the
/// batcher needs for UV math. `framebuffer` marks render-target textures,
/// which sample upside down and get their V coordinate flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
    pub framebuffer: bool,
}

impl Texture {
    pub fn new(id: TextureId, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            framebuffer: false,
        }
    }

    pub fn size(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width as f32, self.height as f32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFilter {
    #[default]
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureSampler {
    pub filter: TextureFilter,
}

/// A surface draws can target. `Target::BACKBUFFER_ID` is reserved for the
/// window surface by convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub id: u32,
    pub width: u32,
    pub height: u32,
}

impl Target {
    pub const BACKBUFFER_ID: u32 = 0;

    pub fn backbuffer(width: u32, height: u32) -> Self {
        Self {
            id: Self::BACKBUFFER_ID,
            width,
            height,
        }
    }
}

/// One vertex of batched geometry. The mode bytes select, in the fragment
/// stage, how much of the texture color (`mult`), texture alpha (`wash`)
/// and flat vertex color (`fill`) contribute; they are normalized 0-255.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: Color,
    pub mult: u8,
    pub wash: u8,
    pub fill: u8,
    pub pad: u8,
}

/// A single indexed draw, fully described. Produced by
/// [`Batch::render`](crate::renderer::Batch::render), one per
/// state-homogeneous run of triangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPass {
    pub target: Target,
    /// `None` selects the device's default sprite material.
    pub material: Option<MaterialId>,
    pub texture: Option<TextureId>,
    pub sampler: TextureSampler,
    pub blend: BlendMode,
    pub projection: Mat4,
    /// First index into the uploaded index buffer.
    pub index_start: usize,
    /// Number of indices to draw (a multiple of 3).
    pub index_count: usize,
}

/// Contract a platform render backend fulfills. `upload` is called once per
/// flush with the complete buffers, then `draw` once per draw batch.
pub trait RenderDevice {
    fn upload(&mut self, vertices: &[Vertex], indices: &[u32]);

    fn draw(&mut self, pass: &RenderPass);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        // 2 floats position + 2 floats uv + 4 color bytes + 4 mode bytes.
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }

    #[test]
    fn backbuffer_uses_reserved_id() {
        let t = Target::backbuffer(320, 240);
        assert_eq!(t.id, Target::BACKBUFFER_ID);
        assert_eq!((t.width, t.height), (320, 240));
    }
}
