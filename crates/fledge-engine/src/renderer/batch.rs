//! Deferred 2D sprite batcher.
//!
//! Geometry calls accumulate vertices and indices into shared buffers.
//! Draws sharing one material/texture/blend/sampler configuration form a
//! [`DrawBatch`]; whenever one of those states changes while geometry is
//! pending, the open batch is sealed and a new one starts. Nothing touches
//! the GPU until [`Batch::render`] hands the buffers to a [`RenderDevice`].

use glam::{Affine2, Mat4, Vec2};

use crate::renderer::backend::{
    MaterialId, RenderDevice, RenderPass, Target, Texture, TextureSampler, Vertex,
};
use crate::renderer::blend::BlendMode;
use crate::renderer::color::{Color, ColorMode};
use crate::renderer::font::SpriteFont;
use crate::renderer::subtexture::Subtexture;

/// A contiguous run of triangles sharing one draw configuration.
/// `offset` and `elements` are counted in triangles; the indices live in
/// the owning [`Batch`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawBatch {
    pub offset: usize,
    pub elements: usize,
    pub material: Option<MaterialId>,
    pub texture: Option<Texture>,
    pub sampler: TextureSampler,
    pub blend: BlendMode,
}

impl DrawBatch {
    fn new(sampler: TextureSampler) -> Self {
        Self {
            offset: 0,
            elements: 0,
            material: None,
            texture: None,
            sampler,
            blend: BlendMode::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Centered,
}

pub struct Batch {
    /// Sampler applied to batches that never set one explicitly. Set on clear.
    pub default_sampler: TextureSampler,

    matrix: Affine2,
    color_mode: ColorMode,

    vertices: Vec<Vertex>,
    indices: Vec<u32>,

    batches: Vec<DrawBatch>,
    current: DrawBatch,

    matrix_stack: Vec<Affine2>,
    material_stack: Vec<Option<MaterialId>>,
    blend_stack: Vec<BlendMode>,
    color_mode_stack: Vec<ColorMode>,
}

impl Batch {
    pub fn new() -> Self {
        let sampler = TextureSampler::default();
        Self {
            default_sampler: sampler,
            matrix: Affine2::IDENTITY,
            color_mode: ColorMode::Normal,
            vertices: Vec::new(),
            indices: Vec::new(),
            batches: Vec::new(),
            current: DrawBatch::new(sampler),
            matrix_stack: Vec::new(),
            material_stack: Vec::new(),
            blend_stack: Vec::new(),
            color_mode_stack: Vec::new(),
        }
    }

    // -- state stacks --

    /// Push the current matrix and make `m` active. With `absolute = false`
    /// the new matrix composes under the current one (geometry passed to
    /// subsequent calls is transformed by `m` first); with `absolute = true`
    /// it replaces the active matrix outright.
    pub fn push_matrix(&mut self, m: Affine2, absolute: bool) {
        self.matrix_stack.push(self.matrix);
        if absolute {
            self.matrix = m;
        } else {
            self.matrix = self.matrix * m;
        }
    }

    /// Restore the matrix active before the matching push. Returns the
    /// matrix that was popped.
    pub fn pop_matrix(&mut self) -> Affine2 {
        let was = self.matrix;
        self.matrix = self
            .matrix_stack
            .pop()
            .expect("pop_matrix without a matching push_matrix");
        was
    }

    pub fn peek_matrix(&self) -> Affine2 {
        self.matrix
    }

    pub fn push_material(&mut self, material: MaterialId) {
        self.material_stack.push(self.current.material);
        self.seal();
        self.current.material = Some(material);
    }

    pub fn pop_material(&mut self) {
        self.seal();
        self.current.material = self.material_stack.pop().unwrap_or(None);
    }

    pub fn push_blend(&mut self, blend: BlendMode) {
        self.blend_stack.push(self.current.blend);
        self.seal();
        self.current.blend = blend;
    }

    pub fn pop_blend(&mut self) {
        self.seal();
        self.current.blend = self.blend_stack.pop().unwrap_or_default();
    }

    pub fn push_color_mode(&mut self, mode: ColorMode) {
        self.color_mode_stack.push(self.color_mode);
        self.color_mode = mode;
    }

    pub fn pop_color_mode(&mut self) -> ColorMode {
        let was = self.color_mode;
        self.color_mode = self.color_mode_stack.pop().unwrap_or_default();
        was
    }

    pub fn peek_color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Set the texture for subsequent geometry. Swapping textures over an
    /// empty open batch is free; with pending geometry the open batch is
    /// sealed first so already-emitted quads keep their texture.
    pub fn set_texture(&mut self, texture: Texture) {
        let same = self.current.texture.map(|t| t.id) == Some(texture.id);
        if !same && self.current.texture.is_some() {
            self.seal();
        }
        if !same {
            self.current.texture = Some(texture);
        }
    }

    /// Seal the open batch if it holds any triangles, then continue
    /// accumulating at the next triangle offset with the same state.
    fn seal(&mut self) {
        if self.current.elements > 0 {
            self.batches.push(self.current);
            self.current.offset += self.current.elements;
            self.current.elements = 0;
        }
    }

    // -- geometry emission --

    fn push_indices(&mut self, relative: &[u32], triangles: usize) {
        let base = self.vertices.len() as u32;
        self.indices.extend(relative.iter().map(|i| base + i));
        self.current.elements += triangles;
    }

    fn push_vertex(&mut self, position: Vec2, uv: Vec2, color: Color, mult: u8, wash: u8, fill: u8) {
        let p = self.matrix.transform_point2(position);
        self.vertices.push(Vertex {
            position: [p.x, p.y],
            uv: [uv.x, uv.y],
            color,
            mult,
            wash,
            fill,
            pad: 0,
        });
    }

    /// Solid quad from four corners, wound clockwise.
    pub fn quad_corners(&mut self, p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, color: Color) {
        self.push_indices(&[0, 1, 2, 0, 2, 3], 2);
        let uvs = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        for (p, uv) in [p0, p1, p2, p3].into_iter().zip(uvs) {
            self.push_vertex(p, uv, color, 0, 255, 255);
        }
    }

    /// Axis-aligned solid quad.
    pub fn quad(&mut self, pos: Vec2, size: Vec2, color: Color) {
        self.quad_corners(
            pos,
            Vec2::new(pos.x + size.x, pos.y),
            pos + size,
            Vec2::new(pos.x, pos.y + size.y),
            color,
        );
    }

    /// Solid triangle.
    pub fn tri(&mut self, p0: Vec2, p1: Vec2, p2: Vec2, color: Color) {
        self.push_indices(&[0, 1, 2], 1);
        for p in [p0, p1, p2] {
            self.push_vertex(p, Vec2::ZERO, color, 0, 255, 255);
        }
    }

    /// A line segment expanded into a quad of thickness `t` along the
    /// segment's perpendicular.
    pub fn line(&mut self, from: Vec2, to: Vec2, t: f32, color: Color) {
        let tangent = (to - from).normalize_or_zero();
        let normal = Vec2::new(tangent.y, -tangent.x) * t * 0.5;
        self.quad_corners(from + normal, from - normal, to - normal, to + normal, color);
    }

    /// Triangle fan approximating a circle. `steps` triangles share the
    /// center; at least 3 are required.
    pub fn circle(&mut self, center: Vec2, radius: f32, steps: u32, color: Color) {
        assert!(steps >= 3, "circle needs at least 3 steps");
        let advance = std::f32::consts::TAU / steps as f32;
        let mut last = center + Vec2::new(radius, 0.0);
        for i in 1..=steps {
            let angle = advance * i as f32;
            let next = center + Vec2::new(radius * angle.cos(), radius * angle.sin());
            self.tri(center, last, next, color);
            last = next;
        }
    }

    /// Textured quad covering the whole texture at `position`.
    pub fn tex(&mut self, texture: Texture, position: Vec2, color: Color) {
        self.tex_sub(&Subtexture::whole(texture), position, color);
    }

    /// Textured quad for a sub-region of its texture.
    pub fn tex_sub(&mut self, sprite: &Subtexture, position: Vec2, color: Color) {
        self.set_texture(sprite.texture);
        self.push_indices(&[0, 1, 2, 0, 2, 3], 2);

        let size = sprite.size();
        let positions = [
            position,
            position + Vec2::new(size.x, 0.0),
            position + size,
            position + Vec2::new(0.0, size.y),
        ];
        let mut uvs = sprite.uvs();
        if sprite.texture.framebuffer {
            for uv in &mut uvs {
                uv.y = 1.0 - uv.y;
            }
        }

        let wash = if self.color_mode == ColorMode::Wash { 255 } else { 0 };
        let mult = if self.color_mode == ColorMode::Normal { 255 } else { 0 };
        for (p, uv) in positions.into_iter().zip(uvs) {
            self.push_vertex(p, uv, color, mult, wash, 0);
        }
    }

    /// Lay out a string glyph by glyph. The pen starts at `position` pushed
    /// down by the font's ascent + descent; each glyph applies its own
    /// offset and advances the pen, including kerning toward the next
    /// character.
    pub fn str(&mut self, font: &SpriteFont, text: &str, position: Vec2, color: Color) {
        self.str_ext(font, text, position, color, 1.0, TextAlign::Left);
    }

    pub fn str_ext(
        &mut self,
        font: &SpriteFont,
        text: &str,
        position: Vec2,
        color: Color,
        scale: f32,
        align: TextAlign,
    ) {
        let origin = Vec2::new(position.x, position.y + font.ascent + font.descent);
        self.push_matrix(
            Affine2::from_scale_angle_translation(Vec2::splat(scale), 0.0, origin),
            false,
        );

        let mut x = match align {
            TextAlign::Left => 0.0,
            TextAlign::Centered => -font.width_of(text) / 2.0,
        };
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            if let Some(glyph) = font.glyph(ch).copied() {
                x += glyph.offset.x;
                self.tex_sub(&glyph.subtexture, Vec2::new(x, glyph.offset.y), color);
            }
            x += font.advance(ch, chars.peek().copied());
        }
        self.pop_matrix();
    }

    // -- flushing --

    /// Flush to `target` under a top-left-origin orthographic projection
    /// sized to it.
    pub fn render(&self, device: &mut dyn RenderDevice, target: Target) {
        let projection = Mat4::orthographic_rh(
            0.0,
            target.width as f32,
            target.height as f32,
            0.0,
            -1.0,
            1.0,
        );
        self.render_with(device, target, projection);
    }

    /// Flush: upload the buffers once, then issue one draw per sealed batch
    /// plus the still-open one, in emission order. No-op without geometry.
    pub fn render_with(&self, device: &mut dyn RenderDevice, target: Target, projection: Mat4) {
        if self.indices.is_empty() {
            return;
        }
        device.upload(&self.vertices, &self.indices);

        let mut draw_calls = 0;
        for b in &self.batches {
            device.draw(&self.pass_for(b, target, projection));
            draw_calls += 1;
        }
        if self.current.elements > 0 {
            device.draw(&self.pass_for(&self.current, target, projection));
            draw_calls += 1;
        }
        log::trace!("batch flushed: {} draw calls, {} triangles", draw_calls, self.triangle_count());
    }

    fn pass_for(&self, b: &DrawBatch, target: Target, projection: Mat4) -> RenderPass {
        RenderPass {
            target,
            material: b.material,
            texture: b.texture.map(|t| t.id),
            sampler: b.sampler,
            blend: b.blend,
            projection,
            index_start: b.offset * 3,
            index_count: b.elements * 3,
        }
    }

    /// Reset all stacks, the open batch and the buffers, keeping their heap
    /// capacity for the next frame.
    pub fn clear(&mut self) {
        self.matrix = Affine2::IDENTITY;
        self.color_mode = ColorMode::Normal;
        self.vertices.clear();
        self.indices.clear();
        self.batches.clear();
        self.current = DrawBatch::new(self.default_sampler);
        self.matrix_stack.clear();
        self.material_stack.clear();
        self.blend_stack.clear();
        self.color_mode_stack.clear();
    }

    /// Clear and additionally release the accumulation buffers.
    pub fn dispose(&mut self) {
        self.clear();
        self.vertices = Vec::new();
        self.indices = Vec::new();
        self.batches = Vec::new();
        self.matrix_stack = Vec::new();
        self.material_stack = Vec::new();
        self.blend_stack = Vec::new();
        self.color_mode_stack = Vec::new();
    }

    // -- inspection --

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn sealed_batches(&self) -> &[DrawBatch] {
        &self.batches
    }

    pub fn open_batch(&self) -> &DrawBatch {
        &self.current
    }
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}
