pub mod backend;
pub mod batch;
pub mod blend;
pub mod color;
pub mod font;
pub mod subtexture;

pub use backend::{
    MaterialId, RenderDevice, RenderPass, Target, Texture, TextureFilter, TextureId,
    TextureSampler, Vertex,
};
pub use batch::{Batch, DrawBatch, TextAlign};
pub use blend::BlendMode;
pub use color::{Color, ColorMode};
pub use font::{Glyph, SpriteFont};
pub use subtexture::Subtexture;
