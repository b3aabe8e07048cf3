pub mod assets;
pub mod components;
pub mod core;
pub mod ecs;
pub mod input;
pub mod math;
pub mod renderer;

// Re-export key types at crate root for convenience
pub use assets::{Content, ContentError, Manifest, MapInfo};
pub use components::{
    CameraComponent, Collider, Hurtable, Kinetic, Mask, SpriteComponent, TileMapComponent,
    TimerComponent,
};
pub use core::{Clock, Frame, FPS, FRAME_DURATION_MS};
pub use ecs::{
    Added, Component, ComponentId, ComponentMeta, Ctx, Entity, EntityId, TypeRegistry, World,
};
pub use input::{Input, Key, MouseButton};
pub use math::{Rect, RectI};
pub use renderer::{
    Batch, BlendMode, Color, ColorMode, DrawBatch, MaterialId, RenderDevice, RenderPass,
    SpriteFont, Subtexture, Target, TextAlign, Texture, TextureId, TextureSampler, Vertex,
};
