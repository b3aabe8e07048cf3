use fledge_engine::{Batch, Color, Component, Ctx};
use glam::Vec2;

/// Scrolling sky, drawn as two tiled strips that wrap around.
pub struct Background {
    width: i32,
}

impl Background {
    pub fn new(width: i32) -> Self {
        Self { width }
    }
}

impl Component for Background {
    fn update(&mut self, ctx: &mut Ctx) {
        ctx.entity_mut().position.x -= 1;
        if ctx.position().x <= -self.width {
            ctx.entity_mut().position.x = 0;
        }
    }

    fn render(&mut self, ctx: &mut Ctx, batch: &mut Batch) {
        let Some(sky) = ctx
            .frame
            .content
            .find_sprite("sky")
            .and_then(|s| s.animation("idle"))
            .and_then(|a| a.frames.first())
        else {
            return;
        };
        let pos = ctx.position().as_vec2();
        batch.tex_sub(&sky.subtexture, pos, Color::WHITE);
        batch.tex_sub(&sky.subtexture, pos + Vec2::new(self.width as f32, 0.0), Color::WHITE);
    }
}
