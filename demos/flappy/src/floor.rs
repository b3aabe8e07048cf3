use fledge_engine::{Batch, Collider, Color, Component, Ctx, Mask, RectI};
use glam::Vec2;

use crate::slider::Slider;

/// The scrolling ground strip: two tiled base textures and the SOLID
/// collider everything rests on.
pub struct Floor {
    width: i32,
    height: i32,
}

impl Floor {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    fn base_height(ctx: &Ctx) -> i32 {
        ctx.frame
            .content
            .find_sprite("base")
            .and_then(|s| s.animation("idle"))
            .and_then(|a| a.frames.first())
            .map(|f| f.subtexture.height() as i32)
            .unwrap_or(0)
    }
}

impl Component for Floor {
    fn awake(&mut self, ctx: &mut Ctx) -> bool {
        ctx.add(Slider::new());
        let base_height = Self::base_height(ctx);
        if base_height == 0 {
            return false;
        }
        // Twice the screen wide so the wrap point is never visible.
        ctx.add(
            Collider::rect(RectI::new(
                0,
                self.height - base_height,
                self.width * 2,
                base_height,
            ))
            .with_mask(Mask::SOLID),
        );
        true
    }

    fn update(&mut self, ctx: &mut Ctx) {
        if ctx.position().x <= -self.width {
            ctx.entity_mut().position.x = 0;
        }
    }

    fn render(&mut self, ctx: &mut Ctx, batch: &mut Batch) {
        let Some(base) = ctx
            .frame
            .content
            .find_sprite("base")
            .and_then(|s| s.animation("idle"))
            .and_then(|a| a.frames.first())
        else {
            return;
        };
        let y = (self.height - base.subtexture.height() as i32) as f32;
        let x = ctx.position().x as f32;
        batch.tex_sub(&base.subtexture, Vec2::new(x, y), Color::WHITE);
        batch.tex_sub(&base.subtexture, Vec2::new(x + self.width as f32, y), Color::WHITE);
    }
}
