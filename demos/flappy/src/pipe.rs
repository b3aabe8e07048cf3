use fledge_engine::{Batch, Collider, Component, Ctx, Mask, RectI, SpriteComponent};

use crate::slider::Slider;

/// One pipe of a pair. Top pipes hang down: the sprite flips vertically
/// and the collider extends upward from the gap edge.
pub struct Pipe {
    pub top: bool,
    /// Set by the score check once the bird has cleared this pipe.
    pub scored: bool,
}

impl Pipe {
    pub fn new(top: bool) -> Self {
        Self { top, scored: false }
    }
}

impl Component for Pipe {
    fn awake(&mut self, ctx: &mut Ctx) -> bool {
        ctx.add(Slider::new());
        let sprite_key = ctx.add(SpriteComponent::new("pipe")).key;
        let Some(sprite) = ctx.world.get_mut::<SpriteComponent>(sprite_key) else {
            return false;
        };
        sprite.play("idle");
        let Some(size) = ctx
            .get::<SpriteComponent>()
            .and_then(|s| s.frame_size(ctx.frame.content))
        else {
            return false;
        };

        let rect = if self.top {
            RectI::new(-size.x / 2, -size.y, size.x, size.y)
        } else {
            RectI::new(-size.x / 2, 0, size.x, size.y)
        };
        ctx.add(Collider::rect(rect).with_mask(Mask::ENEMY));
        if self.top {
            if let Some(sprite) = ctx.get_mut::<SpriteComponent>() {
                sprite.scale.y = -1.0;
            }
        }
        true
    }

    fn update(&mut self, ctx: &mut Ctx) {
        // Gone past the left edge: nothing will ever see it again.
        if ctx.position().x < -40 {
            ctx.destroy_entity();
        }
    }

    fn render(&mut self, ctx: &mut Ctx, batch: &mut Batch) {
        if let Some(sprite_key) = ctx.find::<SpriteComponent>() {
            let frame = ctx.frame;
            ctx.world.render_component(sprite_key, &frame, batch);
        }
    }
}
