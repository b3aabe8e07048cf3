use fledge_engine::components::collider;
use fledge_engine::{
    Batch, Collider, Component, Ctx, Key, Kinetic, Mask, RectI, SpriteComponent,
};
use glam::{IVec2, Vec2};

use crate::slider::Slider;

const FLAP_SPEED: f32 = -6.0;

pub struct Bird {
    pub dead: bool,
}

impl Bird {
    pub fn new() -> Self {
        Self { dead: false }
    }
}

impl Component for Bird {
    fn awake(&mut self, ctx: &mut Ctx) -> bool {
        let sprite_key = ctx.add(SpriteComponent::new("bird")).key;
        if let Some(sprite) = ctx.world.get_mut::<SpriteComponent>(sprite_key) {
            sprite.play("U");
        }
        let Some(size) = ctx
            .get::<SpriteComponent>()
            .and_then(|s| s.frame_size(ctx.frame.content))
        else {
            return false;
        };

        // Hit box inset from the sprite so near misses feel fair.
        let mut rect = RectI::from_pos_size(-size / 2, size);
        rect.x += 6;
        rect.y += 6;
        rect.w -= 12;
        rect.h -= 6;
        let collider = ctx.add(Collider::rect(rect).with_mask(Mask::SOLID)).key;

        ctx.add(Kinetic::new().with_gravity(0.25).with_collider(collider));
        true
    }

    fn update(&mut self, ctx: &mut Ctx) {
        let Some(kinetic_key) = ctx.find::<Kinetic>() else {
            return;
        };
        let Some(collider_key) = ctx.find::<Collider>() else {
            return;
        };

        // Flap.
        let input = ctx.frame.input;
        let flap = !self.dead
            && (input.pressed(Key::Up) || input.pressed(Key::W) || input.pressed(Key::Space));
        if flap {
            if let Some(kinetic) = ctx.world.get_mut::<Kinetic>(kinetic_key) {
                kinetic.speed = Vec2::new(0.0, FLAP_SPEED);
            }
        }

        // Animation and tilt follow vertical speed.
        let speed_y = ctx
            .world
            .get::<Kinetic>(kinetic_key)
            .map(|k| k.speed.y)
            .unwrap_or(0.0);
        let tilt_rate = if self.dead { 0.2 } else { 0.1 };
        let mut rotation = (speed_y * tilt_rate).min(std::f32::consts::FRAC_PI_2);
        if self.dead && speed_y == 0.0 {
            // Face-down in the dirt.
            rotation = std::f32::consts::FRAC_PI_2;
        }
        if let Some(sprite) = ctx.get_mut::<SpriteComponent>() {
            sprite.play(if speed_y >= 0.0 { "U" } else { "D" });
            sprite.rotation = rotation;
        }

        // Pipes end the run.
        if !self.dead
            && collider::check(ctx.world, collider_key, Mask::ENEMY, IVec2::ZERO).is_some()
        {
            self.dead = true;
            log::info!("bird hit a pipe");
            if let Some(kinetic) = ctx.world.get_mut::<Kinetic>(kinetic_key) {
                kinetic.speed = Vec2::new(0.0, 1.0);
            }
            for key in ctx.world.components_of::<Slider>() {
                if let Some(slider) = ctx.world.get_mut::<Slider>(key) {
                    slider.velocity = 0;
                }
            }
        }
    }

    fn render(&mut self, ctx: &mut Ctx, batch: &mut Batch) {
        if let Some(sprite_key) = ctx.find::<SpriteComponent>() {
            let frame = ctx.frame;
            ctx.world.render_component(sprite_key, &frame, batch);
        }
    }
}
