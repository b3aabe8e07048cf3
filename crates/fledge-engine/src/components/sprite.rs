//! Animated sprite rendering through the content provider.

use glam::{IVec2, Vec2};

use crate::assets::{Animation, Content};
use crate::core::FRAME_DURATION_MS;
use crate::ecs::{Component, Ctx};
use crate::math;
use crate::renderer::{Batch, Color};

/// Draws the current frame of a named sprite animation at the entity's
/// position, pivoted and scaled. The sprite data itself lives in
/// [`Content`]; this component only tracks playback state.
pub struct SpriteComponent {
    sprite_name: String,
    animation_name: String,
    frame_index: usize,
    frame_counter: f32,
    pub scale: Vec2,
    pub rotation: f32,
}

impl SpriteComponent {
    pub fn new(sprite: impl Into<String>) -> Self {
        Self {
            sprite_name: sprite.into(),
            animation_name: String::new(),
            frame_index: 0,
            frame_counter: 0.0,
            scale: Vec2::ONE,
            rotation: 0.0,
        }
    }

    /// Switch animations. Playback restarts only when the name changes.
    pub fn play(&mut self, animation: &str) {
        if self.animation_name != animation {
            self.frame_index = 0;
            self.frame_counter = 0.0;
            self.animation_name = animation.to_string();
        }
    }

    pub fn animation_name(&self) -> &str {
        &self.animation_name
    }

    fn animation<'c>(&self, content: &'c Content) -> Option<&'c Animation> {
        content
            .find_sprite(&self.sprite_name)?
            .animation(&self.animation_name)
    }

    /// Pixel size of the current animation frame.
    pub fn frame_size(&self, content: &Content) -> Option<IVec2> {
        let frame = self.animation(content)?.frames.get(self.frame_index)?;
        Some(IVec2::new(
            frame.subtexture.width() as i32,
            frame.subtexture.height() as i32,
        ))
    }

    /// Total duration of the current animation in milliseconds.
    pub fn animation_duration_ms(&self, content: &Content) -> Option<f32> {
        Some(self.animation(content)?.duration_ms())
    }
}

impl Component for SpriteComponent {
    fn awake(&mut self, ctx: &mut Ctx) -> bool {
        ctx.frame.content.find_sprite(&self.sprite_name).is_some()
    }

    fn update(&mut self, ctx: &mut Ctx) {
        let Some(animation) = self.animation(ctx.frame.content) else {
            return;
        };
        let Some(frame) = animation.frames.get(self.frame_index) else {
            return;
        };
        self.frame_counter += FRAME_DURATION_MS;
        if self.frame_counter > frame.duration_ms {
            self.frame_index += 1;
            self.frame_counter = 0.0;
            if self.frame_index >= animation.frames.len() {
                self.frame_index = 0;
            }
        }
    }

    fn render(&mut self, ctx: &mut Ctx, batch: &mut Batch) {
        let content = ctx.frame.content;
        let Some(sprite) = content.find_sprite(&self.sprite_name) else {
            return;
        };
        let Some(frame) = sprite
            .animation(&self.animation_name)
            .and_then(|a| a.frames.get(self.frame_index))
        else {
            return;
        };
        batch.push_matrix(
            math::transform(
                ctx.position().as_vec2(),
                sprite.pivot,
                self.scale,
                self.rotation,
            ),
            false,
        );
        batch.tex_sub(&frame.subtexture, Vec2::ZERO, Color::WHITE);
        batch.pop_matrix();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Clock, Frame};
    use crate::ecs::World;
    use crate::input::Input;

    fn content() -> Content {
        Content::from_json(
            r#"{
                "atlases": [{ "name": "sheet", "width": 64, "height": 64 }],
                "sprites": {
                    "bird": {
                        "atlas": "sheet",
                        "pivot": [8, 8],
                        "animations": {
                            "fly": [
                                { "rect": [0, 0, 16, 16], "duration_ms": 30 },
                                { "rect": [16, 0, 16, 16], "duration_ms": 30 },
                                { "rect": [32, 0, 16, 16], "duration_ms": 30 }
                            ]
                        }
                    }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn awake_fails_for_unknown_sprite() {
        let content = content();
        let (input, clock) = (Input::default(), Clock::default());
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();

        let e = world.add_entity(IVec2::ZERO);
        assert!(!world.add(e, SpriteComponent::new("ghost"), &frame).awake_ok);
        assert!(world.add(e, SpriteComponent::new("bird"), &frame).awake_ok);
    }

    #[test]
    fn update_advances_and_wraps_frames() {
        let content = content();
        let (input, clock) = (Input::default(), Clock::default());
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();

        let e = world.add_entity(IVec2::ZERO);
        let key = world.add(e, SpriteComponent::new("bird"), &frame).key;
        world.get_mut::<SpriteComponent>(key).unwrap().play("fly");

        // 30 ms per frame at ~16.7 ms per tick: advance every second tick.
        for _ in 0..4 {
            world.update(&frame);
        }
        assert_eq!(world.get::<SpriteComponent>(key).unwrap().frame_index, 2);

        for _ in 0..2 {
            world.update(&frame);
        }
        assert_eq!(world.get::<SpriteComponent>(key).unwrap().frame_index, 0);
    }

    #[test]
    fn play_resets_only_on_change() {
        let content = content();
        let (input, clock) = (Input::default(), Clock::default());
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();

        let e = world.add_entity(IVec2::ZERO);
        let key = world.add(e, SpriteComponent::new("bird"), &frame).key;
        world.get_mut::<SpriteComponent>(key).unwrap().play("fly");
        for _ in 0..2 {
            world.update(&frame);
        }
        let sprite = world.get_mut::<SpriteComponent>(key).unwrap();
        assert_eq!(sprite.frame_index, 1);

        // Same animation: playback continues.
        sprite.play("fly");
        assert_eq!(sprite.frame_index, 1);

        // Different animation: restart.
        sprite.play("other");
        assert_eq!(sprite.frame_index, 0);
    }

    #[test]
    fn frame_size_reads_current_frame() {
        let content = content();
        let mut sprite = SpriteComponent::new("bird");
        sprite.play("fly");
        assert_eq!(sprite.frame_size(&content), Some(IVec2::new(16, 16)));
        assert_eq!(sprite.animation_duration_ms(&content), Some(90.0));
        assert_eq!(SpriteComponent::new("ghost").frame_size(&content), None);
    }

    #[test]
    fn render_pivots_around_entity_position() {
        let content = content();
        let (input, clock) = (Input::default(), Clock::default());
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();

        let e = world.add_entity(IVec2::new(50, 40));
        let key = world.add(e, SpriteComponent::new("bird"), &frame).key;
        world.get_mut::<SpriteComponent>(key).unwrap().play("fly");

        let mut batch = Batch::new();
        world.render::<SpriteComponent>(&mut batch, &frame);

        // One quad, its top-left at position - pivot.
        assert_eq!(batch.triangle_count(), 2);
        assert_eq!(batch.vertices()[0].position, [42.0, 32.0]);
    }
}
