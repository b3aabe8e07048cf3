//! Gravity/velocity integration into whole-pixel, collision-resolved
//! moves.
//!
//! Speeds are floats; entity positions are integers. Each frame the
//! fractional remainder carries over so slow motion never stalls:
//! `remainder = total - trunc(total)` exactly, every frame. Displacement
//! applies per axis, X then Y, retreating from obstructions one pixel at
//! a time until clear.

use glam::{IVec2, Vec2};

use crate::components::collider::{self, Mask};
use crate::ecs::{Component, ComponentId, Ctx};

type HitCallback = Box<dyn FnMut(&mut Kinetic, &mut Ctx)>;

pub struct Kinetic {
    pub speed: Vec2,
    pub remainder: Vec2,
    /// Added to `speed.y` every frame the entity is airborne.
    pub gravity: f32,
    /// The collider probed for obstructions. Without one, moves apply
    /// unconditionally.
    pub collider: Option<ComponentId>,
    /// Ran instead of `stop_x` when a horizontal move hits a solid.
    pub on_hit_x: Option<HitCallback>,
    /// Ran instead of `stop_y` when a vertical move hits a solid.
    pub on_hit_y: Option<HitCallback>,
}

impl Kinetic {
    pub fn new() -> Self {
        Self {
            speed: Vec2::ZERO,
            remainder: Vec2::ZERO,
            gravity: 0.35,
            collider: None,
            on_hit_x: None,
            on_hit_y: None,
        }
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_collider(mut self, collider: ComponentId) -> Self {
        self.collider = Some(collider);
        self
    }

    pub fn stop_x(&mut self) {
        self.speed.x = 0.0;
        self.remainder.x = 0.0;
    }

    pub fn stop_y(&mut self) {
        self.speed.y = 0.0;
        self.remainder.y = 0.0;
    }

    pub fn stop(&mut self) {
        self.stop_x();
        self.stop_y();
    }

    /// True when a SOLID collider sits `dist` pixels straight down.
    /// Always false without a collider.
    pub fn on_ground_at(&self, ctx: &Ctx, dist: i32) -> bool {
        match self.collider {
            Some(key) => {
                collider::check(ctx.world, key, Mask::SOLID, IVec2::new(0, dist)).is_some()
            }
            None => false,
        }
    }

    pub fn on_ground(&self, ctx: &Ctx) -> bool {
        self.on_ground_at(ctx, 1)
    }

    /// Displace the entity horizontally by `amount` pixels, resolving
    /// against SOLID colliders. On obstruction the displacement retreats
    /// toward zero until the blocking collider no longer overlaps, then
    /// the X hit callback runs (or `stop_x` when none is set).
    pub fn move_x(&mut self, ctx: &mut Ctx, amount: i32) {
        self.move_axis(ctx, IVec2::new(amount, 0));
    }

    /// Vertical counterpart of [`move_x`](Self::move_x).
    pub fn move_y(&mut self, ctx: &mut Ctx, amount: i32) {
        self.move_axis(ctx, IVec2::new(0, amount));
    }

    fn move_axis(&mut self, ctx: &mut Ctx, amount: IVec2) {
        let horizontal = amount.y == 0;
        let magnitude = if horizontal { amount.x } else { amount.y };
        if magnitude == 0 {
            return;
        }

        let Some(own) = self.collider else {
            ctx.entity_mut().position += amount;
            return;
        };

        match collider::check(ctx.world, own, Mask::SOLID, amount) {
            None => {
                ctx.entity_mut().position += amount;
            }
            Some(hit) => {
                // Retreat one pixel at a time until the blocking collider
                // clears; lands on the largest same-sign displacement with
                // no overlap, possibly zero.
                let sign = magnitude.signum();
                let mut a = magnitude;
                while a != 0 {
                    let offset = if horizontal {
                        IVec2::new(a, 0)
                    } else {
                        IVec2::new(0, a)
                    };
                    if !collider::overlaps(ctx.world, own, hit, offset) {
                        break;
                    }
                    a -= sign;
                }
                ctx.entity_mut().position += if horizontal {
                    IVec2::new(a, 0)
                } else {
                    IVec2::new(0, a)
                };

                let callback = if horizontal {
                    self.on_hit_x.take()
                } else {
                    self.on_hit_y.take()
                };
                match callback {
                    Some(mut hit_fn) => {
                        hit_fn(self, ctx);
                        // Restore unless the callback installed a new one.
                        let slot = if horizontal {
                            &mut self.on_hit_x
                        } else {
                            &mut self.on_hit_y
                        };
                        if slot.is_none() {
                            *slot = Some(hit_fn);
                        }
                    }
                    None => {
                        if horizontal {
                            self.stop_x();
                        } else {
                            self.stop_y();
                        }
                    }
                }
            }
        }
    }
}

impl Default for Kinetic {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Kinetic {
    fn update(&mut self, ctx: &mut Ctx) {
        if !self.on_ground(ctx) {
            self.speed.y += self.gravity;
        }

        let total = self.remainder + self.speed;
        let moved = IVec2::new(total.x as i32, total.y as i32);
        self.remainder = Vec2::new(total.x - moved.x as f32, total.y - moved.y as f32);

        self.move_x(ctx, moved.x);
        if !ctx.alive() {
            return;
        }
        self.move_y(ctx, moved.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Content;
    use crate::components::collider::Collider;
    use crate::core::{Clock, Frame};
    use crate::ecs::{EntityId, World};
    use crate::input::Input;
    use crate::math::RectI;

    fn services() -> (Content, Input, Clock) {
        (Content::default(), Input::default(), Clock::default())
    }

    /// Entity at `pos` with a 10x10 SOLID rect collider and a kinetic.
    fn spawn_mover(world: &mut World, frame: &Frame, pos: IVec2) -> (EntityId, ComponentId) {
        let e = world.add_entity(pos);
        let collider = world
            .add(e, Collider::rect(RectI::new(0, 0, 10, 10)).with_mask(Mask::SOLID), frame)
            .key;
        let kinetic = world.add(e, Kinetic::new().with_collider(collider), frame).key;
        (e, kinetic)
    }

    fn spawn_wall(world: &mut World, frame: &Frame, pos: IVec2, rect: RectI) {
        let e = world.add_entity(pos);
        world.add(e, Collider::rect(rect).with_mask(Mask::SOLID), frame);
    }

    #[test]
    fn unobstructed_move_applies_exactly() {
        let (content, input, clock) = services();
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();
        let (e, kinetic) = spawn_mover(&mut world, &frame, IVec2::ZERO);

        let mut k = Kinetic::new().with_collider(world.find::<Collider>(e).unwrap());
        let mut ctx = Ctx {
            world: &mut world,
            frame,
            entity: e,
            key: kinetic,
        };
        k.move_x(&mut ctx, 7);
        k.move_y(&mut ctx, -3);
        assert_eq!(world.entity(e).position, IVec2::new(7, -3));
    }

    #[test]
    fn blocked_move_stops_flush_and_is_stable() {
        let (content, input, clock) = services();
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();
        let (e, kinetic) = spawn_mover(&mut world, &frame, IVec2::ZERO);
        spawn_wall(&mut world, &frame, IVec2::new(15, 0), RectI::new(0, 0, 10, 10));

        let collider = world.find::<Collider>(e).unwrap();
        let mut k = Kinetic::new().with_collider(collider);
        k.speed.x = 5.0;

        {
            let mut ctx = Ctx {
                world: &mut world,
                frame,
                entity: e,
                key: kinetic,
            };
            // Destination [8,18) overlaps the wall [15,25); retreat lands
            // flush: right edge at 15 means x = 5.
            k.move_x(&mut ctx, 8);
        }
        assert_eq!(world.entity(e).position.x, 5);
        // The axis stopped.
        assert_eq!(k.speed.x, 0.0);
        assert_eq!(k.remainder.x, 0.0);

        {
            let mut ctx = Ctx {
                world: &mut world,
                frame,
                entity: e,
                key: kinetic,
            };
            // From contact, the same move resolves to zero net movement.
            k.move_x(&mut ctx, 8);
        }
        assert_eq!(world.entity(e).position.x, 5);
    }

    #[test]
    fn hit_callback_replaces_stop() {
        let (content, input, clock) = services();
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();
        let (e, kinetic) = spawn_mover(&mut world, &frame, IVec2::ZERO);
        spawn_wall(&mut world, &frame, IVec2::new(12, 0), RectI::new(0, 0, 10, 10));

        let collider = world.find::<Collider>(e).unwrap();
        let mut k = Kinetic::new().with_collider(collider);
        k.speed.x = 4.0;
        k.on_hit_x = Some(Box::new(|k, _ctx| {
            // A bounce: flip instead of stopping.
            k.speed.x = -k.speed.x;
        }));

        let mut ctx = Ctx {
            world: &mut world,
            frame,
            entity: e,
            key: kinetic,
        };
        k.move_x(&mut ctx, 6);

        assert_eq!(world.entity(e).position.x, 2);
        assert_eq!(k.speed.x, -4.0);
        assert!(k.on_hit_x.is_some(), "callback is restored after the hit");
    }

    #[test]
    fn without_collider_moves_are_unconditional() {
        let (content, input, clock) = services();
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();
        let e = world.add_entity(IVec2::ZERO);
        let key = world.add(e, Kinetic::new(), &frame).key;
        spawn_wall(&mut world, &frame, IVec2::new(2, 0), RectI::new(0, 0, 10, 10));

        let mut k = Kinetic::new();
        let mut ctx = Ctx {
            world: &mut world,
            frame,
            entity: e,
            key,
        };
        k.move_x(&mut ctx, 100);
        assert!(!k.on_ground(&ctx));
        assert_eq!(world.entity(e).position.x, 100);
    }

    #[test]
    fn on_ground_probes_one_pixel_down() {
        let (content, input, clock) = services();
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();
        let (e, kinetic) = spawn_mover(&mut world, &frame, IVec2::ZERO);
        // Floor flush under the mover: mover spans y [0,10), floor starts at 10.
        spawn_wall(&mut world, &frame, IVec2::new(0, 10), RectI::new(0, 0, 10, 10));

        let collider = world.find::<Collider>(e).unwrap();
        let k = Kinetic::new().with_collider(collider);
        let ctx = Ctx {
            world: &mut world,
            frame,
            entity: e,
            key: kinetic,
        };
        assert!(k.on_ground(&ctx));
        assert!(!k.on_ground_at(&ctx, -1));
    }

    #[test]
    fn gravity_integration_is_subpixel_exact() {
        let (content, input, clock) = services();
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();
        let e = world.add_entity(IVec2::ZERO);
        world.add(e, Kinetic::new().with_gravity(0.35), &frame);

        // Free fall: after every frame, integer position plus remainder
        // equals the exact sum of per-frame speeds.
        let mut expected = 0.0f32;
        let mut speed = 0.0f32;
        for frame_index in 0..120 {
            world.update(&frame);
            speed += 0.35;
            expected += speed;

            let kinetic_key = world.find::<Kinetic>(e).unwrap();
            let k = world.get::<Kinetic>(kinetic_key).unwrap();
            let integrated = world.entity(e).position.y as f32 + k.remainder.y;
            assert!(
                (integrated - expected).abs() < 0.05,
                "frame {}: integrated {} != expected {}",
                frame_index,
                integrated,
                expected
            );
            assert!(k.remainder.y.abs() < 1.0);
        }
        // It actually fell a long way.
        assert!(world.entity(e).position.y > 2000);
    }

    #[test]
    fn falling_mover_comes_to_rest_on_floor() {
        let (content, input, clock) = services();
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();
        let (e, _) = spawn_mover(&mut world, &frame, IVec2::ZERO);
        // Floor at y = 40.
        spawn_wall(&mut world, &frame, IVec2::new(0, 40), RectI::new(-20, 0, 60, 10));

        for _ in 0..120 {
            world.update(&frame);
        }

        // Resting flush: mover bottom (pos.y + 10) at the floor top (40).
        assert_eq!(world.entity(e).position.y, 30);
        let k_key = world.find::<Kinetic>(e).unwrap();
        let k = world.get::<Kinetic>(k_key).unwrap();
        assert_eq!(k.speed.y, 0.0);
        assert_eq!(k.remainder.y, 0.0);

        // And it stays put.
        world.update(&frame);
        assert_eq!(world.entity(e).position.y, 30);
    }
}
