//! Camera: an entity that chases a target with per-axis inertia and
//! produces the view matrix the application pushes onto the batch.

use glam::{Affine2, IVec2, Vec2};

use crate::ecs::{Component, Ctx, EntityId};
use crate::math::RectI;

pub struct CameraComponent {
    screen_size: IVec2,
    /// Follow responsiveness per axis: 0 = never moves, 1 = locks on.
    inertia: Vec2,
    offset: IVec2,
    /// Sub-pixel follow remainder, same trick as the kinetic mover.
    remainder: Vec2,
    target: Option<EntityId>,
    bounds: RectI,
    fit_to_bounds: bool,
}

impl CameraComponent {
    pub fn new(screen_size: IVec2) -> Self {
        Self {
            screen_size,
            inertia: Vec2::ONE,
            offset: IVec2::ZERO,
            remainder: Vec2::ZERO,
            target: None,
            bounds: RectI::default(),
            fit_to_bounds: false,
        }
    }

    pub fn with_offset(mut self, offset: IVec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_inertia(mut self, inertia: Vec2) -> Self {
        self.inertia = inertia.clamp(Vec2::ZERO, Vec2::ONE);
        self
    }

    /// Start chasing an entity. A stale target is dropped silently.
    pub fn follow(&mut self, entity: EntityId) {
        self.target = Some(entity);
    }

    /// Keep the camera view inside `bounds` from now on.
    pub fn set_bounds(&mut self, bounds: RectI) {
        self.bounds = bounds;
        self.fit_to_bounds = true;
    }

    pub fn fit_to_bounds(&mut self, value: bool) {
        self.fit_to_bounds = value;
    }

    /// View matrix for a camera centered at `camera_pos`: world space
    /// shifted so the camera lands mid-screen.
    pub fn view_matrix(&self, camera_pos: IVec2) -> Affine2 {
        Affine2::from_translation(Vec2::new(
            -camera_pos.x as f32 + self.screen_size.x as f32 / 2.0,
            -camera_pos.y as f32 + self.screen_size.y as f32 / 2.0,
        ))
    }
}

impl Component for CameraComponent {
    fn update(&mut self, ctx: &mut Ctx) {
        if let Some(target) = self.target {
            match ctx.world.get_entity(target) {
                Some(target_entity) => {
                    let target_pos = target_entity.position;
                    let pos = ctx.position();
                    let dx = (target_pos.x as f32
                        - (self.remainder.x + pos.x as f32)
                        - self.offset.x as f32)
                        * self.inertia.x;
                    let dy = (target_pos.y as f32
                        - (self.remainder.y + pos.y as f32)
                        - self.offset.y as f32)
                        * self.inertia.y;

                    self.remainder = Vec2::new(dx - dx.trunc(), dy - dy.trunc());
                    ctx.entity_mut().position += IVec2::new(dx as i32, dy as i32);
                }
                None => self.target = None,
            }
        }

        if self.fit_to_bounds {
            let pos = ctx.position();
            let mut view = RectI::new(
                pos.x - self.screen_size.x / 2,
                pos.y - self.screen_size.y / 2,
                self.screen_size.x,
                self.screen_size.y,
            );
            view.fit_into(&self.bounds);
            ctx.entity_mut().position = view.center();
        }
    }
}
