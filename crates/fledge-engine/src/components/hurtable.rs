//! Mask-triggered damage callback.

use glam::IVec2;

use crate::components::collider::{self, Mask};
use crate::ecs::{Component, ComponentId, Ctx};

pub type HurtCallback = Box<dyn FnMut(&mut Ctx)>;

/// Every frame, probes the world through its collider; when any collider
/// matching `hurt_by` overlaps, `on_hurt` runs synchronously, same frame.
pub struct Hurtable {
    pub hurt_by: Mask,
    pub collider: Option<ComponentId>,
    pub on_hurt: Option<HurtCallback>,
}

impl Hurtable {
    pub fn new(hurt_by: Mask) -> Self {
        Self {
            hurt_by,
            collider: None,
            on_hurt: None,
        }
    }

    pub fn with_collider(mut self, collider: ComponentId) -> Self {
        self.collider = Some(collider);
        self
    }

    pub fn with_callback(mut self, callback: impl FnMut(&mut Ctx) + 'static) -> Self {
        self.on_hurt = Some(Box::new(callback));
        self
    }
}

impl Component for Hurtable {
    fn update(&mut self, ctx: &mut Ctx) {
        if self.hurt_by.is_empty() {
            return;
        }
        let Some(own) = self.collider else {
            return;
        };
        if collider::check(ctx.world, own, self.hurt_by, IVec2::ZERO).is_some() {
            if let Some(mut hurt) = self.on_hurt.take() {
                hurt(ctx);
                if self.on_hurt.is_none() {
                    self.on_hurt = Some(hurt);
                }
            }
        }
    }
}
