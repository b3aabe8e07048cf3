use glam::{IVec2, Vec2};

use crate::ecs::world::ComponentId;

/// A positioned container of components. Entities are created and
/// destroyed only through their owning [`World`](crate::ecs::World); all
/// other code holds [`EntityId`](crate::ecs::EntityId) keys.
pub struct Entity {
    /// World position, in whole pixels.
    pub position: IVec2,
    /// Rotation in radians.
    pub rotation: f32,
    pub scale: Vec2,
    pub(crate) alive: bool,
    pub(crate) components: Vec<ComponentId>,
}

impl Entity {
    pub(crate) fn new(position: IVec2) -> Self {
        Self {
            position,
            rotation: 0.0,
            scale: Vec2::ONE,
            alive: true,
            components: Vec::new(),
        }
    }

    pub fn alive(&self) -> bool {
        self.alive
    }

    /// Attached components, in attach order.
    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }
}
