use std::any::Any;

use crate::ecs::world::Ctx;
use crate::renderer::Batch;

/// Object-safe downcast support. Blanket-implemented, so component types
/// never write the boilerplate themselves.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit of behavior attached to exactly one entity.
///
/// Hooks run synchronously on the frame thread with full world access
/// through [`Ctx`]; they may freely add or remove components and entities,
/// including their own. All three hooks default to doing nothing.
pub trait Component: AsAny + 'static {
    /// Runs once, right after the component is attached. Returning `false`
    /// signals a setup failure; the component stays attached and the
    /// caller decides whether to tear it down.
    fn awake(&mut self, _ctx: &mut Ctx) -> bool {
        true
    }

    /// Runs every frame while the component is active and its entity alive.
    fn update(&mut self, _ctx: &mut Ctx) {}

    /// Runs during `World::render` for visible components, in descending
    /// depth order.
    fn render(&mut self, _ctx: &mut Ctx, _batch: &mut Batch) {}
}
