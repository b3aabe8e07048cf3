use fledge_engine::{Component, Ctx};

/// Scrolls its entity left every frame. The bird never moves on X; the
/// world slides past it instead. Stopped globally on death.
pub struct Slider {
    pub velocity: i32,
}

impl Slider {
    pub fn new() -> Self {
        Self { velocity: 1 }
    }
}

impl Component for Slider {
    fn update(&mut self, ctx: &mut Ctx) {
        ctx.entity_mut().position.x -= self.velocity;
    }
}
