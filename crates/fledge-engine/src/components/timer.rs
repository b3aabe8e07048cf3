//! Frame-synchronous countdown timer.

use crate::core::FRAME_DURATION_MS;
use crate::ecs::{Component, Ctx};

/// Runs when the countdown expires. Returning `false` means the action
/// destroyed this component (or its entity) and the timer must not touch
/// itself afterwards; `true` continues normally.
pub type TimerAction = Box<dyn FnMut(&mut Ctx) -> bool>;

/// Counts down in fixed frame steps. One-shot timers remove themselves
/// after firing; repeating timers rearm to the full duration.
pub struct TimerComponent {
    pub duration_ms: f32,
    remaining_ms: f32,
    repeats: bool,
    pub action: Option<TimerAction>,
}

impl TimerComponent {
    pub fn new(duration_ms: f32) -> Self {
        Self {
            duration_ms,
            remaining_ms: duration_ms,
            repeats: false,
            action: None,
        }
    }

    pub fn repeating(duration_ms: f32) -> Self {
        Self {
            repeats: true,
            ..Self::new(duration_ms)
        }
    }

    pub fn with_action(mut self, action: impl FnMut(&mut Ctx) -> bool + 'static) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    pub fn remaining_ms(&self) -> f32 {
        self.remaining_ms
    }
}

impl Component for TimerComponent {
    fn update(&mut self, ctx: &mut Ctx) {
        if self.remaining_ms <= 0.0 {
            return;
        }
        self.remaining_ms -= FRAME_DURATION_MS;
        if self.remaining_ms > 0.0 {
            return;
        }

        if let Some(mut action) = self.action.take() {
            if !action(ctx) {
                // The action tore this timer down; the callback box drops
                // with it.
                return;
            }
            if self.action.is_none() {
                self.action = Some(action);
            }
        }

        if self.repeats {
            self.remaining_ms = self.duration_ms;
        } else if ctx.world.meta(ctx.key).is_some() {
            ctx.remove_self();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Content;
    use crate::core::{Clock, Frame};
    use crate::ecs::World;
    use crate::input::Input;
    use glam::IVec2;
    use std::cell::Cell;
    use std::rc::Rc;

    fn services() -> (Content, Input, Clock) {
        (Content::default(), Input::default(), Clock::default())
    }

    #[test]
    fn one_shot_fires_once_and_removes_itself() {
        let (content, input, clock) = services();
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();
        let fired = Rc::new(Cell::new(0));

        let e = world.add_entity(IVec2::ZERO);
        let fired_in_action = fired.clone();
        world.add(
            e,
            TimerComponent::new(40.0).with_action(move |_ctx| {
                fired_in_action.set(fired_in_action.get() + 1);
                true
            }),
            &frame,
        );

        // 40 ms at ~16.7 ms per frame: fires on the third update.
        for _ in 0..10 {
            world.update(&frame);
        }
        assert_eq!(fired.get(), 1);
        assert!(world.components_of::<TimerComponent>().is_empty());
        assert!(world.entity(e).components().is_empty());
    }

    #[test]
    fn repeating_timer_rearms() {
        let (content, input, clock) = services();
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();
        let fired = Rc::new(Cell::new(0));

        let e = world.add_entity(IVec2::ZERO);
        let fired_in_action = fired.clone();
        world.add(
            e,
            TimerComponent::repeating(40.0).with_action(move |_ctx| {
                fired_in_action.set(fired_in_action.get() + 1);
                true
            }),
            &frame,
        );

        for _ in 0..9 {
            world.update(&frame);
        }
        assert_eq!(fired.get(), 3);
        assert_eq!(world.components_of::<TimerComponent>().len(), 1);
    }

    #[test]
    fn action_destroying_the_entity_aborts_cleanly() {
        let (content, input, clock) = services();
        let frame = Frame::new(&content, &input, &clock);
        let mut world = World::new();

        let e = world.add_entity(IVec2::ZERO);
        world.add(
            e,
            TimerComponent::new(20.0).with_action(|ctx| {
                ctx.destroy_entity();
                false
            }),
            &frame,
        );

        for _ in 0..5 {
            world.update(&frame);
        }
        assert_eq!(world.entity_count(), 0);
        assert!(world.components_of::<TimerComponent>().is_empty());
    }
}
